//! State marker components.
//!
//! These components mirror the current [`LocomotionMode`](crate::locomotion::LocomotionMode)
//! of a character so gameplay code can filter queries on it. They are added
//! and removed by the controller systems; exactly one is present on an
//! initialized character.

use bevy::prelude::*;

use crate::locomotion::LocomotionMode;

/// Marker component indicating the character is grounded.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use fps_locomotion::prelude::*;
///
/// // Grounded is a marker component - just use it in queries
/// fn count_grounded(q: Query<(), (With<FirstPersonController>, With<Grounded>)>) -> usize {
///     q.iter().count()
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the character is airborne.
///
/// Mutually exclusive with [`Grounded`] and [`WallRunning`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Marker component indicating the character is running along a wall.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct WallRunning {
    /// Outward normal of the wall.
    pub normal: Vec3,
}

impl Default for WallRunning {
    fn default() -> Self {
        Self { normal: Vec3::X }
    }
}

/// Which marker a mode maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MarkerKind {
    Grounded,
    Airborne,
    WallRunning,
}

impl From<&LocomotionMode> for MarkerKind {
    fn from(mode: &LocomotionMode) -> Self {
        match mode {
            LocomotionMode::Grounded => Self::Grounded,
            LocomotionMode::Airborne => Self::Airborne,
            LocomotionMode::WallRunning { .. } => Self::WallRunning,
        }
    }
}
