//! # `fps_locomotion`
//!
//! A first-person kinematic character controller with wall-running and a
//! physics backend abstraction.
//!
//! This crate provides a compact locomotion controller that:
//! - Walks, runs and jumps under a configurable gravity
//! - Re-derives ground contact every step from a downward overlap probe
//! - Runs along walls for a limited time, with a cooldown before the next run
//! - Wall-jumps with an upward boost and a push away from the wall
//! - Applies mouse look as body yaw plus camera pitch, with camera roll on walls
//! - Abstracts the physics backend (Rapier3D included)
//!
//! ## Architecture
//!
//! Every fixed step runs the [`LocomotionSet`] phases in order:
//! 1. **Preparation**: validate newly spawned controllers
//! 2. **Sensors**: the backend probes for ground and adjacent walls
//! 3. **StateMachine**: the [`LocomotionState`](locomotion::LocomotionState)
//!    updates the mode and vertical velocity and queues a displacement
//! 4. **Look**: pointer motion turns the body and tilts the camera pivot
//! 5. **FinalApplication**: the queued displacement goes to the backend
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use fps_locomotion::prelude::*;
//!
//! // Configuration and per-character state are plain components.
//! let config = LocomotionConfig::player().with_speeds(4.0, 9.0);
//! assert!(config.validate().is_ok());
//!
//! let mut intent = LocomotionIntent::default();
//! intent.set_movement(Vec2::Y);
//! ```

use std::marker::PhantomData;

use bevy::prelude::*;

pub mod backend;
pub mod config;
pub mod detection;
pub mod error;
pub mod events;
pub mod input;
pub mod intent;
pub mod locomotion;
pub mod look;
pub mod mover;
pub mod state;
pub mod systems;

#[cfg(feature = "rapier3d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::{CollisionData, LocomotionBackend, PhysicsQueries};
    pub use crate::config::{
        FirstPersonController, LocomotionConfig, LookConfig, WallRunConfig, WallRunGravity,
    };
    pub use crate::detection::{Surroundings, WallContact, WallSensor, WallSide};
    pub use crate::error::{ConfigError, ControllerSetupError};
    pub use crate::events::{LocomotionEvent, LocomotionEventKind};
    pub use crate::input::{InputBindings, LocomotionInputPlugin};
    pub use crate::intent::LocomotionIntent;
    pub use crate::locomotion::{LocomotionMode, LocomotionState, WallRunExit};
    pub use crate::look::LookState;
    pub use crate::mover::KinematicMover;
    pub use crate::state::{Airborne, Grounded, WallRunning};
    pub use crate::{FirstPersonControllerPlugin, LocomotionSet};

    #[cfg(feature = "rapier3d")]
    pub use crate::rapier::{Rapier3dBackend, Rapier3dCharacterBundle};
}

/// Phases of one controller step, run in order in `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocomotionSet {
    /// Validate new controllers.
    Preparation,
    /// Ground and wall probes (backend).
    Sensors,
    /// State machine and marker sync.
    StateMachine,
    /// Mouse look and camera roll.
    Look,
    /// Hand displacement to the backend.
    FinalApplication,
}

/// Main plugin for the controller.
///
/// This plugin is generic over a physics backend `B` which provides the
/// world queries and moves the bodies.
///
/// # Type Parameters
/// - `B`: The physics backend implementation (e.g., `Rapier3dBackend`)
///
/// # Examples
///
/// With the Rapier3D backend:
/// ```rust,ignore
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use fps_locomotion::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
///     .add_plugins(FirstPersonControllerPlugin::<Rapier3dBackend>::default())
///     .add_plugins(LocomotionInputPlugin::default())
///     .run();
/// ```
pub struct FirstPersonControllerPlugin<B: backend::LocomotionBackend> {
    _marker: PhantomData<B>,
}

impl<B: backend::LocomotionBackend> Default for FirstPersonControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<B: backend::LocomotionBackend> Plugin for FirstPersonControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<config::FirstPersonController>();
        app.register_type::<config::LocomotionConfig>();
        app.register_type::<config::WallRunConfig>();
        app.register_type::<config::LookConfig>();
        app.register_type::<intent::LocomotionIntent>();
        app.register_type::<locomotion::LocomotionState>();
        app.register_type::<look::LookState>();
        app.register_type::<mover::KinematicMover>();
        app.register_type::<detection::WallSensor>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<state::WallRunning>();

        app.add_event::<events::LocomotionEvent>();

        app.configure_sets(
            FixedUpdate,
            (
                LocomotionSet::Preparation,
                LocomotionSet::Sensors,
                LocomotionSet::StateMachine,
                LocomotionSet::Look,
                LocomotionSet::FinalApplication,
            )
                .chain(),
        );

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        app.add_systems(
            FixedUpdate,
            systems::initialize_controllers::<B>.in_set(LocomotionSet::Preparation),
        );
        app.add_systems(
            FixedUpdate,
            (systems::step_locomotion, systems::sync_state_markers)
                .chain()
                .in_set(LocomotionSet::StateMachine),
        );
        app.add_systems(FixedUpdate, systems::apply_look.in_set(LocomotionSet::Look));
        app.add_systems(
            FixedUpdate,
            systems::apply_mover_displacement::<B>.in_set(LocomotionSet::FinalApplication),
        );
    }
}
