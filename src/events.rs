//! Outbound locomotion notifications.
//!
//! Events are fire-and-forget: the controller never reads them back. Hook
//! audio cues and animation off them.

use bevy::prelude::*;

use crate::locomotion::WallRunExit;

/// Something notable happened to a character this step.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct LocomotionEvent {
    /// Character entity.
    pub entity: Entity,
    /// What happened.
    pub kind: LocomotionEventKind,
}

/// Kinds of [`LocomotionEvent`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocomotionEventKind {
    /// A jump from the ground.
    Jumped,
    /// A jump off a wall, pushing away from `wall_normal`.
    WallJumped {
        /// Normal of the wall jumped off.
        wall_normal: Vec3,
    },
    /// A wall-run began.
    WallRunStarted {
        /// Normal of the wall being run on.
        wall_normal: Vec3,
    },
    /// A wall-run ended.
    WallRunStopped {
        /// Why it ended.
        reason: WallRunExit,
    },
    /// The character touched down.
    Landed,
    /// Wall-running is available again.
    WallRunCooldownCleared,
}
