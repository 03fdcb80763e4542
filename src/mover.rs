//! Kinematic mover component.
//!
//! Displacements requested during a step are summed here and handed to the
//! physics backend once, at the end of the step.

use bevy::prelude::*;

/// Queues displacement for a character and reports ground contact.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct KinematicMover {
    /// Displacement queued this step and not yet applied.
    pending: Vec3,
    /// Result of this step's downward overlap test.
    resting_on_ground: bool,
}

impl KinematicMover {
    /// Queue a displacement. Calls within one step add up.
    ///
    /// Non-finite displacements are dropped, since a single NaN would poison
    /// the character's position for good.
    pub fn move_by(&mut self, displacement: Vec3) {
        if !displacement.is_finite() {
            warn!("Rejected non-finite displacement {displacement:?}");
            return;
        }
        self.pending += displacement;
    }

    /// Displacement queued so far this step.
    #[inline]
    pub fn pending(&self) -> Vec3 {
        self.pending
    }

    /// Take the queued displacement, leaving nothing pending.
    ///
    /// Returns `None` when nothing moves this step.
    pub fn take_pending(&mut self) -> Option<Vec3> {
        let pending = std::mem::take(&mut self.pending);
        (pending != Vec3::ZERO).then_some(pending)
    }

    /// Whether the character rests on walkable ground this step.
    #[inline]
    pub fn is_resting_on_ground(&self) -> bool {
        self.resting_on_ground
    }

    /// Record the result of the ground overlap test. Called by backend sensors.
    pub fn set_resting_on_ground(&mut self, resting: bool) {
        self.resting_on_ground = resting;
    }
}
