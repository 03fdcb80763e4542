//! Mouse look.
//!
//! Yaw turns the body about `+Y`. Pitch and roll are applied to the camera
//! pivot only, so the body stays upright.

use bevy::prelude::*;

use crate::config::LookConfig;
use crate::locomotion::LocomotionMode;

/// Accumulated view angles for one character (radians).
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct LookState {
    /// Rotation about `+Y`. Positive turns left.
    pub yaw: f32,
    /// Camera pitch. Positive looks up. Always within the configured limits.
    pub pitch: f32,
    /// Camera roll about the view axis.
    pub roll: f32,
}

impl LookState {
    /// Apply one step of pointer motion, then clamp pitch.
    ///
    /// Moving the pointer right turns right and moving it down looks down.
    /// A zero or non-finite delta skips the rotation, but pitch is still
    /// clamped so the invariant holds after every call.
    pub fn apply_pointer_delta(&mut self, delta: Vec2, config: &LookConfig) {
        if delta.is_finite() && delta != Vec2::ZERO {
            self.yaw -= delta.x * config.sensitivity;
            self.pitch -= delta.y * config.sensitivity;
        }
        self.pitch = self.pitch.clamp(config.min_pitch, config.max_pitch);
    }

    /// Ease roll toward `target` at the configured smoothing rate.
    pub fn update_roll(&mut self, target: f32, config: &LookConfig, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let t = 1.0 - (-config.roll_smoothing * dt).exp();
        self.roll += (target - self.roll) * t;
    }

    /// Rotation for the body.
    pub fn body_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// Rotation for the camera pivot, relative to the body.
    pub fn camera_rotation(&self) -> Quat {
        Quat::from_rotation_x(self.pitch) * Quat::from_rotation_z(self.roll)
    }
}

/// Camera roll the character should lean toward in `mode`.
///
/// While wall-running the roll is proportional to how well the body's right
/// axis lines up with the wall normal, clamped to `[-1, 1]` before the gain.
/// With a wall on the right (normal facing `-right`) this rolls clockwise,
/// tilting the view toward the wall.
pub fn target_roll(mode: &LocomotionMode, right: Vec3, config: &LookConfig) -> f32 {
    match mode {
        LocomotionMode::WallRunning { wall_normal, .. } => {
            right.dot(*wall_normal).clamp(-1.0, 1.0) * config.roll_gain
        }
        _ => 0.0,
    }
}
