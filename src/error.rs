//! Error types.
//!
//! The state machine itself has no runtime errors. Everything here is
//! reported once, when a controller is set up, so a misconfigured character
//! fails loudly instead of silently ignoring input.

use bevy::prelude::*;
use thiserror::Error;

/// A [`LocomotionConfig`](crate::config::LocomotionConfig) value that breaks an invariant.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// Gravity must pull downward.
    #[error("gravity must be negative, got {0}")]
    NonNegativeGravity(f32),

    /// The stick velocity keeps a grounded character pressed down, so it can't be positive.
    #[error("stick velocity must not be positive, got {0}")]
    PositiveStickVelocity(f32),

    /// A speed, distance or duration that must be finite and non-negative.
    #[error("`{name}` must be finite and non-negative, got {value}")]
    InvalidValue {
        /// Field name.
        name: &'static str,
        /// Offending value.
        value: f32,
    },

    /// Pitch limits where the minimum exceeds the maximum.
    #[error("pitch limits are inverted: min {min} > max {max}")]
    InvertedPitchLimits {
        /// Lower pitch bound (radians).
        min: f32,
        /// Upper pitch bound (radians).
        max: f32,
    },
}

/// Failure while initializing a [`FirstPersonController`](crate::config::FirstPersonController).
#[derive(Debug, Error)]
pub enum ControllerSetupError {
    /// The configured camera pivot entity does not exist or has no `Transform`.
    #[error("controller {controller} references camera pivot {pivot}, which does not exist or has no Transform")]
    MissingCameraPivot {
        /// Character entity.
        controller: Entity,
        /// Referenced pivot entity.
        pivot: Entity,
    },

    /// The camera pivot must be a separate entity, since pitch is applied only to the camera.
    #[error("controller {0} uses itself as its camera pivot")]
    PivotIsController(Entity),

    /// The physics backend's mover component is absent.
    #[error("controller {controller} has no `{mover}` component; the character could never move")]
    MissingMover {
        /// Character entity.
        controller: Entity,
        /// Type name of the backend mover component.
        mover: &'static str,
    },

    /// The configuration failed validation.
    #[error("controller {controller} has an invalid configuration")]
    InvalidConfig {
        /// Character entity.
        controller: Entity,
        /// What was wrong.
        #[source]
        source: ConfigError,
    },
}
