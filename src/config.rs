//! Controller configuration components.
//!
//! This module defines the tuning values for locomotion, wall-running and
//! mouse look, plus the [`FirstPersonController`] component that ties a
//! character body to its camera pivot.

use std::f32::consts::PI;

use bevy::prelude::*;

use crate::detection::WallSensor;
use crate::error::ConfigError;
use crate::intent::LocomotionIntent;
use crate::locomotion::LocomotionState;
use crate::look::LookState;
use crate::mover::KinematicMover;

/// Core first-person controller component.
///
/// Spawning this component pulls in the per-character state
/// ([`LocomotionState`], [`LookState`], [`LocomotionIntent`],
/// [`KinematicMover`], [`WallSensor`]) and a default [`LocomotionConfig`].
/// The camera pivot and the backend's mover are external collaborators: they
/// are checked when the controller is initialized, and a missing one is a
/// setup error rather than a character that silently never moves.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use fps_locomotion::prelude::*;
///
/// fn spawn_player(mut commands: Commands) {
///     let pivot = commands.spawn(Transform::from_xyz(0.0, 0.7, 0.0)).id();
///     commands
///         .spawn((
///             FirstPersonController::new(pivot),
///             LocomotionConfig::player(),
///             Transform::from_xyz(0.0, 1.0, 0.0),
///         ))
///         .add_child(pivot);
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
#[require(
    LocomotionConfig,
    LocomotionState,
    LookState,
    LocomotionIntent,
    KinematicMover,
    WallSensor
)]
pub struct FirstPersonController {
    /// Entity whose `Transform` receives camera pitch and roll.
    pub camera_pivot: Entity,
}

impl FirstPersonController {
    /// Create a controller driving the given camera pivot.
    pub fn new(camera_pivot: Entity) -> Self {
        Self { camera_pivot }
    }
}

/// How gravity behaves while wall-running.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub enum WallRunGravity {
    /// Vertical velocity is held at zero for the whole run.
    Cancel,
    /// Gravity keeps acting, scaled by `multiplier`, and the descent is capped
    /// at [`WallRunConfig::max_fall_speed`].
    Reduced {
        /// Fraction of normal gravity applied on the wall.
        multiplier: f32,
    },
}

/// Wall-run tuning.
#[derive(Reflect, Debug, Clone, Copy)]
pub struct WallRunConfig {
    /// Whether wall-running can start at all.
    pub enabled: bool,

    /// Speed along the wall (units/second).
    pub speed: f32,

    /// Longest a single run may last (seconds).
    pub max_duration: f32,

    /// Speed pressing the character into the wall (units/second).
    pub stick_force: f32,

    /// Time after a run ends before another may start (seconds).
    pub cooldown: f32,

    /// Multiplier on `jump_impulse` for a jump off the wall.
    pub jump_multiplier: f32,

    /// Horizontal speed pushing away from the wall on a wall-jump.
    pub jump_push: f32,

    /// Gravity handling on the wall.
    pub gravity: WallRunGravity,

    /// Fastest allowed descent with [`WallRunGravity::Reduced`].
    pub max_fall_speed: f32,
}

impl Default for WallRunConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: 8.0,
            max_duration: 1.5,
            stick_force: 2.0,
            cooldown: 0.3,
            jump_multiplier: 1.1,
            jump_push: 8.0,
            gravity: WallRunGravity::Cancel,
            max_fall_speed: 2.0,
        }
    }
}

/// Mouse look tuning.
#[derive(Reflect, Debug, Clone, Copy)]
pub struct LookConfig {
    /// Radians of rotation per unit of pointer motion.
    pub sensitivity: f32,

    /// Lowest camera pitch (radians, negative looks down).
    pub min_pitch: f32,

    /// Highest camera pitch (radians).
    pub max_pitch: f32,

    /// Camera roll at full alignment between the right axis and the wall normal (radians).
    pub roll_gain: f32,

    /// Exponential rate at which roll approaches its target (1/second).
    pub roll_smoothing: f32,
}

impl Default for LookConfig {
    fn default() -> Self {
        Self {
            sensitivity: 0.002,
            min_pitch: -PI / 3.0,
            max_pitch: PI / 3.0,
            roll_gain: 15f32.to_radians(),
            roll_smoothing: 10.0,
        }
    }
}

/// Configuration parameters for the locomotion controller.
///
/// Probe distances are given for an unscaled character and are multiplied by
/// the character's local scale every step.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct LocomotionConfig {
    // === Movement ===
    /// Walking speed (units/second).
    pub walk_speed: f32,

    /// Speed while the run modifier is held.
    pub run_speed: f32,

    /// Vertical velocity set by a grounded jump.
    pub jump_impulse: f32,

    /// Vertical acceleration (negative = down).
    pub gravity: f32,

    /// Vertical velocity held while grounded, keeping the ground probe in contact.
    pub stick_velocity: f32,

    /// Exponential decay rate of the wall-jump push (1/second).
    pub residual_damping: f32,

    // === Ground probe ===
    /// Distance from the body centre down to the ground probe sphere.
    pub ground_probe_offset: f32,

    /// Radius of the ground probe sphere.
    pub ground_check_distance: f32,

    /// Collision layers treated as ground.
    pub ground_layers: u32,

    // === Wall probe ===
    /// Length of the sideways wall rays.
    pub wall_check_distance: f32,

    /// Height of the wall rays above the body centre.
    pub wall_probe_height: f32,

    /// Collision layers treated as runnable walls.
    pub wall_layers: u32,

    /// Wall-run tuning.
    pub wall_run: WallRunConfig,

    /// Mouse look tuning.
    pub look: LookConfig,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            walk_speed: 5.0,
            run_speed: 10.0,
            jump_impulse: 12.0,
            gravity: -25.0,
            stick_velocity: -2.0,
            residual_damping: 4.0,

            ground_probe_offset: 1.0,
            ground_check_distance: 0.2,
            ground_layers: u32::MAX,

            wall_check_distance: 1.0,
            wall_probe_height: 0.0,
            wall_layers: u32::MAX,

            wall_run: WallRunConfig::default(),
            look: LookConfig::default(),
        }
    }
}

impl LocomotionConfig {
    /// Tuning for a player character.
    pub fn player() -> Self {
        Self::default()
    }

    /// Longer, faster wall-runs with a stronger push off the wall.
    pub fn arcade() -> Self {
        Self {
            run_speed: 12.0,
            wall_run: WallRunConfig {
                speed: 11.0,
                max_duration: 2.5,
                jump_push: 11.0,
                ..default()
            },
            ..default()
        }
    }

    /// Speed for this step given the run modifier.
    #[inline]
    pub fn move_speed(&self, running: bool) -> f32 {
        if running {
            self.run_speed
        } else {
            self.walk_speed
        }
    }

    /// Builder: set walk and run speed.
    pub fn with_speeds(mut self, walk: f32, run: f32) -> Self {
        self.walk_speed = walk;
        self.run_speed = run;
        self
    }

    /// Builder: set jump impulse.
    pub fn with_jump_impulse(mut self, impulse: f32) -> Self {
        self.jump_impulse = impulse;
        self
    }

    /// Builder: set gravity.
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Builder: set ground probe geometry.
    pub fn with_ground_probe(mut self, offset: f32, radius: f32) -> Self {
        self.ground_probe_offset = offset;
        self.ground_check_distance = radius;
        self
    }

    /// Builder: set wall check distance.
    pub fn with_wall_check_distance(mut self, distance: f32) -> Self {
        self.wall_check_distance = distance;
        self
    }

    /// Builder: set collision layers for ground and walls.
    pub fn with_layers(mut self, ground: u32, wall: u32) -> Self {
        self.ground_layers = ground;
        self.wall_layers = wall;
        self
    }

    /// Builder: replace wall-run tuning.
    pub fn with_wall_run(mut self, wall_run: WallRunConfig) -> Self {
        self.wall_run = wall_run;
        self
    }

    /// Builder: set the wall-run gravity mode.
    pub fn with_wall_run_gravity(mut self, gravity: WallRunGravity) -> Self {
        self.wall_run.gravity = gravity;
        self
    }

    /// Builder: replace look tuning.
    pub fn with_look(mut self, look: LookConfig) -> Self {
        self.look = look;
        self
    }

    /// Builder: set mouse sensitivity.
    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.look.sensitivity = sensitivity;
        self
    }

    /// Check every invariant the controller relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.gravity < 0.0) || !self.gravity.is_finite() {
            return Err(ConfigError::NonNegativeGravity(self.gravity));
        }
        if !(self.stick_velocity <= 0.0) || !self.stick_velocity.is_finite() {
            return Err(ConfigError::PositiveStickVelocity(self.stick_velocity));
        }

        non_negative("walk_speed", self.walk_speed)?;
        non_negative("run_speed", self.run_speed)?;
        non_negative("jump_impulse", self.jump_impulse)?;
        non_negative("residual_damping", self.residual_damping)?;
        non_negative("ground_probe_offset", self.ground_probe_offset)?;
        non_negative("ground_check_distance", self.ground_check_distance)?;
        non_negative("wall_check_distance", self.wall_check_distance)?;
        if !self.wall_probe_height.is_finite() {
            return Err(ConfigError::InvalidValue {
                name: "wall_probe_height",
                value: self.wall_probe_height,
            });
        }

        let wall_run = &self.wall_run;
        non_negative("wall_run.speed", wall_run.speed)?;
        non_negative("wall_run.max_duration", wall_run.max_duration)?;
        non_negative("wall_run.stick_force", wall_run.stick_force)?;
        non_negative("wall_run.cooldown", wall_run.cooldown)?;
        non_negative("wall_run.jump_multiplier", wall_run.jump_multiplier)?;
        non_negative("wall_run.jump_push", wall_run.jump_push)?;
        non_negative("wall_run.max_fall_speed", wall_run.max_fall_speed)?;
        if let WallRunGravity::Reduced { multiplier } = wall_run.gravity {
            non_negative("wall_run.gravity.multiplier", multiplier)?;
        }

        let look = &self.look;
        non_negative("look.sensitivity", look.sensitivity)?;
        non_negative("look.roll_gain", look.roll_gain)?;
        non_negative("look.roll_smoothing", look.roll_smoothing)?;
        if !look.min_pitch.is_finite() || !look.max_pitch.is_finite() || look.min_pitch > look.max_pitch {
            return Err(ConfigError::InvertedPitchLimits {
                min: look.min_pitch,
                max: look.max_pitch,
            });
        }

        Ok(())
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { name, value })
    }
}
