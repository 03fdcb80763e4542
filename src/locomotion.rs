//! Locomotion state machine.
//!
//! A character is in exactly one [`LocomotionMode`] at a time. Each fixed
//! step, [`LocomotionState::step`] takes the probe results and the player's
//! intent, updates the mode and vertical velocity, and returns the
//! displacement to hand to the mover.
//!
//! The step is a plain function of its inputs: no physics, no ECS access. The
//! systems in [`crate::systems`] gather the inputs and apply the outputs.
//!
//! Step order:
//! 1. Tick the wall-run cooldown.
//! 2. Settle `Grounded`/`Airborne` against this step's ground probe.
//! 3. Integrate vertical velocity for the current mode.
//! 4. Evaluate wall-run exit, wall-run entry, then the grounded jump.
//! 5. Compute the displacement for the resulting mode.

use bevy::prelude::*;

use crate::config::{LocomotionConfig, WallRunGravity};
use crate::detection::Surroundings;
use crate::events::LocomotionEventKind;

/// Slack for comparing accumulated step times against durations, so a run
/// of steps whose deltas sum to a limit counts as reaching it.
pub const TIME_EPSILON: f32 = 1e-4;

/// Residual impulses slower than this are dropped.
const RESIDUAL_CUTOFF: f32 = 0.01;

/// Movement input magnitudes below this count as no input.
pub(crate) const INPUT_DEADZONE: f32 = 0.001;

/// Current locomotion mode.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Default)]
pub enum LocomotionMode {
    /// Standing or walking on the ground.
    #[default]
    Grounded,
    /// Falling or rising through the air.
    Airborne,
    /// Running along a wall.
    WallRunning {
        /// Seconds since the run started.
        elapsed: f32,
        /// Outward normal of the wall being run on.
        wall_normal: Vec3,
    },
}

impl LocomotionMode {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Grounded => "grounded",
            Self::Airborne => "airborne",
            Self::WallRunning { .. } => "wall-running",
        }
    }
}

/// Why a wall-run ended.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallRunExit {
    /// The player jumped off the wall.
    Jump,
    /// The run lasted its maximum duration.
    TimedOut,
    /// Forward input was released.
    Released,
    /// The wall is no longer adjacent.
    Detached,
}

/// Per-character locomotion state.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct LocomotionState {
    /// Active mode.
    pub mode: LocomotionMode,
    /// Vertical velocity (positive = up).
    pub vertical_velocity: f32,
    /// Seconds left before another wall-run may start.
    pub wall_run_cooldown: Option<f32>,
    /// Horizontal velocity left over from a wall-jump, decaying each step.
    pub residual_impulse: Option<Vec3>,
}

/// Player input for one step.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepInput {
    /// `x` strafes along right, `y` moves along forward.
    pub movement: Vec2,
    /// Run modifier held.
    pub run: bool,
    /// Jump pressed since the last step.
    pub jump: bool,
}

impl StepInput {
    /// Whether forward movement is held.
    pub fn forward_held(&self) -> bool {
        self.movement.y > INPUT_DEADZONE
    }
}

/// Horizontal body axes for one step.
#[derive(Debug, Clone, Copy)]
pub struct BodyFrame {
    /// Horizontal forward (the body's `-Z`).
    pub forward: Vec3,
    /// Horizontal right (the body's `+X`).
    pub right: Vec3,
}

impl BodyFrame {
    /// Axes for a body yawed by `yaw` radians about `+Y`.
    pub fn from_yaw(yaw: f32) -> Self {
        Self::from_rotation(Quat::from_rotation_y(yaw))
    }

    /// Axes for an arbitrary rotation, flattened onto the horizontal plane.
    pub fn from_rotation(rotation: Quat) -> Self {
        let flatten = |v: Vec3| Vec3::new(v.x, 0.0, v.z).normalize_or_zero();
        Self {
            forward: flatten(rotation * Vec3::NEG_Z),
            right: flatten(rotation * Vec3::X),
        }
    }
}

/// Result of one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutcome {
    /// World-space displacement for the mover.
    pub displacement: Vec3,
    /// Notifications raised this step, in order.
    pub events: Vec<LocomotionEventKind>,
}

impl LocomotionState {
    /// Whether the character is grounded.
    pub fn is_grounded(&self) -> bool {
        matches!(self.mode, LocomotionMode::Grounded)
    }

    /// Whether the character is airborne.
    pub fn is_airborne(&self) -> bool {
        matches!(self.mode, LocomotionMode::Airborne)
    }

    /// Whether the character is running along a wall.
    pub fn is_wall_running(&self) -> bool {
        matches!(self.mode, LocomotionMode::WallRunning { .. })
    }

    /// Normal of the wall being run on, if wall-running.
    pub fn wall_normal(&self) -> Option<Vec3> {
        match self.mode {
            LocomotionMode::WallRunning { wall_normal, .. } => Some(wall_normal),
            _ => None,
        }
    }

    /// Seconds spent in the current wall-run, if wall-running.
    pub fn wall_run_elapsed(&self) -> Option<f32> {
        match self.mode {
            LocomotionMode::WallRunning { elapsed, .. } => Some(elapsed),
            _ => None,
        }
    }

    /// Whether a recent wall-run blocks starting another.
    pub fn is_wall_run_on_cooldown(&self) -> bool {
        self.wall_run_cooldown.is_some()
    }

    /// Advance the state machine by `dt` seconds.
    ///
    /// A non-finite or non-positive `dt` leaves the state untouched and
    /// produces no movement.
    pub fn step(
        &mut self,
        config: &LocomotionConfig,
        input: StepInput,
        surroundings: Surroundings,
        frame: BodyFrame,
        dt: f32,
    ) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        if !dt.is_finite() || dt <= 0.0 {
            return outcome;
        }

        self.tick_cooldown(dt, &mut outcome.events);
        self.settle(config, surroundings.grounded, &mut outcome.events);
        self.integrate_vertical(config, dt);
        self.transition(config, input, surroundings, &mut outcome.events, dt);
        outcome.displacement = self.displacement(config, input, frame, dt);

        outcome
    }

    fn tick_cooldown(&mut self, dt: f32, events: &mut Vec<LocomotionEventKind>) {
        let Some(remaining) = self.wall_run_cooldown.as_mut() else {
            return;
        };
        *remaining -= dt;
        if *remaining <= TIME_EPSILON {
            self.wall_run_cooldown = None;
            events.push(LocomotionEventKind::WallRunCooldownCleared);
        }
    }

    /// Re-derive `Grounded`/`Airborne` from this step's ground probe.
    fn settle(
        &mut self,
        config: &LocomotionConfig,
        grounded: bool,
        events: &mut Vec<LocomotionEventKind>,
    ) {
        match self.mode {
            LocomotionMode::Airborne if grounded && self.vertical_velocity <= 0.0 => {
                self.mode = LocomotionMode::Grounded;
                self.vertical_velocity = config.stick_velocity;
                self.residual_impulse = None;
                if self.wall_run_cooldown.take().is_some() {
                    events.push(LocomotionEventKind::WallRunCooldownCleared);
                }
                events.push(LocomotionEventKind::Landed);
            }
            LocomotionMode::Grounded if !grounded || self.vertical_velocity > 0.0 => {
                self.mode = LocomotionMode::Airborne;
            }
            _ => {}
        }
    }

    fn integrate_vertical(&mut self, config: &LocomotionConfig, dt: f32) {
        match self.mode {
            LocomotionMode::Grounded if self.vertical_velocity <= 0.0 => {
                self.vertical_velocity = config.stick_velocity;
            }
            LocomotionMode::Grounded | LocomotionMode::Airborne => {
                self.vertical_velocity += config.gravity * dt;
            }
            LocomotionMode::WallRunning { .. } => match config.wall_run.gravity {
                WallRunGravity::Cancel => self.vertical_velocity = 0.0,
                WallRunGravity::Reduced { multiplier } => {
                    self.vertical_velocity = (self.vertical_velocity
                        + config.gravity * multiplier * dt)
                        .max(-config.wall_run.max_fall_speed);
                }
            },
        }
    }

    fn transition(
        &mut self,
        config: &LocomotionConfig,
        input: StepInput,
        surroundings: Surroundings,
        events: &mut Vec<LocomotionEventKind>,
        dt: f32,
    ) {
        if let LocomotionMode::WallRunning {
            elapsed,
            wall_normal,
        } = &mut self.mode
        {
            *elapsed += dt;

            let exit = if input.jump {
                Some(WallRunExit::Jump)
            } else if *elapsed + TIME_EPSILON >= config.wall_run.max_duration {
                Some(WallRunExit::TimedOut)
            } else if !input.forward_held() {
                Some(WallRunExit::Released)
            } else if surroundings.wall.is_none() {
                Some(WallRunExit::Detached)
            } else {
                None
            };

            match (exit, surroundings.wall) {
                (Some(reason), _) => {
                    let normal = *wall_normal;
                    self.exit_wall_run(config, reason, normal, surroundings.grounded, events);
                }
                (None, Some(contact)) => *wall_normal = contact.normal,
                (None, None) => {}
            }
            return;
        }

        if let Some(contact) = surroundings.wall {
            let can_start = config.wall_run.enabled
                && input.forward_held()
                && !surroundings.grounded
                && self.wall_run_cooldown.is_none();
            if can_start {
                self.mode = LocomotionMode::WallRunning {
                    elapsed: 0.0,
                    wall_normal: contact.normal,
                };
                self.vertical_velocity = 0.0;
                self.residual_impulse = None;
                events.push(LocomotionEventKind::WallRunStarted {
                    wall_normal: contact.normal,
                });
                return;
            }
        }

        // Airborne jumps are ignored.
        if input.jump && self.is_grounded() {
            self.vertical_velocity = config.jump_impulse;
            events.push(LocomotionEventKind::Jumped);
        }
    }

    fn exit_wall_run(
        &mut self,
        config: &LocomotionConfig,
        reason: WallRunExit,
        wall_normal: Vec3,
        grounded: bool,
        events: &mut Vec<LocomotionEventKind>,
    ) {
        self.wall_run_cooldown = Some(config.wall_run.cooldown);

        if reason == WallRunExit::Jump {
            self.vertical_velocity = config.jump_impulse * config.wall_run.jump_multiplier;
            let away = Vec3::new(wall_normal.x, 0.0, wall_normal.z).normalize_or_zero();
            self.residual_impulse = Some(away * config.wall_run.jump_push);
            events.push(LocomotionEventKind::WallJumped { wall_normal });
        }

        self.mode = if grounded && self.vertical_velocity <= 0.0 {
            LocomotionMode::Grounded
        } else {
            LocomotionMode::Airborne
        };
        events.push(LocomotionEventKind::WallRunStopped { reason });
    }

    fn displacement(
        &mut self,
        config: &LocomotionConfig,
        input: StepInput,
        frame: BodyFrame,
        dt: f32,
    ) -> Vec3 {
        match self.mode {
            LocomotionMode::WallRunning { wall_normal, .. } => {
                let mut along = Vec3::Y.cross(wall_normal).normalize_or_zero();
                if along.dot(frame.forward) < 0.0 {
                    along = -along;
                }
                (along * config.wall_run.speed - wall_normal * config.wall_run.stick_force
                    + Vec3::Y * self.vertical_velocity)
                    * dt
            }
            LocomotionMode::Grounded | LocomotionMode::Airborne => {
                let mut direction = frame.right * input.movement.x + frame.forward * input.movement.y;
                let length_squared = direction.length_squared();
                if length_squared < INPUT_DEADZONE * INPUT_DEADZONE {
                    direction = Vec3::ZERO;
                } else if length_squared > 1.0 {
                    direction /= length_squared.sqrt();
                }

                let mut velocity =
                    direction * config.move_speed(input.run) + Vec3::Y * self.vertical_velocity;
                if let Some(residual) = self.residual_impulse {
                    velocity += residual;
                    self.decay_residual(config, dt);
                }
                velocity * dt
            }
        }
    }

    fn decay_residual(&mut self, config: &LocomotionConfig, dt: f32) {
        self.residual_impulse = self
            .residual_impulse
            .map(|residual| residual * (-config.residual_damping * dt).exp())
            .filter(|residual| residual.length() >= RESIDUAL_CUTOFF);
    }
}
