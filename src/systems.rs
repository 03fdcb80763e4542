//! Core controller systems.
//!
//! These systems gather the per-character inputs, run the locomotion state
//! machine and push the results out to the camera and the physics backend.
//! They are generic over the physics backend where they touch it.

use bevy::ecs::error::BevyError;
use bevy::prelude::*;

use crate::backend::LocomotionBackend;
use crate::config::{FirstPersonController, LocomotionConfig};
use crate::detection::{Surroundings, WallSensor};
use crate::error::ControllerSetupError;
use crate::events::{LocomotionEvent, LocomotionEventKind};
use crate::intent::LocomotionIntent;
use crate::locomotion::{BodyFrame, LocomotionMode, LocomotionState, StepInput};
use crate::look::{target_roll, LookState};
use crate::mover::KinematicMover;
use crate::state::{Airborne, Grounded, MarkerKind, WallRunning};

/// Step length for this fixed update.
///
/// Falls back to 60 Hz when the fixed clock has not advanced, which happens
/// when `FixedUpdate` is run by hand.
pub(crate) fn fixed_delta(time: &Time<Fixed>) -> f32 {
    Some(time.delta_secs())
        .filter(|&dt| dt > 0.0)
        .unwrap_or(1.0 / 60.0)
}

/// Validate newly spawned controllers and seed their look state.
///
/// A controller whose camera pivot or backend mover is missing, or whose
/// configuration is invalid, is an error. With Bevy's default error handler
/// this stops the app instead of leaving a character that never moves.
pub fn initialize_controllers<B: LocomotionBackend>(
    mut commands: Commands,
    mut q_new: Query<
        (
            Entity,
            &FirstPersonController,
            &LocomotionConfig,
            &Transform,
            &mut LookState,
            Has<B::MoverComponent>,
        ),
        Added<FirstPersonController>,
    >,
    q_pivots: Query<(), With<Transform>>,
) -> Result<(), BevyError> {
    for (entity, controller, config, transform, mut look, has_mover) in &mut q_new {
        config
            .validate()
            .map_err(|source| ControllerSetupError::InvalidConfig {
                controller: entity,
                source,
            })?;

        let pivot = controller.camera_pivot;
        if pivot == entity {
            return Err(ControllerSetupError::PivotIsController(entity).into());
        }
        if !q_pivots.contains(pivot) {
            return Err(ControllerSetupError::MissingCameraPivot {
                controller: entity,
                pivot,
            }
            .into());
        }
        if !has_mover {
            return Err(ControllerSetupError::MissingMover {
                controller: entity,
                mover: std::any::type_name::<B::MoverComponent>(),
            }
            .into());
        }

        let (yaw, _, _) = transform.rotation.to_euler(EulerRot::YXZ);
        look.yaw = yaw;
        look.pitch = look.pitch.clamp(config.look.min_pitch, config.look.max_pitch);

        commands.entity(entity).insert(Grounded);
        info!("Initialized first-person controller {entity} with camera pivot {pivot}");
    }

    Ok(())
}

/// Advance every character's state machine by one fixed step and queue the
/// resulting displacement on its mover.
pub fn step_locomotion(
    time: Res<Time<Fixed>>,
    mut events: EventWriter<LocomotionEvent>,
    mut q_controllers: Query<
        (
            Entity,
            &LocomotionConfig,
            &Transform,
            &WallSensor,
            &mut LocomotionIntent,
            &mut LocomotionState,
            &mut KinematicMover,
        ),
        With<FirstPersonController>,
    >,
) {
    let dt = fixed_delta(&time);

    for (entity, config, transform, sensor, mut intent, mut state, mut mover) in &mut q_controllers
    {
        let input = StepInput {
            movement: intent.movement,
            run: intent.run,
            jump: intent.take_jump_request(),
        };
        let surroundings = Surroundings {
            grounded: mover.is_resting_on_ground(),
            wall: sensor.contact,
        };
        let frame = BodyFrame::from_rotation(transform.rotation);

        let previous = state.mode;
        let outcome = state.step(config, input, surroundings, frame, dt);
        mover.move_by(outcome.displacement);

        if MarkerKind::from(&previous) != MarkerKind::from(&state.mode) {
            debug!(
                "{entity} mode {} -> {}",
                previous.name(),
                state.mode.name()
            );
        }

        for kind in outcome.events {
            log_event(entity, &kind);
            events.write(LocomotionEvent { entity, kind });
        }
    }
}

fn log_event(entity: Entity, kind: &LocomotionEventKind) {
    match kind {
        LocomotionEventKind::WallRunStarted { wall_normal } => {
            debug!("{entity} started wall-running (normal {wall_normal})");
        }
        LocomotionEventKind::WallRunStopped { reason } => {
            debug!("{entity} stopped wall-running: {reason:?}");
        }
        LocomotionEventKind::WallJumped { wall_normal } => {
            debug!("{entity} jumped off wall (normal {wall_normal})");
        }
        LocomotionEventKind::Landed => debug!("{entity} landed"),
        LocomotionEventKind::Jumped | LocomotionEventKind::WallRunCooldownCleared => {}
    }
}

/// Keep the [`Grounded`], [`Airborne`] and [`WallRunning`] markers in sync
/// with each character's mode.
pub fn sync_state_markers(
    mut commands: Commands,
    q_controllers: Query<
        (
            Entity,
            &LocomotionState,
            Has<Grounded>,
            Has<Airborne>,
            Option<&WallRunning>,
        ),
        With<FirstPersonController>,
    >,
) {
    for (entity, state, has_grounded, has_airborne, wall_running) in &q_controllers {
        let mut entity_commands = commands.entity(entity);

        match state.mode {
            LocomotionMode::Grounded => {
                if !has_grounded {
                    entity_commands.insert(Grounded);
                }
            }
            LocomotionMode::Airborne => {
                if !has_airborne {
                    entity_commands.insert(Airborne);
                }
            }
            LocomotionMode::WallRunning { wall_normal, .. } => {
                if wall_running.is_none_or(|marker| marker.normal != wall_normal) {
                    entity_commands.insert(WallRunning {
                        normal: wall_normal,
                    });
                }
            }
        }

        let kind = MarkerKind::from(&state.mode);
        if kind != MarkerKind::Grounded && has_grounded {
            entity_commands.remove::<Grounded>();
        }
        if kind != MarkerKind::Airborne && has_airborne {
            entity_commands.remove::<Airborne>();
        }
        if kind != MarkerKind::WallRunning && wall_running.is_some() {
            entity_commands.remove::<WallRunning>();
        }
    }
}

/// Apply pointer motion to yaw and pitch, ease camera roll, and write the
/// rotations to the body and its camera pivot.
pub fn apply_look(
    time: Res<Time<Fixed>>,
    mut q_controllers: Query<(
        Entity,
        &FirstPersonController,
        &LocomotionConfig,
        &LocomotionState,
        &mut LocomotionIntent,
        &mut LookState,
        &mut Transform,
    )>,
    mut q_pivots: Query<&mut Transform, Without<FirstPersonController>>,
) {
    let dt = fixed_delta(&time);

    for (entity, controller, config, state, mut intent, mut look, mut transform) in
        &mut q_controllers
    {
        let delta = intent.take_look_delta();
        look.apply_pointer_delta(delta, &config.look);

        let right = BodyFrame::from_yaw(look.yaw).right;
        let target = target_roll(&state.mode, right, &config.look);
        look.update_roll(target, &config.look, dt);

        transform.rotation = look.body_rotation();

        match q_pivots.get_mut(controller.camera_pivot) {
            Ok(mut pivot) => pivot.rotation = look.camera_rotation(),
            Err(_) => warn!(
                "Camera pivot {} of controller {entity} no longer exists",
                controller.camera_pivot
            ),
        }
    }
}

/// Hand each character's queued displacement to the physics backend.
///
/// Runs last in the fixed step so every displacement queued during the step
/// is resolved in one backend call.
pub fn apply_mover_displacement<B: LocomotionBackend>(world: &mut World) {
    // Collect first, then apply with full world access.
    let pending: Vec<(Entity, Vec3)> = world
        .query_filtered::<(Entity, &mut KinematicMover), With<FirstPersonController>>()
        .iter_mut(world)
        .filter_map(|(entity, mut mover)| mover.take_pending().map(|d| (entity, d)))
        .collect();

    for (entity, displacement) in pending {
        B::apply_displacement(world, entity, displacement);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_delta_falls_back_when_clock_is_idle() {
        let time = Time::<Fixed>::from_hz(30.0);
        assert!((fixed_delta(&time) - 1.0 / 60.0).abs() < 1e-6);
    }
}
