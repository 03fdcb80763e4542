//! Rapier3D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier3D.
//! Enable with the `rapier3d` feature.

use bevy::prelude::*;
use bevy_rapier3d::geometry::Group;
use bevy_rapier3d::prelude::*;

use crate::backend::{CollisionData, LocomotionBackend, PhysicsQueries};
use crate::config::{FirstPersonController, LocomotionConfig};
use crate::detection::{sense_surroundings, ProbeFrame, WallSensor};
use crate::locomotion::LocomotionState;
use crate::mover::KinematicMover;
use crate::LocomotionSet;

/// Rapier3D physics backend for the controller.
///
/// Characters are kinematic bodies moved by Rapier's
/// [`KinematicCharacterController`], which resolves collisions against the
/// world. Ground and wall probes run in a dedicated system that receives the
/// Rapier context as a system parameter.
pub struct Rapier3dBackend;

impl LocomotionBackend for Rapier3dBackend {
    type MoverComponent = KinematicCharacterController;

    fn plugin() -> impl Plugin {
        Rapier3dBackendPlugin
    }

    fn apply_displacement(world: &mut World, entity: Entity, displacement: Vec3) {
        // Rapier consumes the translation in its next step; several fixed
        // steps may run before that, so add to what is already there.
        if let Some(mut controller) = world.get_mut::<KinematicCharacterController>(entity) {
            let queued = controller.translation.unwrap_or(Vec3::ZERO);
            controller.translation = Some(queued + displacement);
        }
    }
}

/// Plugin that sets up Rapier3D-specific systems for the controller.
pub struct Rapier3dBackendPlugin;

impl Plugin for Rapier3dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            rapier_sense_surroundings.in_set(LocomotionSet::Sensors),
        );
    }
}

/// [`PhysicsQueries`] over a Rapier context, ignoring the probing character.
pub struct RapierQueries<'a> {
    context: &'a RapierContext<'a>,
    exclude: Entity,
}

impl<'a> RapierQueries<'a> {
    /// Queries that never report `exclude`'s own body or collider.
    pub fn new(context: &'a RapierContext<'a>, exclude: Entity) -> Self {
        Self { context, exclude }
    }
}

fn layer_groups(layers: u32) -> CollisionGroups {
    CollisionGroups::new(Group::ALL, Group::from_bits_truncate(layers))
}

impl PhysicsQueries for RapierQueries<'_> {
    fn overlap_sphere(&self, center: Vec3, radius: f32, layers: u32) -> bool {
        if radius <= 0.0 {
            return false;
        }
        let filter = QueryFilter::default()
            .exclude_rigid_body(self.exclude)
            .exclude_collider(self.exclude)
            .exclude_sensors()
            .groups(layer_groups(layers));

        let mut hit = false;
        self.context.intersections_with_shape(
            center,
            Quat::IDENTITY,
            &Collider::ball(radius),
            filter,
            |_| {
                hit = true;
                false
            },
        );
        hit
    }

    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: u32,
    ) -> Option<CollisionData> {
        let filter = QueryFilter::default()
            .exclude_rigid_body(self.exclude)
            .exclude_collider(self.exclude)
            .exclude_sensors()
            .groups(layer_groups(layers));

        self.context
            .cast_ray_and_get_normal(origin, direction, max_distance, true, filter)
            .map(|(hit_entity, hit)| {
                CollisionData::new(hit.time_of_impact, hit.normal, hit.point, Some(hit_entity))
            })
    }
}

/// Rapier-specific ground and wall detection.
///
/// Probe distances are scaled by the character's local scale, and the wall
/// probe follows the recorded wall while a run is in progress.
fn rapier_sense_surroundings(
    rapier_context: ReadRapierContext,
    mut q_controllers: Query<
        (
            Entity,
            &GlobalTransform,
            &Transform,
            &LocomotionConfig,
            &LocomotionState,
            &mut KinematicMover,
            &mut WallSensor,
        ),
        With<FirstPersonController>,
    >,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, global, transform, config, state, mut mover, mut sensor) in &mut q_controllers {
        let queries = RapierQueries::new(&context, entity);
        let frame = ProbeFrame::from_transforms(global, transform);
        let surroundings = sense_surroundings(&queries, &frame, config, state.wall_normal());

        mover.set_resting_on_ground(surroundings.grounded);
        sensor.contact = surroundings.wall;
    }
}

/// Bundle containing the Rapier physics components a character needs.
///
/// Add a [`Collider`] alongside it. The body is kinematic: gravity and
/// velocity come from the controller, not from Rapier.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use fps_locomotion::prelude::*;
///
/// fn spawn_player(mut commands: Commands) {
///     let pivot = commands.spawn(Transform::from_xyz(0.0, 0.7, 0.0)).id();
///     commands
///         .spawn((
///             Transform::from_xyz(0.0, 2.0, 0.0),
///             FirstPersonController::new(pivot),
///             LocomotionConfig::player(),
///             InputBindings::default(),
///             Rapier3dCharacterBundle::new(),
///             Collider::capsule_y(0.5, 0.4),
///         ))
///         .add_child(pivot);
/// }
/// ```
///
/// # Defaults
///
/// - `rigid_body`: [`RigidBody::KinematicPositionBased`]
/// - `controller`: Rapier's defaults, without ground snapping, since the
///   controller keeps grounded characters pressed down itself
#[derive(Bundle)]
pub struct Rapier3dCharacterBundle {
    /// The rigid body type. Must be kinematic for the character controller to move it.
    pub rigid_body: RigidBody,
    /// Rapier's collision-resolving mover.
    pub controller: KinematicCharacterController,
}

impl Default for Rapier3dCharacterBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rapier3dCharacterBundle {
    /// Create a new character bundle.
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::KinematicPositionBased,
            controller: KinematicCharacterController {
                snap_to_ground: None,
                ..default()
            },
        }
    }

    /// Set the character controller's skin offset.
    pub fn with_offset(mut self, offset: f32) -> Self {
        self.controller.offset = CharacterLength::Absolute(offset);
        self
    }

    /// Let the character climb steps up to `max_height`.
    pub fn with_autostep(mut self, max_height: f32, min_width: f32) -> Self {
        self.controller.autostep = Some(CharacterAutostep {
            max_height: CharacterLength::Absolute(max_height),
            min_width: CharacterLength::Absolute(min_width),
            include_dynamic_bodies: false,
        });
        self
    }
}
