//! Physics backend abstraction.
//!
//! The controller never talks to a physics engine directly. It needs two
//! primitive world queries ([`PhysicsQueries`]) and a way to move a body with
//! collision resolution ([`LocomotionBackend::apply_displacement`]). A backend
//! supplies both, plus the systems that run the queries each step.

use bevy::prelude::*;

/// Closest hit reported by [`PhysicsQueries::raycast`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollisionData {
    /// Distance along the ray.
    pub distance: f32,
    /// Outward surface normal.
    pub normal: Vec3,
    pub point: Vec3,
    /// Collider that was hit, if the backend tracks entities.
    pub entity: Option<Entity>,
}

impl CollisionData {
    pub fn new(distance: f32, normal: Vec3, point: Vec3, entity: Option<Entity>) -> Self {
        Self {
            distance,
            normal,
            point,
            entity,
        }
    }
}

/// The primitive world queries the controller consumes.
///
/// Implementations must be synchronous: results are used in the same step.
/// `layers` is a collision-group bit mask; only geometry whose membership
/// intersects it is considered.
pub trait PhysicsQueries {
    /// Whether any collider overlaps the sphere.
    fn overlap_sphere(&self, center: Vec3, radius: f32, layers: u32) -> bool;

    /// Cast a ray and return the closest hit within `max_distance`.
    ///
    /// `direction` must be normalized.
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: u32,
    ) -> Option<CollisionData>;
}

/// Trait for physics backend implementations.
///
/// Implement this trait to integrate a physics engine with the controller.
/// The backend's plugin must add a system in
/// [`LocomotionSet::Sensors`](crate::LocomotionSet::Sensors) that fills in
/// each character's [`KinematicMover`](crate::mover::KinematicMover) ground
/// flag and [`WallSensor`](crate::detection::WallSensor), usually by calling
/// [`sense_surroundings`](crate::detection::sense_surroundings) with its
/// [`PhysicsQueries`] implementation.
///
/// For an example implementation, see the `rapier` module's `Rapier3dBackend`.
pub trait LocomotionBackend: 'static + Send + Sync {
    /// Component that resolves collisions for a moving character.
    ///
    /// A controller without it is rejected at initialization.
    type MoverComponent: Component;

    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Move an entity by `displacement`, resolving collisions with the world.
    ///
    /// Called at most once per entity per step with the sum of everything
    /// queued on its mover, so a collision is resolved only once.
    fn apply_displacement(world: &mut World, entity: Entity, displacement: Vec3);
}
