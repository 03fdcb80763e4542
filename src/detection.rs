//! Ground and wall detection.
//!
//! The controller polls the world every step instead of reacting to
//! collision events, so the state machine only ever sees the geometry as it
//! is right now. Backends call [`sense_surroundings`] with their
//! [`PhysicsQueries`] implementation and store the result on the character.

use bevy::prelude::*;

use crate::backend::{CollisionData, PhysicsQueries};
use crate::config::LocomotionConfig;

/// Which side of the character a wall is on.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallSide {
    /// Along `-right`.
    Left,
    /// Along `+right`.
    Right,
}

/// A runnable wall next to the character.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct WallContact {
    /// Outward normal of the wall surface.
    pub normal: Vec3,
    /// Distance from the probe origin to the wall.
    pub distance: f32,
    /// Side of the character the wall is on.
    pub side: WallSide,
    /// Wall entity, when the backend reports it.
    pub entity: Option<Entity>,
}

impl WallContact {
    /// Build a contact from a ray hit, deciding the side from the normal.
    pub fn from_hit(hit: CollisionData, right: Vec3) -> Self {
        // A wall on the right faces back toward -right.
        let side = if hit.normal.dot(right) < 0.0 {
            WallSide::Right
        } else {
            WallSide::Left
        };
        Self {
            normal: hit.normal,
            distance: hit.distance,
            side,
            entity: hit.entity,
        }
    }
}

/// Latest wall probe result for a character.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct WallSensor {
    /// Wall detected this step, if any.
    pub contact: Option<WallContact>,
}

/// Character placement used to aim the probes.
#[derive(Debug, Clone, Copy)]
pub struct ProbeFrame {
    /// Body centre in world space.
    pub center: Vec3,
    /// Horizontal right axis of the body.
    pub right: Vec3,
    /// Local scale of the character.
    pub scale: Vec3,
}

impl ProbeFrame {
    /// Create a probe frame. `right` is flattened onto the horizontal plane.
    pub fn new(center: Vec3, right: Vec3, scale: Vec3) -> Self {
        Self {
            center,
            right: Vec3::new(right.x, 0.0, right.z).normalize_or_zero(),
            scale,
        }
    }

    /// Derive the frame from a character's transforms.
    pub fn from_transforms(global: &GlobalTransform, local: &Transform) -> Self {
        Self::new(global.translation(), *global.right(), local.scale)
    }

    /// Centre and radius of the ground probe sphere.
    pub fn ground_probe(&self, config: &LocomotionConfig) -> (Vec3, f32) {
        let vertical_scale = self.scale.y.abs();
        let center = self.center - Vec3::Y * config.ground_probe_offset * vertical_scale;
        (center, config.ground_check_distance * vertical_scale)
    }

    /// Origin of the wall rays.
    pub fn wall_origin(&self, config: &LocomotionConfig) -> Vec3 {
        self.center + Vec3::Y * config.wall_probe_height * self.scale.y.abs()
    }

    /// Maximum wall ray length.
    pub fn wall_check_distance(&self, config: &LocomotionConfig) -> f32 {
        config.wall_check_distance * self.scale.x.abs()
    }
}

/// What the probes found this step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Surroundings {
    /// Ground overlap result.
    pub grounded: bool,
    /// Adjacent wall, if any.
    pub wall: Option<WallContact>,
}

/// Run the ground and wall probes for one character.
///
/// `attached_wall` is the normal of the wall the character is currently
/// running on. While attached, a single ray is cast back into that wall;
/// otherwise rays go along `+right`, then `-right`.
pub fn sense_surroundings<Q: PhysicsQueries + ?Sized>(
    queries: &Q,
    frame: &ProbeFrame,
    config: &LocomotionConfig,
    attached_wall: Option<Vec3>,
) -> Surroundings {
    let (ground_center, ground_radius) = frame.ground_probe(config);
    let grounded = queries.overlap_sphere(ground_center, ground_radius, config.ground_layers);

    Surroundings {
        grounded,
        wall: detect_wall(queries, frame, config, attached_wall),
    }
}

/// Run only the wall probe.
pub fn detect_wall<Q: PhysicsQueries + ?Sized>(
    queries: &Q,
    frame: &ProbeFrame,
    config: &LocomotionConfig,
    attached_wall: Option<Vec3>,
) -> Option<WallContact> {
    let origin = frame.wall_origin(config);
    let max_distance = frame.wall_check_distance(config);
    if max_distance <= 0.0 {
        return None;
    }

    let cast = |direction: Vec3| {
        if direction == Vec3::ZERO {
            return None;
        }
        queries
            .raycast(origin, direction, max_distance, config.wall_layers)
            .map(|hit| WallContact::from_hit(hit, frame.right))
    };

    match attached_wall {
        Some(normal) => cast(-normal.normalize_or_zero()),
        None => cast(frame.right).or_else(|| cast(-frame.right)),
    }
}
