//! Shared test harness: a deterministic physics backend over a scripted
//! world of one floor and any number of infinite vertical walls.

#![allow(dead_code)]

use bevy::prelude::*;
use fps_locomotion::detection::{sense_surroundings, ProbeFrame};
use fps_locomotion::prelude::*;

/// Distance from the body centre to its feet.
pub const HALF_HEIGHT: f32 = 1.0;

/// Horizontal body radius used for wall penetration.
pub const RADIUS: f32 = 0.4;

/// Infinite vertical plane.
#[derive(Debug, Clone, Copy)]
pub struct WallPlane {
    pub point: Vec3,
    /// Outward normal, facing the open side.
    pub normal: Vec3,
}

/// Scripted level geometry.
#[derive(Resource, Debug, Clone, Default)]
pub struct TestWorld {
    pub floor: Option<f32>,
    pub walls: Vec<WallPlane>,
}

impl PhysicsQueries for TestWorld {
    fn overlap_sphere(&self, center: Vec3, radius: f32, _layers: u32) -> bool {
        self.floor.is_some_and(|floor| center.y - radius <= floor)
    }

    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        _layers: u32,
    ) -> Option<CollisionData> {
        self.walls
            .iter()
            .filter_map(|wall| {
                let facing = direction.dot(wall.normal);
                if facing >= 0.0 {
                    return None;
                }
                let distance = (wall.point - origin).dot(wall.normal) / facing;
                (0.0..=max_distance).contains(&distance).then(|| {
                    CollisionData::new(distance, wall.normal, origin + direction * distance, None)
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

/// Marks a body the test backend may move.
#[derive(Component, Debug, Default)]
pub struct TestBody;

/// Backend that moves `Transform` directly and keeps bodies out of the
/// floor and walls.
pub struct TestBackend;

impl LocomotionBackend for TestBackend {
    type MoverComponent = TestBody;

    fn plugin() -> impl Plugin {
        TestBackendPlugin
    }

    fn apply_displacement(world: &mut World, entity: Entity, displacement: Vec3) {
        let geometry = world.resource::<TestWorld>().clone();
        let Some(mut transform) = world.get_mut::<Transform>(entity) else {
            return;
        };

        let mut position = transform.translation + displacement;
        if let Some(floor) = geometry.floor {
            position.y = position.y.max(floor + HALF_HEIGHT);
        }
        for wall in &geometry.walls {
            let depth = (position - wall.point).dot(wall.normal);
            if depth < RADIUS {
                position += wall.normal * (RADIUS - depth);
            }
        }
        transform.translation = position;
    }
}

struct TestBackendPlugin;

impl Plugin for TestBackendPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TestWorld>();
        app.add_systems(FixedUpdate, sense_test_world.in_set(LocomotionSet::Sensors));
    }
}

fn sense_test_world(
    geometry: Res<TestWorld>,
    mut q_controllers: Query<
        (
            &Transform,
            &LocomotionConfig,
            &LocomotionState,
            &mut KinematicMover,
            &mut WallSensor,
        ),
        With<FirstPersonController>,
    >,
) {
    for (transform, config, state, mut mover, mut sensor) in &mut q_controllers {
        // No transform propagation when running FixedUpdate by hand.
        let frame = ProbeFrame::new(
            transform.translation,
            transform.rotation * Vec3::X,
            transform.scale,
        );
        let surroundings = sense_surroundings(&*geometry, &frame, config, state.wall_normal());
        mover.set_resting_on_ground(surroundings.grounded);
        sensor.contact = surroundings.wall;
    }
}

/// Create a headless app with the controller and the test backend.
pub fn create_test_app(geometry: TestWorld) -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins);
    app.add_plugins(FirstPersonControllerPlugin::<TestBackend>::default());
    app.insert_resource(geometry);

    app.finish();
    app.cleanup();
    app
}

/// Flat floor at `y = 0`.
pub fn flat_floor() -> TestWorld {
    TestWorld {
        floor: Some(0.0),
        walls: Vec::new(),
    }
}

/// Flat floor plus a wall along `x = wall_x`, facing `-X`.
pub fn floor_with_right_wall(wall_x: f32) -> TestWorld {
    TestWorld {
        floor: Some(0.0),
        walls: vec![WallPlane {
            point: Vec3::new(wall_x, 0.0, 0.0),
            normal: Vec3::NEG_X,
        }],
    }
}

/// Spawn a camera pivot and a character using it.
pub fn spawn_character(app: &mut App, position: Vec3, config: LocomotionConfig) -> (Entity, Entity) {
    spawn_character_with_transform(app, Transform::from_translation(position), config)
}

/// Spawn a character with an arbitrary transform.
pub fn spawn_character_with_transform(
    app: &mut App,
    transform: Transform,
    config: LocomotionConfig,
) -> (Entity, Entity) {
    let world = app.world_mut();
    let pivot = world.spawn(Transform::from_xyz(0.0, 0.7, 0.0)).id();
    let character = world
        .spawn((transform, FirstPersonController::new(pivot), config, TestBody))
        .id();
    (character, pivot)
}

/// Run one fixed step.
pub fn step(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
}

/// Run `n` fixed steps.
pub fn run_steps(app: &mut App, n: usize) {
    for _ in 0..n {
        step(app);
    }
}

/// Take every event written since the last call.
pub fn drain_events(app: &mut App) -> Vec<LocomotionEventKind> {
    app.world_mut()
        .resource_mut::<Events<LocomotionEvent>>()
        .drain()
        .map(|event| event.kind)
        .collect()
}

/// Mutate a character's intent.
pub fn with_intent(app: &mut App, entity: Entity, f: impl FnOnce(&mut LocomotionIntent)) {
    let mut intent = app
        .world_mut()
        .get_mut::<LocomotionIntent>(entity)
        .expect("character has an intent");
    f(&mut intent);
}

pub fn translation(app: &App, entity: Entity) -> Vec3 {
    app.world()
        .get::<Transform>(entity)
        .expect("character has a transform")
        .translation
}

pub fn state(app: &App, entity: Entity) -> LocomotionState {
    *app.world()
        .get::<LocomotionState>(entity)
        .expect("character has a state")
}

/// Number of mode markers on the entity.
pub fn marker_count(app: &App, entity: Entity) -> usize {
    let world = app.world();
    [
        world.get::<Grounded>(entity).is_some(),
        world.get::<Airborne>(entity).is_some(),
        world.get::<WallRunning>(entity).is_some(),
    ]
    .into_iter()
    .filter(|present| *present)
    .count()
}
