//! Smoke tests for the Rapier3D backend.

#![cfg(feature = "rapier3d")]

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use fps_locomotion::prelude::*;

fn create_test_app() -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins);
    app.add_plugins(TransformPlugin);
    app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default());
    app.add_plugins(FirstPersonControllerPlugin::<Rapier3dBackend>::default());
    app.insert_resource(Time::<Fixed>::from_hz(60.0));

    app.finish();
    app.cleanup();
    app
}

fn spawn_ground(app: &mut App) -> Entity {
    app.world_mut()
        .spawn((
            Transform::from_xyz(0.0, -0.5, 0.0),
            RigidBody::Fixed,
            Collider::cuboid(50.0, 0.5, 50.0),
        ))
        .id()
}

fn spawn_wall(app: &mut App, x: f32) -> Entity {
    app.world_mut()
        .spawn((
            Transform::from_xyz(x, 2.5, 0.0),
            RigidBody::Fixed,
            Collider::cuboid(0.5, 5.0, 5.0),
        ))
        .id()
}

/// Let Rapier register the colliders and transforms propagate.
fn settle(app: &mut App) {
    for _ in 0..3 {
        app.update();
    }
}

fn spawn_character(app: &mut App, position: Vec3) -> Entity {
    let world = app.world_mut();
    let pivot = world.spawn(Transform::from_xyz(0.0, 0.7, 0.0)).id();
    world
        .spawn((
            Transform::from_translation(position),
            FirstPersonController::new(pivot),
            LocomotionConfig::player(),
            Rapier3dCharacterBundle::new(),
            Collider::capsule_y(0.5, 0.4),
        ))
        .id()
}

#[test]
fn rapier_character_initializes() {
    let mut app = create_test_app();
    spawn_ground(&mut app);
    let character = spawn_character(&mut app, Vec3::new(0.0, 1.0, 0.0));

    app.update();
    app.world_mut().run_schedule(FixedUpdate);

    let world = app.world();
    assert!(world.get::<LocomotionState>(character).is_some());
    let markers = [
        world.get::<Grounded>(character).is_some(),
        world.get::<Airborne>(character).is_some(),
        world.get::<WallRunning>(character).is_some(),
    ];
    assert_eq!(markers.iter().filter(|m| **m).count(), 1);
}

#[test]
fn forward_intent_queues_kinematic_translation() {
    let mut app = create_test_app();
    spawn_ground(&mut app);
    let character = spawn_character(&mut app, Vec3::new(0.0, 1.0, 0.0));
    app.update();

    app.world_mut()
        .get_mut::<LocomotionIntent>(character)
        .expect("intent")
        .set_movement(Vec2::Y);
    app.world_mut().run_schedule(FixedUpdate);

    let translation = app
        .world()
        .get::<KinematicCharacterController>(character)
        .and_then(|controller| controller.translation)
        .expect("a translation is queued");
    println!("PROOF: queued translation = {translation}");
    assert!(translation.z < 0.0, "moves toward -Z");
    assert!(translation.y < 0.0, "pressed toward the ground");
}

#[test]
fn rapier_queries_detect_floor_and_wall() {
    let mut app = create_test_app();
    spawn_ground(&mut app);
    spawn_wall(&mut app, 1.3);
    let character = spawn_character(&mut app, Vec3::new(0.0, 0.95, 0.0));

    settle(&mut app);
    app.world_mut().run_schedule(FixedUpdate);

    let world = app.world();
    let mover = world.get::<KinematicMover>(character).expect("mover");
    let contact = world
        .get::<WallSensor>(character)
        .and_then(|sensor| sensor.contact)
        .expect("wall beside the character");
    println!("PROOF: grounded={} wall={contact:?}", mover.is_resting_on_ground());

    assert!(mover.is_resting_on_ground());
    assert!(world.get::<Grounded>(character).is_some());
    assert!(contact.normal.abs_diff_eq(Vec3::NEG_X, 1e-3));
    assert_eq!(contact.side, WallSide::Right);
    assert!((contact.distance - 0.8).abs() < 0.05);
}

#[test]
fn airborne_forward_into_wall_starts_wall_run() {
    let mut app = create_test_app();
    spawn_ground(&mut app);
    spawn_wall(&mut app, 1.3);
    let character = spawn_character(&mut app, Vec3::new(0.0, 3.0, 0.0));

    settle(&mut app);
    app.world_mut()
        .get_mut::<LocomotionIntent>(character)
        .expect("intent")
        .set_movement(Vec2::Y);
    app.world_mut().run_schedule(FixedUpdate);

    let world = app.world();
    let state = world.get::<LocomotionState>(character).expect("state");
    assert!(state.is_wall_running(), "mode = {:?}", state.mode);
    let marker = world.get::<WallRunning>(character).expect("wall-run marker");
    assert!(marker.normal.abs_diff_eq(Vec3::NEG_X, 1e-3));
    assert!(world.get::<Airborne>(character).is_none());
}
