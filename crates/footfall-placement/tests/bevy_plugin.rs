//! Integration test: foot placement inside a Bevy app.
//!
//! Spawns a biped as a `Transform`/`ChildOf` hierarchy and checks that the
//! plugin binds it, solves the legs onto the ground backend, moves the
//! collider center and hands the solved pose to transform propagation.

use approx::assert_relative_eq;
use bevy::app::Plugins;
use bevy::ecs::system::SystemState;
use bevy::prelude::*;
use bevy::transform::TransformPlugin;

use footfall_core::{Foot, FootPlacementConfig, LimbJoints, PoseRig};
use footfall_placement::{
    ColliderCenter, FootPlacementPlugin, FootPlacementSetup, FootPlacementState, GroundBackend,
};
use footfall_rig::{GroundPatch, RigQuery, Terrain, TransformRig, XzBounds};

struct SpawnedBiped {
    body: Entity,
    left: LimbJoints<Entity>,
    right: LimbJoints<Entity>,
}

fn spawn_leg(world: &mut World, body: Entity, hips: Entity, x: f32) -> LimbJoints<Entity> {
    let thigh = world
        .spawn((Transform::from_xyz(x, 0.0, 0.0), ChildOf(hips)))
        .id();
    let calf = world
        .spawn((Transform::from_xyz(0.0, -0.45, 0.0), ChildOf(thigh)))
        .id();
    let foot = world
        .spawn((Transform::from_xyz(0.0, -0.45, 0.0), ChildOf(calf)))
        .id();
    let hint = world
        .spawn((Transform::from_xyz(x, 0.55, 0.5), ChildOf(body)))
        .id();
    LimbJoints::new(thigh, calf, foot, hint)
}

fn spawn_biped(world: &mut World) -> SpawnedBiped {
    let body = world.spawn(Transform::IDENTITY).id();
    let hips = world
        .spawn((Transform::from_xyz(0.0, 1.0, 0.0), ChildOf(body)))
        .id();
    let left = spawn_leg(world, body, hips, 0.1);
    let right = spawn_leg(world, body, hips, -0.1);
    SpawnedBiped { body, left, right }
}

fn test_app(plugin: FootPlacementPlugin, ground: Terrain) -> App {
    build_app((MinimalPlugins, plugin), ground)
}

fn build_app<M>(plugins: impl Plugins<M>, ground: Terrain) -> App {
    let mut app = App::new();
    app.add_plugins(plugins);
    app.insert_resource(FootPlacementConfig {
        smooth_rate: 1.0,
        ..Default::default()
    });
    app.insert_resource(GroundBackend::new(ground));
    app.finish();
    app.cleanup();
    app
}

fn world_position(app: &mut App, entity: Entity) -> Vec3 {
    let mut state: SystemState<RigQuery> = SystemState::new(app.world_mut());
    let mut query = state.get_mut(app.world_mut());
    let rig = TransformRig::new(&mut query);
    let p = rig.world_position(entity);
    Vec3::new(p.x, p.y, p.z)
}

#[test]
fn plugin_binds_and_places_feet() {
    let mut app = test_app(FootPlacementPlugin::default(), Terrain::flat(0.3));
    let biped = spawn_biped(app.world_mut());
    app.world_mut()
        .entity_mut(biped.body)
        .insert(FootPlacementSetup::new(biped.left, biped.right));

    app.update();
    app.update();

    let world = app.world();
    assert!(world.get::<FootPlacementSetup>(biped.body).is_none());
    let state = world
        .get::<FootPlacementState>(biped.body)
        .expect("character bound");
    let record = state
        .0
        .observer()
        .record(Foot::Left)
        .expect("left foot probed");
    assert!(record.hit.is_some());

    for tip in [biped.left.tip, biped.right.tip] {
        assert_relative_eq!(world_position(&mut app, tip).y, 0.4, epsilon = 1e-4);
    }
}

#[test]
fn manual_latch_holds_until_notified() {
    let mut app = test_app(FootPlacementPlugin { auto_latch: false }, Terrain::flat(0.3));
    let biped = spawn_biped(app.world_mut());
    app.world_mut()
        .entity_mut(biped.body)
        .insert(FootPlacementSetup::new(biped.left, biped.right));

    app.update();
    app.update();
    assert_relative_eq!(world_position(&mut app, biped.left.tip).y, 0.1, epsilon = 1e-5);

    app.world_mut()
        .get_mut::<FootPlacementState>(biped.body)
        .expect("character bound")
        .0
        .notify_pose_ready();
    app.update();
    assert_relative_eq!(world_position(&mut app, biped.left.tip).y, 0.4, epsilon = 1e-4);
}

#[test]
fn collider_center_follows_body_height() {
    let low = GroundPatch::flat(0.0).with_bounds(XzBounds::new(0.0, 1.0, -1.0, 1.0));
    let high = GroundPatch::flat(0.2).with_bounds(XzBounds::new(-1.0, 0.0, -1.0, 1.0));
    let terrain = Terrain::new().with_patch(low).with_patch(high);
    let mut app = test_app(FootPlacementPlugin::default(), terrain);

    let biped = spawn_biped(app.world_mut());
    app.world_mut().entity_mut(biped.body).insert((
        FootPlacementSetup::new(biped.left, biped.right),
        ColliderCenter(Vec3::new(0.0, 0.9, 0.0)),
    ));

    app.update();
    let state = app
        .world()
        .get::<FootPlacementState>(biped.body)
        .expect("character bound");
    assert!(state.0.body_height().is_enabled());

    // Frame times come from the real clock, so only the relation between
    // offset, collider and root is checked.
    for _ in 0..3 {
        app.update();
    }

    let offset = app
        .world()
        .get::<FootPlacementState>(biped.body)
        .expect("character bound")
        .0
        .body_height()
        .offset();
    let center = app
        .world()
        .get::<ColliderCenter>(biped.body)
        .expect("collider kept");
    assert_relative_eq!(center.0.y, 0.9 + offset, epsilon = 1e-5);
    let body = app.world().get::<Transform>(biped.body).expect("body kept");
    assert_relative_eq!(body.translation.y, offset, epsilon = 1e-5);
}

#[test]
fn bad_rig_is_dropped() {
    let mut app = test_app(FootPlacementPlugin::default(), Terrain::flat(0.0));
    let biped = spawn_biped(app.world_mut());
    // Knee on top of the hip: degenerate thigh.
    let broken = LimbJoints::new(biped.left.root, biped.left.root, biped.left.tip, biped.left.hint);
    app.world_mut()
        .entity_mut(biped.body)
        .insert(FootPlacementSetup::new(broken, biped.right));

    app.update();

    let world = app.world();
    assert!(world.get::<FootPlacementSetup>(biped.body).is_none());
    assert!(world.get::<FootPlacementState>(biped.body).is_none());
}

#[test]
fn solved_pose_reaches_global_transform_same_frame() {
    let plugins = (
        MinimalPlugins,
        TransformPlugin,
        FootPlacementPlugin::default(),
    );
    let mut app = build_app(plugins, Terrain::flat(0.3));
    let biped = spawn_biped(app.world_mut());
    app.world_mut()
        .entity_mut(biped.body)
        .insert(FootPlacementSetup::new(biped.left, biped.right));

    app.update();

    for tip in [biped.left.tip, biped.right.tip] {
        let global = app
            .world()
            .get::<GlobalTransform>(tip)
            .expect("propagated transform");
        assert_relative_eq!(global.translation().y, 0.4, epsilon = 1e-4);
    }
}

#[test]
fn missing_joint_is_dropped() {
    let mut app = test_app(FootPlacementPlugin::default(), Terrain::flat(0.0));
    let biped = spawn_biped(app.world_mut());
    app.world_mut().despawn(biped.right.hint);
    app.world_mut()
        .entity_mut(biped.body)
        .insert(FootPlacementSetup::new(biped.left, biped.right));

    app.update();

    let world = app.world();
    assert!(world.get::<FootPlacementSetup>(biped.body).is_none());
    assert!(world.get::<FootPlacementState>(biped.body).is_none());
}
