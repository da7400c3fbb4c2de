//! Tether Runtime
//!
//! Boots a world from settings, builds a small scene and steps it.
//!
//! Usage: `tether [settings.json] [steps]`

use anyhow::{Context, Result};
use tether_world::math::Vec3;
use tether_world::{ColliderDesc, JointData, RigidBodyDesc, World, WorldSettings};
use tracing_subscriber::EnvFilter;

const DEFAULT_STEPS: u32 = 120;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Tether v{}", tether_core::VERSION);

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => WorldSettings::load(&path)
            .with_context(|| format!("loading settings from {path}"))?,
        None => WorldSettings::default(),
    };
    let steps = match args.next() {
        Some(text) => text
            .parse::<u32>()
            .with_context(|| format!("step count `{text}` is not a number"))?,
        None => DEFAULT_STEPS,
    };

    let mut world = World::new(settings);
    let scene = build_scene(&mut world)?;
    tracing::info!(
        bodies = world.bodies().len(),
        colliders = world.colliders().len(),
        impulse_joints = world.impulse_joints().len(),
        multibody_joints = world.multibody_joints().len(),
        "scene ready"
    );

    for _ in 0..steps {
        world.step();
    }

    if let Some(translation) = scene.ball.translation() {
        tracing::info!(
            x = translation.x,
            y = translation.y,
            z = translation.z,
            sleeping = scene.ball.is_sleeping(),
            "ball after {steps} steps"
        );
    }
    if let Some(translation) = scene.pendulum.translation() {
        tracing::info!(y = translation.y, "pendulum bob");
    }

    let snapshot = world.take_snapshot()?;
    let restored = World::restore_snapshot(&snapshot)?;
    tracing::info!(
        bytes = snapshot.len(),
        bodies = restored.bodies().len(),
        "snapshot round trip"
    );

    world.remove_rigid_body(scene.ground);
    tracing::info!(
        bodies = world.bodies().len(),
        colliders = world.colliders().len(),
        "ground removed"
    );

    tracing::info!(
        avg_ms = world.step_timer().step_time_ms(),
        worst_ms = world.step_timer().worst_step_ms(),
        total = world.step_timer().total_steps(),
        "step timing"
    );
    for (name, value) in world.counters().iter() {
        tracing::debug!(name, value, "counter");
    }

    Ok(())
}

struct Scene {
    ground: tether_world::RigidBodyHandle,
    ball: tether_world::RigidBody,
    pendulum: tether_world::RigidBody,
}

fn build_scene(world: &mut World) -> Result<Scene> {
    let ground = world.create_rigid_body(&RigidBodyDesc::fixed())?;
    world.create_collider(&ColliderDesc::cuboid(10.0, 0.1, 10.0), Some(ground.handle()))?;

    let ball = world.create_rigid_body(
        &RigidBodyDesc::dynamic()
            .with_translation(Vec3::new(0.0, 5.0, 0.0)),
    )?;
    world.create_collider(
        &ColliderDesc::ball(0.5).with_restitution(0.3),
        Some(ball.handle()),
    )?;

    let pivot = world.create_rigid_body(
        &RigidBodyDesc::kinematic_velocity_based().with_translation(Vec3::new(3.0, 4.0, 0.0)),
    )?;
    let pendulum = world.create_rigid_body(
        &RigidBodyDesc::dynamic().with_translation(Vec3::new(3.0, 3.0, 0.0)),
    )?;
    world.create_collider(&ColliderDesc::capsule(0.25, 0.1), Some(pendulum.handle()))?;
    let hinge = world.create_impulse_joint(
        &JointData::revolute(Vec3::Z).with_anchor2(Vec3::new(0.0, 1.0, 0.0)),
        pivot.handle(),
        pendulum.handle(),
        true,
    )?;
    hinge.set_limits(-1.0, 1.0)?;
    hinge.configure_motor_velocity(0.5, 0.2)?;

    let arm = world.create_rigid_body(
        &RigidBodyDesc::dynamic().with_translation(Vec3::new(3.0, 2.0, 0.0)),
    )?;
    world.create_multibody_joint(
        &JointData::prismatic(Vec3::Y).with_limits(-0.5, 0.5),
        pendulum.handle(),
        arm.handle(),
        true,
    )?;

    Ok(Scene {
        ground: ground.handle(),
        ball,
        pendulum,
    })
}
