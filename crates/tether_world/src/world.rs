//! World: the four entity families plus the stepping pipeline

use crate::dynamics::{RigidBody, RigidBodyDesc, RigidBodySet};
use crate::error::WorldError;
use crate::geometry::{Collider, ColliderDesc, ColliderSet};
use crate::joints::{ImpulseJoint, ImpulseJointSet, JointData, MultibodyJoint, MultibodyJointSet};
use crate::marshal::raw_vector;
use crate::settings::WorldSettings;
use tether_core::math::Vec3;
use tether_core::{ColliderHandle, ImpulseJointHandle, MultibodyJointHandle, RigidBodyHandle};
use tether_engine::{RawPhysicsPipeline, RawSerializationPipeline};
use tether_metrics::{Counter, StepTimer};

/// A physics world.
///
/// Owns one resource set per entity family and coordinates operations that
/// span families, such as removing a body together with its colliders and
/// joints.
pub struct World {
    settings: WorldSettings,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    pipeline: RawPhysicsPipeline,
    step_timer: StepTimer,
    counters: Counter,
}

impl World {
    pub fn new(settings: WorldSettings) -> Self {
        let step_timer = StepTimer::new(settings.metrics.step_window.max(1));
        Self {
            settings,
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            pipeline: RawPhysicsPipeline::new(),
            step_timer,
            counters: Counter::new(),
        }
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    pub fn create_rigid_body(&mut self, desc: &RigidBodyDesc) -> Result<RigidBody, WorldError> {
        let body = self.bodies.create(desc).inspect_err(|err| {
            tracing::warn!(%err, "rigid body rejected by engine");
        })?;
        self.counters.increment("rigid_bodies_created", 1);
        Ok(body)
    }

    /// Create a collider, attached to `parent` when given.
    pub fn create_collider(
        &mut self,
        desc: &ColliderDesc,
        parent: Option<RigidBodyHandle>,
    ) -> Result<Collider, WorldError> {
        let collider = self
            .colliders
            .create(desc, parent, &self.bodies)
            .inspect_err(|err| {
                tracing::warn!(%err, "collider rejected by engine");
            })?;
        self.counters.increment("colliders_created", 1);
        Ok(collider)
    }

    pub fn create_impulse_joint(
        &mut self,
        data: &JointData,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        wake_up: bool,
    ) -> Result<ImpulseJoint, WorldError> {
        let joint = self
            .impulse_joints
            .create(data, body1, body2, wake_up, &self.bodies)
            .inspect_err(|err| {
                tracing::warn!(%err, "impulse joint rejected by engine");
            })?;
        self.counters.increment("impulse_joints_created", 1);
        Ok(joint)
    }

    /// Link `body2` to `body1` as its multibody parent.
    pub fn create_multibody_joint(
        &mut self,
        data: &JointData,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        wake_up: bool,
    ) -> Result<MultibodyJoint, WorldError> {
        let joint = self
            .multibody_joints
            .create(data, body1, body2, wake_up, &self.bodies)
            .inspect_err(|err| {
                tracing::warn!(%err, "multibody joint rejected by engine");
            })?;
        self.counters.increment("multibody_joints_created", 1);
        Ok(joint)
    }

    // ------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------

    /// Remove a body together with its colliders and joints.
    ///
    /// Returns `None` when the handle is unknown or stale.
    pub fn remove_rigid_body(&mut self, handle: RigidBodyHandle) -> Option<RigidBody> {
        let removed = self.bodies.remove(
            handle,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
        )?;
        self.counters.increment("rigid_bodies_removed", 1);
        Some(removed)
    }

    pub fn remove_collider(&mut self, handle: ColliderHandle, wake_up: bool) -> Option<Collider> {
        let removed = self.colliders.remove(handle, &self.bodies, wake_up)?;
        self.counters.increment("colliders_removed", 1);
        Some(removed)
    }

    pub fn remove_impulse_joint(
        &mut self,
        handle: ImpulseJointHandle,
        wake_up: bool,
    ) -> Option<ImpulseJoint> {
        let removed = self.impulse_joints.remove(handle, wake_up, &self.bodies)?;
        self.counters.increment("impulse_joints_removed", 1);
        Some(removed)
    }

    pub fn remove_multibody_joint(
        &mut self,
        handle: MultibodyJointHandle,
        wake_up: bool,
    ) -> Option<MultibodyJoint> {
        let removed = self
            .multibody_joints
            .remove(handle, wake_up, &self.bodies)?;
        self.counters.increment("multibody_joints_removed", 1);
        Some(removed)
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    pub fn get_rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub fn get_collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.colliders.get(handle)
    }

    pub fn get_impulse_joint(&self, handle: ImpulseJointHandle) -> Option<&ImpulseJoint> {
        self.impulse_joints.get(handle)
    }

    pub fn get_multibody_joint(&self, handle: MultibodyJointHandle) -> Option<&MultibodyJoint> {
        self.multibody_joints.get(handle)
    }

    pub fn bodies(&self) -> &RigidBodySet {
        &self.bodies
    }

    pub fn colliders(&self) -> &ColliderSet {
        &self.colliders
    }

    pub fn impulse_joints(&self) -> &ImpulseJointSet {
        &self.impulse_joints
    }

    pub fn multibody_joints(&self) -> &MultibodyJointSet {
        &self.multibody_joints
    }

    // ------------------------------------------------------------------
    // Simulation
    // ------------------------------------------------------------------

    /// Advance the engine by one timestep.
    ///
    /// Registries are untouched: every cached wrapper stays valid and keeps
    /// its identity.
    pub fn step(&mut self) {
        let gravity = raw_vector(self.settings.gravity);
        let params = self.settings.integration_parameters();
        let pipeline = &mut self.pipeline;
        let bodies = &self.bodies;
        let colliders = &self.colliders;
        let impulse_joints = &self.impulse_joints;
        let multibody_joints = &self.multibody_joints;

        self.step_timer.time(|| {
            pipeline.step(
                &gravity,
                &params,
                &mut bodies.raw().borrow_mut(),
                &mut colliders.raw().borrow_mut(),
                &mut impulse_joints.raw().borrow_mut(),
                &mut multibody_joints.raw().borrow_mut(),
            );
        });
        self.counters.increment("steps", 1);
    }

    /// Steps taken by this world's pipeline.
    pub fn steps(&self) -> u64 {
        self.pipeline.steps()
    }

    pub fn gravity(&self) -> Vec3 {
        self.settings.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.settings.gravity = gravity;
    }

    pub fn timestep(&self) -> f32 {
        self.settings.integration.timestep
    }

    pub fn set_timestep(&mut self, timestep: f32) {
        self.settings.integration.timestep = timestep;
    }

    pub fn step_timer(&self) -> &StepTimer {
        &self.step_timer
    }

    pub fn counters(&self) -> &Counter {
        &self.counters
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    /// Serialize the engine state of every family.
    pub fn take_snapshot(&self) -> Result<Vec<u8>, WorldError> {
        let gravity = raw_vector(self.settings.gravity);
        let bytes = RawSerializationPipeline::new().serialize_all(
            &gravity,
            &self.settings.integration_parameters(),
            &self.bodies.raw().borrow(),
            &self.colliders.raw().borrow(),
            &self.impulse_joints.raw().borrow(),
            &self.multibody_joints.raw().borrow(),
        )?;
        tracing::debug!(bytes = bytes.len(), "snapshot taken");
        Ok(bytes)
    }

    /// Build a new world from a snapshot.
    ///
    /// Every family is rehydrated: each handle present in the snapshot has a
    /// cached wrapper before the world is returned. Handles taken before the
    /// snapshot keep addressing the same entities.
    pub fn restore_snapshot(bytes: &[u8]) -> Result<World, WorldError> {
        let restored = RawSerializationPipeline::new().deserialize_all(bytes)?;
        let gravity = restored.gravity();

        let mut settings = WorldSettings {
            gravity: Vec3::new(gravity.x(), gravity.y(), gravity.z()),
            ..WorldSettings::default()
        };
        drop(gravity);
        settings.apply_integration_parameters(&restored.params);

        let mut world = World::new(settings);
        world.bodies = RigidBodySet::from_raw(restored.bodies);
        world.colliders = ColliderSet::from_raw(restored.colliders);
        world.impulse_joints = ImpulseJointSet::from_raw(restored.impulse_joints);
        world.multibody_joints = MultibodyJointSet::from_raw(restored.multibody_joints);
        tracing::debug!(
            bodies = world.bodies.len(),
            colliders = world.colliders.len(),
            impulse_joints = world.impulse_joints.len(),
            multibody_joints = world.multibody_joints.len(),
            "snapshot restored"
        );
        Ok(world)
    }

    /// Remove every entity from the engine and every cached wrapper.
    ///
    /// Wrappers handed out earlier stay usable but report their entity as
    /// gone.
    pub fn clear(&mut self) {
        self.multibody_joints.clear();
        self.impulse_joints.clear();
        self.colliders.clear(&self.bodies);
        self.bodies
            .clear(&self.colliders, &self.impulse_joints, &self.multibody_joints);
        tracing::debug!("world cleared");
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joints::JointType;
    use tether_core::EntityHandle;
    use tether_engine::live_scratch_values;

    fn body_at(world: &mut World, y: f32) -> RigidBody {
        world
            .create_rigid_body(&RigidBodyDesc::dynamic().with_translation(Vec3::new(0.0, y, 0.0)))
            .unwrap()
    }

    #[test]
    fn ten_steps_keep_wrapper_identity() {
        let mut world = World::default();
        let body = body_at(&mut world, 10.0);
        let first: *const RigidBody = world.get_rigid_body(body.handle()).unwrap();

        for _ in 0..10 {
            world.step();
            let current: *const RigidBody = world.get_rigid_body(body.handle()).unwrap();
            assert!(std::ptr::eq(first, current));
        }

        assert_eq!(world.steps(), 10);
        assert_eq!(world.bodies().len(), 1);
        assert!(body.translation().unwrap().y < 10.0);
    }

    #[test]
    fn removing_a_body_cascades_to_dependents() {
        let mut world = World::default();
        let a = body_at(&mut world, 0.0);
        let b = body_at(&mut world, 1.0);
        let on_a = world
            .create_collider(&ColliderDesc::ball(0.5), Some(a.handle()))
            .unwrap();
        let on_b = world
            .create_collider(&ColliderDesc::ball(0.5), Some(b.handle()))
            .unwrap();
        let hinge = world
            .create_impulse_joint(&JointData::revolute(Vec3::Z), a.handle(), b.handle(), true)
            .unwrap();
        let link = world
            .create_multibody_joint(&JointData::fixed(), a.handle(), b.handle(), true)
            .unwrap();

        assert_eq!(world.remove_rigid_body(a.handle()), Some(a.clone()));

        assert!(world.get_rigid_body(a.handle()).is_none());
        assert!(world.get_collider(on_a.handle()).is_none());
        assert!(world.get_impulse_joint(hinge.handle()).is_none());
        assert!(world.get_multibody_joint(link.handle()).is_none());
        assert!(!on_a.is_valid());
        assert!(!hinge.is_valid());

        assert_eq!(world.bodies().len(), 1);
        assert_eq!(world.colliders().len(), 1);
        assert!(world.impulse_joints().is_empty());
        assert!(world.multibody_joints().is_empty());
        assert_eq!(world.get_collider(on_b.handle()), Some(&on_b));

        assert_eq!(world.remove_rigid_body(a.handle()), None);
    }

    #[test]
    fn rejected_creation_leaves_no_entry() {
        let mut world = World::default();
        let before = live_scratch_values();
        let err = world
            .create_collider(&ColliderDesc::cuboid(1.0, -1.0, 1.0), None)
            .unwrap_err();
        assert!(matches!(err, WorldError::Engine(_)));
        assert!(world.colliders().is_empty());
        assert_eq!(live_scratch_values(), before);
    }

    #[test]
    fn snapshot_restores_every_family() {
        let mut world = World::default();
        world.set_gravity(Vec3::new(0.0, -1.0, 0.0));
        let a = body_at(&mut world, 0.0);
        let b = body_at(&mut world, 2.0);
        let ball = world
            .create_collider(&ColliderDesc::ball(0.5), Some(b.handle()))
            .unwrap();
        let hinge = world
            .create_impulse_joint(&JointData::revolute(Vec3::X), a.handle(), b.handle(), true)
            .unwrap();
        world.step();

        let bytes = world.take_snapshot().unwrap();
        let restored = World::restore_snapshot(&bytes).unwrap();

        assert_eq!(restored.gravity(), Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(restored.bodies().len(), 2);
        assert_eq!(restored.colliders().len(), 1);
        assert_eq!(restored.impulse_joints().len(), 1);

        let restored_b = restored.get_rigid_body(b.handle()).unwrap();
        let (before, after) = (b.translation().unwrap(), restored_b.translation().unwrap());
        assert!(before.abs_diff_eq(after, 1.0e-6));
        let restored_ball = restored.get_collider(ball.handle()).unwrap();
        assert_eq!(restored_ball.parent(), Some(b.handle()));
        let restored_hinge = restored.get_impulse_joint(hinge.handle()).unwrap();
        assert_eq!(restored_hinge.joint_type(), Some(JointType::Revolute));
        assert_eq!(restored_hinge.body1(), Some(a.handle()));
    }

    #[test]
    fn corrupt_snapshot_is_an_engine_error() {
        assert!(matches!(
            World::restore_snapshot(b"{}"),
            Err(WorldError::Engine(_))
        ));
    }

    #[test]
    fn clear_empties_every_family() {
        let mut world = World::default();
        let a = body_at(&mut world, 0.0);
        let b = body_at(&mut world, 1.0);
        let ball = world
            .create_collider(&ColliderDesc::ball(0.5), Some(a.handle()))
            .unwrap();
        world
            .create_impulse_joint(&JointData::fixed(), a.handle(), b.handle(), true)
            .unwrap();

        world.clear();

        assert!(world.bodies().is_empty());
        assert!(world.colliders().is_empty());
        assert!(world.impulse_joints().is_empty());
        assert!(!world.bodies().contains(a.handle()));
        assert_eq!(a.translation(), None);
        assert_eq!(ball.parent(), None);

        // The slot comes back under a new generation.
        let fresh = body_at(&mut world, 9.0);
        assert_eq!(fresh.handle().index(), a.handle().index());
        assert_ne!(fresh.handle(), a.handle());
        assert_eq!(world.get_rigid_body(fresh.handle()), Some(&fresh));
    }

    #[test]
    fn handles_from_before_a_clear_stay_dead() {
        let mut world = World::default();
        let old = body_at(&mut world, 1.0);
        let old_ball = world
            .create_collider(&ColliderDesc::ball(0.5), Some(old.handle()))
            .unwrap();
        let anchor = body_at(&mut world, 2.0);
        let old_joint = world
            .create_impulse_joint(&JointData::fixed(), old.handle(), anchor.handle(), true)
            .unwrap();

        world.clear();

        let new = world
            .create_rigid_body(&RigidBodyDesc::dynamic().with_translation(Vec3::new(9.0, 0.0, 0.0)))
            .unwrap();
        let other = body_at(&mut world, 3.0);
        let new_ball = world
            .create_collider(&ColliderDesc::ball(0.5), Some(new.handle()))
            .unwrap();
        let new_joint = world
            .create_impulse_joint(&JointData::fixed(), new.handle(), other.handle(), true)
            .unwrap();

        assert!(!world.bodies().contains(old.handle()));
        assert!(world.get_rigid_body(old.handle()).is_none());
        assert_eq!(old.translation(), None);
        assert_eq!(new.translation(), Some(Vec3::new(9.0, 0.0, 0.0)));

        assert_ne!(old_ball.handle(), new_ball.handle());
        assert!(world.get_collider(old_ball.handle()).is_none());
        assert_eq!(old_ball.parent(), None);

        assert_ne!(old_joint.handle(), new_joint.handle());
        assert!(world.get_impulse_joint(old_joint.handle()).is_none());
        assert_eq!(old_joint.body1(), None);

        // A stale handle must not evict the entity now in its slot.
        assert!(world.remove_rigid_body(old.handle()).is_none());
        assert_eq!(world.get_rigid_body(new.handle()), Some(&new));
    }

    #[test]
    fn timestep_controls_integration() {
        let mut world = World::default();
        world.set_gravity(Vec3::ZERO);
        world.set_timestep(0.5);
        let body = world
            .create_rigid_body(&RigidBodyDesc::dynamic().with_linvel(Vec3::X))
            .unwrap();

        world.step();
        assert_eq!(world.timestep(), 0.5);
        assert_eq!(body.translation(), Some(Vec3::new(0.5, 0.0, 0.0)));
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn counters_track_lifecycle() {
        let mut world = World::default();
        let body = body_at(&mut world, 0.0);
        world.remove_rigid_body(body.handle());
        world.remove_rigid_body(body.handle());
        world.step();

        assert_eq!(world.counters().get("rigid_bodies_created"), 1);
        assert_eq!(world.counters().get("rigid_bodies_removed"), 1);
        assert_eq!(world.counters().get("steps"), 1);
        assert_eq!(world.step_timer().total_steps(), 1);
    }
}
