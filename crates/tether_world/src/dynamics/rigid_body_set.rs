//! Rigid-body family set

use super::rigid_body::{RigidBody, RigidBodyDesc};
use crate::geometry::ColliderSet;
use crate::joints::{ImpulseJointSet, MultibodyJointSet};
use crate::marshal::{raw_rotation, raw_vector};
use crate::{shared, Shared};
use std::rc::Rc;
use tether_core::{ColliderHandle, EntityHandle, Registry, RigidBodyHandle};
use tether_engine::{EngineError, RawBodyInit, RawRigidBodySet};

/// Every rigid body of a world, with one cached wrapper per live body.
pub struct RigidBodySet {
    raw: Shared<RawRigidBodySet>,
    map: Registry<RigidBodyHandle, RigidBody>,
}

impl RigidBodySet {
    pub fn new() -> Self {
        Self {
            raw: shared(RawRigidBodySet::new()),
            map: Registry::new(),
        }
    }

    /// Wrap an engine set rebuilt from a snapshot.
    ///
    /// Every handle the engine reports gets a fresh wrapper before the set is
    /// returned.
    pub(crate) fn from_raw(raw: RawRigidBodySet) -> Self {
        let raw = shared(raw);
        let mut map = Registry::new();
        raw.borrow().for_each_handle(|bits| {
            let handle = RigidBodyHandle::from_raw(bits);
            map.set(handle, RigidBody::new(Rc::clone(&raw), handle));
        });
        tracing::debug!(count = map.len(), "rigid bodies rehydrated");
        Self { raw, map }
    }

    pub(crate) fn raw(&self) -> &Shared<RawRigidBodySet> {
        &self.raw
    }

    /// Create a body in the engine, then cache its wrapper.
    pub fn create(&mut self, desc: &RigidBodyDesc) -> Result<RigidBody, EngineError> {
        let translation = raw_vector(desc.translation);
        let rotation = raw_rotation(desc.rotation);
        let linvel = raw_vector(desc.linvel);
        let angvel = raw_vector(desc.angvel);

        let bits = self.raw.borrow_mut().create(RawBodyInit {
            body_type: desc.body_type.into(),
            translation: &translation,
            rotation: &rotation,
            linvel: &linvel,
            angvel: &angvel,
            gravity_scale: desc.gravity_scale,
            additional_mass: desc.additional_mass,
            can_sleep: desc.can_sleep,
            sleeping: desc.sleeping,
            enabled: desc.enabled,
            user_data: desc.user_data,
        })?;
        drop((translation, rotation, linvel, angvel));

        let handle = RigidBodyHandle::from_raw(bits);
        let body = RigidBody::new(Rc::clone(&self.raw), handle);
        self.map.set(handle, body.clone());
        tracing::debug!(%handle, body_type = ?desc.body_type, "rigid body created");
        Ok(body)
    }

    /// Remove a body from the engine, then evict it and every dependent
    /// collider and joint from their caches.
    ///
    /// Unknown or stale handles are ignored.
    pub fn remove(
        &mut self,
        handle: RigidBodyHandle,
        colliders: &mut ColliderSet,
        impulse_joints: &mut ImpulseJointSet,
        multibody_joints: &mut MultibodyJointSet,
    ) -> Option<RigidBody> {
        let bits = handle.to_raw();
        let attached: Vec<ColliderHandle> = {
            let raw = self.raw.borrow();
            if !raw.contains(bits) {
                return None;
            }
            let count = raw.rb_num_colliders(bits).unwrap_or(0);
            (0..count)
                .filter_map(|at| raw.rb_collider(bits, at))
                .map(ColliderHandle::from_raw)
                .collect()
        };
        let impulse = impulse_joints.attached_handles(handle);
        let multibody = multibody_joints.attached_handles(handle);

        self.raw.borrow_mut().remove(
            bits,
            &mut colliders.raw().borrow_mut(),
            &mut impulse_joints.raw().borrow_mut(),
            &mut multibody_joints.raw().borrow_mut(),
        );

        for collider in &attached {
            colliders.unmap(*collider);
        }
        for joint in &impulse {
            impulse_joints.unmap(*joint);
        }
        for joint in &multibody {
            multibody_joints.unmap(*joint);
        }
        let removed = self.map.delete(handle);
        tracing::debug!(
            %handle,
            colliders = attached.len(),
            impulse_joints = impulse.len(),
            multibody_joints = multibody.len(),
            "rigid body removed"
        );
        removed
    }

    /// Remove every body from the engine, with the same cascade as
    /// [`remove`](Self::remove), and drop every cached wrapper.
    ///
    /// Dependent sets are expected to be cleared first; their caches are not
    /// touched here.
    pub(crate) fn clear(
        &mut self,
        colliders: &ColliderSet,
        impulse_joints: &ImpulseJointSet,
        multibody_joints: &MultibodyJointSet,
    ) {
        let removed = self.raw.borrow_mut().clear(
            &mut colliders.raw().borrow_mut(),
            &mut impulse_joints.raw().borrow_mut(),
            &mut multibody_joints.raw().borrow_mut(),
        );
        self.map.clear();
        tracing::debug!(removed, "rigid bodies cleared");
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Ask the engine whether `handle` refers to a live body.
    pub fn contains(&self, handle: RigidBodyHandle) -> bool {
        self.raw.borrow().contains(handle.to_raw())
    }

    /// Cached wrapper for `handle`, without consulting the engine.
    pub fn get(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.map.get(handle).filter(|body| body.handle() == handle)
    }

    pub fn for_each(&self, visit: impl FnMut(&RigidBody)) {
        self.map.for_each(visit);
    }

    /// Visit dynamic bodies that are enabled and awake.
    pub fn for_each_active(&self, mut visit: impl FnMut(&RigidBody)) {
        for body in self.map.iter() {
            let active = {
                let raw = self.raw.borrow();
                let bits = body.handle().to_raw();
                raw.rb_is_dynamic(bits) == Some(true)
                    && raw.rb_is_sleeping(bits) == Some(false)
                    && raw.rb_is_enabled(bits) == Some(true)
            };
            if active {
                visit(body);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RigidBody> + '_ {
        self.map.iter()
    }

    pub fn get_all(&self) -> Vec<RigidBody> {
        self.map.get_all()
    }
}

impl Default for RigidBodySet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::math::Vec3;
    use tether_engine::live_scratch_values;

    struct Families {
        bodies: RigidBodySet,
        colliders: ColliderSet,
        impulse_joints: ImpulseJointSet,
        multibody_joints: MultibodyJointSet,
    }

    impl Families {
        fn new() -> Self {
            Self {
                bodies: RigidBodySet::new(),
                colliders: ColliderSet::new(),
                impulse_joints: ImpulseJointSet::new(),
                multibody_joints: MultibodyJointSet::new(),
            }
        }

        fn remove(&mut self, handle: RigidBodyHandle) -> Option<RigidBody> {
            self.bodies.remove(
                handle,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
            )
        }
    }

    #[test]
    fn create_caches_wrapper_and_releases_scratch() {
        let mut bodies = RigidBodySet::new();
        let before = live_scratch_values();
        let body = bodies
            .create(&RigidBodyDesc::dynamic().with_translation(Vec3::new(1.0, 2.0, 3.0)))
            .unwrap();

        assert_eq!(live_scratch_values(), before);
        assert_eq!(bodies.len(), 1);
        assert!(bodies.contains(body.handle()));
        assert_eq!(bodies.get(body.handle()), Some(&body));
        assert_eq!(body.translation(), Some(Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn rejected_create_leaves_no_entry() {
        let mut bodies = RigidBodySet::new();
        let result = bodies.create(&RigidBodyDesc::dynamic().with_additional_mass(-1.0));
        assert!(matches!(
            result,
            Err(EngineError::InvalidParameter { name: "additional_mass", .. })
        ));
        assert!(bodies.is_empty());
    }

    #[test]
    fn remove_round_trip() {
        let mut families = Families::new();
        let body = families.bodies.create(&RigidBodyDesc::fixed()).unwrap();
        let handle = body.handle();

        assert_eq!(families.remove(handle), Some(body.clone()));
        assert!(!families.bodies.contains(handle));
        assert!(families.bodies.get(handle).is_none());
        assert!(!body.is_valid());
        assert_eq!(body.translation(), None);

        // Second removal is a no-op.
        assert_eq!(families.remove(handle), None);
        assert_eq!(families.bodies.len(), 0);
    }

    #[test]
    fn stale_handle_does_not_evict_slot_reuser() {
        let mut families = Families::new();
        let old = families.bodies.create(&RigidBodyDesc::dynamic()).unwrap();
        families.remove(old.handle());
        let new = families.bodies.create(&RigidBodyDesc::dynamic()).unwrap();
        assert_eq!(old.handle().index(), new.handle().index());

        assert_eq!(families.remove(old.handle()), None);
        assert!(families.bodies.get(old.handle()).is_none());
        assert_eq!(families.bodies.get(new.handle()), Some(&new));
        assert_eq!(families.bodies.len(), 1);
    }

    #[test]
    fn three_bodies_remove_middle() {
        let mut families = Families::new();
        let a = families.bodies.create(&RigidBodyDesc::dynamic()).unwrap();
        let b = families.bodies.create(&RigidBodyDesc::dynamic()).unwrap();
        let c = families.bodies.create(&RigidBodyDesc::dynamic()).unwrap();

        families.remove(b.handle());

        let mut visited = Vec::new();
        families.bodies.for_each(|body| visited.push(body.handle()));
        assert_eq!(visited, vec![a.handle(), c.handle()]);
        assert_eq!(families.bodies.len(), 2);
        assert!(families.bodies.get(b.handle()).is_none());
        assert!(!families.bodies.contains(b.handle()));
        assert_eq!(families.bodies.get_all(), vec![a, c]);
    }

    #[test]
    fn active_bodies_exclude_sleeping_and_fixed() {
        let mut bodies = RigidBodySet::new();
        let awake = bodies.create(&RigidBodyDesc::dynamic()).unwrap();
        let asleep = bodies
            .create(&RigidBodyDesc::dynamic().with_sleeping(true))
            .unwrap();
        bodies.create(&RigidBodyDesc::fixed()).unwrap();

        let mut active = Vec::new();
        bodies.for_each_active(|body| active.push(body.handle()));
        assert_eq!(active, vec![awake.handle()]);

        asleep.wake_up();
        let mut count = 0;
        bodies.for_each_active(|_| count += 1);
        assert_eq!(count, 2);
    }

    #[test]
    fn rehydration_wraps_every_engine_handle() {
        let mut source = RigidBodySet::new();
        for _ in 0..3 {
            source.create(&RigidBodyDesc::dynamic()).unwrap();
        }
        let raw = source.raw().borrow().clone();
        let rehydrated = RigidBodySet::from_raw(raw);

        assert_eq!(rehydrated.len(), 3);
        for original in source.iter() {
            let body = rehydrated.get(original.handle()).expect("rehydrated wrapper");
            assert!(body.is_valid());
            // Wrappers read through the new engine set, not the source one.
            assert_ne!(body, original);
        }
    }
}
