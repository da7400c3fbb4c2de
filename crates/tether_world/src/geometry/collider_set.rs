//! Collider family set

use super::collider::{Collider, ColliderDesc};
use crate::dynamics::RigidBodySet;
use crate::marshal::{raw_rotation, raw_vector};
use crate::{shared, Shared};
use std::rc::Rc;
use tether_core::{ColliderHandle, EntityHandle, Registry, RigidBodyHandle};
use tether_engine::{EngineError, RawColliderInit, RawColliderSet};

/// Every collider of a world, with one cached wrapper per live collider.
pub struct ColliderSet {
    raw: Shared<RawColliderSet>,
    map: Registry<ColliderHandle, Collider>,
}

impl ColliderSet {
    pub fn new() -> Self {
        Self {
            raw: shared(RawColliderSet::new()),
            map: Registry::new(),
        }
    }

    pub(crate) fn from_raw(raw: RawColliderSet) -> Self {
        let raw = shared(raw);
        let mut map = Registry::new();
        raw.borrow().for_each_handle(|bits| {
            let handle = ColliderHandle::from_raw(bits);
            map.set(handle, Collider::new(Rc::clone(&raw), handle));
        });
        tracing::debug!(count = map.len(), "colliders rehydrated");
        Self { raw, map }
    }

    pub(crate) fn raw(&self) -> &Shared<RawColliderSet> {
        &self.raw
    }

    /// Create a collider, attached to `parent` when given.
    ///
    /// The parent must be a live body of `bodies`; its mass grows by the
    /// collider's mass.
    pub fn create(
        &mut self,
        desc: &ColliderDesc,
        parent: Option<RigidBodyHandle>,
        bodies: &RigidBodySet,
    ) -> Result<Collider, EngineError> {
        let translation = raw_vector(desc.translation);
        let rotation = raw_rotation(desc.rotation);

        let bits = self.raw.borrow_mut().create(
            RawColliderInit {
                shape: desc.shape.into(),
                translation: &translation,
                rotation: &rotation,
                density: desc.density,
                friction: desc.friction,
                restitution: desc.restitution,
                sensor: desc.sensor,
                enabled: desc.enabled,
            },
            parent.map(|p| p.to_raw()),
            &mut bodies.raw().borrow_mut(),
        )?;
        drop((translation, rotation));

        let handle = ColliderHandle::from_raw(bits);
        let collider = Collider::new(Rc::clone(&self.raw), handle);
        self.map.set(handle, collider.clone());
        tracing::debug!(%handle, parent = ?parent, "collider created");
        Ok(collider)
    }

    /// Remove a collider, detaching it from its parent body.
    ///
    /// Unknown or stale handles are ignored.
    pub fn remove(
        &mut self,
        handle: ColliderHandle,
        bodies: &RigidBodySet,
        wake_up: bool,
    ) -> Option<Collider> {
        let bits = handle.to_raw();
        if !self.raw.borrow().contains(bits) {
            return None;
        }
        self.raw
            .borrow_mut()
            .remove(bits, &mut bodies.raw().borrow_mut(), wake_up);
        tracing::debug!(%handle, "collider removed");
        self.map.delete(handle)
    }

    /// Evict the wrapper of a collider the engine already removed.
    pub(crate) fn unmap(&mut self, handle: ColliderHandle) {
        self.map.delete(handle);
    }

    pub(crate) fn clear(&mut self, bodies: &RigidBodySet) {
        let removed = self.raw.borrow_mut().clear(&mut bodies.raw().borrow_mut());
        self.map.clear();
        tracing::debug!(removed, "colliders cleared");
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, handle: ColliderHandle) -> bool {
        self.raw.borrow().contains(handle.to_raw())
    }

    pub fn get(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.map.get(handle).filter(|c| c.handle() == handle)
    }

    pub fn for_each(&self, visit: impl FnMut(&Collider)) {
        self.map.for_each(visit);
    }

    /// Visit the colliders whose parent is `body`.
    pub fn for_each_attached_to(&self, body: RigidBodyHandle, mut visit: impl FnMut(&Collider)) {
        let parent = Some(body.to_raw());
        for collider in self.map.iter() {
            let attached = self
                .raw
                .borrow()
                .coll_parent(collider.handle().to_raw())
                .flatten()
                == parent;
            if attached {
                visit(collider);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collider> + '_ {
        self.map.iter()
    }

    pub fn get_all(&self) -> Vec<Collider> {
        self.map.get_all()
    }
}

impl Default for ColliderSet {
    fn default() -> Self {
        Self::new()
    }
}
