//! Joint family set, instantiated for impulse and multibody joints

use super::joint::{Joint, RawJointStore};
use super::joint_data::JointData;
use crate::dynamics::RigidBodySet;
use crate::marshal::raw_vector;
use crate::{shared, Shared};
use std::fmt;
use std::rc::Rc;
use tether_core::handle::Handle;
use tether_core::{EntityHandle, Registry, RigidBodyHandle};
use tether_engine::{EngineError, RawJointParams};

/// Every joint of one family, with one cached wrapper per live joint.
pub struct JointSet<H, S> {
    raw: Shared<S>,
    map: Registry<H, Joint<H, S>>,
}

impl<H, S> JointSet<H, S>
where
    H: EntityHandle + fmt::Display,
    S: RawJointStore,
{
    pub fn new() -> Self {
        Self {
            raw: shared(S::default()),
            map: Registry::new(),
        }
    }

    pub(crate) fn from_raw(raw: S) -> Self {
        let raw = shared(raw);
        let mut map = Registry::new();
        raw.borrow().for_each_handle(&mut |bits| {
            let handle = H::from_handle(Handle::from_raw(bits));
            map.set(handle, Joint::new(Rc::clone(&raw), handle));
        });
        tracing::debug!(family = S::FAMILY, count = map.len(), "joints rehydrated");
        Self { raw, map }
    }

    pub(crate) fn raw(&self) -> &Shared<S> {
        &self.raw
    }

    /// Create a joint between two live bodies of `bodies`.
    pub fn create(
        &mut self,
        data: &JointData,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        wake_up: bool,
        bodies: &RigidBodySet,
    ) -> Result<Joint<H, S>, EngineError> {
        let anchor1 = raw_vector(data.anchor1);
        let anchor2 = raw_vector(data.anchor2);
        let axis = raw_vector(data.axis);

        let bits = self.raw.borrow_mut().create(
            RawJointParams {
                joint_type: data.joint_type.into(),
                anchor1: &anchor1,
                anchor2: &anchor2,
                axis: &axis,
                limits: data.limits,
                contacts_enabled: data.contacts_enabled,
            },
            body1.to_raw(),
            body2.to_raw(),
            wake_up,
            &mut bodies.raw().borrow_mut(),
        )?;
        drop((anchor1, anchor2, axis));

        let handle = H::from_handle(Handle::from_raw(bits));
        let joint = Joint::new(Rc::clone(&self.raw), handle);
        self.map.set(handle, joint.clone());
        tracing::debug!(
            family = S::FAMILY,
            %handle,
            %body1,
            %body2,
            joint_type = ?data.joint_type,
            "joint created"
        );
        Ok(joint)
    }

    /// Remove a joint. Unknown or stale handles are ignored.
    pub fn remove(&mut self, handle: H, wake_up: bool, bodies: &RigidBodySet) -> Option<Joint<H, S>> {
        let bits = handle.to_raw();
        if !self.raw.borrow().contains(bits) {
            return None;
        }
        self.raw
            .borrow_mut()
            .remove(bits, wake_up, &mut bodies.raw().borrow_mut());
        tracing::debug!(family = S::FAMILY, %handle, "joint removed");
        self.map.delete(handle)
    }

    /// Handles of every joint the engine has attached to `body`.
    pub fn attached_handles(&self, body: RigidBodyHandle) -> Vec<H> {
        let mut handles = Vec::new();
        self.raw
            .borrow()
            .for_each_attached(body.to_raw(), &mut |bits| {
                handles.push(H::from_handle(Handle::from_raw(bits)));
            });
        handles
    }

    /// Evict the wrapper of a joint the engine already removed.
    pub(crate) fn unmap(&mut self, handle: H) {
        self.map.delete(handle);
    }

    pub(crate) fn clear(&mut self) {
        let removed = self.raw.borrow_mut().clear();
        self.map.clear();
        tracing::debug!(family = S::FAMILY, removed, "joints cleared");
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, handle: H) -> bool {
        self.raw.borrow().contains(handle.to_raw())
    }

    pub fn get(&self, handle: H) -> Option<&Joint<H, S>> {
        self.map.get(handle).filter(|joint| joint.handle() == handle)
    }

    pub fn for_each(&self, visit: impl FnMut(&Joint<H, S>)) {
        self.map.for_each(visit);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Joint<H, S>> + '_ {
        self.map.iter()
    }

    pub fn get_all(&self) -> Vec<Joint<H, S>> {
        self.map.get_all()
    }
}

impl<H, S> Default for JointSet<H, S>
where
    H: EntityHandle + fmt::Display,
    S: RawJointStore,
{
    fn default() -> Self {
        Self::new()
    }
}
