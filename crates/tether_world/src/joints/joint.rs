//! Joint wrapper shared by both joint families

use super::joint_data::{JointAxis, JointType, Motor};
use crate::marshal::vec3;
use crate::Shared;
use std::fmt;
use std::rc::Rc;
use tether_core::math::Vec3;
use tether_core::{EntityHandle, RigidBodyHandle};
use tether_engine::{
    EngineError, RawImpulseJointSet, RawJointAxis, RawJointParams, RawJointType, RawMotor,
    RawMultibodyJointSet, RawRigidBodySet, RawVector,
};

/// Call surface common to the engine's joint sets.
///
/// Lets one wrapper and one family set serve impulse and multibody joints.
pub trait RawJointStore: Default {
    /// Family name used in log records.
    const FAMILY: &'static str;

    fn create(
        &mut self,
        params: RawJointParams<'_>,
        body1: u64,
        body2: u64,
        wake_up: bool,
        bodies: &mut RawRigidBodySet,
    ) -> Result<u64, EngineError>;
    fn remove(&mut self, handle: u64, wake_up: bool, bodies: &mut RawRigidBodySet);
    fn contains(&self, handle: u64) -> bool;
    /// Remove every joint without reusing any handle issued so far.
    fn clear(&mut self) -> usize;
    fn for_each_handle(&self, visit: &mut dyn FnMut(u64));
    fn for_each_attached(&self, body: u64, visit: &mut dyn FnMut(u64));

    fn joint_type(&self, handle: u64) -> Option<RawJointType>;
    fn body1(&self, handle: u64) -> Option<u64>;
    fn body2(&self, handle: u64) -> Option<u64>;
    fn anchor1(&self, handle: u64) -> Option<RawVector>;
    fn anchor2(&self, handle: u64) -> Option<RawVector>;
    fn axis(&self, handle: u64) -> Option<RawVector>;
    fn contacts_enabled(&self, handle: u64) -> Option<bool>;
    fn set_contacts_enabled(&mut self, handle: u64, enabled: bool);
    fn limits(&self, handle: u64, axis: RawJointAxis) -> Option<[f32; 2]>;
    fn set_limits(
        &mut self,
        handle: u64,
        axis: RawJointAxis,
        min: f32,
        max: f32,
    ) -> Result<(), EngineError>;
    fn motor(&self, handle: u64, axis: RawJointAxis) -> Option<RawMotor>;
    fn configure_motor_velocity(
        &mut self,
        handle: u64,
        axis: RawJointAxis,
        target_vel: f32,
        factor: f32,
    ) -> Result<(), EngineError>;
    fn configure_motor_position(
        &mut self,
        handle: u64,
        axis: RawJointAxis,
        target_pos: f32,
        stiffness: f32,
        damping: f32,
    ) -> Result<(), EngineError>;
}

macro_rules! impl_raw_joint_store {
    ($set:ty, $family:literal) => {
        impl RawJointStore for $set {
            const FAMILY: &'static str = $family;

            fn create(
                &mut self,
                params: RawJointParams<'_>,
                body1: u64,
                body2: u64,
                wake_up: bool,
                bodies: &mut RawRigidBodySet,
            ) -> Result<u64, EngineError> {
                <$set>::create(self, params, body1, body2, wake_up, bodies)
            }

            fn remove(&mut self, handle: u64, wake_up: bool, bodies: &mut RawRigidBodySet) {
                <$set>::remove(self, handle, wake_up, bodies)
            }

            fn contains(&self, handle: u64) -> bool {
                <$set>::contains(self, handle)
            }

            fn clear(&mut self) -> usize {
                <$set>::clear(self)
            }

            fn for_each_handle(&self, visit: &mut dyn FnMut(u64)) {
                <$set>::for_each_handle(self, visit)
            }

            fn for_each_attached(&self, body: u64, visit: &mut dyn FnMut(u64)) {
                self.for_each_joint_handle_attached_to_rigid_body(body, visit)
            }

            fn joint_type(&self, handle: u64) -> Option<RawJointType> {
                <$set>::joint_type(self, handle)
            }

            fn body1(&self, handle: u64) -> Option<u64> {
                self.joint_body_handle1(handle)
            }

            fn body2(&self, handle: u64) -> Option<u64> {
                self.joint_body_handle2(handle)
            }

            fn anchor1(&self, handle: u64) -> Option<RawVector> {
                self.joint_anchor1(handle)
            }

            fn anchor2(&self, handle: u64) -> Option<RawVector> {
                self.joint_anchor2(handle)
            }

            fn axis(&self, handle: u64) -> Option<RawVector> {
                self.joint_axis(handle)
            }

            fn contacts_enabled(&self, handle: u64) -> Option<bool> {
                self.joint_contacts_enabled(handle)
            }

            fn set_contacts_enabled(&mut self, handle: u64, enabled: bool) {
                self.joint_set_contacts_enabled(handle, enabled)
            }

            fn limits(&self, handle: u64, axis: RawJointAxis) -> Option<[f32; 2]> {
                self.joint_limits(handle, axis)
            }

            fn set_limits(
                &mut self,
                handle: u64,
                axis: RawJointAxis,
                min: f32,
                max: f32,
            ) -> Result<(), EngineError> {
                self.joint_set_limits(handle, axis, min, max)
            }

            fn motor(&self, handle: u64, axis: RawJointAxis) -> Option<RawMotor> {
                self.joint_motor(handle, axis)
            }

            fn configure_motor_velocity(
                &mut self,
                handle: u64,
                axis: RawJointAxis,
                target_vel: f32,
                factor: f32,
            ) -> Result<(), EngineError> {
                self.joint_configure_motor_velocity(handle, axis, target_vel, factor)
            }

            fn configure_motor_position(
                &mut self,
                handle: u64,
                axis: RawJointAxis,
                target_pos: f32,
                stiffness: f32,
                damping: f32,
            ) -> Result<(), EngineError> {
                self.joint_configure_motor_position(handle, axis, target_pos, stiffness, damping)
            }
        }
    };
}

impl_raw_joint_store!(RawImpulseJointSet, "impulse_joint");
impl_raw_joint_store!(RawMultibodyJointSet, "multibody_joint");

/// Host-side view of one joint.
///
/// Unit-joint operations (`set_limits`, `configure_motor_*`) go through
/// [`JointType::unit_axis`]; on fixed and spherical joints they do nothing
/// and report `Ok(false)`.
pub struct Joint<H, S> {
    handle: H,
    raw: Shared<S>,
}

impl<H: EntityHandle, S: RawJointStore> Joint<H, S> {
    pub(crate) fn new(raw: Shared<S>, handle: H) -> Self {
        Self { handle, raw }
    }

    #[inline]
    pub fn handle(&self) -> H {
        self.handle
    }

    #[inline]
    fn bits(&self) -> u64 {
        self.handle.to_raw()
    }

    pub fn is_valid(&self) -> bool {
        self.raw.borrow().contains(self.bits())
    }

    pub fn joint_type(&self) -> Option<JointType> {
        self.raw.borrow().joint_type(self.bits()).map(Into::into)
    }

    pub fn body1(&self) -> Option<RigidBodyHandle> {
        self.raw
            .borrow()
            .body1(self.bits())
            .map(RigidBodyHandle::from_raw)
    }

    pub fn body2(&self) -> Option<RigidBodyHandle> {
        self.raw
            .borrow()
            .body2(self.bits())
            .map(RigidBodyHandle::from_raw)
    }

    pub fn anchor1(&self) -> Option<Vec3> {
        self.raw.borrow().anchor1(self.bits()).map(vec3)
    }

    pub fn anchor2(&self) -> Option<Vec3> {
        self.raw.borrow().anchor2(self.bits()).map(vec3)
    }

    /// Normalized free axis of unit joints.
    pub fn axis(&self) -> Option<Vec3> {
        self.raw.borrow().axis(self.bits()).map(vec3)
    }

    pub fn contacts_enabled(&self) -> bool {
        self.raw
            .borrow()
            .contacts_enabled(self.bits())
            .unwrap_or(false)
    }

    pub fn set_contacts_enabled(&self, enabled: bool) {
        self.raw
            .borrow_mut()
            .set_contacts_enabled(self.bits(), enabled);
    }

    /// Limits on an explicit axis.
    pub fn axis_limits(&self, axis: JointAxis) -> Option<[f32; 2]> {
        self.raw.borrow().limits(self.bits(), axis.into())
    }

    pub fn set_axis_limits(&self, axis: JointAxis, min: f32, max: f32) -> Result<(), EngineError> {
        self.raw
            .borrow_mut()
            .set_limits(self.bits(), axis.into(), min, max)
    }

    pub fn axis_motor(&self, axis: JointAxis) -> Option<Motor> {
        self.raw
            .borrow()
            .motor(self.bits(), axis.into())
            .map(Into::into)
    }

    fn unit_axis(&self) -> Option<JointAxis> {
        self.joint_type().and_then(JointType::unit_axis)
    }

    /// Limits on the unit axis.
    pub fn limits(&self) -> Option<[f32; 2]> {
        self.axis_limits(self.unit_axis()?)
    }

    /// Set limits on the unit axis. `Ok(false)` when the joint has none.
    pub fn set_limits(&self, min: f32, max: f32) -> Result<bool, EngineError> {
        let Some(axis) = self.unit_axis() else {
            return Ok(false);
        };
        self.set_axis_limits(axis, min, max)?;
        Ok(true)
    }

    /// Motor on the unit axis.
    pub fn motor(&self) -> Option<Motor> {
        self.axis_motor(self.unit_axis()?)
    }

    pub fn configure_motor_velocity(
        &self,
        target_vel: f32,
        factor: f32,
    ) -> Result<bool, EngineError> {
        let Some(axis) = self.unit_axis() else {
            return Ok(false);
        };
        self.raw
            .borrow_mut()
            .configure_motor_velocity(self.bits(), axis.into(), target_vel, factor)?;
        Ok(true)
    }

    pub fn configure_motor_position(
        &self,
        target_pos: f32,
        stiffness: f32,
        damping: f32,
    ) -> Result<bool, EngineError> {
        let Some(axis) = self.unit_axis() else {
            return Ok(false);
        };
        self.raw.borrow_mut().configure_motor_position(
            self.bits(),
            axis.into(),
            target_pos,
            stiffness,
            damping,
        )?;
        Ok(true)
    }
}

impl<H: Copy, S> Clone for Joint<H, S> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle,
            raw: Rc::clone(&self.raw),
        }
    }
}

impl<H: PartialEq, S> PartialEq for Joint<H, S> {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle && Rc::ptr_eq(&self.raw, &other.raw)
    }
}

impl<H: fmt::Debug, S> fmt::Debug for Joint<H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Joint")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}
