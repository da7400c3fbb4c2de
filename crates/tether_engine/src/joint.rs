//! Raw joint sets
//!
//! Impulse joints and multibody joints store the same data. They differ in
//! what topology they accept: multibody joints form a forest where each body
//! has at most one parent link.

use crate::arena::Arena;
use crate::error::{finite, non_negative, EngineError};
use crate::scratch::RawVector;
use crate::RawRigidBodySet;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Kind of constraint a joint applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RawJointType {
    Fixed = 0,
    Revolute = 1,
    Prismatic = 2,
    Spherical = 3,
}

/// Degree of freedom a limit or motor applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RawJointAxis {
    LinX = 0,
    LinY = 1,
    LinZ = 2,
    AngX = 3,
    AngY = 4,
    AngZ = 5,
}

impl RawJointAxis {
    #[inline]
    fn slot(self) -> usize {
        self as usize
    }
}

/// Motor driving one joint axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMotor {
    pub target_pos: f32,
    pub target_vel: f32,
    pub stiffness: f32,
    pub damping: f32,
}

/// Creation parameters shared by both joint sets.
pub struct RawJointParams<'a> {
    pub joint_type: RawJointType,
    pub anchor1: &'a RawVector,
    pub anchor2: &'a RawVector,
    /// Free axis of revolute and prismatic joints; ignored otherwise.
    pub axis: &'a RawVector,
    pub limits: Option<[f32; 2]>,
    pub contacts_enabled: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct RawJoint {
    pub body1: u64,
    pub body2: u64,
    pub joint_type: RawJointType,
    pub anchor1: Vec3,
    pub anchor2: Vec3,
    pub axis: Vec3,
    pub limits: [Option<[f32; 2]>; 6],
    pub motors: [Option<RawMotor>; 6],
    pub contacts_enabled: bool,
}

impl RawJoint {
    fn build(params: RawJointParams<'_>, body1: u64, body2: u64) -> Result<Self, EngineError> {
        let anchor1 = params.anchor1.value();
        let anchor2 = params.anchor2.value();
        if !anchor1.is_finite() || !anchor2.is_finite() {
            return Err(EngineError::InvalidParameter {
                name: "anchor",
                value: f32::NAN,
            });
        }
        let axis = match params.joint_type {
            RawJointType::Revolute | RawJointType::Prismatic => {
                let axis = params.axis.value();
                if !axis.is_finite() || axis.length_squared() < f32::EPSILON {
                    return Err(EngineError::InvalidParameter {
                        name: "axis",
                        value: axis.length(),
                    });
                }
                axis.normalize()
            }
            RawJointType::Fixed | RawJointType::Spherical => Vec3::X,
        };

        let mut limits = [None; 6];
        if let Some([min, max]) = params.limits {
            let slot = match params.joint_type {
                RawJointType::Revolute => Some(RawJointAxis::AngX),
                RawJointType::Prismatic => Some(RawJointAxis::LinX),
                RawJointType::Fixed | RawJointType::Spherical => None,
            };
            if let Some(slot) = slot {
                limits[slot.slot()] = Some(checked_limits(min, max)?);
            }
        }

        Ok(Self {
            body1,
            body2,
            joint_type: params.joint_type,
            anchor1,
            anchor2,
            axis,
            limits,
            motors: [None; 6],
            contacts_enabled: params.contacts_enabled,
        })
    }

    #[inline]
    fn attached_to(&self, body: u64) -> bool {
        self.body1 == body || self.body2 == body
    }
}

fn checked_limits(min: f32, max: f32) -> Result<[f32; 2], EngineError> {
    finite("limits.min", min)?;
    finite("limits.max", max)?;
    if min > max {
        return Err(EngineError::InvalidParameter {
            name: "limits.min",
            value: min,
        });
    }
    Ok([min, max])
}

fn check_bodies(bodies: &RawRigidBodySet, body1: u64, body2: u64) -> Result<(), EngineError> {
    if body1 == body2 {
        return Err(EngineError::SelfJoint(body1));
    }
    for body in [body1, body2] {
        if !bodies.contains(body) {
            return Err(EngineError::UnknownBody(body));
        }
    }
    Ok(())
}

/// Generates the accessors both joint sets expose.
macro_rules! joint_accessors {
    ($set:ty) => {
        impl $set {
            pub fn len(&self) -> usize {
                self.joints.len()
            }

            pub fn is_empty(&self) -> bool {
                self.joints.len() == 0
            }

            pub fn contains(&self, handle: u64) -> bool {
                self.joints.contains(handle)
            }

            pub fn for_each_handle(&self, mut visit: impl FnMut(u64)) {
                for (handle, _) in self.joints.iter() {
                    visit(handle);
                }
            }

            /// Remove every joint. Retired slots keep their generations.
            pub fn clear(&mut self) -> usize {
                self.joints.clear()
            }

            /// Visit every joint attached to `body`.
            pub fn for_each_joint_handle_attached_to_rigid_body(
                &self,
                body: u64,
                mut visit: impl FnMut(u64),
            ) {
                for (handle, joint) in self.joints.iter() {
                    if joint.attached_to(body) {
                        visit(handle);
                    }
                }
            }

            /// Remove every joint attached to `body`, waking the other end.
            pub(crate) fn remove_attached(
                &mut self,
                body: u64,
                bodies: &mut RawRigidBodySet,
            ) -> usize {
                let mut others = Vec::new();
                let removed = self.joints.remove_where(|joint| {
                    if joint.attached_to(body) {
                        others.push(if joint.body1 == body { joint.body2 } else { joint.body1 });
                        true
                    } else {
                        false
                    }
                });
                for other in others {
                    bodies.wake_up(other);
                }
                removed.len()
            }

            pub fn joint_type(&self, handle: u64) -> Option<RawJointType> {
                self.joints.get(handle).map(|j| j.joint_type)
            }

            pub fn joint_body_handle1(&self, handle: u64) -> Option<u64> {
                self.joints.get(handle).map(|j| j.body1)
            }

            pub fn joint_body_handle2(&self, handle: u64) -> Option<u64> {
                self.joints.get(handle).map(|j| j.body2)
            }

            pub fn joint_anchor1(&self, handle: u64) -> Option<RawVector> {
                self.joints.get(handle).map(|j| j.anchor1.into())
            }

            pub fn joint_anchor2(&self, handle: u64) -> Option<RawVector> {
                self.joints.get(handle).map(|j| j.anchor2.into())
            }

            pub fn joint_axis(&self, handle: u64) -> Option<RawVector> {
                self.joints.get(handle).map(|j| j.axis.into())
            }

            pub fn joint_contacts_enabled(&self, handle: u64) -> Option<bool> {
                self.joints.get(handle).map(|j| j.contacts_enabled)
            }

            pub fn joint_set_contacts_enabled(&mut self, handle: u64, enabled: bool) {
                if let Some(joint) = self.joints.get_mut(handle) {
                    joint.contacts_enabled = enabled;
                }
            }

            pub fn joint_limits(&self, handle: u64, axis: RawJointAxis) -> Option<[f32; 2]> {
                self.joints.get(handle)?.limits[axis.slot()]
            }

            pub fn joint_set_limits(
                &mut self,
                handle: u64,
                axis: RawJointAxis,
                min: f32,
                max: f32,
            ) -> Result<(), EngineError> {
                let limits = checked_limits(min, max)?;
                if let Some(joint) = self.joints.get_mut(handle) {
                    joint.limits[axis.slot()] = Some(limits);
                }
                Ok(())
            }

            pub fn joint_motor(&self, handle: u64, axis: RawJointAxis) -> Option<RawMotor> {
                self.joints.get(handle)?.motors[axis.slot()]
            }

            pub fn joint_configure_motor_velocity(
                &mut self,
                handle: u64,
                axis: RawJointAxis,
                target_vel: f32,
                factor: f32,
            ) -> Result<(), EngineError> {
                let motor = RawMotor {
                    target_pos: 0.0,
                    target_vel: finite("target_vel", target_vel)?,
                    stiffness: 0.0,
                    damping: non_negative("factor", factor)?,
                };
                if let Some(joint) = self.joints.get_mut(handle) {
                    joint.motors[axis.slot()] = Some(motor);
                }
                Ok(())
            }

            pub fn joint_configure_motor_position(
                &mut self,
                handle: u64,
                axis: RawJointAxis,
                target_pos: f32,
                stiffness: f32,
                damping: f32,
            ) -> Result<(), EngineError> {
                let motor = RawMotor {
                    target_pos: finite("target_pos", target_pos)?,
                    target_vel: 0.0,
                    stiffness: non_negative("stiffness", stiffness)?,
                    damping: non_negative("damping", damping)?,
                };
                if let Some(joint) = self.joints.get_mut(handle) {
                    joint.motors[axis.slot()] = Some(motor);
                }
                Ok(())
            }
        }
    };
}

/// Engine-side storage of impulse-based joints.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawImpulseJointSet {
    joints: Arena<RawJoint>,
}

impl RawImpulseJointSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        params: RawJointParams<'_>,
        body1: u64,
        body2: u64,
        wake_up: bool,
        bodies: &mut RawRigidBodySet,
    ) -> Result<u64, EngineError> {
        check_bodies(bodies, body1, body2)?;
        let joint = RawJoint::build(params, body1, body2)?;
        let handle = self.joints.insert(joint);
        if wake_up {
            bodies.wake_up(body1);
            bodies.wake_up(body2);
        }
        Ok(handle)
    }

    pub fn remove(&mut self, handle: u64, wake_up: bool, bodies: &mut RawRigidBodySet) {
        if let Some(joint) = self.joints.remove(handle) {
            if wake_up {
                bodies.wake_up(joint.body1);
                bodies.wake_up(joint.body2);
            }
        }
    }
}

joint_accessors!(RawImpulseJointSet);

/// Engine-side storage of reduced-coordinate joints.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawMultibodyJointSet {
    joints: Arena<RawJoint>,
}

impl RawMultibodyJointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a link making `body2` a child of `body1`.
    pub fn create(
        &mut self,
        params: RawJointParams<'_>,
        body1: u64,
        body2: u64,
        wake_up: bool,
        bodies: &mut RawRigidBodySet,
    ) -> Result<u64, EngineError> {
        check_bodies(bodies, body1, body2)?;
        if self.parent_link(body2).is_some() {
            return Err(EngineError::MultibodyParentExists(body2));
        }
        if self.is_ancestor(body2, body1) {
            return Err(EngineError::MultibodyLoop);
        }
        let joint = RawJoint::build(params, body1, body2)?;
        let handle = self.joints.insert(joint);
        if wake_up {
            bodies.wake_up(body1);
            bodies.wake_up(body2);
        }
        Ok(handle)
    }

    pub fn remove(&mut self, handle: u64, wake_up: bool, bodies: &mut RawRigidBodySet) {
        if let Some(joint) = self.joints.remove(handle) {
            if wake_up {
                bodies.wake_up(joint.body1);
                bodies.wake_up(joint.body2);
            }
        }
    }

    /// Parent link of `body`, if it is the child end of a joint.
    fn parent_link(&self, body: u64) -> Option<&RawJoint> {
        self.joints
            .iter()
            .map(|(_, joint)| joint)
            .find(|joint| joint.body2 == body)
    }

    /// Whether `ancestor` is reachable from `body` by walking parent links.
    fn is_ancestor(&self, ancestor: u64, body: u64) -> bool {
        let mut current = body;
        // Each body has one parent, so the walk is bounded by the joint count.
        for _ in 0..=self.joints.len() {
            match self.parent_link(current) {
                Some(link) if link.body1 == ancestor => return true,
                Some(link) => current = link.body1,
                None => return false,
            }
        }
        false
    }
}

joint_accessors!(RawMultibodyJointSet);
