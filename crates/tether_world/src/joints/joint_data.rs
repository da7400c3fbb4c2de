//! Joint descriptors and the joint-type table

use tether_core::math::Vec3;
use tether_engine::{RawJointAxis, RawJointType, RawMotor};

/// Kind of constraint a joint applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JointType {
    /// Locks all relative motion.
    Fixed,
    /// Rotation about one axis.
    Revolute,
    /// Translation along one axis.
    Prismatic,
    /// Free rotation about the anchor.
    Spherical,
}

impl JointType {
    /// The single free axis of a unit joint. Limits and motors set through
    /// the unit-joint operations apply to this axis.
    ///
    /// | Type      | Axis    |
    /// |-----------|---------|
    /// | Revolute  | `AngX`  |
    /// | Prismatic | `LinX`  |
    /// | Fixed     | none    |
    /// | Spherical | none    |
    pub const fn unit_axis(self) -> Option<JointAxis> {
        match self {
            JointType::Revolute => Some(JointAxis::AngX),
            JointType::Prismatic => Some(JointAxis::LinX),
            JointType::Fixed | JointType::Spherical => None,
        }
    }

    pub const fn is_unit(self) -> bool {
        self.unit_axis().is_some()
    }
}

impl From<JointType> for RawJointType {
    fn from(joint_type: JointType) -> Self {
        match joint_type {
            JointType::Fixed => RawJointType::Fixed,
            JointType::Revolute => RawJointType::Revolute,
            JointType::Prismatic => RawJointType::Prismatic,
            JointType::Spherical => RawJointType::Spherical,
        }
    }
}

impl From<RawJointType> for JointType {
    fn from(raw: RawJointType) -> Self {
        match raw {
            RawJointType::Fixed => JointType::Fixed,
            RawJointType::Revolute => JointType::Revolute,
            RawJointType::Prismatic => JointType::Prismatic,
            RawJointType::Spherical => JointType::Spherical,
        }
    }
}

/// Degree of freedom in the joint frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JointAxis {
    LinX,
    LinY,
    LinZ,
    AngX,
    AngY,
    AngZ,
}

impl From<JointAxis> for RawJointAxis {
    fn from(axis: JointAxis) -> Self {
        match axis {
            JointAxis::LinX => RawJointAxis::LinX,
            JointAxis::LinY => RawJointAxis::LinY,
            JointAxis::LinZ => RawJointAxis::LinZ,
            JointAxis::AngX => RawJointAxis::AngX,
            JointAxis::AngY => RawJointAxis::AngY,
            JointAxis::AngZ => RawJointAxis::AngZ,
        }
    }
}

/// Motor configured on one joint axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Motor {
    pub target_pos: f32,
    pub target_vel: f32,
    pub stiffness: f32,
    pub damping: f32,
}

impl From<RawMotor> for Motor {
    fn from(raw: RawMotor) -> Self {
        Self {
            target_pos: raw.target_pos,
            target_vel: raw.target_vel,
            stiffness: raw.stiffness,
            damping: raw.damping,
        }
    }
}

/// Description of a joint to create, shared by both joint families.
#[derive(Clone, Debug, PartialEq)]
pub struct JointData {
    pub joint_type: JointType,
    /// Anchor in the local frame of the first body.
    pub anchor1: Vec3,
    /// Anchor in the local frame of the second body.
    pub anchor2: Vec3,
    /// Free axis of unit joints. Ignored by fixed and spherical joints.
    pub axis: Vec3,
    /// Initial limits on the unit axis.
    pub limits: Option<[f32; 2]>,
    pub contacts_enabled: bool,
}

impl JointData {
    fn new(joint_type: JointType, axis: Vec3) -> Self {
        Self {
            joint_type,
            anchor1: Vec3::ZERO,
            anchor2: Vec3::ZERO,
            axis,
            limits: None,
            contacts_enabled: true,
        }
    }

    pub fn fixed() -> Self {
        Self::new(JointType::Fixed, Vec3::X)
    }

    pub fn revolute(axis: Vec3) -> Self {
        Self::new(JointType::Revolute, axis)
    }

    pub fn prismatic(axis: Vec3) -> Self {
        Self::new(JointType::Prismatic, axis)
    }

    pub fn spherical() -> Self {
        Self::new(JointType::Spherical, Vec3::X)
    }

    pub fn with_anchor1(mut self, anchor: Vec3) -> Self {
        self.anchor1 = anchor;
        self
    }

    pub fn with_anchor2(mut self, anchor: Vec3) -> Self {
        self.anchor2 = anchor;
        self
    }

    pub fn with_limits(mut self, min: f32, max: f32) -> Self {
        self.limits = Some([min, max]);
        self
    }

    pub fn with_contacts_enabled(mut self, enabled: bool) -> Self {
        self.contacts_enabled = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_axis_table() {
        assert_eq!(JointType::Revolute.unit_axis(), Some(JointAxis::AngX));
        assert_eq!(JointType::Prismatic.unit_axis(), Some(JointAxis::LinX));
        assert_eq!(JointType::Fixed.unit_axis(), None);
        assert!(!JointType::Spherical.is_unit());
    }

    #[test]
    fn joint_type_survives_engine_conversion() {
        for ty in [
            JointType::Fixed,
            JointType::Revolute,
            JointType::Prismatic,
            JointType::Spherical,
        ] {
            assert_eq!(JointType::from(RawJointType::from(ty)), ty);
        }
    }
}
