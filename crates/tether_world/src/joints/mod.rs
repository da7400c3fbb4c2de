//! Impulse and multibody joints
//!
//! Both families share one wrapper and one set type, parameterized by the
//! handle type and the engine set behind them.

mod joint;
mod joint_data;
mod joint_set;

pub use joint::{Joint, RawJointStore};
pub use joint_data::{JointAxis, JointData, JointType, Motor};
pub use joint_set::JointSet;

use tether_core::{ImpulseJointHandle, MultibodyJointHandle};
use tether_engine::{RawImpulseJointSet, RawMultibodyJointSet};

pub type ImpulseJoint = Joint<ImpulseJointHandle, RawImpulseJointSet>;
pub type MultibodyJoint = Joint<MultibodyJointHandle, RawMultibodyJointSet>;
pub type ImpulseJointSet = JointSet<ImpulseJointHandle, RawImpulseJointSet>;
pub type MultibodyJointSet = JointSet<MultibodyJointHandle, RawMultibodyJointSet>;
