//! Tether World
//!
//! Host-facing side of the binding layer:
//! - One resource set per entity family, each caching a wrapper per handle
//! - Descriptors for creating bodies, colliders and joints
//! - `World`, which owns the families and coordinates cascades
//! - Settings loaded from JSON
//!
//! Everything here is single-threaded. Wrappers share their engine set
//! through `Rc`, so none of these types are `Send`.

use std::cell::RefCell;
use std::rc::Rc;

pub mod dynamics;
pub mod error;
pub mod geometry;
pub mod joints;
pub mod settings;
pub mod world;

mod marshal;

pub use dynamics::{RigidBody, RigidBodyDesc, RigidBodySet, RigidBodyType};
pub use error::WorldError;
pub use geometry::{Collider, ColliderDesc, ColliderSet, Shape};
pub use joints::{
    ImpulseJoint, ImpulseJointSet, JointAxis, JointData, JointType, Motor, MultibodyJoint,
    MultibodyJointSet,
};
pub use settings::WorldSettings;
pub use world::World;

pub use tether_core::math;
pub use tether_core::{
    ColliderHandle, EntityHandle, ImpulseJointHandle, MultibodyJointHandle, RigidBodyHandle,
};
pub use tether_engine::EngineError;

/// Engine set shared between a family set and all of its wrappers.
pub(crate) type Shared<T> = Rc<RefCell<T>>;

#[inline]
pub(crate) fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}
