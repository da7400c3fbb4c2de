//! Tether Engine
//!
//! The engine side of the binding boundary. Everything here is addressed by
//! opaque `u64` handles:
//! - Raw sets for rigid bodies, colliders, impulse joints and multibody joints
//! - Scratch value objects passed across the boundary
//! - Stepping pipeline and whole-world snapshots
//!
//! Hosts should go through `tether_world`; nothing in this crate keeps
//! host-side wrappers.

mod arena;
mod body;
mod collider;
mod error;
mod joint;
mod pipeline;
mod scratch;
mod serialization;

pub use body::{RawBodyInit, RawBodyType, RawRigidBodySet};
pub use collider::{RawColliderInit, RawColliderSet, RawShape};
pub use error::EngineError;
pub use joint::{
    RawImpulseJointSet, RawJointAxis, RawJointParams, RawJointType, RawMotor,
    RawMultibodyJointSet,
};
pub use pipeline::{RawIntegrationParameters, RawPhysicsPipeline};
pub use scratch::{live_scratch_values, RawRotation, RawVector};
pub use serialization::{RawDeserializedWorld, RawSerializationPipeline};
