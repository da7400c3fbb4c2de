//! Rigid bodies

mod rigid_body;
mod rigid_body_set;

pub use rigid_body::{RigidBody, RigidBodyDesc, RigidBodyType};
pub use rigid_body_set::RigidBodySet;
