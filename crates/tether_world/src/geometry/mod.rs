//! Colliders

mod collider;
mod collider_set;

pub use collider::{Collider, ColliderDesc, Shape};
pub use collider_set::ColliderSet;
