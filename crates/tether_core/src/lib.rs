//! Tether Core
//!
//! Host-side building blocks shared by every entity family:
//! - Opaque engine handles and index decoding
//! - Handle-indexed wrapper registry
//! - Math value types

pub mod handle;
pub mod math;
pub mod registry;

pub use glam;
pub use handle::{
    index_of, ColliderHandle, EntityHandle, Handle, ImpulseJointHandle, MultibodyJointHandle,
    RigidBodyHandle,
};
pub use registry::Registry;

/// Binding layer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
