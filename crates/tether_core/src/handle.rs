//! Opaque engine handles and index decoding
//!
//! Handles are issued by the engine as a single 64-bit value:
//! [32-bit generation | 32-bit index]
//! - Index: dense slot position, reused by the engine after removal
//! - Generation: bumped by the engine on reuse so stale handles stop resolving
//!
//! The host only ever decodes the index. Liveness of a generation is the
//! engine's business (`contains`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Untyped engine handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(u64);

impl Handle {
    #[inline]
    pub const fn from_raw(bits: u64) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn to_raw(self) -> u64 {
        self.0
    }

    /// Dense slot index (low 32 bits). Used to address registry slots.
    #[inline]
    pub const fn index(self) -> u32 {
        (self.0 & 0xFFFF_FFFF) as u32
    }

    /// Generation tag (high 32 bits). Diagnostic only.
    #[inline]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

/// Decode the registry index of a raw engine handle.
#[inline]
pub const fn index_of(bits: u64) -> u32 {
    Handle::from_raw(bits).index()
}

/// A handle belonging to one entity family.
pub trait EntityHandle: Copy + Eq + fmt::Debug {
    fn from_handle(handle: Handle) -> Self;

    fn handle(self) -> Handle;

    #[inline]
    fn index(self) -> u32 {
        self.handle().index()
    }

    #[inline]
    fn to_raw(self) -> u64 {
        self.handle().to_raw()
    }
}

impl EntityHandle for Handle {
    #[inline]
    fn from_handle(handle: Handle) -> Self {
        handle
    }

    #[inline]
    fn handle(self) -> Handle {
        self
    }
}

/// Declare a typed handle wrapping [`Handle`].
macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Handle);

        impl $name {
            #[inline]
            pub const fn from_raw(bits: u64) -> Self {
                Self(Handle::from_raw(bits))
            }
        }

        impl EntityHandle for $name {
            #[inline]
            fn from_handle(handle: Handle) -> Self {
                Self(handle)
            }

            #[inline]
            fn handle(self) -> Handle {
                self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

define_handle!(
    /// Handle of a rigid body.
    RigidBodyHandle
);
define_handle!(
    /// Handle of a collider.
    ColliderHandle
);
define_handle!(
    /// Handle of an impulse-based joint.
    ImpulseJointHandle
);
define_handle!(
    /// Handle of a reduced-coordinate (multibody) joint.
    MultibodyJointHandle
);

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(index: u32, generation: u32) -> u64 {
        ((generation as u64) << 32) | index as u64
    }

    #[test]
    fn index_is_low_bits() {
        let handle = Handle::from_raw(pack(7, 3));
        assert_eq!(handle.index(), 7);
        assert_eq!(handle.generation(), 3);
    }

    #[test]
    fn index_is_stable() {
        let bits = pack(u32::MAX, u32::MAX);
        let first = index_of(bits);
        for _ in 0..16 {
            assert_eq!(index_of(bits), first);
        }
        assert_eq!(first, u32::MAX);
    }

    #[test]
    fn generation_does_not_leak_into_index() {
        // Same slot, different generations: same registry index.
        let a = Handle::from_raw(pack(42, 0));
        let b = Handle::from_raw(pack(42, 9));
        assert_ne!(a, b);
        assert_eq!(a.index(), b.index());
    }

    #[test]
    fn high_values_survive_exactly() {
        // Values past 2^53 would lose precision in a float; u64 keeps them.
        let bits = pack(0x1234_5679, 0x0020_0001);
        assert_eq!(index_of(bits), 0x1234_5679);
        assert_eq!(Handle::from_raw(bits).to_raw(), bits);
    }

    #[test]
    fn typed_handles_roundtrip() {
        let body = RigidBodyHandle::from_raw(pack(5, 1));
        assert_eq!(body.index(), 5);
        assert_eq!(RigidBodyHandle::from_handle(body.handle()), body);
        assert_eq!(body.to_string(), "RigidBodyHandle(5v1)");
    }

    #[test]
    fn typed_handles_serialize_as_bare_bits() {
        let bits = pack(3, 2);
        let json = serde_json::to_string(&ColliderHandle::from_raw(bits)).unwrap();
        assert_eq!(json, bits.to_string());
        let back: ColliderHandle = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_raw(), bits);
    }
}
