//! Math value types
//!
//! Re-exports glam. Positions are `Vec3`, orientations unit `Quat`; both
//! serialize with serde.

pub use glam::*;
