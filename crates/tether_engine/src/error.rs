use thiserror::Error;

/// Faults raised by the engine at its call boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f32 },

    #[error("rigid body {0:#x} does not exist")]
    UnknownBody(u64),

    #[error("a joint cannot attach rigid body {0:#x} to itself")]
    SelfJoint(u64),

    #[error("rigid body {0:#x} already has a multibody parent")]
    MultibodyParentExists(u64),

    #[error("multibody joint would close a kinematic loop")]
    MultibodyLoop,

    #[error("unsupported snapshot version {0}")]
    SnapshotVersion(u32),

    #[error("snapshot codec failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Reject non-finite or negative scalars.
pub(crate) fn non_negative(name: &'static str, value: f32) -> Result<f32, EngineError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(EngineError::InvalidParameter { name, value })
    }
}

/// Reject non-finite or non-positive scalars.
pub(crate) fn positive(name: &'static str, value: f32) -> Result<f32, EngineError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(EngineError::InvalidParameter { name, value })
    }
}

pub(crate) fn finite(name: &'static str, value: f32) -> Result<f32, EngineError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::InvalidParameter { name, value })
    }
}
