//! Whole-world snapshots
//!
//! The byte layout is private to the engine. Handles survive a round trip:
//! slot indices, generations and free lists are preserved.

use crate::error::EngineError;
use crate::pipeline::RawIntegrationParameters;
use crate::scratch::RawVector;
use crate::{RawColliderSet, RawImpulseJointSet, RawMultibodyJointSet, RawRigidBodySet};
use glam::Vec3;
use serde::{Deserialize, Serialize};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    gravity: Vec3,
    params: &'a RawIntegrationParameters,
    bodies: &'a RawRigidBodySet,
    colliders: &'a RawColliderSet,
    impulse_joints: &'a RawImpulseJointSet,
    multibody_joints: &'a RawMultibodyJointSet,
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    gravity: Vec3,
    params: RawIntegrationParameters,
    bodies: RawRigidBodySet,
    colliders: RawColliderSet,
    impulse_joints: RawImpulseJointSet,
    multibody_joints: RawMultibodyJointSet,
}

/// Fresh raw sets rebuilt from a snapshot.
pub struct RawDeserializedWorld {
    gravity: Vec3,
    pub params: RawIntegrationParameters,
    pub bodies: RawRigidBodySet,
    pub colliders: RawColliderSet,
    pub impulse_joints: RawImpulseJointSet,
    pub multibody_joints: RawMultibodyJointSet,
}

impl RawDeserializedWorld {
    pub fn gravity(&self) -> RawVector {
        self.gravity.into()
    }
}

#[derive(Debug, Default)]
pub struct RawSerializationPipeline;

impl RawSerializationPipeline {
    pub fn new() -> Self {
        Self
    }

    pub fn serialize_all(
        &self,
        gravity: &RawVector,
        params: &RawIntegrationParameters,
        bodies: &RawRigidBodySet,
        colliders: &RawColliderSet,
        impulse_joints: &RawImpulseJointSet,
        multibody_joints: &RawMultibodyJointSet,
    ) -> Result<Vec<u8>, EngineError> {
        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            gravity: gravity.value(),
            params,
            bodies,
            colliders,
            impulse_joints,
            multibody_joints,
        };
        Ok(serde_json::to_vec(&snapshot)?)
    }

    pub fn deserialize_all(&self, bytes: &[u8]) -> Result<RawDeserializedWorld, EngineError> {
        let snapshot: Snapshot = serde_json::from_slice(bytes)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(EngineError::SnapshotVersion(snapshot.version));
        }
        Ok(RawDeserializedWorld {
            gravity: snapshot.gravity,
            params: snapshot.params,
            bodies: snapshot.bodies,
            colliders: snapshot.colliders,
            impulse_joints: snapshot.impulse_joints,
            multibody_joints: snapshot.multibody_joints,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::tests::create_body;
    use crate::collider::tests::create_ball;
    use crate::RawBodyType;

    #[test]
    fn roundtrip_preserves_handles_and_generations() {
        let mut bodies = RawRigidBodySet::new();
        let mut colliders = RawColliderSet::new();
        let mut impulse_joints = RawImpulseJointSet::new();
        let mut multibody_joints = RawMultibodyJointSet::new();

        let doomed = create_body(&mut bodies, RawBodyType::Dynamic, Vec3::ZERO);
        bodies.remove(doomed, &mut colliders, &mut impulse_joints, &mut multibody_joints);
        let body = create_body(&mut bodies, RawBodyType::Dynamic, Vec3::new(1.0, 2.0, 3.0));
        let ball = create_ball(&mut colliders, &mut bodies, Some(body), Vec3::ZERO).unwrap();

        let pipeline = RawSerializationPipeline::new();
        let bytes = pipeline
            .serialize_all(
                &RawVector::new(0.0, -9.81, 0.0),
                &RawIntegrationParameters::default(),
                &bodies,
                &colliders,
                &impulse_joints,
                &multibody_joints,
            )
            .unwrap();
        let restored = pipeline.deserialize_all(&bytes).unwrap();

        assert!(restored.bodies.contains(body));
        assert!(!restored.bodies.contains(doomed));
        assert!(restored.colliders.contains(ball));
        assert_eq!(restored.bodies.rb_translation(body).unwrap().z(), 3.0);
        assert_eq!(restored.gravity().y(), -9.81);
    }

    #[test]
    fn garbage_is_rejected() {
        let pipeline = RawSerializationPipeline::new();
        assert!(matches!(
            pipeline.deserialize_all(b"not a snapshot"),
            Err(EngineError::Snapshot(_))
        ));
    }
}
