//! Time stepping
//!
//! Integrates body motion and keeps collider poses in sync. Contact
//! generation and joint constraint solving are not performed here.

use crate::body::RawBodyType;
use crate::scratch::RawVector;
use crate::{RawColliderSet, RawImpulseJointSet, RawMultibodyJointSet, RawRigidBodySet};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Step configuration, passed by value on every call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawIntegrationParameters {
    pub dt: f32,
    pub substeps: u32,
    pub linear_sleep_threshold: f32,
    pub angular_sleep_threshold: f32,
    pub time_until_sleep: f32,
}

impl Default for RawIntegrationParameters {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            substeps: 1,
            linear_sleep_threshold: 0.1,
            angular_sleep_threshold: 0.1,
            time_until_sleep: 2.0,
        }
    }
}

/// Stateless stepping entry point.
#[derive(Debug, Default)]
pub struct RawPhysicsPipeline {
    steps: u64,
}

impl RawPhysicsPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of steps taken so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn step(
        &mut self,
        gravity: &RawVector,
        params: &RawIntegrationParameters,
        bodies: &mut RawRigidBodySet,
        colliders: &mut RawColliderSet,
        _impulse_joints: &mut RawImpulseJointSet,
        _multibody_joints: &mut RawMultibodyJointSet,
    ) {
        let gravity = gravity.value();
        let dt = params.dt.max(0.0);
        let substeps = params.substeps.max(1);
        let h = dt / substeps as f32;

        for (_, body) in bodies.iter_mut() {
            if !body.enabled || body.sleeping {
                continue;
            }
            match body.body_type {
                RawBodyType::Fixed => {}
                RawBodyType::Dynamic => {
                    let mass = body.mass();
                    for _ in 0..substeps {
                        let mut accel = gravity * body.gravity_scale;
                        if mass > 0.0 {
                            accel += body.force / mass;
                        }
                        body.linvel += accel * h;
                        body.translation += body.linvel * h;
                        body.rotation = integrate_rotation(body.rotation, body.angvel, h);
                    }

                    if body.can_sleep
                        && body.linvel.length() < params.linear_sleep_threshold
                        && body.angvel.length() < params.angular_sleep_threshold
                        && body.force == Vec3::ZERO
                    {
                        body.sleep_timer += dt;
                        if body.sleep_timer >= params.time_until_sleep {
                            body.sleeping = true;
                            body.linvel = Vec3::ZERO;
                            body.angvel = Vec3::ZERO;
                        }
                    } else {
                        body.sleep_timer = 0.0;
                    }
                }
                RawBodyType::KinematicVelocityBased => {
                    body.translation += body.linvel * dt;
                    body.rotation = integrate_rotation(body.rotation, body.angvel, dt);
                }
                RawBodyType::KinematicPositionBased => {
                    if let Some(next) = body.next_translation.take() {
                        if dt > 0.0 {
                            body.linvel = (next - body.translation) / dt;
                        }
                        body.translation = next;
                    } else {
                        body.linvel = Vec3::ZERO;
                    }
                }
            }
        }

        colliders.sync_with_bodies(bodies);
        self.steps += 1;
    }
}

fn integrate_rotation(rotation: Quat, angvel: Vec3, dt: f32) -> Quat {
    if angvel == Vec3::ZERO {
        return rotation;
    }
    (Quat::from_scaled_axis(angvel * dt) * rotation).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::tests::create_body;
    use crate::collider::tests::create_ball;

    struct Sets {
        bodies: RawRigidBodySet,
        colliders: RawColliderSet,
        impulse_joints: RawImpulseJointSet,
        multibody_joints: RawMultibodyJointSet,
    }

    impl Sets {
        fn new() -> Self {
            Self {
                bodies: RawRigidBodySet::new(),
                colliders: RawColliderSet::new(),
                impulse_joints: RawImpulseJointSet::new(),
                multibody_joints: RawMultibodyJointSet::new(),
            }
        }

        fn step(&mut self, pipeline: &mut RawPhysicsPipeline, params: &RawIntegrationParameters) {
            let gravity = RawVector::new(0.0, -10.0, 0.0);
            pipeline.step(
                &gravity,
                params,
                &mut self.bodies,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
            );
        }
    }

    #[test]
    fn dynamic_body_falls_fixed_body_stays() {
        let mut sets = Sets::new();
        let mut pipeline = RawPhysicsPipeline::new();
        let params = RawIntegrationParameters::default();
        let falling = create_body(&mut sets.bodies, RawBodyType::Dynamic, Vec3::new(0.0, 10.0, 0.0));
        let ground = create_body(&mut sets.bodies, RawBodyType::Fixed, Vec3::ZERO);
        let ball = create_ball(&mut sets.colliders, &mut sets.bodies, Some(falling), Vec3::ZERO).unwrap();

        for _ in 0..10 {
            sets.step(&mut pipeline, &params);
        }

        let y = sets.bodies.rb_translation(falling).unwrap().y();
        assert!(y < 10.0);
        assert_eq!(sets.bodies.rb_translation(ground).unwrap().y(), 0.0);
        assert_eq!(sets.colliders.coll_translation(ball).unwrap().y(), y);
        assert_eq!(pipeline.steps(), 10);
    }

    #[test]
    fn resting_body_falls_asleep() {
        let mut sets = Sets::new();
        let mut pipeline = RawPhysicsPipeline::new();
        let params = RawIntegrationParameters {
            time_until_sleep: 0.05,
            ..Default::default()
        };
        let body = create_body(&mut sets.bodies, RawBodyType::Dynamic, Vec3::ZERO);
        sets.bodies.rb_set_gravity_scale(body, 0.0, false);

        for _ in 0..5 {
            sets.step(&mut pipeline, &params);
        }
        assert_eq!(sets.bodies.rb_is_sleeping(body), Some(true));
    }

    #[test]
    fn position_based_kinematic_reaches_target() {
        let mut sets = Sets::new();
        let mut pipeline = RawPhysicsPipeline::new();
        let params = RawIntegrationParameters::default();
        let body = create_body(&mut sets.bodies, RawBodyType::KinematicPositionBased, Vec3::ZERO);
        sets.bodies
            .rb_set_next_kinematic_translation(body, &RawVector::new(1.0, 0.0, 0.0));

        sets.step(&mut pipeline, &params);
        assert_eq!(sets.bodies.rb_translation(body).unwrap().x(), 1.0);
        assert!(sets.bodies.rb_linvel(body).unwrap().x() > 0.0);
    }
}
