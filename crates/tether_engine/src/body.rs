//! Raw rigid-body set

use crate::arena::Arena;
use crate::error::{finite, non_negative, EngineError};
use crate::scratch::{RawRotation, RawVector};
use crate::{RawColliderSet, RawImpulseJointSet, RawMultibodyJointSet};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Motion model of a rigid body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RawBodyType {
    Dynamic = 0,
    Fixed = 1,
    KinematicPositionBased = 2,
    KinematicVelocityBased = 3,
}

/// Creation parameters for [`RawRigidBodySet::create`].
pub struct RawBodyInit<'a> {
    pub body_type: RawBodyType,
    pub translation: &'a RawVector,
    pub rotation: &'a RawRotation,
    pub linvel: &'a RawVector,
    pub angvel: &'a RawVector,
    pub gravity_scale: f32,
    pub additional_mass: f32,
    pub can_sleep: bool,
    pub sleeping: bool,
    pub enabled: bool,
    pub user_data: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct RawRigidBody {
    pub body_type: RawBodyType,
    pub translation: Vec3,
    pub rotation: Quat,
    pub linvel: Vec3,
    pub angvel: Vec3,
    pub force: Vec3,
    pub next_translation: Option<Vec3>,
    pub gravity_scale: f32,
    pub additional_mass: f32,
    pub collider_mass: f32,
    pub can_sleep: bool,
    pub sleeping: bool,
    pub sleep_timer: f32,
    pub enabled: bool,
    pub user_data: u64,
    pub colliders: Vec<u64>,
}

impl RawRigidBody {
    #[inline]
    pub fn mass(&self) -> f32 {
        self.additional_mass + self.collider_mass
    }

    pub fn wake_up(&mut self) {
        self.sleeping = false;
        self.sleep_timer = 0.0;
    }
}

/// Engine-side storage of every rigid body in a world.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawRigidBodySet {
    bodies: Arena<RawRigidBody>,
}

impl RawRigidBodySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.len() == 0
    }

    pub fn contains(&self, handle: u64) -> bool {
        self.bodies.contains(handle)
    }

    /// Create a rigid body and return its handle.
    pub fn create(&mut self, init: RawBodyInit<'_>) -> Result<u64, EngineError> {
        let translation = init.translation.value();
        let rotation = init.rotation.value();
        let linvel = init.linvel.value();
        let angvel = init.angvel.value();
        for (name, v) in [
            ("translation", translation),
            ("linvel", linvel),
            ("angvel", angvel),
        ] {
            if !v.is_finite() {
                return Err(EngineError::InvalidParameter { name, value: v.length() });
            }
        }
        if !rotation.is_finite() || rotation.length_squared() < f32::EPSILON {
            return Err(EngineError::InvalidParameter {
                name: "rotation",
                value: rotation.length(),
            });
        }

        let body = RawRigidBody {
            body_type: init.body_type,
            translation,
            rotation: rotation.normalize(),
            linvel,
            angvel,
            force: Vec3::ZERO,
            next_translation: None,
            gravity_scale: finite("gravity_scale", init.gravity_scale)?,
            additional_mass: non_negative("additional_mass", init.additional_mass)?,
            collider_mass: 0.0,
            can_sleep: init.can_sleep,
            sleeping: init.sleeping,
            sleep_timer: 0.0,
            enabled: init.enabled,
            user_data: init.user_data,
            colliders: Vec::new(),
        };
        let handle = self.bodies.insert(body);
        tracing::trace!(handle, "raw body created");
        Ok(handle)
    }

    /// Remove a rigid body along with its colliders and attached joints.
    ///
    /// Removing an unknown handle does nothing.
    pub fn remove(
        &mut self,
        handle: u64,
        colliders: &mut RawColliderSet,
        impulse_joints: &mut RawImpulseJointSet,
        multibody_joints: &mut RawMultibodyJointSet,
    ) {
        let Some(body) = self.bodies.remove(handle) else {
            return;
        };
        for collider in body.colliders {
            colliders.remove_detached(collider);
        }
        let joints = impulse_joints.remove_attached(handle, self);
        let links = multibody_joints.remove_attached(handle, self);
        tracing::trace!(
            handle,
            impulse_joints = joints,
            multibody_joints = links,
            "raw body removed"
        );
    }

    /// Remove every body the way [`remove`](Self::remove) would.
    ///
    /// The slots are retired, not reset, so handles issued before the clear
    /// never resolve to bodies created after it.
    pub fn clear(
        &mut self,
        colliders: &mut RawColliderSet,
        impulse_joints: &mut RawImpulseJointSet,
        multibody_joints: &mut RawMultibodyJointSet,
    ) -> usize {
        let handles: Vec<u64> = self.bodies.iter().map(|(handle, _)| handle).collect();
        for &handle in &handles {
            self.remove(handle, colliders, impulse_joints, multibody_joints);
        }
        handles.len()
    }

    /// Visit every live handle in slot order.
    pub fn for_each_handle(&self, mut visit: impl FnMut(u64)) {
        for (handle, _) in self.bodies.iter() {
            visit(handle);
        }
    }

    pub(crate) fn get(&self, handle: u64) -> Option<&RawRigidBody> {
        self.bodies.get(handle)
    }

    pub(crate) fn get_mut(&mut self, handle: u64) -> Option<&mut RawRigidBody> {
        self.bodies.get_mut(handle)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (u64, &mut RawRigidBody)> + '_ {
        self.bodies.iter_mut()
    }

    pub(crate) fn wake_up(&mut self, handle: u64) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.wake_up();
        }
    }

    pub(crate) fn attach_collider(&mut self, handle: u64, collider: u64, mass: f32) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.colliders.push(collider);
            body.collider_mass += mass;
        }
    }

    pub(crate) fn detach_collider(&mut self, handle: u64, collider: u64, mass: f32) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.colliders.retain(|&c| c != collider);
            body.collider_mass = (body.collider_mass - mass).max(0.0);
        }
    }

    // Field accessors

    pub fn rb_translation(&self, handle: u64) -> Option<RawVector> {
        self.get(handle).map(|b| b.translation.into())
    }

    pub fn rb_set_translation(&mut self, handle: u64, translation: &RawVector, wake_up: bool) {
        if let Some(body) = self.get_mut(handle) {
            body.translation = translation.value();
            if wake_up {
                body.wake_up();
            }
        }
    }

    pub fn rb_rotation(&self, handle: u64) -> Option<RawRotation> {
        self.get(handle).map(|b| b.rotation.into())
    }

    pub fn rb_set_rotation(&mut self, handle: u64, rotation: &RawRotation, wake_up: bool) {
        if let Some(body) = self.get_mut(handle) {
            body.rotation = rotation.value().normalize();
            if wake_up {
                body.wake_up();
            }
        }
    }

    pub fn rb_linvel(&self, handle: u64) -> Option<RawVector> {
        self.get(handle).map(|b| b.linvel.into())
    }

    pub fn rb_set_linvel(&mut self, handle: u64, linvel: &RawVector, wake_up: bool) {
        if let Some(body) = self.get_mut(handle) {
            body.linvel = linvel.value();
            if wake_up {
                body.wake_up();
            }
        }
    }

    pub fn rb_angvel(&self, handle: u64) -> Option<RawVector> {
        self.get(handle).map(|b| b.angvel.into())
    }

    pub fn rb_set_angvel(&mut self, handle: u64, angvel: &RawVector, wake_up: bool) {
        if let Some(body) = self.get_mut(handle) {
            body.angvel = angvel.value();
            if wake_up {
                body.wake_up();
            }
        }
    }

    /// Schedule the target position of a position-based kinematic body.
    pub fn rb_set_next_kinematic_translation(&mut self, handle: u64, translation: &RawVector) {
        if let Some(body) = self.get_mut(handle) {
            if body.body_type == RawBodyType::KinematicPositionBased {
                body.next_translation = Some(translation.value());
            }
        }
    }

    /// Apply an instantaneous impulse to a dynamic body.
    pub fn rb_apply_impulse(&mut self, handle: u64, impulse: &RawVector, wake_up: bool) {
        if let Some(body) = self.get_mut(handle) {
            let mass = body.mass();
            if body.body_type == RawBodyType::Dynamic && mass > 0.0 {
                body.linvel += impulse.value() / mass;
                if wake_up {
                    body.wake_up();
                }
            }
        }
    }

    /// Accumulate a force applied at every step until reset.
    pub fn rb_add_force(&mut self, handle: u64, force: &RawVector, wake_up: bool) {
        if let Some(body) = self.get_mut(handle) {
            if body.body_type == RawBodyType::Dynamic {
                body.force += force.value();
                if wake_up {
                    body.wake_up();
                }
            }
        }
    }

    pub fn rb_reset_forces(&mut self, handle: u64, wake_up: bool) {
        if let Some(body) = self.get_mut(handle) {
            body.force = Vec3::ZERO;
            if wake_up {
                body.wake_up();
            }
        }
    }

    pub fn rb_body_type(&self, handle: u64) -> Option<RawBodyType> {
        self.get(handle).map(|b| b.body_type)
    }

    pub fn rb_set_body_type(&mut self, handle: u64, body_type: RawBodyType, wake_up: bool) {
        if let Some(body) = self.get_mut(handle) {
            body.body_type = body_type;
            body.next_translation = None;
            if body_type == RawBodyType::Fixed {
                body.linvel = Vec3::ZERO;
                body.angvel = Vec3::ZERO;
            }
            if wake_up {
                body.wake_up();
            }
        }
    }

    pub fn rb_is_dynamic(&self, handle: u64) -> Option<bool> {
        self.rb_body_type(handle).map(|t| t == RawBodyType::Dynamic)
    }

    pub fn rb_is_fixed(&self, handle: u64) -> Option<bool> {
        self.rb_body_type(handle).map(|t| t == RawBodyType::Fixed)
    }

    pub fn rb_is_kinematic(&self, handle: u64) -> Option<bool> {
        self.rb_body_type(handle).map(|t| {
            matches!(
                t,
                RawBodyType::KinematicPositionBased | RawBodyType::KinematicVelocityBased
            )
        })
    }

    pub fn rb_gravity_scale(&self, handle: u64) -> Option<f32> {
        self.get(handle).map(|b| b.gravity_scale)
    }

    pub fn rb_set_gravity_scale(&mut self, handle: u64, scale: f32, wake_up: bool) {
        if let Some(body) = self.get_mut(handle) {
            if scale.is_finite() {
                body.gravity_scale = scale;
            }
            if wake_up {
                body.wake_up();
            }
        }
    }

    pub fn rb_mass(&self, handle: u64) -> Option<f32> {
        self.get(handle).map(RawRigidBody::mass)
    }

    pub fn rb_is_sleeping(&self, handle: u64) -> Option<bool> {
        self.get(handle).map(|b| b.sleeping)
    }

    pub fn rb_sleep(&mut self, handle: u64) {
        if let Some(body) = self.get_mut(handle) {
            body.sleeping = true;
            body.linvel = Vec3::ZERO;
            body.angvel = Vec3::ZERO;
        }
    }

    pub fn rb_wake_up(&mut self, handle: u64) {
        self.wake_up(handle);
    }

    pub fn rb_is_enabled(&self, handle: u64) -> Option<bool> {
        self.get(handle).map(|b| b.enabled)
    }

    pub fn rb_set_enabled(&mut self, handle: u64, enabled: bool) {
        if let Some(body) = self.get_mut(handle) {
            body.enabled = enabled;
        }
    }

    pub fn rb_num_colliders(&self, handle: u64) -> Option<usize> {
        self.get(handle).map(|b| b.colliders.len())
    }

    pub fn rb_collider(&self, handle: u64, at: usize) -> Option<u64> {
        self.get(handle)?.colliders.get(at).copied()
    }

    pub fn rb_user_data(&self, handle: u64) -> Option<u64> {
        self.get(handle).map(|b| b.user_data)
    }

    pub fn rb_set_user_data(&mut self, handle: u64, data: u64) {
        if let Some(body) = self.get_mut(handle) {
            body.user_data = data;
        }
    }
}
