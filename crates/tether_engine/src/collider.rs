//! Raw collider set

use crate::arena::Arena;
use crate::error::{non_negative, positive, EngineError};
use crate::scratch::{RawRotation, RawVector};
use crate::RawRigidBodySet;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Collision geometry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum RawShape {
    Ball { radius: f32 },
    Cuboid { half_extents: Vec3 },
    /// Capsule aligned with the local Y axis.
    Capsule { half_height: f32, radius: f32 },
}

impl RawShape {
    fn validate(self) -> Result<Self, EngineError> {
        match self {
            RawShape::Ball { radius } => {
                positive("radius", radius)?;
            }
            RawShape::Cuboid { half_extents } => {
                positive("half_extents.x", half_extents.x)?;
                positive("half_extents.y", half_extents.y)?;
                positive("half_extents.z", half_extents.z)?;
            }
            RawShape::Capsule {
                half_height,
                radius,
            } => {
                non_negative("half_height", half_height)?;
                positive("radius", radius)?;
            }
        }
        Ok(self)
    }

    pub fn volume(&self) -> f32 {
        match *self {
            RawShape::Ball { radius } => 4.0 / 3.0 * PI * radius.powi(3),
            RawShape::Cuboid { half_extents } => 8.0 * half_extents.x * half_extents.y * half_extents.z,
            RawShape::Capsule {
                half_height,
                radius,
            } => PI * radius * radius * (2.0 * half_height + 4.0 / 3.0 * radius),
        }
    }
}

/// Creation parameters for [`RawColliderSet::create`].
pub struct RawColliderInit<'a> {
    pub shape: RawShape,
    /// Position relative to the parent, or world position when unparented.
    pub translation: &'a RawVector,
    pub rotation: &'a RawRotation,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub sensor: bool,
    pub enabled: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct RawCollider {
    pub shape: RawShape,
    pub parent: Option<u64>,
    pub local_translation: Vec3,
    pub local_rotation: Quat,
    pub translation: Vec3,
    pub rotation: Quat,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub sensor: bool,
    pub enabled: bool,
}

impl RawCollider {
    #[inline]
    pub fn mass(&self) -> f32 {
        self.density * self.shape.volume()
    }

    pub fn sync_with_parent(&mut self, parent_translation: Vec3, parent_rotation: Quat) {
        self.translation = parent_translation + parent_rotation * self.local_translation;
        self.rotation = parent_rotation * self.local_rotation;
    }
}

/// Engine-side storage of every collider in a world.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawColliderSet {
    colliders: Arena<RawCollider>,
}

impl RawColliderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.len() == 0
    }

    pub fn contains(&self, handle: u64) -> bool {
        self.colliders.contains(handle)
    }

    /// Create a collider, optionally attached to `parent`.
    pub fn create(
        &mut self,
        init: RawColliderInit<'_>,
        parent: Option<u64>,
        bodies: &mut RawRigidBodySet,
    ) -> Result<u64, EngineError> {
        let shape = init.shape.validate()?;
        let density = non_negative("density", init.density)?;
        let friction = non_negative("friction", init.friction)?;
        let restitution = non_negative("restitution", init.restitution)?;
        let local_translation = init.translation.value();
        if !local_translation.is_finite() {
            return Err(EngineError::InvalidParameter {
                name: "translation",
                value: local_translation.length(),
            });
        }
        let local_rotation = init.rotation.value().normalize();

        let mut collider = RawCollider {
            shape,
            parent,
            local_translation,
            local_rotation,
            translation: local_translation,
            rotation: local_rotation,
            density,
            friction,
            restitution,
            sensor: init.sensor,
            enabled: init.enabled,
        };

        if let Some(parent) = parent {
            let body = bodies.get(parent).ok_or(EngineError::UnknownBody(parent))?;
            collider.sync_with_parent(body.translation, body.rotation);
            let mass = collider.mass();
            let handle = self.colliders.insert(collider);
            bodies.attach_collider(parent, handle, mass);
            bodies.wake_up(parent);
            Ok(handle)
        } else {
            Ok(self.colliders.insert(collider))
        }
    }

    /// Remove a collider and detach it from its parent body.
    pub fn remove(&mut self, handle: u64, bodies: &mut RawRigidBodySet, wake_up: bool) {
        let Some(collider) = self.colliders.remove(handle) else {
            return;
        };
        if let Some(parent) = collider.parent {
            bodies.detach_collider(parent, handle, collider.mass());
            if wake_up {
                bodies.wake_up(parent);
            }
        }
    }

    /// Remove every collider, detaching each from its parent.
    pub fn clear(&mut self, bodies: &mut RawRigidBodySet) -> usize {
        let handles: Vec<u64> = self.colliders.iter().map(|(handle, _)| handle).collect();
        for &handle in &handles {
            self.remove(handle, bodies, false);
        }
        handles.len()
    }

    /// Remove a collider whose parent has already been removed.
    pub(crate) fn remove_detached(&mut self, handle: u64) {
        self.colliders.remove(handle);
    }

    pub fn for_each_handle(&self, mut visit: impl FnMut(u64)) {
        for (handle, _) in self.colliders.iter() {
            visit(handle);
        }
    }

    /// Refresh world poses of parented colliders from their bodies.
    pub(crate) fn sync_with_bodies(&mut self, bodies: &RawRigidBodySet) {
        for (_, collider) in self.colliders.iter_mut() {
            if let Some(body) = collider.parent.and_then(|p| bodies.get(p)) {
                collider.sync_with_parent(body.translation, body.rotation);
            }
        }
    }

    fn get(&self, handle: u64) -> Option<&RawCollider> {
        self.colliders.get(handle)
    }

    fn get_mut(&mut self, handle: u64) -> Option<&mut RawCollider> {
        self.colliders.get_mut(handle)
    }

    // Field accessors

    pub fn coll_shape(&self, handle: u64) -> Option<RawShape> {
        self.get(handle).map(|c| c.shape)
    }

    /// Parent body of the collider, `Some(None)` when unparented.
    pub fn coll_parent(&self, handle: u64) -> Option<Option<u64>> {
        self.get(handle).map(|c| c.parent)
    }

    pub fn coll_translation(&self, handle: u64) -> Option<RawVector> {
        self.get(handle).map(|c| c.translation.into())
    }

    pub fn coll_rotation(&self, handle: u64) -> Option<RawRotation> {
        self.get(handle).map(|c| c.rotation.into())
    }

    pub fn coll_translation_wrt_parent(&self, handle: u64) -> Option<RawVector> {
        self.get(handle).map(|c| c.local_translation.into())
    }

    /// Move a collider. Parented colliders move relative to their body.
    pub fn coll_set_translation(&mut self, handle: u64, translation: &RawVector) {
        if let Some(collider) = self.get_mut(handle) {
            collider.local_translation = translation.value();
            if collider.parent.is_none() {
                collider.translation = collider.local_translation;
            }
        }
    }

    pub fn coll_density(&self, handle: u64) -> Option<f32> {
        self.get(handle).map(|c| c.density)
    }

    pub fn coll_mass(&self, handle: u64) -> Option<f32> {
        self.get(handle).map(RawCollider::mass)
    }

    pub fn coll_friction(&self, handle: u64) -> Option<f32> {
        self.get(handle).map(|c| c.friction)
    }

    pub fn coll_set_friction(&mut self, handle: u64, friction: f32) {
        if let Some(collider) = self.get_mut(handle) {
            if friction.is_finite() && friction >= 0.0 {
                collider.friction = friction;
            }
        }
    }

    pub fn coll_restitution(&self, handle: u64) -> Option<f32> {
        self.get(handle).map(|c| c.restitution)
    }

    pub fn coll_set_restitution(&mut self, handle: u64, restitution: f32) {
        if let Some(collider) = self.get_mut(handle) {
            if restitution.is_finite() && restitution >= 0.0 {
                collider.restitution = restitution;
            }
        }
    }

    pub fn coll_is_sensor(&self, handle: u64) -> Option<bool> {
        self.get(handle).map(|c| c.sensor)
    }

    pub fn coll_set_sensor(&mut self, handle: u64, sensor: bool) {
        if let Some(collider) = self.get_mut(handle) {
            collider.sensor = sensor;
        }
    }

    pub fn coll_is_enabled(&self, handle: u64) -> Option<bool> {
        self.get(handle).map(|c| c.enabled)
    }

    pub fn coll_set_enabled(&mut self, handle: u64, enabled: bool) {
        if let Some(collider) = self.get_mut(handle) {
            collider.enabled = enabled;
        }
    }
}
