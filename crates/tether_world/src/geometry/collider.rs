//! Collider wrapper and descriptor

use crate::marshal::{quat, raw_vector, vec3};
use crate::Shared;
use std::fmt;
use std::rc::Rc;
use tether_core::math::{Quat, Vec3};
use tether_core::{ColliderHandle, EntityHandle, RigidBodyHandle};
use tether_engine::{RawColliderSet, RawShape};

/// Collision geometry of a collider.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Ball { radius: f32 },
    Cuboid { half_extents: Vec3 },
    /// Capsule aligned with the local Y axis.
    Capsule { half_height: f32, radius: f32 },
}

impl From<Shape> for RawShape {
    fn from(shape: Shape) -> Self {
        match shape {
            Shape::Ball { radius } => RawShape::Ball { radius },
            Shape::Cuboid { half_extents } => RawShape::Cuboid { half_extents },
            Shape::Capsule {
                half_height,
                radius,
            } => RawShape::Capsule {
                half_height,
                radius,
            },
        }
    }
}

impl From<RawShape> for Shape {
    fn from(raw: RawShape) -> Self {
        match raw {
            RawShape::Ball { radius } => Shape::Ball { radius },
            RawShape::Cuboid { half_extents } => Shape::Cuboid { half_extents },
            RawShape::Capsule {
                half_height,
                radius,
            } => Shape::Capsule {
                half_height,
                radius,
            },
        }
    }
}

/// Host-side view of one collider.
#[derive(Clone)]
pub struct Collider {
    handle: ColliderHandle,
    raw: Shared<RawColliderSet>,
}

impl Collider {
    pub(crate) fn new(raw: Shared<RawColliderSet>, handle: ColliderHandle) -> Self {
        Self { handle, raw }
    }

    #[inline]
    pub fn handle(&self) -> ColliderHandle {
        self.handle
    }

    #[inline]
    fn bits(&self) -> u64 {
        self.handle.to_raw()
    }

    pub fn is_valid(&self) -> bool {
        self.raw.borrow().contains(self.bits())
    }

    pub fn shape(&self) -> Option<Shape> {
        self.raw.borrow().coll_shape(self.bits()).map(Into::into)
    }

    /// Body this collider is attached to. `None` for free colliders and for
    /// removed ones.
    pub fn parent(&self) -> Option<RigidBodyHandle> {
        self.raw
            .borrow()
            .coll_parent(self.bits())
            .flatten()
            .map(RigidBodyHandle::from_raw)
    }

    /// World-space translation. Parented colliders follow their body after
    /// each step.
    pub fn translation(&self) -> Option<Vec3> {
        self.raw.borrow().coll_translation(self.bits()).map(vec3)
    }

    pub fn rotation(&self) -> Option<Quat> {
        self.raw.borrow().coll_rotation(self.bits()).map(quat)
    }

    pub fn translation_wrt_parent(&self) -> Option<Vec3> {
        self.raw
            .borrow()
            .coll_translation_wrt_parent(self.bits())
            .map(vec3)
    }

    pub fn set_translation(&self, translation: Vec3) {
        let translation = raw_vector(translation);
        self.raw
            .borrow_mut()
            .coll_set_translation(self.bits(), &translation);
    }

    pub fn density(&self) -> Option<f32> {
        self.raw.borrow().coll_density(self.bits())
    }

    pub fn mass(&self) -> Option<f32> {
        self.raw.borrow().coll_mass(self.bits())
    }

    pub fn friction(&self) -> Option<f32> {
        self.raw.borrow().coll_friction(self.bits())
    }

    pub fn set_friction(&self, friction: f32) {
        self.raw.borrow_mut().coll_set_friction(self.bits(), friction);
    }

    pub fn restitution(&self) -> Option<f32> {
        self.raw.borrow().coll_restitution(self.bits())
    }

    pub fn set_restitution(&self, restitution: f32) {
        self.raw
            .borrow_mut()
            .coll_set_restitution(self.bits(), restitution);
    }

    pub fn is_sensor(&self) -> bool {
        self.raw.borrow().coll_is_sensor(self.bits()).unwrap_or(false)
    }

    pub fn set_sensor(&self, sensor: bool) {
        self.raw.borrow_mut().coll_set_sensor(self.bits(), sensor);
    }

    pub fn is_enabled(&self) -> bool {
        self.raw.borrow().coll_is_enabled(self.bits()).unwrap_or(false)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.raw.borrow_mut().coll_set_enabled(self.bits(), enabled);
    }
}

impl PartialEq for Collider {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle && Rc::ptr_eq(&self.raw, &other.raw)
    }
}

impl fmt::Debug for Collider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collider")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

/// Description of a collider to create.
#[derive(Clone, Debug, PartialEq)]
pub struct ColliderDesc {
    pub shape: Shape,
    /// Offset from the parent body, or world position for free colliders.
    pub translation: Vec3,
    pub rotation: Quat,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub sensor: bool,
    pub enabled: bool,
}

impl ColliderDesc {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            density: 1.0,
            friction: 0.5,
            restitution: 0.0,
            sensor: false,
            enabled: true,
        }
    }

    pub fn ball(radius: f32) -> Self {
        Self::new(Shape::Ball { radius })
    }

    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Self {
        Self::new(Shape::Cuboid {
            half_extents: Vec3::new(hx, hy, hz),
        })
    }

    pub fn capsule(half_height: f32, radius: f32) -> Self {
        Self::new(Shape::Capsule {
            half_height,
            radius,
        })
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_sensor(mut self, sensor: bool) -> Self {
        self.sensor = sensor;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}
