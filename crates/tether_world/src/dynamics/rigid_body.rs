//! Rigid-body wrapper and descriptor

use crate::marshal::{quat, raw_rotation, raw_vector, vec3};
use crate::Shared;
use std::fmt;
use std::rc::Rc;
use tether_core::math::{Quat, Vec3};
use tether_core::{ColliderHandle, EntityHandle, RigidBodyHandle};
use tether_engine::{RawBodyType, RawRigidBodySet};

/// Motion model of a rigid body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RigidBodyType {
    /// Moved by forces, gravity and impulses.
    Dynamic,
    /// Never moves.
    Fixed,
    /// Moved by setting its next position each step.
    KinematicPositionBased,
    /// Moved by setting its velocity.
    KinematicVelocityBased,
}

impl From<RigidBodyType> for RawBodyType {
    fn from(body_type: RigidBodyType) -> Self {
        match body_type {
            RigidBodyType::Dynamic => RawBodyType::Dynamic,
            RigidBodyType::Fixed => RawBodyType::Fixed,
            RigidBodyType::KinematicPositionBased => RawBodyType::KinematicPositionBased,
            RigidBodyType::KinematicVelocityBased => RawBodyType::KinematicVelocityBased,
        }
    }
}

impl From<RawBodyType> for RigidBodyType {
    fn from(raw: RawBodyType) -> Self {
        match raw {
            RawBodyType::Dynamic => RigidBodyType::Dynamic,
            RawBodyType::Fixed => RigidBodyType::Fixed,
            RawBodyType::KinematicPositionBased => RigidBodyType::KinematicPositionBased,
            RawBodyType::KinematicVelocityBased => RigidBodyType::KinematicVelocityBased,
        }
    }
}

/// Host-side view of one rigid body.
///
/// Holds only the handle and a shared reference to the engine set; every
/// accessor reads live engine state. Accessors return `None` (or `false`)
/// once the body has been removed.
#[derive(Clone)]
pub struct RigidBody {
    handle: RigidBodyHandle,
    raw: Shared<RawRigidBodySet>,
}

impl RigidBody {
    pub(crate) fn new(raw: Shared<RawRigidBodySet>, handle: RigidBodyHandle) -> Self {
        Self { handle, raw }
    }

    #[inline]
    pub fn handle(&self) -> RigidBodyHandle {
        self.handle
    }

    #[inline]
    fn bits(&self) -> u64 {
        self.handle.to_raw()
    }

    /// Ask the engine whether this body still exists.
    pub fn is_valid(&self) -> bool {
        self.raw.borrow().contains(self.bits())
    }

    pub fn body_type(&self) -> Option<RigidBodyType> {
        self.raw.borrow().rb_body_type(self.bits()).map(Into::into)
    }

    pub fn set_body_type(&self, body_type: RigidBodyType, wake_up: bool) {
        self.raw
            .borrow_mut()
            .rb_set_body_type(self.bits(), body_type.into(), wake_up);
    }

    pub fn is_dynamic(&self) -> bool {
        self.raw.borrow().rb_is_dynamic(self.bits()).unwrap_or(false)
    }

    pub fn is_fixed(&self) -> bool {
        self.raw.borrow().rb_is_fixed(self.bits()).unwrap_or(false)
    }

    pub fn is_kinematic(&self) -> bool {
        self.raw.borrow().rb_is_kinematic(self.bits()).unwrap_or(false)
    }

    pub fn translation(&self) -> Option<Vec3> {
        self.raw.borrow().rb_translation(self.bits()).map(vec3)
    }

    pub fn set_translation(&self, translation: Vec3, wake_up: bool) {
        let translation = raw_vector(translation);
        self.raw
            .borrow_mut()
            .rb_set_translation(self.bits(), &translation, wake_up);
    }

    pub fn rotation(&self) -> Option<Quat> {
        self.raw.borrow().rb_rotation(self.bits()).map(quat)
    }

    pub fn set_rotation(&self, rotation: Quat, wake_up: bool) {
        let rotation = raw_rotation(rotation);
        self.raw
            .borrow_mut()
            .rb_set_rotation(self.bits(), &rotation, wake_up);
    }

    /// Target position for the next step. Only affects position-based
    /// kinematic bodies.
    pub fn set_next_kinematic_translation(&self, translation: Vec3) {
        let translation = raw_vector(translation);
        self.raw
            .borrow_mut()
            .rb_set_next_kinematic_translation(self.bits(), &translation);
    }

    pub fn linvel(&self) -> Option<Vec3> {
        self.raw.borrow().rb_linvel(self.bits()).map(vec3)
    }

    pub fn set_linvel(&self, linvel: Vec3, wake_up: bool) {
        let linvel = raw_vector(linvel);
        self.raw
            .borrow_mut()
            .rb_set_linvel(self.bits(), &linvel, wake_up);
    }

    pub fn angvel(&self) -> Option<Vec3> {
        self.raw.borrow().rb_angvel(self.bits()).map(vec3)
    }

    pub fn set_angvel(&self, angvel: Vec3, wake_up: bool) {
        let angvel = raw_vector(angvel);
        self.raw
            .borrow_mut()
            .rb_set_angvel(self.bits(), &angvel, wake_up);
    }

    pub fn apply_impulse(&self, impulse: Vec3, wake_up: bool) {
        let impulse = raw_vector(impulse);
        self.raw
            .borrow_mut()
            .rb_apply_impulse(self.bits(), &impulse, wake_up);
    }

    /// Add a force that keeps acting until [`RigidBody::reset_forces`].
    pub fn add_force(&self, force: Vec3, wake_up: bool) {
        let force = raw_vector(force);
        self.raw
            .borrow_mut()
            .rb_add_force(self.bits(), &force, wake_up);
    }

    pub fn reset_forces(&self, wake_up: bool) {
        self.raw.borrow_mut().rb_reset_forces(self.bits(), wake_up);
    }

    pub fn gravity_scale(&self) -> Option<f32> {
        self.raw.borrow().rb_gravity_scale(self.bits())
    }

    pub fn set_gravity_scale(&self, scale: f32, wake_up: bool) {
        self.raw
            .borrow_mut()
            .rb_set_gravity_scale(self.bits(), scale, wake_up);
    }

    /// Additional mass plus the mass contributed by attached colliders.
    pub fn mass(&self) -> Option<f32> {
        self.raw.borrow().rb_mass(self.bits())
    }

    pub fn is_sleeping(&self) -> bool {
        self.raw.borrow().rb_is_sleeping(self.bits()).unwrap_or(false)
    }

    pub fn sleep(&self) {
        self.raw.borrow_mut().rb_sleep(self.bits());
    }

    pub fn wake_up(&self) {
        self.raw.borrow_mut().rb_wake_up(self.bits());
    }

    pub fn is_enabled(&self) -> bool {
        self.raw.borrow().rb_is_enabled(self.bits()).unwrap_or(false)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.raw.borrow_mut().rb_set_enabled(self.bits(), enabled);
    }

    pub fn num_colliders(&self) -> usize {
        self.raw
            .borrow()
            .rb_num_colliders(self.bits())
            .unwrap_or(0)
    }

    /// Handle of the `at`-th collider attached to this body.
    pub fn collider(&self, at: usize) -> Option<ColliderHandle> {
        self.raw
            .borrow()
            .rb_collider(self.bits(), at)
            .map(ColliderHandle::from_raw)
    }

    pub fn user_data(&self) -> Option<u64> {
        self.raw.borrow().rb_user_data(self.bits())
    }

    pub fn set_user_data(&self, data: u64) {
        self.raw.borrow_mut().rb_set_user_data(self.bits(), data);
    }
}

impl PartialEq for RigidBody {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle && Rc::ptr_eq(&self.raw, &other.raw)
    }
}

impl fmt::Debug for RigidBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RigidBody")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

/// Description of a rigid body to create.
#[derive(Clone, Debug, PartialEq)]
pub struct RigidBodyDesc {
    pub body_type: RigidBodyType,
    pub translation: Vec3,
    pub rotation: Quat,
    pub linvel: Vec3,
    pub angvel: Vec3,
    pub gravity_scale: f32,
    pub additional_mass: f32,
    pub can_sleep: bool,
    pub sleeping: bool,
    pub enabled: bool,
    pub user_data: u64,
}

impl RigidBodyDesc {
    pub fn new(body_type: RigidBodyType) -> Self {
        Self {
            body_type,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            linvel: Vec3::ZERO,
            angvel: Vec3::ZERO,
            gravity_scale: 1.0,
            additional_mass: 0.0,
            can_sleep: true,
            sleeping: false,
            enabled: true,
            user_data: 0,
        }
    }

    pub fn dynamic() -> Self {
        Self::new(RigidBodyType::Dynamic)
    }

    pub fn fixed() -> Self {
        Self::new(RigidBodyType::Fixed)
    }

    pub fn kinematic_position_based() -> Self {
        Self::new(RigidBodyType::KinematicPositionBased)
    }

    pub fn kinematic_velocity_based() -> Self {
        Self::new(RigidBodyType::KinematicVelocityBased)
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_linvel(mut self, linvel: Vec3) -> Self {
        self.linvel = linvel;
        self
    }

    pub fn with_angvel(mut self, angvel: Vec3) -> Self {
        self.angvel = angvel;
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    pub fn with_additional_mass(mut self, mass: f32) -> Self {
        self.additional_mass = mass;
        self
    }

    pub fn with_can_sleep(mut self, can_sleep: bool) -> Self {
        self.can_sleep = can_sleep;
        self
    }

    pub fn with_sleeping(mut self, sleeping: bool) -> Self {
        self.sleeping = sleeping;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_user_data(mut self, data: u64) -> Self {
        self.user_data = data;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::RigidBodySet;

    #[test]
    fn type_queries_match_their_names() {
        let mut bodies = RigidBodySet::new();
        let dynamic = bodies.create(&RigidBodyDesc::dynamic()).unwrap();
        let fixed = bodies.create(&RigidBodyDesc::fixed()).unwrap();
        let kinematic = bodies
            .create(&RigidBodyDesc::kinematic_velocity_based())
            .unwrap();

        assert!(dynamic.is_dynamic() && !dynamic.is_kinematic() && !dynamic.is_fixed());
        assert!(fixed.is_fixed() && !fixed.is_dynamic());
        assert!(kinematic.is_kinematic() && !kinematic.is_dynamic());

        kinematic.set_body_type(RigidBodyType::KinematicPositionBased, true);
        assert!(kinematic.is_kinematic());
        assert_eq!(
            kinematic.body_type(),
            Some(RigidBodyType::KinematicPositionBased)
        );
    }

    #[test]
    fn setters_write_through_to_the_engine() {
        let mut bodies = RigidBodySet::new();
        let body = bodies
            .create(&RigidBodyDesc::dynamic().with_sleeping(true))
            .unwrap();
        let alias = bodies.get(body.handle()).unwrap().clone();

        body.set_linvel(Vec3::new(1.0, 0.0, 0.0), true);
        body.set_rotation(Quat::from_rotation_y(0.5), false);
        body.set_user_data(42);

        assert!(!alias.is_sleeping());
        assert_eq!(alias.linvel(), Some(Vec3::X));
        assert!(alias
            .rotation()
            .unwrap()
            .abs_diff_eq(Quat::from_rotation_y(0.5), 1.0e-6));
        assert_eq!(alias.user_data(), Some(42));

        body.sleep();
        assert!(alias.is_sleeping());
    }

    #[test]
    fn descriptor_defaults() {
        let desc = RigidBodyDesc::dynamic();
        assert_eq!(desc.gravity_scale, 1.0);
        assert_eq!(desc.additional_mass, 0.0);
        assert!(desc.can_sleep && desc.enabled && !desc.sleeping);
        assert_eq!(desc.rotation, Quat::IDENTITY);
    }
}
