//! Conversions between host math types and engine scratch values
//!
//! Scratch values are released when they go out of scope, so callers keep
//! them as locals for exactly the duration of one engine call.

use tether_core::math::{Quat, Vec3};
use tether_engine::{RawRotation, RawVector};

#[inline]
pub(crate) fn raw_vector(v: Vec3) -> RawVector {
    RawVector::new(v.x, v.y, v.z)
}

#[inline]
pub(crate) fn raw_rotation(q: Quat) -> RawRotation {
    RawRotation::new(q.x, q.y, q.z, q.w)
}

/// Read a vector returned by the engine, releasing it.
#[inline]
pub(crate) fn vec3(raw: RawVector) -> Vec3 {
    Vec3::new(raw.x(), raw.y(), raw.z())
}

/// Read a rotation returned by the engine, releasing it.
#[inline]
pub(crate) fn quat(raw: RawRotation) -> Quat {
    Quat::from_xyzw(raw.x(), raw.y(), raw.z(), raw.w())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_engine::live_scratch_values;

    #[test]
    fn roundtrip_releases_scratch() {
        let before = live_scratch_values();
        let v = vec3(raw_vector(Vec3::new(1.0, -2.0, 3.5)));
        let q = quat(raw_rotation(Quat::from_rotation_z(0.25)));
        assert_eq!(v, Vec3::new(1.0, -2.0, 3.5));
        assert!(q.abs_diff_eq(Quat::from_rotation_z(0.25), 1.0e-6));
        assert_eq!(live_scratch_values(), before);
    }
}
