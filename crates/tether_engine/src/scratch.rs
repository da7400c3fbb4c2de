//! Transient engine-owned value objects
//!
//! Vectors and rotations cross the engine boundary as scratch values. Each
//! one is counted while alive and released exactly once when dropped.

use glam::{Quat, Vec3};
use std::cell::Cell;

thread_local! {
    static LIVE_SCRATCH: Cell<usize> = const { Cell::new(0) };
}

fn acquire() {
    LIVE_SCRATCH.with(|live| live.set(live.get() + 1));
}

fn release() {
    LIVE_SCRATCH.with(|live| live.set(live.get().saturating_sub(1)));
}

/// Number of scratch values currently alive on this thread.
pub fn live_scratch_values() -> usize {
    LIVE_SCRATCH.with(Cell::get)
}

/// A 3D vector owned by the engine.
#[derive(Debug)]
pub struct RawVector(Vec3);

impl RawVector {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        acquire();
        Self(Vec3::new(x, y, z))
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.0.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.0.y
    }

    #[inline]
    pub fn z(&self) -> f32 {
        self.0.z
    }

    pub(crate) fn value(&self) -> Vec3 {
        self.0
    }
}

impl From<Vec3> for RawVector {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl Drop for RawVector {
    fn drop(&mut self) {
        release();
    }
}

/// A unit quaternion owned by the engine.
#[derive(Debug)]
pub struct RawRotation(Quat);

impl RawRotation {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        acquire();
        Self(Quat::from_xyzw(x, y, z, w))
    }

    pub fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.0.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.0.y
    }

    #[inline]
    pub fn z(&self) -> f32 {
        self.0.z
    }

    #[inline]
    pub fn w(&self) -> f32 {
        self.0.w
    }

    pub(crate) fn value(&self) -> Quat {
        self.0
    }
}

impl From<Quat> for RawRotation {
    fn from(q: Quat) -> Self {
        Self::new(q.x, q.y, q.z, q.w)
    }
}

impl Drop for RawRotation {
    fn drop(&mut self) {
        release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_released_on_drop() {
        let before = live_scratch_values();
        {
            let v = RawVector::new(1.0, 2.0, 3.0);
            let r = RawRotation::identity();
            assert_eq!(live_scratch_values(), before + 2);
            assert_eq!(v.y(), 2.0);
            assert_eq!(r.w(), 1.0);
        }
        assert_eq!(live_scratch_values(), before);
    }
}
