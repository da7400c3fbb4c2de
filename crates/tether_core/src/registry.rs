// registry.rs - Sparse handle-indexed cache of host wrappers
//
// Slots are addressed by the decoded handle index. Holes left by deletions are
// kept so indices stay stable; the engine recycles them later.

use crate::handle::EntityHandle;
use std::fmt;
use std::marker::PhantomData;

/// Host-side cache mapping handle indices to wrapper values.
///
/// The registry never talks to the engine. It only records which wrappers
/// exist; the owning family set decides when an entry is created or evicted.
///
/// Invariant: `len()` equals the number of populated slots.
pub struct Registry<H, T> {
    slots: Vec<Option<T>>,
    len: usize,
    _handle: PhantomData<fn(H)>,
}

impl<H: EntityHandle, T> Registry<H, T> {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            len: 0,
            _handle: PhantomData,
        }
    }

    /// Store `value` at the slot addressed by `handle`.
    ///
    /// Grows the backing sequence with empty slots if needed. Overwrites an
    /// existing value without changing the population count.
    pub fn set(&mut self, handle: H, value: T) {
        let index = handle.index() as usize;
        if index >= self.slots.len() {
            tracing::trace!(from = self.slots.len(), to = index + 1, "registry grow");
            self.slots.resize_with(index + 1, || None);
        }

        let slot = &mut self.slots[index];
        if slot.is_none() {
            self.len += 1;
        }
        *slot = Some(value);
    }

    /// Look up the wrapper stored for `handle`.
    ///
    /// Returns `None` for out-of-range indices and empty slots.
    #[inline]
    pub fn get(&self, handle: H) -> Option<&T> {
        self.slots.get(handle.index() as usize)?.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        self.slots.get_mut(handle.index() as usize)?.as_mut()
    }

    /// Evict the wrapper stored for `handle`, returning it.
    ///
    /// Deleting an empty or out-of-range slot is a no-op.
    pub fn delete(&mut self, handle: H) -> Option<T> {
        let removed = self.slots.get_mut(handle.index() as usize)?.take();
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Number of populated slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Visit every stored wrapper in index order, skipping holes.
    pub fn for_each(&self, mut visit: impl FnMut(&T)) {
        for value in self.iter() {
            visit(value);
        }
    }

    /// Iterate stored wrappers in index order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Collect every stored wrapper in index order.
    pub fn get_all(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Drop every cached wrapper. Does not touch the engine.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.len = 0;
    }
}

impl<H: EntityHandle, T> Default for Registry<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H, T: fmt::Debug> fmt::Debug for Registry<H, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("len", &self.len)
            .field("capacity", &self.slots.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::Handle;

    fn h(index: u32, generation: u32) -> Handle {
        Handle::from_raw(((generation as u64) << 32) | index as u64)
    }

    fn populated(registry: &Registry<Handle, &'static str>, max: u32) -> usize {
        (0..=max).filter(|&i| registry.get(h(i, 0)).is_some()).count()
    }

    #[test]
    fn set_grows_with_holes() {
        let mut registry = Registry::new();
        registry.set(h(4, 0), "four");

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(h(4, 0)), Some(&"four"));
        for i in 0..4 {
            assert_eq!(registry.get(h(i, 0)), None);
        }
        assert_eq!(registry.get(h(100, 0)), None);
    }

    #[test]
    fn overwrite_does_not_double_count() {
        let mut registry = Registry::new();
        registry.set(h(1, 0), "a");
        registry.set(h(1, 0), "b");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(h(1, 0)), Some(&"b"));
    }

    #[test]
    fn lookup_ignores_generation() {
        let mut registry = Registry::new();
        registry.set(h(2, 0), "old");
        // The slot belongs to whichever wrapper was last stored at the index.
        registry.set(h(2, 1), "new");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(h(2, 0)), Some(&"new"));
    }

    #[test]
    fn delete_is_idempotent() {
        let mut registry = Registry::new();
        registry.set(h(0, 0), "a");
        registry.set(h(1, 0), "b");

        assert_eq!(registry.delete(h(0, 0)), Some("a"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.delete(h(0, 0)), None);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.delete(h(57, 0)), None);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get_all(), vec!["b"]);
    }

    #[test]
    fn len_tracks_population_through_mixed_ops() {
        let mut registry = Registry::new();
        let mut state: u32 = 0x9E37_79B9;
        for step in 0..500u32 {
            // xorshift keeps the sequence deterministic
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let index = state % 32;
            if step % 3 == 0 {
                registry.delete(h(index, 0));
            } else {
                registry.set(h(index, 0), "x");
            }
            assert_eq!(registry.len(), populated(&registry, 40));
            assert_eq!(registry.iter().count(), registry.len());
        }
    }

    #[test]
    fn iteration_skips_holes_in_index_order() {
        let mut registry = Registry::new();
        registry.set(h(3, 0), "c");
        registry.set(h(0, 0), "a");
        registry.set(h(1, 0), "b");
        registry.delete(h(1, 0));
        registry.set(h(5, 0), "d");
        registry.delete(h(5, 0));

        let mut seen = Vec::new();
        registry.for_each(|v| seen.push(*v));
        assert_eq!(seen, vec!["a", "c"]);
        assert_eq!(registry.get_all(), vec!["a", "c"]);
    }

    #[test]
    fn clear_resets_population() {
        let mut registry = Registry::new();
        registry.set(h(0, 0), "a");
        registry.set(h(9, 0), "b");
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.get(h(9, 0)), None);
        assert!(registry.get_all().is_empty());
    }
}
