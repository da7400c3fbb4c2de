// arena.rs - Generational slot storage backing every raw set
//
// Freed slots go to a free list and get their generation bumped, so a handle
// captured before removal never resolves to the entity that reuses the slot.

use serde::{Deserialize, Serialize};

/// Pack an index and generation into the 64-bit handle format:
/// [32-bit generation | 32-bit index]
#[inline]
pub(crate) const fn pack(index: u32, generation: u32) -> u64 {
    ((generation as u64) << 32) | index as u64
}

#[inline]
pub(crate) const fn unpack(bits: u64) -> (u32, u32) {
    (bits as u32, (bits >> 32) as u32)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Insert a value (reuses a freed slot if available).
    pub fn insert(&mut self, value: T) -> u64 {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            pack(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                value: Some(value),
            });
            pack(index, 0)
        }
    }

    /// Remove a value (returns the slot to the pool and increments its generation).
    pub fn remove(&mut self, bits: u64) -> Option<T> {
        let (index, generation) = unpack(bits);
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, bits: u64) -> Option<&T> {
        let (index, generation) = unpack(bits);
        let slot = self.slots.get(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, bits: u64) -> Option<&mut T> {
        let (index, generation) = unpack(bits);
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        slot.value.as_mut()
    }

    #[inline]
    pub fn contains(&self, bits: u64) -> bool {
        self.get(bits).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Live entries with their handles, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (pack(index as u32, slot.generation), value))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u64, &mut T)> + '_ {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.value
                .as_mut()
                .map(|value| (pack(index as u32, generation), value))
        })
    }

    /// Remove every entry matching `pred`, returning the removed handles.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> Vec<u64> {
        let doomed: Vec<u64> = self
            .iter()
            .filter(|&(_, value)| pred(value))
            .map(|(bits, _)| bits)
            .collect();
        for &bits in &doomed {
            self.remove(bits);
        }
        doomed
    }

    /// Remove every entry. Slots keep their bumped generations, so no handle
    /// issued before the clear resolves again.
    pub fn clear(&mut self) -> usize {
        self.remove_where(|_| true).len()
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuse_bumps_generation() {
        let mut arena = Arena::new();
        let a = arena.insert("a");
        assert_eq!(arena.remove(a), Some("a"));
        let b = arena.insert("b");

        assert_eq!(unpack(a).0, unpack(b).0);
        assert_ne!(a, b);
        assert!(!arena.contains(a));
        assert_eq!(arena.get(b), Some(&"b"));
        assert_eq!(arena.remove(a), None);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn remove_where_reports_handles() {
        let mut arena = Arena::new();
        let one = arena.insert(1);
        let two = arena.insert(2);
        let three = arena.insert(3);

        let removed = arena.remove_where(|v| v % 2 == 1);
        assert_eq!(removed, vec![one, three]);
        assert_eq!(arena.iter().map(|(h, _)| h).collect::<Vec<_>>(), vec![two]);
    }

    #[test]
    fn clear_retires_every_generation() {
        let mut arena = Arena::new();
        let a = arena.insert('a');
        let b = arena.insert('b');

        assert_eq!(arena.clear(), 2);
        assert_eq!(arena.len(), 0);

        let c = arena.insert('c');
        let d = arena.insert('d');
        for stale in [a, b] {
            assert!(!arena.contains(stale));
            assert_ne!(stale, c);
            assert_ne!(stale, d);
        }
        assert_eq!(unpack(c).1, 1);
    }
}
