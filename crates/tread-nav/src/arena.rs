//! Slot arena with generational indices.
//!
//! Removing a value bumps its slot's generation, so every [`Index`] handed out
//! for it stops resolving. Slots are reused.

use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Index {
    slot: u32,
    generation: u32,
}

impl Index {
    #[inline]
    pub fn slot(self) -> u32 {
        self.slot
    }

    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.slot, self.generation)
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
    reserved: bool,
}

#[derive(Debug)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocates an index without a value yet. Fill it with [`Arena::fill`]
    /// or give it back with [`Arena::release`].
    pub fn reserve(&mut self) -> Index {
        if let Some(slot) = self.free.pop() {
            let s = &mut self.slots[slot as usize];
            s.reserved = true;
            return Index {
                slot,
                generation: s.generation,
            };
        }
        let slot = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: None,
            reserved: true,
        });
        Index {
            slot,
            generation: 0,
        }
    }

    /// Stores `value` under a reserved index. Hands the value back if `id` is not reserved.
    pub fn fill(&mut self, id: Index, value: T) -> Result<(), T> {
        match self.slots.get_mut(id.slot as usize) {
            Some(s) if s.reserved && s.generation == id.generation => {
                s.value = Some(value);
                s.reserved = false;
                self.len += 1;
                Ok(())
            }
            _ => Err(value),
        }
    }

    /// Returns an unfilled reservation to the free list.
    pub fn release(&mut self, id: Index) {
        if let Some(s) = self.slots.get_mut(id.slot as usize) {
            if s.reserved && s.generation == id.generation {
                s.reserved = false;
                s.generation = s.generation.wrapping_add(1);
                self.free.push(id.slot);
            }
        }
    }

    pub fn insert_with(&mut self, make: impl FnOnce(Index) -> T) -> Index {
        let id = self.reserve();
        let slot = &mut self.slots[id.slot as usize];
        slot.value = Some(make(id));
        slot.reserved = false;
        self.len += 1;
        id
    }

    pub fn insert(&mut self, value: T) -> Index {
        self.insert_with(|_| value)
    }

    pub fn remove(&mut self, id: Index) -> Option<T> {
        let s = self.slots.get_mut(id.slot as usize)?;
        if s.generation != id.generation {
            return None;
        }
        let value = s.value.take()?;
        s.generation = s.generation.wrapping_add(1);
        self.free.push(id.slot);
        self.len -= 1;
        Some(value)
    }

    #[inline]
    pub fn get(&self, id: Index) -> Option<&T> {
        self.slots
            .get(id.slot as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.value.as_ref())
    }

    #[inline]
    pub fn get_mut(&mut self, id: Index) -> Option<&mut T> {
        self.slots
            .get_mut(id.slot as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.value.as_mut())
    }

    #[inline]
    pub fn contains(&self, id: Index) -> bool {
        self.get(id).is_some()
    }

    /// Mutable access to several distinct entries at once. Missing, stale or
    /// repeated indices yield `None` (a repeated index resolves only at its first position).
    pub fn get_disjoint_mut<const N: usize>(&mut self, ids: [Option<Index>; N]) -> [Option<&mut T>; N] {
        let mut out: [Option<&mut T>; N] = std::array::from_fn(|_| None);
        for (slot_idx, slot) in self.slots.iter_mut().enumerate() {
            let generation = slot.generation;
            let Some(value) = slot.value.as_mut() else {
                continue;
            };
            let hit = ids.iter().position(|id| {
                matches!(id, Some(id) if id.slot as usize == slot_idx && id.generation == generation)
            });
            if let Some(k) = hit {
                out[k] = Some(value);
            }
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (Index, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.value.as_ref().map(|v| {
                (
                    Index {
                        slot: i as u32,
                        generation: s.generation,
                    },
                    v,
                )
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Index, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, s)| {
            let generation = s.generation;
            s.value.as_mut().map(|v| {
                (
                    Index {
                        slot: i as u32,
                        generation,
                    },
                    v,
                )
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_indices_go_stale() {
        let mut arena = Arena::new();
        let a = arena.insert("a");
        assert_eq!(arena.remove(a), Some("a"));
        let b = arena.insert("b");
        assert_eq!(a.slot(), b.slot());
        assert_ne!(a, b);
        assert_eq!(arena.get(a), None);
        assert_eq!(arena.get(b), Some(&"b"));
        assert_eq!(arena.remove(a), None);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn reservations_fill_or_release() {
        let mut arena: Arena<u32> = Arena::new();
        let r = arena.reserve();
        assert!(!arena.contains(r));
        assert_eq!(arena.fill(r, 7), Ok(()));
        assert_eq!(arena.fill(r, 8), Err(8));
        assert_eq!(arena.get(r), Some(&7));

        let r2 = arena.reserve();
        arena.release(r2);
        assert_eq!(arena.fill(r2, 9), Err(9));
        let r3 = arena.reserve();
        assert_eq!(r3.slot(), r2.slot());
        assert_ne!(r3.generation(), r2.generation());
    }

    #[test]
    fn disjoint_access_hands_out_each_entry_once() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        let b = arena.insert(2);
        let c = arena.insert(3);
        arena.remove(c);
        let [x, y, z, w] = arena.get_disjoint_mut([Some(b), Some(a), Some(c), Some(b)]);
        assert_eq!(x.copied(), Some(2));
        assert_eq!(y.copied(), Some(1));
        assert!(z.is_none());
        assert!(w.is_none());
    }
}
