use crate::profile_function;
use std::num::NonZeroU64;

/// Generational handle into a [`SparseSet`].
///
/// The upper 32 bits hold the generation, the lower 32 bits the slot index plus one,
/// so `Option<IndexSlot>` costs no extra space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexSlot(NonZeroU64);

impl IndexSlot {
    pub fn new(generation: u32, idx: u32) -> Self {
        let packed = ((generation as u64) << 32) | (idx as u64 + 1);
        match NonZeroU64::new(packed) {
            Some(raw) => Self(raw),
            None => unreachable!("index bits are offset by one"),
        }
    }

    pub fn generation(&self) -> u32 {
        (self.0.get() >> 32) as u32
    }

    pub fn index(&self) -> u32 {
        (self.0.get() & u32::MAX as u64) as u32 - 1
    }
}

#[derive(Debug, Clone)]
struct Entry<T> {
    generation: u32,
    data: Option<T>,
}

/// Slot arena with generational handles.
///
/// Removing an element bumps the slot generation, so handles to removed elements are
/// rejected instead of silently aliasing whatever reuses the slot.
#[derive(Debug, Clone)]
pub struct SparseSet<T> {
    vec: Vec<Entry<T>>,
    free: Vec<u32>,
}

impl<T> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SparseSet<T> {
    pub const fn new() -> Self {
        Self {
            vec: Vec::new(),
            free: Vec::new(),
        }
    }

    pub fn push(&mut self, data: T) -> IndexSlot {
        profile_function!();
        if let Some(idx) = self.free.pop() {
            let entry = &mut self.vec[idx as usize];
            entry.data = Some(data);
            IndexSlot::new(entry.generation, idx)
        } else {
            let idx = self.vec.len();
            self.vec.push(Entry {
                generation: 0,
                data: Some(data),
            });
            IndexSlot::new(0, idx as u32)
        }
    }

    fn entry(&self, idx: IndexSlot) -> Option<&Entry<T>> {
        self.vec
            .get(idx.index() as usize)
            .filter(|entry| entry.generation == idx.generation())
    }

    /// Returns the element behind `idx`, or `None` if it was removed.
    pub fn get(&self, idx: IndexSlot) -> Option<&T> {
        self.entry(idx).and_then(|entry| entry.data.as_ref())
    }

    pub fn get_mut(&mut self, idx: IndexSlot) -> Option<&mut T> {
        self.vec
            .get_mut(idx.index() as usize)
            .filter(|entry| entry.generation == idx.generation())
            .and_then(|entry| entry.data.as_mut())
    }

    pub fn contains(&self, idx: IndexSlot) -> bool {
        self.get(idx).is_some()
    }

    pub fn remove(&mut self, idx: IndexSlot) -> Option<T> {
        profile_function!();
        let index = idx.index();
        let entry = self
            .vec
            .get_mut(index as usize)
            .filter(|entry| entry.generation == idx.generation())?;
        let data = entry.data.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(index);
        Some(data)
    }

    pub fn len(&self) -> usize {
        self.vec.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates live elements together with their handles, in slot order.
    pub fn iter(&self) -> SparseSetIter<'_, T> {
        SparseSetIter {
            inner: self.vec.iter().enumerate(),
        }
    }
}

pub struct SparseSetIter<'a, T> {
    inner: std::iter::Enumerate<std::slice::Iter<'a, Entry<T>>>,
}

impl<'a, T> Iterator for SparseSetIter<'a, T> {
    type Item = (IndexSlot, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        for (idx, entry) in self.inner.by_ref() {
            if let Some(data) = entry.data.as_ref() {
                return Some((IndexSlot::new(entry.generation, idx as u32), data));
            }
        }
        None
    }
}

static_assertions::assert_eq_size!(IndexSlot, Option<IndexSlot>);
