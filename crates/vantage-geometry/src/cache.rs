//! Lazily derived geometry and invalidation tracking.
//!
//! Derived values (mapping inverse, enlargements, axis intervals) are held in a
//! [`Cached`] state machine. Mutators move it back to [`Cached::Dirty`]; reads through
//! `&mut self` recompute it once and keep it [`Cached::Fresh`] until the next mutation.

bitflags::bitflags! {
    /// Dirty flags for tracking what changed on a coordinate system node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LayoutDirtyFlags: u8 {
        /// Own axis lengths or child extents changed.
        const EXTENT = 0b0000_0001;
        /// Offset within the parent frame changed.
        const OFFSET = 0b0000_0010;
        /// Orientation changed; axis roles must be re-derived.
        const ORIENTATION = 0b0000_0100;
        /// Axis ranges changed (min, max, step, reversal).
        const AXES = 0b0000_1000;
        /// Children were added or removed, or the child layout policy changed.
        const CHILDREN = 0b0001_0000;
    }
}

impl LayoutDirtyFlags {
    /// Check if the node's extent must be recomputed by `adjust_size`.
    pub fn needs_size_pass(&self) -> bool {
        self.intersects(Self::EXTENT | Self::OFFSET | Self::ORIENTATION | Self::CHILDREN)
    }

    /// Check if the change only affects axis values, not frame geometry.
    pub fn is_axes_only(&self) -> bool {
        *self == Self::AXES
    }
}

/// A derived value that is either stale or up to date.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cached<T> {
    /// Must be recomputed before the next read.
    #[default]
    Dirty,
    /// Valid until the owner mutates.
    Fresh(T),
}

impl<T> Cached<T> {
    /// Check whether a value is available without recomputation.
    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh(_))
    }

    /// Drop the cached value.
    pub fn invalidate(&mut self) {
        *self = Self::Dirty;
    }

    /// The cached value, if fresh.
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Fresh(value) => Some(value),
            Self::Dirty => None,
        }
    }

    /// Return the cached value, computing it first if dirty.
    pub fn get_or_refresh(&mut self, compute: impl FnOnce() -> T) -> &T {
        if let Self::Dirty = self {
            *self = Self::Fresh(compute());
        }
        match self {
            Self::Fresh(value) => value,
            Self::Dirty => unreachable!("cache refreshed above"),
        }
    }

    /// Like [`get_or_refresh`](Self::get_or_refresh), but a failed computation leaves the
    /// cache dirty.
    pub fn try_get_or_refresh<E>(
        &mut self,
        compute: impl FnOnce() -> Result<T, E>,
    ) -> Result<&T, E> {
        if let Self::Dirty = self {
            *self = Self::Fresh(compute()?);
        }
        match self {
            Self::Fresh(value) => Ok(value),
            Self::Dirty => unreachable!("cache refreshed above"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirty_flags() {
        let mut flags = LayoutDirtyFlags::empty();
        assert!(!flags.needs_size_pass());

        flags.insert(LayoutDirtyFlags::AXES);
        assert!(!flags.needs_size_pass());
        assert!(flags.is_axes_only());

        flags.insert(LayoutDirtyFlags::OFFSET);
        assert!(flags.needs_size_pass());
        assert!(!flags.is_axes_only());
    }

    #[test]
    fn test_cached_refresh_once() {
        let mut cache = Cached::<u32>::Dirty;
        let mut calls = 0;

        assert_eq!(
            *cache.get_or_refresh(|| {
                calls += 1;
                7
            }),
            7
        );
        assert_eq!(*cache.get_or_refresh(|| unreachable!()), 7);
        assert_eq!(calls, 1);

        cache.invalidate();
        assert!(!cache.is_fresh());
        assert_eq!(cache.get(), None);
    }

    #[test]
    fn test_cached_failed_refresh_stays_dirty() {
        let mut cache = Cached::<u32>::default();
        let result: Result<&u32, &str> = cache.try_get_or_refresh(|| Err("singular"));
        assert_eq!(result, Err("singular"));
        assert!(!cache.is_fresh());
    }
}
