//! Hierarchical coordinate systems: the ICS → WCS stage of the pipeline.
//!
//! Coordinate systems form a tree stored in a [`CoordinateSystemTree`] arena. Each node
//! owns three axes (logical X, Y, Z), an [`Orientation`] and an offset in its parent's
//! intermediate frame:
//!
//! ```text
//! ics_to_wcs(node, v) = ics_to_wcs(parent, M_local · v + offset)
//! ics_to_wcs(root, v) = M_local · v
//! ```
//!
//! Extents flow bottom-up and offsets top-down; [`CoordinateSystemTree::adjust_size`]
//! drives both from an explicit worklist until every ancestor of a changed node is
//! settled.
//!
//! Embedded systems share their parent's X and Z axes and only bind their own Y axis.

mod layout;
mod tree;

pub use tree::CoordinateSystemTree;

use glam::DVec3;
use vantage_core::alloc::IndexSlot;

use crate::axis::{AxisId, AxisRole};
use crate::cache::LayoutDirtyFlags;
use crate::error::{GeometryError, GeometryResult};
use crate::orientation::Orientation;

/// Smallest extent handed to a mapping on any axis.
pub const MIN_EXTENT: f64 = 1e-6;

/// Handle of a coordinate system inside a [`CoordinateSystemTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CsId(pub(crate) IndexSlot);

/// How a coordinate system places its children.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ChildLayout {
    /// Offsets are set explicitly with `set_offset`.
    #[default]
    Manual,
    /// Every child sits at the origin.
    Overlay,
    /// Children follow each other along one logical axis of this system.
    Stack { axis: AxisRole, gap: f64 },
}

impl ChildLayout {
    pub fn stack(axis: AxisRole, gap: f64) -> Self {
        Self::Stack { axis, gap }
    }

    pub fn validate(&self) -> GeometryResult<()> {
        match self {
            Self::Stack { gap, .. } if !(gap.is_finite() && *gap >= 0.0) => {
                Err(GeometryError::InvalidConfiguration(format!(
                    "stack gap must be finite and non-negative, got {}",
                    gap
                )))
            }
            _ => Ok(()),
        }
    }
}

/// One node of a [`CoordinateSystemTree`].
#[derive(Debug, Clone)]
pub struct CoordinateSystem {
    pub(crate) name: Option<String>,
    pub(crate) orientation: Orientation,
    pub(crate) axes: [AxisId; 3],
    pub(crate) offset: DVec3,
    pub(crate) extent: DVec3,
    pub(crate) layout: ChildLayout,
    pub(crate) embedded: bool,
    pub(crate) parent: Option<CsId>,
    pub(crate) children: Vec<CsId>,
    pub(crate) depth: usize,
    pub(crate) dirty: LayoutDirtyFlags,
}

impl CoordinateSystem {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Configured orientation (may be [`Orientation::Default`]).
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Axis handles of logical X, Y and Z.
    pub fn axis_ids(&self) -> [AxisId; 3] {
        self.axes
    }

    pub fn axis_id(&self, logical: AxisRole) -> AxisId {
        self.axes[logical.index()]
    }

    /// Offset in the parent's intermediate frame.
    pub fn offset(&self) -> DVec3 {
        self.offset
    }

    /// Size in this system's own intermediate frame, per logical axis.
    pub fn extent(&self) -> DVec3 {
        self.extent
    }

    pub fn layout(&self) -> ChildLayout {
        self.layout
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn parent(&self) -> Option<CsId> {
        self.parent
    }

    pub fn children(&self) -> &[CsId] {
        &self.children
    }

    /// Distance from the root (the root has depth 0).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Changes not yet settled by `adjust_size`.
    pub fn dirty_flags(&self) -> LayoutDirtyFlags {
        self.dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_layout_validation() {
        assert!(ChildLayout::Manual.validate().is_ok());
        assert!(ChildLayout::stack(AxisRole::X, 5.0).validate().is_ok());
        assert!(ChildLayout::stack(AxisRole::X, -1.0).validate().is_err());
        assert!(ChildLayout::stack(AxisRole::Y, f64::NAN).validate().is_err());
    }
}
