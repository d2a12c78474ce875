//! Size and offset propagation.
//!
//! Marked systems are processed deepest first. For each one the children's offsets are
//! assigned from their (already final) extents, then the system's own extent is
//! recomputed and written into its axes. A changed extent queues the parent, so a
//! change anywhere reaches the root within one [`CoordinateSystemTree::adjust_size`].

use glam::DVec3;

use super::tree::local_matrix;
use super::{ChildLayout, CoordinateSystemTree, CsId};
use crate::axis::AxisRole;
use crate::cache::LayoutDirtyFlags;
use crate::error::{GeometryError, GeometryResult};

/// Extent changes below this are treated as no change.
const EXTENT_EPSILON: f64 = 1e-9;

impl CoordinateSystemTree {
    /// Record a change on `id` and queue it for the next [`adjust_size`](Self::adjust_size).
    pub fn mark_changed(&mut self, id: CsId, flags: LayoutDirtyFlags) -> GeometryResult<()> {
        let node = self.node_mut(id)?;
        node.dirty |= flags;
        let depth = node.depth;
        if flags.needs_size_pass() && self.queued.insert(id) {
            self.pending.push((depth, id));
        }
        Ok(())
    }

    /// Whether every change has been propagated.
    pub fn is_settled(&self) -> bool {
        self.queued.is_empty()
    }

    /// Propagate extents up and offsets down until no marked system remains.
    ///
    /// Returns the number of systems processed.
    pub fn adjust_size(&mut self) -> GeometryResult<usize> {
        vantage_core::profile_function!();
        let mut processed = 0;
        while let Some((_, id)) = self.pending.pop() {
            if !self.queued.remove(&id) || !self.contains(id) {
                continue;
            }
            processed += 1;

            self.assign_child_offsets(id)?;
            let extent = self.compute_extent(id)?;

            let node = self.node_mut(id)?;
            let flags = std::mem::take(&mut node.dirty);
            let changed = (extent - node.extent).abs().max_element() > EXTENT_EPSILON;
            node.extent = extent;
            let parent = node.parent;
            let embedded = node.embedded;
            let axes = node.axes;

            if changed {
                for logical in AxisRole::ALL {
                    // Shared axes belong to the owner.
                    if embedded && logical != AxisRole::Y {
                        continue;
                    }
                    let axis = axes[logical.index()];
                    self.axes
                        .get_mut(axis.0)
                        .ok_or_else(|| {
                            GeometryError::InvariantViolation(format!(
                                "axis {:?} of {:?} is not in the tree",
                                axis, id
                            ))
                        })?
                        .set_ics_length(extent[logical.index()]);
                }
                self.generation += 1;
            }
            tracing::trace!(?id, ?extent, changed, ?flags, "adjust_size node");

            let moved = flags.intersects(LayoutDirtyFlags::OFFSET | LayoutDirtyFlags::ORIENTATION);
            if let Some(parent) = parent
                && (changed || moved)
            {
                self.mark_changed(parent, LayoutDirtyFlags::EXTENT)?;
            }
        }
        if processed > 0 {
            tracing::debug!(processed, generation = self.generation, "Coordinate systems settled");
        }
        Ok(processed)
    }

    /// Size of a child measured in its parent's frame.
    fn extent_in_parent(&self, id: CsId) -> GeometryResult<DVec3> {
        let node = self.get(id)?;
        Ok((local_matrix(node) * node.extent).abs())
    }

    fn assign_child_offsets(&mut self, id: CsId) -> GeometryResult<()> {
        let node = self.get(id)?;
        let layout = node.layout;
        let children = node.children.clone();

        match layout {
            ChildLayout::Manual => {}
            ChildLayout::Overlay => {
                for child in children {
                    self.node_mut(child)?.offset = DVec3::ZERO;
                }
            }
            ChildLayout::Stack { axis, gap } => {
                let mut cursor = 0.0;
                for child in children {
                    if self.get(child)?.embedded {
                        self.node_mut(child)?.offset = DVec3::ZERO;
                        continue;
                    }
                    let size = self.extent_in_parent(child)?[axis.index()];
                    self.node_mut(child)?.offset = axis.unit() * cursor;
                    cursor += size + gap;
                }
            }
        }
        Ok(())
    }

    /// Maximum over children of `extent + offset`, per axis; the own axis lengths
    /// where no child contributes. Embedded children only contribute along Y.
    fn compute_extent(&self, id: CsId) -> GeometryResult<DVec3> {
        let node = self.get(id)?;
        let mut reach: [Option<f64>; 3] = [None; 3];
        let mut extend = |index: usize, value: f64| {
            reach[index] = Some(reach[index].map_or(value, |current| current.max(value)));
        };

        for &child_id in &node.children {
            let child = self.get(child_id)?;
            if child.embedded {
                let y = AxisRole::Y.index();
                extend(y, child.extent[y] + child.offset[y]);
            } else {
                let size = self.extent_in_parent(child_id)? + child.offset;
                for index in 0..3 {
                    extend(index, size[index]);
                }
            }
        }

        let mut extent = DVec3::ZERO;
        for logical in AxisRole::ALL {
            let index = logical.index();
            extent[index] = match reach[index] {
                Some(value) => value,
                None => self.axis_by_id(node.axis_id(logical))?.ics_length(),
            };
        }
        Ok(extent.max(DVec3::ZERO))
    }
}
