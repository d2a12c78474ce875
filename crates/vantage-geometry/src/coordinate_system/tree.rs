use std::collections::BinaryHeap;

use glam::{DMat3, DVec3};
use vantage_core::alloc::{HashMap, HashSet, SparseSet};
use vantage_core::math::at_least;

use super::{ChildLayout, CoordinateSystem, CsId, MIN_EXTENT};
use crate::axis::{Axis, AxisId, AxisRole, DEFAULT_ICS_LENGTH};
use crate::cache::LayoutDirtyFlags;
use crate::config::CoordinateSystemConfig;
use crate::dimension::{DataValue, DimensionSet};
use crate::error::{GeometryError, GeometryResult};
use crate::orientation::Orientation;

/// Arena of coordinate systems and their axes.
///
/// Nodes and axes are addressed by generational handles, so ids of removed systems are
/// rejected with [`GeometryError::UnknownCoordinateSystem`] instead of aliasing a
/// newer node.
#[derive(Debug, Clone)]
pub struct CoordinateSystemTree {
    pub(super) nodes: SparseSet<CoordinateSystem>,
    pub(super) axes: SparseSet<Axis>,
    root: CsId,
    names: HashMap<String, CsId>,
    dimensions: DimensionSet,
    pub(super) pending: BinaryHeap<(usize, CsId)>,
    pub(super) queued: HashSet<CsId>,
    pub(super) generation: u64,
}

impl CoordinateSystemTree {
    /// Create a tree holding only a root system, with the standard dimensions.
    pub fn new(root: CoordinateSystemConfig) -> GeometryResult<Self> {
        Self::with_dimensions(DimensionSet::standard(), root)
    }

    /// Create a tree whose new axes use `dimensions.numeric()` until rebound.
    pub fn with_dimensions(
        dimensions: DimensionSet,
        root: CoordinateSystemConfig,
    ) -> GeometryResult<Self> {
        root.validate()?;
        let mut nodes = SparseSet::new();
        let mut axes = SparseSet::new();

        let roles = root.orientation.resolve().roles();
        let axis_ids = [0, 1, 2].map(|logical| {
            let mut axis = Axis::new(dimensions.numeric(), roles[logical]);
            axis.set_reversed(root.reversed[logical]);
            AxisId(axes.push(axis))
        });

        let root_id = CsId(nodes.push(CoordinateSystem {
            name: root.name.clone(),
            orientation: root.orientation,
            axes: axis_ids,
            offset: DVec3::ZERO,
            extent: DVec3::splat(DEFAULT_ICS_LENGTH),
            layout: root.layout,
            embedded: false,
            parent: None,
            children: Vec::new(),
            depth: 0,
            dirty: LayoutDirtyFlags::empty(),
        }));

        let mut names = HashMap::new();
        if let Some(name) = root.name {
            names.insert(name, root_id);
        }

        Ok(Self {
            nodes,
            axes,
            root: root_id,
            names,
            dimensions,
            pending: BinaryHeap::new(),
            queued: HashSet::new(),
            generation: 0,
        })
    }

    /// The system without a parent; all composition ends here.
    pub fn root(&self) -> CsId {
        self.root
    }

    /// Bumped by every structural change and every extent change.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn dimensions(&self) -> &DimensionSet {
        &self.dimensions
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree keeps its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: CsId) -> bool {
        self.nodes.contains(id.0)
    }

    pub fn get(&self, id: CsId) -> GeometryResult<&CoordinateSystem> {
        self.nodes
            .get(id.0)
            .ok_or(GeometryError::UnknownCoordinateSystem(id))
    }

    pub(super) fn node_mut(&mut self, id: CsId) -> GeometryResult<&mut CoordinateSystem> {
        self.nodes
            .get_mut(id.0)
            .ok_or(GeometryError::UnknownCoordinateSystem(id))
    }

    /// Live systems with their ids, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (CsId, &CoordinateSystem)> + '_ {
        self.nodes.iter().map(|(slot, node)| (CsId(slot), node))
    }

    pub fn find_by_name(&self, name: &str) -> Option<CsId> {
        self.names.get(name).copied()
    }

    pub fn parent(&self, id: CsId) -> GeometryResult<Option<CsId>> {
        Ok(self.get(id)?.parent)
    }

    pub fn children(&self, id: CsId) -> GeometryResult<&[CsId]> {
        Ok(&self.get(id)?.children)
    }

    pub fn depth(&self, id: CsId) -> GeometryResult<usize> {
        Ok(self.get(id)?.depth)
    }

    /// Add a regular child system with three axes of its own.
    pub fn add_child(
        &mut self,
        parent: CsId,
        config: CoordinateSystemConfig,
    ) -> GeometryResult<CsId> {
        config.validate()?;
        self.check_name_free(config.name.as_deref())?;
        let parent_node = self.get(parent)?;
        let depth = parent_node.depth + 1;
        let world = config.orientation.resolve().compose(self.world_orientation(parent)?);

        let roles = world.roles();
        let axis_ids = [0, 1, 2].map(|logical| {
            let mut axis = Axis::new(self.dimensions.numeric(), roles[logical]);
            axis.set_reversed(config.reversed[logical]);
            AxisId(self.axes.push(axis))
        });

        let id = self.insert_node(CoordinateSystem {
            name: config.name,
            orientation: config.orientation,
            axes: axis_ids,
            offset: config.offset,
            extent: DVec3::splat(DEFAULT_ICS_LENGTH),
            layout: config.layout,
            embedded: false,
            parent: Some(parent),
            children: Vec::new(),
            depth,
            dirty: LayoutDirtyFlags::empty(),
        })?;
        tracing::debug!(?id, ?parent, depth, "Added coordinate system");
        Ok(id)
    }

    /// Add an embedded child sharing the parent's X and Z axes.
    ///
    /// The child binds its own Y axis and inherits the orientation of its nearest
    /// non-embedded ancestor, so `config.orientation` must be [`Orientation::Default`].
    pub fn add_embedded(
        &mut self,
        parent: CsId,
        config: CoordinateSystemConfig,
    ) -> GeometryResult<CsId> {
        config.validate()?;
        if config.orientation != Orientation::Default {
            return Err(GeometryError::InvalidConfiguration(
                "embedded coordinate systems inherit their orientation".to_string(),
            ));
        }
        self.check_name_free(config.name.as_deref())?;
        let parent_node = self.get(parent)?;
        let depth = parent_node.depth + 1;
        let [x, parent_y, z] = parent_node.axes;
        let y_length = self.axis_by_id(parent_y)?.ics_length();
        let y_role = self.world_orientation(parent)?.role_of(AxisRole::Y);

        let mut y_axis = Axis::new(self.dimensions.numeric(), y_role);
        y_axis.set_reversed(config.reversed[AxisRole::Y.index()]);
        y_axis.set_ics_length(y_length);
        let y = AxisId(self.axes.push(y_axis));

        let extent = DVec3::new(
            self.axis_by_id(x)?.ics_length(),
            y_length,
            self.axis_by_id(z)?.ics_length(),
        );
        let id = self.insert_node(CoordinateSystem {
            name: config.name,
            orientation: Orientation::Default,
            axes: [x, y, z],
            offset: config.offset,
            extent,
            layout: config.layout,
            embedded: true,
            parent: Some(parent),
            children: Vec::new(),
            depth,
            dirty: LayoutDirtyFlags::empty(),
        })?;
        tracing::debug!(?id, ?parent, depth, "Added embedded coordinate system");
        Ok(id)
    }

    fn check_name_free(&self, name: Option<&str>) -> GeometryResult<()> {
        match name {
            Some(name) if self.names.contains_key(name) => Err(
                GeometryError::InvalidConfiguration(format!(
                    "coordinate system name '{}' is already used",
                    name
                )),
            ),
            _ => Ok(()),
        }
    }

    fn insert_node(&mut self, node: CoordinateSystem) -> GeometryResult<CsId> {
        let parent = node.parent;
        let name = node.name.clone();
        let id = CsId(self.nodes.push(node));
        if let Some(name) = name {
            self.names.insert(name, id);
        }
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.push(id);
            self.mark_changed(parent, LayoutDirtyFlags::CHILDREN)?;
        }
        self.mark_changed(id, LayoutDirtyFlags::EXTENT)?;
        self.generation += 1;
        Ok(id)
    }

    /// Remove a system together with its whole subtree.
    pub fn remove(&mut self, id: CsId) -> GeometryResult<()> {
        let parent = self.get(id)?.parent.ok_or_else(|| {
            GeometryError::InvalidConfiguration("the root coordinate system cannot be removed".to_string())
        })?;

        let subtree = self.subtree(id)?;
        for &node_id in &subtree {
            let Some(node) = self.nodes.remove(node_id.0) else {
                continue;
            };
            let owned: &[AxisId] = if node.embedded {
                &node.axes[1..2]
            } else {
                &node.axes
            };
            for axis in owned {
                self.axes.remove(axis.0);
            }
            if let Some(name) = &node.name {
                self.names.remove(name);
            }
            self.queued.remove(&node_id);
        }

        self.node_mut(parent)?.children.retain(|&child| child != id);
        self.mark_changed(parent, LayoutDirtyFlags::CHILDREN)?;
        self.generation += 1;
        tracing::debug!(?id, removed = subtree.len(), "Removed coordinate system subtree");
        Ok(())
    }

    /// `id` and all of its descendants, parents before children.
    pub fn subtree(&self, id: CsId) -> GeometryResult<Vec<CsId>> {
        self.get(id)?;
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.get(next)?.children.iter().rev().copied());
        }
        Ok(out)
    }

    pub fn axis(&self, id: CsId, logical: AxisRole) -> GeometryResult<&Axis> {
        let axis = self.get(id)?.axis_id(logical);
        self.axis_by_id(axis)
    }

    /// Mutable access to an axis. The system is marked for the next `adjust_size`.
    pub fn axis_mut(&mut self, id: CsId, logical: AxisRole) -> GeometryResult<&mut Axis> {
        let node = self.get(id)?;
        let axis = node.axis_id(logical);
        let shared = node.embedded && logical != AxisRole::Y;
        let flags = LayoutDirtyFlags::AXES | LayoutDirtyFlags::EXTENT;
        self.mark_changed(id, flags)?;
        if shared {
            let owner = self.non_embedded_owner(id)?;
            self.mark_changed(owner, flags)?;
        }
        self.axes
            .get_mut(axis.0)
            .ok_or_else(|| dangling_axis(id, logical))
    }

    pub fn axis_by_id(&self, axis: AxisId) -> GeometryResult<&Axis> {
        self.axes.get(axis.0).ok_or_else(|| {
            GeometryError::InvariantViolation(format!("axis {:?} is not in the tree", axis))
        })
    }

    /// The axis of `id` that currently plays the geometric `role`.
    pub fn axis_for_role(&self, id: CsId, role: AxisRole) -> GeometryResult<&Axis> {
        let node = self.get(id)?;
        for axis in node.axes {
            let axis = self.axis_by_id(axis)?;
            if axis.role() == role {
                return Ok(axis);
            }
        }
        Err(GeometryError::AxisNotInSystem { system: id, role })
    }

    /// Set the offset in the parent frame. Only kept under [`ChildLayout::Manual`].
    pub fn set_offset(&mut self, id: CsId, offset: DVec3) -> GeometryResult<()> {
        if !offset.is_finite() {
            return Err(GeometryError::InvalidConfiguration(format!(
                "coordinate system offset must be finite, got {}",
                offset
            )));
        }
        self.node_mut(id)?.offset = offset;
        self.mark_changed(id, LayoutDirtyFlags::OFFSET)
    }

    pub fn set_layout(&mut self, id: CsId, layout: ChildLayout) -> GeometryResult<()> {
        layout.validate()?;
        self.node_mut(id)?.layout = layout;
        self.mark_changed(id, LayoutDirtyFlags::CHILDREN)
    }

    /// Change the orientation of a non-embedded system.
    ///
    /// Axis roles of the system and of every descendant inheriting from it are
    /// re-derived; axis ranges and steps are left untouched.
    pub fn set_orientation(&mut self, id: CsId, orientation: Orientation) -> GeometryResult<()> {
        if self.get(id)?.embedded {
            return Err(GeometryError::InvalidConfiguration(
                "embedded coordinate systems inherit their orientation".to_string(),
            ));
        }
        self.node_mut(id)?.orientation = orientation;
        for node_id in self.subtree(id)? {
            let node = self.get(node_id)?;
            let axes = node.axes;
            let embedded = node.embedded;
            let world = self.world_orientation(node_id)?;
            for logical in AxisRole::ALL {
                if embedded && logical != AxisRole::Y {
                    continue;
                }
                let axis = axes[logical.index()];
                self.axes
                    .get_mut(axis.0)
                    .ok_or_else(|| dangling_axis(node_id, logical))?
                    .set_role(world.role_of(logical));
            }
        }
        self.mark_changed(id, LayoutDirtyFlags::ORIENTATION)
    }

    /// Nearest system at or above `id` that is not embedded.
    pub fn non_embedded_owner(&self, id: CsId) -> GeometryResult<CsId> {
        let mut current = id;
        loop {
            let node = self.get(current)?;
            match node.parent {
                Some(parent) if node.embedded => current = parent,
                _ => return Ok(current),
            }
        }
    }

    /// Composite orientation from the logical axes of `id` to world roles.
    pub fn world_orientation(&self, id: CsId) -> GeometryResult<Orientation> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.get(node_id)?;
            if !node.embedded {
                chain.push(node.orientation.resolve());
            }
            current = node.parent;
        }
        Ok(chain
            .into_iter()
            .rev()
            .fold(Orientation::Xyz, |world, local| local.compose(world)))
    }

    /// `M_local` of `id`: its orientation permutation, identity for embedded systems.
    pub fn local_matrix(&self, id: CsId) -> GeometryResult<DMat3> {
        let node = self.get(id)?;
        Ok(local_matrix(node))
    }

    /// One step up: `M_local · v + offset` (the root has no offset).
    pub fn ics_to_parent(&self, id: CsId, ics: DVec3) -> GeometryResult<DVec3> {
        let node = self.get(id)?;
        let local = local_matrix(node) * ics;
        Ok(if node.parent.is_some() { local + node.offset } else { local })
    }

    /// Compose every frame from `id` up to the root.
    pub fn ics_to_wcs(&self, id: CsId, ics: DVec3) -> GeometryResult<DVec3> {
        let mut current = id;
        let mut v = ics;
        loop {
            v = self.ics_to_parent(current, v)?;
            match self.get(current)?.parent {
                Some(parent) => current = parent,
                None => return Ok(v),
            }
        }
    }

    /// Inverse of [`ics_to_wcs`](Self::ics_to_wcs).
    pub fn wcs_to_ics(&self, id: CsId, wcs: DVec3) -> GeometryResult<DVec3> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.get(node_id)?;
            chain.push(node);
            current = node.parent;
        }
        let mut v = wcs;
        for node in chain.into_iter().rev() {
            let shifted = if node.parent.is_some() { v - node.offset } else { v };
            // Permutation matrices are orthogonal.
            v = local_matrix(node).transpose() * shifted;
        }
        Ok(v)
    }

    /// Logical coordinates through the three axes of `id`.
    pub fn lcs_to_ics(&self, id: CsId, lcs: DVec3) -> GeometryResult<DVec3> {
        let mut ics = DVec3::ZERO;
        for logical in AxisRole::ALL {
            ics[logical.index()] = self.axis(id, logical)?.logical_to_ics(lcs[logical.index()]);
        }
        Ok(ics)
    }

    pub fn lcs_to_wcs(&self, id: CsId, lcs: DVec3) -> GeometryResult<DVec3> {
        self.ics_to_wcs(id, self.lcs_to_ics(id, lcs)?)
    }

    /// Data values for logical X, Y and Z all the way to world coordinates.
    pub fn value_to_wcs(&self, id: CsId, values: [&DataValue; 3]) -> GeometryResult<DVec3> {
        let mut lcs = DVec3::ZERO;
        for logical in AxisRole::ALL {
            lcs[logical.index()] = self.axis(id, logical)?.coordinate(values[logical.index()])?;
        }
        self.lcs_to_wcs(id, lcs)
    }

    /// Size of the root in world coordinates, at least [`MIN_EXTENT`] on every axis.
    ///
    /// This is the domain box a mapping is set up for.
    pub fn world_extent(&self) -> GeometryResult<DVec3> {
        let root = self.get(self.root)?;
        let extent = (local_matrix(root) * root.extent).abs();
        if extent.min_element() < MIN_EXTENT {
            tracing::warn!(?extent, "Degenerate world extent, using minimum size");
        }
        Ok(at_least(extent, MIN_EXTENT))
    }
}

pub(super) fn local_matrix(node: &CoordinateSystem) -> DMat3 {
    if node.embedded {
        DMat3::IDENTITY
    } else {
        node.orientation.resolve().matrix()
    }
}

fn dangling_axis(id: CsId, logical: AxisRole) -> GeometryError {
    GeometryError::InvariantViolation(format!(
        "logical {:?} axis of {:?} is not in the tree",
        logical, id
    ))
}
