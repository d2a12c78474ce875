//! User-settable configuration.
//!
//! These structs are exactly the surface a persistence layer would store; caches and
//! computed intervals are never part of them. Each one validates itself before it is
//! applied, so a rejected configuration never touches derived state.

use glam::{DVec2, DVec3};

use crate::coordinate_system::ChildLayout;
use crate::error::{GeometryError, GeometryResult};
use crate::mapping::{ProjectionKind, ProjectionPlane};
use crate::orientation::Orientation;

/// Default target tick count for auto-intervals.
pub const DEFAULT_TARGET_COUNT: usize = 5;

/// Default view direction (from the domain toward the viewer).
pub const DEFAULT_VIEW_DIRECTION: DVec3 = DVec3::new(0.5, 0.35, 1.0);

/// Default perspective strength.
pub const DEFAULT_PERSPECTIVE_STRENGTH: f64 = 50.0;

/// Default isometric X/Y reduction of the depth axis.
pub const DEFAULT_ISOMETRIC_REDUCTION: DVec2 = DVec2::new(0.5, 0.5);

/// Margins around the target rectangle, in percent of its size.
///
/// Stored and validated but currently reserved: they do not change the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margins {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Margins {
    pub const ZERO: Self = Self {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    /// Same margin on every side.
    pub fn uniform(percent: f64) -> Self {
        Self {
            left: percent,
            top: percent,
            right: percent,
            bottom: percent,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    fn validate(&self) -> GeometryResult<()> {
        for (side, value) in [
            ("left", self.left),
            ("top", self.top),
            ("right", self.right),
            ("bottom", self.bottom),
        ] {
            if !(value.is_finite() && (0.0..100.0).contains(&value)) {
                return Err(GeometryError::InvalidConfiguration(format!(
                    "{} margin must be in [0, 100) percent, got {}",
                    side, value
                )));
            }
        }
        Ok(())
    }
}

/// Configuration of a [`Mapping`](crate::mapping::Mapping).
#[derive(Debug, Clone, PartialEq)]
pub struct MappingConfig {
    /// Projection kind.
    pub projection: ProjectionKind,
    /// Direction from the domain toward the viewer. Ignored for 2D projections.
    pub view_direction: DVec3,
    /// Perspective strength in `0..=100` (central projection only).
    pub perspective_strength: f64,
    /// X/Y shear applied to the depth axis (isometric projection only).
    pub isometric_reduction: DVec2,
    /// Projection plane (2D projection only).
    pub plane: ProjectionPlane,
    /// Target rectangle size in pixels.
    pub target_size: DVec2,
    /// Target resolution in dots per inch.
    pub dpi: f64,
    /// Reserved margins.
    pub margins: Margins,
    /// Depth tie-break for coplanar objects under central projection.
    pub bending: bool,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            projection: ProjectionKind::Central,
            view_direction: DEFAULT_VIEW_DIRECTION,
            perspective_strength: DEFAULT_PERSPECTIVE_STRENGTH,
            isometric_reduction: DEFAULT_ISOMETRIC_REDUCTION,
            plane: ProjectionPlane::Xy,
            target_size: DVec2::new(600.0, 400.0),
            dpi: 96.0,
            margins: Margins::ZERO,
            bending: false,
        }
    }
}

impl MappingConfig {
    /// Create a configuration for the given projection with default settings.
    pub fn new(projection: ProjectionKind) -> Self {
        Self {
            projection,
            ..Default::default()
        }
    }

    pub fn with_projection(mut self, projection: ProjectionKind) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_view_direction(mut self, view_direction: DVec3) -> Self {
        self.view_direction = view_direction;
        self
    }

    pub fn with_perspective_strength(mut self, strength: f64) -> Self {
        self.perspective_strength = strength;
        self
    }

    pub fn with_isometric_reduction(mut self, reduction: DVec2) -> Self {
        self.isometric_reduction = reduction;
        self
    }

    pub fn with_plane(mut self, plane: ProjectionPlane) -> Self {
        self.plane = plane;
        self
    }

    pub fn with_target_size(mut self, width: f64, height: f64) -> Self {
        self.target_size = DVec2::new(width, height);
        self
    }

    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn with_bending(mut self, bending: bool) -> Self {
        self.bending = bending;
        self
    }

    /// Check every field.
    ///
    /// A zero or non-finite view direction is reported as
    /// [`GeometryError::ZeroViewDirection`] for projections that use one.
    pub fn validate(&self) -> GeometryResult<()> {
        if self.projection.uses_view_direction() {
            let dir = self.view_direction;
            if !dir.is_finite() || dir.length_squared() == 0.0 {
                return Err(GeometryError::ZeroViewDirection);
            }
        }
        let size = self.target_size;
        if !(size.is_finite() && size.x > 0.0 && size.y > 0.0) {
            return Err(GeometryError::InvalidConfiguration(format!(
                "target size must be positive, got {}x{}",
                size.x, size.y
            )));
        }
        if !(self.perspective_strength.is_finite()
            && (0.0..=100.0).contains(&self.perspective_strength))
        {
            return Err(GeometryError::InvalidConfiguration(format!(
                "perspective strength must be in 0..=100, got {}",
                self.perspective_strength
            )));
        }
        if !self.isometric_reduction.is_finite() {
            return Err(GeometryError::InvalidConfiguration(
                "isometric reduction must be finite".to_string(),
            ));
        }
        if !(self.dpi.is_finite() && self.dpi > 0.0) {
            return Err(GeometryError::InvalidConfiguration(format!(
                "dpi must be positive, got {}",
                self.dpi
            )));
        }
        self.margins.validate()
    }
}

/// Auto-interval settings of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalConfig {
    /// Desired number of boundaries (minimum number of grid lines).
    pub target_count: usize,
    /// Keep only boundaries inside the axis range.
    pub inside_only: bool,
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            target_count: DEFAULT_TARGET_COUNT,
            inside_only: false,
        }
    }
}

impl IntervalConfig {
    pub fn with_target_count(mut self, target_count: usize) -> Self {
        self.target_count = target_count;
        self
    }

    pub fn with_inside_only(mut self, inside_only: bool) -> Self {
        self.inside_only = inside_only;
        self
    }

    pub fn validate(&self) -> GeometryResult<()> {
        if self.target_count == 0 {
            return Err(GeometryError::InvalidConfiguration(
                "interval target count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// User-settable surface of a coordinate system.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoordinateSystemConfig {
    pub name: Option<String>,
    pub orientation: Orientation,
    /// Offset in the parent's intermediate coordinates (used by [`ChildLayout::Manual`]).
    pub offset: DVec3,
    /// Reversal flags of the logical X, Y and Z axes.
    pub reversed: [bool; 3],
    /// Placement of this system's children.
    pub layout: ChildLayout,
}

impl CoordinateSystemConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_offset(mut self, offset: DVec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_reversed(mut self, reversed: [bool; 3]) -> Self {
        self.reversed = reversed;
        self
    }

    pub fn with_layout(mut self, layout: ChildLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn validate(&self) -> GeometryResult<()> {
        if !self.offset.is_finite() {
            return Err(GeometryError::InvalidConfiguration(format!(
                "coordinate system offset must be finite, got {}",
                self.offset
            )));
        }
        self.layout.validate()
    }
}
