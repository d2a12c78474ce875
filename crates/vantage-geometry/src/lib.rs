//! Vantage Geometry - coordinate pipeline for 3D/2D charts
//!
//! This crate provides:
//! - Dimensions and axes turning data values into intermediate coordinates
//! - Hierarchical coordinate systems composing nested frames into world space
//! - Projective mapping (central, parallel, isometric, 2D) onto a raster target
//! - Automatic interval generation for numeric and calendar ranges
//!
//! Values flow through five stages:
//!
//! ```text
//! DCS --Dimension--> LCS --Axis--> ICS --CoordinateSystem--> WCS --Mapping--> TCS
//! ```
//!
//! # Example
//!
//! ```
//! use glam::DVec3;
//! use vantage_geometry::*;
//!
//! let mut tree = CoordinateSystemTree::new(CoordinateSystemConfig::named("chart")).unwrap();
//! let root = tree.root();
//! tree.axis_mut(root, AxisRole::X).unwrap().set_range(0.0, 10.0).unwrap();
//! tree.adjust_size().unwrap();
//!
//! let world = tree.lcs_to_wcs(root, DVec3::new(5.0, 0.5, 0.5)).unwrap();
//! let config = MappingConfig::new(ProjectionKind::Central).with_target_size(600.0, 400.0);
//! let mapping = Mapping::new(config, tree.world_extent().unwrap()).unwrap();
//!
//! let target = mapping.map(world);
//! assert!(target.x > 0.0 && target.x < 600.0);
//! ```

pub mod axis;
pub mod cache;
pub mod calendar;
pub mod config;
pub mod coordinate_system;
pub mod dimension;
pub mod intervals;
pub mod mapping;
pub mod orientation;

mod error;

pub use axis::{Axis, AxisId, AxisRole};
pub use cache::{Cached, LayoutDirtyFlags};
pub use calendar::{CivilDateTime, TimeUnit, Timestamp};
pub use config::{CoordinateSystemConfig, IntervalConfig, MappingConfig, Margins};
pub use coordinate_system::{ChildLayout, CoordinateSystem, CoordinateSystemTree, CsId, MIN_EXTENT};
pub use dimension::{
    CategoryDimension, DataValue, DateTimeDimension, Dimension, DimensionSet, NumericDimension,
};
pub use error::{GeometryError, GeometryResult};
pub use intervals::{Intervals, StepUnit};
pub use mapping::{InverseMapping, Mapping, PostProjection, ProjectionKind, ProjectionPlane};
pub use orientation::Orientation;
