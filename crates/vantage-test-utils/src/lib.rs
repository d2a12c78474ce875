//! Test utilities for Vantage crates.
//!
//! This crate provides shared fixtures and approximate-equality assertions for the
//! integration tests and benchmarks of the geometry core.
//!
//! # Example
//!
//! ```rust
//! use glam::DVec3;
//! use vantage_test_utils::{assert_vec3_near, scenario_mapping};
//! use vantage_geometry::ProjectionKind;
//!
//! let mut mapping = scenario_mapping(ProjectionKind::Parallel);
//! let world = DVec3::new(10.0, 20.0, 30.0);
//! let target = mapping.map(world);
//! let back = mapping.inverse().unwrap().unmap(target);
//! assert_vec3_near(back, world, 1e-9);
//! ```

use glam::{DVec2, DVec3};
use vantage_geometry::{
    CivilDateTime, CoordinateSystemConfig, CoordinateSystemTree, CsId, Mapping, MappingConfig,
    ProjectionKind, Timestamp,
};

/// Domain box of the reference mapping scenario.
pub const SCENARIO_DOMAIN: DVec3 = DVec3::new(100.0, 80.0, 40.0);

/// View direction of the reference mapping scenario.
pub const SCENARIO_VIEW: DVec3 = DVec3::new(10.0, 7.0, 20.0);

/// Target size of the reference mapping scenario.
pub const SCENARIO_TARGET: DVec2 = DVec2::new(600.0, 400.0);

/// Install a quiet log subscriber (warnings only, unless `RUST_LOG` says otherwise).
pub fn init_logging() {
    vantage_core::logging::init_with_filter("warn");
}

/// Assert `|actual - expected| <= tolerance`.
#[track_caller]
pub fn assert_near(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} ± {}, got {}",
        expected,
        tolerance,
        actual
    );
}

/// Assert two 2D points are within `tolerance` of each other.
#[track_caller]
pub fn assert_vec2_near(actual: DVec2, expected: DVec2, tolerance: f64) {
    assert!(
        actual.distance(expected) <= tolerance,
        "expected {} ± {}, got {}",
        expected,
        tolerance,
        actual
    );
}

/// Assert two 3D points are within `tolerance` of each other.
#[track_caller]
pub fn assert_vec3_near(actual: DVec3, expected: DVec3, tolerance: f64) {
    assert!(
        actual.distance(expected) <= tolerance,
        "expected {} ± {}, got {}",
        expected,
        tolerance,
        actual
    );
}

/// Mapping configuration of the reference scenario for `projection`.
pub fn scenario_config(projection: ProjectionKind) -> MappingConfig {
    MappingConfig::new(projection)
        .with_view_direction(SCENARIO_VIEW)
        .with_perspective_strength(50.0)
        .with_target_size(SCENARIO_TARGET.x, SCENARIO_TARGET.y)
}

/// Mapping of the reference scenario for `projection`.
pub fn scenario_mapping(projection: ProjectionKind) -> Mapping {
    Mapping::new(scenario_config(projection), SCENARIO_DOMAIN)
        .unwrap_or_else(|err| panic!("scenario mapping failed: {}", err))
}

/// Deterministic sample of points inside the box `[0, size]` (`n³` points).
pub fn grid_points(size: DVec3, n: usize) -> Vec<DVec3> {
    let steps = n.max(2);
    let t = |i: usize| i as f64 / (steps - 1) as f64;
    let mut points = Vec::with_capacity(steps * steps * steps);
    for i in 0..steps {
        for j in 0..steps {
            for k in 0..steps {
                points.push(DVec3::new(t(i), t(j), t(k)) * size);
            }
        }
    }
    points
}

/// A root with a chain of `depth` nested children, each offset by `step`.
///
/// Returns the tree and the ids from the root down to the deepest child.
pub fn chain_tree(depth: usize, step: DVec3) -> (CoordinateSystemTree, Vec<CsId>) {
    let mut tree = CoordinateSystemTree::new(CoordinateSystemConfig::named("root"))
        .unwrap_or_else(|err| panic!("tree creation failed: {}", err));
    let mut ids = vec![tree.root()];
    for level in 1..=depth {
        let parent = ids[level - 1];
        let config = CoordinateSystemConfig::named(format!("level{}", level)).with_offset(step);
        let child = tree
            .add_child(parent, config)
            .unwrap_or_else(|err| panic!("adding level {} failed: {}", level, err));
        ids.push(child);
    }
    (tree, ids)
}

/// Timestamp of a calendar date and time (panics on invalid fields).
pub fn timestamp(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Timestamp {
    CivilDateTime::new(year, month, day, hour, minute, second)
        .unwrap_or_else(|err| panic!("invalid test date: {}", err))
        .to_timestamp()
}
