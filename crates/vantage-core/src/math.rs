//! Coordinate math used throughout the geometry pipeline.
//!
//! This module re-exports the double precision types from the [`glam`] crate, which are
//! the value currency of every coordinate stage (logical, intermediate, world and target).
//! Chart geometry needs `f64`: world coordinates of date/time axes are seconds since the
//! Unix epoch, far beyond what `f32` can resolve.
//!
//! # Common Types
//!
//! - [`DVec2`]: target plane quantities (surface size, post-projection offsets)
//! - [`DVec3`]: logical, intermediate, world and target coordinates
//! - [`DMat3`]: linear parts of mappings and coordinate-system frames
//!
//! # Examples
//!
//! ```
//! use vantage_core::math::{DVec3, rotation_z};
//!
//! let rotated = rotation_z(std::f64::consts::FRAC_PI_2) * DVec3::X;
//! assert!((rotated - DVec3::Y).length() < 1e-12);
//! ```
//!
//! [`glam`]: https://docs.rs/glam

pub use glam::{DMat3, DVec2, DVec3};

/// Matrices whose determinant is below this fraction of the product of their column
/// lengths are treated as singular.
pub const DETERMINANT_EPSILON: f64 = 1e-12;

/// Counter-clockwise rotation about the Y axis (right-handed).
#[inline]
pub fn rotation_y(angle: f64) -> DMat3 {
    DMat3::from_rotation_y(angle)
}

/// Counter-clockwise rotation about the Z axis (right-handed).
#[inline]
pub fn rotation_z(angle: f64) -> DMat3 {
    DMat3::from_rotation_z(angle)
}

/// Inverts `matrix`, or returns `None` when it is (numerically) singular.
///
/// The test is relative to the column lengths, so a uniformly scaled invertible matrix
/// stays invertible at any scale.
pub fn try_inverse(matrix: &DMat3) -> Option<DMat3> {
    let det = matrix.determinant();
    let volume = matrix.x_axis.length() * matrix.y_axis.length() * matrix.z_axis.length();
    if !det.is_finite() || volume == 0.0 || det.abs() < DETERMINANT_EPSILON * volume {
        None
    } else {
        Some(matrix.inverse())
    }
}

/// Builds the matrix whose column `i` is the unit vector of axis `targets[i]`.
///
/// `targets` must be a permutation of `[0, 1, 2]`; the result is then orthogonal
/// and its inverse is its transpose.
pub fn permutation_matrix(targets: [usize; 3]) -> DMat3 {
    let unit = |axis: usize| match axis {
        0 => DVec3::X,
        1 => DVec3::Y,
        _ => DVec3::Z,
    };
    DMat3::from_cols(unit(targets[0]), unit(targets[1]), unit(targets[2]))
}

/// Returns `value` with every component at least `minimum`.
#[inline]
pub fn at_least(value: DVec3, minimum: f64) -> DVec3 {
    value.max(DVec3::splat(minimum))
}
