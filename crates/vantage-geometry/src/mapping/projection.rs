//! Projection kinds and the per-point projection step.

use glam::{DMat3, DVec2, DVec3};

/// Perspective factor at strength 0 (weakest perspective).
pub const MAX_PERSPECTIVE_FACTOR: f64 = 21.5;

/// Change of the perspective factor per unit of strength.
pub const PERSPECTIVE_FACTOR_SLOPE: f64 = 0.2;

/// Relative distance below which a point counts as sitting on the projection center.
const CENTER_EPSILON: f64 = 1e-6;

/// How world coordinates are flattened onto the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProjectionKind {
    /// Perspective projection with a finite projection center.
    #[default]
    Central,
    /// Orthographic projection along the view direction.
    Parallel,
    /// Fixed shear of the depth axis; X and Y keep their proportions.
    Isometric,
    /// Flat projection onto one world plane.
    TwoDimensional,
}

impl ProjectionKind {
    /// Whether automatic setup rotates the domain toward a view direction.
    pub fn uses_view_direction(self) -> bool {
        !matches!(self, Self::TwoDimensional)
    }
}

/// World plane used by [`ProjectionKind::TwoDimensional`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProjectionPlane {
    /// X right, Y up; Z only orders depth.
    #[default]
    Xy,
    /// X right, Z up; Y only orders depth.
    Xz,
}

impl ProjectionPlane {
    /// Fixed linear part, before scaling. Target Y points down.
    pub fn linear(self) -> DMat3 {
        match self {
            Self::Xy => DMat3::from_cols(DVec3::X, DVec3::NEG_Y, DVec3::NEG_Z),
            Self::Xz => DMat3::from_cols(DVec3::X, DVec3::NEG_Z, DVec3::NEG_Y),
        }
    }
}

/// Perspective factor (projection center distance in domain radii) for a strength in
/// `0..=100`.
pub fn perspective_factor(strength: f64) -> f64 {
    MAX_PERSPECTIVE_FACTOR - PERSPECTIVE_FACTOR_SLOPE * strength
}

/// Inverse of [`perspective_factor`].
pub fn perspective_strength(factor: f64) -> f64 {
    (MAX_PERSPECTIVE_FACTOR - factor) / PERSPECTIVE_FACTOR_SLOPE
}

/// Isometric linear part, before scaling.
pub fn isometric_linear(reduction: DVec2) -> DMat3 {
    DMat3::from_cols(
        DVec3::X,
        DVec3::NEG_Y,
        DVec3::new(reduction.x, -reduction.y, -1.0),
    )
}

/// Perspective scale of a point at depth `z` for a center at depth `center_z`.
///
/// Points at or behind the center are clamped so the result stays finite.
pub fn reduction(center_z: f64, z: f64) -> f64 {
    let min_distance = center_z.abs().max(1.0) * CENTER_EPSILON;
    center_z / (center_z - z).max(min_distance)
}

/// Depth tie-break subtracted under central projection with bending enabled.
pub fn bending_offset(projected: DVec2, center: DVec2, target_size: DVec2) -> f64 {
    let span = target_size.x + target_size.y;
    (projected - center).length_squared() / (span * span)
}

/// Central projection of a pre-projection point `p`.
pub fn project_central(p: DVec3, center: DVec3, bending: bool, target_size: DVec2) -> DVec3 {
    let red = reduction(center.z, p.z);
    let center_xy = center.truncate();
    let xy = center_xy + (p.truncate() - center_xy) * red;
    let z = if bending {
        p.z - bending_offset(xy, center_xy, target_size)
    } else {
        p.z
    };
    xy.extend(z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strength_factor_mapping() {
        assert_eq!(perspective_factor(0.0), 21.5);
        assert!((perspective_factor(50.0) - 11.5).abs() < 1e-12);
        assert!((perspective_factor(100.0) - 1.5).abs() < 1e-12);
        assert!((perspective_strength(perspective_factor(37.0)) - 37.0).abs() < 1e-9);
    }

    #[test]
    fn test_reduction() {
        assert_eq!(reduction(10.0, 0.0), 1.0);
        // Nearer points are enlarged, farther ones reduced.
        assert!(reduction(10.0, 5.0) > 1.0);
        assert!(reduction(10.0, -5.0) < 1.0);
        assert!(reduction(10.0, 10.0).is_finite());
        assert!(reduction(10.0, 50.0).is_finite());
    }

    #[test]
    fn test_central_keeps_center_fixed() {
        let center = DVec3::new(300.0, 200.0, 1000.0);
        let p = DVec3::new(300.0, 200.0, 50.0);
        let projected = project_central(p, center, true, DVec2::new(600.0, 400.0));
        assert_eq!(projected, p);
    }

    #[test]
    fn test_plane_linear_parts_are_invertible() {
        for plane in [ProjectionPlane::Xy, ProjectionPlane::Xz] {
            assert!(plane.linear().determinant().abs() > 0.5);
        }
        assert!((isometric_linear(DVec2::new(0.5, 0.5)).determinant() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_plane_ignores_depth_axis() {
        let xy = ProjectionPlane::Xy.linear();
        assert_eq!((xy * DVec3::Z).truncate(), DVec2::ZERO);
        let xz = ProjectionPlane::Xz.linear();
        assert_eq!((xz * DVec3::Y).truncate(), DVec2::ZERO);
        assert_eq!(xz * DVec3::Z, DVec3::NEG_Y);
    }
}
