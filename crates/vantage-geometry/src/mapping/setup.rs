//! Automatic derivation of a mapping from a domain box and a target rectangle.
//!
//! Central and parallel projections:
//!
//! 1. move the domain center to the origin
//! 2. rotate about Z so the view direction lies in the X-Z plane
//! 3. rotate about Y so the view direction lies on +Z
//! 4. rotate about Z so the image of world Y points up, then flip Y into raster order
//! 5. scale uniformly so the projected corners fit the target
//! 6. translate so the projected bounding box is centered
//!
//! Each rotation is computed from the view direction as already transformed by the
//! previous steps. Isometric and 2D projections have fixed linear parts and only run
//! steps 5 and 6.

use glam::{DMat3, DVec2, DVec3};
use vantage_core::math::{at_least, rotation_y, rotation_z};

use super::projection::{
    ProjectionKind, isometric_linear, perspective_factor, reduction,
};
use crate::config::MappingConfig;
use crate::coordinate_system::MIN_EXTENT;
use crate::error::{GeometryError, GeometryResult};

/// Converts "Y up" into raster "Y down".
const RASTER_FLIP: DMat3 = DMat3::from_cols(DVec3::X, DVec3::NEG_Y, DVec3::Z);

/// Linear part, translation and projection center produced by a setup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Setup {
    pub linear: DMat3,
    pub translation: DVec3,
    pub projection_center: DVec3,
}

/// Run the automatic setup for `config` over the domain box `[0, domain]`.
pub(crate) fn default_setup(config: &MappingConfig, domain: DVec3) -> GeometryResult<Setup> {
    vantage_core::profile_function!();
    if !domain.is_finite() {
        return Err(GeometryError::InvalidConfiguration(format!(
            "domain size must be finite, got {}",
            domain
        )));
    }
    let size = domain.abs();
    if size.min_element() < MIN_EXTENT {
        tracing::warn!(?size, "Degenerate mapping domain, using minimum size");
    }
    let size = at_least(size, MIN_EXTENT);

    let setup = match config.projection {
        ProjectionKind::Central | ProjectionKind::Parallel => {
            let rotation = view_rotation(config.view_direction)?;
            let center_distance = match config.projection {
                ProjectionKind::Central => {
                    Some(perspective_factor(config.perspective_strength) * size.length() * 0.5)
                }
                _ => None,
            };
            fit(rotation, size, config.target_size, center_distance)
        }
        ProjectionKind::Isometric => fit(
            isometric_linear(config.isometric_reduction),
            size,
            config.target_size,
            None,
        ),
        ProjectionKind::TwoDimensional => {
            fit(config.plane.linear(), size, config.target_size, None)
        }
    }?;

    tracing::debug!(
        projection = ?config.projection,
        scale = setup.linear.x_axis.length(),
        center = ?setup.projection_center,
        "Mapping setup"
    );
    Ok(setup)
}

/// Steps 2-4: the rotation taking `view` onto +Z with world Y pointing up (raster down).
pub(crate) fn view_rotation(view: DVec3) -> GeometryResult<DMat3> {
    if !view.is_finite() || view.length_squared() == 0.0 {
        return Err(GeometryError::ZeroViewDirection);
    }
    let about_z = rotation_z(-view.y.atan2(view.x));
    let view = about_z * view;
    let about_y = rotation_y(-view.x.atan2(view.z));

    let up = about_y * about_z * DVec3::Y;
    let roll = rotation_z(up.x.atan2(up.y));

    Ok(RASTER_FLIP * roll * about_y * about_z)
}

/// Steps 5-6 for a linear part `rotation` (unscaled).
///
/// With `center_distance` the corners are projected centrally from a center that far
/// from the domain center along +Z.
fn fit(
    rotation: DMat3,
    size: DVec3,
    target: DVec2,
    center_distance: Option<f64>,
) -> GeometryResult<Setup> {
    let center = size * 0.5;
    let mut lo = DVec2::splat(f64::INFINITY);
    let mut hi = DVec2::splat(f64::NEG_INFINITY);
    for corner in corners(size) {
        let q = rotation * (corner - center);
        let projected = match center_distance {
            Some(distance) => q.truncate() * reduction(distance, q.z),
            None => q.truncate(),
        };
        lo = lo.min(projected);
        hi = hi.max(projected);
    }

    let bounds = (hi - lo).max(DVec2::splat(MIN_EXTENT));
    let scale = (target.x / bounds.x).min(target.y / bounds.y);
    if !(scale.is_finite() && scale > 0.0) {
        return Err(GeometryError::InvariantViolation(format!(
            "mapping scale {} is not positive",
            scale
        )));
    }

    let middle = (lo + hi) * 0.5;
    let shift = (target * 0.5 - middle * scale).extend(0.0);
    let linear = rotation * scale;
    Ok(Setup {
        linear,
        translation: shift - linear * center,
        projection_center: DVec3::new(shift.x, shift.y, center_distance.unwrap_or(0.0) * scale),
    })
}

/// The eight corners of the box `[0, size]`.
fn corners(size: DVec3) -> [DVec3; 8] {
    std::array::from_fn(|i| {
        DVec3::new(
            if i & 1 == 0 { 0.0 } else { size.x },
            if i & 2 == 0 { 0.0 } else { size.y },
            if i & 4 == 0 { 0.0 } else { size.z },
        )
    })
}
