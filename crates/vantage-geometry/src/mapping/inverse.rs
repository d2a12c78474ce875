use glam::{DMat3, DVec2, DVec3};
use vantage_core::math::try_inverse;

use super::projection::{ProjectionKind, bending_offset};
use super::PostProjection;
use crate::error::{GeometryError, GeometryResult};

/// Values derived from a mapping, valid until the mapping changes.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingDerived {
    pub(crate) inverse: Option<InverseMapping>,
    /// `|M · e_i|` times the post-projection scale.
    pub(crate) enlargement: DVec3,
}

impl MappingDerived {
    pub(crate) fn compute(
        linear: DMat3,
        translation: DVec3,
        projection: ProjectionKind,
        projection_center: DVec3,
        bending: bool,
        target_size: DVec2,
        post: PostProjection,
    ) -> Self {
        let inverse = try_inverse(&linear).map(|linear_inverse| InverseMapping {
            linear: linear_inverse,
            translation: -(linear_inverse * translation),
            projection,
            projection_center,
            bending,
            target_size,
            post,
        });
        if inverse.is_none() {
            tracing::warn!(?linear, "Mapping linear part is singular");
        }
        let enlargement = DVec3::new(
            linear.x_axis.length(),
            linear.y_axis.length(),
            linear.z_axis.length(),
        ) * post.scale;
        Self {
            inverse,
            enlargement,
        }
    }

    pub(crate) fn inverse(&self) -> GeometryResult<&InverseMapping> {
        self.inverse.as_ref().ok_or_else(|| {
            GeometryError::InvariantViolation("mapping linear part is not invertible".to_string())
        })
    }
}

/// Closed-form inverse of a [`Mapping`](super::Mapping): target → world.
#[derive(Debug, Clone, PartialEq)]
pub struct InverseMapping {
    linear: DMat3,
    translation: DVec3,
    projection: ProjectionKind,
    projection_center: DVec3,
    bending: bool,
    target_size: DVec2,
    post: PostProjection,
}

impl InverseMapping {
    /// `M⁻¹`.
    pub fn linear(&self) -> DMat3 {
        self.linear
    }

    /// `−M⁻¹·V`.
    pub fn translation(&self) -> DVec3 {
        self.translation
    }

    /// Undo the affine part only: pre-projection point → world.
    pub fn unmap_linear(&self, p: DVec3) -> DVec3 {
        self.linear * p + self.translation
    }

    /// Target → world.
    ///
    /// Exact for every projection as long as `target` is the unmodified output of
    /// `Mapping::map`, whose Z carries the (possibly bent) depth.
    pub fn unmap(&self, target: DVec3) -> DVec3 {
        let xy = self.post.unapply(target.truncate());
        let p = match self.projection {
            ProjectionKind::Central => {
                let center = self.projection_center.truncate();
                let depth = if self.bending {
                    target.z + bending_offset(xy, center, self.target_size)
                } else {
                    target.z
                };
                self.undo_perspective(xy, depth)
            }
            _ => xy.extend(target.z),
        };
        self.unmap_linear(p)
    }

    /// Target X/Y at a known pre-projection depth (see `Mapping::linear`) → world.
    pub fn unmap_at_depth(&self, target: DVec2, depth: f64) -> DVec3 {
        let xy = self.post.unapply(target);
        let p = match self.projection {
            ProjectionKind::Central => self.undo_perspective(xy, depth),
            _ => xy.extend(depth),
        };
        self.unmap_linear(p)
    }

    fn undo_perspective(&self, xy: DVec2, depth: f64) -> DVec3 {
        let center = self.projection_center;
        let red = super::projection::reduction(center.z, depth);
        let center_xy = center.truncate();
        (center_xy + (xy - center_xy) / red).extend(depth)
    }
}
