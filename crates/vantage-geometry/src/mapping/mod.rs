//! Projective mapping from world coordinates to the target surface (WCS → TCS).
//!
//! A [`Mapping`] applies a linear part `M` and translation `V`, then the projection
//! step of its [`ProjectionKind`], then an optional post-projection adjustment. Target
//! X grows to the right and Y downward from the top-left corner; target Z is a relative
//! depth (larger is nearer the viewer) that is only meaningful for draw ordering.
//!
//! # Example
//!
//! ```
//! use glam::DVec3;
//! use vantage_geometry::config::MappingConfig;
//! use vantage_geometry::mapping::{Mapping, ProjectionKind};
//!
//! let config = MappingConfig::new(ProjectionKind::Parallel)
//!     .with_view_direction(DVec3::new(10.0, 7.0, 20.0))
//!     .with_target_size(600.0, 400.0);
//! let mut mapping = Mapping::new(config, DVec3::new(100.0, 80.0, 40.0)).unwrap();
//!
//! let center = mapping.map(DVec3::new(50.0, 40.0, 20.0));
//! assert!((center.x - 300.0).abs() < 1e-9 && (center.y - 200.0).abs() < 1e-9);
//!
//! let back = mapping.inverse().unwrap().unmap(center);
//! assert!((back - DVec3::new(50.0, 40.0, 20.0)).length() < 1e-9);
//! ```

mod inverse;
mod projection;
mod setup;

pub use inverse::{InverseMapping, MappingDerived};
pub use projection::{
    MAX_PERSPECTIVE_FACTOR, PERSPECTIVE_FACTOR_SLOPE, ProjectionKind, ProjectionPlane,
    perspective_factor, perspective_strength,
};

use glam::{DMat3, DVec2, DVec3};

use crate::cache::Cached;
use crate::config::{Margins, MappingConfig};
use crate::error::{GeometryError, GeometryResult};
use projection::project_central;

/// Typographic points per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Affine adjustment applied after projection: `(p − old) · scale + new` on X and Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostProjection {
    pub old: DVec2,
    pub new: DVec2,
    pub scale: f64,
}

impl Default for PostProjection {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl PostProjection {
    pub const IDENTITY: Self = Self {
        old: DVec2::ZERO,
        new: DVec2::ZERO,
        scale: 1.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn apply(&self, xy: DVec2) -> DVec2 {
        (xy - self.old) * self.scale + self.new
    }

    pub fn unapply(&self, xy: DVec2) -> DVec2 {
        (xy - self.new) / self.scale + self.old
    }
}

/// World → target transform with lazily derived inverse and enlargements.
///
/// Every mutator clears the derived cache. Cloning copies everything, cache included,
/// so clones can be used independently (for example on other threads).
#[derive(Debug, Clone)]
pub struct Mapping {
    config: MappingConfig,
    domain: DVec3,
    linear: DMat3,
    translation: DVec3,
    projection_center: DVec3,
    post_projection: PostProjection,
    derived: Cached<MappingDerived>,
}

impl Mapping {
    /// Create a mapping and run the automatic setup for the domain box `[0, domain]`.
    pub fn new(config: MappingConfig, domain: DVec3) -> GeometryResult<Self> {
        config.validate()?;
        let setup = setup::default_setup(&config, domain)?;
        Ok(Self {
            config,
            domain,
            linear: setup.linear,
            translation: setup.translation,
            projection_center: setup.projection_center,
            post_projection: PostProjection::IDENTITY,
            derived: Cached::Dirty,
        })
    }

    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    pub fn projection(&self) -> ProjectionKind {
        self.config.projection
    }

    pub fn view_direction(&self) -> DVec3 {
        self.config.view_direction
    }

    /// Projection center distance in domain radii.
    pub fn perspective_factor(&self) -> f64 {
        perspective_factor(self.config.perspective_strength)
    }

    pub fn isometric_reduction(&self) -> DVec2 {
        self.config.isometric_reduction
    }

    pub fn plane(&self) -> ProjectionPlane {
        self.config.plane
    }

    pub fn target_size(&self) -> DVec2 {
        self.config.target_size
    }

    pub fn dpi(&self) -> f64 {
        self.config.dpi
    }

    pub fn margins(&self) -> Margins {
        self.config.margins
    }

    pub fn bending(&self) -> bool {
        self.config.bending
    }

    /// Size of the domain box the mapping was set up for.
    pub fn domain(&self) -> DVec3 {
        self.domain
    }

    /// `M`.
    pub fn linear_part(&self) -> DMat3 {
        self.linear
    }

    /// `V`.
    pub fn translation(&self) -> DVec3 {
        self.translation
    }

    pub fn projection_center(&self) -> DVec3 {
        self.projection_center
    }

    pub fn post_projection(&self) -> PostProjection {
        self.post_projection
    }

    /// Whether derived values must be recomputed before the next query.
    pub fn is_dirty(&self) -> bool {
        !self.derived.is_fresh()
    }

    /// World → target.
    pub fn map(&self, world: DVec3) -> DVec3 {
        let p = self.linear(world);
        let projected = match self.config.projection {
            ProjectionKind::Central => project_central(
                p,
                self.projection_center,
                self.config.bending,
                self.config.target_size,
            ),
            _ => p,
        };
        self.post_projection
            .apply(projected.truncate())
            .extend(projected.z)
    }

    /// Pre-projection point `M · world + V`. Its Z is the depth central inverses need.
    pub fn linear(&self, world: DVec3) -> DVec3 {
        self.linear * world + self.translation
    }

    /// Replace the whole configuration and re-run the automatic setup.
    ///
    /// Nothing changes if `config` is invalid.
    pub fn set_config(&mut self, config: MappingConfig) -> GeometryResult<()> {
        config.validate()?;
        let setup = setup::default_setup(&config, self.domain)?;
        self.config = config;
        self.apply_setup(setup);
        Ok(())
    }

    /// Re-run the automatic setup for another domain box.
    pub fn set_domain(&mut self, domain: DVec3) -> GeometryResult<()> {
        let setup = setup::default_setup(&self.config, domain)?;
        self.domain = domain;
        self.apply_setup(setup);
        Ok(())
    }

    pub fn set_projection(&mut self, projection: ProjectionKind) -> GeometryResult<()> {
        self.set_config(self.config.clone().with_projection(projection))
    }

    pub fn set_view_direction(&mut self, view_direction: DVec3) -> GeometryResult<()> {
        self.set_config(self.config.clone().with_view_direction(view_direction))
    }

    pub fn set_perspective_strength(&mut self, strength: f64) -> GeometryResult<()> {
        self.set_config(self.config.clone().with_perspective_strength(strength))
    }

    pub fn set_isometric_reduction(&mut self, reduction: DVec2) -> GeometryResult<()> {
        self.set_config(self.config.clone().with_isometric_reduction(reduction))
    }

    pub fn set_plane(&mut self, plane: ProjectionPlane) -> GeometryResult<()> {
        self.set_config(self.config.clone().with_plane(plane))
    }

    pub fn set_target_size(&mut self, width: f64, height: f64) -> GeometryResult<()> {
        self.set_config(self.config.clone().with_target_size(width, height))
    }

    pub fn set_dpi(&mut self, dpi: f64) -> GeometryResult<()> {
        self.set_config(self.config.clone().with_dpi(dpi))
    }

    pub fn set_margins(&mut self, margins: Margins) -> GeometryResult<()> {
        self.set_config(self.config.clone().with_margins(margins))
    }

    pub fn set_bending(&mut self, bending: bool) -> GeometryResult<()> {
        self.set_config(self.config.clone().with_bending(bending))
    }

    /// Override `M` and `V` directly. A later setup replaces them again.
    pub fn set_transform(&mut self, linear: DMat3, translation: DVec3) -> GeometryResult<()> {
        if !(linear.is_finite() && translation.is_finite()) {
            return Err(GeometryError::InvalidConfiguration(
                "mapping transform must be finite".to_string(),
            ));
        }
        self.linear = linear;
        self.translation = translation;
        self.derived.invalidate();
        Ok(())
    }

    pub fn set_post_projection(&mut self, post: PostProjection) -> GeometryResult<()> {
        if !(post.old.is_finite() && post.new.is_finite() && post.scale.is_finite() && post.scale > 0.0)
        {
            return Err(GeometryError::InvalidConfiguration(format!(
                "post-projection scale must be positive and finite, got {}",
                post.scale
            )));
        }
        self.post_projection = post;
        self.derived.invalidate();
        Ok(())
    }

    pub fn reset_post_projection(&mut self) {
        self.post_projection = PostProjection::IDENTITY;
        self.derived.invalidate();
    }

    /// Fit the whole target rectangle into a sub-rectangle, keeping its aspect ratio
    /// and centering it.
    pub fn remap_into(&mut self, origin: DVec2, size: DVec2) -> GeometryResult<()> {
        if !(origin.is_finite() && size.is_finite() && size.x > 0.0 && size.y > 0.0) {
            return Err(GeometryError::InvalidConfiguration(format!(
                "remap rectangle must have a positive size, got {}x{}",
                size.x, size.y
            )));
        }
        let target = self.config.target_size;
        let scale = (size.x / target.x).min(size.y / target.y);
        let new = origin + (size - target * scale) * 0.5;
        self.set_post_projection(PostProjection {
            old: DVec2::ZERO,
            new,
            scale,
        })
    }

    fn apply_setup(&mut self, setup: setup::Setup) {
        self.linear = setup.linear;
        self.translation = setup.translation;
        self.projection_center = setup.projection_center;
        self.derived.invalidate();
    }

    fn derived(&mut self) -> &MappingDerived {
        let linear = self.linear;
        let translation = self.translation;
        let projection = self.config.projection;
        let center = self.projection_center;
        let bending = self.config.bending;
        let target_size = self.config.target_size;
        let post = self.post_projection;
        self.derived.get_or_refresh(|| {
            MappingDerived::compute(
                linear,
                translation,
                projection,
                center,
                bending,
                target_size,
                post,
            )
        })
    }

    /// Cached target → world inverse.
    pub fn inverse(&mut self) -> GeometryResult<&InverseMapping> {
        self.derived().inverse()
    }

    /// Target distance per world unit along world X.
    pub fn enlargement_x(&mut self) -> f64 {
        self.derived().enlargement.x
    }

    /// Target distance per world unit along world Y.
    pub fn enlargement_y(&mut self) -> f64 {
        self.derived().enlargement.y
    }

    /// Target distance per world unit along world Z.
    pub fn enlargement_z(&mut self) -> f64 {
        self.derived().enlargement.z
    }

    /// Average of the three per-axis enlargements.
    pub fn enlargement(&mut self) -> f64 {
        self.derived().enlargement.element_sum() / 3.0
    }

    /// Pixels covered by a length given in typographic points, at the target DPI and
    /// the current post-projection zoom.
    pub fn points_to_pixels(&self, points: f64) -> f64 {
        points * self.config.dpi / POINTS_PER_INCH * self.post_projection.scale
    }

    /// World length that appears `points` long on the target.
    pub fn points_to_world(&mut self, points: f64) -> f64 {
        let pixels = self.points_to_pixels(points);
        let enlargement = self.enlargement();
        if enlargement > 0.0 { pixels / enlargement } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parallel() -> Mapping {
        let config = MappingConfig::new(ProjectionKind::Parallel)
            .with_view_direction(DVec3::new(10.0, 7.0, 20.0));
        Mapping::new(config, DVec3::new(100.0, 80.0, 40.0)).unwrap()
    }

    #[test]
    fn test_every_mutator_clears_cache() {
        let mut mapping = parallel();
        let mutators: Vec<Box<dyn Fn(&mut Mapping)>> = vec![
            Box::new(|m| m.set_projection(ProjectionKind::Central).unwrap()),
            Box::new(|m| m.set_view_direction(DVec3::new(1.0, 2.0, 3.0)).unwrap()),
            Box::new(|m| m.set_perspective_strength(80.0).unwrap()),
            Box::new(|m| m.set_isometric_reduction(DVec2::new(0.3, 0.4)).unwrap()),
            Box::new(|m| m.set_plane(ProjectionPlane::Xz).unwrap()),
            Box::new(|m| m.set_target_size(300.0, 300.0).unwrap()),
            Box::new(|m| m.set_dpi(144.0).unwrap()),
            Box::new(|m| m.set_bending(true).unwrap()),
            Box::new(|m| m.set_domain(DVec3::new(10.0, 10.0, 10.0)).unwrap()),
            Box::new(|m| m.set_transform(DMat3::IDENTITY, DVec3::ZERO).unwrap()),
            Box::new(|m| m.remap_into(DVec2::ZERO, DVec2::new(100.0, 100.0)).unwrap()),
            Box::new(|m| m.reset_post_projection()),
        ];
        for (i, mutate) in mutators.iter().enumerate() {
            mapping.enlargement();
            assert!(!mapping.is_dirty());
            mutate(&mut mapping);
            assert!(mapping.is_dirty(), "mutator {} kept the cache", i);
        }
    }

    #[test]
    fn test_invalid_update_leaves_mapping_untouched() {
        let mut mapping = parallel();
        let before = mapping.linear_part();
        mapping.enlargement();

        assert_eq!(
            mapping.set_view_direction(DVec3::ZERO),
            Err(GeometryError::ZeroViewDirection)
        );
        assert!(mapping.set_target_size(-1.0, 10.0).is_err());
        assert!(mapping.set_perspective_strength(150.0).is_err());

        assert_eq!(mapping.linear_part(), before);
        assert!(!mapping.is_dirty());
    }

    #[test]
    fn test_post_projection() {
        let mut mapping = parallel();
        let world = DVec3::new(20.0, 10.0, 5.0);
        let plain = mapping.map(world);

        mapping
            .set_post_projection(PostProjection {
                old: DVec2::new(100.0, 100.0),
                new: DVec2::new(10.0, 20.0),
                scale: 0.5,
            })
            .unwrap();
        let adjusted = mapping.map(world);
        assert!((adjusted.x - ((plain.x - 100.0) * 0.5 + 10.0)).abs() < 1e-9);
        assert!((adjusted.y - ((plain.y - 100.0) * 0.5 + 20.0)).abs() < 1e-9);
        assert_eq!(adjusted.z, plain.z);

        let bad = PostProjection {
            scale: 0.0,
            ..PostProjection::IDENTITY
        };
        assert!(mapping.set_post_projection(bad).is_err());
    }

    #[test]
    fn test_remap_into_keeps_aspect() {
        let mut mapping = parallel();
        mapping.remap_into(DVec2::new(100.0, 0.0), DVec2::new(300.0, 300.0)).unwrap();
        let post = mapping.post_projection();
        assert!((post.scale - 0.5).abs() < 1e-12);
        // 600x400 shrinks to 300x200, centered vertically in the 300x300 box.
        assert!((post.new - DVec2::new(100.0, 50.0)).length() < 1e-12);
    }

    #[test]
    fn test_points_to_pixels() {
        let mut mapping = parallel();
        assert!((mapping.points_to_pixels(72.0) - 96.0).abs() < 1e-12);
        let world = mapping.points_to_world(72.0);
        assert!((world * mapping.enlargement() - 96.0).abs() < 1e-9);
    }

    #[test]
    fn test_margins_are_reserved() {
        let mut mapping = parallel();
        let before = mapping.map(DVec3::new(10.0, 20.0, 30.0));
        mapping.set_margins(Margins::uniform(10.0)).unwrap();
        assert_eq!(mapping.margins(), Margins::uniform(10.0));
        assert_eq!(mapping.map(DVec3::new(10.0, 20.0, 30.0)), before);
    }
}
