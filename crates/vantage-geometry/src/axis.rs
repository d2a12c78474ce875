//! Axes: the LCS → ICS stage of the coordinate pipeline.
//!
//! An axis maps logical coordinates in `[min, max]` linearly onto `[0, ics_length]`
//! (or `[ics_length, 0]` when reversed). Which geometric direction that interval points
//! in is the axis [`AxisRole`], derived from the owning coordinate system's orientation.

use std::sync::Arc;

use glam::DVec3;
use vantage_core::alloc::IndexSlot;

use crate::cache::Cached;
use crate::config::IntervalConfig;
use crate::dimension::{DataValue, Dimension};
use crate::error::{GeometryError, GeometryResult};
use crate::intervals::{Intervals, compute_fixed_intervals};

/// Default ICS length of a new axis.
pub const DEFAULT_ICS_LENGTH: f64 = 100.0;

/// Logical ranges narrower than this are widened to one unit.
pub const MIN_LOGICAL_RANGE: f64 = 1e-12;

/// Geometric direction of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AxisRole {
    X,
    Y,
    Z,
}

impl AxisRole {
    pub const ALL: [AxisRole; 3] = [AxisRole::X, AxisRole::Y, AxisRole::Z];

    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Unit vector of this direction.
    pub fn unit(self) -> DVec3 {
        match self {
            Self::X => DVec3::X,
            Self::Y => DVec3::Y,
            Self::Z => DVec3::Z,
        }
    }
}

/// Handle of an axis inside a [`CoordinateSystemTree`](crate::coordinate_system::CoordinateSystemTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisId(pub(crate) IndexSlot);

/// A single chart axis.
#[derive(Debug, Clone)]
pub struct Axis {
    dimension: Arc<dyn Dimension>,
    role: AxisRole,
    min: f64,
    max: f64,
    reversed: bool,
    scale: f64,
    ics_length: f64,
    user_min: Option<f64>,
    user_max: Option<f64>,
    user_step: Option<f64>,
    interval_config: IntervalConfig,
    intervals: Cached<Intervals<f64>>,
}

impl Axis {
    /// Create an axis over `[0, 1]` with the default ICS length.
    pub fn new(dimension: Arc<dyn Dimension>, role: AxisRole) -> Self {
        Self {
            dimension,
            role,
            min: 0.0,
            max: 1.0,
            reversed: false,
            scale: 1.0,
            ics_length: DEFAULT_ICS_LENGTH,
            user_min: None,
            user_max: None,
            user_step: None,
            interval_config: IntervalConfig::default(),
            intervals: Cached::Dirty,
        }
    }

    pub fn dimension(&self) -> &Arc<dyn Dimension> {
        &self.dimension
    }

    /// Rebind the axis to another dimension. The range is kept; intervals are recomputed.
    pub fn set_dimension(&mut self, dimension: Arc<dyn Dimension>) {
        self.dimension = dimension;
        self.intervals.invalidate();
    }

    pub fn role(&self) -> AxisRole {
        self.role
    }

    pub(crate) fn set_role(&mut self, role: AxisRole) {
        self.role = role;
    }

    /// Data-derived minimum (before user overrides).
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Data-derived maximum (before user overrides).
    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Length of the axis in intermediate coordinates (`MaxValueICS`).
    pub fn ics_length(&self) -> f64 {
        self.ics_length
    }

    pub fn user_step(&self) -> Option<f64> {
        self.user_step
    }

    pub fn interval_config(&self) -> &IntervalConfig {
        &self.interval_config
    }

    /// The range actually mapped: user overrides first, widened if degenerate.
    pub fn effective_range(&self) -> (f64, f64) {
        let min = self.user_min.unwrap_or(self.min);
        let max = self.user_max.unwrap_or(self.max);
        if (max - min).abs() < MIN_LOGICAL_RANGE {
            (min, min + 1.0)
        } else {
            (min, max)
        }
    }

    /// Set the data range.
    pub fn set_range(&mut self, min: f64, max: f64) -> GeometryResult<()> {
        if !(min.is_finite() && max.is_finite()) {
            return Err(GeometryError::InvalidConfiguration(format!(
                "axis range [{}, {}] is not finite",
                min, max
            )));
        }
        self.min = min;
        self.max = max;
        self.intervals.invalidate();
        Ok(())
    }

    /// Override either end of the range; `None` falls back to the data range.
    pub fn set_user_range(&mut self, min: Option<f64>, max: Option<f64>) -> GeometryResult<()> {
        if min.is_some_and(|v| !v.is_finite()) || max.is_some_and(|v| !v.is_finite()) {
            return Err(GeometryError::InvalidConfiguration(
                "axis range override is not finite".to_string(),
            ));
        }
        self.user_min = min;
        self.user_max = max;
        self.intervals.invalidate();
        Ok(())
    }

    /// Force a fixed interval step; `None` restores automatic intervals.
    pub fn set_user_step(&mut self, step: Option<f64>) -> GeometryResult<()> {
        if let Some(step) = step
            && !(step.is_finite() && step > 0.0)
        {
            return Err(GeometryError::InvalidConfiguration(format!(
                "axis step must be positive, got {}",
                step
            )));
        }
        self.user_step = step;
        self.intervals.invalidate();
        Ok(())
    }

    pub fn set_interval_config(&mut self, config: IntervalConfig) -> GeometryResult<()> {
        config.validate()?;
        self.interval_config = config;
        self.intervals.invalidate();
        Ok(())
    }

    pub fn set_reversed(&mut self, reversed: bool) {
        self.reversed = reversed;
    }

    /// Set the logical-unit multiplier applied to dimension coordinates.
    pub fn set_scale(&mut self, scale: f64) -> GeometryResult<()> {
        if !(scale.is_finite() && scale != 0.0) {
            return Err(GeometryError::InvalidConfiguration(format!(
                "axis scale must be finite and non-zero, got {}",
                scale
            )));
        }
        self.scale = scale;
        Ok(())
    }

    /// Set the ICS length, clamped to `≥ 0`.
    pub fn set_ics_length(&mut self, length: f64) {
        self.ics_length = if length.is_finite() { length.max(0.0) } else { 0.0 };
    }

    /// Set the data range from the extremes of `values`, honoring each value's width.
    ///
    /// User overrides still take precedence in [`effective_range`](Self::effective_range).
    pub fn fit_to_data<'a>(
        &mut self,
        values: impl IntoIterator<Item = &'a DataValue>,
    ) -> GeometryResult<()> {
        let mut range: Option<(f64, f64)> = None;
        for value in values {
            let lo = self.coordinate(value)?;
            let hi = lo + self.width(value);
            range = Some(match range {
                None => (lo, hi),
                Some((min, max)) => (min.min(lo), max.max(hi)),
            });
        }
        match range {
            Some((min, max)) => self.set_range(min, max),
            None => Ok(()),
        }
    }

    /// Logical coordinate of a data value.
    pub fn coordinate(&self, value: &DataValue) -> GeometryResult<f64> {
        Ok(self.dimension.coordinate(value)? * self.scale)
    }

    /// Logical width of a data value.
    pub fn width(&self, value: &DataValue) -> f64 {
        self.dimension.width(value) * self.scale
    }

    pub fn logical_to_ics(&self, logical: f64) -> f64 {
        let (min, max) = self.effective_range();
        let t = (logical - min) / (max - min);
        if self.reversed {
            (1.0 - t) * self.ics_length
        } else {
            t * self.ics_length
        }
    }

    /// Inverse of [`logical_to_ics`](Self::logical_to_ics). A zero-length axis maps
    /// everything to the range minimum.
    pub fn ics_to_logical(&self, ics: f64) -> f64 {
        let (min, max) = self.effective_range();
        if self.ics_length <= 0.0 {
            return min;
        }
        let t = ics / self.ics_length;
        let t = if self.reversed { 1.0 - t } else { t };
        min + t * (max - min)
    }

    pub fn value_to_ics(&self, value: &DataValue) -> GeometryResult<f64> {
        Ok(self.logical_to_ics(self.coordinate(value)?))
    }

    /// Data value at an ICS position.
    pub fn ics_to_value(&self, ics: f64) -> DataValue {
        self.dimension.value(self.ics_to_logical(ics) / self.scale)
    }

    /// Grid boundaries over the effective range, in logical coordinates.
    ///
    /// Recomputed only after a range, step or interval setting changed.
    pub fn intervals(&mut self) -> GeometryResult<&Intervals<f64>> {
        let (min, max) = self.effective_range();
        let dimension = &self.dimension;
        let config = self.interval_config;
        let user_step = self.user_step;
        self.intervals.try_get_or_refresh(|| match user_step {
            Some(step) => compute_fixed_intervals(min, max, step, config.inside_only),
            None => dimension.auto_intervals(min, max, &config),
        })
    }

    /// Whether [`intervals`](Self::intervals) would recompute.
    pub fn intervals_dirty(&self) -> bool {
        !self.intervals.is_fresh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::{CategoryDimension, NumericDimension};

    fn numeric_axis() -> Axis {
        Axis::new(Arc::new(NumericDimension::new()), AxisRole::X)
    }

    #[test]
    fn test_logical_to_ics() {
        let mut axis = numeric_axis();
        axis.set_range(10.0, 20.0).unwrap();
        axis.set_ics_length(50.0);
        assert!((axis.logical_to_ics(15.0) - 25.0).abs() < 1e-12);
        assert!((axis.ics_to_logical(25.0) - 15.0).abs() < 1e-12);

        axis.set_reversed(true);
        assert!((axis.logical_to_ics(12.0) - 40.0).abs() < 1e-12);
        assert!((axis.ics_to_logical(40.0) - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_range_is_widened() {
        let mut axis = numeric_axis();
        axis.set_range(5.0, 5.0).unwrap();
        assert_eq!(axis.effective_range(), (5.0, 6.0));
        assert!(axis.logical_to_ics(5.5).is_finite());
    }

    #[test]
    fn test_user_range_takes_precedence() {
        let mut axis = numeric_axis();
        axis.set_range(0.0, 10.0).unwrap();
        axis.set_user_range(None, Some(50.0)).unwrap();
        assert_eq!(axis.effective_range(), (0.0, 50.0));
        assert!(axis.set_user_range(Some(f64::NAN), None).is_err());
    }

    #[test]
    fn test_ics_length_is_clamped() {
        let mut axis = numeric_axis();
        axis.set_ics_length(-3.0);
        assert_eq!(axis.ics_length(), 0.0);
        assert_eq!(axis.ics_to_logical(1.0), 0.0);
    }

    #[test]
    fn test_fit_to_data() {
        let mut axis = numeric_axis();
        let values = [DataValue::Number(3.0), DataValue::Number(-2.0), DataValue::Number(7.5)];
        axis.fit_to_data(&values).unwrap();
        assert_eq!((axis.min(), axis.max()), (-2.0, 7.5));

        let bad = [DataValue::from("x")];
        assert!(axis.fit_to_data(&bad).is_err());
        assert_eq!((axis.min(), axis.max()), (-2.0, 7.5));
    }

    #[test]
    fn test_fit_to_categories_includes_width() {
        let dim = CategoryDimension::new("c").with_categories(["a", "b", "c"]);
        let mut axis = Axis::new(Arc::new(dim), AxisRole::X);
        let values: Vec<DataValue> = ["a", "c"].into_iter().map(DataValue::from).collect();
        axis.fit_to_data(&values).unwrap();
        assert_eq!((axis.min(), axis.max()), (0.0, 3.0));
    }

    #[test]
    fn test_intervals_cached_until_mutation() {
        let mut axis = numeric_axis();
        axis.set_range(0.0, 97.0).unwrap();
        assert!(axis.intervals_dirty());
        assert_eq!(axis.intervals().unwrap().step(), 20.0);
        assert!(!axis.intervals_dirty());

        axis.set_user_step(Some(25.0)).unwrap();
        assert!(axis.intervals_dirty());
        assert_eq!(
            axis.intervals().unwrap().boundaries(),
            &[0.0, 25.0, 50.0, 75.0, 100.0]
        );

        axis.set_interval_config(IntervalConfig::default().with_inside_only(true))
            .unwrap();
        assert!(axis.intervals_dirty());
        assert_eq!(axis.intervals().unwrap().boundaries(), &[25.0, 50.0, 75.0]);
    }

    #[test]
    fn test_ics_to_value_inverts_value_to_ics() {
        let mut axis = numeric_axis();
        axis.set_scale(2.0).unwrap();
        axis.set_range(20.0, 40.0).unwrap();
        let ics = axis.value_to_ics(&DataValue::Number(15.0)).unwrap();
        assert!((ics - 50.0).abs() < 1e-12);
        match axis.ics_to_value(ics) {
            DataValue::Number(value) => assert!((value - 15.0).abs() < 1e-12),
            other => panic!("expected a number, got {:?}", other),
        }
    }

    #[test]
    fn test_log_axis_inside_intervals_at_default_range() {
        // Logical [0, 1] is the single decade [1, 10]; no power of ten lies inside it.
        let dimension = NumericDimension::logarithmic(10.0).unwrap();
        let mut axis = Axis::new(Arc::new(dimension), AxisRole::Y);
        axis.set_interval_config(IntervalConfig::default().with_inside_only(true))
            .unwrap();
        let intervals = axis.intervals().unwrap();
        assert!(intervals.len() >= 2);
        for &boundary in intervals.boundaries() {
            assert!(boundary > 0.0 && boundary < 1.0, "{}", boundary);
        }
        assert!((intervals.boundaries()[0] - 2f64.log10()).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_step_rejected() {
        let mut axis = numeric_axis();
        assert!(axis.set_user_step(Some(0.0)).is_err());
        assert!(axis.set_user_step(Some(-1.0)).is_err());
        assert!(axis.set_user_step(None).is_ok());
    }
}
