//! Automatic interval generation for axes.
//!
//! Given a continuous range and a target boundary count, these routines choose
//! human-friendly boundaries for grid lines and tick labels:
//! - [`numeric`] - `{1, 2, 5} × 10ⁿ` steps, logarithmic decades, fixed user steps
//! - [`datetime`] - calendar-aware steps from seconds to millennia
//!
//! # Example
//!
//! ```
//! use vantage_geometry::intervals::{compute_intervals, StepUnit};
//!
//! let intervals = compute_intervals(0.0, 97.0, 5, false).unwrap();
//! assert_eq!(intervals.step(), 20.0);
//! assert_eq!(intervals.unit(), StepUnit::Number);
//! assert_eq!(intervals.boundaries(), &[0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
//! ```

pub mod datetime;
pub mod numeric;

pub use datetime::{DATE_STEPS, DateStep, compute_date_intervals, compute_date_intervals_f64};
pub use numeric::{compute_fixed_intervals, compute_intervals, compute_log_intervals, nice_step};

use crate::calendar::TimeUnit;

/// Unit of an interval step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepUnit {
    /// Plain numeric step.
    Number,
    /// Exponent step of a logarithmic axis (in powers of the base).
    Decade,
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

impl StepUnit {
    /// Whether this is a calendar unit.
    pub fn is_calendar(&self) -> bool {
        !matches!(self, Self::Number | Self::Decade)
    }
}

impl From<TimeUnit> for StepUnit {
    fn from(unit: TimeUnit) -> Self {
        match unit {
            TimeUnit::Second => Self::Second,
            TimeUnit::Minute => Self::Minute,
            TimeUnit::Hour => Self::Hour,
            TimeUnit::Day => Self::Day,
            TimeUnit::Month => Self::Month,
            TimeUnit::Year => Self::Year,
        }
    }
}

/// Result of an interval computation.
///
/// Boundaries are strictly increasing and contain no duplicates. `step` is the step
/// magnitude in `unit`s (e.g. `6.0` with [`StepUnit::Hour`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Intervals<T> {
    boundaries: Vec<T>,
    step: f64,
    unit: StepUnit,
}

impl<T: PartialOrd> Intervals<T> {
    pub(crate) fn new(mut boundaries: Vec<T>, step: f64, unit: StepUnit) -> Self {
        boundaries.dedup_by(|next, prev| next <= prev);
        Self {
            boundaries,
            step,
            unit,
        }
    }
}

impl<T> Intervals<T> {
    pub fn boundaries(&self) -> &[T] {
        &self.boundaries
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn unit(&self) -> StepUnit {
        self.unit
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    pub fn first(&self) -> Option<&T> {
        self.boundaries.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.boundaries.last()
    }

    pub fn into_boundaries(self) -> Vec<T> {
        self.boundaries
    }

    /// Convert every boundary, keeping step and unit.
    ///
    /// `f` must be strictly increasing to preserve ordering.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Intervals<U> {
        Intervals {
            boundaries: self.boundaries.into_iter().map(f).collect(),
            step: self.step,
            unit: self.unit,
        }
    }
}
