//! Dimensions: conversion between typed data values and logical coordinates.
//!
//! A dimension is the first stage of the coordinate pipeline (DCS → LCS). Dimensions
//! are explicitly constructed and shared between axes through `Arc`; a
//! [`DimensionSet`] owned by the chart context holds the standard instances.

use std::fmt;
use std::sync::Arc;

use vantage_core::alloc::HashMap;

use crate::calendar::Timestamp;
use crate::config::IntervalConfig;
use crate::error::{GeometryError, GeometryResult};
use crate::intervals::{
    Intervals, compute_date_intervals_f64, compute_fixed_intervals, compute_intervals,
    compute_log_intervals, nice_step,
};

/// A typed data value.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    Number(f64),
    DateTime(Timestamp),
    Category(String),
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Timestamp> for DataValue {
    fn from(value: Timestamp) -> Self {
        Self::DateTime(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        Self::Category(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        Self::Category(value)
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{}", value),
            Self::DateTime(ts) => match ts.to_civil() {
                Ok(civil) => write!(f, "{}", civil),
                Err(_) => write!(f, "@{}", ts.seconds()),
            },
            Self::Category(name) => write!(f, "'{}'", name),
        }
    }
}

/// Converts data values of one domain type to logical coordinates.
pub trait Dimension: fmt::Debug + Send + Sync {
    /// Name used in error messages and for lookup in a [`DimensionSet`].
    fn name(&self) -> &str;

    /// Logical coordinate of `value`.
    fn coordinate(&self, value: &DataValue) -> GeometryResult<f64>;

    /// Logical width occupied by `value` (non-zero for discrete domains).
    fn width(&self, _value: &DataValue) -> f64 {
        0.0
    }

    /// Data value at a logical coordinate.
    fn value(&self, coordinate: f64) -> DataValue;

    /// Boundaries for the logical range `[min, max]`, in logical coordinates.
    fn auto_intervals(
        &self,
        min: f64,
        max: f64,
        config: &IntervalConfig,
    ) -> GeometryResult<Intervals<f64>>;
}

fn invalid_value(dimension: &dyn Dimension, value: &DataValue) -> GeometryError {
    GeometryError::InvalidDataValue {
        dimension: dimension.name().to_string(),
        value: value.to_string(),
    }
}

/// Real numbers, on a linear or logarithmic scale.
///
/// With a logarithm base the logical coordinate is `log_base(value)`, so axes stay
/// linear in logical space.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericDimension {
    name: String,
    log_base: Option<f64>,
}

impl Default for NumericDimension {
    fn default() -> Self {
        Self::new()
    }
}

impl NumericDimension {
    pub fn new() -> Self {
        Self {
            name: "numeric".to_string(),
            log_base: None,
        }
    }

    /// A logarithmic dimension. `base` must be greater than 1.
    pub fn logarithmic(base: f64) -> GeometryResult<Self> {
        if !(base.is_finite() && base > 1.0) {
            return Err(GeometryError::InvalidConfiguration(format!(
                "logarithm base must be greater than 1, got {}",
                base
            )));
        }
        Ok(Self {
            name: format!("log{}", base),
            log_base: Some(base),
        })
    }

    pub fn log_base(&self) -> Option<f64> {
        self.log_base
    }
}

impl Dimension for NumericDimension {
    fn name(&self) -> &str {
        &self.name
    }

    fn coordinate(&self, value: &DataValue) -> GeometryResult<f64> {
        let DataValue::Number(number) = value else {
            return Err(invalid_value(self, value));
        };
        match self.log_base {
            None if number.is_finite() => Ok(*number),
            Some(base) if number.is_finite() && *number > 0.0 => Ok(number.log(base)),
            _ => Err(invalid_value(self, value)),
        }
    }

    fn value(&self, coordinate: f64) -> DataValue {
        match self.log_base {
            None => DataValue::Number(coordinate),
            Some(base) => DataValue::Number(base.powf(coordinate)),
        }
    }

    fn auto_intervals(
        &self,
        min: f64,
        max: f64,
        config: &IntervalConfig,
    ) -> GeometryResult<Intervals<f64>> {
        match self.log_base {
            None => compute_intervals(min, max, config.target_count, config.inside_only),
            Some(base) => {
                let intervals = compute_log_intervals(
                    base.powf(min),
                    base.powf(max),
                    base,
                    config.target_count,
                    config.inside_only,
                )?;
                Ok(intervals.map(|boundary| boundary.log(base)))
            }
        }
    }
}

/// Calendar instants; the logical coordinate is seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTimeDimension;

impl Dimension for DateTimeDimension {
    fn name(&self) -> &str {
        "datetime"
    }

    fn coordinate(&self, value: &DataValue) -> GeometryResult<f64> {
        match value {
            DataValue::DateTime(ts) => Ok(ts.as_f64()),
            DataValue::Number(seconds) if seconds.is_finite() => Ok(*seconds),
            _ => Err(invalid_value(self, value)),
        }
    }

    fn value(&self, coordinate: f64) -> DataValue {
        DataValue::DateTime(Timestamp::floor(coordinate))
    }

    fn auto_intervals(
        &self,
        min: f64,
        max: f64,
        config: &IntervalConfig,
    ) -> GeometryResult<Intervals<f64>> {
        compute_date_intervals_f64(min, max, config.target_count, config.inside_only)
    }
}

/// An ordered list of categories; each occupies one logical unit.
#[derive(Debug, Clone)]
pub struct CategoryDimension {
    name: String,
    categories: Vec<String>,
    index: HashMap<String, usize>,
}

impl CategoryDimension {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            categories: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for category in categories {
            self.push(category);
        }
        self
    }

    /// Append a category, returning its index. Existing categories keep theirs.
    pub fn push(&mut self, category: impl Into<String>) -> usize {
        let category = category.into();
        if let Some(&existing) = self.index.get(&category) {
            return existing;
        }
        let idx = self.categories.len();
        self.index.insert(category.clone(), idx);
        self.categories.push(category);
        idx
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Dimension for CategoryDimension {
    fn name(&self) -> &str {
        &self.name
    }

    fn coordinate(&self, value: &DataValue) -> GeometryResult<f64> {
        match value {
            DataValue::Category(name) => self
                .index
                .get(name)
                .map(|&idx| idx as f64)
                .ok_or_else(|| invalid_value(self, value)),
            _ => Err(invalid_value(self, value)),
        }
    }

    fn width(&self, _value: &DataValue) -> f64 {
        1.0
    }

    fn value(&self, coordinate: f64) -> DataValue {
        let rounded = coordinate.round();
        if rounded >= 0.0 && (rounded as usize) < self.categories.len() {
            DataValue::Category(self.categories[rounded as usize].clone())
        } else {
            DataValue::Number(coordinate)
        }
    }

    fn auto_intervals(
        &self,
        min: f64,
        max: f64,
        config: &IntervalConfig,
    ) -> GeometryResult<Intervals<f64>> {
        let raw = (max - min).abs() / config.target_count.max(1) as f64;
        compute_fixed_intervals(min, max, nice_step(raw).max(1.0), config.inside_only)
    }
}

/// The dimensions available to one chart.
#[derive(Debug, Clone)]
pub struct DimensionSet {
    numeric: Arc<dyn Dimension>,
    datetime: Arc<dyn Dimension>,
    by_name: HashMap<String, Arc<dyn Dimension>>,
}

impl Default for DimensionSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl DimensionSet {
    /// One linear numeric and one date/time dimension.
    pub fn standard() -> Self {
        let numeric: Arc<dyn Dimension> = Arc::new(NumericDimension::new());
        let datetime: Arc<dyn Dimension> = Arc::new(DateTimeDimension);
        let mut by_name = HashMap::new();
        by_name.insert(numeric.name().to_string(), numeric.clone());
        by_name.insert(datetime.name().to_string(), datetime.clone());
        Self {
            numeric,
            datetime,
            by_name,
        }
    }

    /// The standard numeric dimension.
    pub fn numeric(&self) -> Arc<dyn Dimension> {
        self.numeric.clone()
    }

    /// The standard date/time dimension.
    pub fn datetime(&self) -> Arc<dyn Dimension> {
        self.datetime.clone()
    }

    /// Register a dimension under its name, replacing any previous one.
    pub fn insert(&mut self, dimension: Arc<dyn Dimension>) {
        self.by_name.insert(dimension.name().to_string(), dimension);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Dimension>> {
        self.by_name.get(name).cloned()
    }
}
