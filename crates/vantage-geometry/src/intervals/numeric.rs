//! Numeric interval generation.

use super::{Intervals, StepUnit};
use crate::error::{GeometryError, GeometryResult};

/// Tolerance (in units of the step) absorbing floating-point noise when snapping.
const SNAP_EPSILON: f64 = 1e-9;

/// Upper bound on boundaries produced for a caller-fixed step.
pub const MAX_BOUNDARIES: usize = 10_000;

/// Number of candidate steps tried above the first guess.
const MAX_STEP_CANDIDATES: i32 = 24;

/// Number of finer steps tried when an inside-only result is too sparse.
const MAX_REFINEMENTS: i32 = 6;

/// Decimal exponents outside this bound are clamped before indexing steps.
const MAX_DECIMAL_EXPONENT: f64 = 400.0;

const MANTISSAS: [i64; 3] = [1, 2, 5];

/// One member of the `{1, 2, 5} × 10ⁿ` sequence, addressed by a running index.
#[derive(Debug, Clone, Copy, PartialEq)]
struct NiceStep {
    mantissa: i64,
    exponent: i32,
}

impl NiceStep {
    fn from_index(index: i32) -> Self {
        Self {
            mantissa: MANTISSAS[index.rem_euclid(3) as usize],
            exponent: index.div_euclid(3),
        }
    }

    /// Index of the `1 × 10ⁿ` candidate at or just below `value`.
    fn index_below(value: f64) -> i32 {
        let exponent = value
            .log10()
            .floor()
            .clamp(-MAX_DECIMAL_EXPONENT, MAX_DECIMAL_EXPONENT);
        exponent as i32 * 3
    }

    fn value(self) -> f64 {
        self.multiple(1)
    }

    /// `k · step`, computed from integers so boundaries do not accumulate drift.
    fn multiple(self, k: i64) -> f64 {
        let scaled = k as f64 * self.mantissa as f64;
        if self.exponent >= 0 {
            scaled * 10f64.powi(self.exponent)
        } else {
            scaled / 10f64.powi(-self.exponent)
        }
    }
}

/// Smallest member of `{1, 2, 5} × 10ⁿ` that is at least `raw`.
pub fn nice_step(raw: f64) -> f64 {
    let raw = raw.abs();
    if raw == 0.0 || !raw.is_finite() {
        return 1.0;
    }
    let mut index = NiceStep::index_below(raw);
    while NiceStep::from_index(index).value() < raw * (1.0 - SNAP_EPSILON) {
        index += 1;
    }
    NiceStep::from_index(index).value()
}

/// Compute "nice" boundaries for `[min, max]`.
///
/// Picks the smallest `{1, 2, 5} × 10ⁿ` step that divides the range into at most
/// `target_count` intervals. Without `inside_only` the boundaries are snapped outward
/// (first `≤ min`, last `≥ max`); with it only multiples strictly inside the range are
/// kept, refining the step while fewer than two survive.
///
/// A collapsed range (`min == max`) yields a single boundary pair one step apart.
pub fn compute_intervals(
    min: f64,
    max: f64,
    target_count: usize,
    inside_only: bool,
) -> GeometryResult<Intervals<f64>> {
    vantage_core::profile_function!();
    check_finite(min, max)?;
    let (min, max) = sorted_pair(min, max);
    let target = target_count.max(1) as f64;

    let range = max - min;
    if !range.is_finite() {
        return Err(GeometryError::InvalidConfiguration(format!(
            "interval range [{}, {}] is too wide",
            min, max
        )));
    }
    if range <= f64::EPSILON * max.abs().max(min.abs()).max(1.0) {
        return Ok(collapsed_pair(min));
    }

    let mut index = NiceStep::index_below(range / target) - 3;
    let end = index + MAX_STEP_CANDIDATES;
    let step = loop {
        if index > end {
            return Err(GeometryError::IntervalSearchExhausted {
                min,
                max,
                target_count,
            });
        }
        let candidate = NiceStep::from_index(index);
        if (range / candidate.value() - SNAP_EPSILON).ceil() <= target {
            break candidate;
        }
        index += 1;
    };

    if !inside_only {
        let (lo, hi) = outside_multiples(min, max, step.value());
        return Ok(from_multiples(step, lo, hi));
    }

    let mut step = step;
    for _ in 0..=MAX_REFINEMENTS {
        let (lo, hi) = inside_multiples(min, max, step.value());
        if hi - lo >= 1 {
            return Ok(from_multiples(step, lo, hi));
        }
        index -= 1;
        step = NiceStep::from_index(index);
    }

    Err(GeometryError::IntervalSearchExhausted {
        min,
        max,
        target_count,
    })
}

/// Boundaries at multiples of a caller-supplied step (a user step override).
pub fn compute_fixed_intervals(
    min: f64,
    max: f64,
    step: f64,
    inside_only: bool,
) -> GeometryResult<Intervals<f64>> {
    check_finite(min, max)?;
    if !(step.is_finite() && step > 0.0) {
        return Err(GeometryError::InvalidConfiguration(format!(
            "interval step must be positive, got {}",
            step
        )));
    }
    let (min, max) = sorted_pair(min, max);
    if (max - min) / step > MAX_BOUNDARIES as f64 {
        return Err(GeometryError::InvalidConfiguration(format!(
            "step {} over [{}, {}] exceeds {} boundaries",
            step, min, max, MAX_BOUNDARIES
        )));
    }

    let (lo, hi) = if inside_only {
        inside_multiples(min, max, step)
    } else {
        outside_multiples(min, max, step)
    };
    let boundaries = (lo..=hi).map(|k| k as f64 * step).collect();
    Ok(Intervals::new(boundaries, step, StepUnit::Number))
}

/// Boundaries at powers of `base` for a logarithmic axis.
///
/// The exponent step is the smallest of `1, 2, 5, 10, 20, …` giving at most
/// `target_count` intervals. Ranges narrower than one power of the base fall back to
/// linear boundaries. With `inside_only` the exponent step is refined while fewer than
/// two powers lie strictly inside the range, and linear boundaries are used once even a
/// step of one power is too coarse.
pub fn compute_log_intervals(
    min: f64,
    max: f64,
    base: f64,
    target_count: usize,
    inside_only: bool,
) -> GeometryResult<Intervals<f64>> {
    vantage_core::profile_function!();
    check_finite(min, max)?;
    if !(base.is_finite() && base > 1.0) {
        return Err(GeometryError::InvalidConfiguration(format!(
            "logarithm base must be greater than 1, got {}",
            base
        )));
    }
    if min <= 0.0 || max <= 0.0 {
        return Err(GeometryError::InvalidConfiguration(format!(
            "logarithmic range [{}, {}] must be positive",
            min, max
        )));
    }

    let (min, max) = sorted_pair(min, max);
    let log_min = min.log(base);
    let log_max = max.log(base);
    if log_max - log_min < 1.0 {
        tracing::trace!(min, max, base, "log range below one decade, using linear steps");
        return compute_intervals(min, max, target_count, inside_only);
    }

    let target = target_count.max(1) as f64;
    let mut index = 0;
    while ((log_max - log_min) / NiceStep::from_index(index).value() - SNAP_EPSILON).ceil()
        > target
    {
        index += 1;
        if index > MAX_STEP_CANDIDATES {
            return Err(GeometryError::IntervalSearchExhausted {
                min,
                max,
                target_count,
            });
        }
    }

    if !inside_only {
        let step = NiceStep::from_index(index);
        let (lo, hi) = outside_multiples(log_min, log_max, step.value());
        return Ok(powers(base, step, lo, hi));
    }

    for candidate in (0..=index).rev() {
        let step = NiceStep::from_index(candidate);
        let (lo, hi) = inside_multiples(log_min, log_max, step.value());
        if hi - lo >= 1 {
            return Ok(powers(base, step, lo, hi));
        }
    }

    tracing::trace!(min, max, base, "too few powers inside log range, using linear steps");
    compute_intervals(min, max, target_count, true)
}

/// `base^(k · step)` for `k` in `lo..=hi`.
fn powers(base: f64, step: NiceStep, lo: i64, hi: i64) -> Intervals<f64> {
    let exponent_step = step.value();
    let boundaries = (lo..=hi)
        .map(|k| base.powi((k as f64 * exponent_step).round() as i32))
        .collect();
    Intervals::new(boundaries, exponent_step, StepUnit::Decade)
}

fn check_finite(min: f64, max: f64) -> GeometryResult<()> {
    if min.is_finite() && max.is_finite() {
        Ok(())
    } else {
        Err(GeometryError::InvalidConfiguration(format!(
            "interval range [{}, {}] is not finite",
            min, max
        )))
    }
}

fn sorted_pair(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Range `[min, min]` forced one step ahead.
fn collapsed_pair(value: f64) -> Intervals<f64> {
    let step = if value == 0.0 {
        NiceStep::from_index(0)
    } else {
        NiceStep::from_index(NiceStep::index_below(value.abs()))
    };
    let (lo, _) = outside_multiples(value, value, step.value());
    from_multiples(step, lo, lo + 1)
}

/// Multiples `k` with `k·step ≤ min` and `k·step ≥ max`, tightest first/last.
fn outside_multiples(min: f64, max: f64, step: f64) -> (i64, i64) {
    let lo = (min / step + SNAP_EPSILON).floor() as i64;
    let hi = (max / step - SNAP_EPSILON).ceil() as i64;
    (lo, hi.max(lo))
}

/// Multiples `k` with `min < k·step < max`; `hi < lo` when there are none.
fn inside_multiples(min: f64, max: f64, step: f64) -> (i64, i64) {
    let lo = (min / step + SNAP_EPSILON).floor() as i64 + 1;
    let hi = (max / step - SNAP_EPSILON).ceil() as i64 - 1;
    (lo, hi)
}

fn from_multiples(step: NiceStep, lo: i64, hi: i64) -> Intervals<f64> {
    let boundaries = (lo..=hi).map(|k| step.multiple(k)).collect();
    Intervals::new(boundaries, step.value(), StepUnit::Number)
}
