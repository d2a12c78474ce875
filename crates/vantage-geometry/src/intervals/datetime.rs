//! Calendar-aware interval generation for date/time axes.
//!
//! Boundaries always sit on calendar positions: a step of `n` units restarts at every
//! boundary of the enclosing unit (`15` minutes restarts each hour, `4` months each
//! year), and years align on multiples of `n`.

use super::{Intervals, StepUnit};
use crate::calendar::{CivilDateTime, TimeUnit, Timestamp};
use crate::error::{GeometryError, GeometryResult};

/// Candidate steps whose estimated boundary count exceeds this are skipped.
const MAX_ESTIMATED_BOUNDARIES: f64 = 100_000.0;

/// Largest supported distance from the epoch (about 95,000 years).
const MAX_ABS_SECONDS: i64 = 3_000_000_000_000;

/// A calendar step: `count` consecutive `unit`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateStep {
    pub unit: TimeUnit,
    pub count: u32,
}

impl DateStep {
    pub const fn new(unit: TimeUnit, count: u32) -> Self {
        Self { unit, count }
    }

    /// Nominal length of the step in seconds.
    pub fn approx_seconds(&self) -> f64 {
        self.unit.approx_seconds() * self.count as f64
    }

    /// Day steps that are multiples of five snap to days 5, 10, 15, ... of each month.
    fn snaps_to_fives(&self) -> bool {
        self.unit == TimeUnit::Day && self.count % 5 == 0
    }
}

/// Every supported step, finest first.
pub const DATE_STEPS: [DateStep; 39] = [
    DateStep::new(TimeUnit::Second, 1),
    DateStep::new(TimeUnit::Second, 2),
    DateStep::new(TimeUnit::Second, 5),
    DateStep::new(TimeUnit::Second, 10),
    DateStep::new(TimeUnit::Second, 15),
    DateStep::new(TimeUnit::Second, 20),
    DateStep::new(TimeUnit::Second, 30),
    DateStep::new(TimeUnit::Minute, 1),
    DateStep::new(TimeUnit::Minute, 2),
    DateStep::new(TimeUnit::Minute, 5),
    DateStep::new(TimeUnit::Minute, 10),
    DateStep::new(TimeUnit::Minute, 15),
    DateStep::new(TimeUnit::Minute, 20),
    DateStep::new(TimeUnit::Minute, 30),
    DateStep::new(TimeUnit::Hour, 1),
    DateStep::new(TimeUnit::Hour, 2),
    DateStep::new(TimeUnit::Hour, 4),
    DateStep::new(TimeUnit::Hour, 6),
    DateStep::new(TimeUnit::Hour, 12),
    DateStep::new(TimeUnit::Day, 1),
    DateStep::new(TimeUnit::Day, 2),
    DateStep::new(TimeUnit::Day, 5),
    DateStep::new(TimeUnit::Day, 10),
    DateStep::new(TimeUnit::Day, 15),
    DateStep::new(TimeUnit::Month, 1),
    DateStep::new(TimeUnit::Month, 2),
    DateStep::new(TimeUnit::Month, 3),
    DateStep::new(TimeUnit::Month, 4),
    DateStep::new(TimeUnit::Month, 6),
    DateStep::new(TimeUnit::Year, 1),
    DateStep::new(TimeUnit::Year, 2),
    DateStep::new(TimeUnit::Year, 5),
    DateStep::new(TimeUnit::Year, 10),
    DateStep::new(TimeUnit::Year, 20),
    DateStep::new(TimeUnit::Year, 50),
    DateStep::new(TimeUnit::Year, 100),
    DateStep::new(TimeUnit::Year, 200),
    DateStep::new(TimeUnit::Year, 500),
    DateStep::new(TimeUnit::Year, 1000),
];

/// Compute calendar boundaries for `[min, max]`.
///
/// Starting from the coarsest step that places at least two boundaries inside the closed
/// range, finer steps are tried while the resulting boundary count stays within
/// `target_count`. Without `inside_only` the result spans the range (first `≤ min`,
/// last `≥ max`); with it only boundaries strictly inside the range are kept, falling
/// back to the closed range when the interior is too sparse.
pub fn compute_date_intervals(
    min: Timestamp,
    max: Timestamp,
    target_count: usize,
    inside_only: bool,
) -> GeometryResult<Intervals<Timestamp>> {
    vantage_core::profile_function!();
    check_supported(min)?;
    check_supported(max)?;

    let (lo, mut hi) = if min <= max { (min, max) } else { (max, min) };
    if lo == hi {
        hi = lo.add(TimeUnit::Second, 1)?;
    }
    let target = target_count.max(1);
    let span = (hi.seconds() - lo.seconds()) as f64;
    let too_dense = |step: &DateStep| span / step.approx_seconds() > MAX_ESTIMATED_BOUNDARIES;

    let mut start = None;
    for (index, step) in DATE_STEPS.iter().enumerate().rev() {
        if too_dense(step) {
            break;
        }
        let all = boundaries_for(*step, lo, hi)?;
        let closed = clamp_closed(&all, lo, hi);
        if closed.len() >= 2 {
            let initial = if inside_only {
                let inside = clamp_inside(&all, lo, hi);
                if inside.len() >= 2 { inside } else { closed }
            } else {
                clamp_outside(&all, lo, hi)
            };
            start = Some((index, initial));
            break;
        }
    }

    let Some((start_index, initial)) = start else {
        return Err(GeometryError::IntervalSearchExhausted {
            min: lo.as_f64(),
            max: hi.as_f64(),
            target_count,
        });
    };

    let mut best = (DATE_STEPS[start_index], initial);
    if best.1.len() < target {
        for step in DATE_STEPS[..start_index].iter().rev() {
            if too_dense(step) {
                break;
            }
            let all = boundaries_for(*step, lo, hi)?;
            let candidate = if inside_only {
                clamp_inside(&all, lo, hi)
            } else {
                clamp_outside(&all, lo, hi)
            };
            if candidate.len() > target {
                break;
            }
            if candidate.len() >= 2 {
                let reached = candidate.len() == target;
                best = (*step, candidate);
                if reached {
                    break;
                }
            }
        }
    }

    let (step, boundaries) = best;
    tracing::trace!(
        unit = ?step.unit,
        count = step.count,
        boundaries = boundaries.len(),
        "date intervals"
    );
    Ok(Intervals::new(boundaries, step.count as f64, step.unit.into()))
}

/// [`compute_date_intervals`] over logical coordinates (seconds since the epoch).
pub fn compute_date_intervals_f64(
    min: f64,
    max: f64,
    target_count: usize,
    inside_only: bool,
) -> GeometryResult<Intervals<f64>> {
    if !(min.is_finite() && max.is_finite()) {
        return Err(GeometryError::InvalidConfiguration(format!(
            "date range [{}, {}] is not finite",
            min, max
        )));
    }
    let (min, max) = if min <= max { (min, max) } else { (max, min) };
    let intervals = compute_date_intervals(
        Timestamp::floor(min),
        Timestamp::ceil(max),
        target_count,
        inside_only,
    )?;
    Ok(intervals.map(Timestamp::as_f64))
}

fn check_supported(ts: Timestamp) -> GeometryResult<()> {
    if ts.seconds().abs() > MAX_ABS_SECONDS {
        Err(GeometryError::TimestampOutOfRange(ts.seconds()))
    } else {
        Ok(())
    }
}

/// All boundaries of `step` from the last one `≤ lo` through the first one `≥ hi`.
fn boundaries_for(
    step: DateStep,
    lo: Timestamp,
    hi: Timestamp,
) -> GeometryResult<Vec<Timestamp>> {
    let mut out = Vec::new();
    match step.unit.parent() {
        None => {
            let count = step.count as i32;
            let mut year = lo.to_civil()?.year().div_euclid(count) * count;
            loop {
                let boundary = CivilDateTime::new_year(year)?.to_timestamp();
                out.push(boundary);
                if boundary >= hi {
                    break;
                }
                year += count;
            }
        }
        Some(parent) => {
            let mut period = lo.truncate(parent)?;
            'periods: loop {
                let next = period.add(parent, 1)?;
                for boundary in boundaries_within(step, period, next)? {
                    out.push(boundary);
                    if boundary >= hi {
                        break 'periods;
                    }
                }
                period = next;
            }
        }
    }

    let first = out.iter().rposition(|&b| b <= lo).unwrap_or(0);
    out.drain(..first);
    Ok(out)
}

/// Boundaries of `step` in one period `[start, end)` of the parent unit.
fn boundaries_within(
    step: DateStep,
    start: Timestamp,
    end: Timestamp,
) -> GeometryResult<Vec<Timestamp>> {
    let mut out = vec![start];
    if step.snaps_to_fives() {
        let month_days = start.to_civil()?.days_in_month();
        let mut day = 1 + step.count;
        // Day 1 + k·n moves back to k·n; a 31st would sit next to the 1st and is dropped.
        while day <= month_days && day != 31 {
            out.push(start.add(TimeUnit::Day, (day - 2) as i64)?);
            day += step.count;
        }
        return Ok(out);
    }

    let mut k = 1;
    loop {
        let boundary = start.add(step.unit, k * step.count as i64)?;
        if boundary >= end {
            break;
        }
        out.push(boundary);
        k += 1;
    }
    Ok(out)
}

fn clamp_closed(all: &[Timestamp], lo: Timestamp, hi: Timestamp) -> Vec<Timestamp> {
    all.iter().copied().filter(|&b| b >= lo && b <= hi).collect()
}

fn clamp_inside(all: &[Timestamp], lo: Timestamp, hi: Timestamp) -> Vec<Timestamp> {
    all.iter().copied().filter(|&b| b > lo && b < hi).collect()
}

fn clamp_outside(all: &[Timestamp], lo: Timestamp, hi: Timestamp) -> Vec<Timestamp> {
    let first = all.iter().rposition(|&b| b <= lo).unwrap_or(0);
    let last = all
        .iter()
        .position(|&b| b >= hi)
        .unwrap_or(all.len().saturating_sub(1));
    if all.is_empty() || last < first {
        return Vec::new();
    }
    all[first..=last].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, mo: u32, d: u32, h: u32) -> Timestamp {
        CivilDateTime::new(y, mo, d, h, 0, 0).unwrap().to_timestamp()
    }

    fn days_of(boundaries: &[Timestamp]) -> Vec<u32> {
        boundaries.iter().map(|b| b.to_civil().unwrap().day()).collect()
    }

    #[test]
    fn test_steps_are_ordered_fine_to_coarse() {
        for pair in DATE_STEPS.windows(2) {
            assert!(pair[0].approx_seconds() < pair[1].approx_seconds());
        }
    }

    #[test]
    fn test_day_steps_snap_to_fives() {
        let step = DateStep::new(TimeUnit::Day, 5);
        let feb = boundaries_within(step, ts(2024, 2, 1, 0), ts(2024, 3, 1, 0)).unwrap();
        assert_eq!(days_of(&feb), vec![1, 5, 10, 15, 20, 25]);

        let jan = boundaries_within(step, ts(2024, 1, 1, 0), ts(2024, 2, 1, 0)).unwrap();
        assert_eq!(days_of(&jan), vec![1, 5, 10, 15, 20, 25]);

        let tens = DateStep::new(TimeUnit::Day, 10);
        let tens = boundaries_within(tens, ts(2024, 1, 1, 0), ts(2024, 2, 1, 0)).unwrap();
        assert_eq!(days_of(&tens), vec![1, 10, 20]);
    }

    #[test]
    fn test_two_day_steps_restart_each_month() {
        let step = DateStep::new(TimeUnit::Day, 2);
        let all = boundaries_for(step, ts(2024, 1, 29, 0), ts(2024, 2, 4, 0)).unwrap();
        let civil: Vec<(u32, u32)> = all
            .iter()
            .map(|b| {
                let c = b.to_civil().unwrap();
                (c.month(), c.day())
            })
            .collect();
        assert_eq!(civil, vec![(1, 29), (1, 31), (2, 1), (2, 3), (2, 5)]);
    }

    #[test]
    fn test_hour_steps_restart_each_day() {
        let step = DateStep::new(TimeUnit::Hour, 4);
        let all = boundaries_for(step, ts(2024, 1, 1, 13), ts(2024, 1, 2, 5)).unwrap();
        let hours: Vec<u32> = all.iter().map(|b| b.to_civil().unwrap().hour()).collect();
        assert_eq!(hours, vec![12, 16, 20, 0, 4, 8]);
    }

    #[test]
    fn test_boundaries_bracket_range() {
        let step = DateStep::new(TimeUnit::Month, 3);
        let lo = ts(2023, 11, 15, 0);
        let hi = ts(2024, 5, 2, 0);
        let all = boundaries_for(step, lo, hi).unwrap();
        assert!(all[0] <= lo);
        assert!(*all.last().unwrap() >= hi);
        assert_eq!(all[0], ts(2023, 10, 1, 0));
        assert_eq!(*all.last().unwrap(), ts(2024, 7, 1, 0));
    }

    #[test]
    fn test_one_day_range() {
        let lo = ts(2024, 1, 1, 0);
        let hi = ts(2024, 1, 2, 0);

        let outside = compute_date_intervals(lo, hi, 5, false).unwrap();
        assert_eq!(outside.unit(), StepUnit::Hour);
        assert_eq!(outside.step(), 6.0);
        assert_eq!(outside.len(), 5);
        assert_eq!(outside.first(), Some(&lo));
        assert_eq!(outside.last(), Some(&hi));

        let inside = compute_date_intervals(lo, hi, 5, true).unwrap();
        assert_eq!(inside.unit(), StepUnit::Hour);
        assert_eq!(inside.step(), 4.0);
        let hours: Vec<u32> = inside
            .boundaries()
            .iter()
            .map(|b| b.to_civil().unwrap().hour())
            .collect();
        assert_eq!(hours, vec![4, 8, 12, 16, 20]);
    }

    #[test]
    fn test_collapsed_range_uses_seconds() {
        let at = Timestamp::from_seconds(1_700_000_001);
        let intervals = compute_date_intervals(at, at, 5, false).unwrap();
        assert_eq!(intervals.unit(), StepUnit::Second);
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals.first(), Some(&at));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let far = Timestamp::from_seconds(i64::MAX / 2);
        assert!(compute_date_intervals(Timestamp::EPOCH, far, 5, false).is_err());
        assert!(compute_date_intervals_f64(0.0, f64::NAN, 5, false).is_err());
    }
}
