//! Aggregation over a subset of pitch rows for one named numeric field.
//!
//! Every function takes any iterator of `&PitchRecord` (a whole store slice
//! or a resolved subset) and a field name (`&str` or `MetricField`).
//! Absent, non-numeric and NaN values are skipped, never counted as zero.

use serde::{Deserialize, Serialize};

use crate::models::{MetricField, PitchRecord};

/// Fixed upper bound of the attack-angle gauge, independent of the data.
pub const ATTACK_ANGLE_SCALE_MAX: f64 = 25.0;

/// Lower bound used for `max` when nothing better is known.
const DEFAULT_MAX_FLOOR: f64 = 1.0;

/// Min/max of a field over a subset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

fn values<'a, I, F>(rows: I, field: F) -> impl Iterator<Item = f64> + 'a
where
    I: IntoIterator<Item = &'a PitchRecord>,
    I::IntoIter: 'a,
    F: AsRef<str> + 'a,
{
    rows.into_iter()
        .filter_map(move |r| r.numeric(field.as_ref()))
}

/// Number of rows with a usable value for `field`.
pub fn count_present<'a, I, F>(rows: I, field: F) -> usize
where
    I: IntoIterator<Item = &'a PitchRecord>,
    I::IntoIter: 'a,
    F: AsRef<str> + 'a,
{
    values(rows, field).count()
}

/// Arithmetic mean of the present values, `0.0` when there are none.
pub fn mean<'a, I, F>(rows: I, field: F) -> f64
where
    I: IntoIterator<Item = &'a PitchRecord>,
    I::IntoIter: 'a,
    F: AsRef<str> + 'a,
{
    let (sum, n) = values(rows, field).fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Min and max of the present values.
///
/// With no values the result is `{min: 0, max: max_floor}`. A computed max of
/// exactly zero is also replaced by `max_floor`, so scale bounds derived from
/// it are never zero-width.
pub fn extent<'a, I, F>(rows: I, field: F, max_floor: f64) -> Extent
where
    I: IntoIterator<Item = &'a PitchRecord>,
    I::IntoIter: 'a,
    F: AsRef<str> + 'a,
{
    let found = values(rows, field).fold(None, |acc: Option<(f64, f64)>, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    });

    match found {
        None => Extent {
            min: 0.0,
            max: max_floor,
        },
        Some((min, max)) => Extent {
            min,
            max: if max == 0.0 { max_floor } else { max },
        },
    }
}

/// Gauge upper bound: the max rounded up to the next multiple of `round_to`.
///
/// `attack_angle` always returns [`ATTACK_ANGLE_SCALE_MAX`]. A non-positive
/// `round_to` returns the max unrounded.
pub fn scale_max<'a, I, F>(rows: I, field: F, round_to: f64) -> f64
where
    I: IntoIterator<Item = &'a PitchRecord>,
    I::IntoIter: 'a,
    F: AsRef<str> + 'a,
{
    scale_max_with_floor(rows, field, round_to, DEFAULT_MAX_FLOOR)
}

/// [`scale_max`] with an explicit floor for empty or all-zero subsets.
pub fn scale_max_with_floor<'a, I, F>(rows: I, field: F, round_to: f64, max_floor: f64) -> f64
where
    I: IntoIterator<Item = &'a PitchRecord>,
    I::IntoIter: 'a,
    F: AsRef<str> + 'a,
{
    if field.as_ref() == MetricField::AttackAngle.column() {
        return ATTACK_ANGLE_SCALE_MAX;
    }
    round_up(extent(rows, field, max_floor).max, round_to)
}

/// Bound `b` for signed fields displayed on `[-b, +b]`.
///
/// Uses the largest absolute value; `fallback_if_empty` stands in when there
/// are no values (or all are zero). The result is rounded like [`scale_max`].
pub fn symmetric_scale_max<'a, I, F>(
    rows: I,
    field: F,
    round_to: f64,
    fallback_if_empty: f64,
) -> f64
where
    I: IntoIterator<Item = &'a PitchRecord>,
    I::IntoIter: 'a,
    F: AsRef<str> + 'a,
{
    let max_abs = values(rows, field).map(f64::abs).fold(None, |acc: Option<f64>, v| {
        Some(acc.map_or(v, |m| m.max(v)))
    });
    let bound = match max_abs {
        Some(m) if m != 0.0 => m,
        _ => fallback_if_empty,
    };
    round_up(bound, round_to)
}

fn round_up(value: f64, round_to: f64) -> f64 {
    if round_to > 0.0 && round_to.is_finite() {
        (value / round_to).ceil() * round_to
    } else {
        value
    }
}
