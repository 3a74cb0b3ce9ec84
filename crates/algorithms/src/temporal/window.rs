//! Temporal windows and nearest-in-time selection
//!
//! Dates are compared as whole days. A window `(before, after)` around an
//! observation on day `t` admits layers dated within `[t - before, t + after]`,
//! both ends inclusive.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use trackfuse_core::{Error, Result};

/// `num_days_from_ce()` of 1970-01-01
const UNIX_EPOCH_FROM_CE: i64 = 719_163;

/// Days since 1970-01-01 (negative before it).
pub fn day_number(date: NaiveDate) -> i64 {
    date.num_days_from_ce() as i64 - UNIX_EPOCH_FROM_CE
}

/// Signed day offset of `layer` relative to `obs` (positive = after).
pub fn offset_days(obs: NaiveDate, layer: NaiveDate) -> i64 {
    (layer - obs).num_days()
}

/// Inclusive day bounds around an observation date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Days before the observation that are still eligible
    pub before: f64,
    /// Days after the observation that are still eligible
    pub after: f64,
}

impl TimeWindow {
    pub fn new(before: f64, after: f64) -> Self {
        Self { before, after }
    }

    /// Same extent on both sides
    pub fn symmetric(days: f64) -> Self {
        Self::new(days, days)
    }

    /// Both bounds must be finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [("window.before", self.before), ("window.after", self.after)] {
            if !v.is_finite() || v < 0.0 {
                return Err(Error::invalid_parameter(
                    name,
                    v,
                    "must be finite and non-negative",
                ));
            }
        }
        Ok(())
    }

    /// Whether a layer `offset` days from the observation is inside the window
    pub fn contains(&self, offset: i64) -> bool {
        let d = offset as f64;
        d >= -self.before && d <= self.after
    }

    /// Window around `obs` as inclusive day numbers
    pub fn bounds(&self, obs: NaiveDate) -> (f64, f64) {
        let t = day_number(obs) as f64;
        (t - self.before, t + self.after)
    }

    /// Union of the windows of all `obs` as inclusive day numbers.
    ///
    /// `None` when there are no observations.
    pub fn span(&self, obs: &[NaiveDate]) -> Option<(f64, f64)> {
        let first = *obs.iter().min()?;
        let last = *obs.iter().max()?;
        Some((self.bounds(first).0, self.bounds(last).1))
    }
}

/// The layer picked for one observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Nearest {
    /// Position of the layer among the candidates
    pub layer: usize,
    pub date: NaiveDate,
    pub value: f64,
    /// Layer date minus observation date, in days
    pub offset_days: i64,
}

/// Candidates that are non-missing and, if a window is given, inside it.
///
/// Yields `(candidate index, date, value)` in candidate order. `NaN` values
/// are missing.
pub fn eligible<I>(
    obs: NaiveDate,
    candidates: I,
    window: Option<&TimeWindow>,
) -> impl Iterator<Item = (usize, NaiveDate, f64)>
where
    I: IntoIterator<Item = (NaiveDate, f64)>,
{
    candidates
        .into_iter()
        .enumerate()
        .filter(move |(_, (date, value))| {
            !value.is_nan() && window.is_none_or(|w| w.contains(offset_days(obs, *date)))
        })
        .map(|(i, (date, value))| (i, date, value))
}

/// Eligible candidate closest in time to `obs`.
///
/// Equal distances resolve to the earliest candidate in order, regardless of
/// value or of which side of `obs` it lies. `None` when nothing is eligible.
pub fn nearest<I>(obs: NaiveDate, candidates: I, window: Option<&TimeWindow>) -> Option<Nearest>
where
    I: IntoIterator<Item = (NaiveDate, f64)>,
{
    eligible(obs, candidates, window)
        .map(|(layer, date, value)| Nearest {
            layer,
            date,
            value,
            offset_days: offset_days(obs, date),
        })
        .min_by_key(|n| n.offset_days.unsigned_abs())
}
