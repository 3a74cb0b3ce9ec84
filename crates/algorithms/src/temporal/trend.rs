//! Directional trend: a statistic over each sample's windowed time series
//!
//! For every sample, collects the non-missing layer values dated inside the
//! sample's window and reduces the `(time, value)` series with a statistic,
//! by default the least-squares slope of value on time (units per day).

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use trackfuse_core::{Error, RasterElement, Result};

use super::matrix::{DatedMatrix, Environment};
use super::window::{TimeWindow, day_number, eligible};
use crate::maybe_rayon::map_rows;

/// Reduces a `(times, values)` series to one scalar.
///
/// `times` are days since 1970-01-01, paired index-wise with `values`; both
/// have the same length, at least the configured minimum count. An `Err`
/// aborts the whole run. A non-finite `Ok` is recorded as undefined.
pub trait TrendStatistic: Send + Sync {
    fn evaluate(&self, times: &[f64], values: &[f64]) -> Result<f64>;
}

impl<F> TrendStatistic for F
where
    F: Fn(&[f64], &[f64]) -> Result<f64> + Send + Sync,
{
    fn evaluate(&self, times: &[f64], values: &[f64]) -> Result<f64> {
        self(times, values)
    }
}

impl fmt::Debug for dyn TrendStatistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TrendStatistic")
    }
}

/// Ordinary least-squares slope of value on time.
///
/// Undefined (`NaN`) when all times coincide.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearSlope;

impl TrendStatistic for LinearSlope {
    fn evaluate(&self, times: &[f64], values: &[f64]) -> Result<f64> {
        let n = times.len() as f64;
        let mean_t = times.iter().sum::<f64>() / n;
        let mean_v = values.iter().sum::<f64>() / n;

        let (mut sxy, mut sxx) = (0.0, 0.0);
        for (&t, &v) in times.iter().zip(values) {
            let dt = t - mean_t;
            sxy += dt * (v - mean_v);
            sxx += dt * dt;
        }

        Ok(if sxx > 0.0 { sxy / sxx } else { f64::NAN })
    }
}

/// Change between the earliest and latest value, per elapsed day.
///
/// Ties on time keep the first value in layer order.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanChange;

impl TrendStatistic for MeanChange {
    fn evaluate(&self, times: &[f64], values: &[f64]) -> Result<f64> {
        if times.is_empty() {
            return Ok(f64::NAN);
        }
        let mut first = 0;
        let mut last = 0;
        for (i, &t) in times.iter().enumerate() {
            if t < times[first] {
                first = i;
            }
            if t > times[last] {
                last = i;
            }
        }

        let elapsed = times[last] - times[first];
        Ok(if elapsed > 0.0 {
            (values[last] - values[first]) / elapsed
        } else {
            f64::NAN
        })
    }
}

/// Parameters for the trend engine
#[derive(Debug, Clone)]
pub struct TrendParams {
    /// Days around each observation whose layers enter the series
    pub window: TimeWindow,
    /// Series reducer
    pub statistic: Arc<dyn TrendStatistic>,
    /// Fewest eligible values for a defined result
    pub min_count: usize,
}

impl TrendParams {
    /// Least-squares slope over `window`, defined from two values on
    pub fn new(window: TimeWindow) -> Self {
        Self {
            window,
            statistic: Arc::new(LinearSlope),
            min_count: 2,
        }
    }

    pub fn with_statistic(mut self, statistic: impl TrendStatistic + 'static) -> Self {
        self.statistic = Arc::new(statistic);
        self
    }

    pub fn with_min_count(mut self, min_count: usize) -> Self {
        self.min_count = min_count;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.window.validate()?;
        if self.min_count == 0 {
            return Err(Error::invalid_parameter("min_count", 0, "must be at least 1"));
        }
        Ok(())
    }
}

/// Result row for one sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendRecord {
    /// Statistic result; `None` below the minimum count or when undefined
    pub value: Option<f64>,
    /// Eligible values found in the sample's window
    pub count: usize,
}

/// Estimate a temporal trend of the environment around every sample.
///
/// Only layers inside the union of all sample windows are read; each sample
/// then uses the layers of its own window.
///
/// # Arguments
/// * `obs_dates` - Observation date per sample, in sample order
/// * `env` - Raster stack (sampled at the sample locations) or value table
/// * `layer_dates` - Acquisition date per layer / table column
/// * `params` - Window, statistic and minimum count
///
/// # Returns
/// One record per sample, in sample order.
pub fn time_dir<T: RasterElement>(
    obs_dates: &[NaiveDate],
    env: &Environment<'_, T>,
    layer_dates: &[NaiveDate],
    params: &TrendParams,
) -> Result<Vec<TrendRecord>> {
    env.validate(obs_dates, layer_dates)?;
    params.validate()?;

    let layers: Vec<usize> = match params.window.span(obs_dates) {
        Some((lo, hi)) => layer_dates
            .iter()
            .enumerate()
            .filter(|(_, d)| (lo..=hi).contains(&(day_number(**d) as f64)))
            .map(|(i, _)| i)
            .collect(),
        None => Vec::new(),
    };

    debug!(
        samples = obs_dates.len(),
        layers = layer_dates.len(),
        in_span = layers.len(),
        window = ?params.window,
        min_count = params.min_count,
        "trend estimation"
    );

    let matrix = env.resolve(layer_dates, &layers)?;
    trend_matrix(obs_dates, &matrix, params)
}

/// [`time_dir`] over an already built [`DatedMatrix`].
pub fn trend_matrix(
    obs_dates: &[NaiveDate],
    matrix: &DatedMatrix,
    params: &TrendParams,
) -> Result<Vec<TrendRecord>> {
    Error::ensure_len("obs_dates", matrix.n_samples(), obs_dates.len())?;
    params.validate()?;

    let records = map_rows(matrix.n_samples(), |i| {
        let (times, values): (Vec<f64>, Vec<f64>) =
            eligible(obs_dates[i], matrix.row(i), Some(&params.window))
                .map(|(_, date, value)| (day_number(date) as f64, value))
                .unzip();

        let count = values.len();
        if count < params.min_count {
            trace!(sample = i, count, "too few values for a trend");
            return Ok(TrendRecord { value: None, count });
        }

        let v = params
            .statistic
            .evaluate(&times, &values)
            .map_err(|e| Error::Statistic {
                sample: i,
                reason: e.to_string(),
            })?;

        Ok(TrendRecord {
            value: v.is_finite().then_some(v),
            count,
        })
    })?;

    debug!(
        defined = records.iter().filter(|r| r.value.is_some()).count(),
        samples = records.len(),
        "trend estimation done"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array2, array};

    fn day(n: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 4, 1).unwrap() + chrono::Days::new(n)
    }

    fn run(
        obs: &[NaiveDate],
        values: &Array2<f64>,
        layer_dates: &[NaiveDate],
        params: &TrendParams,
    ) -> Result<Vec<TrendRecord>> {
        time_dir(obs, &Environment::<f64>::Table(values), layer_dates, params)
    }

    #[test]
    fn test_linear_slope() {
        let s = LinearSlope.evaluate(&[0.0, 1.0, 2.0, 3.0], &[1.0, 3.0, 5.0, 7.0]).unwrap();
        assert_relative_eq!(s, 2.0);

        let s = LinearSlope.evaluate(&[10.0, 12.0], &[4.0, 3.0]).unwrap();
        assert_relative_eq!(s, -0.5);

        assert!(LinearSlope.evaluate(&[5.0, 5.0], &[1.0, 2.0]).unwrap().is_nan());
    }

    #[test]
    fn test_mean_change() {
        let s = MeanChange.evaluate(&[20.0, 0.0, 10.0], &[9.0, 1.0, 100.0]).unwrap();
        assert_relative_eq!(s, 0.4);
    }

    #[test]
    fn test_increasing_series() {
        let layer_dates = [day(0), day(8), day(16), day(24), day(32)];
        let values = array![[0.1, 0.2, 0.3, 0.4, 0.5], [0.5, 0.4, f64::NAN, 0.2, 0.1]];
        let params = TrendParams::new(TimeWindow::new(16.0, 16.0));

        let out = run(&[day(16), day(16)], &values, &layer_dates, &params).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].count, 5);
        assert_relative_eq!(out[0].value.unwrap(), 0.1 / 8.0, epsilon = 1e-12);
        assert_eq!(out[1].count, 4);
        assert_relative_eq!(out[1].value.unwrap(), -0.1 / 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_min_count_boundary() {
        let layer_dates = [day(0), day(10), day(20)];
        let values = array![[1.0, 2.0, f64::NAN], [1.0, f64::NAN, f64::NAN]];
        let params = TrendParams::new(TimeWindow::new(30.0, 30.0)).with_min_count(2);

        let out = run(&[day(10), day(10)], &values, &layer_dates, &params).unwrap();
        assert_eq!(out[0], TrendRecord { value: Some(0.1), count: 2 });
        assert_eq!(out[1], TrendRecord { value: None, count: 1 });
    }

    #[test]
    fn test_window_limits_series() {
        // day 30 is outside [5, 15] for the first sample but inside for the second
        let layer_dates = [day(5), day(15), day(30)];
        let values = array![[0.0, 1.0, 100.0], [0.0, 1.0, 100.0]];
        let params = TrendParams::new(TimeWindow::new(5.0, 5.0));

        let out = run(&[day(10), day(25)], &values, &layer_dates, &params).unwrap();
        assert_eq!(out[0].count, 2);
        assert_relative_eq!(out[0].value.unwrap(), 0.1);
        assert_eq!(out[1].count, 1);
        assert_eq!(out[1].value, None);
    }

    #[test]
    fn test_custom_statistic_sees_day_numbers() {
        let layer_dates = [NaiveDate::from_ymd_opt(1970, 1, 2).unwrap()];
        let values = array![[7.0]];
        let first_time = |t: &[f64], _: &[f64]| -> Result<f64> { Ok(t[0]) };
        let params = TrendParams::new(TimeWindow::new(1.0, 1.0))
            .with_statistic(first_time)
            .with_min_count(1);

        let out = run(&layer_dates, &values, &layer_dates, &params).unwrap();
        assert_eq!(out[0].value, Some(1.0));
    }

    #[test]
    fn test_statistic_error_is_fatal() {
        let layer_dates = [day(0), day(1)];
        let values = array![[1.0, 2.0], [3.0, 4.0]];
        let failing = |_: &[f64], v: &[f64]| -> Result<f64> {
            if v[0] > 2.0 {
                Err(Error::Other("series rejected".into()))
            } else {
                Ok(0.0)
            }
        };
        let params = TrendParams::new(TimeWindow::new(5.0, 5.0)).with_statistic(failing);

        let err = run(&[day(0), day(0)], &values, &layer_dates, &params).unwrap_err();
        assert!(matches!(err, Error::Statistic { sample: 1, .. }));
    }

    #[test]
    fn test_invalid_params() {
        let layer_dates = [day(0)];
        let values = array![[1.0]];
        let zero = TrendParams::new(TimeWindow::new(1.0, 1.0)).with_min_count(0);
        assert!(run(&[day(0)], &values, &layer_dates, &zero).is_err());

        let bad_window = TrendParams::new(TimeWindow::new(1.0, -2.0));
        assert!(run(&[day(0)], &values, &layer_dates, &bad_window).is_err());
    }

    #[test]
    fn test_empty_samples() {
        let values = Array2::<f64>::zeros((0, 2));
        let params = TrendParams::new(TimeWindow::new(1.0, 1.0));
        let out = run(&[], &values, &[day(0), day(1)], &params).unwrap();
        assert!(out.is_empty());
    }
}
