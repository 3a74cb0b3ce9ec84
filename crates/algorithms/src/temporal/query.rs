//! Temporal query: nearest-in-time environmental value per sample
//!
//! For every sample, picks the non-missing layer value whose acquisition date
//! is closest to the sample's observation date, optionally restricted to a
//! time window. Samples with nothing eligible get an empty record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use trackfuse_core::{Error, RasterElement, Result};

use super::matrix::{DatedMatrix, Environment};
use super::window::{Nearest, TimeWindow, nearest};
use crate::maybe_rayon::map_rows;

/// Parameters for the temporal query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryParams {
    /// Hard filter on eligible layers. `None` admits every date.
    pub window: Option<TimeWindow>,
}

/// Result row for one sample.
///
/// All fields are `None` when the sample has no eligible value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub value: Option<f64>,
    pub date: Option<NaiveDate>,
    /// Index of the source layer in the input stack or table
    pub layer: Option<usize>,
    /// Source date minus observation date, in days
    pub offset_days: Option<i64>,
}

impl QueryRecord {
    pub fn is_missing(&self) -> bool {
        self.value.is_none()
    }
}

impl From<Option<Nearest>> for QueryRecord {
    fn from(hit: Option<Nearest>) -> Self {
        match hit {
            Some(n) => Self {
                value: Some(n.value),
                date: Some(n.date),
                layer: Some(n.layer),
                offset_days: Some(n.offset_days),
            },
            None => Self::default(),
        }
    }
}

/// Match every sample to its temporally nearest environmental value.
///
/// # Arguments
/// * `obs_dates` - Observation date per sample, in sample order
/// * `env` - Raster stack (sampled at the sample locations) or value table
/// * `layer_dates` - Acquisition date per layer / table column
/// * `params` - Optional time window
///
/// # Returns
/// One record per sample, in sample order. Any invalid input fails the whole
/// call before values are read.
pub fn data_query<T: RasterElement>(
    obs_dates: &[NaiveDate],
    env: &Environment<'_, T>,
    layer_dates: &[NaiveDate],
    params: &QueryParams,
) -> Result<Vec<QueryRecord>> {
    env.validate(obs_dates, layer_dates)?;
    if let Some(w) = &params.window {
        w.validate()?;
    }

    debug!(
        samples = obs_dates.len(),
        layers = layer_dates.len(),
        window = ?params.window,
        "temporal query"
    );

    let all_layers: Vec<usize> = (0..layer_dates.len()).collect();
    let matrix = env.resolve(layer_dates, &all_layers)?;
    query_matrix(obs_dates, &matrix, params.window.as_ref())
}

/// [`data_query`] over an already built [`DatedMatrix`].
///
/// Layer indices in the records refer to the matrix columns.
pub fn query_matrix(
    obs_dates: &[NaiveDate],
    matrix: &DatedMatrix,
    window: Option<&TimeWindow>,
) -> Result<Vec<QueryRecord>> {
    Error::ensure_len("obs_dates", matrix.n_samples(), obs_dates.len())?;
    if let Some(w) = window {
        w.validate()?;
    }

    let records = map_rows(matrix.n_samples(), |i| {
        Ok(QueryRecord::from(nearest(obs_dates[i], matrix.row(i), window)))
    })?;

    debug!(
        resolved = records.iter().filter(|r| !r.is_missing()).count(),
        samples = records.len(),
        "temporal query done"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use trackfuse_core::{CRS, GeoTransform, Raster, RasterStack, SampleSet};

    fn day(n: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 3, 1).unwrap() + chrono::Days::new(n)
    }

    /// Layers on days {1, 4, 9, 20} with values {10, missing, 30, 40}, shared by three samples.
    fn worked_example() -> (Array2<f64>, Vec<NaiveDate>) {
        let row = [10.0, f64::NAN, 30.0, 40.0];
        let values = Array2::from_shape_fn((3, 4), |(_, j)| row[j]);
        (values, vec![day(1), day(4), day(9), day(20)])
    }

    #[test]
    fn test_worked_example_with_window() {
        let (values, layer_dates) = worked_example();
        let obs = [day(1), day(5), day(10)];
        let params = QueryParams { window: Some(TimeWindow::symmetric(2.0)) };

        let out = data_query(&obs, &Environment::<f64>::Table(&values), &layer_dates, &params).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].value, Some(10.0));
        assert_eq!(out[0].date, Some(day(1)));
        assert_eq!(out[0].offset_days, Some(0));
        assert!(out[1].is_missing());
        assert_eq!(out[1].date, None);
        assert_eq!((out[2].value, out[2].date), (Some(30.0), Some(day(9))));
    }

    #[test]
    fn test_worked_example_without_window() {
        let (values, layer_dates) = worked_example();
        let obs = [day(1), day(5), day(10)];

        let out = data_query(
            &obs,
            &Environment::<f64>::Table(&values),
            &layer_dates,
            &QueryParams::default(),
        )
        .unwrap();
        assert_eq!(out[2].value, Some(30.0));
        assert_eq!(out[2].layer, Some(2));
        // day 5: day 4 is missing, day 1 (4 days) beats day 9 (4 days) on layer order
        assert_eq!((out[1].value, out[1].date), (Some(10.0), Some(day(1))));
    }

    #[test]
    fn test_length_mismatch() {
        let (values, layer_dates) = worked_example();
        let env = Environment::<f64>::Table(&values);
        let p = QueryParams::default();

        let err = data_query(&[day(1)], &env, &layer_dates, &p).unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { name: "obs_dates", .. }));

        let err = data_query(&[day(1); 3], &env, &layer_dates[..3], &p).unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { name: "layer_dates", .. }));
    }

    #[test]
    fn test_bad_window() {
        let (values, layer_dates) = worked_example();
        let p = QueryParams { window: Some(TimeWindow::new(-1.0, 1.0)) };
        let err = data_query(&[day(1); 3], &Environment::<f64>::Table(&values), &layer_dates, &p)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "window.before", .. }));
    }

    #[test]
    fn test_stack_source() {
        let transform = GeoTransform::new(0.0, 2.0, 1.0, -1.0);
        let layers = [[1.0, 2.0, 3.0, 4.0], [5.0, f64::NAN, 7.0, 8.0]]
            .into_iter()
            .map(|data| {
                Raster::from_vec(data.to_vec(), 2, 2)
                    .unwrap()
                    .with_transform(transform)
                    .with_crs(CRS::wgs84())
            })
            .collect();
        let stack = RasterStack::new(layers).unwrap();
        let samples = SampleSet::from_xy([(0.5, 1.5), (1.5, 1.5), (5.0, 5.0)]).with_crs(CRS::wgs84());

        let out = data_query(
            &[day(9), day(9), day(9)],
            &Environment::stack(&samples, &stack),
            &[day(0), day(10)],
            &QueryParams::default(),
        )
        .unwrap();

        assert_eq!(out[0].value, Some(5.0));
        // second layer is missing at (0, 1): fall back to the first layer
        assert_eq!((out[1].value, out[1].layer), (Some(2.0), Some(0)));
        assert!(out[2].is_missing());
    }

    #[test]
    fn test_stack_crs_mismatch_aborts() {
        let stack = RasterStack::new(vec![Raster::filled(2, 2, 1.0).with_crs(CRS::from_epsg(3035))])
            .unwrap();
        let samples = SampleSet::from_xy([(0.5, -0.5)]).with_crs(CRS::wgs84());
        let err = data_query(
            &[day(0)],
            &Environment::stack(&samples, &stack),
            &[day(0)],
            &QueryParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::CrsMismatch(_, _)));
    }

    #[test]
    fn test_idempotent() {
        let (values, layer_dates) = worked_example();
        let obs = [day(3), day(12), day(30)];
        let env = Environment::<f64>::Table(&values);
        let p = QueryParams { window: Some(TimeWindow::new(10.0, 3.0)) };

        let a = data_query(&obs, &env, &layer_dates, &p).unwrap();
        let b = data_query(&obs, &env, &layer_dates, &p).unwrap();
        assert_eq!(a, b);
    }
}
