//! Temporal matching of samples against dated environmental layers
//!
//! Two engines share one selection core:
//! - Query: nearest-in-time non-missing value per sample
//! - Trend: a statistic over the windowed time series per sample
//!
//! The environment is either a raster stack sampled at the sample locations
//! or a precomputed samples × layers table; both resolve to a [`DatedMatrix`].

pub mod matrix;
pub mod query;
pub mod trend;
pub mod window;

pub use matrix::{DatedMatrix, Environment};
pub use query::{QueryParams, QueryRecord, data_query, query_matrix};
pub use trend::{
    LinearSlope, MeanChange, TrendParams, TrendRecord, TrendStatistic, time_dir, trend_matrix,
};
pub use window::{Nearest, TimeWindow, day_number, eligible, nearest, offset_days};
