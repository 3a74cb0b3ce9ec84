//! # TrackFuse Algorithms
//!
//! Temporal matching of tracked observations with dated raster layers.
//!
//! ## Available Engines
//!
//! - **query**: nearest-in-time environmental value per sample, optionally windowed
//! - **trend**: directional change of the environment inside each sample's window

mod maybe_rayon;
pub mod temporal;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::temporal::{
        DatedMatrix, Environment, LinearSlope, MeanChange, QueryParams, QueryRecord, TimeWindow,
        TrendParams, TrendRecord, TrendStatistic, data_query, time_dir,
    };
    pub use trackfuse_core::prelude::*;
}
