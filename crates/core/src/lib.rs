//! # TrackFuse Core
//!
//! Core types for relating tracking samples to dated raster layers.
//!
//! This crate provides:
//! - `Raster<T>` and `RasterStack<T>`: georeferenced grids and ordered layer stacks
//! - `GeoTransform`: affine transformation for georeferencing
//! - `CRS`: comparable coordinate reference system descriptors
//! - `SampleSet`: ordered sample locations
//! - `SpatialExtractor`: point (and neighborhood) extraction into a value matrix

pub mod crs;
pub mod error;
pub mod raster;
pub mod vector;

pub use crs::CRS;
pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement, RasterStack};
pub use vector::SampleSet;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{
        CellExtractor, Extraction, GeoTransform, Raster, RasterElement, RasterStack, Reducer,
        SpatialExtractor, WeightedMeanSquare,
    };
    pub use crate::vector::SampleSet;
}
