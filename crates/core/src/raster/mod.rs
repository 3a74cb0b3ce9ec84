//! Raster data structures and point extraction

mod element;
mod extract;
mod geotransform;
mod grid;
mod neighborhood;
mod stack;

pub use element::RasterElement;
pub use extract::{CellExtractor, Extraction, Reducer, SpatialExtractor, WeightedMeanSquare};
pub use geotransform::GeoTransform;
pub use grid::Raster;
pub use neighborhood::Neighborhood;
pub use stack::RasterStack;
