//! Ordered stacks of co-registered raster layers

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};

/// An ordered sequence of rasters sharing one grid.
///
/// Layer order is significant: layer `i` pairs with the `i`-th acquisition
/// date handed to the temporal engines. All layers share shape, geotransform
/// and CRS, which is checked once at construction. No-data values stay per
/// layer.
#[derive(Debug, Clone)]
pub struct RasterStack<T: RasterElement = f64> {
    layers: Vec<Raster<T>>,
}

impl<T: RasterElement> RasterStack<T> {
    /// Build a stack, rejecting empty input and layers that do not share the
    /// first layer's grid.
    pub fn new(layers: Vec<Raster<T>>) -> Result<Self> {
        let first = layers.first().ok_or(Error::EmptyStack)?;
        let (rows, cols) = first.shape();

        for (i, layer) in layers.iter().enumerate().skip(1) {
            if layer.shape() != (rows, cols) {
                return Err(Error::SizeMismatch {
                    er: rows,
                    ec: cols,
                    ar: layer.rows(),
                    ac: layer.cols(),
                });
            }
            if layer.transform() != first.transform() {
                return Err(Error::Other(format!(
                    "layer {} geotransform differs from layer 0",
                    i
                )));
            }
            if layer.crs() != first.crs() {
                let label = |crs: Option<&CRS>| crs.map_or("unset".to_string(), CRS::identifier);
                return Err(Error::CrsMismatch(label(first.crs()), label(layer.crs())));
            }
        }

        Ok(Self { layers })
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Always false; construction rejects empty stacks
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layer at `index`
    pub fn layer(&self, index: usize) -> Option<&Raster<T>> {
        self.layers.get(index)
    }

    /// All layers in order
    pub fn layers(&self) -> &[Raster<T>] {
        &self.layers
    }

    /// Shared grid dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.layers[0].shape()
    }

    /// Shared geotransform
    pub fn transform(&self) -> &GeoTransform {
        self.layers[0].transform()
    }

    /// Shared CRS
    pub fn crs(&self) -> Option<&CRS> {
        self.layers[0].crs()
    }
}
