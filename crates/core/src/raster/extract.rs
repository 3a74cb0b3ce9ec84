//! Point extraction from raster stacks
//!
//! Turns a set of sample locations and a [`RasterStack`] into a
//! samples × layers matrix. Missing values (outside the grid, no-data,
//! or an empty smoothing neighborhood) are encoded as `NaN`.

use std::fmt;
use std::sync::Arc;

use geo_types::Point;
use ndarray::Array2;
use tracing::debug;

use crate::error::{Error, Result};
use crate::raster::{Neighborhood, RasterElement, RasterStack};

/// Reduces the valid values of a neighborhood to a single scalar.
///
/// Input never contains missing values. Returning a non-finite value marks
/// the cell as missing.
pub trait Reducer: Send + Sync {
    fn reduce(&self, values: &[f64]) -> f64;
}

impl<F> Reducer for F
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn reduce(&self, values: &[f64]) -> f64 {
        self(values)
    }
}

impl fmt::Debug for dyn Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Reducer")
    }
}

/// `sum(x²) / sum(x)`: a mean weighted by the values themselves, which pulls
/// the result towards the higher values of the neighborhood.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedMeanSquare;

impl Reducer for WeightedMeanSquare {
    fn reduce(&self, values: &[f64]) -> f64 {
        let (sum_sq, sum) = values
            .iter()
            .fold((0.0, 0.0), |(sq, s), &v| (sq + v * v, s + v));
        sum_sq / sum
    }
}

/// Source of a samples × layers value matrix.
///
/// `layers` selects and orders the stack layers that become matrix columns.
pub trait SpatialExtractor<T: RasterElement = f64> {
    fn extract(
        &self,
        points: &[Point<f64>],
        stack: &RasterStack<T>,
        layers: &[usize],
    ) -> Result<Array2<f64>>;
}

/// Extraction settings
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Smoothing radius in map units. `None` samples the single cell under
    /// each point.
    pub radius: Option<f64>,
    /// Neighborhood reducer, [`WeightedMeanSquare`] when unset. Ignored
    /// without a radius.
    pub reducer: Option<Arc<dyn Reducer>>,
}

impl Extraction {
    /// Smooth over all cells whose centers lie within `radius` map units
    pub fn buffered(radius: f64) -> Self {
        Self {
            radius: Some(radius),
            reducer: None,
        }
    }

    /// Replace the neighborhood reducer
    pub fn with_reducer(mut self, reducer: impl Reducer + 'static) -> Self {
        self.reducer = Some(Arc::new(reducer));
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(r) = self.radius
            && !(r.is_finite() && r > 0.0)
        {
            return Err(Error::invalid_parameter(
                "extraction.radius",
                r,
                "must be finite and positive",
            ));
        }
        Ok(())
    }
}

/// Default [`SpatialExtractor`]: single-cell lookup, or a reduced circular
/// neighborhood when a radius is configured.
#[derive(Debug, Clone)]
pub struct CellExtractor {
    smoothing: Option<(f64, Arc<dyn Reducer>)>,
}

impl CellExtractor {
    pub fn new(extraction: &Extraction) -> Result<Self> {
        extraction.validate()?;
        let smoothing = extraction.radius.map(|radius| {
            let reducer = extraction
                .reducer
                .clone()
                .unwrap_or_else(|| Arc::new(WeightedMeanSquare));
            (radius, reducer)
        });
        Ok(Self { smoothing })
    }

    /// Grid cells that contribute to the value at `point`.
    ///
    /// The cell containing the point always contributes; with a radius, so
    /// does every cell whose center is within the radius.
    fn cells_for<T: RasterElement>(
        &self,
        point: &Point<f64>,
        stack: &RasterStack<T>,
    ) -> Vec<(usize, usize)> {
        let (rows, cols) = stack.shape();
        let transform = stack.transform();
        let home = transform.cell_at(point.x(), point.y(), rows, cols);

        let Some((radius, _)) = &self.smoothing else {
            return home.into_iter().collect();
        };

        let (fc, fr) = transform.geo_to_pixel(point.x(), point.y());
        if !fc.is_finite() || !fr.is_finite() {
            return Vec::new();
        }
        let (center_row, center_col) = (fr.floor() as isize, fc.floor() as isize);
        let radius_sq = radius * radius;

        Neighborhood::covering(*radius, transform.cell_size())
            .cells_around(center_row, center_col, rows, cols)
            .filter(|&cell| {
                let (cx, cy) = transform.pixel_to_geo(cell.1, cell.0);
                let (dx, dy) = (cx - point.x(), cy - point.y());
                dx * dx + dy * dy <= radius_sq || Some(cell) == home
            })
            .collect()
    }
}

impl<T: RasterElement> SpatialExtractor<T> for CellExtractor {
    fn extract(
        &self,
        points: &[Point<f64>],
        stack: &RasterStack<T>,
        layers: &[usize],
    ) -> Result<Array2<f64>> {
        if let Some(&bad) = layers.iter().find(|&&l| l >= stack.len()) {
            return Err(Error::invalid_parameter(
                "layers",
                bad,
                format!("stack has {} layers", stack.len()),
            ));
        }

        let mut out = Array2::from_elem((points.len(), layers.len()), f64::NAN);
        let mut values = Vec::new();

        for (i, point) in points.iter().enumerate() {
            if !point.x().is_finite() || !point.y().is_finite() {
                return Err(Error::InvalidCoordinate {
                    index: i,
                    x: point.x(),
                    y: point.y(),
                });
            }

            let cells = self.cells_for(point, stack);
            if cells.is_empty() {
                continue;
            }

            for (j, &l) in layers.iter().enumerate() {
                let layer = &stack.layers()[l];
                values.clear();
                values.extend(cells.iter().filter_map(|&(r, c)| layer.sample(r, c)));

                let v = match (&self.smoothing, values.as_slice()) {
                    (_, []) => continue,
                    (None, [v, ..]) => *v,
                    (Some((_, reducer)), vals) => reducer.reduce(vals),
                };
                if v.is_finite() {
                    out[(i, j)] = v;
                }
            }
        }

        debug!(
            samples = points.len(),
            layers = layers.len(),
            smoothed = self.smoothing.is_some(),
            "extracted value matrix"
        );
        Ok(out)
    }
}
