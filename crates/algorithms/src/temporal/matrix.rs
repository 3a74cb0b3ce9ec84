//! Value matrices paired with layer acquisition dates
//!
//! Both engines work on a [`DatedMatrix`]: samples × layers values (`NaN` =
//! missing) plus one date per layer column. It is built either by extracting
//! a raster stack at sample locations or from an already tabular matrix, so
//! the temporal selection itself has a single implementation.

use chrono::NaiveDate;
use ndarray::{Array2, Axis};
use trackfuse_core::crs::ensure_same_crs;
use trackfuse_core::raster::{CellExtractor, Extraction, SpatialExtractor};
use trackfuse_core::{Error, RasterElement, RasterStack, Result, SampleSet};

/// Samples × layers values with one acquisition date per layer.
#[derive(Debug, Clone, PartialEq)]
pub struct DatedMatrix {
    values: Array2<f64>,
    dates: Vec<NaiveDate>,
}

impl DatedMatrix {
    /// Wrap an existing samples × layers table.
    pub fn from_table(values: Array2<f64>, dates: Vec<NaiveDate>) -> Result<Self> {
        Error::ensure_len("layer_dates", values.ncols(), dates.len())?;
        Ok(Self { values, dates })
    }

    /// Extract `layers` of `stack` at every sample location.
    ///
    /// `dates` holds one date per stack layer; the matrix keeps the dates of
    /// the selected layers, in `layers` order.
    pub fn from_stack<T, E>(
        samples: &SampleSet,
        stack: &RasterStack<T>,
        dates: &[NaiveDate],
        layers: &[usize],
        extractor: &E,
    ) -> Result<Self>
    where
        T: RasterElement,
        E: SpatialExtractor<T> + ?Sized,
    {
        ensure_same_crs(samples.crs(), stack.crs())?;
        Error::ensure_len("layer_dates", stack.len(), dates.len())?;
        if let Some(&bad) = layers.iter().find(|&&l| l >= stack.len()) {
            return Err(Error::invalid_parameter(
                "layers",
                bad,
                format!("stack has {} layers", stack.len()),
            ));
        }

        let values = extractor.extract(samples.points(), stack, layers)?;
        Error::ensure_len("extracted rows", samples.len(), values.nrows())?;
        Error::ensure_len("extracted columns", layers.len(), values.ncols())?;

        let dates = layers.iter().map(|&l| dates[l]).collect();
        Ok(Self { values, dates })
    }

    pub fn n_samples(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_layers(&self) -> usize {
        self.values.ncols()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// `(layer date, value)` pairs of one sample, in layer order
    pub fn row(&self, sample: usize) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates
            .iter()
            .copied()
            .zip(self.values.row(sample).into_iter().copied())
    }
}

/// Where environmental values come from.
#[derive(Debug, Clone)]
pub enum Environment<'a, T: RasterElement = f64> {
    /// Dated raster layers sampled at the sample locations
    Stack {
        samples: &'a SampleSet,
        stack: &'a RasterStack<T>,
        extraction: Extraction,
    },
    /// Precomputed samples × layers values (`NaN` = missing)
    Table(&'a Array2<f64>),
}

impl<'a, T: RasterElement> Environment<'a, T> {
    /// Sample stack with single-cell lookups
    pub fn stack(samples: &'a SampleSet, stack: &'a RasterStack<T>) -> Self {
        Environment::Stack {
            samples,
            stack,
            extraction: Extraction::default(),
        }
    }

    pub fn sample_count(&self) -> usize {
        match self {
            Environment::Stack { samples, .. } => samples.len(),
            Environment::Table(values) => values.nrows(),
        }
    }

    pub fn layer_count(&self) -> usize {
        match self {
            Environment::Stack { stack, .. } => stack.len(),
            Environment::Table(values) => values.ncols(),
        }
    }

    /// Checks shared by both engines, run before any value is read.
    pub(crate) fn validate(&self, obs_dates: &[NaiveDate], layer_dates: &[NaiveDate]) -> Result<()> {
        if let Environment::Stack {
            samples,
            stack,
            extraction,
        } = self
        {
            ensure_same_crs(samples.crs(), stack.crs())?;
            extraction.validate()?;
        }
        Error::ensure_len("obs_dates", self.sample_count(), obs_dates.len())?;
        Error::ensure_len("layer_dates", self.layer_count(), layer_dates.len())?;
        Ok(())
    }

    /// Build the dated matrix for the given layer subset.
    pub(crate) fn resolve(&self, layer_dates: &[NaiveDate], layers: &[usize]) -> Result<DatedMatrix> {
        match self {
            Environment::Stack {
                samples,
                stack,
                extraction,
            } => {
                let extractor = CellExtractor::new(extraction)?;
                DatedMatrix::from_stack(samples, stack, layer_dates, layers, &extractor)
            }
            Environment::Table(values) => {
                let subset = values.select(Axis(1), layers);
                let dates = layers.iter().map(|&l| layer_dates[l]).collect();
                DatedMatrix::from_table(subset, dates)
            }
        }
    }
}
