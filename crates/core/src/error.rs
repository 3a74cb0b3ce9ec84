//! Error types for TrackFuse

use thiserror::Error;

/// Main error type for TrackFuse operations.
///
/// Every variant renders as a single line naming the offending argument,
/// so callers can surface it to users unchanged.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Length mismatch for {name}: expected {expected}, got {actual}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("CRS mismatch: samples use {0}, raster uses {1}")]
    CrsMismatch(String, String),

    #[error("Raster stack has no layers")]
    EmptyStack,

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid coordinate for sample {index}: ({x}, {y})")]
    InvalidCoordinate { index: usize, x: f64, y: f64 },

    #[error("Statistic failed for sample {sample}: {reason}")]
    Statistic { sample: usize, reason: String },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidParameter`].
    pub fn invalid_parameter(
        name: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Fails with [`Error::LengthMismatch`] unless `actual == expected`.
    pub fn ensure_len(name: &'static str, expected: usize, actual: usize) -> Result<()> {
        if expected != actual {
            return Err(Error::LengthMismatch {
                name,
                expected,
                actual,
            });
        }
        Ok(())
    }
}

/// Result type alias for TrackFuse operations
pub type Result<T> = std::result::Result<T, Error>;
