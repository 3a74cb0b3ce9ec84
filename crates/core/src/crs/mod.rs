//! Coordinate Reference System descriptors
//!
//! TrackFuse never reprojects. A CRS is only a comparable label attached to
//! sample sets and raster stacks so that mismatched inputs are rejected
//! before any values are read.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate Reference System representation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CRS {
    /// EPSG code
    Epsg(u32),
    /// PROJ string, compared verbatim
    Proj(String),
    /// WKT definition, compared verbatim
    Wkt(String),
}

impl CRS {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        CRS::Epsg(code)
    }

    /// Create a CRS from a PROJ string
    pub fn from_proj(proj: impl Into<String>) -> Self {
        CRS::Proj(proj.into())
    }

    /// Create a CRS from a WKT string
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        CRS::Wkt(wkt.into())
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// Get EPSG code if this is an EPSG descriptor
    pub fn epsg(&self) -> Option<u32> {
        match self {
            CRS::Epsg(code) => Some(*code),
            _ => None,
        }
    }

    /// Get a string identifier for this CRS
    pub fn identifier(&self) -> String {
        match self {
            CRS::Epsg(code) => format!("EPSG:{}", code),
            CRS::Proj(proj) => proj.clone(),
            CRS::Wkt(wkt) => {
                let head: String = wkt.chars().take(50).collect();
                format!("WKT:{}", head)
            }
        }
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

/// Require two optional descriptors to be identical.
///
/// Two unset descriptors match; a set descriptor never matches an unset one.
pub fn ensure_same_crs(samples: Option<&CRS>, raster: Option<&CRS>) -> Result<()> {
    if samples == raster {
        return Ok(());
    }
    let label = |crs: Option<&CRS>| crs.map_or_else(|| "unset".to_string(), CRS::identifier);
    Err(Error::CrsMismatch(label(samples), label(raster)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crs_epsg() {
        let crs = CRS::from_epsg(4326);
        assert_eq!(crs.epsg(), Some(4326));
        assert_eq!(crs.identifier(), "EPSG:4326");
        assert_eq!(crs, CRS::wgs84());
    }

    #[test]
    fn test_same_crs_passes() {
        let a = CRS::from_proj("+proj=utm +zone=33 +datum=WGS84");
        let b = CRS::from_proj("+proj=utm +zone=33 +datum=WGS84");
        assert!(ensure_same_crs(Some(&a), Some(&b)).is_ok());
        assert!(ensure_same_crs(None, None).is_ok());
    }

    #[test]
    fn test_mismatch_is_exact() {
        let a = CRS::from_proj("+proj=utm +zone=33 +datum=WGS84");
        let b = CRS::from_proj("+proj=utm +zone=33  +datum=WGS84");
        let err = ensure_same_crs(Some(&a), Some(&b)).unwrap_err();
        assert!(matches!(err, Error::CrsMismatch(_, _)));

        let err = ensure_same_crs(Some(&CRS::wgs84()), None).unwrap_err();
        assert_eq!(err.to_string(), "CRS mismatch: samples use EPSG:4326, raster uses unset");
    }
}
