//! Point samples (tracking fixes) with an optional CRS

use crate::crs::CRS;
use geo_types::{Coord, Point};

/// An ordered collection of sample locations.
///
/// Row `i` of every result table produced from a `SampleSet` refers to
/// `points()[i]`. Observation dates are kept alongside by the caller, since
/// tabular workflows need dates without coordinates.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    points: Vec<Point<f64>>,
    crs: Option<CRS>,
}

impl SampleSet {
    pub fn new(points: Vec<Point<f64>>) -> Self {
        Self { points, crs: None }
    }

    /// Build from `(x, y)` pairs
    pub fn from_xy(coords: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self::new(coords.into_iter().map(|(x, y)| Point::new(x, y)).collect())
    }

    /// Builder-style CRS setter
    pub fn with_crs(mut self, crs: CRS) -> Self {
        self.crs = Some(crs);
        self
    }

    pub fn push(&mut self, point: Point<f64>) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point<f64>] {
        &self.points
    }

    pub fn crs(&self) -> Option<&CRS> {
        self.crs.as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point<f64>> {
        self.points.iter()
    }
}

impl FromIterator<Coord<f64>> for SampleSet {
    fn from_iter<I: IntoIterator<Item = Coord<f64>>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Point::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::coord;

    #[test]
    fn test_sample_set() {
        let mut samples = SampleSet::from_xy([(1.0, 2.0), (3.0, 4.0)]).with_crs(CRS::wgs84());
        samples.push(Point::new(5.0, 6.0));

        assert_eq!(samples.len(), 3);
        assert_eq!(samples.points()[2].x(), 5.0);
        assert_eq!(samples.crs(), Some(&CRS::wgs84()));
    }

    #[test]
    fn test_from_coords() {
        let samples: SampleSet = [coord! { x: 0.5, y: 1.5 }].into_iter().collect();
        assert_eq!(samples.len(), 1);
        assert!(samples.crs().is_none());
        assert_eq!(samples.iter().next().unwrap().y(), 1.5);
    }
}
