//! Square cell windows for neighbourhood sampling

/// Square window reaching `radius` cells from the center in each direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighborhood {
    radius: usize,
}

impl Neighborhood {
    pub fn square(radius: usize) -> Self {
        Self { radius }
    }

    /// Smallest square window that covers a disc of `radius` map units
    /// centered anywhere inside the center cell.
    ///
    /// Saturates for radii far beyond any grid; [`Neighborhood::cells_around`]
    /// only ever visits the part of the window that overlaps the grid.
    pub fn covering(radius: f64, cell_size: f64) -> Self {
        if !(radius > 0.0) || !(cell_size > 0.0) {
            return Self::square(0);
        }
        Self::square((radius / cell_size).ceil() as usize)
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Cells of a `rows` x `cols` grid inside the window centered on
    /// `(row, col)`, row by row.
    ///
    /// The center may lie outside the grid; only the overlap is visited.
    pub fn cells_around(
        &self,
        row: isize,
        col: isize,
        rows: usize,
        cols: usize,
    ) -> impl Iterator<Item = (usize, usize)> {
        let r = self.radius.min(isize::MAX as usize) as isize;
        let span = |center: isize, len: usize| {
            center.saturating_sub(r).max(0)..=center.saturating_add(r).min(len as isize - 1)
        };
        let col_span = span(col, cols);

        span(row, rows)
            .flat_map(move |rr| col_span.clone().map(move |cc| (rr as usize, cc as usize)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_around_interior() {
        let cells: Vec<_> = Neighborhood::square(0).cells_around(2, 3, 5, 5).collect();
        assert_eq!(cells, vec![(2, 3)]);
        assert_eq!(Neighborhood::square(1).cells_around(2, 2, 5, 5).count(), 9);
        assert_eq!(Neighborhood::square(2).cells_around(2, 2, 5, 5).count(), 25);
    }

    #[test]
    fn test_cells_around_clipped_to_grid() {
        let cells: Vec<_> = Neighborhood::square(1).cells_around(0, 0, 5, 5).collect();
        assert_eq!(cells, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);

        // center off the grid, window reaching back in
        let cells: Vec<_> = Neighborhood::square(2).cells_around(-2, 6, 5, 5).collect();
        assert_eq!(cells, vec![(0, 4)]);

        assert_eq!(Neighborhood::square(1).cells_around(-5, 0, 5, 5).count(), 0);
        assert_eq!(Neighborhood::square(3).cells_around(0, 0, 0, 0).count(), 0);
    }

    #[test]
    fn test_huge_window_visits_each_cell_once() {
        let n = Neighborhood::covering(1e20, 1.0);
        assert_eq!(n.cells_around(2, 2, 5, 5).count(), 25);
        assert_eq!(n.cells_around(isize::MAX, -1_000_000, 3, 4).count(), 12);
    }

    #[test]
    fn test_covering() {
        assert_eq!(Neighborhood::covering(250.0, 250.0), Neighborhood::square(1));
        assert_eq!(Neighborhood::covering(300.0, 250.0), Neighborhood::square(2));
        assert_eq!(Neighborhood::covering(10.0, 250.0), Neighborhood::square(1));
        assert_eq!(Neighborhood::covering(0.0, 250.0), Neighborhood::square(0));
        assert_eq!(Neighborhood::covering(f64::NAN, 250.0), Neighborhood::square(0));
    }
}
