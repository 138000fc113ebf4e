//! Spatial occupancy on a uniform grid.
//!
//! The bounding box is divided into cells about the size of an average
//! footprint. A layout scores well when the rectangles cover the cells and
//! occupied cells have similar numbers of occupied neighbours (no clumps, no
//! stragglers).

use u_molding_core::stats::{clamp_score, coefficient_of_variation, mean};
use u_molding_core::{Layout, GEOM_EPS};

const COVERAGE_WEIGHT: f64 = 0.6;
const EVENNESS_WEIGHT: f64 = 0.4;

/// Occupancy grid over a layout.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyGrid {
    /// Cells along x.
    pub cols: usize,
    /// Cells along y.
    pub rows: usize,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// Rasterizes `layout`; a cell is occupied if any rectangle overlaps it.
    pub fn new(layout: &Layout, max_cells: usize) -> Self {
        let n = layout.len().max(1) as f64;
        let avg_w = layout.rects.iter().map(|r| r.width()).sum::<f64>() / n;
        let avg_l = layout.rects.iter().map(|r| r.length()).sum::<f64>() / n;
        let max_cells = max_cells.max(1);
        let cols = cell_count(layout.width, avg_w, max_cells);
        let rows = cell_count(layout.length, avg_l, max_cells);
        let cell_w = layout.width / cols as f64;
        let cell_l = layout.length / rows as f64;

        let mut cells = vec![false; cols * rows];
        if cell_w > GEOM_EPS && cell_l > GEOM_EPS {
            for r in &layout.rects {
                let [x0, y0, x1, y1] = r.aabb();
                let c0 = ((x0 / cell_w).floor().max(0.0) as usize).min(cols - 1);
                let c1 = (((x1 / cell_w).ceil() as usize).saturating_sub(1)).min(cols - 1);
                let r0 = ((y0 / cell_l).floor().max(0.0) as usize).min(rows - 1);
                let r1 = (((y1 / cell_l).ceil() as usize).saturating_sub(1)).min(rows - 1);
                for row in r0..=r1.max(r0) {
                    for col in c0..=c1.max(c0) {
                        cells[row * cols + col] = true;
                    }
                }
            }
        }
        Self { cols, rows, cells }
    }

    /// Returns true if the cell is occupied.
    pub fn is_occupied(&self, col: usize, row: usize) -> bool {
        col < self.cols && row < self.rows && self.cells[row * self.cols + col]
    }

    /// Fraction of occupied cells.
    pub fn coverage(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.cells.iter().filter(|c| **c).count() as f64 / self.cells.len() as f64
    }

    /// Occupied 8-neighbour counts for every occupied cell.
    pub fn neighbor_counts(&self) -> Vec<f64> {
        let mut out = Vec::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                if !self.is_occupied(col, row) {
                    continue;
                }
                let mut count = 0;
                for dr in -1i64..=1 {
                    for dc in -1i64..=1 {
                        if dr == 0 && dc == 0 {
                            continue;
                        }
                        let (nr, nc) = (row as i64 + dr, col as i64 + dc);
                        if nr >= 0 && nc >= 0 && self.is_occupied(nc as usize, nr as usize) {
                            count += 1;
                        }
                    }
                }
                out.push(count as f64);
            }
        }
        out
    }
}

fn cell_count(extent: f64, cell: f64, max_cells: usize) -> usize {
    if cell <= GEOM_EPS || extent <= GEOM_EPS {
        return 1;
    }
    ((extent / cell).round() as usize).clamp(1, max_cells)
}

/// Occupancy score (0-100): coverage mixed with neighbour evenness.
pub fn occupancy_score(layout: &Layout, max_cells: usize) -> f64 {
    if layout.is_empty() {
        return 0.0;
    }
    if layout.len() == 1 {
        return 100.0;
    }
    let grid = OccupancyGrid::new(layout, max_cells);
    let counts = grid.neighbor_counts();
    let evenness = if counts.len() < 2 || mean(&counts) <= 0.0 {
        1.0
    } else {
        (1.0 - coefficient_of_variation(&counts)).clamp(0.0, 1.0)
    };
    clamp_score(100.0 * (COVERAGE_WEIGHT * grid.coverage() + EVENNESS_WEIGHT * evenness))
}

#[cfg(test)]
mod tests {
    use super::*;
    use u_molding_core::{Footprint, PlacedRect};

    #[test]
    fn test_full_grid_is_perfect() {
        let fp = Footprint::new(10.0, 10.0);
        let mut rects = Vec::new();
        for i in 0..2 {
            for j in 0..2 {
                rects.push(PlacedRect::new(fp, i as f64 * 10.0, j as f64 * 10.0, false));
            }
        }
        let layout = Layout::new(rects, 20.0, 20.0, 0.0);
        let grid = OccupancyGrid::new(&layout, 64);
        assert_eq!((grid.cols, grid.rows), (2, 2));
        assert_eq!(grid.coverage(), 1.0);
        assert!((occupancy_score(&layout, 64) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_sparse_layout_scores_lower() {
        let fp = Footprint::new(10.0, 10.0);
        let rects = vec![
            PlacedRect::new(fp, 0.0, 0.0, false),
            PlacedRect::new(fp, 40.0, 40.0, false),
        ];
        let layout = Layout::new(rects, 50.0, 50.0, 0.0);
        let score = occupancy_score(&layout, 64);
        assert!(score < 50.0);
        assert!(score > 0.0);
    }

    #[test]
    fn test_trivial_layouts() {
        assert_eq!(occupancy_score(&Layout::empty(), 64), 0.0);
        let one = Layout::new(
            vec![PlacedRect::new(Footprint::new(5.0, 5.0), 0.0, 0.0, false)],
            5.0,
            5.0,
            0.0,
        );
        assert_eq!(occupancy_score(&one, 64), 100.0);
    }
}
