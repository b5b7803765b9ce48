//! Iso-grid
//!
//! A fixed-origin rectangular grid of minimum time-to-reach values in
//! minutes. Cells start at a sentinel above the horizon and only ever
//! decrease; settled edge shapes are stamped onto the grid segment by
//! segment, visiting every cell a segment crosses (corner cuts included)
//! so thin diagonal roads do not leave gaps.

use crate::geo::{Aabb, LatLng};

/// Grid of minimum times. Coordinates are degrees; the cell size is a
/// single degree span (latitude scale), so cells are square in degree
/// space, not in meters.
#[derive(Debug, Clone)]
pub struct IsoGrid {
    bounds: Aabb,
    cell_size: f32,
    n_cols: usize,
    n_rows: usize,
    sentinel: f32,
    data: Vec<f32>,
}

impl Default for IsoGrid {
    fn default() -> Self {
        IsoGrid::new(Aabb::new(0.0, 0.0, 0.0, 0.0), 1.0, 0.0)
    }
}

impl IsoGrid {
    /// Cells never written hold `sentinel`, which must exceed the horizon
    /// so monotone writes inside the horizon always land.
    pub fn new(bounds: Aabb, cell_size: f32, sentinel: f32) -> Self {
        let n_cols = (bounds.width() / cell_size).ceil().max(0.0) as usize;
        let n_rows = (bounds.height() / cell_size).ceil().max(0.0) as usize;
        Self {
            bounds,
            cell_size,
            n_cols,
            n_rows,
            sentinel,
            data: vec![sentinel; n_cols * n_rows],
        }
    }

    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn sentinel(&self) -> f32 {
        self.sentinel
    }

    /// Cell index containing a point, or `None` outside the bounds.
    pub fn cell_index(&self, ll: LatLng) -> Option<usize> {
        if !self.bounds.contains(ll) {
            return None;
        }
        let col = ((ll.lng - self.bounds.min_x) / self.cell_size) as usize;
        let row = ((ll.lat - self.bounds.min_y) / self.cell_size) as usize;
        if col >= self.n_cols || row >= self.n_rows {
            return None;
        }
        Some(row * self.n_cols + col)
    }

    pub fn value(&self, cell: usize) -> f32 {
        self.data[cell]
    }

    /// Minimum time at the cell containing `ll`, or the sentinel outside
    /// the grid.
    pub fn value_at(&self, ll: LatLng) -> f32 {
        self.cell_index(ll).map_or(self.sentinel, |c| self.data[c])
    }

    /// Unconditional point write (origin cells).
    pub fn set(&mut self, ll: LatLng, minutes: f32) {
        if let Some(cell) = self.cell_index(ll) {
            self.data[cell] = minutes;
        }
    }

    /// Monotone write: keep the smaller of the current and new value.
    pub fn set_if_less_than(&mut self, cell: usize, minutes: f32) {
        if minutes < self.data[cell] {
            self.data[cell] = minutes;
        }
    }

    /// Every cell the segment `a`→`b` crosses, in traversal order.
    ///
    /// Standard grid line traversal, except that crossing exactly through
    /// a cell corner also emits the two side cells, so a later monotone
    /// write cannot miss a cell the geometry touches.
    pub fn intersect(&self, a: LatLng, b: LatLng) -> Vec<usize> {
        let mut cells = Vec::new();
        if self.n_cols == 0 || self.n_rows == 0 {
            return cells;
        }

        // Continuous cell-space coordinates
        let fx0 = (a.lng - self.bounds.min_x) / self.cell_size;
        let fy0 = (a.lat - self.bounds.min_y) / self.cell_size;
        let fx1 = (b.lng - self.bounds.min_x) / self.cell_size;
        let fy1 = (b.lat - self.bounds.min_y) / self.cell_size;

        let mut x = fx0.floor() as i64;
        let mut y = fy0.floor() as i64;
        let x_end = fx1.floor() as i64;
        let y_end = fy1.floor() as i64;

        let dx = fx1 - fx0;
        let dy = fy1 - fy0;
        let step_x: i64 = if dx > 0.0 { 1 } else { -1 };
        let step_y: i64 = if dy > 0.0 { 1 } else { -1 };

        // Parametric distance along the segment per unit cell step, and
        // to the first boundary crossing on each axis
        let t_delta_x = if dx != 0.0 { (1.0 / dx).abs() } else { f32::MAX };
        let t_delta_y = if dy != 0.0 { (1.0 / dy).abs() } else { f32::MAX };
        let mut t_max_x = if dx != 0.0 {
            let next = if dx > 0.0 { x as f32 + 1.0 } else { x as f32 };
            ((next - fx0) / dx).abs()
        } else {
            f32::MAX
        };
        let mut t_max_y = if dy != 0.0 {
            let next = if dy > 0.0 { y as f32 + 1.0 } else { y as f32 };
            ((next - fy0) / dy).abs()
        } else {
            f32::MAX
        };

        let mut push = |cells: &mut Vec<usize>, cx: i64, cy: i64| {
            if cx >= 0 && cy >= 0 && (cx as usize) < self.n_cols && (cy as usize) < self.n_rows {
                cells.push(cy as usize * self.n_cols + cx as usize);
            }
        };

        push(&mut cells, x, y);
        // Bounded walk; the +2 covers the corner double-steps
        let max_steps = (x_end - x).abs() + (y_end - y).abs() + 2;
        for _ in 0..max_steps {
            if x == x_end && y == y_end {
                break;
            }
            if (t_max_x - t_max_y).abs() < f32::EPSILON {
                // Corner crossing: emit both side cells, step diagonally
                push(&mut cells, x + step_x, y);
                push(&mut cells, x, y + step_y);
                x += step_x;
                y += step_y;
                t_max_x += t_delta_x;
                t_max_y += t_delta_y;
            } else if t_max_x < t_max_y {
                x += step_x;
                t_max_x += t_delta_x;
            } else {
                y += step_y;
                t_max_y += t_delta_y;
            }
            push(&mut cells, x, y);
        }
        cells
    }
}
