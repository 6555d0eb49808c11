//! Skeleton navigation tables and the per-pixel tracing state.
//!
//! Headings around a pixel:
//!
//! ```text
//! 7 8 1
//! 6 0 2
//! 5 4 3
//! ```
//!
//! Heading 0 means "no heading yet".

use image::{GrayImage, Luma};

use crate::geometry::PixelPoint;
use crate::sheet::PixelSource;

/// Delta abscissa per heading.
pub(crate) const DXS: [i32; 9] = [0, 1, 1, 1, 0, -1, -1, -1, 0];
/// Delta ordinate per heading.
pub(crate) const DYS: [i32; 9] = [0, -1, 0, 1, 1, 1, 0, -1, -1];

/// Headings to scan, according to the last heading.
pub(crate) const SCANS: [&[usize]; 9] = [
    &[2, 4, 6, 8, 1, 3, 5, 7],
    &[2, 8, 1, 3, 7],
    &[2, 4, 8, 1, 3],
    &[2, 4, 1, 3, 5],
    &[2, 4, 6, 3, 5],
    &[4, 6, 3, 5, 7],
    &[4, 6, 8, 5, 7],
    &[6, 8, 1, 5, 7],
    &[2, 6, 8, 1, 7],
];

/// Heading of (dx, dy), indexed by `[1 + dx][1 + dy]`.
const DELTA_TO_DIR: [[usize; 3]; 3] = [[7, 6, 5], [8, 0, 4], [1, 2, 3]];

/// South and north.
const VERTICAL_DIRS: [usize; 2] = [4, 8];
/// East and west.
const HORIZONTAL_DIRS: [usize; 2] = [2, 6];
/// Verticals and horizontals.
const SIDE_DIRS: [usize; 4] = [2, 4, 6, 8];
/// Side headings first, then diagonals.
pub(crate) const ALL_DIRS: [usize; 8] = [2, 4, 6, 8, 1, 3, 5, 7];

/// Gray levels of [`SkeletonGrid::state_image`].
pub const HIDDEN_LEVEL: u8 = 230;
pub const PROCESSED_LEVEL: u8 = 180;
pub const ARC_LEVEL: u8 = 140;
pub const JUNCTION_LEVEL: u8 = 80;
pub const JUNCTION_PROCESSED_LEVEL: u8 = 90;

/// Neighbor of `p` along heading `dir`.
#[inline]
pub(crate) fn step(p: PixelPoint, dir: usize) -> PixelPoint {
    PixelPoint::new(p.x + DXS[dir], p.y + DYS[dir])
}

/// Heading from `from` to `to`, 0 when they are not neighbors.
pub(crate) fn dir_between(from: PixelPoint, to: PixelPoint) -> usize {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx.abs() > 1 || dy.abs() > 1 {
        return 0;
    }
    DELTA_TO_DIR[(1 + dx) as usize][(1 + dy) as usize]
}

/// Tracing state of one skeleton pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Background,
    /// Foreground, not yet traced.
    Arc,
    /// Traced into an arc.
    Processed,
    /// Interior of a discarded arc.
    Hidden,
    /// Branch point, with its connectivity grade.
    Junction(u8),
    /// Branch point whose arcs were all traced.
    JunctionDone,
}

impl Cell {
    #[inline]
    pub fn is_junction(self) -> bool {
        matches!(self, Cell::Junction(_) | Cell::JunctionDone)
    }
}

/// Mutable tracing state over a read-only skeleton.
#[derive(Debug, Clone)]
pub struct SkeletonGrid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl SkeletonGrid {
    /// Read the skeleton and detect junctions.
    ///
    /// A foreground pixel with more than 2 foreground neighbors is a junction
    /// candidate, graded `2·vertical + 2·horizontal (+1 when both)`, so a
    /// diagonal-only candidate has grade 0. It yields to any side neighbor
    /// of strictly higher grade. Grades are read
    /// from the input only, so the result does not depend on scan order.
    pub fn from_source(source: &dyn PixelSource) -> Self {
        let width = i32::try_from(source.width()).unwrap_or(i32::MAX);
        let height = i32::try_from(source.height()).unwrap_or(i32::MAX);
        let len = width as usize * height as usize;
        let index = |x: i32, y: i32| y as usize * width as usize + x as usize;

        // `None` for pixels that are no junction candidate. Diagonal-only
        // candidates keep grade 0.
        let mut grades: Vec<Option<u8>> = vec![None; len];
        let mut cells = vec![Cell::Background; len];
        for y in 0..height {
            for x in 0..width {
                if !source.is_foreground(x, y) {
                    continue;
                }
                let p = PixelPoint::new(x, y);
                let fore = |dir: usize| {
                    let n = step(p, dir);
                    source.is_foreground(n.x, n.y)
                };
                let vert = VERTICAL_DIRS.iter().filter(|&&d| fore(d)).count() as u8;
                let hori = HORIZONTAL_DIRS.iter().filter(|&&d| fore(d)).count() as u8;
                let diag = [1, 3, 5, 7].iter().filter(|&&d| fore(d)).count() as u8;

                cells[index(x, y)] = Cell::Arc;
                if vert + hori + diag > 2 {
                    let both = u8::from(vert > 0 && hori > 0);
                    grades[index(x, y)] = Some(2 * vert + 2 * hori + both);
                }
            }
        }

        let in_bounds = |p: PixelPoint| p.x >= 0 && p.y >= 0 && p.x < width && p.y < height;
        let mut junctions = 0usize;
        for y in 0..height {
            for x in 0..width {
                let Some(grade) = grades[index(x, y)] else {
                    continue;
                };
                let p = PixelPoint::new(x, y);
                let outgraded = SIDE_DIRS.iter().map(|&d| step(p, d)).any(|n| {
                    in_bounds(n) && grades[index(n.x, n.y)].is_some_and(|g| g > grade)
                });
                if !outgraded {
                    cells[index(x, y)] = Cell::Junction(grade);
                    junctions += 1;
                }
            }
        }

        tracing::debug!("skeleton {}x{}: {} junctions", width, height, junctions);
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    fn index(&self, p: PixelPoint) -> Option<usize> {
        if p.x < 0 || p.y < 0 || p.x >= self.width || p.y >= self.height {
            return None;
        }
        Some(p.y as usize * self.width as usize + p.x as usize)
    }

    /// State at `p`, background outside the grid.
    #[inline]
    pub fn get(&self, p: PixelPoint) -> Cell {
        self.index(p).map_or(Cell::Background, |i| self.cells[i])
    }

    /// Set the state at `p`. Ignored outside the grid.
    #[inline]
    pub fn set(&mut self, p: PixelPoint, cell: Cell) {
        if let Some(i) = self.index(p) {
            self.cells[i] = cell;
        }
    }

    /// Junction pixels, in row order.
    pub fn junctions(&self) -> Vec<PixelPoint> {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| PixelPoint::new(x, y)))
            .filter(|&p| self.get(p).is_junction())
            .collect()
    }

    /// Render the tracing state as gray levels, background white.
    pub fn state_image(&self) -> GrayImage {
        let mut img = GrayImage::from_pixel(self.width as u32, self.height as u32, Luma([255]));
        for (i, cell) in self.cells.iter().enumerate() {
            let level = match cell {
                Cell::Background => continue,
                Cell::Arc => ARC_LEVEL,
                Cell::Processed => PROCESSED_LEVEL,
                Cell::Hidden => HIDDEN_LEVEL,
                Cell::Junction(_) => JUNCTION_LEVEL,
                Cell::JunctionDone => JUNCTION_PROCESSED_LEVEL,
            };
            let x = (i % self.width as usize) as u32;
            let y = (i / self.width as usize) as u32;
            img.put_pixel(x, y, Luma([level]));
        }
        img
    }
}
