//! Planar geometry primitives shared by the bar and slur stages.
//!
//! Implements:
//! - Integer pixel coordinates with 8-connectivity helpers.
//! - Total least-squares straight line fit.
//! - Three-point and algebraic least-squares circle fits, with arc angles
//!   and Bézier conversion.

mod circle;
mod line;

pub use circle::Circle;
pub use line::Line;

/// Integer pixel coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct PixelPoint {
    /// Abscissa (column).
    pub x: i32,
    /// Ordinate (row, growing downwards).
    pub y: i32,
}

impl PixelPoint {
    /// Build a pixel point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Point as float coordinates.
    #[inline]
    pub fn to_f64(self) -> [f64; 2] {
        [f64::from(self.x), f64::from(self.y)]
    }

    /// True when `other` is one of the 8 immediate neighbors.
    #[inline]
    pub fn touches(self, other: Self) -> bool {
        self != other && (self.x - other.x).abs() <= 1 && (self.y - other.y).abs() <= 1
    }
}

impl std::fmt::Display for PixelPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Squared sine of the angle between `p0→p1` and `p0→p2`.
///
/// Zero for colinear points, one for a right angle. Degenerate input (a
/// vector of zero length) reports 0.
pub fn sin_sq(p0: PixelPoint, p1: PixelPoint, p2: PixelPoint) -> f64 {
    let (x1, y1) = (f64::from(p1.x - p0.x), f64::from(p1.y - p0.y));
    let (x2, y2) = (f64::from(p2.x - p0.x), f64::from(p2.y - p0.y));

    let vect = x1 * y2 - x2 * y1;
    let l1_sq = x1 * x1 + y1 * y1;
    let l2_sq = x2 * x2 + y2 * y2;
    if l1_sq == 0.0 || l2_sq == 0.0 {
        return 0.0;
    }

    (vect * vect) / (l1_sq * l2_sq)
}

/// Convert pixel points to float coordinates.
pub fn to_f64_points(points: &[PixelPoint]) -> Vec<[f64; 2]> {
    points.iter().map(|p| p.to_f64()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sin_sq_of_colinear_and_orthogonal_points() {
        let o = PixelPoint::new(0, 0);
        assert_relative_eq!(sin_sq(o, PixelPoint::new(2, 2), PixelPoint::new(5, 5)), 0.0);
        assert_relative_eq!(sin_sq(o, PixelPoint::new(3, 0), PixelPoint::new(0, 4)), 1.0);
        assert_relative_eq!(sin_sq(o, o, PixelPoint::new(0, 4)), 0.0);
    }

    #[test]
    fn touches_is_eight_connected() {
        let p = PixelPoint::new(10, 10);
        assert!(p.touches(PixelPoint::new(11, 11)));
        assert!(p.touches(PixelPoint::new(10, 9)));
        assert!(!p.touches(p));
        assert!(!p.touches(PixelPoint::new(12, 10)));
    }
}
