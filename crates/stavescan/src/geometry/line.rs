//! Total least-squares straight line.

use nalgebra::{Matrix2, SymmetricEigen};

/// Straight line fitted through a point cloud.
///
/// The fit minimizes orthogonal distances, so vertical and horizontal lines
/// are handled alike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    /// Centroid of the fitted points.
    pub centroid: [f64; 2],
    /// Unit direction vector.
    pub direction: [f64; 2],
    /// Mean orthogonal distance of the fitted points to the line.
    pub mean_distance: f64,
}

impl Line {
    /// Fit a line through `points`.
    ///
    /// Returns `None` for fewer than 2 points or when all points coincide.
    pub fn fit(points: &[[f64; 2]]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }

        let n = points.len() as f64;
        let mx = points.iter().map(|p| p[0]).sum::<f64>() / n;
        let my = points.iter().map(|p| p[1]).sum::<f64>() / n;

        let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
        for &[x, y] in points {
            let dx = x - mx;
            let dy = y - my;
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }
        if sxx + syy <= 1e-12 {
            return None;
        }

        // The direction is the eigenvector of the largest eigenvalue.
        let eig = SymmetricEigen::new(Matrix2::new(sxx, sxy, sxy, syy));
        let major = if eig.eigenvalues[0] >= eig.eigenvalues[1] {
            0
        } else {
            1
        };
        let v = eig.eigenvectors.column(major);
        let norm = (v[0] * v[0] + v[1] * v[1]).sqrt();
        if !norm.is_finite() || norm <= 1e-15 {
            return None;
        }

        let mut line = Self {
            centroid: [mx, my],
            direction: [v[0] / norm, v[1] / norm],
            mean_distance: 0.0,
        };
        line.mean_distance = points.iter().map(|&p| line.distance_to(p)).sum::<f64>() / n;

        Some(line)
    }

    /// Line through two points, `None` if they coincide.
    pub fn through(p1: [f64; 2], p2: [f64; 2]) -> Option<Self> {
        let dx = p2[0] - p1[0];
        let dy = p2[1] - p1[1];
        let norm = (dx * dx + dy * dy).sqrt();
        if norm <= 1e-12 {
            return None;
        }
        Some(Self {
            centroid: [0.5 * (p1[0] + p2[0]), 0.5 * (p1[1] + p2[1])],
            direction: [dx / norm, dy / norm],
            mean_distance: 0.0,
        })
    }

    /// Orthogonal distance from `p` to the line.
    pub fn distance_to(&self, p: [f64; 2]) -> f64 {
        let dx = p[0] - self.centroid[0];
        let dy = p[1] - self.centroid[1];
        (dx * self.direction[1] - dy * self.direction[0]).abs()
    }

    /// dy/dx, infinite for a vertical line.
    pub fn slope(&self) -> f64 {
        if self.direction[0] == 0.0 {
            f64::INFINITY
        } else {
            self.direction[1] / self.direction[0]
        }
    }

    /// dx/dy, infinite for a horizontal line.
    pub fn inverted_slope(&self) -> f64 {
        if self.direction[1] == 0.0 {
            f64::INFINITY
        } else {
            self.direction[0] / self.direction[1]
        }
    }

    /// Ordinate at abscissa `x` (NaN for a vertical line).
    pub fn y_at(&self, x: f64) -> f64 {
        self.centroid[1] + (x - self.centroid[0]) * self.slope()
    }

    /// Abscissa at ordinate `y` (NaN for a horizontal line).
    pub fn x_at(&self, y: f64) -> f64 {
        self.centroid[0] + (y - self.centroid[1]) * self.inverted_slope()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fits_a_slanted_line_exactly() {
        let pts: Vec<[f64; 2]> = (0..20).map(|i| [i as f64, 3.0 + 0.5 * i as f64]).collect();
        let line = Line::fit(&pts).expect("line");
        assert_relative_eq!(line.slope(), 0.5, epsilon = 1e-9);
        assert_relative_eq!(line.y_at(10.0), 8.0, epsilon = 1e-9);
        assert!(line.mean_distance < 1e-9);
    }

    #[test]
    fn vertical_line_has_zero_inverted_slope() {
        let pts: Vec<[f64; 2]> = (0..30).map(|i| [12.0, i as f64]).collect();
        let line = Line::fit(&pts).expect("line");
        assert_relative_eq!(line.inverted_slope(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(line.x_at(100.0), 12.0, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_input_is_rejected() {
        assert!(Line::fit(&[[1.0, 1.0]]).is_none());
        assert!(Line::fit(&[[1.0, 1.0], [1.0, 1.0], [1.0, 1.0]]).is_none());
        assert!(Line::through([2.0, 2.0], [2.0, 2.0]).is_none());
    }

    #[test]
    fn mean_distance_measures_spread() {
        let pts = vec![[0.0, 1.0], [1.0, -1.0], [2.0, 1.0], [3.0, -1.0]];
        let line = Line::fit(&pts).expect("line");
        assert!(line.mean_distance > 0.5);
    }
}
