//! Circle arcs: three-point definition and algebraic least-squares fit.

use std::f64::consts::{PI, TAU};

use nalgebra::{Matrix3, Vector3};

/// Circular arc running from a first point to a last point.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Circle {
    /// Circle center.
    pub center: [f64; 2],
    /// Circle radius.
    pub radius: f64,
    /// Angle of the first arc point, in radians within (−π, π].
    ///
    /// Angles follow image axes (y downwards), so they grow clockwise on screen.
    pub first_angle: f64,
    /// Angle of the last arc point, in radians within (−π, π].
    pub last_angle: f64,
    /// +1 when the arc runs from first to last with growing angles, −1 otherwise.
    pub sweep_sign: f64,
    /// Root mean square distance of the defining points to the circle.
    pub distance: f64,
}

impl Circle {
    /// Circle passing through three points.
    ///
    /// Returns `None` for (nearly) colinear points.
    pub fn through(first: [f64; 2], middle: [f64; 2], last: [f64; 2]) -> Option<Self> {
        let (ax, ay) = (first[0], first[1]);
        let (bx, by) = (middle[0], middle[1]);
        let (cx, cy) = (last[0], last[1]);

        let d = 2.0 * (ax * (by - cy) + bx * (cy - ay) + cx * (ay - by));
        if d.abs() < 1e-9 {
            return None;
        }

        let a2 = ax * ax + ay * ay;
        let b2 = bx * bx + by * by;
        let c2 = cx * cx + cy * cy;
        let ux = (a2 * (by - cy) + b2 * (cy - ay) + c2 * (ay - by)) / d;
        let uy = (a2 * (cx - bx) + b2 * (ax - cx) + c2 * (bx - ax)) / d;
        let radius = (bx - ux).hypot(by - uy);
        if !radius.is_finite() {
            return None;
        }

        Some(Self::with_ends([ux, uy], radius, first, middle, last, 0.0))
    }

    /// Algebraic least-squares circle through `points`.
    ///
    /// Minimizes `Σ (x² + y² + D·x + E·y + F)²`. Points are centered on their
    /// centroid first for numerical stability. The first, middle and last
    /// points define the arc ends and orientation.
    ///
    /// Returns `None` for fewer than 3 points, a singular system, or a
    /// non-finite radius.
    pub fn fit(points: &[[f64; 2]]) -> Option<Self> {
        let n = points.len();
        if n < 3 {
            return None;
        }

        let nf = n as f64;
        let mx = points.iter().map(|p| p[0]).sum::<f64>() / nf;
        let my = points.iter().map(|p| p[1]).sum::<f64>() / nf;

        // Normal equations of the design matrix [x, y, 1] against -(x² + y²).
        let mut ata = Matrix3::<f64>::zeros();
        let mut atb = Vector3::<f64>::zeros();
        for p in points {
            let x = p[0] - mx;
            let y = p[1] - my;
            let row = Vector3::new(x, y, 1.0);
            ata += row * row.transpose();
            atb -= row * (x * x + y * y);
        }

        // Colinear points make the system singular.
        let trace = ata.trace();
        if ata.determinant().abs() <= 1e-12 * trace * trace * trace {
            return None;
        }

        let sol = ata.lu().solve(&atb)?;
        let (d, e, f) = (sol[0], sol[1], sol[2]);
        let cx = -0.5 * d;
        let cy = -0.5 * e;
        let r_sq = cx * cx + cy * cy - f;
        if !r_sq.is_finite() || r_sq <= 0.0 {
            return None;
        }

        let center = [cx + mx, cy + my];
        let radius = r_sq.sqrt();
        let mut circle = Self::with_ends(
            center,
            radius,
            points[0],
            points[n / 2],
            points[n - 1],
            0.0,
        );
        circle.distance = circle.rms_distance(points);
        if !circle.distance.is_finite() {
            return None;
        }

        Some(circle)
    }

    fn with_ends(
        center: [f64; 2],
        radius: f64,
        first: [f64; 2],
        middle: [f64; 2],
        last: [f64; 2],
        distance: f64,
    ) -> Self {
        let angle_of = |p: [f64; 2]| (p[1] - center[1]).atan2(p[0] - center[0]);
        let first_angle = angle_of(first);
        let last_angle = angle_of(last);
        let mid_angle = angle_of(middle);

        let sweep = (last_angle - first_angle).rem_euclid(TAU);
        let to_mid = (mid_angle - first_angle).rem_euclid(TAU);
        let sweep_sign = if to_mid <= sweep { 1.0 } else { -1.0 };

        Self {
            center,
            radius,
            first_angle,
            last_angle,
            sweep_sign,
            distance,
        }
    }

    /// Root mean square distance of `points` to the circle.
    pub fn rms_distance(&self, points: &[[f64; 2]]) -> f64 {
        if points.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = points
            .iter()
            .map(|p| {
                let d = (p[0] - self.center[0]).hypot(p[1] - self.center[1]) - self.radius;
                d * d
            })
            .sum();
        (sum_sq / points.len() as f64).sqrt()
    }

    /// Positive angle swept from first to last point, within [0, 2π).
    pub fn arc_angle(&self) -> f64 {
        let sweep = (self.last_angle - self.first_angle).rem_euclid(TAU);
        if self.sweep_sign > 0.0 {
            sweep
        } else {
            (TAU - sweep).rem_euclid(TAU)
        }
    }

    /// Angle of the arc middle.
    pub fn mid_angle(&self) -> f64 {
        let a = self.first_angle + 0.5 * self.sweep_sign * self.arc_angle();
        (a + PI).rem_euclid(TAU) - PI
    }

    /// Point of the circle at `angle`.
    pub fn point_at(&self, angle: f64) -> [f64; 2] {
        [
            self.center[0] + self.radius * angle.cos(),
            self.center[1] + self.radius * angle.sin(),
        ]
    }

    /// Middle point of the arc.
    pub fn middle_point(&self) -> [f64; 2] {
        self.point_at(self.mid_angle())
    }

    /// True when the arc bulges upwards (center below the arc middle).
    pub fn is_above(&self) -> bool {
        self.middle_point()[1] < self.center[1]
    }

    /// Cubic Bézier approximation of the arc: `[p0, c1, c2, p3]`.
    pub fn bezier(&self) -> [[f64; 2]; 4] {
        let theta = self.sweep_sign * self.arc_angle();
        let a0 = self.first_angle;
        let a1 = a0 + theta;
        let k = 4.0 / 3.0 * (theta / 4.0).tan() * self.radius;

        let p0 = self.point_at(a0);
        let p3 = self.point_at(a1);
        let c1 = [p0[0] - k * a0.sin(), p0[1] + k * a0.cos()];
        let c2 = [p3[0] + k * a1.sin(), p3[1] - k * a1.cos()];

        [p0, c1, c2, p3]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn arc_points(center: [f64; 2], radius: f64, a0: f64, a1: f64, n: usize) -> Vec<[f64; 2]> {
        (0..n)
            .map(|i| {
                let a = a0 + (a1 - a0) * i as f64 / (n - 1) as f64;
                [center[0] + radius * a.cos(), center[1] + radius * a.sin()]
            })
            .collect()
    }

    #[test]
    fn three_point_circle_recovers_center() {
        let c = Circle::through([0.0, 10.0], [10.0, 0.0], [20.0, 10.0]).expect("circle");
        assert_relative_eq!(c.center[0], 10.0, epsilon = 1e-9);
        assert_relative_eq!(c.center[1], 10.0, epsilon = 1e-9);
        assert_relative_eq!(c.radius, 10.0, epsilon = 1e-9);
        assert_relative_eq!(c.arc_angle(), PI, epsilon = 1e-9);
        assert!(c.is_above());
    }

    #[test]
    fn colinear_points_have_no_circle() {
        assert!(Circle::through([0.0, 0.0], [1.0, 1.0], [2.0, 2.0]).is_none());
        assert!(Circle::fit(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]]).is_none());
    }

    #[test]
    fn least_squares_fit_matches_sampled_arc() {
        let pts = arc_points([50.0, 80.0], 40.0, -2.5, -0.6, 60);
        let c = Circle::fit(&pts).expect("circle");
        assert_relative_eq!(c.center[0], 50.0, epsilon = 1e-6);
        assert_relative_eq!(c.center[1], 80.0, epsilon = 1e-6);
        assert_relative_eq!(c.radius, 40.0, epsilon = 1e-6);
        assert!(c.distance < 1e-6);
        assert_relative_eq!(c.arc_angle(), 1.9, epsilon = 1e-6);
        assert_relative_eq!(c.sweep_sign, 1.0);
    }

    #[test]
    fn reversed_points_sweep_the_other_way() {
        let mut pts = arc_points([0.0, 0.0], 30.0, 0.3, 2.0, 40);
        pts.reverse();
        let c = Circle::fit(&pts).expect("circle");
        assert_relative_eq!(c.sweep_sign, -1.0);
        assert_relative_eq!(c.arc_angle(), 1.7, epsilon = 1e-6);
        // Arc lies below its center in image coordinates.
        assert!(!c.is_above());
    }

    #[test]
    fn bezier_ends_on_the_arc() {
        let pts = arc_points([100.0, 100.0], 25.0, PI, 1.5 * PI, 30);
        let c = Circle::fit(&pts).expect("circle");
        let [p0, c1, c2, p3] = c.bezier();
        assert_relative_eq!(p0[0], 75.0, epsilon = 1e-6);
        assert_relative_eq!(p0[1], 100.0, epsilon = 1e-6);
        assert_relative_eq!(p3[0], 100.0, epsilon = 1e-6);
        assert_relative_eq!(p3[1], 75.0, epsilon = 1e-6);

        // Midpoint of the cubic is close to the arc middle.
        let mid = [
            0.125 * p0[0] + 0.375 * c1[0] + 0.375 * c2[0] + 0.125 * p3[0],
            0.125 * p0[1] + 0.375 * c1[1] + 0.375 * c2[1] + 0.125 * p3[1],
        ];
        let m = c.middle_point();
        assert!((mid[0] - m[0]).hypot(mid[1] - m[1]) < 0.05);
    }
}
