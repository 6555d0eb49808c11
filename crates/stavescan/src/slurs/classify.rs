//! Arc shape classification and the circle acceptance test.

use std::f64::consts::PI;

use crate::geometry::{sin_sq, to_f64_points, Circle, Line, PixelPoint};
use crate::sheet::{Skew, StaffManager};

use super::arc::ArcShape;
use super::config::SlursParams;

/// Sheet data needed to classify arcs.
#[derive(Clone, Copy)]
pub(crate) struct ArcClassifier<'a> {
    pub params: &'a SlursParams,
    pub staves: &'a StaffManager,
    pub skew: Skew,
}

impl ArcClassifier<'_> {
    /// Shape of an oriented point sequence, with the circle of a `Slur`.
    ///
    /// Tests run in order: too short, staff line, straight line, circle.
    pub fn determine_shape(&self, points: &[PixelPoint]) -> (ArcShape, Option<Circle>) {
        let n = points.len();
        if n < self.params.arc_min_quorum {
            return (ArcShape::Short, None);
        }

        if self.is_staff_arc(points) {
            let shape = if n > self.params.max_staff_arc_length {
                ArcShape::Irrelevant
            } else {
                ArcShape::StaffLine
            };
            return (shape, None);
        }

        let (p0, p1, p2) = (points[0], points[n / 2], points[n - 1]);
        if sin_sq(p0, p1, p2) <= self.params.max_sin_sq {
            if let Some(line) = Line::fit(&to_f64_points(points)) {
                if line.mean_distance <= self.params.max_line_distance {
                    let slope = self.skew.slope;
                    // Stem or bar remainder.
                    if (line.inverted_slope() + slope).abs() <= self.params.min_slope {
                        return (ArcShape::Irrelevant, None);
                    }
                    // Staff line or ledger remainder.
                    if (line.slope() - slope).abs() <= self.params.min_slope {
                        return (ArcShape::Irrelevant, None);
                    }
                    return (ArcShape::Line, None);
                }
            }
        }

        match circle_of(points, self.params) {
            Some(circle) => (ArcShape::Slur, Some(circle)),
            None => (ArcShape::Irrelevant, None),
        }
    }

    /// True when the arc closely follows the nearest staff line.
    fn is_staff_arc(&self, points: &[PixelPoint]) -> bool {
        let n = points.len();
        if n == 0 || n < self.params.min_staff_arc_length {
            return false;
        }

        let p0 = points[0].to_f64();
        let Some(staff) = self.staves.staff_at(p0) else {
            return false;
        };
        let (_, line, _) = staff.closest_line(p0);

        let mut max_dist = 0.0f64;
        let mut max_dy = f64::MIN;
        let mut min_dy = f64::MAX;
        for i in [0, n / 2, n - 1] {
            let [x, y] = points[i].to_f64();
            let dy = y - line.y_at(x);
            max_dist = max_dist.max(dy.abs());
            max_dy = max_dy.max(dy);
            min_dy = min_dy.min(dy);
        }

        let limit = self.params.min_staff_line_distance;
        max_dist < limit && (max_dy - min_dy) < limit
    }
}

/// Circle fitting `points`, if acceptable as a slur.
///
/// A rough circle through the first, middle and last points is checked
/// first against radius and arc angle bounds. The least-squares fit over all
/// points is kept when its radius is similar to the rough one, otherwise the
/// rough circle is kept with its distance recomputed over all points.
pub(crate) fn circle_of(points: &[PixelPoint], params: &SlursParams) -> Option<Circle> {
    let n = points.len();
    if n < 3 {
        return None;
    }

    let pts = to_f64_points(points);
    let radius_ok = |r: f64| r >= params.min_circle_radius && r <= params.max_circle_radius;

    let rough = Circle::through(pts[0], pts[n / 2], pts[n - 1]);
    if let Some(rough) = &rough {
        if !radius_ok(rough.radius) {
            tracing::trace!("arc radius out of range {:.1} at {}", rough.radius, points[0]);
            return None;
        }
        if rough.arc_angle() > params.max_arc_angle {
            tracing::trace!("arc angle too large {:.2} at {}", rough.arc_angle(), points[0]);
            return None;
        }
    }

    let fitted = Circle::fit(&pts);
    let circle = match (rough, fitted) {
        (Some(r), Some(f)) => {
            let (r1, r2) = (r.radius, f.radius);
            if (r1 - r2).abs() / r1.max(r2) <= params.similar_radius_ratio {
                f
            } else {
                Circle {
                    distance: r.rms_distance(&pts),
                    ..r
                }
            }
        }
        (None, Some(f)) => f,
        (Some(r), None) => Circle {
            distance: r.rms_distance(&pts),
            ..r
        },
        (None, None) => return None,
    };

    if !circle.radius.is_finite() || !circle.distance.is_finite() {
        return None;
    }
    if !radius_ok(circle.radius) || circle.arc_angle() > params.max_arc_angle {
        return None;
    }
    if circle.distance > params.max_arcs_distance {
        tracing::trace!("bad circle fit {:.2} at {}", circle.distance, points[0]);
        return None;
    }

    // Angle between the slur chord and the vertical.
    let mid = circle.mid_angle().rem_euclid(PI);
    let from_vertical = mid.min(PI - mid);
    if from_vertical < params.min_angle_from_vertical {
        tracing::trace!("slur too vertical at {}", points[0]);
        return None;
    }

    Some(circle)
}
