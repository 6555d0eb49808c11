//! Vertical stick candidates and their classification tags.

use crate::check::Failure;
use crate::geometry::Line;

/// Symbol shape assigned to a stick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Shape {
    ThinBarline,
    ThickBarline,
}

impl Shape {
    /// True for both bar-line shapes.
    pub fn is_bar(self) -> bool {
        matches!(self, Shape::ThinBarline | Shape::ThickBarline)
    }
}

/// Outcome tag of an accepted bar stick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum StickResult {
    /// Both ends anchor a resolved staff.
    #[serde(rename = "Bar-PartDefining")]
    PartDefining,
    /// At most one end anchors a staff.
    #[serde(rename = "Bar-NotPartDefining")]
    NotPartDefining,
}

/// Elongated vertical foreground region, a bar-line candidate.
///
/// `start` is the top end and `stop` the bottom end, in image coordinates.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stick {
    pub id: usize,
    pub start: [f64; 2],
    pub stop: [f64; 2],
    /// Number of foreground pixels.
    pub weight: u32,
    /// Mean radius of curvature in pixels, when the stick source computes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_radius: Option<f64>,
    /// Shape currently assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    /// The shape was set by hand and must not be overridden.
    #[serde(default)]
    pub manual: bool,
    /// Classification result of the last bar check.
    #[serde(skip)]
    pub result: Option<StickResult>,
    /// Failure recorded by the last bar check.
    #[serde(skip)]
    pub failure: Option<Failure>,
}

impl Stick {
    /// New unclassified stick. Ends are swapped if needed so that `start` is on top.
    pub fn new(id: usize, start: [f64; 2], stop: [f64; 2], weight: u32) -> Self {
        let mut stick = Self {
            id,
            start,
            stop,
            weight,
            mean_radius: None,
            shape: None,
            manual: false,
            result: None,
            failure: None,
        };
        stick.normalize();
        stick
    }

    /// Put the upper end in `start`.
    pub fn normalize(&mut self) {
        if self.stop[1] < self.start[1] {
            std::mem::swap(&mut self.start, &mut self.stop);
        }
    }

    /// Distance between both ends.
    pub fn length(&self) -> f64 {
        (self.stop[0] - self.start[0]).hypot(self.stop[1] - self.start[1])
    }

    /// Mean horizontal thickness: weight over length.
    pub fn mean_width(&self) -> f64 {
        let length = self.length();
        if length <= 0.0 {
            return f64::from(self.weight);
        }
        f64::from(self.weight) / length
    }

    /// Abscissa of the stick axis at ordinate `y`.
    pub fn x_at(&self, y: f64) -> f64 {
        let dy = self.stop[1] - self.start[1];
        if dy.abs() < 1e-12 {
            return 0.5 * (self.start[0] + self.stop[0]);
        }
        self.start[0] + (y - self.start[1]) * (self.stop[0] - self.start[0]) / dy
    }

    /// Abscissa of the stick middle.
    pub fn mid_x(&self) -> f64 {
        0.5 * (self.start[0] + self.stop[0])
    }

    /// Axis line, `None` for a point-like stick.
    pub fn line(&self) -> Option<Line> {
        Line::through(self.start, self.stop)
    }

    /// dx/dy of the stick axis (0 for a perfectly vertical stick).
    pub fn inverted_slope(&self) -> f64 {
        self.line().map_or(f64::INFINITY, |l| l.inverted_slope())
    }

    /// True when the stick currently carries a bar shape.
    pub fn is_bar(&self) -> bool {
        self.shape.is_some_and(Shape::is_bar)
    }
}
