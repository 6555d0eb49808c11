use std::collections::BTreeMap;

use crate::bars::{BarVerdict, PlacedBar, SystemInfo};
use crate::check::Failure;
use crate::geometry::{Circle, PixelPoint};
use crate::sheet::Stick;
use crate::slurs::{ArcShape, SlurPart, SlursBuilder};

/// Outcome of bar-line processing for one sheet.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BarsReport {
    /// Verdicts of the first pass.
    pub rough: Vec<BarVerdict>,
    /// Systems derived from the part-defining bars of the first pass.
    pub systems: Vec<SystemInfo>,
    /// Verdicts of the second pass.
    pub precise: Vec<BarVerdict>,
    /// Bars attached to their staves, left to right.
    pub bars: Vec<PlacedBar>,
    /// Sticks rejected by the second pass or by placement.
    pub rejected: Vec<RejectedStick>,
    /// Candidates with their final shape and result.
    pub sticks: Vec<Stick>,
}

impl BarsReport {
    /// Number of placed bar lines.
    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }
}

/// A stick that is not a bar line, with the reason.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RejectedStick {
    pub stick_id: usize,
    pub failure: Option<Failure>,
}

/// Outcome of slur retrieval for one sheet.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SlursReport {
    /// Number of traced arcs.
    pub arc_count: usize,
    /// Number of junction pixels.
    pub junction_count: usize,
    /// Traced arcs per shape.
    pub shapes: BTreeMap<ArcShape, usize>,
    pub slurs: Vec<SlurSummary>,
}

/// One assembled slur.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SlurSummary {
    /// Arcs in traversal order.
    pub parts: Vec<SlurPart>,
    /// Total number of skeleton points.
    pub point_count: usize,
    pub first: PixelPoint,
    pub last: PixelPoint,
    pub circle: Circle,
    /// Cubic Bézier approximation: start, two controls, end.
    pub bezier: [[f64; 2]; 4],
    /// Bulging upwards.
    pub above: bool,
}

impl SlursReport {
    /// Summarize the state of a builder.
    pub fn from_builder(builder: &SlursBuilder<'_>) -> Self {
        let store = builder.arcs();
        let slurs = builder
            .slurs()
            .iter()
            .filter_map(|slur| {
                let points = slur.points(store);
                Some(SlurSummary {
                    parts: slur.parts.clone(),
                    point_count: points.len(),
                    first: *points.first()?,
                    last: *points.last()?,
                    circle: slur.circle,
                    bezier: slur.circle.bezier(),
                    above: slur.circle.is_above(),
                })
            })
            .collect();

        Self {
            arc_count: store.len(),
            junction_count: builder.grid().junctions().len(),
            shapes: builder.shape_histogram(),
            slurs,
        }
    }
}
