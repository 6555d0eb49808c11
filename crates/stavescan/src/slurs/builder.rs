//! Slur assembly on top of the traced arcs.

use std::collections::BTreeMap;

use image::GrayImage;

use crate::geometry::{Circle, PixelPoint};
use crate::scale::Scale;
use crate::sheet::{PixelSource, Skew, StaffManager};

use super::arc::{ArcId, ArcShape, ArcStore};
use super::classify::{circle_of, ArcClassifier};
use super::config::{SlursConfig, SlursParams};
use super::retriever::ArcRetriever;
use super::skeleton::SkeletonGrid;
use super::slur::{Slur, SlurPart};

/// Traces the arcs of a skeleton and assembles them into slurs.
///
/// ```no_run
/// # use stavescan::{Scale, SlursBuilder, SlursConfig};
/// # use stavescan::sheet::{Skew, StaffManager};
/// let skeleton = image::open("skeleton.png").unwrap().to_luma8();
/// let staves = StaffManager::default();
/// let mut builder = SlursBuilder::new(
///     &SlursConfig::default(),
///     Scale::new(20, 3),
///     Skew::default(),
///     &staves,
///     &skeleton,
/// );
/// let slurs = builder.build_slurs();
/// println!("{} slurs", slurs.len());
/// ```
pub struct SlursBuilder<'a> {
    params: SlursParams,
    staves: &'a StaffManager,
    skew: Skew,
    grid: SkeletonGrid,
    store: ArcStore,
    retrieved: bool,
    assembled: bool,
    slurs: Vec<Slur>,
}

impl<'a> SlursBuilder<'a> {
    /// Read the skeleton and detect its junctions.
    pub fn new(
        config: &SlursConfig,
        scale: Scale,
        skew: Skew,
        staves: &'a StaffManager,
        skeleton: &dyn PixelSource,
    ) -> Self {
        Self {
            params: SlursParams::new(config, scale),
            staves,
            skew,
            grid: SkeletonGrid::from_source(skeleton),
            store: ArcStore::new(),
            retrieved: false,
            assembled: false,
            slurs: Vec::new(),
        }
    }

    /// Trace and classify all arcs. Done once.
    pub fn retrieve_arcs(&mut self) -> &ArcStore {
        if !self.retrieved {
            let classifier = ArcClassifier {
                params: &self.params,
                staves: self.staves,
                skew: self.skew,
            };
            ArcRetriever::new(&mut self.grid, &mut self.store, classifier).scan_image();
            self.retrieved = true;

            tracing::info!("{} arcs retrieved", self.store.len());
            tracing::debug!("arc shapes: {:?}", self.store.shape_histogram());
        }
        &self.store
    }

    /// Build the slurs, retrieving arcs first if needed. Done once.
    pub fn build_slurs(&mut self) -> &[Slur] {
        if !self.assembled {
            self.retrieve_arcs();
            self.slurs = assemble_slurs(&mut self.store, &self.params);
            self.assembled = true;
            tracing::info!("{} slurs retrieved", self.slurs.len());
        }
        &self.slurs
    }

    pub fn slurs(&self) -> &[Slur] {
        &self.slurs
    }

    pub fn arcs(&self) -> &ArcStore {
        &self.store
    }

    pub fn shape_histogram(&self) -> BTreeMap<ArcShape, usize> {
        self.store.shape_histogram()
    }

    pub fn grid(&self) -> &SkeletonGrid {
        &self.grid
    }

    /// Tracing state rendered as gray levels.
    pub fn state_image(&self) -> GrayImage {
        self.grid.state_image()
    }
}

/// Grow one slur from every seed arc.
///
/// Seeds are unassigned `Slur` arcs, longest first. Each seed is extended
/// on its stop side, then on its start side, one junction at a time.
pub(crate) fn assemble_slurs(store: &mut ArcStore, params: &SlursParams) -> Vec<Slur> {
    let mut seeds: Vec<(usize, ArcId)> = store
        .iter()
        .filter(|a| a.shape == ArcShape::Slur && !a.assigned)
        .filter(|a| a.len() >= params.arc_min_seed_length)
        .map(|a| (a.len(), a.id))
        .collect();
    seeds.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    let mut slurs = Vec::new();
    for (_, id) in seeds {
        let Some(seed) = store.get(id) else {
            continue;
        };
        if seed.assigned {
            continue;
        }
        let Some(circle) = seed.circle else {
            continue;
        };

        let mut slur = Slur {
            parts: vec![SlurPart {
                arc: id,
                reversed: false,
            }],
            circle,
        };
        for reverse in [false, true] {
            while extend(&mut slur, store, params, reverse) {}
        }

        for part in &slur.parts {
            if let Some(arc) = store.get_mut(part.arc) {
                arc.assigned = true;
            }
        }
        tracing::debug!(
            "slur from {}: {} arcs, radius {:.1}",
            id,
            slur.parts.len(),
            slur.circle.radius
        );
        slurs.push(slur);
    }
    slurs
}

/// Extend `slur` by one arc past its junction on the given side.
///
/// Every unassigned relevant arc around the junction whose concatenation
/// still fits a circle joins the clump; the longest candidate wins, the
/// first one met on ties. Returns false when nothing was added.
fn extend(slur: &mut Slur, store: &ArcStore, params: &SlursParams, reverse: bool) -> bool {
    let Some(pivot) = slur.end_junction(store, reverse) else {
        return false;
    };
    let current = slur.points(store);

    let mut best: Option<(usize, SlurPart, Circle)> = None;
    for &id in store.arcs_at_junction(pivot) {
        let Some(arc) = store.get(id) else {
            continue;
        };
        if arc.assigned || slur.contains(id) || !arc.shape.is_slur_relevant() {
            continue;
        }
        let Some(part) = orient(arc.start_junction, arc.stop_junction, pivot, id, reverse) else {
            continue;
        };

        let mut points: Vec<PixelPoint> = Vec::with_capacity(current.len() + arc.len());
        if reverse {
            points.extend(part.points(arc));
            points.extend_from_slice(&current);
        } else {
            points.extend_from_slice(&current);
            points.extend(part.points(arc));
        }

        let Some(circle) = circle_of(&points, params) else {
            continue;
        };
        if best.as_ref().map_or(true, |(len, _, _)| points.len() > *len) {
            best = Some((points.len(), part, circle));
        }
    }

    match best {
        Some((_, part, circle)) => {
            if reverse {
                slur.parts.insert(0, part);
            } else {
                slur.parts.push(part);
            }
            slur.circle = circle;
            true
        }
        None => false,
    }
}

/// Orientation of an arc joining `pivot` so that the slur stays contiguous.
fn orient(
    start: Option<PixelPoint>,
    stop: Option<PixelPoint>,
    pivot: PixelPoint,
    arc: ArcId,
    reverse: bool,
) -> Option<SlurPart> {
    // Appending needs the arc to begin at the pivot, prepending to end there.
    let (natural, flipped) = if reverse { (stop, start) } else { (start, stop) };
    if natural == Some(pivot) {
        Some(SlurPart {
            arc,
            reversed: false,
        })
    } else if flipped == Some(pivot) {
        Some(SlurPart {
            arc,
            reversed: true,
        })
    } else {
        None
    }
}
