//! Slurs assembled from arcs.

use crate::geometry::{Circle, PixelPoint};

use super::arc::{Arc, ArcId, ArcStore};

/// One arc of a slur, possibly traversed backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SlurPart {
    pub arc: ArcId,
    pub reversed: bool,
}

impl SlurPart {
    /// Junction met first when traversing the part.
    pub fn first_junction(&self, arc: &Arc) -> Option<PixelPoint> {
        arc.junction(!self.reversed)
    }

    /// Junction met last when traversing the part.
    pub fn last_junction(&self, arc: &Arc) -> Option<PixelPoint> {
        arc.junction(self.reversed)
    }

    /// Arc points in traversal order.
    pub fn points<'s>(&self, arc: &'s Arc) -> Box<dyn Iterator<Item = PixelPoint> + 's> {
        if self.reversed {
            Box::new(arc.points.iter().rev().copied())
        } else {
            Box::new(arc.points.iter().copied())
        }
    }
}

/// A sequence of arcs joined end to end through junctions, with its circle.
#[derive(Debug, Clone, PartialEq)]
pub struct Slur {
    pub parts: Vec<SlurPart>,
    pub circle: Circle,
}

impl Slur {
    /// Ids of the arcs, in traversal order.
    pub fn arc_ids(&self) -> impl Iterator<Item = ArcId> + '_ {
        self.parts.iter().map(|p| p.arc)
    }

    pub fn contains(&self, id: ArcId) -> bool {
        self.parts.iter().any(|p| p.arc == id)
    }

    /// Concatenated points of all parts.
    pub fn points(&self, store: &ArcStore) -> Vec<PixelPoint> {
        let mut points = Vec::new();
        for part in &self.parts {
            if let Some(arc) = store.get(part.arc) {
                points.extend(part.points(arc));
            }
        }
        points
    }

    /// Total number of points.
    pub fn point_count(&self, store: &ArcStore) -> usize {
        self.parts
            .iter()
            .filter_map(|p| store.get(p.arc))
            .map(Arc::len)
            .sum()
    }

    /// Junction at the start (`reverse`) or stop side of the whole slur.
    pub fn end_junction(&self, store: &ArcStore, reverse: bool) -> Option<PixelPoint> {
        if reverse {
            let part = self.parts.first()?;
            part.first_junction(store.get(part.arc)?)
        } else {
            let part = self.parts.last()?;
            part.last_junction(store.get(part.arc)?)
        }
    }

    /// Check that consecutive parts share exactly one junction, met in
    /// traversal order, and that no point repeats its predecessor.
    pub fn check_continuity(&self, store: &ArcStore) -> Result<(), String> {
        for pair in self.parts.windows(2) {
            let (Some(a), Some(b)) = (store.get(pair[0].arc), store.get(pair[1].arc)) else {
                return Err(format!("unknown arc in {}/{}", pair[0].arc, pair[1].arc));
            };
            let shared = a.junctions().filter(|j| b.junctions().any(|k| k == *j)).count();
            if shared != 1 {
                return Err(format!("{} and {} share {} junctions", a.id, b.id, shared));
            }
            if pair[0].last_junction(a).is_none()
                || pair[0].last_junction(a) != pair[1].first_junction(b)
            {
                return Err(format!("{} and {} are not contiguous", a.id, b.id));
            }
        }

        let points = self.points(store);
        if let Some(w) = points.windows(2).find(|w| w[0] == w[1]) {
            return Err(format!("duplicate point {}", w[0]));
        }
        Ok(())
    }
}
