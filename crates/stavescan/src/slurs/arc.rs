//! Skeleton arcs and their arena.

use std::collections::{BTreeMap, HashMap};

use crate::geometry::{Circle, PixelPoint};

/// Index of an arc in its [`ArcStore`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct ArcId(pub usize);

impl std::fmt::Display for ArcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "A{}", self.0)
    }
}

/// Classification of a traced arc.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArcShape {
    /// Not classified yet.
    Unknown,
    /// Too short to be classified alone.
    Short,
    /// Fits a circle.
    Slur,
    /// Straight, not aligned with the sheet axes.
    Line,
    /// Follows a staff line.
    StaffLine,
    Irrelevant,
}

impl ArcShape {
    /// Can this arc take part in a slur.
    pub fn is_slur_relevant(self) -> bool {
        matches!(self, ArcShape::Short | ArcShape::Slur | ArcShape::Line)
    }
}

/// A run of skeleton pixels between two junctions (or free ends).
///
/// Once oriented, points run left to right. A bridge arc has no points and
/// links two touching junctions.
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    pub id: ArcId,
    pub points: Vec<PixelPoint>,
    /// Junction before the first point.
    pub start_junction: Option<PixelPoint>,
    /// Junction after the last point.
    pub stop_junction: Option<PixelPoint>,
    pub shape: ArcShape,
    /// Circle of a `Slur` arc.
    pub circle: Option<Circle>,
    /// Already part of a built slur.
    pub assigned: bool,
}

impl Arc {
    pub(crate) fn new(id: ArcId, start_junction: Option<PixelPoint>) -> Self {
        Self {
            id,
            points: Vec::new(),
            start_junction,
            stop_junction: None,
            shape: ArcShape::Unknown,
            circle: None,
            assigned: false,
        }
    }

    /// Point-less arc between two touching junctions.
    pub(crate) fn bridge(id: ArcId, start: PixelPoint, stop: PixelPoint) -> Self {
        let mut arc = Self::new(id, Some(start));
        arc.stop_junction = Some(stop);
        arc.shape = ArcShape::Short;
        arc.check_orientation();
        arc
    }

    /// Start junction when `reverse`, stop junction otherwise.
    pub fn junction(&self, reverse: bool) -> Option<PixelPoint> {
        if reverse {
            self.start_junction
        } else {
            self.stop_junction
        }
    }

    pub(crate) fn set_junction(&mut self, p: PixelPoint, reverse: bool) {
        if reverse {
            self.start_junction = Some(p);
        } else {
            self.stop_junction = Some(p);
        }
    }

    /// First point when `reverse`, last point otherwise.
    pub fn end(&self, reverse: bool) -> Option<PixelPoint> {
        if reverse {
            self.points.first().copied()
        } else {
            self.points.last().copied()
        }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_bridge(&self) -> bool {
        self.points.is_empty() && self.start_junction.is_some() && self.stop_junction.is_some()
    }

    /// Both junctions, when set.
    pub fn junctions(&self) -> impl Iterator<Item = PixelPoint> + '_ {
        self.start_junction.iter().chain(self.stop_junction.iter()).copied()
    }

    /// Orient the arc left to right.
    pub(crate) fn check_orientation(&mut self) {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(&f), Some(&l)) => (f, l),
            _ => match (self.start_junction, self.stop_junction) {
                (Some(f), Some(l)) => (f, l),
                _ => return,
            },
        };
        if first.x > last.x {
            self.points.reverse();
            std::mem::swap(&mut self.start_junction, &mut self.stop_junction);
        }
    }
}

/// Arena of traced arcs with endpoint and junction lookups.
#[derive(Debug, Default, Clone)]
pub struct ArcStore {
    arcs: Vec<Arc>,
    /// End point of every slur-relevant arc.
    ends: HashMap<PixelPoint, ArcId>,
    /// Slur-relevant arcs around each junction, in insertion order.
    junction_arcs: HashMap<PixelPoint, Vec<ArcId>>,
}

impl ArcStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next pushed arc will get.
    pub(crate) fn next_id(&self) -> ArcId {
        ArcId(self.arcs.len())
    }

    /// Store an arc, indexing it when slur-relevant.
    pub fn push(&mut self, mut arc: Arc) -> ArcId {
        let id = self.next_id();
        arc.id = id;
        if arc.shape.is_slur_relevant() {
            for reverse in [true, false] {
                if let Some(end) = arc.end(reverse) {
                    self.ends.insert(end, id);
                }
            }
            for junction in arc.junctions() {
                let list = self.junction_arcs.entry(junction).or_default();
                if !list.contains(&id) {
                    list.push(id);
                }
            }
        }
        self.arcs.push(arc);
        id
    }

    pub fn get(&self, id: ArcId) -> Option<&Arc> {
        self.arcs.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: ArcId) -> Option<&mut Arc> {
        self.arcs.get_mut(id.0)
    }

    /// Slur-relevant arc ending at `end`.
    pub fn arc_at(&self, end: PixelPoint) -> Option<&Arc> {
        self.ends.get(&end).and_then(|&id| self.get(id))
    }

    /// Slur-relevant arcs touching `junction`.
    pub fn arcs_at_junction(&self, junction: PixelPoint) -> &[ArcId] {
        self.junction_arcs
            .get(&junction)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc> {
        self.arcs.iter()
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Number of arcs per shape.
    pub fn shape_histogram(&self) -> BTreeMap<ArcShape, usize> {
        let mut histo = BTreeMap::new();
        for arc in &self.arcs {
            *histo.entry(arc.shape).or_insert(0) += 1;
        }
        histo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arc(points: &[(i32, i32)], shape: ArcShape) -> Arc {
        let mut arc = Arc::new(ArcId(0), None);
        arc.points = points.iter().map(|&(x, y)| PixelPoint::new(x, y)).collect();
        arc.shape = shape;
        arc
    }

    #[test]
    fn orientation_is_left_to_right() {
        let mut a = arc(&[(5, 0), (4, 1), (3, 2)], ArcShape::Short);
        a.stop_junction = Some(PixelPoint::new(2, 3));
        a.check_orientation();
        assert_eq!(a.end(true), Some(PixelPoint::new(3, 2)));
        assert_eq!(a.junction(true), Some(PixelPoint::new(2, 3)));
        assert_eq!(a.junction(false), None);

        let b = Arc::bridge(ArcId(0), PixelPoint::new(9, 9), PixelPoint::new(8, 10));
        assert!(b.is_bridge());
        assert_eq!(b.start_junction, Some(PixelPoint::new(8, 10)));
    }

    #[test]
    fn relevant_arcs_are_found_from_both_ends() {
        let mut store = ArcStore::new();
        let mut a = arc(&[(1, 1), (2, 1), (3, 2)], ArcShape::Slur);
        a.stop_junction = Some(PixelPoint::new(4, 2));
        let id = store.push(a);
        let hidden = store.push(arc(&[(10, 1), (11, 1)], ArcShape::Irrelevant));

        let first = store.arc_at(PixelPoint::new(1, 1)).map(|a| a.id);
        let last = store.arc_at(PixelPoint::new(3, 2)).map(|a| a.id);
        assert_eq!(first, Some(id));
        assert_eq!(first, last);
        assert_eq!(store.arcs_at_junction(PixelPoint::new(4, 2)), &[id]);
        assert!(store.arc_at(PixelPoint::new(10, 1)).is_none());
        assert_eq!(store.get(hidden).map(|a| a.shape), Some(ArcShape::Irrelevant));

        let histo = store.shape_histogram();
        assert_eq!(histo.get(&ArcShape::Slur), Some(&1));
        assert_eq!(histo.get(&ArcShape::Irrelevant), Some(&1));
    }
}
