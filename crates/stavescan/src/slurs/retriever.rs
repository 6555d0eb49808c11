//! Arc retrieval: traces every skeleton arc between junctions.

use crate::geometry::PixelPoint;

use super::arc::{Arc, ArcStore};
use super::classify::ArcClassifier;
use super::skeleton::{dir_between, step, Cell, SkeletonGrid, ALL_DIRS, SCANS};

/// Outcome of one tracing step.
enum Move {
    /// Moved to the next arc pixel.
    Continue(PixelPoint),
    /// Stopped on a junction.
    Switch,
    /// Dead end, or back on traced pixels.
    End,
}

pub(crate) struct ArcRetriever<'g, 'c> {
    grid: &'g mut SkeletonGrid,
    store: &'g mut ArcStore,
    classifier: ArcClassifier<'c>,
    /// Heading of the last move, 0 if none.
    last_dir: usize,
}

impl<'g, 'c> ArcRetriever<'g, 'c> {
    pub fn new(
        grid: &'g mut SkeletonGrid,
        store: &'g mut ArcStore,
        classifier: ArcClassifier<'c>,
    ) -> Self {
        Self {
            grid,
            store,
            classifier,
            last_dir: 0,
        }
    }

    /// Trace all arcs, column by column.
    pub fn scan_image(&mut self) {
        for x in 0..self.grid.width() {
            for y in 0..self.grid.height() {
                let p = PixelPoint::new(x, y);
                if self.grid.get(p) == Cell::Arc {
                    self.scan_arc(p, None, 0);
                }
                if let Cell::Junction(_) = self.grid.get(p) {
                    self.scan_junction(p);
                }
            }
        }
    }

    /// Trace the arc containing `p`, both ways unless it starts from a junction.
    fn scan_arc(&mut self, p: PixelPoint, start_junction: Option<PixelPoint>, last_dir: usize) {
        let mut arc = Arc::new(self.store.next_id(), start_junction);
        self.add_point(&mut arc, p, false);
        self.walk_along(&mut arc, p, false, last_dir);

        if start_junction.is_none() {
            let dir = match (arc.points.get(1), arc.stop_junction) {
                (Some(&second), _) => dir_between(second, arc.points[0]),
                (None, Some(stop)) => dir_between(stop, arc.points[0]),
                (None, None) => 0,
            };
            self.walk_along(&mut arc, p, true, dir);
        }

        arc.check_orientation();
        let (shape, circle) = self.classifier.determine_shape(&arc.points);
        arc.shape = shape;
        arc.circle = circle;

        if !shape.is_slur_relevant() {
            self.hide(&arc);
        }
        tracing::trace!("{} {:?} {} points", arc.id, shape, arc.len());
        self.store.push(arc);
    }

    /// Trace every arc departing from junction `j`.
    fn scan_junction(&mut self, j: PixelPoint) {
        self.grid.set(j, Cell::JunctionDone);

        for dir in ALL_DIRS {
            let n = step(j, dir);
            if self.grid.get(n) == Cell::Arc {
                self.scan_arc(n, Some(j), dir);
            }
            // Touching junction: link both with a bridge.
            if let Cell::Junction(_) = self.grid.get(n) {
                let bridge = Arc::bridge(self.store.next_id(), j, n);
                self.store.push(bridge);
            }
        }
    }

    fn add_point(&mut self, arc: &mut Arc, p: PixelPoint, reverse: bool) {
        if reverse {
            arc.points.insert(0, p);
        } else {
            arc.points.push(p);
        }
        self.grid.set(p, Cell::Processed);
    }

    fn walk_along(&mut self, arc: &mut Arc, start: PixelPoint, reverse: bool, last_dir: usize) {
        self.last_dir = last_dir;
        let mut current = start;
        while let Move::Continue(next) = self.step_from(arc, current, reverse) {
            self.add_point(arc, next, reverse);
            current = next;
        }
    }

    /// Move one pixel further. Junctions within reach stop the arc.
    fn step_from(&mut self, arc: &mut Arc, p: PixelPoint, reverse: bool) -> Move {
        let scans = SCANS[self.last_dir];

        for &dir in scans {
            let n = step(p, dir);
            if self.grid.get(n).is_junction() {
                arc.set_junction(n, reverse);
                self.last_dir = dir;
                return Move::Switch;
            }
        }

        for &dir in scans {
            let n = step(p, dir);
            if self.grid.get(n) == Cell::Arc {
                self.last_dir = dir;
                return Move::Continue(n);
            }
        }

        Move::End
    }

    /// Mark the interior of a discarded arc.
    fn hide(&mut self, arc: &Arc) {
        let n = arc.points.len();
        for &p in arc.points.iter().take(n.saturating_sub(1)).skip(1) {
            self.grid.set(p, Cell::Hidden);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;
    use crate::scale::Scale;
    use crate::sheet::{Skew, StaffManager};
    use crate::slurs::arc::ArcShape;
    use crate::slurs::config::{SlursConfig, SlursParams};
    use crate::test_utils::{arc_skeleton_points, draw_points};

    fn retrieve(points: &[PixelPoint], w: u32, h: u32) -> (SkeletonGrid, ArcStore) {
        let img = draw_points(w, h, points);
        let mut grid = SkeletonGrid::from_source(&img);
        let mut store = ArcStore::new();
        let params = SlursParams::new(&SlursConfig::default(), Scale::new(20, 3));
        let staves = StaffManager::default();
        let classifier = ArcClassifier {
            params: &params,
            staves: &staves,
            skew: Skew::default(),
        };
        ArcRetriever::new(&mut grid, &mut store, classifier).scan_image();
        (grid, store)
    }

    #[test]
    fn lone_semicircle_is_one_slur_arc() {
        let points = arc_skeleton_points([100.0, 100.0], 40.0, PI, 2.0 * PI);
        let (grid, store) = retrieve(&points, 200, 200);

        assert_eq!(store.len(), 1);
        let arc = store.iter().next().unwrap();
        assert_eq!(arc.shape, ArcShape::Slur);
        assert_eq!(arc.len(), points.len());
        assert_eq!(arc.end(true), Some(PixelPoint::new(60, 100)));
        assert_eq!(arc.end(false), Some(PixelPoint::new(140, 100)));
        assert!(arc.junctions().next().is_none());
        assert!(grid.junctions().is_empty());
    }

    #[test]
    fn crossing_stroke_splits_arcs_at_its_junction() {
        let mut points = arc_skeleton_points([100.0, 100.0], 40.0, PI, 2.0 * PI);
        points.extend((20..=100).map(|y| PixelPoint::new(100, y)));
        let (grid, store) = retrieve(&points, 200, 200);

        let junction = PixelPoint::new(100, 60);
        assert_eq!(grid.junctions(), vec![junction]);
        assert_eq!(grid.get(junction), Cell::JunctionDone);

        let histo = store.shape_histogram();
        assert_eq!(histo.get(&ArcShape::Slur), Some(&2));
        assert_eq!(histo.get(&ArcShape::Irrelevant), Some(&2));

        // The vertical stubs are hidden and not indexed.
        assert_eq!(grid.get(PixelPoint::new(100, 40)), Cell::Hidden);
        assert!(store.arc_at(PixelPoint::new(100, 20)).is_none());
        assert_eq!(store.arcs_at_junction(junction).len(), 2);
    }

    #[test]
    fn every_relevant_arc_is_found_from_both_ends() {
        let mut points = arc_skeleton_points([100.0, 100.0], 40.0, PI, 2.0 * PI);
        points.extend((20..=100).map(|y| PixelPoint::new(100, y)));
        points.extend(arc_skeleton_points([300.0, 120.0], 50.0, 1.1 * PI, 1.9 * PI));
        let (_, store) = retrieve(&points, 400, 200);

        let relevant: Vec<&Arc> = store
            .iter()
            .filter(|a| a.shape.is_slur_relevant() && !a.is_empty())
            .collect();
        assert!(relevant.len() >= 3);
        for arc in relevant {
            let first = store.arc_at(arc.end(true).unwrap()).map(|a| a.id);
            let last = store.arc_at(arc.end(false).unwrap()).map(|a| a.id);
            assert_eq!(first, Some(arc.id));
            assert_eq!(last, Some(arc.id));
        }
    }

    #[test]
    fn touching_junctions_are_bridged() {
        // Two diagonal neighbors, each with two branches of its own.
        let a = PixelPoint::new(30, 30);
        let b = PixelPoint::new(31, 31);
        let mut points = vec![a, b];
        for i in 0..10 {
            points.push(PixelPoint::new(20 + i, 30));
            points.push(PixelPoint::new(30, 20 + i));
            points.push(PixelPoint::new(32 + i, 31));
            points.push(PixelPoint::new(31, 32 + i));
        }
        let (grid, store) = retrieve(&points, 60, 60);

        assert_eq!(grid.junctions(), vec![a, b]);
        let bridges: Vec<&Arc> = store.iter().filter(|arc| arc.is_bridge()).collect();
        assert_eq!(bridges.len(), 1);
        assert_eq!(bridges[0].start_junction, Some(a));
        assert_eq!(bridges[0].stop_junction, Some(b));
        assert_eq!(bridges[0].shape, ArcShape::Short);

        // Bridge plus two short branches on each junction.
        assert_eq!(store.arcs_at_junction(a).len(), 3);
        assert_eq!(store.arcs_at_junction(b).len(), 3);
        assert!(store.arcs_at_junction(a).contains(&bridges[0].id));
    }

    #[test]
    fn diagonal_crossing_splits_into_four_arcs() {
        let center = PixelPoint::new(20, 20);
        let mut points = vec![center];
        for i in 1..=6 {
            points.push(PixelPoint::new(20 - i, 20 - i));
            points.push(PixelPoint::new(20 + i, 20 + i));
            points.push(PixelPoint::new(20 - i, 20 + i));
            points.push(PixelPoint::new(20 + i, 20 - i));
        }
        let (grid, store) = retrieve(&points, 40, 40);

        assert_eq!(grid.get(center), Cell::JunctionDone);
        assert_eq!(store.len(), 4);
        assert_eq!(store.arcs_at_junction(center).len(), 4);
        assert!(store.iter().all(|arc| arc.len() == 6 && arc.junctions().count() == 1));
    }
}
