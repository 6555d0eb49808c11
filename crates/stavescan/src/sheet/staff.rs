//! Staves, staff lines and the staff lookup by location.

/// Left or right side of a staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalSide {
    Left,
    Right,
}

/// One staff line, as a polyline sorted by abscissa.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<[f64; 2]>", into = "Vec<[f64; 2]>")]
pub struct StaffLine {
    points: Vec<[f64; 2]>,
}

impl TryFrom<Vec<[f64; 2]>> for StaffLine {
    type Error = String;

    fn try_from(points: Vec<[f64; 2]>) -> Result<Self, Self::Error> {
        StaffLine::new(points).ok_or_else(|| "a staff line needs finite points".to_string())
    }
}

impl From<StaffLine> for Vec<[f64; 2]> {
    fn from(line: StaffLine) -> Self {
        line.points
    }
}

impl StaffLine {
    /// Build a line from its defining points (at least one).
    pub fn new(mut points: Vec<[f64; 2]>) -> Option<Self> {
        let finite = points.iter().all(|p| p[0].is_finite() && p[1].is_finite());
        if points.is_empty() || !finite {
            return None;
        }
        points.sort_by(|a, b| a[0].total_cmp(&b[0]));
        Some(Self { points })
    }

    /// Straight line between two points.
    pub fn straight(left: [f64; 2], right: [f64; 2]) -> Option<Self> {
        Self::new(vec![left, right])
    }

    /// Defining points, sorted by abscissa.
    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    /// Ordinate at abscissa `x`.
    ///
    /// Linear interpolation between defining points; the end segments are
    /// extended beyond the first and last points.
    pub fn y_at(&self, x: f64) -> f64 {
        let pts = &self.points;
        if pts.len() == 1 {
            return pts[0][1];
        }

        // Segment [i, i + 1] whose right end is the first point past `x`.
        let last = pts.len() - 2;
        let i = pts[1..]
            .iter()
            .position(|p| p[0] > x)
            .unwrap_or(last)
            .min(last);

        let (a, b) = (pts[i], pts[i + 1]);
        let dx = b[0] - a[0];
        if dx.abs() < 1e-12 {
            return 0.5 * (a[1] + b[1]);
        }
        a[1] + (x - a[0]) * (b[1] - a[1]) / dx
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct StaffSpec {
    left: f64,
    right: f64,
    lines: Vec<StaffLine>,
}

/// One staff: its horizontal extent and its lines, top to bottom.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "StaffSpec", into = "StaffSpec")]
pub struct Staff {
    left: f64,
    right: f64,
    lines: Vec<StaffLine>,
}

impl TryFrom<StaffSpec> for Staff {
    type Error = String;

    fn try_from(spec: StaffSpec) -> Result<Self, Self::Error> {
        Staff::new(spec.left, spec.right, spec.lines)
    }
}

impl From<Staff> for StaffSpec {
    fn from(staff: Staff) -> Self {
        Self {
            left: staff.left,
            right: staff.right,
            lines: staff.lines,
        }
    }
}

impl Staff {
    /// Build a staff. Lines are reordered top to bottom.
    pub fn new(left: f64, right: f64, mut lines: Vec<StaffLine>) -> Result<Self, String> {
        if lines.is_empty() {
            return Err("a staff needs at least one line".to_string());
        }
        if !left.is_finite() || !right.is_finite() || left >= right {
            return Err(format!("invalid staff abscissa range [{}, {}]", left, right));
        }

        let mid = 0.5 * (left + right);
        lines.sort_by(|a, b| a.y_at(mid).total_cmp(&b.y_at(mid)));
        Ok(Self { left, right, lines })
    }

    /// Staff of `count` straight horizontal lines, the first at `top`.
    pub fn regular(
        left: f64,
        right: f64,
        top: f64,
        interline: f64,
        count: usize,
    ) -> Result<Self, String> {
        let lines = (0..count)
            .filter_map(|i| {
                let y = top + interline * i as f64;
                StaffLine::straight([left, y], [right, y])
            })
            .collect();
        Self::new(left, right, lines)
    }

    /// Lines, top to bottom.
    pub fn lines(&self) -> &[StaffLine] {
        &self.lines
    }

    /// Top line.
    pub fn first_line(&self) -> &StaffLine {
        &self.lines[0]
    }

    /// Bottom line.
    pub fn last_line(&self) -> &StaffLine {
        &self.lines[self.lines.len() - 1]
    }

    /// Abscissa of the staff left or right edge.
    pub fn abscissa(&self, side: HorizontalSide) -> f64 {
        match side {
            HorizontalSide::Left => self.left,
            HorizontalSide::Right => self.right,
        }
    }

    /// Abscissa of the staff middle.
    pub fn mid_x(&self) -> f64 {
        0.5 * (self.left + self.right)
    }

    /// Vertical distance from first to last line, at the staff middle.
    pub fn height(&self) -> f64 {
        let x = self.mid_x();
        self.last_line().y_at(x) - self.first_line().y_at(x)
    }

    /// Ordinate of the staff middle at abscissa `x`.
    pub fn mid_y_at(&self, x: f64) -> f64 {
        0.5 * (self.first_line().y_at(x) + self.last_line().y_at(x))
    }

    /// Line closest to `p` (vertically), with its index and distance.
    pub fn closest_line(&self, p: [f64; 2]) -> (usize, &StaffLine, f64) {
        let mut best = (0, &self.lines[0], f64::INFINITY);
        for (i, line) in self.lines.iter().enumerate() {
            let dy = (line.y_at(p[0]) - p[1]).abs();
            if dy < best.2 {
                best = (i, line, dy);
            }
        }
        best
    }
}

/// All the staves of a sheet, top to bottom.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "Vec<Staff>", into = "Vec<Staff>")]
pub struct StaffManager {
    staves: Vec<Staff>,
}

impl From<Vec<Staff>> for StaffManager {
    fn from(staves: Vec<Staff>) -> Self {
        Self::new(staves)
    }
}

impl From<StaffManager> for Vec<Staff> {
    fn from(manager: StaffManager) -> Self {
        manager.staves
    }
}

impl StaffManager {
    /// Wrap staves, reordering them top to bottom.
    pub fn new(mut staves: Vec<Staff>) -> Self {
        staves.sort_by(|a, b| a.mid_y_at(a.mid_x()).total_cmp(&b.mid_y_at(b.mid_x())));
        Self { staves }
    }

    /// Number of staves.
    pub fn len(&self) -> usize {
        self.staves.len()
    }

    /// True when the sheet has no staff.
    pub fn is_empty(&self) -> bool {
        self.staves.is_empty()
    }

    /// Staff by index.
    pub fn get(&self, index: usize) -> Option<&Staff> {
        self.staves.get(index)
    }

    /// Staves, top to bottom.
    pub fn staves(&self) -> &[Staff] {
        &self.staves
    }

    /// Index of the staff whose area contains `p`.
    ///
    /// Areas tile the sheet vertically: the border between two consecutive
    /// staves lies halfway between the last line of the upper one and the
    /// first line of the lower one, measured at `p`'s abscissa. The first and
    /// last areas extend to the sheet borders.
    pub fn staff_index_at(&self, p: [f64; 2]) -> Option<usize> {
        if self.staves.is_empty() {
            return None;
        }

        for (i, pair) in self.staves.windows(2).enumerate() {
            let upper = pair[0].last_line().y_at(p[0]);
            let lower = pair[1].first_line().y_at(p[0]);
            let border = 0.5 * (upper + lower);
            if p[1] < border {
                return Some(i);
            }
        }
        Some(self.staves.len() - 1)
    }

    /// Staff whose area contains `p`.
    pub fn staff_at(&self, p: [f64; 2]) -> Option<&Staff> {
        self.staff_index_at(p).and_then(|i| self.staves.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn manager() -> StaffManager {
        StaffManager::new(vec![
            Staff::regular(100.0, 900.0, 300.0, 20.0, 5).unwrap(),
            Staff::regular(100.0, 900.0, 100.0, 20.0, 5).unwrap(),
        ])
    }

    #[test]
    fn polyline_interpolates_and_extends() {
        let line = StaffLine::new(vec![[100.0, 50.0], [0.0, 40.0], [200.0, 50.0]]).unwrap();
        assert_relative_eq!(line.y_at(50.0), 45.0);
        assert_relative_eq!(line.y_at(150.0), 50.0);
        assert_relative_eq!(line.y_at(-100.0), 30.0);
        assert_relative_eq!(line.y_at(300.0), 50.0);
    }

    #[test]
    fn staff_height_and_closest_line() {
        let staff = Staff::regular(0.0, 500.0, 100.0, 20.0, 5).unwrap();
        assert_relative_eq!(staff.height(), 80.0);
        let (idx, _, dy) = staff.closest_line([250.0, 143.0]);
        assert_eq!(idx, 2);
        assert_relative_eq!(dy, 3.0);
        assert_relative_eq!(staff.abscissa(HorizontalSide::Right), 500.0);
    }

    #[test]
    fn staves_are_sorted_and_areas_split_halfway() {
        let staves = manager();
        assert_relative_eq!(staves.get(0).unwrap().first_line().y_at(0.0), 100.0);
        // Border between 180 (last line of #0) and 300 (first line of #1).
        assert_eq!(staves.staff_index_at([500.0, 239.0]), Some(0));
        assert_eq!(staves.staff_index_at([500.0, 241.0]), Some(1));
        assert_eq!(staves.staff_index_at([500.0, -50.0]), Some(0));
        assert_eq!(staves.staff_index_at([500.0, 5000.0]), Some(1));
        assert_eq!(StaffManager::default().staff_index_at([0.0, 0.0]), None);
    }

    #[test]
    fn invalid_staves_are_refused() {
        assert!(Staff::new(0.0, 10.0, vec![]).is_err());
        assert!(Staff::regular(10.0, 0.0, 0.0, 20.0, 5).is_err());
        assert!(StaffLine::new(vec![]).is_none());
    }
}
