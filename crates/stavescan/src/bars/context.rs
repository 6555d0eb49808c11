//! Per-stick scratch record shared by the bar checks.

use crate::check::{Checkable, Failure};
use crate::sheet::{StaffManager, Stick};

/// Mutable record of one stick during a suite pass.
///
/// Areas and thickness are known when the context is built. Staff anchors
/// are filled by the `Top` and `Bottom` checks and read by `Anchor`.
#[derive(Debug, Clone)]
pub struct BarContext {
    /// Copy of the candidate.
    pub stick: Stick,
    /// Index of the staff area containing the top end.
    pub top_area: usize,
    /// Index of the staff area containing the bottom end.
    pub bottom_area: usize,
    /// The stick spans more than one staff area.
    pub is_long: bool,
    /// Mean width above the thin-bar limit.
    pub is_thick: bool,
    /// Staff anchored by the top end.
    pub top_staff: Option<usize>,
    /// Staff anchored by the bottom end.
    pub bot_staff: Option<usize>,
    /// First failure raised during the pass.
    pub failure: Option<Failure>,
}

impl BarContext {
    /// Build the context of `stick`. `None` when the sheet has no staff.
    pub fn new(stick: &Stick, staves: &StaffManager, max_thin_width_px: f64) -> Option<Self> {
        let top_area = staves.staff_index_at(stick.start)?;
        let bottom_area = staves.staff_index_at(stick.stop)?.max(top_area);

        Some(Self {
            stick: stick.clone(),
            top_area,
            bottom_area,
            is_long: bottom_area > top_area,
            is_thick: is_thick(stick, max_thin_width_px),
            top_staff: None,
            bot_staff: None,
            failure: None,
        })
    }

    /// Staff areas spanned by the stick.
    pub fn areas(&self) -> std::ops::RangeInclusive<usize> {
        self.top_area..=self.bottom_area
    }

    /// Both ends are anchored.
    pub fn is_part_defining(&self) -> bool {
        self.top_staff.is_some() && self.bot_staff.is_some()
    }
}

impl Checkable for BarContext {
    fn set_failure(&mut self, failure: Failure) {
        if self.failure.is_none() {
            self.failure = Some(failure);
        }
    }
}

/// Thick when the mean width exceeds the thin-bar limit.
///
/// Both widths are compared as floats. Neither side is rounded to whole
/// pixels, so a fractional excess already counts as thick.
pub(crate) fn is_thick(stick: &Stick, max_thin_width_px: f64) -> bool {
    stick.mean_width() > max_thin_width_px
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::Staff;

    fn staves() -> StaffManager {
        StaffManager::new(vec![
            Staff::regular(0.0, 1000.0, 100.0, 20.0, 5).unwrap(),
            Staff::regular(0.0, 1000.0, 300.0, 20.0, 5).unwrap(),
        ])
    }

    #[test]
    fn areas_are_resolved_up_front() {
        let stick = Stick::new(0, [500.0, 100.0], [500.0, 380.0], 840);
        let ctx = BarContext::new(&stick, &staves(), 6.0).unwrap();
        assert_eq!(ctx.areas(), 0..=1);
        assert!(ctx.is_long);
        assert!(!ctx.is_thick);
        assert!(!ctx.is_part_defining());
    }

    #[test]
    fn thickness_is_idempotent() {
        let stick = Stick::new(0, [500.0, 100.0], [500.0, 180.0], 640);
        assert!(is_thick(&stick, 6.0));
        assert_eq!(is_thick(&stick, 6.0), is_thick(&stick, 6.0));
        let ctx = BarContext::new(&stick, &staves(), 6.0).unwrap();
        assert!(ctx.is_thick);
        assert!(!ctx.is_long);
    }

    #[test]
    fn fractional_width_excess_is_thick() {
        // Mean width 6.4 px: thick against a 6 px limit, not against 6.5.
        let stick = Stick::new(0, [500.0, 100.0], [500.0, 200.0], 640);
        assert!(is_thick(&stick, 6.0));
        assert!(!is_thick(&stick, 6.5));
    }

    #[test]
    fn first_failure_wins() {
        let stick = Stick::new(0, [500.0, 100.0], [500.0, 180.0], 240);
        let mut ctx = BarContext::new(&stick, &staves(), 6.0).unwrap();
        ctx.set_failure(Failure("A"));
        ctx.set_failure(Failure("B"));
        assert_eq!(ctx.failure, Some(Failure("A")));
        assert!(BarContext::new(&stick, &StaffManager::default(), 6.0).is_none());
    }
}
