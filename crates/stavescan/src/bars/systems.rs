//! Systems derived from part-defining bars, and bar placement within them.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use crate::error::BarsError;
use crate::scale::Scale;
use crate::sheet::{Staff, StaffManager, Stick};

use super::checker::BarVerdict;
use super::checks::NOT_WITHIN_SYSTEM;

/// A group of consecutive staves played together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SystemInfo {
    /// 1-based system number, top to bottom.
    pub id: usize,
    /// Index of the first staff.
    pub start: usize,
    /// Index of the last staff.
    pub stop: usize,
}

impl SystemInfo {
    /// Staff indices of the system.
    pub fn staves(&self) -> RangeInclusive<usize> {
        self.start..=self.stop
    }

    /// Number of staves.
    pub fn staff_count(&self) -> usize {
        self.stop - self.start + 1
    }
}

/// A bar attached to the staves it embraces.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PlacedBar {
    pub stick_id: usize,
    /// Id of the containing system.
    pub system: usize,
    /// Abscissa of the bar middle.
    pub x: f64,
    /// Embraced staff indices.
    pub staves: Vec<usize>,
}

/// Group staves into systems.
///
/// Each staff is assigned to the first part-defining bar range covering it.
/// Consecutive staves sharing the same range start form one system.
pub fn retrieve_systems(
    verdicts: &[BarVerdict],
    staff_count: usize,
) -> Result<Vec<SystemInfo>, BarsError> {
    if staff_count == 0 {
        return Err(BarsError::NoStaves);
    }

    let mut starts: Vec<Option<usize>> = vec![None; staff_count];
    for v in verdicts.iter().filter(|v| v.is_part_defining()) {
        let (Some(top), Some(bot)) = (v.top_staff, v.bot_staff) else {
            continue;
        };
        for start in starts.iter_mut().take(bot + 1).skip(top) {
            start.get_or_insert(top);
        }
    }

    if let Some(staff) = starts.iter().position(Option::is_none) {
        tracing::warn!("no system found for staff #{}", staff);
        return Err(BarsError::NoSystemForStaff { staff });
    }

    let mut systems = Vec::new();
    let mut first = 0;
    for i in 1..=staff_count {
        if i == staff_count || starts[i] != starts[first] {
            systems.push(SystemInfo {
                id: systems.len() + 1,
                start: first,
                stop: i - 1,
            });
            first = i;
        }
    }

    tracing::info!("{} systems retrieved from {} staves", systems.len(), staff_count);
    Ok(systems)
}

/// The system a bar belongs to, from its anchored staves.
///
/// A missing anchor falls back on the other end.
pub fn system_of<'s>(verdict: &BarVerdict, systems: &'s [SystemInfo]) -> Option<&'s SystemInfo> {
    let top = verdict.top_staff.or(verdict.bot_staff)?;
    let bot = verdict.bot_staff.or(verdict.top_staff)?;
    systems.iter().find(|s| s.start <= bot && s.stop >= top)
}

/// True when the staff middle lies strictly within the stick vertical extent.
pub fn is_staff_embraced(staff: &Staff, stick: &Stick) -> bool {
    let mid = staff.mid_y_at(stick.mid_x());
    mid > stick.start[1] && mid < stick.stop[1]
}

/// Attach accepted bars to their system staves, left to right.
///
/// A bar stopping more than `max_bar_offset` (interline) below the last line
/// of its system is rejected with `Bar-NotWithinSystem`.
pub fn place_bars(
    sticks: &mut [Stick],
    verdicts: &[BarVerdict],
    systems: &[SystemInfo],
    staves: &StaffManager,
    scale: Scale,
    max_bar_offset: f64,
) -> Vec<PlacedBar> {
    let max_dy = scale.to_pixels_f64(max_bar_offset);
    let index: HashMap<usize, usize> = sticks
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id, i))
        .collect();

    let mut bars: Vec<(&BarVerdict, usize)> = verdicts
        .iter()
        .filter(|v| v.accepted)
        .filter_map(|v| index.get(&v.stick_id).map(|&i| (v, i)))
        .collect();
    bars.sort_by(|a, b| {
        sticks[a.1]
            .mid_x()
            .total_cmp(&sticks[b.1].mid_x())
            .then(a.0.stick_id.cmp(&b.0.stick_id))
    });

    let mut placed = Vec::new();
    for (verdict, i) in bars {
        let Some(system) = system_of(verdict, systems) else {
            tracing::warn!("bar #{} not belonging to any system", verdict.stick_id);
            continue;
        };

        let stick = &mut sticks[i];
        let x = stick.mid_x();
        let Some(last) = staves.get(system.stop) else {
            continue;
        };
        let bottom = last.last_line().y_at(x);
        if stick.stop[1] - bottom > max_dy {
            tracing::debug!("bar #{} stopping too low", stick.id);
            stick.failure = Some(NOT_WITHIN_SYSTEM);
            stick.result = None;
            if !stick.manual {
                stick.shape = None;
            }
            continue;
        }

        let stick = &*stick;
        let embraced: Vec<usize> = system
            .staves()
            .filter(|&s| staves.get(s).is_some_and(|staff| is_staff_embraced(staff, stick)))
            .collect();
        placed.push(PlacedBar {
            stick_id: stick.id,
            system: system.id,
            x,
            staves: embraced,
        });
    }

    let accepted = verdicts.iter().filter(|v| v.accepted).count();
    let dropped = accepted.saturating_sub(placed.len());
    if dropped > 0 {
        tracing::warn!("{} bars dropped during placement", dropped);
    }
    placed
}
