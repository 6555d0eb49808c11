use crate::bars::{place_bars, retrieve_systems, BarsChecker, BarsConfig, CheckMode};
use crate::error::BarsError;
use crate::sheet::{PixelSource, SheetLayout};
use crate::slurs::{SlursBuilder, SlursConfig};

use super::result::{BarsReport, RejectedStick, SlursReport};

/// Classify the vertical sticks of a sheet into bar lines.
///
/// Runs the rough pass, groups staves into systems from its part-defining
/// bars, runs the precise pass and places the accepted bars. The layout is
/// not modified: the report carries the updated sticks.
///
/// `pixels` is the staff-free foreground image. Without it no chunk is ever
/// detected at stick ends.
pub fn detect_bars(
    layout: &SheetLayout,
    config: &BarsConfig,
    pixels: Option<&dyn PixelSource>,
) -> Result<BarsReport, BarsError> {
    let checker = BarsChecker::new(config, layout.scale, layout.skew, &layout.staves, pixels)?;
    let mut sticks = layout.sticks.clone();

    let rough = checker.check_candidates(&mut sticks, CheckMode::Rough);
    let systems = retrieve_systems(&rough, layout.staves.len())?;
    tracing::info!(
        "{} systems over {} staves",
        systems.len(),
        layout.staves.len()
    );

    let precise = checker.check_candidates(&mut sticks, CheckMode::Precise);
    let bars = place_bars(
        &mut sticks,
        &precise,
        &systems,
        &layout.staves,
        layout.scale,
        config.max_bar_offset,
    );

    let rejected = sticks
        .iter()
        .filter(|s| !s.is_bar())
        .map(|s| RejectedStick {
            stick_id: s.id,
            failure: s.failure,
        })
        .collect();

    Ok(BarsReport {
        rough,
        systems,
        precise,
        bars,
        rejected,
        sticks,
    })
}

/// Retrieve the slurs of a skeleton image.
///
/// `skeleton` is the one-pixel-wide skeleton of the staff-free foreground;
/// it is only read.
pub fn detect_slurs(
    layout: &SheetLayout,
    config: &SlursConfig,
    skeleton: &dyn PixelSource,
) -> SlursReport {
    let mut builder = SlursBuilder::new(
        config,
        layout.scale,
        layout.skew,
        &layout.staves,
        skeleton,
    );
    builder.build_slurs();
    SlursReport::from_builder(&builder)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;
    use crate::bars::NOT_VERTICAL;
    use crate::scale::Scale;
    use crate::sheet::{Skew, StaffManager, Stick};
    use crate::test_utils::{arc_skeleton_points, draw_points, three_staves};

    fn layout(staves: StaffManager, sticks: Vec<Stick>) -> SheetLayout {
        SheetLayout {
            scale: Scale::new(20, 3),
            skew: Skew::default(),
            staves,
            sticks,
        }
    }

    #[test]
    fn full_height_bars_form_one_system() {
        // Staves span y 100..180, 300..380, 500..580.
        let sticks = vec![
            Stick::new(1, [100.0, 100.0], [100.0, 580.0], 1440),
            Stick::new(2, [500.0, 100.0], [500.0, 580.0], 1440),
            Stick::new(3, [900.0, 100.0], [900.0, 580.0], 1440),
        ];
        let layout = layout(three_staves(), sticks);
        let report = detect_bars(&layout, &BarsConfig::default(), None).unwrap();

        assert_eq!(report.systems.len(), 1);
        assert_eq!(report.systems[0].staves(), 0..=2);
        assert_eq!(report.bar_count(), 3);
        let xs: Vec<f64> = report.bars.iter().map(|b| b.x).collect();
        assert_eq!(xs, vec![100.0, 500.0, 900.0]);
        assert!(report.bars.iter().all(|b| b.staves == vec![0, 1, 2]));
        assert!(report.rejected.is_empty());
        // The input layout keeps its untagged sticks.
        assert!(layout.sticks.iter().all(|s| s.shape.is_none()));
    }

    #[test]
    fn tilted_stick_is_reported_as_rejected() {
        let sticks = vec![
            Stick::new(1, [100.0, 100.0], [100.0, 580.0], 1440),
            Stick::new(2, [400.0, 100.0], [560.0, 580.0], 1440),
        ];
        let report =
            detect_bars(&layout(three_staves(), sticks), &BarsConfig::default(), None).unwrap();

        assert_eq!(report.bar_count(), 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].stick_id, 2);
        assert_eq!(report.rejected[0].failure, Some(NOT_VERTICAL));
    }

    #[test]
    fn sheet_without_staves_is_an_error() {
        let layout = layout(StaffManager::default(), Vec::new());
        let err = detect_bars(&layout, &BarsConfig::default(), None).unwrap_err();
        assert_eq!(err, BarsError::NoStaves);
    }

    #[test]
    fn slurs_report_summarizes_the_slur() {
        let points = arc_skeleton_points([400.0, 240.0], 40.0, PI, 2.0 * PI);
        let skeleton = draw_points(800, 700, &points);
        let report = detect_slurs(
            &layout(three_staves(), Vec::new()),
            &SlursConfig::default(),
            &skeleton,
        );

        assert_eq!(report.arc_count, 1);
        assert_eq!(report.junction_count, 0);
        assert_eq!(report.slurs.len(), 1);
        let slur = &report.slurs[0];
        assert_eq!(slur.point_count, points.len());
        assert_eq!(slur.first.x, 360);
        assert_eq!(slur.last.x, 440);
        assert!(slur.above);
        let [x0, y0] = slur.bezier[0];
        assert!((x0 - 360.0).hypot(y0 - 240.0) < 2.0);
    }
}
