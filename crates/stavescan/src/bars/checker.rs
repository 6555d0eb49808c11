use crate::check::{CheckSuite, Failure, SuiteResult};
use crate::error::BarsError;
use crate::scale::Scale;
use crate::sheet::{PixelSource, Shape, Skew, StaffManager, Stick, StickResult};

use super::checks::{bar_suite, CheckMode, SheetEnv};
use super::config::BarsConfig;
use super::context::{is_thick, BarContext};

/// Outcome of the bar suite on one stick.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct BarVerdict {
    pub stick_id: usize,
    pub mode: CheckMode,
    pub accepted: bool,
    /// Weighted suite grade.
    pub grade: f64,
    pub top_area: usize,
    pub bottom_area: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_staff: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_staff: Option<usize>,
    pub is_thick: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
    /// Per-check details.
    pub suite: SuiteResult,
}

impl BarVerdict {
    /// Accepted with both ends anchored.
    pub fn is_part_defining(&self) -> bool {
        self.accepted && self.top_staff.is_some() && self.bot_staff.is_some()
    }
}

/// Bar-line classifier over vertical sticks.
///
/// Holds one suite per pass; both share the same checks and differ only by
/// their thresholds.
pub struct BarsChecker<'a> {
    staves: &'a StaffManager,
    rough: CheckSuite<'a, BarContext>,
    precise: CheckSuite<'a, BarContext>,
    max_thin_width_px: f64,
}

impl<'a> BarsChecker<'a> {
    /// Prepare the checker of one sheet.
    ///
    /// `pixels` is the staff-free foreground used to look for chunks stuck to
    /// stick ends; without it the chunk checks always pass.
    pub fn new(
        config: &BarsConfig,
        scale: Scale,
        skew: Skew,
        staves: &'a StaffManager,
        pixels: Option<&'a dyn PixelSource>,
    ) -> Result<Self, BarsError> {
        if staves.is_empty() {
            return Err(BarsError::NoStaves);
        }

        let env = SheetEnv {
            staves,
            pixels,
            scale,
            skew,
            chunk_width: scale.to_pixels(config.chunk_width),
            chunk_height: scale.to_pixels(config.chunk_height),
        };

        let rough = bar_suite(env, &config.rough, config.min_grade, CheckMode::Rough);
        let precise = bar_suite(env, &config.precise, config.min_grade, CheckMode::Precise);
        tracing::trace!("{}", precise);

        Ok(Self {
            staves,
            rough,
            precise,
            max_thin_width_px: scale.to_pixels_f64(config.max_thin_width),
        })
    }

    /// Suite used by a pass, for diagnostics.
    pub fn suite(&self, mode: CheckMode) -> &CheckSuite<'a, BarContext> {
        match mode {
            CheckMode::Rough => &self.rough,
            CheckMode::Precise => &self.precise,
        }
    }

    /// True when the stick mean width exceeds the thin-bar limit.
    pub fn is_thick_bar(&self, stick: &Stick) -> bool {
        is_thick(stick, self.max_thin_width_px)
    }

    /// Fresh context for `stick`.
    pub fn context(&self, stick: &Stick) -> Option<BarContext> {
        BarContext::new(stick, self.staves, self.max_thin_width_px)
    }

    /// Run the suite of `mode` on every stick and update its tags.
    pub fn check_candidates(&self, sticks: &mut [Stick], mode: CheckMode) -> Vec<BarVerdict> {
        let verdicts: Vec<BarVerdict> = sticks
            .iter_mut()
            .filter_map(|stick| self.check_stick(stick, mode))
            .collect();

        let accepted = verdicts.iter().filter(|v| v.accepted).count();
        let defining = verdicts.iter().filter(|v| v.is_part_defining()).count();
        tracing::info!(
            "{:?} pass: {} bar lines found out of {} sticks ({} part-defining)",
            mode,
            accepted,
            sticks.len(),
            defining
        );
        verdicts
    }

    /// Run the suite of `mode` on one stick and update its tags.
    ///
    /// An accepted stick gets a bar shape (unless set by hand) and a result
    /// telling whether it defines a part. A rejected stick loses any bar
    /// shape it carried (unless set by hand) and records the failure.
    pub fn check_stick(&self, stick: &mut Stick, mode: CheckMode) -> Option<BarVerdict> {
        let mut ctx = self.context(stick)?;
        let suite = self.suite(mode);
        let result = suite.pass(&mut ctx);

        let manual = stick.manual && stick.shape.is_some();
        let accepted = result.accepts(suite.min_grade()) || manual;
        tracing::debug!(
            "stick #{} {:?} grade {:.3} top {:?} bottom {:?} => {}",
            stick.id,
            mode,
            result.grade,
            ctx.top_staff,
            ctx.bot_staff,
            if accepted { "bar" } else { "rejected" }
        );

        if accepted {
            if !stick.manual {
                stick.shape = Some(if ctx.is_thick {
                    Shape::ThickBarline
                } else {
                    Shape::ThinBarline
                });
            }
            stick.result = Some(if ctx.is_part_defining() {
                StickResult::PartDefining
            } else {
                StickResult::NotPartDefining
            });
            stick.failure = None;
        } else {
            if stick.is_bar() && !stick.manual {
                stick.shape = None;
            }
            stick.result = None;
            stick.failure = ctx.failure;
        }

        Some(BarVerdict {
            stick_id: stick.id,
            mode,
            accepted,
            grade: result.grade,
            top_area: ctx.top_area,
            bottom_area: ctx.bottom_area,
            top_staff: ctx.top_staff,
            bot_staff: ctx.bot_staff,
            is_thick: ctx.is_thick,
            failure: if accepted { None } else { ctx.failure },
            suite: result,
        })
    }
}

impl std::fmt::Debug for BarsChecker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarsChecker")
            .field("staves", &self.staves.len())
            .field("max_thin_width_px", &self.max_thin_width_px)
            .finish()
    }
}
