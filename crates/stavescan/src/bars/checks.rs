//! The ordered bar-check suite.
//!
//! Order matters: `Top` and `Bottom` record the anchored staves that
//! `Anchor` reads. Areas and thickness are resolved when the context is
//! built, so every check may read them.

use crate::check::{Check, CheckSuite, Failure, Polarity};
use crate::scale::Scale;
use crate::sheet::{HorizontalSide, PixelSource, Skew, StaffManager};

use super::config::BarChecksConfig;
use super::context::BarContext;

/// Stick axis too far from the sheet vertical.
pub const NOT_VERTICAL: Failure = Failure("Bar-NotVertical");
/// Stick on the left or right of the staff area.
pub const OUTSIDE_STAFF_WIDTH: Failure = Failure("Bar-OutsideStaffWidth");
/// Stick shorter than the staves it spans.
pub const TOO_SHORT_BAR: Failure = Failure("Bar-TooShort");
/// Stick too curved.
pub const NOT_STRAIGHT: Failure = Failure("Bar-NotStraight");
/// Large chunk stuck at the top (a note head?).
pub const CHUNK_AT_TOP: Failure = Failure("Bar-ChunkAtTop");
/// Large chunk stuck at the bottom (a note head?).
pub const CHUNK_AT_BOTTOM: Failure = Failure("Bar-ChunkAtBottom");
/// No end (no pair of ends for a thick bar) aligned with a staff.
pub const NOT_STAFF_ANCHORED: Failure = Failure("Bar-NotStaffAnchored");
/// Bar goes lower than its system.
pub const NOT_WITHIN_SYSTEM: Failure = Failure("Bar-NotWithinSystem");

/// Which pass a suite serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckMode {
    /// Before systems are known.
    Rough,
    /// Once systems are known.
    Precise,
}

/// Sheet data shared by all checks of a suite.
#[derive(Clone, Copy)]
pub(crate) struct SheetEnv<'a> {
    pub staves: &'a StaffManager,
    pub pixels: Option<&'a dyn PixelSource>,
    pub scale: Scale,
    pub skew: Skew,
    /// Chunk window width, in pixels.
    pub chunk_width: i32,
    /// Chunk window half height, in pixels.
    pub chunk_height: i32,
}

#[derive(Clone, Copy)]
enum End {
    Top,
    Bottom,
}

impl SheetEnv<'_> {
    /// Minimum over spanned staves of `f(staff)`.
    fn min_over_areas(
        &self,
        ctx: &BarContext,
        f: impl Fn(&crate::sheet::Staff) -> f64,
    ) -> f64 {
        ctx.areas()
            .filter_map(|i| self.staves.get(i))
            .map(f)
            .fold(f64::INFINITY, f64::min)
    }

    /// Ratio of alien foreground pixels in the window beside one stick end.
    ///
    /// Pixels within half the mean stick width from the stick axis belong to
    /// the stick itself and are not counted.
    fn chunk_ratio(&self, ctx: &BarContext, end: End, side: HorizontalSide) -> f64 {
        let Some(pixels) = self.pixels else {
            return 0.0;
        };

        let stick = &ctx.stick;
        let p = match end {
            End::Top => stick.start,
            End::Bottom => stick.stop,
        };
        let (w, h) = (self.chunk_width.max(1), self.chunk_height.max(1));
        let half = 0.5 * stick.mean_width();
        let reach = w + half.ceil() as i32;
        let cx = p[0].round() as i32;
        let cy = p[1].round() as i32;
        let (x0, x1) = match side {
            HorizontalSide::Left => (cx - reach, cx),
            HorizontalSide::Right => (cx + 1, cx + reach + 1),
        };

        let aliens = pixels.count_foreground(x0, cy - h, x1, cy + h, &|x, y| {
            (f64::from(x) - stick.x_at(f64::from(y))).abs() > half
        });
        aliens as f64 / f64::from(2 * w * h)
    }

    /// Distance from one end to the closest line of its staff.
    fn inter_distance(&self, ctx: &BarContext, end: End) -> f64 {
        let (p, area) = match end {
            End::Top => (ctx.stick.start, ctx.top_area),
            End::Bottom => (ctx.stick.stop, ctx.bottom_area),
        };
        let dy = self
            .staves
            .get(area)
            .map_or(f64::INFINITY, |s| s.closest_line(p).2);
        self.scale.pixels_to_frac(dy)
    }

    /// Distance from one end to the matching border line of its staff.
    fn shift_distance(&self, ctx: &BarContext, end: End) -> f64 {
        let dy = match end {
            End::Top => {
                let p = ctx.stick.start;
                self.staves
                    .get(ctx.top_area)
                    .map_or(f64::INFINITY, |s| (s.first_line().y_at(p[0]) - p[1]).abs())
            }
            End::Bottom => {
                let p = ctx.stick.stop;
                self.staves
                    .get(ctx.bottom_area)
                    .map_or(f64::INFINITY, |s| (s.last_line().y_at(p[0]) - p[1]).abs())
            }
        };
        self.scale.pixels_to_frac(dy)
    }
}

/// Build the suite of one pass.
pub(crate) fn bar_suite<'a>(
    env: SheetEnv<'a>,
    cfg: &BarChecksConfig,
    min_grade: f64,
    mode: CheckMode,
) -> CheckSuite<'a, BarContext> {
    let rough = mode == CheckMode::Rough;
    let name = if rough { "RoughBar" } else { "Bar" };
    let mut suite = CheckSuite::new(name, min_grade);

    suite.add(
        1.0,
        Check::new(
            "Vertical",
            "Check that stick follows the sheet vertical (dx/dy)",
            cfg.vertical.low,
            cfg.vertical.high,
            Polarity::Contravariant,
            Some(NOT_VERTICAL),
            move |ctx: &mut BarContext| (ctx.stick.inverted_slope() + env.skew.slope).abs(),
        ),
    );

    suite.add(
        1.0,
        Check::new(
            "Left",
            "Check that stick is on the right of staff beginning (interline)",
            cfg.side.low,
            cfg.side.high,
            Polarity::Covariant,
            Some(OUTSIDE_STAFF_WIDTH),
            move |ctx: &mut BarContext| {
                let x = ctx.stick.mid_x();
                let dist = env.min_over_areas(ctx, |s| x - s.abscissa(HorizontalSide::Left));
                env.scale.pixels_to_frac(dist)
            },
        ),
    );

    suite.add(
        1.0,
        Check::new(
            "Right",
            "Check that stick is on the left of staff ending (interline)",
            cfg.side.low,
            cfg.side.high,
            Polarity::Covariant,
            Some(OUTSIDE_STAFF_WIDTH),
            move |ctx: &mut BarContext| {
                let x = ctx.stick.mid_x();
                let dist = env.min_over_areas(ctx, |s| s.abscissa(HorizontalSide::Right) - x);
                env.scale.pixels_to_frac(dist)
            },
        ),
    );

    suite.add(
        1.0,
        Check::new(
            "HeightDiff",
            "Check that stick is as long as staff height (interline)",
            cfg.height_diff.low,
            cfg.height_diff.high,
            Polarity::Covariant,
            Some(TOO_SHORT_BAR),
            move |ctx: &mut BarContext| {
                let height = env.min_over_areas(ctx, |s| s.height());
                env.scale.pixels_to_frac(ctx.stick.length() - height)
            },
        ),
    );

    let straight = cfg.radius.high;
    suite.add(
        1.0,
        Check::new(
            "Radius",
            "Check that stick is straight enough (interline)",
            cfg.radius.low,
            cfg.radius.high,
            Polarity::Covariant,
            Some(NOT_STRAIGHT),
            move |ctx: &mut BarContext| {
                ctx.stick
                    .mean_radius
                    .map_or(straight, |r| env.scale.pixels_to_frac(r))
            },
        ),
    );

    let chunks = [
        ("TLChunk", "Check for no chunk at top left", End::Top, HorizontalSide::Left),
        ("TRChunk", "Check for no chunk at top right", End::Top, HorizontalSide::Right),
        ("BLChunk", "Check for no chunk at bottom left", End::Bottom, HorizontalSide::Left),
        ("BRChunk", "Check for no chunk at bottom right", End::Bottom, HorizontalSide::Right),
    ];
    for (name, description, end, side) in chunks {
        let failure = match end {
            End::Top => CHUNK_AT_TOP,
            End::Bottom => CHUNK_AT_BOTTOM,
        };
        suite.add(
            1.0,
            Check::new(
                name,
                description,
                cfg.chunk_ratio.low,
                cfg.chunk_ratio.high,
                Polarity::Contravariant,
                Some(failure),
                move |ctx: &mut BarContext| env.chunk_ratio(ctx, end, side),
            ),
        );
    }

    suite.add(
        1.0,
        Check::new(
            "TopInter",
            "Check that top end is close to a staff line (interline)",
            cfg.inter.low,
            cfg.inter.high,
            Polarity::Contravariant,
            None,
            move |ctx: &mut BarContext| env.inter_distance(ctx, End::Top),
        ),
    );

    suite.add(
        1.0,
        Check::new(
            "BottomInter",
            "Check that bottom end is close to a staff line (interline)",
            cfg.inter.low,
            cfg.inter.high,
            Polarity::Contravariant,
            None,
            move |ctx: &mut BarContext| env.inter_distance(ctx, End::Bottom),
        ),
    );

    // Anchors are recorded in both modes; the rough pass does not grade long
    // sticks against a single staff.
    let anchor = cfg.staff_shift.low;
    let top = Check::new(
        "Top",
        "Check that top of stick is close to top of staff (interline)",
        cfg.staff_shift.low,
        cfg.staff_shift.high,
        Polarity::Contravariant,
        None,
        move |ctx: &mut BarContext| {
            let dy = env.shift_distance(ctx, End::Top);
            if dy <= anchor {
                ctx.top_staff = Some(ctx.top_area);
            }
            dy
        },
    );
    let bottom = Check::new(
        "Bottom",
        "Check that bottom of stick is close to bottom of staff (interline)",
        cfg.staff_shift.low,
        cfg.staff_shift.high,
        Polarity::Contravariant,
        None,
        move |ctx: &mut BarContext| {
            let dy = env.shift_distance(ctx, End::Bottom);
            if dy <= anchor {
                ctx.bot_staff = Some(ctx.bottom_area);
            }
            dy
        },
    );
    if rough {
        suite.add(1.0, top.skipped_when(|ctx: &BarContext| ctx.is_long));
        suite.add(1.0, bottom.skipped_when(|ctx: &BarContext| ctx.is_long));
    } else {
        suite.add(1.0, top);
        suite.add(1.0, bottom);
    }

    suite.add(
        1.0,
        Check::boolean(
            "Anchor",
            "Check that thick bars are top and bottom aligned with staff",
            Some(NOT_STAFF_ANCHORED),
            move |ctx: &mut BarContext| {
                let anchored = if rough && ctx.is_long {
                    true
                } else if ctx.is_thick {
                    ctx.top_staff.is_some() && ctx.bot_staff.is_some()
                } else {
                    ctx.top_staff.is_some() || ctx.bot_staff.is_some()
                };
                if anchored {
                    1.0
                } else {
                    0.0
                }
            },
        ),
    );

    suite
}
