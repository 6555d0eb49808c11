//! stavescan: bar-line and slur stages of an optical music recognition
//! engine.
//!
//! Both stages work on a binarized sheet whose staves, skew and scale are
//! already known:
//!
//! 1. **Bars** – classify vertical sticks as bar lines with a weighted check
//!    suite, run twice: a rough pass to group staves into systems, then a
//!    precise pass. Accepted bars are attached to their system staves.
//! 2. **Slurs** – split a curve skeleton into arcs at its junctions, classify
//!    the arcs, then grow slurs from the long circular ones while the
//!    concatenated points still fit a circle.
//!
//! # Public API
//! - [`detect_bars`] and [`detect_slurs`] run one stage on a [`sheet::SheetLayout`]
//! - [`BarsConfig`] and [`SlursConfig`] for tuning, in interline units
//! - [`check`] for the generic weighted check engine
//! - stage internals ([`bars::BarsChecker`], [`SlursBuilder`]) for callers
//!   that drive the passes themselves

pub mod bars;
pub mod check;
mod error;
pub mod geometry;
mod pipeline;
mod scale;
pub mod sheet;
pub mod slurs;

pub use bars::{BarVerdict, BarsChecker, BarsConfig, PlacedBar, SystemInfo};
pub use check::{Check, CheckSuite, Failure, SuiteResult};
pub use error::BarsError;
pub use pipeline::{
    detect_bars, detect_slurs, BarsReport, RejectedStick, SlurSummary, SlursReport,
};
pub use scale::Scale;
pub use slurs::{ArcShape, Slur, SlursBuilder, SlursConfig};

#[cfg(test)]
pub(crate) mod test_utils;
