//! Sheet-level glue.
//!
//! Wires the stages together for one sheet:
//! - `detect_bars`: rough pass -> systems -> precise pass -> placement
//! - `detect_slurs`: junctions -> arc retrieval -> slur assembly
//!
//! Algorithms live in `crate::bars` and `crate::slurs`; this layer only
//! fixes the call order and collects serializable reports.

mod result;
mod run;

pub use result::{BarsReport, RejectedStick, SlurSummary, SlursReport};
pub use run::{detect_bars, detect_slurs};
