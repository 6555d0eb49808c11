//! Bar-line classification of vertical sticks.
//!
//! Sticks go through the same ordered check suite twice:
//!
//! 1. a **rough** pass, before systems are known, with wide tolerances. Its
//!    part-defining bars tell which staves are grouped into systems;
//! 2. a **precise** pass with tight tolerances, once systems are known.
//!
//! Accepted bars are finally sorted by abscissa and attached to the staves
//! of their system.

mod checker;
mod checks;
mod config;
mod context;
mod systems;

pub use checker::{BarVerdict, BarsChecker};
pub use checks::{
    CheckMode, CHUNK_AT_BOTTOM, CHUNK_AT_TOP, NOT_STAFF_ANCHORED, NOT_STRAIGHT, NOT_VERTICAL,
    NOT_WITHIN_SYSTEM, OUTSIDE_STAFF_WIDTH, TOO_SHORT_BAR,
};
pub use config::{BarChecksConfig, BarsConfig, Thresholds};
pub use context::BarContext;
pub use systems::{is_staff_embraced, place_bars, retrieve_systems, system_of, PlacedBar, SystemInfo};
