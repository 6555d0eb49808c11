//! Slur retrieval from a curve skeleton.
//!
//! Two phases over a one-pixel-wide skeleton:
//!
//! 1. **Arc retrieval**: junctions (pixels with more than two neighbors)
//!    split the skeleton into arcs. Each arc is traced, oriented left to
//!    right and classified as short, slur, line, staff line or irrelevant.
//! 2. **Slur assembly**: every long `Slur` arc seeds a slur, which grows one
//!    junction at a time on both sides while the concatenated points still
//!    fit a circle. Competing extensions at a junction form a clump that
//!    keeps only its longest member.
//!
//! The skeleton itself is never modified: tracing state lives in a
//! [`SkeletonGrid`], arcs live in an [`ArcStore`] arena indexed by end
//! points and junctions.

mod arc;
mod builder;
mod classify;
mod config;
mod retriever;
mod skeleton;
mod slur;

pub use arc::{Arc, ArcId, ArcShape, ArcStore};
pub use builder::SlursBuilder;
pub use config::SlursConfig;
pub use skeleton::{
    Cell, SkeletonGrid, ARC_LEVEL, HIDDEN_LEVEL, JUNCTION_LEVEL, JUNCTION_PROCESSED_LEVEL,
    PROCESSED_LEVEL,
};
pub use slur::{Slur, SlurPart};
