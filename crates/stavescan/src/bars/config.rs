//! Threshold tables of the bar-line checker.
//!
//! Distances are interline fractions, ratios are dimension-less. Pixel
//! values are derived once per sheet from the [`crate::Scale`].

/// Low and high bounds of one check.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Thresholds {
    pub low: f64,
    pub high: f64,
}

impl Thresholds {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

/// Thresholds of one bar-check profile (rough or precise).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BarChecksConfig {
    /// `|dx/dy + skew slope|` of the stick axis. Contravariant.
    pub vertical: Thresholds,
    /// Distance from the stick to the inner side of the staff left/right
    /// edges (interline). Covariant.
    pub side: Thresholds,
    /// Stick length minus the shortest spanned staff height (interline).
    /// Covariant.
    pub height_diff: Thresholds,
    /// Mean radius of curvature (interline). Covariant.
    pub radius: Thresholds,
    /// Ratio of alien pixels in a chunk window. Contravariant.
    pub chunk_ratio: Thresholds,
    /// Distance from a stick end to the closest line of its staff
    /// (interline). Contravariant.
    pub inter: Thresholds,
    /// Distance from the top (bottom) end to the first (last) staff line
    /// (interline). Contravariant. An end within `low` anchors the staff.
    pub staff_shift: Thresholds,
}

impl BarChecksConfig {
    /// Wide tolerances, used before systems are known.
    pub fn rough() -> Self {
        Self {
            vertical: Thresholds::new(0.1, 0.3),
            side: Thresholds::new(-0.5, -0.5),
            height_diff: Thresholds::new(-0.5, 0.0),
            radius: Thresholds::new(20.0, 40.0),
            chunk_ratio: Thresholds::new(0.4, 0.4),
            inter: Thresholds::new(1.0, 3.0),
            staff_shift: Thresholds::new(0.5, 10.0),
        }
    }

    /// Tight tolerances, used once systems are known.
    pub fn precise() -> Self {
        Self {
            vertical: Thresholds::new(0.05, 0.2),
            side: Thresholds::new(0.0, 0.0),
            height_diff: Thresholds::new(-0.125, 0.0),
            radius: Thresholds::new(25.0, 50.0),
            chunk_ratio: Thresholds::new(0.25, 0.25),
            inter: Thresholds::new(0.5, 2.0),
            staff_shift: Thresholds::new(0.3, 10.0),
        }
    }
}

/// Configuration of the bar-line checker.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BarsConfig {
    /// Profile of the first pass.
    pub rough: BarChecksConfig,
    /// Profile of the second pass.
    pub precise: BarChecksConfig,
    /// Minimum suite grade for acceptance.
    pub min_grade: f64,
    /// Maximum mean width of a thin bar (interline).
    pub max_thin_width: f64,
    /// Width of a chunk window beside a stick end (interline).
    pub chunk_width: f64,
    /// Half height of a chunk window around a stick end (interline).
    pub chunk_height: f64,
    /// Maximum distance a bar may extend below its system (interline).
    pub max_bar_offset: f64,
}

impl Default for BarsConfig {
    fn default() -> Self {
        Self {
            rough: BarChecksConfig::rough(),
            precise: BarChecksConfig::precise(),
            min_grade: 0.5,
            max_thin_width: 0.3,
            chunk_width: 0.33,
            chunk_height: 0.33,
            max_bar_offset: 1.0,
        }
    }
}
