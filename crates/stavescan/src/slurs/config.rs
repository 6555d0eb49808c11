//! Threshold tables of the slur builder.
//!
//! Lengths are interline fractions, angles are degrees. [`SlursParams`]
//! holds their pixel/radian values for one sheet.

use crate::scale::Scale;

/// Configuration of skeleton arc classification and slur assembly.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SlursConfig {
    /// Arcs with fewer points are `Short` (interline).
    pub arc_min_quorum: f64,
    /// Minimum point count of a seed arc (interline).
    pub arc_min_seed_length: f64,
    /// Staff tracking is only tested from this arc length on (interline).
    pub min_staff_arc_length: f64,
    /// Staff-tracking arcs longer than this are irrelevant (interline).
    pub max_staff_arc_length: f64,
    /// Maximum deviation from a staff line for staff tracking (interline).
    pub min_staff_line_distance: f64,
    /// Maximum mean distance to the fitted line for a straight arc (interline).
    pub max_line_distance: f64,
    /// Maximum angle between start→middle and start→end of a straight arc.
    pub max_alpha_deg: f64,
    /// Slope (or cotangent) tolerance against the sheet skew.
    pub min_slope: f64,
    /// Minimum circle radius (interline).
    pub min_circle_radius: f64,
    /// Maximum circle radius (interline).
    pub max_circle_radius: f64,
    /// Maximum angle swept by a slur arc.
    pub max_arc_angle_deg: f64,
    /// Minimum angle between the slur middle direction and the vertical.
    pub min_angle_from_vertical_deg: f64,
    /// Maximum relative radius difference between rough and fitted circles.
    pub similar_radius_ratio: f64,
    /// Maximum RMS distance of arc points to their circle (interline).
    pub max_arcs_distance: f64,
}

impl Default for SlursConfig {
    fn default() -> Self {
        Self {
            arc_min_quorum: 1.75,
            arc_min_seed_length: 0.5,
            min_staff_arc_length: 0.5,
            max_staff_arc_length: 5.0,
            min_staff_line_distance: 0.15,
            max_line_distance: 0.1,
            max_alpha_deg: 4.0,
            min_slope: 0.03,
            min_circle_radius: 0.4,
            max_circle_radius: 100.0,
            max_arc_angle_deg: 190.0,
            min_angle_from_vertical_deg: 10.0,
            similar_radius_ratio: 0.25,
            max_arcs_distance: 0.15,
        }
    }
}

/// Scale-dependent values of a [`SlursConfig`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct SlursParams {
    pub arc_min_quorum: usize,
    pub arc_min_seed_length: usize,
    pub min_staff_arc_length: usize,
    pub max_staff_arc_length: usize,
    pub min_staff_line_distance: f64,
    pub max_line_distance: f64,
    /// Squared sine of the maximum straight-arc angle.
    pub max_sin_sq: f64,
    pub min_slope: f64,
    pub min_circle_radius: f64,
    pub max_circle_radius: f64,
    pub max_arc_angle: f64,
    pub min_angle_from_vertical: f64,
    pub similar_radius_ratio: f64,
    pub max_arcs_distance: f64,
}

impl SlursParams {
    pub fn new(config: &SlursConfig, scale: Scale) -> Self {
        let count = |frac: f64| scale.to_pixels(frac).max(0) as usize;
        let sin = config.max_alpha_deg.to_radians().sin();

        Self {
            arc_min_quorum: count(config.arc_min_quorum),
            arc_min_seed_length: count(config.arc_min_seed_length),
            min_staff_arc_length: count(config.min_staff_arc_length),
            max_staff_arc_length: count(config.max_staff_arc_length),
            min_staff_line_distance: scale.to_pixels_f64(config.min_staff_line_distance),
            max_line_distance: scale.to_pixels_f64(config.max_line_distance),
            max_sin_sq: sin * sin,
            min_slope: config.min_slope,
            min_circle_radius: scale.to_pixels_f64(config.min_circle_radius),
            max_circle_radius: scale.to_pixels_f64(config.max_circle_radius),
            max_arc_angle: config.max_arc_angle_deg.to_radians(),
            min_angle_from_vertical: config.min_angle_from_vertical_deg.to_radians(),
            similar_radius_ratio: config.similar_radius_ratio,
            max_arcs_distance: scale.to_pixels_f64(config.max_arcs_distance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn params_follow_the_interline() {
        let params = SlursParams::new(&SlursConfig::default(), Scale::new(20, 3));
        assert_eq!(params.arc_min_quorum, 35);
        assert_eq!(params.arc_min_seed_length, 10);
        assert_eq!(params.max_staff_arc_length, 100);
        assert_relative_eq!(params.max_arcs_distance, 3.0);
        assert_relative_eq!(params.max_circle_radius, 2000.0);
        assert_relative_eq!(params.max_arc_angle, 190f64.to_radians());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: SlursConfig = serde_json::from_str(r#"{ "max_alpha_deg": 2.5 }"#).unwrap();
        assert_eq!(cfg.max_alpha_deg, 2.5);
        assert_eq!(cfg.min_slope, SlursConfig::default().min_slope);
    }
}
