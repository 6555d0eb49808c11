//! Sheet geometry loaded from JSON.
//!
//! A layout bundles what the bar and slur stages consume from earlier
//! stages: the scale, the global skew, the staves and the vertical stick
//! candidates.

use std::path::Path;

use crate::scale::Scale;

use super::{Skew, StaffManager, Stick};

/// Geometry of one sheet.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SheetLayout {
    /// Interline and main foreground run.
    pub scale: Scale,
    /// Global skew.
    #[serde(default)]
    pub skew: Skew,
    /// Staves, top to bottom.
    pub staves: StaffManager,
    /// Vertical stick candidates.
    #[serde(default)]
    pub sticks: Vec<Stick>,
}

impl SheetLayout {
    /// Load a layout from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Parse a layout from JSON text.
    pub fn from_json_str(data: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut layout: SheetLayout = serde_json::from_str(data)?;
        layout.validate()?;
        for stick in &mut layout.sticks {
            stick.normalize();
        }
        layout.scale = Scale::new(layout.scale.interline, layout.scale.main_fore);
        Ok(layout)
    }

    fn validate(&self) -> Result<(), String> {
        if self.scale.interline == 0 {
            return Err("scale.interline must be >= 1".to_string());
        }
        if !self.skew.slope.is_finite() {
            return Err("skew.slope must be finite".to_string());
        }

        let mut ids = std::collections::HashSet::new();
        for stick in &self.sticks {
            let finite = stick.start.iter().chain(&stick.stop).all(|v| v.is_finite());
            if !finite {
                return Err(format!("stick #{} has non-finite ends", stick.id));
            }
            if !ids.insert(stick.id) {
                return Err(format!("duplicate stick id {}", stick.id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &str = r#"{
        "scale": { "interline": 20, "main_fore": 3 },
        "skew": { "slope": 0.01 },
        "staves": [
            { "left": 50.0, "right": 950.0,
              "lines": [[[50.0, 400.0], [950.0, 400.0]], [[50.0, 420.0], [950.0, 420.0]]] },
            { "left": 50.0, "right": 950.0,
              "lines": [[[50.0, 100.0], [950.0, 100.0]], [[50.0, 120.0], [950.0, 120.0]]] }
        ],
        "sticks": [
            { "id": 1, "start": [50.0, 420.0], "stop": [50.0, 100.0], "weight": 960 }
        ]
    }"#;

    #[test]
    fn parses_and_normalizes() {
        let layout = SheetLayout::from_json_str(LAYOUT).unwrap();
        assert_eq!(layout.scale.interline, 20);
        assert_eq!(layout.staves.len(), 2);
        // Staves are sorted top to bottom, stick ends too.
        assert_eq!(layout.staves.get(0).unwrap().first_line().y_at(0.0), 100.0);
        assert_eq!(layout.sticks[0].start[1], 100.0);
    }

    #[test]
    fn rejects_duplicate_sticks_and_unknown_fields() {
        let dup = LAYOUT.replace(
            r#""sticks": ["#,
            r#""sticks": [{ "id": 1, "start": [0.0, 0.0], "stop": [0.0, 9.0], "weight": 9 },"#,
        );
        assert!(SheetLayout::from_json_str(&dup).is_err());

        let unknown = LAYOUT.replacen('{', r#"{ "dpi": 300,"#, 1);
        assert!(SheetLayout::from_json_str(&unknown).is_err());
    }

    #[test]
    fn staff_without_lines_is_an_error() {
        let bad = r#"{ "scale": { "interline": 20, "main_fore": 3 },
                       "staves": [{ "left": 0.0, "right": 10.0, "lines": [] }] }"#;
        assert!(SheetLayout::from_json_str(bad).is_err());
    }
}
