//! Sheet scale: conversions between interline fractions and pixels.
//!
//! Every threshold in this crate is expressed in interline units (the
//! vertical distance between two staff lines) so that the same constants
//! apply to any scan resolution. [`Scale`] turns them into pixel values
//! once per sheet.

/// Scale of one sheet.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scale {
    /// Distance between two staff lines, in pixels.
    pub interline: u32,
    /// Most frequent foreground run length (typical line thickness), in pixels.
    pub main_fore: u32,
}

impl Scale {
    /// Build a scale, clamping degenerate values to one pixel.
    pub fn new(interline: u32, main_fore: u32) -> Self {
        Self {
            interline: interline.max(1),
            main_fore: main_fore.max(1),
        }
    }

    /// Interline as a float.
    #[inline]
    pub fn interline_f64(&self) -> f64 {
        f64::from(self.interline)
    }

    /// Convert an interline fraction into a rounded pixel count.
    #[inline]
    pub fn to_pixels(&self, frac: f64) -> i32 {
        (frac * self.interline_f64()).round() as i32
    }

    /// Convert an interline fraction into a (non-rounded) pixel distance.
    #[inline]
    pub fn to_pixels_f64(&self, frac: f64) -> f64 {
        frac * self.interline_f64()
    }

    /// Convert a pixel distance into an interline fraction.
    #[inline]
    pub fn pixels_to_frac(&self, pixels: f64) -> f64 {
        pixels / self.interline_f64()
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::new(20, 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn round_trips_fractions() {
        let scale = Scale::new(20, 3);
        assert_eq!(scale.to_pixels(0.5), 10);
        assert_eq!(scale.to_pixels(0.33), 7);
        assert_relative_eq!(scale.to_pixels_f64(0.33), 6.6, epsilon = 1e-12);
        assert_relative_eq!(scale.pixels_to_frac(30.0), 1.5);
    }

    #[test]
    fn zero_interline_is_clamped() {
        let scale = Scale::new(0, 0);
        assert_eq!(scale.interline, 1);
        assert_eq!(scale.main_fore, 1);
    }
}
