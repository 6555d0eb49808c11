//! Read-only binary pixel sources.

use image::GrayImage;

/// Luma values strictly below this are foreground (ink).
pub const FOREGROUND_THRESHOLD: u8 = 128;

/// Binary view of a raster: foreground or background per pixel.
///
/// Coordinates outside the raster are background.
pub trait PixelSource {
    /// Raster width in pixels.
    fn width(&self) -> u32;

    /// Raster height in pixels.
    fn height(&self) -> u32;

    /// True when the pixel at (x, y) is foreground.
    fn is_foreground(&self, x: i32, y: i32) -> bool;

    /// Count foreground pixels in the half-open rectangle `[x0, x1) × [y0, y1)`
    /// for which `keep(x, y)` holds.
    fn count_foreground(
        &self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        keep: &dyn Fn(i32, i32) -> bool,
    ) -> usize {
        let mut count = 0;
        for y in y0..y1 {
            for x in x0..x1 {
                if self.is_foreground(x, y) && keep(x, y) {
                    count += 1;
                }
            }
        }
        count
    }
}

impl PixelSource for GrayImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    #[inline]
    fn is_foreground(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        match self.get_pixel_checked(x as u32, y as u32) {
            Some(p) => p[0] < FOREGROUND_THRESHOLD,
            None => false,
        }
    }
}
