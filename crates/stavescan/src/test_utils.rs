//! Shared test utilities: synthetic staves, bar sticks and skeleton arcs.

use image::{GrayImage, Luma};

use crate::geometry::PixelPoint;
use crate::sheet::{Staff, StaffManager, Stick};

/// Three regular 5-line staves, 20 px interline, from x=100 to x=900, with
/// their first lines at y=100, 300 and 500.
pub(crate) fn three_staves() -> StaffManager {
    let staves = [100.0, 300.0, 500.0]
        .iter()
        .map(|&top| Staff::regular(100.0, 900.0, top, 20.0, 5).expect("regular staff"))
        .collect();
    StaffManager::new(staves)
}

/// White image with black sticks and filled rectangles.
///
/// Each stick is a vertical band of its rounded mean width centered on its
/// axis, from its start row to its stop row. Blobs are inclusive
/// `[x0, y0, x1, y1]` rectangles.
pub(crate) fn draw_sticks(w: u32, h: u32, sticks: &[&Stick], blobs: &[[i32; 4]]) -> GrayImage {
    let mut img = GrayImage::from_pixel(w, h, Luma([255]));
    let mut ink = |x: i32, y: i32| {
        if x >= 0 && y >= 0 && (x as u32) < w && (y as u32) < h {
            img.put_pixel(x as u32, y as u32, Luma([0]));
        }
    };

    for stick in sticks {
        let width = stick.mean_width().round().max(1.0) as i32;
        let y0 = stick.start[1].round() as i32;
        let y1 = stick.stop[1].round() as i32;
        for y in y0..=y1 {
            let left = (stick.x_at(f64::from(y)) - 0.5 * f64::from(width)).round() as i32;
            for x in left..left + width {
                ink(x, y);
            }
        }
    }

    for &[x0, y0, x1, y1] in blobs {
        for y in y0..=y1 {
            for x in x0..=x1 {
                ink(x, y);
            }
        }
    }
    img
}

/// White image with black pixels at `points`.
pub(crate) fn draw_points(w: u32, h: u32, points: &[PixelPoint]) -> GrayImage {
    let mut img = GrayImage::from_pixel(w, h, Luma([255]));
    for p in points {
        if p.x >= 0 && p.y >= 0 && (p.x as u32) < w && (p.y as u32) < h {
            img.put_pixel(p.x as u32, p.y as u32, Luma([0]));
        }
    }
    img
}

/// One-pixel-wide digital arc from angle `a0` to `a1` (radians, image axes).
///
/// Consecutive points are 8-neighbors and no point touches the one two steps
/// away, so the arc has no junction.
pub(crate) fn arc_skeleton_points(
    center: [f64; 2],
    radius: f64,
    a0: f64,
    a1: f64,
) -> Vec<PixelPoint> {
    let steps = ((a1 - a0).abs() * radius * 4.0).ceil().max(1.0) as usize;
    let mut out: Vec<PixelPoint> = Vec::with_capacity(steps);
    for i in 0..=steps {
        let a = a0 + (a1 - a0) * i as f64 / steps as f64;
        let p = PixelPoint::new(
            (center[0] + radius * a.cos()).round() as i32,
            (center[1] + radius * a.sin()).round() as i32,
        );
        if out.last() == Some(&p) {
            continue;
        }
        // Drop corners: the point before last already touches `p`.
        while out.len() >= 2 && out[out.len() - 2].touches(p) {
            out.pop();
        }
        out.push(p);
    }
    out
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;

    #[test]
    fn skeleton_arcs_are_thin_and_connected() {
        let pts = arc_skeleton_points([100.0, 100.0], 40.0, PI, 2.0 * PI);
        assert_eq!(pts.first(), Some(&PixelPoint::new(60, 100)));
        assert_eq!(pts.last(), Some(&PixelPoint::new(140, 100)));
        for w in pts.windows(2) {
            assert!(w[0].touches(w[1]));
        }
        for w in pts.windows(3) {
            assert!(!w[0].touches(w[2]));
        }
    }
}
