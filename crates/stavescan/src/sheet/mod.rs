//! Sheet collaborators consumed by the bar and slur stages.

mod layout;
mod pixels;
mod staff;
mod stick;

pub use layout::SheetLayout;
pub use pixels::{PixelSource, FOREGROUND_THRESHOLD};
pub use staff::{HorizontalSide, Staff, StaffLine, StaffManager};
pub use stick::{Shape, Stick, StickResult};

/// Global skew of a sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Skew {
    /// dy/dx of horizontal structures (staff lines).
    pub slope: f64,
}

impl Skew {
    pub fn new(slope: f64) -> Self {
        Self { slope }
    }
}
