//! Normalized landmark → canvas coordinates

use heartflow_core::{remap, CanvasPoint, DisplayConfig, Landmark};

/// Maps tracker coordinates onto the canvas.
///
/// The canvas shows a mirrored self-view, so x is flipped: x = 0 lands on
/// the right edge and x = 1 on the left edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    width: f32,
    height: f32,
}

impl CoordinateMapper {
    pub fn new(display: &DisplayConfig) -> Self {
        CoordinateMapper {
            width: display.width,
            height: display.height,
        }
    }

    pub fn to_canvas(&self, landmark: &Landmark) -> CanvasPoint {
        CanvasPoint::new(
            remap(landmark.x, 0.0, 1.0, self.width, 0.0),
            remap(landmark.y, 0.0, 1.0, 0.0, self.height),
        )
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }
}
