use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::Position;

/// Canvas-to-screen affine transform (translation plus per-axis scale), the
/// same shape as an SVG screen CTM without skew.
///
/// Callers pass the transform in effect *now* with every pointer event; the
/// window can be resized in the middle of a drag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CanvasTransform {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for CanvasTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl CanvasTransform {
    pub fn identity() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    pub fn new(offset_x: f64, offset_y: f64, scale_x: f64, scale_y: f64) -> Self {
        Self {
            offset_x,
            offset_y,
            scale_x,
            scale_y,
        }
    }

    pub fn uniform(offset_x: f64, offset_y: f64, scale: f64) -> Self {
        Self::new(offset_x, offset_y, scale, scale)
    }

    /// Transform that letterboxes the 800x600 canvas into a viewport, centred,
    /// preserving aspect ratio.
    pub fn fit_viewport(left: f64, top: f64, width: f64, height: f64) -> Self {
        let scale = (width / CANVAS_WIDTH).min(height / CANVAS_HEIGHT);
        let offset_x = left + (width - CANVAS_WIDTH * scale) / 2.0;
        let offset_y = top + (height - CANVAS_HEIGHT * scale) / 2.0;
        Self::uniform(offset_x, offset_y, scale)
    }

    pub fn is_invertible(&self) -> bool {
        self.scale_x.is_finite()
            && self.scale_y.is_finite()
            && self.offset_x.is_finite()
            && self.offset_y.is_finite()
            && self.scale_x != 0.0
            && self.scale_y != 0.0
    }

    /// Screen point to canvas space. `None` for a degenerate transform or
    /// when the mapped point overflows.
    pub fn to_canvas(&self, screen: Position) -> Option<Position> {
        if !self.is_invertible() {
            return None;
        }
        let canvas = Position::new(
            (screen.x - self.offset_x) / self.scale_x,
            (screen.y - self.offset_y) / self.scale_y,
        );
        canvas.is_finite().then_some(canvas)
    }

    pub fn to_screen(&self, canvas: Position) -> Position {
        Position::new(
            canvas.x * self.scale_x + self.offset_x,
            canvas.y * self.scale_y + self.offset_y,
        )
    }
}

pub fn within_canvas(p: Position) -> bool {
    (0.0..=CANVAS_WIDTH).contains(&p.x) && (0.0..=CANVAS_HEIGHT).contains(&p.y)
}

/// Pull a finite point onto the canvas edge.
pub fn clamp_to_canvas(p: Position) -> Position {
    Position::new(p.x.clamp(0.0, CANVAS_WIDTH), p.y.clamp(0.0, CANVAS_HEIGHT))
}
