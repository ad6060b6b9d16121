//! Detected region type

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in frame pixel coordinates.
///
/// Named fields on purpose: downstream code must not have to guess a
/// coordinate order out of a bare tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Create a new region
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Geometric center `(x + width/2, y + height/2)`
    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }

    /// Translate by an offset (e.g. face-crop coordinates back to the frame)
    pub fn offset(&self, dx: u32, dy: u32) -> Region {
        Region {
            x: self.x + dx,
            y: self.y + dy,
            width: self.width,
            height: self.height,
        }
    }
}
