//! Math types for 2D scene positioning

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// 2D vector used for positions, offsets and scales
pub type Vec2 = Vector2<f32>;

/// A quarter turn in radians, used when the stage is rotated to match device orientation
pub const QUARTER_TURN: f32 = std::f32::consts::FRAC_PI_2;

/// Width and height pair
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Horizontal extent
    pub width: f32,
    /// Vertical extent
    pub height: f32,
}

impl Size {
    /// Create a new size
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when taller than wide. Square sizes count as portrait.
    pub fn is_portrait(&self) -> bool {
        self.height >= self.width
    }

    /// Both sides finite and positive
    pub fn has_area(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Size with width and height exchanged
    pub const fn swapped(&self) -> Self {
        Self::new(self.height, self.width)
    }
}

/// Rotate a vector counter-clockwise in a y-up frame (clockwise on a y-down screen)
pub fn rotate(v: Vec2, radians: f32) -> Vec2 {
    if radians == 0.0 {
        return v;
    }
    let (sin, cos) = radians.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}
