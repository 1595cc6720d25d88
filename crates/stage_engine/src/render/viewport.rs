//! Visible region of the design space

use crate::foundation::math::Size;

/// Edges of the visible region, in design coordinates
///
/// With letterboxing the viewport extends past the design rectangle; with
/// cropping it lies inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Left edge
    pub left: f32,
    /// Right edge
    pub right: f32,
    /// Top edge
    pub top: f32,
    /// Bottom edge
    pub bottom: f32,
}

impl Viewport {
    /// Viewport covering exactly `0..width` by `0..height`
    pub fn from_size(size: Size) -> Self {
        Self {
            left: 0.0,
            right: size.width,
            top: 0.0,
            bottom: size.height,
        }
    }

    /// Horizontal extent
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Vertical extent
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_size(Size::default())
    }
}
