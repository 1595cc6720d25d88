//! Rendering collaborators and stage fitting
//!
//! The engine never draws anything itself. It hands the display tree to a
//! [`Renderer`] once per frame and pushes the fitted container transform to a
//! [`PresentationSurface`] on resize. Both are narrow traits so hosts can plug
//! in their own backend; [`NullRenderer`] and [`NullSurface`] serve headless
//! runs and tests.

pub mod scale_mode;
pub mod viewport;

pub use scale_mode::{ScaleInput, ScaleModeFn, ScaleModes, ScaleResult};
pub use viewport::Viewport;

use crate::display::DisplayTree;
use crate::foundation::collections::NodeId;
use crate::foundation::math::{Size, Vec2};

/// Draw backend consumed by the render system
pub trait Renderer {
    /// Resize the render target, in device pixels
    fn resize(&mut self, width: u32, height: u32);

    /// Draw the subtree rooted at `root`
    fn render(&mut self, tree: &DisplayTree, root: NodeId);
}

/// Renderer that draws nothing
#[derive(Debug, Default)]
pub struct NullRenderer {
    frames: u64,
    target: (u32, u32),
}

impl NullRenderer {
    /// Create a null renderer
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames "drawn" so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Last size passed to [`Renderer::resize`]
    pub fn target(&self) -> (u32, u32) {
        self.target
    }
}

impl Renderer for NullRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        self.target = (width, height);
    }

    fn render(&mut self, tree: &DisplayTree, root: NodeId) {
        if tree.contains(root) {
            self.frames += 1;
        }
    }
}

/// Scale, translation and rotation applied to a presentation container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresentationTransform {
    /// Uniform scale from design units to device pixels
    pub scale: f32,
    /// Translation in device pixels
    pub translation: Vec2,
    /// Rotation in radians; either zero or a quarter turn
    pub rotation: f32,
}

impl PresentationTransform {
    /// Rotation in degrees, as presentation layers usually expect it
    pub fn rotation_degrees(&self) -> f32 {
        self.rotation.to_degrees()
    }
}

/// Container outside the display tree that mirrors the stage transform
///
/// Used for overlays (DOM layers, native widgets) that must line up with the
/// rendered stage.
pub trait PresentationSurface {
    /// Apply the fitted transform; `design` is the container's unscaled size
    fn apply(&mut self, transform: &PresentationTransform, design: Size);
}

/// Surface that only remembers the last transform
#[derive(Debug, Default)]
pub struct NullSurface {
    last: Option<PresentationTransform>,
}

impl NullSurface {
    /// Create a null surface
    pub fn new() -> Self {
        Self::default()
    }

    /// Last applied transform
    pub fn last(&self) -> Option<PresentationTransform> {
        self.last
    }
}

impl PresentationSurface for NullSurface {
    fn apply(&mut self, transform: &PresentationTransform, _design: Size) {
        self.last = Some(*transform);
    }
}
