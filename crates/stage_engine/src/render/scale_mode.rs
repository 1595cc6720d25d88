//! Named strategies for fitting the design resolution onto a device
//!
//! Every built-in mode rotates the stage a quarter turn when the device
//! orientation is perpendicular to the design orientation, then fits the
//! design into the rotated frame.

use super::{PresentationTransform, Viewport};
use crate::config::ConfigError;
use crate::foundation::math::{Size, Vec2, QUARTER_TURN};
use std::collections::HashMap;

/// Inputs of a scale mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleInput {
    /// Design resolution
    pub design: Size,
    /// Device size in pixels
    pub device: Size,
}

/// Output of a scale mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleResult {
    /// Uniform scale from design units to device pixels
    pub scale: f32,
    /// Offset of the design origin inside the (possibly rotated) device frame
    pub offset: Vec2,
    /// Whether the stage must be turned a quarter turn
    pub should_rotate: bool,
    /// Unrotated device size, the render target size
    pub device: Size,
    /// Visible region in design coordinates
    pub viewport: Viewport,
}

impl ScaleResult {
    /// Transform to apply to the stage or a presentation container
    ///
    /// When rotated, the offset axes are swapped and the horizontal one is
    /// measured from the right edge so the turned stage stays on screen.
    pub fn presentation(&self) -> PresentationTransform {
        if self.should_rotate {
            PresentationTransform {
                scale: self.scale,
                translation: Vec2::new(self.device.width - self.offset.y, self.offset.x),
                rotation: QUARTER_TURN,
            }
        } else {
            PresentationTransform {
                scale: self.scale,
                translation: self.offset,
                rotation: 0.0,
            }
        }
    }
}

/// A scale mode strategy
pub type ScaleModeFn = fn(&ScaleInput) -> ScaleResult;

/// Registry of scale modes by name
#[derive(Clone, Default)]
pub struct ScaleModes {
    modes: HashMap<String, ScaleModeFn>,
}

impl std::fmt::Debug for ScaleModes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScaleModes").field("modes", &self.names()).finish()
    }
}

impl ScaleModes {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `CONTAIN`, `COVER`, `FIT_WIDTH`, `FIT_HEIGHT` and `NO_SCALE`
    pub fn with_defaults() -> Self {
        let mut modes = Self::new();
        modes.register("CONTAIN", contain);
        modes.register("COVER", cover);
        modes.register("FIT_WIDTH", fit_width);
        modes.register("FIT_HEIGHT", fit_height);
        modes.register("NO_SCALE", no_scale);
        modes
    }

    /// Add or replace a mode
    pub fn register(&mut self, name: impl Into<String>, mode: ScaleModeFn) {
        self.modes.insert(name.into(), mode);
    }

    /// Whether a mode is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.modes.contains_key(name)
    }

    /// Look up a mode, failing for unregistered names
    pub fn resolve(&self, name: &str) -> Result<ScaleModeFn, ConfigError> {
        self.modes
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::UnknownScaleMode(name.to_string()))
    }

    /// Resolve `name` and run it
    ///
    /// A device without area (a minimised window) has no valid fit and is an
    /// error, as is a mode yielding a non-positive or non-finite scale.
    pub fn compute(&self, name: &str, design: Size, device: Size) -> Result<ScaleResult, ConfigError> {
        let mode = self.resolve(name)?;
        if !device.has_area() {
            return Err(ConfigError::Invalid(format!(
                "device size {}x{} has no area",
                device.width, device.height
            )));
        }
        let result = mode(&ScaleInput { design, device });
        if !result.scale.is_finite() || result.scale <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "scale mode {name} produced scale {}",
                result.scale
            )));
        }
        Ok(result)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Device frame the design is fitted into, and whether it is rotated
fn frame(input: &ScaleInput) -> (Size, bool) {
    let device = input.device;
    let square = (device.width - device.height).abs() < f32::EPSILON;
    let rotate = !square && input.design.is_portrait() != device.is_portrait();
    if rotate {
        (device.swapped(), true)
    } else {
        (device, false)
    }
}

fn finish(input: &ScaleInput, scale: f32, frame: Size, should_rotate: bool) -> ScaleResult {
    let design = input.design;
    let offset = Vec2::new(
        (frame.width - design.width * scale) / 2.0,
        (frame.height - design.height * scale) / 2.0,
    );
    let margin = offset / scale;
    ScaleResult {
        scale,
        offset,
        should_rotate,
        device: input.device,
        viewport: Viewport {
            left: -margin.x,
            right: design.width + margin.x,
            top: -margin.y,
            bottom: design.height + margin.y,
        },
    }
}

/// Fit inside the device preserving aspect, letterboxing the remainder
pub fn contain(input: &ScaleInput) -> ScaleResult {
    let (frame, rotate) = frame(input);
    let scale = (frame.width / input.design.width).min(frame.height / input.design.height);
    finish(input, scale, frame, rotate)
}

/// Fill the device preserving aspect, cropping the overflow
pub fn cover(input: &ScaleInput) -> ScaleResult {
    let (frame, rotate) = frame(input);
    let scale = (frame.width / input.design.width).max(frame.height / input.design.height);
    finish(input, scale, frame, rotate)
}

/// Match the device width
pub fn fit_width(input: &ScaleInput) -> ScaleResult {
    let (frame, rotate) = frame(input);
    finish(input, frame.width / input.design.width, frame, rotate)
}

/// Match the device height
pub fn fit_height(input: &ScaleInput) -> ScaleResult {
    let (frame, rotate) = frame(input);
    finish(input, frame.height / input.design.height, frame, rotate)
}

/// Keep design units equal to device pixels, centered
pub fn no_scale(input: &ScaleInput) -> ScaleResult {
    let (frame, rotate) = frame(input);
    finish(input, 1.0, frame, rotate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DESIGN: Size = Size::new(100.0, 200.0);

    #[test]
    fn test_contain_letterboxes() {
        let modes = ScaleModes::with_defaults();
        let result = modes.compute("CONTAIN", DESIGN, Size::new(300.0, 400.0)).unwrap();

        assert_relative_eq!(result.scale, 2.0);
        assert_relative_eq!(result.offset.x, 50.0);
        assert_relative_eq!(result.offset.y, 0.0);
        assert!(!result.should_rotate);
        assert_relative_eq!(result.viewport.left, -25.0);
        assert_relative_eq!(result.viewport.right, 125.0);
        assert_relative_eq!(result.viewport.top, 0.0);
        assert_relative_eq!(result.viewport.bottom, 200.0);
    }

    #[test]
    fn test_cover_crops() {
        let modes = ScaleModes::with_defaults();
        let result = modes.compute("COVER", DESIGN, Size::new(300.0, 400.0)).unwrap();

        assert_relative_eq!(result.scale, 3.0);
        assert_relative_eq!(result.offset.y, -100.0);
        assert_relative_eq!(result.viewport.top, 100.0 / 3.0, epsilon = 1e-4);
        assert_relative_eq!(result.viewport.bottom, 200.0 - 100.0 / 3.0, epsilon = 1e-4);
    }

    #[test]
    fn test_perpendicular_device_rotates() {
        let result = contain(&ScaleInput { design: DESIGN, device: Size::new(400.0, 300.0) });
        assert!(result.should_rotate);
        assert_relative_eq!(result.scale, 2.0);

        let transform = result.presentation();
        assert_relative_eq!(transform.rotation_degrees(), 90.0, epsilon = 1e-4);
        assert_relative_eq!(transform.translation.x, 400.0);
        assert_relative_eq!(transform.translation.y, 50.0);
    }

    #[test]
    fn test_square_device_never_rotates() {
        let result = contain(&ScaleInput { design: DESIGN, device: Size::new(300.0, 300.0) });
        assert!(!result.should_rotate);
    }

    #[test]
    fn test_unregistered_mode_is_config_error() {
        let modes = ScaleModes::with_defaults();
        let err = modes.compute("SHOW_ALL", DESIGN, DESIGN).unwrap_err();
        assert_eq!(err.to_string(), "unsupported scale mode - SHOW_ALL");
    }

    #[test]
    fn test_empty_device_is_rejected() {
        let modes = ScaleModes::with_defaults();
        for device in [Size::new(0.0, 0.0), Size::new(300.0, 0.0), Size::new(f32::NAN, 400.0)] {
            assert!(matches!(
                modes.compute("CONTAIN", DESIGN, device),
                Err(ConfigError::Invalid(_))
            ));
        }
    }

    #[test]
    fn test_custom_mode_registration() {
        fn double(input: &ScaleInput) -> ScaleResult {
            finish(input, 2.0, input.device, false)
        }

        let mut modes = ScaleModes::new();
        assert!(!modes.contains("DOUBLE"));
        modes.register("DOUBLE", double);
        let result = modes.compute("DOUBLE", DESIGN, Size::new(200.0, 400.0)).unwrap();
        assert_relative_eq!(result.scale, 2.0);
        assert_eq!(modes.names(), vec!["DOUBLE"]);
    }
}
