//! Engine-wide settings

use super::{Config, ConfigError};
use crate::foundation::math::Size;
use crate::render::scale_mode::ScaleModes;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// # Engine Configuration
///
/// Design resolution, scale strategies and logging for one engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Width of the coordinate space content is authored in
    pub design_width: f32,
    /// Height of the coordinate space content is authored in
    pub design_height: f32,
    /// Scale mode used by the render system to fit the stage to the device
    pub scale_mode: String,
    /// Scale mode used by the scale system for the presentation container
    pub container_scale_mode: String,
    /// Default duration of scene fade-in transitions, in milliseconds
    pub transition_duration_ms: u64,
    /// Fallback log filter used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            design_width: 750.0,
            design_height: 1334.0,
            scale_mode: "CONTAIN".to_string(),
            container_scale_mode: "COVER".to_string(),
            transition_duration_ms: 500,
            log_level: "info".to_string(),
        }
    }
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Create a configuration for the given design resolution
    pub fn new(design_width: f32, design_height: f32) -> Self {
        Self {
            design_width,
            design_height,
            ..Self::default()
        }
    }

    /// Set the render system's scale mode
    pub fn with_scale_mode(mut self, mode: impl Into<String>) -> Self {
        self.scale_mode = mode.into();
        self
    }

    /// Set the scale system's scale mode
    pub fn with_container_scale_mode(mut self, mode: impl Into<String>) -> Self {
        self.container_scale_mode = mode.into();
        self
    }

    /// Design resolution as a size
    pub fn design_size(&self) -> Size {
        Size::new(self.design_width, self.design_height)
    }

    /// Default transition duration
    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_duration_ms)
    }

    /// Validate the configuration against the available scale modes
    pub fn validate(&self, modes: &ScaleModes) -> Result<(), ConfigError> {
        if !(self.design_width > 0.0 && self.design_height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "design size must be positive, got {}x{}",
                self.design_width, self.design_height
            )));
        }

        modes.resolve(&self.scale_mode)?;
        modes.resolve(&self.container_scale_mode)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate(&ScaleModes::with_defaults()).is_ok());
        assert_eq!(config.transition_duration(), Duration::from_millis(500));
    }

    #[test]
    fn test_unknown_scale_mode_rejected() {
        let config = EngineConfig::default().with_scale_mode("STRETCH_WEIRD");
        let err = config.validate(&ScaleModes::with_defaults()).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownScaleMode(name) if name == "STRETCH_WEIRD"));
    }

    #[test]
    fn test_zero_design_size_rejected() {
        let config = EngineConfig::new(0.0, 100.0);
        assert!(matches!(
            config.validate(&ScaleModes::with_defaults()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_parse_toml() {
        let text = r#"
            design_width = 1920.0
            design_height = 1080.0
            scale_mode = "COVER"
        "#;
        let config = EngineConfig::parse("engine.toml", text).unwrap();
        assert_eq!(config.design_size(), Size::new(1920.0, 1080.0));
        assert_eq!(config.scale_mode, "COVER");
        assert_eq!(config.container_scale_mode, "COVER");
        assert_eq!(config.transition_duration_ms, 500);
    }

    #[test]
    fn test_parse_ron() {
        let text = r#"(design_width: 640.0, design_height: 480.0, log_level: "debug")"#;
        let config = EngineConfig::parse("engine.ron", text).unwrap();
        assert_eq!(config.design_width, 640.0);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_unsupported_format() {
        assert!(matches!(
            EngineConfig::parse("engine.yaml", ""),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
