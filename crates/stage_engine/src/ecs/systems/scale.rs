//! Presentation container fitting

use super::SCALE_SYSTEM;
use crate::config::ConfigError;
use crate::ecs::{EntitySet, System, SystemError, World};
use crate::foundation::collections::NodeId;
use crate::foundation::math::Size;
use crate::render::{PresentationSurface, PresentationTransform, ScaleModes};
use std::any::Any;

/// Applies the fitted transform to a container outside the display tree
///
/// Purely resize driven: it owns no entities and does nothing per frame.
pub struct ScaleSystem {
    entities: EntitySet,
    surface: Box<dyn PresentationSurface>,
    design: Size,
    mode: String,
    modes: ScaleModes,
    rotated: bool,
    last: Option<PresentationTransform>,
}

impl ScaleSystem {
    /// Fails when `mode` is not a registered scale mode
    pub fn new(
        surface: Box<dyn PresentationSurface>,
        design: Size,
        mode: impl Into<String>,
        modes: ScaleModes,
    ) -> Result<Self, ConfigError> {
        let mode = mode.into();
        modes.resolve(&mode)?;
        Ok(Self {
            entities: EntitySet::new(),
            surface,
            design,
            mode,
            modes,
            rotated: false,
            last: None,
        })
    }

    /// Whether the last fit turned the container
    pub fn is_rotated(&self) -> bool {
        self.rotated
    }

    /// Transform applied on the last resize
    pub fn last_transform(&self) -> Option<PresentationTransform> {
        self.last
    }
}

impl std::fmt::Debug for ScaleSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScaleSystem")
            .field("mode", &self.mode)
            .field("rotated", &self.rotated)
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

impl System for ScaleSystem {
    fn name(&self) -> &str {
        SCALE_SYSTEM
    }

    fn entities(&self) -> &EntitySet {
        &self.entities
    }

    fn entities_mut(&mut self) -> &mut EntitySet {
        &mut self.entities
    }

    fn update(&mut self, _entity: NodeId, _world: &mut World) -> Result<(), SystemError> {
        Ok(())
    }

    fn on_resize(&mut self, size: Size, _world: &mut World) -> Result<(), ConfigError> {
        let fit = self.modes.compute(&self.mode, self.design, size)?;
        let transform = fit.presentation();
        self.surface.apply(&transform, self.design);
        self.rotated = fit.should_rotate;
        self.last = Some(transform);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
