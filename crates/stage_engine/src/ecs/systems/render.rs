//! Stage drawing and fitting

use super::RENDER_SYSTEM;
use crate::config::ConfigError;
use crate::ecs::{EntitySet, System, SystemError, World};
use crate::foundation::collections::NodeId;
use crate::foundation::math::Size;
use crate::render::{Renderer, ScaleModes, ScaleResult};
use std::any::Any;

/// Draws the stage each frame and refits it on resize
///
/// The only entity is the stage itself. On resize the configured scale mode
/// maps the design resolution onto the device; the stage takes the resulting
/// scale, rotation and offset and the world viewport is updated for anchored
/// hosts.
pub struct RenderSystem {
    entities: EntitySet,
    stage: NodeId,
    renderer: Box<dyn Renderer>,
    design: Size,
    mode: String,
    modes: ScaleModes,
    last: Option<ScaleResult>,
    frames: u64,
}

impl RenderSystem {
    /// Fails when `mode` is not a registered scale mode
    pub fn new(
        stage: NodeId,
        renderer: Box<dyn Renderer>,
        design: Size,
        mode: impl Into<String>,
        modes: ScaleModes,
    ) -> Result<Self, ConfigError> {
        let mode = mode.into();
        modes.resolve(&mode)?;

        let mut entities = EntitySet::new();
        entities.insert(stage);
        Ok(Self {
            entities,
            stage,
            renderer,
            design,
            mode,
            modes,
            last: None,
            frames: 0,
        })
    }

    /// Root being drawn
    pub fn stage(&self) -> NodeId {
        self.stage
    }

    /// Scale mode name
    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// Design resolution
    pub fn design(&self) -> Size {
        self.design
    }

    /// Result of the last resize
    pub fn last_fit(&self) -> Option<&ScaleResult> {
        self.last.as_ref()
    }

    /// Frames drawn so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl std::fmt::Debug for RenderSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSystem")
            .field("stage", &self.stage)
            .field("design", &self.design)
            .field("mode", &self.mode)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

impl System for RenderSystem {
    fn name(&self) -> &str {
        RENDER_SYSTEM
    }

    fn entities(&self) -> &EntitySet {
        &self.entities
    }

    fn entities_mut(&mut self) -> &mut EntitySet {
        &mut self.entities
    }

    fn add_entity(&mut self, entity: NodeId) -> bool {
        if entity != self.stage {
            log::debug!("Render system only draws the stage, ignoring {entity:?}");
            return false;
        }
        self.entities.insert(entity)
    }

    fn update(&mut self, entity: NodeId, world: &mut World) -> Result<(), SystemError> {
        self.renderer.render(&world.tree, entity);
        self.frames += 1;
        Ok(())
    }

    fn on_resize(&mut self, size: Size, world: &mut World) -> Result<(), ConfigError> {
        let fit = self.modes.compute(&self.mode, self.design, size)?;
        self.renderer.resize(size.width.round() as u32, size.height.round() as u32);

        let transform = fit.presentation();
        if let Some(stage) = world.tree.get_mut(self.stage) {
            stage.set_scale(transform.scale, None);
            stage.rotation = transform.rotation;
            stage.position = transform.translation;
        }
        world.set_viewport(fit.viewport);
        log::debug!(
            "Stage fitted to {}x{} ({}): scale {:.3}, rotated {}",
            size.width,
            size.height,
            self.mode,
            fit.scale,
            fit.should_rotate
        );
        self.last = Some(fit);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::QUARTER_TURN;
    use crate::render::NullRenderer;
    use approx::assert_relative_eq;

    fn system(world: &World, mode: &str) -> Result<RenderSystem, ConfigError> {
        RenderSystem::new(
            world.stage(),
            Box::new(NullRenderer::new()),
            Size::new(100.0, 200.0),
            mode,
            ScaleModes::with_defaults(),
        )
    }

    #[test]
    fn test_unknown_mode_fails_fast() {
        let world = World::new();
        assert!(matches!(
            system(&world, "STRETCH"),
            Err(ConfigError::UnknownScaleMode(mode)) if mode == "STRETCH"
        ));
    }

    #[test]
    fn test_resize_fits_stage_and_viewport() {
        let mut world = World::new();
        let mut render = system(&world, "CONTAIN").unwrap();
        render.on_resize(Size::new(300.0, 400.0), &mut world).unwrap();

        let stage = world.tree.get(world.stage()).unwrap();
        assert_relative_eq!(stage.scale.x, 2.0);
        assert_relative_eq!(stage.position.x, 50.0);
        assert_relative_eq!(stage.rotation, 0.0);
        assert_relative_eq!(world.viewport().left, -25.0);
        assert_relative_eq!(world.viewport().right, 125.0);
    }

    #[test]
    fn test_perpendicular_device_rotates_stage() {
        let mut world = World::new();
        let mut render = system(&world, "CONTAIN").unwrap();
        render.on_resize(Size::new(400.0, 300.0), &mut world).unwrap();

        let stage = world.tree.get(world.stage()).unwrap();
        assert_relative_eq!(stage.rotation, QUARTER_TURN);
        assert!(render.last_fit().unwrap().should_rotate);
    }

    #[test]
    fn test_only_stage_is_accepted() {
        let mut world = World::new();
        let other = world.create_node("other");
        let mut render = system(&world, "COVER").unwrap();
        assert!(!render.add_entity(other));
        assert!(!render.add_entity(world.stage()));
        assert_eq!(render.entities().len(), 1);

        render.update(world.stage(), &mut world).unwrap();
        assert_eq!(render.frames(), 1);
    }
}
