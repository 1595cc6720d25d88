//! Viewport-anchored overlay positioning

use crate::ecs::systems::HUD_SYSTEM;
use crate::ecs::{Component, ComponentContext, ComponentKind, Meta};
use std::any::Any;

/// Keeps its host at fixed offsets from the viewport edges
///
/// Offsets are in design units, or fractions of the viewport size when
/// `percentage` is set. Only the edges given are applied; a host with just
/// `right` keeps whatever `y` it already had.
///
/// ```
/// use stage_engine::ecs::components::Hud;
///
/// let hud = Hud::new().right(10.0).top(0.05).percentage(true);
/// assert_eq!(hud.meta_ref().number("right").unwrap(), Some(10.0));
/// ```
#[derive(Debug, Clone)]
pub struct Hud {
    meta: Meta,
}

impl Hud {
    /// HUD with no offsets yet
    pub fn new() -> Self {
        Self {
            meta: Meta::new().with("percentage", false),
        }
    }

    /// Build from configuration, e.g. a table in a scene file
    pub fn from_meta(meta: Meta) -> Self {
        Self { meta }
    }

    /// Distance from the left edge
    pub fn left(mut self, offset: f32) -> Self {
        self.meta.insert("left", offset);
        self
    }

    /// Distance from the right edge
    pub fn right(mut self, offset: f32) -> Self {
        self.meta.insert("right", offset);
        self
    }

    /// Distance from the top edge
    pub fn top(mut self, offset: f32) -> Self {
        self.meta.insert("top", offset);
        self
    }

    /// Distance from the bottom edge
    pub fn bottom(mut self, offset: f32) -> Self {
        self.meta.insert("bottom", offset);
        self
    }

    /// Read offsets as fractions of the viewport size
    pub fn percentage(mut self, enabled: bool) -> Self {
        self.meta.insert("percentage", enabled);
        self
    }

    /// Configured offsets
    pub fn meta_ref(&self) -> &Meta {
        &self.meta
    }
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Hud {
    fn name(&self) -> &str {
        "hud"
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Hud
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn on_added(&mut self, ctx: &mut ComponentContext<'_>) {
        ctx.join(HUD_SYSTEM);
    }

    fn on_removed(&mut self, ctx: &mut ComponentContext<'_>) {
        if !ctx.host_has_other(ComponentKind::Hud) {
            ctx.leave(HUD_SYSTEM);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
