//! Edge-anchored widgets

use crate::ecs::systems::WIDGET_SYSTEM;
use crate::ecs::{Component, ComponentContext, ComponentKind, Meta};
use std::any::Any;

/// Pins its host to viewport edges in design units
///
/// Like [`super::Hud`] without the percentage mode, and driven by its own
/// system so widgets and HUD elements can be switched independently.
#[derive(Debug, Clone, Default)]
pub struct Widget {
    meta: Meta,
}

impl Widget {
    /// Widget with no offsets
    pub fn new() -> Self {
        Self::default()
    }

    /// Distance from the viewport left edge
    pub fn left(mut self, offset: f32) -> Self {
        self.meta.insert("left", offset);
        self
    }

    /// Distance from the viewport right edge
    pub fn right(mut self, offset: f32) -> Self {
        self.meta.insert("right", offset);
        self
    }

    /// Distance from the viewport top edge
    pub fn top(mut self, offset: f32) -> Self {
        self.meta.insert("top", offset);
        self
    }

    /// Distance from the viewport bottom edge
    pub fn bottom(mut self, offset: f32) -> Self {
        self.meta.insert("bottom", offset);
        self
    }
}

impl Component for Widget {
    fn name(&self) -> &str {
        "widget"
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Widget
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn on_added(&mut self, ctx: &mut ComponentContext<'_>) {
        ctx.join(WIDGET_SYSTEM);
    }

    fn on_removed(&mut self, ctx: &mut ComponentContext<'_>) {
        if !ctx.host_has_other(ComponentKind::Widget) {
            ctx.leave(WIDGET_SYSTEM);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
