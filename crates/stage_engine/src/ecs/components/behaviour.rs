//! Per-frame closures attached to display objects

use crate::ecs::systems::BEHAVIOUR_SYSTEM;
use crate::ecs::{Component, ComponentContext, ComponentKind};
use std::any::Any;

type UpdateFn = Box<dyn FnMut(&mut ComponentContext<'_>)>;

/// Runs a closure once per frame for as long as it is attached
///
/// The closure gets the full hook context, so it can move its host, remove
/// itself or destroy the host mid-frame.
pub struct Behaviour {
    name: String,
    update: UpdateFn,
}

impl Behaviour {
    /// Named behaviour running `update` once per frame
    pub fn new(name: impl Into<String>, update: impl FnMut(&mut ComponentContext<'_>) + 'static) -> Self {
        Self {
            name: name.into(),
            update: Box::new(update),
        }
    }
}

impl std::fmt::Debug for Behaviour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Behaviour").field("name", &self.name).finish_non_exhaustive()
    }
}

impl Component for Behaviour {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Behaviour
    }

    fn on_added(&mut self, ctx: &mut ComponentContext<'_>) {
        ctx.join(BEHAVIOUR_SYSTEM);
    }

    fn on_removed(&mut self, ctx: &mut ComponentContext<'_>) {
        if !ctx.host_has_other(ComponentKind::Behaviour) {
            ctx.leave(BEHAVIOUR_SYSTEM);
        }
    }

    fn on_update(&mut self, ctx: &mut ComponentContext<'_>) {
        (self.update)(ctx);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
