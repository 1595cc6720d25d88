//! Edge anchoring for HUD and widget hosts

use super::{HUD_SYSTEM, WIDGET_SYSTEM};
use crate::ecs::{ComponentKind, EntitySet, Meta, System, SystemError, World};
use crate::foundation::collections::NodeId;
use crate::render::Viewport;
use std::any::Any;

/// Position implied by edge offsets, per axis
///
/// `left`/`top` measure from the viewport's near edges and `right`/`bottom`
/// from the far ones; when both edges of an axis are given the far edge
/// wins. With `percentage` set, horizontal offsets are fractions of the
/// viewport width and vertical ones of its height. Axes without offsets
/// come back as `None`.
pub fn anchor_position(meta: &Meta, viewport: &Viewport) -> Result<(Option<f32>, Option<f32>), SystemError> {
    let percentage = meta.flag("percentage")?.unwrap_or(false);
    let (unit_x, unit_y) = if percentage {
        (viewport.width(), viewport.height())
    } else {
        (1.0, 1.0)
    };

    let mut x = None;
    let mut y = None;
    if let Some(left) = meta.number("left")? {
        x = Some(viewport.left + left * unit_x);
    }
    if let Some(right) = meta.number("right")? {
        x = Some(viewport.right - right * unit_x);
    }
    if let Some(top) = meta.number("top")? {
        y = Some(viewport.top + top * unit_y);
    }
    if let Some(bottom) = meta.number("bottom")? {
        y = Some(viewport.bottom - bottom * unit_y);
    }
    Ok((x, y))
}

/// Keeps hosts at fixed offsets from the viewport edges
///
/// One instance drives HUD components and another drives widgets; they
/// differ only in the component kind they look up on each entity.
#[derive(Debug)]
pub struct AnchorSystem {
    name: &'static str,
    kind: ComponentKind,
    entities: EntitySet,
}

impl AnchorSystem {
    /// System for [`crate::ecs::components::Hud`]
    pub fn hud() -> Self {
        Self {
            name: HUD_SYSTEM,
            kind: ComponentKind::Hud,
            entities: EntitySet::new(),
        }
    }

    /// System for [`crate::ecs::components::Widget`]
    pub fn widget() -> Self {
        Self {
            name: WIDGET_SYSTEM,
            kind: ComponentKind::Widget,
            entities: EntitySet::new(),
        }
    }

    /// Component kind this instance reads
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }
}

impl System for AnchorSystem {
    fn name(&self) -> &str {
        self.name
    }

    fn entities(&self) -> &EntitySet {
        &self.entities
    }

    fn entities_mut(&mut self) -> &mut EntitySet {
        &mut self.entities
    }

    fn update(&mut self, entity: NodeId, world: &mut World) -> Result<(), SystemError> {
        let component = world
            .find_component_by_kind(entity, self.kind)
            .and_then(|id| world.components.get(id))
            .ok_or_else(|| SystemError::MissingComponent {
                kind: self.name.to_string(),
            })?;
        let (x, y) = anchor_position(component.meta(), &world.viewport())?;

        if let Some(node) = world.tree.get_mut(entity) {
            if let Some(x) = x {
                node.set_position_x(x);
            }
            if let Some(y) = y {
                node.set_position_y(y);
            }
        }
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
    use crate::ecs::components::{Hud, Widget};
    use crate::ecs::{Context, SystemRegistry};
    use crate::foundation::math::Size;
    use approx::assert_relative_eq;

    fn viewport(left: f32, right: f32, top: f32, bottom: f32) -> Viewport {
        Viewport { left, right, top, bottom }
    }

    #[test]
    fn test_right_offset_leaves_y_untouched() {
        let meta = Meta::new().with("right", 10.0);
        let (x, y) = anchor_position(&meta, &viewport(0.0, 750.0, 0.0, 1334.0)).unwrap();
        assert_relative_eq!(x.unwrap(), 740.0);
        assert!(y.is_none());
    }

    #[test]
    fn test_percentage_scales_by_viewport_size() {
        let meta = Meta::new()
            .with("left", 0.1)
            .with("bottom", 0.5)
            .with("percentage", true);
        let (x, y) = anchor_position(&meta, &viewport(-20.0, 980.0, 0.0, 400.0)).unwrap();
        assert_relative_eq!(x.unwrap(), -20.0 + 100.0);
        assert_relative_eq!(y.unwrap(), 200.0);
    }

    #[test]
    fn test_far_edge_wins() {
        let meta = Meta::new().with("left", 5.0).with("right", 10.0);
        let (x, _) = anchor_position(&meta, &viewport(0.0, 100.0, 0.0, 100.0)).unwrap();
        assert_relative_eq!(x.unwrap(), 90.0);
    }

    #[test]
    fn test_bad_meta_is_reported() {
        let meta = Meta::new().with("left", "ten");
        assert!(matches!(
            anchor_position(&meta, &Viewport::default()),
            Err(SystemError::InvalidMeta { .. })
        ));
    }

    #[test]
    fn test_update_moves_hud_host() {
        let mut world = World::new();
        world.set_viewport(Viewport::from_size(Size::new(750.0, 1334.0)));
        let mut systems = SystemRegistry::new();
        systems.register(Box::new(AnchorSystem::hud()));
        systems.register(Box::new(AnchorSystem::widget()));

        let node = world.create_node("score");
        world.tree.get_mut(node).unwrap().set_position(1.0, 33.0);
        Context::new(&mut world, &mut systems)
            .attach(node, Box::new(Hud::new().right(10.0)))
            .unwrap();
        assert!(systems.has_entity(HUD_SYSTEM, node));
        assert!(!systems.has_entity(WIDGET_SYSTEM, node));

        systems.update(&mut world);
        let position = world.tree.get(node).unwrap().position;
        assert_relative_eq!(position.x, 740.0);
        assert_relative_eq!(position.y, 33.0);
    }

    #[test]
    fn test_second_component_keeps_membership() {
        let mut world = World::new();
        let mut systems = SystemRegistry::new();
        systems.register(Box::new(AnchorSystem::widget()));
        let node = world.create_node("button");

        let mut ctx = Context::new(&mut world, &mut systems);
        let first = ctx.attach(node, Box::new(Widget::new().top(4.0))).unwrap();
        ctx.attach(node, Box::new(Widget::new().left(4.0))).unwrap();
        ctx.remove_component(node, first);
        assert!(systems.has_entity(WIDGET_SYSTEM, node));
        assert_eq!(systems.get(WIDGET_SYSTEM).unwrap().entities().len(), 1);
    }
}
