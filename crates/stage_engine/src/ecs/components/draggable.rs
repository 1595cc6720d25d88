//! Pointer dragging

use crate::display::DisplayObject;
use crate::ecs::{Component, ComponentContext, ComponentKind, Meta};
use crate::events::{PointerEvent, PointerKind};
use crate::foundation::math::Vec2;
use std::any::Any;

type DragFn = Box<dyn FnMut(&mut DisplayObject)>;
type MoveFn = Box<dyn FnMut(&mut DisplayObject, f32, f32)>;

const POINTER_KINDS: [PointerKind; 4] = [
    PointerKind::Down,
    PointerKind::Up,
    PointerKind::UpOutside,
    PointerKind::Move,
];

/// Makes its host follow the pointer while pressed
///
/// The grab point is kept: the host moves by the pointer delta in its
/// parent's space rather than snapping its origin to the pointer. With an
/// `on_move` callback the callback decides where the host goes instead.
pub struct Draggable {
    meta: Meta,
    enable_x: bool,
    enable_y: bool,
    on_start: Option<DragFn>,
    on_move: Option<MoveFn>,
    on_end: Option<DragFn>,
    // Pointer currently dragging and where it grabbed the host, in host space
    grab: Option<(u32, Vec2)>,
}

impl Draggable {
    /// Drag freely on both axes
    pub fn new() -> Self {
        Self {
            meta: Meta::new().with("enable_x", true).with("enable_y", true),
            enable_x: true,
            enable_y: true,
            on_start: None,
            on_move: None,
            on_end: None,
            grab: None,
        }
    }

    /// Allow horizontal movement
    pub fn enable_x(mut self, enabled: bool) -> Self {
        self.enable_x = enabled;
        self.meta.insert("enable_x", enabled);
        self
    }

    /// Allow vertical movement
    pub fn enable_y(mut self, enabled: bool) -> Self {
        self.enable_y = enabled;
        self.meta.insert("enable_y", enabled);
        self
    }

    /// Called when a drag begins
    pub fn on_start(mut self, callback: impl FnMut(&mut DisplayObject) + 'static) -> Self {
        self.on_start = Some(Box::new(callback));
        self
    }

    /// Replaces default positioning; receives the proposed position
    pub fn on_move(mut self, callback: impl FnMut(&mut DisplayObject, f32, f32) + 'static) -> Self {
        self.on_move = Some(Box::new(callback));
        self
    }

    /// Called when a drag ends
    pub fn on_end(mut self, callback: impl FnMut(&mut DisplayObject) + 'static) -> Self {
        self.on_end = Some(Box::new(callback));
        self
    }

    /// Whether a pointer is currently dragging the host
    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }

    fn drag_start(&mut self, ctx: &mut ComponentContext<'_>, event: &PointerEvent) {
        // One pointer drags at a time
        if self.grab.is_some() {
            return;
        }
        let host = ctx.host();
        let grab = ctx
            .world()
            .tree
            .to_local(host, event.position)
            .unwrap_or_else(Vec2::zeros);
        self.grab = Some((event.pointer_id, grab));

        if let (Some(callback), Some(node)) = (self.on_start.as_mut(), ctx.node_mut()) {
            callback(node);
        }
    }

    fn drag_end(&mut self, ctx: &mut ComponentContext<'_>, event: &PointerEvent) {
        match self.grab {
            Some((pointer, _)) if pointer == event.pointer_id => self.grab = None,
            _ => return,
        }
        if let (Some(callback), Some(node)) = (self.on_end.as_mut(), ctx.node_mut()) {
            callback(node);
        }
    }

    fn drag_move(&mut self, ctx: &mut ComponentContext<'_>, event: &PointerEvent) {
        let Some((pointer, grab)) = self.grab else {
            return;
        };
        if pointer != event.pointer_id {
            return;
        }

        let tree = &ctx.world().tree;
        let current = match ctx.node().and_then(DisplayObject::parent) {
            Some(parent) => tree.to_local(parent, event.position),
            None => Some(event.position),
        };
        // A zero-scale ancestor has no inverse; skip the move
        let Some(current) = current else {
            return;
        };
        let next = current - grab;

        let Some(node) = ctx.node_mut() else {
            return;
        };
        if let Some(callback) = self.on_move.as_mut() {
            callback(node, next.x, next.y);
        } else {
            if self.enable_x {
                node.set_position_x(next.x);
            }
            if self.enable_y {
                node.set_position_y(next.y);
            }
        }
    }
}

impl Default for Draggable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Draggable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Draggable")
            .field("enable_x", &self.enable_x)
            .field("enable_y", &self.enable_y)
            .field("dragging", &self.is_dragging())
            .finish_non_exhaustive()
    }
}

impl Component for Draggable {
    fn name(&self) -> &str {
        "draggable"
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Draggable
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn on_added(&mut self, ctx: &mut ComponentContext<'_>) {
        if let Some(node) = ctx.node_mut() {
            node.set_interactive(true);
        }
        for kind in POINTER_KINDS {
            ctx.listen(kind);
        }
    }

    fn on_removed(&mut self, ctx: &mut ComponentContext<'_>) {
        self.grab = None;
        if let Some(node) = ctx.node_mut() {
            node.set_interactive(false);
        }
        for kind in POINTER_KINDS {
            ctx.unlisten(kind);
        }
    }

    fn on_pointer(&mut self, ctx: &mut ComponentContext<'_>, event: &PointerEvent) {
        match event.kind {
            PointerKind::Down => self.drag_start(ctx, event),
            PointerKind::Up | PointerKind::UpOutside => self.drag_end(ctx, event),
            PointerKind::Move => self.drag_move(ctx, event),
        }
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
    use crate::ecs::{Context, SystemRegistry, World};
    use crate::foundation::collections::NodeId;
    use std::cell::Cell;
    use std::rc::Rc;

    fn dragged_card() -> (World, SystemRegistry, NodeId) {
        let mut world = World::new();
        let mut systems = SystemRegistry::new();
        let card = world.create_node("card");
        let stage = world.stage();
        world.tree.add_child(stage, card).unwrap();
        world.tree.get_mut(card).unwrap().set_position(100.0, 100.0);
        Context::new(&mut world, &mut systems)
            .attach(card, Box::new(Draggable::new()))
            .unwrap();
        (world, systems, card)
    }

    fn send(world: &mut World, event: PointerEvent) {
        for (node, component) in world.events.route(&event) {
            world.with_component(component, node, |c, ctx| c.on_pointer(ctx, &event));
        }
    }

    fn is_dragging(world: &World, card: NodeId) -> bool {
        world
            .find_component_of::<Draggable>(card)
            .is_some_and(Draggable::is_dragging)
    }

    #[test]
    fn test_other_pointer_release_keeps_drag() {
        let (mut world, _systems, card) = dragged_card();

        send(&mut world, PointerEvent::new(PointerKind::Down, Some(card), 110.0, 110.0).with_pointer(1));
        send(&mut world, PointerEvent::new(PointerKind::Down, Some(card), 120.0, 120.0).with_pointer(2));
        send(&mut world, PointerEvent::new(PointerKind::Up, Some(card), 120.0, 120.0).with_pointer(2));
        assert!(is_dragging(&world, card));

        send(&mut world, PointerEvent::new(PointerKind::Move, None, 130.0, 150.0).with_pointer(1));
        assert_eq!(world.tree.get(card).unwrap().position, Vec2::new(120.0, 140.0));

        send(&mut world, PointerEvent::new(PointerKind::Up, Some(card), 130.0, 150.0).with_pointer(1));
        assert!(!is_dragging(&world, card));
    }

    #[test]
    fn test_end_callback_fires_once_per_drag() {
        let (mut world, mut systems, card) = dragged_card();
        let ended = Rc::new(Cell::new(0));
        let counter = Rc::clone(&ended);
        let id = world.find_component(card, |c| c.kind() == ComponentKind::Draggable).unwrap();
        assert!(Context::new(&mut world, &mut systems).remove_component(card, id));
        Context::new(&mut world, &mut systems)
            .attach(
                card,
                Box::new(Draggable::new().on_end(move |_| counter.set(counter.get() + 1))),
            )
            .unwrap();

        send(&mut world, PointerEvent::new(PointerKind::Down, Some(card), 110.0, 110.0));
        send(&mut world, PointerEvent::new(PointerKind::Up, Some(card), 110.0, 110.0));
        send(&mut world, PointerEvent::new(PointerKind::UpOutside, Some(card), 110.0, 110.0));
        assert_eq!(ended.get(), 1);
    }
}
