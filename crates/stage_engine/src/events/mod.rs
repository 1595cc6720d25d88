//! Pointer event routing
//!
//! Components subscribe to pointer kinds on their host node through
//! [`crate::ecs::ComponentContext::listen`]. Routing only notifies registered
//! listeners:
//! - down / up / up-outside go to the listeners of the event's target
//! - move goes to every move listener, so a drag keeps tracking the pointer
//!   after it leaves the dragged node

use crate::foundation::collections::{ComponentId, NodeId};
use crate::foundation::math::Vec2;
use std::collections::BTreeMap;

/// Pointer event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PointerKind {
    /// Pointer pressed over the target
    Down,
    /// Pointer released over the target
    Up,
    /// Pointer released away from the node it was pressed on
    UpOutside,
    /// Pointer moved anywhere on the stage
    Move,
}

/// A pointer event in global (stage) coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Event type
    pub kind: PointerKind,
    /// Node under the pointer, if any
    pub target: Option<NodeId>,
    /// Global position
    pub position: Vec2,
    /// Identifies the pointer (mouse, finger) for multi-touch
    pub pointer_id: u32,
}

impl PointerEvent {
    /// Create an event for the primary pointer
    pub fn new(kind: PointerKind, target: Option<NodeId>, x: f32, y: f32) -> Self {
        Self {
            kind,
            target,
            position: Vec2::new(x, y),
            pointer_id: 0,
        }
    }

    /// Set the pointer id
    pub fn with_pointer(mut self, pointer_id: u32) -> Self {
        self.pointer_id = pointer_id;
        self
    }
}

/// Listener table keyed by node and pointer kind
#[derive(Debug, Default)]
pub struct PointerListeners {
    listeners: BTreeMap<(NodeId, PointerKind), Vec<ComponentId>>,
}

impl PointerListeners {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a component; repeated subscriptions are ignored
    pub fn listen(&mut self, node: NodeId, kind: PointerKind, component: ComponentId) {
        let entry = self.listeners.entry((node, kind)).or_default();
        if !entry.contains(&component) {
            entry.push(component);
        }
    }

    /// Unsubscribe a component; no-op when not subscribed
    pub fn unlisten(&mut self, node: NodeId, kind: PointerKind, component: ComponentId) {
        if let Some(entry) = self.listeners.get_mut(&(node, kind)) {
            entry.retain(|c| *c != component);
            if entry.is_empty() {
                self.listeners.remove(&(node, kind));
            }
        }
    }

    /// Drop every subscription on a node
    pub fn remove_node(&mut self, node: NodeId) {
        self.listeners.retain(|(n, _), _| *n != node);
    }

    /// Drop every subscription held by a component
    pub fn remove_component(&mut self, component: ComponentId) {
        self.listeners.retain(|_, entry| {
            entry.retain(|c| *c != component);
            !entry.is_empty()
        });
    }

    /// Components listening for `kind` on `node`
    pub fn listeners(&self, node: NodeId, kind: PointerKind) -> &[ComponentId] {
        self.listeners
            .get(&(node, kind))
            .map_or(&[][..], Vec::as_slice)
    }

    /// Total number of subscriptions
    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    /// True when nothing is subscribed
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Listeners an event should be delivered to, in stable order
    pub fn route(&self, event: &PointerEvent) -> Vec<(NodeId, ComponentId)> {
        match (event.kind, event.target) {
            (PointerKind::Move, _) => self
                .listeners
                .iter()
                .filter(|((_, kind), _)| *kind == PointerKind::Move)
                .flat_map(|((node, _), components)| components.iter().map(move |c| (*node, *c)))
                .collect(),
            (kind, Some(target)) => self
                .listeners(target, kind)
                .iter()
                .map(|c| (target, *c))
                .collect(),
            (_, None) => Vec::new(),
        }
    }
}
