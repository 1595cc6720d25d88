//! Component storage

use super::Component;
use crate::foundation::collections::{ComponentId, NodeId, SlotMap};

struct ComponentSlot {
    host: Option<NodeId>,
    // `None` while the component is checked out to run one of its hooks
    component: Option<Box<dyn Component>>,
}

/// Owns every live component and its host back-reference
///
/// Components enter the store unattached. The host link is maintained by the
/// engine context; the store only records it.
#[derive(Default)]
pub struct ComponentStore {
    slots: SlotMap<ComponentId, ComponentSlot>,
}

impl ComponentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an unattached component
    pub fn insert(&mut self, component: Box<dyn Component>) -> ComponentId {
        self.slots.insert(ComponentSlot {
            host: None,
            component: Some(component),
        })
    }

    /// Whether the id refers to a live component
    pub fn contains(&self, id: ComponentId) -> bool {
        self.slots.contains_key(id)
    }

    /// Current host, `None` when unattached or unknown
    pub fn host(&self, id: ComponentId) -> Option<NodeId> {
        self.slots.get(id).and_then(|slot| slot.host)
    }

    /// Borrow a component
    pub fn get(&self, id: ComponentId) -> Option<&dyn Component> {
        self.slots.get(id)?.component.as_deref()
    }

    /// Mutably borrow a component
    pub fn get_mut(&mut self, id: ComponentId) -> Option<&mut (dyn Component + 'static)> {
        self.slots.get_mut(id)?.component.as_deref_mut()
    }

    /// Borrow a component as its concrete type
    pub fn downcast_ref<T: Component>(&self, id: ComponentId) -> Option<&T> {
        self.get(id)?.as_any().downcast_ref::<T>()
    }

    /// Mutably borrow a component as its concrete type
    pub fn downcast_mut<T: Component>(&mut self, id: ComponentId) -> Option<&mut T> {
        self.get_mut(id)?.as_any_mut().downcast_mut::<T>()
    }

    /// Number of live components
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when the store is empty
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub(crate) fn set_host(&mut self, id: ComponentId, host: Option<NodeId>) {
        if let Some(slot) = self.slots.get_mut(id) {
            slot.host = host;
        }
    }

    pub(crate) fn checkout(&mut self, id: ComponentId) -> Option<Box<dyn Component>> {
        self.slots.get_mut(id)?.component.take()
    }

    pub(crate) fn restore(&mut self, id: ComponentId, component: Box<dyn Component>) {
        if let Some(slot) = self.slots.get_mut(id) {
            slot.component = Some(component);
        }
    }

    pub(crate) fn remove(&mut self, id: ComponentId) -> Option<Box<dyn Component>> {
        self.slots.remove(id)?.component
    }
}

impl std::fmt::Debug for ComponentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentStore")
            .field("len", &self.slots.len())
            .finish()
    }
}
