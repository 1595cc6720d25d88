//! System trait and the ordered entity set every system keeps

use super::World;
use crate::config::ConfigError;
use crate::foundation::collections::NodeId;
use crate::foundation::math::Size;
use std::any::Any;
use std::collections::HashSet;
use thiserror::Error;

/// Per-entity system failure
///
/// Returned from [`System::update`]; the registry logs it and moves on to the
/// next entity.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SystemError {
    /// Component metadata has the wrong shape
    #[error("invalid meta `{key}`: {reason}")]
    InvalidMeta {
        /// Meta key
        key: String,
        /// What was wrong
        reason: String,
    },

    /// The entity lacks the component this system drives
    #[error("entity has no {kind} component")]
    MissingComponent {
        /// Expected component kind
        kind: String,
    },
}

/// Insertion-ordered set of entities without duplicates
#[derive(Debug, Clone, Default)]
pub struct EntitySet {
    order: Vec<NodeId>,
    members: HashSet<NodeId>,
}

impl EntitySet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity; false if it was already present
    pub fn insert(&mut self, entity: NodeId) -> bool {
        if !self.members.insert(entity) {
            return false;
        }
        self.order.push(entity);
        true
    }

    /// Remove an entity; false if it was absent
    pub fn remove(&mut self, entity: NodeId) -> bool {
        if !self.members.remove(&entity) {
            return false;
        }
        self.order.retain(|e| *e != entity);
        true
    }

    /// True if `entity` is registered
    pub fn contains(&self, entity: NodeId) -> bool {
        self.members.contains(&entity)
    }

    /// Number of registered entities
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no entity is registered
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entities in insertion order
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order.iter().copied()
    }

    /// Copy of the current membership, safe to iterate while mutating
    pub fn snapshot(&self) -> Vec<NodeId> {
        self.order.clone()
    }

    /// Drop every entity
    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }
}

/// Per-frame processor over a set of entities
///
/// Systems are registered by name. Components join and leave them from their
/// lifecycle hooks; each frame the registry calls [`System::begin_frame`]
/// once and then [`System::update`] for every entity still registered.
pub trait System: Any {
    /// Unique registry name
    fn name(&self) -> &str;

    /// Entities this system processes
    fn entities(&self) -> &EntitySet;

    /// Mutable access to the entity set
    fn entities_mut(&mut self) -> &mut EntitySet;

    /// Register an entity; adding twice keeps a single entry
    fn add_entity(&mut self, entity: NodeId) -> bool {
        self.entities_mut().insert(entity)
    }

    /// Deregister an entity; absent entities are ignored
    fn remove_entity(&mut self, entity: NodeId) -> bool {
        self.entities_mut().remove(entity)
    }

    /// Called once per frame before any entity update
    fn begin_frame(&mut self, _world: &mut World) {}

    /// Process one entity
    fn update(&mut self, entity: NodeId, world: &mut World) -> Result<(), SystemError>;

    /// React to a device resize
    fn on_resize(&mut self, _size: Size, _world: &mut World) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Downcast hook for typed registry lookups
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast hook
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
