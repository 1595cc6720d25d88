//! Named, ordered system registry

use super::{Context, System, World};
use crate::config::ConfigError;
use crate::foundation::collections::NodeId;
use crate::foundation::math::Size;

/// Systems in registration order, looked up by name
///
/// Registration order is update order. Registering a second system under an
/// existing name replaces the first in place.
#[derive(Default)]
pub struct SystemRegistry {
    systems: Vec<Box<dyn System>>,
}

impl SystemRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a system, replacing any with the same name
    pub fn register(&mut self, system: Box<dyn System>) {
        if let Some(slot) = self.systems.iter_mut().find(|s| s.name() == system.name()) {
            log::warn!("Replacing system '{}'", system.name());
            *slot = system;
        } else {
            log::debug!("Registered system '{}'", system.name());
            self.systems.push(system);
        }
    }

    /// System registered under `name`
    pub fn get(&self, name: &str) -> Option<&dyn System> {
        self.systems.iter().find(|s| s.name() == name).map(|s| s.as_ref())
    }

    /// Mutable access to the system registered under `name`
    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn System + 'static)> {
        self.systems.iter_mut().find(|s| s.name() == name).map(|s| s.as_mut())
    }

    /// Look up a system by name and concrete type
    pub fn get_as<T: System>(&self, name: &str) -> Option<&T> {
        self.get(name)?.as_any().downcast_ref::<T>()
    }

    /// Look up a system by name and concrete type, mutably
    pub fn get_as_mut<T: System>(&mut self, name: &str) -> Option<&mut T> {
        self.get_mut(name)?.as_any_mut().downcast_mut::<T>()
    }

    /// Add an entity to a named system; false when unknown or already present
    pub fn add_entity(&mut self, system: &str, entity: NodeId) -> bool {
        match self.get_mut(system) {
            Some(system) => system.add_entity(entity),
            None => {
                log::warn!("No system named '{system}'");
                false
            }
        }
    }

    /// Remove an entity from a named system
    pub fn remove_entity(&mut self, system: &str, entity: NodeId) -> bool {
        self.get_mut(system).is_some_and(|s| s.remove_entity(entity))
    }

    /// Remove an entity from every system
    pub fn remove_everywhere(&mut self, entity: NodeId) {
        for system in &mut self.systems {
            system.remove_entity(entity);
        }
    }

    /// Whether the named system currently holds the entity
    pub fn has_entity(&self, system: &str, entity: NodeId) -> bool {
        self.get(system).is_some_and(|s| s.entities().contains(entity))
    }

    /// System names in update order
    pub fn names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    /// Number of registered systems
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// True when no system is registered
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Run one frame of every system
    ///
    /// Each system iterates a snapshot of its entities. Entities destroyed or
    /// deregistered earlier in the same pass are skipped. A failing entity is
    /// logged and does not stop the rest. Commands queued during an update are
    /// flushed before the next entity runs.
    pub fn update(&mut self, world: &mut World) {
        for index in 0..self.systems.len() {
            self.systems[index].begin_frame(world);
            let entities = self.systems[index].entities().snapshot();

            for entity in entities {
                let system = &mut self.systems[index];
                if !system.entities().contains(entity) || !world.tree.contains(entity) {
                    continue;
                }
                if let Err(err) = system.update(entity, world) {
                    log::warn!("System '{}' failed on {entity:?}: {err}", system.name());
                }
                Context::new(world, self).flush();
            }
        }
    }

    /// Notify every system of a device resize, stopping at the first error
    pub fn resize(&mut self, size: Size, world: &mut World) -> Result<(), ConfigError> {
        for system in &mut self.systems {
            system.on_resize(size, world)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for SystemRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemRegistry")
            .field("systems", &self.names())
            .finish()
    }
}
