//! Lifecycle coordination between components, hosts and systems

use super::world::{Command, SceneRequest};
use super::{Component, ComponentKind, SystemRegistry, World};
use crate::display::{DisplayObject, TreeError};
use crate::events::PointerKind;
use crate::config::ConfigError;
use crate::foundation::collections::{ComponentId, NodeId, TimerId};
use crate::frame::TimerOwner;
use crate::scene::LoadOptions;
use std::time::Duration;
use thiserror::Error;

/// Component host errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The component is already attached to another host
    #[error("component {component:?} is already attached to {host:?}")]
    DuplicateComponent {
        /// Component
        component: ComponentId,
        /// Its current host
        host: NodeId,
    },

    /// The component id is not in the store
    #[error("unknown component: {0:?}")]
    UnknownComponent(ComponentId),

    /// The node id is not in the tree
    #[error("unknown display object: {0:?}")]
    UnknownNode(NodeId),

    /// Structural tree error
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// What a component hook can reach
///
/// Direct access to the world, plus queued operations that need the system
/// registry or the scene manager.
pub struct ComponentContext<'a> {
    world: &'a mut World,
    host: NodeId,
    component: ComponentId,
}

impl<'a> ComponentContext<'a> {
    pub(crate) fn new(world: &'a mut World, host: NodeId, component: ComponentId) -> Self {
        Self { world, host, component }
    }

    /// Host of the running component
    pub fn host(&self) -> NodeId {
        self.host
    }

    /// Id of the running component
    pub fn component_id(&self) -> ComponentId {
        self.component
    }

    /// The world
    pub fn world(&self) -> &World {
        self.world
    }

    /// The world, mutably
    pub fn world_mut(&mut self) -> &mut World {
        self.world
    }

    /// The host display object
    pub fn node(&self) -> Option<&DisplayObject> {
        self.world.tree.get(self.host)
    }

    /// The host display object, mutably
    pub fn node_mut(&mut self) -> Option<&mut DisplayObject> {
        self.world.tree.get_mut(self.host)
    }

    /// Whether the host carries another component of `kind` besides this one
    ///
    /// Several components may feed the same system; the host should only
    /// leave it when the last one goes.
    pub fn host_has_other(&self, kind: ComponentKind) -> bool {
        self.world
            .components_of(self.host)
            .iter()
            .filter(|id| **id != self.component)
            .any(|id| self.world.components.get(*id).is_some_and(|c| c.kind() == kind))
    }

    /// Register the host with a named system
    pub fn join(&mut self, system: &str) {
        self.world.push_command(Command::Join {
            system: system.to_string(),
            entity: self.host,
        });
    }

    /// Deregister the host from a named system
    pub fn leave(&mut self, system: &str) {
        self.world.push_command(Command::Leave {
            system: system.to_string(),
            entity: self.host,
        });
    }

    /// Subscribe this component to a pointer event on its host
    pub fn listen(&mut self, kind: PointerKind) {
        self.world.events.listen(self.host, kind, self.component);
    }

    /// Unsubscribe this component from a pointer event on its host
    pub fn unlisten(&mut self, kind: PointerKind) {
        self.world.events.unlisten(self.host, kind, self.component);
    }

    /// Detach this component once the hook returns
    pub fn remove_self(&mut self) {
        self.world.push_command(Command::RemoveComponent {
            node: self.host,
            component: self.component,
        });
    }

    /// Destroy the host once the hook returns
    pub fn destroy_host(&mut self) {
        self.world.push_command(Command::Destroy(self.host));
    }

    /// Create a stopped timer that is removed when this component is detached
    ///
    /// Start and stop it through [`World::start_timer`] and friends.
    pub fn create_timer(
        &mut self,
        timeout: Duration,
        callback: impl FnMut(&mut World) + 'static,
    ) -> Result<TimerId, ConfigError> {
        self.world
            .create_timer_for(TimerOwner::Component(self.component), timeout, callback)
    }

    /// Ask the scene manager to load a scene
    pub fn load_scene(&mut self, name: &str, options: LoadOptions) {
        self.world.request_scene(SceneRequest::Load {
            name: name.to_string(),
            options,
        });
    }

    /// Ask the scene manager to unload a scene
    pub fn unload_scene(&mut self, name: &str) {
        self.world.request_scene(SceneRequest::Unload(name.to_string()));
    }
}

/// Mutable view over the world and the system registry
///
/// This is the component host: attaching, detaching and destroying go
/// through here so hooks fire and system membership stays consistent.
pub struct Context<'a> {
    /// The world
    pub world: &'a mut World,
    /// Registered systems
    pub systems: &'a mut SystemRegistry,
}

impl<'a> Context<'a> {
    /// Borrow a world and registry together
    pub fn new(world: &'a mut World, systems: &'a mut SystemRegistry) -> Self {
        Self { world, systems }
    }

    /// Store a component and attach it to `node`
    pub fn attach(&mut self, node: NodeId, component: Box<dyn Component>) -> Result<ComponentId, EcsError> {
        if !self.world.tree.contains(node) {
            return Err(EcsError::UnknownNode(node));
        }
        let id = self.world.components.insert(component);
        self.add_component(node, id)?;
        Ok(id)
    }

    /// Attach a stored component to `node` and fire `on_added`
    ///
    /// Attaching to the host it already has is a no-op; attaching a component
    /// owned by a different host fails.
    pub fn add_component(&mut self, node: NodeId, id: ComponentId) -> Result<(), EcsError> {
        if !self.world.tree.contains(node) {
            return Err(EcsError::UnknownNode(node));
        }
        if !self.world.components.contains(id) {
            return Err(EcsError::UnknownComponent(id));
        }
        match self.world.components.host(id) {
            Some(host) if host == node => {
                log::debug!("Component {id:?} already attached to {node:?}");
                return Ok(());
            }
            Some(host) => return Err(EcsError::DuplicateComponent { component: id, host }),
            None => {}
        }

        self.world.components.set_host(id, Some(node));
        if let Some(object) = self.world.tree.get_mut(node) {
            object.host.push(id);
        }
        self.world.with_component(id, node, |component, ctx| component.on_added(ctx));
        self.flush();
        Ok(())
    }

    /// Fire `on_removed` and detach; returns false when not attached to `node`
    ///
    /// The component stays in the store and may be attached again.
    pub fn remove_component(&mut self, node: NodeId, id: ComponentId) -> bool {
        let attached = self
            .world
            .tree
            .get(node)
            .is_some_and(|object| object.host().contains(id));
        if !attached {
            return false;
        }

        self.world.with_component(id, node, |component, ctx| component.on_removed(ctx));
        self.world.remove_timers_owned_by(TimerOwner::Component(id));
        if let Some(object) = self.world.tree.get_mut(node) {
            object.host.remove(id);
        }
        self.world.components.set_host(id, None);
        self.flush();
        true
    }

    /// First component on `node` matching a predicate
    pub fn find_component<F>(&self, node: NodeId, predicate: F) -> Option<ComponentId>
    where
        F: FnMut(&dyn Component) -> bool,
    {
        self.world.find_component(node, predicate)
    }

    /// Destroy a node, its subtree and every component attached within it
    ///
    /// Children go first, deepest first. For each node its components are
    /// detached (firing `on_removed`) and dropped, then it is removed from
    /// every system, its pointer subscriptions, tweens and owned timers are
    /// dropped, and it is released from the tree.
    ///
    /// The root of a live scene is handed to the scene manager instead, which
    /// runs the scene's `on_removed` and then destroys it the same way.
    pub fn destroy(&mut self, node: NodeId) -> Result<(), EcsError> {
        if !self.world.tree.contains(node) {
            return Err(EcsError::UnknownNode(node));
        }
        if node == self.world.stage() {
            log::warn!("Refusing to destroy the stage");
            return Ok(());
        }
        if self.world.is_scene_root(node) {
            self.world.request_scene(SceneRequest::Destroy(node));
            return Ok(());
        }

        for id in self.world.tree.post_order(node) {
            self.teardown(id);
        }
        Ok(())
    }

    fn teardown(&mut self, node: NodeId) {
        // An earlier hook in the same cascade may already have destroyed it
        if !self.world.tree.contains(node) {
            return;
        }

        let attached: Vec<ComponentId> = self.world.components_of(node).to_vec();
        for id in attached {
            self.remove_component(node, id);
            self.world.events.remove_component(id);
            self.world.components.remove(id);
        }

        self.systems.remove_everywhere(node);
        self.world.events.remove_node(node);
        self.world.tweens.remove_target(node);
        self.world.remove_timers_owned_by(TimerOwner::Node(node));
        // A scene nested in a destroyed subtree; the manager drops its entry
        self.world.unmark_scene_root(node);
        self.world.tree.release(node);
    }

    /// Apply queued structural commands in order
    ///
    /// Scene requests are left queued for the scene manager.
    pub fn flush(&mut self) {
        while let Some(command) = self.world.pop_command() {
            match command {
                Command::Join { system, entity } => {
                    if self.world.tree.contains(entity) {
                        self.systems.add_entity(&system, entity);
                    }
                }
                Command::Leave { system, entity } => {
                    self.systems.remove_entity(&system, entity);
                }
                Command::RemoveComponent { node, component } => {
                    self.remove_component(node, component);
                }
                Command::Destroy(node) => {
                    if self.world.tree.contains(node) {
                        if let Err(err) = self.destroy(node) {
                            log::warn!("Deferred destroy failed: {err}");
                        }
                    }
                }
            }
        }
    }
}
