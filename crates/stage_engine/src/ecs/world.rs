//! World: display tree, component store and pending work

use super::{Component, ComponentContext, ComponentKind, ComponentStore};
use crate::animation::Tweens;
use crate::display::DisplayTree;
use crate::events::PointerListeners;
use crate::config::ConfigError;
use crate::foundation::collections::{ComponentId, NodeId, TimerId};
use crate::frame::{Ticker, TimerOwner, Timers};
use crate::render::Viewport;
use crate::scene::LoadOptions;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;

/// Structural change requested from inside a hook or callback
///
/// Hooks cannot reach the system registry directly, so they queue commands;
/// [`super::Context::flush`] applies them in order before control returns to
/// the caller that triggered the hook.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Add an entity to a named system
    Join {
        /// System name
        system: String,
        /// Entity
        entity: NodeId,
    },
    /// Remove an entity from a named system
    Leave {
        /// System name
        system: String,
        /// Entity
        entity: NodeId,
    },
    /// Detach a component from a node
    RemoveComponent {
        /// Host
        node: NodeId,
        /// Component
        component: ComponentId,
    },
    /// Destroy a node and its subtree
    Destroy(NodeId),
}

/// Scene change requested from inside a hook or callback
#[derive(Debug, Clone, PartialEq)]
pub enum SceneRequest {
    /// Load a registered scene
    Load {
        /// Scene name
        name: String,
        /// Load options
        options: LoadOptions,
    },
    /// Unload an active scene
    Unload(String),
    /// Tear down the scene rooted at a node that is being destroyed
    Destroy(NodeId),
}

/// Everything hooks and systems may touch
///
/// The world owns the display tree (rooted at the stage), the component
/// store, pointer subscriptions, running tweens, the frame ticker with its
/// timers, and the current viewport. Systems live outside it in
/// [`super::SystemRegistry`].
#[derive(Debug)]
pub struct World {
    /// Display hierarchy
    pub tree: DisplayTree,
    /// Component storage
    pub components: ComponentStore,
    /// Pointer subscriptions
    pub events: PointerListeners,
    /// Running tweens
    pub tweens: Tweens,
    pub(crate) ticker: Ticker,
    pub(crate) timers: Timers,
    scene_roots: HashSet<NodeId>,
    stage: NodeId,
    viewport: Viewport,
    commands: VecDeque<Command>,
    scene_requests: VecDeque<SceneRequest>,
}

impl World {
    /// Create a world with an empty stage
    pub fn new() -> Self {
        let mut tree = DisplayTree::new();
        let stage = tree.create("stage");
        Self {
            tree,
            components: ComponentStore::new(),
            events: PointerListeners::new(),
            tweens: Tweens::new(),
            ticker: Ticker::new(),
            timers: Timers::new(),
            scene_roots: HashSet::new(),
            stage,
            viewport: Viewport::default(),
            commands: VecDeque::new(),
            scene_requests: VecDeque::new(),
        }
    }

    /// Root of the display tree
    pub fn stage(&self) -> NodeId {
        self.stage
    }

    /// Visible region in design coordinates
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Replace the visible region (done by the render system on resize)
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Create a detached display object
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        self.tree.create(name)
    }

    /// Components attached to a node, in attach order
    pub fn components_of(&self, node: NodeId) -> &[ComponentId] {
        self.tree.get(node).map_or(&[][..], |n| n.host().ids())
    }

    /// First attached component matching a predicate
    pub fn find_component<F>(&self, node: NodeId, mut predicate: F) -> Option<ComponentId>
    where
        F: FnMut(&dyn Component) -> bool,
    {
        self.components_of(node)
            .iter()
            .copied()
            .find(|id| self.components.get(*id).is_some_and(&mut predicate))
    }

    /// First attached component with the given capability
    pub fn find_component_by_kind(&self, node: NodeId, kind: ComponentKind) -> Option<ComponentId> {
        self.find_component(node, |c| c.kind() == kind)
    }

    /// First attached component of a concrete type
    pub fn find_component_of<T: Component>(&self, node: NodeId) -> Option<&T> {
        self.components_of(node)
            .iter()
            .find_map(|id| self.components.downcast_ref::<T>(*id))
    }

    /// Queue a structural change
    pub fn push_command(&mut self, command: Command) {
        self.commands.push_back(command);
    }

    /// Queue a scene change
    pub fn request_scene(&mut self, request: SceneRequest) {
        self.scene_requests.push_back(request);
    }

    /// Whether structural changes are waiting
    pub fn has_pending_commands(&self) -> bool {
        !self.commands.is_empty()
    }

    pub(crate) fn pop_command(&mut self) -> Option<Command> {
        self.commands.pop_front()
    }

    pub(crate) fn take_scene_requests(&mut self) -> Vec<SceneRequest> {
        self.scene_requests.drain(..).collect()
    }

    /// Per-frame listeners
    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    /// Timer arena
    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    /// Create a stopped timer owned by nobody
    pub fn create_timer(
        &mut self,
        timeout: Duration,
        callback: impl FnMut(&mut World) + 'static,
    ) -> Result<TimerId, ConfigError> {
        self.timers.create(timeout, None, Box::new(callback))
    }

    /// Create a stopped timer removed together with `owner`
    pub fn create_timer_for(
        &mut self,
        owner: TimerOwner,
        timeout: Duration,
        callback: impl FnMut(&mut World) + 'static,
    ) -> Result<TimerId, ConfigError> {
        self.timers.create(timeout, Some(owner), Box::new(callback))
    }

    /// Start a timer from zero; false if unknown
    pub fn start_timer(&mut self, id: TimerId) -> bool {
        self.timers.start(id, &mut self.ticker)
    }

    /// Stop a timer; it will not fire until started again
    pub fn stop_timer(&mut self, id: TimerId) -> bool {
        self.timers.stop(id, &mut self.ticker)
    }

    /// Start a stopped timer or restart a running one
    pub fn reset_timer(&mut self, id: TimerId) -> bool {
        self.timers.reset(id, &mut self.ticker)
    }

    /// Stop and forget a timer
    pub fn remove_timer(&mut self, id: TimerId) -> bool {
        self.timers.remove(id, &mut self.ticker)
    }

    /// Stop and forget every timer of `owner`; returns how many went
    pub fn remove_timers_owned_by(&mut self, owner: TimerOwner) -> usize {
        self.timers.remove_owned_by(owner, &mut self.ticker)
    }

    pub(crate) fn stop_all_timers(&mut self) {
        self.timers.stop_all(&mut self.ticker);
    }

    pub(crate) fn check_timer(&mut self, id: TimerId, delta: Duration) -> bool {
        self.timers.check(id, delta, &mut self.ticker)
    }

    /// Run a timer's callback with the world
    pub(crate) fn fire_timer(&mut self, id: TimerId) {
        let Some(mut callback) = self.timers.take_callback(id) else {
            return;
        };
        callback(self);
        self.timers.restore_callback(id, callback);
    }

    /// Whether `node` is the root of a live scene
    pub fn is_scene_root(&self, node: NodeId) -> bool {
        self.scene_roots.contains(&node)
    }

    pub(crate) fn mark_scene_root(&mut self, node: NodeId) {
        self.scene_roots.insert(node);
    }

    pub(crate) fn unmark_scene_root(&mut self, node: NodeId) -> bool {
        self.scene_roots.remove(&node)
    }

    /// Run a hook on a component with it checked out of the store
    ///
    /// Returns `None` when the component is unknown or already checked out
    /// (a hook re-entering its own component).
    pub fn with_component<R>(
        &mut self,
        id: ComponentId,
        host: NodeId,
        hook: impl FnOnce(&mut dyn Component, &mut ComponentContext<'_>) -> R,
    ) -> Option<R> {
        let mut component = self.components.checkout(id)?;
        let result = {
            let mut ctx = ComponentContext::new(self, host, id);
            hook(component.as_mut(), &mut ctx)
        };
        self.components.restore(id, component);
        Some(result)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
