//! Scenes: top-level, independently loadable display subtrees

mod scene_manager;

pub use scene_manager::SceneManager;

use crate::ecs::{Component, Context, EcsError, SceneRequest, SystemRegistry, World};
use crate::config::ConfigError;
use crate::foundation::collections::{ComponentId, NodeId, TimerId};
use crate::frame::TimerOwner;
use std::time::Duration;
use thiserror::Error;

/// Default fade-in length for transitioned loads
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(500);

/// Scene construction errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// The scene could not build its content
    #[error("scene {scene} failed to build: {reason}")]
    Build {
        /// Scene name
        scene: String,
        /// What went wrong
        reason: String,
    },

    /// A component or node operation failed while building
    #[error(transparent)]
    Ecs(#[from] EcsError),
}

/// Options for [`SceneManager::load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Survive the sweep performed by later loads
    pub sticky: bool,
    /// Fade the scene in
    pub transition: bool,
    /// Fade-in length
    pub duration: Duration,
}

impl LoadOptions {
    /// Non-sticky, no transition
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the scene alive across later exclusive loads
    pub fn sticky(mut self, sticky: bool) -> Self {
        self.sticky = sticky;
        self
    }

    /// Fade in over `duration`
    pub fn transition(mut self, duration: Duration) -> Self {
        self.transition = true;
        self.duration = duration;
        self
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            sticky: false,
            transition: false,
            duration: DEFAULT_TRANSITION,
        }
    }
}

/// Where a scene name stands in a manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    /// Never registered
    Unregistered,
    /// Registered, no live instance
    Registered,
    /// Live instance on the stage
    Active,
    /// Live instance exempt from sweeps
    ActiveSticky,
    /// Instance torn down; its node id is never reused
    Destroyed,
}

/// A loadable scene
///
/// A fresh value is created by the registered factory on every load.
/// `on_added` runs once the scene node is on the stage and builds its
/// content; `on_removed` runs right before the subtree is destroyed.
pub trait Scene {
    /// Build children and components under the scene node
    fn on_added(&mut self, ctx: &mut SceneContext<'_>) -> Result<(), SceneError>;

    /// Release anything held outside the display tree
    fn on_removed(&mut self, _ctx: &mut SceneContext<'_>) {}
}

/// What a scene hook can reach
pub struct SceneContext<'a> {
    world: &'a mut World,
    systems: &'a mut SystemRegistry,
    node: NodeId,
    name: &'a str,
}

impl<'a> SceneContext<'a> {
    pub(crate) fn new(
        world: &'a mut World,
        systems: &'a mut SystemRegistry,
        node: NodeId,
        name: &'a str,
    ) -> Self {
        Self { world, systems, node, name }
    }

    /// Scene root node
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Registered scene name
    pub fn name(&self) -> &str {
        self.name
    }

    /// The world
    pub fn world(&self) -> &World {
        self.world
    }

    /// The world, mutably
    pub fn world_mut(&mut self) -> &mut World {
        self.world
    }

    /// Component host operations
    pub fn context(&mut self) -> Context<'_> {
        Context::new(self.world, self.systems)
    }

    /// Create a node under `parent`
    pub fn create_child(&mut self, parent: NodeId, name: &str) -> Result<NodeId, EcsError> {
        let node = self.world.create_node(name);
        self.world.tree.add_child(parent, node)?;
        Ok(node)
    }

    /// Create a node directly under the scene root
    pub fn create(&mut self, name: &str) -> Result<NodeId, EcsError> {
        self.create_child(self.node, name)
    }

    /// Attach a component to a node
    pub fn attach(&mut self, node: NodeId, component: Box<dyn Component>) -> Result<ComponentId, EcsError> {
        self.context().attach(node, component)
    }

    /// Create a stopped timer that is removed when the scene is destroyed
    ///
    /// ```
    /// use stage_engine::prelude::*;
    /// use std::time::Duration;
    ///
    /// struct Splash;
    ///
    /// impl Scene for Splash {
    ///     fn on_added(&mut self, ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
    ///         let timer = ctx
    ///             .create_timer(Duration::from_millis(100), |world| {
    ///                 world.request_scene(SceneRequest::Load {
    ///                     name: "title".to_string(),
    ///                     options: LoadOptions::new(),
    ///                 });
    ///             })
    ///             .map_err(|err| SceneError::Build { scene: "splash".to_string(), reason: err.to_string() })?;
    ///         ctx.world_mut().start_timer(timer);
    ///         Ok(())
    ///     }
    /// }
    ///
    /// let mut engine = Engine::headless(EngineConfig::default()).unwrap();
    /// engine.register_scene("splash", || Box::new(Splash));
    /// engine.load_scene("splash", LoadOptions::new());
    /// engine.tick(0.2);
    /// assert!(engine.scenes().find("splash").is_none());
    /// ```
    pub fn create_timer(
        &mut self,
        timeout: Duration,
        callback: impl FnMut(&mut World) + 'static,
    ) -> Result<TimerId, ConfigError> {
        self.world
            .create_timer_for(TimerOwner::Node(self.node), timeout, callback)
    }

    /// Load another scene once this hook returns
    pub fn load_scene(&mut self, name: &str, options: LoadOptions) {
        self.world.request_scene(SceneRequest::Load {
            name: name.to_string(),
            options,
        });
    }

    /// Unload a scene once this hook returns
    pub fn unload_scene(&mut self, name: &str) {
        self.world.request_scene(SceneRequest::Unload(name.to_string()));
    }
}
