//! Scene registration and the load/unload state machine

use super::{LoadOptions, Scene, SceneContext, SceneState};
use crate::animation::Tween;
use crate::ecs::{Context, SceneRequest};
use crate::foundation::collections::NodeId;
use std::collections::HashMap;

type SceneFactory = Box<dyn Fn() -> Box<dyn Scene>>;

/// Scene requests applied per call before giving up on a load loop
const MAX_REQUEST_ROUNDS: usize = 64;

struct ActiveScene {
    name: String,
    node: NodeId,
    sticky: bool,
    scene: Box<dyn Scene>,
}

/// Registered scene factories and the live scene instances
///
/// ```
/// use stage_engine::prelude::*;
///
/// struct Title;
///
/// impl Scene for Title {
///     fn on_added(&mut self, ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
///         ctx.create("logo")?;
///         Ok(())
///     }
/// }
///
/// let mut engine = Engine::headless(EngineConfig::default()).unwrap();
/// engine.register_scene("title", || Box::new(Title));
/// assert!(engine.load_scene("title", LoadOptions::new()));
/// assert!(engine.scenes().find("title").is_some());
/// ```
#[derive(Default)]
pub struct SceneManager {
    registry: HashMap<String, SceneFactory>,
    active: Vec<ActiveScene>,
}

impl SceneManager {
    /// Manager with no registrations
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scene factory; an existing registration is replaced
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Scene> + 'static,
    {
        let name = name.into();
        if self.registry.insert(name.clone(), Box::new(factory)).is_some() {
            log::debug!("Scene '{name}' re-registered, previous factory replaced");
        } else {
            log::debug!("Scene '{name}' registered");
        }
    }

    /// True if a factory is registered under `name`
    pub fn is_registered(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }

    /// Sweep non-sticky scenes, then instantiate and attach `name`
    ///
    /// Returns false without touching the stage beyond the sweep when `name`
    /// is empty (nothing requested, not logged) or unregistered (logged as an
    /// error), or when the scene fails to build. A transition only starts the
    /// fade; the call returns as soon as the scene is attached.
    pub fn load(&mut self, ctx: &mut Context<'_>, name: &str, options: LoadOptions) -> bool {
        self.prune(ctx);
        self.sweep(ctx);

        if name.is_empty() {
            log::debug!("No scene requested");
            return false;
        }
        let Some(factory) = self.registry.get(name) else {
            log::error!("Failed to load unregistered scene - {name}");
            return false;
        };
        let mut scene = factory();

        let node = ctx.world.create_node(name);
        if options.transition {
            if let Some(object) = ctx.world.tree.get_mut(node) {
                object.set_alpha(0.0);
            }
            ctx.world.tweens.add(Tween::fade_in(node, options.duration));
        }
        let stage = ctx.world.stage();
        if let Err(err) = ctx.world.tree.add_child(stage, node) {
            log::error!("Failed to attach scene {name}: {err}");
            let _ = ctx.destroy(node);
            return false;
        }
        ctx.world.mark_scene_root(node);

        let built = scene.on_added(&mut SceneContext::new(ctx.world, ctx.systems, node, name));
        ctx.flush();
        if let Err(err) = built {
            log::error!("Scene '{name}' failed to build: {err}");
            Self::teardown(
                ctx,
                ActiveScene {
                    name: name.to_string(),
                    node,
                    sticky: options.sticky,
                    scene,
                },
            );
            return false;
        }

        log::info!("Loaded scene '{name}'{}", if options.sticky { " (sticky)" } else { "" });
        self.active.push(ActiveScene {
            name: name.to_string(),
            node,
            sticky: options.sticky,
            scene,
        });
        true
    }

    /// Load the scene named by the `scene` field of a `key=value&...` query
    ///
    /// A query without that field counts as an empty name.
    pub fn load_from_query(&mut self, ctx: &mut Context<'_>, query: &str, options: LoadOptions) -> bool {
        let name = query_field(query, "scene").unwrap_or_default();
        self.load(ctx, name, options)
    }

    /// Destroy the first active scene named `name`; false when none is active
    pub fn unload(&mut self, ctx: &mut Context<'_>, name: &str) -> bool {
        self.prune(ctx);
        let Some(index) = self.active.iter().position(|s| s.name == name) else {
            return false;
        };
        let scene = self.active.remove(index);
        Self::teardown(ctx, scene);
        true
    }

    /// First active scene named `name`
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.active.iter().find(|s| s.name == name).map(|s| s.node)
    }

    /// State of the first instance of `name`, or of its registration
    pub fn state(&self, name: &str) -> SceneState {
        match self.active.iter().find(|s| s.name == name) {
            Some(scene) if scene.sticky => SceneState::ActiveSticky,
            Some(_) => SceneState::Active,
            None if self.registry.contains_key(name) => SceneState::Registered,
            None => SceneState::Unregistered,
        }
    }

    /// State of a specific instance, by its root node
    pub fn instance_state(&self, node: NodeId) -> SceneState {
        match self.active.iter().find(|s| s.node == node) {
            Some(scene) if scene.sticky => SceneState::ActiveSticky,
            Some(_) => SceneState::Active,
            None => SceneState::Destroyed,
        }
    }

    /// Names of active scenes, oldest first
    pub fn active_names(&self) -> Vec<&str> {
        self.active.iter().map(|s| s.name.as_str()).collect()
    }

    /// Number of active scenes
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// True when no scene is active
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Destroy every active scene, sticky ones included
    pub fn clear(&mut self, ctx: &mut Context<'_>) {
        self.prune(ctx);
        for scene in std::mem::take(&mut self.active).into_iter().rev() {
            Self::teardown(ctx, scene);
        }
    }

    /// Apply scene requests queued by hooks, including ones queued meanwhile
    pub fn apply_requests(&mut self, ctx: &mut Context<'_>) -> usize {
        let mut applied = 0;
        for _ in 0..MAX_REQUEST_ROUNDS {
            self.prune(ctx);
            let requests = ctx.world.take_scene_requests();
            if requests.is_empty() {
                return applied;
            }
            for request in requests {
                match request {
                    SceneRequest::Load { name, options } => {
                        self.load(ctx, &name, options);
                    }
                    SceneRequest::Unload(name) => {
                        self.unload(ctx, &name);
                    }
                    SceneRequest::Destroy(node) => {
                        self.destroy_root(ctx, node);
                    }
                }
                applied += 1;
            }
        }
        log::warn!("Scene requests still pending after {MAX_REQUEST_ROUNDS} rounds, dropping them");
        ctx.world.take_scene_requests();
        applied
    }

    /// Tear down the active scene rooted at `node`
    fn destroy_root(&mut self, ctx: &mut Context<'_>, node: NodeId) {
        if let Some(index) = self.active.iter().position(|s| s.node == node) {
            let scene = self.active.remove(index);
            Self::teardown(ctx, scene);
        } else if ctx.world.unmark_scene_root(node) && ctx.world.tree.contains(node) {
            // Root of a scene this manager does not track
            let _ = ctx.destroy(node);
        }
    }

    /// Forget scenes whose root left the tree without going through here
    fn prune(&mut self, ctx: &mut Context<'_>) {
        let tree = &ctx.world.tree;
        self.active.retain(|scene| {
            let alive = tree.contains(scene.node);
            if !alive {
                log::debug!("Scene '{}' was destroyed with its parent", scene.name);
            }
            alive
        });
    }

    fn sweep(&mut self, ctx: &mut Context<'_>) {
        let (keep, sweep): (Vec<_>, Vec<_>) = std::mem::take(&mut self.active)
            .into_iter()
            .partition(|s| s.sticky);
        self.active = keep;
        for scene in sweep {
            Self::teardown(ctx, scene);
        }
    }

    fn teardown(ctx: &mut Context<'_>, mut active: ActiveScene) {
        ctx.world.unmark_scene_root(active.node);
        ctx.world.tree.detach(active.node);
        active
            .scene
            .on_removed(&mut SceneContext::new(ctx.world, ctx.systems, active.node, &active.name));
        if let Err(err) = ctx.destroy(active.node) {
            log::warn!("Scene '{}' was already gone: {err}", active.name);
        }
        log::debug!("Unloaded scene '{}'", active.name);
    }
}

impl std::fmt::Debug for SceneManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut registered: Vec<&str> = self.registry.keys().map(String::as_str).collect();
        registered.sort_unstable();
        f.debug_struct("SceneManager")
            .field("registered", &registered)
            .field("active", &self.active_names())
            .finish()
    }
}

/// Value of `key` in a `key=value&...` query, leading `?` allowed
fn query_field<'q>(query: &'q str, key: &str) -> Option<&'q str> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(k, _)| *k == key)
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Component, ComponentContext, SystemRegistry, World};
    use crate::scene::SceneError;
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Marker {
        log: Log,
    }

    impl Component for Marker {
        fn name(&self) -> &str {
            "marker"
        }

        fn on_removed(&mut self, ctx: &mut ComponentContext<'_>) {
            let host = ctx.node().map(|n| n.name().to_string()).unwrap_or_default();
            self.log.borrow_mut().push(format!("removed {host}"));
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    struct Tagged {
        log: Log,
    }

    impl Scene for Tagged {
        fn on_added(&mut self, ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
            let node = ctx.node();
            ctx.attach(node, Box::new(Marker { log: Rc::clone(&self.log) }))?;
            Ok(())
        }
    }

    struct Broken;

    impl Scene for Broken {
        fn on_added(&mut self, ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
            ctx.create("half-built")?;
            Err(SceneError::Build {
                scene: ctx.name().to_string(),
                reason: "no level data".to_string(),
            })
        }
    }

    fn manager(log: &Log) -> SceneManager {
        let mut manager = SceneManager::new();
        for name in ["a", "b", "c"] {
            let log = Rc::clone(log);
            manager.register(name, move || Box::new(Tagged { log: Rc::clone(&log) }));
        }
        manager.register("broken", || Box::new(Broken));
        manager
    }

    #[test]
    fn test_sweep_keeps_sticky_scenes() {
        let log = Log::default();
        let (mut world, mut systems) = (World::new(), SystemRegistry::new());
        let mut ctx = Context::new(&mut world, &mut systems);
        let mut scenes = manager(&log);

        assert!(scenes.load(&mut ctx, "a", LoadOptions::new().sticky(true)));
        assert!(scenes.load(&mut ctx, "b", LoadOptions::new()));
        let b = scenes.find("b").unwrap();
        assert!(scenes.load(&mut ctx, "c", LoadOptions::new()));

        assert_eq!(scenes.active_names(), vec!["a", "c"]);
        assert_eq!(*log.borrow(), vec!["removed b"]);
        assert_eq!(scenes.instance_state(b), SceneState::Destroyed);
        assert!(!ctx.world.tree.contains(b));
        assert_eq!(scenes.state("a"), SceneState::ActiveSticky);
        assert_eq!(scenes.state("c"), SceneState::Active);
        assert_eq!(scenes.state("b"), SceneState::Registered);
        assert_eq!(scenes.state("zzz"), SceneState::Unregistered);
    }

    #[test]
    fn test_unregistered_and_empty_names_fail() {
        let log = Log::default();
        let (mut world, mut systems) = (World::new(), SystemRegistry::new());
        let mut ctx = Context::new(&mut world, &mut systems);
        let mut scenes = manager(&log);

        assert!(scenes.load(&mut ctx, "a", LoadOptions::new().sticky(true)));
        assert!(!scenes.load(&mut ctx, "missing", LoadOptions::new()));
        assert!(!scenes.load(&mut ctx, "", LoadOptions::new()));
        assert_eq!(scenes.active_names(), vec!["a"]);
        assert_eq!(ctx.world.tree.get(ctx.world.stage()).unwrap().children().len(), 1);
    }

    #[test]
    fn test_unload_first_match_only() {
        let log = Log::default();
        let (mut world, mut systems) = (World::new(), SystemRegistry::new());
        let mut ctx = Context::new(&mut world, &mut systems);
        let mut scenes = manager(&log);

        scenes.load(&mut ctx, "a", LoadOptions::new().sticky(true));
        let first = scenes.find("a").unwrap();
        scenes.load(&mut ctx, "a", LoadOptions::new().sticky(true));
        assert_eq!(scenes.len(), 2);

        assert!(scenes.unload(&mut ctx, "a"));
        assert_eq!(scenes.len(), 1);
        assert_ne!(scenes.find("a"), Some(first));
        assert!(!scenes.unload(&mut ctx, "b"));
    }

    #[test]
    fn test_transition_fades_in() {
        let log = Log::default();
        let (mut world, mut systems) = (World::new(), SystemRegistry::new());
        let mut ctx = Context::new(&mut world, &mut systems);
        let mut scenes = manager(&log);

        let options = LoadOptions::new().transition(std::time::Duration::from_millis(200));
        assert!(scenes.load(&mut ctx, "a", options));
        let node = scenes.find("a").unwrap();
        assert_eq!(ctx.world.tree.get(node).unwrap().alpha, 0.0);
        assert!(ctx.world.tweens.is_animating(node));
    }

    #[test]
    fn test_failed_build_is_torn_down() {
        let log = Log::default();
        let (mut world, mut systems) = (World::new(), SystemRegistry::new());
        let mut ctx = Context::new(&mut world, &mut systems);
        let mut scenes = manager(&log);

        let nodes_before = ctx.world.tree.len();
        assert!(!scenes.load(&mut ctx, "broken", LoadOptions::new()));
        assert!(scenes.is_empty());
        assert_eq!(ctx.world.tree.len(), nodes_before);
    }

    #[test]
    fn test_register_overwrites() {
        let log = Log::default();
        let mut scenes = manager(&log);
        scenes.register("a", || Box::new(Broken));

        let (mut world, mut systems) = (World::new(), SystemRegistry::new());
        let mut ctx = Context::new(&mut world, &mut systems);
        assert!(!scenes.load(&mut ctx, "a", LoadOptions::new()));
    }

    #[test]
    fn test_query_field() {
        assert_eq!(query_field("?debug=1&scene=play", "scene"), Some("play"));
        assert_eq!(query_field("scene=", "scene"), Some(""));
        assert_eq!(query_field("debug", "scene"), None);
    }

    #[test]
    fn test_load_from_query_without_scene_is_silent_failure() {
        let log = Log::default();
        let (mut world, mut systems) = (World::new(), SystemRegistry::new());
        let mut ctx = Context::new(&mut world, &mut systems);
        let mut scenes = manager(&log);

        assert!(!scenes.load_from_query(&mut ctx, "?debug=1", LoadOptions::new()));
        assert!(scenes.load_from_query(&mut ctx, "?scene=b", LoadOptions::new()));
        assert_eq!(scenes.active_names(), vec!["b"]);
    }
}
