//! Engine context
//!
//! One explicitly constructed value owns everything: the world, the system
//! registry, the scene manager, the resource manager, the ticker and the
//! timers. Hosts feed it frame deltas, resizes and pointer events.

use crate::assets::{ResourceError, ResourceLoader, ResourceManager};
use crate::config::{ConfigError, EngineConfig};
use crate::display::TreeError;
use crate::ecs::systems::{AnchorSystem, BehaviourSystem, RenderSystem, ScaleSystem};
use crate::ecs::{Component, Context, EcsError, SystemRegistry, World};
use crate::events::PointerEvent;
use crate::foundation::collections::{ComponentId, NodeId, TickerKey, TimerId};
use crate::foundation::math::Size;
use crate::frame::{TickTask, Ticker, TimerOwner, Timers};
use crate::render::{NullRenderer, NullSurface, PresentationSurface, Renderer, ScaleModes};
use crate::scene::{LoadOptions, Scene, SceneError, SceneManager};
use std::time::Duration;
use thiserror::Error;

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Component host error
    #[error("Component error: {0}")]
    Ecs(#[from] EcsError),

    /// Resource error
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    /// Scene error
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}

impl From<TreeError> for EngineError {
    fn from(err: TreeError) -> Self {
        Self::Ecs(EcsError::Tree(err))
    }
}

/// Main engine struct
pub struct Engine {
    config: EngineConfig,
    world: World,
    systems: SystemRegistry,
    scenes: SceneManager,
    resources: ResourceManager,
    driver_keys: Vec<TickerKey>,
    frame_count: u64,
    running: bool,
}

impl Engine {
    /// Create an engine drawing through `renderer` and fitting `surface`
    ///
    /// The configuration is validated first; an unknown scale mode or an
    /// empty design size fails here, before any transform is applied.
    pub fn new(
        config: EngineConfig,
        renderer: Box<dyn Renderer>,
        surface: Box<dyn PresentationSurface>,
    ) -> Result<Self, EngineError> {
        Self::with_scale_modes(config, renderer, surface, ScaleModes::with_defaults())
    }

    /// Like [`Engine::new`] with a custom scale mode registry
    pub fn with_scale_modes(
        config: EngineConfig,
        renderer: Box<dyn Renderer>,
        surface: Box<dyn PresentationSurface>,
        modes: ScaleModes,
    ) -> Result<Self, EngineError> {
        log::info!("Initializing engine...");
        config.validate(&modes)?;

        let mut world = World::new();
        let design = config.design_size();

        let mut systems = SystemRegistry::new();
        systems.register(Box::new(BehaviourSystem::new()));
        systems.register(Box::new(AnchorSystem::hud()));
        systems.register(Box::new(AnchorSystem::widget()));
        systems.register(Box::new(ScaleSystem::new(
            surface,
            design,
            config.container_scale_mode.clone(),
            modes.clone(),
        )?));
        systems.register(Box::new(RenderSystem::new(
            world.stage(),
            renderer,
            design,
            config.scale_mode.clone(),
            modes,
        )?));

        let driver_keys = vec![
            world.ticker.add(TickTask::Tweens),
            world.ticker.add(TickTask::Systems),
        ];

        let mut engine = Self {
            config,
            world,
            systems,
            scenes: SceneManager::new(),
            resources: ResourceManager::new(),
            driver_keys,
            frame_count: 0,
            running: true,
        };
        engine.resize(design.width, design.height)?;

        log::info!(
            "Engine initialized: design {}x{}, systems {:?}",
            design.width,
            design.height,
            engine.systems.names()
        );
        Ok(engine)
    }

    /// Engine with a null renderer and surface
    pub fn headless(config: EngineConfig) -> Result<Self, EngineError> {
        Self::new(config, Box::new(NullRenderer::new()), Box::new(NullSurface::new()))
    }

    /// Validated configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Display tree, components and frame listeners
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world; attach components through [`Engine::attach`] so hooks fire
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Registered systems
    pub fn systems(&self) -> &SystemRegistry {
        &self.systems
    }

    /// Registered systems, mutably
    pub fn systems_mut(&mut self) -> &mut SystemRegistry {
        &mut self.systems
    }

    /// Scene registrations and active scenes
    pub fn scenes(&self) -> &SceneManager {
        &self.scenes
    }

    /// Resource registry and cache
    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    /// Resource registry and cache, mutably
    pub fn resources_mut(&mut self) -> &mut ResourceManager {
        &mut self.resources
    }

    /// Per-frame listeners
    pub fn ticker(&self) -> &Ticker {
        self.world.ticker()
    }

    /// Timer arena
    pub fn timers(&self) -> &Timers {
        self.world.timers()
    }

    /// Root of the display tree
    pub fn stage(&self) -> NodeId {
        self.world.stage()
    }

    /// Frames ticked so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// False once [`Engine::shutdown`] ran
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Component host operations over the world and systems
    pub fn context(&mut self) -> Context<'_> {
        Context::new(&mut self.world, &mut self.systems)
    }

    /// Create a detached node
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        self.world.create_node(name)
    }

    /// Attach `child` under `parent`, moving it from any previous parent
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), EngineError> {
        self.world.tree.add_child(parent, child)?;
        Ok(())
    }

    /// Store a component and attach it to `node`
    pub fn attach(&mut self, node: NodeId, component: Box<dyn Component>) -> Result<ComponentId, EngineError> {
        let id = self.context().attach(node, component)?;
        self.process_requests();
        Ok(id)
    }

    /// Store an unattached component
    pub fn insert_component(&mut self, component: Box<dyn Component>) -> ComponentId {
        self.world.components.insert(component)
    }

    /// Attach a stored component to `node`
    pub fn add_component(&mut self, node: NodeId, id: ComponentId) -> Result<(), EngineError> {
        self.context().add_component(node, id)?;
        self.process_requests();
        Ok(())
    }

    /// Detach a component; false if it was not attached to `node`
    pub fn remove_component(&mut self, node: NodeId, id: ComponentId) -> bool {
        let removed = self.context().remove_component(node, id);
        self.process_requests();
        removed
    }

    /// Destroy a node, its subtree and their components
    pub fn destroy(&mut self, node: NodeId) -> Result<(), EngineError> {
        self.context().destroy(node)?;
        self.process_requests();
        Ok(())
    }

    /// Register a scene factory under `name`
    pub fn register_scene<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Scene> + 'static,
    {
        self.scenes.register(name, factory);
    }

    /// Options with the configured transition duration
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            duration: self.config.transition_duration(),
            ..LoadOptions::default()
        }
    }

    /// Load a scene; see [`SceneManager::load`]
    pub fn load_scene(&mut self, name: &str, options: LoadOptions) -> bool {
        let mut ctx = Context::new(&mut self.world, &mut self.systems);
        let loaded = self.scenes.load(&mut ctx, name, options);
        self.scenes.apply_requests(&mut ctx);
        loaded
    }

    /// Load the scene named in a query string
    pub fn load_scene_from_query(&mut self, query: &str) -> bool {
        let options = self.load_options();
        let mut ctx = Context::new(&mut self.world, &mut self.systems);
        let loaded = self.scenes.load_from_query(&mut ctx, query, options);
        self.scenes.apply_requests(&mut ctx);
        loaded
    }

    /// Unload the first active scene named `name`
    pub fn unload_scene(&mut self, name: &str) -> bool {
        let mut ctx = Context::new(&mut self.world, &mut self.systems);
        let unloaded = self.scenes.unload(&mut ctx, name);
        self.scenes.apply_requests(&mut ctx);
        unloaded
    }

    /// Enqueue-by-name is on [`ResourceManager`]; this drains the queue
    pub fn load_resources(&mut self, loader: &mut dyn ResourceLoader) -> Result<usize, EngineError> {
        Ok(self.resources.load_all(loader)?)
    }

    /// Create a stopped timer
    pub fn create_timer(
        &mut self,
        timeout: Duration,
        callback: impl FnMut(&mut World) + 'static,
    ) -> Result<TimerId, EngineError> {
        Ok(self.world.create_timer(timeout, callback)?)
    }

    /// Create a stopped timer removed together with `owner`
    pub fn create_timer_for(
        &mut self,
        owner: TimerOwner,
        timeout: Duration,
        callback: impl FnMut(&mut World) + 'static,
    ) -> Result<TimerId, EngineError> {
        Ok(self.world.create_timer_for(owner, timeout, callback)?)
    }

    /// Start a timer from zero; false if unknown
    pub fn start_timer(&mut self, id: TimerId) -> bool {
        self.world.start_timer(id)
    }

    /// Stop a timer without firing it
    pub fn stop_timer(&mut self, id: TimerId) -> bool {
        self.world.stop_timer(id)
    }

    /// Start a stopped timer or restart a running one
    pub fn reset_timer(&mut self, id: TimerId) -> bool {
        self.world.reset_timer(id)
    }

    /// Stop and forget a timer
    pub fn remove_timer(&mut self, id: TimerId) -> bool {
        self.world.remove_timer(id)
    }

    /// Device resize: refits the stage, the presentation container and the viewport
    ///
    /// A size without area, as sent for a minimised window, is ignored and
    /// the last fit stays in place.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), EngineError> {
        let size = Size::new(width, height);
        if !size.has_area() {
            log::debug!("Ignoring resize to {width}x{height}, keeping the last fit");
            return Ok(());
        }
        self.systems.resize(size, &mut self.world)?;
        Ok(())
    }

    /// Deliver a pointer event to subscribed components
    ///
    /// Targeted events only reach visible, interactive targets. Returns the
    /// number of handlers called.
    pub fn dispatch_pointer(&mut self, event: &PointerEvent) -> usize {
        if let Some(target) = event.target {
            let accepts = self
                .world
                .tree
                .get(target)
                .is_some_and(|node| node.is_interactive() && node.is_visible());
            if !accepts {
                return 0;
            }
        }

        let mut handled = 0;
        for (node, component) in self.world.events.route(event) {
            if self.world.components.host(component) != Some(node) {
                continue;
            }
            let ran = self
                .world
                .with_component(component, node, |c, ctx| c.on_pointer(ctx, event));
            if ran.is_some() {
                handled += 1;
            }
            Context::new(&mut self.world, &mut self.systems).flush();
        }
        self.process_requests();
        handled
    }

    /// Run one frame: every ticker listener in order
    pub fn tick(&mut self, delta_seconds: f32) {
        if !self.running {
            return;
        }
        // NaN clamps to zero; an infinite or oversized delta advances nothing
        let delta = Duration::try_from_secs_f32(delta_seconds.max(0.0)).unwrap_or_else(|err| {
            log::warn!("Ignoring frame delta {delta_seconds}: {err}");
            Duration::ZERO
        });

        for (key, task) in self.world.ticker.tasks() {
            // An earlier listener this frame may have removed it
            if !self.world.ticker.contains(key) {
                continue;
            }
            match task {
                TickTask::Tweens => self.world.tweens.advance(delta, &mut self.world.tree),
                TickTask::Systems => self.systems.update(&mut self.world),
                TickTask::Timer(id) => {
                    if self.world.check_timer(id, delta) {
                        self.world.fire_timer(id);
                        Context::new(&mut self.world, &mut self.systems).flush();
                    }
                }
            }
            self.process_requests();
        }
        self.frame_count += 1;
    }

    /// Stop timers, deregister frame listeners and destroy every scene
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        log::info!("Shutting down engine after {} frames", self.frame_count);

        self.world.stop_all_timers();
        for key in self.driver_keys.drain(..) {
            self.world.ticker.remove(key);
        }
        let mut ctx = Context::new(&mut self.world, &mut self.systems);
        self.scenes.clear(&mut ctx);
        // Requests raised by teardown hooks have nowhere to go
        self.world.take_scene_requests();
        self.running = false;
    }

    fn process_requests(&mut self) {
        let mut ctx = Context::new(&mut self.world, &mut self.systems);
        self.scenes.apply_requests(&mut ctx);
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("systems", &self.systems)
            .field("scenes", &self.scenes)
            .field("frame_count", &self.frame_count)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Draggable, Hud};
    use crate::ecs::systems::HUD_SYSTEM;
    use crate::events::PointerKind;
    use approx::assert_relative_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    fn engine() -> Engine {
        Engine::headless(EngineConfig::new(750.0, 1334.0)).unwrap()
    }

    #[test]
    fn test_unknown_scale_mode_fails_construction() {
        let config = EngineConfig::default().with_container_scale_mode("STRETCH");
        assert!(matches!(
            Engine::headless(config),
            Err(EngineError::Config(ConfigError::UnknownScaleMode(_)))
        ));
    }

    #[test]
    fn test_systems_registered_in_update_order() {
        let engine = engine();
        assert_eq!(
            engine.systems().names(),
            vec!["behaviour", "hud", "widget", "scale", "render"]
        );
        assert_eq!(engine.ticker().len(), 2);
    }

    #[test]
    fn test_tick_renders_and_anchors() {
        let mut engine = engine();
        let badge = engine.create_node("badge");
        let stage = engine.stage();
        engine.add_child(stage, badge).unwrap();
        engine.attach(badge, Box::new(Hud::new().right(10.0))).unwrap();
        assert!(engine.systems().has_entity(HUD_SYSTEM, badge));

        engine.tick(0.016);
        assert_relative_eq!(engine.world().tree.get(badge).unwrap().position.x, 740.0);
        let render = engine.systems().get_as::<RenderSystem>("render").unwrap();
        assert_eq!(render.frames(), 1);
        assert_eq!(engine.frame_count(), 1);
    }

    #[test]
    fn test_timer_fires_from_ticks() {
        let mut engine = engine();
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        let timer = engine
            .create_timer(Duration::from_millis(30), move |_| counter.set(counter.get() + 1))
            .unwrap();
        engine.start_timer(timer);

        for _ in 0..5 {
            engine.tick(0.016);
        }
        assert_eq!(fired.get(), 1);
        assert_eq!(engine.ticker().len(), 2);
    }

    #[test]
    fn test_drag_moves_interactive_host() {
        let mut engine = engine();
        let card = engine.create_node("card");
        let stage = engine.stage();
        engine.add_child(stage, card).unwrap();
        engine.world_mut().tree.get_mut(card).unwrap().set_position(100.0, 100.0);
        engine.attach(card, Box::new(Draggable::new().enable_y(false))).unwrap();
        assert!(engine.world().tree.get(card).unwrap().is_interactive());

        // Stage is unscaled at design size, so global equals stage space
        let down = PointerEvent::new(PointerKind::Down, Some(card), 110.0, 120.0);
        assert_eq!(engine.dispatch_pointer(&down), 1);
        let drag = PointerEvent::new(PointerKind::Move, None, 150.0, 300.0);
        engine.dispatch_pointer(&drag);
        engine.dispatch_pointer(&PointerEvent::new(PointerKind::Up, Some(card), 150.0, 300.0));
        engine.dispatch_pointer(&PointerEvent::new(PointerKind::Move, None, 500.0, 500.0));

        let position = engine.world().tree.get(card).unwrap().position;
        assert_relative_eq!(position.x, 140.0);
        assert_relative_eq!(position.y, 100.0);
    }

    #[test]
    fn test_non_interactive_target_gets_nothing() {
        let mut engine = engine();
        let card = engine.create_node("card");
        let id = engine.attach(card, Box::new(Draggable::new())).unwrap();
        engine.remove_component(card, id);

        let down = PointerEvent::new(PointerKind::Down, Some(card), 0.0, 0.0);
        assert_eq!(engine.dispatch_pointer(&down), 0);
        assert!(engine.world().events.is_empty());
    }

    #[test]
    fn test_shutdown_deregisters_everything() {
        let mut engine = engine();
        let timer = engine.create_timer(Duration::from_millis(10), |_| {}).unwrap();
        engine.start_timer(timer);
        engine.shutdown();

        assert!(engine.ticker().is_empty());
        assert!(!engine.is_running());
        engine.tick(1.0);
        assert_eq!(engine.frame_count(), 0);
    }
}
