//! Scene demo application
//!
//! Drives a headless engine through a preloader, a transitioned playground
//! scene with anchored, draggable and animated nodes, a device rotation and a
//! timeout, logging what happens along the way.
//!
//! Pass a `.toml` or `.ron` engine configuration path to override defaults.

use stage_engine::assets::{
    QueuedResource, Resource, ResourceKind, ResourceManifest, ResourceMeta, Sound, Texture,
};
use stage_engine::prelude::*;
use std::time::Duration;

const FRAMES: u32 = 90;
const FRAME_TIME: Duration = Duration::from_millis(16);

/// Pretends every resource is a 128x128 texture or a one second sound
struct DemoLoader;

impl ResourceLoader for DemoLoader {
    fn load(&mut self, request: &QueuedResource) -> Result<Resource, String> {
        match request.kind {
            ResourceKind::Image => Ok(Resource::Texture(Texture {
                url: request.url.clone(),
                width: 128,
                height: 128,
            })),
            ResourceKind::Sound => Ok(Resource::Sound(Sound {
                url: request.url.clone(),
                duration: Duration::from_secs(1),
            })),
            other => Err(format!("demo loader cannot load {other}")),
        }
    }
}

struct Preloader;

impl Scene for Preloader {
    fn on_added(&mut self, ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
        let bar = ctx.create("loading-bar")?;
        let mut progress = 0.0_f32;
        let fill = Behaviour::new("fill", move |ctx| {
            progress += 0.25;
            if let Some(node) = ctx.node_mut() {
                node.set_scale(progress.min(1.0), Some(1.0));
            }
            if progress >= 1.0 {
                log::info!("Preloading done");
                ctx.remove_self();
                ctx.load_scene("playground", LoadOptions::new().transition(Duration::from_millis(300)));
            }
        });
        ctx.attach(bar, Box::new(fill))?;
        Ok(())
    }
}

struct Overlay;

impl Scene for Overlay {
    fn on_added(&mut self, ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
        let fps = ctx.create("fps")?;
        ctx.attach(fps, Box::new(Hud::new().left(0.02).top(0.02).percentage(true)))?;
        Ok(())
    }
}

struct Playground;

impl Scene for Playground {
    fn on_added(&mut self, ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
        let score = ctx.create("score")?;
        ctx.attach(score, Box::new(Hud::new().right(24.0).top(24.0)))?;

        let pause = ctx.create("pause-button")?;
        ctx.attach(pause, Box::new(Widget::new().left(16.0).bottom(16.0)))?;

        let card = ctx.create("card")?;
        if let Some(node) = ctx.world_mut().tree.get_mut(card) {
            node.set_position(300.0, 600.0).set_size(150.0, 200.0);
        }
        let draggable = Draggable::new()
            .on_start(|node| log::info!("Picked up {}", node.name()))
            .on_end(|node| log::info!("Dropped {} at {:?}", node.name(), node.position));
        ctx.attach(card, Box::new(draggable))?;

        let spinner = ctx.create("spinner")?;
        ctx.attach(
            spinner,
            Box::new(Behaviour::new("spin", |ctx| {
                if let Some(node) = ctx.node_mut() {
                    node.rotation += 0.1;
                }
            })),
        )?;
        Ok(())
    }

    fn on_removed(&mut self, ctx: &mut SceneContext<'_>) {
        log::info!("Leaving {}", ctx.name());
    }
}

fn load_config() -> Result<EngineConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => Ok(EngineConfig::load_from_file(&path)?),
        None => Ok(EngineConfig::default()),
    }
}

fn register_resources(engine: &mut Engine) -> Result<(), Box<dyn std::error::Error>> {
    let mut manifest = ResourceManifest::default();
    manifest
        .resources
        .insert("card".to_string(), ResourceMeta::new("images/card.png", ResourceKind::Image));
    manifest
        .resources
        .insert("pop".to_string(), ResourceMeta::new("sounds/pop.mp3", ResourceKind::Sound));

    let resources = engine.resources_mut();
    resources.register(manifest);
    resources.add_image("card")?;
    resources.add_sound("pop")?;
    // Already queued, ignored
    resources.add_image("card")?;

    let loaded = engine.load_resources(&mut DemoLoader)?;
    let card = engine.resources().texture("card")?;
    log::info!("Loaded {loaded} resources, card is {}x{}", card.width, card.height);
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    stage_engine::foundation::logging::init_with_level(&config.log_level);
    log::info!("Starting scene demo");

    let mut engine = Engine::headless(config)?;
    register_resources(&mut engine)?;

    engine.register_scene("preloader", || Box::new(Preloader));
    engine.register_scene("playground", || Box::new(Playground));
    engine.register_scene("overlay", || Box::new(Overlay));

    engine.load_scene("overlay", LoadOptions::new().sticky(true));
    if !engine.load_scene_from_query("?scene=preloader&debug=1") {
        log::warn!("No start scene in query, falling back to preloader");
        engine.load_scene("preloader", LoadOptions::new());
    }

    let timer = engine.create_timer(Duration::from_millis(500), |world| {
        log::info!("Half a second in, {} nodes alive", world.tree.len());
    })?;
    engine.start_timer(timer);

    let mut clock = FrameClock::new();
    for frame in 0..FRAMES {
        std::thread::sleep(FRAME_TIME);
        engine.tick(clock.tick());

        match frame {
            20 => {
                log::info!("Rotating device to landscape");
                engine.resize(1334.0, 750.0)?;
            }
            30 => drag_card(&mut engine),
            60 => engine.resize(750.0, 1334.0)?,
            _ => {}
        }
    }

    log::info!(
        "Ran {} frames at {:.1} fps, active scenes {:?}",
        engine.frame_count(),
        clock.average_fps(),
        engine.scenes().active_names()
    );
    engine.shutdown();
    Ok(())
}

/// Simulate a pointer dragging the playground card
fn drag_card(engine: &mut Engine) {
    let Some(scene) = engine.scenes().find("playground") else {
        log::warn!("Playground not loaded yet, skipping drag");
        return;
    };
    let card = engine.world().tree.get(scene).and_then(|node| {
        node.children()
            .iter()
            .copied()
            .find(|child| engine.world().tree.get(*child).is_some_and(|c| c.name() == "card"))
    });
    let Some(card) = card else {
        return;
    };
    let Some(origin) = engine.world().tree.global_position(card) else {
        return;
    };

    let grab = origin + Vec2::new(10.0, 10.0);
    engine.dispatch_pointer(&PointerEvent::new(PointerKind::Down, Some(card), grab.x, grab.y));
    for step in 1..=5_u8 {
        let offset = f32::from(step) * 12.0;
        engine.dispatch_pointer(&PointerEvent::new(PointerKind::Move, None, grab.x + offset, grab.y + offset));
    }
    engine.dispatch_pointer(&PointerEvent::new(PointerKind::Up, Some(card), grab.x + 60.0, grab.y + 60.0));
}

fn main() {
    if let Err(err) = run() {
        log::error!("Scene demo failed: {err}");
        eprintln!("scene demo failed: {err}");
        std::process::exit(1);
    }
}
