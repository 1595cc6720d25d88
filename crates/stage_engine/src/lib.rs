//! # Stage Engine
//!
//! Behaviour composition for a 2D display tree.
//!
//! ## Features
//!
//! - **Component host**: components attach to display objects, and their
//!   lifecycle hooks register the host with named systems
//! - **Systems**: per-frame processors over their own entity sets, updated
//!   in registration order
//! - **Scenes**: named, loadable subtrees with sticky persistence and
//!   fade-in transitions
//! - **Stage fitting**: pluggable scale modes with automatic quarter-turn
//!   rotation for perpendicular devices
//! - **Resources**: named registration, idempotent enqueueing and typed lookup
//!
//! ## Quick Start
//!
//! ```rust
//! use stage_engine::prelude::*;
//!
//! struct Playground;
//!
//! impl Scene for Playground {
//!     fn on_added(&mut self, ctx: &mut SceneContext<'_>) -> Result<(), SceneError> {
//!         let score = ctx.create("score")?;
//!         ctx.attach(score, Box::new(Hud::new().right(10.0).top(10.0)))?;
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = Engine::headless(EngineConfig::new(750.0, 1334.0))?;
//!     engine.register_scene("playground", || Box::new(Playground));
//!     engine.load_scene("playground", LoadOptions::new());
//!     engine.tick(1.0 / 60.0);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod animation;
pub mod assets;
pub mod config;
pub mod display;
pub mod ecs;
pub mod events;
pub mod foundation;
pub mod frame;
pub mod render;
pub mod scene;

mod engine;

pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, EngineConfig},
        display::{DisplayObject, DisplayTree},
        ecs::{
            components::{Behaviour, Draggable, Hud, Widget},
            Component, ComponentContext, ComponentKind, Context, Meta, SceneRequest, System, SystemError,
            World,
        },
        events::{PointerEvent, PointerKind},
        frame::TimerOwner,
        foundation::{
            collections::{ComponentId, NodeId, TimerId},
            math::{Size, Vec2},
            time::FrameClock,
        },
        render::{NullRenderer, NullSurface, PresentationSurface, Renderer},
        scene::{LoadOptions, Scene, SceneContext, SceneError, SceneState},
        assets::{ResourceLoader, ResourceManager},
        Engine, EngineError,
    };
}
