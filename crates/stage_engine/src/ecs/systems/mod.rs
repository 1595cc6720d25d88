//! Systems shipped with the engine
//!
//! [`crate::Engine`] registers them in this order, which is also their
//! per-frame update order: behaviour, hud, widget, scale, render.

mod anchor;
mod behaviour;
mod render;
mod scale;

pub use anchor::{anchor_position, AnchorSystem};
pub use behaviour::BehaviourSystem;
pub use render::RenderSystem;
pub use scale::ScaleSystem;

/// Runs [`crate::ecs::Component::on_update`] hooks
pub const BEHAVIOUR_SYSTEM: &str = "behaviour";
/// Positions [`crate::ecs::components::Hud`] hosts
pub const HUD_SYSTEM: &str = "hud";
/// Positions [`crate::ecs::components::Widget`] hosts
pub const WIDGET_SYSTEM: &str = "widget";
/// Fits the presentation container on resize
pub const SCALE_SYSTEM: &str = "scale";
/// Draws the stage and fits it on resize
pub const RENDER_SYSTEM: &str = "render";
