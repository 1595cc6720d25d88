//! Components shipped with the engine

mod behaviour;
mod draggable;
mod hud;
mod widget;

pub use behaviour::Behaviour;
pub use draggable::Draggable;
pub use hud::Hud;
pub use widget::Widget;
