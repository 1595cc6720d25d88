//! Frame driver: ordered per-tick listeners and frame-driven timers

mod ticker;
mod timer;

pub use ticker::{TickTask, Ticker};
pub use timer::{Timer, TimerOwner, Timers};
