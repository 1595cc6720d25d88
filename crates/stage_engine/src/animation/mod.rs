//! Frame-driven property animation

mod tween;

pub use tween::{Tween, TweenProperty, Tweens};
