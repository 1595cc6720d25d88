//! Linear tweens advanced by the frame driver

use crate::display::DisplayTree;
use crate::foundation::collections::NodeId;
use std::time::Duration;

/// Animated display object property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenProperty {
    /// Opacity
    Alpha,
    /// Horizontal position
    X,
    /// Vertical position
    Y,
}

/// Interpolates one property of one node from `from` to `to`
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    target: NodeId,
    property: TweenProperty,
    from: f32,
    to: f32,
    duration: Duration,
    elapsed: Duration,
}

impl Tween {
    /// Create a tween
    pub fn new(target: NodeId, property: TweenProperty, from: f32, to: f32, duration: Duration) -> Self {
        Self {
            target,
            property,
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
        }
    }

    /// Fade a node in from transparent
    pub fn fade_in(target: NodeId, duration: Duration) -> Self {
        Self::new(target, TweenProperty::Alpha, 0.0, 1.0, duration)
    }

    /// Animated node
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Completion in `0.0..=1.0`
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            1.0
        } else {
            (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
        }
    }

    /// Advance and write the interpolated value; returns true once finished
    fn step(&mut self, delta: Duration, tree: &mut DisplayTree) -> bool {
        self.elapsed = self.elapsed.saturating_add(delta);
        let t = self.progress();
        let value = self.from + (self.to - self.from) * t;

        if let Some(node) = tree.get_mut(self.target) {
            match self.property {
                TweenProperty::Alpha => node.alpha = value,
                TweenProperty::X => node.position.x = value,
                TweenProperty::Y => node.position.y = value,
            }
        }
        t >= 1.0
    }
}

/// Running tweens
#[derive(Debug, Default)]
pub struct Tweens {
    active: Vec<Tween>,
}

impl Tweens {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a tween
    pub fn add(&mut self, tween: Tween) {
        self.active.push(tween);
    }

    /// Advance every tween; finished tweens and tweens of destroyed nodes are dropped
    pub fn advance(&mut self, delta: Duration, tree: &mut DisplayTree) {
        self.active.retain_mut(|tween| tree.contains(tween.target) && !tween.step(delta, tree));
    }

    /// Cancel every tween on a node
    pub fn remove_target(&mut self, target: NodeId) {
        self.active.retain(|tween| tween.target != target);
    }

    /// Whether any tween targets the node
    pub fn is_animating(&self, target: NodeId) -> bool {
        self.active.iter().any(|tween| tween.target == target)
    }

    /// Number of running tweens
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// True when nothing is running
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fade_in_reaches_full_alpha() {
        let mut tree = DisplayTree::new();
        let node = tree.create("scene");
        tree.get_mut(node).unwrap().alpha = 0.0;

        let mut tweens = Tweens::new();
        tweens.add(Tween::fade_in(node, Duration::from_millis(500)));

        tweens.advance(Duration::from_millis(250), &mut tree);
        assert_relative_eq!(tree.get(node).unwrap().alpha, 0.5, epsilon = 1e-4);
        assert!(tweens.is_animating(node));

        tweens.advance(Duration::from_millis(300), &mut tree);
        assert_relative_eq!(tree.get(node).unwrap().alpha, 1.0);
        assert!(tweens.is_empty());
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let mut tree = DisplayTree::new();
        let node = tree.create("node");
        let mut tweens = Tweens::new();
        tweens.add(Tween::new(node, TweenProperty::X, 0.0, 10.0, Duration::ZERO));

        tweens.advance(Duration::ZERO, &mut tree);
        assert_relative_eq!(tree.get(node).unwrap().position.x, 10.0);
        assert!(tweens.is_empty());
    }

    #[test]
    fn test_destroyed_target_is_dropped() {
        let mut tree = DisplayTree::new();
        let node = tree.create("node");
        let mut tweens = Tweens::new();
        tweens.add(Tween::fade_in(node, Duration::from_secs(1)));

        tree.release(node);
        tweens.advance(Duration::from_millis(16), &mut tree);
        assert!(tweens.is_empty());
    }
}
