//! Per-tick listener list

use crate::foundation::collections::{SlotMap, TickerKey, TimerId};

/// Work item run once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickTask {
    /// Advance running tweens
    Tweens,
    /// Update every registered system
    Systems,
    /// Check one timer
    Timer(TimerId),
}

/// Listeners called once per frame in the order they were added
///
/// Removing a listener takes effect immediately, including for the tick in
/// progress: the frame loop re-checks [`Ticker::contains`] before running
/// each task from its snapshot.
#[derive(Debug, Default)]
pub struct Ticker {
    tasks: SlotMap<TickerKey, TickTask>,
    order: Vec<TickerKey>,
}

impl Ticker {
    /// Ticker with no listeners
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener
    pub fn add(&mut self, task: TickTask) -> TickerKey {
        let key = self.tasks.insert(task);
        self.order.push(key);
        key
    }

    /// Remove a listener; false if it was not registered
    pub fn remove(&mut self, key: TickerKey) -> bool {
        if self.tasks.remove(key).is_none() {
            return false;
        }
        self.order.retain(|k| *k != key);
        true
    }

    /// True if `key` is still registered
    pub fn contains(&self, key: TickerKey) -> bool {
        self.tasks.contains_key(key)
    }

    /// Listeners in call order
    pub fn tasks(&self) -> Vec<(TickerKey, TickTask)> {
        self.order
            .iter()
            .filter_map(|key| self.tasks.get(*key).map(|task| (*key, *task)))
            .collect()
    }

    /// Number of listeners
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no listener is registered
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Drop every listener
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tasks_keep_insertion_order() {
        let mut ticker = Ticker::new();
        let tweens = ticker.add(TickTask::Tweens);
        let systems = ticker.add(TickTask::Systems);
        assert_eq!(
            ticker.tasks(),
            vec![(tweens, TickTask::Tweens), (systems, TickTask::Systems)]
        );

        assert!(ticker.remove(tweens));
        assert!(!ticker.remove(tweens));
        assert!(!ticker.contains(tweens));
        assert_eq!(ticker.len(), 1);
    }
}
