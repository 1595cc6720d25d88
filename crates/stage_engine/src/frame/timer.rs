//! Timeouts driven by frame time

use super::{TickTask, Ticker};
use crate::config::ConfigError;
use crate::ecs::World;
use crate::foundation::collections::{ComponentId, NodeId, SlotMap, TickerKey, TimerId};
use std::time::Duration;

pub(crate) type TimerCallback = Box<dyn FnMut(&mut World)>;

/// What a timer belongs to; owned timers are removed with their owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOwner {
    /// Removed when the node is destroyed
    Node(NodeId),
    /// Removed when the component is detached
    Component(ComponentId),
}

/// One-shot timeout
///
/// A running timer holds a ticker listener that accumulates frame time.
/// Once the elapsed time exceeds the timeout it stops itself and fires.
pub struct Timer {
    timeout: Duration,
    elapsed: Duration,
    key: Option<TickerKey>,
    owner: Option<TimerOwner>,
    // `None` while the callback runs
    callback: Option<TimerCallback>,
}

impl Timer {
    /// Configured timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Time accumulated since the last start or reset
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Whether the timer is ticking
    pub fn is_running(&self) -> bool {
        self.key.is_some()
    }

    /// Owner, if any
    pub fn owner(&self) -> Option<TimerOwner> {
        self.owner
    }
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timer")
            .field("timeout", &self.timeout)
            .field("elapsed", &self.elapsed)
            .field("running", &self.is_running())
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

/// Timer arena
///
/// Lives in the [`World`] next to the ticker, so hooks and timer callbacks
/// can create and control timers through the world's timer methods.
#[derive(Debug, Default)]
pub struct Timers {
    timers: SlotMap<TimerId, Timer>,
}

impl Timers {
    /// Empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stopped timer; a zero timeout is rejected
    pub fn create(
        &mut self,
        timeout: Duration,
        owner: Option<TimerOwner>,
        callback: TimerCallback,
    ) -> Result<TimerId, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::Invalid("timeout is required".to_string()));
        }
        Ok(self.timers.insert(Timer {
            timeout,
            elapsed: Duration::ZERO,
            key: None,
            owner,
            callback: Some(callback),
        }))
    }

    /// Look up a timer
    pub fn get(&self, id: TimerId) -> Option<&Timer> {
        self.timers.get(id)
    }

    /// Number of timers, running or not
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// True when no timer exists
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Start from zero; a running timer just restarts its count
    pub fn start(&mut self, id: TimerId, ticker: &mut Ticker) -> bool {
        let Some(timer) = self.timers.get_mut(id) else {
            return false;
        };
        timer.elapsed = Duration::ZERO;
        if timer.key.is_none() {
            timer.key = Some(ticker.add(TickTask::Timer(id)));
        }
        true
    }

    /// Stop without firing
    pub fn stop(&mut self, id: TimerId, ticker: &mut Ticker) -> bool {
        let Some(timer) = self.timers.get_mut(id) else {
            return false;
        };
        if let Some(key) = timer.key.take() {
            ticker.remove(key);
        }
        true
    }

    /// Start when stopped, otherwise restart the count
    pub fn reset(&mut self, id: TimerId, ticker: &mut Ticker) -> bool {
        self.start(id, ticker)
    }

    /// Stop and forget a timer
    pub fn remove(&mut self, id: TimerId, ticker: &mut Ticker) -> bool {
        self.stop(id, ticker);
        self.timers.remove(id).is_some()
    }

    /// Stop and forget every timer belonging to `owner`
    pub fn remove_owned_by(&mut self, owner: TimerOwner, ticker: &mut Ticker) -> usize {
        let owned: Vec<TimerId> = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.owner == Some(owner))
            .map(|(id, _)| id)
            .collect();
        for id in &owned {
            self.remove(*id, ticker);
        }
        owned.len()
    }

    /// Stop every timer, keeping them
    pub fn stop_all(&mut self, ticker: &mut Ticker) {
        for timer in self.timers.values_mut() {
            if let Some(key) = timer.key.take() {
                ticker.remove(key);
            }
        }
    }

    /// Accumulate frame time; stops the timer and returns true once it expires
    pub fn check(&mut self, id: TimerId, delta: Duration, ticker: &mut Ticker) -> bool {
        let Some(timer) = self.timers.get_mut(id) else {
            return false;
        };
        if timer.key.is_none() {
            return false;
        }
        timer.elapsed = timer.elapsed.saturating_add(delta);
        if timer.elapsed <= timer.timeout {
            return false;
        }
        self.stop(id, ticker);
        true
    }

    pub(crate) fn take_callback(&mut self, id: TimerId) -> Option<TimerCallback> {
        self.timers.get_mut(id)?.callback.take()
    }

    pub(crate) fn restore_callback(&mut self, id: TimerId, callback: TimerCallback) {
        if let Some(timer) = self.timers.get_mut(id) {
            timer.callback = Some(callback);
        }
    }
}
