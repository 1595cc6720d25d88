//! Component contract and configuration metadata

use super::system::SystemError;
use super::ComponentContext;
use crate::events::PointerEvent;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;

/// Capability tag systems use to find the component they consume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Viewport-anchored positioning with optional percentage offsets
    Hud,
    /// Viewport-anchored positioning in absolute units
    Widget,
    /// Pointer dragging
    Draggable,
    /// Per-frame scripted behaviour
    Behaviour,
    /// Application-defined
    Custom,
}

/// A single configuration value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    /// Boolean flag
    Bool(bool),
    /// Number
    Number(f32),
    /// Free text
    Text(String),
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f32> for MetaValue {
    fn from(value: f32) -> Self {
        Self::Number(value)
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        Self::Number(value as f32)
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Key/value configuration carried by a component and read by systems
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meta {
    values: BTreeMap<String, MetaValue>,
}

static EMPTY_META: Meta = Meta::new();

impl Meta {
    /// Empty metadata
    pub const fn new() -> Self {
        Self { values: BTreeMap::new() }
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Remove a value
    pub fn remove(&mut self, key: &str) -> Option<MetaValue> {
        self.values.remove(key)
    }

    /// Raw value
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.values.get(key)
    }

    /// Whether a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Optional number; present values of another type are an error
    pub fn number(&self, key: &str) -> Result<Option<f32>, SystemError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(MetaValue::Number(n)) if n.is_finite() => Ok(Some(*n)),
            Some(other) => Err(SystemError::InvalidMeta {
                key: key.to_string(),
                reason: format!("expected a finite number, found {other:?}"),
            }),
        }
    }

    /// Optional flag; present values of another type are an error
    pub fn flag(&self, key: &str) -> Result<Option<bool>, SystemError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(MetaValue::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(SystemError::InvalidMeta {
                key: key.to_string(),
                reason: format!("expected a bool, found {other:?}"),
            }),
        }
    }

    /// Optional text; present values of another type are an error
    pub fn text(&self, key: &str) -> Result<Option<&str>, SystemError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(MetaValue::Text(t)) => Ok(Some(t.as_str())),
            Some(other) => Err(SystemError::InvalidMeta {
                key: key.to_string(),
                reason: format!("expected text, found {other:?}"),
            }),
        }
    }
}

/// Behaviour unit attached to a display object
///
/// A component is attached to at most one host at a time. Hooks run
/// synchronously with the component temporarily checked out of the store, so
/// they may freely mutate the world through the context; membership changes
/// they request are applied before the triggering operation returns.
pub trait Component: Any {
    /// Identifier, not required to be unique
    fn name(&self) -> &str;

    /// Capability tag
    fn kind(&self) -> ComponentKind {
        ComponentKind::Custom
    }

    /// Configuration read by systems
    fn meta(&self) -> &Meta {
        &EMPTY_META
    }

    /// Called right after the component is attached to its host
    fn on_added(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Called right before the component is detached from its host
    fn on_removed(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Called once per frame by the behaviour system for subscribed hosts
    fn on_update(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Called for pointer events the component listens to
    fn on_pointer(&mut self, _ctx: &mut ComponentContext<'_>, _event: &PointerEvent) {}

    /// Upcast for typed access
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed access
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
