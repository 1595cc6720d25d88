//! Handle types for arena-backed storage
//!
//! Every long-lived object in the engine (display objects, components,
//! timers, ticker listeners) lives in a slot map and is referenced by a
//! generational key. A key to a destroyed object never aliases a new one.

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Handle to a display object in the display tree
    pub struct NodeId;

    /// Handle to a component in the component store
    pub struct ComponentId;

    /// Handle to a frame-driven timer
    pub struct TimerId;

    /// Handle to a listener registered with the ticker
    pub struct TickerKey;
}
