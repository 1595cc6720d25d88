//! Entity-component-system core
//!
//! Display objects are the entities. Components attach to them through a
//! [`Context`], which fires their lifecycle hooks; hooks register the host
//! with named systems, and the [`SystemRegistry`] drives those systems once
//! per frame.

mod component;
mod context;
mod registry;
mod store;
mod system;
mod world;

pub mod components;
pub mod systems;

pub use component::{Component, ComponentKind, Meta, MetaValue};
pub use context::{ComponentContext, Context, EcsError};
pub use registry::SystemRegistry;
pub use store::ComponentStore;
pub use system::{EntitySet, System, SystemError};
pub use world::{Command, SceneRequest, World};
