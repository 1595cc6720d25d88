//! Named resource registration, loading queue and typed lookup

pub mod resource_manager;

pub use resource_manager::{
    Font, QueuedResource, Resource, ResourceError, ResourceKind, ResourceLoader, ResourceManager,
    ResourceManifest, ResourceMeta, Sound, SpineData, Texture,
};
