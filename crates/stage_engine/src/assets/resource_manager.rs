//! Resource Manager
//!
//! Resources are known by name before they are loaded: a manifest maps each
//! name to a url and a kind. Game code enqueues names (`add_image`,
//! `add_sound`, ...), a [`ResourceLoader`] collaborator turns the queue into
//! loaded handles, and typed getters hand those out.
//!
//! Fetching bytes and decoding formats belong to the loader, not here.

use crate::config::Config;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Resource Manager errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// Lookup of a resource that is not loaded
    #[error("missing {kind} - {name}")]
    Missing {
        /// Kind requested
        kind: ResourceKind,
        /// Resource name
        name: String,
    },

    /// Name absent from the manifest
    #[error("unregistered resource - {0}")]
    Unregistered(String),

    /// Registered under another kind than requested
    #[error("resource {name} is a {registered}, not a {requested}")]
    WrongKind {
        /// Resource name
        name: String,
        /// Kind it was registered or loaded as
        registered: ResourceKind,
        /// Kind asked for
        requested: ResourceKind,
    },

    /// The loader failed
    #[error("failed to load {name}: {reason}")]
    Load {
        /// Resource name
        name: String,
        /// Loader message
        reason: String,
    },
}

/// What a resource is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Texture source
    Image,
    /// Web or bitmap font
    Font,
    /// Audio clip
    Sound,
    /// Spine skeleton with its atlas
    Spine,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Image => "texture",
            Self::Font => "font",
            Self::Sound => "sound",
            Self::Spine => "spine",
        };
        f.write_str(name)
    }
}

/// Registered metadata of one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceMeta {
    /// Location handed to the loader
    pub url: String,
    /// Resource kind
    pub kind: ResourceKind,
    /// Spine atlas location; defaults to `url` with an `.atlas` extension
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atlas: Option<String>,
}

impl ResourceMeta {
    /// Metadata without an explicit atlas
    pub fn new(url: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            url: url.into(),
            kind,
            atlas: None,
        }
    }
}

/// Manifest file listing every resource by name
///
/// ```toml
/// [resources.hero]
/// url = "images/hero.png"
/// kind = "image"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceManifest {
    /// Metadata by name
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceMeta>,
}

impl Config for ResourceManifest {}

/// A queued load request
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedResource {
    /// Resource name
    pub name: String,
    /// Kind requested
    pub kind: ResourceKind,
    /// Main url
    pub url: String,
    /// Atlas url for spine resources
    pub atlas: Option<String>,
}

/// Loaded texture handle
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    /// Source location
    pub url: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Loaded sound handle
#[derive(Debug, Clone, PartialEq)]
pub struct Sound {
    /// Source location
    pub url: String,
    /// Clip length
    pub duration: Duration,
}

/// Loaded font handle
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    /// Source location
    pub url: String,
    /// Family name to render with
    pub family: String,
}

/// Loaded spine skeleton handle
#[derive(Debug, Clone, PartialEq)]
pub struct SpineData {
    /// Skeleton json location
    pub skeleton_url: String,
    /// Atlas location
    pub atlas_url: String,
}

/// A loaded resource
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    /// Image
    Texture(Texture),
    /// Audio clip
    Sound(Sound),
    /// Font
    Font(Font),
    /// Spine skeleton
    Spine(SpineData),
}

impl Resource {
    /// Kind this resource was loaded as
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Texture(_) => ResourceKind::Image,
            Self::Sound(_) => ResourceKind::Sound,
            Self::Font(_) => ResourceKind::Font,
            Self::Spine(_) => ResourceKind::Spine,
        }
    }
}

/// Loading collaborator
pub trait ResourceLoader {
    /// Load one queued resource; the error is a human readable reason
    fn load(&mut self, request: &QueuedResource) -> Result<Resource, String>;
}

/// Registry, queue and cache of named resources
#[derive(Debug, Default)]
pub struct ResourceManager {
    registered: HashMap<String, ResourceMeta>,
    queue: VecDeque<QueuedResource>,
    loaded: HashMap<String, Resource>,
}

impl ResourceManager {
    /// Empty manager with nothing registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registered metadata with a manifest
    pub fn register(&mut self, manifest: ResourceManifest) {
        log::debug!("Registered {} resources", manifest.resources.len());
        self.registered = manifest.resources.into_iter().collect();
    }

    /// Register or replace a single resource
    pub fn register_one(&mut self, name: impl Into<String>, meta: ResourceMeta) {
        self.registered.insert(name.into(), meta);
    }

    /// Whether `name` is in the manifest
    pub fn is_registered(&self, name: &str) -> bool {
        self.registered.contains_key(name)
    }

    /// Registered location of a resource
    pub fn url(&self, name: &str) -> Option<&str> {
        self.registered.get(name).map(|meta| meta.url.as_str())
    }

    /// Add an image to the loading queue
    pub fn add_image(&mut self, name: &str) -> Result<(), ResourceError> {
        self.enqueue(name, ResourceKind::Image)
    }

    /// Add a font to the loading queue
    pub fn add_font(&mut self, name: &str) -> Result<(), ResourceError> {
        self.enqueue(name, ResourceKind::Font)
    }

    /// Add a sound to the loading queue
    pub fn add_sound(&mut self, name: &str) -> Result<(), ResourceError> {
        self.enqueue(name, ResourceKind::Sound)
    }

    /// Add a spine skeleton and its atlas to the loading queue
    pub fn add_spine(&mut self, name: &str) -> Result<(), ResourceError> {
        self.enqueue(name, ResourceKind::Spine)
    }

    fn enqueue(&mut self, name: &str, kind: ResourceKind) -> Result<(), ResourceError> {
        if self.is_queued(name) || self.is_loaded(name) {
            log::trace!("Resource '{name}' already queued or loaded");
            return Ok(());
        }

        let meta = self
            .registered
            .get(name)
            .ok_or_else(|| ResourceError::Unregistered(name.to_string()))?;
        if meta.kind != kind {
            return Err(ResourceError::WrongKind {
                name: name.to_string(),
                registered: meta.kind,
                requested: kind,
            });
        }

        let atlas = (kind == ResourceKind::Spine).then(|| {
            meta.atlas.clone().unwrap_or_else(|| {
                Path::new(&meta.url)
                    .with_extension("atlas")
                    .to_string_lossy()
                    .into_owned()
            })
        });
        self.queue.push_back(QueuedResource {
            name: name.to_string(),
            kind,
            url: meta.url.clone(),
            atlas,
        });
        Ok(())
    }

    /// Whether `name` waits in the loading queue
    pub fn is_queued(&self, name: &str) -> bool {
        self.queue.iter().any(|request| request.name == name)
    }

    /// Whether `name` has a loaded handle
    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.contains_key(name)
    }

    /// Requests waiting for [`Self::load_all`]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Load everything queued, in queue order
    ///
    /// Stops at the first failure; the failed request and everything after it
    /// stay queued so a later call can retry them.
    pub fn load_all(&mut self, loader: &mut dyn ResourceLoader) -> Result<usize, ResourceError> {
        let mut count = 0;
        while let Some(request) = self.queue.pop_front() {
            match loader.load(&request) {
                Ok(resource) => {
                    log::debug!("Loaded {} '{}' from {}", request.kind, request.name, request.url);
                    self.loaded.insert(request.name, resource);
                    count += 1;
                }
                Err(reason) => {
                    let name = request.name.clone();
                    self.queue.push_front(request);
                    return Err(ResourceError::Load { name, reason });
                }
            }
        }
        Ok(count)
    }

    /// Get a texture by name
    pub fn texture(&self, name: &str) -> Result<&Texture, ResourceError> {
        match self.loaded.get(name) {
            Some(Resource::Texture(texture)) => Ok(texture),
            other => Err(Self::lookup_error(other, ResourceKind::Image, name)),
        }
    }

    /// Get a sound by name
    pub fn sound(&self, name: &str) -> Result<&Sound, ResourceError> {
        match self.loaded.get(name) {
            Some(Resource::Sound(sound)) => Ok(sound),
            other => Err(Self::lookup_error(other, ResourceKind::Sound, name)),
        }
    }

    /// Get a font by name
    pub fn font(&self, name: &str) -> Result<&Font, ResourceError> {
        match self.loaded.get(name) {
            Some(Resource::Font(font)) => Ok(font),
            other => Err(Self::lookup_error(other, ResourceKind::Font, name)),
        }
    }

    /// Get a spine skeleton by name
    pub fn spine(&self, name: &str) -> Result<&SpineData, ResourceError> {
        match self.loaded.get(name) {
            Some(Resource::Spine(spine)) => Ok(spine),
            other => Err(Self::lookup_error(other, ResourceKind::Spine, name)),
        }
    }

    fn lookup_error(found: Option<&Resource>, requested: ResourceKind, name: &str) -> ResourceError {
        match found {
            Some(resource) => ResourceError::WrongKind {
                name: name.to_string(),
                registered: resource.kind(),
                requested,
            },
            None => ResourceError::Missing {
                kind: requested,
                name: name.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Loader that fabricates handles and can be told to fail on one name
    #[derive(Default)]
    struct FakeLoader {
        fail_on: Option<String>,
        calls: Vec<String>,
    }

    impl ResourceLoader for FakeLoader {
        fn load(&mut self, request: &QueuedResource) -> Result<Resource, String> {
            self.calls.push(request.name.clone());
            if self.fail_on.as_deref() == Some(request.name.as_str()) {
                return Err("404".to_string());
            }
            Ok(match request.kind {
                ResourceKind::Image => Resource::Texture(Texture {
                    url: request.url.clone(),
                    width: 64,
                    height: 32,
                }),
                ResourceKind::Sound => Resource::Sound(Sound {
                    url: request.url.clone(),
                    duration: Duration::from_millis(1200),
                }),
                ResourceKind::Font => Resource::Font(Font {
                    url: request.url.clone(),
                    family: request.name.clone(),
                }),
                ResourceKind::Spine => Resource::Spine(SpineData {
                    skeleton_url: request.url.clone(),
                    atlas_url: request.atlas.clone().unwrap_or_default(),
                }),
            })
        }
    }

    const MANIFEST: &str = r#"
        [resources.hero]
        url = "images/hero.png"
        kind = "image"

        [resources.click]
        url = "sounds/click.mp3"
        kind = "sound"

        [resources.dragon]
        url = "spine/dragon.json"
        kind = "spine"
    "#;

    fn manager() -> ResourceManager {
        let manifest = ResourceManifest::parse("res.toml", MANIFEST).unwrap();
        let mut manager = ResourceManager::new();
        manager.register(manifest);
        manager
    }

    #[test]
    fn test_enqueue_is_idempotent() {
        let mut manager = manager();
        manager.add_image("hero").unwrap();
        manager.add_image("hero").unwrap();
        assert_eq!(manager.pending(), 1);

        let mut loader = FakeLoader::default();
        assert_eq!(manager.load_all(&mut loader).unwrap(), 1);
        manager.add_image("hero").unwrap();
        assert_eq!(manager.pending(), 0);
        assert_eq!(loader.calls, vec!["hero"]);
    }

    #[test]
    fn test_unregistered_and_wrong_kind() {
        let mut manager = manager();
        assert_eq!(
            manager.add_font("comic"),
            Err(ResourceError::Unregistered("comic".to_string()))
        );
        assert!(matches!(
            manager.add_sound("hero"),
            Err(ResourceError::WrongKind { requested: ResourceKind::Sound, .. })
        ));
    }

    #[test]
    fn test_spine_atlas_defaults_next_to_skeleton() {
        let mut manager = manager();
        manager.add_spine("dragon").unwrap();
        manager.load_all(&mut FakeLoader::default()).unwrap();
        let spine = manager.spine("dragon").unwrap();
        assert_eq!(spine.atlas_url, "spine/dragon.atlas");
    }

    #[test]
    fn test_typed_getters_report_missing() {
        let mut manager = manager();
        manager.add_image("hero").unwrap();
        manager.load_all(&mut FakeLoader::default()).unwrap();

        assert_eq!(manager.texture("hero").unwrap().width, 64);
        assert_eq!(manager.sound("click").unwrap_err().to_string(), "missing sound - click");
        assert_eq!(manager.texture("villain").unwrap_err().to_string(), "missing texture - villain");
        assert_eq!(manager.url("click"), Some("sounds/click.mp3"));
    }

    #[test]
    fn test_typed_getter_of_other_kind_reports_wrong_kind() {
        let mut manager = manager();
        manager.add_image("hero").unwrap();
        manager.load_all(&mut FakeLoader::default()).unwrap();

        let err = manager.sound("hero").unwrap_err();
        assert_eq!(
            err,
            ResourceError::WrongKind {
                name: "hero".to_string(),
                registered: ResourceKind::Image,
                requested: ResourceKind::Sound,
            }
        );
        assert_eq!(err.to_string(), "resource hero is a texture, not a sound");
        assert!(matches!(manager.spine("hero"), Err(ResourceError::WrongKind { .. })));
    }

    #[test]
    fn test_failed_load_keeps_rest_queued() {
        let mut manager = manager();
        manager.add_image("hero").unwrap();
        manager.add_sound("click").unwrap();
        manager.add_spine("dragon").unwrap();

        let mut loader = FakeLoader {
            fail_on: Some("click".to_string()),
            ..Default::default()
        };
        let err = manager.load_all(&mut loader).unwrap_err();
        assert_eq!(
            err,
            ResourceError::Load { name: "click".to_string(), reason: "404".to_string() }
        );
        assert!(manager.is_loaded("hero"));
        assert_eq!(manager.pending(), 2);

        loader.fail_on = None;
        assert_eq!(manager.load_all(&mut loader).unwrap(), 2);
        assert!(manager.sound("click").is_ok());
    }
}
