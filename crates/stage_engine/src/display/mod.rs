//! Display objects and the arena-backed display tree
//!
//! The display tree stands in for the host renderer's scene graph: it keeps
//! transforms, visibility and the parent/child hierarchy, and every node
//! embeds a [`ComponentHost`] listing the components attached to it.

mod object;
mod tree;

pub use object::{ComponentHost, DisplayFlags, DisplayObject};
pub use tree::{DisplayTree, TreeError};
