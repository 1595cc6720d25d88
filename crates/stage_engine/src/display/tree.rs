//! Arena-backed display tree

use super::DisplayObject;
use crate::foundation::collections::{NodeId, SlotMap};
use crate::foundation::math::{rotate, Vec2};
use thiserror::Error;

/// Errors from structural tree operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The handle does not refer to a live node
    #[error("unknown display object: {0:?}")]
    UnknownNode(NodeId),

    /// Attaching would make a node its own ancestor
    #[error("cannot attach {child:?} under its own descendant {parent:?}")]
    WouldCycle {
        /// Requested parent
        parent: NodeId,
        /// Requested child
        child: NodeId,
    },
}

/// Hierarchy of display objects
///
/// Nodes are owned by the tree; parent/child links are handles. Releasing a
/// node is crate-internal because it must go through the component teardown
/// in [`crate::ecs::Context::destroy`].
#[derive(Debug, Default)]
pub struct DisplayTree {
    nodes: SlotMap<NodeId, DisplayObject>,
}

impl DisplayTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached node
    pub fn create(&mut self, name: impl Into<String>) -> NodeId {
        self.nodes.insert(DisplayObject::new(name))
    }

    /// Insert a prepared object as a detached node
    pub fn insert(&mut self, mut object: DisplayObject) -> NodeId {
        object.parent = None;
        object.children.clear();
        object.host = super::ComponentHost::default();
        self.nodes.insert(object)
    }

    /// Whether the handle refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Borrow a node
    pub fn get(&self, id: NodeId) -> Option<&DisplayObject> {
        self.nodes.get(id)
    }

    /// Mutably borrow a node
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut DisplayObject> {
        self.nodes.get_mut(id)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append `child` to `parent`, detaching it from any previous parent
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if !self.contains(parent) {
            return Err(TreeError::UnknownNode(parent));
        }
        if !self.contains(child) {
            return Err(TreeError::UnknownNode(child));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(TreeError::WouldCycle { parent, child });
        }

        self.detach(child);
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
        Ok(())
    }

    /// Remove `child` from `parent`; no-op unless it is currently a child there
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        match self.nodes.get(child) {
            Some(node) if node.parent == Some(parent) => self.detach(child),
            _ => false,
        }
    }

    /// Detach a node from its parent, keeping it alive
    pub fn detach(&mut self, child: NodeId) -> bool {
        let Some(parent) = self.nodes.get_mut(child).and_then(|node| node.parent.take()) else {
            return false;
        };
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|c| *c != child);
        }
        true
    }

    /// Whether `ancestor` is on the parent chain of `node`
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.nodes.get(node).and_then(|n| n.parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(|n| n.parent);
        }
        false
    }

    /// Map a point in `id`'s local space to global space
    pub fn to_global(&self, id: NodeId, local: Vec2) -> Option<Vec2> {
        let mut point = local;
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.nodes.get(node_id)?;
            point = node.position + rotate(point.component_mul(&node.scale), node.rotation);
            current = node.parent;
        }
        Some(point)
    }

    /// Global position of a node's origin
    pub fn global_position(&self, id: NodeId) -> Option<Vec2> {
        let parent = self.nodes.get(id)?.parent;
        let position = self.nodes.get(id)?.position;
        match parent {
            Some(parent) => self.to_global(parent, position),
            None => Some(position),
        }
    }

    /// Map a global point into `id`'s local space
    ///
    /// Returns `None` for unknown nodes or when a zero scale on the chain
    /// makes the transform non-invertible.
    pub fn to_local(&self, id: NodeId, global: Vec2) -> Option<Vec2> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.nodes.get(node_id)?;
            chain.push(node_id);
            current = node.parent;
        }

        let mut point = global;
        for node_id in chain.into_iter().rev() {
            let node = self.nodes.get(node_id)?;
            if node.scale.x == 0.0 || node.scale.y == 0.0 {
                return None;
            }
            point = rotate(point - node.position, -node.rotation).component_div(&node.scale);
        }
        Some(point)
    }

    /// Every node in the subtree rooted at `id`, deepest first, ending with `id`
    pub fn post_order(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        if self.contains(id) {
            self.collect_post_order(id, &mut order);
        }
        order
    }

    fn collect_post_order(&self, id: NodeId, order: &mut Vec<NodeId>) {
        if let Some(node) = self.nodes.get(id) {
            for child in &node.children {
                self.collect_post_order(*child, order);
            }
            order.push(id);
        }
    }

    /// Remove a single node from the arena; its children are orphaned
    pub(crate) fn release(&mut self, id: NodeId) -> Option<DisplayObject> {
        self.detach(id);
        let node = self.nodes.remove(id)?;
        for child in &node.children {
            if let Some(child_node) = self.nodes.get_mut(*child) {
                child_node.parent = None;
            }
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::QUARTER_TURN;
    use approx::assert_relative_eq;

    #[test]
    fn test_add_and_remove_child() {
        let mut tree = DisplayTree::new();
        let root = tree.create("root");
        let child = tree.create("child");

        tree.add_child(root, child).unwrap();
        assert_eq!(tree.get(root).unwrap().children(), &[child]);
        assert_eq!(tree.get(child).unwrap().parent(), Some(root));

        assert!(tree.remove_child(root, child));
        assert!(!tree.remove_child(root, child));
        assert!(tree.get(root).unwrap().children().is_empty());
        assert!(tree.contains(child));
    }

    #[test]
    fn test_add_child_reparents() {
        let mut tree = DisplayTree::new();
        let a = tree.create("a");
        let b = tree.create("b");
        let child = tree.create("child");

        tree.add_child(a, child).unwrap();
        tree.add_child(b, child).unwrap();
        assert!(tree.get(a).unwrap().children().is_empty());
        assert_eq!(tree.get(b).unwrap().children(), &[child]);
    }

    #[test]
    fn test_cycle_rejected() {
        let mut tree = DisplayTree::new();
        let root = tree.create("root");
        let child = tree.create("child");
        tree.add_child(root, child).unwrap();

        assert_eq!(
            tree.add_child(child, root),
            Err(TreeError::WouldCycle { parent: child, child: root })
        );
        assert!(tree.add_child(root, root).is_err());
    }

    #[test]
    fn test_global_position_through_scaled_parent() {
        let mut tree = DisplayTree::new();
        let root = tree.create("root");
        let child = tree.create("child");
        tree.add_child(root, child).unwrap();
        tree.get_mut(root).unwrap().set_position(100.0, 50.0).set_scale(2.0, None);
        tree.get_mut(child).unwrap().set_position(10.0, 5.0);

        let global = tree.global_position(child).unwrap();
        assert_relative_eq!(global.x, 120.0);
        assert_relative_eq!(global.y, 60.0);

        let local = tree.to_local(root, global).unwrap();
        assert_relative_eq!(local.x, 10.0, epsilon = 1e-5);
        assert_relative_eq!(local.y, 5.0, epsilon = 1e-5);
    }

    #[test]
    fn test_to_local_inverts_rotation() {
        let mut tree = DisplayTree::new();
        let root = tree.create("root");
        tree.get_mut(root).unwrap().rotation = QUARTER_TURN;

        let global = tree.to_global(root, Vec2::new(3.0, 4.0)).unwrap();
        let local = tree.to_local(root, global).unwrap();
        assert_relative_eq!(local.x, 3.0, epsilon = 1e-5);
        assert_relative_eq!(local.y, 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_post_order_is_deepest_first() {
        let mut tree = DisplayTree::new();
        let root = tree.create("root");
        let a = tree.create("a");
        let a1 = tree.create("a1");
        let b = tree.create("b");
        tree.add_child(root, a).unwrap();
        tree.add_child(a, a1).unwrap();
        tree.add_child(root, b).unwrap();

        assert_eq!(tree.post_order(root), vec![a1, a, b, root]);
    }

    #[test]
    fn test_release_orphans_children() {
        let mut tree = DisplayTree::new();
        let root = tree.create("root");
        let child = tree.create("child");
        tree.add_child(root, child).unwrap();

        assert!(tree.release(root).is_some());
        assert!(!tree.contains(root));
        assert_eq!(tree.get(child).unwrap().parent(), None);
    }
}
