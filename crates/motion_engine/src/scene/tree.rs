//! Hierarchical scene tree
//!
//! Nodes live in a slotmap arena owned by [`SceneTree`]; parent and child
//! links are keys, so a node never owns its parent and stale keys are
//! detected by the arena's key versioning. Structural removal is deferred:
//! the driver flushes marked nodes at the end of a simulation step, never
//! mid-step, so iteration over the tree stays stable while behaviours run.

use crate::foundation::math::{Transform, Vec3};
use crate::property::{Property, PropertyBag};
use crate::scene::bounds::Aabb;
use slotmap::SlotMap;
use thiserror::Error;

slotmap::new_key_type! {
    /// Stable, versioned key identifying a node in a [`SceneTree`]
    pub struct NodeKey;
}

/// Name of the position property every node carries
pub const POSITION: &str = "position";

/// Errors raised by structural scene-tree operations
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneError {
    /// The node key no longer refers to a live node
    #[error("node is not attached to the scene tree")]
    Detached,

    /// Leaves have individually addressable geometry and no children
    #[error("leaf nodes cannot have children")]
    LeafParent,
}

/// Structural role of a node in the tree
#[derive(Debug, Clone, PartialEq)]
pub enum NodeRole {
    /// Tree root; owns the tree lifecycle and has no parent
    Root,
    /// Container node grouping an ordered list of children
    Group,
    /// Leaf with addressable geometry; `None` bounds marks a whitespace
    /// leaf with no spatial presence
    Leaf {
        /// Local-space bounding box of the leaf's outline
        bounds: Option<Aabb>,
    },
}

/// A single element of the scene tree
#[derive(Debug)]
pub struct SceneNode {
    role: NodeRole,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
    properties: PropertyBag,
    height: u32,
}

impl SceneNode {
    fn new(role: NodeRole, parent: Option<NodeKey>) -> Self {
        let mut properties = PropertyBag::new();
        properties.insert(Property::vector(POSITION, Vec3::zeros()));
        Self {
            role,
            parent,
            children: Vec::new(),
            properties,
            height: 0,
        }
    }

    /// Structural role of this node
    pub fn role(&self) -> &NodeRole {
        &self.role
    }

    /// Property bag of this node
    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    /// Mutable property bag of this node
    pub fn properties_mut(&mut self) -> &mut PropertyBag {
        &mut self.properties
    }

    /// Cached distance to the nearest descendant leaf (leaves are 0)
    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Arena-backed hierarchical collection of scene nodes
#[derive(Debug)]
pub struct SceneTree {
    nodes: SlotMap<NodeKey, SceneNode>,
    root: NodeKey,
    pending_removals: Vec<NodeKey>,
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneTree {
    /// Create a tree holding only a root node
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::new(NodeRole::Root, None));
        Self {
            nodes,
            root,
            pending_removals: Vec::new(),
        }
    }

    /// Key of the root node
    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Whether the key refers to a live node
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Total number of live nodes, including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no nodes besides the root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Borrow a node
    pub fn node(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    /// Mutably borrow a node
    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut SceneNode> {
        self.nodes.get_mut(key)
    }

    /// Attach a new group node under `parent`
    pub fn attach_group(&mut self, parent: NodeKey) -> Result<NodeKey, SceneError> {
        self.attach(parent, NodeRole::Group)
    }

    /// Attach a new leaf node under `parent`
    ///
    /// Pass `None` bounds for a whitespace leaf with no spatial presence.
    pub fn attach_leaf(
        &mut self,
        parent: NodeKey,
        bounds: Option<Aabb>,
    ) -> Result<NodeKey, SceneError> {
        self.attach(parent, NodeRole::Leaf { bounds })
    }

    fn attach(&mut self, parent: NodeKey, role: NodeRole) -> Result<NodeKey, SceneError> {
        match self.nodes.get(parent) {
            None => return Err(SceneError::Detached),
            Some(node) => {
                if matches!(node.role, NodeRole::Leaf { .. }) {
                    return Err(SceneError::LeafParent);
                }
            }
        }
        let key = self.nodes.insert(SceneNode::new(role, Some(parent)));
        self.nodes[parent].children.push(key);
        self.recompute_heights();
        Ok(key)
    }

    /// Parent of a node, if it has one
    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key).and_then(|node| node.parent)
    }

    /// Ordered children of a node (empty for leaves and dead keys)
    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        match self.nodes.get(key) {
            Some(node) => node.children.as_slice(),
            None => &[],
        }
    }

    /// Sibling immediately to the left in the parent's child order
    pub fn left_sibling(&self, key: NodeKey) -> Option<NodeKey> {
        let parent = self.parent(key)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&child| child == key)?;
        index.checked_sub(1).map(|left| siblings[left])
    }

    /// Cached height of a node (distance to its nearest descendant leaf)
    pub fn height(&self, key: NodeKey) -> Option<u32> {
        self.nodes.get(key).map(SceneNode::height)
    }

    /// Whether the node is a whitespace leaf with no spatial presence
    pub fn is_whitespace(&self, key: NodeKey) -> bool {
        matches!(
            self.nodes.get(key).map(|node| &node.role),
            Some(NodeRole::Leaf { bounds: None })
        )
    }

    /// Look up a property on a node by name
    pub fn property(&self, key: NodeKey, name: &str) -> Option<&Property> {
        self.nodes.get(key).and_then(|node| node.properties.get(name))
    }

    /// Look up a property on a node by name, for mutation
    pub fn property_mut(&mut self, key: NodeKey, name: &str) -> Option<&mut Property> {
        self.nodes
            .get_mut(key)
            .and_then(|node| node.properties.get_mut(name))
    }

    /// Install each default property on the node only if absent
    pub fn init_properties(
        &mut self,
        key: NodeKey,
        defaults: &[Property],
    ) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(key).ok_or(SceneError::Detached)?;
        node.properties.init_properties(defaults);
        Ok(())
    }

    /// World-space position, accumulated along the parent chain
    pub fn absolute_position(&self, key: NodeKey) -> Option<Vec3> {
        if !self.contains(key) {
            return None;
        }
        let mut position = Vec3::zeros();
        let mut current = Some(key);
        while let Some(cursor) = current {
            let node = self.nodes.get(cursor)?;
            if let Some(local) = node.properties.get(POSITION).and_then(Property::as_vector) {
                position += local;
            }
            current = node.parent;
        }
        Some(position)
    }

    /// World-space coordinate system of a node
    pub fn absolute_coordinate_system(&self, key: NodeKey) -> Option<Transform> {
        self.absolute_position(key).map(Transform::from_position)
    }

    /// Map a world-space point into a node's local coordinate system
    pub fn to_local(&self, key: NodeKey, world: Vec3) -> Option<Vec3> {
        self.absolute_coordinate_system(key)
            .map(|system| system.inverse().apply(world))
    }

    /// World-space bounding box of a node's subtree
    ///
    /// Leaves report their local box translated to world space; containers
    /// report the union over their descendants. `None` means the subtree has
    /// no spatial presence.
    pub fn bounding_box(&self, key: NodeKey) -> Option<Aabb> {
        let node = self.nodes.get(key)?;
        match &node.role {
            NodeRole::Leaf { bounds } => {
                let local = (*bounds)?;
                Some(local.translated(self.absolute_position(key)?))
            }
            NodeRole::Root | NodeRole::Group => {
                let mut combined: Option<Aabb> = None;
                for &child in &node.children {
                    if let Some(child_box) = self.bounding_box(child) {
                        combined = Some(match combined {
                            Some(acc) => acc.union(&child_box),
                            None => child_box,
                        });
                    }
                }
                combined
            }
        }
    }

    /// Flag a node's subtree for removal at the end of the current step
    ///
    /// The node stays fully reachable until [`Self::flush_removals`] runs, so
    /// in-flight iteration never observes a mutating tree. The root cannot be
    /// removed.
    pub fn mark_for_removal(&mut self, key: NodeKey) {
        if key == self.root {
            log::warn!("ignoring removal request for the scene root");
            return;
        }
        if self.contains(key) {
            self.pending_removals.push(key);
        }
    }

    /// Excise every subtree flagged since the last flush
    ///
    /// Called by the driver at the step boundary. Returns the number of
    /// nodes removed.
    pub fn flush_removals(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending_removals);
        let mut removed = 0;
        for key in pending {
            if !self.contains(key) {
                continue;
            }
            if let Some(parent) = self.parent(key) {
                self.nodes[parent].children.retain(|&child| child != key);
            }
            removed += self.remove_subtree(key);
        }
        if removed > 0 {
            self.recompute_heights();
            log::debug!("flushed {removed} scene nodes");
        }
        removed
    }

    fn remove_subtree(&mut self, key: NodeKey) -> usize {
        let children = match self.nodes.remove(key) {
            Some(node) => node.children,
            None => return 0,
        };
        let mut removed = 1;
        for child in children {
            removed += self.remove_subtree(child);
        }
        removed
    }

    fn recompute_heights(&mut self) {
        let root = self.root;
        self.recompute_height(root);
    }

    fn recompute_height(&mut self, key: NodeKey) -> u32 {
        let children = self.nodes[key].children.clone();
        let height = children
            .iter()
            .map(|&child| self.recompute_height(child))
            .min()
            .map_or(0, |nearest| nearest + 1);
        self.nodes[key].height = height;
        height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::foundation::math::EPSILON;

    fn unit_box() -> Aabb {
        Aabb::from_center_extents(Vec3::zeros(), Vec3::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn test_heights_follow_nearest_leaf() {
        let mut tree = SceneTree::new();
        let group = tree.attach_group(tree.root()).unwrap();
        let inner = tree.attach_group(group).unwrap();
        let leaf = tree.attach_leaf(inner, Some(unit_box())).unwrap();
        let shallow_leaf = tree.attach_leaf(tree.root(), Some(unit_box())).unwrap();

        assert_eq!(tree.height(leaf), Some(0));
        assert_eq!(tree.height(shallow_leaf), Some(0));
        assert_eq!(tree.height(inner), Some(1));
        assert_eq!(tree.height(group), Some(2));
        // Root's nearest leaf is the shallow one.
        assert_eq!(tree.height(tree.root()), Some(1));
    }

    #[test]
    fn test_empty_means_root_only() {
        let mut tree = SceneTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 1);

        let leaf = tree.attach_leaf(tree.root(), None).unwrap();
        assert!(!tree.is_empty());

        tree.mark_for_removal(leaf);
        tree.flush_removals();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_left_sibling() {
        let mut tree = SceneTree::new();
        let first = tree.attach_leaf(tree.root(), None).unwrap();
        let second = tree.attach_leaf(tree.root(), None).unwrap();

        assert_eq!(tree.left_sibling(second), Some(first));
        assert_eq!(tree.left_sibling(first), None);
        assert_eq!(tree.left_sibling(tree.root()), None);
    }

    #[test]
    fn test_leaves_cannot_have_children() {
        let mut tree = SceneTree::new();
        let leaf = tree.attach_leaf(tree.root(), None).unwrap();
        assert_eq!(tree.attach_group(leaf), Err(SceneError::LeafParent));
    }

    #[test]
    fn test_absolute_position_accumulates_parent_chain() {
        let mut tree = SceneTree::new();
        let group = tree.attach_group(tree.root()).unwrap();
        let leaf = tree.attach_leaf(group, Some(unit_box())).unwrap();

        tree.property_mut(group, POSITION)
            .unwrap()
            .set_vector(Vec3::new(1.0, 0.0, 0.0));
        tree.property_mut(leaf, POSITION)
            .unwrap()
            .set_vector(Vec3::new(0.0, 2.0, 0.0));

        let world = tree.absolute_position(leaf).unwrap();
        assert_relative_eq!(world, Vec3::new(1.0, 2.0, 0.0), epsilon = EPSILON);

        let local = tree.to_local(leaf, Vec3::new(1.0, 2.0, 3.0)).unwrap();
        assert_relative_eq!(local, Vec3::new(0.0, 0.0, 3.0), epsilon = EPSILON);
    }

    #[test]
    fn test_group_bounds_union_children() {
        let mut tree = SceneTree::new();
        let group = tree.attach_group(tree.root()).unwrap();
        let a = tree.attach_leaf(group, Some(unit_box())).unwrap();
        let b = tree.attach_leaf(group, Some(unit_box())).unwrap();
        let _space = tree.attach_leaf(group, None).unwrap();

        tree.property_mut(a, POSITION)
            .unwrap()
            .set_vector(Vec3::new(-2.0, 0.0, 0.0));
        tree.property_mut(b, POSITION)
            .unwrap()
            .set_vector(Vec3::new(2.0, 0.0, 0.0));

        let bounds = tree.bounding_box(group).unwrap();
        assert_relative_eq!(bounds.min.x, -2.5, epsilon = EPSILON);
        assert_relative_eq!(bounds.max.x, 2.5, epsilon = EPSILON);
    }

    #[test]
    fn test_whitespace_leaf_has_no_bounds() {
        let mut tree = SceneTree::new();
        let space = tree.attach_leaf(tree.root(), None).unwrap();
        assert!(tree.is_whitespace(space));
        assert!(tree.bounding_box(space).is_none());
    }

    #[test]
    fn test_removal_is_deferred_until_flush() {
        let mut tree = SceneTree::new();
        let group = tree.attach_group(tree.root()).unwrap();
        let leaf = tree.attach_leaf(group, Some(unit_box())).unwrap();

        tree.mark_for_removal(group);
        assert!(tree.contains(group));
        assert!(tree.contains(leaf));

        let removed = tree.flush_removals();
        assert_eq!(removed, 2);
        assert!(!tree.contains(group));
        assert!(!tree.contains(leaf));
        assert!(tree.children(tree.root()).is_empty());
    }

    #[test]
    fn test_root_removal_ignored() {
        let mut tree = SceneTree::new();
        tree.mark_for_removal(tree.root());
        assert_eq!(tree.flush_removals(), 0);
        assert!(tree.contains(tree.root()));
    }
}
