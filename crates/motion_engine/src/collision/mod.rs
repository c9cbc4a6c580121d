//! Collision-conditioned dispatch
//!
//! Broad-phase overlap lookup is an external collaborator behind the
//! [`SpatialIndex`] trait: the core consumes a single query, "potential
//! collisions for node X", returning leaf-level nodes. [`OnCollision`] maps
//! each colliding leaf up to the tree depth of the node it is acting for and
//! dispatches a sub-action on every unique colliding pair.

use crate::action::{Action, ActionContext, ActionError, ActionResult, ResultFold};
use crate::foundation::math::EPSILON;
use crate::physics;
use crate::property::Property;
use crate::scene::{NodeKey, SceneTree};
use std::collections::HashSet;

/// External spatial-overlap collaborator
///
/// Implementations own whatever partitioning scheme they like; the core
/// only asks for the set of leaf nodes potentially overlapping a node.
pub trait SpatialIndex {
    /// Leaf-level nodes potentially colliding with `node`
    fn potential_collisions(&self, tree: &SceneTree, node: NodeKey) -> Vec<NodeKey>;
}

/// Invokes a sub-action on every unique colliding pair of a member node
///
/// Per step: whitespace leaves are skipped (no spatial presence), each
/// colliding leaf is escalated exactly `height(self)` parent steps (stopping
/// early at the root) so the partner sits at the same tree depth, escalated
/// partners are de-duplicated preserving first-seen order, and the
/// sub-action runs pairwise on (collider, self) when it supports pairs or
/// falls back to two independent single-node invocations otherwise. All
/// constituent results fold conjunctively; with no collisions the result is
/// the neutral non-complete one.
pub struct OnCollision {
    index: Box<dyn SpatialIndex>,
    action: Box<dyn Action>,
}

impl OnCollision {
    /// Dispatch `action` on pairs reported by `index`
    pub fn new(index: impl SpatialIndex + 'static, action: impl Action + 'static) -> Self {
        Self {
            index: Box::new(index),
            action: Box::new(action),
        }
    }

    fn escalated_colliders(&self, tree: &SceneTree, node: NodeKey) -> Vec<NodeKey> {
        let height = tree.height(node).unwrap_or(0);
        let mut seen = HashSet::new();
        let mut colliders = Vec::new();
        for leaf in self.index.potential_collisions(tree, node) {
            let mut cursor = leaf;
            for _ in 0..height {
                match tree.parent(cursor) {
                    Some(parent) => cursor = parent,
                    None => break,
                }
            }
            if cursor != node && seen.insert(cursor) {
                colliders.push(cursor);
            }
        }
        colliders
    }
}

impl Action for OnCollision {
    fn behave(
        &mut self,
        ctx: &mut ActionContext<'_>,
        node: NodeKey,
    ) -> Result<ActionResult, ActionError> {
        if !ctx.tree.contains(node) {
            return Err(ActionError::DetachedNode);
        }
        if ctx.tree.is_whitespace(node) {
            return Ok(ActionResult::CONTINUE);
        }

        let colliders = self.escalated_colliders(ctx.tree, node);
        if !colliders.is_empty() {
            log::trace!("collision dispatch: {} unique partner(s)", colliders.len());
        }

        let mut fold = ResultFold::new();
        for collider in colliders {
            if self.action.supports_pairs() {
                fold.absorb(self.action.behave_pair(ctx, collider, node)?);
            } else {
                // Fallback: two independent single-node invocations.
                fold.absorb(self.action.behave(ctx, collider)?);
                fold.absorb(self.action.behave(ctx, node)?);
            }
        }
        Ok(fold.finish())
    }

    fn required_properties(&self) -> Vec<Property> {
        self.action.required_properties()
    }

    fn reset(&mut self, node: NodeKey) {
        self.action.reset(node);
    }

    fn finished(&mut self, ctx: &mut ActionContext<'_>, node: NodeKey) {
        self.action.finished(ctx, node);
    }
}

/// Pair-capable action applying equal-and-opposite separation forces
///
/// The push acts along the axis from the first node of the pair to the
/// second; fully coincident nodes are skipped rather than normalized.
#[derive(Debug, Clone, Copy)]
pub struct Repel {
    strength: f32,
}

impl Repel {
    /// Push pair members apart with the given force magnitude
    pub fn new(strength: f32) -> Self {
        Self { strength }
    }
}

impl Action for Repel {
    fn behave(
        &mut self,
        _ctx: &mut ActionContext<'_>,
        _node: NodeKey,
    ) -> Result<ActionResult, ActionError> {
        // A lone node has nothing to push against.
        Ok(ActionResult::CONTINUE)
    }

    fn behave_pair(
        &mut self,
        ctx: &mut ActionContext<'_>,
        first: NodeKey,
        second: NodeKey,
    ) -> Result<ActionResult, ActionError> {
        let from = ctx
            .tree
            .absolute_position(first)
            .ok_or(ActionError::DetachedNode)?;
        let to = ctx
            .tree
            .absolute_position(second)
            .ok_or(ActionError::DetachedNode)?;
        let separation = to - from;
        if separation.norm() <= EPSILON {
            return Ok(ActionResult::CONTINUE);
        }
        let push = separation.normalize() * self.strength;
        physics::apply_force(ctx.tree, second, push)?;
        physics::apply_force(ctx.tree, first, -push)?;
        Ok(ActionResult::CONTINUE.with_changed())
    }

    fn supports_pairs(&self) -> bool {
        true
    }

    fn required_properties(&self) -> Vec<Property> {
        physics::default_properties()
    }
}
