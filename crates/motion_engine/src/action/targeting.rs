//! Target-tracking actions and the locatable capability
//!
//! A [`Locatable`] is anything with a current world-space position: a fixed
//! point, an externally polled input device, or another scene node. Actions
//! implementing [`Targeting`] can be redirected at a new locatable at
//! runtime by a composing action.

use crate::action::{Action, ActionContext, ActionError, ActionResult};
use crate::foundation::math::{Vec3, EPSILON};
use crate::physics;
use crate::property::Property;
use crate::scene::{NodeKey, SceneTree};
use std::cell::Cell;
use std::rc::Rc;

/// Capability of reporting a current world-space position
pub trait Locatable {
    /// Current position in world space
    fn location(&self, tree: &SceneTree) -> Vec3;
}

/// A fixed world-space point
#[derive(Debug, Clone, Copy)]
pub struct FixedTarget(pub Vec3);

impl Locatable for FixedTarget {
    fn location(&self, _tree: &SceneTree) -> Vec3 {
        self.0
    }
}

/// A shared position cell, updated by an external input source between steps
#[derive(Debug, Clone)]
pub struct PointerTarget(pub Rc<Cell<Vec3>>);

impl Locatable for PointerTarget {
    fn location(&self, _tree: &SceneTree) -> Vec3 {
        self.0.get()
    }
}

/// The absolute position of another scene node
///
/// A node that has been removed from the tree reads as the origin.
#[derive(Debug, Clone, Copy)]
pub struct NodeTarget(pub NodeKey);

impl Locatable for NodeTarget {
    fn location(&self, tree: &SceneTree) -> Vec3 {
        tree.absolute_position(self.0).unwrap_or_else(Vec3::zeros)
    }
}

/// An action whose target can be rebound at runtime
pub trait Targeting: Action {
    /// Redirect this action at a new target
    fn set_target(&mut self, target: Rc<dyn Locatable>);
}

/// Accelerates a node toward its target every step
///
/// The pull is a constant-magnitude force along the direction to the target.
/// When the node has already reached the target the direction is degenerate
/// and the scaling step is skipped rather than failing.
pub struct Follow {
    target: Rc<dyn Locatable>,
    strength: f32,
}

impl Follow {
    /// Pull nodes toward `target` with the given force magnitude
    pub fn new(target: Rc<dyn Locatable>, strength: f32) -> Self {
        Self { target, strength }
    }
}

impl Action for Follow {
    fn behave(
        &mut self,
        ctx: &mut ActionContext<'_>,
        node: NodeKey,
    ) -> Result<ActionResult, ActionError> {
        let goal = self.target.location(ctx.tree);
        let position = ctx
            .tree
            .absolute_position(node)
            .ok_or(ActionError::DetachedNode)?;
        let direction = goal - position;
        if direction.norm() <= EPSILON {
            // Already on target; nothing to normalize.
            return Ok(ActionResult::CONTINUE);
        }
        physics::apply_force(ctx.tree, node, direction.normalize() * self.strength)?;
        Ok(ActionResult::CONTINUE.with_changed())
    }

    fn required_properties(&self) -> Vec<Property> {
        physics::default_properties()
    }
}

impl Targeting for Follow {
    fn set_target(&mut self, target: Rc<dyn Locatable>) {
        self.target = target;
    }
}

/// Rebinds an inner targeting action to the node's left sibling every step
///
/// Nodes without a left sibling keep the inner action's current target.
pub struct SiblingTracker {
    inner: Box<dyn Targeting>,
}

impl SiblingTracker {
    /// Track left siblings with the given targeting action
    pub fn new(inner: impl Targeting + 'static) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }
}

impl Action for SiblingTracker {
    fn behave(
        &mut self,
        ctx: &mut ActionContext<'_>,
        node: NodeKey,
    ) -> Result<ActionResult, ActionError> {
        if let Some(sibling) = ctx.tree.left_sibling(node) {
            self.inner.set_target(Rc::new(NodeTarget(sibling)));
        }
        self.inner.behave(ctx, node)
    }

    fn required_properties(&self) -> Vec<Property> {
        self.inner.required_properties()
    }

    fn reset(&mut self, node: NodeKey) {
        self.inner.reset(node);
    }

    fn finished(&mut self, ctx: &mut ActionContext<'_>, node: NodeKey) {
        self.inner.finished(ctx, node);
    }
}
