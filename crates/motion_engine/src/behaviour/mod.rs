//! Binding of actions to live sets of scene nodes
//!
//! A [`Behaviour`] owns one action and the set of nodes it currently drives.
//! Membership is unique and insertion-ordered, giving deterministic
//! iteration; nodes added while a step is running are first processed the
//! following step because each step iterates a snapshot of the membership.

use crate::action::{Action, ActionContext, ActionError};
use crate::scene::{NodeKey, SceneError, SceneTree};

/// Binds an action to a live, mutable set of scene nodes and drives one
/// invocation per node per simulation step
pub struct Behaviour {
    name: String,
    action: Box<dyn Action>,
    members: Vec<NodeKey>,
}

impl Behaviour {
    /// Create a behaviour driving `action`, named for logging and error
    /// context
    pub fn new(name: impl Into<String>, action: impl Action + 'static) -> Self {
        Self {
            name: name.into(),
            action: Box::new(action),
            members: Vec::new(),
        }
    }

    /// Name of this behaviour
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current members in insertion order
    pub fn members(&self) -> &[NodeKey] {
        &self.members
    }

    /// Whether the node is currently a member
    pub fn contains(&self, node: NodeKey) -> bool {
        self.members.contains(&node)
    }

    /// Number of member nodes
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the behaviour has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Add a node to the membership
    ///
    /// Merges the action's required properties into the node (only entries
    /// the node does not already carry). Adding a node twice is a no-op. A
    /// node added while a step runs is first processed the next step.
    pub fn add_object(&mut self, tree: &mut SceneTree, node: NodeKey) -> Result<(), SceneError> {
        if self.contains(node) {
            return Ok(());
        }
        tree.init_properties(node, &self.action.required_properties())?;
        self.members.push(node);
        log::debug!("behaviour '{}' added node (now {})", self.name, self.members.len());
        Ok(())
    }

    /// Remove a node from the membership
    ///
    /// Invokes the action's completion hook exactly once per node; both
    /// driver-initiated retirement and caller-initiated removal converge
    /// here, and membership is the once-guard.
    pub fn remove_object(&mut self, ctx: &mut ActionContext<'_>, node: NodeKey) {
        if let Some(index) = self.members.iter().position(|&member| member == node) {
            self.members.remove(index);
            self.action.finished(ctx, node);
            log::debug!("behaviour '{}' retired node (now {})", self.name, self.members.len());
        }
    }

    /// Invoke the action once per member for this step
    ///
    /// Members whose result is complete are retired; members whose node has
    /// disappeared from the tree are retired silently.
    pub fn step(&mut self, ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        let roster = self.members.clone();
        let mut retired = Vec::new();
        for node in roster {
            if !ctx.tree.contains(node) {
                retired.push(node);
                continue;
            }
            let result = self.action.behave(ctx, node)?;
            if result.complete {
                retired.push(node);
            }
        }
        for node in retired {
            self.remove_object(ctx, node);
        }
        Ok(())
    }
}
