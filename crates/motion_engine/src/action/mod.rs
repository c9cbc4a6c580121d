//! Action protocol: per-step behavior units and their outcomes
//!
//! An [`Action`] is invoked once per member node per simulation step by the
//! [`Behaviour`](crate::behaviour::Behaviour) that binds it. Actions read and
//! write node properties through an [`ActionContext`] and report an
//! [`ActionResult`] per invocation. Actions that need memory across steps
//! keep it in per-node side tables ([`slotmap::SecondaryMap`]) rather than
//! on the node itself; entries are lazily created and never torn down, key
//! versioning makes entries for dropped nodes unreachable.

pub mod combinators;
pub mod targeting;

use crate::property::Property;
use crate::scene::{NodeKey, SceneError, SceneTree};
use thiserror::Error;

/// Errors raised by action invocation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// Pair invocation was attempted on a single-node action
    ///
    /// Recovered locally by callers through the documented fallback of two
    /// independent single-node invocations.
    #[error("action does not support pair invocation")]
    PairUnsupported,

    /// The node key no longer refers to a live scene node
    #[error("node is not attached to the scene tree")]
    DetachedNode,

    /// A property the action requires is absent from the node
    #[error("missing required property '{0}'")]
    MissingProperty(String),

    /// A property exists but holds a different value kind than expected
    #[error("property '{0}' has an unexpected kind")]
    PropertyKind(String),

    /// Structural scene-tree failure surfaced during an invocation
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Tri-flag outcome of one action invocation
///
/// `complete` always means the action is permanently done with this node and
/// must be retired from its behaviour. `changed` reports that a property was
/// mutated. `cycled` is call-site specific: periodic actions raise it when a
/// full period finished, recursive actions when structure beneath the node
/// changed; each producer documents its meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionResult {
    /// The action is permanently done with this node
    pub complete: bool,
    /// A property was mutated during this invocation
    pub changed: bool,
    /// Call-site-specific third flag (full cycle / structure changed)
    pub cycled: bool,
}

impl ActionResult {
    /// Neutral non-complete result: nothing happened, keep going
    pub const CONTINUE: Self = Self {
        complete: false,
        changed: false,
        cycled: false,
    };

    /// The action is done with this node
    pub const DONE: Self = Self {
        complete: true,
        changed: false,
        cycled: false,
    };

    /// Copy of this result with the `changed` flag raised
    pub const fn with_changed(mut self) -> Self {
        self.changed = true;
        self
    }

    /// Copy of this result with the `cycled` flag raised
    pub const fn with_cycled(mut self) -> Self {
        self.cycled = true;
        self
    }

    /// Conjunctive combination: each flag is the AND of both inputs
    ///
    /// An aggregate is complete only if every constituent is complete.
    pub const fn merge(self, other: Self) -> Self {
        Self {
            complete: self.complete && other.complete,
            changed: self.changed && other.changed,
            cycled: self.cycled && other.cycled,
        }
    }
}

/// Accumulator folding constituent results into one aggregate
///
/// Starts from the all-true identity of [`ActionResult::merge`] and ANDs
/// each absorbed result in; [`Self::finish`] maps the no-constituent case to
/// [`ActionResult::CONTINUE`] so an empty fold never reports completion.
#[derive(Debug, Clone, Copy)]
pub struct ResultFold {
    accumulated: ActionResult,
    folded: usize,
}

impl Default for ResultFold {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultFold {
    /// Start a fold at the merge identity
    pub const fn new() -> Self {
        Self {
            accumulated: ActionResult {
                complete: true,
                changed: true,
                cycled: true,
            },
            folded: 0,
        }
    }

    /// Fold one constituent result into the aggregate
    pub fn absorb(&mut self, result: ActionResult) {
        self.accumulated = self.accumulated.merge(result);
        self.folded += 1;
    }

    /// Finalize the aggregate
    pub fn finish(self) -> ActionResult {
        if self.folded == 0 {
            ActionResult::CONTINUE
        } else {
            self.accumulated
        }
    }
}

/// Execution context handed to every action invocation
pub struct ActionContext<'a> {
    /// The scene tree actions read and mutate
    pub tree: &'a mut SceneTree,
    /// Number of the simulation step currently running (first step is 1)
    pub frame: u64,
}

/// A unit of per-step behavior applied to one (or a pair of) scene nodes
pub trait Action {
    /// Apply this action to one node for the current step
    fn behave(
        &mut self,
        ctx: &mut ActionContext<'_>,
        node: NodeKey,
    ) -> Result<ActionResult, ActionError>;

    /// Apply this action to an interacting pair of nodes
    ///
    /// Only meaningful when [`Self::supports_pairs`] returns true; the
    /// default body signals the capability gap as a typed error.
    fn behave_pair(
        &mut self,
        _ctx: &mut ActionContext<'_>,
        _first: NodeKey,
        _second: NodeKey,
    ) -> Result<ActionResult, ActionError> {
        Err(ActionError::PairUnsupported)
    }

    /// Whether [`Self::behave_pair`] is implemented
    ///
    /// Dispatchers probe this instead of catching [`ActionError::PairUnsupported`].
    fn supports_pairs(&self) -> bool {
        false
    }

    /// Default properties this action requires on any node it acts upon
    ///
    /// The binding layer installs each entry only if the node does not
    /// already carry a property with that name.
    fn required_properties(&self) -> Vec<Property> {
        Vec::new()
    }

    /// Discard any per-node state held for `node`, so the next invocation
    /// starts the action from the beginning
    fn reset(&mut self, _node: NodeKey) {}

    /// Completion hook, invoked exactly once when a node is retired from a
    /// behaviour driving this action
    fn finished(&mut self, _ctx: &mut ActionContext<'_>, _node: NodeKey) {}
}

/// Action that does nothing and never completes
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOp;

impl Action for NoOp {
    fn behave(
        &mut self,
        _ctx: &mut ActionContext<'_>,
        _node: NodeKey,
    ) -> Result<ActionResult, ActionError> {
        Ok(ActionResult::CONTINUE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneTree;

    #[test]
    fn test_empty_fold_is_neutral() {
        let fold = ResultFold::new();
        assert_eq!(fold.finish(), ActionResult::CONTINUE);
    }

    #[test]
    fn test_fold_is_conjunctive_per_flag() {
        let mut fold = ResultFold::new();
        fold.absorb(ActionResult::DONE.with_changed());
        fold.absorb(ActionResult::CONTINUE.with_changed());
        let aggregate = fold.finish();

        // One constituent was not complete, so the aggregate is not.
        assert!(!aggregate.complete);
        assert!(aggregate.changed);
        assert!(!aggregate.cycled);
    }

    #[test]
    fn test_fold_all_complete() {
        let mut fold = ResultFold::new();
        fold.absorb(ActionResult::DONE);
        fold.absorb(ActionResult::DONE);
        assert!(fold.finish().complete);
    }

    #[test]
    fn test_default_pair_invocation_is_unsupported() {
        let mut tree = SceneTree::new();
        let node = tree.attach_leaf(tree.root(), None).unwrap();
        let mut ctx = ActionContext {
            tree: &mut tree,
            frame: 1,
        };
        let mut action = NoOp;
        assert!(!action.supports_pairs());
        assert_eq!(
            action.behave_pair(&mut ctx, node, node),
            Err(ActionError::PairUnsupported)
        );
    }
}
