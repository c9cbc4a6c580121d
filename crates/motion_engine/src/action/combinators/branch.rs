//! Condition-gated dispatch between two actions

use crate::action::targeting::Locatable;
use crate::action::{Action, ActionContext, ActionError, ActionResult, NoOp};
use crate::property::Property;
use crate::scene::NodeKey;
use slotmap::SecondaryMap;
use std::rc::Rc;

/// Per-node condition evaluated once per step by a [`Branch`]
pub trait Predicate {
    /// Evaluate the condition for one node
    fn test(&mut self, ctx: &ActionContext<'_>, node: NodeKey) -> bool;
}

/// Predicate with a fixed value, mainly useful for composition and tests
#[derive(Debug, Clone, Copy)]
pub struct Always(pub bool);

impl Predicate for Always {
    fn test(&mut self, _ctx: &ActionContext<'_>, _node: NodeKey) -> bool {
        self.0
    }
}

/// Transition direction an [`Edge`] fires on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Fire on a false-to-true transition
    Rising,
    /// Fire on a true-to-false transition
    Falling,
}

/// Edge-triggered wrapper around any predicate
///
/// Persists the previous value per node and reports true only on the
/// configured transition, never on sustained state. The previous value
/// starts as false, so a predicate that is true on the very first step
/// counts as a rising edge.
pub struct Edge {
    inner: Box<dyn Predicate>,
    kind: EdgeKind,
    previous: SecondaryMap<NodeKey, bool>,
}

impl Edge {
    /// Wrap `predicate`, firing on the given transition
    pub fn new(predicate: impl Predicate + 'static, kind: EdgeKind) -> Self {
        Self {
            inner: Box::new(predicate),
            kind,
            previous: SecondaryMap::new(),
        }
    }

    /// Fire when `predicate` turns true
    pub fn rising(predicate: impl Predicate + 'static) -> Self {
        Self::new(predicate, EdgeKind::Rising)
    }

    /// Fire when `predicate` turns false
    pub fn falling(predicate: impl Predicate + 'static) -> Self {
        Self::new(predicate, EdgeKind::Falling)
    }
}

impl Predicate for Edge {
    fn test(&mut self, ctx: &ActionContext<'_>, node: NodeKey) -> bool {
        let value = self.inner.test(ctx, node);
        let previous = self.previous.insert(node, value).unwrap_or(false);
        match self.kind {
            EdgeKind::Rising => value && !previous,
            EdgeKind::Falling => !value && previous,
        }
    }
}

/// True while a locatable pointer is inside the node's bounding box
pub struct PointerOver {
    pointer: Rc<dyn Locatable>,
}

impl PointerOver {
    /// Track the given pointer source
    pub fn new(pointer: Rc<dyn Locatable>) -> Self {
        Self { pointer }
    }
}

impl Predicate for PointerOver {
    fn test(&mut self, ctx: &ActionContext<'_>, node: NodeKey) -> bool {
        let position = self.pointer.location(ctx.tree);
        ctx.tree
            .bounding_box(node)
            .is_some_and(|bounds| bounds.contains_point(position))
    }
}

/// Selects between two actions based on a per-node predicate
///
/// On every step the predicate picks the true-branch or the false-branch
/// action (a no-op by default) and the branch returns that sub-action's
/// result unchanged.
pub struct Branch {
    predicate: Box<dyn Predicate>,
    on_true: Box<dyn Action>,
    on_false: Box<dyn Action>,
}

impl Branch {
    /// Run `on_true` while the predicate holds, a no-op otherwise
    pub fn when(predicate: impl Predicate + 'static, on_true: impl Action + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
            on_true: Box::new(on_true),
            on_false: Box::new(NoOp),
        }
    }

    /// Replace the false-branch action
    #[must_use]
    pub fn otherwise(mut self, on_false: impl Action + 'static) -> Self {
        self.on_false = Box::new(on_false);
        self
    }
}

impl Action for Branch {
    fn behave(
        &mut self,
        ctx: &mut ActionContext<'_>,
        node: NodeKey,
    ) -> Result<ActionResult, ActionError> {
        if self.predicate.test(ctx, node) {
            self.on_true.behave(ctx, node)
        } else {
            self.on_false.behave(ctx, node)
        }
    }

    fn required_properties(&self) -> Vec<Property> {
        let mut merged = self.on_true.required_properties();
        for property in self.on_false.required_properties() {
            if !merged.iter().any(|p| p.name() == property.name()) {
                merged.push(property);
            }
        }
        merged
    }

    fn reset(&mut self, node: NodeKey) {
        self.on_true.reset(node);
        self.on_false.reset(node);
    }

    fn finished(&mut self, ctx: &mut ActionContext<'_>, node: NodeKey) {
        self.on_true.finished(ctx, node);
        self.on_false.finished(ctx, node);
    }
}
