//! Sequential composition of actions

use crate::action::{Action, ActionContext, ActionError, ActionResult};
use crate::property::Property;
use crate::scene::NodeKey;
use slotmap::SecondaryMap;

/// Delegates to an ordered list of actions, one at a time per node
///
/// The current element is invoked until it reports complete, then the chain
/// advances; the next element first runs on the following step. The chain
/// itself completes only when the last element completes. Advancement is
/// tracked per node, so one chain instance can drive many nodes.
pub struct Chain {
    actions: Vec<Box<dyn Action>>,
    index: SecondaryMap<NodeKey, usize>,
}

impl Chain {
    /// Create a chain over the given actions
    pub fn new(actions: Vec<Box<dyn Action>>) -> Self {
        Self {
            actions,
            index: SecondaryMap::new(),
        }
    }

    /// Append another action to the end of the chain
    #[must_use]
    pub fn then(mut self, action: impl Action + 'static) -> Self {
        self.actions.push(Box::new(action));
        self
    }

    /// Number of composed actions
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the chain holds no actions (such a chain completes at once)
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl Action for Chain {
    fn behave(
        &mut self,
        ctx: &mut ActionContext<'_>,
        node: NodeKey,
    ) -> Result<ActionResult, ActionError> {
        let index = self.index.get(node).copied().unwrap_or(0);
        if index >= self.actions.len() {
            return Ok(ActionResult::DONE);
        }

        let result = self.actions[index].behave(ctx, node)?;
        if !result.complete {
            return Ok(result);
        }

        let next = index + 1;
        self.index.insert(node, next);
        Ok(ActionResult {
            complete: next >= self.actions.len(),
            changed: result.changed,
            cycled: result.cycled,
        })
    }

    fn required_properties(&self) -> Vec<Property> {
        let mut merged: Vec<Property> = Vec::new();
        for action in &self.actions {
            for property in action.required_properties() {
                if !merged.iter().any(|p| p.name() == property.name()) {
                    merged.push(property);
                }
            }
        }
        merged
    }

    fn reset(&mut self, node: NodeKey) {
        self.index.remove(node);
        for action in &mut self.actions {
            action.reset(node);
        }
    }

    fn finished(&mut self, ctx: &mut ActionContext<'_>, node: NodeKey) {
        for action in &mut self.actions {
            action.finished(ctx, node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneTree;
    use crate::test_support::Scripted;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_chain_hands_over_exactly_after_completion() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut chain = Chain::new(vec![
            Box::new(Scripted::new("a", 3, Rc::clone(&log))),
            Box::new(Scripted::new("b", 2, Rc::clone(&log))),
        ]);

        let mut tree = SceneTree::new();
        let node = tree.attach_leaf(tree.root(), None).unwrap();

        let mut results = Vec::new();
        for frame in 1..=5 {
            let mut ctx = ActionContext {
                tree: &mut tree,
                frame,
            };
            results.push(chain.behave(&mut ctx, node).unwrap());
        }

        // A runs for the first three steps, B from step four onward.
        assert_eq!(*log.borrow(), vec!["a", "a", "a", "b", "b"]);
        // Complete is reported only once B completes.
        let completions: Vec<bool> = results.iter().map(|r| r.complete).collect();
        assert_eq!(completions, vec![false, false, false, false, true]);
    }

    #[test]
    fn test_empty_chain_completes_immediately() {
        let mut chain = Chain::new(Vec::new());
        let mut tree = SceneTree::new();
        let node = tree.attach_leaf(tree.root(), None).unwrap();
        let mut ctx = ActionContext {
            tree: &mut tree,
            frame: 1,
        };
        assert!(chain.behave(&mut ctx, node).unwrap().complete);
    }

    #[test]
    fn test_chain_merges_required_properties() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let chain = Chain::new(vec![
            Box::new(Scripted::new("a", 1, Rc::clone(&log))),
            Box::new(Scripted::new("b", 1, Rc::clone(&log))),
            Box::new(Scripted::new("a", 1, Rc::clone(&log))),
        ]);
        let names: Vec<String> = chain
            .required_properties()
            .iter()
            .map(|p| p.name().to_owned())
            .collect();
        assert_eq!(names, vec!["a.armed".to_owned(), "b.armed".to_owned()]);
    }

    #[test]
    fn test_reset_restarts_chain_per_node() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut chain = Chain::new(vec![
            Box::new(Scripted::new("a", 1, Rc::clone(&log))),
            Box::new(Scripted::new("b", 9, Rc::clone(&log))),
        ]);
        let mut tree = SceneTree::new();
        let node = tree.attach_leaf(tree.root(), None).unwrap();

        for frame in 1..=2 {
            let mut ctx = ActionContext {
                tree: &mut tree,
                frame,
            };
            chain.behave(&mut ctx, node).unwrap();
        }
        chain.reset(node);
        let mut ctx = ActionContext {
            tree: &mut tree,
            frame: 3,
        };
        chain.behave(&mut ctx, node).unwrap();

        assert_eq!(*log.borrow(), vec!["a", "b", "a"]);
    }
}
