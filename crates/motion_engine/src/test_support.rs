//! Shared scripted actions for unit tests

use crate::action::{Action, ActionContext, ActionError, ActionResult};
use crate::property::Property;
use crate::scene::NodeKey;
use slotmap::SecondaryMap;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Scripted action that completes on the Nth invocation per node and records
/// every invocation in a shared log
pub struct Scripted {
    tag: &'static str,
    complete_after: u32,
    calls: SecondaryMap<NodeKey, u32>,
    pub log: Rc<RefCell<Vec<&'static str>>>,
    pub finished_count: Rc<Cell<usize>>,
}

impl Scripted {
    pub fn new(tag: &'static str, complete_after: u32, log: Rc<RefCell<Vec<&'static str>>>) -> Self {
        Self {
            tag,
            complete_after,
            calls: SecondaryMap::new(),
            log,
            finished_count: Rc::new(Cell::new(0)),
        }
    }
}

impl Action for Scripted {
    fn behave(
        &mut self,
        _ctx: &mut ActionContext<'_>,
        node: NodeKey,
    ) -> Result<ActionResult, ActionError> {
        self.log.borrow_mut().push(self.tag);
        let calls = self.calls.get(node).copied().unwrap_or(0) + 1;
        self.calls.insert(node, calls);
        if calls >= self.complete_after {
            Ok(ActionResult::DONE.with_changed())
        } else {
            Ok(ActionResult::CONTINUE.with_changed())
        }
    }

    fn required_properties(&self) -> Vec<Property> {
        vec![Property::boolean(format!("{}.armed", self.tag), true)]
    }

    fn reset(&mut self, node: NodeKey) {
        self.calls.remove(node);
    }

    fn finished(&mut self, _ctx: &mut ActionContext<'_>, _node: NodeKey) {
        self.finished_count.set(self.finished_count.get() + 1);
    }
}
