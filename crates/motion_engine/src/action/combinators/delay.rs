//! Frame-counted gating of a wrapped action
//!
//! All waiting is state carried between discrete steps; nothing here blocks.

use crate::action::{Action, ActionContext, ActionError, ActionResult};
use crate::property::Property;
use crate::scene::NodeKey;
use slotmap::SecondaryMap;

/// Defers the first invocation of a wrapped action by a number of steps,
/// then behaves as a pass-through
pub struct Delay {
    inner: Box<dyn Action>,
    steps: u64,
    elapsed: SecondaryMap<NodeKey, u64>,
}

impl Delay {
    /// Defer `action` by `steps` simulation steps per node
    pub fn new(action: impl Action + 'static, steps: u64) -> Self {
        Self {
            inner: Box::new(action),
            steps,
            elapsed: SecondaryMap::new(),
        }
    }
}

impl Action for Delay {
    fn behave(
        &mut self,
        ctx: &mut ActionContext<'_>,
        node: NodeKey,
    ) -> Result<ActionResult, ActionError> {
        let elapsed = self.elapsed.get(node).copied().unwrap_or(0);
        if elapsed < self.steps {
            self.elapsed.insert(node, elapsed + 1);
            return Ok(ActionResult::CONTINUE);
        }
        self.inner.behave(ctx, node)
    }

    fn required_properties(&self) -> Vec<Property> {
        self.inner.required_properties()
    }

    fn reset(&mut self, node: NodeKey) {
        self.elapsed.remove(node);
        self.inner.reset(node);
    }

    fn finished(&mut self, ctx: &mut ActionContext<'_>, node: NodeKey) {
        self.inner.finished(ctx, node);
    }
}

/// Invokes a wrapped action only once every N steps
///
/// Gated steps report the wrapped action's result; all other steps report
/// the neutral non-complete result.
pub struct Interval {
    inner: Box<dyn Action>,
    period: u64,
    ticks: SecondaryMap<NodeKey, u64>,
}

impl Interval {
    /// Invoke `action` every `period` steps (a period of 0 is clamped to 1)
    pub fn new(action: impl Action + 'static, period: u64) -> Self {
        Self {
            inner: Box::new(action),
            period: period.max(1),
            ticks: SecondaryMap::new(),
        }
    }
}

impl Action for Interval {
    fn behave(
        &mut self,
        ctx: &mut ActionContext<'_>,
        node: NodeKey,
    ) -> Result<ActionResult, ActionError> {
        let tick = self.ticks.get(node).copied().unwrap_or(0);
        self.ticks.insert(node, tick + 1);
        if tick % self.period == 0 {
            self.inner.behave(ctx, node)
        } else {
            Ok(ActionResult::CONTINUE)
        }
    }

    fn required_properties(&self) -> Vec<Property> {
        self.inner.required_properties()
    }

    fn reset(&mut self, node: NodeKey) {
        self.ticks.remove(node);
        self.inner.reset(node);
    }

    fn finished(&mut self, ctx: &mut ActionContext<'_>, node: NodeKey) {
        self.inner.finished(ctx, node);
    }
}
