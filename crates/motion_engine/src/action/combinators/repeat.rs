//! Bounded and unbounded repetition of an action

use crate::action::{Action, ActionContext, ActionError, ActionResult};
use crate::property::Property;
use crate::scene::NodeKey;
use slotmap::SecondaryMap;

/// Repeats a wrapped action a fixed number of times per node
///
/// Each time the inner action completes, its per-node state is reset and a
/// per-node counter decrements; the repeat reports `cycled` on those steps
/// and completes only once the counter reaches zero. A count of 0 repeats
/// forever.
pub struct Repeat {
    inner: Box<dyn Action>,
    count: u32,
    remaining: SecondaryMap<NodeKey, u32>,
}

impl Repeat {
    /// Repeat `action` `count` times (0 = unbounded)
    pub fn new(action: impl Action + 'static, count: u32) -> Self {
        Self {
            inner: Box::new(action),
            count,
            remaining: SecondaryMap::new(),
        }
    }

    /// Repeat `action` forever
    pub fn forever(action: impl Action + 'static) -> Self {
        Self::new(action, 0)
    }
}

impl Action for Repeat {
    fn behave(
        &mut self,
        ctx: &mut ActionContext<'_>,
        node: NodeKey,
    ) -> Result<ActionResult, ActionError> {
        let result = self.inner.behave(ctx, node)?;
        if !result.complete {
            return Ok(result);
        }

        // Inner cycle finished: rewind it so the next step starts it over.
        self.inner.reset(node);

        if self.count == 0 {
            return Ok(ActionResult {
                complete: false,
                changed: result.changed,
                cycled: true,
            });
        }

        let remaining = self
            .remaining
            .get(node)
            .copied()
            .unwrap_or(self.count)
            .saturating_sub(1);
        self.remaining.insert(node, remaining);
        Ok(ActionResult {
            complete: remaining == 0,
            changed: result.changed,
            cycled: true,
        })
    }

    fn required_properties(&self) -> Vec<Property> {
        self.inner.required_properties()
    }

    fn reset(&mut self, node: NodeKey) {
        self.remaining.remove(node);
        self.inner.reset(node);
    }

    fn finished(&mut self, ctx: &mut ActionContext<'_>, node: NodeKey) {
        self.inner.finished(ctx, node);
    }
}
