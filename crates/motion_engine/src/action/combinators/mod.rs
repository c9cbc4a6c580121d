//! Higher-order actions built by composing other actions
//!
//! Combinators carry their own per-node state in side tables, so the same
//! combinator instance can drive many nodes through different phases of the
//! same composition.

mod branch;
mod chain;
mod delay;
mod repeat;

pub use branch::{Always, Branch, Edge, EdgeKind, PointerOver, Predicate};
pub use chain::Chain;
pub use delay::{Delay, Interval};
pub use repeat::Repeat;
