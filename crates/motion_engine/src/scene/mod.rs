//! Scene tree and node geometry
//!
//! The tree owns every node; behaviours and actions address nodes through
//! stable [`NodeKey`]s.

mod bounds;
mod tree;

pub use bounds::Aabb;
pub use tree::{NodeKey, NodeRole, SceneError, SceneNode, SceneTree, POSITION};
