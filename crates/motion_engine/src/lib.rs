//! # Motion Engine
//!
//! A behavior-driven property animation engine for hierarchical scene trees.
//!
//! ## Features
//!
//! - **Observable Properties**: Named, resettable values with change notification
//! - **Scene Tree**: Arena-backed hierarchy with geometry queries and deferred removal
//! - **Composable Actions**: Sequence, repeat, delay, interval and condition combinators
//! - **Physics**: Force accumulation convention with a per-step Euler integrator
//! - **Collision Dispatch**: Height-escalated pair dispatch over an external spatial index
//!
//! ## Quick Start
//!
//! ```rust
//! use motion_engine::prelude::*;
//!
//! fn main() -> Result<(), StepError> {
//!     let mut sim = Simulation::default();
//!     let root = sim.tree().root();
//!     let node = sim.tree_mut().attach_leaf(root, None).unwrap();
//!
//!     let timestep = sim.config().timestep;
//!     let physics = sim.add_behaviour(Behaviour::new("physics", Integrate::new(timestep)));
//!     sim.add_object(physics, node).unwrap();
//!
//!     for _ in 0..10 {
//!         sim.step()?;
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;

pub mod action;
pub mod behaviour;
pub mod collision;
pub mod physics;
pub mod property;
pub mod scene;

mod simulation;

pub use simulation::{
    BehaviourId, ConfigError, Simulation, SimulationConfig, SimulationError, StepError,
};

#[cfg(test)]
pub(crate) mod test_support;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        action::{
            combinators::{Always, Branch, Chain, Delay, Edge, EdgeKind, Interval, PointerOver, Repeat},
            targeting::{FixedTarget, Follow, Locatable, NodeTarget, PointerTarget, SiblingTracker, Targeting},
            Action, ActionContext, ActionError, ActionResult, NoOp, ResultFold,
        },
        behaviour::Behaviour,
        collision::{OnCollision, Repel, SpatialIndex},
        foundation::math::{Transform, Vec3},
        physics::{apply_acceleration, apply_force, apply_torque, ConstantForce, Drag, Integrate},
        property::{Color, ControlPointList, Property, PropertyBag, PropertyValue, ShapeId},
        scene::{Aabb, NodeKey, NodeRole, SceneError, SceneTree, POSITION},
        BehaviourId, ConfigError, Simulation, SimulationConfig, SimulationError, StepError,
    };
}
