//! Physics property convention and force integration
//!
//! Physics-aware nodes carry a fixed set of properties by name. Independent
//! actions accumulate into the `force` and `torque` properties during a
//! step; the [`Integrate`] action turns the accumulated totals into motion
//! once per step and zeroes them, which is what makes accumulation safe to
//! call any number of times per step without double-counting across steps.

mod forces;
mod integrator;

pub use forces::{apply_acceleration, apply_angular_acceleration, apply_force, apply_torque};
pub use integrator::{ConstantForce, Drag, Integrate};

use crate::foundation::math::Vec3;
use crate::property::Property;

/// Scalar mass property (≥ 0; 0 means immovable). Default 1.
pub const MASS: &str = "mass";

/// Vector velocity property
pub const VELOCITY: &str = "velocity";

/// Vector force accumulator, zeroed by the integrator every step
pub const FORCE: &str = "force";

/// Scalar angular velocity property
pub const ANGULAR_VELOCITY: &str = "angular-velocity";

/// Scalar torque accumulator, zeroed by the integrator every step
pub const TORQUE: &str = "torque";

/// Scalar rotation angle updated by angular integration
pub const ROTATION: &str = "rotation";

/// Default properties every physics-aware node carries
pub fn default_properties() -> Vec<Property> {
    vec![
        Property::scalar(MASS, 1.0),
        Property::vector(VELOCITY, Vec3::zeros()),
        Property::vector(FORCE, Vec3::zeros()),
        Property::scalar(ANGULAR_VELOCITY, 0.0),
        Property::scalar(TORQUE, 0.0),
        Property::scalar(ROTATION, 0.0),
    ]
}
