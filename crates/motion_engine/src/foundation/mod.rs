//! Foundation utilities for the simulation core
//!
//! Math types and logging helpers shared by every other module.

pub mod logging;
pub mod math;
