//! Top-level step driver
//!
//! A [`Simulation`] owns the scene tree and every registered behaviour. One
//! simulation step runs every behaviour to completion, in registration
//! order, before the next step begins; deferred scene removals are flushed
//! at the step boundary. Exclusive ownership (`&mut self`) serializes a full
//! pass, so no internal locking is needed.

use crate::action::{ActionContext, ActionError};
use crate::behaviour::Behaviour;
use crate::scene::{NodeKey, SceneError, SceneTree};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Simulation settings, loadable from a TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Integration timestep per simulation step
    pub timestep: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { timestep: 1.0 }
    }
}

impl SimulationConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file could not be parsed
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A behaviour failure that aborted a simulation step
///
/// A failed step is fatal for that step's remaining pipeline; behaviours
/// registered after the failing one do not run.
#[derive(Error, Debug)]
#[error("behaviour '{behaviour}' failed: {source}")]
pub struct StepError {
    /// Name of the behaviour whose action failed
    pub behaviour: String,
    /// The underlying action failure
    #[source]
    pub source: ActionError,
}

/// Errors from behaviour registry operations
#[derive(Error, Debug)]
pub enum SimulationError {
    /// The id does not name a behaviour registered with this simulation
    #[error("no behaviour registered under id {0}")]
    UnknownBehaviour(usize),

    /// The underlying scene operation failed
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Index of a registered behaviour within a [`Simulation`]
///
/// Ids are only meaningful to the simulation that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BehaviourId(usize);

/// Owns the scene tree and drives every registered behaviour once per step
pub struct Simulation {
    tree: SceneTree,
    behaviours: Vec<Behaviour>,
    config: SimulationConfig,
    frame: u64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl Simulation {
    /// Create an empty simulation with the given settings
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            tree: SceneTree::new(),
            behaviours: Vec::new(),
            config,
            frame: 0,
        }
    }

    /// Simulation settings
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Number of completed steps
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// The scene tree
    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    /// The scene tree, for mutation between steps
    pub fn tree_mut(&mut self) -> &mut SceneTree {
        &mut self.tree
    }

    /// Register a behaviour; behaviours run in registration order
    pub fn add_behaviour(&mut self, behaviour: Behaviour) -> BehaviourId {
        log::info!("registered behaviour '{}'", behaviour.name());
        self.behaviours.push(behaviour);
        BehaviourId(self.behaviours.len() - 1)
    }

    /// Borrow a registered behaviour, or `None` for an id this simulation
    /// never issued
    pub fn behaviour(&self, id: BehaviourId) -> Option<&Behaviour> {
        self.behaviours.get(id.0)
    }

    /// Add a node to a registered behaviour's membership
    pub fn add_object(&mut self, id: BehaviourId, node: NodeKey) -> Result<(), SimulationError> {
        let behaviour = self
            .behaviours
            .get_mut(id.0)
            .ok_or(SimulationError::UnknownBehaviour(id.0))?;
        behaviour.add_object(&mut self.tree, node)?;
        Ok(())
    }

    /// Remove a node from a registered behaviour's membership, firing the
    /// action's completion hook
    pub fn remove_object(&mut self, id: BehaviourId, node: NodeKey) -> Result<(), SimulationError> {
        let behaviour = self
            .behaviours
            .get_mut(id.0)
            .ok_or(SimulationError::UnknownBehaviour(id.0))?;
        let mut ctx = ActionContext {
            tree: &mut self.tree,
            frame: self.frame,
        };
        behaviour.remove_object(&mut ctx, node);
        Ok(())
    }

    /// Run one full simulation step
    ///
    /// Every registered behaviour is invoked exactly once; scene removals
    /// requested during the step are applied afterwards, never mid-step.
    pub fn step(&mut self) -> Result<(), StepError> {
        self.frame += 1;
        for behaviour in &mut self.behaviours {
            let mut ctx = ActionContext {
                tree: &mut self.tree,
                frame: self.frame,
            };
            behaviour.step(&mut ctx).map_err(|source| StepError {
                behaviour: behaviour.name().to_owned(),
                source,
            })?;
        }
        let removed = self.tree.flush_removals();
        log::trace!("step {} complete ({} nodes removed)", self.frame, removed);
        Ok(())
    }
}
