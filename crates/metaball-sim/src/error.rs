//! Errors raised while building or starting a world.

use metaball_core::error::ScenarioError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("{name} must be a positive number of seconds, got {value}")]
    InvalidStep { name: &'static str, value: f64 },
    #[error("the world is already running")]
    AlreadyRunning,
    #[error("failed to spawn {name} loop thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}
