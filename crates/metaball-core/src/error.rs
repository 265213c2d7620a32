//! Construction-time errors.
//!
//! Nothing in the running loops returns an error: invalid bodies are
//! rejected before a world can be built, missed deadlines are counted,
//! and unbound input is ignored.

use std::path::PathBuf;

use thiserror::Error;

/// A body failed validation at construction.
#[derive(Debug, Error, PartialEq)]
pub enum BodyError {
    #[error("body mass must be positive, got {0}")]
    NonPositiveMass(f64),
    #[error("body radius must be positive, got {0}")]
    NonPositiveRadius(f64),
    #[error("body {field} must be finite")]
    NonFinite { field: &'static str },
}

/// A scenario document could not be loaded or turned into bodies.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("body {index} is invalid: {source}")]
    Body {
        index: usize,
        #[source]
        source: BodyError,
    },
    #[error("{name} must be a positive number of seconds, got {value}")]
    InvalidStep { name: &'static str, value: f64 },
    #[error("binding for key {key:?} targets body {body}, but the scenario has {count} bodies")]
    UnknownBody {
        key: String,
        body: usize,
        count: usize,
    },
    #[error("binding key must not be empty")]
    EmptyKey,
}
