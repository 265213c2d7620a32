//! Core types and definitions for the metaball simulation.
//!
//! This crate defines the vocabulary shared across the other crates:
//! bodies, the force integrator, input bindings, scenario configuration
//! and constants. It spawns no threads and has no rendering dependency.

pub mod body;
pub mod constants;
pub mod error;
pub mod input;
pub mod integrator;
pub mod scenario;
pub mod types;

pub use body::{Bodies, Body, BodyHandle, BodySpec, KinematicsWriter};
pub use error::{BodyError, ScenarioError};
