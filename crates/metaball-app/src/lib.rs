//! Headless metaball application.
//!
//! Wires a scenario into a running `SimulationWorld`, keeps the latest
//! rendered frame in shared state and reads key events from the console.

pub mod cli;
pub mod console;
pub mod state;
pub mod surface;
