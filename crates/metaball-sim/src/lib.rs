//! Runtime for the metaball simulation.
//!
//! Three fixed-rate loops run on their own threads against the shared
//! bodies: the engine integrates forces, the render loop redraws on a
//! [`RenderSurface`], and the optional telemetry loop prints counters.

pub mod clock;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod fixed_rate;
pub mod render;
pub mod telemetry;
pub mod world;

pub use render::RenderSurface;
pub use world::{SimulationWorld, WorldConfig};
