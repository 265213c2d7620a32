//! Scenario documents: the initial bodies, cadence overrides and key
//! bindings of a run, loaded from JSON.
//!
//! ```json
//! {
//!   "telemetry": true,
//!   "timestep": 0.01,
//!   "bodies": [
//!     { "mass": 1.0, "radius": 15.0, "color": "blue", "position": [50, 50] }
//!   ],
//!   "bindings": [
//!     { "key": "w", "body": 0, "axis": "y", "value": -5.0 }
//!   ]
//! }
//! ```
//!
//! A binding entry binds press to `value` and release to zero.

use std::fs;
use std::path::Path;
use std::time::Duration;

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::body::{Bodies, Body, BodySpec};
use crate::constants::*;
use crate::error::ScenarioError;
use crate::input::{Axis, Bindings, KeySymbol};
use crate::types::{BodyId, Color};

/// Initial state of one body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyConfig {
    pub mass: f64,
    pub radius: f64,
    #[serde(default)]
    pub color: Color,
    pub position: [f64; 2],
    #[serde(default)]
    pub velocity: [f64; 2],
}

impl BodyConfig {
    pub fn to_spec(&self) -> BodySpec {
        BodySpec {
            mass: self.mass,
            radius: self.radius,
            color: self.color.clone(),
            position: DVec2::from_array(self.position),
            velocity: DVec2::from_array(self.velocity),
        }
    }
}

/// Hold-to-push binding on one force axis of one body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingConfig {
    pub key: String,
    pub body: usize,
    pub axis: Axis,
    pub value: f64,
}

/// A complete scenario. Absent cadences fall back to the world defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub bodies: Vec<BodyConfig>,
    pub bindings: Vec<BindingConfig>,
    pub timestep: Option<f64>,
    pub framestep: Option<f64>,
    pub logstep: Option<f64>,
    pub telemetry: Option<bool>,
}

impl ScenarioConfig {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// One blue ball steered with WASD.
    pub fn demo() -> Self {
        let wasd = [
            ("w", Axis::Y, -DEMO_FORCE),
            ("s", Axis::Y, DEMO_FORCE),
            ("a", Axis::X, -DEMO_FORCE),
            ("d", Axis::X, DEMO_FORCE),
        ];
        Self {
            bodies: vec![BodyConfig {
                mass: DEMO_MASS,
                radius: DEMO_RADIUS,
                color: Color::new("blue"),
                position: DEMO_POSITION,
                velocity: [0.0, 0.0],
            }],
            bindings: wasd
                .into_iter()
                .map(|(key, axis, value)| BindingConfig {
                    key: key.to_string(),
                    body: 0,
                    axis,
                    value,
                })
                .collect(),
            ..Default::default()
        }
    }

    /// `count` random bodies inside the canvas. Same seed, same bodies.
    /// The first body gets WASD bindings.
    pub fn scatter(seed: u64, count: usize) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let bodies = (0..count)
            .map(|i| {
                let radius = rng.gen_range(SCATTER_RADIUS_RANGE.0..SCATTER_RADIUS_RANGE.1);
                BodyConfig {
                    mass: rng.gen_range(SCATTER_MASS_RANGE.0..SCATTER_MASS_RANGE.1),
                    radius,
                    color: Color::new(SCATTER_COLORS[i % SCATTER_COLORS.len()]),
                    position: [
                        rng.gen_range(radius..CANVAS_WIDTH - radius),
                        rng.gen_range(radius..CANVAS_HEIGHT - radius),
                    ],
                    velocity: [
                        rng.gen_range(-SCATTER_MAX_SPEED..SCATTER_MAX_SPEED),
                        rng.gen_range(-SCATTER_MAX_SPEED..SCATTER_MAX_SPEED),
                    ],
                }
            })
            .collect::<Vec<_>>();

        let bindings = if bodies.is_empty() {
            Vec::new()
        } else {
            Self::demo().bindings
        };

        Self {
            bodies,
            bindings,
            ..Default::default()
        }
    }

    /// Check cadences and binding targets. Body attributes are checked
    /// when the bodies are built.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        for (name, step) in [
            ("timestep", self.timestep),
            ("framestep", self.framestep),
            ("logstep", self.logstep),
        ] {
            if let Some(value) = step {
                // Must also fit in a `Duration` the loops can sleep on.
                match Duration::try_from_secs_f64(value) {
                    Ok(period) if !period.is_zero() => {}
                    _ => return Err(ScenarioError::InvalidStep { name, value }),
                }
            }
        }
        for binding in &self.bindings {
            if binding.key.trim().is_empty() {
                return Err(ScenarioError::EmptyKey);
            }
            if binding.body >= self.bodies.len() {
                return Err(ScenarioError::UnknownBody {
                    key: binding.key.clone(),
                    body: binding.body,
                    count: self.bodies.len(),
                });
            }
        }
        Ok(())
    }

    /// Construct every body, failing on the first invalid one.
    pub fn build_bodies(&self) -> Result<Vec<Body>, ScenarioError> {
        self.bodies
            .iter()
            .enumerate()
            .map(|(index, config)| {
                Body::new(config.to_spec()).map_err(|source| ScenarioError::Body { index, source })
            })
            .collect()
    }

    /// Turn binding entries into actions on `bodies`.
    pub fn build_bindings(&self, bodies: &Bodies) -> Result<Bindings, ScenarioError> {
        let mut table = Bindings::new();
        for binding in &self.bindings {
            let handle = bodies
                .handle(BodyId(binding.body))
                .ok_or_else(|| ScenarioError::UnknownBody {
                    key: binding.key.clone(),
                    body: binding.body,
                    count: bodies.len(),
                })?;
            table.bind_axis(
                KeySymbol::new(binding.key.trim()),
                &handle,
                binding.axis,
                binding.value,
            );
        }
        Ok(table)
    }
}
