//! Fundamental kinematic and display types.

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Stable index of a body inside its world. Assigned at build time,
/// valid for the lifetime of the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyId(pub usize);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Display color, passed through untouched to the rendering surface
/// (a named color such as `"blue"` or a `#rrggbb` string).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub String);

impl Color {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("blue")
    }
}

impl From<&str> for Color {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Position and velocity of a point mass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KinematicState {
    pub position: DVec2,
    pub velocity: DVec2,
}

impl KinematicState {
    pub fn new(position: DVec2, velocity: DVec2) -> Self {
        Self { position, velocity }
    }
}

/// Everything a rendering surface needs to draw one body.
///
/// Built from independent per-field reads, so position and velocity may
/// come from different engine ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub id: BodyId,
    pub position: DVec2,
    pub velocity: DVec2,
    pub radius: f64,
    pub color: Color,
}

impl BodySnapshot {
    /// Bounding box `(x0, y0, x1, y1)` of the body's circle.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let r = self.radius;
        (
            self.position.x - r,
            self.position.y - r,
            self.position.x + r,
            self.position.y + r,
        )
    }
}
