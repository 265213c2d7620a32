//! Point-mass bodies shared between the engine, render and input contexts.
//!
//! Every mutable scalar lives in its own atomic so the loops can share
//! bodies without locks. Writers are split by field:
//!
//! - applied force: any [`BodyHandle`] (the input layer), last write wins
//! - position and velocity: the single [`KinematicsWriter`] (the engine loop)
//!
//! Readers see each scalar atomically but nothing more: a snapshot taken
//! while the engine is mid-step can mix old and new components.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glam::DVec2;

use crate::error::BodyError;
use crate::integrator;
use crate::types::{BodyId, BodySnapshot, Color, KinematicState};

/// `f64` stored as bits in an `AtomicU64`.
#[derive(Debug)]
struct AtomicF64(AtomicU64);

impl AtomicF64 {
    fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

#[derive(Debug)]
struct AtomicVec2 {
    x: AtomicF64,
    y: AtomicF64,
}

impl AtomicVec2 {
    fn new(v: DVec2) -> Self {
        Self {
            x: AtomicF64::new(v.x),
            y: AtomicF64::new(v.y),
        }
    }

    fn load(&self) -> DVec2 {
        DVec2::new(self.x.load(), self.y.load())
    }

    fn store(&self, v: DVec2) {
        self.x.store(v.x);
        self.y.store(v.y);
    }
}

/// Initial description of a body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodySpec {
    pub mass: f64,
    pub radius: f64,
    pub color: Color,
    pub position: DVec2,
    pub velocity: DVec2,
}

/// A point mass with immutable display attributes and atomically shared
/// kinematic state.
#[derive(Debug)]
pub struct Body {
    mass: f64,
    radius: f64,
    color: Color,
    position: AtomicVec2,
    velocity: AtomicVec2,
    force: AtomicVec2,
}

impl Body {
    /// Validate `spec` and create a body at rest under zero force.
    ///
    /// Fails on non-positive mass or radius and on non-finite inputs.
    pub fn new(spec: BodySpec) -> Result<Self, BodyError> {
        if !spec.mass.is_finite() {
            return Err(BodyError::NonFinite { field: "mass" });
        }
        if spec.mass <= 0.0 {
            return Err(BodyError::NonPositiveMass(spec.mass));
        }
        if !spec.radius.is_finite() {
            return Err(BodyError::NonFinite { field: "radius" });
        }
        if spec.radius <= 0.0 {
            return Err(BodyError::NonPositiveRadius(spec.radius));
        }
        if !spec.position.is_finite() {
            return Err(BodyError::NonFinite { field: "position" });
        }
        if !spec.velocity.is_finite() {
            return Err(BodyError::NonFinite { field: "velocity" });
        }

        Ok(Self {
            mass: spec.mass,
            radius: spec.radius,
            color: spec.color,
            position: AtomicVec2::new(spec.position),
            velocity: AtomicVec2::new(spec.velocity),
            force: AtomicVec2::new(DVec2::ZERO),
        })
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn position(&self) -> DVec2 {
        self.position.load()
    }

    pub fn velocity(&self) -> DVec2 {
        self.velocity.load()
    }

    /// Currently applied force. Not cleared by integration.
    pub fn force(&self) -> DVec2 {
        self.force.load()
    }

    pub fn state(&self) -> KinematicState {
        KinematicState::new(self.position(), self.velocity())
    }

    /// Overwrite the applied force.
    pub fn apply_force(&self, force: DVec2) {
        self.force.store(force);
    }

    pub fn set_force_x(&self, fx: f64) {
        self.force.x.store(fx);
    }

    pub fn set_force_y(&self, fy: f64) {
        self.force.y.store(fy);
    }

    pub fn snapshot(&self, id: BodyId) -> BodySnapshot {
        BodySnapshot {
            id,
            position: self.position(),
            velocity: self.velocity(),
            radius: self.radius,
            color: self.color.clone(),
        }
    }

    fn integrate(&self, dt: f64) {
        let next = integrator::integrate(self.state(), self.force(), self.mass, dt);
        self.position.store(next.position);
        self.velocity.store(next.velocity);
    }
}

/// Ordered, fixed collection of bodies. Cloning is cheap and shares the
/// same bodies.
#[derive(Debug, Clone)]
pub struct Bodies {
    inner: Arc<[Body]>,
}

impl Bodies {
    /// Freeze `bodies` into a shared collection and hand out the one
    /// writer allowed to move them.
    pub fn build(bodies: Vec<Body>) -> (Self, KinematicsWriter) {
        let bodies = Self {
            inner: bodies.into(),
        };
        let writer = KinematicsWriter {
            bodies: bodies.clone(),
        };
        (bodies, writer)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.inner.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.inner
            .iter()
            .enumerate()
            .map(|(index, body)| (BodyId(index), body))
    }

    /// Force-setting handle for body `id`, if it exists.
    pub fn handle(&self, id: BodyId) -> Option<BodyHandle> {
        self.get(id).map(|_| BodyHandle {
            bodies: self.clone(),
            id,
        })
    }

    pub fn snapshot(&self) -> Vec<BodySnapshot> {
        self.iter().map(|(id, body)| body.snapshot(id)).collect()
    }
}

/// Cloneable, thread-safe capability to set one body's applied force.
#[derive(Debug, Clone)]
pub struct BodyHandle {
    bodies: Bodies,
    id: BodyId,
}

impl BodyHandle {
    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn body(&self) -> &Body {
        // Handles are only created for ids inside the fixed collection.
        &self.bodies.inner[self.id.0]
    }

    pub fn apply_force(&self, fx: f64, fy: f64) {
        self.body().apply_force(DVec2::new(fx, fy));
    }

    pub fn set_force_x(&self, fx: f64) {
        self.body().set_force_x(fx);
    }

    pub fn set_force_y(&self, fy: f64) {
        self.body().set_force_y(fy);
    }
}

/// Sole writer of body positions and velocities. Not `Clone`: exactly one
/// exists per [`Bodies`] collection, owned by the engine loop.
#[derive(Debug)]
pub struct KinematicsWriter {
    bodies: Bodies,
}

impl KinematicsWriter {
    /// Integrate every body once, in collection order.
    pub fn integrate_all(&mut self, dt: f64) {
        for body in self.bodies.inner.iter() {
            body.integrate(dt);
        }
    }

    /// Overwrite one body's position and velocity, e.g. for a collision
    /// response. Returns false if `id` is out of range.
    pub fn set_state(&mut self, id: BodyId, state: KinematicState) -> bool {
        match self.bodies.get(id) {
            Some(body) => {
                body.position.store(state.position);
                body.velocity.store(state.velocity);
                true
            }
            None => false,
        }
    }

    pub fn bodies(&self) -> &Bodies {
        &self.bodies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(mass: f64, radius: f64) -> BodySpec {
        BodySpec {
            mass,
            radius,
            color: Color::new("blue"),
            position: DVec2::new(50.0, 50.0),
            velocity: DVec2::ZERO,
        }
    }

    #[test]
    fn test_rejects_non_positive_mass() {
        assert_eq!(
            Body::new(spec(0.0, 1.0)).unwrap_err(),
            BodyError::NonPositiveMass(0.0)
        );
        assert_eq!(
            Body::new(spec(-2.0, 1.0)).unwrap_err(),
            BodyError::NonPositiveMass(-2.0)
        );
    }

    #[test]
    fn test_rejects_non_positive_radius() {
        assert_eq!(
            Body::new(spec(1.0, 0.0)).unwrap_err(),
            BodyError::NonPositiveRadius(0.0)
        );
    }

    #[test]
    fn test_rejects_nan() {
        assert_eq!(
            Body::new(spec(f64::NAN, 1.0)).unwrap_err(),
            BodyError::NonFinite { field: "mass" }
        );
        let mut bad = spec(1.0, 1.0);
        bad.velocity = DVec2::new(f64::INFINITY, 0.0);
        assert_eq!(
            Body::new(bad).unwrap_err(),
            BodyError::NonFinite { field: "velocity" }
        );
    }

    #[test]
    fn test_force_is_last_write_wins() {
        let body = Body::new(spec(1.0, 1.0)).unwrap();
        body.apply_force(DVec2::new(1.0, 2.0));
        body.set_force_x(-5.0);
        assert_eq!(body.force(), DVec2::new(-5.0, 2.0));
        body.set_force_y(0.0);
        assert_eq!(body.force(), DVec2::new(-5.0, 0.0));
    }

    #[test]
    fn test_force_survives_integration() {
        let body = Body::new(spec(1.0, 1.0)).unwrap();
        let (bodies, mut writer) = Bodies::build(vec![body]);
        bodies.handle(BodyId(0)).unwrap().apply_force(3.0, 0.0);

        writer.integrate_all(0.01);
        writer.integrate_all(0.01);

        let body = bodies.get(BodyId(0)).unwrap();
        assert_eq!(body.force(), DVec2::new(3.0, 0.0));
        assert!(body.velocity().x > 0.0);
    }

    #[test]
    fn test_handles_share_state() {
        let (bodies, _writer) = Bodies::build(vec![
            Body::new(spec(1.0, 1.0)).unwrap(),
            Body::new(spec(2.0, 1.0)).unwrap(),
        ]);
        let handle = bodies.handle(BodyId(1)).unwrap();
        let copy = handle.clone();
        copy.set_force_y(7.0);

        assert_eq!(handle.body().force().y, 7.0);
        assert_eq!(bodies.get(BodyId(0)).unwrap().force(), DVec2::ZERO);
        assert!(bodies.handle(BodyId(2)).is_none());
    }

    #[test]
    fn test_snapshot_preserves_order() {
        let (bodies, _writer) = Bodies::build(vec![
            Body::new(spec(1.0, 3.0)).unwrap(),
            Body::new(spec(1.0, 4.0)).unwrap(),
        ]);
        let snapshot = bodies.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id, BodyId(0));
        assert_eq!(snapshot[1].radius, 4.0);
        assert_eq!(snapshot[1].bounds(), (46.0, 46.0, 54.0, 54.0));
    }
}
