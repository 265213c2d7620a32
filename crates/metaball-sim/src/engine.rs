//! Engine step: integrate every body once per timestep, then hand the
//! world to the collision hook.

use metaball_core::body::{Bodies, KinematicsWriter};

/// Extension point for collision handling. Both methods run on the engine
/// thread after integration; the defaults do nothing.
pub trait CollisionHook: Send {
    fn detect_collisions(&mut self, _bodies: &Bodies) {}

    fn solve_collisions(&mut self, _writer: &mut KinematicsWriter) {}
}

/// Bodies pass through each other.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCollisions;

impl CollisionHook for NoCollisions {}

pub struct EngineStep {
    writer: KinematicsWriter,
    timestep: f64,
    collisions: Box<dyn CollisionHook>,
    tick: u64,
}

impl EngineStep {
    pub fn new(writer: KinematicsWriter, timestep: f64, collisions: Box<dyn CollisionHook>) -> Self {
        Self {
            writer,
            timestep,
            collisions,
            tick: 0,
        }
    }

    pub fn step(&mut self) {
        self.tick += 1;
        log::trace!("engine step {} dt={}", self.tick, self.timestep);

        self.writer.integrate_all(self.timestep);
        self.collisions.detect_collisions(self.writer.bodies());
        self.collisions.solve_collisions(&mut self.writer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use metaball_core::body::{Body, BodySpec};
    use metaball_core::types::{BodyId, Color, KinematicState};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn bodies() -> (Bodies, KinematicsWriter) {
        let spec = |x: f64| BodySpec {
            mass: 1.0,
            radius: 5.0,
            color: Color::new("green"),
            position: DVec2::new(x, 0.0),
            velocity: DVec2::new(10.0, 0.0),
        };
        Bodies::build(vec![
            Body::new(spec(0.0)).unwrap(),
            Body::new(spec(100.0)).unwrap(),
        ])
    }

    struct CountingHook {
        detected: Arc<AtomicUsize>,
        solved: Arc<AtomicUsize>,
    }

    impl CollisionHook for CountingHook {
        fn detect_collisions(&mut self, bodies: &Bodies) {
            assert_eq!(bodies.len(), 2);
            self.detected.fetch_add(1, Ordering::SeqCst);
        }

        fn solve_collisions(&mut self, _writer: &mut KinematicsWriter) {
            self.solved.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Stops the first body dead on every tick.
    struct Wall;

    impl CollisionHook for Wall {
        fn solve_collisions(&mut self, writer: &mut KinematicsWriter) {
            let position = writer.bodies().get(BodyId(0)).unwrap().position();
            writer.set_state(BodyId(0), KinematicState::new(position, DVec2::ZERO));
        }
    }

    #[test]
    fn test_step_integrates_every_body() {
        let (bodies, writer) = bodies();
        let mut engine = EngineStep::new(writer, 0.01, Box::new(NoCollisions));
        engine.step();

        assert_eq!(bodies.get(BodyId(0)).unwrap().position().x, 0.1);
        assert_eq!(bodies.get(BodyId(1)).unwrap().position().x, 100.0 + 0.1);
    }

    #[test]
    fn test_hook_runs_once_per_step() {
        let (_bodies, writer) = bodies();
        let detected = Arc::new(AtomicUsize::new(0));
        let solved = Arc::new(AtomicUsize::new(0));
        let hook = CountingHook {
            detected: detected.clone(),
            solved: solved.clone(),
        };
        let mut engine = EngineStep::new(writer, 0.01, Box::new(hook));
        for _ in 0..3 {
            engine.step();
        }

        assert_eq!(detected.load(Ordering::SeqCst), 3);
        assert_eq!(solved.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_hook_can_rewrite_state() {
        let (bodies, writer) = bodies();
        let mut engine = EngineStep::new(writer, 0.01, Box::new(Wall));
        engine.step();
        engine.step();

        let stopped = bodies.get(BodyId(0)).unwrap();
        assert_eq!(stopped.velocity(), DVec2::ZERO);
        assert_eq!(stopped.position().x, 0.1);
        assert_eq!(bodies.get(BodyId(1)).unwrap().velocity().x, 10.0);
    }
}
