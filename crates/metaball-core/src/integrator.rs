//! Force integration for a single point mass.
//!
//! One step under a constant applied force `F` over `dt`:
//!
//! ```text
//! a  = F / m
//! dv = a * dt
//! ds = (dv * dt) / 2
//! x' = x + (v * dt + ds)
//! v' = v + dv
//! ```
//!
//! The velocity delta is computed first and the position update uses the
//! *old* velocity plus a half-step term built from that delta. The grouping
//! of the position sum is part of the contract: results are compared
//! bit-for-bit against this exact expression.

use glam::DVec2;

use crate::types::KinematicState;

/// Advance `state` by `dt` seconds under `force` acting on `mass`.
///
/// `mass` is trusted to be positive; bodies validate it at construction.
pub fn integrate(state: KinematicState, force: DVec2, mass: f64, dt: f64) -> KinematicState {
    let acceleration = force / mass;
    let delta_v = acceleration * dt;
    let half_step = (delta_v * dt) / 2.0;

    KinematicState {
        position: state.position + (state.velocity * dt + half_step),
        velocity: state.velocity + delta_v,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_force_from_rest() {
        let state = KinematicState::new(DVec2::new(50.0, 50.0), DVec2::ZERO);
        let next = integrate(state, DVec2::new(10.0, 0.0), 1.0, 0.01);

        assert_relative_eq!(next.velocity.x, 0.1, epsilon = 1e-12);
        assert_eq!(next.velocity.y, 0.0);
        // 0 * dt + (0.1 * 0.01) / 2
        assert_relative_eq!(next.position.x, 50.0 + 0.0005, epsilon = 1e-12);
        assert_eq!(next.position.y, 50.0);
    }

    #[test]
    fn test_matches_scalar_formula_exactly() {
        let (m, dt) = (2.5, 0.01);
        let (x, y, vx, vy) = (3.0, -7.25, 1.5, -0.75);
        let (fx, fy) = (-4.0, 9.0);

        let ax = fx / m;
        let dvx = ax * dt;
        let sx = (dvx * dt) / 2.0;
        let ay = fy / m;
        let dvy = ay * dt;
        let sy = (dvy * dt) / 2.0;

        let next = integrate(
            KinematicState::new(DVec2::new(x, y), DVec2::new(vx, vy)),
            DVec2::new(fx, fy),
            m,
            dt,
        );

        assert_eq!(next.position.x, x + (vx * dt + sx));
        assert_eq!(next.position.y, y + (vy * dt + sy));
        assert_eq!(next.velocity.x, vx + dvx);
        assert_eq!(next.velocity.y, vy + dvy);
    }

    #[test]
    fn test_zero_force_is_inertial() {
        let velocity = DVec2::new(12.0, -3.0);
        let mut state = KinematicState::new(DVec2::new(1.0, 2.0), velocity);
        let dt = 0.01;

        for _ in 0..100 {
            let prev = state;
            state = integrate(state, DVec2::ZERO, 3.0, dt);
            assert_eq!(state.velocity, velocity);
            assert_eq!(state.position, prev.position + (velocity * dt + DVec2::ZERO));
        }
    }

    #[test]
    fn test_heavier_body_accelerates_less() {
        let state = KinematicState::default();
        let force = DVec2::new(0.0, 5.0);
        let light = integrate(state, force, 1.0, 0.01);
        let heavy = integrate(state, force, 5.0, 0.01);

        assert_relative_eq!(light.velocity.y, 5.0 * heavy.velocity.y, epsilon = 1e-12);
        assert!(heavy.position.y < light.position.y);
    }
}
