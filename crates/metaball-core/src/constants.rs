//! Simulation cadences and demo tuning parameters.

/// Engine step in seconds (physics update period).
pub const TIMESTEP: f64 = 0.01;

/// Frame step in seconds (redraw period). Five engine steps per frame.
pub const FRAMESTEP: f64 = 0.05;

/// Telemetry interval in seconds.
pub const LOGSTEP: f64 = 5.0;

// --- Demo scenario ---

/// Force magnitude applied while a movement key is held.
pub const DEMO_FORCE: f64 = 5.0;

/// Mass of the demo ball.
pub const DEMO_MASS: f64 = 1.0;

/// Radius of the demo ball (display units).
pub const DEMO_RADIUS: f64 = 15.0;

/// Starting position of the demo ball.
pub const DEMO_POSITION: [f64; 2] = [50.0, 50.0];

/// Canvas size used by the demo and by scattered scenarios.
pub const CANVAS_WIDTH: f64 = 600.0;
pub const CANVAS_HEIGHT: f64 = 400.0;

// --- Scatter ---

/// Palette cycled through when scattering bodies.
pub const SCATTER_COLORS: [&str; 6] = ["blue", "red", "green", "yellow", "orange", "white"];

/// Mass range for scattered bodies.
pub const SCATTER_MASS_RANGE: (f64, f64) = (0.5, 5.0);

/// Radius range for scattered bodies.
pub const SCATTER_RADIUS_RANGE: (f64, f64) = (5.0, 20.0);

/// Maximum absolute initial speed per axis for scattered bodies.
pub const SCATTER_MAX_SPEED: f64 = 30.0;
