//! The simulation world: owns the bodies and starts the three loops.
//!
//! Field ownership while running:
//! - position and velocity: engine thread (through the `KinematicsWriter`)
//! - applied force: whoever holds a `BodyHandle` or a `Dispatcher`
//! - loop counters: each loop's own thread
//!
//! Loops run until the process exits.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use metaball_core::body::{Bodies, Body, BodyHandle, KinematicsWriter};
use metaball_core::constants::{FRAMESTEP, LOGSTEP, TIMESTEP};
use metaball_core::input::{Bindings, EventKind, KeySymbol};
use metaball_core::scenario::ScenarioConfig;
use metaball_core::types::{BodyId, BodySnapshot};

use crate::clock::SystemClock;
use crate::dispatch::Dispatcher;
use crate::engine::{CollisionHook, EngineStep, NoCollisions};
use crate::error::WorldError;
use crate::fixed_rate::{spawn_loop, FixedRateLoop, LoopCounters, LoopState, SupervisionPolicy};
use crate::render::{RenderStep, RenderSurface};
use crate::telemetry::{TelemetryReport, TelemetrySink, TelemetryStep};

/// Cadences and policies of a world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Engine period in seconds.
    pub timestep: f64,
    /// Render period in seconds.
    pub framestep: f64,
    /// Telemetry period in seconds.
    pub logstep: f64,
    /// Whether the telemetry loop (and input echo) exists at all.
    pub telemetry: bool,
    /// Backlog after which a late loop drops its schedule. `None` means
    /// late loops catch up on every missed period.
    pub max_backlog: Option<Duration>,
    pub supervision: SupervisionPolicy,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            timestep: TIMESTEP,
            framestep: FRAMESTEP,
            logstep: LOGSTEP,
            telemetry: true,
            max_backlog: None,
            supervision: SupervisionPolicy::default(),
        }
    }
}

impl WorldConfig {
    /// Apply the cadence and telemetry overrides a scenario carries.
    pub fn with_scenario(mut self, scenario: &ScenarioConfig) -> Self {
        if let Some(timestep) = scenario.timestep {
            self.timestep = timestep;
        }
        if let Some(framestep) = scenario.framestep {
            self.framestep = framestep;
        }
        if let Some(logstep) = scenario.logstep {
            self.logstep = logstep;
        }
        if let Some(telemetry) = scenario.telemetry {
            self.telemetry = telemetry;
        }
        self
    }

    pub fn validate(&self) -> Result<(), WorldError> {
        self.periods().map(|_| ())
    }

    /// Engine, render and telemetry periods. Rejects anything that is not
    /// a positive duration representable by `Duration`.
    pub fn periods(&self) -> Result<LoopPeriods, WorldError> {
        Ok(LoopPeriods {
            engine: step_period("timestep", self.timestep)?,
            render: step_period("framestep", self.framestep)?,
            telemetry: step_period("logstep", self.logstep)?,
        })
    }
}

/// Validated loop periods of a [`WorldConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopPeriods {
    pub engine: Duration,
    pub render: Duration,
    pub telemetry: Duration,
}

fn step_period(name: &'static str, value: f64) -> Result<Duration, WorldError> {
    match Duration::try_from_secs_f64(value) {
        Ok(period) if !period.is_zero() => Ok(period),
        _ => Err(WorldError::InvalidStep { name, value }),
    }
}

pub struct SimulationWorld {
    config: WorldConfig,
    bodies: Bodies,
    writer: Option<KinematicsWriter>,
    bindings: Arc<Bindings>,
    collisions: Option<Box<dyn CollisionHook>>,
    engine: Arc<LoopState>,
    render: Arc<LoopState>,
    telemetry: Option<Arc<LoopState>>,
    sink: TelemetrySink,
}

impl SimulationWorld {
    /// Build a world over already validated bodies. Nothing runs until
    /// [`SimulationWorld::run`].
    pub fn new(bodies: Vec<Body>, config: WorldConfig) -> Result<Self, WorldError> {
        let periods = config.periods()?;
        let (bodies, writer) = Bodies::build(bodies);

        let engine = Arc::new(LoopState::new("engine", periods.engine));
        let render = Arc::new(LoopState::new("render", periods.render));
        let telemetry = config
            .telemetry
            .then(|| Arc::new(LoopState::new("telemetry", periods.telemetry)));

        Ok(Self {
            config,
            bodies,
            writer: Some(writer),
            bindings: Arc::new(Bindings::new()),
            collisions: None,
            engine,
            render,
            telemetry,
            sink: TelemetrySink::stdout(),
        })
    }

    /// Build bodies and bindings from a scenario on top of `base`.
    pub fn from_scenario(scenario: &ScenarioConfig, base: WorldConfig) -> Result<Self, WorldError> {
        scenario.validate()?;
        let config = base.with_scenario(scenario);
        let mut world = Self::new(scenario.build_bodies()?, config)?;
        let bindings = scenario.build_bindings(&world.bodies)?;
        world.set_bindings(bindings);
        Ok(world)
    }

    /// Replace the binding table. Dispatchers handed out earlier keep the
    /// table they were created with.
    pub fn set_bindings(&mut self, bindings: Bindings) {
        self.bindings = Arc::new(bindings);
    }

    /// Install a collision hook. Only takes effect before `run`.
    pub fn set_collision_hook(&mut self, hook: impl CollisionHook + 'static) {
        self.collisions = Some(Box::new(hook));
    }

    /// Redirect telemetry output. Nothing is written to it while
    /// telemetry is disabled.
    pub fn set_telemetry_sink(&mut self, sink: TelemetrySink) {
        self.sink = sink;
    }

    /// Start the engine, render and (if enabled) telemetry loops.
    ///
    /// Fails with [`WorldError::AlreadyRunning`] on a second call.
    pub fn run<S: RenderSurface>(&mut self, surface: S) -> Result<(), WorldError> {
        let writer = self.writer.take().ok_or(WorldError::AlreadyRunning)?;
        let collisions: Box<dyn CollisionHook> = match self.collisions.take() {
            Some(hook) => hook,
            None => Box::new(NoCollisions),
        };
        let clock = SystemClock::new();
        let policy = self.config.supervision;

        if self.telemetry.is_some() {
            self.sink.write_banner(
                self.config.timestep,
                self.config.framestep,
                self.config.logstep,
            );
        }

        let mut engine = EngineStep::new(writer, self.config.timestep, collisions);
        self.spawn(&self.engine, clock, move || engine.step(), policy)?;

        let mut render = RenderStep::new(self.bodies.clone(), surface);
        self.spawn(&self.render, clock, move || render.step(), policy)?;

        if let Some(telemetry) = &self.telemetry {
            let mut report = TelemetryStep::new(
                self.engine.clone(),
                self.render.clone(),
                self.sink.clone(),
            );
            self.spawn(telemetry, clock, move || report.step(), policy)?;
        }

        log::info!(
            "world running: {} bodies, timestep {}s, framestep {}s, telemetry {}",
            self.bodies.len(),
            self.config.timestep,
            self.config.framestep,
            if self.telemetry.is_some() { "on" } else { "off" }
        );
        Ok(())
    }

    fn spawn(
        &self,
        state: &Arc<LoopState>,
        clock: SystemClock,
        step: impl FnMut() + Send + 'static,
        policy: SupervisionPolicy,
    ) -> Result<(), WorldError> {
        let driver = FixedRateLoop::new(clock, state.clone()).with_max_backlog(self.config.max_backlog);
        spawn_loop(driver, step, policy).map_err(|source| WorldError::Spawn {
            name: state.name(),
            source,
        })?;
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.writer.is_none()
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn bodies(&self) -> &Bodies {
        &self.bodies
    }

    pub fn handle(&self, id: BodyId) -> Option<BodyHandle> {
        self.bodies.handle(id)
    }

    pub fn snapshot(&self) -> Vec<BodySnapshot> {
        self.bodies.snapshot()
    }

    pub fn dispatcher(&self) -> Dispatcher {
        let echo = self
            .telemetry
            .as_ref()
            .map(|telemetry| (self.sink.clone(), telemetry.clone()));
        Dispatcher::new(self.bindings.clone(), echo)
    }

    /// Dispatch one input event on the calling thread.
    pub fn dispatch(&self, key: &KeySymbol, kind: EventKind) -> bool {
        self.dispatcher().dispatch(key, kind)
    }

    pub fn report(&self) -> TelemetryReport {
        TelemetryReport {
            engine: self.engine.counters(),
            render: self.render.counters(),
        }
    }

    /// Counters of the telemetry loop itself, if it exists.
    pub fn telemetry_counters(&self) -> Option<LoopCounters> {
        self.telemetry
            .as_ref()
            .map(|telemetry| telemetry.counters())
    }
}
