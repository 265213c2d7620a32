//! Fixed-rate loop driver shared by the engine, render and telemetry loops.
//!
//! Each iteration runs the step, pushes the deadline forward by one period,
//! then sleeps for whatever is left. When nothing is left the iteration is
//! counted as missed and the next one starts immediately.
//!
//! The deadline is never moved forward to "now" by default: after an
//! overload the loop runs flat out until it has caught up with every
//! period it fell behind on. `max_backlog` caps that debt when set.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;

/// What happens when a loop's step panics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupervisionPolicy {
    /// Log the panic, mark the loop stopped and leave the other loops running.
    #[default]
    Isolate,
    /// Log the panic and abort the whole process.
    Abort,
}

/// Counters of one loop. Only the loop's own thread writes them.
#[derive(Debug)]
pub struct LoopState {
    name: &'static str,
    period: Duration,
    ticks: AtomicU64,
    missed: AtomicU64,
    stopped: AtomicBool,
}

impl LoopState {
    pub fn new(name: &'static str, period: Duration) -> Self {
        Self {
            name,
            period,
            ticks: AtomicU64::new(0),
            missed: AtomicU64::new(0),
            stopped: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn missed(&self) -> u64 {
        self.missed.load(Ordering::Relaxed)
    }

    /// False once the loop died under [`SupervisionPolicy::Isolate`].
    pub fn is_alive(&self) -> bool {
        !self.stopped.load(Ordering::Acquire)
    }

    pub fn counters(&self) -> LoopCounters {
        LoopCounters {
            ticks: self.ticks(),
            missed: self.missed(),
            alive: self.is_alive(),
        }
    }

    fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.missed.fetch_add(1, Ordering::Relaxed);
    }

    fn mark_stopped(&self) {
        self.stopped.store(true, Ordering::Release);
    }
}

/// Point-in-time copy of a loop's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopCounters {
    pub ticks: u64,
    pub missed: u64,
    pub alive: bool,
}

/// Drives a step function at a fixed period against a [`Clock`].
pub struct FixedRateLoop<C: Clock> {
    clock: C,
    state: Arc<LoopState>,
    max_backlog: Option<Duration>,
    next_deadline: Option<Duration>,
}

impl<C: Clock> FixedRateLoop<C> {
    pub fn new(clock: C, state: Arc<LoopState>) -> Self {
        Self {
            clock,
            state,
            max_backlog: None,
            next_deadline: None,
        }
    }

    /// Reset the deadline to "now" whenever the loop is more than `cap`
    /// behind. `None` keeps the unbounded catch-up.
    pub fn with_max_backlog(mut self, cap: Option<Duration>) -> Self {
        self.max_backlog = cap;
        self
    }

    pub fn state(&self) -> &Arc<LoopState> {
        &self.state
    }

    /// Deadline of the next iteration, `None` before the first one.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.next_deadline
    }

    /// How far the schedule lags behind the clock.
    pub fn backlog(&self) -> Duration {
        match self.next_deadline {
            Some(deadline) => self.clock.now().saturating_sub(deadline),
            None => Duration::ZERO,
        }
    }

    /// Run one iteration: step, advance the deadline, sleep or count a miss.
    pub fn iterate(&mut self, step: &mut impl FnMut()) {
        let deadline = match self.next_deadline {
            Some(deadline) => deadline,
            None => self.clock.now(),
        };

        self.state.record_tick();
        step();

        let mut deadline = deadline + self.state.period;
        let now = self.clock.now();
        if deadline > now {
            self.clock.sleep(deadline - now);
        } else {
            self.state.record_miss();
            log::trace!("{} loop missed its deadline by {:?}", self.state.name, now - deadline);
            if let Some(cap) = self.max_backlog {
                if now - deadline > cap {
                    log::warn!(
                        "{} loop is {:?} behind (cap {:?}), dropping backlog",
                        self.state.name,
                        now - deadline,
                        cap
                    );
                    deadline = now;
                }
            }
        }
        self.next_deadline = Some(deadline);
    }

    pub fn run_iterations(&mut self, iterations: u64, mut step: impl FnMut()) {
        for _ in 0..iterations {
            self.iterate(&mut step);
        }
    }

    /// Run until the process exits. Loops have no cancellation.
    pub fn run_forever(&mut self, mut step: impl FnMut()) {
        log::debug!(
            "{} loop started, period {:?}",
            self.state.name,
            self.state.period
        );
        loop {
            self.iterate(&mut step);
        }
    }
}

/// Spawn `driver` on a named thread running `step` forever under `policy`.
pub fn spawn_loop<C, F>(
    mut driver: FixedRateLoop<C>,
    mut step: F,
    policy: SupervisionPolicy,
) -> std::io::Result<JoinHandle<()>>
where
    C: Clock,
    F: FnMut() + Send + 'static,
{
    let state = driver.state.clone();
    thread::Builder::new()
        .name(format!("metaball-{}", state.name))
        .spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| driver.run_forever(&mut step)));
            if let Err(payload) = result {
                log::error!(
                    "{} loop panicked after {} ticks: {}",
                    state.name,
                    state.ticks(),
                    panic_message(payload.as_ref())
                );
                state.mark_stopped();
                if policy == SupervisionPolicy::Abort {
                    std::process::abort();
                }
            }
        })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
