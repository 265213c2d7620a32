//! Telemetry: a periodic report of the engine and render loop counters,
//! plus the echo of input events while telemetry is on.
//!
//! Output is line-oriented text on a shared sink (stdout in the binary):
//!
//! ```text
//! * Engine step: 0.01
//! * Frame step: 0.05
//! * Telemetry displayed every 5 seconds
//! +----------------------------+
//! Engine frame: 500
//! Engine frames missed: 0
//! View frame: 100
//! View frames missed: 0
//! +----------------------------+
//!
//! ```

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use metaball_core::input::{EventKind, KeySymbol};

use crate::fixed_rate::{LoopCounters, LoopState};

const BORDER: &str = "+----------------------------+";

/// Cloneable handle to the telemetry output stream.
#[derive(Clone)]
pub struct TelemetrySink {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl TelemetrySink {
    pub fn stdout() -> Self {
        Self::from_writer(io::stdout())
    }

    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Sink writing into memory, and a reader for what was written.
    pub fn captured() -> (Self, CapturedOutput) {
        let buffer = CapturedOutput::default();
        (Self::from_writer(buffer.clone()), buffer)
    }

    pub fn write_banner(&self, timestep: f64, framestep: f64, logstep: f64) {
        self.write_text(&format!(
            "* Engine step: {timestep}\n* Frame step: {framestep}\n* Telemetry displayed every {logstep} seconds\n"
        ));
    }

    pub fn write_report(&self, report: &TelemetryReport) {
        self.write_text(&report.to_string());
    }

    pub fn echo_event(&self, kind: EventKind, key: &KeySymbol) {
        self.write_text(&format!("{kind} {key}\n"));
    }

    fn write_text(&self, text: &str) {
        let mut out = self.lock();
        let result = out.write_all(text.as_bytes());
        if let Err(e) = result.and_then(|()| out.flush()) {
            log::warn!("telemetry write failed: {e}");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        match self.out.lock() {
            Ok(guard) => guard,
            Err(e) => {
                log::error!("telemetry sink lock poisoned: {e}");
                e.into_inner()
            }
        }
    }
}

impl fmt::Debug for TelemetrySink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelemetrySink").finish_non_exhaustive()
    }
}

/// In-memory telemetry output.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl CapturedOutput {
    pub fn contents(&self) -> String {
        let bytes = match self.bytes.lock() {
            Ok(guard) => guard.clone(),
            Err(e) => e.into_inner().clone(),
        };
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Counters of the engine and render loops at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryReport {
    pub engine: LoopCounters,
    pub render: LoopCounters,
}

impl fmt::Display for TelemetryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stopped = |c: &LoopCounters| if c.alive { "" } else { " (stopped)" };
        writeln!(f, "{BORDER}")?;
        writeln!(f, "Engine frame: {}{}", self.engine.ticks, stopped(&self.engine))?;
        writeln!(f, "Engine frames missed: {}", self.engine.missed)?;
        writeln!(f, "View frame: {}{}", self.render.ticks, stopped(&self.render))?;
        writeln!(f, "View frames missed: {}", self.render.missed)?;
        writeln!(f, "{BORDER}")?;
        writeln!(f)
    }
}

/// Telemetry loop step: read both loops' counters and print them.
pub struct TelemetryStep {
    engine: Arc<LoopState>,
    render: Arc<LoopState>,
    sink: TelemetrySink,
}

impl TelemetryStep {
    pub fn new(engine: Arc<LoopState>, render: Arc<LoopState>, sink: TelemetrySink) -> Self {
        Self {
            engine,
            render,
            sink,
        }
    }

    pub fn report(&self) -> TelemetryReport {
        TelemetryReport {
            engine: self.engine.counters(),
            render: self.render.counters(),
        }
    }

    pub fn step(&mut self) {
        let report = self.report();
        log::debug!(
            "telemetry: engine {}/{} missed, render {}/{} missed",
            report.engine.ticks,
            report.engine.missed,
            report.render.ticks,
            report.render.missed
        );
        self.sink.write_report(&report);
    }
}
