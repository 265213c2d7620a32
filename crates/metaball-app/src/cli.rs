//! Command-line options.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use metaball_core::error::ScenarioError;
use metaball_core::scenario::ScenarioConfig;
use metaball_sim::fixed_rate::SupervisionPolicy;
use metaball_sim::WorldConfig;

/// What to do when a loop panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnPanic {
    /// Stop only the failing loop and keep the process alive.
    Isolate,
    /// Abort the process.
    Abort,
}

impl From<OnPanic> for SupervisionPolicy {
    fn from(on_panic: OnPanic) -> Self {
        match on_panic {
            OnPanic::Isolate => SupervisionPolicy::Isolate,
            OnPanic::Abort => SupervisionPolicy::Abort,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "metaball", about = "Fixed-rate point-mass simulation driven from the console")]
pub struct Args {
    /// JSON scenario file. Defaults to the single-ball WASD demo.
    #[arg(long)]
    pub scenario: Option<PathBuf>,

    /// Scatter this many random bodies instead of loading a scenario.
    #[arg(long, conflicts_with = "scenario")]
    pub scatter: Option<usize>,

    /// Seed for --scatter.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Disable the telemetry loop and input echo.
    #[arg(long)]
    pub no_telemetry: bool,

    /// Exit after this many seconds instead of running until interrupted.
    #[arg(long)]
    pub duration: Option<f64>,

    /// Drop a late loop's backlog once it exceeds this many milliseconds.
    #[arg(long)]
    pub max_backlog_ms: Option<u64>,

    #[arg(long, value_enum, default_value_t = OnPanic::Isolate)]
    pub on_panic: OnPanic,
}

impl Args {
    pub fn scenario(&self) -> Result<ScenarioConfig, ScenarioError> {
        let mut scenario = match (&self.scenario, self.scatter) {
            (Some(path), _) => ScenarioConfig::load(path)?,
            (None, Some(count)) => ScenarioConfig::scatter(self.seed, count),
            (None, None) => ScenarioConfig::demo(),
        };
        if self.no_telemetry {
            scenario.telemetry = Some(false);
        }
        Ok(scenario)
    }

    pub fn world_config(&self) -> WorldConfig {
        WorldConfig {
            telemetry: !self.no_telemetry,
            max_backlog: self.max_backlog_ms.map(Duration::from_millis),
            supervision: self.on_panic.into(),
            ..Default::default()
        }
    }

    /// `None` for negative, non-finite or out-of-range values.
    pub fn duration(&self) -> Option<Duration> {
        self.duration
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_demo() {
        let args = Args::try_parse_from(["metaball"]).unwrap();
        assert_eq!(args.scenario().unwrap(), ScenarioConfig::demo());
        let config = args.world_config();
        assert!(config.telemetry);
        assert_eq!(config.supervision, SupervisionPolicy::Isolate);
        assert!(config.max_backlog.is_none());
        assert!(args.duration().is_none());
    }

    #[test]
    fn test_scatter_and_flags() {
        let args = Args::try_parse_from([
            "metaball",
            "--scatter",
            "4",
            "--seed",
            "9",
            "--no-telemetry",
            "--max-backlog-ms",
            "250",
            "--on-panic",
            "abort",
            "--duration",
            "1.5",
        ])
        .unwrap();

        let scenario = args.scenario().unwrap();
        assert_eq!(scenario.bodies.len(), 4);
        assert_eq!(scenario.telemetry, Some(false));
        assert_eq!(scenario.bodies, ScenarioConfig::scatter(9, 4).bodies);

        let config = args.world_config();
        assert!(!config.telemetry);
        assert_eq!(config.max_backlog, Some(Duration::from_millis(250)));
        assert_eq!(config.supervision, SupervisionPolicy::Abort);
        assert_eq!(args.duration(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_scenario_conflicts_with_scatter() {
        assert!(Args::try_parse_from(["metaball", "--scenario", "a.json", "--scatter", "3"]).is_err());
    }

    #[test]
    fn test_negative_duration_ignored() {
        let args = Args::try_parse_from(["metaball", "--duration=-2"]).unwrap();
        assert!(args.duration().is_none());
    }

    #[test]
    fn test_huge_duration_ignored() {
        for value in ["1e30", "inf", "NaN"] {
            let args = Args::try_parse_from(["metaball", "--duration", value]).unwrap();
            assert!(args.duration().is_none(), "--duration {value}");
        }
        let args = Args::try_parse_from(["metaball", "--duration", "0"]).unwrap();
        assert_eq!(args.duration(), Some(Duration::ZERO));
    }
}
