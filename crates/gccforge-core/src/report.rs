//! Per-run timing and outcome report.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::build::{Phase, TestStatus};
use crate::configure::BuildConfiguration;

/// How a phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseOutcome {
    Passed,
    /// Completed with a non-fatal problem (test-suite failures).
    Warned,
    /// Aborted the run.
    Failed,
}

/// Timing of one completed phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub phase: Phase,
    pub duration_ms: u64,
    pub outcome: PhaseOutcome,
}

/// Report accumulated phase by phase; complete for successful runs, up to
/// the aborted phase otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,

    /// Resolved configuration; set once the version is known.
    pub configuration: Option<BuildConfiguration>,

    pub phases: Vec<PhaseRecord>,

    pub tests: TestStatus,

    /// Wall-clock time of the whole run in milliseconds.
    pub total_ms: u64,
}

impl RunReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            configuration: None,
            phases: Vec::new(),
            tests: TestStatus::Skipped,
            total_ms: 0,
        }
    }

    pub fn record(&mut self, phase: Phase, duration: Duration, outcome: PhaseOutcome) {
        self.phases.push(PhaseRecord {
            phase,
            duration_ms: millis(duration),
            outcome,
        });
    }

    pub fn duration_of(&self, phase: Phase) -> Option<Duration> {
        self.phases
            .iter()
            .find(|r| r.phase == phase)
            .map(|r| Duration::from_millis(r.duration_ms))
    }

    pub fn total(&self) -> Duration {
        Duration::from_millis(self.total_ms)
    }

    pub fn set_total(&mut self, duration: Duration) {
        self.total_ms = millis(duration);
    }

    /// The phase that aborted the run, if any.
    pub fn failed_phase(&self) -> Option<Phase> {
        self.phases
            .iter()
            .find(|r| r.outcome == PhaseOutcome::Failed)
            .map(|r| r.phase)
    }

    /// Human-readable timing summary, one line per entry.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        match (&self.configuration, self.failed_phase()) {
            (Some(config), None) => lines.push(format!(
                "GCC {} installed to {}",
                config.version,
                config.prefix.display()
            )),
            (Some(config), Some(phase)) => {
                lines.push(format!("GCC {} build aborted during {}", config.version, phase))
            }
            (None, Some(phase)) => lines.push(format!("run aborted during {phase}")),
            (None, None) => {}
        }
        for record in &self.phases {
            let marker = match record.outcome {
                PhaseOutcome::Passed => "",
                PhaseOutcome::Warned => " (warning)",
                PhaseOutcome::Failed => " (failed)",
            };
            lines.push(format!(
                "  {:<24}{}{}",
                record.phase.name(),
                format_duration(Duration::from_millis(record.duration_ms)),
                marker
            ));
        }
        if let TestStatus::Failed { exit_code } = self.tests {
            lines.push(format!(
                "  test suite reported failures (exit code {}); the installation is still usable",
                exit_code.map_or_else(|| "<none>".to_string(), |c| c.to_string())
            ));
        }
        lines.push(format!("  {:<24}{}", "total", format_duration(self.total())));
        lines
    }

    /// Closing instructions for using the installed compiler.
    pub fn usage_instructions(&self) -> Option<String> {
        if self.failed_phase().is_some() {
            return None;
        }
        let config = self.configuration.as_ref()?;
        let bin = config.prefix.join("bin");
        Some(format!(
            "To use this compiler, add it to your PATH:\n\n    export PATH=\"{}:$PATH\"\n\nthen invoke it as `{}` or `{}`.",
            bin.display(),
            config.driver_name("gcc"),
            config.driver_name("g++"),
        ))
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Render a duration as `Xm Ys`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}m {}s", secs / 60, secs % 60)
}
