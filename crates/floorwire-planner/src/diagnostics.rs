//! Run diagnostics: timing and counts for grid generation, planning
//! and validation.
//!
//! The core does no I/O and owns no time source, so timestamps come
//! from a [`Clock`] supplied by the caller. The CLI passes one backed by
//! `std::time::Instant`; tests pass a fake.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::planner::{Plan, PlanConfig, StopReason, plan};
use crate::room::Room;
use crate::types::PlanError;
use crate::validate::{Rule, ValidationError, validate};

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque timestamp.
    type Instant;

    /// The current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `start`.
    fn elapsed(&self, start: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from one grid-plan-validate run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDiagnostics {
    /// Grid generation.
    pub grid: StageDiagnostics,
    /// Serpentine planning.
    pub plan: StageDiagnostics,
    /// Route validation.
    pub validate: StageDiagnostics,
    /// Total wall-clock duration of the run (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
}

/// Diagnostics for a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Grid generation metrics.
    Grid {
        /// Grid pitch in 32nds of an inch.
        spacing_32nds: u32,
        /// Number of intersections.
        node_count: usize,
        /// Number of neighbour links.
        edge_count: usize,
    },
    /// Planner metrics.
    Plan {
        /// Requested length in inches.
        target_length: u32,
        /// Planned length in inches.
        actual_length: f64,
        /// Number of route points.
        point_count: usize,
        /// Loop iterations.
        iterations: usize,
        /// Committed perpendicular hops.
        hops: usize,
        /// Committed escape moves.
        escapes: usize,
        /// Candidates rejected at admission.
        rejections: usize,
        /// Why planning stopped.
        stop: StopReason,
    },
    /// Validation metrics.
    Validate {
        /// Number of segments checked.
        segment_count: usize,
        /// Rules that failed, in reporting order.
        failed_rules: Vec<Rule>,
    },
}

/// Output of [`run_with_diagnostics`].
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// The plan.
    pub plan: Plan,
    /// Validation errors for the planned route.
    pub errors: Vec<ValidationError>,
    /// Timings and counts.
    pub diagnostics: RunDiagnostics,
}

impl RunDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Run Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Grid", &self.grid),
            ("Plan", &self.plan),
            ("Validate", &self.validate),
        ];
        for (name, diag) in stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Grid {
            spacing_32nds,
            node_count,
            edge_count,
        } => format!("pitch={spacing_32nds}/32\" {node_count} nodes, {edge_count} edges"),
        StageMetrics::Plan {
            target_length,
            actual_length,
            point_count,
            iterations,
            hops,
            escapes,
            rejections,
            stop,
        } => {
            let ratio = if *target_length > 0 {
                actual_length / f64::from(*target_length) * 100.0
            } else {
                0.0
            };
            format!(
                "{actual_length:.1}/{target_length}\" ({ratio:.1}%) {point_count} pts, {iterations} iters, hops={hops} escapes={escapes} rejected={rejections} [{stop}]",
            )
        }
        StageMetrics::Validate {
            segment_count,
            failed_rules,
        } => {
            if failed_rules.is_empty() {
                format!("{segment_count} segments, ok")
            } else {
                let rules: Vec<String> = failed_rules.iter().map(ToString::to_string).collect();
                format!("{segment_count} segments, failed: {}", rules.join(", "))
            }
        }
    }
}

/// Generate the room's grid, plan a route with `config` and validate it,
/// timing each stage with `clock`.
///
/// The grid is regenerated with the room's current settings, which must
/// be confirmed for planning to succeed. The planned route is not stored
/// on the room.
///
/// # Errors
///
/// Returns the planner's errors, e.g. [`PlanError::GridNotReady`].
pub fn run_with_diagnostics<C: Clock>(
    room: &mut Room,
    config: &PlanConfig,
    clock: &C,
) -> Result<RunOutput, PlanError> {
    let run_start = clock.now();

    let start = clock.now();
    room.generate_grid();
    let grid = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Grid {
            spacing_32nds: room.grid().settings().spacing_32nds,
            node_count: room.grid().node_count(),
            edge_count: room.grid().edge_count(),
        },
    };

    let start = clock.now();
    let plan = plan(room, config)?;
    let plan_diag = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Plan {
            target_length: config.target_length,
            actual_length: plan.route.length(),
            point_count: plan.route.len(),
            iterations: plan.stats.iterations,
            hops: plan.stats.hops,
            escapes: plan.stats.escapes,
            rejections: plan.stats.rejections,
            stop: plan.stop,
        },
    };

    let start = clock.now();
    let errors = validate(room, &plan.route);
    let validate_diag = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Validate {
            segment_count: plan.route.len().saturating_sub(1),
            failed_rules: errors.iter().map(|e| e.rule).collect(),
        },
    };

    Ok(RunOutput {
        plan,
        errors,
        diagnostics: RunDiagnostics {
            grid,
            plan: plan_diag,
            validate: validate_diag,
            total_duration: clock.elapsed(&run_start),
        },
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::grid::GridSettings;

    /// Advances one millisecond per reading.
    struct StepClock(Cell<u64>);

    impl Clock for StepClock {
        type Instant = u64;

        fn now(&self) -> u64 {
            let t = self.0.get();
            self.0.set(t + 1);
            t
        }

        fn elapsed(&self, start: &u64) -> Duration {
            Duration::from_millis(self.now() - start)
        }
    }

    #[test]
    fn duration_ms_converts_correctly() {
        let d = Duration::from_millis(1234);
        let ms = duration_ms(d);
        assert!((ms - 1234.0).abs() < 0.01);
    }

    #[test]
    fn run_collects_every_stage() {
        let mut room = Room::rectangle(60, 48).unwrap();
        room.configure_grid(GridSettings {
            confirmed: true,
            ..GridSettings::default()
        })
        .unwrap();
        let clock = StepClock(Cell::new(0));
        let out = run_with_diagnostics(
            &mut room,
            &PlanConfig {
                target_length: 200,
                ..PlanConfig::default()
            },
            &clock,
        )
        .unwrap();

        assert!(out.errors.is_empty());
        assert!(matches!(
            out.diagnostics.grid.metrics,
            StageMetrics::Grid { node_count, .. } if node_count > 0
        ));
        assert!(out.diagnostics.total_duration >= out.diagnostics.plan.duration);

        let report = out.diagnostics.report();
        assert!(report.contains("Run Diagnostics Report"));
        assert!(report.contains("Validate"));
        assert!(report.contains("segments, ok"));
    }

    #[test]
    fn unconfirmed_grid_fails() {
        let mut room = Room::rectangle(60, 48).unwrap();
        let clock = StepClock(Cell::new(0));
        let err = run_with_diagnostics(&mut room, &PlanConfig::default(), &clock).unwrap_err();
        assert_eq!(err, PlanError::GridNotReady);
    }

    #[test]
    fn json_durations_are_seconds() {
        let diag = StageDiagnostics {
            duration: Duration::from_millis(1500),
            metrics: StageMetrics::Validate {
                segment_count: 3,
                failed_rules: vec![Rule::WallClearance],
            },
        };
        let json = serde_json::to_value(&diag).unwrap();
        assert!((json["duration"].as_f64().unwrap() - 1.5).abs() < 1e-9);
        let back: StageDiagnostics = serde_json::from_value(json).unwrap();
        assert_eq!(back.duration, Duration::from_millis(1500));
        assert!(format_metrics(&back.metrics).contains("failed: wall clearance"));
    }
}
