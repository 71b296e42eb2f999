//! floorwire: CLI for planning heating-wire routes from room snapshots.
//!
//! Reads a room snapshot (JSON), then generates its grid, plans a
//! serpentine route, validates a stored route or extends it from an
//! anchor. Diagnostics go to stdout, logs to stderr. Useful for:
//!
//! - Trying spacing and length combinations against a real floor plan
//! - Checking a hand-edited route against the clearance rules
//! - Rendering rooms and routes to SVG for review
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin floorwire -- plan [OPTIONS] <ROOM_JSON>
//! ```
//!
//! Set `RUST_LOG=floorwire_planner=debug` to trace planner decisions.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand, ValueEnum};
use floorwire_export::{RenderOptions, SvgMetadata};
use floorwire_planner::diagnostics::{Clock, RunDiagnostics};
use floorwire_planner::{
    GridSettings, LaneAxis, PlanConfig, Point, Room, RoomSnapshot, ValidationError, WireRoute,
};
use tracing_subscriber::EnvFilter;

/// Plan and check heating-wire layouts for bathroom floors.
#[derive(Parser)]
#[command(name = "floorwire", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the grid, plan a route and validate it.
    Plan(PlanArgs),
    /// Validate the route stored in the snapshot.
    Validate(ValidateArgs),
    /// Generate the grid and print its size.
    Grid(GridArgs),
    /// Extend the stored route from one of its points.
    Extend(ExtendArgs),
}

/// Grid overrides shared by the subcommands that generate a grid.
#[derive(Args)]
struct GridOverrides {
    /// Grid pitch in 32nds of an inch (96 = 3").
    #[arg(long)]
    grid_spacing_32nds: Option<u32>,

    /// Horizontal grid translation in 32nds of an inch.
    #[arg(long)]
    tx: Option<i32>,

    /// Vertical grid translation in 32nds of an inch.
    #[arg(long)]
    ty: Option<i32>,
}

/// Output destinations shared by all subcommands.
#[derive(Args)]
struct OutputArgs {
    /// Write an SVG rendering to this file.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Write the resulting room snapshot (JSON) to this file.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct PlanArgs {
    /// Path to the room snapshot.
    room: PathBuf,

    /// Distance between adjacent runs in inches.
    #[arg(long, default_value_t = PlanConfig::DEFAULT_SPACING)]
    spacing: u32,

    /// Target wire length in inches.
    #[arg(long, default_value_t = PlanConfig::DEFAULT_TARGET_LENGTH)]
    length: u32,

    /// Direction of the serpentine runs.
    #[arg(long, value_enum, default_value_t = Axis::Horizontal)]
    axis: Axis,

    /// Full plan config as a JSON string.
    ///
    /// When provided, `--spacing`, `--length` and `--axis` are ignored.
    /// The JSON must be a valid `PlanConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    #[command(flatten)]
    grid: GridOverrides,

    #[command(flatten)]
    out: OutputArgs,
}

#[derive(Args)]
struct ValidateArgs {
    /// Path to the room snapshot.
    room: PathBuf,

    #[command(flatten)]
    out: OutputArgs,
}

#[derive(Args)]
struct GridArgs {
    /// Path to the room snapshot.
    room: PathBuf,

    /// Generate a preview grid instead of a confirmed one.
    #[arg(long)]
    preview: bool,

    #[command(flatten)]
    grid: GridOverrides,

    #[command(flatten)]
    out: OutputArgs,
}

#[derive(Args)]
struct ExtendArgs {
    /// Path to the room snapshot.
    room: PathBuf,

    /// Anchor x coordinate; must be a point of the stored route.
    #[arg(long, allow_negative_numbers = true)]
    x: i32,

    /// Anchor y coordinate.
    #[arg(long, allow_negative_numbers = true)]
    y: i32,

    /// Length to add, in inches.
    #[arg(long)]
    remaining: u32,

    #[command(flatten)]
    out: OutputArgs,
}

/// Lane direction selection.
#[derive(Clone, Copy, ValueEnum)]
enum Axis {
    /// Runs along x, stepping in y.
    Horizontal,
    /// Runs along y, stepping in x.
    Vertical,
}

/// Build a [`PlanConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual flags are ignored.
fn config_from_cli(args: &PlanArgs) -> Result<PlanConfig, String> {
    if let Some(ref json) = args.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(PlanConfig {
        spacing: args.spacing,
        target_length: args.length,
        axis: match args.axis {
            Axis::Horizontal => LaneAxis::Horizontal,
            Axis::Vertical => LaneAxis::Vertical,
        },
    })
}

/// Apply grid overrides on top of the snapshot's settings.
const fn grid_settings(base: GridSettings, overrides: &GridOverrides, confirmed: bool) -> GridSettings {
    GridSettings {
        spacing_32nds: match overrides.grid_spacing_32nds {
            Some(s) => s,
            None => base.spacing_32nds,
        },
        tx_32nds: match overrides.tx {
            Some(t) => t,
            None => base.tx_32nds,
        },
        ty_32nds: match overrides.ty {
            Some(t) => t,
            None => base.ty_32nds,
        },
        confirmed,
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("floorwire_planner=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match &cli.command {
        Command::Plan(args) => run_plan(args),
        Command::Validate(args) => run_validate(args),
        Command::Grid(args) => run_grid(args),
        Command::Extend(args) => run_extend(args),
    };

    match result {
        Ok(code) => code,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

fn run_plan(args: &PlanArgs) -> Result<ExitCode, String> {
    let config = config_from_cli(args)?;
    let mut room = load_room(&args.room)?;
    let settings = grid_settings(*room.grid().settings(), &args.grid, true);
    room.configure_grid(settings)
        .map_err(|e| format!("Invalid grid settings: {e}"))?;

    eprintln!("Room: {}", args.room.display());
    eprintln!("Config: {config:#?}");
    eprintln!("Runs: {}", args.runs);
    eprintln!();

    let mut all_diagnostics = Vec::with_capacity(args.runs);
    let mut last = None;

    for run in 0..args.runs {
        if args.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, args.runs);
        }

        let output = floorwire_planner::run_with_diagnostics(&mut room, &config, &StdClock)
            .map_err(|e| format!("Planning error: {e}"))?;

        if args.out.json {
            let json = serde_json::to_string_pretty(&output.diagnostics)
                .map_err(|e| format!("Error serializing diagnostics: {e}"))?;
            println!("{json}");
        } else {
            println!("{}", output.diagnostics.report());
        }

        all_diagnostics.push(output.diagnostics.clone());
        last = Some(output);

        if args.runs > 1 {
            eprintln!();
        }
    }

    if args.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    let Some(output) = last else {
        return Ok(ExitCode::SUCCESS);
    };
    if let Some(diagnostic) = &output.plan.diagnostic {
        eprintln!("Warning: {diagnostic}");
    }

    room.set_wire(output.plan.route);
    let desc = format!("{config:?}");
    write_outputs(&room, &output.errors, &desc, &args.out, false)?;
    Ok(exit_code(&output.errors))
}

fn run_validate(args: &ValidateArgs) -> Result<ExitCode, String> {
    let room = load_room(&args.room)?;
    let errors = floorwire_planner::validate(&room, room.wire());

    if args.out.json {
        let json = serde_json::to_string_pretty(&errors)
            .map_err(|e| format!("Error serializing errors: {e}"))?;
        println!("{json}");
    } else {
        print_errors(room.wire(), &errors);
    }

    write_outputs(&room, &errors, "validation", &args.out, false)?;
    Ok(exit_code(&errors))
}

fn run_grid(args: &GridArgs) -> Result<ExitCode, String> {
    let mut room = load_room(&args.room)?;
    let settings = grid_settings(*room.grid().settings(), &args.grid, !args.preview);
    room.configure_grid(settings)
        .map_err(|e| format!("Invalid grid settings: {e}"))?;
    room.generate_grid();

    let grid = room.grid();
    if args.out.json {
        let json = serde_json::json!({
            "settings": grid.settings(),
            "node_count": grid.node_count(),
            "edge_count": grid.edge_count(),
        });
        println!("{json:#}");
    } else {
        println!(
            "Grid: pitch {:.3}\" offset ({}, {})/32\" {}",
            settings.spacing_inches(),
            settings.tx_32nds,
            settings.ty_32nds,
            if settings.confirmed { "confirmed" } else { "preview" },
        );
        println!("Nodes: {}", grid.node_count());
        println!("Edges: {}", grid.edge_count());
    }

    write_outputs(&room, &[], "grid", &args.out, true)?;
    Ok(ExitCode::SUCCESS)
}

fn run_extend(args: &ExtendArgs) -> Result<ExitCode, String> {
    let mut room = load_room(&args.room)?;
    if !room.grid().is_ready() {
        room.generate_grid();
    }

    let anchor = Point::new(args.x, args.y);
    let before = room.wire().length();
    let route = floorwire_planner::extend_from(&room, room.wire(), anchor, args.remaining)
        .map_err(|e| format!("Extension error: {e}"))?;
    eprintln!(
        "Extended from {anchor}: {before:.1}\" -> {:.1}\" ({} points)",
        route.length(),
        route.len(),
    );

    room.set_wire(route);
    let errors = floorwire_planner::validate(&room, room.wire());
    if args.out.json {
        let json = serde_json::to_string_pretty(room.wire().points())
            .map_err(|e| format!("Error serializing route: {e}"))?;
        println!("{json}");
    } else {
        print_errors(room.wire(), &errors);
    }

    write_outputs(&room, &errors, "extension", &args.out, false)?;
    Ok(exit_code(&errors))
}

// ---------------------------------------------------------------------------
// I/O helpers
// ---------------------------------------------------------------------------

fn load_room(path: &Path) -> Result<Room, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    let snapshot: RoomSnapshot = serde_json::from_str(&text)
        .map_err(|e| format!("Error parsing {}: {e}", path.display()))?;
    Room::from_snapshot(snapshot).map_err(|e| format!("Invalid room in {}: {e}", path.display()))
}

/// Write the optional SVG and snapshot files.
///
/// A failed SVG write is only reported. A failed snapshot write is an
/// error, since the snapshot is the command's result.
fn write_outputs(
    room: &Room,
    errors: &[ValidationError],
    description: &str,
    out: &OutputArgs,
    show_grid: bool,
) -> Result<(), String> {
    if let Some(ref svg_path) = out.svg {
        let title = svg_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("floorwire");
        let metadata = SvgMetadata {
            title: Some(title),
            description: Some(description),
        };
        let options = RenderOptions {
            show_grid,
            ..RenderOptions::default()
        };
        let svg = if errors.is_empty() {
            floorwire_export::to_svg(room, room.wire(), &metadata, &options)
        } else {
            floorwire_export::to_violation_svg(room, room.wire(), errors, &metadata, &options)
        };
        match std::fs::write(svg_path, &svg) {
            Ok(()) => {
                eprintln!("SVG written to {} ({} bytes)", svg_path.display(), svg.len());
            }
            Err(e) => {
                eprintln!("Error writing SVG to {}: {e}", svg_path.display());
            }
        }
    }

    if let Some(ref path) = out.output {
        let fingerprint = write_snapshot(room, path)?;
        eprintln!(
            "Snapshot written to {} (fingerprint {fingerprint:016x})",
            path.display(),
        );
    }
    Ok(())
}

/// Write the room snapshot as JSON, returning its fingerprint.
fn write_snapshot(room: &Room, path: &Path) -> Result<u64, String> {
    let snapshot = room.snapshot();
    let json = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| format!("Error serializing snapshot: {e}"))?;
    std::fs::write(path, json)
        .map_err(|e| format!("Error writing snapshot to {}: {e}", path.display()))?;
    Ok(snapshot.fingerprint())
}

fn print_errors(route: &WireRoute, errors: &[ValidationError]) {
    println!(
        "Route: {} points, {:.1}\" (target {}\")",
        route.len(),
        route.length(),
        route.target_length,
    );
    if errors.is_empty() {
        println!("No violations");
        return;
    }
    println!("{} violation(s)\n{}", errors.len(), "-".repeat(80));
    for e in errors {
        match e.other {
            Some(other) => println!("{e} (with {other})"),
            None => println!("{e}"),
        }
    }
}

fn exit_code(errors: &[ValidationError]) -> ExitCode {
    if errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Function pointer type for extracting a stage duration from diagnostics.
type StageExtractor = fn(&RunDiagnostics) -> Duration;

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[RunDiagnostics]) {
    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    println!();
    println!("{:<24} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(40));

    let stage_extractors: &[(&str, StageExtractor)] = &[
        ("Grid", |d| d.grid.duration),
        ("Plan", |d| d.plan.duration),
        ("Validate", |d| d.validate.duration),
    ];

    for (name, extractor) in stage_extractors {
        let total: f64 = all_diagnostics
            .iter()
            .map(|d| extractor(d).as_secs_f64() * 1000.0)
            .sum();
        let stage_mean = total / all_diagnostics.len() as f64;
        println!("{name:<24} {stage_mean:>10.3}ms");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("floorwire-cli-{}-{name}", std::process::id()))
    }

    #[test]
    fn snapshot_is_written_and_fingerprinted() {
        let room = Room::rectangle(40, 30).unwrap();
        let path = scratch("room.json");
        let fingerprint = write_snapshot(&room, &path).unwrap();
        assert_eq!(fingerprint, room.snapshot().fingerprint());

        let back = load_room(&path).unwrap();
        assert_eq!(back.snapshot(), room.snapshot());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn unwritable_snapshot_is_an_error() {
        let room = Room::rectangle(40, 30).unwrap();
        let path = scratch("missing").join("room.json");
        let err = write_snapshot(&room, &path).unwrap_err();
        assert!(err.starts_with("Error writing snapshot"), "{err}");
    }
}
