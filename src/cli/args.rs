//! CLI argument definitions.

use crate::cli::validators::parse_contamination;
use crate::config::TelemetryFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Vessel telemetry anomaly monitor with satellite oil spill checks.
#[derive(Debug, Parser)]
#[command(name = "spillwatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Telemetry table to monitor (CSV or Parquet).
    #[arg(env = "SPILLWATCH_INPUT")]
    pub input: Option<PathBuf>,

    /// Options for the monitor loop.
    #[command(flatten)]
    pub monitor: MonitorArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Arguments for the monitor loop.
#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct MonitorArgs {
    /// Configuration file (default: platform config directory).
    #[arg(long, global = true, env = "SPILLWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Telemetry file format.
    #[arg(long, value_enum, env = "SPILLWATCH_FORMAT")]
    pub format: Option<TelemetryFormat>,

    /// Satellite image inspected for anomalous rows.
    #[arg(long, env = "SPILLWATCH_IMAGE")]
    pub image: Option<PathBuf>,

    /// ONNX segmentation model.
    #[arg(long, env = "SPILLWATCH_MODEL")]
    pub model: Option<PathBuf>,

    /// Directory for spill visualizations.
    #[arg(short, long, env = "SPILLWATCH_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Minimum milliseconds between emitted events.
    #[arg(long, env = "SPILLWATCH_INTERVAL_MS")]
    pub interval_ms: Option<u64>,

    /// Expected outlier fraction (0.0-0.5].
    #[arg(short = 'c', long, value_parser = parse_contamination, env = "SPILLWATCH_CONTAMINATION")]
    pub contamination: Option<f64>,

    /// Random seed for the outlier model.
    #[arg(long, env = "SPILLWATCH_SEED")]
    pub seed: Option<u64>,

    /// Run a single pass and exit.
    #[arg(long)]
    pub once: bool,

    /// Skip segmentation; anomalies are reported without spill checks.
    #[arg(long)]
    pub no_segmentation: bool,

    /// Show a row progress bar on stderr.
    #[arg(long)]
    pub progress: bool,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace+ORT info, -vvv: trace+ORT debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
