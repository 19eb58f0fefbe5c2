//! Spillwatch - vessel telemetry anomaly monitor.
//!
//! Flags sudden speed changes in AIS telemetry with an isolation forest,
//! cross-checks anomalies against a satellite image segmentation model for
//! oil spills, and streams one framed JSON event per row on stdout.

#![warn(missing_docs)]

pub mod anomaly;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod inference;
pub mod output;
pub mod pipeline;
pub mod shutdown;
pub mod telemetry;

use clap::Parser;
use cli::{Cli, Command, ConfigAction, MonitorArgs};
use config::{Config, config_file_path, load_config_file, load_default_config, save_config};
use output::FrameWriter;
use shutdown::ShutdownSignal;
use std::path::Path;
use tracing::info;

pub use error::{Error, Result};

/// Main entry point for spillwatch CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the event stream
    init_logging(cli.monitor.verbose, cli.monitor.quiet);

    if let Some(command) = cli.command {
        return handle_command(command, cli.monitor.config.as_deref());
    }

    let config = resolve_config(cli.input.as_deref(), &cli.monitor)?;

    let shutdown = ShutdownSignal::new();
    shutdown.install_ctrlc_handler();

    info!(
        "Monitoring {} (image: {}, segmentation: {})",
        config.telemetry.path.display(),
        config.segmentation.image.display(),
        if config.segmentation.enabled { "on" } else { "off" }
    );

    let mut writer = FrameWriter::new(std::io::stdout());
    let report = pipeline::run_monitor(&config, &shutdown, cli.monitor.progress, &mut writer)?;
    if report.interrupted {
        info!("Stopped on request after {} passes", report.passes);
    }
    Ok(())
}

/// Load the config file and layer command-line overrides on top.
pub fn resolve_config(input: Option<&Path>, args: &MonitorArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => load_config_file(path)?,
        None => load_default_config()?,
    };
    apply_overrides(&mut config, input, args);
    config::validate_config(&config)?;
    Ok(config)
}

/// Apply command-line values over `config`.
pub fn apply_overrides(config: &mut Config, input: Option<&Path>, args: &MonitorArgs) {
    if let Some(input) = input {
        config.telemetry.path = input.to_path_buf();
    }
    if let Some(format) = args.format {
        config.telemetry.format = format;
    }
    if let Some(image) = &args.image {
        config.segmentation.image.clone_from(image);
    }
    if let Some(model) = &args.model {
        config.segmentation.model.clone_from(model);
    }
    if let Some(dir) = &args.output_dir {
        config.segmentation.output_dir.clone_from(dir);
    }
    if let Some(interval_ms) = args.interval_ms {
        config.stream.interval_ms = interval_ms;
    }
    if let Some(contamination) = args.contamination {
        config.anomaly.contamination = contamination;
    }
    if let Some(seed) = args.seed {
        config.anomaly.seed = seed;
    }
    if args.no_segmentation {
        config.segmentation.enabled = false;
    }
    if args.once {
        config.supervisor.max_passes = Some(1);
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    // ORT logging is suppressed by default; -v shows warnings, -vv info, -vvv everything.
    let filter_str = if quiet {
        "warn,ort=off".to_string()
    } else {
        match verbose {
            0 => "info,ort=off".to_string(),
            1 => "debug,ort=warn".to_string(),
            2 => "trace,ort=info".to_string(),
            _ => "trace".to_string(),
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_command(command: Command, config_path: Option<&Path>) -> Result<()> {
    match command {
        Command::Config { action } => handle_config_command(action, config_path),
    }
}

#[allow(clippy::print_stdout)]
fn handle_config_command(action: ConfigAction, config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => config_file_path()?,
    };

    match action {
        ConfigAction::Init => {
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                save_config(&Config::default(), &path)?;
                println!("Created configuration file: {}", path.display());
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_config_file(&path)?;
            let rendered =
                toml::to_string_pretty(&config).map_err(|e| Error::ConfigSerialize { source: e })?;
            println!("# {}", display_path(&path));
            println!("{rendered}");
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn display_path(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found, showing defaults)", path.display())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args(argv: &[&str]) -> (Option<PathBuf>, MonitorArgs) {
        let mut full = vec!["spillwatch"];
        full.extend_from_slice(argv);
        let cli = Cli::try_parse_from(full).unwrap();
        (cli.input, cli.monitor)
    }

    #[test]
    fn test_overrides_apply_on_top_of_defaults() {
        let (input, monitor) = args(&[
            "track.parquet",
            "--image",
            "sat.png",
            "--interval-ms",
            "250",
            "--seed",
            "7",
            "--once",
            "--no-segmentation",
        ]);
        let mut config = Config::default();
        apply_overrides(&mut config, input.as_deref(), &monitor);

        assert_eq!(config.telemetry.path, PathBuf::from("track.parquet"));
        assert_eq!(config.segmentation.image, PathBuf::from("sat.png"));
        assert_eq!(config.stream.interval_ms, 250);
        assert_eq!(config.anomaly.seed, 7);
        assert!(!config.segmentation.enabled);
        assert_eq!(config.supervisor.max_passes, Some(1));
    }

    #[test]
    fn test_no_overrides_keeps_defaults() {
        let monitor = Cli::try_parse_from(["spillwatch"]).unwrap().monitor;
        let mut config = Config::default();
        apply_overrides(&mut config, None, &monitor);

        assert_eq!(
            config.telemetry.path,
            PathBuf::from(constants::DEFAULT_TELEMETRY_PATH)
        );
        assert_eq!(config.anomaly.contamination, 0.02);
        assert_eq!(config.stream.interval_ms, 2000);
        assert!(config.segmentation.enabled);
    }

    #[test]
    fn test_resolve_config_reads_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("spillwatch.toml");
        std::fs::write(
            &path,
            "[anomaly]\ncontamination = 0.1\n[stream]\ninterval_ms = 10\n",
        )
        .unwrap();

        let (input, monitor) = args(&["--config", path.to_str().unwrap()]);
        let config = resolve_config(input.as_deref(), &monitor).unwrap();

        assert_eq!(config.anomaly.contamination, 0.1);
        assert_eq!(config.stream.interval_ms, 10);
    }

    #[test]
    fn test_resolve_config_rejects_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("spillwatch.toml");
        std::fs::write(&path, "[anomaly]\ntrees = 0\n").unwrap();

        let (input, monitor) = args(&["--config", path.to_str().unwrap()]);
        assert!(matches!(
            resolve_config(input.as_deref(), &monitor),
            Err(Error::ConfigValidation { .. })
        ));
    }
}
