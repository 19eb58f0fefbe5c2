//! Configuration type definitions.

use crate::constants::{anomaly, segmentation, stream, supervisor, DEFAULT_TELEMETRY_PATH};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Telemetry input settings.
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Outlier model settings.
    #[serde(default)]
    pub anomaly: AnomalyConfig,

    /// Spill segmentation settings.
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Event stream settings.
    #[serde(default)]
    pub stream: StreamConfig,

    /// Pass supervisor settings.
    #[serde(default)]
    pub supervisor: SupervisorConfig,
}

/// Telemetry input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Path to the telemetry table.
    pub path: PathBuf,

    /// Table format.
    pub format: TelemetryFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_TELEMETRY_PATH),
            format: TelemetryFormat::Auto,
        }
    }
}

/// Supported telemetry table formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TelemetryFormat {
    /// Pick by file extension.
    #[default]
    Auto,
    /// Comma-separated values.
    Csv,
    /// Apache Parquet.
    Parquet,
}

impl std::fmt::Display for TelemetryFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Csv => write!(f, "csv"),
            Self::Parquet => write!(f, "parquet"),
        }
    }
}

/// Isolation forest settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Expected fraction of outliers.
    pub contamination: f64,

    /// Random seed for tree construction.
    pub seed: u64,

    /// Number of trees.
    pub trees: usize,

    /// Maximum subsample size per tree.
    pub max_samples: usize,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            contamination: anomaly::DEFAULT_CONTAMINATION,
            seed: anomaly::DEFAULT_SEED,
            trees: anomaly::DEFAULT_TREES,
            max_samples: anomaly::DEFAULT_MAX_SAMPLES,
        }
    }
}

/// Spill segmentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Run spill checks on anomalies.
    pub enabled: bool,

    /// Path to the ONNX segmentation model.
    pub model: PathBuf,

    /// Satellite scene checked on every anomaly.
    pub image: PathBuf,

    /// Model input width.
    pub width: u32,

    /// Model input height.
    pub height: u32,

    /// Intra-op thread count for the inference session (None = runtime default).
    pub threads: Option<usize>,

    /// Directory receiving spill visualizations.
    pub output_dir: PathBuf,

    /// Render a visualization for confirmed spills.
    pub visualize: bool,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: PathBuf::from(segmentation::DEFAULT_MODEL_PATH),
            image: PathBuf::from(segmentation::DEFAULT_IMAGE_PATH),
            width: segmentation::DEFAULT_WIDTH,
            height: segmentation::DEFAULT_HEIGHT,
            threads: None,
            output_dir: PathBuf::from(segmentation::DEFAULT_OUTPUT_DIR),
            visualize: true,
        }
    }
}

/// Event stream settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Minimum interval between emitted events in milliseconds.
    pub interval_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            interval_ms: stream::DEFAULT_INTERVAL_MS,
        }
    }
}

/// Pass supervisor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Delay before the next pass after a successful one, in milliseconds.
    pub restart_delay_ms: u64,

    /// Backoff after the first failed pass, in milliseconds.
    pub initial_backoff_ms: u64,

    /// Backoff growth per consecutive failure.
    pub backoff_multiplier: f64,

    /// Backoff ceiling in milliseconds.
    pub max_backoff_ms: u64,

    /// Consecutive failed passes tolerated before exiting.
    pub max_consecutive_failures: u32,

    /// Stop after this many passes (None = run until interrupted).
    pub max_passes: Option<u32>,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            restart_delay_ms: supervisor::DEFAULT_RESTART_DELAY_MS,
            initial_backoff_ms: supervisor::DEFAULT_INITIAL_BACKOFF_MS,
            backoff_multiplier: supervisor::DEFAULT_BACKOFF_MULTIPLIER,
            max_backoff_ms: supervisor::DEFAULT_MAX_BACKOFF_MS,
            max_consecutive_failures: supervisor::DEFAULT_MAX_CONSECUTIVE_FAILURES,
            max_passes: None,
        }
    }
}
