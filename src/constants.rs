//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "spillwatch";

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default telemetry table path, relative to the working directory.
pub const DEFAULT_TELEMETRY_PATH: &str = "anomalous_dataset.csv";

/// Required telemetry column names.
pub mod columns {
    /// Record timestamp.
    pub const TIMESTAMP: &str = "BaseDateTime";
    /// Speed over ground.
    pub const SOG: &str = "SOG";
    /// Course over ground.
    pub const COG: &str = "COG";
    /// Latitude.
    pub const LAT: &str = "LAT";
    /// Longitude.
    pub const LON: &str = "LON";

    /// All required columns in table order.
    pub const REQUIRED: [&str; 5] = [TIMESTAMP, SOG, COG, LAT, LON];
}

/// Isolation forest defaults.
pub mod anomaly {
    /// Expected fraction of outliers in the speed-change column.
    pub const DEFAULT_CONTAMINATION: f64 = 0.02;

    /// Largest contamination the threshold estimate accepts.
    pub const MAX_CONTAMINATION: f64 = 0.5;

    /// Seed for tree construction.
    pub const DEFAULT_SEED: u64 = 42;

    /// Number of isolation trees.
    pub const DEFAULT_TREES: usize = 100;

    /// Upper bound on the per-tree subsample size.
    pub const DEFAULT_MAX_SAMPLES: usize = 256;

    /// Euler-Mascheroni constant, used by the average path length estimate.
    pub const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;
}

/// Segmentation model and imagery defaults.
pub mod segmentation {
    /// Default ONNX export of the U-Net.
    pub const DEFAULT_MODEL_PATH: &str = "unet_model.onnx";

    /// Default satellite scene checked on every anomaly.
    pub const DEFAULT_IMAGE_PATH: &str = "images/img_0003.jpg";

    /// Model input width in pixels.
    pub const DEFAULT_WIDTH: u32 = 256;

    /// Model input height in pixels.
    pub const DEFAULT_HEIGHT: u32 = 256;

    /// Number of RGB channels fed to the model.
    pub const CHANNELS: usize = 3;

    /// Number of surface classes the model predicts.
    pub const CLASS_COUNT: usize = 5;

    /// Directory receiving spill visualizations.
    pub const DEFAULT_OUTPUT_DIR: &str = "oil_spill_images";

    /// File name prefix for spill visualizations.
    pub const VISUALIZATION_PREFIX: &str = "oil_spill_";
}

/// Visualization layout.
pub mod visualization {
    /// Gap between panels in pixels.
    pub const PANEL_GAP: u32 = 16;

    /// Width of the legend column in pixels.
    pub const LEGEND_WIDTH: u32 = 32;

    /// Background colour of the canvas.
    pub const CANVAS_BACKGROUND: [u8; 3] = [255, 255, 255];
}

/// Event stream framing.
pub mod stream {
    /// Marker written before each JSON object.
    pub const FRAME_START: &str = "JSON_START";

    /// Marker written after each JSON object.
    pub const FRAME_END: &str = "JSON_END";

    /// Default minimum interval between events in milliseconds.
    pub const DEFAULT_INTERVAL_MS: u64 = 2000;
}

/// Supervisor defaults.
pub mod supervisor {
    /// Delay before starting the next pass after a successful one.
    pub const DEFAULT_RESTART_DELAY_MS: u64 = 5000;

    /// Backoff after the first failed pass.
    pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 5000;

    /// Backoff growth factor per consecutive failure.
    pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

    /// Backoff ceiling.
    pub const DEFAULT_MAX_BACKOFF_MS: u64 = 300_000;

    /// Consecutive failed passes tolerated before giving up.
    pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 5;

    /// Granularity of interruptible waits.
    pub const SHUTDOWN_POLL_MS: u64 = 100;
}
