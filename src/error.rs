//! Error types for spillwatch.

/// Result type alias for spillwatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for spillwatch.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// Telemetry file does not exist.
    #[error("telemetry file does not exist: {path}")]
    TelemetryNotFound {
        /// Path to the missing telemetry file.
        path: std::path::PathBuf,
    },

    /// Failed to open or read the telemetry table.
    #[error("failed to read telemetry from '{path}'")]
    TelemetryRead {
        /// Path to the telemetry file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Telemetry table lacks a required column.
    #[error("telemetry file '{path}' has no '{column}' column")]
    MissingColumn {
        /// Path to the telemetry file.
        path: std::path::PathBuf,
        /// Name of the missing column.
        column: &'static str,
    },

    /// Telemetry table format could not be determined.
    #[error("unsupported telemetry format: {format}")]
    UnsupportedTelemetryFormat {
        /// The unsupported format or extension.
        format: String,
    },

    /// A timestamp cell could not be parsed.
    #[error("row {row}: invalid timestamp '{value}'")]
    InvalidTimestamp {
        /// 0-based data row index.
        row: usize,
        /// Offending cell value.
        value: String,
    },

    /// Not enough usable rows to fit the outlier model.
    #[error("no usable speed-change rows in '{path}' (need at least two complete records)")]
    InsufficientTelemetry {
        /// Path to the telemetry file.
        path: std::path::PathBuf,
    },

    /// Invalid outlier model parameters.
    #[error("invalid outlier model parameters: {reason}")]
    InvalidModelParameters {
        /// Description of the invalid parameter.
        reason: String,
    },

    /// Segmentation model file does not exist.
    #[error("segmentation model file does not exist: {path}")]
    ModelFileNotFound {
        /// Path to the missing model file.
        path: std::path::PathBuf,
    },

    /// Failed to build the segmentation session.
    #[error("failed to build segmentation model: {reason}")]
    ClassifierBuild {
        /// Description of the build failure.
        reason: String,
    },

    /// Inference failed.
    #[error("inference failed: {reason}")]
    Inference {
        /// Description of the inference failure.
        reason: String,
    },

    /// Failed to read an image.
    #[error("failed to read image '{path}'")]
    ImageRead {
        /// Path to the image.
        path: std::path::PathBuf,
        /// Underlying decode error.
        #[source]
        source: image::ImageError,
    },

    /// Failed to write an image.
    #[error("failed to write image '{path}'")]
    ImageWrite {
        /// Path to the image.
        path: std::path::PathBuf,
        /// Underlying encode error.
        #[source]
        source: image::ImageError,
    },

    /// Failed to create output directory.
    #[error("failed to create output directory '{path}'")]
    OutputDirCreateFailed {
        /// Path to the output directory.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize an event.
    #[error("failed to serialize event")]
    EventSerialize {
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// The supervisor gave up after repeated failed passes.
    #[error("giving up after {attempts} consecutive failed passes; last error: {last}")]
    RetriesExhausted {
        /// Number of consecutive failures.
        attempts: u32,
        /// Rendered last error.
        last: String,
    },

    /// Internal error (for unexpected failures).
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}
