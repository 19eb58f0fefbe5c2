//! Unsupervised outlier detection on the speed-change feature.

mod isolation_forest;

pub use isolation_forest::{IsolationForest, IsolationForestParams, average_path_length};

/// A fitted model that labels single feature values.
pub trait OutlierDetector: Send + Sync {
    /// Anomaly score in `(0, 1]`; higher means easier to isolate.
    fn score(&self, value: f64) -> f64;

    /// Whether `value` falls outside the fitted inlier region.
    fn is_outlier(&self, value: f64) -> bool;
}
