//! Configuration validation.

use crate::config::Config;
use crate::constants::anomaly::MAX_CONTAMINATION;
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_anomaly(config)?;
    validate_segmentation(config)?;
    validate_supervisor(config)?;
    Ok(())
}

fn invalid(message: String) -> Error {
    Error::ConfigValidation { message }
}

/// Validate outlier model settings.
fn validate_anomaly(config: &Config) -> Result<()> {
    let anomaly = &config.anomaly;

    if !(anomaly.contamination > 0.0 && anomaly.contamination <= MAX_CONTAMINATION) {
        return Err(invalid(format!(
            "contamination must be in (0, {MAX_CONTAMINATION}], got {}",
            anomaly.contamination
        )));
    }

    if anomaly.trees == 0 {
        return Err(invalid("trees must be at least 1".to_string()));
    }

    if anomaly.max_samples == 0 {
        return Err(invalid("max_samples must be at least 1".to_string()));
    }

    Ok(())
}

/// Validate segmentation settings.
fn validate_segmentation(config: &Config) -> Result<()> {
    let seg = &config.segmentation;

    if seg.width == 0 || seg.height == 0 {
        return Err(invalid(format!(
            "segmentation input size must be non-zero, got {}x{}",
            seg.width, seg.height
        )));
    }

    if seg.threads == Some(0) {
        return Err(invalid("segmentation threads must be at least 1".to_string()));
    }

    Ok(())
}

/// Validate supervisor settings.
fn validate_supervisor(config: &Config) -> Result<()> {
    let sup = &config.supervisor;

    if !sup.backoff_multiplier.is_finite() || sup.backoff_multiplier < 1.0 {
        return Err(invalid(format!(
            "backoff_multiplier must be at least 1.0, got {}",
            sup.backoff_multiplier
        )));
    }

    if sup.max_consecutive_failures == 0 {
        return Err(invalid(
            "max_consecutive_failures must be at least 1".to_string(),
        ));
    }

    if sup.max_passes == Some(0) {
        return Err(invalid("max_passes must be at least 1 when set".to_string()));
    }

    if sup.max_backoff_ms < sup.initial_backoff_ms {
        return Err(invalid(format!(
            "max_backoff_ms ({}) is below initial_backoff_ms ({})",
            sup.max_backoff_ms, sup.initial_backoff_ms
        )));
    }

    Ok(())
}
