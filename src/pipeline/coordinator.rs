//! Pass coordination: load, fit, prepare and process.

use crate::anomaly::{IsolationForest, IsolationForestParams};
use crate::config::{Config, SegmentationConfig};
use crate::error::{Error, Result};
use crate::inference::{OnnxSegmenter, SpillDetector, SpillInspector};
use crate::output::{EventWriter, PacedSink, progress};
use crate::pipeline::supervisor::{RetryPolicy, SupervisorReport, supervise};
use crate::pipeline::{PassSummary, ProcessContext, process_records};
use crate::shutdown::ShutdownSignal;
use crate::telemetry::{derive_speed_changes, read_telemetry, speed_change_column};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Inputs for one monitoring pass.
pub struct PassInputs<'a> {
    /// Effective configuration.
    pub config: &'a Config,
    /// Shared shutdown flag.
    pub shutdown: &'a ShutdownSignal,
    /// Show a row progress bar.
    pub progress: bool,
    /// 1-based pass counter, used in progress output.
    pub pass_number: u32,
}

/// Holds the spill detector across passes once it has loaded.
#[derive(Default)]
pub struct SpillModelSlot {
    loaded: Option<Box<dyn SpillDetector>>,
}

impl SpillModelSlot {
    /// Empty slot; the model loads on first use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot that already holds a detector.
    pub fn preloaded(detector: Box<dyn SpillDetector>) -> Self {
        Self {
            loaded: Some(detector),
        }
    }

    /// Whether a detector is held.
    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Return the held detector, loading the ONNX model if needed.
    ///
    /// A failed load leaves the slot empty so the next pass retries.
    pub fn get_or_load(&mut self, config: &SegmentationConfig) -> Result<&dyn SpillDetector> {
        if self.loaded.is_none() {
            info!("Loading segmentation model...");
            let segmenter = OnnxSegmenter::from_config(config)?;
            self.loaded = Some(Box::new(SpillInspector::new(segmenter, config.visualize)));
        }
        self.loaded
            .as_deref()
            .ok_or_else(|| Error::Internal {
                message: "spill model slot empty after load".to_string(),
            })
    }
}

/// Run one full pass over the telemetry table.
pub fn run_pass(
    inputs: &PassInputs<'_>,
    slot: &mut SpillModelSlot,
    writer: &mut dyn EventWriter,
) -> Result<PassSummary> {
    let config = inputs.config;
    let telemetry_path = &config.telemetry.path;

    info!("Loading telemetry from {}", telemetry_path.display());
    let rows = read_telemetry(telemetry_path, config.telemetry.format)?;
    let records = derive_speed_changes(&rows)?;
    debug!("{} rows read, {} usable after derivation", rows.len(), records.len());
    if records.is_empty() {
        return Err(Error::InsufficientTelemetry {
            path: telemetry_path.clone(),
        });
    }

    info!("Training isolation forest on {} values...", records.len());
    let forest = IsolationForest::fit(
        &speed_change_column(&records),
        &IsolationForestParams::from(&config.anomaly),
    )?;

    let segmentation = &config.segmentation;
    let spill_detector = if segmentation.enabled {
        let detector = slot.get_or_load(segmentation)?;
        ensure_output_dir(&segmentation.output_dir)?;
        Some(detector)
    } else {
        debug!("Segmentation disabled, skipping spill checks");
        None
    };

    let pb = progress::create_row_progress(records.len(), inputs.pass_number, inputs.progress);
    let ctx = ProcessContext {
        detector: &forest,
        spill_detector,
        image_path: &segmentation.image,
        output_dir: &segmentation.output_dir,
        shutdown: inputs.shutdown,
        progress: pb.as_ref(),
    };
    let summary = process_records(&records, &ctx, writer)?;
    progress::finish_progress(pb, "Pass complete");

    Ok(summary)
}

fn ensure_output_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| Error::OutputDirCreateFailed {
        path: dir.to_path_buf(),
        source: e,
    })
}

/// Run passes under the supervisor until it stops.
///
/// Events go to `writer` no faster than the configured stream interval.
pub fn run_monitor(
    config: &Config,
    shutdown: &ShutdownSignal,
    progress: bool,
    writer: &mut dyn EventWriter,
) -> Result<SupervisorReport> {
    let policy = RetryPolicy::from(&config.supervisor);
    let mut slot = SpillModelSlot::new();
    let mut sink = PacedSink::new(
        writer,
        Duration::from_millis(config.stream.interval_ms),
        shutdown.clone(),
    );

    supervise(&policy, shutdown, |pass_number| {
        let inputs = PassInputs {
            config,
            shutdown,
            progress,
            pass_number,
        };
        run_pass(&inputs, &mut slot, &mut sink)
    })
}
