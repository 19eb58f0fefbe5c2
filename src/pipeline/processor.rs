//! Per-row processing for one monitoring pass.

use crate::anomaly::OutlierDetector;
use crate::constants::segmentation::VISUALIZATION_PREFIX;
use crate::error::Result;
use crate::inference::{SpillDetector, SpillOutcome, check_for_spill};
use crate::output::{EventWriter, MonitorEvent, progress};
use crate::shutdown::ShutdownSignal;
use crate::telemetry::TelemetryRecord;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Read-only handles shared by every row of a pass.
pub struct ProcessContext<'a> {
    /// Fitted outlier model.
    pub detector: &'a dyn OutlierDetector,
    /// Spill checker; `None` skips spill checks.
    pub spill_detector: Option<&'a dyn SpillDetector>,
    /// Image inspected for anomalous rows.
    pub image_path: &'a Path,
    /// Directory for spill visualizations.
    pub output_dir: &'a Path,
    /// Checked between rows.
    pub shutdown: &'a ShutdownSignal,
    /// Optional row progress bar.
    pub progress: Option<&'a ProgressBar>,
}

/// Counters for a completed (or interrupted) pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassSummary {
    /// Events emitted.
    pub rows: usize,
    /// Rows flagged as anomalous.
    pub anomalies: usize,
    /// Spill checks actually run.
    pub spill_checks: usize,
    /// Confirmed spills.
    pub spills: usize,
    /// Wall-clock duration in seconds.
    pub duration_secs: f64,
    /// Whether shutdown cut the pass short.
    pub interrupted: bool,
}

/// Path of the visualization for the row at `row_index`.
pub fn visualization_path_for(output_dir: &Path, row_index: usize) -> PathBuf {
    output_dir.join(format!("{VISUALIZATION_PREFIX}{row_index}.png"))
}

/// Label, check and emit every record in order.
pub fn process_records(
    records: &[TelemetryRecord],
    ctx: &ProcessContext<'_>,
    writer: &mut dyn EventWriter,
) -> Result<PassSummary> {
    let start_time = Instant::now();
    let mut summary = PassSummary::default();

    for record in records {
        if ctx.shutdown.is_requested() {
            info!("Shutdown requested, stopping after {} rows", summary.rows);
            summary.interrupted = true;
            break;
        }

        let anomaly = ctx.detector.is_outlier(record.speed_change);
        let spill = if anomaly {
            summary.anomalies += 1;
            info!(
                "Anomaly detected at row {} (change {:.3})",
                record.row_index, record.speed_change
            );
            inspect_row(record, ctx, &mut summary)
        } else {
            SpillOutcome::default()
        };

        writer.write_event(&MonitorEvent::new(record, anomaly, &spill))?;
        summary.rows += 1;
        progress::inc_progress(ctx.progress);
    }

    writer.finalize()?;
    summary.duration_secs = start_time.elapsed().as_secs_f64();
    Ok(summary)
}

fn inspect_row(
    record: &TelemetryRecord,
    ctx: &ProcessContext<'_>,
    summary: &mut PassSummary,
) -> SpillOutcome {
    let Some(spill_detector) = ctx.spill_detector else {
        return SpillOutcome::default();
    };

    if !ctx.image_path.is_file() {
        warn!("No image found at path: {}", ctx.image_path.display());
        return SpillOutcome::default();
    }

    summary.spill_checks += 1;
    let save_path = visualization_path_for(ctx.output_dir, record.row_index);
    let outcome = check_for_spill(spill_detector, ctx.image_path, Some(&save_path));
    if outcome.detected {
        summary.spills += 1;
        info!("Oil spill detected for row {}", record.row_index);
    } else {
        debug!("No oil spill for row {}", record.row_index);
    }
    outcome
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::output::CollectingWriter;
    use crate::telemetry::RecordTime;
    use std::cell::Cell;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Flags any change above a fixed threshold.
    struct ThresholdDetector(f64);

    impl OutlierDetector for ThresholdDetector {
        fn score(&self, value: f64) -> f64 {
            if value > self.0 { 1.0 } else { 0.0 }
        }

        fn is_outlier(&self, value: f64) -> bool {
            value > self.0
        }
    }

    /// Records which rows were inspected and always reports a spill.
    #[derive(Default)]
    struct CountingSpillDetector {
        calls: Mutex<Vec<PathBuf>>,
    }

    impl SpillDetector for CountingSpillDetector {
        fn inspect(&self, _image: &Path, save_path: Option<&Path>) -> Result<SpillOutcome> {
            let path = save_path.map(Path::to_path_buf);
            if let Some(p) = &path {
                self.calls.lock().unwrap().push(p.clone());
            }
            Ok(SpillOutcome {
                detected: true,
                image_path: path,
            })
        }
    }

    /// Writer that requests shutdown after the first event.
    struct StopAfterFirst<'a> {
        shutdown: &'a ShutdownSignal,
        written: Cell<usize>,
    }

    impl EventWriter for StopAfterFirst<'_> {
        fn write_event(&mut self, _event: &MonitorEvent) -> Result<()> {
            self.written.set(self.written.get() + 1);
            self.shutdown.request();
            Ok(())
        }
    }

    fn records(changes: &[f64]) -> Vec<TelemetryRecord> {
        changes
            .iter()
            .enumerate()
            .map(|(i, &change)| TelemetryRecord {
                row_index: i + 1,
                timestamp: RecordTime::parse("2023-01-01T00:00:00").unwrap(),
                sog: 10.0,
                cog: 45.0,
                lat: 29.0,
                lon: -89.0,
                speed_change: change,
            })
            .collect()
    }

    fn image_in(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("scene.jpg");
        std::fs::write(&path, b"placeholder").unwrap();
        path
    }

    #[test]
    fn test_spill_checked_only_for_anomalies() {
        let dir = TempDir::new().unwrap();
        let image = image_in(&dir);
        let detector = ThresholdDetector(5.0);
        let spill = CountingSpillDetector::default();
        let shutdown = ShutdownSignal::new();
        let ctx = ProcessContext {
            detector: &detector,
            spill_detector: Some(&spill),
            image_path: &image,
            output_dir: dir.path(),
            shutdown: &shutdown,
            progress: None,
        };
        let mut writer = CollectingWriter::default();

        let summary = process_records(&records(&[0.0, 15.0, 1.0, 9.0]), &ctx, &mut writer).unwrap();

        assert_eq!(summary.rows, 4);
        assert_eq!(summary.anomalies, 2);
        assert_eq!(summary.spill_checks, 2);
        assert_eq!(summary.spills, 2);
        assert_eq!(
            *spill.calls.lock().unwrap(),
            vec![
                visualization_path_for(dir.path(), 2),
                visualization_path_for(dir.path(), 4)
            ]
        );

        let flags: Vec<(u8, u8)> = writer
            .events
            .iter()
            .map(|e| (e.anomaly, e.oil_spill))
            .collect();
        assert_eq!(flags, vec![(0, 0), (1, 1), (0, 0), (1, 1)]);
        assert!(writer.events[0].image_path.is_none());
        assert!(
            writer.events[1]
                .image_path
                .as_deref()
                .unwrap()
                .ends_with("oil_spill_2.png")
        );
    }

    #[test]
    fn test_missing_image_yields_no_spill() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.jpg");
        let detector = ThresholdDetector(5.0);
        let spill = CountingSpillDetector::default();
        let shutdown = ShutdownSignal::new();
        let ctx = ProcessContext {
            detector: &detector,
            spill_detector: Some(&spill),
            image_path: &missing,
            output_dir: dir.path(),
            shutdown: &shutdown,
            progress: None,
        };
        let mut writer = CollectingWriter::default();

        let summary = process_records(&records(&[15.0, 20.0]), &ctx, &mut writer).unwrap();

        assert_eq!(summary.anomalies, 2);
        assert_eq!(summary.spill_checks, 0);
        assert!(spill.calls.lock().unwrap().is_empty());
        for event in &writer.events {
            assert_eq!(event.anomaly, 1);
            assert_eq!(event.oil_spill, 0);
            assert!(event.image_path.is_none());
        }
    }

    #[test]
    fn test_no_spill_detector_skips_checks() {
        let dir = TempDir::new().unwrap();
        let image = image_in(&dir);
        let detector = ThresholdDetector(5.0);
        let shutdown = ShutdownSignal::new();
        let ctx = ProcessContext {
            detector: &detector,
            spill_detector: None,
            image_path: &image,
            output_dir: dir.path(),
            shutdown: &shutdown,
            progress: None,
        };
        let mut writer = CollectingWriter::default();

        let summary = process_records(&records(&[15.0]), &ctx, &mut writer).unwrap();
        assert_eq!(summary.spill_checks, 0);
        assert_eq!(writer.events[0].anomaly, 1);
        assert_eq!(writer.events[0].oil_spill, 0);
    }

    #[test]
    fn test_shutdown_stops_between_rows() {
        let dir = TempDir::new().unwrap();
        let detector = ThresholdDetector(5.0);
        let shutdown = ShutdownSignal::new();
        let ctx = ProcessContext {
            detector: &detector,
            spill_detector: None,
            image_path: Path::new("unused.jpg"),
            output_dir: dir.path(),
            shutdown: &shutdown,
            progress: None,
        };
        let mut writer = StopAfterFirst {
            shutdown: &shutdown,
            written: Cell::new(0),
        };

        let summary = process_records(&records(&[1.0, 2.0, 3.0]), &ctx, &mut writer).unwrap();
        assert!(summary.interrupted);
        assert_eq!(summary.rows, 1);
        assert_eq!(writer.written.get(), 1);
    }

    #[test]
    fn test_visualization_path() {
        assert_eq!(
            visualization_path_for(Path::new("oil_spill_images"), 12),
            PathBuf::from("oil_spill_images/oil_spill_12.png")
        );
    }
}
