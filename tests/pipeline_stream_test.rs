//! Library-level tests of the monitor loop and its output stream.

use spillwatch::config::{Config, SupervisorConfig};
use spillwatch::output::{Frame, FrameDecoder, FrameWriter, MonitorEvent};
use spillwatch::pipeline::run_monitor;
use spillwatch::shutdown::ShutdownSignal;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn config_for(dir: &Path, sogs: &[f64]) -> Config {
    let track = dir.join("track.csv");
    let mut body = String::from("BaseDateTime,SOG,COG,LAT,LON\n");
    for (i, sog) in sogs.iter().enumerate() {
        body.push_str(&format!("2023-06-01 12:00:{i:02},{sog},270.0,28.9,-88.7\n"));
    }
    std::fs::write(&track, body).unwrap();

    let mut config = Config::default();
    config.telemetry.path = track;
    config.segmentation.enabled = false;
    config.segmentation.image = dir.join("scene.jpg");
    config.segmentation.output_dir = dir.join("oil_spill_images");
    config.stream.interval_ms = 0;
    config.supervisor = SupervisorConfig {
        restart_delay_ms: 0,
        initial_backoff_ms: 0,
        max_backoff_ms: 0,
        max_passes: Some(1),
        ..SupervisorConfig::default()
    };
    config
}

fn decode(bytes: &[u8]) -> Vec<MonitorEvent> {
    let text = std::str::from_utf8(bytes).unwrap();
    FrameDecoder::new()
        .push(text)
        .into_iter()
        .filter_map(|f| match f {
            Frame::Event(e) => Some(e),
            Frame::Malformed { .. } => None,
        })
        .collect()
}

#[test]
fn test_every_row_after_the_first_is_emitted() {
    let dir = TempDir::new().unwrap();
    let sogs = [12.0, 12.5, 11.0, 11.2, 30.0, 30.2, 30.1];
    let config = config_for(dir.path(), &sogs);

    let mut buf = Vec::new();
    let report = {
        let mut writer = FrameWriter::new(&mut buf);
        run_monitor(&config, &ShutdownSignal::new(), false, &mut writer).unwrap()
    };
    assert_eq!(report.passes, 1);

    let events = decode(&buf);
    assert_eq!(events.len(), sogs.len() - 1);
    for (i, event) in events.iter().enumerate() {
        assert!((event.change - (sogs[i + 1] - sogs[i]).abs()).abs() < 1e-9);
        assert!((event.sog - sogs[i + 1]).abs() < 1e-9);
        assert!(event.anomaly <= 1);
        assert_eq!(event.oil_spill, 0);
        assert!(event.image_path.is_none());
    }
    let flagged: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| e.anomaly == 1)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(flagged, vec![3]);
}

#[test]
fn test_repeated_runs_are_identical() {
    let dir = TempDir::new().unwrap();
    let sogs: Vec<f64> = (0..60).map(|i| 10.0 + f64::from(i % 7) * 0.3).collect();
    let config = config_for(dir.path(), &sogs);

    let run = || {
        let mut buf = Vec::new();
        {
            let mut writer = FrameWriter::new(&mut buf);
            run_monitor(&config, &ShutdownSignal::new(), false, &mut writer).unwrap();
        }
        decode(&buf)
    };
    assert_eq!(run(), run());
}

#[test]
fn test_events_are_paced() {
    let dir = TempDir::new().unwrap();
    let mut config = config_for(dir.path(), &[5.0, 5.0, 20.0, 20.0]);
    config.stream.interval_ms = 50;

    let mut buf = Vec::new();
    let start = Instant::now();
    {
        let mut writer = FrameWriter::new(&mut buf);
        run_monitor(&config, &ShutdownSignal::new(), false, &mut writer).unwrap();
    }

    assert!(start.elapsed() >= Duration::from_millis(100));
    assert_eq!(decode(&buf).len(), 3);
}

#[test]
fn test_unloadable_model_emits_nothing() {
    let dir = TempDir::new().unwrap();
    let mut config = config_for(dir.path(), &[5.0, 5.0, 20.0, 20.0]);
    config.segmentation.enabled = true;
    config.segmentation.model = dir.path().join("absent.onnx");

    let mut buf = Vec::new();
    let result = {
        let mut writer = FrameWriter::new(&mut buf);
        run_monitor(&config, &ShutdownSignal::new(), false, &mut writer)
    };
    assert!(result.is_err());
    assert!(buf.is_empty());
    assert!(!config.segmentation.output_dir.exists());
}
