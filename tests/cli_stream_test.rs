//! Integration tests for the spillwatch binary.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use spillwatch::output::{Frame, FrameDecoder};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_track(dir: &Path, sogs: &[f64]) -> PathBuf {
    let path = dir.join("anomalous_dataset.csv");
    let mut body = String::from("MMSI,BaseDateTime,LAT,LON,SOG,COG,Heading\n");
    for (i, sog) in sogs.iter().enumerate() {
        body.push_str(&format!(
            "367000001,2023-01-01T00:{i:02}:00,29.{i},-89.{i},{sog},90.0,511\n"
        ));
    }
    std::fs::write(&path, body).unwrap();
    path
}

const ENV_VARS: &[&str] = &[
    "RUST_LOG",
    "SPILLWATCH_INPUT",
    "SPILLWATCH_CONFIG",
    "SPILLWATCH_FORMAT",
    "SPILLWATCH_IMAGE",
    "SPILLWATCH_MODEL",
    "SPILLWATCH_OUTPUT_DIR",
    "SPILLWATCH_INTERVAL_MS",
    "SPILLWATCH_CONTAMINATION",
    "SPILLWATCH_SEED",
];

/// Command with a clean environment and an isolated, absent config file.
fn spillwatch(dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("spillwatch");
    cmd.current_dir(dir);
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.arg("--config").arg(dir.join("absent.toml"));
    cmd
}

#[test]
fn test_single_pass_streams_framed_events() {
    let dir = TempDir::new().unwrap();
    let track = write_track(dir.path(), &[5.0, 5.0, 20.0, 20.0]);

    let output = spillwatch(dir.path())
        .arg(&track)
        .args(["--once", "--no-segmentation", "--interval-ms", "0"])
        .assert()
        .success()
        .get_output()
        .clone();

    let stdout = String::from_utf8(output.stdout).unwrap();
    for line in stdout.lines() {
        assert!(line.starts_with("JSON_START{"), "unframed line: {line}");
        assert!(line.ends_with("}JSON_END"), "unframed line: {line}");
    }

    let frames = FrameDecoder::new().push(&stdout);
    let events: Vec<_> = frames
        .into_iter()
        .map(|f| match f {
            Frame::Event(e) => e,
            Frame::Malformed { raw, error } => panic!("malformed frame {raw}: {error}"),
        })
        .collect();

    assert_eq!(events.len(), 3);
    let anomalies: Vec<u8> = events.iter().map(|e| e.anomaly).collect();
    assert_eq!(anomalies, vec![0, 1, 0]);
    assert!(events.iter().all(|e| e.oil_spill == 0 && e.image_path.is_none()));
    assert_eq!(events[1].base_date_time, "2023-01-01T00:02:00");
}

#[test]
fn test_input_falls_back_to_environment() {
    let dir = TempDir::new().unwrap();
    let track = write_track(dir.path(), &[5.0, 5.0, 20.0, 20.0]);
    std::fs::rename(&track, dir.path().join("from_env.csv")).unwrap();

    spillwatch(dir.path())
        .env("SPILLWATCH_INPUT", "from_env.csv")
        .args(["--once", "--no-segmentation", "--interval-ms", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("JSON_START").count(3));
}

#[test]
fn test_without_input_uses_default_dataset_name() {
    let dir = TempDir::new().unwrap();

    spillwatch(dir.path())
        .args(["--once", "--no-segmentation"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("anomalous_dataset.csv"));
}

#[test]
fn test_logs_stay_off_stdout() {
    let dir = TempDir::new().unwrap();
    let track = write_track(dir.path(), &[5.0, 6.0, 7.0]);

    spillwatch(dir.path())
        .arg(&track)
        .args(["--once", "--no-segmentation", "--interval-ms", "0", "-v"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Training isolation forest").not())
        .stderr(predicate::str::contains("Training isolation forest"));
}

#[test]
fn test_missing_dataset_fails_single_pass() {
    let dir = TempDir::new().unwrap();

    spillwatch(dir.path())
        .arg("nowhere.csv")
        .args(["--once", "--no-segmentation"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("nowhere.csv"));
}

#[test]
fn test_missing_model_fails_single_pass() {
    let dir = TempDir::new().unwrap();
    let track = write_track(dir.path(), &[5.0, 6.0, 7.0]);

    spillwatch(dir.path())
        .arg(&track)
        .args(["--once", "--model", "absent.onnx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.onnx"));
}

#[test]
fn test_invalid_contamination_rejected() {
    let dir = TempDir::new().unwrap();

    spillwatch(dir.path())
        .args(["--contamination", "0.7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("contamination"));
}

#[test]
fn test_config_path_honours_flag() {
    let dir = TempDir::new().unwrap();

    spillwatch(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("absent.toml"));
}

#[test]
fn test_config_init_then_show() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conf").join("spillwatch.toml");

    cargo_bin_cmd!("spillwatch")
        .args(["config", "init", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));
    assert!(path.is_file());

    cargo_bin_cmd!("spillwatch")
        .args(["config", "show", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[anomaly]"))
        .stdout(predicate::str::contains("contamination = 0.02"));

    cargo_bin_cmd!("spillwatch")
        .args(["config", "init", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}
