//! Per-row monitor event.

use crate::inference::SpillOutcome;
use crate::telemetry::TelemetryRecord;
use serde::{Deserialize, Serialize};

/// One emitted event; field names match what stream consumers read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorEvent {
    /// ISO-8601 timestamp.
    #[serde(rename = "BaseDateTime")]
    pub base_date_time: String,
    /// Speed over ground.
    #[serde(rename = "SOG")]
    pub sog: f64,
    /// Course over ground.
    #[serde(rename = "COG")]
    pub cog: f64,
    /// Latitude.
    #[serde(rename = "LAT")]
    pub lat: f64,
    /// Longitude.
    #[serde(rename = "LON")]
    pub lon: f64,
    /// Absolute speed change to the previous row.
    #[serde(rename = "Change")]
    pub change: f64,
    /// 1 if the speed change is an outlier.
    pub anomaly: u8,
    /// 1 if a spill was confirmed.
    pub oil_spill: u8,
    /// Saved visualization; only set alongside `oil_spill = 1`.
    pub image_path: Option<String>,
}

impl MonitorEvent {
    /// Assemble the event for `record`.
    pub fn new(record: &TelemetryRecord, anomaly: bool, spill: &SpillOutcome) -> Self {
        let image_path = if spill.detected {
            spill
                .image_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned())
        } else {
            None
        };

        Self {
            base_date_time: record.timestamp.to_iso8601(),
            sog: record.sog,
            cog: record.cog,
            lat: record.lat,
            lon: record.lon,
            change: record.speed_change,
            anomaly: u8::from(anomaly),
            oil_spill: u8::from(spill.detected),
            image_path,
        }
    }

    /// Whether the spill flag is set.
    pub fn is_oil_spill(&self) -> bool {
        self.oil_spill == 1
    }
}
