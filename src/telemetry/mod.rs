//! Vessel telemetry loading and feature derivation.

mod features;
mod reader;
mod record;
mod timestamp;

pub use features::{derive_speed_changes, speed_change_column};
pub use reader::{read_telemetry, resolve_format};
pub use record::{RawTelemetryRow, TelemetryRecord};
pub use timestamp::RecordTime;
