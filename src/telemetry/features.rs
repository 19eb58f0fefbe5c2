//! Speed-change feature derivation.

use crate::error::{Error, Result};
use crate::telemetry::record::present;
use crate::telemetry::{RawTelemetryRow, RecordTime, TelemetryRecord};

/// Derive `|SOG[i] - SOG[i-1]|` for every row in table order.
///
/// The first row has no predecessor and is dropped. Rows with a missing
/// required field are dropped, and so are rows whose predecessor has no SOG.
/// Blank cells in any other column never drop a row.
/// A timestamp that is present but unparseable fails the whole table.
pub fn derive_speed_changes(rows: &[RawTelemetryRow]) -> Result<Vec<TelemetryRecord>> {
    let mut records = Vec::with_capacity(rows.len().saturating_sub(1));

    for pair in rows.windows(2) {
        let (prev, row) = (&pair[0], &pair[1]);

        let (Some(prev_sog), Some(sog)) = (present(prev.sog), present(row.sog)) else {
            continue;
        };
        let (Some(cog), Some(lat), Some(lon)) =
            (present(row.cog), present(row.lat), present(row.lon))
        else {
            continue;
        };
        let Some(raw_ts) = row.timestamp.as_deref().filter(|s| !s.trim().is_empty()) else {
            continue;
        };

        let timestamp = RecordTime::parse(raw_ts).ok_or_else(|| Error::InvalidTimestamp {
            row: row.row_index,
            value: raw_ts.to_string(),
        })?;

        records.push(TelemetryRecord {
            row_index: row.row_index,
            timestamp,
            sog,
            cog,
            lat,
            lon,
            speed_change: (sog - prev_sog).abs(),
        });
    }

    Ok(records)
}

/// Extract the feature column the outlier model is fit on.
pub fn speed_change_column(records: &[TelemetryRecord]) -> Vec<f64> {
    records.iter().map(|r| r.speed_change).collect()
}
