//! Telemetry table readers.
//!
//! CSV goes through the `csv` crate with serde; Parquet goes through the
//! arrow reader with every required column cast to a uniform type, so
//! integer speeds or native timestamp columns load the same way as text.

use crate::config::TelemetryFormat;
use crate::constants::columns;
use crate::error::{Error, Result};
use crate::telemetry::RawTelemetryRow;
use crate::telemetry::record::present;
use arrow::array::{Array, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Internal record for CSV deserialization.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "BaseDateTime", default)]
    timestamp: Option<String>,
    #[serde(rename = "SOG", default, deserialize_with = "csv::invalid_option")]
    sog: Option<f64>,
    #[serde(rename = "COG", default, deserialize_with = "csv::invalid_option")]
    cog: Option<f64>,
    #[serde(rename = "LAT", default, deserialize_with = "csv::invalid_option")]
    lat: Option<f64>,
    #[serde(rename = "LON", default, deserialize_with = "csv::invalid_option")]
    lon: Option<f64>,
}

/// Read a telemetry table in its original row order.
pub fn read_telemetry(path: &Path, format: TelemetryFormat) -> Result<Vec<RawTelemetryRow>> {
    if !path.exists() {
        return Err(Error::TelemetryNotFound {
            path: path.to_path_buf(),
        });
    }

    let rows = match resolve_format(path, format)? {
        TelemetryFormat::Parquet => read_parquet(path)?,
        TelemetryFormat::Csv | TelemetryFormat::Auto => read_csv(path)?,
    };

    debug!("Read {} telemetry rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Resolve `Auto` by file extension.
pub fn resolve_format(path: &Path, format: TelemetryFormat) -> Result<TelemetryFormat> {
    use std::ffi::OsStr;

    if format != TelemetryFormat::Auto {
        return Ok(format);
    }

    match path.extension() {
        Some(ext)
            if ext.eq_ignore_ascii_case(OsStr::new("parquet"))
                || ext.eq_ignore_ascii_case(OsStr::new("pq")) =>
        {
            Ok(TelemetryFormat::Parquet)
        }
        Some(ext)
            if ext.eq_ignore_ascii_case(OsStr::new("csv"))
                || ext.eq_ignore_ascii_case(OsStr::new("txt")) =>
        {
            Ok(TelemetryFormat::Csv)
        }
        other => Err(Error::UnsupportedTelemetryFormat {
            format: other.map_or_else(
                || "<no extension>".to_string(),
                |e| e.to_string_lossy().into_owned(),
            ),
        }),
    }
}

fn read_error(path: &Path, source: impl std::error::Error + Send + Sync + 'static) -> Error {
    Error::TelemetryRead {
        path: path.to_path_buf(),
        source: Box::new(source),
    }
}

fn read_csv(path: &Path) -> Result<Vec<RawTelemetryRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| read_error(path, e))?;

    let headers = reader.headers().map_err(|e| read_error(path, e))?.clone();
    for column in columns::REQUIRED {
        if !headers.iter().any(|h| h == column) {
            return Err(Error::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
    }

    let mut rows = Vec::new();
    for (row_index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let record = result.map_err(|e| read_error(path, e))?;
        rows.push(RawTelemetryRow {
            row_index,
            timestamp: record.timestamp.filter(|s| !s.is_empty()),
            sog: present(record.sog),
            cog: present(record.cog),
            lat: present(record.lat),
            lon: present(record.lon),
        });
    }

    Ok(rows)
}

fn read_parquet(path: &Path) -> Result<Vec<RawTelemetryRow>> {
    let file = File::open(path).map_err(|e| read_error(path, e))?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| read_error(path, e))?;

    for column in columns::REQUIRED {
        if builder.schema().field_with_name(column).is_err() {
            return Err(Error::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
    }

    let reader = builder.build().map_err(|e| read_error(path, e))?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch.map_err(|e| read_error(path, e))?;

        let timestamps = string_column(&batch, columns::TIMESTAMP, path)?;
        let sog = float_column(&batch, columns::SOG, path)?;
        let cog = float_column(&batch, columns::COG, path)?;
        let lat = float_column(&batch, columns::LAT, path)?;
        let lon = float_column(&batch, columns::LON, path)?;

        for i in 0..batch.num_rows() {
            rows.push(RawTelemetryRow {
                row_index: rows.len(),
                timestamp: (!timestamps.is_null(i))
                    .then(|| timestamps.value(i).trim().to_string())
                    .filter(|s| !s.is_empty()),
                sog: float_at(&sog, i),
                cog: float_at(&cog, i),
                lat: float_at(&lat, i),
                lon: float_at(&lon, i),
            });
        }
    }

    Ok(rows)
}

fn column_as(
    batch: &RecordBatch,
    name: &'static str,
    to: &DataType,
    path: &Path,
) -> Result<arrow::array::ArrayRef> {
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| Error::MissingColumn {
            path: path.to_path_buf(),
            column: name,
        })?;
    cast(column.as_ref(), to).map_err(|e| read_error(path, e))
}

fn float_column(batch: &RecordBatch, name: &'static str, path: &Path) -> Result<Float64Array> {
    let array = column_as(batch, name, &DataType::Float64, path)?;
    array
        .as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .ok_or_else(|| Error::Internal {
            message: format!("column '{name}' did not cast to Float64"),
        })
}

fn string_column(batch: &RecordBatch, name: &'static str, path: &Path) -> Result<StringArray> {
    let array = column_as(batch, name, &DataType::Utf8, path)?;
    array
        .as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .ok_or_else(|| Error::Internal {
            message: format!("column '{name}' did not cast to Utf8"),
        })
}

fn float_at(array: &Float64Array, i: usize) -> Option<f64> {
    if array.is_null(i) {
        None
    } else {
        present(Some(array.value(i)))
    }
}
