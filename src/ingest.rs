use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;
use num_traits::Float;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::uncertain::Uncertain;
use crate::{Error, Result};

/// One parsed line of the raw data file.
///
/// Timestamps are absolute; relative time is derived later by subtracting the
/// first row's timestamp. Rows are immutable once parsed and keep the order
/// of the source, which is assumed already time-ordered.
#[derive(Clone, Copy, Debug)]
pub struct MeasurementRow<E> {
    pub timestamp: E,
    pub voltage_start: Uncertain<E>,
    pub voltage_end: Uncertain<E>,
}

#[derive(Deserialize)]
struct Row<E>(E, E, E);

const FIELDS_PER_RECORD: usize = 3;

/// Parse the wrapped raw-data format into measurement rows.
///
/// Each line is a bracket-wrapped record, `[<timestamp>, <v_start>, <v_end>]`.
/// The wrapper is stripped and the comma-separated payload deserialized; the
/// two voltages are tagged with `voltage_tolerance`, the absolute instrument
/// uncertainty of the meter.
///
/// Parsing is fail-fast: one malformed line aborts the whole ingestion, since
/// a silently dropped row would corrupt the time axis.
///
/// # Errors
/// Returns [`Error::MalformedLine`] for a line without the bracket wrapper,
/// with the wrong field count or with a non-numeric field, and
/// [`Error::Io`] if the source cannot be read.
pub fn read_rows<E: Float + DeserializeOwned, R: BufRead>(
    reader: R,
    voltage_tolerance: E,
) -> Result<Vec<MeasurementRow<E>>> {
    let mut rows = vec![];

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line?;
        let payload = strip_wrapper(&line, line_number)?;
        let record: Row<E> = deserialize_payload(payload, line_number)?;
        rows.push(MeasurementRow {
            timestamp: record.0,
            voltage_start: Uncertain::new(record.1, voltage_tolerance),
            voltage_end: Uncertain::new(record.2, voltage_tolerance),
        });
    }

    Ok(rows)
}

/// Read measurement rows from a raw data file.
///
/// The file handle is scoped to this call and released once the full read
/// completes, on parse failure included.
///
/// # Errors
/// Propagates everything [`read_rows`] can return, plus the open failure.
pub fn from_file<E: Float + DeserializeOwned>(
    path: &Path,
    voltage_tolerance: E,
) -> Result<Vec<MeasurementRow<E>>> {
    info!("reading raw measurements from {}", path.display());
    let file = File::open(path)?;
    read_rows(BufReader::new(file), voltage_tolerance)
}

fn strip_wrapper(line: &str, line_number: usize) -> Result<&str> {
    let trimmed = line.strip_suffix('\r').unwrap_or(line);
    trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| Error::malformed(line_number, "record is not wrapped in `[` and `]`"))
}

fn deserialize_payload<E: DeserializeOwned>(payload: &str, line_number: usize) -> Result<Row<E>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(payload.as_bytes());

    let record = reader
        .records()
        .next()
        .ok_or_else(|| Error::malformed(line_number, "record has no fields"))?
        .map_err(|error| Error::malformed(line_number, error.to_string()))?;

    // The tuple deserializer stops after three fields, so surplus fields
    // would be dropped silently without this length check.
    if record.len() != FIELDS_PER_RECORD {
        return Err(Error::malformed(
            line_number,
            format!(
                "expected {FIELDS_PER_RECORD} fields, found {}",
                record.len()
            ),
        ));
    }

    record
        .deserialize(None)
        .map_err(|error| Error::malformed(line_number, error.to_string()))
}
