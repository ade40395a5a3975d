//! CSV file parser

use std::io::{BufRead, BufReader, Read};

use csv::StringRecord;
use tracing::{debug, trace};

use crate::error::Result;
use crate::model::{Row, RowSet};

/// Read comma-separated text into rows.
///
/// The first line is the header and is discarded, even when it is blank.
/// Records with fewer than two fields are dropped. Field values are kept
/// verbatim (no trimming). An empty stream yields an empty `RowSet`, not an
/// error.
pub fn read_csv<R: Read>(reader: R) -> Result<RowSet> {
    let mut reader = BufReader::new(reader);

    // Empty lines never produce a record, so a blank header line has to be
    // spotted before the csv reader skips over it
    let blank_header = matches!(reader.fill_buf()?.first(), Some(b'\n' | b'\r'));

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = csv_reader.records();
    let mut rows = RowSet::new();

    // Read header
    if blank_header {
        debug!("CSV header line is blank");
    } else if records.next().transpose()?.is_none() {
        debug!("CSV stream is empty");
        return Ok(rows);
    }

    let mut dropped = 0usize;

    for result in records {
        let record: StringRecord = result?;

        if record.len() > 1 {
            let row: Row = record.iter().map(|s| Some(s.to_string())).collect();
            rows.push(row);
        } else {
            trace!(line = record_line(&record), "Dropping single-field CSV record");
            dropped += 1;
        }
    }

    debug!(kept = rows.len(), dropped, "Read CSV rows");

    Ok(rows)
}

/// 1-based line the reader was on when the record began
fn record_line(record: &StringRecord) -> u64 {
    record.position().map_or(1, |p| p.line())
}
