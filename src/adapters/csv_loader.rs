//! CSV loader for `name;value;name;value` rows.
//!
//! The first record is always a header and is discarded. Every following
//! record is read as alternating field-name / value cells.

use crate::domain::model::Row;
use crate::utils::error::{FormError, Result};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

pub const SNIFF_BYTES: usize = 1000;

const BOM: char = '\u{feff}';

/// `;` 出現次數嚴格多於 `,` 時使用 `;`，否則使用 `,`
pub fn detect_delimiter(sample: &[u8]) -> u8 {
    let semicolons = sample.iter().filter(|&&b| b == b';').count();
    let commas = sample.iter().filter(|&&b| b == b',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

pub fn load_rows<P: AsRef<Path>>(path: P) -> Result<Vec<Row>> {
    let path = path.as_ref();
    let input_error = |source| FormError::InputError {
        path: path.display().to_string(),
        source,
    };

    let mut file = File::open(path).map_err(input_error)?;
    let mut sample = Vec::with_capacity(SNIFF_BYTES);
    (&mut file)
        .take(SNIFF_BYTES as u64)
        .read_to_end(&mut sample)
        .map_err(input_error)?;
    file.seek(SeekFrom::Start(0)).map_err(input_error)?;

    let delimiter = detect_delimiter(&sample);
    tracing::debug!(
        "Detected delimiter '{}' for {}",
        delimiter as char,
        path.display()
    );

    parse_rows(file, delimiter)
}

pub fn parse_rows<R: Read>(reader: R, delimiter: u8) -> Result<Vec<Row>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        if line == 0 {
            continue;
        }

        let row = row_from_record(&record);
        if row.is_empty() {
            tracing::debug!("Skipping CSV record {}: no field/value pairs", line + 1);
            continue;
        }
        rows.push(row);
    }

    Ok(rows)
}

fn clean(cell: &str) -> &str {
    cell.trim().trim_matches(BOM).trim()
}

fn row_from_record(record: &StringRecord) -> Row {
    let cells: Vec<&str> = record.iter().collect();
    let mut row = Row::new();

    // chunks_exact 會丟掉最後沒有值的單獨欄位
    for pair in cells.chunks_exact(2) {
        let name = clean(pair[0]);
        if name.is_empty() {
            continue;
        }
        row.insert(name, clean(pair[1]));
    }

    row
}
