use std::collections::HashSet;

use crate::errors::ParserError;

/// Cell values treated as missing, in addition to an empty field.
const NULL_MARKERS: [&str; 7] = ["NA", "N/A", "NaN", "nan", "NULL", "null", "<NA>"];

/// A delimited table held as text, one `Option<String>` per cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Names from `required` absent from the header, in `required` order.
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| self.column_index(name).is_none())
            .map(|name| name.to_string())
            .collect()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .and_then(|cell| cell.as_deref())
    }
}

/// Reads decoded text as a delimited table with a header row. A leading
/// byte-order mark is dropped; short rows are padded with missing cells.
/// Repeated header names get a `.1`, `.2`, ... suffix so every column name is
/// unique and the first occurrence keeps its name.
pub fn read_table(text: &str, delimiter: u8) -> Result<RawTable, ParserError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let raw_headers = reader.headers()?.clone();
    if raw_headers.iter().all(|header| header.trim().is_empty()) {
        return Err(ParserError::EmptyTable);
    }
    let headers = dedupe_headers(raw_headers.iter().map(|header| header.trim()));

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = (0..headers.len())
            .map(|idx| record.get(idx).and_then(normalize_cell))
            .collect();
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

fn dedupe_headers<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut headers = Vec::new();

    for name in names {
        let mut candidate = name.to_string();
        let mut suffix = 1;
        while taken.contains(&candidate) {
            candidate = format!("{name}.{suffix}");
            suffix += 1;
        }
        taken.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}

fn normalize_cell(value: &str) -> Option<String> {
    if value.is_empty() || NULL_MARKERS.contains(&value) {
        None
    } else {
        Some(value.to_string())
    }
}
