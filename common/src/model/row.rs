//! Raw CSV rows as read from an uploaded file, before any field assignment.
//!
//! Both the frontend (on the file picked by the user) and the backend (on the
//! staged upload) go through `parse_csv`, so the headers the user maps in the
//! browser are exactly the headers the server sees.

use crate::error::MappingError;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::io::Read;

const UTF8_BOM: char = '\u{feff}';

/// One data row: source header -> cell value, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a cell. A repeated header keeps its first position and takes the new value.
    pub fn push(&mut self, header: impl Into<String>, value: impl Into<String>) {
        let header = header.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(h, _)| *h == header) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((header, value)),
        }
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<H: Into<String>, V: Into<String>> FromIterator<(H, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (H, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (h, v) in iter {
            row.push(h, v);
        }
        row
    }
}

/// Result of parsing a CSV file with a header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl ParsedCsv {
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// Renames repeated headers to `<header>_1`, `<header>_2`, ... so every column
/// keeps its own key. A generated name never shadows a header from the file.
fn disambiguate_headers(headers: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(headers.len());
    for (idx, header) in headers.iter().enumerate() {
        if !unique.contains(header) {
            unique.push(header.clone());
            continue;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{}_{}", header, n);
            if !unique.contains(&candidate) && !headers[idx + 1..].contains(&candidate) {
                unique.push(candidate);
                break;
            }
            n += 1;
        }
    }
    unique
}

/// Parses delimited text whose first record is the header row.
///
/// Short rows simply lack the trailing headers and extra cells are dropped.
/// Repeated headers are renamed (see `disambiguate_headers`).
/// Empty input gives no headers and no rows.
pub fn parse_csv<R: Read>(reader: R) -> Result<ParsedCsv, MappingError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, h)| {
            if idx == 0 {
                h.trim_start_matches(UTF8_BOM).to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Ok(ParsedCsv::default());
    }
    let headers = disambiguate_headers(headers);

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.as_str(), v))
            .collect();
        rows.push(row);
    }

    Ok(ParsedCsv { headers, rows })
}

pub fn parse_csv_str(text: &str) -> Result<ParsedCsv, MappingError> {
    parse_csv(text.as_bytes())
}
