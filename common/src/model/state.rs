//! State of one mapping session in the frontend, kept independent of Yew.
//!
//! The component owns a single `MapperState` and replaces it with the result
//! of a transition for every message; no transition touches the DOM.

use crate::model::field::CanonicalField;
use crate::model::mapping::{ColumnMapping, MappedRow};
use crate::model::row::ParsedCsv;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    Idle,
    Submitting,
    /// Number of records the server reported as stored.
    Succeeded(usize),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapperState {
    pub file: Option<LoadedFile>,
    pub csv: ParsedCsv,
    pub mapping: ColumnMapping,
    pub status: SubmissionStatus,
    /// Name of a newly picked file whose contents are still being read.
    pub reading: Option<String>,
}

impl Default for MapperState {
    fn default() -> Self {
        MapperState {
            file: None,
            csv: ParsedCsv::default(),
            mapping: ColumnMapping::new(),
            status: SubmissionStatus::Idle,
            reading: None,
        }
    }
}

impl MapperState {
    /// A new file was picked. The current session stays on screen but cannot
    /// be submitted until the file has been parsed.
    pub fn reading(mut self, name: String) -> Self {
        self.reading = Some(name);
        self
    }

    /// A freshly parsed file replaces everything from the previous session.
    pub fn with_file(self, name: String, size: u64, csv: ParsedCsv) -> Self {
        MapperState {
            file: Some(LoadedFile { name, size }),
            csv,
            mapping: ColumnMapping::new(),
            status: SubmissionStatus::Idle,
            reading: None,
        }
    }

    /// Records the selector choice for `header`. Headers that are not part of
    /// the loaded file are ignored.
    pub fn with_selection(mut self, header: &str, field: Option<CanonicalField>) -> Self {
        if self.csv.headers.iter().any(|h| h == header) {
            self.mapping.assign(header, field);
        }
        self
    }

    pub fn submitting(mut self) -> Self {
        self.status = SubmissionStatus::Submitting;
        self
    }

    pub fn submitted(mut self, outcome: Result<usize, String>) -> Self {
        self.status = match outcome {
            Ok(count) => SubmissionStatus::Succeeded(count),
            Err(message) => SubmissionStatus::Failed(message),
        };
        self
    }

    pub fn can_submit(&self) -> bool {
        self.file.is_some()
            && self.reading.is_none()
            && self.status != SubmissionStatus::Submitting
    }

    /// Whether the column mapping section should be shown.
    pub fn shows_mapping(&self) -> bool {
        !self.csv.headers.is_empty()
    }

    /// Mapped fields that end up in storage, in `CanonicalField::ALL` order.
    pub fn preview_columns(&self) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .iter()
            .copied()
            .filter(|field| field.is_persisted())
            .filter(|field| {
                self.csv
                    .headers
                    .iter()
                    .any(|h| self.mapping.field_for(h) == Some(*field))
            })
            .collect()
    }

    /// The first `limit` rows as they would be stored with the current mapping.
    pub fn preview(&self, limit: usize) -> Vec<MappedRow> {
        self.mapping
            .transform_rows(&self.csv.rows[..limit.min(self.csv.rows.len())])
    }
}
