//! Server-side fallback normalization for uploads that arrive without a column mapping.
//!
//! Each persisted canonical field lists, in priority order, the source headers
//! it accepts. The table is plain data (serde JSON) so new spellings can be
//! added from configuration without touching the ingestion handler.

use crate::error::MappingError;
use crate::model::field::CanonicalField;
use crate::model::record::CanonicalRecord;
use crate::model::row::RawRow;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_ALIAS_TABLE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAliases {
    pub field: CanonicalField,
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasTable {
    pub version: u32,
    pub fields: Vec<FieldAliases>,
}

impl Default for AliasTable {
    fn default() -> Self {
        let entry = |field: CanonicalField, aliases: &[&str]| FieldAliases {
            field,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        };

        AliasTable {
            version: DEFAULT_ALIAS_TABLE_VERSION,
            fields: vec![
                entry(CanonicalField::FirstName, &["f_name", "firstname", "first_name"]),
                entry(CanonicalField::MiddleName, &["middlename", "middle_name"]),
                entry(CanonicalField::LastName, &["l_name", "lastname", "last_name"]),
                entry(CanonicalField::PhoneNumber, &["mobile", "phoneNumber", "phone_number"]),
                entry(CanonicalField::AddressLine1, &["address", "address_line_1"]),
                entry(CanonicalField::State, &["state"]),
                entry(CanonicalField::PinCode, &["postal_index_code", "pin", "pin_code"]),
                entry(CanonicalField::Country, &["country"]),
            ],
        }
    }
}

impl AliasTable {
    /// Parses and validates a table from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, MappingError> {
        let table: AliasTable = serde_json::from_str(json)
            .map_err(|e| MappingError::InvalidAliasTable(e.to_string()))?;
        table.validate()?;
        Ok(table)
    }

    /// Only persisted fields may appear, each at most once.
    pub fn validate(&self) -> Result<(), MappingError> {
        let mut seen = HashSet::new();
        for entry in &self.fields {
            if !entry.field.is_persisted() {
                return Err(MappingError::InvalidAliasTable(format!(
                    "field '{}' is not stored",
                    entry.field
                )));
            }
            if !seen.insert(entry.field) {
                return Err(MappingError::InvalidAliasTable(format!(
                    "field '{}' listed more than once",
                    entry.field
                )));
            }
        }
        Ok(())
    }

    pub fn aliases_for(&self, field: CanonicalField) -> &[String] {
        self.fields
            .iter()
            .find(|entry| entry.field == field)
            .map(|entry| entry.aliases.as_slice())
            .unwrap_or(&[])
    }

    /// Builds a record taking, per field, the first non-empty value among its
    /// aliases. Fields with no matching value stay empty.
    pub fn normalize(&self, row: &RawRow) -> CanonicalRecord {
        let mut record = CanonicalRecord::default();
        for entry in &self.fields {
            let value = entry
                .aliases
                .iter()
                .filter_map(|alias| row.get(alias))
                .find(|value| !value.is_empty())
                .unwrap_or_default();
            record.set(entry.field, value.to_string());
        }
        record
    }

    pub fn normalize_rows(&self, rows: &[RawRow]) -> Vec<CanonicalRecord> {
        rows.iter().map(|row| self.normalize(row)).collect()
    }
}
