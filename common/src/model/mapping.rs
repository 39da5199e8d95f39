use crate::error::MappingError;
use crate::model::field::CanonicalField;
use crate::model::row::RawRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A row keyed by canonical field instead of source header.
pub type MappedRow = BTreeMap<CanonicalField, String>;

/// User-chosen association from source CSV header to canonical field.
///
/// Sent to the backend as a JSON object (`{"Name": "first_name"}`). Field
/// names outside `CanonicalField::ALL` fail to deserialize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    columns: BTreeMap<String, CanonicalField>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `header` to `field`, or unsets it when `field` is `None`.
    ///
    /// A field is held by at most one header: any other header currently
    /// mapped to the same field is unset.
    pub fn assign(&mut self, header: &str, field: Option<CanonicalField>) {
        match field {
            Some(field) => {
                self.columns.retain(|h, f| *f != field || h == header);
                self.columns.insert(header.to_string(), field);
            }
            None => {
                self.columns.remove(header);
            }
        }
    }

    pub fn field_for(&self, header: &str) -> Option<CanonicalField> {
        self.columns.get(header).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Rejects mappings where two headers target the same field. Mappings
    /// built with `assign` always pass; this guards mappings received over the wire.
    pub fn validate(&self) -> Result<(), MappingError> {
        let mut seen: BTreeMap<CanonicalField, &str> = BTreeMap::new();
        for (header, field) in &self.columns {
            if let Some(first) = seen.insert(*field, header) {
                return Err(MappingError::DuplicateTarget {
                    field: field.to_string(),
                    first: first.to_string(),
                    second: header.clone(),
                });
            }
        }
        Ok(())
    }

    /// Re-keys a raw row by canonical field. Headers without a mapping are dropped.
    pub fn transform(&self, row: &RawRow) -> MappedRow {
        row.iter()
            .filter_map(|(header, value)| {
                self.field_for(header)
                    .map(|field| (field, value.to_string()))
            })
            .collect()
    }

    pub fn transform_rows(&self, rows: &[RawRow]) -> Vec<MappedRow> {
        rows.iter().map(|row| self.transform(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, &str)]) -> RawRow {
        cells.iter().copied().collect()
    }

    #[test]
    fn unmapped_headers_are_dropped() {
        let mut mapping = ColumnMapping::new();
        mapping.assign("Name", Some(CanonicalField::FirstName));

        let mapped = mapping.transform(&row(&[("Name", "Asha"), ("Ph", "999")]));

        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[&CanonicalField::FirstName], "Asha");
    }

    #[test]
    fn assigning_a_taken_field_moves_it() {
        let mut mapping = ColumnMapping::new();
        mapping.assign("mobile", Some(CanonicalField::PhoneNumber));
        mapping.assign("phone", Some(CanonicalField::PhoneNumber));

        assert_eq!(mapping.field_for("mobile"), None);
        assert_eq!(mapping.field_for("phone"), Some(CanonicalField::PhoneNumber));
        assert!(mapping.validate().is_ok());
    }

    #[test]
    fn reassigning_the_same_header_replaces_its_field() {
        let mut mapping = ColumnMapping::new();
        mapping.assign("Name", Some(CanonicalField::FirstName));
        mapping.assign("Name", Some(CanonicalField::LastName));
        mapping.assign("Other", None);

        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.field_for("Name"), Some(CanonicalField::LastName));

        mapping.assign("Name", None);
        assert!(mapping.is_empty());
    }

    #[test]
    fn wire_mapping_with_duplicate_targets_is_rejected() {
        let mapping: ColumnMapping =
            serde_json::from_str(r#"{"a": "state", "b": "state"}"#).unwrap();
        let err = mapping.validate().unwrap_err();
        assert!(matches!(
            err,
            MappingError::DuplicateTarget { ref first, ref second, .. } if first == "a" && second == "b"
        ));
    }

    #[test]
    fn wire_mapping_with_unknown_field_fails_to_parse() {
        let parsed = serde_json::from_str::<ColumnMapping>(r#"{"a": "undefined"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn transform_rows_keeps_row_order() {
        let mut mapping = ColumnMapping::new();
        mapping.assign("pin", Some(CanonicalField::PinCode));
        let rows = vec![row(&[("pin", "1")]), row(&[("pin", "2")]), row(&[])];

        let mapped = mapping.transform_rows(&rows);

        assert_eq!(mapped.len(), 3);
        assert_eq!(mapped[1][&CanonicalField::PinCode], "2");
        assert!(mapped[2].is_empty());
    }
}
