use crate::model::field::CanonicalField;
use crate::model::mapping::MappedRow;
use serde::{Deserialize, Serialize};

/// A person record in the fixed shape stored in the `users` table.
///
/// Every text field is free text and defaults to an empty string, never null.
/// `id` is only present once the record has been read back from storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub middle_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address_line_1: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pin_code: String,
    #[serde(default)]
    pub country: String,
}

impl CanonicalRecord {
    /// Builds a record from a field-keyed row. Fields that are not persisted
    /// are ignored and missing fields stay empty.
    pub fn from_mapped(row: &MappedRow) -> Self {
        let mut record = CanonicalRecord::default();
        for (field, value) in row {
            record.set(*field, value.clone());
        }
        record
    }

    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        let value = match field {
            CanonicalField::FirstName => &self.first_name,
            CanonicalField::MiddleName => &self.middle_name,
            CanonicalField::LastName => &self.last_name,
            CanonicalField::PhoneNumber => &self.phone_number,
            CanonicalField::AddressLine1 => &self.address_line_1,
            CanonicalField::State => &self.state,
            CanonicalField::PinCode => &self.pin_code,
            CanonicalField::Country => &self.country,
            CanonicalField::Id | CanonicalField::AddressLine2 => return None,
        };
        Some(value.as_str())
    }

    /// Sets a persisted text field. No-op for `id` and `address_line_2`.
    pub fn set(&mut self, field: CanonicalField, value: String) {
        let slot = match field {
            CanonicalField::FirstName => &mut self.first_name,
            CanonicalField::MiddleName => &mut self.middle_name,
            CanonicalField::LastName => &mut self.last_name,
            CanonicalField::PhoneNumber => &mut self.phone_number,
            CanonicalField::AddressLine1 => &mut self.address_line_1,
            CanonicalField::State => &mut self.state,
            CanonicalField::PinCode => &mut self.pin_code,
            CanonicalField::Country => &mut self.country,
            CanonicalField::Id | CanonicalField::AddressLine2 => return,
        };
        *slot = value;
    }
}
