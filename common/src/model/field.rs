use crate::error::MappingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of standard person-record fields a CSV column can be mapped to.
///
/// Serialized as the snake_case field name, which is also the value used by the
/// mapping selectors in the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Id,
    FirstName,
    MiddleName,
    LastName,
    PhoneNumber,
    #[serde(rename = "address_line_1")]
    AddressLine1,
    #[serde(rename = "address_line_2")]
    AddressLine2,
    State,
    PinCode,
    Country,
}

impl CanonicalField {
    /// Every field, in the order the mapping selector lists them.
    pub const ALL: [CanonicalField; 10] = [
        CanonicalField::Id,
        CanonicalField::FirstName,
        CanonicalField::MiddleName,
        CanonicalField::LastName,
        CanonicalField::PhoneNumber,
        CanonicalField::AddressLine1,
        CanonicalField::AddressLine2,
        CanonicalField::State,
        CanonicalField::PinCode,
        CanonicalField::Country,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Id => "id",
            CanonicalField::FirstName => "first_name",
            CanonicalField::MiddleName => "middle_name",
            CanonicalField::LastName => "last_name",
            CanonicalField::PhoneNumber => "phone_number",
            CanonicalField::AddressLine1 => "address_line_1",
            CanonicalField::AddressLine2 => "address_line_2",
            CanonicalField::State => "state",
            CanonicalField::PinCode => "pin_code",
            CanonicalField::Country => "country",
        }
    }

    /// Whether values mapped to this field end up in the `users` table.
    ///
    /// `id` is assigned by storage and `address_line_2` only exists in the
    /// selector list, so both are dropped when a record is built.
    pub fn is_persisted(&self) -> bool {
        !matches!(self, CanonicalField::Id | CanonicalField::AddressLine2)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalField {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CanonicalField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| MappingError::UnknownField(s.to_string()))
    }
}
