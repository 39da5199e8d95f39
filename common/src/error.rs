use thiserror::Error;

/// Errors produced while parsing CSV input or interpreting a column mapping.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    /// Two source headers point at the same canonical field.
    #[error("Field '{field}' is mapped from both '{first}' and '{second}'")]
    DuplicateTarget {
        field: String,
        first: String,
        second: String,
    },

    #[error("Invalid alias table: {0}")]
    InvalidAliasTable(String),
}
