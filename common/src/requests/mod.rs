use crate::model::record::CanonicalRecord;
use serde::{Deserialize, Serialize};

/// Multipart field carrying the CSV file in `POST /upload`.
pub const FILE_FIELD: &str = "file";

/// Optional multipart field carrying the JSON `ColumnMapping` in `POST /upload`.
pub const MAPPING_FIELD: &str = "mapping";

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Response body of a successful `POST /upload`.
/// `data` holds the records as built from the file, before storage assigned ids.
pub struct UploadResponse {
    pub message: String,
    pub data: Vec<CanonicalRecord>,
}
