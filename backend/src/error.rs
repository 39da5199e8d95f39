use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::error::MappingError;
use thiserror::Error;

/// Everything that can stop an upload or listing request.
///
/// Client mistakes (no file, bad mapping, unreadable CSV) answer `400`; disk,
/// database and worker failures answer `500`. Bodies are plain text.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Missing file")]
    MissingFile,

    #[error("Mapping exceeds {limit} bytes")]
    MappingTooLarge { limit: usize },

    #[error("Invalid mapping: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error("Multipart error: {0}")]
    Multipart(#[from] actix_multipart::MultipartError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Worker error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ResponseError for IngestError {
    fn status_code(&self) -> StatusCode {
        match self {
            IngestError::MissingFile
            | IngestError::MappingTooLarge { .. }
            | IngestError::Json(_)
            | IngestError::Mapping(_)
            | IngestError::Multipart(_) => StatusCode::BAD_REQUEST,
            IngestError::Io(_) | IngestError::Storage(_) | IngestError::Join(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).body(format!("Error: {}", self))
    }
}
