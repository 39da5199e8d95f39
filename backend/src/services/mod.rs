//! HTTP API for uploading CSV files as person records and listing them.
//!
//! The provided routes are:
//! - `POST /upload`: multipart/form-data with a `file` part (the CSV) and an optional
//!   `mapping` part (JSON object from source header to canonical field name). With a
//!   mapping, only mapped columns are kept; without one, the alias table decides which
//!   headers feed which field. The resulting records are appended to storage in one
//!   transaction and echoed back as `{ "message", "data" }`.
//!
//! - `GET /users`: returns every stored record as a JSON array, ids included.

use actix_web::web::{self, get, post};

mod upload;
mod users;

/// Registers the API routes on an application (or a test service).
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/upload", post().to(upload::process))
        .route("/users", get().to(users::process));
}
