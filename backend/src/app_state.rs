//! Shared, read-only state handed to every request handler.
//!
//! The only mutable resource in the system is the `users` table, whose
//! consistency is left to SQLite; nothing here needs a lock.

use crate::storage::RecordStore;
use common::model::alias::AliasTable;
use std::path::PathBuf;
use std::sync::Arc;

/// Injected into the Actix application as `web::Data` in `main.rs`.
#[derive(Clone)]
pub struct AppState {
    /// Where canonical records are appended and listed from.
    pub store: RecordStore,

    /// Fallback normalization for uploads sent without a column mapping.
    pub aliases: Arc<AliasTable>,

    /// Directory uploaded files are staged in until they have been parsed.
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn new(store: RecordStore, aliases: AliasTable, upload_dir: PathBuf) -> Self {
        AppState {
            store,
            aliases: Arc::new(aliases),
            upload_dir,
        }
    }
}
