//! SQLite persistence for canonical records.
//!
//! Every call opens its own connection to the database file, so `RecordStore`
//! is just a path and can be cloned freely into handlers and blocking tasks.
//! All methods block; callers on the async runtime go through
//! `tokio::task::spawn_blocking`.

use common::model::record::CanonicalRecord;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

const CREATE_USERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL DEFAULT '',
    middle_name TEXT NOT NULL DEFAULT '',
    last_name TEXT NOT NULL DEFAULT '',
    phone_number TEXT NOT NULL DEFAULT '',
    address_line_1 TEXT NOT NULL DEFAULT '',
    state TEXT NOT NULL DEFAULT '',
    pin_code TEXT NOT NULL DEFAULT '',
    country TEXT NOT NULL DEFAULT ''
)";

#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        RecordStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> Result<Connection, rusqlite::Error> {
        Connection::open(&self.path)
    }

    /// Creates the `users` table if it does not exist yet.
    pub fn init(&self) -> Result<(), rusqlite::Error> {
        self.connect()?.execute(CREATE_USERS_TABLE, [])?;
        Ok(())
    }

    /// Appends a batch in a single transaction: either every record is stored or none is.
    pub fn insert_many(&self, records: &[CanonicalRecord]) -> Result<usize, rusqlite::Error> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO users (first_name, middle_name, last_name, phone_number,
                    address_line_1, state, pin_code, country)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for record in records {
                stmt.execute(params![
                    record.first_name,
                    record.middle_name,
                    record.last_name,
                    record.phone_number,
                    record.address_line_1,
                    record.state,
                    record.pin_code,
                    record.country,
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    /// Every stored record, in insertion order.
    pub fn list(&self) -> Result<Vec<CanonicalRecord>, rusqlite::Error> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, first_name, middle_name, last_name, phone_number,
                    address_line_1, state, pin_code, country
             FROM users ORDER BY id",
        )?;
        let records = stmt
            .query_map([], |row| {
                Ok(CanonicalRecord {
                    id: Some(row.get(0)?),
                    first_name: row.get(1)?,
                    middle_name: row.get(2)?,
                    last_name: row.get(3)?,
                    phone_number: row.get(4)?,
                    address_line_1: row.get(5)?,
                    state: row.get(6)?,
                    pin_code: row.get(7)?,
                    country: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}
