//! Runtime settings for the server, read from the environment.
//!
//! A `.env` file in the working directory is loaded first (see `main.rs`), so
//! every value below can live there instead of in the shell.
//!
//! | Variable                  | Default              |
//! |---------------------------|----------------------|
//! | `CSV_MAPPER_HOST`         | `127.0.0.1`          |
//! | `CSV_MAPPER_PORT`         | `8000`               |
//! | `CSV_MAPPER_DB`           | `csv_mapping.sqlite` |
//! | `CSV_MAPPER_UPLOAD_DIR`   | `uploads`            |
//! | `CSV_MAPPER_ALIASES`      | built-in alias table |
//! | `CSV_MAPPER_OPEN_BROWSER` | `true`               |

use common::error::MappingError;
use common::model::alias::AliasTable;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Could not read alias table {path}: {source}")]
    AliasFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    AliasTable(#[from] MappingError),
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    /// Staging directory for uploaded files until they are parsed.
    pub upload_dir: PathBuf,
    pub alias_table_path: Option<PathBuf>,
    pub open_browser: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("CSV_MAPPER_PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "CSV_MAPPER_PORT",
                    value,
                })?,
            None => 8000,
        };

        let open_browser = match lookup("CSV_MAPPER_OPEN_BROWSER") {
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "CSV_MAPPER_OPEN_BROWSER",
                        value,
                    })
                }
            },
            None => true,
        };

        Ok(Settings {
            host: lookup("CSV_MAPPER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            database_path: lookup("CSV_MAPPER_DB")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("csv_mapping.sqlite")),
            upload_dir: lookup("CSV_MAPPER_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            alias_table_path: lookup("CSV_MAPPER_ALIASES").map(PathBuf::from),
            open_browser,
        })
    }

    /// The configured alias table, or the built-in one when no file is set.
    pub fn alias_table(&self) -> Result<AliasTable, ConfigError> {
        match &self.alias_table_path {
            Some(path) => load_alias_table(path),
            None => Ok(AliasTable::default()),
        }
    }
}

fn load_alias_table(path: &Path) -> Result<AliasTable, ConfigError> {
    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::AliasFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(AliasTable::from_json(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let settings = settings(&[]).unwrap();
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.database_path, PathBuf::from("csv_mapping.sqlite"));
        assert_eq!(settings.upload_dir, PathBuf::from("uploads"));
        assert!(settings.alias_table_path.is_none());
        assert!(settings.open_browser);
        assert_eq!(settings.alias_table().unwrap(), AliasTable::default());
    }

    #[test]
    fn values_are_read_from_lookup() {
        let settings = settings(&[
            ("CSV_MAPPER_HOST", "0.0.0.0"),
            ("CSV_MAPPER_PORT", "9001"),
            ("CSV_MAPPER_DB", "/tmp/people.sqlite"),
            ("CSV_MAPPER_OPEN_BROWSER", "no"),
        ])
        .unwrap();
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 9001);
        assert_eq!(settings.database_path, PathBuf::from("/tmp/people.sqlite"));
        assert!(!settings.open_browser);
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = settings(&[("CSV_MAPPER_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "CSV_MAPPER_PORT", .. }));
    }

    #[test]
    fn alias_table_is_loaded_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aliases.json");
        std::fs::write(
            &path,
            r#"{"version": 3, "fields": [{"field": "country", "aliases": ["nation"]}]}"#,
        )
        .unwrap();

        let loaded = settings(&[("CSV_MAPPER_ALIASES", path.to_str().unwrap())]).unwrap();
        let table = loaded.alias_table().unwrap();
        assert_eq!(table.version, 3);

        let missing = settings(&[("CSV_MAPPER_ALIASES", "/nonexistent/aliases.json")])
            .unwrap()
            .alias_table();
        assert!(matches!(missing, Err(ConfigError::AliasFile { .. })));
    }
}
