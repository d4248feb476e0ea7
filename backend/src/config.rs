//! Runtime configuration.
//!
//! Defaults are constants; a `.env` file and the environment override
//! them, and CLI flags override the environment.

use std::path::PathBuf;

use crate::source::{CsvDirectory, ExportSource, MdbExport};

/// Shop database exported by `mdb-export`.
pub const DEFAULT_DATABASE: &str = "/data/StanhopeFramers.mdb";

/// Export tool invoked once per table.
pub const DEFAULT_EXPORT_PROGRAM: &str = "mdb-export";

/// Environment variable: database path.
pub const ENV_DATABASE: &str = "STANHOPE_MDB";

/// Environment variable: export program.
pub const ENV_EXPORT_PROGRAM: &str = "STANHOPE_MDB_EXPORT";

/// Environment variable: directory of `<table>.csv` files used instead of
/// running the export program.
pub const ENV_CSV_DIR: &str = "STANHOPE_CSV_DIR";

/// Environment variable: custom code book JSON.
pub const ENV_CODES: &str = "STANHOPE_CODES";

/// Where tables come from and which code book to use.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database: PathBuf,
    pub export_program: String,
    pub csv_dir: Option<PathBuf>,
    pub codes: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            export_program: DEFAULT_EXPORT_PROGRAM.to_string(),
            csv_dir: None,
            codes: None,
        }
    }
}

impl Config {
    /// Load `.env` (if present) and read the environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            database: get(ENV_DATABASE).map(PathBuf::from).unwrap_or(defaults.database),
            export_program: get(ENV_EXPORT_PROGRAM).unwrap_or(defaults.export_program),
            csv_dir: get(ENV_CSV_DIR).map(PathBuf::from),
            codes: get(ENV_CODES).map(PathBuf::from),
        }
    }

    /// The export collaborator this configuration selects.
    pub fn export_source(&self) -> Box<dyn ExportSource> {
        match &self.csv_dir {
            Some(dir) => Box::new(CsvDirectory::new(dir)),
            None => Box::new(MdbExport::new(&self.export_program, &self.database)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_without_environment() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert!(config.export_source().describe().contains("mdb-export"));
    }

    #[test]
    fn test_environment_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_DATABASE, "/tmp/shop.mdb"),
            (ENV_CSV_DIR, "/tmp/export"),
            (ENV_CODES, "  "),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.database, PathBuf::from("/tmp/shop.mdb"));
        assert_eq!(config.export_program, DEFAULT_EXPORT_PROGRAM);
        assert_eq!(config.csv_dir, Some(PathBuf::from("/tmp/export")));
        assert_eq!(config.codes, None);
        assert!(config.export_source().describe().contains("/tmp/export"));
    }
}
