//! Export collaborators: where raw table bytes come from.
//!
//! The loader only needs "give me the delimited text of table X". In
//! production that is `mdb-export` run against the shop database; an
//! operator can also point the tool at a directory of pre-exported CSV
//! files, and tests use an in-memory source.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;

use crate::config::{DEFAULT_DATABASE, DEFAULT_EXPORT_PROGRAM};
use crate::error::{SourceError, SourceResult};

/// Produces the raw delimited bytes (header row included) of a named table.
pub trait ExportSource {
    fn export(&self, table: &str) -> SourceResult<Vec<u8>>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

// =============================================================================
// mdb-export
// =============================================================================

/// Runs `<program> <database> <table>` and captures stdout.
#[derive(Debug, Clone)]
pub struct MdbExport {
    program: String,
    database: PathBuf,
}

impl MdbExport {
    pub fn new(program: impl Into<String>, database: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            database: database.into(),
        }
    }
}

impl Default for MdbExport {
    fn default() -> Self {
        Self::new(DEFAULT_EXPORT_PROGRAM, DEFAULT_DATABASE)
    }
}

impl ExportSource for MdbExport {
    fn export(&self, table: &str) -> SourceResult<Vec<u8>> {
        let output = Command::new(&self.program)
            .arg(&self.database)
            .arg(table)
            .output()
            .map_err(|e| SourceError::new(format!("cannot run '{}': {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            return Err(SourceError::new(if stderr.is_empty() {
                format!("'{}' exited with {}", self.program, output.status)
            } else {
                format!("'{}' exited with {}: {}", self.program, output.status, stderr)
            }));
        }

        Ok(output.stdout)
    }

    fn describe(&self) -> String {
        format!("{} {}", self.program, self.database.display())
    }
}

// =============================================================================
// CSV directory
// =============================================================================

/// Reads `<dir>/<table>.csv`.
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    dir: PathBuf,
}

impl CsvDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", table))
    }
}

impl ExportSource for CsvDirectory {
    fn export(&self, table: &str) -> SourceResult<Vec<u8>> {
        let path = self.path_for(table);
        std::fs::read(&path)
            .map_err(|e| SourceError::new(format!("cannot read {}: {}", path.display(), e)))
    }

    fn describe(&self) -> String {
        format!("csv files in {}", self.dir.display())
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Named byte buffers, for fixtures and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(name, content);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.tables.insert(name.into(), content.into());
    }
}

impl ExportSource for MemorySource {
    fn export(&self, table: &str) -> SourceResult<Vec<u8>> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| SourceError::new("no such table"))
    }

    fn describe(&self) -> String {
        format!("{} in-memory table(s)", self.tables.len())
    }
}
