//! Error types for the Stanhope migration pipeline.
//!
//! The hierarchy follows the data flow:
//!
//! - [`SourceError`] - the export collaborator could not produce a table
//! - [`LoadError`] - fetching or parsing a working table failed
//! - [`NormalizeError`] - a value normalizer rejected a legacy value
//! - [`ProjectionError`] - an entity projector failed on a row or column
//! - [`CodeBookError`] - a custom code book could not be loaded
//! - [`MigrationError`] - top-level orchestration errors
//!
//! Every layer converts into [`MigrationError`] via `From`, so `?` works
//! across the whole pipeline. Nothing is retried: the first error aborts
//! the run and names the table, row and column/code where it can.

use thiserror::Error;

// =============================================================================
// Export Collaborator Errors
// =============================================================================

/// The export collaborator failed to produce bytes for a table.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct SourceError {
    pub reason: String,
}

impl SourceError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Loading Errors
// =============================================================================

/// Errors while building a working table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The collaborator could not export the table.
    #[error("Source table '{table}' unavailable: {reason}")]
    SourceUnavailable { table: String, reason: String },

    /// A row could not be parsed under the declared conversions.
    #[error("Malformed row in '{table}' at line {line}{}: {message}", describe_cell(.column, .value))]
    MalformedRow {
        table: String,
        line: usize,
        column: Option<String>,
        value: Option<String>,
        message: String,
    },

    /// A configured column is absent from the export header.
    #[error("Table '{table}' has no column '{column}'")]
    MissingColumn { table: String, column: String },

    /// A later table does not share the first table's column set.
    #[error("Table '{table}' does not match the working schema (missing: [{}], unexpected: [{}])", .missing.join(", "), .unexpected.join(", "))]
    SchemaMismatch {
        table: String,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    /// An explicit empty table list was given.
    #[error("No source tables to load")]
    NoTables,
}

fn describe_cell(column: &Option<String>, value: &Option<String>) -> String {
    match (column, value) {
        (Some(col), Some(val)) => format!(", column '{}' (value '{}')", col, val),
        (Some(col), None) => format!(", column '{}'", col),
        _ => String::new(),
    }
}

// =============================================================================
// Normalizer Errors
// =============================================================================

/// Errors raised by value normalizers.
#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    /// A coded value has no canonical label.
    #[error("Unknown {lookup} code '{code}'")]
    UnknownCode { lookup: String, code: String },

    /// A dimension is negative, non-finite or not a number.
    #[error("Invalid dimension '{value}'")]
    InvalidDimension { value: String },
}

// =============================================================================
// Projection Errors
// =============================================================================

/// Errors raised by entity projectors.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// A normalizer failed on one cell.
    #[error("{entity}: '{table}' line {line}, column '{column}': {source}")]
    Projection {
        entity: String,
        table: String,
        line: usize,
        column: String,
        #[source]
        source: NormalizeError,
    },

    /// A column to drop, rename or massage is missing.
    #[error("{entity}: missing column '{column}'")]
    MissingColumn { entity: String, column: String },

    /// A surviving column has no target name.
    #[error("{entity}: column '{column}' has no target name")]
    UnmappedColumn { entity: String, column: String },

    /// A synthesized key occurs on more than one row.
    #[error("{entity}: duplicate {column} '{key}' ({first} and {second})")]
    DuplicateKey {
        entity: String,
        column: String,
        key: String,
        first: String,
        second: String,
    },
}

// =============================================================================
// Code Book Errors
// =============================================================================

/// Errors loading a custom code book.
#[derive(Debug, Error)]
pub enum CodeBookError {
    /// IO error.
    #[error("Code book IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error.
    #[error("Code book JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The file does not define exactly the known lookups.
    #[error("Code book lookups do not match (missing: [{}], unknown: [{}])", .missing.join(", "), .unknown.join(", "))]
    LookupMismatch {
        missing: Vec<String>,
        unknown: Vec<String>,
    },
}

// =============================================================================
// Migration Errors (top-level)
// =============================================================================

/// Top-level migration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::migrate`]
/// and by the CLI commands.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Loading error.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Projection error.
    #[error("Projection error: {0}")]
    Projection(#[from] ProjectionError),

    /// Code book error.
    #[error("Code book error: {0}")]
    CodeBook(#[from] CodeBookError),

    /// Output IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Output CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Output JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for collaborator operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for normalizers.
pub type NormalizeResult<T> = Result<T, NormalizeError>;

/// Result type for projectors.
pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Result type for top-level operations.
pub type MigrationResult<T> = Result<T, MigrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let load_err = LoadError::SourceUnavailable {
            table: "Customers".into(),
            reason: "no such table".into(),
        };
        let err: MigrationError = load_err.into();
        assert!(err.to_string().contains("Customers"));
        assert!(err.to_string().contains("no such table"));

        let proj_err = ProjectionError::UnmappedColumn {
            entity: "Accounts".into(),
            column: "Fax".into(),
        };
        let err: MigrationError = proj_err.into();
        assert!(err.to_string().contains("Fax"));
    }

    #[test]
    fn test_malformed_row_format() {
        let err = LoadError::MalformedRow {
            table: "Customers".into(),
            line: 5,
            column: Some("Credit".into()),
            value: Some("maybe".into()),
            message: "not a boolean".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'Customers' at line 5"));
        assert!(msg.contains("column 'Credit'"));
        assert!(msg.contains("value 'maybe'"));

        let err = LoadError::MalformedRow {
            table: "Customers".into(),
            line: 0,
            column: None,
            value: None,
            message: "empty export".into(),
        };
        assert_eq!(err.to_string(), "Malformed row in 'Customers' at line 0: empty export");
    }

    #[test]
    fn test_projection_error_names_code() {
        let err = ProjectionError::Projection {
            entity: "Treatments".into(),
            table: "FrameOrders".into(),
            line: 12,
            column: "Sales Category".into(),
            source: NormalizeError::UnknownCode {
                lookup: "sales_category".into(),
                code: "ZZ".into(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("line 12"));
        assert!(msg.contains("'ZZ'"));
    }
}
