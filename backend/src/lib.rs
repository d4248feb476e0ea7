//! # Stanhope - legacy framing-shop database migration
//!
//! Reads the shop's Access database tables through an export tool and
//! reshapes them into import files for the new system: Accounts,
//! Contacts, Orders and Treatments.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ mdb-export  │────▶│   Loader    │────▶│  Projector  │────▶│  CSV / JSON │
//! │  (per table)│     │ (working t.)│     │ (per entity)│     │   output    │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stanhope::{migrate, CodeBook, Entity, MdbExport};
//!
//! let export = MdbExport::default();
//! let accounts = migrate(Entity::Accounts, &export, None, &CodeBook::default())?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Cells, rows and tables
//! - [`source`] - Export collaborators
//! - [`parser`] - Export parsing with encoding detection
//! - [`loader`] - Working table construction
//! - [`normalize`] - Value normalizers and code lookups
//! - [`transform`] - Entity projectors and pipeline
//! - [`output`] - CSV and JSON writers
//! - [`config`] - Environment configuration
//! - [`logs`] - Run logging

// Core modules
pub mod error;
pub mod models;

// Configuration
pub mod config;
pub mod logs;

// Loading
pub mod loader;
pub mod parser;
pub mod source;

// Transformation
pub mod normalize;
pub mod transform;

// Output
pub mod output;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CodeBookError,
    LoadError,
    MigrationError,
    MigrationResult,
    NormalizeError,
    ProjectionError,
    SourceError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Cell, Row, RowOrigin, Table};

// =============================================================================
// Re-exports - Sources
// =============================================================================

pub use source::{CsvDirectory, ExportSource, MdbExport, MemorySource};

// =============================================================================
// Re-exports - Loading
// =============================================================================

pub use loader::{load, Source};
pub use parser::{decode_content, detect_encoding, parse_str, parse_table, Converter, ReadConfig};

// =============================================================================
// Re-exports - Normalizers
// =============================================================================

pub use normalize::{
    boolean,
    legacy_order_id,
    legacy_record,
    replace_newline,
    upper,
    CodeBook,
    Dimension,
    Lookup,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::{migrate, migrate_all, Entity, Projector};

// =============================================================================
// Re-exports - Output
// =============================================================================

pub use output::{write_table, write_table_file, OutputFormat};

pub use config::Config;
