//! Table loader: fetch legacy tables and build one working table.
//!
//! A [`Source`] is a family of same-schema legacy tables (current and
//! archived customers, frame orders across years). Each table is fetched
//! once from the export collaborator, parsed under the family's
//! [`ReadConfig`], and appended in the order given.

use std::fmt;
use std::str::FromStr;

use crate::error::{LoadError, LoadResult};
use crate::logs::{log_info, log_info_indent, log_success_indent, log_warning};
use crate::models::Table;
use crate::parser::{parse_table, Converter, ReadConfig};
use crate::source::ExportSource;

const CUSTOMERS_CONFIG: ReadConfig = ReadConfig {
    converters: &[
        ("Customer Number", Converter::Upper),
        ("Credit", Converter::Boolean),
        ("Tax Exempt", Converter::Boolean),
        ("Deceased", Converter::Boolean),
    ],
    dates: &["Date", "Last Order", "Last Update"],
};

const FRAME_ORDERS_CONFIG: ReadConfig = ReadConfig {
    converters: &[
        ("CustomerNo", Converter::Upper),
        ("OrderNo", Converter::Upper),
        ("Qty", Converter::Integer),
        ("TotalSale", Converter::Decimal),
        ("Frame Width", Converter::Decimal),
        ("Frame Height", Converter::Decimal),
    ],
    dates: &["DateCompleted", "DueDate", "OrderDate"],
};

/// Legacy table families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Customers,
    FrameOrders,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Customers, Source::FrameOrders];

    /// Name of the family's primary table.
    pub fn name(&self) -> &'static str {
        match self {
            Source::Customers => "Customers",
            Source::FrameOrders => "FrameOrders",
        }
    }

    pub fn read_config(&self) -> &'static ReadConfig {
        match self {
            Source::Customers => &CUSTOMERS_CONFIG,
            Source::FrameOrders => &FRAME_ORDERS_CONFIG,
        }
    }

    /// Tables loaded when none are named.
    pub fn default_tables(&self) -> Vec<String> {
        vec![self.name().to_string()]
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.chars().filter(|c| c.is_alphanumeric()).collect();
        Source::ALL
            .into_iter()
            .find(|src| src.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| format!("unknown source '{}' (expected customers or frame-orders)", s))
    }
}

/// Load a working table.
///
/// `tables` of `None` loads the family's default table. Every table must
/// have the first table's column set; later tables are aligned to its
/// column order.
pub fn load(
    source: Source,
    export: &dyn ExportSource,
    tables: Option<&[String]>,
) -> LoadResult<Table> {
    let defaults;
    let tables = match tables {
        Some(t) => t,
        None => {
            defaults = source.default_tables();
            defaults.as_slice()
        }
    };
    if tables.is_empty() {
        return Err(LoadError::NoTables);
    }

    log_info(format!("Loading {} from {}", source, export.describe()));

    let mut working: Option<Table> = None;
    for table in tables {
        log_info_indent(format!("Exporting {}", table), 1);
        let bytes = export
            .export(table)
            .map_err(|e| LoadError::SourceUnavailable {
                table: table.clone(),
                reason: e.reason,
            })?;
        let mut page = parse_table(table, &bytes, source.read_config())?;
        if page.is_empty() {
            log_warning(format!("{} has no rows", table));
        } else {
            log_success_indent(format!("{}: {} rows", table, page.len()), 1);
        }

        match working.as_mut() {
            None => working = Some(page),
            Some(acc) => {
                align(table, acc, &mut page)?;
                acc.extend(page.into_rows());
            }
        }
    }

    let working = working.unwrap_or_default();
    log_success_indent(
        format!("{} working rows, {} columns", working.len(), working.columns().len()),
        1,
    );
    Ok(working)
}

/// Reorder `page` to the working column order, or fail if the sets differ.
fn align(table: &str, working: &Table, page: &mut Table) -> LoadResult<()> {
    let missing: Vec<String> = working
        .columns()
        .iter()
        .filter(|c| !page.has_column(c))
        .cloned()
        .collect();
    let unexpected: Vec<String> = page
        .columns()
        .iter()
        .filter(|c| !working.has_column(c))
        .cloned()
        .collect();

    if !missing.is_empty() || !unexpected.is_empty() || !page.reorder(working.columns()) {
        return Err(LoadError::SchemaMismatch {
            table: table.to_string(),
            missing,
            unexpected,
        });
    }
    Ok(())
}
