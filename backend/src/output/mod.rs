//! Output table writers.
//!
//! Both formats keep the output table's column order: CSV as a header
//! row followed by one record per row, JSON as a pretty array of objects.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use crate::error::MigrationResult;
use crate::models::Table;

/// Serialization format for output tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown format '{}' (expected csv or json)", other)),
        }
    }
}

/// Write a table to any writer.
pub fn write_table<W: Write>(table: &Table, format: OutputFormat, writer: W) -> MigrationResult<()> {
    match format {
        OutputFormat::Csv => write_csv(table, writer),
        OutputFormat::Json => write_json(table, writer),
    }
}

/// Write a table to a file, replacing it.
pub fn write_table_file(table: &Table, format: OutputFormat, path: &Path) -> MigrationResult<()> {
    let file = File::create(path)?;
    write_table(table, format, BufWriter::new(file))
}

fn write_csv<W: Write>(table: &Table, writer: W) -> MigrationResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(table.columns())?;
    for row in table.rows() {
        wtr.write_record(row.cells.iter().map(|c| c.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_json<W: Write>(table: &Table, mut writer: W) -> MigrationResult<()> {
    serde_json::to_writer_pretty(&mut writer, table)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, RowOrigin};

    fn table() -> Table {
        let mut table = Table::new(vec!["Zeta".into(), "Alpha".into(), "Note".into()]);
        table.push(
            RowOrigin {
                table: "T".into(),
                line: 1,
            },
            vec![Cell::Integer(24), Cell::Null, Cell::from("a, b\nc")],
        );
        table
    }

    #[test]
    fn test_csv_keeps_column_order() {
        let mut buf = Vec::new();
        write_table(&table(), OutputFormat::Csv, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "Zeta,Alpha,Note\n24,,\"a, b\nc\"\n");
    }

    #[test]
    fn test_json_keeps_column_order() {
        let mut buf = Vec::new();
        write_table(&table(), OutputFormat::Json, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let zeta = text.find("\"Zeta\"").unwrap();
        let alpha = text.find("\"Alpha\"").unwrap();
        assert!(zeta < alpha);

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["Zeta"], 24);
        assert!(value[0]["Alpha"].is_null());
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.csv");
        write_table_file(&table(), OutputFormat::Csv, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Zeta,Alpha,Note\n"));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("xml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default().extension(), "csv");
    }
}
