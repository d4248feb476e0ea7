//! Domain models for the migration pipeline.
//!
//! - [`Cell`] - a typed legacy or target value
//! - [`RowOrigin`] - where a row came from (source table and line)
//! - [`Row`] - cells aligned with a table's columns
//! - [`Table`] - an ordered set of rows sharing one column set
//!
//! The same [`Table`] type serves as the working table produced by the
//! loader and as the output table produced by each projector.

use chrono::{NaiveDateTime, Timelike};
use serde::{Serialize, Serializer};
use std::fmt;

// =============================================================================
// Cell
// =============================================================================

/// A single typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Text(String),
    Integer(i64),
    Decimal(f64),
    Date(NaiveDateTime),
    Bool(bool),
}

impl Cell {
    /// Build a text cell, mapping `None` to [`Cell::Null`].
    pub fn from_text(value: Option<String>) -> Self {
        value.map(Cell::Text).unwrap_or(Cell::Null)
    }

    /// Null, or text that is empty once trimmed.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Display form of a non-blank cell, used as a lookup key.
    pub fn as_code(&self) -> Option<String> {
        if self.is_blank() {
            None
        } else {
            Some(self.to_string())
        }
    }

    /// Numeric view of a cell, parsing text when needed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(n) => Some(*n as f64),
            Cell::Decimal(d) => Some(*d),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Integer(n) => write!(f, "{}", n),
            Cell::Decimal(d) => write!(f, "{}", d),
            Cell::Date(dt) => {
                if dt.num_seconds_from_midnight() == 0 {
                    write!(f, "{}", dt.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))
                }
            }
            Cell::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Null => serializer.serialize_none(),
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Integer(n) => serializer.serialize_i64(*n),
            Cell::Decimal(d) => serializer.serialize_f64(*d),
            Cell::Date(_) => serializer.collect_str(self),
            Cell::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Integer(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

// =============================================================================
// Rows
// =============================================================================

/// Source table and the export line a row starts on (the header is line 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOrigin {
    pub table: String,
    pub line: usize,
}

impl fmt::Display for RowOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} line {}", self.table, self.line)
    }
}

/// One row: cells aligned with the owning table's columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub origin: RowOrigin,
    pub cells: Vec<Cell>,
}

// =============================================================================
// Table
// =============================================================================

/// Ordered rows over a shared, ordered column set.
///
/// Every row holds exactly one cell per column; the mutating methods keep
/// that invariant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name.
    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.position(column).is_some()
    }

    /// Append a row. Short rows are padded with nulls, long rows truncated.
    pub fn push(&mut self, origin: RowOrigin, mut cells: Vec<Cell>) {
        cells.resize(self.columns.len(), Cell::Null);
        self.rows.push(Row { origin, cells });
    }

    /// Consume the table, keeping only its rows.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Append all rows of another table with the same column set.
    pub fn extend(&mut self, rows: impl IntoIterator<Item = Row>) {
        for row in rows {
            self.push(row.origin, row.cells);
        }
    }

    /// Cell of `row` under `column`, if the column exists.
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.position(column)?;
        self.rows.get(row).map(|r| &r.cells[idx])
    }

    /// All cells of one column, in row order.
    pub fn column(&self, column: &str) -> Option<Vec<&Cell>> {
        let idx = self.position(column)?;
        Some(self.rows.iter().map(|r| &r.cells[idx]).collect())
    }

    /// Add a column computed from each row.
    ///
    /// An existing column with the same name is overwritten in place.
    pub fn derive<F>(&mut self, name: &str, mut f: F)
    where
        F: FnMut(&[String], &Row) -> Cell,
    {
        let values: Vec<Cell> = self.rows.iter().map(|row| f(&self.columns, row)).collect();
        match self.position(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.cells[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.cells.push(value);
                }
            }
        }
    }

    /// Fallible variant of [`Table::derive`]; stops at the first error.
    pub fn try_derive<F, E>(&mut self, name: &str, mut f: F) -> Result<(), E>
    where
        F: FnMut(&[String], &Row) -> Result<Cell, E>,
    {
        let mut values = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            values.push(f(&self.columns, row)?);
        }
        let mut values = values.into_iter();
        self.derive(name, |_, _| values.next().unwrap_or(Cell::Null));
        Ok(())
    }

    /// Remove columns by name. Returns the names that were not present.
    pub fn drop_columns(&mut self, names: &[&str]) -> Vec<String> {
        let missing: Vec<String> = names
            .iter()
            .filter(|n| !self.has_column(n))
            .map(|n| n.to_string())
            .collect();

        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !names.contains(&c.as_str()))
            .collect();

        let mut flags = keep.iter();
        self.columns.retain(|_| *flags.next().unwrap_or(&true));
        for row in &mut self.rows {
            let mut flags = keep.iter();
            row.cells.retain(|_| *flags.next().unwrap_or(&true));
        }
        missing
    }

    /// Rename several columns at once; each column is renamed by the first
    /// mapping entry whose source matches it. Returns the sources that
    /// matched no column.
    pub fn rename_columns(&mut self, mapping: &[(&str, &str)]) -> Vec<String> {
        let missing = mapping
            .iter()
            .filter(|(from, _)| !self.has_column(from))
            .map(|(from, _)| from.to_string())
            .collect();
        for column in &mut self.columns {
            if let Some((_, to)) = mapping.iter().find(|(from, _)| *from == column.as_str()) {
                *column = to.to_string();
            }
        }
        missing
    }

    /// Rewrite every cell of a column in place; stops at the first error.
    pub fn try_map_column<F, E>(&mut self, column: &str, mut f: F) -> Result<bool, E>
    where
        F: FnMut(&Row, &Cell) -> Result<Cell, E>,
    {
        let idx = match self.position(column) {
            Some(idx) => idx,
            None => return Ok(false),
        };
        for row in &mut self.rows {
            let value = f(&*row, &row.cells[idx])?;
            row.cells[idx] = value;
        }
        Ok(true)
    }

    /// Reorder columns to `order`, which must be a permutation of the
    /// current columns.
    pub fn reorder(&mut self, order: &[String]) -> bool {
        if order.len() != self.columns.len() {
            return false;
        }
        let Some(indices) = order
            .iter()
            .map(|c| self.position(c))
            .collect::<Option<Vec<usize>>>()
        else {
            return false;
        };
        for row in &mut self.rows {
            row.cells = indices.iter().map(|&i| row.cells[i].clone()).collect();
        }
        self.columns = order.to_vec();
        true
    }
}

impl Row {
    /// Cell under `column` according to `columns`.
    pub fn get<'a>(&'a self, columns: &[String], column: &str) -> Option<&'a Cell> {
        columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.cells.get(idx))
    }
}

impl Serialize for Table {
    /// Serializes as an array of objects whose keys follow column order.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::{SerializeMap, SerializeSeq};

        struct RowView<'a>(&'a [String], &'a Row);

        impl Serialize for RowView<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (col, cell) in self.0.iter().zip(&self.1.cells) {
                    map.serialize_entry(col, cell)?;
                }
                map.end()
            }
        }

        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&RowView(&self.columns, row))?;
        }
        seq.end()
    }
}
