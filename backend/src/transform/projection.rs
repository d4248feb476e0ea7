//! Projection steps shared by every entity.
//!
//! A [`Projector`] owns a private copy of the working table and applies
//! the four steps in order: derive, drop, rename, massage. Every step is
//! strictly row-wise, so the output has exactly one row per input row.

use std::collections::HashMap;

use crate::error::{NormalizeResult, ProjectionError, ProjectionResult};
use crate::models::{Cell, Row, Table};
use crate::normalize::{CodeBook, Lookup};

/// Builder over a copy of the working table.
pub struct Projector<'a> {
    entity: &'static str,
    table: Table,
    derived: Vec<String>,
    codes: &'a CodeBook,
}

impl<'a> Projector<'a> {
    pub fn new(entity: &'static str, input: &Table, codes: &'a CodeBook) -> Self {
        Self {
            entity,
            table: input.clone(),
            derived: Vec::new(),
            codes,
        }
    }

    /// Add a column computed from the whole row.
    pub fn derive<F>(&mut self, name: &str, f: F)
    where
        F: FnMut(&[String], &Row) -> Cell,
    {
        self.table.derive(name, f);
        self.derived.push(name.to_string());
    }

    /// Add a column computed from one existing column.
    pub fn derive_from<F>(&mut self, name: &str, from: &str, f: F) -> ProjectionResult<()>
    where
        F: Fn(&Cell) -> NormalizeResult<Cell>,
    {
        self.require(from)?;
        let entity = self.entity;
        let null = Cell::Null;
        self.table.try_derive(name, |columns, row| {
            let cell = row.get(columns, from).unwrap_or(&null);
            f(cell).map_err(|source| ProjectionError::Projection {
                entity: entity.to_string(),
                table: row.origin.table.clone(),
                line: row.origin.line,
                column: from.to_string(),
                source,
            })
        })?;
        self.derived.push(name.to_string());
        Ok(())
    }

    /// Remove columns that have no place in the target schema.
    pub fn drop(&mut self, columns: &[&str]) -> ProjectionResult<()> {
        let missing = self.table.drop_columns(columns);
        if let Some(column) = missing.into_iter().next() {
            return Err(self.missing(column));
        }
        self.derived.retain(|d| !columns.contains(&d.as_str()));
        Ok(())
    }

    /// Rename every surviving legacy column.
    ///
    /// Each mapping source must exist, and every column not added by a
    /// derive step must be covered by the mapping.
    pub fn rename(&mut self, mapping: &[(&str, &str)]) -> ProjectionResult<()> {
        if let Some(column) = self
            .table
            .columns()
            .iter()
            .find(|c| !self.derived.contains(c) && !mapping.iter().any(|(from, _)| *from == c.as_str()))
        {
            return Err(ProjectionError::UnmappedColumn {
                entity: self.entity.to_string(),
                column: column.clone(),
            });
        }

        let missing = self.table.rename_columns(mapping);
        if let Some(column) = missing.into_iter().next() {
            return Err(self.missing(column));
        }
        Ok(())
    }

    /// Rewrite a column cell by cell.
    pub fn map<F>(&mut self, column: &str, mut f: F) -> ProjectionResult<()>
    where
        F: FnMut(&Cell) -> Cell,
    {
        self.try_map(column, |cell| Ok(f(cell)))
    }

    /// Rewrite a column cell by cell; the first failure names its row.
    pub fn try_map<F>(&mut self, column: &str, mut f: F) -> ProjectionResult<()>
    where
        F: FnMut(&Cell) -> NormalizeResult<Cell>,
    {
        let entity = self.entity;
        let found = self.table.try_map_column(column, |row, cell| {
            f(cell).map_err(|source| ProjectionError::Projection {
                entity: entity.to_string(),
                table: row.origin.table.clone(),
                line: row.origin.line,
                column: column.to_string(),
                source,
            })
        })?;
        if found {
            Ok(())
        } else {
            Err(self.missing(column.to_string()))
        }
    }

    /// Map a column through a code-book lookup.
    pub fn lookup(&mut self, column: &str, lookup: Lookup) -> ProjectionResult<()> {
        let codes = self.codes;
        self.try_map(column, |cell| codes.apply(lookup, cell))
    }

    /// Where `column` is blank, copy the value of `from` on the same row.
    pub fn fallback_to_column(&mut self, column: &str, from: &str) -> ProjectionResult<()> {
        self.require(column)?;
        let values = self
            .table
            .column(from)
            .ok_or_else(|| self.missing(from.to_string()))?
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();
        let mut values = values.into_iter();
        self.map(column, |cell| {
            let other = values.next().unwrap_or(Cell::Null);
            if cell.is_blank() {
                other
            } else {
                cell.clone()
            }
        })
    }

    /// Where `column` is blank, substitute a literal.
    pub fn fallback_to_literal(&mut self, column: &str, literal: &str) -> ProjectionResult<()> {
        self.map(column, |cell| {
            if cell.is_blank() {
                Cell::from(literal)
            } else {
                cell.clone()
            }
        })
    }

    /// Fail if a non-blank value of `column` occurs on two rows.
    pub fn ensure_unique(&self, column: &str) -> ProjectionResult<()> {
        let idx = self
            .table
            .position(column)
            .ok_or_else(|| self.missing(column.to_string()))?;

        let mut seen: HashMap<String, &Row> = HashMap::new();
        for row in self.table.rows() {
            let Some(key) = row.cells[idx].as_code() else {
                continue;
            };
            if let Some(first) = seen.get(&key) {
                return Err(ProjectionError::DuplicateKey {
                    entity: self.entity.to_string(),
                    column: column.to_string(),
                    key,
                    first: first.origin.to_string(),
                    second: row.origin.to_string(),
                });
            }
            seen.insert(key, row);
        }
        Ok(())
    }

    pub fn finish(self) -> Table {
        self.table
    }

    fn require(&self, column: &str) -> ProjectionResult<()> {
        if self.table.has_column(column) {
            Ok(())
        } else {
            Err(self.missing(column.to_string()))
        }
    }

    fn missing(&self, column: String) -> ProjectionError {
        ProjectionError::MissingColumn {
            entity: self.entity.to_string(),
            column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RowOrigin;

    fn table() -> Table {
        let mut table = Table::new(vec!["code".into(), "name".into(), "alt".into()]);
        for (i, (code, name)) in [("O", "Ann"), ("C", ""), ("O", "Cy")].iter().enumerate() {
            table.push(
                RowOrigin {
                    table: "T".into(),
                    line: i + 1,
                },
                vec![Cell::from(*code), Cell::from(*name), Cell::from(format!("alt{}", i))],
            );
        }
        table
    }

    #[test]
    fn test_rename_must_be_total() {
        let codes = CodeBook::default();
        let input = table();
        let mut p = Projector::new("Test", &input, &codes);
        p.derive("extra", |_, _| Cell::Null);
        let err = p.rename(&[("code", "Status"), ("name", "Name")]).unwrap_err();
        assert!(matches!(err, ProjectionError::UnmappedColumn { ref column, .. } if column == "alt"));

        let mut p = Projector::new("Test", &input, &codes);
        p.derive("extra", |_, _| Cell::Null);
        p.rename(&[("code", "Status"), ("name", "Name"), ("alt", "Alt")]).unwrap();
        assert_eq!(p.finish().columns(), &["Status", "Name", "Alt", "extra"]);
    }

    #[test]
    fn test_drop_missing_column() {
        let codes = CodeBook::default();
        let input = table();
        let mut p = Projector::new("Test", &input, &codes);
        let err = p.drop(&["alt", "ghost"]).unwrap_err();
        assert!(matches!(err, ProjectionError::MissingColumn { ref column, .. } if column == "ghost"));
    }

    #[test]
    fn test_lookup_and_fallbacks() {
        let codes = CodeBook::default();
        let input = table();
        let mut p = Projector::new("Test", &input, &codes);
        p.lookup("code", Lookup::Status).unwrap();
        p.fallback_to_column("name", "alt").unwrap();
        let out = p.finish();
        assert_eq!(out.get(0, "code"), Some(&Cell::from("Open")));
        assert_eq!(out.get(1, "code"), Some(&Cell::from("Complete")));
        assert_eq!(out.get(1, "name"), Some(&Cell::from("alt1")));
        assert_eq!(out.get(2, "name"), Some(&Cell::from("Cy")));
        assert_eq!(out.len(), input.len());
    }

    #[test]
    fn test_lookup_failure_names_row() {
        let codes = CodeBook::default();
        let input = table();
        let mut p = Projector::new("Test", &input, &codes);
        let err = p.lookup("name", Lookup::Status).unwrap_err();
        match err {
            ProjectionError::Projection { line, column, source, .. } => {
                assert_eq!(line, 1);
                assert_eq!(column, "name");
                assert!(source.to_string().contains("'Ann'"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_ensure_unique() {
        let codes = CodeBook::default();
        let input = table();
        let p = Projector::new("Test", &input, &codes);
        assert!(p.ensure_unique("alt").is_ok());
        match p.ensure_unique("code").unwrap_err() {
            ProjectionError::DuplicateKey { key, first, second, .. } => {
                assert_eq!(key, "O");
                assert_eq!(first, "T line 1");
                assert_eq!(second, "T line 3");
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
