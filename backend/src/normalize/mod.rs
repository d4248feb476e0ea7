//! Value normalizers.
//!
//! Small pure functions from a raw legacy value to a cleaned or derived
//! value. All of them accept a missing value.
//!
//! - [`upper`], [`boolean`], [`replace_newline`] - field cleanup
//! - [`legacy_record`], [`legacy_order_id`] - whole-row derivations
//! - [`codes`] - coded-value lookups that fail on unknown codes
//! - [`dimension`] - decimal inches to whole inches plus a fraction

pub mod codes;
pub mod dimension;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Cell, Row};

pub use codes::{CodeBook, Lookup};
pub use dimension::{decompose, fraction, inches, Dimension};

/// Column holding the legacy order number.
pub const ORDER_NUMBER_COLUMN: &str = "OrderNo";

/// Column holding the frame number that disambiguates order lines.
pub const FRAME_NUMBER_COLUMN: &str = "FrameNo";

const TRUE_VALUES: &[&str] = &["y", "yes", "t", "true", "1", "-1"];
const FALSE_VALUES: &[&str] = &["n", "no", "f", "false", "0"];

static LINE_BREAKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]*[\r\n]+[ \t]*").expect("valid line break pattern"));

/// Uppercase an identifier.
pub fn upper(value: Option<&str>) -> Option<String> {
    value.map(str::to_uppercase)
}

/// Parse a legacy truthy/falsy encoding.
///
/// Accepts `Y`/`N`, `yes`/`no`, `T`/`F`, `true`/`false`, `1`/`0` and the
/// Access `-1` for true, case-insensitively. Blank or anything else is `None`.
pub fn boolean(value: Option<&str>) -> Option<bool> {
    let lower = value?.trim().to_lowercase();
    if TRUE_VALUES.contains(&lower.as_str()) {
        Some(true)
    } else if FALSE_VALUES.contains(&lower.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Collapse embedded line breaks into single spaces.
pub fn replace_newline(value: Option<&str>) -> Option<String> {
    value.map(|s| LINE_BREAKS.replace_all(s, " ").trim().to_string())
}

/// [`replace_newline`] over a cell; non-text cells pass through and text
/// left empty becomes null.
pub fn replace_newline_cell(cell: &Cell) -> Cell {
    match cell {
        Cell::Text(s) => Cell::from_text(replace_newline(Some(s)).filter(|t| !t.is_empty())),
        other => other.clone(),
    }
}

/// Snapshot of every original field as `Label: value` lines.
pub fn legacy_record(columns: &[String], row: &Row) -> String {
    columns
        .iter()
        .zip(&row.cells)
        .map(|(label, cell)| format!("{}: {}", label, cell))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Composite order identifier: `OrderNo-FrameNo`.
///
/// One legacy order number can cover several frames, so the frame number
/// is appended. A row without a frame number keeps the bare order number;
/// a row without an order number has no identifier.
pub fn legacy_order_id(columns: &[String], row: &Row) -> Option<String> {
    let order = row
        .get(columns, ORDER_NUMBER_COLUMN)
        .and_then(Cell::as_code)?;
    let order = order.trim();

    match row.get(columns, FRAME_NUMBER_COLUMN).and_then(Cell::as_code) {
        Some(frame) => Some(format!("{}-{}", order, frame.trim())),
        None => Some(order.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RowOrigin;

    fn row(cells: Vec<Cell>) -> Row {
        Row {
            origin: RowOrigin {
                table: "FrameOrders".into(),
                line: 1,
            },
            cells,
        }
    }

    #[test]
    fn test_upper() {
        assert_eq!(upper(Some("c100")), Some("C100".to_string()));
        assert_eq!(upper(None), None);
    }

    #[test]
    fn test_boolean_encodings() {
        assert_eq!(boolean(Some("Y")), Some(true));
        assert_eq!(boolean(Some("n")), Some(false));
        assert_eq!(boolean(Some("1")), Some(true));
        assert_eq!(boolean(Some("0")), Some(false));
        assert_eq!(boolean(Some(" -1 ")), Some(true));
        assert_eq!(boolean(Some("maybe")), None);
        assert_eq!(boolean(Some("")), None);
        assert_eq!(boolean(None), None);
    }

    #[test]
    fn test_boolean_canonical_outputs_map_to_themselves() {
        for b in [true, false] {
            assert_eq!(boolean(Some(&b.to_string())), Some(b));
        }
    }

    #[test]
    fn test_replace_newline() {
        assert_eq!(
            replace_newline(Some("12 Main St\r\nApt 4")),
            Some("12 Main St Apt 4".to_string())
        );
        assert_eq!(
            replace_newline(Some("a \n\n b\nc\n")),
            Some("a b c".to_string())
        );
        assert_eq!(replace_newline(Some("plain")), Some("plain".to_string()));
        assert_eq!(replace_newline(None), None);
        assert_eq!(replace_newline_cell(&Cell::Integer(3)), Cell::Integer(3));
    }

    #[test]
    fn test_replace_newline_cell_empties_to_null() {
        assert_eq!(replace_newline_cell(&Cell::from("\r\n")), Cell::Null);
        assert_eq!(replace_newline_cell(&Cell::from(" \n\t")), Cell::Null);
        assert_eq!(replace_newline_cell(&Cell::from("a\nb")), Cell::from("a b"));
    }

    #[test]
    fn test_legacy_record() {
        let columns = vec!["Customer Number".to_string(), "Name".to_string(), "Credit".to_string()];
        let r = row(vec!["C100".into(), Cell::Null, Cell::Bool(true)]);
        assert_eq!(
            legacy_record(&columns, &r),
            "Customer Number: C100\nName: \nCredit: true"
        );
    }

    #[test]
    fn test_legacy_order_id() {
        let columns = vec![ORDER_NUMBER_COLUMN.to_string(), FRAME_NUMBER_COLUMN.to_string()];
        assert_eq!(
            legacy_order_id(&columns, &row(vec!["O55".into(), "F1".into()])),
            Some("O55-F1".to_string())
        );
        assert_eq!(
            legacy_order_id(&columns, &row(vec!["O55".into(), Cell::Null])),
            Some("O55".to_string())
        );
        assert_eq!(
            legacy_order_id(&columns, &row(vec![Cell::Null, "F1".into()])),
            None
        );
        assert_eq!(
            legacy_order_id(&columns, &row(vec!["O55".into(), Cell::Integer(2)])),
            Some("O55-2".to_string())
        );
    }
}
