//! Coded-value lookups.
//!
//! The legacy database stores many attributes as short, inconsistently
//! cased codes. Each [`Lookup`] is a closed table from code to display
//! label; an unknown code is an error so that bad source data surfaces
//! during the run.
//!
//! The built-in tables are the shop's defaults. An operator can replace
//! them with a JSON file of the same shape:
//!
//! ```json
//! { "status": { "O": "Open", "C": "Complete" }, "discount": { ... }, ... }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::{CodeBookError, NormalizeError, NormalizeResult};
use crate::models::Cell;

/// The coded attributes of the legacy schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Lookup {
    AccountCategory,
    Source,
    DeliveryLocation,
    OrderLocation,
    Status,
    Salesperson,
    Discount,
    Join,
    MatMfg,
    SalesType,
    SalesCategory,
}

impl Lookup {
    pub const ALL: [Lookup; 11] = [
        Lookup::AccountCategory,
        Lookup::Source,
        Lookup::DeliveryLocation,
        Lookup::OrderLocation,
        Lookup::Status,
        Lookup::Salesperson,
        Lookup::Discount,
        Lookup::Join,
        Lookup::MatMfg,
        Lookup::SalesType,
        Lookup::SalesCategory,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Lookup::AccountCategory => "account_category",
            Lookup::Source => "source",
            Lookup::DeliveryLocation => "delivery_location",
            Lookup::OrderLocation => "order_location",
            Lookup::Status => "status",
            Lookup::Salesperson => "salesperson",
            Lookup::Discount => "discount",
            Lookup::Join => "join",
            Lookup::MatMfg => "matmfg",
            Lookup::SalesType => "sales_type",
            Lookup::SalesCategory => "sales_category",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.name() == name)
    }

    fn defaults(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Lookup::AccountCategory => &[
                ("R", "Retail"),
                ("D", "Designer"),
                ("C", "Corporate"),
                ("G", "Gallery"),
                ("A", "Artist"),
                ("I", "Institution"),
                ("T", "Trade"),
            ],
            Lookup::Source => &[
                ("WI", "Walk In"),
                ("RE", "Referral"),
                ("RC", "Repeat Customer"),
                ("AD", "Advertisement"),
                ("YP", "Yellow Pages"),
                ("WEB", "Website"),
                ("DS", "Designer"),
            ],
            Lookup::DeliveryLocation => &[
                ("S", "Shop"),
                ("W", "Workroom"),
                ("D", "Delivered"),
                ("I", "Installed"),
                ("M", "Mailed"),
            ],
            Lookup::OrderLocation => &[("S", "Shop"), ("W", "Workroom"), ("O", "Off Site")],
            Lookup::Status => &[
                ("O", "Open"),
                ("IP", "In Progress"),
                ("R", "Ready"),
                ("P", "Picked Up"),
                ("C", "Complete"),
                ("H", "On Hold"),
                ("X", "Cancelled"),
            ],
            Lookup::Salesperson => &[("HS", "House Sale"), ("WEB", "Web Order")],
            Lookup::Discount => &[
                ("0", "No Discount"),
                ("10", "10% Discount"),
                ("15", "15% Discount"),
                ("20", "20% Discount"),
                ("25", "25% Discount"),
                ("TR", "Trade Discount"),
                ("DS", "Designer Discount"),
                ("EMP", "Employee Discount"),
            ],
            Lookup::Join => &[
                ("J", "Joined"),
                ("C", "Chop Only"),
                ("L", "Length"),
                ("RM", "Ready Made"),
            ],
            Lookup::MatMfg => &[
                ("A", "Artique"),
                ("B", "Bainbridge"),
                ("C", "Crescent"),
                ("P", "Peterboro"),
                ("R", "Rising"),
            ],
            Lookup::SalesType => &[
                ("F", "Frame"),
                ("M", "Mat"),
                ("G", "Glass"),
                ("FIT", "Fitting"),
                ("R", "Repair"),
                ("RM", "Ready Made"),
                ("O", "Other"),
            ],
            Lookup::SalesCategory => &[
                ("CF", "Custom Framing"),
                ("RF", "Ready-Made Frames"),
                ("RP", "Repairs"),
                ("AR", "Art"),
                ("MI", "Miscellaneous"),
            ],
        }
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// All lookup tables, keyed by lookup name then normalized code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeBook {
    tables: BTreeMap<String, BTreeMap<String, String>>,
}

impl Default for CodeBook {
    fn default() -> Self {
        let tables = Lookup::ALL
            .iter()
            .map(|lookup| {
                let table = lookup
                    .defaults()
                    .iter()
                    .map(|(code, label)| (normalize_code(code), label.to_string()))
                    .collect();
                (lookup.name().to_string(), table)
            })
            .collect();
        Self { tables }
    }
}

/// Codes compare trimmed and case-insensitively.
fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl CodeBook {
    /// Parse a code book from JSON. It must define exactly the known lookups.
    pub fn from_json(json: &str) -> Result<Self, CodeBookError> {
        let raw: BTreeMap<String, BTreeMap<String, String>> = serde_json::from_str(json)?;

        let missing: Vec<String> = Lookup::ALL
            .iter()
            .filter(|l| !raw.contains_key(l.name()))
            .map(|l| l.name().to_string())
            .collect();
        let unknown: Vec<String> = raw
            .keys()
            .filter(|k| Lookup::from_name(k).is_none())
            .cloned()
            .collect();
        if !missing.is_empty() || !unknown.is_empty() {
            return Err(CodeBookError::LookupMismatch { missing, unknown });
        }

        let tables = raw
            .into_iter()
            .map(|(name, table)| {
                let table = table
                    .into_iter()
                    .map(|(code, label)| (normalize_code(&code), label))
                    .collect();
                (name, table)
            })
            .collect();
        Ok(Self { tables })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CodeBookError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Built-in defaults, or the file when one is given.
    pub fn load(path: Option<&Path>) -> Result<Self, CodeBookError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Entries of one lookup, sorted by code.
    pub fn entries(&self, lookup: Lookup) -> Vec<(&str, &str)> {
        self.tables
            .get(lookup.name())
            .map(|t| t.iter().map(|(c, l)| (c.as_str(), l.as_str())).collect())
            .unwrap_or_default()
    }

    /// Canonical label for a code.
    pub fn label(&self, lookup: Lookup, code: &str) -> NormalizeResult<&str> {
        self.tables
            .get(lookup.name())
            .and_then(|t| t.get(&normalize_code(code)))
            .map(String::as_str)
            .ok_or_else(|| NormalizeError::UnknownCode {
                lookup: lookup.name().to_string(),
                code: code.to_string(),
            })
    }

    /// Map a cell through a lookup; blank stays null.
    pub fn apply(&self, lookup: Lookup, cell: &Cell) -> NormalizeResult<Cell> {
        match cell.as_code() {
            None => Ok(Cell::Null),
            Some(code) => self.label(lookup, &code).map(Cell::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_labels_case_insensitive() {
        let book = CodeBook::default();
        assert_eq!(book.label(Lookup::Status, "o"), Ok("Open"));
        assert_eq!(book.label(Lookup::Status, " IP "), Ok("In Progress"));
        assert_eq!(book.label(Lookup::MatMfg, "b"), Ok("Bainbridge"));
    }

    #[test]
    fn test_unknown_code_is_named() {
        let book = CodeBook::default();
        let err = book.label(Lookup::SalesCategory, "ZZ").unwrap_err();
        assert_eq!(
            err,
            NormalizeError::UnknownCode {
                lookup: "sales_category".into(),
                code: "ZZ".into()
            }
        );
        assert!(err.to_string().contains("'ZZ'"));
    }

    #[test]
    fn test_apply_cells() {
        let book = CodeBook::default();
        assert_eq!(book.apply(Lookup::Discount, &Cell::Null), Ok(Cell::Null));
        assert_eq!(book.apply(Lookup::Discount, &Cell::from(" ")), Ok(Cell::Null));
        assert_eq!(
            book.apply(Lookup::Discount, &Cell::Integer(10)),
            Ok(Cell::from("10% Discount"))
        );
        assert_eq!(
            book.apply(Lookup::Join, &Cell::from("j")),
            Ok(Cell::from("Joined"))
        );
    }

    #[test]
    fn test_every_lookup_has_defaults() {
        let book = CodeBook::default();
        for lookup in Lookup::ALL {
            assert!(!book.entries(lookup).is_empty(), "{}", lookup);
            assert_eq!(Lookup::from_name(lookup.name()), Some(lookup));
        }
    }

    #[test]
    fn test_json_round_trip_and_file() {
        let book = CodeBook::default();
        let json = book.to_json().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codes.json");
        std::fs::write(&path, &json).unwrap();

        let loaded = CodeBook::load(Some(&path)).unwrap();
        assert_eq!(loaded, book);
    }

    #[test]
    fn test_custom_book_normalizes_codes() {
        let mut raw: BTreeMap<String, BTreeMap<String, String>> = Lookup::ALL
            .iter()
            .map(|l| (l.name().to_string(), BTreeMap::new()))
            .collect();
        raw.get_mut("salesperson")
            .unwrap()
            .insert("jd".into(), "Jane Doe".into());

        let book = CodeBook::from_json(&serde_json::to_string(&raw).unwrap()).unwrap();
        assert_eq!(book.label(Lookup::Salesperson, "JD"), Ok("Jane Doe"));
        assert!(book.label(Lookup::Status, "O").is_err());
    }

    #[test]
    fn test_custom_book_lookup_mismatch() {
        let err = CodeBook::from_json(r#"{"status": {}, "colour": {}}"#).unwrap_err();
        match err {
            CodeBookError::LookupMismatch { missing, unknown } => {
                assert!(missing.contains(&"discount".to_string()));
                assert_eq!(unknown, vec!["colour".to_string()]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
