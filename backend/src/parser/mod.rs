//! Export parser with encoding auto-detection.
//!
//! Turns the raw bytes of one exported table into a typed [`Table`],
//! applying a [`ReadConfig`]: per-column converters and date columns.
//! Unlisted columns stay text; blank fields are always null.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{LoadError, LoadResult};
use crate::models::{Cell, RowOrigin, Table};
use crate::normalize;

/// Conversion applied to a column's raw text at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    /// Uppercased text.
    Upper,
    /// Legacy boolean encoding; anything unrecognized is malformed.
    Boolean,
    /// Whole number.
    Integer,
    /// Decimal number.
    Decimal,
}

/// How to type the columns of one legacy table family.
#[derive(Debug, Clone, Copy)]
pub struct ReadConfig {
    pub converters: &'static [(&'static str, Converter)],
    pub dates: &'static [&'static str],
}

impl ReadConfig {
    /// Every column this config names.
    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.converters
            .iter()
            .map(|(c, _)| *c)
            .chain(self.dates.iter().copied())
    }
}

/// mdb-export writes `MM/DD/YY HH:MM:SS`; hand-made exports vary.
const DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%m/%d/%y", "%m/%d/%Y", "%Y-%m-%d"];

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the given encoding.
///
/// Valid UTF-8 always decodes as UTF-8; Access exports are frequently
/// Windows-1252, which is used for anything else the detector names.
/// ISO-8859-1 decodes as Windows-1252, its superset for printable bytes.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).into_owned(),
        _ => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
    }
}

/// Parse one exported table.
///
/// `table` names the source in errors and row origins.
pub fn parse_table(table: &str, bytes: &[u8], config: &ReadConfig) -> LoadResult<Table> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    parse_str(table, &content, config)
}

/// Parse already-decoded export text.
pub fn parse_str(table: &str, content: &str, config: &ReadConfig) -> LoadResult<Table> {
    let malformed = |line: usize, message: String| LoadError::MalformedRow {
        table: table.to_string(),
        line,
        column: None,
        value: None,
        message,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| malformed(0, format!("cannot read header: {}", e)))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(malformed(0, "export has no header row".to_string()));
    }

    for column in config.columns() {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
    }

    let kinds: Vec<ColumnKind> = headers
        .iter()
        .map(|h| ColumnKind::for_column(h, config))
        .collect();

    let mut result = Table::new(headers.clone());

    // Physical line a record starts on; quoted fields may span lines.
    let mut next_line = 2;
    for record in reader.records() {
        let record = record.map_err(|e| {
            let line = e.position().map_or(next_line, |p| p.line() as usize);
            malformed(line, e.to_string())
        })?;
        let line = record.position().map_or(next_line, |p| p.line() as usize);
        next_line = line + 1;

        let mut cells = Vec::with_capacity(headers.len());
        for ((raw, kind), column) in record.iter().zip(&kinds).zip(&headers) {
            let cell = kind.convert(raw).map_err(|message| LoadError::MalformedRow {
                table: table.to_string(),
                line,
                column: Some(column.clone()),
                value: Some(raw.to_string()),
                message,
            })?;
            cells.push(cell);
        }

        result.push(
            RowOrigin {
                table: table.to_string(),
                line,
            },
            cells,
        );
    }

    Ok(result)
}

#[derive(Debug, Clone, Copy)]
enum ColumnKind {
    Text,
    Date,
    Converted(Converter),
}

impl ColumnKind {
    fn for_column(column: &str, config: &ReadConfig) -> Self {
        if let Some((_, conv)) = config.converters.iter().find(|(c, _)| *c == column) {
            ColumnKind::Converted(*conv)
        } else if config.dates.contains(&column) {
            ColumnKind::Date
        } else {
            ColumnKind::Text
        }
    }

    fn convert(&self, raw: &str) -> Result<Cell, String> {
        if raw.trim().is_empty() {
            return Ok(Cell::Null);
        }
        match self {
            ColumnKind::Text => Ok(Cell::Text(raw.to_string())),
            ColumnKind::Date => parse_date(raw)
                .map(Cell::Date)
                .ok_or_else(|| "not a recognized date".to_string()),
            ColumnKind::Converted(Converter::Upper) => {
                Ok(Cell::from_text(normalize::upper(Some(raw.trim()))))
            }
            ColumnKind::Converted(Converter::Boolean) => normalize::boolean(Some(raw))
                .map(Cell::Bool)
                .ok_or_else(|| "not a boolean".to_string()),
            ColumnKind::Converted(Converter::Integer) => parse_number(raw)
                .and_then(|n| {
                    (n.fract() == 0.0 && n.abs() < i64::MAX as f64).then_some(n as i64)
                })
                .map(Cell::Integer)
                .ok_or_else(|| "not a whole number".to_string()),
            ColumnKind::Converted(Converter::Decimal) => parse_number(raw)
                .map(Cell::Decimal)
                .ok_or_else(|| "not a number".to_string()),
        }
    }
}

/// Numbers may carry a currency sign or thousands separators.
fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a legacy date or date-time.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
