//! Frame dimensions.
//!
//! The legacy system stores sizes as decimal inches (`24.25`). The new
//! system wants whole inches and a shop fraction (`24`, `"1/4"`), rounded
//! to the nearest sixteenth.

use crate::error::{NormalizeError, NormalizeResult};
use crate::models::Cell;

/// Finest fraction used in the shop.
pub const DENOMINATOR: i64 = 16;

/// Largest sixteenth count an `f64` holds exactly.
const MAX_SIXTEENTHS: f64 = 9_007_199_254_740_992.0;

/// Whole inches plus a reduced fraction (none when the size is whole).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub whole: i64,
    pub numerator: i64,
    pub denominator: i64,
}

impl Dimension {
    pub fn fraction(&self) -> Option<String> {
        if self.numerator == 0 {
            None
        } else {
            Some(format!("{}/{}", self.numerator, self.denominator))
        }
    }

    pub fn to_f64(&self) -> f64 {
        self.whole as f64 + self.numerator as f64 / self.denominator as f64
    }
}

/// Split a decimal inch value.
pub fn decompose(value: f64) -> NormalizeResult<Dimension> {
    if !value.is_finite() || value < 0.0 {
        return Err(NormalizeError::InvalidDimension {
            value: value.to_string(),
        });
    }

    let scaled = (value * DENOMINATOR as f64).round();
    if scaled > MAX_SIXTEENTHS {
        return Err(NormalizeError::InvalidDimension {
            value: value.to_string(),
        });
    }
    let sixteenths = scaled as i64;
    let whole = sixteenths / DENOMINATOR;
    let rest = sixteenths % DENOMINATOR;
    let divisor = gcd(rest, DENOMINATOR);

    Ok(Dimension {
        whole,
        numerator: rest / divisor,
        denominator: DENOMINATOR / divisor,
    })
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a.max(1)
    } else {
        gcd(b, a % b)
    }
}

fn decompose_cell(cell: &Cell) -> NormalizeResult<Option<Dimension>> {
    if cell.is_blank() {
        return Ok(None);
    }
    let value = cell.as_f64().ok_or_else(|| NormalizeError::InvalidDimension {
        value: cell.to_string(),
    })?;
    decompose(value).map(Some)
}

/// Whole-inch part of a dimension cell; null stays null.
pub fn inches(cell: &Cell) -> NormalizeResult<Cell> {
    Ok(decompose_cell(cell)?
        .map(|d| Cell::Integer(d.whole))
        .unwrap_or(Cell::Null))
}

/// Fraction part of a dimension cell; null when null or whole.
pub fn fraction(cell: &Cell) -> NormalizeResult<Cell> {
    Ok(Cell::from_text(decompose_cell(cell)?.and_then(|d| d.fraction())))
}

/// Parse a fraction string produced by [`fraction`] back to a number.
pub fn fraction_value(fraction: &str) -> Option<f64> {
    let (num, den) = fraction.split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    (den != 0.0).then(|| num / den)
}
