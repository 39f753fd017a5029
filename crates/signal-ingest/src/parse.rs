//! Numeric Cell Coercion

use serde::{Deserialize, Serialize};

/// Why a cell could not be used as a number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseFailure {
    /// Blank cell
    Empty,
    /// Text that is not a number
    NotANumber,
    /// Parsed, but NaN or infinite
    NonFinite,
}

/// Coerce a single cell to a finite float.
///
/// Surrounding whitespace is ignored. Explicit `nan`/`inf` spellings parse but are
/// rejected, since they would poison normalization downstream.
pub fn parse_numeric(cell: &str) -> Result<f64, ParseFailure> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Err(ParseFailure::Empty);
    }

    let value: f64 = trimmed.parse().map_err(|_| ParseFailure::NotANumber)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParseFailure::NonFinite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_numbers() {
        assert_eq!(parse_numeric("1"), Ok(1.0));
        assert_eq!(parse_numeric(" -2.5 "), Ok(-2.5));
        assert_eq!(parse_numeric("+3e2"), Ok(300.0));
    }

    #[test]
    fn test_parse_failures() {
        assert_eq!(parse_numeric(""), Err(ParseFailure::Empty));
        assert_eq!(parse_numeric("   "), Err(ParseFailure::Empty));
        assert_eq!(parse_numeric("abc"), Err(ParseFailure::NotANumber));
        assert_eq!(parse_numeric("1,5"), Err(ParseFailure::NotANumber));
        assert_eq!(parse_numeric("nan"), Err(ParseFailure::NonFinite));
        assert_eq!(parse_numeric("inf"), Err(ParseFailure::NonFinite));
    }
}
