//! Typed cell values and text-to-type conversion.
//!
//! Inference and loading share these predicates, so a value accepted while
//! sampling always converts the same way during the load.

use std::fmt;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use thiserror::Error;

use crate::column::ColumnType;

/// Largest DECIMAL precision a column may be inferred with.
pub const MAX_DECIMAL_PRECISION: u32 = 38;

static INTEGER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+$").expect("integer pattern compiles"));

static DECIMAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$")
        .expect("decimal pattern compiles")
});

/// Returns true when `value` is an optionally negative run of digits that fits
/// a 64-bit signed integer.
pub fn is_integer(value: &str) -> bool {
    INTEGER_PATTERN.is_match(value) && value.parse::<i64>().is_ok()
}

/// Exact decimal literal, normalized to plain positional notation.
///
/// Exponent notation is shifted into the digits (`1.5e3` becomes `1500`), so
/// precision and scale describe the value as it would be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalLiteral {
    negative: bool,
    /// Integer digits without leading zeros (empty for values below one).
    integer: String,
    /// Fractional digits as written, trailing zeros included.
    fraction: String,
}

impl DecimalLiteral {
    /// Parses a fixed- or floating-point literal. Returns `None` for anything
    /// else, including `NaN` and infinities.
    pub fn parse(value: &str) -> Option<Self> {
        if !DECIMAL_PATTERN.is_match(value) {
            return None;
        }

        let (negative, unsigned) = match value.as_bytes().first() {
            Some(b'-') => (true, &value[1..]),
            Some(b'+') => (false, &value[1..]),
            _ => (false, value),
        };

        let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
            Some(pos) => (&unsigned[..pos], unsigned[pos + 1..].parse::<i64>().ok()?),
            None => (unsigned, 0),
        };
        if exponent.unsigned_abs() > u64::from(2 * MAX_DECIMAL_PRECISION) {
            return None;
        }

        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        let digits = format!("{int_part}{frac_part}");
        let point = int_part.len() as i64 + exponent;

        let (integer, fraction) = if point <= 0 {
            let zeros = "0".repeat(point.unsigned_abs() as usize);
            (String::new(), format!("{zeros}{digits}"))
        } else if point as usize >= digits.len() {
            let zeros = "0".repeat(point as usize - digits.len());
            (format!("{digits}{zeros}"), String::new())
        } else {
            let (head, tail) = digits.split_at(point as usize);
            (head.to_string(), tail.to_string())
        };

        Some(Self {
            negative,
            integer: integer.trim_start_matches('0').to_string(),
            fraction,
        })
    }

    pub fn integer_digits(&self) -> u32 {
        self.integer.len() as u32
    }

    pub fn scale(&self) -> u32 {
        self.fraction.len() as u32
    }

    /// Total significant positions, never less than one.
    pub fn precision(&self) -> u32 {
        (self.integer_digits() + self.scale()).max(1)
    }

    /// True when the value is representable as `DECIMAL(precision, scale)`
    /// without rounding.
    pub fn fits(&self, precision: u32, scale: u32) -> bool {
        self.scale() <= scale && self.integer_digits() <= precision.saturating_sub(scale)
    }

    fn is_zero(&self) -> bool {
        self.integer.is_empty() && self.fraction.bytes().all(|b| b == b'0')
    }
}

impl fmt::Display for DecimalLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative && !self.is_zero() {
            f.write_str("-")?;
        }
        if self.integer.is_empty() {
            f.write_str("0")?;
        } else {
            f.write_str(&self.integer)?;
        }
        if !self.fraction.is_empty() {
            write!(f, ".{}", self.fraction)?;
        }
        Ok(())
    }
}

/// A converted cell, or a value read back from the database.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Decimal(DecimalLiteral),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Text(String),
    Blob(Vec<u8>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Self::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S")),
            Self::Text(v) => f.write_str(v),
            Self::Blob(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

/// Why a non-empty field could not be converted to its column type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("not an integer")]
    NotInteger,

    #[error("integer out of 64-bit range")]
    IntegerOutOfRange,

    #[error("not a decimal number")]
    NotDecimal,

    #[error("does not fit DECIMAL({precision},{scale})")]
    DecimalOverflow { precision: u32, scale: u32 },

    #[error("not a date in format {format}")]
    NotDate { format: String },

    #[error("not a datetime in format {format}")]
    NotDateTime { format: String },
}

/// Converts one non-empty field to `column_type`.
///
/// Numeric, date, and datetime values are trimmed before parsing; text is
/// kept exactly as read.
pub fn convert_value(raw: &str, column_type: &ColumnType) -> Result<SqlValue, ConversionError> {
    let value = raw.trim();
    match column_type {
        ColumnType::Integer => {
            if !INTEGER_PATTERN.is_match(value) {
                return Err(ConversionError::NotInteger);
            }
            value
                .parse::<i64>()
                .map(SqlValue::Integer)
                .map_err(|_| ConversionError::IntegerOutOfRange)
        }
        ColumnType::Decimal { precision, scale } => {
            let decimal = DecimalLiteral::parse(value).ok_or(ConversionError::NotDecimal)?;
            if decimal.fits(*precision, *scale) {
                Ok(SqlValue::Decimal(decimal))
            } else {
                Err(ConversionError::DecimalOverflow {
                    precision: *precision,
                    scale: *scale,
                })
            }
        }
        ColumnType::Date { format } => NaiveDate::parse_from_str(value, format)
            .map(SqlValue::Date)
            .map_err(|_| ConversionError::NotDate {
                format: format.clone(),
            }),
        ColumnType::DateTime { format } => NaiveDateTime::parse_from_str(value, format)
            .map(SqlValue::DateTime)
            .map_err(|_| ConversionError::NotDateTime {
                format: format.clone(),
            }),
        ColumnType::Text => Ok(SqlValue::Text(raw.to_string())),
    }
}
