//! CSV reading utilities.

mod header;
mod reader;

use encoding_rs::Encoding;

use crate::error::{IngestError, Result};

pub use header::{column_names, normalize_header};
pub use reader::{CsvSource, RawRow};

/// Delimiter and encoding shared by every read pass of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvFormat {
    /// Encoding label, resolved with [`resolve_encoding`] when a file is opened.
    pub encoding: String,
    pub delimiter: u8,
}

impl CsvFormat {
    pub fn new(encoding: impl Into<String>, delimiter: u8) -> Self {
        Self {
            encoding: encoding.into(),
            delimiter,
        }
    }
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self::new("utf-8", b',')
    }
}

/// Resolves an encoding label (WHATWG names and aliases, case-insensitive).
///
/// Encodings that are not ASCII-compatible (UTF-16 and friends) are refused:
/// the CSV parser splits on single delimiter bytes, which is only sound when
/// ASCII bytes always mean ASCII characters.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .filter(|encoding| encoding.is_ascii_compatible())
        .ok_or_else(|| IngestError::UnsupportedEncoding {
            label: label.to_string(),
        })
}
