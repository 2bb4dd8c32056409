//! Streaming CSV reader with explicit encoding.

use std::borrow::Cow;
use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{ByteRecord, ReaderBuilder};
use encoding_rs::Encoding;

use csvland_model::SourceFile;

use crate::error::{IngestError, Result};

use super::header::column_names;
use super::resolve_encoding;

/// One data row as read from the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// Zero-based data row index (the header is not counted).
    pub index: usize,
    /// One-based line where the row starts.
    pub line: u64,
    /// Decoded fields; `None` where the bytes are invalid in the encoding.
    pub fields: Vec<Option<String>>,
}

impl RawRow {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// An open read pass over a [`SourceFile`].
///
/// The file handle lives as long as the `CsvSource`; each pass of a run opens
/// its own. Rows are read as bytes and decoded field by field, so a single
/// bad byte sequence affects one field rather than the rest of the file.
pub struct CsvSource {
    path: PathBuf,
    reader: csv::Reader<File>,
    encoding: &'static Encoding,
    headers: Vec<String>,
    record: ByteRecord,
    next_index: usize,
}

impl CsvSource {
    /// Opens `source` and reads its header row.
    ///
    /// # Errors
    ///
    /// - [`IngestError::UnsupportedEncoding`] for an unusable encoding label
    /// - [`IngestError::FileRead`] when the file cannot be opened or read
    /// - [`IngestError::EmptyFile`] when there is no header row
    /// - [`IngestError::UndecodableHeader`] when the header is not valid text
    pub fn open(source: &SourceFile) -> Result<Self> {
        let encoding = resolve_encoding(&source.encoding)?;
        let file = File::open(&source.path).map_err(|e| IngestError::FileRead {
            path: source.path.clone(),
            source: e,
        })?;

        let mut reader = ReaderBuilder::new()
            .delimiter(source.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header_record = reader
            .byte_headers()
            .map_err(|e| IngestError::from_csv(&source.path, e))?
            .clone();

        let mut raw_headers = Vec::with_capacity(header_record.len());
        for field in &header_record {
            let decoded =
                decode_field(field, encoding).ok_or_else(|| IngestError::UndecodableHeader {
                    path: source.path.clone(),
                    encoding: encoding.name(),
                })?;
            raw_headers.push(decoded);
        }

        if raw_headers.iter().all(|h| h.trim().trim_matches('\u{feff}').is_empty()) {
            return Err(IngestError::EmptyFile {
                path: source.path.clone(),
            });
        }

        Ok(Self {
            path: source.path.clone(),
            reader,
            encoding,
            headers: column_names(&raw_headers),
            record: ByteRecord::new(),
            next_index: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Normalized, unique column names in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Reads the next data row, or `None` at end of file.
    pub fn next_row(&mut self) -> Result<Option<RawRow>> {
        let has_record = self
            .reader
            .read_byte_record(&mut self.record)
            .map_err(|e| IngestError::from_csv(&self.path, e))?;
        if !has_record {
            return Ok(None);
        }

        let line = self.record.position().map_or(0, csv::Position::line);
        let fields = self
            .record
            .iter()
            .map(|field| decode_field(field, self.encoding))
            .collect();

        let row = RawRow {
            index: self.next_index,
            line,
            fields,
        };
        self.next_index += 1;
        Ok(Some(row))
    }
}

impl Iterator for CsvSource {
    type Item = Result<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}

fn decode_field(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
}
