//! Load accounting: row rejections, chunk outcomes, and the load accumulator.

use std::fmt;

use serde::Serialize;

use crate::value::ConversionError;

/// Why a single data row was excluded from its chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRejection {
    /// The row's field count differs from the header.
    FieldCount { expected: usize, found: usize },
    /// A field's bytes are not valid in the configured encoding.
    Undecodable { column: String },
    /// An empty value in a column inferred as not nullable.
    MissingValue { column: String },
    /// A value that does not convert to its column type.
    Conversion {
        column: String,
        value: String,
        error: ConversionError,
    },
}

impl RowRejection {
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::FieldCount { .. } => None,
            Self::Undecodable { column }
            | Self::MissingValue { column }
            | Self::Conversion { column, .. } => Some(column),
        }
    }

    /// The offending cell value, if the rejection is about one.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Conversion { value, .. } => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldCount { expected, found } => {
                write!(f, "expected {expected} fields, found {found}")
            }
            Self::Undecodable { column } => write!(f, "column '{column}' is not valid text"),
            Self::MissingValue { column } => {
                write!(f, "column '{column}' is empty but not nullable")
            }
            Self::Conversion { column, error, .. } => write!(f, "column '{column}': {error}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStatus {
    /// The chunk's valid rows were inserted.
    Inserted,
    /// Both insert attempts failed; every valid row was rejected.
    Failed,
    /// Every row was rejected during conversion, nothing was submitted.
    Empty,
}

/// Resolution of one chunk's insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkOutcome {
    /// Zero-based position of the chunk within the file.
    pub index: usize,
    /// Raw rows the chunk covered, valid or not.
    pub rows: usize,
    pub inserted: usize,
    pub rejected: usize,
    /// Insert attempts made (0 for empty chunks).
    pub attempts: u8,
    pub status: ChunkStatus,
    /// Client error from the last failed attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Accumulator threaded through the load loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadResult {
    pub rows_read: usize,
    pub rows_inserted: usize,
    pub rows_rejected: usize,
    /// Effective chunk size after applying the client's bind-parameter limit.
    pub rows_per_chunk: usize,
    pub chunks: Vec<ChunkOutcome>,
}

impl LoadResult {
    pub fn new(rows_per_chunk: usize) -> Self {
        Self {
            rows_per_chunk,
            ..Self::default()
        }
    }

    /// Folds a resolved chunk into the totals.
    ///
    /// Rows rejected during conversion are part of `outcome.rejected`, so
    /// every raw row is counted exactly once.
    pub fn record_chunk(&mut self, outcome: ChunkOutcome) {
        self.rows_read += outcome.rows;
        self.rows_inserted += outcome.inserted;
        self.rows_rejected += outcome.rejected;
        self.chunks.push(outcome);
    }

    pub fn chunks_failed(&self) -> usize {
        self.chunks
            .iter()
            .filter(|c| c.status == ChunkStatus::Failed)
            .count()
    }

    /// True when every read row was either inserted or rejected.
    pub fn is_balanced(&self) -> bool {
        self.rows_inserted + self.rows_rejected == self.rows_read
    }
}
