//! Error types for CSV ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while selecting or reading the source file.
///
/// Every variant is structural: a run that hits one cannot continue.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory missing, not a directory, or not readable.
    #[error("cannot access directory {path}: {source}")]
    DirectoryAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory contains no regular files at all.
    #[error("directory is empty: {path}")]
    EmptyDirectory { path: PathBuf },

    /// Directory has files, but none with the expected extension.
    #[error("no .{extension} files in {path} ({files_seen} other files present)")]
    NoMatchingFiles {
        path: PathBuf,
        extension: String,
        files_seen: usize,
    },

    /// Failed to open or read a file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Errors ===
    /// File has no header row.
    #[error("CSV file has no header row: {path}")]
    EmptyFile { path: PathBuf },

    /// The CSV parser failed on the file.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Header bytes are not valid in the configured encoding.
    #[error("header of {path} is not valid {encoding}")]
    UndecodableHeader {
        path: PathBuf,
        encoding: &'static str,
    },

    // === Configuration Errors ===
    /// Unknown encoding label, or one the CSV reader cannot split safely.
    #[error("unsupported encoding '{label}'")]
    UnsupportedEncoding { label: String },
}

impl IngestError {
    pub(crate) fn from_csv(path: &std::path::Path, err: csv::Error) -> Self {
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(source) => Self::FileRead {
                path: path.to_path_buf(),
                source,
            },
            _ => Self::CsvParse {
                path: path.to_path_buf(),
                message,
            },
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
