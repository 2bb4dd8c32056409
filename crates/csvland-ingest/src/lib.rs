//! CSV ingestion for csvland.
//!
//! This crate finds the file a run should load, reads it with an explicit
//! delimiter and encoding, and infers a column schema from a sample of rows.
//!
//! # Features
//!
//! - **File Selection**: Pick the most recently modified file by extension
//! - **CSV Reading**: Stream rows as bytes and decode field by field
//! - **Header Cleanup**: Trim, fill blank, and de-duplicate column names
//! - **Schema Inference**: Narrowest type per column across the sample
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use csvland_ingest::{CsvFormat, InferenceOptions, infer_schema, select_source_file};
//! use csvland_model::NullSink;
//!
//! let source = select_source_file(Path::new("./csv_files"), "csv", &CsvFormat::default())?;
//! let schema = infer_schema(&source, &InferenceOptions::default(), &NullSink)?;
//! ```

mod csv;
mod discovery;
mod error;
mod inference;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use self::csv::{CsvFormat, CsvSource, RawRow, column_names, normalize_header, resolve_encoding};

// === File Selection ===
pub use discovery::{list_matching_files, select_source_file};

// === Schema Inference ===
pub use inference::{
    DEFAULT_DATE_FORMATS, DEFAULT_DATETIME_FORMATS, DEFAULT_SAMPLE_SIZE, InferenceOptions,
    infer_schema,
};
