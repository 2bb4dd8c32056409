//! Data model for landing CSV extracts in a relational table.
//!
//! The types here are shared by every stage of a run:
//!
//! - [`SourceFile`]: the one CSV selected for a run
//! - [`ColumnType`], [`ColumnProfile`], [`InferredSchema`]: inference output
//! - [`TableSpec`]: the target table, including the injected identity and
//!   import-timestamp columns
//! - [`SqlValue`]: a converted cell, ready to bind to a statement
//! - [`LoadResult`], [`RunSummary`]: load accounting
//! - [`RunEvent`], [`EventSink`]: structured events for observability

pub mod column;
pub mod error;
pub mod event;
pub mod load;
pub mod source;
pub mod summary;
pub mod table;
pub mod value;

pub use column::{ColumnProfile, ColumnType, InferredSchema, TypeKind};
pub use error::{ModelError, Result};
pub use event::{EventSink, NullSink, RecordingSink, RunEvent};
pub use load::{ChunkOutcome, ChunkStatus, LoadResult, RowRejection};
pub use source::SourceFile;
pub use summary::RunSummary;
pub use table::{
    ColumnRole, IDENTITY_COLUMN, IMPORT_TIMESTAMP_COLUMN, IMPORT_TIMESTAMP_FORMAT, TableColumn,
    TableSpec,
};
pub use value::{
    ConversionError, DecimalLiteral, MAX_DECIMAL_PRECISION, SqlValue, convert_value, is_integer,
};
