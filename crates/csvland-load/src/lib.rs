//! Loading for csvland: target table provisioning and chunked inserts.
//!
//! - [`DatabaseClient`]: the seam between the pipeline and a database
//! - [`SqliteClient`]: the shipped client, backed by bundled SQLite
//! - [`ensure_table`]: create-if-absent provisioning from a [`TableSpec`]
//! - [`load`]: stream the source file into the table in chunks
//!
//! [`TableSpec`]: csvland_model::TableSpec

mod client;
mod ddl;
mod error;
mod loader;
mod provision;
mod sqlite;

pub use client::DatabaseClient;
pub use ddl::{create_table_sql, create_table_sql_with, insert_sql, quote_identifier};
pub use error::{DbError, LoadError, ProvisionError};
pub use loader::{
    DEFAULT_CHUNK_SIZE, INSERT_ATTEMPTS, LoadOptions, convert_row, effective_chunk_size, load,
};
pub use provision::{ProvisionOutcome, ensure_table};
pub use sqlite::{
    SQLITE_EXACT_DECIMAL_DIGITS, SQLITE_MAX_BIND_PARAMETERS, SqliteClient, sqlite_column_type,
};
