//! Error types for provisioning and loading.

use std::path::PathBuf;
use thiserror::Error;

use csvland_ingest::IngestError;

/// Failure reported by a [`DatabaseClient`](crate::DatabaseClient).
#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to open database {target}: {message}")]
    Open { target: String, message: String },

    #[error("{message}")]
    Statement { message: String },

    #[error("failed to close database: {message}")]
    Close { message: String },
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        DbError::Statement {
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("table '{table}' does not exist and table creation is disabled")]
    TableMissing { table: String },

    #[error("failed to create table '{table}': {source}")]
    DdlExecution {
        table: String,
        #[source]
        source: DbError,
    },

    #[error("failed to check whether table '{table}' exists: {source}")]
    ExistenceCheck {
        table: String,
        #[source]
        source: DbError,
    },
}

/// Structural load failures. Row and chunk failures are not errors; they are
/// accounted for in the [`LoadResult`](csvland_model::LoadResult).
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file's header no longer matches the inferred schema.
    #[error("header of {path} changed since inference: expected {expected:?}, found {found:?}")]
    HeaderMismatch {
        path: PathBuf,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error(transparent)]
    Read(#[from] IngestError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provision_error_display() {
        let err = ProvisionError::TableMissing {
            table: "orders".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "table 'orders' does not exist and table creation is disabled"
        );

        let err = ProvisionError::DdlExecution {
            table: "orders".to_string(),
            source: DbError::Statement {
                message: "near \"(\": syntax error".to_string(),
            },
        };
        assert!(err.to_string().ends_with("syntax error"));
    }
}
