//! The database seam used by provisioning and loading.

use csvland_model::{ColumnType, SqlValue};

use crate::error::DbError;

/// Minimal relational client.
///
/// The pipeline only issues `CREATE TABLE` DDL, parameterized multi-row
/// `INSERT`s, and table existence checks through it. Methods take `&self`;
/// implementations that need mutation use interior mutability.
pub trait DatabaseClient {
    /// Executes one statement with positional `?` parameters and returns the
    /// number of affected rows.
    fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<usize, DbError>;

    /// Runs a query without parameters and returns every row.
    fn query(&self, sql: &str) -> Result<Vec<Vec<SqlValue>>, DbError>;

    /// Whether a table with this name exists (case-insensitive).
    fn table_exists(&self, table: &str) -> Result<bool, DbError>;

    /// Largest number of bound parameters one statement may carry.
    fn max_bind_parameters(&self) -> usize;

    /// Column type used in `CREATE TABLE` for this database.
    fn column_type_sql(&self, column_type: &ColumnType) -> String {
        column_type.sql_type()
    }
}
