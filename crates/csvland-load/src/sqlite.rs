//! SQLite implementation of [`DatabaseClient`].

use std::path::Path;

use rusqlite::Connection;
use rusqlite::types::{Value, ValueRef};
use tracing::{debug, info};

use csvland_model::{ColumnType, SqlValue};

use crate::client::DatabaseClient;
use crate::error::DbError;

/// Default `SQLITE_MAX_VARIABLE_NUMBER` of the bundled SQLite.
pub const SQLITE_MAX_BIND_PARAMETERS: usize = 32_766;

/// Significant digits a NUMERIC-affinity column keeps exactly. Wider text
/// values are coerced to REAL and rounded.
pub const SQLITE_EXACT_DECIMAL_DIGITS: u32 = 15;

/// SQLite column type for `column_type`.
///
/// Decimals wider than [`SQLITE_EXACT_DECIMAL_DIGITS`] are declared `TEXT`
/// so every digit is stored as written.
pub fn sqlite_column_type(column_type: &ColumnType) -> String {
    match column_type {
        ColumnType::Decimal { precision, .. } if *precision > SQLITE_EXACT_DECIMAL_DIGITS => {
            ColumnType::Text.sql_type()
        }
        other => other.sql_type(),
    }
}

pub struct SqliteClient {
    conn: Connection,
    target: String,
}

impl SqliteClient {
    /// Opens (creating if needed) the database file at `path`.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let target = path.display().to_string();
        let conn = Connection::open(path).map_err(|e| DbError::Open {
            target: target.clone(),
            message: e.to_string(),
        })?;
        info!(database = %target, "opened sqlite database");
        Ok(Self { conn, target })
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        let target = ":memory:".to_string();
        let conn = Connection::open_in_memory().map_err(|e| DbError::Open {
            target: target.clone(),
            message: e.to_string(),
        })?;
        Ok(Self { conn, target })
    }

    /// Database file path, or `:memory:`.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Closes the connection, reporting errors that a drop would swallow.
    pub fn close(self) -> Result<(), DbError> {
        let target = self.target;
        self.conn.close().map_err(|(_, e)| DbError::Close {
            message: e.to_string(),
        })?;
        debug!(database = %target, "closed sqlite database");
        Ok(())
    }
}

impl DatabaseClient for SqliteClient {
    fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<usize, DbError> {
        let values: Vec<Value> = params.iter().map(to_sqlite).collect();
        let affected = self
            .conn
            .execute(sql, rusqlite::params_from_iter(values.iter()))?;
        Ok(affected)
    }

    fn query(&self, sql: &str) -> Result<Vec<Vec<SqlValue>>, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let column_count = stmt.column_count();
        let mut rows = stmt.query([])?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(column_count);
            for idx in 0..column_count {
                values.push(from_sqlite(row.get_ref(idx)?));
            }
            out.push(values);
        }
        Ok(out)
    }

    fn table_exists(&self, table: &str) -> Result<bool, DbError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
            [table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn max_bind_parameters(&self) -> usize {
        SQLITE_MAX_BIND_PARAMETERS
    }

    fn column_type_sql(&self, column_type: &ColumnType) -> String {
        sqlite_column_type(column_type)
    }
}

/// Dates, datetimes, and decimals are bound as text; SQLite's column
/// affinity decides the storage class.
fn to_sqlite(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(v) => Value::Integer(*v),
        SqlValue::Real(v) => Value::Real(*v),
        SqlValue::Decimal(_) | SqlValue::Date(_) | SqlValue::DateTime(_) => {
            Value::Text(value.to_string())
        }
        SqlValue::Text(v) => Value::Text(v.clone()),
        SqlValue::Blob(v) => Value::Blob(v.clone()),
    }
}

fn from_sqlite(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(v) => SqlValue::Integer(v),
        ValueRef::Real(v) => SqlValue::Real(v),
        ValueRef::Text(bytes) => SqlValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => SqlValue::Blob(bytes.to_vec()),
    }
}
