//! Target table specification.

use serde::Serialize;

use crate::column::{ColumnType, InferredSchema};
use crate::error::{ModelError, Result};

/// Surrogate auto-incrementing key, always the first column.
pub const IDENTITY_COLUMN: &str = "import_id";

/// Import marker shared by every row of one run, always the last column.
pub const IMPORT_TIMESTAMP_COLUMN: &str = "import_ts";

/// Storage format of the import timestamp.
pub const IMPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Identity,
    Data,
    ImportTimestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableColumn {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub role: ColumnRole,
}

/// Table layout derived once per run from the inferred schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSpec {
    pub name: String,
    pub columns: Vec<TableColumn>,
}

impl TableSpec {
    /// Builds the table layout: identity column, the schema's columns in
    /// header order, then the import-timestamp column.
    ///
    /// # Errors
    ///
    /// Fails when the table name is blank or a CSV column name collides
    /// (case-insensitively) with one of the injected columns.
    pub fn from_schema(name: &str, schema: &InferredSchema) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ModelError::EmptyTableName);
        }

        for profile in &schema.columns {
            for reserved in [IDENTITY_COLUMN, IMPORT_TIMESTAMP_COLUMN] {
                if profile.name.eq_ignore_ascii_case(reserved) {
                    return Err(ModelError::ReservedColumn {
                        column: profile.name.clone(),
                        reserved,
                    });
                }
            }
        }

        let mut columns = Vec::with_capacity(schema.len() + 2);
        columns.push(TableColumn {
            name: IDENTITY_COLUMN.to_string(),
            column_type: ColumnType::Integer,
            nullable: false,
            role: ColumnRole::Identity,
        });
        columns.extend(schema.columns.iter().map(|profile| TableColumn {
            name: profile.name.clone(),
            column_type: profile.column_type.clone(),
            nullable: profile.nullable,
            role: ColumnRole::Data,
        }));
        columns.push(TableColumn {
            name: IMPORT_TIMESTAMP_COLUMN.to_string(),
            column_type: ColumnType::DateTime {
                format: IMPORT_TIMESTAMP_FORMAT.to_string(),
            },
            nullable: false,
            role: ColumnRole::ImportTimestamp,
        });

        Ok(Self {
            name: name.to_string(),
            columns,
        })
    }

    /// Columns that come from the CSV, in header order.
    pub fn data_columns(&self) -> impl Iterator<Item = &TableColumn> {
        self.columns.iter().filter(|c| c.role == ColumnRole::Data)
    }

    pub fn data_column_count(&self) -> usize {
        self.data_columns().count()
    }

    /// Columns an insert supplies values for: everything except the identity.
    pub fn insert_columns(&self) -> impl Iterator<Item = &TableColumn> {
        self.columns.iter().filter(|c| c.role != ColumnRole::Identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnProfile, TypeKind};

    fn profile(name: &str, column_type: ColumnType, nullable: bool) -> ColumnProfile {
        ColumnProfile {
            name: name.to_string(),
            evaluated: column_type.kind().cascade_through(),
            column_type,
            nullable,
            non_empty: 1,
            empty: usize::from(nullable),
            max_length: 1,
        }
    }

    fn schema(columns: Vec<ColumnProfile>) -> InferredSchema {
        InferredSchema {
            columns,
            rows_sampled: 1,
            rows_skipped: 0,
            undecodable_values: 0,
        }
    }

    #[test]
    fn injected_columns_wrap_data_columns() {
        let schema = schema(vec![
            profile("id", ColumnType::Integer, false),
            profile("name", ColumnType::Text, true),
        ]);
        let spec = TableSpec::from_schema("people", &schema).unwrap();

        let names: Vec<&str> = spec.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["import_id", "id", "name", "import_ts"]);
        assert_eq!(spec.columns[0].role, ColumnRole::Identity);
        assert_eq!(spec.columns[3].role, ColumnRole::ImportTimestamp);
        assert!(!spec.columns[0].nullable);
        assert!(!spec.columns[3].nullable);
        assert_eq!(spec.columns[3].column_type.kind(), TypeKind::DateTime);
        assert_eq!(spec.data_column_count(), 2);
        assert_eq!(spec.insert_columns().count(), 3);
    }

    #[test]
    fn reserved_names_are_rejected() {
        let schema = schema(vec![profile("Import_TS", ColumnType::Text, false)]);
        let err = TableSpec::from_schema("t", &schema).unwrap_err();
        assert!(matches!(
            err,
            ModelError::ReservedColumn {
                reserved: IMPORT_TIMESTAMP_COLUMN,
                ..
            }
        ));
    }

    #[test]
    fn blank_table_name_is_rejected() {
        let schema = schema(vec![profile("a", ColumnType::Text, false)]);
        assert!(matches!(
            TableSpec::from_schema("  ", &schema),
            Err(ModelError::EmptyTableName)
        ));
    }
}
