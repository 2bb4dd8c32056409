//! SQL text generation.

use csvland_model::{ColumnRole, ColumnType, TableColumn, TableSpec};

/// Double-quotes an identifier, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn column_definition(
    column: &TableColumn,
    type_name: &impl Fn(&ColumnType) -> String,
) -> String {
    let name = quote_identifier(&column.name);
    match column.role {
        ColumnRole::Identity => format!("{name} INTEGER PRIMARY KEY AUTOINCREMENT"),
        ColumnRole::Data | ColumnRole::ImportTimestamp => {
            let mut def = format!("{name} {}", type_name(&column.column_type));
            if !column.nullable {
                def.push_str(" NOT NULL");
            }
            def
        }
    }
}

/// `CREATE TABLE IF NOT EXISTS` statement for `spec` with the generic SQL
/// type names.
pub fn create_table_sql(spec: &TableSpec) -> String {
    create_table_sql_with(spec, ColumnType::sql_type)
}

/// Like [`create_table_sql`], with column types rendered by `type_name`.
pub fn create_table_sql_with(
    spec: &TableSpec,
    type_name: impl Fn(&ColumnType) -> String,
) -> String {
    let columns = spec
        .columns
        .iter()
        .map(|c| format!("    {}", column_definition(c, &type_name)))
        .collect::<Vec<_>>()
        .join(",\n");
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{columns}\n)",
        quote_identifier(&spec.name)
    )
}

/// Multi-row `INSERT` with one `?` per insert column per row.
pub fn insert_sql(spec: &TableSpec, rows: usize) -> String {
    let names: Vec<String> = spec
        .insert_columns()
        .map(|c| quote_identifier(&c.name))
        .collect();
    let placeholders = format!("({})", vec!["?"; names.len()].join(", "));
    let values = vec![placeholders.as_str(); rows].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES {values}",
        quote_identifier(&spec.name),
        names.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use csvland_model::{ColumnProfile, InferredSchema};

    fn spec() -> TableSpec {
        let column = |name: &str, column_type: ColumnType, nullable: bool| ColumnProfile {
            name: name.to_string(),
            evaluated: column_type.kind().cascade_through(),
            column_type,
            nullable,
            non_empty: 2,
            empty: usize::from(nullable),
            max_length: 10,
        };
        let schema = InferredSchema {
            columns: vec![
                column("id", ColumnType::Integer, false),
                column(
                    "amount",
                    ColumnType::Decimal {
                        precision: 3,
                        scale: 1,
                    },
                    true,
                ),
                column(
                    "joined",
                    ColumnType::Date {
                        format: "%Y-%m-%d".to_string(),
                    },
                    false,
                ),
            ],
            rows_sampled: 2,
            rows_skipped: 0,
            undecodable_values: 0,
        };
        TableSpec::from_schema("imported_data", &schema).unwrap()
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("select"), "\"select\"");
        assert_eq!(quote_identifier("order date"), "\"order date\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_create_table_sql() {
        insta::assert_snapshot!(create_table_sql(&spec()), @r#"
CREATE TABLE IF NOT EXISTS "imported_data" (
    "import_id" INTEGER PRIMARY KEY AUTOINCREMENT,
    "id" INTEGER NOT NULL,
    "amount" DECIMAL(3,1),
    "joined" DATE NOT NULL,
    "import_ts" DATETIME NOT NULL
)
"#);
    }

    #[test]
    fn test_create_table_sql_with_custom_types() {
        let sql = create_table_sql_with(&spec(), |column_type| match column_type {
            ColumnType::Decimal { .. } => "TEXT".to_string(),
            other => other.sql_type(),
        });
        assert!(sql.contains("\"amount\" TEXT,"));
        assert!(sql.contains("\"id\" INTEGER NOT NULL"));
    }

    #[test]
    fn test_insert_sql() {
        insta::assert_snapshot!(insert_sql(&spec(), 2), @r#"INSERT INTO "imported_data" ("id", "amount", "joined", "import_ts") VALUES (?, ?, ?, ?), (?, ?, ?, ?)"#);
    }
}
