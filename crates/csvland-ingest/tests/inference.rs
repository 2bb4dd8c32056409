use std::fs;

use chrono::Utc;
use proptest::prelude::*;
use tempfile::TempDir;

use csvland_ingest::{InferenceOptions, IngestError, infer_schema};
use csvland_model::{ColumnType, RecordingSink, RunEvent, SourceFile};

fn source_with(dir: &TempDir, contents: &[u8]) -> SourceFile {
    let path = dir.path().join("input.csv");
    fs::write(&path, contents).expect("write csv");
    SourceFile {
        path,
        modified: Utc::now(),
        encoding: "utf-8".to_string(),
        delimiter: b',',
    }
}

#[test]
fn infers_scenario_schema() {
    let dir = TempDir::new().expect("temp dir");
    let source = source_with(&dir, b"id,amount,joined\n1,10.5,2023-01-01\n2,,2023-02-15\n");
    let sink = RecordingSink::new();

    let schema = infer_schema(&source, &InferenceOptions::default(), &sink).expect("infer");

    assert_eq!(schema.column_names(), vec!["id", "amount", "joined"]);
    assert_eq!(schema.rows_sampled, 2);

    let id = schema.column("id").expect("id");
    assert_eq!(id.column_type, ColumnType::Integer);
    assert!(!id.nullable);

    let amount = schema.column("amount").expect("amount");
    assert_eq!(
        amount.column_type,
        ColumnType::Decimal {
            precision: 3,
            scale: 1
        }
    );
    assert!(amount.nullable);

    let joined = schema.column("joined").expect("joined");
    assert_eq!(
        joined.column_type,
        ColumnType::Date {
            format: "%Y-%m-%d".to_string()
        }
    );
    assert!(!joined.nullable);

    assert_eq!(
        sink.count(|e| matches!(e, RunEvent::SchemaInferred { rows_sampled: 2, .. })),
        1
    );
}

#[test]
fn one_non_numeric_value_demotes_integer_column() {
    let dir = TempDir::new().expect("temp dir");
    let source = source_with(&dir, b"code\n1\n2\nN/A\n4\n");

    let schema = infer_schema(&source, &InferenceOptions::default(), &RecordingSink::new())
        .expect("infer");
    assert_eq!(schema.columns[0].column_type, ColumnType::Text);
}

#[test]
fn header_only_file_yields_nullable_text_columns() {
    let dir = TempDir::new().expect("temp dir");
    let source = source_with(&dir, b"a,b\n");

    let schema = infer_schema(&source, &InferenceOptions::default(), &RecordingSink::new())
        .expect("infer");
    assert_eq!(schema.rows_sampled, 0);
    assert!(
        schema
            .columns
            .iter()
            .all(|c| c.column_type == ColumnType::Text && c.nullable)
    );
}

#[test]
fn empty_file_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let source = source_with(&dir, b"");

    let err = infer_schema(&source, &InferenceOptions::default(), &RecordingSink::new())
        .expect_err("empty file");
    assert!(matches!(err, IngestError::EmptyFile { .. }));
}

#[test]
fn sample_size_bounds_rows_read() {
    let dir = TempDir::new().expect("temp dir");
    let source = source_with(&dir, b"v\n1\n2\nabc\n");
    let options = InferenceOptions {
        sample_size: 2,
        ..InferenceOptions::default()
    };

    let schema = infer_schema(&source, &options, &RecordingSink::new()).expect("infer");
    assert_eq!(schema.rows_sampled, 2);
    assert_eq!(schema.columns[0].column_type, ColumnType::Integer);
}

#[test]
fn ragged_rows_and_undecodable_values_are_counted() {
    let dir = TempDir::new().expect("temp dir");
    let source = source_with(&dir, b"a,b\n1,x\n2\n3,caf\xe9\n");

    let schema = infer_schema(&source, &InferenceOptions::default(), &RecordingSink::new())
        .expect("infer");
    assert_eq!(schema.rows_sampled, 2);
    assert_eq!(schema.rows_skipped, 1);
    assert_eq!(schema.undecodable_values, 1);
    assert_eq!(schema.columns[0].column_type, ColumnType::Integer);
}

#[test]
fn short_sampled_row_marks_missing_columns_nullable() {
    let dir = TempDir::new().expect("temp dir");
    let source = source_with(&dir, b"a,b,c\n1,x,7\n2,y\n3,z,9\n");

    let schema = infer_schema(&source, &InferenceOptions::default(), &RecordingSink::new())
        .expect("infer");
    assert_eq!(schema.rows_sampled, 2);
    assert_eq!(schema.rows_skipped, 1);
    let nullable: Vec<bool> = schema.columns.iter().map(|c| c.nullable).collect();
    assert_eq!(nullable, vec![false, false, true]);
    assert_eq!(schema.columns[2].column_type, ColumnType::Integer);
    assert_eq!(schema.columns[2].empty, 1);
}

#[test]
fn duplicate_and_blank_headers_are_renamed() {
    let dir = TempDir::new().expect("temp dir");
    let source = source_with(&dir, b"Name,,name\nx,y,z\n");

    let schema = infer_schema(&source, &InferenceOptions::default(), &RecordingSink::new())
        .expect("infer");
    assert_eq!(schema.column_names(), vec!["Name", "column_2", "name_2"]);
}

#[test]
fn custom_date_formats_are_used() {
    let dir = TempDir::new().expect("temp dir");
    let source = source_with(&dir, b"day\n20230101\n20231231\n");
    let options = InferenceOptions {
        date_formats: vec!["%Y%m%d".to_string()],
        ..InferenceOptions::default()
    };

    let schema = infer_schema(&source, &options, &RecordingSink::new()).expect("infer");
    // Integer is narrower and still wins.
    assert_eq!(schema.columns[0].column_type, ColumnType::Integer);

    let source = source_with(&dir, b"day\n2023.01.01\n2023.12.31\n");
    let options = InferenceOptions {
        date_formats: vec!["%Y.%m.%d".to_string()],
        ..InferenceOptions::default()
    };
    let schema = infer_schema(&source, &options, &RecordingSink::new()).expect("infer");
    assert_eq!(
        schema.columns[0].column_type,
        ColumnType::Date {
            format: "%Y.%m.%d".to_string()
        }
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn all_integer_columns_infer_integer(values in proptest::collection::vec(any::<i64>(), 1..40)) {
        let dir = TempDir::new().expect("temp dir");
        let mut contents = String::from("n\n");
        for value in &values {
            contents.push_str(&format!("{value}\n"));
        }
        let source = source_with(&dir, contents.as_bytes());

        let schema = infer_schema(&source, &InferenceOptions::default(), &RecordingSink::new())
            .expect("infer");
        prop_assert_eq!(&schema.columns[0].column_type, &ColumnType::Integer);
        prop_assert!(!schema.columns[0].nullable);
    }

    #[test]
    fn a_word_among_integers_never_infers_integer(
        values in proptest::collection::vec(any::<i32>(), 0..20),
        position in 0usize..20,
    ) {
        let dir = TempDir::new().expect("temp dir");
        let mut cells: Vec<String> = values.iter().map(ToString::to_string).collect();
        cells.insert(position.min(cells.len()), "pending".to_string());
        let contents = format!("n\n{}\n", cells.join("\n"));
        let source = source_with(&dir, contents.as_bytes());

        let schema = infer_schema(&source, &InferenceOptions::default(), &RecordingSink::new())
            .expect("infer");
        prop_assert_ne!(&schema.columns[0].column_type, &ColumnType::Integer);
    }
}
