//! Column type inference over a bounded sample of rows.
//!
//! Each column keeps a set of surviving candidates. Every sampled non-empty
//! value strikes out the candidates it does not satisfy, and the narrowest
//! survivor in cascade order becomes the column type.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use csvland_model::{
    ColumnProfile, ColumnType, DecimalLiteral, EventSink, InferredSchema, MAX_DECIMAL_PRECISION,
    RunEvent, SourceFile, TypeKind, is_integer,
};

use crate::csv::CsvSource;
use crate::error::Result;

pub const DEFAULT_SAMPLE_SIZE: usize = 1000;

pub const DEFAULT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];

pub const DEFAULT_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceOptions {
    /// Maximum number of data rows read after the header.
    pub sample_size: usize,
    /// Candidate chrono formats for DATE, tried in order.
    pub date_formats: Vec<String>,
    /// Candidate chrono formats for DATETIME, tried in order.
    pub datetime_formats: Vec<String>,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| (*f).to_string()).collect(),
            datetime_formats: DEFAULT_DATETIME_FORMATS
                .iter()
                .map(|f| (*f).to_string())
                .collect(),
        }
    }
}

/// Infers column types from the first `options.sample_size` rows of `source`.
///
/// # Errors
///
/// Fails when the file cannot be opened or parsed, or has no header row.
pub fn infer_schema(
    source: &SourceFile,
    options: &InferenceOptions,
    sink: &dyn EventSink,
) -> Result<InferredSchema> {
    let mut csv = CsvSource::open(source)?;
    let schema = infer_from_reader(&mut csv, options)?;

    info!(
        path = %source.path.display(),
        columns = schema.len(),
        rows_sampled = schema.rows_sampled,
        rows_skipped = schema.rows_skipped,
        "schema inferred"
    );
    sink.emit(&RunEvent::SchemaInferred {
        rows_sampled: schema.rows_sampled,
        columns: schema.columns.clone(),
    });
    Ok(schema)
}

fn infer_from_reader(csv: &mut CsvSource, options: &InferenceOptions) -> Result<InferredSchema> {
    let headers = csv.headers().to_vec();
    let mut columns: Vec<ColumnAccumulator<'_>> = headers
        .iter()
        .map(|_| ColumnAccumulator::new(options))
        .collect();

    let mut rows_sampled = 0usize;
    let mut rows_skipped = 0usize;
    let mut undecodable_values = 0usize;

    while rows_sampled + rows_skipped < options.sample_size {
        let Some(row) = csv.next_row()? else {
            break;
        };

        if row.len() != headers.len() {
            debug!(
                line = row.line,
                expected = headers.len(),
                found = row.len(),
                "skipping sampled row with wrong field count"
            );
            // Fields a short row leaves out still count as missing values.
            for column in columns.iter_mut().skip(row.len()) {
                column.observe_missing();
            }
            rows_skipped += 1;
            continue;
        }

        for (column, field) in columns.iter_mut().zip(&row.fields) {
            match field {
                Some(value) => column.observe(value),
                None => undecodable_values += 1,
            }
        }
        rows_sampled += 1;
    }

    let columns = headers
        .into_iter()
        .zip(columns)
        .map(|(name, acc)| acc.finish(name))
        .collect::<Vec<_>>();

    for column in &columns {
        debug!(
            column = %column.name,
            column_type = %column.column_type,
            nullable = column.nullable,
            non_empty = column.non_empty,
            "column inferred"
        );
    }

    Ok(InferredSchema {
        columns,
        rows_sampled,
        rows_skipped,
        undecodable_values,
    })
}

/// Running candidate state for one column.
struct ColumnAccumulator<'a> {
    integer: bool,
    decimal: bool,
    max_integer_digits: u32,
    max_scale: u32,
    date_formats: Vec<&'a str>,
    datetime_formats: Vec<&'a str>,
    non_empty: usize,
    empty: usize,
    max_length: usize,
}

impl<'a> ColumnAccumulator<'a> {
    fn new(options: &'a InferenceOptions) -> Self {
        Self {
            integer: true,
            decimal: true,
            max_integer_digits: 0,
            max_scale: 0,
            date_formats: options.date_formats.iter().map(String::as_str).collect(),
            datetime_formats: options.datetime_formats.iter().map(String::as_str).collect(),
            non_empty: 0,
            empty: 0,
            max_length: 0,
        }
    }

    fn observe_missing(&mut self) {
        self.empty += 1;
    }

    fn observe(&mut self, raw: &str) {
        let value = raw.trim();
        if value.is_empty() {
            self.empty += 1;
            return;
        }
        self.non_empty += 1;
        self.max_length = self.max_length.max(value.chars().count());

        if self.integer && !is_integer(value) {
            self.integer = false;
        }
        if self.decimal {
            match DecimalLiteral::parse(value) {
                Some(decimal) => {
                    self.max_integer_digits = self.max_integer_digits.max(decimal.integer_digits());
                    self.max_scale = self.max_scale.max(decimal.scale());
                }
                None => self.decimal = false,
            }
        }
        self.date_formats
            .retain(|format| NaiveDate::parse_from_str(value, format).is_ok());
        self.datetime_formats
            .retain(|format| NaiveDateTime::parse_from_str(value, format).is_ok());
    }

    fn decimal_type(&self) -> Option<ColumnType> {
        let precision = (self.max_integer_digits + self.max_scale).max(1);
        (self.decimal && precision <= MAX_DECIMAL_PRECISION).then_some(ColumnType::Decimal {
            precision,
            scale: self.max_scale,
        })
    }

    fn candidate(&self, kind: TypeKind) -> Option<ColumnType> {
        match kind {
            TypeKind::Integer => self.integer.then_some(ColumnType::Integer),
            TypeKind::Decimal => self.decimal_type(),
            TypeKind::Date => self.date_formats.first().map(|format| ColumnType::Date {
                format: (*format).to_string(),
            }),
            TypeKind::DateTime => self.datetime_formats.first().map(|format| {
                ColumnType::DateTime {
                    format: (*format).to_string(),
                }
            }),
            TypeKind::Text => Some(ColumnType::Text),
        }
    }

    fn finish(self, name: String) -> ColumnProfile {
        let column_type = if self.non_empty == 0 {
            ColumnType::Text
        } else {
            TypeKind::CASCADE
                .iter()
                .find_map(|kind| self.candidate(*kind))
                .unwrap_or(ColumnType::Text)
        };

        ColumnProfile {
            name,
            evaluated: column_type.kind().cascade_through(),
            column_type,
            nullable: self.empty > 0 || self.non_empty == 0,
            non_empty: self.non_empty,
            empty: self.empty,
            max_length: self.max_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer(values: &[&str]) -> ColumnProfile {
        let options = InferenceOptions::default();
        let mut acc = ColumnAccumulator::new(&options);
        for value in values {
            acc.observe(value);
        }
        acc.finish("col".to_string())
    }

    #[test]
    fn test_integer_column() {
        let profile = infer(&["1", "-2", "300"]);
        assert_eq!(profile.column_type, ColumnType::Integer);
        assert!(!profile.nullable);
        assert_eq!(profile.evaluated, vec![TypeKind::Integer]);
    }

    #[test]
    fn test_decimal_precision_and_scale() {
        let profile = infer(&["10.5", "3", "-0.25"]);
        assert_eq!(
            profile.column_type,
            ColumnType::Decimal {
                precision: 4,
                scale: 2
            }
        );
    }

    #[test]
    fn test_integer_overflow_falls_to_decimal() {
        let profile = infer(&["1", "99999999999999999999"]);
        assert_eq!(
            profile.column_type,
            ColumnType::Decimal {
                precision: 20,
                scale: 0
            }
        );
    }

    #[test]
    fn test_decimal_beyond_max_precision_is_text() {
        let long = format!("{}.5", "1".repeat(38));
        let profile = infer(&[long.as_str()]);
        assert_eq!(profile.column_type, ColumnType::Text);
    }

    #[test]
    fn test_date_requires_one_shared_format() {
        let profile = infer(&["2023-01-01", "2023-02-15"]);
        assert_eq!(
            profile.column_type,
            ColumnType::Date {
                format: "%Y-%m-%d".to_string()
            }
        );

        // Each value is a date, but no single format matches both.
        let mixed = infer(&["2023-01-01", "31/12/2023"]);
        assert_eq!(mixed.column_type, ColumnType::Text);
    }

    #[test]
    fn test_ambiguous_day_month_picks_first_listed_format() {
        let profile = infer(&["01/02/2023", "03/04/2023"]);
        assert_eq!(
            profile.column_type,
            ColumnType::Date {
                format: "%d/%m/%Y".to_string()
            }
        );

        let us = infer(&["01/02/2023", "12/31/2023"]);
        assert_eq!(
            us.column_type,
            ColumnType::Date {
                format: "%m/%d/%Y".to_string()
            }
        );
    }

    #[test]
    fn test_datetime_column() {
        let profile = infer(&["2023-01-01 10:00:00", "2023-01-02T11:30:00"]);
        assert_eq!(profile.column_type, ColumnType::Text);

        let profile = infer(&["2023-01-01 10:00:00", "2023-01-02 11:30:59"]);
        assert_eq!(
            profile.column_type,
            ColumnType::DateTime {
                format: "%Y-%m-%d %H:%M:%S".to_string()
            }
        );
        assert_eq!(profile.evaluated.len(), 4);
    }

    #[test]
    fn test_empty_values_make_nullable() {
        let profile = infer(&["1", "  ", "2"]);
        assert_eq!(profile.column_type, ColumnType::Integer);
        assert!(profile.nullable);
        assert_eq!(profile.empty, 1);
        assert_eq!(profile.non_empty, 2);
    }

    #[test]
    fn test_all_empty_column_is_nullable_text() {
        let profile = infer(&["", " "]);
        assert_eq!(profile.column_type, ColumnType::Text);
        assert!(profile.nullable);

        let none = infer(&[]);
        assert_eq!(none.column_type, ColumnType::Text);
        assert!(none.nullable);
    }

    #[test]
    fn test_max_length_counts_characters() {
        let profile = infer(&["café", "ab"]);
        assert_eq!(profile.max_length, 4);
    }
}
