//! Chunked batch loading.
//!
//! The source file is streamed a second time, independently of the inference
//! pass. Rows are grouped into chunks; each row is converted on its own and a
//! bad row only removes itself from its chunk. Each chunk's valid rows are
//! sent as one multi-row `INSERT`, retried once on failure. Nothing a row or
//! chunk does aborts the load; the outcome is folded into a [`LoadResult`].

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use csvland_ingest::{CsvSource, RawRow};
use csvland_model::{
    ChunkOutcome, ChunkStatus, EventSink, LoadResult, RowRejection, RunEvent, SourceFile,
    SqlValue, TableColumn, TableSpec, convert_value,
};

use crate::client::DatabaseClient;
use crate::ddl::insert_sql;
use crate::error::LoadError;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Attempts per chunk: the first insert plus one retry.
pub const INSERT_ATTEMPTS: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Requested rows per chunk, before the bind-parameter cap.
    pub chunk_size: usize,
    /// Value written to the import-timestamp column of every row.
    pub import_timestamp: NaiveDateTime,
}

impl LoadOptions {
    pub fn new(chunk_size: usize, import_timestamp: NaiveDateTime) -> Self {
        Self {
            chunk_size,
            import_timestamp,
        }
    }
}

/// Largest chunk that keeps one `INSERT` within `max_bind_parameters`.
pub fn effective_chunk_size(
    chunk_size: usize,
    max_bind_parameters: usize,
    columns_per_row: usize,
) -> usize {
    let cap = max_bind_parameters / columns_per_row.max(1);
    chunk_size.min(cap).max(1)
}

/// Streams `source` into the table described by `spec`.
///
/// # Errors
///
/// Only structural problems are errors: the file cannot be re-read, or its
/// header no longer matches `spec`. Rejected rows and failed chunks are
/// reported through `sink` and counted in the returned [`LoadResult`].
pub fn load(
    client: &dyn DatabaseClient,
    source: &SourceFile,
    spec: &TableSpec,
    options: &LoadOptions,
    sink: &dyn EventSink,
) -> Result<LoadResult, LoadError> {
    let mut csv = CsvSource::open(source)?;

    let data_columns: Vec<&TableColumn> = spec.data_columns().collect();
    let expected: Vec<String> = data_columns.iter().map(|c| c.name.clone()).collect();
    if csv.headers() != expected.as_slice() {
        return Err(LoadError::HeaderMismatch {
            path: source.path.clone(),
            expected,
            found: csv.headers().to_vec(),
        });
    }

    let columns_per_row = spec.insert_columns().count();
    let rows_per_chunk = effective_chunk_size(
        options.chunk_size,
        client.max_bind_parameters(),
        columns_per_row,
    );
    if rows_per_chunk < options.chunk_size {
        warn!(
            requested = options.chunk_size,
            effective = rows_per_chunk,
            columns_per_row,
            "chunk size reduced to stay within the bind parameter limit"
        );
    }

    let import_timestamp = SqlValue::DateTime(options.import_timestamp);
    let mut result = LoadResult::new(rows_per_chunk);
    let mut chunk: Vec<RawRow> = Vec::with_capacity(rows_per_chunk);
    let mut index = 0usize;

    loop {
        chunk.clear();
        while chunk.len() < rows_per_chunk {
            match csv.next_row()? {
                Some(row) => chunk.push(row),
                None => break,
            }
        }
        if chunk.is_empty() {
            break;
        }

        let outcome = load_chunk(
            client,
            spec,
            &data_columns,
            &import_timestamp,
            index,
            &chunk,
            sink,
        );
        if outcome.status == ChunkStatus::Failed {
            sink.emit(&RunEvent::ChunkFailed {
                outcome: outcome.clone(),
            });
        } else {
            sink.emit(&RunEvent::ChunkLoaded {
                outcome: outcome.clone(),
            });
        }
        result.record_chunk(outcome);
        index += 1;
    }

    debug!(
        rows_read = result.rows_read,
        rows_inserted = result.rows_inserted,
        rows_rejected = result.rows_rejected,
        chunks = result.chunks.len(),
        "load finished"
    );
    Ok(result)
}

fn load_chunk(
    client: &dyn DatabaseClient,
    spec: &TableSpec,
    columns: &[&TableColumn],
    import_timestamp: &SqlValue,
    index: usize,
    rows: &[RawRow],
    sink: &dyn EventSink,
) -> ChunkOutcome {
    let mut params = Vec::with_capacity(rows.len() * (columns.len() + 1));
    let mut valid = 0usize;

    for row in rows {
        match convert_row(row, columns) {
            Ok(values) => {
                params.extend(values);
                params.push(import_timestamp.clone());
                valid += 1;
            }
            Err(rejection) => sink.emit(&RunEvent::RowRejected {
                row: row.index,
                line: row.line,
                rejection,
            }),
        }
    }

    let mut outcome = ChunkOutcome {
        index,
        rows: rows.len(),
        inserted: 0,
        rejected: rows.len() - valid,
        attempts: 0,
        status: ChunkStatus::Empty,
        error: None,
    };
    if valid == 0 {
        return outcome;
    }

    let sql = insert_sql(spec, valid);
    while outcome.attempts < INSERT_ATTEMPTS {
        outcome.attempts += 1;
        match client.execute(&sql, &params) {
            Ok(affected) => {
                if affected != valid {
                    warn!(chunk = index, expected = valid, affected, "unexpected affected row count");
                }
                outcome.inserted = valid;
                outcome.status = ChunkStatus::Inserted;
                outcome.error = None;
                return outcome;
            }
            Err(err) => {
                warn!(chunk = index, attempt = outcome.attempts, error = %err, "chunk insert failed");
                outcome.error = Some(err.to_string());
            }
        }
    }

    outcome.rejected = rows.len();
    outcome.status = ChunkStatus::Failed;
    outcome
}

/// Converts one raw row to bindable values for `columns`.
pub fn convert_row(row: &RawRow, columns: &[&TableColumn]) -> Result<Vec<SqlValue>, RowRejection> {
    if row.len() != columns.len() {
        return Err(RowRejection::FieldCount {
            expected: columns.len(),
            found: row.len(),
        });
    }

    let mut values = Vec::with_capacity(columns.len());
    for (column, field) in columns.iter().zip(&row.fields) {
        let Some(raw) = field else {
            return Err(RowRejection::Undecodable {
                column: column.name.clone(),
            });
        };

        if raw.trim().is_empty() {
            if column.nullable {
                values.push(SqlValue::Null);
                continue;
            }
            return Err(RowRejection::MissingValue {
                column: column.name.clone(),
            });
        }

        let value =
            convert_value(raw, &column.column_type).map_err(|error| RowRejection::Conversion {
                column: column.name.clone(),
                value: raw.clone(),
                error,
            })?;
        values.push(value);
    }
    Ok(values)
}
