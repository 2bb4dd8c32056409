use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use crate::load::LoadResult;

/// Final accounting for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub source_file: PathBuf,
    pub table: String,
    pub table_created: bool,
    pub rows_read: usize,
    pub rows_inserted: usize,
    pub rows_rejected: usize,
    pub chunks_total: usize,
    pub chunks_failed: usize,
    pub import_timestamp: NaiveDateTime,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl RunSummary {
    pub fn new(
        source_file: PathBuf,
        table: String,
        table_created: bool,
        load: &LoadResult,
        import_timestamp: NaiveDateTime,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let elapsed_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;
        Self {
            source_file,
            table,
            table_created,
            rows_read: load.rows_read,
            rows_inserted: load.rows_inserted,
            rows_rejected: load.rows_rejected,
            chunks_total: load.chunks.len(),
            chunks_failed: load.chunks_failed(),
            import_timestamp,
            started_at,
            finished_at,
            elapsed_ms,
        }
    }

    pub fn has_rejections(&self) -> bool {
        self.rows_rejected > 0
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}
