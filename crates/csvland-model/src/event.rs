//! Structured run events and the sink they are written to.
//!
//! Components never log run milestones through a global handle. Each entry
//! point takes an `&dyn EventSink`; the binary passes a sink that forwards to
//! `tracing`, tests pass a [`RecordingSink`].

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::column::ColumnProfile;
use crate::load::{ChunkOutcome, RowRejection};
use crate::summary::RunSummary;

#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    RunStarted {
        folder: PathBuf,
        table: String,
    },
    FileSelected {
        path: PathBuf,
        modified: DateTime<Utc>,
    },
    SchemaInferred {
        rows_sampled: usize,
        columns: Vec<ColumnProfile>,
    },
    TableProvisioned {
        table: String,
        created: bool,
    },
    RowRejected {
        /// Zero-based data row index (the header is not counted).
        row: usize,
        /// One-based line in the file where the row starts.
        line: u64,
        rejection: RowRejection,
    },
    ChunkLoaded {
        outcome: ChunkOutcome,
    },
    ChunkFailed {
        outcome: ChunkOutcome,
    },
    RunFinished {
        summary: RunSummary,
    },
    RunFailed {
        message: String,
    },
}

pub trait EventSink {
    fn emit(&self, event: &RunEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &RunEvent) {}
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<RunEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events emitted so far.
    pub fn events(&self) -> Vec<RunEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, predicate: impl Fn(&RunEvent) -> bool) -> usize {
        self.events
            .lock()
            .map(|events| events.iter().filter(|e| predicate(e)).count())
            .unwrap_or(0)
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &RunEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
