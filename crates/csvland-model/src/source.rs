use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The CSV file selected for a run, with the format used to read it.
///
/// Both read passes of a run (inference sample and full load) use the same
/// `SourceFile`, so they always agree on delimiter and encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
    /// Encoding label as configured (for example `utf-8` or `windows-1252`).
    pub encoding: String,
    pub delimiter: u8,
}

impl SourceFile {
    /// File name for display, lossily converted.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
