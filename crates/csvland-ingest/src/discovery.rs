//! Source file discovery and selection.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tracing::debug;

use csvland_model::SourceFile;

use crate::csv::CsvFormat;
use crate::error::{IngestError, Result};

/// A regular file whose extension matched.
#[derive(Debug, Clone)]
struct Candidate {
    path: PathBuf,
    modified: SystemTime,
}

/// Lists files in `dir` with the given extension (case-insensitive, leading
/// dot optional).
///
/// Returns files sorted by filename.
pub fn list_matching_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let (candidates, _) = scan_directory(dir, extension)?;
    let mut files: Vec<PathBuf> = candidates.into_iter().map(|c| c.path).collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Selects the most recently modified matching file in `dir`.
///
/// Files with identical modification times are ordered by file name and the
/// lexicographically greatest one wins, so the choice is stable across calls.
///
/// # Errors
///
/// - [`IngestError::DirectoryAccess`] when `dir` cannot be read
/// - [`IngestError::EmptyDirectory`] when it holds no regular files
/// - [`IngestError::NoMatchingFiles`] when no file has the extension
pub fn select_source_file(dir: &Path, extension: &str, format: &CsvFormat) -> Result<SourceFile> {
    let (candidates, files_seen) = scan_directory(dir, extension)?;

    if files_seen == 0 {
        return Err(IngestError::EmptyDirectory {
            path: dir.to_path_buf(),
        });
    }

    let latest = candidates
        .into_iter()
        .max_by(|a, b| {
            a.modified
                .cmp(&b.modified)
                .then_with(|| a.path.file_name().cmp(&b.path.file_name()))
        })
        .ok_or_else(|| IngestError::NoMatchingFiles {
            path: dir.to_path_buf(),
            extension: normalize_extension(extension),
            files_seen,
        })?;

    Ok(SourceFile {
        path: latest.path,
        modified: DateTime::<Utc>::from(latest.modified),
        encoding: format.encoding.clone(),
        delimiter: format.delimiter,
    })
}

/// Collects matching candidates and the number of regular files seen.
fn scan_directory(dir: &Path, extension: &str) -> Result<(Vec<Candidate>, usize)> {
    let wanted = normalize_extension(extension);

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryAccess {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut candidates = Vec::new();
    let mut files_seen = 0usize;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryAccess {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();
        // Dangling symlinks and files removed mid-scan are not candidates.
        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        // Skip directories
        if !metadata.is_file() {
            continue;
        }
        files_seen += 1;

        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(&wanted))
            .unwrap_or(false);
        if !matches {
            continue;
        }

        let Ok(modified) = metadata.modified() else {
            debug!(path = %path.display(), "skipping file without modification time");
            continue;
        };
        debug!(path = %path.display(), "matching file");
        candidates.push(Candidate { path, modified });
    }

    Ok((candidates, files_seen))
}

fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, modified: SystemTime) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, "A,B\n1,2\n").unwrap();
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(modified)
            .unwrap();
        path
    }

    fn base_time() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    #[test]
    fn test_selects_most_recent() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "old.csv", base_time());
        touch(dir.path(), "new.csv", base_time() + Duration::from_secs(60));
        touch(dir.path(), "newest.txt", base_time() + Duration::from_secs(120));

        let selected = select_source_file(dir.path(), "csv", &CsvFormat::default()).unwrap();
        assert_eq!(selected.file_name(), "new.csv");
        assert_eq!(selected.delimiter, b',');
        assert_eq!(selected.encoding, "utf-8");
    }

    #[test]
    fn test_extension_is_case_insensitive_with_optional_dot() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "DATA.CSV", base_time());

        let selected = select_source_file(dir.path(), ".csv", &CsvFormat::default()).unwrap();
        assert_eq!(selected.file_name(), "DATA.CSV");
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = select_source_file(&missing, "csv", &CsvFormat::default()).unwrap_err();
        assert!(matches!(err, IngestError::DirectoryAccess { .. }));
    }

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        let err = select_source_file(dir.path(), "csv", &CsvFormat::default()).unwrap_err();
        assert!(matches!(err, IngestError::EmptyDirectory { .. }));
    }

    #[test]
    fn test_no_matching_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "notes.txt", base_time());
        touch(dir.path(), "data.csv.bak", base_time());
        let err = select_source_file(dir.path(), "csv", &CsvFormat::default()).unwrap_err();
        match err {
            IngestError::NoMatchingFiles {
                extension,
                files_seen,
                ..
            } => {
                assert_eq!(extension, "csv");
                assert_eq!(files_seen, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_skipped() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "good.csv", base_time());
        std::os::unix::fs::symlink(dir.path().join("gone.csv"), dir.path().join("stale.csv"))
            .unwrap();

        let selected = select_source_file(dir.path(), "csv", &CsvFormat::default()).unwrap();
        assert_eq!(selected.file_name(), "good.csv");
        let files = list_matching_files(dir.path(), "csv").unwrap();
        assert_eq!(files, vec![dir.path().join("good.csv")]);
    }

    #[test]
    fn test_list_matching_files_sorted() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b.csv", base_time());
        touch(dir.path(), "a.csv", base_time() + Duration::from_secs(5));
        touch(dir.path(), "c.json", base_time());

        let files = list_matching_files(dir.path(), "csv").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }
}
