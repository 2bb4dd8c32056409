//! JSON run configuration.
//!
//! Keys are camelCase. Files written for the earlier tool (a `mysql` section,
//! `database` for the schema name, snake_case csv keys) are read as well.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use csvland_ingest::{
    CsvFormat, DEFAULT_DATE_FORMATS, DEFAULT_DATETIME_FORMATS, DEFAULT_SAMPLE_SIZE,
    InferenceOptions, resolve_encoding,
};
use csvland_load::DEFAULT_CHUNK_SIZE;

/// Upper bound accepted for `csv.chunkSize`.
pub const MAX_CHUNK_SIZE: usize = 10_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {message}")]
    Invalid { message: String },

    #[error("config file already exists: {path} (use --force to overwrite)")]
    AlreadyExists { path: PathBuf },

    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(alias = "mysql")]
    pub database: DatabaseConfig,
    pub csv: CsvConfig,
}

/// Connection settings.
///
/// The shipped client is SQLite, which only uses `path` (or `<schema>.db`).
/// `host`, `port`, and `user` are still required and are recorded in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    #[serde(alias = "database")]
    pub schema: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("schema", &self.schema)
            .field("path", &self.path)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvConfig {
    #[serde(alias = "folder_path")]
    pub folder_path: PathBuf,
    #[serde(alias = "table_name")]
    pub table_name: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default = "default_true", alias = "create_table_if_not_exists")]
    pub create_table_if_not_exists: bool,
    #[serde(default = "default_sample_size", alias = "sample_size")]
    pub sample_size: usize,
    #[serde(default = "default_chunk_size", alias = "chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_date_formats", alias = "date_formats")]
    pub date_formats: Vec<String>,
    #[serde(default = "default_datetime_formats", alias = "datetime_formats")]
    pub datetime_formats: Vec<String>,
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_true() -> bool {
    true
}

fn default_sample_size() -> usize {
    DEFAULT_SAMPLE_SIZE
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_extension() -> String {
    "csv".to_string()
}

fn default_date_formats() -> Vec<String> {
    DEFAULT_DATE_FORMATS.iter().map(|f| (*f).to_string()).collect()
}

fn default_datetime_formats() -> Vec<String> {
    DEFAULT_DATETIME_FORMATS
        .iter()
        .map(|f| (*f).to_string())
        .collect()
}

impl AppConfig {
    /// Configuration written by `csvland init`.
    pub fn template() -> Self {
        Self {
            database: DatabaseConfig {
                host: "localhost".to_string(),
                port: 3306,
                user: "loader".to_string(),
                password: "change-me".to_string(),
                schema: "warehouse".to_string(),
                path: None,
            },
            csv: CsvConfig {
                folder_path: PathBuf::from("./csv_files"),
                table_name: "imported_data".to_string(),
                encoding: default_encoding(),
                delimiter: default_delimiter(),
                create_table_if_not_exists: true,
                sample_size: default_sample_size(),
                chunk_size: default_chunk_size(),
                extension: default_extension(),
                date_formats: default_date_formats(),
                datetime_formats: default_datetime_formats(),
            },
        }
    }

    /// Checks values serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let csv = &self.csv;
        if csv.table_name.trim().is_empty() {
            return Err(invalid("csv.tableName must not be blank"));
        }
        if csv.folder_path.as_os_str().is_empty() {
            return Err(invalid("csv.folderPath must not be empty"));
        }
        self.delimiter()?;
        if resolve_encoding(&csv.encoding).is_err() {
            return Err(invalid(format!(
                "csv.encoding '{}' is unknown or not ASCII-compatible",
                csv.encoding
            )));
        }
        if csv.sample_size == 0 {
            return Err(invalid("csv.sampleSize must be at least 1"));
        }
        if !(1..=MAX_CHUNK_SIZE).contains(&csv.chunk_size) {
            return Err(invalid(format!(
                "csv.chunkSize must be between 1 and {MAX_CHUNK_SIZE}, got {}",
                csv.chunk_size
            )));
        }
        if csv.extension.trim().trim_start_matches('.').is_empty() {
            return Err(invalid("csv.extension must not be empty"));
        }
        if csv.date_formats.is_empty() || csv.datetime_formats.is_empty() {
            return Err(invalid(
                "csv.dateFormats and csv.datetimeFormats must not be empty",
            ));
        }
        if self.database.schema.trim().is_empty() && self.database.path.is_none() {
            return Err(invalid("database.schema must not be blank"));
        }
        Ok(())
    }

    /// The single delimiter byte.
    pub fn delimiter(&self) -> Result<u8, ConfigError> {
        match self.csv.delimiter.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(invalid(format!(
                "csv.delimiter must be exactly one ASCII character, got {:?}",
                self.csv.delimiter
            ))),
        }
    }

    pub fn csv_format(&self) -> Result<CsvFormat, ConfigError> {
        Ok(CsvFormat::new(self.csv.encoding.trim(), self.delimiter()?))
    }

    pub fn inference_options(&self) -> InferenceOptions {
        InferenceOptions {
            sample_size: self.csv.sample_size,
            date_formats: self.csv.date_formats.clone(),
            datetime_formats: self.csv.datetime_formats.clone(),
        }
    }

    /// SQLite database file: `database.path`, or `<schema>.db`.
    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.db", self.database.schema.trim())))
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        message: message.into(),
    }
}

/// Reads, parses, and validates a configuration file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<AppConfig, serde_json::Error> {
    serde_json::from_str(content)
}

/// Writes [`AppConfig::template`] to `path`.
pub fn write_default_config(path: &Path, force: bool) -> Result<(), ConfigError> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    let mut content = serde_json::to_string_pretty(&AppConfig::template()).map_err(|e| {
        ConfigError::Write {
            path: path.to_path_buf(),
            source: std::io::Error::other(e),
        }
    })?;
    content.push('\n');
    fs::write(path, content).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
