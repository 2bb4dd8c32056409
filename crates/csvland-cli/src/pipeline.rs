//! Run orchestration: selection, inference, provisioning, and loading.
//!
//! Any structural error aborts the run and is reported once as a
//! [`RunEvent::RunFailed`]. Row and chunk failures are not errors here; they
//! end up as counts in the [`RunSummary`].

use std::path::PathBuf;

use chrono::{SubsecRound, Utc};
use thiserror::Error;
use tracing::{info, info_span};

use csvland_ingest::{IngestError, infer_schema, list_matching_files, select_source_file};
use csvland_load::{
    DatabaseClient, DbError, LoadError, LoadOptions, ProvisionError, SqliteClient,
    create_table_sql_with, ensure_table, load, sqlite_column_type,
};
use csvland_model::{
    EventSink, InferredSchema, ModelError, RunEvent, RunSummary, SourceFile, TableSpec,
};

use crate::config::{AppConfig, ConfigError};

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Database(#[from] DbError),
}

/// What a run would do, computed without touching the database.
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Every matching file in the folder, sorted by name.
    pub candidates: Vec<PathBuf>,
    pub source: SourceFile,
    pub schema: InferredSchema,
    pub table: TableSpec,
    pub ddl: String,
}

/// Opens the configured database, runs, and closes the connection on every
/// exit path.
pub fn run(config: &AppConfig, sink: &dyn EventSink) -> Result<RunSummary, RunError> {
    let path = config.database_path();
    info!(
        host = %config.database.host,
        port = config.database.port,
        user = %config.database.user,
        database = %path.display(),
        "connecting to database"
    );
    announce(config, sink);
    let client = SqliteClient::open(&path).map_err(|err| report(sink, err.into()))?;

    let result = run_connected(config, &client, sink);
    let closed = client.close();
    match (result, closed) {
        (Ok(summary), Ok(())) => Ok(summary),
        (Err(err), _) => Err(err),
        (Ok(_), Err(err)) => Err(report(sink, err.into())),
    }
}

/// Runs against an already open client. The caller owns the connection.
pub fn run_with_client(
    config: &AppConfig,
    client: &dyn DatabaseClient,
    sink: &dyn EventSink,
) -> Result<RunSummary, RunError> {
    announce(config, sink);
    run_connected(config, client, sink)
}

fn announce(config: &AppConfig, sink: &dyn EventSink) {
    sink.emit(&RunEvent::RunStarted {
        folder: config.csv.folder_path.clone(),
        table: config.csv.table_name.clone(),
    });
}

fn run_connected(
    config: &AppConfig,
    client: &dyn DatabaseClient,
    sink: &dyn EventSink,
) -> Result<RunSummary, RunError> {
    let span = info_span!("run", table = %config.csv.table_name);
    let _guard = span.enter();
    execute(config, client, sink).map_err(|err| report(sink, err))
}

fn execute(
    config: &AppConfig,
    client: &dyn DatabaseClient,
    sink: &dyn EventSink,
) -> Result<RunSummary, RunError> {
    let started_at = Utc::now();
    let import_timestamp = started_at.naive_utc().trunc_subsecs(0);

    let format = config.csv_format()?;
    let source = select_source_file(&config.csv.folder_path, &config.csv.extension, &format)?;
    sink.emit(&RunEvent::FileSelected {
        path: source.path.clone(),
        modified: source.modified,
    });

    let schema = infer_schema(&source, &config.inference_options(), sink)?;
    let spec = TableSpec::from_schema(&config.csv.table_name, &schema)?;
    let outcome = ensure_table(client, &spec, config.csv.create_table_if_not_exists, sink)?;

    let options = LoadOptions::new(config.csv.chunk_size, import_timestamp);
    let result = load(client, &source, &spec, &options, sink)?;

    let summary = RunSummary::new(
        source.path.clone(),
        spec.name.clone(),
        outcome.created(),
        &result,
        import_timestamp,
        started_at,
        Utc::now(),
    );
    sink.emit(&RunEvent::RunFinished {
        summary: summary.clone(),
    });
    Ok(summary)
}

/// Selects and infers, then renders the DDL the run would issue.
pub fn plan(config: &AppConfig, sink: &dyn EventSink) -> Result<RunPlan, RunError> {
    let format = config.csv_format()?;
    let candidates = list_matching_files(&config.csv.folder_path, &config.csv.extension)?;
    let source = select_source_file(&config.csv.folder_path, &config.csv.extension, &format)?;
    sink.emit(&RunEvent::FileSelected {
        path: source.path.clone(),
        modified: source.modified,
    });

    let schema = infer_schema(&source, &config.inference_options(), sink)?;
    let table = TableSpec::from_schema(&config.csv.table_name, &schema)?;
    let ddl = create_table_sql_with(&table, sqlite_column_type);
    Ok(RunPlan {
        candidates,
        source,
        schema,
        table,
        ddl,
    })
}

fn report(sink: &dyn EventSink, err: RunError) -> RunError {
    sink.emit(&RunEvent::RunFailed {
        message: err.to_string(),
    });
    err
}
