//! CLI argument definitions for csvland.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "csvland",
    version,
    about = "Load the newest CSV extract from a folder into a database table",
    long_about = "Load the newest CSV extract from a folder into a database table.\n\n\
                  Column types are inferred from a sample of rows. The target table\n\
                  is created on first use, and every row of a run is stamped with\n\
                  the same import timestamp."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Also append logs to a file (stderr output continues).
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include cell values in rejected-row warnings.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load the newest matching file into the configured table.
    Run(RunArgs),

    /// Show matching files, the inferred schema, and the DDL.
    Inspect(InspectArgs),

    /// Write a default configuration file.
    Init(InitArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Path to the JSON configuration file.
    #[arg(long = "config", value_name = "PATH", default_value = "config.json")]
    pub config: PathBuf,

    /// Folder to scan instead of csv.folderPath.
    #[arg(long = "folder", value_name = "DIR")]
    pub folder: Option<PathBuf>,

    /// Target table instead of csv.tableName.
    #[arg(long = "table", value_name = "NAME")]
    pub table: Option<String>,

    /// Select and infer, print the plan, and leave the database untouched.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Print the run summary as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// Path to the JSON configuration file.
    #[arg(long = "config", value_name = "PATH", default_value = "config.json")]
    pub config: PathBuf,
}

#[derive(Parser)]
pub struct InitArgs {
    /// Where to write the configuration file.
    #[arg(long = "config", value_name = "PATH", default_value = "config.json")]
    pub config: PathBuf,

    /// Overwrite an existing file.
    #[arg(long = "force")]
    pub force: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
