use anyhow::{Context, Result};
use tracing::info;

use csvland_cli::config::{AppConfig, load_config, write_default_config};
use csvland_cli::logging::TracingSink;
use csvland_cli::pipeline::{plan, run};

use crate::cli::{InitArgs, InspectArgs, RunArgs};
use crate::summary::{print_candidates, print_plan, print_run_summary};

pub fn run_load(args: &RunArgs, log_data: bool) -> Result<()> {
    let mut config = load_config(&args.config).context("load configuration")?;
    apply_overrides(&mut config, args)?;
    let sink = TracingSink::new(log_data);

    if args.dry_run {
        let plan = plan(&config, &sink).context("plan run")?;
        print_plan(&plan);
        return Ok(());
    }

    let summary = run(&config, &sink)?;
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("serialize summary")?
        );
    } else {
        print_run_summary(&summary);
    }
    Ok(())
}

pub fn run_inspect(args: &InspectArgs, log_data: bool) -> Result<()> {
    let config = load_config(&args.config).context("load configuration")?;
    let plan = plan(&config, &TracingSink::new(log_data)).context("inspect source")?;
    print_candidates(&plan);
    print_plan(&plan);
    Ok(())
}

pub fn run_init(args: &InitArgs) -> Result<()> {
    write_default_config(&args.config, args.force)?;
    info!(path = %args.config.display(), "default configuration written");
    println!(
        "Wrote {}. Edit the database and csv sections before running.",
        args.config.display()
    );
    Ok(())
}

fn apply_overrides(config: &mut AppConfig, args: &RunArgs) -> Result<()> {
    if let Some(folder) = &args.folder {
        config.csv.folder_path.clone_from(folder);
    }
    if let Some(table) = &args.table {
        config.csv.table_name.clone_from(table);
    }
    config.validate().context("validate overrides")?;
    Ok(())
}
