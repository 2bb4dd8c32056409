use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use csvland_cli::pipeline::RunPlan;
use csvland_model::{ColumnProfile, ColumnType, RunSummary};

pub fn print_run_summary(summary: &RunSummary) {
    println!("Source: {}", summary.source_file.display());
    println!(
        "Table: {}{}",
        summary.table,
        if summary.table_created { " (created)" } else { "" }
    );
    println!(
        "Import timestamp: {}",
        summary.import_timestamp.format("%Y-%m-%d %H:%M:%S")
    );

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rows read"),
        header_cell("Inserted"),
        header_cell("Rejected"),
        header_cell("Chunks"),
        header_cell("Failed chunks"),
        header_cell("Elapsed"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 0..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new(summary.rows_read).add_attribute(Attribute::Bold),
        count_cell(summary.rows_inserted, Color::Green),
        count_cell(summary.rows_rejected, Color::Yellow),
        Cell::new(summary.chunks_total),
        count_cell(summary.chunks_failed, Color::Red),
        Cell::new(format!("{:.2}s", summary.elapsed().as_secs_f64())),
    ]);
    println!("{table}");
}

pub fn print_candidates(plan: &RunPlan) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("File"), header_cell("Selected")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    for path in &plan.candidates {
        let selected = *path == plan.source.path;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(name),
            if selected {
                Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold)
            } else {
                dim_cell("-")
            },
        ]);
    }
    println!("Matching files:");
    println!("{table}");
}

pub fn print_plan(plan: &RunPlan) {
    println!("Source: {}", plan.source.path.display());
    println!("Modified: {}", plan.source.modified.format("%Y-%m-%d %H:%M:%S UTC"));
    println!(
        "Sampled rows: {} (skipped {}, undecodable values {})",
        plan.schema.rows_sampled, plan.schema.rows_skipped, plan.schema.undecodable_values
    );

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Nullable"),
        header_cell("Values"),
        header_cell("Empty"),
        header_cell("Max length"),
        header_cell("Format"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);
    for column in &plan.schema.columns {
        table.add_row(schema_row(column));
    }
    println!("{table}");
    println!();
    println!("{};", plan.ddl);
}

fn schema_row(column: &ColumnProfile) -> Vec<Cell> {
    let format = match &column.column_type {
        ColumnType::Date { format } | ColumnType::DateTime { format } => Cell::new(format),
        _ => dim_cell("-"),
    };
    vec![
        Cell::new(&column.name)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        Cell::new(column.column_type.sql_type()),
        if column.nullable {
            Cell::new("yes")
        } else {
            dim_cell("no")
        },
        Cell::new(column.non_empty),
        count_cell(column.empty, Color::Yellow),
        Cell::new(column.max_length),
        format,
    ]
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
