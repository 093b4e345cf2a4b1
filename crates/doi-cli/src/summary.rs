use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use doi_core::PruneAction;
use doi_model::{FailureReason, RowOutcome, SkipReason};

use crate::types::{PatchSummary, PruneSummary, PublishSummary};

pub fn print_publish_summary(summary: &PublishSummary) {
    let report = &summary.report;
    println!("File: {}", summary.file.display());
    if let Some(path) = &report.backup {
        println!("Backup: {}", path.display());
    }
    if summary.dry_run {
        println!("Dry run: no records created, file left unchanged");
    }

    let mut table = counts_table();
    table.add_row(vec![
        Cell::new("Rows").add_attribute(Attribute::Bold),
        Cell::new(report.total()).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("Success"), count_cell(report.success, Color::Green)]);
    table.add_row(vec![Cell::new("Failed"), count_cell(report.failure, Color::Red)]);
    table.add_row(vec![Cell::new("Skipped"), count_cell(report.skipped, Color::Yellow)]);
    println!("{table}");

    print_row_issues(&report.outcomes);
}

/// Lists rows that did not succeed, numbered as data rows from 1.
fn print_row_issues(outcomes: &[RowOutcome]) {
    let issues: Vec<(usize, &RowOutcome)> = outcomes
        .iter()
        .enumerate()
        .filter(|(_, outcome)| !outcome.is_success())
        .map(|(index, outcome)| (index + 1, outcome))
        .collect();
    if issues.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Status"),
        header_cell("Reason"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 1, CellAlignment::Center);
    for (row, outcome) in issues {
        table.add_row(vec![
            Cell::new(row),
            status_cell(outcome),
            Cell::new(outcome_reason(outcome)),
        ]);
    }
    println!();
    println!("Rows needing attention:");
    println!("{table}");
}

pub fn print_prune_summary(summary: &PruneSummary) {
    let report = &summary.report;
    if !report.actions.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![header_cell("DOI"), header_cell("Result")]);
        apply_table_style(&mut table);
        for (identifier, action) in &report.actions {
            table.add_row(vec![Cell::new(identifier), action_cell(action)]);
        }
        println!("{table}");
    }

    let deleted_label = if summary.dry_run {
        "Would delete"
    } else {
        "Deleted"
    };
    let mut table = counts_table();
    table.add_row(vec![
        Cell::new("Candidates").add_attribute(Attribute::Bold),
        Cell::new(report.total()).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new(deleted_label),
        count_cell(report.deleted(), Color::Green),
    ]);
    table.add_row(vec![Cell::new("Skipped"), count_cell(report.skipped(), Color::Yellow)]);
    table.add_row(vec![Cell::new("Failed"), count_cell(report.failed(), Color::Red)]);
    println!("{table}");
}

pub fn print_patch_summary(summary: &PatchSummary) {
    let report = &summary.report;
    if report.cancelled {
        println!("Operation cancelled by user");
    }
    if summary.dry_run {
        println!("Dry run: no PATCH requests sent");
    }
    let mut table = counts_table();
    table.add_row(vec![
        Cell::new("Total DOIs").add_attribute(Attribute::Bold),
        Cell::new(report.total).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("Successful"), count_cell(report.success, Color::Green)]);
    table.add_row(vec![Cell::new("Failed"), count_cell(report.failed, Color::Red)]);
    println!("{table}");
}

fn counts_table() -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Summary"), header_cell("Count")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table
}

fn outcome_reason(outcome: &RowOutcome) -> String {
    match outcome {
        RowOutcome::Success { .. } => String::new(),
        RowOutcome::Skipped(SkipReason::ValidationFailed { reason, .. }) => reason.clone(),
        RowOutcome::Skipped(reason) => reason.to_string(),
        RowOutcome::Failure(FailureReason::CreateFailed { status, body }) => {
            format!("create returned {status}: {}", first_line(body))
        }
        RowOutcome::Failure(reason) => reason.to_string(),
    }
}

fn first_line(text: &str) -> &str {
    let line = text.lines().next().unwrap_or_default();
    match line.char_indices().nth(120) {
        Some((index, _)) => &line[..index],
        None => line,
    }
}

fn status_cell(outcome: &RowOutcome) -> Cell {
    let cell = Cell::new(outcome.label().to_uppercase());
    match outcome {
        RowOutcome::Success { .. } => cell.fg(Color::Green),
        RowOutcome::Failure(_) => cell.fg(Color::Red).add_attribute(Attribute::Bold),
        RowOutcome::Skipped(_) => cell.fg(Color::Yellow),
    }
}

fn action_cell(action: &PruneAction) -> Cell {
    match action {
        PruneAction::Deleted => Cell::new("deleted").fg(Color::Green),
        PruneAction::WouldDelete => Cell::new("would delete").fg(Color::Green),
        PruneAction::NotDraft { state } => dim_cell(format!(
            "skipped: state is {}",
            state.as_deref().unwrap_or("unknown")
        )),
        PruneAction::FetchFailed => {
            Cell::new("skipped: cannot retrieve metadata").fg(Color::Yellow)
        }
        PruneAction::DeleteFailed { error } => Cell::new(format!("delete failed: {error}"))
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(5)),
        ColumnConstraint::LowerBoundary(Width::Fixed(9)),
        ColumnConstraint::UpperBoundary(Width::Percentage(80)),
    ]);
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
