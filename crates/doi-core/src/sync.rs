//! Spreadsheet-level publish run: reconcile every row, then write the
//! identifiers back.

use std::path::{Path, PathBuf};

use tracing::info;

use doi_ingest::{Table, create_backup, read_table, write_table};
use doi_model::{Row, RowColumns, RowField, RowOutcome, resolve_column};
use doi_registry::Transport;

use crate::engine::ReconciliationEngine;

/// Identifier column written back to the table.
pub const DOI_COLUMN: &str = "doi";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Skip the timestamped copy taken before write-back.
    pub no_backup: bool,
}

/// Outcome of one publish run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// One outcome per data row, in file order.
    pub outcomes: Vec<RowOutcome>,
    pub success: usize,
    pub failure: usize,
    pub skipped: usize,
    pub backup: Option<PathBuf>,
    /// Whether the input file was overwritten.
    pub written: bool,
}

impl SyncReport {
    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    fn record(&mut self, outcome: RowOutcome) {
        match &outcome {
            RowOutcome::Success { .. } => self.success += 1,
            RowOutcome::Failure(_) => self.failure += 1,
            RowOutcome::Skipped(_) => self.skipped += 1,
        }
        self.outcomes.push(outcome);
    }
}

pub struct SpreadsheetSync<'e, 'c, T> {
    engine: &'e ReconciliationEngine<'c, T>,
    options: SyncOptions,
}

impl<'e, 'c, T: Transport> SpreadsheetSync<'e, 'c, T> {
    pub fn new(engine: &'e ReconciliationEngine<'c, T>, options: SyncOptions) -> Self {
        Self { engine, options }
    }

    /// Reconciles every row of `table` in order and stores returned
    /// identifiers in the `doi` column, appending it when absent.
    pub fn sync_table(&self, table: &mut Table) -> SyncReport {
        let doi_column = resolve_column(&table.headers, RowField::Doi.aliases())
            .unwrap_or_else(|| table.ensure_column(DOI_COLUMN));
        let columns = RowColumns::resolve(&table.headers);
        let mut report = SyncReport::default();

        for index in 0..table.len() {
            let row = Row::from_cells(&columns, &table.rows[index]);
            let outcome = self.engine.reconcile(index, &row);
            if let Some(identifier) = outcome.identifier() {
                table.set_cell(index, doi_column, identifier);
            }
            report.record(outcome);
        }
        report
    }

    /// Loads `path`, reconciles it and, unless this is a dry run, backs it
    /// up and overwrites it in place.
    pub fn sync_file(&self, path: &Path) -> doi_ingest::Result<SyncReport> {
        let mut table = read_table(path)?;
        info!(path = %path.display(), rows = table.len(), "loaded spreadsheet");

        let mut report = self.sync_table(&mut table);

        if self.engine.options().dry_run {
            info!("dry run: spreadsheet left unchanged");
            return Ok(report);
        }
        if !self.options.no_backup {
            report.backup = create_backup(path)?;
        }
        write_table(path, &table)?;
        report.written = true;
        info!(path = %path.display(), "spreadsheet updated");
        Ok(report)
    }
}
