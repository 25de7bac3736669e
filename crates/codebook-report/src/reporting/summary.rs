//! Summary table rows: one per declared column.

use crate::dataset::SplitDataset;
use crate::error::{Result, ResultExt};
use crate::metadata::ColumnMetadata;
use crate::profiler::{calc_missingness, calc_variable_stats};
use crate::types::SummaryTableRow;
use rayon::prelude::*;
use tracing::{debug, info};

/// Builds [`SummaryTableRow`]s from a split dataset.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryRowBuilder {
    parallel: bool,
}

impl SummaryRowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute rows on the rayon thread pool. Row order is unchanged.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// One row per entry of `columns`, in the same order.
    ///
    /// Fails on the first column whose data or metadata cannot be
    /// summarized; the error names the column and its variable type.
    pub fn build(&self, split: &SplitDataset, columns: &[ColumnMetadata]) -> Result<Vec<SummaryTableRow>> {
        info!(
            "Building summary rows for {} columns ({} rows, parallel: {})",
            columns.len(),
            split.height(),
            self.parallel
        );

        let build_one = |(id, column): (usize, &ColumnMetadata)| {
            Self::build_row(id, split, column).context(column_context(column))
        };

        if self.parallel {
            columns.par_iter().enumerate().map(build_one).collect()
        } else {
            columns.iter().enumerate().map(build_one).collect()
        }
    }

    fn build_row(id: usize, split: &SplitDataset, column: &ColumnMetadata) -> Result<SummaryTableRow> {
        let values = split.value_column(&column.name)?;
        let reasons = split.reason_column(&column.name)?;
        let n_rows = split.height();

        let num_missing = values.null_count();
        let num_valid = n_rows - num_missing;

        let missingness = calc_missingness(reasons, n_rows)?;
        let stats = calc_variable_stats(values, column)?;

        debug!(
            "Column '{}': {} valid, {} missing, type {}",
            column.name,
            num_valid,
            num_missing,
            column.display_type()
        );

        Ok(SummaryTableRow {
            id,
            name: column.name.clone(),
            display_type: column.display_type().to_string(),
            description: column.description.clone(),
            num_valid,
            num_missing,
            group: column.group_key().to_string(),
            stats,
            missingness,
        })
    }
}

/// Error context naming a column and its variable type.
pub(crate) fn column_context(column: &ColumnMetadata) -> String {
    format!("Column '{}' ({})", column.name, column.variable_type)
}

/// Build summary rows with a one-off [`SummaryRowBuilder`].
pub fn build_summary_rows(
    split: &SplitDataset,
    columns: &[ColumnMetadata],
    parallel: bool,
) -> Result<Vec<SummaryTableRow>> {
    SummaryRowBuilder::new().parallel(parallel).build(split, columns)
}
