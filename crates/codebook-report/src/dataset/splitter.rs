//! Column splitting: compound cells into value and missing-reason frames.

use super::{Cell, CellValue, CompoundColumn, Dataset, ValueKind};
use crate::error::{ReportError, Result};
use polars::prelude::*;
use std::collections::HashSet;
use tracing::debug;

/// The two parallel views of a compound dataset.
///
/// Both frames have the same column names, in the same order, and
/// `height` rows.
#[derive(Debug, Clone)]
pub struct SplitDataset {
    /// Present value of each cell, null where missing.
    pub values: DataFrame,
    /// Missing reason of each cell, null where present.
    pub reasons: DataFrame,
    height: usize,
}

impl SplitDataset {
    /// Number of rows, also when no columns were selected.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn value_column(&self, name: &str) -> Result<&Series> {
        Self::lookup(&self.values, name)
    }

    pub fn reason_column(&self, name: &str) -> Result<&Series> {
        Self::lookup(&self.reasons, name)
    }

    fn lookup<'a>(frame: &'a DataFrame, name: &str) -> Result<&'a Series> {
        frame
            .column(name)
            .map(|c| c.as_materialized_series())
            .map_err(|_| ReportError::ColumnNotFound(name.to_string()))
    }
}

/// Splits compound datasets into [`SplitDataset`]s.
pub struct ColumnSplitter;

impl ColumnSplitter {
    /// Split every column of the dataset.
    pub fn split(dataset: &Dataset) -> Result<SplitDataset> {
        let names: Vec<&str> = dataset.column_names().collect();
        Self::split_columns(dataset, &names)
    }

    /// Split the named columns, in the given order.
    ///
    /// Fails with [`ReportError::ColumnNotFound`] when a name is absent from
    /// the dataset.
    pub fn split_columns(dataset: &Dataset, names: &[&str]) -> Result<SplitDataset> {
        let mut seen = HashSet::with_capacity(names.len());
        let mut values = Vec::with_capacity(names.len());
        let mut reasons = Vec::with_capacity(names.len());

        for &name in names {
            if !seen.insert(name) {
                return Err(ReportError::DuplicateColumn(name.to_string()));
            }
            let column = dataset.column(name)?;
            values.push(Self::value_series(column)?.into_column());
            reasons.push(Self::reason_series(column).into_column());
        }

        debug!(
            "Split {} columns x {} rows into value and reason frames",
            names.len(),
            dataset.height()
        );

        Ok(SplitDataset {
            values: DataFrame::new(values)?,
            reasons: DataFrame::new(reasons)?,
            height: dataset.height(),
        })
    }

    fn value_series(column: &CompoundColumn) -> Result<Series> {
        let name: PlSmallStr = column.name.as_str().into();
        let cells = &column.cells;

        let series = match column.value_kind()? {
            None | Some(ValueKind::Text) => {
                let values: Vec<Option<&str>> = cells
                    .iter()
                    .map(|cell| match cell {
                        Cell::Present(CellValue::Text(s)) => Some(s.as_str()),
                        _ => None,
                    })
                    .collect();
                Series::new(name, values)
            }
            Some(ValueKind::Integer) => {
                let values: Vec<Option<i64>> = cells
                    .iter()
                    .map(|cell| match cell {
                        Cell::Present(CellValue::Integer(v)) => Some(*v),
                        _ => None,
                    })
                    .collect();
                Series::new(name, values)
            }
            Some(ValueKind::Real) => {
                let values: Vec<Option<f64>> = cells
                    .iter()
                    .map(|cell| match cell {
                        Cell::Present(CellValue::Integer(v)) => Some(*v as f64),
                        Cell::Present(CellValue::Real(v)) => Some(*v),
                        _ => None,
                    })
                    .collect();
                Series::new(name, values)
            }
            Some(ValueKind::Labels) => {
                let lists: ListChunked = cells
                    .iter()
                    .map(|cell| match cell {
                        Cell::Present(CellValue::Labels(labels)) => {
                            Some(Series::new(PlSmallStr::EMPTY, labels.as_slice()))
                        }
                        _ => None,
                    })
                    .collect();
                lists.with_name(name).into_series()
            }
        };

        Ok(series)
    }

    fn reason_series(column: &CompoundColumn) -> Series {
        let reasons: Vec<Option<&str>> = column.cells.iter().map(Cell::missing_reason).collect();
        Series::new(column.name.as_str().into(), reasons)
    }
}
