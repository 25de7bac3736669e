//! Compound-cell datasets.
//!
//! Every cell of a bundle dataset is either a present value or a missing
//! reason. The [`splitter`] turns a [`Dataset`] into the two polars frames
//! the statistics run on.

pub mod splitter;

pub use splitter::{ColumnSplitter, SplitDataset};

use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A present cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Real(f64),
    Text(String),
    /// Labels selected in a multiselect item.
    Labels(Vec<String>),
}

impl CellValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            CellValue::Integer(_) => ValueKind::Integer,
            CellValue::Real(_) => ValueKind::Real,
            CellValue::Text(_) => ValueKind::Text,
            CellValue::Labels(_) => ValueKind::Labels,
        }
    }
}

/// Kind of value a column holds once split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Integer,
    Real,
    Text,
    Labels,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Integer => "integer",
            ValueKind::Real => "real",
            ValueKind::Text => "text",
            ValueKind::Labels => "label set",
        }
    }

    /// Common kind of two value kinds; integers widen to reals.
    pub fn unify(self, other: ValueKind) -> Option<ValueKind> {
        match (self, other) {
            (a, b) if a == b => Some(a),
            (ValueKind::Integer, ValueKind::Real) | (ValueKind::Real, ValueKind::Integer) => {
                Some(ValueKind::Real)
            }
            _ => None,
        }
    }
}

/// One cell: a value, or the reason it is missing.
///
/// Serialized as `{"value": ...}` or `{"missing_reason": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    #[serde(rename = "value")]
    Present(CellValue),
    #[serde(rename = "missing_reason")]
    Missing(String),
}

impl Cell {
    pub fn value(&self) -> Option<&CellValue> {
        match self {
            Cell::Present(value) => Some(value),
            Cell::Missing(_) => None,
        }
    }

    pub fn missing_reason(&self) -> Option<&str> {
        match self {
            Cell::Present(_) => None,
            Cell::Missing(reason) => Some(reason),
        }
    }
}

/// A named column of compound cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundColumn {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl CompoundColumn {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Common value kind of all present cells, `None` when every cell is missing.
    pub fn value_kind(&self) -> Result<Option<ValueKind>> {
        let mut kind: Option<ValueKind> = None;
        for (row, value) in self
            .cells
            .iter()
            .enumerate()
            .filter_map(|(row, cell)| cell.value().map(|v| (row, v)))
        {
            let next = value.kind();
            kind = match kind {
                None => Some(next),
                Some(current) => Some(current.unify(next).ok_or_else(|| {
                    ReportError::MixedValueKinds {
                        column: self.name.clone(),
                        first: current.as_str(),
                        second: next.as_str(),
                        row,
                    }
                })?),
            };
        }
        Ok(kind)
    }
}

/// Immutable, rectangular collection of compound columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CompoundColumn>", into = "Vec<CompoundColumn>")]
pub struct Dataset {
    columns: Vec<CompoundColumn>,
    height: usize,
}

impl Dataset {
    /// Build a dataset, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<CompoundColumn>) -> Result<Self> {
        let height = columns.first().map(CompoundColumn::len).unwrap_or(0);
        let mut seen = HashSet::with_capacity(columns.len());

        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(ReportError::DuplicateColumn(column.name.clone()));
            }
            if column.len() != height {
                return Err(ReportError::RaggedColumns {
                    column: column.name.clone(),
                    expected: height,
                    found: column.len(),
                });
            }
        }

        Ok(Self { columns, height })
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[CompoundColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Result<&CompoundColumn> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ReportError::ColumnNotFound(name.to_string()))
    }
}

impl TryFrom<Vec<CompoundColumn>> for Dataset {
    type Error = ReportError;

    fn try_from(columns: Vec<CompoundColumn>) -> Result<Self> {
        Dataset::new(columns)
    }
}

impl From<Dataset> for Vec<CompoundColumn> {
    fn from(dataset: Dataset) -> Self {
        dataset.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn present(v: i64) -> Cell {
        Cell::Present(CellValue::Integer(v))
    }

    #[test]
    fn test_cell_json_forms() {
        let cells: Vec<Cell> = serde_json::from_value(json!([
            {"value": 3},
            {"value": 2.5},
            {"value": "yes"},
            {"value": ["a", "b"]},
            {"missing_reason": "refused"}
        ]))
        .unwrap();

        assert_eq!(cells[0], Cell::Present(CellValue::Integer(3)));
        assert_eq!(cells[1], Cell::Present(CellValue::Real(2.5)));
        assert_eq!(cells[2], Cell::Present(CellValue::Text("yes".to_string())));
        assert_eq!(
            cells[3],
            Cell::Present(CellValue::Labels(vec!["a".to_string(), "b".to_string()]))
        );
        assert_eq!(cells[4].missing_reason(), Some("refused"));
        assert!(cells[4].value().is_none());
    }

    #[test]
    fn test_dataset_rejects_ragged_columns() {
        let err = Dataset::new(vec![
            CompoundColumn::new("a", vec![present(1), present(2)]),
            CompoundColumn::new("b", vec![present(1)]),
        ])
        .unwrap_err();

        assert!(matches!(
            err,
            ReportError::RaggedColumns { ref column, expected: 2, found: 1 } if column == "b"
        ));
    }

    #[test]
    fn test_dataset_rejects_duplicate_columns() {
        let err = Dataset::new(vec![
            CompoundColumn::new("a", vec![present(1)]),
            CompoundColumn::new("a", vec![present(2)]),
        ])
        .unwrap_err();

        assert!(matches!(err, ReportError::DuplicateColumn(ref name) if name == "a"));
    }

    #[test]
    fn test_dataset_lookup() {
        let dataset = Dataset::new(vec![CompoundColumn::new("a", vec![present(1)])]).unwrap();
        assert_eq!(dataset.height(), 1);
        assert_eq!(dataset.width(), 1);
        assert!(dataset.column("a").is_ok());
        assert!(matches!(
            dataset.column("zz"),
            Err(ReportError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_value_kind_widens_integers() {
        let column = CompoundColumn::new(
            "w",
            vec![
                present(1),
                Cell::Missing("skip".to_string()),
                Cell::Present(CellValue::Real(1.5)),
            ],
        );
        assert_eq!(column.value_kind().unwrap(), Some(ValueKind::Real));
    }

    #[test]
    fn test_value_kind_rejects_text_and_numbers() {
        let column = CompoundColumn::new(
            "w",
            vec![present(1), Cell::Present(CellValue::Text("x".to_string()))],
        );
        let err = column.value_kind().unwrap_err();
        assert!(matches!(err, ReportError::MixedValueKinds { row: 1, .. }));
    }

    #[test]
    fn test_value_kind_all_missing() {
        let column = CompoundColumn::new("w", vec![Cell::Missing("skip".to_string())]);
        assert_eq!(column.value_kind().unwrap(), None);
    }

    #[test]
    fn test_dataset_deserialization_validates() {
        let result: std::result::Result<Dataset, _> = serde_json::from_value(json!([
            {"name": "a", "cells": [{"value": 1}]},
            {"name": "b", "cells": []}
        ]));
        assert!(result.is_err());
    }
}
