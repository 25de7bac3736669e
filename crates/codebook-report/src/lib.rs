//! Codebook Report Library
//!
//! Per-variable descriptive statistics for survey datasets, built with Rust
//! and Polars.
//!
//! # Overview
//!
//! A survey bundle holds a dataset whose cells are either a value or the
//! reason the value is missing, together with typed metadata for each
//! column. This library turns a bundle into a codebook report:
//!
//! - **Column Splitting**: compound cells into a values frame and a
//!   missing-reasons frame ([`ColumnSplitter`])
//! - **Missingness**: counts and shares of each missing reason plus `VALID`
//! - **Variable Statistics**: code list frequencies for coded variables,
//!   min/max/mean/sd and a 10-bin histogram for numeric ones
//! - **Summary Rows**: one [`SummaryTableRow`] per declared column
//! - **Report Assembly**: the bundle header plus all rows ([`ReportObject`]),
//!   rendered into an HTML template by [`ReportGenerator`]
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use codebook_report::{Bundle, ReportConfig, ReportObject};
//! use std::path::Path;
//!
//! let bundle = Bundle::read_file(Path::new("data/wave1.json"))?;
//!
//! let config = ReportConfig::builder()
//!     .parallel(true)
//!     .build()?;
//!
//! let report = ReportObject::encode(&bundle, &config)?;
//!
//! for row in &report.tabledata {
//!     println!("{} [{}]: {} valid, {} missing", row.name, row.display_type, row.num_valid, row.num_missing);
//! }
//! ```
//!
//! # Errors
//!
//! Metadata problems (unknown variable types, coded types without a code
//! list, declared columns absent from the data, values that cannot carry
//! their declared type) fail the whole report with a [`ReportError`] naming
//! the column. Degenerate data does not fail: percentages over an empty
//! denominator are [`Percentage::Undefined`] and numeric columns without
//! observations have no aggregates.

pub mod bundle;
pub mod config;
pub mod dataset;
pub mod error;
pub mod metadata;
pub mod profiler;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use bundle::{Bundle, BundleInfo};
pub use config::{ConfigValidationError, ReportConfig, ReportConfigBuilder};
pub use dataset::{Cell, CellValue, ColumnSplitter, CompoundColumn, Dataset, SplitDataset};
pub use error::{ReportError, Result as ReportResult, ResultExt};
pub use metadata::{CodeItem, CodeList, ColumnMetadata, VariableType};
pub use profiler::{NUM_BINS, VALID_LABEL, calc_missingness, calc_variable_stats};
pub use reporting::{ReportGenerator, ReportObject, SummaryRowBuilder, build_summary_rows};
pub use types::{
    CodedItemStat, CodedKind, CodedStats, MissingnessItem, NumericFreqItem, NumericKind,
    NumericStats, Percentage, SummaryTableRow, TextKind, TextStats, VariableStats,
};
pub use utils::{find_upwards, is_numeric_dtype, locate_study_root};
