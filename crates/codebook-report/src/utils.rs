//! Shared utilities for report generation.
//!
//! This module contains helpers used across the profiler, the report
//! generator and the CLI.

use crate::error::{ReportError, Result};
use polars::prelude::*;
use std::path::{Path, PathBuf};

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

// =============================================================================
// Path Utilities
// =============================================================================

/// Walk up from `start` and return the first existing `<dir>/<marker>`.
///
/// `start` itself is checked first. Returns `None` once the filesystem root
/// has been checked without a match.
pub fn find_upwards(start: &Path, marker: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(marker))
        .find(|candidate| candidate.exists())
}

/// Directory holding the study marker, searching upwards from `start`.
pub fn locate_study_root(start: &Path, marker: &str) -> Result<PathBuf> {
    find_upwards(start, marker)
        .and_then(|found| found.parent().map(Path::to_path_buf))
        .ok_or_else(|| ReportError::StudyRootNotFound {
            marker: marker.to_string(),
            start: start.to_path_buf(),
        })
}

/// Output path for a rendered report: `<bundle stem>.<template file name>`
/// in the bundle's directory.
pub fn report_output_path(bundle_path: &Path, template_path: &Path) -> PathBuf {
    let stem = bundle_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    let template_name = template_path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "html".to_string());

    bundle_path.with_file_name(format!("{}.{}", stem, template_name))
}

/// Truncate a string for fixed-width console tables.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

// =============================================================================
// Tests
// =============================================================================
