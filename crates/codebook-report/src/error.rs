//! Custom error types for codebook report generation.
//!
//! This module provides the error hierarchy using `thiserror`. Metadata and
//! schema problems are fatal for the whole report: a report with a silently
//! dropped column would be indexed wrongly by its consumers.
//!
//! Errors are serializable so they can be emitted as JSON alongside reports.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for report generation.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// The same column name was declared twice in a dataset.
    #[error("Column '{0}' appears more than once in dataset")]
    DuplicateColumn(String),

    /// Columns of a dataset disagree on the number of rows.
    #[error("Column '{column}' has {found} rows, expected {expected}")]
    RaggedColumns {
        column: String,
        expected: usize,
        found: usize,
    },

    /// A column holds values of incompatible kinds (e.g. text and numbers).
    #[error("Column '{column}' mixes {first} and {second} values (row {row})")]
    MixedValueKinds {
        column: String,
        first: &'static str,
        second: &'static str,
        row: usize,
    },

    /// The variable type category of a column is not recognized.
    #[error("Unknown variable type '{stype}' for column '{column}'")]
    UnknownVariableType { column: String, stype: String },

    /// A coded variable type was declared without its code list.
    #[error("Column '{column}' has coded type '{stype}' but no code list")]
    MissingCodeList { column: String, stype: String },

    /// The values of a column cannot carry its declared variable type.
    #[error("Column '{column}' is declared as {expected} but holds {found} values")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    /// The report template does not contain the data placeholder.
    #[error("Template '{path}' does not contain placeholder {placeholder}")]
    TemplatePlaceholderMissing { path: PathBuf, placeholder: String },

    /// No study root marker was found above the starting directory.
    #[error("Could not find {marker} in '{start}' or any parent directory")]
    StudyRootNotFound { marker: String, start: PathBuf },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ReportError>,
    },
}

impl ReportError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ReportError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for machine consumers.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::DuplicateColumn(_) => "DUPLICATE_COLUMN",
            Self::RaggedColumns { .. } => "RAGGED_COLUMNS",
            Self::MixedValueKinds { .. } => "MIXED_VALUE_KINDS",
            Self::UnknownVariableType { .. } => "UNKNOWN_VARIABLE_TYPE",
            Self::MissingCodeList { .. } => "MISSING_CODE_LIST",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::TemplatePlaceholderMissing { .. } => "TEMPLATE_PLACEHOLDER_MISSING",
            Self::StudyRootNotFound { .. } => "STUDY_ROOT_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error comes from the bundle's metadata rather than its data
    /// or the environment.
    pub fn is_metadata_error(&self) -> bool {
        match self {
            Self::UnknownVariableType { .. }
            | Self::MissingCodeList { .. }
            | Self::TypeMismatch { .. }
            | Self::ColumnNotFound(_) => true,
            Self::WithContext { source, .. } => source.is_metadata_error(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for ReportError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ReportError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ReportError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ReportError::Io(e).with_context(context))
    }
}
