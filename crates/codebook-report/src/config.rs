//! Configuration types for codebook report generation.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic report setup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Placeholder in the HTML template that is replaced by the report payload.
pub const DEFAULT_PLACEHOLDER: &str = "\"{{}}\"";

/// File that marks the root directory of a study.
pub const DEFAULT_STUDY_MARKER: &str = "study.yaml";

/// Location of the codebook template, relative to the study root.
pub const DEFAULT_TEMPLATE_RELATIVE_PATH: &str = "doit/sidd/src/codebook.html";

/// Configuration for building and rendering a codebook report.
///
/// Use [`ReportConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use codebook_report::config::ReportConfig;
///
/// let config = ReportConfig::builder()
///     .parallel(true)
///     .template_path("templates/codebook.html")
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Compute per-column statistics on the rayon thread pool.
    /// Output order is the declared column order either way.
    /// Default: false
    pub parallel: bool,

    /// Text in the template that is replaced by the quoted report JSON.
    /// Default: `"{{}}"` (including the double quotes)
    pub placeholder: String,

    /// Explicit template path. When None, the template is looked up
    /// relative to the study root.
    /// Default: None
    pub template_path: Option<PathBuf>,

    /// File name that marks the study root directory.
    /// Default: "study.yaml"
    pub study_marker: String,

    /// Template location relative to the study root.
    /// Default: "doit/sidd/src/codebook.html"
    pub template_relative_path: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            template_path: None,
            study_marker: DEFAULT_STUDY_MARKER.to_string(),
            template_relative_path: PathBuf::from(DEFAULT_TEMPLATE_RELATIVE_PATH),
        }
    }
}

impl ReportConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.placeholder.is_empty() {
            return Err(ConfigValidationError::EmptyField("placeholder".to_string()));
        }

        if self.study_marker.is_empty() {
            return Err(ConfigValidationError::EmptyField("study_marker".to_string()));
        }

        if self.template_relative_path.is_absolute() {
            return Err(ConfigValidationError::AbsoluteTemplatePath(
                self.template_relative_path.clone(),
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Configuration field '{0}' must not be empty")]
    EmptyField(String),

    #[error("Template path '{0}' must be relative to the study root")]
    AbsoluteTemplatePath(PathBuf),
}

impl From<ConfigValidationError> for crate::error::ReportError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::ReportError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`ReportConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ReportConfigBuilder {
    parallel: Option<bool>,
    placeholder: Option<String>,
    template_path: Option<PathBuf>,
    study_marker: Option<String>,
    template_relative_path: Option<PathBuf>,
}

impl ReportConfigBuilder {
    /// Enable or disable parallel per-column computation.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = Some(parallel);
        self
    }

    /// Set the template placeholder replaced by the report payload.
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Use an explicit template file instead of study-root discovery.
    pub fn template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = Some(path.into());
        self
    }

    /// Set the marker file used to find the study root.
    pub fn study_marker(mut self, marker: impl Into<String>) -> Self {
        self.study_marker = Some(marker.into());
        self
    }

    /// Set the template location relative to the study root.
    pub fn template_relative_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_relative_path = Some(path.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ReportConfig` or an error if validation fails.
    pub fn build(self) -> Result<ReportConfig, ConfigValidationError> {
        let config = ReportConfig {
            parallel: self.parallel.unwrap_or(false),
            placeholder: self
                .placeholder
                .unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string()),
            template_path: self.template_path,
            study_marker: self
                .study_marker
                .unwrap_or_else(|| DEFAULT_STUDY_MARKER.to_string()),
            template_relative_path: self
                .template_relative_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATE_RELATIVE_PATH)),
        };

        config.validate()?;
        Ok(config)
    }
}
