use crate::bundle::{Bundle, BundleInfo};
use crate::config::ReportConfig;
use crate::dataset::ColumnSplitter;
use crate::error::{ReportError, Result, ResultExt};
use crate::types::SummaryTableRow;
use crate::utils::{locate_study_root, report_output_path};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::summary::{SummaryRowBuilder, column_context};

// ============================================================================
// Report Object
// ============================================================================

/// The codebook report handed to the template.
///
/// Serialized as `{"bundle": {...}, "tabledata": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportObject {
    pub bundle: BundleInfo,
    pub tabledata: Vec<SummaryTableRow>,
}

static_assertions::assert_impl_all!(ReportObject: Send, Sync);
static_assertions::assert_impl_all!(SummaryTableRow: Send, Sync);

impl ReportObject {
    pub fn new(bundle: BundleInfo, tabledata: Vec<SummaryTableRow>) -> Self {
        Self { bundle, tabledata }
    }

    /// Split the bundle's dataset, summarize every declared column and
    /// assemble the report.
    pub fn encode(bundle: &Bundle, config: &ReportConfig) -> Result<Self> {
        config.validate()?;

        for column in &bundle.columns {
            bundle
                .dataset
                .column(&column.name)
                .context(column_context(column))?;
        }

        let names = bundle.column_names();
        let split = ColumnSplitter::split_columns(&bundle.dataset, &names)?;
        let rows = SummaryRowBuilder::new()
            .parallel(config.parallel)
            .build(&split, &bundle.columns)?;

        info!(
            "Encoded report for bundle '{}': {} rows",
            bundle.info.name,
            rows.len()
        );

        Ok(Self::new(bundle.info.clone(), rows))
    }
}

// ============================================================================
// Report Generator
// ============================================================================

/// Renders reports into HTML templates and writes them to disk.
#[derive(Debug, Clone, Default)]
pub struct ReportGenerator {
    config: ReportConfig,
}

impl ReportGenerator {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Splice the report into `template` in place of the placeholder.
    ///
    /// The compact JSON is wrapped in single quotes, with every `'` inside
    /// it escaped as `\'`. Every occurrence of the placeholder is replaced.
    pub fn render(&self, report: &ReportObject, template: &str) -> Result<String> {
        self.render_template(report, template, Path::new("<template>"))
    }

    fn render_template(&self, report: &ReportObject, template: &str, source: &Path) -> Result<String> {
        let placeholder = self.config.placeholder.as_str();
        if !template.contains(placeholder) {
            return Err(ReportError::TemplatePlaceholderMissing {
                path: source.to_path_buf(),
                placeholder: placeholder.to_string(),
            });
        }

        let payload = serde_json::to_string(report)?.replace('\'', "\\'");
        debug!("Report payload: {} bytes", payload.len());

        Ok(template.replace(placeholder, &format!("'{}'", payload)))
    }

    /// Template to render: the configured path, or the default location
    /// under the study root found above `start`.
    pub fn resolve_template_path(&self, start: &Path) -> Result<PathBuf> {
        if let Some(path) = &self.config.template_path {
            return Ok(path.clone());
        }

        let root = locate_study_root(start, &self.config.study_marker)?;
        debug!("Study root: {}", root.display());
        Ok(root.join(&self.config.template_relative_path))
    }

    /// Render the report and write it next to the bundle as
    /// `<bundle stem>.<template file name>`.
    ///
    /// Without a configured template, the study root is searched from the
    /// current directory.
    pub fn write_report(&self, bundle_path: &Path, report: &ReportObject) -> Result<PathBuf> {
        self.write_report_from(&env::current_dir()?, bundle_path, report)
    }

    /// Like [`write_report`](Self::write_report), searching for the study
    /// root from `start`.
    pub fn write_report_from(
        &self,
        start: &Path,
        bundle_path: &Path,
        report: &ReportObject,
    ) -> Result<PathBuf> {
        let template_path = self.resolve_template_path(start)?;
        let output_path = report_output_path(bundle_path, &template_path);
        self.write_report_to(report, &template_path, &output_path)
    }

    /// Render `report` with the template at `template_path` into `output_path`.
    pub fn write_report_to(
        &self,
        report: &ReportObject,
        template_path: &Path,
        output_path: &Path,
    ) -> Result<PathBuf> {
        let template = fs::read_to_string(template_path)
            .context(format!("Failed to read template '{}'", template_path.display()))?;
        let rendered = self.render_template(report, &template, template_path)?;

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, rendered)
            .context(format!("Failed to write report '{}'", output_path.display()))?;

        info!("Report saved: {}", output_path.display());

        Ok(output_path.to_path_buf())
    }
}
