//! Bundle loading.
//!
//! A bundle packages the dataset of one study instrument together with the
//! metadata of its columns. On disk it is a single JSON document with
//! `bundle`, `columns` and `data` sections.

use crate::dataset::Dataset;
use crate::error::{Result, ResultExt};
use crate::metadata::{ColumnMetadata, RawColumnMetadata};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Descriptive header of a bundle, copied verbatim into the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Any further header fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl BundleInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: None,
            version: None,
            extra: BTreeMap::new(),
        }
    }
}

#[derive(Deserialize)]
struct RawBundle {
    bundle: BundleInfo,
    columns: Vec<RawColumnMetadata>,
    data: Dataset,
}

/// A loaded bundle with resolved column metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    pub info: BundleInfo,
    /// Declared columns in report order.
    pub columns: Vec<ColumnMetadata>,
    pub dataset: Dataset,
}

impl Bundle {
    pub fn new(info: BundleInfo, columns: Vec<ColumnMetadata>, dataset: Dataset) -> Self {
        Self {
            info,
            columns,
            dataset,
        }
    }

    /// Parse a bundle document and resolve its variable types.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let raw: RawBundle = serde_json::from_str(text)?;

        let columns = raw
            .columns
            .into_iter()
            .map(RawColumnMetadata::resolve)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Bundle '{}': {} declared columns, {} data columns, {} rows",
            raw.bundle.name,
            columns.len(),
            raw.data.width(),
            raw.data.height()
        );

        Ok(Self::new(raw.bundle, columns, raw.data))
    }

    /// Read and parse a bundle file.
    pub fn read_file(path: &Path) -> Result<Self> {
        info!("Loading bundle: {}", path.display());
        let text = fs::read_to_string(path)
            .context(format!("Failed to read bundle '{}'", path.display()))?;
        Self::from_json_str(&text).context(format!("Invalid bundle '{}'", path.display()))
    }

    /// Names of the declared columns, in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}
