//! Variable metadata for bundle columns.
//!
//! Variable types arrive from the bundle as a free-form `stype` string plus an
//! optional code list. They are resolved once, when the bundle is loaded, into
//! the closed [`VariableType`] union; statistics dispatch on that union and
//! never look at the raw string again.

use crate::error::{ReportError, Result};
use crate::types::{CodedKind, NumericKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Description used when the bundle does not describe a column.
pub const DEFAULT_DESCRIPTION: &str = "(No description)";

/// One entry of a code list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeItem {
    pub value: i64,
    pub text: String,
    pub label: String,
}

/// Ordered vocabulary of a coded variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeList {
    /// Shown as the variable's type in the report when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub items: Vec<CodeItem>,
}

impl CodeList {
    pub fn new(name: Option<String>, items: Vec<CodeItem>) -> Self {
        Self { name, items }
    }
}

/// Resolved variable type of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableType {
    Text,
    Coded { kind: CodedKind, codes: CodeList },
    Numeric { kind: NumericKind },
}

impl VariableType {
    /// Resolve a raw `stype` category.
    ///
    /// Fails for unknown categories and for coded categories without a code
    /// list. A code list given for a non-coded category is ignored.
    pub fn resolve(column: &str, stype: &str, codes: Option<CodeList>) -> Result<Self> {
        let coded = |kind| {
            codes
                .ok_or_else(|| ReportError::MissingCodeList {
                    column: column.to_string(),
                    stype: stype.to_string(),
                })
                .map(|codes| VariableType::Coded { kind, codes })
        };

        match stype {
            "text" => Ok(VariableType::Text),
            "categorical" => coded(CodedKind::Categorical),
            "ordinal" => coded(CodedKind::Ordinal),
            "multiselect" => coded(CodedKind::Multiselect),
            "integer" => Ok(VariableType::Numeric {
                kind: NumericKind::Integer,
            }),
            "real" => Ok(VariableType::Numeric {
                kind: NumericKind::Real,
            }),
            other => Err(ReportError::UnknownVariableType {
                column: column.to_string(),
                stype: other.to_string(),
            }),
        }
    }

    /// The raw type category (`text`, `categorical`, ..., `real`).
    pub fn stype(&self) -> &'static str {
        match self {
            VariableType::Text => "text",
            VariableType::Coded { kind, .. } => kind.as_str(),
            VariableType::Numeric { kind } => kind.as_str(),
        }
    }

    /// Code list name for coded types that have one, else the type category.
    pub fn display_name(&self) -> &str {
        match self {
            VariableType::Coded {
                codes: CodeList {
                    name: Some(name), ..
                },
                ..
            } => name,
            other => other.stype(),
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stype())
    }
}

/// Metadata of one declared column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    pub name: String,
    pub description: String,
    pub variable_type: VariableType,
}

impl ColumnMetadata {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        variable_type: VariableType,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            variable_type,
        }
    }

    /// Grouping key: the name up to its first underscore.
    pub fn group_key(&self) -> &str {
        group_key(&self.name)
    }

    pub fn display_type(&self) -> &str {
        self.variable_type.display_name()
    }
}

/// Substring of `name` before its first underscore (the whole name if none).
pub fn group_key(name: &str) -> &str {
    name.split('_').next().unwrap_or(name)
}

// ============================================================================
// Raw (bundle file) representation
// ============================================================================

/// Variable type exactly as written in a bundle file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawVariableType {
    pub stype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codes: Option<CodeList>,
}

/// Column metadata exactly as written in a bundle file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawColumnMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub variable_type: RawVariableType,
}

impl RawColumnMetadata {
    /// Resolve into [`ColumnMetadata`], checking the variable type.
    pub fn resolve(self) -> Result<ColumnMetadata> {
        let variable_type = VariableType::resolve(
            &self.name,
            &self.variable_type.stype,
            self.variable_type.codes,
        )?;

        Ok(ColumnMetadata {
            description: self
                .description
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            name: self.name,
            variable_type,
        })
    }
}
