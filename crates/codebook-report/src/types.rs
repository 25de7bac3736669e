use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Percentages
// ============================================================================

/// A proportion that may be undefined because its denominator is zero.
///
/// Serialized as a plain JSON number, or `null` when undefined, so the
/// payload never carries NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Percentage {
    Defined(f64),
    Undefined,
}

impl Percentage {
    /// `count / total`, or [`Percentage::Undefined`] when `total` is zero.
    pub fn of(count: usize, total: usize) -> Self {
        if total == 0 {
            Percentage::Undefined
        } else {
            Percentage::Defined(count as f64 / total as f64)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Percentage::Defined(v) => Some(*v),
            Percentage::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Percentage::Undefined)
    }
}

impl From<Option<f64>> for Percentage {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Percentage::Defined(v),
            _ => Percentage::Undefined,
        }
    }
}

impl From<Percentage> for Option<f64> {
    fn from(pct: Percentage) -> Self {
        pct.value()
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Percentage::Defined(v) => write!(f, "{:.1}%", v * 100.0),
            Percentage::Undefined => write!(f, "n/a"),
        }
    }
}

// ============================================================================
// Variable Statistics
// ============================================================================

/// Type tag of free-text variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextKind {
    #[default]
    Text,
}

/// Coded variable categories sharing a code list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodedKind {
    Categorical,
    Ordinal,
    Multiselect,
}

impl CodedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Categorical => "categorical",
            Self::Ordinal => "ordinal",
            Self::Multiselect => "multiselect",
        }
    }
}

/// Numeric variable categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericKind {
    Integer,
    Real,
}

impl NumericKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Real => "real",
        }
    }
}

/// Summary of a free-text variable. Nothing is computed beyond the tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TextStats {
    pub stype: TextKind,
}

/// Count of one code list entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodedItemStat {
    pub label: String,
    pub value: i64,
    pub text: String,
    pub count: usize,
    /// Share of non-missing rows carrying this label.
    pub pct: Percentage,
}

/// Summary of a categorical, ordinal or multiselect variable.
///
/// `items` follows the code list order and always has one entry per code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodedStats {
    pub stype: CodedKind,
    pub items: Vec<CodedItemStat>,
}

/// One equal-width histogram bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericFreqItem {
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// Summary of an integer or real variable.
///
/// The aggregates are `None` when the column has no observed values;
/// `sd` is also `None` with fewer than two values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub stype: NumericKind,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub sd: Option<f64>,
    pub freqs: Vec<NumericFreqItem>,
}

/// Type-specific statistics of one variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableStats {
    Text(TextStats),
    Coded(CodedStats),
    Numeric(NumericStats),
}

impl VariableStats {
    /// The `stype` tag carried in the serialized form.
    pub fn stype(&self) -> &'static str {
        match self {
            VariableStats::Text(_) => "text",
            VariableStats::Coded(stats) => stats.stype.as_str(),
            VariableStats::Numeric(stats) => stats.stype.as_str(),
        }
    }
}

// ============================================================================
// Missingness and Summary Rows
// ============================================================================

/// Number of rows sharing one missing reason (or the `VALID` sentinel).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingnessItem {
    pub label: String,
    pub count: usize,
    /// Share of all rows in the dataset.
    pub pct: Percentage,
}

/// Report row for one declared column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTableRow {
    /// Position of the column in the declared column sequence.
    pub id: usize,
    pub name: String,
    /// Code list name for coded variables that have one, else the type category.
    #[serde(rename = "type")]
    pub display_type: String,
    pub description: String,
    pub num_valid: usize,
    pub num_missing: usize,
    /// Column name prefix before the first underscore.
    pub group: String,
    pub stats: VariableStats,
    pub missingness: Vec<MissingnessItem>,
}
