//! Statistical analysis functions for variable profiling.

use crate::error::{ReportError, Result};
use crate::metadata::{CodeList, ColumnMetadata, VariableType};
use crate::types::{
    CodedItemStat, CodedKind, CodedStats, NumericFreqItem, NumericKind, NumericStats, Percentage,
    TextStats, VariableStats,
};
use crate::utils::is_numeric_dtype;
use polars::prelude::*;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Number of equal-width bins in a numeric frequency table.
pub const NUM_BINS: usize = 10;

/// Compute the type-specific statistics of one values column.
pub fn calc_variable_stats(values: &Series, column: &ColumnMetadata) -> Result<VariableStats> {
    match &column.variable_type {
        VariableType::Text => Ok(VariableStats::Text(TextStats::default())),
        VariableType::Coded { kind, codes } => {
            coded_stats(values, column, *kind, codes).map(VariableStats::Coded)
        }
        VariableType::Numeric { kind } => {
            numeric_stats(values, column, *kind).map(VariableStats::Numeric)
        }
    }
}

// ============================================================================
// Coded variables
// ============================================================================

fn coded_stats(
    values: &Series,
    column: &ColumnMetadata,
    kind: CodedKind,
    codes: &CodeList,
) -> Result<CodedStats> {
    let n = values.len() - values.null_count();

    let labels = match kind {
        CodedKind::Multiselect => explode_labels(values, column)?,
        CodedKind::Categorical | CodedKind::Ordinal => scalar_labels(values, column)?,
    };
    let counts = label_counts(&labels)?;

    let unknown = counts
        .keys()
        .filter(|label| !codes.items.iter().any(|code| &code.label == *label))
        .count();
    if unknown > 0 {
        debug!(
            "Column '{}': {} observed labels are not in the code list",
            column.name, unknown
        );
    }

    let items = codes
        .items
        .iter()
        .map(|code| {
            let count = counts.get(code.label.as_str()).copied().unwrap_or(0);
            CodedItemStat {
                label: code.label.clone(),
                value: code.value,
                text: code.text.clone(),
                count,
                pct: Percentage::of(count, n),
            }
        })
        .collect();

    Ok(CodedStats { stype: kind, items })
}

/// Non-null values of a single-valued coded column as strings.
fn scalar_labels(values: &Series, column: &ColumnMetadata) -> Result<Series> {
    if values.null_count() == values.len() {
        return Ok(empty_labels());
    }

    match values.dtype() {
        DataType::String => Ok(values.drop_nulls()),
        DataType::List(_) => Err(type_mismatch(values, column)),
        DataType::Float32 | DataType::Float64 => float_labels(values),
        _ => Ok(values.cast(&DataType::String)?.drop_nulls()),
    }
}

/// Float values as labels, whole numbers without a fractional part.
///
/// Integer codes widened to `Float64` by a real value in the same column
/// still match labels like `"1"`.
fn float_labels(values: &Series) -> Result<Series> {
    let floats = values.cast(&DataType::Float64)?;
    let labels: Vec<String> = floats
        .f64()?
        .into_iter()
        .flatten()
        .map(|v| v.to_string())
        .collect();

    Ok(Series::new("label".into(), labels))
}

/// One label per membership event of a multiselect column.
///
/// A row selecting `{a, b}` yields both `a` and `b`; repeated labels within a
/// row are kept.
fn explode_labels(values: &Series, column: &ColumnMetadata) -> Result<Series> {
    if values.null_count() == values.len() {
        return Ok(empty_labels());
    }

    let lists = match values.dtype() {
        DataType::List(_) => values.list()?,
        _ => return Err(type_mismatch(values, column)),
    };

    let mut labels: Vec<String> = Vec::new();
    for row in lists.into_iter().flatten() {
        let row = row.cast(&DataType::String)?;
        labels.extend(row.str()?.into_iter().flatten().map(str::to_owned));
    }

    Ok(Series::new("label".into(), labels))
}

fn empty_labels() -> Series {
    Series::new("label".into(), Vec::<String>::new())
}

/// Occurrences of each distinct label.
fn label_counts(labels: &Series) -> Result<HashMap<String, usize>> {
    let labels = labels.drop_nulls().with_name("label".into());
    if labels.is_empty() {
        return Ok(HashMap::new());
    }

    let value_counts_df = labels.value_counts(false, false, "count".into(), false)?;
    let counts_col = value_counts_df.column("count")?.cast(&DataType::UInt64)?;
    let values_col = value_counts_df.column("label")?;

    let counts = counts_col.as_materialized_series().u64()?;
    let values = values_col.as_materialized_series().str()?;

    Ok(values
        .into_iter()
        .zip(counts.into_iter())
        .filter_map(|(label, count)| Some((label?.to_string(), count? as usize)))
        .collect())
}

// ============================================================================
// Numeric variables
// ============================================================================

fn numeric_stats(values: &Series, column: &ColumnMetadata, kind: NumericKind) -> Result<NumericStats> {
    let non_null = numeric_values(values, column)?.drop_nulls();

    if non_null.is_empty() {
        warn!(
            "Column '{}' has no observed values; numeric summary is empty",
            column.name
        );
        return Ok(NumericStats {
            stype: kind,
            min: None,
            max: None,
            mean: None,
            sd: None,
            freqs: Vec::new(),
        });
    }

    let min = non_null.min::<f64>()?;
    let max = non_null.max::<f64>()?;
    let mean = non_null.mean();
    let sd = calculate_std(&non_null)?;

    let freqs = match (min, max) {
        (Some(min), Some(max)) => frequency_bins(&non_null, min, max)?,
        _ => Vec::new(),
    };

    Ok(NumericStats {
        stype: kind,
        min,
        max,
        mean,
        sd,
        freqs,
    })
}

/// The column as `Float64`, failing for non-numeric data.
fn numeric_values(values: &Series, column: &ColumnMetadata) -> Result<Series> {
    if is_numeric_dtype(values.dtype()) || values.null_count() == values.len() {
        Ok(values.cast(&DataType::Float64)?)
    } else {
        Err(type_mismatch(values, column))
    }
}

/// Calculate the sample standard deviation of a Float64 series.
///
/// Undefined for fewer than two values.
pub(crate) fn calculate_std(series: &Series) -> Result<Option<f64>> {
    let n = series.len() - series.null_count();

    if n < 2 {
        return Ok(None);
    }

    let mean = series.mean().unwrap_or(0.0);
    let float_series = series.f64()?;
    let variance: f64 = float_series
        .into_iter()
        .filter_map(|v| v.map(|val| (val - mean).powi(2)))
        .sum::<f64>()
        / (n as f64 - 1.0);

    Ok(Some(variance.sqrt()))
}

/// Count values into [`NUM_BINS`] equal-width bins spanning `[min, max]`.
///
/// Bins are right-open except the last, which is closed: a value equal to an
/// interior cut point belongs to the bin starting there. With `min == max`
/// every bin is zero-width and all values land in bin 0.
pub(crate) fn frequency_bins(series: &Series, min: f64, max: f64) -> Result<Vec<NumericFreqItem>> {
    let degenerate = max <= min;
    let n = NUM_BINS as f64;
    // Interpolating from scaled endpoints stays finite for any finite range.
    let bound = |i: usize| {
        if i == 0 || degenerate {
            min
        } else if i == NUM_BINS {
            max
        } else {
            min / n * (NUM_BINS - i) as f64 + max / n * i as f64
        }
    };

    let mut bins: Vec<NumericFreqItem> = (0..NUM_BINS)
        .map(|i| NumericFreqItem {
            min: bound(i),
            max: bound(i + 1),
            count: 0,
        })
        .collect();

    let cutpoints: Vec<f64> = (1..NUM_BINS).map(bound).collect();

    for value in series.f64()?.into_iter().flatten() {
        let idx = if !degenerate {
            cutpoints.iter().filter(|&&c| value >= c).count()
        } else {
            0
        };
        bins[idx].count += 1;
    }

    Ok(bins)
}

fn type_mismatch(values: &Series, column: &ColumnMetadata) -> ReportError {
    ReportError::TypeMismatch {
        column: column.name.clone(),
        expected: column.variable_type.stype().to_string(),
        found: values.dtype().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::CodeItem;

    fn code(value: i64, label: &str, text: &str) -> CodeItem {
        CodeItem {
            value,
            text: text.to_string(),
            label: label.to_string(),
        }
    }

    fn xyz_column(kind: CodedKind) -> ColumnMetadata {
        ColumnMetadata::new(
            "q_letter",
            "Letter",
            VariableType::Coded {
                kind,
                codes: CodeList::new(
                    None,
                    vec![code(1, "x", "X"), code(2, "y", "Y"), code(3, "z", "Z")],
                ),
            },
        )
    }

    fn numeric_column(kind: NumericKind) -> ColumnMetadata {
        ColumnMetadata::new("m_value", "Value", VariableType::Numeric { kind })
    }

    fn coded(stats: VariableStats) -> CodedStats {
        match stats {
            VariableStats::Coded(stats) => stats,
            other => panic!("expected coded stats, got {other:?}"),
        }
    }

    fn numeric(stats: VariableStats) -> NumericStats {
        match stats {
            VariableStats::Numeric(stats) => stats,
            other => panic!("expected numeric stats, got {other:?}"),
        }
    }

    fn approx(pct: Percentage, expected: f64) -> bool {
        pct.value().is_some_and(|v| (v - expected).abs() < 1e-9)
    }

    // ==================== text ====================

    #[test]
    fn test_text_stats_carry_only_the_tag() {
        let column = ColumnMetadata::new("note", "Notes", VariableType::Text);
        let series = Series::new("note".into(), &[Some("hello"), None]);
        assert_eq!(
            calc_variable_stats(&series, &column).unwrap(),
            VariableStats::Text(TextStats::default())
        );
    }

    // ==================== coded ====================

    #[test]
    fn test_categorical_example() {
        let series = Series::new("q_letter".into(), &[Some("x"), None, Some("y"), Some("x")]);
        let stats = coded(calc_variable_stats(&series, &xyz_column(CodedKind::Categorical)).unwrap());

        assert_eq!(stats.stype, CodedKind::Categorical);
        let labels: Vec<&str> = stats.items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["x", "y", "z"]);

        assert_eq!(stats.items[0].count, 2);
        assert!(approx(stats.items[0].pct, 2.0 / 3.0));
        assert_eq!(stats.items[1].count, 1);
        assert!(approx(stats.items[1].pct, 1.0 / 3.0));
        assert_eq!(stats.items[2].count, 0);
        assert_eq!(stats.items[2].pct, Percentage::Defined(0.0));
        assert_eq!(stats.items[2].value, 3);
        assert_eq!(stats.items[2].text, "Z");
    }

    #[test]
    fn test_coded_without_observations_is_undefined() {
        let series = Series::new("q_letter".into(), &[None::<&str>, None]);
        let stats = coded(calc_variable_stats(&series, &xyz_column(CodedKind::Ordinal)).unwrap());

        assert_eq!(stats.items.len(), 3);
        assert!(stats.items.iter().all(|i| i.count == 0 && i.pct.is_undefined()));
    }

    #[test]
    fn test_labels_outside_code_list_are_ignored() {
        let series = Series::new("q_letter".into(), &[Some("x"), Some("w")]);
        let stats = coded(calc_variable_stats(&series, &xyz_column(CodedKind::Categorical)).unwrap());

        assert_eq!(stats.items.len(), 3);
        assert_eq!(stats.items[0].count, 1);
        // the unknown label still counts toward the denominator
        assert_eq!(stats.items[0].pct, Percentage::Defined(0.5));
    }

    #[test]
    fn test_integer_coded_values_match_string_labels() {
        let column = ColumnMetadata::new(
            "q_num",
            "Numbers",
            VariableType::Coded {
                kind: CodedKind::Categorical,
                codes: CodeList::new(None, vec![code(1, "1", "One"), code(2, "2", "Two")]),
            },
        );
        let series = Series::new("q_num".into(), &[Some(1i64), Some(1), Some(2), None]);
        let stats = coded(calc_variable_stats(&series, &column).unwrap());

        assert_eq!(stats.items[0].count, 2);
        assert_eq!(stats.items[1].count, 1);
    }

    #[test]
    fn test_multiselect_counts_each_membership() {
        let rows: ListChunked = vec![
            Some(Series::new("".into(), &["x", "y"])),
            None,
            Some(Series::new("".into(), &["x"])),
            Some(Series::new("".into(), Vec::<String>::new())),
        ]
        .into_iter()
        .collect();
        let series = rows.with_name("q_letter".into()).into_series();

        let stats = coded(calc_variable_stats(&series, &xyz_column(CodedKind::Multiselect)).unwrap());

        assert_eq!(stats.stype, CodedKind::Multiselect);
        assert_eq!(stats.items[0].count, 2);
        assert_eq!(stats.items[1].count, 1);
        assert_eq!(stats.items[2].count, 0);
        // three non-null rows, including the empty selection
        assert!(approx(stats.items[0].pct, 2.0 / 3.0));
    }

    #[test]
    fn test_multiselect_requires_label_sets() {
        let series = Series::new("q_letter".into(), &[Some("x")]);
        let err = calc_variable_stats(&series, &xyz_column(CodedKind::Multiselect)).unwrap_err();
        assert!(matches!(err, ReportError::TypeMismatch { ref column, .. } if column == "q_letter"));
    }

    #[test]
    fn test_widened_integer_codes_match_labels() {
        let column = ColumnMetadata::new(
            "q_num",
            "Numbers",
            VariableType::Coded {
                kind: CodedKind::Ordinal,
                codes: CodeList::new(None, vec![code(1, "1", "One"), code(2, "2", "Two")]),
            },
        );
        let series = Series::new("q_num".into(), &[Some(1.0f64), Some(2.5), Some(1.0), None]);
        let stats = coded(calc_variable_stats(&series, &column).unwrap());

        assert_eq!(stats.items[0].count, 2);
        assert_eq!(stats.items[1].count, 0);
        assert!(approx(stats.items[0].pct, 2.0 / 3.0));
    }

    #[test]
    fn test_label_named_count_does_not_clash() {
        let column = ColumnMetadata::new(
            "count",
            "Count",
            VariableType::Coded {
                kind: CodedKind::Categorical,
                codes: CodeList::new(None, vec![code(1, "count", "Count")]),
            },
        );
        let series = Series::new("count".into(), &[Some("count"), Some("count")]);
        let stats = coded(calc_variable_stats(&series, &column).unwrap());
        assert_eq!(stats.items[0].count, 2);
    }

    // ==================== numeric ====================

    #[test]
    fn test_numeric_example_bins() {
        let series = Series::new("m_value".into(), &[Some(0i64), Some(5), Some(10)]);
        let stats = numeric(calc_variable_stats(&series, &numeric_column(NumericKind::Integer)).unwrap());

        assert_eq!(stats.stype, NumericKind::Integer);
        assert_eq!(stats.min, Some(0.0));
        assert_eq!(stats.max, Some(10.0));
        assert_eq!(stats.mean, Some(5.0));
        assert_eq!(stats.sd, Some(5.0));

        assert_eq!(stats.freqs.len(), NUM_BINS);
        for (i, bin) in stats.freqs.iter().enumerate() {
            assert_eq!(bin.min, i as f64);
            assert_eq!(bin.max, (i + 1) as f64);
        }
        let counts: Vec<usize> = stats.freqs.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 0, 0, 0, 0, 1, 0, 0, 0, 1]);
    }

    #[test]
    fn test_numeric_nulls_are_ignored() {
        let series = Series::new("m_value".into(), &[Some(2.0f64), None, Some(4.0)]);
        let stats = numeric(calc_variable_stats(&series, &numeric_column(NumericKind::Real)).unwrap());

        assert_eq!(stats.mean, Some(3.0));
        assert_eq!(stats.freqs.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn test_numeric_zero_width_range_puts_all_in_first_bin() {
        let series = Series::new("m_value".into(), &[Some(7.0f64), Some(7.0), Some(7.0)]);
        let stats = numeric(calc_variable_stats(&series, &numeric_column(NumericKind::Real)).unwrap());

        assert_eq!(stats.freqs.len(), NUM_BINS);
        assert_eq!(stats.freqs[0].count, 3);
        assert!(stats.freqs[1..].iter().all(|b| b.count == 0));
        assert!(stats.freqs.iter().all(|b| b.min == 7.0 && b.max == 7.0));
        assert_eq!(stats.sd, Some(0.0));
    }

    #[test]
    fn test_numeric_single_value_has_no_sd() {
        let series = Series::new("m_value".into(), &[Some(3i64)]);
        let stats = numeric(calc_variable_stats(&series, &numeric_column(NumericKind::Integer)).unwrap());
        assert_eq!(stats.sd, None);
        assert_eq!(stats.freqs[0].count, 1);
    }

    #[test]
    fn test_numeric_all_missing_is_empty() {
        let series = Series::new("m_value".into(), &[None::<&str>, None]);
        let stats = numeric(calc_variable_stats(&series, &numeric_column(NumericKind::Real)).unwrap());

        assert_eq!(stats.min, None);
        assert_eq!(stats.mean, None);
        assert!(stats.freqs.is_empty());
    }

    #[test]
    fn test_numeric_rejects_text() {
        let series = Series::new("m_value".into(), &[Some("abc")]);
        let err = calc_variable_stats(&series, &numeric_column(NumericKind::Real)).unwrap_err();
        match err {
            ReportError::TypeMismatch { column, expected, .. } => {
                assert_eq!(column, "m_value");
                assert_eq!(expected, "real");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    // ==================== calculate_std ====================

    #[test]
    fn test_calculate_std_basic() {
        // Mean = 3, Variance = 10/4 = 2.5, Std = sqrt(2.5)
        let series = Series::new("val".into(), &[1.0f64, 2.0, 3.0, 4.0, 5.0]);
        let std = calculate_std(&series).unwrap().unwrap();
        assert!((std - 2.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_calculate_std_empty_is_undefined() {
        let series: Series = Series::new("val".into(), Vec::<f64>::new());
        assert_eq!(calculate_std(&series).unwrap(), None);
    }

    // ==================== frequency_bins ====================

    #[test]
    fn test_bins_are_contiguous() {
        let series = Series::new("val".into(), &[0.3f64, 1.7, 2.2, 9.9]);
        let bins = frequency_bins(&series, 0.3, 9.9).unwrap();

        for pair in bins.windows(2) {
            assert_eq!(pair[0].max, pair[1].min);
            assert!(pair[0].min < pair[1].min);
        }
        assert_eq!(bins[0].min, 0.3);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 4);
        assert_eq!(bins[NUM_BINS - 1].count, 1);
    }

    #[test]
    fn test_bins_cover_full_f64_range() {
        let series = Series::new("val".into(), &[-1e308f64, 0.0, 1e308]);
        let bins = frequency_bins(&series, -1e308, 1e308).unwrap();

        assert_eq!(bins.len(), NUM_BINS);
        assert_eq!(bins[0].min, -1e308);
        assert_eq!(bins[NUM_BINS - 1].max, 1e308);
        assert!(bins.iter().all(|b| b.min.is_finite() && b.max.is_finite()));
        for pair in bins.windows(2) {
            assert_eq!(pair[0].max, pair[1].min);
            assert!(pair[0].min < pair[1].min);
        }

        let counts: Vec<usize> = bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 0, 0, 0, 0, 1, 0, 0, 0, 1]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn bins_account_for_every_value(
                values in prop::collection::vec(-1.0e308f64..1.0e308, 1..200)
            ) {
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let series = Series::new("v".into(), values.clone());

                let bins = frequency_bins(&series, min, max).unwrap();

                prop_assert_eq!(bins.len(), NUM_BINS);
                prop_assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
                prop_assert_eq!(bins[0].min, min);
                prop_assert_eq!(bins[NUM_BINS - 1].max, max);
                for pair in bins.windows(2) {
                    prop_assert_eq!(pair[0].max, pair[1].min);
                    prop_assert!(pair[0].min.is_finite());
                }
            }

            #[test]
            fn coded_items_follow_code_list(
                picks in prop::collection::vec(prop::option::of(0usize..3), 0..50)
            ) {
                let labels = ["x", "y", "z"];
                let cells: Vec<Option<&str>> = picks.iter().map(|p| p.map(|i| labels[i])).collect();
                let series = Series::new("q_letter".into(), cells);

                let stats = coded(
                    calc_variable_stats(&series, &xyz_column(CodedKind::Categorical)).unwrap(),
                );

                prop_assert_eq!(stats.items.len(), 3);
                let observed = picks.iter().filter(|p| p.is_some()).count();
                prop_assert_eq!(stats.items.iter().map(|i| i.count).sum::<usize>(), observed);
                for item in &stats.items {
                    prop_assert_eq!(item.pct.is_undefined(), observed == 0);
                }
            }
        }
    }
}
