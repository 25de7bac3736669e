//! Missingness breakdown of a reasons column.

use crate::error::Result;
use crate::types::{MissingnessItem, Percentage};
use polars::prelude::*;
use std::collections::BTreeMap;

/// Label of rows that are not missing.
pub const VALID_LABEL: &str = "VALID";

/// Count rows per missing reason, with null reasons counted as [`VALID_LABEL`].
///
/// Percentages are relative to `n_rows`. Items are ordered by label, with
/// `VALID` first.
pub fn calc_missingness(reasons: &Series, n_rows: usize) -> Result<Vec<MissingnessItem>> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for reason in reasons.str()?.into_iter() {
        *counts.entry(reason.unwrap_or(VALID_LABEL)).or_insert(0) += 1;
    }

    let mut items: Vec<MissingnessItem> = counts
        .into_iter()
        .map(|(label, count)| MissingnessItem {
            label: label.to_string(),
            count,
            pct: Percentage::of(count, n_rows),
        })
        .collect();

    // stable: BTreeMap order breaks ties
    items.sort_by(|a, b| sort_key(&a.label).cmp(sort_key(&b.label)));

    Ok(items)
}

fn sort_key(label: &str) -> &str {
    if label == VALID_LABEL { "" } else { label }
}
