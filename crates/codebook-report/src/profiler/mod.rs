//! Column profiling for codebook reports.
//!
//! This module computes the per-column numbers a codebook displays:
//! - Missingness breakdown by reason
//! - Type-specific variable statistics (text, coded, numeric)

mod missingness;
mod statistics;

pub use missingness::{VALID_LABEL, calc_missingness};
pub use statistics::{NUM_BINS, calc_variable_stats};
