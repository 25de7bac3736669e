//! Report assembly and rendering.
//!
//! [`SummaryRowBuilder`] turns a split dataset into one
//! [`SummaryTableRow`](crate::types::SummaryTableRow) per declared column.
//! [`ReportObject`] pairs those rows with the bundle header, and
//! [`ReportGenerator`] splices the serialized report into an HTML template.
//!
//! # Example
//!
//! ```rust,ignore
//! use codebook_report::{Bundle, ReportConfig, ReportGenerator, ReportObject};
//! use std::path::Path;
//!
//! let bundle = Bundle::read_file(Path::new("data/wave1.json"))?;
//! let config = ReportConfig::default();
//! let report = ReportObject::encode(&bundle, &config)?;
//!
//! // Print as JSON
//! println!("{}", serde_json::to_string_pretty(&report)?);
//!
//! // Or write data/wave1.codebook.html
//! ReportGenerator::new(config).write_report(Path::new("data/wave1.json"), &report)?;
//! ```

mod generator;
mod summary;

pub use generator::{ReportGenerator, ReportObject};
pub use summary::{SummaryRowBuilder, build_summary_rows};
