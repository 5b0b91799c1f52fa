#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Export composition for case report summaries.
//!
//! [`compose::compose`] turns a filtered report collection into an
//! [`ExportDocument`](casewatch_export_models::ExportDocument): one
//! aggregate over the full set, fixed-size pages of flattened rows, and a
//! filter summary. [`rows::write_csv`] writes the same rows as CSV.

pub mod compose;
pub mod paginate;
pub mod rows;

use thiserror::Error;

pub use compose::{compose, resolve_exporter_name, summarize_filters};
pub use paginate::paginate;
pub use rows::{export_row, export_rows, write_csv};

/// Errors that can occur while writing an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
