#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Export document data shapes.
//!
//! These types describe the content of a printable case report: header
//! metadata, the aggregate summary, fixed-size pages of report rows, and a
//! footer. Layout is left to whatever renders the document.

use casewatch_analytics_models::{AggregateResult, DEFAULT_TOP_CITIES};
use casewatch_filter_models::FilterDimension;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of report rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Default document title.
pub const DEFAULT_TITLE: &str = "Missing Persons Case Report";

/// Exporter name used when the profile yields nothing better.
pub const FALLBACK_EXPORTER: &str = "Admin";

/// Knobs for composing an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    /// Document title.
    pub title: String,
    /// Report rows per page. Must be positive.
    pub page_size: usize,
    /// Number of cities listed as hotspots.
    pub top_cities: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            top_cities: DEFAULT_TOP_CITIES,
        }
    }
}

/// What is known about the person running the export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExporterProfile {
    /// Name to print regardless of the rest of the profile.
    pub override_name: Option<String>,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
}

/// One line of the filter summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSummary {
    /// The summarized dimension.
    pub dimension: FilterDimension,
    /// Dimension title (e.g. `"Police Station"`).
    pub title: String,
    /// Selected values, or the dimension's "All ..." label.
    pub value: String,
}

/// Header metadata common to both document variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportHeader {
    /// Document title.
    pub title: String,
    /// When the document was composed.
    pub generated_at: DateTime<Utc>,
    /// Resolved exporter name.
    pub exporter: String,
    /// Filter summary lines.
    pub filters: Vec<FilterSummary>,
}

/// One flattened report row. Field names double as CSV column headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    /// 1-based position in the full collection.
    #[serde(rename = "No.")]
    pub number: usize,
    /// Case number.
    #[serde(rename = "Case ID")]
    pub case_id: String,
    /// Composed person name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Report type.
    #[serde(rename = "Type")]
    pub report_type: String,
    /// Status label.
    #[serde(rename = "Status")]
    pub status: String,
    /// City.
    #[serde(rename = "City")]
    pub city: String,
    /// Barangay.
    #[serde(rename = "Barangay")]
    pub barangay: String,
    /// Age.
    #[serde(rename = "Age")]
    pub age: String,
    /// Gender.
    #[serde(rename = "Gender")]
    pub gender: String,
    /// Last known location.
    #[serde(rename = "Last Known Location")]
    pub last_known_location: String,
    /// Filing date.
    #[serde(rename = "Date Reported")]
    pub date_reported: String,
}

/// A fixed-size slice of the report table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPage {
    /// 1-based page number.
    pub number: usize,
    /// 0-based index of the first row in the full collection.
    pub start_index: usize,
    /// Rows on this page.
    pub rows: Vec<ExportRow>,
}

/// Closing metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFooter {
    /// Total reports in the document.
    pub total_reports: usize,
    /// Total pages in the document.
    pub total_pages: usize,
    /// Attribution line.
    pub note: String,
}

/// A composed export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "variant")]
pub enum ExportDocument {
    /// Nothing matched the filters.
    Empty {
        /// Header metadata.
        header: ExportHeader,
        /// Message shown in place of the table.
        message: String,
    },
    /// Summary plus paginated report table.
    Full {
        /// Header metadata.
        header: ExportHeader,
        /// Aggregate over every report in the document.
        summary: AggregateResult,
        /// Report table pages.
        pages: Vec<ReportPage>,
        /// Closing metadata.
        footer: ExportFooter,
    },
}

impl ExportDocument {
    /// Header metadata of either variant.
    #[must_use]
    pub const fn header(&self) -> &ExportHeader {
        match self {
            Self::Empty { header, .. } | Self::Full { header, .. } => header,
        }
    }

    /// Whether this is the "no data" variant.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }

    /// Every row across all pages, in order.
    pub fn rows(&self) -> impl Iterator<Item = &ExportRow> {
        let pages: &[ReportPage] = match self {
            Self::Empty { .. } => &[],
            Self::Full { pages, .. } => pages,
        };
        pages.iter().flat_map(|page| page.rows.iter())
    }
}
