//! Export document composition.

use casewatch_analytics::aggregate_canonical;
use casewatch_export_models::{
    ExportDocument, ExportFooter, ExportHeader, ExportOptions, ExporterProfile, FALLBACK_EXPORTER,
    FilterSummary, ReportPage,
};
use casewatch_filter_models::{DimensionValue, FilterDimension, FilterSelection};
use casewatch_report::{canonicalize_all, join_name};
use casewatch_report_models::{AgeCategory, CanonicalReport, Report};
use chrono::{DateTime, Utc};

use crate::paginate::paginate;
use crate::rows::row_from_canonical;

/// Message of the "no data" document.
pub const NO_DATA_MESSAGE: &str = "No reports match the selected filters.";

/// Dimensions listed in the filter summary.
const SUMMARY_DIMENSIONS: &[FilterDimension] = &[
    FilterDimension::Status,
    FilterDimension::Type,
    FilterDimension::City,
    FilterDimension::Barangay,
    FilterDimension::PoliceStation,
    FilterDimension::Gender,
    FilterDimension::AgeCategory,
    FilterDimension::StartDate,
    FilterDimension::EndDate,
    FilterDimension::Query,
];

/// Composes an export document.
///
/// An empty collection yields [`ExportDocument::Empty`] without running
/// aggregation or pagination. Otherwise the whole collection is aggregated
/// once and paginated once.
///
/// # Panics
///
/// Panics if `options.page_size` is zero and `reports` is non-empty.
#[must_use]
pub fn compose(
    reports: &[Report],
    filters: &FilterSelection,
    exporter: &ExporterProfile,
    options: &ExportOptions,
    generated_at: DateTime<Utc>,
) -> ExportDocument {
    let header = ExportHeader {
        title: options.title.clone(),
        generated_at,
        exporter: resolve_exporter_name(exporter),
        filters: summarize_filters(filters),
    };

    if reports.is_empty() {
        log::debug!("No reports to export, composing empty document");
        return ExportDocument::Empty {
            header,
            message: NO_DATA_MESSAGE.to_string(),
        };
    }

    let canonical = canonicalize_all(reports);
    let summary = aggregate_canonical(&canonical, options.top_cities);
    let pages = build_pages(&canonical, options.page_size);

    let footer = ExportFooter {
        total_reports: reports.len(),
        total_pages: pages.len(),
        note: format!(
            "Generated by {} on {}",
            header.exporter,
            generated_at.format("%Y-%m-%d %H:%M UTC")
        ),
    };

    log::info!(
        "Composed export of {} reports across {} pages",
        footer.total_reports,
        footer.total_pages
    );

    ExportDocument::Full {
        header,
        summary,
        pages,
        footer,
    }
}

fn build_pages(canonical: &[CanonicalReport], page_size: usize) -> Vec<ReportPage> {
    let rows: Vec<_> = canonical
        .iter()
        .enumerate()
        .map(|(i, report)| row_from_canonical(i, report))
        .collect();

    paginate(&rows, page_size)
        .into_iter()
        .enumerate()
        .map(|(k, rows)| ReportPage {
            number: k + 1,
            start_index: k * page_size,
            rows,
        })
        .collect()
}

/// Picks the name printed as the exporter: the override, else the composed
/// first and last name, else the email, else `"Admin"`.
#[must_use]
pub fn resolve_exporter_name(profile: &ExporterProfile) -> String {
    if let Some(name) = non_blank(profile.override_name.as_deref()) {
        return name.to_string();
    }

    let composed = join_name(
        profile.first_name.as_deref(),
        profile.last_name.as_deref(),
        "",
    );
    if !composed.is_empty() {
        return composed;
    }

    non_blank(profile.email.as_deref()).map_or_else(|| FALLBACK_EXPORTER.to_string(), String::from)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Renders each user-facing dimension as its selected values, or its
/// "All ..." label when unfiltered.
#[must_use]
pub fn summarize_filters(selection: &FilterSelection) -> Vec<FilterSummary> {
    SUMMARY_DIMENSIONS
        .iter()
        .map(|&dimension| {
            let value = match selection.value(dimension) {
                DimensionValue::Multi(values) => {
                    let shown: Vec<String> = values
                        .iter()
                        .map(|v| v.trim())
                        .filter(|v| !v.is_empty())
                        .map(|v| display_value(dimension, v))
                        .collect();
                    (!shown.is_empty()).then(|| shown.join(", "))
                }
                DimensionValue::Single(value) => non_blank(value).map(String::from),
            };

            FilterSummary {
                dimension,
                title: dimension.title().to_string(),
                value: value.unwrap_or_else(|| dimension.all_label().to_string()),
            }
        })
        .collect()
}

fn display_value(dimension: FilterDimension, value: &str) -> String {
    if dimension == FilterDimension::AgeCategory
        && let Ok(category) = value.parse::<AgeCategory>()
    {
        return category.label().to_string();
    }
    value.to_string()
}
