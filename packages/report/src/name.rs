//! Display-name composition from resolved name fields.

use casewatch_report_models::{Report, ReportField};

use crate::resolver::resolve;

/// Builds `"first last"` for the person on a report.
///
/// First and last names are resolved independently. Returns `fallback` when
/// neither yields any non-whitespace text.
#[must_use]
pub fn compose_name(report: &Report, fallback: &str) -> String {
    let first = resolve(report, ReportField::FirstName);
    let last = resolve(report, ReportField::LastName);
    join_name(first.as_deref(), last.as_deref(), fallback)
}

/// Joins name parts with a single space, trimming each part.
///
/// The result never has leading or trailing whitespace and never contains
/// a dangling separator.
#[must_use]
pub fn join_name(first: Option<&str>, last: Option<&str>, fallback: &str) -> String {
    let parts: Vec<&str> = [first, last]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if parts.is_empty() {
        fallback.to_string()
    } else {
        parts.join(" ")
    }
}
