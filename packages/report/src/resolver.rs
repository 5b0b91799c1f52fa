//! Multi-candidate field resolution.
//!
//! Each canonical [`ReportField`] owns an ordered list of [`Candidate`]
//! accessors covering the key spellings and nested shapes seen across
//! report producers. Candidates are tried in order and the first usable
//! value wins. Resolution never fails: a missing intermediate object, a
//! `null`, or an empty string all mean "try the next candidate".

use casewatch_report_models::{CanonicalReport, NOT_AVAILABLE, Report, ReportField};
use serde_json::Value;

use crate::name::compose_name;

/// One way of reading a field out of a [`Report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    /// A top-level key.
    Key(&'static str),
    /// A nested key path, e.g. `["person", "firstName"]`.
    Path(&'static [&'static str]),
    /// First whitespace-separated token of a combined full-name value.
    FullNameFirst(&'static [&'static str]),
    /// Every token after the first of a combined full-name value, joined by
    /// single spaces.
    FullNameRest(&'static [&'static str]),
}

impl Candidate {
    /// Extracts this candidate's value, or `None` if it is absent, `null`,
    /// an empty string, or not a scalar.
    #[must_use]
    pub fn extract(&self, report: &Report) -> Option<String> {
        match self {
            Self::Key(key) => report.get(key).and_then(scalar),
            Self::Path(path) => report.get_path(path).and_then(scalar),
            Self::FullNameFirst(path) => {
                let full = report.get_path(path).and_then(scalar)?;
                full.split_whitespace().next().map(String::from)
            }
            Self::FullNameRest(path) => {
                let full = report.get_path(path).and_then(scalar)?;
                let rest = full.split_whitespace().skip(1).collect::<Vec<_>>();
                if rest.is_empty() {
                    None
                } else {
                    Some(rest.join(" "))
                }
            }
        }
    }
}

/// Renders a JSON scalar as a string. Empty strings, `null`, arrays and
/// objects are not usable values.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

const ID: &[Candidate] = &[
    Candidate::Key("id"),
    Candidate::Key("_id"),
    Candidate::Key("reportId"),
    Candidate::Key("report_id"),
];

const CASE_ID: &[Candidate] = &[
    Candidate::Key("caseId"),
    Candidate::Key("case_id"),
    Candidate::Key("caseNumber"),
    Candidate::Key("case_number"),
    Candidate::Key("reportNumber"),
    Candidate::Key("referenceNumber"),
];

const TYPE: &[Candidate] = &[
    Candidate::Key("type"),
    Candidate::Key("reportType"),
    Candidate::Key("report_type"),
    Candidate::Key("caseType"),
    Candidate::Key("category"),
];

const STATUS: &[Candidate] = &[
    Candidate::Key("status"),
    Candidate::Key("caseStatus"),
    Candidate::Key("case_status"),
    Candidate::Key("reportStatus"),
];

const CITY: &[Candidate] = &[
    Candidate::Key("city"),
    Candidate::Path(&["location", "city"]),
    Candidate::Path(&["address", "city"]),
    Candidate::Path(&["lastKnownLocation", "city"]),
    Candidate::Path(&["person", "city"]),
    Candidate::Key("cityName"),
    Candidate::Key("municipality"),
];

const BARANGAY: &[Candidate] = &[
    Candidate::Key("barangay"),
    Candidate::Path(&["location", "barangay"]),
    Candidate::Path(&["address", "barangay"]),
    Candidate::Path(&["lastKnownLocation", "barangay"]),
    Candidate::Key("brgy"),
    Candidate::Key("barangayName"),
];

const CREATED_AT: &[Candidate] = &[
    Candidate::Key("createdAt"),
    Candidate::Key("created_at"),
    Candidate::Key("dateReported"),
    Candidate::Key("reportedAt"),
    Candidate::Key("dateCreated"),
];

const UPDATED_AT: &[Candidate] = &[
    Candidate::Key("updatedAt"),
    Candidate::Key("updated_at"),
    Candidate::Key("lastUpdated"),
    Candidate::Key("dateUpdated"),
];

const FIRST_NAME: &[Candidate] = &[
    Candidate::Key("firstName"),
    Candidate::Key("first_name"),
    Candidate::Path(&["person", "firstName"]),
    Candidate::Path(&["person", "first_name"]),
    Candidate::Path(&["personInvolved", "firstName"]),
    Candidate::Path(&["missingPerson", "firstName"]),
    Candidate::FullNameFirst(&["fullName"]),
    Candidate::FullNameFirst(&["name"]),
    Candidate::FullNameFirst(&["person", "fullName"]),
    Candidate::FullNameFirst(&["person", "name"]),
];

const LAST_NAME: &[Candidate] = &[
    Candidate::Key("lastName"),
    Candidate::Key("last_name"),
    Candidate::Path(&["person", "lastName"]),
    Candidate::Path(&["person", "last_name"]),
    Candidate::Path(&["personInvolved", "lastName"]),
    Candidate::Path(&["missingPerson", "lastName"]),
    Candidate::FullNameRest(&["fullName"]),
    Candidate::FullNameRest(&["name"]),
    Candidate::FullNameRest(&["person", "fullName"]),
    Candidate::FullNameRest(&["person", "name"]),
];

const AGE: &[Candidate] = &[
    Candidate::Key("age"),
    Candidate::Path(&["person", "age"]),
    Candidate::Path(&["personInvolved", "age"]),
    Candidate::Path(&["missingPerson", "age"]),
];

const GENDER: &[Candidate] = &[
    Candidate::Key("gender"),
    Candidate::Key("sex"),
    Candidate::Path(&["person", "gender"]),
    Candidate::Path(&["person", "sex"]),
    Candidate::Path(&["personInvolved", "gender"]),
    Candidate::Path(&["missingPerson", "gender"]),
];

const LAST_KNOWN_LOCATION: &[Candidate] = &[
    Candidate::Key("lastKnownLocation"),
    Candidate::Key("last_known_location"),
    Candidate::Key("lastSeenLocation"),
    Candidate::Path(&["lastKnownLocation", "address"]),
    Candidate::Path(&["location", "address"]),
    Candidate::Key("location"),
];

/// Returns the ordered candidate list for a canonical field.
#[must_use]
pub const fn candidates(field: ReportField) -> &'static [Candidate] {
    match field {
        ReportField::Id => ID,
        ReportField::CaseId => CASE_ID,
        ReportField::Type => TYPE,
        ReportField::Status => STATUS,
        ReportField::City => CITY,
        ReportField::Barangay => BARANGAY,
        ReportField::CreatedAt => CREATED_AT,
        ReportField::UpdatedAt => UPDATED_AT,
        ReportField::FirstName => FIRST_NAME,
        ReportField::LastName => LAST_NAME,
        ReportField::Age => AGE,
        ReportField::Gender => GENDER,
        ReportField::LastKnownLocation => LAST_KNOWN_LOCATION,
    }
}

/// Resolves a canonical field, trying its candidates in priority order.
#[must_use]
pub fn resolve(report: &Report, field: ReportField) -> Option<String> {
    candidates(field)
        .iter()
        .find_map(|candidate| candidate.extract(report))
}

/// Resolves a canonical field, returning `fallback` when every candidate is
/// absent.
#[must_use]
pub fn resolve_or(report: &Report, field: ReportField, fallback: &str) -> String {
    resolve(report, field).unwrap_or_else(|| {
        log::trace!("No candidate for {field}, using fallback {fallback:?}");
        fallback.to_string()
    })
}

/// Resolves a field by name.
///
/// Names of canonical fields (`"city"`, `"caseId"`, ...) use the registered
/// candidate list. Any other name is looked up directly on the report.
#[must_use]
pub fn resolve_named(report: &Report, name: &str, fallback: &str) -> String {
    if let Ok(field) = name.parse::<ReportField>() {
        return resolve_or(report, field, fallback);
    }
    report
        .get(name)
        .and_then(scalar)
        .unwrap_or_else(|| fallback.to_string())
}

/// Builds the canonical view of a report.
#[must_use]
pub fn canonicalize(report: &Report) -> CanonicalReport {
    CanonicalReport {
        id: resolve(report, ReportField::Id),
        case_id: resolve(report, ReportField::CaseId),
        report_type: resolve(report, ReportField::Type),
        status: resolve(report, ReportField::Status),
        city: resolve(report, ReportField::City),
        barangay: resolve(report, ReportField::Barangay),
        created_at: resolve(report, ReportField::CreatedAt),
        updated_at: resolve(report, ReportField::UpdatedAt),
        first_name: resolve(report, ReportField::FirstName),
        last_name: resolve(report, ReportField::LastName),
        age: resolve(report, ReportField::Age),
        gender: resolve(report, ReportField::Gender),
        last_known_location: resolve(report, ReportField::LastKnownLocation),
        display_name: compose_name(report, NOT_AVAILABLE),
    }
}

/// Builds canonical views for a whole collection, preserving order.
#[must_use]
pub fn canonicalize_all(reports: &[Report]) -> Vec<CanonicalReport> {
    reports.iter().map(canonicalize).collect()
}
