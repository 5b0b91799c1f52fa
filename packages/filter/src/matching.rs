//! Applying an array-form filter selection to already-fetched reports.

use std::cmp::Ordering;

use casewatch_filter_models::FilterSelection;
use casewatch_report::{canonicalize, resolve_named};
use casewatch_report_models::{AgeCategory, CanonicalReport, NOT_AVAILABLE, Report};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use strum_macros::{AsRefStr, Display, EnumString};

/// Length of the `YYYY-MM-DD` prefix of a timestamp.
const DATE_PREFIX_LEN: usize = 10;

/// Returns whether a report satisfies every non-empty dimension of a
/// selection.
///
/// Multi-value dimensions match case-insensitively against any of the
/// selected values. `startDate` and `endDate` are inclusive and compare
/// against the date part of `createdAt`. `query` is a case-insensitive
/// substring search over the case id, person name, and last known location.
#[must_use]
pub fn matches(report: &Report, canonical: &CanonicalReport, selection: &FilterSelection) -> bool {
    let police_station = resolve_named(report, "policeStation", "");
    let officer = resolve_named(report, "assignedOfficerId", "");

    one_of(canonical.status.as_deref(), &selection.status)
        && one_of(canonical.report_type.as_deref(), &selection.report_type)
        && one_of(canonical.city.as_deref(), &selection.city)
        && one_of(canonical.barangay.as_deref(), &selection.barangay)
        && one_of(non_empty(&police_station), &selection.police_station)
        && one_of(canonical.gender.as_deref(), &selection.gender)
        && age_matches(canonical, &selection.age_category)
        && date_matches(canonical, selection)
        && query_matches(canonical, selection.query.as_deref())
        && selection
            .assigned_officer_id
            .as_deref()
            .is_none_or(|wanted| officer == wanted.trim())
}

/// Keeps the reports matching `selection`, preserving order.
#[must_use]
pub fn filter_reports(reports: Vec<Report>, selection: &FilterSelection) -> Vec<Report> {
    let before = reports.len();
    let kept: Vec<Report> = reports
        .into_iter()
        .filter(|report| matches(report, &canonicalize(report), selection))
        .collect();
    log::debug!("Filter kept {} of {before} reports", kept.len());
    kept
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() { None } else { Some(value) }
}

fn one_of(value: Option<&str>, wanted: &[String]) -> bool {
    if wanted.is_empty() {
        return true;
    }
    value.is_some_and(|v| {
        let v = v.trim();
        wanted.iter().any(|w| w.trim().eq_ignore_ascii_case(v))
    })
}

fn age_matches(canonical: &CanonicalReport, wanted: &[String]) -> bool {
    if wanted.is_empty() {
        return true;
    }
    let Some(category) = canonical.age_category() else {
        return false;
    };
    wanted
        .iter()
        .filter_map(|w| w.trim().parse::<AgeCategory>().ok())
        .any(|w| w == category)
}

fn date_matches(canonical: &CanonicalReport, selection: &FilterSelection) -> bool {
    let start = selection.start_date.as_deref().and_then(parse_date);
    let end = selection.end_date.as_deref().and_then(parse_date);
    if start.is_none() && end.is_none() {
        return true;
    }

    let Some(created) = canonical
        .created_at
        .as_deref()
        .and_then(|c| c.get(..DATE_PREFIX_LEN))
        .and_then(parse_date)
    else {
        return false;
    };

    start.is_none_or(|s| created >= s) && end.is_none_or(|e| created <= e)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date = raw.get(..DATE_PREFIX_LEN).unwrap_or(raw);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

fn query_matches(canonical: &CanonicalReport, query: Option<&str>) -> bool {
    let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
        return true;
    };
    let needle = query.to_lowercase();

    [
        canonical.case_id.as_deref(),
        Some(canonical.display_name.as_str()),
        canonical.last_known_location.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|haystack| haystack.to_lowercase().contains(&needle))
}

/// Column a report list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum SortKey {
    /// Filing timestamp.
    #[default]
    CreatedAt,
    /// Last-modified timestamp.
    UpdatedAt,
    /// Case number.
    CaseId,
    /// Composed person name.
    Name,
    /// City.
    City,
    /// Status label.
    Status,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortOrder {
    /// Smallest first.
    Asc,
    /// Largest first.
    #[default]
    Desc,
}

/// Sorts reports by a canonical column.
///
/// Unrecognized keys fall back to `createdAt`, unrecognized orders to
/// descending. Reports missing the sort value always come last. The sort is
/// stable.
#[must_use]
pub fn sort_reports(
    reports: Vec<Report>,
    sort_by: Option<&str>,
    sort_order: Option<&str>,
) -> Vec<Report> {
    let key = parse_or_default::<SortKey>(sort_by);
    let order = parse_or_default::<SortOrder>(sort_order);

    let mut keyed: Vec<(Option<SortValue>, Report)> = reports
        .into_iter()
        .map(|report| (sort_value(&canonicalize(&report), key), report))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => match order {
            SortOrder::Asc => a.cmp(b),
            SortOrder::Desc => b.cmp(a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    keyed.into_iter().map(|(_, report)| report).collect()
}

fn parse_or_default<T: std::str::FromStr + Default>(raw: Option<&str>) -> T {
    raw.and_then(|r| r.trim().parse().ok()).unwrap_or_default()
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortValue {
    Time(NaiveDateTime),
    Text(String),
}

fn sort_value(canonical: &CanonicalReport, key: SortKey) -> Option<SortValue> {
    let text = |value: Option<&str>| {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| SortValue::Text(v.to_lowercase()))
    };

    match key {
        SortKey::CreatedAt => timestamp(canonical.created_at.as_deref()),
        SortKey::UpdatedAt => timestamp(canonical.updated_at.as_deref()),
        SortKey::CaseId => text(canonical.case_id.as_deref()),
        SortKey::Name => text(
            Some(canonical.display_name.as_str()).filter(|name| *name != NOT_AVAILABLE),
        ),
        SortKey::City => text(canonical.city.as_deref()),
        SortKey::Status => text(canonical.status.as_deref()),
    }
}

/// Parses RFC 3339 timestamps and bare dates. Anything else sorts as text
/// so malformed values still order deterministically.
fn timestamp(raw: Option<&str>) -> Option<SortValue> {
    let raw = raw.map(str::trim).filter(|r| !r.is_empty())?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(SortValue::Time(parsed.naive_utc()));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(SortValue::Time(parsed));
    }
    if let Some(date) = parse_date(raw).and_then(|d| d.and_hms_opt(0, 0, 0)) {
        return Some(SortValue::Time(date));
    }
    Some(SortValue::Text(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn reports() -> Vec<Report> {
        vec![
            Report::new(json!({
                "caseId": "MP-001",
                "status": "Pending",
                "city": "Makati",
                "barangay": "Poblacion",
                "firstName": "Ana",
                "lastName": "Reyes",
                "age": 9,
                "gender": "Female",
                "createdAt": "2024-03-01T08:00:00Z",
                "policeStation": "Makati Station 1",
                "assignedOfficerId": "officer-7"
            })),
            Report::new(json!({
                "caseId": "MP-002",
                "status": "resolved",
                "location": {"city": "Taguig"},
                "person": {"firstName": "Ben", "lastName": "Cruz", "age": "44"},
                "gender": "Male",
                "createdAt": "2024-04-15T23:59:00Z",
                "lastKnownLocation": "Market! Market!"
            })),
            Report::new(json!({
                "caseId": "MP-003",
                "status": "Under Investigation",
                "city": "Makati",
                "fullName": "Carla Dela Cruz",
                "age": 15,
                "createdAt": "2024-05-20"
            })),
        ]
    }

    fn case_ids(reports: &[Report]) -> Vec<String> {
        reports
            .iter()
            .map(|r| resolve_named(r, "caseId", "?"))
            .collect()
    }

    #[test]
    fn empty_selection_keeps_everything() {
        let kept = filter_reports(reports(), &FilterSelection::default());
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn multi_value_membership_is_case_insensitive() {
        let selection = FilterSelection {
            status: vec!["RESOLVED".to_string(), "pending".to_string()],
            ..FilterSelection::default()
        };
        assert_eq!(
            case_ids(&filter_reports(reports(), &selection)),
            vec!["MP-001", "MP-002"]
        );
    }

    #[test]
    fn missing_value_never_matches_a_set_dimension() {
        let selection = FilterSelection {
            gender: vec!["Female".to_string(), "Male".to_string()],
            ..FilterSelection::default()
        };
        assert_eq!(
            case_ids(&filter_reports(reports(), &selection)),
            vec!["MP-001", "MP-002"]
        );
    }

    #[test]
    fn filters_by_age_category() {
        let selection = FilterSelection {
            age_category: vec!["child".to_string(), "Teen".to_string()],
            ..FilterSelection::default()
        };
        assert_eq!(
            case_ids(&filter_reports(reports(), &selection)),
            vec!["MP-001", "MP-003"]
        );
    }

    #[test]
    fn date_range_is_inclusive() {
        let selection = FilterSelection {
            start_date: Some("2024-03-01".to_string()),
            end_date: Some("2024-04-15".to_string()),
            ..FilterSelection::default()
        };
        assert_eq!(
            case_ids(&filter_reports(reports(), &selection)),
            vec!["MP-001", "MP-002"]
        );
    }

    #[test]
    fn query_searches_id_name_and_location() {
        let by_name = FilterSelection {
            query: Some("dela cruz".to_string()),
            ..FilterSelection::default()
        };
        assert_eq!(case_ids(&filter_reports(reports(), &by_name)), vec!["MP-003"]);

        let by_location = FilterSelection {
            query: Some("market".to_string()),
            ..FilterSelection::default()
        };
        assert_eq!(
            case_ids(&filter_reports(reports(), &by_location)),
            vec!["MP-002"]
        );
    }

    #[test]
    fn station_and_officer_use_direct_lookup() {
        let selection = FilterSelection {
            police_station: vec!["makati station 1".to_string()],
            assigned_officer_id: Some("officer-7".to_string()),
            ..FilterSelection::default()
        };
        assert_eq!(case_ids(&filter_reports(reports(), &selection)), vec!["MP-001"]);

        let other_officer = FilterSelection {
            assigned_officer_id: Some("officer-8".to_string()),
            ..FilterSelection::default()
        };
        assert!(filter_reports(reports(), &other_officer).is_empty());
    }

    #[test]
    fn sorts_by_created_at_descending_by_default() {
        let sorted = sort_reports(reports(), None, None);
        assert_eq!(case_ids(&sorted), vec!["MP-003", "MP-002", "MP-001"]);
    }

    #[test]
    fn sorts_by_name_ascending() {
        let sorted = sort_reports(reports(), Some("name"), Some("ASC"));
        assert_eq!(case_ids(&sorted), vec!["MP-001", "MP-002", "MP-003"]);
    }

    #[test]
    fn missing_values_sort_last_in_either_direction() {
        let mut input = reports();
        input.insert(0, Report::new(json!({"caseId": "MP-000"})));

        let asc = sort_reports(input.clone(), Some("city"), Some("asc"));
        assert_eq!(case_ids(&asc), vec!["MP-001", "MP-003", "MP-002", "MP-000"]);

        let desc = sort_reports(input, Some("city"), Some("desc"));
        assert_eq!(case_ids(&desc), vec!["MP-002", "MP-001", "MP-003", "MP-000"]);
    }

    #[test]
    fn unknown_sort_key_falls_back_to_created_at() {
        assert_eq!(
            "updatedat".parse::<SortKey>().unwrap(),
            SortKey::UpdatedAt
        );
        let sorted = sort_reports(reports(), Some("severity"), Some("asc"));
        assert_eq!(case_ids(&sorted), vec!["MP-001", "MP-002", "MP-003"]);
    }
}
