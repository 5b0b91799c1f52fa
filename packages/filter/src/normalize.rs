//! Conversion between the editing and wire forms of a filter.
//!
//! Multi-value dimensions travel as comma-joined strings. The flat form
//! cannot carry a comma inside an individual value.

use casewatch_filter_models::{DimensionValue, FilterDimension, FilterSelection, WireFilters};

/// Separator between values of a multi-value dimension on the wire.
pub const WIRE_DELIMITER: &str = ",";

/// Converts an editing-form selection to the flat wire form.
///
/// Multi-value entries are trimmed, de-duplicated in first-seen order, and
/// joined with [`WIRE_DELIMITER`]. Dimensions left with no value are
/// omitted.
#[must_use]
pub fn to_wire_form(selection: &FilterSelection) -> WireFilters {
    let mut wire = WireFilters::new();

    for dimension in FilterDimension::all() {
        match selection.value(*dimension) {
            DimensionValue::Multi(values) => {
                let cleaned = dedup_trimmed(values.iter().map(String::as_str));
                if !cleaned.is_empty() {
                    wire.insert(*dimension, cleaned.join(WIRE_DELIMITER));
                }
            }
            DimensionValue::Single(Some(value)) if !value.trim().is_empty() => {
                wire.insert(*dimension, value.to_string());
            }
            DimensionValue::Single(_) => {}
        }
    }

    wire
}

/// Converts a flat wire form back to the editing form.
///
/// Multi-value dimensions are split on [`WIRE_DELIMITER`], trimmed, and
/// stripped of empty tokens.
#[must_use]
pub fn to_array_form(wire: &WireFilters) -> FilterSelection {
    let mut selection = FilterSelection::default();

    for (dimension, value) in wire.iter() {
        if dimension.is_multi() {
            selection.set_multi(dimension, split_multi(value));
        } else if !value.trim().is_empty() {
            selection.set_single(dimension, Some(value.to_string()));
        }
    }

    selection
}

/// Splits a comma-joined value into trimmed, non-empty, unique tokens.
#[must_use]
pub fn split_multi(value: &str) -> Vec<String> {
    dedup_trimmed(value.split(WIRE_DELIMITER))
}

fn dedup_trimmed<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values.map(str::trim).filter(|v| !v.is_empty()) {
        if !out.iter().any(|seen| seen == value) {
            out.push(value.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn joins_multi_values_and_omits_empty() {
        let selection = FilterSelection {
            status: strings(&[" Pending", "Resolved "]),
            city: Vec::new(),
            barangay: strings(&["", "  "]),
            query: Some(String::new()),
            sort_by: Some("createdAt".to_string()),
            ..FilterSelection::default()
        };
        let wire = to_wire_form(&selection);
        assert_eq!(wire.get(FilterDimension::Status), Some("Pending,Resolved"));
        assert_eq!(wire.get(FilterDimension::SortBy), Some("createdAt"));
        assert!(!wire.contains(FilterDimension::City));
        assert!(!wire.contains(FilterDimension::Barangay));
        assert!(!wire.contains(FilterDimension::Query));
        assert_eq!(wire.len(), 2);
    }

    #[test]
    fn de_duplicates_on_the_way_out() {
        let selection = FilterSelection {
            city: strings(&["Makati", "Pasig", "Makati"]),
            ..FilterSelection::default()
        };
        assert_eq!(
            to_wire_form(&selection).get(FilterDimension::City),
            Some("Makati,Pasig")
        );
    }

    #[test]
    fn splits_and_trims_tokens() {
        let mut wire = WireFilters::new();
        wire.insert(FilterDimension::Barangay, " Poblacion , ,Bel-Air,".to_string());
        wire.insert(FilterDimension::StartDate, "2024-01-01".to_string());
        let selection = to_array_form(&wire);
        assert_eq!(selection.barangay, strings(&["Poblacion", "Bel-Air"]));
        assert_eq!(selection.start_date.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn round_trips_comma_free_selections() {
        let selection = FilterSelection {
            status: strings(&["Pending", "Under Investigation"]),
            report_type: strings(&["Missing"]),
            city: strings(&["Makati", "Quezon City"]),
            police_station: strings(&["Station 1"]),
            gender: strings(&["Female"]),
            age_category: strings(&["child", "teen"]),
            start_date: Some("2024-01-01".to_string()),
            end_date: Some("2024-12-31".to_string()),
            query: Some("dela cruz".to_string()),
            sort_order: Some("desc".to_string()),
            ..FilterSelection::default()
        };
        assert_eq!(to_array_form(&to_wire_form(&selection)), selection);
    }

    #[test]
    fn embedded_comma_is_not_preserved() {
        let selection = FilterSelection {
            barangay: strings(&["San Isidro, Sur"]),
            ..FilterSelection::default()
        };
        let back = to_array_form(&to_wire_form(&selection));
        assert_eq!(back.barangay, strings(&["San Isidro", "Sur"]));
    }
}
