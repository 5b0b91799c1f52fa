//! Report collection input.

use std::path::Path;

use casewatch_report_models::Report;
use serde_json::Value;

/// Keys under which a backend response envelope may carry the report list.
const ENVELOPE_KEYS: &[&str] = &["data", "reports", "items", "results"];

/// Reads reports from a JSON file holding either an array or an envelope
/// object with the array under one of [`ENVELOPE_KEYS`].
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not JSON, or holds no
/// report array.
pub fn load_reports(path: &Path) -> Result<Vec<Report>, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&contents)?;
    let reports = parse_reports(value)?;
    log::info!("Loaded {} reports from {}", reports.len(), path.display());
    Ok(reports)
}

/// Extracts the report array from a parsed document.
///
/// # Errors
///
/// Returns a message if no report array is found.
pub fn parse_reports(value: Value) -> Result<Vec<Report>, String> {
    match value {
        Value::Array(items) => Ok(items.into_iter().map(Report::new).collect()),
        Value::Object(mut map) => ENVELOPE_KEYS
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .map(|items| items.into_iter().map(Report::new).collect())
            .ok_or_else(|| {
                format!(
                    "expected a report array or an object with one of {}",
                    ENVELOPE_KEYS.join(", ")
                )
            }),
        _ => Err("expected a JSON array of reports".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn accepts_bare_arrays_and_envelopes() {
        assert_eq!(parse_reports(json!([{"id": 1}, {"id": 2}])).unwrap().len(), 2);
        assert_eq!(
            parse_reports(json!({"success": true, "data": [{"id": 1}]}))
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            parse_reports(json!({"data": {"page": 1}, "reports": []}))
                .unwrap()
                .len(),
            0
        );
    }

    #[test]
    fn rejects_other_shapes() {
        assert!(parse_reports(json!({"message": "ok"})).is_err());
        assert!(parse_reports(json!("reports")).is_err());
    }
}
