//! Flattened report rows and CSV output.

use std::io::Write;

use casewatch_export_models::ExportRow;
use casewatch_report::canonicalize;
use casewatch_report_models::{CanonicalReport, NOT_AVAILABLE, Report, ReportField};
use chrono::{DateTime, NaiveDate};

use crate::ExportError;

/// Column headers, in [`ExportRow`] field order.
pub const CSV_HEADERS: &[&str] = &[
    "No.",
    "Case ID",
    "Name",
    "Type",
    "Status",
    "City",
    "Barangay",
    "Age",
    "Gender",
    "Last Known Location",
    "Date Reported",
];

/// Flattens one report. `index` is its 0-based position in the collection.
#[must_use]
pub fn export_row(index: usize, report: &Report) -> ExportRow {
    row_from_canonical(index, &canonicalize(report))
}

/// Flattens a collection, numbering rows from 1.
#[must_use]
pub fn export_rows(reports: &[Report]) -> Vec<ExportRow> {
    reports
        .iter()
        .enumerate()
        .map(|(i, report)| export_row(i, report))
        .collect()
}

pub(crate) fn row_from_canonical(index: usize, report: &CanonicalReport) -> ExportRow {
    let field = |f: ReportField| report.field_or_na(f).to_string();

    ExportRow {
        number: index + 1,
        case_id: field(ReportField::CaseId),
        name: report.display_name.clone(),
        report_type: field(ReportField::Type),
        status: field(ReportField::Status),
        city: field(ReportField::City),
        barangay: field(ReportField::Barangay),
        age: field(ReportField::Age),
        gender: field(ReportField::Gender),
        last_known_location: field(ReportField::LastKnownLocation),
        date_reported: report
            .created_at
            .as_deref()
            .map_or_else(|| NOT_AVAILABLE.to_string(), display_date),
    }
}

/// Renders a timestamp as `YYYY-MM-DD`. Unparseable values pass through.
fn display_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.date_naive().to_string();
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .map_or_else(|| raw.to_string(), |date| date.to_string())
}

/// Writes rows as CSV with a header line. An empty slice still produces
/// the header.
///
/// # Errors
///
/// Returns [`ExportError`] if serialization or the underlying write fails.
pub fn write_csv<W: Write>(writer: W, rows: &[ExportRow]) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);

    if rows.is_empty() {
        csv.write_record(CSV_HEADERS)?;
    }
    for row in rows {
        csv.serialize(row)?;
    }

    csv.flush()?;
    log::debug!("Wrote {} CSV rows", rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn flattens_variant_reports() {
        let reports = vec![
            Report::new(json!({
                "caseNumber": "MP-9",
                "person": {"fullName": "Juan  Dela Cruz", "age": 12},
                "caseStatus": "Pending",
                "location": {"city": "Pasig"},
                "createdAt": "2024-02-10T16:30:00+08:00"
            })),
            Report::new(json!({})),
        ];
        let rows = export_rows(&reports);

        assert_eq!(rows[0].number, 1);
        assert_eq!(rows[0].case_id, "MP-9");
        assert_eq!(rows[0].name, "Juan Dela Cruz");
        assert_eq!(rows[0].city, "Pasig");
        assert_eq!(rows[0].age, "12");
        assert_eq!(rows[0].date_reported, "2024-02-10");
        assert_eq!(rows[0].barangay, NOT_AVAILABLE);

        assert_eq!(rows[1].number, 2);
        assert_eq!(rows[1].name, NOT_AVAILABLE);
        assert_eq!(rows[1].date_reported, NOT_AVAILABLE);
    }

    #[test]
    fn writes_header_and_rows() {
        let rows = export_rows(&[Report::new(json!({
            "caseId": "MP-1",
            "firstName": "Ana",
            "lastName": "Reyes",
            "lastKnownLocation": "Ayala Ave, Makati",
            "createdAt": "2024-01-05"
        }))]);
        let mut out = Vec::new();
        write_csv(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some(CSV_HEADERS.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("1,MP-1,Ana Reyes,N/A,N/A,N/A,N/A,N/A,N/A,\"Ayala Ave, Makati\",2024-01-05")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_export_still_has_header() {
        let mut out = Vec::new();
        write_csv(&mut out, &[]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap().trim_end(),
            CSV_HEADERS.join(",")
        );
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_is_reported() {
        assert!(matches!(
            write_csv(ClosedPipe, &[]),
            Err(ExportError::Io(e)) if e.kind() == std::io::ErrorKind::BrokenPipe
        ));
    }
}
