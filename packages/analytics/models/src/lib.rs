#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregate summary types for case report collections.
//!
//! An [`AggregateResult`] is a read-only snapshot computed from a report
//! collection. It is never stored; recompute it when the collection
//! changes.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Bucket label for reports missing the bucketed field.
pub const UNKNOWN_BUCKET: &str = "Unknown";

/// Number of cities kept in [`AggregateResult::top_cities`] by default.
pub const DEFAULT_TOP_CITIES: usize = 5;

/// Status labels counted as resolved.
pub const RESOLVED_STATUSES: &[&str] = &["Found", "Resolved", "Closed"];

/// Status labels counted as under investigation.
pub const INVESTIGATING_STATUSES: &[&str] = &["Under Investigation", "Investigating"];

/// Label of the pending status.
pub const PENDING_STATUS: &str = "Pending";

/// The bucket a status label is counted in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "label")]
pub enum StatusBucket {
    /// One of [`RESOLVED_STATUSES`].
    Resolved,
    /// One of [`INVESTIGATING_STATUSES`].
    UnderInvestigation,
    /// Any other status, bucketed under its own trimmed label.
    Other(String),
}

impl StatusBucket {
    /// Classifies a status label. Matching is case-insensitive; a missing or
    /// blank status lands in the [`UNKNOWN_BUCKET`].
    #[must_use]
    pub fn classify(status: Option<&str>) -> Self {
        let Some(status) = status.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::Other(UNKNOWN_BUCKET.to_string());
        };

        let is_in = |set: &[&str]| set.iter().any(|s| s.eq_ignore_ascii_case(status));

        if is_in(RESOLVED_STATUSES) {
            Self::Resolved
        } else if is_in(INVESTIGATING_STATUSES) {
            Self::UnderInvestigation
        } else {
            Self::Other(status.to_string())
        }
    }

    /// Display label of the bucket.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Resolved => "Resolved",
            Self::UnderInvestigation => "Under Investigation",
            Self::Other(label) => label,
        }
    }
}

/// The number of reports in one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketCount {
    /// Bucket label.
    pub label: String,
    /// Reports in the bucket.
    pub count: u64,
    /// Share of the total, in percent rounded to one decimal.
    pub percent: f64,
}

/// A categorical breakdown carried by [`AggregateResult`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum Distribution {
    /// Per status bucket.
    Status,
    /// Per report type.
    Type,
    /// Per city.
    City,
    /// Per gender.
    Gender,
    /// Per age category.
    AgeCategory,
}

impl Distribution {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Status,
            Self::Type,
            Self::City,
            Self::Gender,
            Self::AgeCategory,
        ]
    }
}

/// Summary statistics over a report collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    /// Number of reports aggregated.
    pub total: u64,
    /// Counts per status bucket, in first-seen order.
    pub by_status: Vec<BucketCount>,
    /// Counts per report type, in first-seen order.
    pub by_type: Vec<BucketCount>,
    /// Counts per city, in first-seen order.
    pub by_city: Vec<BucketCount>,
    /// Counts per gender, in first-seen order.
    pub by_gender: Vec<BucketCount>,
    /// Counts per age category, youngest first.
    pub by_age_category: Vec<BucketCount>,
    /// Distinct known cities.
    pub distinct_cities: u64,
    /// Distinct known barangays.
    pub distinct_barangays: u64,
    /// Highest-count known cities, ties in first-seen order.
    pub top_cities: Vec<BucketCount>,
    /// Reports in the resolved bucket.
    pub resolved: u64,
    /// Reports with the pending status.
    pub pending: u64,
    /// Reports in the under-investigation bucket.
    pub under_investigation: u64,
    /// `resolved / total` in percent.
    pub resolution_rate: f64,
    /// `pending / total` in percent.
    pub pending_rate: f64,
    /// `under_investigation / total` in percent.
    pub investigation_rate: f64,
}

impl AggregateResult {
    /// Returns the buckets of one distribution.
    #[must_use]
    pub fn distribution(&self, distribution: Distribution) -> &[BucketCount] {
        match distribution {
            Distribution::Status => &self.by_status,
            Distribution::Type => &self.by_type,
            Distribution::City => &self.by_city,
            Distribution::Gender => &self.by_gender,
            Distribution::AgeCategory => &self.by_age_category,
        }
    }

    /// Count of the status bucket labelled `label`, case-insensitively.
    /// Returns 0 for an absent bucket.
    #[must_use]
    pub fn status_count(&self, label: &str) -> u64 {
        self.by_status
            .iter()
            .find(|b| b.label.eq_ignore_ascii_case(label))
            .map_or(0, |b| b.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_closed_status_sets() {
        assert_eq!(StatusBucket::classify(Some("found")), StatusBucket::Resolved);
        assert_eq!(StatusBucket::classify(Some(" Closed ")), StatusBucket::Resolved);
        assert_eq!(
            StatusBucket::classify(Some("INVESTIGATING")),
            StatusBucket::UnderInvestigation
        );
        assert_eq!(
            StatusBucket::classify(Some("Transferred")),
            StatusBucket::Other("Transferred".to_string())
        );
        assert_eq!(StatusBucket::classify(None).label(), UNKNOWN_BUCKET);
        assert_eq!(StatusBucket::classify(Some("  ")).label(), UNKNOWN_BUCKET);
    }

    #[test]
    fn status_count_is_case_insensitive() {
        let result = AggregateResult {
            by_status: vec![BucketCount {
                label: "Pending".to_string(),
                count: 3,
                percent: 30.0,
            }],
            ..AggregateResult::default()
        };
        assert_eq!(result.status_count("pending"), 3);
        assert_eq!(result.status_count("Resolved"), 0);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(AggregateResult::default()).unwrap();
        assert!(json.get("resolutionRate").is_some());
        assert!(json.get("byAgeCategory").is_some());
        assert_eq!(
            "agecategory".parse::<Distribution>().unwrap(),
            Distribution::AgeCategory
        );
    }
}
