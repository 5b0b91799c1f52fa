#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation over case report collections.
//!
//! [`aggregate`] makes a single pass over the canonical views of a
//! collection and produces an [`AggregateResult`]: per-status, per-type,
//! per-city, per-gender and per-age-category counts, distinct geography
//! counts, the top cities, and status rates. Every report lands in exactly
//! one bucket of each distribution. Ratios over an empty collection are 0.

use std::collections::{BTreeMap, BTreeSet};

use casewatch_analytics_models::{
    AggregateResult, BucketCount, DEFAULT_TOP_CITIES, PENDING_STATUS, StatusBucket, UNKNOWN_BUCKET,
};
use casewatch_report::canonicalize;
use casewatch_report_models::{AgeCategory, CanonicalReport, Report};

/// Aggregates raw reports, keeping the default number of top cities.
#[must_use]
pub fn aggregate(reports: &[Report]) -> AggregateResult {
    let canonical: Vec<CanonicalReport> = reports.iter().map(canonicalize).collect();
    aggregate_canonical(&canonical, DEFAULT_TOP_CITIES)
}

/// Aggregates canonical views, keeping `top_n` cities in
/// [`AggregateResult::top_cities`].
#[must_use]
pub fn aggregate_canonical(reports: &[CanonicalReport], top_n: usize) -> AggregateResult {
    let total = reports.len() as u64;

    let mut statuses = Tally::default();
    let mut types = Tally::default();
    let mut cities = Tally::default();
    let mut genders = Tally::default();
    let mut ages: BTreeMap<Option<AgeCategory>, u64> = BTreeMap::new();
    let mut barangays = BTreeSet::new();

    let mut resolved = 0;
    let mut under_investigation = 0;

    for report in reports {
        let bucket = StatusBucket::classify(report.status.as_deref());
        match bucket {
            StatusBucket::Resolved => resolved += 1,
            StatusBucket::UnderInvestigation => under_investigation += 1,
            StatusBucket::Other(_) => {}
        }
        statuses.add(bucket.label());

        types.add(known_or_unknown(report.report_type.as_deref()));
        cities.add(known_or_unknown(report.city.as_deref()));
        genders.add(known_or_unknown(report.gender.as_deref()));
        *ages.entry(report.age_category()).or_default() += 1;

        if let Some(barangay) = known(report.barangay.as_deref()) {
            barangays.insert(barangay.to_lowercase());
        }
    }

    let by_status = statuses.into_buckets(total);
    let pending = by_status
        .iter()
        .find(|b| b.label.eq_ignore_ascii_case(PENDING_STATUS))
        .map_or(0, |b| b.count);

    let by_city = cities.into_buckets(total);
    let known_cities: Vec<&BucketCount> = by_city
        .iter()
        .filter(|b| b.label != UNKNOWN_BUCKET)
        .collect();
    let distinct_cities = known_cities.len() as u64;
    let top_cities = top_buckets(&known_cities, top_n);

    let result = AggregateResult {
        total,
        by_status,
        by_type: types.into_buckets(total),
        by_gender: genders.into_buckets(total),
        by_age_category: age_buckets(&ages, total),
        distinct_cities,
        distinct_barangays: barangays.len() as u64,
        top_cities,
        by_city,
        resolved,
        pending,
        under_investigation,
        resolution_rate: percent(resolved, total),
        pending_rate: percent(pending, total),
        investigation_rate: percent(under_investigation, total),
    };

    log::debug!(
        "Aggregated {total} reports: {} resolved, {pending} pending, {} cities",
        result.resolved,
        result.distinct_cities
    );

    result
}

/// `count / total` in percent, rounded to one decimal. Zero when `total` is
/// zero.
#[must_use]
pub fn percent(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = count as f64 / total as f64 * 100.0;
    (ratio * 10.0).round() / 10.0
}

/// Sorts buckets by count, highest first, keeping first-seen order among
/// equal counts, and keeps the first `n`.
#[must_use]
pub fn top_buckets(buckets: &[&BucketCount], n: usize) -> Vec<BucketCount> {
    let mut ranked: Vec<BucketCount> = buckets.iter().map(|b| (*b).clone()).collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    ranked
}

fn known(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn known_or_unknown(value: Option<&str>) -> &str {
    known(value).unwrap_or(UNKNOWN_BUCKET)
}

fn age_buckets(ages: &BTreeMap<Option<AgeCategory>, u64>, total: u64) -> Vec<BucketCount> {
    let mut buckets: Vec<BucketCount> = AgeCategory::all()
        .iter()
        .map(|category| {
            let count = ages.get(&Some(*category)).copied().unwrap_or(0);
            BucketCount {
                label: category.label().to_string(),
                count,
                percent: percent(count, total),
            }
        })
        .collect();

    if let Some(&unknown) = ages.get(&None) {
        buckets.push(BucketCount {
            label: UNKNOWN_BUCKET.to_string(),
            count: unknown,
            percent: percent(unknown, total),
        });
    }

    buckets
}

/// Counts labels in first-seen order. Labels differing only in ASCII case
/// share a bucket, displayed with the first spelling seen.
#[derive(Default)]
struct Tally {
    order: Vec<(String, u64)>,
    index: BTreeMap<String, usize>,
}

impl Tally {
    fn add(&mut self, label: &str) {
        let key = label.to_ascii_lowercase();
        if let Some(&i) = self.index.get(&key) {
            self.order[i].1 += 1;
        } else {
            self.index.insert(key, self.order.len());
            self.order.push((label.to_string(), 1));
        }
    }

    fn into_buckets(self, total: u64) -> Vec<BucketCount> {
        self.order
            .into_iter()
            .map(|(label, count)| BucketCount {
                label,
                count,
                percent: percent(count, total),
            })
            .collect()
    }
}
