//! Cascading barangay and police-station options.
//!
//! Barangay and police-station lists depend on the selected cities. Each
//! city's lists are fetched concurrently with a bounded wait, and a city
//! whose fetch fails or times out simply contributes nothing.
//!
//! [`CityCascade`] tracks the selection over time. Every change of the city
//! set bumps a version number; responses carrying an older version are
//! discarded so a slow, superseded fetch can never overwrite the options of
//! a newer selection.

use std::collections::BTreeSet;
use std::time::Duration;

use casewatch_filter_models::{FilterDimension, ScopeDecision, SelectOption};
use futures::future::join_all;
use serde::Serialize;

use crate::FilterError;
use crate::provider::{OptionProvider, ProviderError};
use crate::scope::require_scope;

/// Default bounded wait for one city's list.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Which per-city list a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OptionKind {
    /// The city's barangay list.
    Barangays,
    /// The city's police-station list.
    PoliceStations,
}

/// A per-city fetch that failed and was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionFailure {
    /// City label.
    pub city: String,
    /// Which list failed.
    pub kind: OptionKind,
    /// Provider error text.
    pub message: String,
}

/// Merged option lists for a set of cities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOptions {
    /// Barangays, unique by label in first-seen order.
    pub barangays: Vec<SelectOption>,
    /// Police stations, unique by label in first-seen order.
    pub police_stations: Vec<SelectOption>,
    /// Per-city failures that were tolerated.
    pub failures: Vec<OptionFailure>,
}

/// Resolves barangay and police-station options for the selected cities.
///
/// With no cities selected and no forced city, no provider calls are made.
/// A jurisdiction-scoped scope replaces the selection with its forced city,
/// which is looked up in the provider's city list to get its code and is
/// fetched even when `selected_cities` is empty.
///
/// # Errors
///
/// Returns [`FilterError::AccessDenied`] if the scope decision is a denial.
pub async fn resolve_options(
    provider: &dyn OptionProvider,
    selected_cities: &[SelectOption],
    decision: &ScopeDecision,
    timeout: Duration,
) -> Result<ResolvedOptions, FilterError> {
    let scope = require_scope(decision)?;

    let cities = match scope.forced_value(FilterDimension::City) {
        Some(forced) => vec![locate_city(provider, forced, timeout).await],
        None => selected_cities.to_vec(),
    };

    Ok(fetch_for_cities(provider, &cities, timeout).await)
}

/// Looks up a city, given by name or code, in the provider's city list.
///
/// Falls back to `(city, city)` when the list is unavailable or has no
/// such city; police stations are keyed by name and still resolve.
pub async fn locate_city(
    provider: &dyn OptionProvider,
    city: &str,
    timeout: Duration,
) -> SelectOption {
    match bounded(timeout, provider.cities()).await {
        Ok(all) => known_city(&all, city),
        Err(e) => {
            log::warn!("City list unavailable, using {city:?} as its own code: {e}");
            SelectOption::new(city, city)
        }
    }
}

fn find_city<'a>(all: &'a [SelectOption], name: &str) -> Option<&'a SelectOption> {
    all.iter()
        .find(|c| c.label.eq_ignore_ascii_case(name) || c.value.eq_ignore_ascii_case(name))
}

fn known_city(all: &[SelectOption], name: &str) -> SelectOption {
    find_city(all, name).cloned().unwrap_or_else(|| {
        log::warn!("City {name:?} not found in provider city list");
        SelectOption::new(name, name)
    })
}

/// Fetches and merges both lists for every city. Never fails; per-city
/// errors end up in [`ResolvedOptions::failures`].
pub async fn fetch_for_cities(
    provider: &dyn OptionProvider,
    cities: &[SelectOption],
    timeout: Duration,
) -> ResolvedOptions {
    let mut resolved = ResolvedOptions::default();
    if cities.is_empty() {
        return resolved;
    }

    let per_city = join_all(cities.iter().map(|city| async move {
        log::debug!("Fetching options for {} ({})", city.label, city.value);
        let (barangays, stations) = tokio::join!(
            bounded(timeout, provider.barangays(&city.value)),
            bounded(timeout, provider.police_stations(&city.label)),
        );
        (city, barangays, stations)
    }))
    .await;

    let mut barangay_labels = BTreeSet::new();
    let mut station_labels = BTreeSet::new();

    for (city, barangays, stations) in per_city {
        match barangays {
            Ok(list) => {
                for option in list {
                    if barangay_labels.insert(option.label.clone()) {
                        resolved.barangays.push(option);
                    }
                }
            }
            Err(e) => resolved.failures.push(failure(city, OptionKind::Barangays, &e)),
        }

        match stations {
            Ok(list) => {
                for station in list {
                    let option = station.to_option();
                    if station_labels.insert(option.label.clone()) {
                        resolved.police_stations.push(option);
                    }
                }
            }
            Err(e) => resolved
                .failures
                .push(failure(city, OptionKind::PoliceStations, &e)),
        }
    }

    resolved
}

async fn bounded<T>(
    timeout: Duration,
    fetch: impl Future<Output = Result<T, ProviderError>>,
) -> Result<T, ProviderError> {
    tokio::time::timeout(timeout, fetch)
        .await
        .unwrap_or(Err(ProviderError::Timeout { after: timeout }))
}

fn failure(city: &SelectOption, kind: OptionKind, error: &ProviderError) -> OptionFailure {
    log::warn!("Skipping {kind:?} for {}: {error}", city.label);
    OptionFailure {
        city: city.label.clone(),
        kind,
        message: error.to_string(),
    }
}

/// A pending option fetch for one version of the city selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRequest {
    /// Selection version this request belongs to.
    pub version: u64,
    /// Cities to fetch for.
    pub cities: Vec<SelectOption>,
}

impl OptionRequest {
    /// Performs the fetch.
    pub async fn resolve(self, provider: &dyn OptionProvider, timeout: Duration) -> OptionResponse {
        let options = fetch_for_cities(provider, &self.cities, timeout).await;
        OptionResponse {
            version: self.version,
            options,
        }
    }
}

/// The result of an [`OptionRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionResponse {
    /// Selection version the options were fetched for.
    pub version: u64,
    /// Fetched options.
    pub options: ResolvedOptions,
}

/// City selection with its dependent barangay/station options and
/// sub-selections.
#[derive(Debug, Clone, Default)]
pub struct CityCascade {
    version: u64,
    locked_city: Option<String>,
    cities: Vec<SelectOption>,
    options: ResolvedOptions,
    barangays: Vec<String>,
    police_stations: Vec<String>,
}

impl CityCascade {
    /// Creates a cascade for the given scope.
    ///
    /// For a jurisdiction-scoped administrator the cascade is pinned to the
    /// forced city and the returned request is its one and only fetch. The
    /// forced city is matched against `known_cities` (the provider's city
    /// list) so barangays are requested by city code.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::AccessDenied`] if the scope decision is a denial.
    pub fn for_scope(
        decision: &ScopeDecision,
        known_cities: &[SelectOption],
    ) -> Result<(Self, Option<OptionRequest>), FilterError> {
        let scope = require_scope(decision)?;

        let Some(city) = scope.forced_value(FilterDimension::City) else {
            return Ok((Self::default(), None));
        };

        let option = known_city(known_cities, city);
        let cascade = Self {
            version: 1,
            locked_city: Some(city.to_string()),
            cities: vec![option.clone()],
            ..Self::default()
        };
        let request = OptionRequest {
            version: 1,
            cities: vec![option],
        };
        Ok((cascade, Some(request)))
    }

    /// Changes the city selection.
    ///
    /// Returns `None` when the set of cities is unchanged. Otherwise the
    /// version is bumped, the current options and the barangay/station
    /// selections are cleared, and a request for the new set is returned.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::CityLocked`] if the cascade is pinned to a
    /// jurisdiction's city.
    pub fn select_cities(
        &mut self,
        cities: Vec<SelectOption>,
    ) -> Result<Option<OptionRequest>, FilterError> {
        if let Some(city) = &self.locked_city {
            return Err(FilterError::CityLocked { city: city.clone() });
        }

        if city_set(&cities) == city_set(&self.cities) {
            return Ok(None);
        }

        self.version += 1;
        self.cities = cities;
        self.options = ResolvedOptions::default();
        self.barangays.clear();
        self.police_stations.clear();

        Ok(Some(OptionRequest {
            version: self.version,
            cities: self.cities.clone(),
        }))
    }

    /// Installs fetched options if they belong to the current selection.
    ///
    /// Returns `false` and leaves state untouched for a stale response.
    pub fn apply(&mut self, response: OptionResponse) -> bool {
        if response.version != self.version {
            log::debug!(
                "Discarding options for selection v{} (current v{})",
                response.version,
                self.version
            );
            return false;
        }
        self.options = response.options;
        true
    }

    /// Sets the selected barangays.
    pub fn select_barangays(&mut self, barangays: Vec<String>) {
        self.barangays = barangays;
    }

    /// Sets the selected police stations.
    pub fn select_police_stations(&mut self, stations: Vec<String>) {
        self.police_stations = stations;
    }

    /// Current selection version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Whether the city selection is fixed.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked_city.is_some()
    }

    /// Selected cities.
    #[must_use]
    pub fn cities(&self) -> &[SelectOption] {
        &self.cities
    }

    /// Options for the current selection.
    #[must_use]
    pub const fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    /// Selected barangays.
    #[must_use]
    pub fn barangays(&self) -> &[String] {
        &self.barangays
    }

    /// Selected police stations.
    #[must_use]
    pub fn police_stations(&self) -> &[String] {
        &self.police_stations
    }
}

fn city_set(cities: &[SelectOption]) -> BTreeSet<&str> {
    cities.iter().map(|c| c.value.as_str()).collect()
}

/// Maps city names or codes to the provider's city options, preserving the
/// requested order. Unknown names are passed through as `(name, name)`.
#[must_use]
pub fn match_cities(all: &[SelectOption], wanted: &[String]) -> Vec<SelectOption> {
    wanted.iter().map(|name| known_city(all, name)).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use casewatch_filter_models::{PoliceStation, Role, RoleScope};

    use super::*;
    use crate::provider::{OptionSnapshot, SnapshotOptionProvider};
    use crate::scope::compute_scope;

    /// Serves two barangays per city; `CityA` always fails, `Slow` never
    /// answers in time.
    #[derive(Default)]
    struct FakeProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl OptionProvider for FakeProvider {
        async fn cities(&self) -> Result<Vec<SelectOption>, ProviderError> {
            Ok(vec![
                SelectOption::new("A", "CityA"),
                SelectOption::new("B", "CityB"),
            ])
        }

        async fn barangays(&self, city_code: &str) -> Result<Vec<SelectOption>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match city_code {
                "A" => Err(ProviderError::NotFound {
                    message: "boom".to_string(),
                }),
                "Slow" => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Vec::new())
                }
                code => Ok(vec![
                    SelectOption::new(format!("{code}-1"), "Poblacion"),
                    SelectOption::new(format!("{code}-2"), format!("{code} Heights")),
                ]),
            }
        }

        async fn police_stations(
            &self,
            city_name: &str,
        ) -> Result<Vec<PoliceStation>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if city_name == "CityA" {
                return Err(ProviderError::NotFound {
                    message: "boom".to_string(),
                });
            }
            Ok(vec![PoliceStation {
                name: "District Station".to_string(),
                id: None,
                address: None,
                city: Some(city_name.to_string()),
            }])
        }
    }

    fn allowed() -> ScopeDecision {
        compute_scope(&RoleScope {
            role: Role::SuperAdmin,
            assigned_city: None,
            user_id: None,
        })
    }

    fn city_admin(city: &str) -> ScopeDecision {
        compute_scope(&RoleScope {
            role: Role::CityAdmin,
            assigned_city: Some(city.to_string()),
            user_id: None,
        })
    }

    #[tokio::test]
    async fn no_cities_means_no_calls() {
        let provider = FakeProvider::default();
        let resolved = resolve_options(&provider, &[], &allowed(), DEFAULT_FETCH_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(resolved, ResolvedOptions::default());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failing_city_does_not_abort_others() {
        let provider = FakeProvider::default();
        let cities = vec![
            SelectOption::new("A", "CityA"),
            SelectOption::new("B", "CityB"),
        ];
        let resolved = resolve_options(&provider, &cities, &allowed(), DEFAULT_FETCH_TIMEOUT)
            .await
            .unwrap();

        let labels: Vec<&str> = resolved.barangays.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Poblacion", "B Heights"]);
        assert_eq!(resolved.police_stations.len(), 1);
        assert_eq!(resolved.failures.len(), 2);
        assert!(resolved.failures.iter().all(|f| f.city == "CityA"));
    }

    #[tokio::test]
    async fn merges_by_label_in_first_seen_order() {
        let provider = FakeProvider::default();
        let cities = vec![
            SelectOption::new("B", "CityB"),
            SelectOption::new("C", "CityC"),
        ];
        let resolved = fetch_for_cities(&provider, &cities, DEFAULT_FETCH_TIMEOUT).await;
        let labels: Vec<&str> = resolved.barangays.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Poblacion", "B Heights", "C Heights"]);
        assert_eq!(resolved.barangays[0].value, "B-1");
        assert_eq!(resolved.police_stations.len(), 1);
        assert!(resolved.failures.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_city_is_bounded() {
        let provider = FakeProvider::default();
        let cities = vec![
            SelectOption::new("Slow", "Slowtown"),
            SelectOption::new("B", "CityB"),
        ];
        let resolved = fetch_for_cities(&provider, &cities, Duration::from_secs(5)).await;
        assert_eq!(resolved.barangays.len(), 2);
        assert_eq!(
            resolved.failures,
            vec![OptionFailure {
                city: "Slowtown".to_string(),
                kind: OptionKind::Barangays,
                message: "Timed out after 5s".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn denied_scope_is_refused() {
        let provider = FakeProvider::default();
        let denied = compute_scope(&RoleScope {
            role: Role::Other,
            assigned_city: None,
            user_id: None,
        });
        let result = resolve_options(
            &provider,
            &[SelectOption::new("B", "CityB")],
            &denied,
            DEFAULT_FETCH_TIMEOUT,
        )
        .await;
        assert!(matches!(result, Err(FilterError::AccessDenied { .. })));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn forced_city_replaces_selection() {
        let provider = FakeProvider::default();
        let selected = vec![
            SelectOption::new("A", "CityA"),
            SelectOption::new("B", "CityB"),
        ];
        let resolved = resolve_options(
            &provider,
            &selected,
            &city_admin("cityb"),
            DEFAULT_FETCH_TIMEOUT,
        )
        .await
        .unwrap();
        assert_eq!(resolved.barangays.len(), 2);
        assert!(resolved.failures.is_empty());
    }

    #[test]
    fn changing_cities_resets_sub_selections() {
        let (mut cascade, initial) = CityCascade::for_scope(&allowed(), &[]).unwrap();
        assert!(initial.is_none());

        let request = cascade
            .select_cities(vec![SelectOption::new("B", "CityB")])
            .unwrap()
            .unwrap();
        assert_eq!(request.version, 1);
        cascade.select_barangays(vec!["Poblacion".to_string()]);
        cascade.select_police_stations(vec!["District Station".to_string()]);

        let unchanged = cascade
            .select_cities(vec![SelectOption::new("B", "CityB")])
            .unwrap();
        assert!(unchanged.is_none());
        assert_eq!(cascade.barangays().len(), 1);

        let request = cascade
            .select_cities(vec![
                SelectOption::new("C", "CityC"),
                SelectOption::new("B", "CityB"),
            ])
            .unwrap()
            .unwrap();
        assert_eq!(request.version, 2);
        assert!(cascade.barangays().is_empty());
        assert!(cascade.police_stations().is_empty());
    }

    #[tokio::test]
    async fn stale_responses_are_discarded() {
        let provider = FakeProvider::default();
        let (mut cascade, _) = CityCascade::for_scope(&allowed(), &[]).unwrap();

        let first = cascade
            .select_cities(vec![SelectOption::new("B", "CityB")])
            .unwrap()
            .unwrap();
        let second = cascade
            .select_cities(vec![SelectOption::new("C", "CityC")])
            .unwrap()
            .unwrap();

        let second_response = second.resolve(&provider, DEFAULT_FETCH_TIMEOUT).await;
        let first_response = first.resolve(&provider, DEFAULT_FETCH_TIMEOUT).await;

        assert!(cascade.apply(second_response));
        assert!(!cascade.apply(first_response));
        assert_eq!(cascade.options().barangays[0].value, "C-1");
    }

    #[tokio::test]
    async fn jurisdiction_cascade_is_locked() {
        let provider = FakeProvider::default();
        let known = provider.cities().await.unwrap();
        let (mut cascade, initial) = CityCascade::for_scope(&city_admin("CityB"), &known).unwrap();
        assert!(cascade.is_locked());

        let request = initial.unwrap();
        assert_eq!(request.cities, vec![SelectOption::new("B", "CityB")]);
        let response = request.resolve(&provider, DEFAULT_FETCH_TIMEOUT).await;
        assert!(cascade.apply(response));
        assert_eq!(cascade.options().barangays[0].value, "B-1");
        assert_eq!(cascade.options().police_stations.len(), 1);

        assert!(matches!(
            cascade.select_cities(vec![SelectOption::new("A", "CityA")]),
            Err(FilterError::CityLocked { .. })
        ));
    }

    fn makati_snapshot() -> SnapshotOptionProvider {
        let snapshot: OptionSnapshot = serde_json::from_value(serde_json::json!({
            "cities": [
                {"value": "137602", "label": "Makati"},
                {"value": "137607", "label": "Taguig"}
            ],
            "barangays": {
                "137602": [
                    {"value": "137602001", "label": "Bel-Air"},
                    {"value": "137602002", "label": "Poblacion"}
                ]
            },
            "policeStations": {"Makati": [{"name": "Makati Station 1"}]}
        }))
        .unwrap();
        SnapshotOptionProvider::new(snapshot)
    }

    #[tokio::test]
    async fn city_admin_barangays_are_fetched_by_city_code() {
        let provider = makati_snapshot();
        let known = provider.cities().await.unwrap();

        let (mut cascade, initial) =
            CityCascade::for_scope(&city_admin("Makati"), &known).unwrap();
        let request = initial.unwrap();
        assert_eq!(request.cities, vec![SelectOption::new("137602", "Makati")]);

        assert!(cascade.apply(request.resolve(&provider, DEFAULT_FETCH_TIMEOUT).await));
        assert_eq!(cascade.options().barangays.len(), 2);
        assert_eq!(cascade.options().police_stations.len(), 1);
        assert!(cascade.options().failures.is_empty());

        let resolved = resolve_options(&provider, &[], &city_admin("makati"), DEFAULT_FETCH_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(resolved.barangays.len(), 2);
        assert_eq!(resolved.police_stations[0].label, "Makati Station 1");
        assert!(resolved.failures.is_empty());
    }

    #[tokio::test]
    async fn forced_city_is_fetched_without_a_selection() {
        let provider = FakeProvider::default();
        let resolved = resolve_options(&provider, &[], &city_admin("CityB"), DEFAULT_FETCH_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(resolved.barangays.len(), 2);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unknown_forced_city_keeps_its_name() {
        let (_, initial) = CityCascade::for_scope(&city_admin("Pateros"), &[]).unwrap();
        assert_eq!(
            initial.unwrap().cities,
            vec![SelectOption::new("Pateros", "Pateros")]
        );
    }

    #[test]
    fn matches_cities_by_name_or_code() {
        let all = vec![
            SelectOption::new("137602", "Makati"),
            SelectOption::new("137607", "Taguig"),
        ];
        let matched = match_cities(
            &all,
            &["taguig".to_string(), "137602".to_string(), "Atlantis".to_string()],
        );
        assert_eq!(matched[0].value, "137607");
        assert_eq!(matched[1].label, "Makati");
        assert_eq!(matched[2], SelectOption::new("Atlantis", "Atlantis"));
    }
}
