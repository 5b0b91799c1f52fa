//! Address and police-station option providers.
//!
//! The address service exposes cities, barangays per city code, and police
//! stations per city name. [`HttpOptionProvider`] talks to that service
//! over HTTP; [`SnapshotOptionProvider`] serves the same lists from a JSON
//! snapshot on disk.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use casewatch_filter_models::{PoliceStation, SelectOption};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Errors returned by an [`OptionProvider`].
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The provider did not answer in time.
    #[error("Timed out after {after:?}")]
    Timeout {
        /// How long we waited.
        after: Duration,
    },

    /// The provider has no list for the requested key.
    #[error("Not found: {message}")]
    NotFound {
        /// What was missing.
        message: String,
    },

    /// The provider address could not be built.
    #[error("Invalid URL: {message}")]
    InvalidUrl {
        /// Description of what went wrong.
        message: String,
    },
}

/// Source of city, barangay, and police-station option lists.
#[async_trait]
pub trait OptionProvider: Send + Sync {
    /// Lists all cities as `(code, name)` options.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the list cannot be fetched.
    async fn cities(&self) -> Result<Vec<SelectOption>, ProviderError>;

    /// Lists the barangays of one city, addressed by city code.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the list cannot be fetched.
    async fn barangays(&self, city_code: &str) -> Result<Vec<SelectOption>, ProviderError>;

    /// Lists the police stations of one city, addressed by city name.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the list cannot be fetched.
    async fn police_stations(&self, city_name: &str)
    -> Result<Vec<PoliceStation>, ProviderError>;
}

/// Option provider backed by the address service's REST API.
pub struct HttpOptionProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOptionProvider {
    /// Creates a provider rooted at `base_url` (e.g. `https://host/api`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Creates a provider with a preconfigured client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Builds `{base}/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, ProviderError> {
        let mut url =
            reqwest::Url::parse(&self.base_url).map_err(|e| ProviderError::InvalidUrl {
                message: format!("{}: {e}", self.base_url),
            })?;
        url.path_segments_mut()
            .map_err(|()| ProviderError::InvalidUrl {
                message: format!("{} cannot be a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ProviderError> {
        let url = self.endpoint(segments)?;
        log::debug!("GET {url}");
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<T>()
            .await?;
        Ok(body)
    }
}

#[async_trait]
impl OptionProvider for HttpOptionProvider {
    async fn cities(&self) -> Result<Vec<SelectOption>, ProviderError> {
        self.get_json(&["address", "cities"]).await
    }

    async fn barangays(&self, city_code: &str) -> Result<Vec<SelectOption>, ProviderError> {
        self.get_json(&["address", "barangays", city_code]).await
    }

    async fn police_stations(
        &self,
        city_name: &str,
    ) -> Result<Vec<PoliceStation>, ProviderError> {
        self.get_json(&["police-stations", "city", city_name]).await
    }
}

/// On-disk snapshot of the address service's lists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionSnapshot {
    /// All cities.
    pub cities: Vec<SelectOption>,
    /// Barangays keyed by city code.
    pub barangays: BTreeMap<String, Vec<SelectOption>>,
    /// Police stations keyed by city name.
    pub police_stations: BTreeMap<String, Vec<PoliceStation>>,
}

/// Option provider serving an [`OptionSnapshot`].
pub struct SnapshotOptionProvider {
    snapshot: OptionSnapshot,
}

impl SnapshotOptionProvider {
    /// Wraps an in-memory snapshot.
    #[must_use]
    pub const fn new(snapshot: OptionSnapshot) -> Self {
        Self { snapshot }
    }

    /// Loads a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, ProviderError> {
        let contents = std::fs::read_to_string(path)?;
        let snapshot = serde_json::from_str(&contents)?;
        Ok(Self::new(snapshot))
    }
}

#[async_trait]
impl OptionProvider for SnapshotOptionProvider {
    async fn cities(&self) -> Result<Vec<SelectOption>, ProviderError> {
        Ok(self.snapshot.cities.clone())
    }

    async fn barangays(&self, city_code: &str) -> Result<Vec<SelectOption>, ProviderError> {
        self.snapshot
            .barangays
            .get(city_code)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                message: format!("no barangays for city code {city_code}"),
            })
    }

    async fn police_stations(
        &self,
        city_name: &str,
    ) -> Result<Vec<PoliceStation>, ProviderError> {
        self.snapshot
            .police_stations
            .get(city_name)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                message: format!("no police stations for {city_name}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_encoded_endpoints() {
        let provider = HttpOptionProvider::new("https://example.test/api/");
        let url = provider
            .endpoint(&["police-stations", "city", "Quezon City"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.test/api/police-stations/city/Quezon%20City"
        );
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let provider = HttpOptionProvider::new("not a url");
        assert!(matches!(
            provider.endpoint(&["address", "cities"]),
            Err(ProviderError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn snapshot_serves_lists() {
        let snapshot: OptionSnapshot = serde_json::from_value(serde_json::json!({
            "cities": [{"value": "137602", "label": "Makati"}],
            "barangays": {"137602": [{"value": "b1", "label": "Poblacion"}]},
            "policeStations": {"Makati": [{"name": "Makati Station 1", "address": "J.P. Rizal"}]}
        }))
        .unwrap();
        let provider = SnapshotOptionProvider::new(snapshot);

        assert_eq!(provider.cities().await.unwrap().len(), 1);
        assert_eq!(
            provider.barangays("137602").await.unwrap()[0].label,
            "Poblacion"
        );
        let stations = provider.police_stations("Makati").await.unwrap();
        assert_eq!(stations[0].name, "Makati Station 1");
        assert!(stations[0].id.is_none());
    }

    #[tokio::test]
    async fn snapshot_missing_city_is_an_error() {
        let provider = SnapshotOptionProvider::new(OptionSnapshot::default());
        assert!(matches!(
            provider.barangays("000").await,
            Err(ProviderError::NotFound { .. })
        ));
    }
}
