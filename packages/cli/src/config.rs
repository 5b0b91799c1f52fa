//! TOML configuration with environment overrides.
//!
//! ```toml
//! [export]
//! page_size = 10
//! top_cities = 5
//! title = "Missing Persons Case Report"
//!
//! [provider]
//! base_url = "https://cases.example.test/api"
//! timeout_ms = 10000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use casewatch_export_models::ExportOptions;
use casewatch_filter::options::DEFAULT_FETCH_TIMEOUT;
use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "CASEWATCH_CONFIG";
/// Overrides `provider.base_url`.
pub const PROVIDER_URL_ENV: &str = "CASEWATCH_PROVIDER_URL";
/// Overrides `export.page_size`.
pub const PAGE_SIZE_ENV: &str = "CASEWATCH_PAGE_SIZE";
/// Overrides `provider.timeout_ms`.
pub const FETCH_TIMEOUT_ENV: &str = "CASEWATCH_FETCH_TIMEOUT_MS";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for [`CliConfig`].
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value is out of range or malformed.
    #[error("Invalid configuration: {message}")]
    Invalid {
        /// Description of what went wrong.
        message: String,
    },
}

/// The `[export]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// Report rows per page.
    pub page_size: usize,
    /// Cities listed as hotspots.
    pub top_cities: usize,
    /// Document title.
    pub title: String,
}

impl Default for ExportSection {
    fn default() -> Self {
        let options = ExportOptions::default();
        Self {
            page_size: options.page_size,
            top_cities: options.top_cities,
            title: options.title,
        }
    }
}

/// The `[provider]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    /// Address/station service root, e.g. `https://host/api`.
    pub base_url: Option<String>,
    /// JSON snapshot used instead of the HTTP service.
    pub file: Option<PathBuf>,
    /// Bounded wait per city fetch, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            base_url: None,
            file: None,
            timeout_ms: u64::try_from(DEFAULT_FETCH_TIMEOUT.as_millis()).unwrap_or(10_000),
        }
    }
}

impl ProviderSection {
    /// Per-city fetch timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Export settings.
    pub export: ExportSection,
    /// Option provider settings.
    pub provider: ProviderSection,
}

impl CliConfig {
    /// Loads configuration from `path` (or [`CONFIG_ENV`]), applies
    /// environment overrides, and validates the result. With no file,
    /// defaults are used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or a
    /// value is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let mut config = match path {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                Self::from_toml_str(&std::fs::read_to_string(&path)?)?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a TOML string without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the TOML is malformed.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(toml_str)?)
    }

    /// Applies overrides looked up through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a numeric override does not parse.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup(PROVIDER_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.provider.base_url = Some(url);
        }
        if let Some(raw) = lookup(PAGE_SIZE_ENV) {
            self.export.page_size = parse_number(PAGE_SIZE_ENV, &raw)?;
        }
        if let Some(raw) = lookup(FETCH_TIMEOUT_ENV) {
            self.provider.timeout_ms = parse_number(FETCH_TIMEOUT_ENV, &raw)?;
        }
        Ok(())
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero page size, top-city count,
    /// or timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("export.page_size", self.export.page_size == 0),
            ("export.top_cities", self.export.top_cities == 0),
            ("provider.timeout_ms", self.provider.timeout_ms == 0),
        ];
        if let Some((name, _)) = checks.iter().find(|(_, zero)| *zero) {
            return Err(ConfigError::Invalid {
                message: format!("{name} must be greater than 0"),
            });
        }
        Ok(())
    }

    /// Export options derived from the `[export]` section.
    #[must_use]
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            title: self.export.title.clone(),
            page_size: self.export.page_size,
            top_cities: self.export.top_cities,
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        message: format!("{key} must be a positive integer, got {raw:?}"),
    })
}
