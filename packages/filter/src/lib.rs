#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Role-scoped filtering for case reports.
//!
//! Scope calculation runs first and decides what the acting user may filter
//! at all. The user's [`FilterSelection`](casewatch_filter_models::FilterSelection)
//! is then overlaid with the scope's forced values and converted to the
//! flat wire form the backend expects. Barangay and police-station options
//! cascade from the selected cities through an [`provider::OptionProvider`].

pub mod matching;
pub mod normalize;
pub mod options;
pub mod provider;
pub mod scope;

use casewatch_filter_models::DenyReason;
use thiserror::Error;

pub use provider::ProviderError;

/// Errors that can occur while scoping or resolving filters.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The acting user may not filter reports.
    #[error("Access denied: {reason}")]
    AccessDenied {
        /// Why access was refused.
        reason: DenyReason,
    },

    /// The city selection is fixed by the user's jurisdiction.
    #[error("City selection is locked to {city}")]
    CityLocked {
        /// The jurisdiction's city.
        city: String,
    },

    /// The option provider failed outright.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}
