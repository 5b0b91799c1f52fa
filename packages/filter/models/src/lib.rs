#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter selection, role scope, and option list types.
//!
//! A filter exists in two forms. [`FilterSelection`] is the editing form:
//! every multi-select dimension is a list. [`WireFilters`] is the submission
//! form: each dimension is a single string, multi-value dimensions joined
//! with commas, and empty dimensions omitted entirely.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A filterable dimension.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum FilterDimension {
    /// Case status (multi-select).
    Status,
    /// Report type (multi-select).
    Type,
    /// City (multi-select).
    City,
    /// Barangay (multi-select, scoped to the selected cities).
    Barangay,
    /// Police station (multi-select, scoped to the selected cities).
    PoliceStation,
    /// Gender (multi-select).
    Gender,
    /// Age band (multi-select).
    AgeCategory,
    /// Inclusive lower bound on the filing date.
    StartDate,
    /// Inclusive upper bound on the filing date.
    EndDate,
    /// Free-text search.
    Query,
    /// Sort key.
    SortBy,
    /// Sort direction (`asc` or `desc`).
    SortOrder,
    /// Officer the case is assigned to. Never shown to users.
    AssignedOfficerId,
}

impl FilterDimension {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Status,
            Self::Type,
            Self::City,
            Self::Barangay,
            Self::PoliceStation,
            Self::Gender,
            Self::AgeCategory,
            Self::StartDate,
            Self::EndDate,
            Self::Query,
            Self::SortBy,
            Self::SortOrder,
            Self::AssignedOfficerId,
        ]
    }

    /// Whether this dimension holds a list of values in the editing form.
    #[must_use]
    pub const fn is_multi(self) -> bool {
        matches!(
            self,
            Self::Status
                | Self::Type
                | Self::City
                | Self::Barangay
                | Self::PoliceStation
                | Self::Gender
                | Self::AgeCategory
        )
    }

    /// Label shown in summaries when the dimension is unfiltered.
    #[must_use]
    pub const fn all_label(self) -> &'static str {
        match self {
            Self::Status => "All Statuses",
            Self::Type => "All Types",
            Self::City => "All Cities",
            Self::Barangay => "All Barangays",
            Self::PoliceStation => "All Police Stations",
            Self::Gender => "All Genders",
            Self::AgeCategory => "All Ages",
            Self::StartDate => "Any Start Date",
            Self::EndDate => "Any End Date",
            Self::Query => "None",
            Self::SortBy => "Default",
            Self::SortOrder => "Default",
            Self::AssignedOfficerId => "All Officers",
        }
    }

    /// Human-readable dimension name.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Status => "Status",
            Self::Type => "Type",
            Self::City => "City",
            Self::Barangay => "Barangay",
            Self::PoliceStation => "Police Station",
            Self::Gender => "Gender",
            Self::AgeCategory => "Age Category",
            Self::StartDate => "Start Date",
            Self::EndDate => "End Date",
            Self::Query => "Search",
            Self::SortBy => "Sort By",
            Self::SortOrder => "Sort Order",
            Self::AssignedOfficerId => "Assigned Officer",
        }
    }
}

/// Read-only view of one dimension of a [`FilterSelection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionValue<'a> {
    /// A multi-select dimension.
    Multi(&'a [String]),
    /// A single-value dimension.
    Single(Option<&'a str>),
}

impl DimensionValue<'_> {
    /// Whether the dimension carries no usable value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Multi(values) => values.iter().all(|v| v.trim().is_empty()),
            Self::Single(value) => value.is_none_or(|v| v.trim().is_empty()),
        }
    }
}

/// The editing ("array") form of a filter selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSelection {
    /// Selected statuses.
    pub status: Vec<String>,
    /// Selected report types.
    #[serde(rename = "type")]
    pub report_type: Vec<String>,
    /// Selected cities.
    pub city: Vec<String>,
    /// Selected barangays.
    pub barangay: Vec<String>,
    /// Selected police stations.
    pub police_station: Vec<String>,
    /// Selected genders.
    pub gender: Vec<String>,
    /// Selected age bands.
    pub age_category: Vec<String>,
    /// Inclusive start date (`YYYY-MM-DD`).
    pub start_date: Option<String>,
    /// Inclusive end date (`YYYY-MM-DD`).
    pub end_date: Option<String>,
    /// Free-text search.
    pub query: Option<String>,
    /// Sort key.
    pub sort_by: Option<String>,
    /// Sort direction.
    pub sort_order: Option<String>,
    /// Officer assignment, only ever set by scope enforcement.
    pub assigned_officer_id: Option<String>,
}

impl FilterSelection {
    /// Reads one dimension.
    #[must_use]
    pub fn value(&self, dimension: FilterDimension) -> DimensionValue<'_> {
        match dimension {
            FilterDimension::Status => DimensionValue::Multi(&self.status),
            FilterDimension::Type => DimensionValue::Multi(&self.report_type),
            FilterDimension::City => DimensionValue::Multi(&self.city),
            FilterDimension::Barangay => DimensionValue::Multi(&self.barangay),
            FilterDimension::PoliceStation => DimensionValue::Multi(&self.police_station),
            FilterDimension::Gender => DimensionValue::Multi(&self.gender),
            FilterDimension::AgeCategory => DimensionValue::Multi(&self.age_category),
            FilterDimension::StartDate => DimensionValue::Single(self.start_date.as_deref()),
            FilterDimension::EndDate => DimensionValue::Single(self.end_date.as_deref()),
            FilterDimension::Query => DimensionValue::Single(self.query.as_deref()),
            FilterDimension::SortBy => DimensionValue::Single(self.sort_by.as_deref()),
            FilterDimension::SortOrder => DimensionValue::Single(self.sort_order.as_deref()),
            FilterDimension::AssignedOfficerId => {
                DimensionValue::Single(self.assigned_officer_id.as_deref())
            }
        }
    }

    /// Replaces a multi-select dimension's values. Does nothing for
    /// single-value dimensions.
    pub fn set_multi(&mut self, dimension: FilterDimension, values: Vec<String>) {
        if let Some(slot) = self.multi_mut(dimension) {
            *slot = values;
        }
    }

    /// Replaces a single-value dimension's value. Does nothing for
    /// multi-select dimensions.
    pub fn set_single(&mut self, dimension: FilterDimension, value: Option<String>) {
        if let Some(slot) = self.single_mut(dimension) {
            *slot = value;
        }
    }

    /// Pins a dimension to exactly one value, whatever its arity.
    pub fn force(&mut self, dimension: FilterDimension, value: &str) {
        if dimension.is_multi() {
            self.set_multi(dimension, vec![value.to_string()]);
        } else {
            self.set_single(dimension, Some(value.to_string()));
        }
    }

    /// Empties a dimension.
    pub fn clear(&mut self, dimension: FilterDimension) {
        if dimension.is_multi() {
            self.set_multi(dimension, Vec::new());
        } else {
            self.set_single(dimension, None);
        }
    }

    fn multi_mut(&mut self, dimension: FilterDimension) -> Option<&mut Vec<String>> {
        match dimension {
            FilterDimension::Status => Some(&mut self.status),
            FilterDimension::Type => Some(&mut self.report_type),
            FilterDimension::City => Some(&mut self.city),
            FilterDimension::Barangay => Some(&mut self.barangay),
            FilterDimension::PoliceStation => Some(&mut self.police_station),
            FilterDimension::Gender => Some(&mut self.gender),
            FilterDimension::AgeCategory => Some(&mut self.age_category),
            _ => None,
        }
    }

    fn single_mut(&mut self, dimension: FilterDimension) -> Option<&mut Option<String>> {
        match dimension {
            FilterDimension::StartDate => Some(&mut self.start_date),
            FilterDimension::EndDate => Some(&mut self.end_date),
            FilterDimension::Query => Some(&mut self.query),
            FilterDimension::SortBy => Some(&mut self.sort_by),
            FilterDimension::SortOrder => Some(&mut self.sort_order),
            FilterDimension::AssignedOfficerId => Some(&mut self.assigned_officer_id),
            _ => None,
        }
    }
}

/// The submission ("flat") form of a filter selection.
///
/// Only non-empty dimensions are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WireFilters(BTreeMap<FilterDimension, String>);

impl WireFilters {
    /// Creates an empty filter set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns the flat value of a dimension.
    #[must_use]
    pub fn get(&self, dimension: FilterDimension) -> Option<&str> {
        self.0.get(&dimension).map(String::as_str)
    }

    /// Sets a dimension's flat value.
    pub fn insert(&mut self, dimension: FilterDimension, value: String) {
        self.0.insert(dimension, value);
    }

    /// Whether a dimension is present.
    #[must_use]
    pub fn contains(&self, dimension: FilterDimension) -> bool {
        self.0.contains_key(&dimension)
    }

    /// Number of present dimensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no dimension is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates present dimensions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (FilterDimension, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Query-string pairs for the backend, keyed by camelCase dimension
    /// name.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|(dimension, value)| (dimension.to_string(), value.to_string()))
            .collect()
    }
}

/// The acting user's role.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Role {
    /// Unrestricted administrator.
    #[strum(to_string = "super_admin", serialize = "superadmin")]
    SuperAdmin,
    /// Administrator restricted to one assigned city.
    #[strum(to_string = "city_admin", serialize = "cityadmin")]
    CityAdmin,
    /// Officer restricted to cases assigned to them.
    #[strum(to_string = "police", serialize = "officer")]
    Police,
    /// Any other or unauthenticated role.
    Other,
}

impl Role {
    /// Parses a role name, mapping anything unrecognized to [`Role::Other`].
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        raw.trim().parse().unwrap_or(Self::Other)
    }
}

/// Attributes of the acting user that bound what they may filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleScope {
    /// The user's role.
    pub role: Role,
    /// Assigned city, for city administrators.
    pub assigned_city: Option<String>,
    /// The user's own identifier, for officers.
    pub user_id: Option<String>,
}

/// Filter values and editability imposed by the acting user's role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterScope {
    /// Values that override anything the user selects.
    pub forced: BTreeMap<FilterDimension, String>,
    /// Dimensions shown to the user but not editable.
    pub disabled: BTreeSet<FilterDimension>,
    /// Dimensions never shown to the user.
    pub hidden: BTreeSet<FilterDimension>,
}

impl FilterScope {
    /// Whether the user may change this dimension.
    #[must_use]
    pub fn is_editable(&self, dimension: FilterDimension) -> bool {
        !self.disabled.contains(&dimension) && !self.hidden.contains(&dimension)
    }

    /// Whether this dimension is hidden from the user.
    #[must_use]
    pub fn is_hidden(&self, dimension: FilterDimension) -> bool {
        self.hidden.contains(&dimension)
    }

    /// Forced value for a dimension, if any.
    #[must_use]
    pub fn forced_value(&self, dimension: FilterDimension) -> Option<&str> {
        self.forced.get(&dimension).map(String::as_str)
    }
}

/// Why a role was refused filtering access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DenyReason {
    /// The role is not permitted to filter or export.
    UnauthorizedRole,
    /// A city administrator has no assigned city.
    MissingAssignedCity,
    /// An officer has no identifier.
    MissingUserId,
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnauthorizedRole => write!(f, "role is not permitted to filter reports"),
            Self::MissingAssignedCity => write!(f, "city administrator has no assigned city"),
            Self::MissingUserId => write!(f, "officer has no user id"),
        }
    }
}

/// Outcome of scope calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum ScopeDecision {
    /// Filtering is permitted within this scope.
    Allowed(FilterScope),
    /// Filtering and aggregate queries must not proceed.
    Denied {
        /// Why access was refused.
        reason: DenyReason,
    },
}

impl ScopeDecision {
    /// Returns the scope when allowed.
    #[must_use]
    pub const fn scope(&self) -> Option<&FilterScope> {
        match self {
            Self::Allowed(scope) => Some(scope),
            Self::Denied { .. } => None,
        }
    }
}

/// A `(value, label)` pair for a select input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectOption {
    /// Submitted value (e.g. a city code).
    pub value: String,
    /// Display label (e.g. a city name).
    pub label: String,
}

impl SelectOption {
    /// Creates an option.
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// A police station as returned by the station provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoliceStation {
    /// Station name.
    pub name: String,
    /// Provider identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Street address.
    #[serde(default)]
    pub address: Option<String>,
    /// City the station belongs to.
    #[serde(default)]
    pub city: Option<String>,
}

impl PoliceStation {
    /// The select option for this station. Stations are filtered by name.
    #[must_use]
    pub fn to_option(&self) -> SelectOption {
        SelectOption::new(self.name.clone(), self.name.clone())
    }
}
