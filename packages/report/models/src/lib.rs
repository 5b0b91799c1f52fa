#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Case report records and the canonical report view.
//!
//! Case records arrive from the backend with no guaranteed schema: the same
//! fact (a city, a person's name) may live under several historical key
//! spellings, inside a nested person or location sub-record, or not at all.
//! [`Report`] wraps such a record untouched. [`CanonicalReport`] is the
//! fixed-field view derived from it, recomputed on demand and never stored.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{AsRefStr, Display, EnumString};

/// Marker rendered in place of a field that no candidate could supply.
pub const NOT_AVAILABLE: &str = "N/A";

/// A single case record of unknown shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report(Value);

impl Report {
    /// Wraps a raw JSON record.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the underlying JSON record.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Looks up a top-level key. Returns `None` if the record is not an
    /// object or the key is missing.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Walks a nested key path (e.g. `["person", "firstName"]`).
    ///
    /// Any missing or non-object intermediate yields `None`.
    #[must_use]
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        path.iter().try_fold(&self.0, |node, key| node.get(*key))
    }
}

impl From<Value> for Report {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// The semantic fields of the canonical report view.
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
pub enum ReportField {
    /// Record identifier.
    Id,
    /// Human-facing case number.
    CaseId,
    /// Report type (e.g. "Missing", "Abducted").
    Type,
    /// Case status label.
    Status,
    /// City of the case.
    City,
    /// Barangay of the case.
    Barangay,
    /// When the report was filed.
    CreatedAt,
    /// When the report was last modified.
    UpdatedAt,
    /// Given name of the person involved.
    FirstName,
    /// Family name of the person involved.
    LastName,
    /// Age of the person involved.
    Age,
    /// Gender of the person involved.
    Gender,
    /// Where the person was last seen.
    LastKnownLocation,
}

impl ReportField {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Id,
            Self::CaseId,
            Self::Type,
            Self::Status,
            Self::City,
            Self::Barangay,
            Self::CreatedAt,
            Self::UpdatedAt,
            Self::FirstName,
            Self::LastName,
            Self::Age,
            Self::Gender,
            Self::LastKnownLocation,
        ]
    }
}

/// Age bands used by the `ageCategory` filter and the age distribution.
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
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum AgeCategory {
    /// 0 to 12 years.
    Child,
    /// 13 to 17 years.
    Teen,
    /// 18 to 59 years.
    Adult,
    /// 60 years and over.
    Senior,
}

impl AgeCategory {
    /// Classifies an age in whole years.
    #[must_use]
    pub const fn from_age(age: u32) -> Self {
        match age {
            0..=12 => Self::Child,
            13..=17 => Self::Teen,
            18..=59 => Self::Adult,
            _ => Self::Senior,
        }
    }

    /// Classifies a free-form age value such as `"34"` or `"7.5"`.
    ///
    /// Returns `None` for anything that is not a non-negative number.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let years = raw.trim().parse::<f64>().ok()?;
        if !years.is_finite() || years < 0.0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(Self::from_age(years.floor() as u32))
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Child => "Child (0-12)",
            Self::Teen => "Teen (13-17)",
            Self::Adult => "Adult (18-59)",
            Self::Senior => "Senior (60+)",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Child, Self::Teen, Self::Adult, Self::Senior]
    }
}

/// The fixed-field view of a [`Report`].
///
/// Every field is `None` when none of its candidates held a usable value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalReport {
    /// Record identifier.
    pub id: Option<String>,
    /// Human-facing case number.
    pub case_id: Option<String>,
    /// Report type.
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    /// Case status label.
    pub status: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Barangay.
    pub barangay: Option<String>,
    /// Filing timestamp, as supplied.
    pub created_at: Option<String>,
    /// Last-modified timestamp, as supplied.
    pub updated_at: Option<String>,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Age, as supplied.
    pub age: Option<String>,
    /// Gender.
    pub gender: Option<String>,
    /// Last known location.
    pub last_known_location: Option<String>,
    /// Composed display name (`first last`), or [`NOT_AVAILABLE`].
    pub display_name: String,
}

impl CanonicalReport {
    /// Returns the value of a canonical field.
    #[must_use]
    pub fn field(&self, field: ReportField) -> Option<&str> {
        let value = match field {
            ReportField::Id => &self.id,
            ReportField::CaseId => &self.case_id,
            ReportField::Type => &self.report_type,
            ReportField::Status => &self.status,
            ReportField::City => &self.city,
            ReportField::Barangay => &self.barangay,
            ReportField::CreatedAt => &self.created_at,
            ReportField::UpdatedAt => &self.updated_at,
            ReportField::FirstName => &self.first_name,
            ReportField::LastName => &self.last_name,
            ReportField::Age => &self.age,
            ReportField::Gender => &self.gender,
            ReportField::LastKnownLocation => &self.last_known_location,
        };
        value.as_deref()
    }

    /// Returns a canonical field, or [`NOT_AVAILABLE`] when absent.
    #[must_use]
    pub fn field_or_na(&self, field: ReportField) -> &str {
        self.field(field).unwrap_or(NOT_AVAILABLE)
    }

    /// Age band derived from [`Self::age`].
    #[must_use]
    pub fn age_category(&self) -> Option<AgeCategory> {
        self.age.as_deref().and_then(AgeCategory::parse)
    }
}
