//! Shared command-line arguments.

use casewatch_export_models::ExporterProfile;
use casewatch_filter::normalize::to_array_form;
use casewatch_filter::scope::compute_scope;
use casewatch_filter_models::{
    FilterDimension, FilterSelection, Role, RoleScope, ScopeDecision, WireFilters,
};
use clap::Args;

/// Who is acting. Scope is computed from these before any filter is read.
#[derive(Debug, Clone, Args)]
pub struct ScopeArgs {
    /// Role of the acting user (`super_admin`, `city_admin`, `police`)
    #[arg(long)]
    pub role: String,
    /// City assigned to a city administrator
    #[arg(long)]
    pub assigned_city: Option<String>,
    /// Identity of a police officer
    #[arg(long)]
    pub user_id: Option<String>,
}

impl ScopeArgs {
    /// Computes the scope decision for these attributes.
    #[must_use]
    pub fn decision(&self) -> ScopeDecision {
        let role = Role::parse_lenient(&self.role);
        log::debug!("Acting as {role} ({})", self.role);
        compute_scope(&RoleScope {
            role,
            assigned_city: self.assigned_city.clone(),
            user_id: self.user_id.clone(),
        })
    }
}

/// Filter flags. Multi-value flags take comma-separated lists.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Statuses, e.g. "Pending,Resolved"
    #[arg(long)]
    pub status: Option<String>,
    /// Report types
    #[arg(long = "type")]
    pub report_type: Option<String>,
    /// Cities
    #[arg(long)]
    pub city: Option<String>,
    /// Barangays
    #[arg(long)]
    pub barangay: Option<String>,
    /// Police stations
    #[arg(long)]
    pub police_station: Option<String>,
    /// Genders
    #[arg(long)]
    pub gender: Option<String>,
    /// Age categories (`child`, `teen`, `adult`, `senior`)
    #[arg(long)]
    pub age_category: Option<String>,
    /// Earliest filing date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,
    /// Latest filing date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<String>,
    /// Free-text search over case id, name, and location
    #[arg(long)]
    pub query: Option<String>,
    /// Sort column (`createdAt`, `updatedAt`, `caseId`, `name`, `city`, `status`)
    #[arg(long)]
    pub sort_by: Option<String>,
    /// Sort direction (`asc` or `desc`)
    #[arg(long)]
    pub sort_order: Option<String>,
}

impl FilterArgs {
    /// The flags as a flat filter set. Blank flags are omitted.
    #[must_use]
    pub fn to_wire(&self) -> WireFilters {
        let flags = [
            (FilterDimension::Status, &self.status),
            (FilterDimension::Type, &self.report_type),
            (FilterDimension::City, &self.city),
            (FilterDimension::Barangay, &self.barangay),
            (FilterDimension::PoliceStation, &self.police_station),
            (FilterDimension::Gender, &self.gender),
            (FilterDimension::AgeCategory, &self.age_category),
            (FilterDimension::StartDate, &self.start_date),
            (FilterDimension::EndDate, &self.end_date),
            (FilterDimension::Query, &self.query),
            (FilterDimension::SortBy, &self.sort_by),
            (FilterDimension::SortOrder, &self.sort_order),
        ];

        let mut wire = WireFilters::new();
        for (dimension, value) in flags {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                wire.insert(dimension, value.to_string());
            }
        }
        wire
    }

    /// The flags in editing form.
    #[must_use]
    pub fn selection(&self) -> FilterSelection {
        to_array_form(&self.to_wire())
    }
}

/// Exporter identity flags.
#[derive(Debug, Clone, Default, Args)]
pub struct ExporterArgs {
    /// Name printed as the exporter, overriding everything else
    #[arg(long)]
    pub exporter_name: Option<String>,
    /// Exporter's given name
    #[arg(long)]
    pub exporter_first_name: Option<String>,
    /// Exporter's family name
    #[arg(long)]
    pub exporter_last_name: Option<String>,
    /// Exporter's email
    #[arg(long)]
    pub exporter_email: Option<String>,
}

impl ExporterArgs {
    /// The exporter profile described by these flags.
    #[must_use]
    pub fn profile(&self) -> ExporterProfile {
        ExporterProfile {
            override_name: self.exporter_name.clone(),
            first_name: self.exporter_first_name.clone(),
            last_name: self.exporter_last_name.clone(),
            email: self.exporter_email.clone(),
        }
    }
}
