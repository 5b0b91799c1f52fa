//! Role-based filter scope.
//!
//! The scope is computed from the acting user's role before any user input
//! is considered. Forced values always overwrite whatever the user picked.

use casewatch_filter_models::{
    DenyReason, FilterDimension, FilterScope, FilterSelection, Role, RoleScope, ScopeDecision,
    WireFilters,
};

use crate::FilterError;
use crate::normalize::to_wire_form;

/// Computes the filter domain permitted to a user.
///
/// - Super administrators get an empty scope.
/// - City administrators have `city` forced to their assigned city and
///   disabled.
/// - Officers have `assignedOfficerId` forced to their own id and hidden.
/// - Everyone else is denied, as is a city administrator without a city or
///   an officer without an id.
#[must_use]
pub fn compute_scope(role: &RoleScope) -> ScopeDecision {
    match role.role {
        Role::SuperAdmin => ScopeDecision::Allowed(FilterScope::default()),
        Role::CityAdmin => {
            let Some(city) = non_blank(role.assigned_city.as_deref()) else {
                return ScopeDecision::Denied {
                    reason: DenyReason::MissingAssignedCity,
                };
            };
            let mut scope = FilterScope::default();
            scope.forced.insert(FilterDimension::City, city.to_string());
            scope.disabled.insert(FilterDimension::City);
            ScopeDecision::Allowed(scope)
        }
        Role::Police => {
            let Some(user_id) = non_blank(role.user_id.as_deref()) else {
                return ScopeDecision::Denied {
                    reason: DenyReason::MissingUserId,
                };
            };
            let mut scope = FilterScope::default();
            scope
                .forced
                .insert(FilterDimension::AssignedOfficerId, user_id.to_string());
            scope.hidden.insert(FilterDimension::AssignedOfficerId);
            ScopeDecision::Allowed(scope)
        }
        Role::Other => ScopeDecision::Denied {
            reason: DenyReason::UnauthorizedRole,
        },
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Overlays the scope's forced values onto a user selection.
#[must_use]
pub fn apply_scope(scope: &FilterScope, selection: &FilterSelection) -> FilterSelection {
    let mut scoped = selection.clone();
    for (dimension, value) in &scope.forced {
        scoped.force(*dimension, value);
    }
    scoped
}

/// Applies the scope and converts the result to wire form for submission.
///
/// # Errors
///
/// Returns [`FilterError::AccessDenied`] if the decision is a denial.
pub fn submit(
    decision: &ScopeDecision,
    selection: &FilterSelection,
) -> Result<WireFilters, FilterError> {
    match decision {
        ScopeDecision::Allowed(scope) => Ok(to_wire_form(&apply_scope(scope, selection))),
        ScopeDecision::Denied { reason } => {
            log::warn!("Refusing filter submission: {reason}");
            Err(FilterError::AccessDenied { reason: *reason })
        }
    }
}

/// Returns the scope from a decision, or the denial as an error.
///
/// # Errors
///
/// Returns [`FilterError::AccessDenied`] if the decision is a denial.
pub const fn require_scope(decision: &ScopeDecision) -> Result<&FilterScope, FilterError> {
    match decision {
        ScopeDecision::Allowed(scope) => Ok(scope),
        ScopeDecision::Denied { reason } => Err(FilterError::AccessDenied { reason: *reason }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(role: Role, city: Option<&str>, user_id: Option<&str>) -> RoleScope {
        RoleScope {
            role,
            assigned_city: city.map(String::from),
            user_id: user_id.map(String::from),
        }
    }

    #[test]
    fn super_admin_is_unrestricted() {
        let decision = compute_scope(&role(Role::SuperAdmin, None, None));
        let scope = decision.scope().unwrap();
        assert!(scope.forced.is_empty());
        assert!(scope.disabled.is_empty());
        assert!(scope.hidden.is_empty());
    }

    #[test]
    fn city_admin_city_is_forced_and_disabled() {
        let decision = compute_scope(&role(Role::CityAdmin, Some("Makati"), None));
        let scope = decision.scope().unwrap();
        assert_eq!(scope.forced_value(FilterDimension::City), Some("Makati"));
        assert!(!scope.is_editable(FilterDimension::City));
        assert!(!scope.is_hidden(FilterDimension::City));
        assert!(scope.is_editable(FilterDimension::Barangay));
    }

    #[test]
    fn forced_city_overrides_user_city() {
        let decision = compute_scope(&role(Role::CityAdmin, Some("Makati"), None));
        let selection = FilterSelection {
            city: vec!["Taguig".to_string()],
            status: vec!["Pending".to_string()],
            ..FilterSelection::default()
        };
        let wire = submit(&decision, &selection).unwrap();
        assert_eq!(wire.get(FilterDimension::City), Some("Makati"));
        assert_eq!(wire.get(FilterDimension::Status), Some("Pending"));
    }

    #[test]
    fn officer_assignment_is_hidden_and_forced() {
        let decision = compute_scope(&role(Role::Police, None, Some("officer-12")));
        let scope = decision.scope().unwrap();
        assert!(scope.is_hidden(FilterDimension::AssignedOfficerId));
        assert!(scope.is_editable(FilterDimension::City));

        let wire = submit(&decision, &FilterSelection::default()).unwrap();
        assert_eq!(
            wire.get(FilterDimension::AssignedOfficerId),
            Some("officer-12")
        );
    }

    #[test]
    fn other_roles_are_denied() {
        let decision = compute_scope(&role(Role::Other, Some("Makati"), Some("x")));
        assert_eq!(
            decision,
            ScopeDecision::Denied {
                reason: DenyReason::UnauthorizedRole
            }
        );
        assert!(matches!(
            submit(&decision, &FilterSelection::default()),
            Err(FilterError::AccessDenied {
                reason: DenyReason::UnauthorizedRole
            })
        ));
    }

    #[test]
    fn incomplete_attributes_are_denied() {
        assert_eq!(
            compute_scope(&role(Role::CityAdmin, Some("  "), None)),
            ScopeDecision::Denied {
                reason: DenyReason::MissingAssignedCity
            }
        );
        assert_eq!(
            compute_scope(&role(Role::Police, None, None)),
            ScopeDecision::Denied {
                reason: DenyReason::MissingUserId
            }
        );
    }
}
