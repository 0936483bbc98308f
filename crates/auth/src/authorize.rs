use thiserror::Error;

use bayu_core::ErrorKind;

use crate::{Role, RolePolicy};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// No roles were attached to the request (authentication did not run or
    /// the token carried none).
    #[error("no roles in request context")]
    MissingContext,

    #[error("forbidden: requires one of {required:?}")]
    Forbidden { required: Vec<Role> },
}

impl AuthzError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Forbidden
    }
}

/// Pure role gate: succeeds when `granted` shares at least one role with the policy.
pub fn require_any_role(granted: Option<&[Role]>, policy: &RolePolicy) -> Result<(), AuthzError> {
    let granted = match granted {
        Some(roles) if !roles.is_empty() => roles,
        _ => return Err(AuthzError::MissingContext),
    };

    if policy.is_satisfied_by(granted) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            required: policy.required().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_passes_admin_policy() {
        let policy = RolePolicy::admin_only();
        assert!(require_any_role(Some(&[Role::ADMIN]), &policy).is_ok());
    }

    #[test]
    fn any_overlap_is_enough() {
        let policy = RolePolicy::any_of([Role::ADMIN, Role::PREMIUM_USER]);
        assert!(require_any_role(Some(&[Role::USER, Role::PREMIUM_USER]), &policy).is_ok());
    }

    #[test]
    fn disjoint_roles_are_forbidden() {
        let policy = RolePolicy::admin_only();
        let err = require_any_role(Some(&[Role::USER]), &policy).unwrap_err();
        assert_eq!(
            err,
            AuthzError::Forbidden {
                required: vec![Role::ADMIN]
            }
        );
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn missing_or_empty_roles_are_rejected() {
        let policy = RolePolicy::admin_only();
        assert_eq!(require_any_role(None, &policy), Err(AuthzError::MissingContext));
        assert_eq!(require_any_role(Some(&[]), &policy), Err(AuthzError::MissingContext));
    }

    #[test]
    fn role_names_are_case_sensitive() {
        let policy = RolePolicy::admin_only();
        let granted = [Role::new("Admin")];
        assert!(require_any_role(Some(&granted), &policy).is_err());
    }
}
