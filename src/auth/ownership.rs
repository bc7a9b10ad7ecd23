//! Resource ownership check
//!
//! Pure comparison between the principal resolved for a request and the
//! recorded owner of a resource. No lookups happen here; callers load the
//! resource first and pass its owner in.

use crate::db::PrincipalId;
use crate::types::TurnstileError;

/// Client-visible message when access to a resource is refused
pub const ACCESS_DENIED: &str = "you do not have access to this resource";

/// Why ownership was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DenyReason {
    #[error("no identity was resolved for the request")]
    NoResolvedIdentity,

    #[error("requester does not own the resource")]
    OwnerMismatch,
}

/// Outcome of an ownership check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Turn a denial into a 403 for the HTTP boundary
    pub fn into_result(self) -> Result<(), TurnstileError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => {
                tracing::warn!("Access denied: {}", reason);
                Err(TurnstileError::Forbidden(ACCESS_DENIED.into()))
            }
        }
    }
}

/// Allow only when an identity was resolved and it equals the owner
pub fn check(resolved: Option<PrincipalId>, owner: PrincipalId) -> Decision {
    match resolved {
        None => Decision::Deny(DenyReason::NoResolvedIdentity),
        Some(id) if id == owner => Decision::Allow,
        Some(_) => Decision::Deny(DenyReason::OwnerMismatch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::StatusCode;

    #[test]
    fn test_owner_is_allowed() {
        assert_eq!(check(Some(PrincipalId(5)), PrincipalId(5)), Decision::Allow);
        assert!(check(Some(PrincipalId(5)), PrincipalId(5)).is_allowed());
    }

    #[test]
    fn test_other_principal_is_denied() {
        assert_eq!(
            check(Some(PrincipalId(5)), PrincipalId(7)),
            Decision::Deny(DenyReason::OwnerMismatch)
        );
    }

    #[test]
    fn test_missing_identity_is_denied() {
        assert_eq!(
            check(None, PrincipalId(7)),
            Decision::Deny(DenyReason::NoResolvedIdentity)
        );
    }

    #[test]
    fn test_denial_is_forbidden() {
        assert!(check(Some(PrincipalId(1)), PrincipalId(1)).into_result().is_ok());

        let err = check(Some(PrincipalId(5)), PrincipalId(9))
            .into_result()
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }
}
