//! Capability boundary for the payroll core.
//!
//! Authentication proper (sessions, tokens, user records) lives in an
//! upstream collaborator. The core only needs to know *who* is acting and
//! whether that actor holds a capability. Handlers receive the actor from
//! gateway-supplied headers; services check capabilities through
//! [`require_capability`].

use async_trait::async_trait;
use axum::http::request::Parts;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::errors::ServiceError;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Actions the payroll core gates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
    GeneratePayslips,
    ApprovePayslips,
    EditPayslips,
    DeletePayslips,
    ViewAllPayslips,
}

/// Single enumerated role with a fixed permission set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Finance,
    HrAdmin,
    Staff,
}

impl Role {
    /// Capability set per role. Finance runs the payroll workflow; admin
    /// holds the destructive operations; HR is view-only. Staff holds no
    /// capability at all: self-service views would need an
    /// actor-to-employee link this service does not model.
    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            Role::Finance => &[
                Capability::GeneratePayslips,
                Capability::ApprovePayslips,
                Capability::EditPayslips,
                Capability::ViewAllPayslips,
            ],
            Role::Admin => &[Capability::DeletePayslips, Capability::ViewAllPayslips],
            Role::HrAdmin => &[Capability::ViewAllPayslips],
            Role::Staff => &[],
        }
    }

    pub fn has_capability(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

/// The acting identity attached to every mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }
}

/// Checks the capability boundary, mapping a denial to `Forbidden`.
///
/// The error message deliberately does not reveal whether the target
/// payslip exists.
pub fn require_capability(actor: &Actor, capability: Capability) -> Result<(), ServiceError> {
    if actor.role.has_capability(capability) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!(
            "role '{}' lacks capability '{}'",
            actor.role, capability
        )))
    }
}

/// Extracts the [`Actor`] from gateway headers.
///
/// The deployment fronts this service with an authenticating gateway that
/// resolves the session and forwards the actor identity. A missing or
/// malformed header pair is a 401 here, not a 403: the request never
/// reached the capability check.
#[async_trait]
impl<S> axum::extract::FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(ACTOR_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok())
            .ok_or((StatusCode::UNAUTHORIZED, "missing or invalid actor id"))?;

        let role = parts
            .headers
            .get(ACTOR_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Role::from_str(v).ok())
            .ok_or((StatusCode::UNAUTHORIZED, "missing or invalid actor role"))?;

        Ok(Actor::new(id, role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finance_runs_the_workflow_but_cannot_delete() {
        let finance = Actor::new(Uuid::new_v4(), Role::Finance);
        assert!(require_capability(&finance, Capability::GeneratePayslips).is_ok());
        assert!(require_capability(&finance, Capability::ApprovePayslips).is_ok());
        assert!(require_capability(&finance, Capability::EditPayslips).is_ok());
        assert!(require_capability(&finance, Capability::DeletePayslips).is_err());
    }

    #[test]
    fn admin_deletes_but_does_not_approve() {
        let admin = Actor::new(Uuid::new_v4(), Role::Admin);
        assert!(require_capability(&admin, Capability::DeletePayslips).is_ok());
        assert!(require_capability(&admin, Capability::ApprovePayslips).is_err());
        assert!(require_capability(&admin, Capability::GeneratePayslips).is_err());
    }

    #[test]
    fn staff_holds_nothing() {
        let staff = Actor::new(Uuid::new_v4(), Role::Staff);
        for cap in [
            Capability::GeneratePayslips,
            Capability::ApprovePayslips,
            Capability::EditPayslips,
            Capability::DeletePayslips,
            Capability::ViewAllPayslips,
        ] {
            assert!(require_capability(&staff, cap).is_err());
        }
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!(Role::from_str("finance").unwrap(), Role::Finance);
        assert_eq!(Role::from_str("HR_ADMIN").unwrap(), Role::HrAdmin);
        assert!(Role::from_str("superuser").is_err());
    }

    #[test]
    fn denial_message_names_role_and_capability_only() {
        let staff = Actor::new(Uuid::new_v4(), Role::Staff);
        let err = require_capability(&staff, Capability::ApprovePayslips).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("staff"));
        assert!(msg.contains("approve_payslips"));
    }
}
