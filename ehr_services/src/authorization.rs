// ehr_services/src/authorization.rs
//! Per-request authorization checks and role-based result scoping.
//!
//! A missing session and an insufficient role are rejected identically:
//! callers only ever observe `Unauthorized`, never a finer Forbidden
//! distinction.
use uuid::Uuid;

use models::{AuthContext, EhrError, EhrResult, Role};

/// Passes when a session is present at all.
pub fn require_session(ctx: Option<&AuthContext>) -> EhrResult<&AuthContext> {
    ctx.ok_or(EhrError::Unauthorized)
}

/// Passes when a session is present and carries exactly `role`.
pub fn require_role(ctx: Option<&AuthContext>, role: Role) -> EhrResult<&AuthContext> {
    let ctx = require_session(ctx)?;
    if ctx.role == role {
        Ok(ctx)
    } else {
        Err(EhrError::Unauthorized)
    }
}

/// Result-set narrowing for list operations: patients see only rows where
/// they are the subject, doctors and admins see everything.
pub fn subject_scope(ctx: &AuthContext) -> Option<Uuid> {
    match ctx.role {
        Role::Patient => Some(ctx.user_id),
        Role::Doctor | Role::Admin => None,
    }
}
