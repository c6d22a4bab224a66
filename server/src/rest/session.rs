// server/src/rest/session.rs
//! Session resolution. The identity provider in front of this service
//! authenticates callers and forwards their identity as trusted headers;
//! anything missing or malformed resolves to "no session" and is rejected
//! by the authorization guard downstream.
use std::str::FromStr;

use log::debug;
use uuid::Uuid;

use models::{AuthContext, Role};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

pub fn resolve(user_id: Option<&str>, role: Option<&str>) -> Option<AuthContext> {
    let raw_id = user_id?;
    let raw_role = role?;
    let user_id = match Uuid::parse_str(raw_id) {
        Ok(id) => id,
        Err(_) => {
            debug!("discarding session with malformed user id");
            return None;
        }
    };
    let role = match Role::from_str(raw_role) {
        Ok(role) => role,
        Err(_) => {
            debug!("discarding session with unknown role {}", raw_role);
            return None;
        }
    };
    Some(AuthContext::new(user_id, role))
}
