// server/src/rest/mod.rs
pub mod handlers;
pub mod rest_api;
pub mod session;

pub use rest_api::{routes, ApiContext};
