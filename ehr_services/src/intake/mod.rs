// ehr_services/src/intake/mod.rs
pub mod intake;

pub use intake::{IntakeReply, IntakeRequest, IntakeService};
