// models/src/lib.rs

// Declare all top-level modules within the 'models' crate
pub mod auth;
pub mod errors;

// Declare the 'medical' sub-module
pub mod medical;

// Re-export common core types for convenience when other crates use 'models::*'
pub use auth::{AuthContext, Role};
pub use errors::{EhrError, EhrResult};
pub use medical::appointment::{Appointment, AppointmentStatus};
pub use medical::lab_test::LabTest;
pub use medical::medical_record::{MedicalRecord, RecordType};
pub use medical::patient::PatientProfile;
pub use medical::referral::Referral;
pub use medical::user::User;
