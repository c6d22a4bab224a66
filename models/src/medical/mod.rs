// models/src/medical/mod.rs
pub mod appointment;
pub mod medical_record;
pub mod patient;
pub mod referral;
pub mod user;

pub use appointment::{Appointment, AppointmentStatus};
pub use lab_test::LabTest;
pub use medical_record::{MedicalRecord, RecordType};
pub use patient::PatientProfile;
pub use referral::Referral;
pub use user::User;
