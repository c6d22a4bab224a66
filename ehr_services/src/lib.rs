// ehr_services/src/lib.rs

pub mod appointments;
pub mod authorization;
pub mod config;
pub mod encounters;
pub mod intake;
pub mod records;
pub mod storage;

pub use appointments::AppointmentService;
pub use encounters::EncounterService;
pub use intake::IntakeService;
pub use records::RecordService;
pub use storage::{EhrStore, InMemoryStore};
