// ehr_services/src/appointments/mod.rs
pub mod appointments;

pub use appointments::{AppointmentService, AppointmentView, DoctorBrief, NewAppointment};
