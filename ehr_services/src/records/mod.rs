// ehr_services/src/records/mod.rs
pub mod records;

pub use records::{NewRecord, RecordService, RecordView};
