//! Bicycle-parking record types shared by the service, server and client crates.

pub mod errors;
pub mod record;

pub use errors::ModelError;
pub use record::{FieldLimits, NewRecord, Record, RecordId, RecordRequest};
