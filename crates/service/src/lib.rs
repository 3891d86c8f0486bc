//! Service layer for the bicycle-parking registry.
//! - `storage` holds the record stores (in-memory and JSON file).
//! - `records` is the facade the HTTP layer calls: validation, logging, metrics.

pub mod errors;
pub mod metrics;
pub mod pagination;
pub mod records;
pub mod storage;

pub use errors::ServiceError;
pub use pagination::{Page, Pagination};
pub use records::RecordService;
pub use storage::{open_store, RecordStore};
