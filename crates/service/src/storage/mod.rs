//! Record stores.
//!
//! Every backend keeps the live collection as an immutable snapshot behind an
//! `ArcSwap`: readers load it without locking, writers serialize on a single
//! mutex that owns the next id, build the successor snapshot, persist it if the
//! backend is durable, and only then publish it. A create that fails before the
//! publish leaves the previous snapshot and counter untouched.

use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use chrono::Utc;
use configs::{StorageBackend, StorageConfig};
use models::{NewRecord, Record, RecordId};
use tokio::sync::{Mutex, MutexGuard};

use crate::errors::ServiceError;

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileRecordStore;
pub use memory::MemoryRecordStore;

/// Authoritative keeper of parking records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records in ascending id order.
    async fn list(&self) -> Result<Arc<Vec<Record>>, ServiceError>;
    async fn get(&self, id: RecordId) -> Result<Option<Record>, ServiceError>;
    /// Assign an id and timestamp, then make the record visible.
    async fn create(&self, new: NewRecord) -> Result<Record, ServiceError>;
}

/// Build the backend named by the storage configuration.
pub async fn open_store(cfg: &StorageConfig) -> Result<Arc<dyn RecordStore>, ServiceError> {
    match cfg.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryRecordStore::new())),
        StorageBackend::File => {
            let store: Arc<dyn RecordStore> = JsonFileRecordStore::open(&cfg.path).await?;
            Ok(store)
        }
    }
}

/// Snapshot plus writer lock shared by the concrete stores.
pub(crate) struct Ledger {
    snapshot: ArcSwap<Vec<Record>>,
    next_id: Mutex<RecordId>,
}

/// The successor state computed under the writer lock, not yet visible.
pub(crate) struct Staged {
    pub records: Vec<Record>,
    pub record: Record,
    pub next_id: RecordId,
}

pub(crate) struct LedgerWriter<'a> {
    ledger: &'a Ledger,
    next_id: MutexGuard<'a, RecordId>,
}

impl Ledger {
    /// `records` must be sorted by id and every id must be below `next_id`.
    pub fn new(records: Vec<Record>, next_id: RecordId) -> Self {
        Self { snapshot: ArcSwap::from_pointee(records), next_id: Mutex::new(next_id) }
    }

    pub fn snapshot(&self) -> Arc<Vec<Record>> {
        self.snapshot.load_full()
    }

    pub fn get(&self, id: RecordId) -> Option<Record> {
        let records = self.snapshot.load();
        records
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|idx| records[idx].clone())
    }

    pub async fn writer(&self) -> LedgerWriter<'_> {
        LedgerWriter { ledger: self, next_id: self.next_id.lock().await }
    }
}

impl LedgerWriter<'_> {
    pub fn next_id(&self) -> RecordId {
        *self.next_id
    }

    pub fn stage(&self, new: NewRecord) -> Result<Staged, ServiceError> {
        let id = *self.next_id;
        let next_id = id
            .next()
            .ok_or_else(|| ServiceError::Storage("record id space exhausted".into()))?;
        let record = new.into_record(id, Utc::now());

        let current = self.ledger.snapshot.load();
        let mut records = Vec::with_capacity(current.len() + 1);
        records.extend(current.iter().cloned());
        records.push(record.clone());
        Ok(Staged { records, record, next_id })
    }

    /// Publish the staged snapshot and advance the counter.
    pub fn commit(mut self, staged: Staged) -> Record {
        self.ledger.snapshot.store(Arc::new(staged.records));
        *self.next_id = staged.next_id;
        staged.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{FieldLimits, RecordRequest};

    fn new_record(sid: &str) -> NewRecord {
        RecordRequest::new(sid, "Ana", "BMX").validate(FieldLimits::default()).unwrap()
    }

    #[tokio::test]
    async fn staged_write_is_invisible_until_commit() {
        let ledger = Ledger::new(Vec::new(), RecordId::FIRST);
        let writer = ledger.writer().await;
        let staged = writer.stage(new_record("1")).unwrap();
        assert_eq!(staged.record.id, RecordId(1));
        assert!(ledger.snapshot().is_empty());

        let rec = writer.commit(staged);
        assert_eq!(ledger.snapshot().as_slice(), &[rec.clone()]);
        assert_eq!(ledger.get(RecordId(1)), Some(rec));
        assert_eq!(ledger.writer().await.next_id(), RecordId(2));
    }

    #[tokio::test]
    async fn dropped_writer_keeps_prior_state() {
        let ledger = Ledger::new(Vec::new(), RecordId::FIRST);
        {
            let writer = ledger.writer().await;
            let _staged = writer.stage(new_record("1")).unwrap();
        }
        assert!(ledger.snapshot().is_empty());
        assert_eq!(ledger.writer().await.next_id(), RecordId::FIRST);
    }

    #[tokio::test]
    async fn exhausted_id_space_is_a_storage_error() {
        let ledger = Ledger::new(Vec::new(), RecordId(u64::MAX));
        let writer = ledger.writer().await;
        assert!(matches!(writer.stage(new_record("1")), Err(ServiceError::Storage(_))));
    }

    #[tokio::test]
    async fn open_store_builds_memory_backend() {
        let cfg = StorageConfig { backend: StorageBackend::Memory, ..StorageConfig::default() };
        let store = open_store(&cfg).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }
}
