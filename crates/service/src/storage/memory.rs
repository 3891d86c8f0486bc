use std::sync::Arc;

use async_trait::async_trait;
use models::{NewRecord, Record, RecordId};

use super::{Ledger, RecordStore};
use crate::errors::ServiceError;

/// Process-local store; records live until the process exits.
pub struct MemoryRecordStore {
    ledger: Ledger,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self { ledger: Ledger::new(Vec::new(), RecordId::FIRST) }
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn list(&self) -> Result<Arc<Vec<Record>>, ServiceError> {
        Ok(self.ledger.snapshot())
    }

    async fn get(&self, id: RecordId) -> Result<Option<Record>, ServiceError> {
        Ok(self.ledger.get(id))
    }

    async fn create(&self, new: NewRecord) -> Result<Record, ServiceError> {
        let writer = self.ledger.writer().await;
        let staged = writer.stage(new)?;
        Ok(writer.commit(staged))
    }
}
