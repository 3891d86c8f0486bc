use std::sync::Arc;

use models::{FieldLimits, Record, RecordId, RecordRequest};
use tracing::{error, info, warn};

use crate::errors::ServiceError;
use crate::metrics::{RECORDS_CREATED_TOTAL, STORAGE_ERRORS_TOTAL, VALIDATION_REJECTIONS_TOTAL};
use crate::pagination::{Page, Pagination};
use crate::storage::RecordStore;

/// Business-facing record operations on top of a [`RecordStore`].
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
    limits: FieldLimits,
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>, limits: FieldLimits) -> Self {
        Self { store, limits }
    }

    /// Every record in id order; an empty store yields an empty list.
    pub async fn list_records(&self) -> Result<Arc<Vec<Record>>, ServiceError> {
        self.store.list().await.inspect_err(|e| storage_failed("list", e))
    }

    pub async fn list_page(&self, pagination: Pagination) -> Result<Page<Record>, ServiceError> {
        let records = self.list_records().await?;
        Ok(pagination.apply(&records))
    }

    pub async fn get_record(&self, id: RecordId) -> Result<Record, ServiceError> {
        self.store
            .get(id)
            .await
            .inspect_err(|e| storage_failed("get", e))?
            .ok_or_else(|| ServiceError::NotFound(format!("record {id} not found")))
    }

    /// Validate and store a new record.
    ///
    /// The store call runs on its own task so that a caller dropping this
    /// future cannot interrupt a write between persisting and publishing.
    pub async fn create_record(&self, request: RecordRequest) -> Result<Record, ServiceError> {
        let new = match request.validate(self.limits) {
            Ok(new) => new,
            Err(e) => {
                VALIDATION_REJECTIONS_TOTAL.inc();
                warn!(error = %e, "record rejected");
                return Err(e.into());
            }
        };

        let store = Arc::clone(&self.store);
        let record = tokio::spawn(async move { store.create(new).await })
            .await
            .map_err(|e| ServiceError::Storage(format!("create task failed: {e}")))
            .and_then(|res| res)
            .inspect_err(|e| storage_failed("create", e))?;

        RECORDS_CREATED_TOTAL.inc();
        info!(id = %record.id, student_id = %record.student_id, "record created");
        Ok(record)
    }
}

fn storage_failed(op: &str, e: &ServiceError) {
    if matches!(e, ServiceError::Storage(_)) {
        STORAGE_ERRORS_TOTAL.inc();
        error!(op, error = %e, "record store failure");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryRecordStore;
    use async_trait::async_trait;
    use models::NewRecord;

    fn service() -> RecordService {
        RecordService::new(Arc::new(MemoryRecordStore::new()), FieldLimits::default())
    }

    /// A store whose every operation fails, standing in for a broken disk.
    struct BrokenStore;

    #[async_trait]
    impl RecordStore for BrokenStore {
        async fn list(&self) -> Result<Arc<Vec<Record>>, ServiceError> {
            Err(ServiceError::Storage("disk on fire".into()))
        }
        async fn get(&self, _id: RecordId) -> Result<Option<Record>, ServiceError> {
            Err(ServiceError::Storage("disk on fire".into()))
        }
        async fn create(&self, _new: NewRecord) -> Result<Record, ServiceError> {
            Err(ServiceError::Storage("disk on fire".into()))
        }
    }

    #[tokio::test]
    async fn scenario_from_empty_store() {
        let svc = service();
        assert!(svc.list_records().await.unwrap().is_empty());

        let rec = svc
            .create_record(RecordRequest::new("2021001", "Ana Pérez", "Bicicleta roja BMX"))
            .await
            .unwrap();
        assert_eq!(rec.id, RecordId(1));
        assert_eq!(rec.student_id, "2021001");
        assert_eq!(rec.student_name, "Ana Pérez");
        assert_eq!(rec.bicycle_description, "Bicicleta roja BMX");
        assert_eq!(svc.list_records().await.unwrap().as_slice(), &[rec.clone()]);

        let err = svc
            .create_record(RecordRequest::new("", "Juan", "Mountain bike"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(svc.list_records().await.unwrap().as_slice(), &[rec]);
    }

    #[tokio::test]
    async fn whitespace_only_fields_are_rejected_without_mutation() {
        let svc = service();
        for req in [
            RecordRequest::new("   ", "Juan", "MTB"),
            RecordRequest::new("1", "\t\n", "MTB"),
            RecordRequest::new("1", "Juan", ""),
        ] {
            assert!(matches!(svc.create_record(req).await, Err(ServiceError::Validation(_))));
        }
        assert!(svc.list_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stored_fields_are_trimmed() {
        let svc = service();
        let rec = svc.create_record(RecordRequest::new(" 42 ", "  Lu ", " fixie ")).await.unwrap();
        assert_eq!((rec.student_id.as_str(), rec.student_name.as_str(), rec.bicycle_description.as_str()), ("42", "Lu", "fixie"));
    }

    #[tokio::test]
    async fn repeated_reads_are_identical() {
        let svc = service();
        svc.create_record(RecordRequest::new("1", "A", "B")).await.unwrap();
        let first = svc.list_records().await.unwrap();
        let second = svc.list_records().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn get_record_reports_not_found() {
        let svc = service();
        let rec = svc.create_record(RecordRequest::new("1", "A", "B")).await.unwrap();
        assert_eq!(svc.get_record(rec.id).await.unwrap(), rec);
        assert!(matches!(svc.get_record(RecordId(2)).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn configured_limit_is_enforced() {
        let svc = RecordService::new(Arc::new(MemoryRecordStore::new()), FieldLimits { max_field_chars: Some(3) });
        assert!(matches!(
            svc.create_record(RecordRequest::new("1234", "A", "B")).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(svc.create_record(RecordRequest::new("123", "A", "B")).await.is_ok());
    }

    #[tokio::test]
    async fn list_page_walks_the_collection() {
        let svc = service();
        for i in 0..5 {
            svc.create_record(RecordRequest::new(i.to_string(), "A", "B")).await.unwrap();
        }
        let page = svc.list_page(Pagination { page: 2, per_page: 2 }).await.unwrap();
        let ids: Vec<u64> = page.items.iter().map(|r| r.id.get()).collect();
        assert_eq!(ids, vec![3, 4]);
        assert_eq!(page.total, 5);
    }

    #[tokio::test]
    async fn storage_faults_are_reported() {
        let svc = RecordService::new(Arc::new(BrokenStore), FieldLimits::default());
        assert!(matches!(svc.list_records().await, Err(ServiceError::Storage(_))));
        assert!(matches!(svc.get_record(RecordId(1)).await, Err(ServiceError::Storage(_))));
        assert!(matches!(
            svc.create_record(RecordRequest::new("1", "A", "B")).await,
            Err(ServiceError::Storage(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_through_service() {
        let svc = service();
        let handles: Vec<_> = (0..100)
            .map(|i| {
                let svc = svc.clone();
                tokio::spawn(async move {
                    svc.create_record(RecordRequest::new(format!("s{i}"), "Name", "Bike")).await
                })
            })
            .collect();
        for h in handles {
            h.await.unwrap().unwrap();
        }
        let listed = svc.list_records().await.unwrap();
        assert_eq!(listed.len(), 100);
        let ids: Vec<u64> = listed.iter().map(|r| r.id.get()).collect();
        assert_eq!(ids, (1..=100).collect::<Vec<_>>());
    }
}
