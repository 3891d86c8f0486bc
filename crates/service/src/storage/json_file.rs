use std::{ffi::OsString, io, path::{Path, PathBuf}, sync::Arc};

use async_trait::async_trait;
use models::{NewRecord, Record, RecordId};
use serde::{Deserialize, Serialize};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, warn};

use super::{Ledger, RecordStore};
use crate::errors::ServiceError;

/// On-disk layout. `next_id` is kept so ids are never handed out twice,
/// even for records that may be removed from the file later.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreFile {
    next_id: RecordId,
    records: Vec<Record>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoreFileRef<'a> {
    next_id: RecordId,
    records: &'a [Record],
}

/// JSON file-backed record store.
///
/// Each create rewrites the whole file through a temp file and rename, so the
/// file on disk is always either the previous or the next complete state.
pub struct JsonFileRecordStore {
    ledger: Ledger,
    file_path: PathBuf,
}

impl JsonFileRecordStore {
    /// Load the store from `path`, creating an empty file if it does not exist.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                ServiceError::Storage(format!("cannot create {}: {e}", parent.display()))
            })?;
        }

        let (records, next_id) = match fs::read(&file_path).await {
            Ok(bytes) => decode(&bytes)
                .map_err(|e| ServiceError::Storage(format!("{}: {e}", file_path.display())))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                write_atomic(&file_path, &[], RecordId::FIRST).await?;
                (Vec::new(), RecordId::FIRST)
            }
            Err(e) => {
                return Err(ServiceError::Storage(format!("cannot read {}: {e}", file_path.display())))
            }
        };
        debug!(path = %file_path.display(), records = records.len(), next_id = %next_id, "record file loaded");

        Ok(Arc::new(Self { ledger: Ledger::new(records, next_id), file_path }))
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

fn decode(bytes: &[u8]) -> Result<(Vec<Record>, RecordId), String> {
    let file: StoreFile = serde_json::from_slice(bytes).map_err(|e| format!("corrupt record file: {e}"))?;
    let mut records = file.records;
    records.sort_by_key(|r| r.id);
    if records.windows(2).any(|w| w[0].id == w[1].id) {
        return Err("duplicate record ids".into());
    }
    if file.next_id < RecordId::FIRST {
        return Err("nextId must be >= 1".into());
    }
    if let Some(last) = records.last() {
        if file.next_id <= last.id {
            return Err(format!("nextId {} is not above highest id {}", file.next_id, last.id));
        }
    }
    Ok((records, file.next_id))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp: OsString = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

async fn replace_file(tmp: &Path, path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(tmp).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(tmp, path).await
}

async fn write_atomic(path: &Path, records: &[Record], next_id: RecordId) -> Result<(), ServiceError> {
    let data = serde_json::to_vec_pretty(&StoreFileRef { next_id, records }).map_err(ServiceError::storage)?;
    let tmp = tmp_path(path);

    if let Err(e) = replace_file(&tmp, path, &data).await {
        if let Err(cleanup) = fs::remove_file(&tmp).await {
            if cleanup.kind() != io::ErrorKind::NotFound {
                warn!(path = %tmp.display(), error = %cleanup, "failed to remove temp record file");
            }
        }
        return Err(ServiceError::Storage(format!("cannot write {}: {e}", path.display())));
    }
    Ok(())
}

#[async_trait]
impl RecordStore for JsonFileRecordStore {
    async fn list(&self) -> Result<Arc<Vec<Record>>, ServiceError> {
        Ok(self.ledger.snapshot())
    }

    async fn get(&self, id: RecordId) -> Result<Option<Record>, ServiceError> {
        Ok(self.ledger.get(id))
    }

    async fn create(&self, new: NewRecord) -> Result<Record, ServiceError> {
        let writer = self.ledger.writer().await;
        let staged = writer.stage(new)?;
        write_atomic(&self.file_path, &staged.records, staged.next_id).await?;
        Ok(writer.commit(staged))
    }
}
