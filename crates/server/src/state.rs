use service::RecordService;

/// Shared handler state; cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub records: RecordService,
}
