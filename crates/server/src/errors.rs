use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::ServiceError;
use thiserror::Error;
use tracing::error;

/// JSON error body: `{"error": <title>, "message": <detail>}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub message: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &'static str, message: Option<String>) -> Self {
        Self { status, error, message }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({"error": self.error, "message": self.message});
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) => JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(msg)),
            ServiceError::NotFound(msg) => JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(msg)),
            ServiceError::Storage(msg) => {
                // Raw fault stays in the log; clients get a generic message.
                error!(error = %msg, "request failed on storage");
                JsonApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage Error",
                    Some("could not complete request".into()),
                )
            }
        }
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        JsonApiError::new(rejection.status(), "Invalid Body", Some(rejection.body_text()))
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("record store unavailable: {0}")]
    Storage(#[from] ServiceError),
    #[error("cannot bind {addr}: {source}")]
    Bind { addr: String, source: std::io::Error },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_status_codes() {
        let v: JsonApiError = ServiceError::Validation("studentId must not be empty".into()).into();
        assert_eq!(v.status, StatusCode::BAD_REQUEST);
        assert_eq!(v.message.as_deref(), Some("studentId must not be empty"));

        let n: JsonApiError = ServiceError::not_found("record").into();
        assert_eq!(n.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn storage_errors_hide_the_raw_fault() {
        let s: JsonApiError = ServiceError::Storage("EIO on /data/records.json".into()).into();
        assert_eq!(s.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(s.message.as_deref(), Some("could not complete request"));
    }
}
