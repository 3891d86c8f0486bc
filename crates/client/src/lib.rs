//! HTTP client for the record registry, for presentation layers and tests.

use models::{Record, RecordId, RecordRequest};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Caught locally before any request was sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("server rejected request ({status}): {message}")]
    Rejected { status: StatusCode, message: String },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
            ClientError::InvalidInput(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct HealthBody {
    status: String,
}

pub struct RecordsClient {
    client: Client,
    base_url: String,
}

impl RecordsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self.client.get(format!("{}/health", self.base_url)).send().await?;
        let body: HealthBody = check(resp).await?.json().await?;
        Ok(body.status == "ok")
    }

    pub async fn list_records(&self) -> Result<Vec<Record>, ClientError> {
        let url = format!("{}/records", self.base_url);
        let resp = self.client.get(&url).send().await?;
        let records: Vec<Record> = check(resp).await?.json().await?;
        debug!(count = records.len(), "fetched records");
        Ok(records)
    }

    pub async fn get_record(&self, id: RecordId) -> Result<Record, ClientError> {
        let resp = self.client.get(format!("{}/records/{id}", self.base_url)).send().await?;
        Ok(check(resp).await?.json().await?)
    }

    /// Trim and pre-check the fields, then submit. Blank fields never reach
    /// the server; the server validates again regardless.
    pub async fn create_record(&self, request: &RecordRequest) -> Result<Record, ClientError> {
        let trimmed = RecordRequest::new(
            request.student_id.trim(),
            request.student_name.trim(),
            request.bicycle_description.trim(),
        );
        if trimmed.student_id.is_empty() || trimmed.student_name.is_empty() || trimmed.bicycle_description.is_empty() {
            return Err(ClientError::InvalidInput("all fields are required".into()));
        }
        self.submit(&trimmed).await
    }

    /// Send `request` as-is, without the local pre-check.
    pub async fn submit(&self, request: &RecordRequest) -> Result<Record, ClientError> {
        let resp = self
            .client
            .post(format!("{}/records", self.base_url))
            .json(request)
            .send()
            .await?;
        let record: Record = check(resp).await?.json().await?;
        debug!(id = %record.id, "created record");
        Ok(record)
    }
}

async fn check(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(ErrorBody { message: Some(m), .. }) => m,
        Ok(ErrorBody { error: Some(e), .. }) => e,
        _ if text.is_empty() => status.canonical_reason().unwrap_or("request failed").to_string(),
        _ => text,
    };
    Err(ClientError::Rejected { status, message })
}

/// One line per record for plain-text display.
pub fn render_records(records: &[Record]) -> String {
    if records.is_empty() {
        return "no records".to_string();
    }
    records
        .iter()
        .map(|r| {
            format!(
                "#{} {} {} - {} ({})",
                r.id,
                r.student_id,
                r.student_name,
                r.bicycle_description,
                r.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
