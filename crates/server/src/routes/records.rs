use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use models::{Record, RecordId, RecordRequest};
use serde::Deserialize;
use service::Pagination;
use tracing::info;

use crate::errors::JsonApiError;
use crate::state::AppState;

/// Paging is opt-in: without either parameter the full list is returned.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListQuery {
    fn pagination(&self) -> Option<Pagination> {
        if self.page.is_none() && self.per_page.is_none() {
            return None;
        }
        let d = Pagination::default();
        Some(Pagination { page: self.page.unwrap_or(d.page), per_page: self.per_page.unwrap_or(d.per_page) })
    }
}

#[utoipa::path(
    get, path = "/records", tag = "records",
    params(ListQuery),
    responses(
        (status = 200, description = "Records in id order", body = [crate::openapi::RecordDoc]),
        (status = 500, description = "Storage Error")
    )
)]
pub async fn list(State(state): State<AppState>, Query(q): Query<ListQuery>) -> Result<Response, JsonApiError> {
    match q.pagination() {
        Some(p) => {
            let page = state.records.list_page(p).await?;
            Ok(Json(page).into_response())
        }
        None => {
            let records = state.records.list_records().await?;
            Ok(Json(records.as_slice()).into_response())
        }
    }
}

#[utoipa::path(
    post, path = "/records", tag = "records",
    request_body = crate::openapi::RecordRequestDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::RecordDoc),
        (status = 400, description = "Validation Error"),
        (status = 500, description = "Storage Error")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<RecordRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Record>), JsonApiError> {
    let Json(input) = body?;
    let record = state.records.create_record(input).await?;
    info!(id = %record.id, "created record");
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    get, path = "/records/{id}", tag = "records",
    params(("id" = u64, Path, description = "Record id")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::RecordDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<RecordId>) -> Result<Json<Record>, JsonApiError> {
    Ok(Json(state.records.get_record(id).await?))
}
