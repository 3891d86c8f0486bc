use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct RecordRequestDoc {
    pub student_id: String,
    pub student_name: String,
    pub bicycle_description: String,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct RecordDoc {
    pub id: u64,
    pub student_id: String,
    pub student_name: String,
    pub bicycle_description: String,
    /// RFC 3339 UTC timestamp
    pub created_at: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::records::list,
        crate::routes::records::create,
        crate::routes::records::get,
    ),
    components(schemas(HealthResponse, RecordRequestDoc, RecordDoc)),
    tags((name = "health"), (name = "records"))
)]
pub struct ApiDoc;
