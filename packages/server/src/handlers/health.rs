use axum::Json;
use serde::Serialize;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: &'static str,
    #[schema(example = "Server is running")]
    pub message: &'static str,
}

/// Liveness probe. Does not touch the database.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    operation_id = "health",
    responses((status = 200, description = "Server is up", body = HealthResponse)),
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Server is running",
    })
}
