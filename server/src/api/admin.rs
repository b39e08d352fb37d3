use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Router};
use utoipa::OpenApi;

/// Returns the router for /api/admin endpoints (mounted at /api/admin)
pub fn router() -> Router<AppState> {
    Router::new().route("/reset", post(reset))
}

#[utoipa::path(
    post,
    path = "/api/admin/reset",
    tag = "admin",
    responses(
        (status = 204, description = "All users and recipes dropped"),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn reset(State(service): State<AppState>) -> Result<StatusCode, ApiError> {
    service.reset()?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(OpenApi)]
#[openapi(paths(reset))]
pub struct ApiDoc;
