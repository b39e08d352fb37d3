use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NewUserResponse {
    pub user_id: String,
}

#[utoipa::path(
    get,
    path = "/api/users/new",
    tag = "users",
    responses(
        (status = 200, description = "Freshly allocated user id", body = NewUserResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn new_user(State(service): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let user_id = service.allocate_user()?;
    Ok(Json(NewUserResponse { user_id }))
}
