use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GenerateImageRequest {
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GenerateImageResponse {
    /// Name to fetch the image by from `/api/images/{filename}`
    pub filename: String,
}

#[utoipa::path(
    post,
    path = "/api/images",
    tag = "images",
    request_body = GenerateImageRequest,
    responses(
        (status = 200, description = "Image generated and cropped", body = GenerateImageResponse),
        (status = 400, description = "Missing prompt", body = ErrorResponse),
        (status = 500, description = "Image generation failed", body = ErrorResponse)
    )
)]
pub async fn generate_image(
    State(service): State<AppState>,
    payload: Result<Json<GenerateImageRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let prompt = request
        .prompt
        .ok_or_else(|| ApiError::bad_request("Missing prompt"))?;

    let filename = service.generate_image(&prompt).await?;
    Ok(Json(GenerateImageResponse { filename }))
}
