use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::header,
    response::IntoResponse,
};
use pantry_core::{ImageFile, ServiceError};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct RecipeImageParams {
    pub user_id: Option<String>,
    /// Recipe title; underscores stand for spaces
    pub title: Option<String>,
}

/// Read an image from disk into a response with its content type.
pub async fn image_response(image: ImageFile) -> Result<impl IntoResponse, ApiError> {
    let data = tokio::fs::read(&image.path).await.map_err(|e| {
        tracing::warn!(path = %image.path.display(), error = %e, "Failed to read image");
        ApiError(ServiceError::NotFound("Image file missing".to_string()))
    })?;
    Ok(([(header::CONTENT_TYPE, image.content_type)], data))
}

#[utoipa::path(
    get,
    path = "/api/recipes/image",
    tag = "recipes",
    params(RecipeImageParams),
    responses(
        (status = 200, description = "Recipe image bytes", content_type = "image/*"),
        (status = 400, description = "Missing user_id or title", body = ErrorResponse),
        (status = 404, description = "No image for this recipe", body = ErrorResponse)
    )
)]
pub async fn get_recipe_image(
    State(service): State<AppState>,
    params: Result<Query<RecipeImageParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params?;
    let (Some(user_id), Some(title)) = (params.user_id, params.title) else {
        return Err(ApiError::bad_request("Missing user_id or title"));
    };

    let image = service.image_for(&user_id, &title)?;
    image_response(image).await
}
