use crate::api::recipes::image::image_response;
use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

#[utoipa::path(
    get,
    path = "/api/images/{filename}",
    tag = "images",
    params(
        ("filename" = String, Path, description = "Name returned when the image was generated"),
    ),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/*"),
        (status = 404, description = "No such image", body = ErrorResponse)
    )
)]
pub async fn get_image(
    State(service): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let image = service.generated_image(&filename)?;
    image_response(image).await
}
