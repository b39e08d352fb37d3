use super::RecipeResponse;
use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ScanRecipeRequest {
    /// Photo of the food
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
    /// When present, the recipe is stored for this user
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScanRecipeResponse {
    #[serde(flatten)]
    pub recipe: RecipeResponse,
    /// Whether the recipe was stored
    pub saved: bool,
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    tracing::warn!("Multipart read error: {}", e);
    ApiError::bad_request(format!("Failed to read multipart data: {}", e.body_text()))
}

#[utoipa::path(
    post,
    path = "/api/recipes/scan",
    tag = "recipes",
    request_body(content_type = "multipart/form-data", content = ScanRecipeRequest),
    responses(
        (status = 200, description = "Recipe created from the photo", body = ScanRecipeResponse),
        (status = 400, description = "No usable image, or no recipe for it", body = ErrorResponse),
        (status = 500, description = "Provider or storage failure", body = ErrorResponse)
    )
)]
pub async fn scan_recipe(
    State(service): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut image: Option<(String, Vec<u8>)> = None;
    let mut user_id: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let file_name = field.file_name().unwrap_or("photo").to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                image = Some((file_name, data.to_vec()));
            }
            Some("user_id") => {
                user_id = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    let (file_name, data) = image.ok_or_else(|| ApiError::bad_request("No image file provided"))?;

    let result = service
        .scan_and_save(&file_name, &data, user_id.as_deref())
        .await?;

    Ok(Json(ScanRecipeResponse {
        recipe: RecipeResponse::from(result.recipe),
        saved: result.saved,
    }))
}
