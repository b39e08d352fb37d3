use super::RecipeResponse;
use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use pantry_core::RecipeRequest;
use serde::Deserialize;
use utoipa::ToSchema;

fn default_meal_type() -> String {
    "dinner".to_string()
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    pub user_id: Option<String>,
    /// Ingredients the user already has
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Money available for extra ingredients, in US dollars
    #[serde(default)]
    pub budget: f64,
    /// Minutes available to cook
    #[serde(default)]
    pub time: u32,
    #[serde(default)]
    pub serves: u32,
    #[serde(default = "default_meal_type")]
    pub meal_type: String,
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe generated and stored", body = RecipeResponse),
        (status = 400, description = "Missing user_id, or no recipe fits the request", body = ErrorResponse),
        (status = 500, description = "Provider, parse or storage failure", body = ErrorResponse)
    )
)]
pub async fn create_recipe(
    State(service): State<AppState>,
    payload: Result<Json<CreateRecipeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;

    let owner_id = request
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing user_id"))?;

    let recipe = service
        .create_recipe(&RecipeRequest {
            owner_id,
            ingredients: request.ingredients,
            budget: request.budget,
            time_minutes: request.time,
            serves: request.serves,
            meal_type: request.meal_type,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(RecipeResponse::from(recipe))))
}
