use super::RecipeResponse;
use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListRecipesParams {
    /// Owner whose recipes to list
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListRecipesResponse {
    pub recipes: Vec<RecipeResponse>,
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "Recipes in creation order", body = ListRecipesResponse),
        (status = 400, description = "Missing user_id", body = ErrorResponse)
    )
)]
pub async fn list_recipes(
    State(service): State<AppState>,
    params: Result<Query<ListRecipesParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params?;
    let user_id = params
        .user_id
        .ok_or_else(|| ApiError::bad_request("Missing user_id"))?;

    let recipes = service.list_recipes(&user_id)?;
    Ok(Json(ListRecipesResponse {
        recipes: recipes.into_iter().map(RecipeResponse::from).collect(),
    }))
}
