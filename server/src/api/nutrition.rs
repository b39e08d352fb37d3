//! Nutrition facts estimation for free-text recipes.

use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use pantry_core::NutritionFacts;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

/// Returns the router for /api/nutrition endpoints (mounted at /api/nutrition)
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(nutrition_facts))
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NutritionRequest {
    pub recipe_text: Option<String>,
}

/// Estimated values for the whole dish, each with its unit
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NutritionFactsBody {
    pub totalfat: String,
    pub saturatedfat: String,
    pub transfat: String,
    pub cholesterol: String,
    pub sodium: String,
    pub totalcarbs: String,
    pub dietaryfiber: String,
    pub totalsugar: String,
    pub addedsugar: String,
    pub protein: String,
    pub calories: String,
}

impl From<NutritionFacts> for NutritionFactsBody {
    fn from(f: NutritionFacts) -> Self {
        Self {
            totalfat: f.totalfat,
            saturatedfat: f.saturatedfat,
            transfat: f.transfat,
            cholesterol: f.cholesterol,
            sodium: f.sodium,
            totalcarbs: f.totalcarbs,
            dietaryfiber: f.dietaryfiber,
            totalsugar: f.totalsugar,
            addedsugar: f.addedsugar,
            protein: f.protein,
            calories: f.calories,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NutritionResponse {
    pub facts: NutritionFactsBody,
}

#[utoipa::path(
    post,
    path = "/api/nutrition",
    tag = "nutrition",
    request_body = NutritionRequest,
    responses(
        (status = 200, description = "Estimated nutrition facts", body = NutritionResponse),
        (status = 400, description = "Missing recipe_text", body = ErrorResponse),
        (status = 500, description = "Provider failure or unusable reply", body = ErrorResponse)
    )
)]
pub async fn nutrition_facts(
    State(service): State<AppState>,
    payload: Result<Json<NutritionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let recipe_text = request
        .recipe_text
        .ok_or_else(|| ApiError::bad_request("Invalid input"))?;

    let facts = service.nutrition_facts(&recipe_text).await?;
    Ok(Json(NutritionResponse {
        facts: facts.into(),
    }))
}

#[derive(OpenApi)]
#[openapi(
    paths(nutrition_facts),
    components(schemas(NutritionRequest, NutritionResponse, NutritionFactsBody))
)]
pub struct ApiDoc;
