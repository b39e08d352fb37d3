//! Shopping list cost estimates.

use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

/// Returns the router for /api/shopping-list endpoints (mounted at /api/shopping-list)
pub fn router() -> Router<AppState> {
    Router::new().route("/estimate", post(estimate_cost))
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EstimateRequest {
    #[serde(default)]
    pub ingredients: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EstimateResponse {
    pub ingredients: Vec<String>,
    /// Estimated total in US dollars
    pub estimated_cost: f64,
}

#[utoipa::path(
    post,
    path = "/api/shopping-list/estimate",
    tag = "shopping_list",
    request_body = EstimateRequest,
    responses(
        (status = 200, description = "Estimated cost of the ingredients", body = EstimateResponse),
        (status = 400, description = "No ingredients given", body = ErrorResponse),
        (status = 500, description = "Provider failure or unusable reply", body = ErrorResponse)
    )
)]
pub async fn estimate_cost(
    State(service): State<AppState>,
    payload: Result<Json<EstimateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let estimate = service.estimate_cost(&request.ingredients).await?;
    Ok(Json(EstimateResponse {
        ingredients: estimate.ingredients,
        estimated_cost: estimate.estimated_cost,
    }))
}

#[derive(OpenApi)]
#[openapi(paths(estimate_cost), components(schemas(EstimateRequest, EstimateResponse)))]
pub struct ApiDoc;
