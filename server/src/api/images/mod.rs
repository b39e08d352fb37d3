pub mod generate;
pub mod get;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/images endpoints (mounted at /api/images)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(generate::generate_image))
        .route("/{filename}", get(get::get_image))
}

#[derive(OpenApi)]
#[openapi(
    paths(generate::generate_image, get::get_image),
    components(schemas(generate::GenerateImageRequest, generate::GenerateImageResponse))
)]
pub struct ApiDoc;
