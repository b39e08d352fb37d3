pub mod new;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/users endpoints (mounted at /api/users)
pub fn router() -> Router<AppState> {
    Router::new().route("/new", get(new::new_user))
}

#[derive(OpenApi)]
#[openapi(paths(new::new_user), components(schemas(new::NewUserResponse)))]
pub struct ApiDoc;
