pub mod create;
pub mod image;
pub mod list;
pub mod scan;

use crate::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use pantry_core::{Recipe, MAX_FILE_SIZE};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

/// Room for multipart framing around the largest accepted photo
const SCAN_BODY_LIMIT: usize = MAX_FILE_SIZE + 64 * 1024;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route("/image", get(image::get_recipe_image))
        .route(
            "/scan",
            post(scan::scan_recipe).layer(DefaultBodyLimit::max(SCAN_BODY_LIMIT)),
        )
}

/// A stored recipe as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub procedures: Vec<String>,
    pub image_prompt: String,
    /// Path of the image on the server, absent when none was produced
    pub image_path: Option<String>,
}

impl From<Recipe> for RecipeResponse {
    fn from(recipe: Recipe) -> Self {
        Self {
            title: recipe.title,
            description: recipe.description,
            ingredients: recipe.ingredients,
            procedures: recipe.procedures,
            image_prompt: recipe.image_prompt,
            image_path: recipe.image_path,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_recipe,
        list::list_recipes,
        image::get_recipe_image,
        scan::scan_recipe,
    ),
    components(schemas(
        RecipeResponse,
        create::CreateRecipeRequest,
        list::ListRecipesResponse,
        scan::ScanRecipeRequest,
        scan::ScanRecipeResponse,
    ))
)]
pub struct ApiDoc;
