pub mod config;
pub mod error;
pub mod generator;
pub mod image;
pub mod imagegen;
pub mod llm;
pub mod parse;
pub mod prompts;
pub mod service;
pub mod store;
pub mod types;

pub use config::{ConfigError, ImagePolicy, PantryConfig, Providers, ServiceConfig, TitleStrategy};
pub use error::ServiceError;
pub use generator::{RecipeGenerator, Stage};
pub use image::{crop_bottom, validate_image, CropError, ImageAcquirer, ImageError, MAX_FILE_SIZE};
pub use parse::{parse_cost_reply, parse_nutrition_reply, parse_recipe_reply, ParseError};
pub use service::{ImageFile, RecipeService, ScanResult};
pub use store::{MemoryRecipeStore, RecipeStore, StoreError};
pub use types::{CostEstimate, GeneratedRecipe, NutritionFacts, Recipe, RecipeRequest};
