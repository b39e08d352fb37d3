//! Provider-facing half of the service: prompt, complete, parse, image.
//!
//! Nothing here touches storage. [`crate::service::RecipeService`] wraps the
//! generator with title resolution and persistence.

use crate::config::ImagePolicy;
use crate::error::ServiceError;
use crate::image::ImageAcquirer;
use crate::llm::{ChatMessage, ChatRequest, ImageData, LlmProvider};
use crate::parse::{
    clean_title_reply, parse_cost_reply, parse_nutrition_reply, parse_recipe_reply, ParseError,
};
use crate::prompts::{
    render_cost_prompt, render_nutrition_prompt, render_recipe_prompt, render_rename_prompt,
    render_scan_prompt,
};
use crate::types::{GeneratedRecipe, NutritionFacts, RecipeRequest};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Lifecycle of one recipe request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Prompting,
    AwaitingText,
    Parsing,
    GeneratingImage,
    Persisting,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Prompting => "prompting",
            Stage::AwaitingText => "awaiting_text",
            Stage::Parsing => "parsing",
            Stage::GeneratingImage => "generating_image",
            Stage::Persisting => "persisting",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn enter(stage: Stage) {
    tracing::debug!(stage = %stage, "Recipe stage");
}

/// Log a failure together with the stage it happened in.
pub(crate) fn failed(stage: Stage, err: impl Into<ServiceError>) -> ServiceError {
    let err = err.into();
    match &err {
        ServiceError::Declined | ServiceError::Validation(_) => {
            tracing::info!(stage = %stage, error = %err, "Recipe request rejected")
        }
        _ => tracing::warn!(stage = %stage, error = %err, "Recipe request failed"),
    }
    err
}

/// A parsed recipe and, when one was produced, the path of its image.
#[derive(Debug, Clone)]
pub struct Generated {
    pub recipe: GeneratedRecipe,
    pub image_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RecipeGenerator {
    text: Arc<dyn LlmProvider>,
    images: ImageAcquirer,
    image_policy: ImagePolicy,
}

impl RecipeGenerator {
    pub fn new(text: Arc<dyn LlmProvider>, images: ImageAcquirer, image_policy: ImagePolicy) -> Self {
        Self {
            text,
            images,
            image_policy,
        }
    }

    pub fn images(&self) -> &ImageAcquirer {
        &self.images
    }

    /// Run a request through the text provider and the image generator.
    ///
    /// Any parse failure ends the request before an image is requested.
    pub async fn generate(&self, request: &RecipeRequest) -> Result<Generated, ServiceError> {
        enter(Stage::Prompting);
        if request.owner_id.trim().is_empty() {
            return Err(failed(
                Stage::Prompting,
                ServiceError::Validation("user_id is required".to_string()),
            ));
        }
        let prompt = render_recipe_prompt(request);

        enter(Stage::AwaitingText);
        let response = self
            .text
            .complete(ChatRequest::json(prompt))
            .await
            .map_err(|e| failed(Stage::AwaitingText, e))?;

        enter(Stage::Parsing);
        let recipe =
            parse_recipe_reply(&response.content).map_err(|e| failed(Stage::Parsing, e))?;
        // Generated recipes always describe their image, whatever the policy
        if recipe.image_prompt.is_empty() {
            return Err(failed(
                Stage::Parsing,
                ParseError::MissingField("image_prompt".to_string()),
            ));
        }

        tracing::info!(
            title = %recipe.title,
            ingredients = recipe.ingredients.len(),
            procedures = recipe.procedures.len(),
            provider = self.text.provider_name(),
            "Recipe text generated"
        );

        let image_path = self.image_for_recipe(&recipe).await?;
        Ok(Generated { recipe, image_path })
    }

    async fn image_for_recipe(
        &self,
        recipe: &GeneratedRecipe,
    ) -> Result<Option<PathBuf>, ServiceError> {
        enter(Stage::GeneratingImage);
        match self
            .images
            .acquire(&recipe.image_prompt, Some(&recipe.title))
            .await
        {
            Ok(path) => Ok(Some(path)),
            Err(e) if self.image_policy == ImagePolicy::BestEffort => {
                tracing::warn!(
                    stage = %Stage::GeneratingImage,
                    title = %recipe.title,
                    error = %e,
                    "Image failed, keeping recipe without one"
                );
                Ok(None)
            }
            Err(e) => Err(failed(Stage::GeneratingImage, e)),
        }
    }

    /// Ask the vision model for a recipe matching a photo.
    pub async fn scan(&self, photo: ImageData) -> Result<GeneratedRecipe, ServiceError> {
        enter(Stage::Prompting);
        let request = ChatRequest {
            messages: vec![ChatMessage::user_with_images(render_scan_prompt(), vec![photo])],
            json_response: true,
            ..Default::default()
        };

        enter(Stage::AwaitingText);
        let response = self
            .text
            .complete(request)
            .await
            .map_err(|e| failed(Stage::AwaitingText, e))?;

        enter(Stage::Parsing);
        parse_recipe_reply(&response.content).map_err(|e| failed(Stage::Parsing, e))
    }

    /// Ask for a different title for a recipe whose title is taken.
    pub async fn rename(&self, old_title: &str) -> Result<String, ServiceError> {
        let response = self
            .text
            .complete(ChatRequest::text(render_rename_prompt(old_title)))
            .await?;
        Ok(clean_title_reply(&response.content)?)
    }

    pub async fn nutrition(&self, recipe_text: &str) -> Result<NutritionFacts, ServiceError> {
        let response = self
            .text
            .complete(ChatRequest::json(render_nutrition_prompt(recipe_text)))
            .await?;
        Ok(parse_nutrition_reply(&response.content)?)
    }

    pub async fn cost(&self, ingredients: &[String]) -> Result<f64, ServiceError> {
        let response = self
            .text
            .complete(ChatRequest::text(render_cost_prompt(ingredients)))
            .await?;
        Ok(parse_cost_reply(&response.content)?)
    }
}
