//! Recipe service: generation plus title resolution, persistence and lookups.

use crate::config::{PantryConfig, Providers, ServiceConfig, TitleStrategy};
use crate::error::ServiceError;
use crate::generator::{enter, failed, RecipeGenerator, Stage};
use crate::image::{content_type_for_path, sanitize_for_filesystem, ImageAcquirer, ImageError};
use crate::llm::ImageData;
use crate::store::{RecipeStore, StoreError};
use crate::types::{CostEstimate, NutritionFacts, Recipe, RecipeRequest};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result of scanning a photo.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub recipe: Recipe,
    /// True when the recipe was stored for its owner.
    pub saved: bool,
}

/// An image file ready to be served.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub path: PathBuf,
    pub content_type: &'static str,
}

#[derive(Clone)]
pub struct RecipeService {
    generator: RecipeGenerator,
    store: Arc<dyn RecipeStore>,
    config: ServiceConfig,
}

impl RecipeService {
    pub fn new(generator: RecipeGenerator, store: Arc<dyn RecipeStore>, config: ServiceConfig) -> Self {
        Self {
            generator,
            store,
            config,
        }
    }

    /// Wire a service from loaded configuration and already-built providers.
    pub fn from_config(
        config: &PantryConfig,
        providers: Providers,
        store: Arc<dyn RecipeStore>,
    ) -> Self {
        let images = ImageAcquirer::new(
            providers.image,
            config.image_dir.clone(),
            config.crop_bottom_px,
        );
        let generator =
            RecipeGenerator::new(providers.text, images, config.service.image_policy);
        Self::new(generator, store, config.service.clone())
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Generate a recipe for the request and store it for its owner.
    ///
    /// Returns the stored recipe, whose title may differ from the generated
    /// one when the owner already has a recipe by that name.
    pub async fn create_recipe(&self, request: &RecipeRequest) -> Result<Recipe, ServiceError> {
        let generated = self.generator.generate(request).await?;

        let image_path = generated
            .image_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned());
        let recipe = Recipe::from_generated(&request.owner_id, generated.recipe, image_path);

        let stored = self
            .persist(recipe, generated.image_path.as_deref())
            .await?;

        enter(Stage::Done);
        tracing::info!(
            user_id = %stored.owner_id,
            title = %stored.title,
            has_image = stored.image_path.is_some(),
            "Recipe created"
        );
        Ok(stored)
    }

    /// Store `recipe` under a free title, removing `image` if that fails.
    async fn persist(&self, recipe: Recipe, image: Option<&Path>) -> Result<Recipe, ServiceError> {
        enter(Stage::Persisting);
        match self.store_recipe(recipe).await {
            Ok(stored) => Ok(stored),
            Err(e) => {
                if let Some(path) = image {
                    if let Err(rm) = fs::remove_file(path) {
                        tracing::warn!(path = %path.display(), error = %rm, "Could not remove orphaned image");
                    }
                }
                Err(failed(Stage::Persisting, e))
            }
        }
    }

    async fn store_recipe(&self, mut recipe: Recipe) -> Result<Recipe, ServiceError> {
        self.store.ensure_user(&recipe.owner_id)?;

        match self.config.title_strategy {
            TitleStrategy::Suffix => {
                recipe.title = self.store.insert_with_unique_title(&recipe)?;
                Ok(recipe)
            }
            TitleStrategy::AskProvider => {
                match self.store.insert(&recipe) {
                    Ok(()) => return Ok(recipe),
                    Err(StoreError::TitleTaken { .. }) => {}
                    Err(e) => return Err(e.into()),
                }

                match self.generator.rename(&recipe.title).await {
                    Ok(new_title) if new_title != recipe.title => {
                        tracing::debug!(old = %recipe.title, new = %new_title, "Title taken, renamed");
                        recipe.title = new_title;
                        match self.store.insert(&recipe) {
                            Ok(()) => return Ok(recipe),
                            Err(StoreError::TitleTaken { .. }) => {}
                            Err(e) => return Err(e.into()),
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(title = %recipe.title, error = %e, "Rename failed, suffixing title");
                    }
                }

                recipe.title = self.store.insert_with_unique_title(&recipe)?;
                Ok(recipe)
            }
        }
    }

    pub fn list_recipes(&self, owner_id: &str) -> Result<Vec<Recipe>, ServiceError> {
        if owner_id.trim().is_empty() {
            return Err(ServiceError::Validation("user_id is required".to_string()));
        }
        Ok(self.store.list(owner_id)?)
    }

    /// Find the image for an owner's recipe.
    ///
    /// Underscores in `title` stand for spaces, so a stored title that itself
    /// contains `_` cannot be looked up. Another owner's image with the same
    /// title is used only when the lookup fallback is enabled.
    pub fn image_for(&self, owner_id: &str, title: &str) -> Result<ImageFile, ServiceError> {
        if owner_id.trim().is_empty() || title.trim().is_empty() {
            return Err(ServiceError::Validation(
                "user_id and title are required".to_string(),
            ));
        }
        let title = title.replace('_', " ");

        let mut found = self.store.lookup_image(owner_id, &title)?;
        if found.is_none() && self.config.image_lookup_fallback {
            found = self.store.lookup_image_by_title(&title)?;
        }

        let Some(path) = found else {
            tracing::debug!(
                user_id = %owner_id,
                title = %title,
                known_titles = ?self.store.titles()?,
                "No image for recipe"
            );
            return Err(ServiceError::NotFound(format!("No image for recipe {:?}", title)));
        };

        let path = PathBuf::from(path);
        if !path.is_file() {
            tracing::warn!(path = %path.display(), "Recipe image missing on disk");
            return Err(ServiceError::NotFound(format!("No image for recipe {:?}", title)));
        }

        Ok(ImageFile {
            content_type: content_type_for_path(&path),
            path,
        })
    }

    /// Create a recipe from an uploaded photo, storing it when an owner is given.
    pub async fn scan_and_save(
        &self,
        file_name: &str,
        data: &[u8],
        owner_id: Option<&str>,
    ) -> Result<ScanResult, ServiceError> {
        if data.is_empty() {
            return Err(ServiceError::Validation("No image uploaded".to_string()));
        }

        let (path, mime_type) = self
            .generator
            .images()
            .save_upload(file_name, data)
            .map_err(|e| match e {
                ImageError::InvalidFormat(_) | ImageError::TooLarge { .. } => {
                    ServiceError::Validation(e.to_string())
                }
                other => other.into(),
            })?;
        tracing::info!(path = %path.display(), mime_type = %mime_type, "Photo uploaded");

        let generated = match self
            .generator
            .scan(ImageData::new(mime_type, data.to_vec()))
            .await
        {
            Ok(generated) => generated,
            Err(e) => {
                // Nothing references the upload yet
                if let Err(rm) = fs::remove_file(&path) {
                    tracing::warn!(path = %path.display(), error = %rm, "Could not remove unused upload");
                }
                return Err(e);
            }
        };

        let owner_id = owner_id.map(str::trim).filter(|o| !o.is_empty());
        let recipe = Recipe::from_generated(
            owner_id.unwrap_or_default(),
            generated,
            Some(path.to_string_lossy().into_owned()),
        );

        match owner_id {
            Some(_) => {
                let stored = self.persist(recipe, Some(path.as_path())).await?;
                Ok(ScanResult {
                    recipe: stored,
                    saved: true,
                })
            }
            None => Ok(ScanResult {
                recipe,
                saved: false,
            }),
        }
    }

    pub async fn nutrition_facts(&self, recipe_text: &str) -> Result<NutritionFacts, ServiceError> {
        if recipe_text.trim().is_empty() {
            return Err(ServiceError::Validation("recipe_text is required".to_string()));
        }
        self.generator.nutrition(recipe_text).await
    }

    pub async fn estimate_cost(&self, ingredients: &[String]) -> Result<CostEstimate, ServiceError> {
        let ingredients: Vec<String> = ingredients
            .iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();
        if ingredients.is_empty() {
            return Err(ServiceError::Validation("ingredients are required".to_string()));
        }

        let estimated_cost = self.generator.cost(&ingredients).await?;
        Ok(CostEstimate {
            ingredients,
            estimated_cost,
        })
    }

    /// Generate a standalone image and return its file name.
    pub async fn generate_image(&self, prompt: &str) -> Result<String, ServiceError> {
        if prompt.trim().is_empty() {
            return Err(ServiceError::Validation("prompt is required".to_string()));
        }
        let path = self.generator.images().acquire(prompt, None).await?;
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ServiceError::NotFound(path.display().to_string()))
    }

    /// Resolve a file name returned by [`Self::generate_image`].
    pub fn generated_image(&self, file_name: &str) -> Result<ImageFile, ServiceError> {
        let not_found = || ServiceError::NotFound(format!("No image named {:?}", file_name));
        if sanitize_for_filesystem(file_name) != file_name {
            return Err(not_found());
        }

        let path = self.generator.images().image_dir().join(file_name);
        if !path.is_file() {
            return Err(not_found());
        }
        Ok(ImageFile {
            content_type: content_type_for_path(&path),
            path,
        })
    }

    pub fn allocate_user(&self) -> Result<String, ServiceError> {
        let id = self.store.create_user()?;
        tracing::info!(user_id = %id, "User allocated");
        Ok(id)
    }

    /// Drop all users and recipes. Image files are left on disk.
    pub fn reset(&self) -> Result<(), ServiceError> {
        self.store.reset()?;
        tracing::warn!("Recipe store reset");
        Ok(())
    }
}
