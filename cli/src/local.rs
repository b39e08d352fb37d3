//! Runs the recipe service in-process, without a server or database.

use anyhow::{Context, Result};
use pantry_core::{MemoryRecipeStore, PantryConfig, Providers, RecipeService};
use std::sync::Arc;

/// Owner recorded on recipes generated from the command line.
pub const LOCAL_OWNER: &str = "cli";

/// Build a service from the `PANTRY_*` environment over an in-memory store.
///
/// Generated images still land in the configured image directory.
pub fn service() -> Result<RecipeService> {
    let config = PantryConfig::from_env().context("Invalid configuration")?;
    let providers = Providers::from_config(&config).context("Failed to set up providers")?;
    tracing::debug!(
        text_provider = ?config.text_provider,
        image_provider = ?config.image_provider,
        "Using local providers"
    );
    Ok(RecipeService::from_config(
        &config,
        providers,
        Arc::new(MemoryRecipeStore::new()),
    ))
}
