//! Persistence seam for recipes and users.
//!
//! The service depends only on [`RecipeStore`]; the server provides a
//! database-backed implementation and tests use [`MemoryRecipeStore`].

use crate::types::Recipe;
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Recipe title already taken for user {owner_id}: {title}")]
    TitleTaken { owner_id: String, title: String },

    #[error("Database error: {0}")]
    Backend(String),
}

/// Title tried on the `attempt`-th collision: `T`, `T (1)`, `T (2)`, ...
pub fn suffixed_title(title: &str, attempt: usize) -> String {
    if attempt == 0 {
        title.to_string()
    } else {
        format!("{} ({})", title, attempt)
    }
}

pub trait RecipeStore: Send + Sync {
    /// Insert exactly as given. Fails with `TitleTaken` on a duplicate
    /// `(owner_id, title)`.
    fn insert(&self, recipe: &Recipe) -> Result<(), StoreError>;

    /// Insert under the first free title of `T`, `T (1)`, `T (2)`, ...
    /// atomically, and return the title used.
    fn insert_with_unique_title(&self, recipe: &Recipe) -> Result<String, StoreError>;

    /// All recipes for an owner, oldest first.
    fn list(&self, owner_id: &str) -> Result<Vec<Recipe>, StoreError>;

    fn lookup_image(&self, owner_id: &str, title: &str) -> Result<Option<String>, StoreError>;

    /// Image of any recipe with this title, regardless of owner.
    fn lookup_image_by_title(&self, title: &str) -> Result<Option<String>, StoreError>;

    fn titles(&self) -> Result<Vec<String>, StoreError>;

    /// Allocate and record a fresh user id.
    fn create_user(&self) -> Result<String, StoreError>;

    /// Record `user_id` if it is not known yet.
    fn ensure_user(&self, user_id: &str) -> Result<(), StoreError>;

    /// Drop every user and recipe.
    fn reset(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<String>,
    recipes: Vec<Recipe>,
}

/// In-process store used by tests and the CLI.
#[derive(Debug, Default)]
pub struct MemoryRecipeStore {
    state: Mutex<MemoryState>,
}

impl MemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|e| StoreError::Backend(format!("store lock poisoned: {}", e)))
    }
}

fn title_taken(state: &MemoryState, owner_id: &str, title: &str) -> bool {
    state
        .recipes
        .iter()
        .any(|r| r.owner_id == owner_id && r.title == title)
}

impl RecipeStore for MemoryRecipeStore {
    fn insert(&self, recipe: &Recipe) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if title_taken(&state, &recipe.owner_id, &recipe.title) {
            return Err(StoreError::TitleTaken {
                owner_id: recipe.owner_id.clone(),
                title: recipe.title.clone(),
            });
        }
        state.recipes.push(recipe.clone());
        Ok(())
    }

    fn insert_with_unique_title(&self, recipe: &Recipe) -> Result<String, StoreError> {
        let mut state = self.lock()?;
        let title = (0..)
            .map(|n| suffixed_title(&recipe.title, n))
            .find(|t| !title_taken(&state, &recipe.owner_id, t))
            .unwrap_or_else(|| recipe.title.clone());

        let mut stored = recipe.clone();
        stored.title = title.clone();
        state.recipes.push(stored);
        Ok(title)
    }

    fn list(&self, owner_id: &str) -> Result<Vec<Recipe>, StoreError> {
        Ok(self
            .lock()?
            .recipes
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn lookup_image(&self, owner_id: &str, title: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .lock()?
            .recipes
            .iter()
            .find(|r| r.owner_id == owner_id && r.title == title)
            .and_then(|r| r.image_path.clone()))
    }

    fn lookup_image_by_title(&self, title: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .lock()?
            .recipes
            .iter()
            .filter(|r| r.title == title)
            .find_map(|r| r.image_path.clone()))
    }

    fn titles(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.lock()?.recipes.iter().map(|r| r.title.clone()).collect())
    }

    fn create_user(&self) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.lock()?.users.push(id.clone());
        Ok(id)
    }

    fn ensure_user(&self, user_id: &str) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if !state.users.iter().any(|u| u == user_id) {
            state.users.push(user_id.to_string());
        }
        Ok(())
    }

    fn reset(&self) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.users.clear();
        state.recipes.clear();
        Ok(())
    }
}
