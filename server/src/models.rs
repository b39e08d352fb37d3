use chrono::NaiveDateTime;
use diesel::prelude::*;
use pantry_core::Recipe;

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub id: &'a str,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[allow(dead_code)]
pub struct RecipeRow {
    pub id: i32,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub ingredients: String,
    pub procedures: String,
    pub image_prompt: String,
    pub image_path: Option<String>,
    pub created_at: NaiveDateTime,
}

impl RecipeRow {
    /// Decode the JSON list columns.
    pub fn into_recipe(self) -> Result<Recipe, serde_json::Error> {
        Ok(Recipe {
            owner_id: self.user_id,
            title: self.title,
            description: self.description,
            ingredients: serde_json::from_str(&self.ingredients)?,
            procedures: serde_json::from_str(&self.procedures)?,
            image_prompt: self.image_prompt,
            image_path: self.image_path,
        })
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::recipes)]
pub struct NewRecipe<'a> {
    pub user_id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub ingredients: String,
    pub procedures: String,
    pub image_prompt: &'a str,
    pub image_path: Option<&'a str>,
}

impl<'a> NewRecipe<'a> {
    pub fn from_recipe(recipe: &'a Recipe, title: &'a str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            user_id: &recipe.owner_id,
            title,
            description: &recipe.description,
            ingredients: serde_json::to_string(&recipe.ingredients)?,
            procedures: serde_json::to_string(&recipe.procedures)?,
            image_prompt: &recipe.image_prompt,
            image_path: recipe.image_path.as_deref(),
        })
    }
}
