use serde::{Deserialize, Serialize};

/// Inputs for generating a recipe from what the user already has.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeRequest {
    pub owner_id: String,
    pub ingredients: Vec<String>,
    /// Extra money available for shopping, in dollars.
    pub budget: f64,
    /// Minutes available to cook.
    pub time_minutes: u32,
    pub serves: u32,
    pub meal_type: String,
}

/// The five structured fields produced by a successful generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedRecipe {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub procedures: Vec<String>,
    /// Short description handed to the image generator. Empty for scanned recipes.
    pub image_prompt: String,
}

/// A stored recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub procedures: Vec<String>,
    pub image_prompt: String,
    pub image_path: Option<String>,
}

impl Recipe {
    pub fn from_generated(
        owner_id: &str,
        generated: GeneratedRecipe,
        image_path: Option<String>,
    ) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            title: generated.title,
            description: generated.description,
            ingredients: generated.ingredients,
            procedures: generated.procedures,
            image_prompt: generated.image_prompt,
            image_path,
        }
    }
}

/// Estimated nutrition facts for a whole recipe, values include units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    pub totalfat: String,
    pub saturatedfat: String,
    pub transfat: String,
    pub cholesterol: String,
    pub sodium: String,
    pub totalcarbs: String,
    pub dietaryfiber: String,
    pub totalsugar: String,
    pub addedsugar: String,
    pub protein: String,
    pub calories: String,
}

impl NutritionFacts {
    /// Field names in the order the legacy delimited reply lists them.
    pub const KEYS: [&'static str; 11] = [
        "totalfat",
        "saturatedfat",
        "transfat",
        "cholesterol",
        "sodium",
        "totalcarbs",
        "dietaryfiber",
        "totalsugar",
        "addedsugar",
        "protein",
        "calories",
    ];
}

/// Estimated cost of buying a list of ingredients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub ingredients: Vec<String>,
    /// US dollars.
    pub estimated_cost: f64,
}
