//! Prompt templates.
//!
//! Each template has a `*_PROMPT_NAME` constant used in logs.

pub mod cost;
pub mod nutrition;
pub mod recipe;
pub mod rename;
pub mod scan;

pub use cost::render_cost_prompt;
pub use nutrition::render_nutrition_prompt;
pub use recipe::render_recipe_prompt;
pub use rename::render_rename_prompt;
pub use scan::render_scan_prompt;
