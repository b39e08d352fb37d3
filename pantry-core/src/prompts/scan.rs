//! Prompt for creating a recipe from a photo of food.

pub const SCAN_PROMPT_NAME: &str = "scan";

pub fn render_scan_prompt() -> String {
    r#"You are given a photo of a food item. Create a recipe for it.

Respond with a single JSON object and nothing else:
{
  "status": "ok",
  "title": "A title for the recipe",
  "description": "A friendly description of the dish, along with the time it takes and how many it serves.",
  "ingredients": ["Each ingredient with a measurement, one per entry"],
  "procedures": ["Each step to make the dish, one per entry, without step numbers"],
  "image_prompt": null
}

If the photo does not show food you can build a recipe for, respond with exactly: {"status": "unable"}"#
        .to_string()
}
