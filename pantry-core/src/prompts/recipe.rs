//! Recipe generation prompt.

use crate::types::RecipeRequest;

/// Prompt name for logs.
pub const RECIPE_PROMPT_NAME: &str = "recipe";

/// Render the recipe prompt for the given request.
///
/// The inputs are embedded verbatim. The reply contract is a single JSON
/// object so list fields never need a separator.
pub fn render_recipe_prompt(request: &RecipeRequest) -> String {
    format!(
        r#"You are a home-cooking assistant.
You will be given ingredients the user has at home.
You will also be given the user's budget for how many extra ingredients they can buy.

Respond with a single JSON object and nothing else:
{{
  "status": "ok",
  "title": "A title for the recipe. Vary this each time, even for the same dish.",
  "description": "A friendly description of the dish, along with the time it takes and how many it serves.",
  "ingredients": ["Each extra ingredient to buy, with a measurement, one per entry"],
  "procedures": ["Each step to make the dish, one per entry, without step numbers"],
  "image_prompt": "A short description of what the final dish looks like"
}}

Rules:
- Extra ingredients must fit within the budget and must not include the ingredients at home.
- Include the full procedures, not just the first one.
- The image prompt goes to a generator that does not know many dishes, so describe the food plainly and keep it short. For example, for a ketchup-mayonnaise dip, ask for a cup with orange dip in it.
- Do not start the title with an adjective such as "Quick", "Hearty" or "Speedy".
- If you cannot create a meal that satisfies these criteria, respond with exactly: {{"status": "unable"}}

The type of meal requested is a {meal_type}.
Ingredients the user has at home are: {ingredients}.
User's budget: ${budget}
The user has {time} minutes to make this meal.
The user needs to serve {serves} people."#,
        meal_type = request.meal_type,
        ingredients = request.ingredients.join(", "),
        budget = request.budget,
        time = request.time_minutes,
        serves = request.serves,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RecipeRequest {
        RecipeRequest {
            owner_id: "u1".to_string(),
            ingredients: vec!["egg".to_string(), "bread".to_string()],
            budget: 5.0,
            time_minutes: 10,
            serves: 1,
            meal_type: "breakfast".to_string(),
        }
    }

    #[test]
    fn test_render_prompt_embeds_inputs() {
        let prompt = render_recipe_prompt(&request());

        assert!(prompt.contains("Ingredients the user has at home are: egg, bread."));
        assert!(prompt.contains("User's budget: $5\n"));
        assert!(prompt.contains("10 minutes"));
        assert!(prompt.contains("serve 1 people"));
        assert!(prompt.contains("meal requested is a breakfast"));
        assert!(prompt.contains(r#"{"status": "unable"}"#));
    }

    #[test]
    fn test_render_prompt_keeps_fractional_budget() {
        let mut req = request();
        req.budget = 7.5;
        assert!(render_recipe_prompt(&req).contains("User's budget: $7.5"));
    }
}
