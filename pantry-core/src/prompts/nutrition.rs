//! Nutrition facts estimation prompt.

use crate::types::NutritionFacts;

pub const NUTRITION_PROMPT_NAME: &str = "nutrition";

/// Render the nutrition prompt for a free-text recipe.
pub fn render_nutrition_prompt(recipe_text: &str) -> String {
    let keys = NutritionFacts::KEYS
        .iter()
        .map(|k| format!("  \"{}\": \"value with unit\"", k))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        r#"Your job is to analyze the recipe below and estimate the nutrition facts of the whole dish combined.
Align the estimates with typical nutrition of these ingredients in the US.

Respond with a single JSON object and nothing else:
{{
{keys}
}}

Rules:
- Give every value with its unit, like "cal" for calories or "mg" for sodium.
- Do not give ranges such as "5-10 mg"; give the average, "7.5 mg".
- Even if you cannot give a complete answer, give your best estimate for every field.

The recipe is below. It may end with an image description; ignore that part.
{recipe_text}"#,
        keys = keys,
        recipe_text = recipe_text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_prompt_lists_every_key() {
        let prompt = render_nutrition_prompt("Toast;Crispy bread;bread;toast it;a slice");

        for key in NutritionFacts::KEYS {
            assert!(prompt.contains(&format!("\"{}\"", key)), "missing {}", key);
        }
        assert!(prompt.contains("nutrition facts"));
        assert!(prompt.ends_with("Toast;Crispy bread;bread;toast it;a slice"));
    }
}
