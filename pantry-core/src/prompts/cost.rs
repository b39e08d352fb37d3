//! Shopping list cost estimation prompt.

pub const COST_PROMPT_NAME: &str = "cost";

/// Render the cost prompt, one ingredient per line.
pub fn render_cost_prompt(ingredients: &[String]) -> String {
    let list = ingredients
        .iter()
        .map(|i| format!("- {}", i.trim()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"What is the price in US dollars of the following ingredients combined?
Estimate the price of each ingredient using typical grocery prices and the measurements given, then add them up.

{list}

Respond with just the total as a number, without a dollar sign or any other text."#,
        list = list
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_prompt_lists_ingredients() {
        let prompt = render_cost_prompt(&["2 eggs".to_string(), " 1 cup milk ".to_string()]);
        assert!(prompt.contains("- 2 eggs\n- 1 cup milk\n"));
        assert!(prompt.contains("price in US dollars"));
    }
}
