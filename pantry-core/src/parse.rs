//! Parsing of provider replies into typed values.
//!
//! Recipe and nutrition replies are expected as JSON. Older prompts asked for
//! `;`-delimited text, and some models still answer that way, so the
//! delimited grammar is kept as a fallback when the reply is not JSON.

use crate::types::{GeneratedRecipe, NutritionFacts};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

const RECIPE_FIELD_COUNT: usize = 5;
const DECLINE_MARKER: &str = "0";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Empty reply from provider")]
    Empty,

    #[error("Provider could not satisfy the request")]
    Declined,

    #[error("Expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("Invalid JSON reply: {0}")]
    InvalidJson(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("No number in reply: {0}")]
    NotANumber(String),
}

/// Remove a surrounding Markdown code fence (```json ... ```), if any.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListField {
    Items(Vec<String>),
    Text(String),
}

impl ListField {
    fn into_items(self) -> Vec<String> {
        match self {
            ListField::Items(items) => items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            ListField::Text(text) => split_list(&text),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RecipeReply {
    status: Option<String>,
    title: Option<String>,
    description: Option<String>,
    ingredients: Option<ListField>,
    procedures: Option<ListField>,
    image_prompt: Option<String>,
}

/// Parse a recipe reply. Either a complete recipe comes back or an error;
/// callers never see partial fields.
pub fn parse_recipe_reply(raw: &str) -> Result<GeneratedRecipe, ParseError> {
    let text = strip_code_fence(raw);
    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    if text.starts_with('{') {
        parse_recipe_json(text)
    } else {
        parse_recipe_delimited(text)
    }
}

fn parse_recipe_json(text: &str) -> Result<GeneratedRecipe, ParseError> {
    let reply: RecipeReply =
        serde_json::from_str(text).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    if let Some(status) = reply.status.as_deref() {
        if status.trim().eq_ignore_ascii_case("unable") {
            return Err(ParseError::Declined);
        }
    }

    let title = reply.title.unwrap_or_default().trim().to_string();
    let description = reply.description.unwrap_or_default().trim().to_string();
    let ingredients = reply.ingredients.map(ListField::into_items).unwrap_or_default();
    let procedures = reply.procedures.map(ListField::into_items).unwrap_or_default();
    let image_prompt = reply.image_prompt.unwrap_or_default().trim().to_string();

    complete_recipe(GeneratedRecipe {
        title,
        description,
        ingredients,
        procedures,
        image_prompt,
    })
}

fn parse_recipe_delimited(text: &str) -> Result<GeneratedRecipe, ParseError> {
    let fields: Vec<&str> = text.split(';').map(str::trim).collect();
    if fields.len() != RECIPE_FIELD_COUNT {
        return Err(ParseError::FieldCount {
            expected: RECIPE_FIELD_COUNT,
            found: fields.len(),
        });
    }

    complete_recipe(GeneratedRecipe {
        title: fields[0].to_string(),
        description: fields[1].to_string(),
        ingredients: split_list(fields[2]),
        procedures: split_list(fields[3]),
        image_prompt: fields[4].to_string(),
    })
}

/// Accept a recipe only when every field carries a value.
///
/// All five fields set to the marker is a decline. A marker or an empty value
/// in only some of them is a malformed reply. `image_prompt` may be empty
/// here because scanned recipes have none; generation checks it separately.
fn complete_recipe(recipe: GeneratedRecipe) -> Result<GeneratedRecipe, ParseError> {
    let is_marker = |s: &str| s == DECLINE_MARKER;
    let is_marker_list = |l: &[String]| l.len() == 1 && is_marker(&l[0]);

    if is_marker(&recipe.title)
        && is_marker(&recipe.description)
        && is_marker_list(&recipe.ingredients)
        && is_marker_list(&recipe.procedures)
        && is_marker(&recipe.image_prompt)
    {
        return Err(ParseError::Declined);
    }

    let missing = |name: &str| Err(ParseError::MissingField(name.to_string()));
    if recipe.title.is_empty() || is_marker(&recipe.title) {
        return missing("title");
    }
    if recipe.description.is_empty() || is_marker(&recipe.description) {
        return missing("description");
    }
    if recipe.ingredients.is_empty() || is_marker_list(&recipe.ingredients) {
        return missing("ingredients");
    }
    if recipe.procedures.is_empty() || is_marker_list(&recipe.procedures) {
        return missing("procedures");
    }
    if is_marker(&recipe.image_prompt) {
        return missing("image_prompt");
    }

    Ok(recipe)
}

/// Split a list sub-field on `|` when present, otherwise on `,`.
fn split_list(field: &str) -> Vec<String> {
    let sep = if field.contains('|') { '|' } else { ',' };
    field
        .split(sep)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a nutrition reply into the eleven facts.
pub fn parse_nutrition_reply(raw: &str) -> Result<NutritionFacts, ParseError> {
    let text = strip_code_fence(raw);
    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    let values: Vec<String> = if text.starts_with('{') {
        let map: HashMap<String, Value> =
            serde_json::from_str(text).map_err(|e| ParseError::InvalidJson(e.to_string()))?;
        NutritionFacts::KEYS
            .iter()
            .map(|key| match map.get(*key) {
                Some(Value::String(s)) => Ok(s.trim().to_string()),
                Some(Value::Null) | None => Err(ParseError::MissingField(key.to_string())),
                Some(other) => Ok(other.to_string()),
            })
            .collect::<Result<_, _>>()?
    } else {
        let fields: Vec<String> = text.split(';').map(|f| f.trim().to_string()).collect();
        if fields.len() != NutritionFacts::KEYS.len() {
            return Err(ParseError::FieldCount {
                expected: NutritionFacts::KEYS.len(),
                found: fields.len(),
            });
        }
        fields
    };

    let mut it = values.into_iter();
    let mut next = || it.next().unwrap_or_default();
    Ok(NutritionFacts {
        totalfat: next(),
        saturatedfat: next(),
        transfat: next(),
        cholesterol: next(),
        sodium: next(),
        totalcarbs: next(),
        dietaryfiber: next(),
        totalsugar: next(),
        addedsugar: next(),
        protein: next(),
        calories: next(),
    })
}

/// Extract the first number from a cost reply. Dollar signs and thousands
/// separators are ignored.
pub fn parse_cost_reply(raw: &str) -> Result<f64, ParseError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    let cleaned: String = text.chars().filter(|c| *c != ',' && *c != '$').collect();
    let start = cleaned
        .char_indices()
        .find(|(_, c)| c.is_ascii_digit())
        .map(|(i, _)| i)
        .ok_or_else(|| ParseError::NotANumber(text.to_string()))?;

    let number: String = cleaned[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    number
        .trim_end_matches('.')
        .parse::<f64>()
        .map_err(|_| ParseError::NotANumber(text.to_string()))
}

/// Reduce a rename reply to a bare title.
pub fn clean_title_reply(raw: &str) -> Result<String, ParseError> {
    let line = raw
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or(ParseError::Empty)?;

    let title = line
        .trim_matches(|c| c == '"' || c == '\'' || c == '*')
        .trim_end_matches('.')
        .trim();

    if title.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON_REPLY: &str = r#"{"status": "ok", "title": "French Toast",
        "description": "Quick and sweet.",
        "ingredients": ["1 tbsp butter", " 2 tbsp milk "],
        "procedures": ["Soak the bread", "Fry it"],
        "image_prompt": "Golden toast on a plate"}"#;

    #[test]
    fn test_parse_json_reply() {
        let recipe = parse_recipe_reply(JSON_REPLY).unwrap();
        assert_eq!(recipe.title, "French Toast");
        assert_eq!(recipe.ingredients, vec!["1 tbsp butter", "2 tbsp milk"]);
        assert_eq!(recipe.procedures, vec!["Soak the bread", "Fry it"]);
        assert_eq!(recipe.image_prompt, "Golden toast on a plate");
    }

    #[test]
    fn test_json_and_delimited_agree() {
        let delimited = "French Toast;Quick and sweet.;1 tbsp butter|2 tbsp milk;\
                         Soak the bread|Fry it;Golden toast on a plate";
        assert_eq!(
            parse_recipe_reply(JSON_REPLY).unwrap(),
            parse_recipe_reply(delimited).unwrap()
        );
    }

    #[test]
    fn test_parse_fenced_json() {
        let fenced = format!("```json\n{}\n```", JSON_REPLY);
        assert_eq!(parse_recipe_reply(&fenced).unwrap().title, "French Toast");
    }

    #[test]
    fn test_delimited_comma_lists() {
        let recipe = parse_recipe_reply("T;D;egg, milk ,;stir,bake;a cake").unwrap();
        assert_eq!(recipe.ingredients, vec!["egg", "milk"]);
        assert_eq!(recipe.procedures, vec!["stir", "bake"]);
    }

    #[test]
    fn test_declined_replies() {
        assert_eq!(parse_recipe_reply("0;0;0;0;0"), Err(ParseError::Declined));
        assert_eq!(parse_recipe_reply(" 0 ; 0;0;0 ;0\n"), Err(ParseError::Declined));
        assert_eq!(
            parse_recipe_reply(r#"{"status": "unable"}"#),
            Err(ParseError::Declined)
        );
        assert_eq!(
            parse_recipe_reply(
                r#"{"title": "0", "description": "0", "ingredients": ["0"],
                    "procedures": "0", "image_prompt": "0"}"#
            ),
            Err(ParseError::Declined)
        );
    }

    #[test]
    fn test_wrong_field_counts() {
        assert_eq!(
            parse_recipe_reply("a;b;c;d"),
            Err(ParseError::FieldCount { expected: 5, found: 4 })
        );
        assert_eq!(
            parse_recipe_reply("a;b;c;d;e;f"),
            Err(ParseError::FieldCount { expected: 5, found: 6 })
        );
        assert_eq!(
            parse_recipe_reply("just some prose"),
            Err(ParseError::FieldCount { expected: 5, found: 1 })
        );
    }

    #[test]
    fn test_empty_and_bad_json() {
        assert_eq!(parse_recipe_reply("   \n"), Err(ParseError::Empty));
        assert!(matches!(
            parse_recipe_reply("{not json"),
            Err(ParseError::InvalidJson(_))
        ));
        assert_eq!(
            parse_recipe_reply(r#"{"status": "ok", "description": "x"}"#),
            Err(ParseError::MissingField("title".to_string()))
        );
    }

    fn missing(field: &str) -> Result<GeneratedRecipe, ParseError> {
        Err(ParseError::MissingField(field.to_string()))
    }

    #[test]
    fn test_incomplete_replies_are_rejected() {
        assert_eq!(
            parse_recipe_reply(r#"{"title": "Toast", "image_prompt": "p"}"#),
            missing("description")
        );
        assert_eq!(parse_recipe_reply("Toast;;;;p"), missing("description"));
        assert_eq!(parse_recipe_reply("Toast;D;;stir;p"), missing("ingredients"));
        assert_eq!(parse_recipe_reply("Toast;D;egg;  ;p"), missing("procedures"));
        assert_eq!(
            parse_recipe_reply(
                r#"{"title": "Toast", "description": "D", "ingredients": [" "],
                    "procedures": ["stir"], "image_prompt": "p"}"#
            ),
            missing("ingredients")
        );
    }

    #[test]
    fn test_partial_markers_are_rejected() {
        assert_eq!(parse_recipe_reply("Toast;0;0;0;p"), missing("description"));
        assert_eq!(parse_recipe_reply("0;0;0;0;p"), missing("title"));
        assert_eq!(parse_recipe_reply("Toast;D;egg;stir;0"), missing("image_prompt"));
        assert_eq!(
            parse_recipe_reply(
                r#"{"title": "Toast", "description": "D", "ingredients": "egg",
                    "procedures": ["0"], "image_prompt": "p"}"#
            ),
            missing("procedures")
        );
    }

    #[test]
    fn test_image_prompt_may_be_absent() {
        let recipe = parse_recipe_reply(
            r#"{"title": "Salad", "description": "Crisp", "ingredients": ["lettuce"],
                "procedures": ["toss"], "image_prompt": null}"#,
        )
        .unwrap();
        assert!(recipe.image_prompt.is_empty());
    }

    #[test]
    fn test_parse_nutrition_json() {
        let facts = parse_nutrition_reply(
            r#"{"totalfat": " 12 g", "saturatedfat": "4 g", "transfat": "0 g",
                "cholesterol": "370 mg", "sodium": "480 mg", "totalcarbs": "30 g",
                "dietaryfiber": "2 g", "totalsugar": "5 g", "addedsugar": "1 g",
                "protein": "18 g", "calories": "320 cal\n"}"#,
        )
        .unwrap();
        assert_eq!(facts.totalfat, "12 g");
        assert_eq!(facts.calories, "320 cal");
        assert_eq!(facts.protein, "18 g");
    }

    #[test]
    fn test_parse_nutrition_delimited() {
        let facts =
            parse_nutrition_reply("1 g;2 g;3 g;4 mg;5 mg;6 g;7 g;8 g;9 g;10 g; 110 cal ").unwrap();
        assert_eq!(facts.totalfat, "1 g");
        assert_eq!(facts.sodium, "5 mg");
        assert_eq!(facts.calories, "110 cal");

        assert_eq!(
            parse_nutrition_reply("1 g;2 g"),
            Err(ParseError::FieldCount { expected: 11, found: 2 })
        );
    }

    #[test]
    fn test_parse_nutrition_missing_key() {
        assert_eq!(
            parse_nutrition_reply(r#"{"totalfat": "1 g"}"#),
            Err(ParseError::MissingField("saturatedfat".to_string()))
        );
    }

    #[test]
    fn test_parse_cost() {
        assert_eq!(parse_cost_reply("4.50").unwrap(), 4.5);
        assert_eq!(parse_cost_reply("About $1,234.75 total.").unwrap(), 1234.75);
        assert_eq!(parse_cost_reply("12.").unwrap(), 12.0);
        assert!(matches!(
            parse_cost_reply("no idea"),
            Err(ParseError::NotANumber(_))
        ));
        assert_eq!(parse_cost_reply(""), Err(ParseError::Empty));
    }

    #[test]
    fn test_clean_title() {
        assert_eq!(
            clean_title_reply("\n\"Golden Morning Toast.\"\n").unwrap(),
            "Golden Morning Toast"
        );
        assert_eq!(clean_title_reply("**Bold Bites**").unwrap(), "Bold Bites");
        assert_eq!(clean_title_reply("  \n "), Err(ParseError::Empty));
    }
}
