//! Prompt asking for a replacement title when one is already taken.

pub const RENAME_PROMPT_NAME: &str = "rename";

pub fn render_rename_prompt(old_title: &str) -> String {
    format!(
        "Please generate a new, different-sounding title for this recipe. \
         Give your response as just the title. The old name is: {}",
        old_title
    )
}
