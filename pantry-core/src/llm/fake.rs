//! Deterministic text provider for tests and offline runs.
//!
//! Replies are picked by substring match against the prompt, so the whole
//! generation flow can run without a network or an API key.

use super::{ChatRequest, ChatResponse, LlmError, LlmProvider, Usage};
use async_trait::async_trait;
use std::sync::RwLock;

/// Canned-reply provider.
///
/// Rules are checked in the order they were added and compared
/// case-insensitively. Without a match the fallback reply is used, or the
/// request fails when there is none.
#[derive(Debug)]
pub struct FakeProvider {
    rules: RwLock<Vec<(String, String)>>,
    fallback: Option<String>,
    received: RwLock<Vec<String>>,
}

impl Default for FakeProvider {
    /// Canned replies for every prompt the crate sends, so an unconfigured
    /// deployment still produces something usable.
    fn default() -> Self {
        Self::with_standard_responses()
    }
}

impl FakeProvider {
    /// A provider with no rules and no fallback.
    pub fn new() -> Self {
        Self {
            rules: RwLock::new(Vec::new()),
            fallback: None,
            received: RwLock::new(Vec::new()),
        }
    }

    pub fn with_response(needle: &str, reply: &str) -> Self {
        let provider = Self::new();
        provider.add_response(needle, reply);
        provider
    }

    /// Answer `reply` to any prompt containing `needle`.
    pub fn add_response(&self, needle: &str, reply: &str) {
        if let Ok(mut rules) = self.rules.write() {
            rules.push((needle.to_lowercase(), reply.to_string()));
        }
    }

    /// Reply used when no rule matches.
    pub fn with_default_response(mut self, reply: &str) -> Self {
        self.fallback = Some(reply.to_string());
        self
    }

    /// Number of requests served so far.
    pub fn call_count(&self) -> usize {
        self.received.read().map(|r| r.len()).unwrap_or(0)
    }

    /// Prompts received so far.
    pub fn received_prompts(&self) -> Vec<String> {
        self.received.read().map(|r| r.clone()).unwrap_or_default()
    }

    /// Create a FakeProvider with responses for each prompt template.
    pub fn with_standard_responses() -> Self {
        let provider = Self::new();

        // Matched on phrases unique to each template; the rename and cost
        // prompts are checked first because they are the shortest.
        provider.add_response("new, different-sounding title", "Golden Morning Toast");

        provider.add_response("price in US dollars", "4.50");

        provider.add_response(
            "nutrition facts",
            r#"{"totalfat": "12 g", "saturatedfat": "4 g", "transfat": "0 g",
                "cholesterol": "370 mg", "sodium": "480 mg", "totalcarbs": "30 g",
                "dietaryfiber": "2 g", "totalsugar": "5 g", "addedsugar": "1 g",
                "protein": "18 g", "calories": "320 cal"}"#,
        );

        provider.add_response(
            "photo of a food item",
            r#"{"status": "ok", "title": "Garden Salad",
                "description": "A crisp salad, ready in 10 minutes, serves 2.",
                "ingredients": ["1 head lettuce", "2 tomatoes", "2 tbsp olive oil"],
                "procedures": ["Wash the lettuce", "Slice the tomatoes", "Toss with olive oil"],
                "image_prompt": null}"#,
        );

        provider.add_response(
            "ingredients the user has at home",
            r#"{"status": "ok", "title": "French Toast",
                "description": "Soft, custardy toast ready in 10 minutes for one.",
                "ingredients": ["1 tbsp butter", "1 tsp cinnamon", "2 tbsp milk"],
                "procedures": ["Whisk the egg with milk and cinnamon", "Soak the bread", "Fry in butter until golden"],
                "image_prompt": "A plate with two golden slices of toast dusted with cinnamon"}"#,
        );

        provider
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        let prompt = request.prompt_text();
        if let Ok(mut received) = self.received.write() {
            received.push(prompt.clone());
        }

        let rules = self
            .rules
            .read()
            .map_err(|_| LlmError::RequestFailed("FakeProvider lock poisoned".to_string()))?;

        let lowered = prompt.to_lowercase();
        let reply = rules
            .iter()
            .find(|(needle, _)| lowered.contains(needle.as_str()))
            .map(|(_, reply)| reply)
            .or(self.fallback.as_ref());

        match reply {
            Some(content) => Ok(ChatResponse {
                content: content.clone(),
                usage: Usage::default(),
            }),
            None => Err(LlmError::RequestFailed(format!(
                "no canned reply for prompt starting {:?}",
                prompt.chars().take(80).collect::<String>()
            ))),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}
