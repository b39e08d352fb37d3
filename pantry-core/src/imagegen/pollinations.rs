//! Pollinations image generation (prompt encoded in the URL path).

use super::{read_image_response, GeneratedImage, ImageGenError, ImageGenerator};
use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

pub const DEFAULT_POLLINATIONS_BASE_URL: &str = "https://image.pollinations.ai";

#[derive(Debug)]
pub struct PollinationsGenerator {
    base_url: String,
    client: reqwest::Client,
}

impl PollinationsGenerator {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ImageGenError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ImageGenError::NotConfigured(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Build the request URL for a prompt.
    ///
    /// Spaces become dashes and a random suffix is appended so identical
    /// prompts are not served from the provider's cache.
    fn prompt_url(&self, prompt: &str) -> Result<reqwest::Url, ImageGenError> {
        let segment = format!("{}{}", prompt, Uuid::new_v4()).replace(' ', "-");

        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ImageGenError::NotConfigured(format!("Invalid base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ImageGenError::NotConfigured("Base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .push("prompt")
            .push(&segment);
        Ok(url)
    }
}

#[async_trait]
impl ImageGenerator for PollinationsGenerator {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ImageGenError> {
        let url = self.prompt_url(prompt)?;
        tracing::debug!(url = %url, "Requesting Pollinations image");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImageGenError::RequestFailed(e.to_string()))?;

        read_image_response(response).await
    }

    fn provider_name(&self) -> &'static str {
        "pollinations"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_url_dashes_and_escapes() {
        let generator =
            PollinationsGenerator::new(DEFAULT_POLLINATIONS_BASE_URL, Duration::from_secs(5))
                .unwrap();
        let url = generator.prompt_url("a bowl of soup/stew").unwrap();
        let path = url.path();

        assert!(path.starts_with("/prompt/a-bowl-of-soup%2Fstew"));
        assert!(!path.contains(' '));
        // A UUID (36 chars) was appended
        assert!(path.len() >= "/prompt/a-bowl-of-soup%2Fstew".len() + 36);
    }

    #[test]
    fn test_prompt_url_is_unique_per_call() {
        let generator =
            PollinationsGenerator::new(DEFAULT_POLLINATIONS_BASE_URL, Duration::from_secs(5))
                .unwrap();
        let a = generator.prompt_url("toast").unwrap();
        let b = generator.prompt_url("toast").unwrap();
        assert_ne!(a, b);
    }
}
