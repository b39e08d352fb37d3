//! Image generation proxied through an intermediary worker.
//!
//! The worker accepts `POST {"prompt": ...}` with a bearer token and answers
//! with raw image bytes.

use super::{read_image_response, GeneratedImage, ImageGenError, ImageGenerator};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug)]
pub struct WorkerGenerator {
    url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct WorkerRequest<'a> {
    prompt: &'a str,
}

impl WorkerGenerator {
    pub fn new(url: String, api_key: String, timeout: Duration) -> Result<Self, ImageGenError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ImageGenError::NotConfigured(e.to_string()))?;
        Ok(Self {
            url,
            api_key,
            client,
        })
    }
}

#[async_trait]
impl ImageGenerator for WorkerGenerator {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ImageGenError> {
        tracing::debug!(url = %self.url, "Requesting image from worker");

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&WorkerRequest { prompt })
            .send()
            .await
            .map_err(|e| ImageGenError::RequestFailed(e.to_string()))?;

        read_image_response(response).await
    }

    fn provider_name(&self) -> &'static str {
        "worker"
    }
}
