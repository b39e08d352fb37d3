//! Image generation provider abstraction.
//!
//! Backends take a short description and return raw image bytes. Validation,
//! persistence and cropping live in [`crate::image`].

mod fake;
pub mod pollinations;
mod worker;

pub use fake::FakeImageGenerator;
pub use pollinations::PollinationsGenerator;
pub use worker::WorkerGenerator;

use crate::image::MAX_FILE_SIZE;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageGenError {
    #[error("Image request failed: {0}")]
    RequestFailed(String),

    #[error("Image provider returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Provider did not return an image, got content type {0:?}")]
    NotAnImage(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Image body exceeds {max} bytes")]
    TooLarge { max: usize },
}

/// Raw bytes returned by an image provider.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub data: Vec<u8>,
    /// Content type as reported by the provider.
    pub content_type: String,
}

#[async_trait]
pub trait ImageGenerator: Send + Sync + fmt::Debug {
    /// Generate an image from a text description.
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ImageGenError>;

    /// Get the provider name (e.g., "pollinations", "worker", "fake").
    fn provider_name(&self) -> &'static str;
}

/// Read an image response, rejecting non-2xx statuses and non-image bodies.
pub(crate) async fn read_image_response(
    mut response: reqwest::Response,
) -> Result<GeneratedImage, ImageGenError> {
    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !(200..300).contains(&status) {
        let message = response.text().await.unwrap_or_default();
        return Err(ImageGenError::ApiError {
            status,
            message: crate::llm::snippet(&message),
        });
    }

    // A missing header is tolerated; the bytes are format-checked before saving
    if !content_type.is_empty() && !content_type.contains("image") {
        return Err(ImageGenError::NotAnImage(content_type));
    }

    check_declared_size(response.content_length(), MAX_FILE_SIZE)?;

    // Content-Length can be absent or wrong, so the limit also applies while reading
    let mut data = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| ImageGenError::RequestFailed(e.to_string()))?
    {
        append_within_limit(&mut data, &chunk, MAX_FILE_SIZE)?;
    }

    Ok(GeneratedImage { data, content_type })
}

fn check_declared_size(content_length: Option<u64>, max: usize) -> Result<(), ImageGenError> {
    match content_length {
        Some(len) if len > max as u64 => Err(ImageGenError::TooLarge { max }),
        _ => Ok(()),
    }
}

fn append_within_limit(data: &mut Vec<u8>, chunk: &[u8], max: usize) -> Result<(), ImageGenError> {
    if data.len() + chunk.len() > max {
        return Err(ImageGenError::TooLarge { max });
    }
    data.extend_from_slice(chunk);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_size_over_limit_is_rejected() {
        assert!(check_declared_size(None, 10).is_ok());
        assert!(check_declared_size(Some(10), 10).is_ok());
        assert!(matches!(
            check_declared_size(Some(11), 10),
            Err(ImageGenError::TooLarge { max: 10 })
        ));
        assert!(matches!(
            check_declared_size(Some(MAX_FILE_SIZE as u64 + 1), MAX_FILE_SIZE),
            Err(ImageGenError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_body_stops_at_limit() {
        let mut data = Vec::new();
        append_within_limit(&mut data, &[0; 6], 10).unwrap();
        append_within_limit(&mut data, &[0; 4], 10).unwrap();
        assert!(matches!(
            append_within_limit(&mut data, &[0; 1], 10),
            Err(ImageGenError::TooLarge { max: 10 })
        ));
        assert_eq!(data.len(), 10);
    }
}
