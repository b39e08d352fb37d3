//! Fake image generator for tests and offline runs.

use super::{GeneratedImage, ImageGenError, ImageGenerator};
use async_trait::async_trait;
use image::{ImageBuffer, ImageFormat, Rgb};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Renders a solid-colour PNG, or fails on demand.
#[derive(Debug)]
pub struct FakeImageGenerator {
    width: u32,
    height: u32,
    fail_with: Option<String>,
    calls: AtomicUsize,
}

impl Default for FakeImageGenerator {
    fn default() -> Self {
        Self::new(256, 256)
    }
}

impl FakeImageGenerator {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fail_with: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// A generator whose every call fails with the given message.
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Number of generate calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Encode a solid PNG of the given size.
    pub fn render_png(width: u32, height: u32) -> Result<Vec<u8>, ImageGenError> {
        let img = ImageBuffer::from_pixel(width, height, Rgb([222u8, 164, 92]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| ImageGenError::RequestFailed(format!("Failed to encode image: {}", e)))?;
        Ok(buf.into_inner())
    }
}

#[async_trait]
impl ImageGenerator for FakeImageGenerator {
    async fn generate(&self, _prompt: &str) -> Result<GeneratedImage, ImageGenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.fail_with {
            return Err(ImageGenError::ApiError {
                status: 503,
                message: message.clone(),
            });
        }

        Ok(GeneratedImage {
            data: Self::render_png(self.width, self.height)?,
            content_type: "image/png".to_string(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
