//! Image validation, persistence and post-processing.
//!
//! Generated images and uploaded photos both land on disk under the configured
//! image directory. Bytes are format-checked from their magic numbers before
//! anything is written.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, ImageReader};
use thiserror::Error;
use uuid::Uuid;

use crate::imagegen::{ImageGenError, ImageGenerator};

/// Allowed image formats.
pub const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Maximum file size for images (10MB).
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Pixels trimmed from the bottom of generated images (provider watermark).
pub const DEFAULT_CROP_BOTTOM_PX: u32 = 60;

/// Subdirectory for uploaded photos.
pub const UPLOADS_DIR: &str = "uploads";

#[derive(Debug, Error)]
pub enum ImageError {
    #[error(transparent)]
    Generation(#[from] ImageGenError),

    #[error("Image too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("{0}")]
    InvalidFormat(String),

    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum CropError {
    #[error("Cannot crop {pixels} pixels from an image {height} pixels tall")]
    TooShort { height: u32, pixels: u32 },

    #[error("Could not read image file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// Validate image data: check format is allowed and detect it.
pub fn validate_image(data: &[u8]) -> Result<ImageFormat, ImageError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ImageError::InvalidFormat(format!("Failed to read image: {}", e)))?;

    let format = reader
        .format()
        .ok_or_else(|| ImageError::InvalidFormat("Could not detect image format".to_string()))?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(ImageError::InvalidFormat(format!(
            "Unsupported image format: {:?}. Allowed: JPEG, PNG, GIF, WebP",
            format
        )));
    }

    Ok(format)
}

/// File extension used when saving an image of this format.
pub fn extension_for(format: ImageFormat) -> &'static str {
    format.extensions_str().first().copied().unwrap_or("img")
}

/// MIME type for a stored image path, from its extension.
pub fn content_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "image/png",
    }
}

/// Make a string safe to use as a single path component.
pub fn sanitize_for_filesystem(s: &str) -> String {
    let cleaned: String = s
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else if c == '.' {
                '.'
            } else {
                '_'
            }
        })
        .take(100)
        .collect();

    // Never produce "." / ".." or an empty name
    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Trim `pixels` rows from the bottom of the image at `path`, saving in place.
///
/// Returns the new (width, height). Applying it twice trims twice; an image
/// no taller than `pixels` is left untouched and reported as `TooShort`.
pub fn crop_bottom(path: &Path, pixels: u32) -> Result<(u32, u32), CropError> {
    let data = fs::read(path)?;

    let reader = ImageReader::new(Cursor::new(&data))
        .with_guessed_format()
        .map_err(|e| CropError::Decode(e.to_string()))?;
    let format = reader
        .format()
        .ok_or_else(|| CropError::Decode("Could not detect image format".to_string()))?;
    let img = reader
        .decode()
        .map_err(|e| CropError::Decode(e.to_string()))?;

    let (width, height) = (img.width(), img.height());
    if height <= pixels {
        return Err(CropError::TooShort { height, pixels });
    }

    let cropped = img.crop_imm(0, 0, width, height - pixels);

    // JPEG has no alpha channel
    let cropped = if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(cropped.to_rgb8())
    } else {
        cropped
    };

    let mut buf = Cursor::new(Vec::new());
    cropped
        .write_to(&mut buf, format)
        .map_err(|e| CropError::Encode(e.to_string()))?;
    fs::write(path, buf.into_inner())?;

    Ok((cropped.width(), cropped.height()))
}

/// Fetches generated images and stores them under the image directory.
#[derive(Debug, Clone)]
pub struct ImageAcquirer {
    generator: Arc<dyn ImageGenerator>,
    image_dir: PathBuf,
    crop_bottom_px: u32,
}

impl ImageAcquirer {
    pub fn new(generator: Arc<dyn ImageGenerator>, image_dir: PathBuf, crop_bottom_px: u32) -> Self {
        Self {
            generator,
            image_dir,
            crop_bottom_px,
        }
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// Generate an image for `prompt` and save it under `{image_dir}/{subdir}/`.
    ///
    /// `subdir` is sanitized; pass `None` to save directly in the image
    /// directory. A failed crop is logged and the uncropped file kept.
    pub async fn acquire(&self, prompt: &str, subdir: Option<&str>) -> Result<PathBuf, ImageError> {
        let generated = self.generator.generate(prompt).await?;

        if generated.data.len() > MAX_FILE_SIZE {
            return Err(ImageError::TooLarge {
                size: generated.data.len(),
                max: MAX_FILE_SIZE,
            });
        }

        let format = validate_image(&generated.data)?;

        let dir = match subdir {
            Some(name) => self.image_dir.join(sanitize_for_filesystem(name)),
            None => self.image_dir.clone(),
        };
        fs::create_dir_all(&dir)?;

        let path = dir.join(format!("{}.{}", Uuid::new_v4(), extension_for(format)));
        fs::write(&path, &generated.data)?;

        tracing::info!(
            path = %path.display(),
            provider = self.generator.provider_name(),
            content_type = %generated.content_type,
            "Image saved"
        );

        if self.crop_bottom_px > 0 {
            if let Err(e) = crop_bottom(&path, self.crop_bottom_px) {
                tracing::warn!(path = %path.display(), error = %e, "Image crop skipped");
            }
        }

        Ok(path)
    }

    /// Validate and store an uploaded photo under `{image_dir}/uploads/`.
    ///
    /// Returns the saved path and the detected MIME type.
    pub fn save_upload(&self, file_name: &str, data: &[u8]) -> Result<(PathBuf, String), ImageError> {
        if data.len() > MAX_FILE_SIZE {
            return Err(ImageError::TooLarge {
                size: data.len(),
                max: MAX_FILE_SIZE,
            });
        }

        let format = validate_image(data)?;

        let dir = self.image_dir.join(UPLOADS_DIR);
        fs::create_dir_all(&dir)?;

        let path = dir.join(format!(
            "{}_{}",
            Uuid::new_v4(),
            sanitize_for_filesystem(file_name)
        ));
        fs::write(&path, data)?;

        Ok((path, format.to_mime_type().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagegen::FakeImageGenerator;
    use tempfile::TempDir;

    fn write_png(dir: &Path, width: u32, height: u32) -> PathBuf {
        let path = dir.join("test.png");
        fs::write(&path, FakeImageGenerator::render_png(width, height).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_validate_invalid_format() {
        let invalid_data = b"not an image";
        assert!(validate_image(invalid_data).is_err());
    }

    #[test]
    fn test_validate_png() {
        let png = FakeImageGenerator::render_png(4, 4).unwrap();
        assert_eq!(validate_image(&png).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_crop_bottom_twice_shrinks_twice() {
        let dir = TempDir::new().unwrap();
        let path = write_png(dir.path(), 40, 200);

        assert_eq!(crop_bottom(&path, 60).unwrap(), (40, 140));
        assert_eq!(crop_bottom(&path, 60).unwrap(), (40, 80));

        let img = image::open(&path).unwrap();
        assert_eq!(img.height(), 80);
    }

    #[test]
    fn test_crop_bottom_too_short_leaves_file() {
        let dir = TempDir::new().unwrap();
        let path = write_png(dir.path(), 40, 60);
        let before = fs::read(&path).unwrap();

        let err = crop_bottom(&path, 60).unwrap_err();
        assert!(matches!(err, CropError::TooShort { height: 60, pixels: 60 }));
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_crop_bottom_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = crop_bottom(&dir.path().join("missing.png"), 10).unwrap_err();
        assert!(matches!(err, CropError::Io(_)));
    }

    #[test]
    fn test_sanitize_for_filesystem() {
        assert_eq!(sanitize_for_filesystem("French Toast"), "French_Toast");
        assert_eq!(sanitize_for_filesystem("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_for_filesystem(".."), "image");
        assert_eq!(sanitize_for_filesystem(""), "image");
    }

    #[test]
    fn test_content_type_for_path() {
        assert_eq!(content_type_for_path(Path::new("a/b.JPG")), "image/jpeg");
        assert_eq!(content_type_for_path(Path::new("a/b.png")), "image/png");
        assert_eq!(content_type_for_path(Path::new("a/b.webp")), "image/webp");
    }

    #[tokio::test]
    async fn test_acquire_saves_and_crops() {
        let dir = TempDir::new().unwrap();
        let acquirer = ImageAcquirer::new(
            Arc::new(FakeImageGenerator::new(64, 128)),
            dir.path().to_path_buf(),
            60,
        );

        let path = acquirer.acquire("toast", Some("French Toast")).await.unwrap();

        assert!(path.starts_with(dir.path().join("French_Toast")));
        assert_eq!(path.extension().unwrap(), "png");
        assert_eq!(image::open(&path).unwrap().height(), 68);
    }

    #[tokio::test]
    async fn test_acquire_keeps_uncropped_when_too_short() {
        let dir = TempDir::new().unwrap();
        let acquirer = ImageAcquirer::new(
            Arc::new(FakeImageGenerator::new(32, 32)),
            dir.path().to_path_buf(),
            60,
        );

        let path = acquirer.acquire("toast", None).await.unwrap();
        assert_eq!(image::open(&path).unwrap().height(), 32);
    }

    #[tokio::test]
    async fn test_acquire_propagates_provider_failure() {
        let dir = TempDir::new().unwrap();
        let acquirer = ImageAcquirer::new(
            Arc::new(FakeImageGenerator::failing("down")),
            dir.path().to_path_buf(),
            60,
        );

        let err = acquirer.acquire("toast", None).await.unwrap_err();
        assert!(matches!(err, ImageError::Generation(_)));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_save_upload_rejects_non_images() {
        let dir = TempDir::new().unwrap();
        let acquirer = ImageAcquirer::new(
            Arc::new(FakeImageGenerator::default()),
            dir.path().to_path_buf(),
            0,
        );

        assert!(matches!(
            acquirer.save_upload("notes.txt", b"hello"),
            Err(ImageError::InvalidFormat(_))
        ));

        let png = FakeImageGenerator::render_png(8, 8).unwrap();
        let (path, mime) = acquirer.save_upload("my photo.png", &png).unwrap();
        assert_eq!(mime, "image/png");
        assert!(path.starts_with(dir.path().join(UPLOADS_DIR)));
        assert!(path.to_string_lossy().ends_with("_my_photo.png"));
    }
}
