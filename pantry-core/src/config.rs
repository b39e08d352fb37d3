//! Configuration from environment variables.
//!
//! Read once at start-up. Provider backends are then built from the
//! resulting [`PantryConfig`] with [`Providers::from_config`].

use crate::image::DEFAULT_CROP_BOTTOM_PX;
use crate::imagegen::{
    FakeImageGenerator, ImageGenerator, PollinationsGenerator, WorkerGenerator,
};
use crate::imagegen::pollinations::DEFAULT_POLLINATIONS_BASE_URL;
use crate::llm::gemini::DEFAULT_GEMINI_MODEL;
use crate::llm::openai::{DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
use crate::llm::{FakeProvider, GeminiProvider, LlmProvider, OpenAiCompatibleProvider};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_IMAGE_DIR: &str = "images";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: String, value: String },

    #[error("Could not build provider: {0}")]
    Provider(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextProviderKind {
    Fake,
    Gemini,
    OpenAi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageProviderKind {
    Fake,
    Pollinations,
    Worker,
}

/// What happens to a recipe when its image cannot be produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImagePolicy {
    /// The request fails and nothing is stored.
    #[default]
    Required,
    /// The recipe is stored without an image.
    BestEffort,
}

/// How a title already used by the same owner is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TitleStrategy {
    /// Store as `T (1)`, `T (2)`, ...
    #[default]
    Suffix,
    /// Ask the text provider for a new title once, then fall back to suffixing.
    AskProvider,
}

/// Behaviour switches for the recipe service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceConfig {
    pub image_policy: ImagePolicy,
    pub title_strategy: TitleStrategy,
    /// Serve another owner's image when the requested owner has none.
    pub image_lookup_fallback: bool,
}

#[derive(Debug, Clone)]
pub struct PantryConfig {
    pub text_provider: TextProviderKind,
    pub text_model: Option<String>,
    pub gemini_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub openai_base_url: String,
    pub image_provider: ImageProviderKind,
    pub image_worker_url: Option<String>,
    pub image_worker_key: Option<String>,
    pub http_timeout: Duration,
    pub image_dir: PathBuf,
    pub crop_bottom_px: u32,
    pub service: ServiceConfig,
}

impl PantryConfig {
    /// Load configuration from the process environment.
    ///
    /// All variables are optional; the defaults run fully offline with the
    /// fake providers. Keys become required only for the provider that
    /// needs them, checked in [`Providers::from_config`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let text_provider = match get("PANTRY_TEXT_PROVIDER").as_deref() {
            None | Some("fake") => TextProviderKind::Fake,
            Some("gemini") => TextProviderKind::Gemini,
            Some("openai") | Some("openrouter") => TextProviderKind::OpenAi,
            Some(other) => return Err(invalid("PANTRY_TEXT_PROVIDER", other)),
        };

        let image_provider = match get("PANTRY_IMAGE_PROVIDER").as_deref() {
            None | Some("fake") => ImageProviderKind::Fake,
            Some("pollinations") => ImageProviderKind::Pollinations,
            Some("worker") => ImageProviderKind::Worker,
            Some(other) => return Err(invalid("PANTRY_IMAGE_PROVIDER", other)),
        };

        let image_policy = match get("PANTRY_IMAGE_POLICY").as_deref() {
            None | Some("required") => ImagePolicy::Required,
            Some("best_effort") => ImagePolicy::BestEffort,
            Some(other) => return Err(invalid("PANTRY_IMAGE_POLICY", other)),
        };

        let title_strategy = match get("PANTRY_TITLE_STRATEGY").as_deref() {
            None | Some("suffix") => TitleStrategy::Suffix,
            Some("ask_provider") => TitleStrategy::AskProvider,
            Some(other) => return Err(invalid("PANTRY_TITLE_STRATEGY", other)),
        };

        let image_lookup_fallback = match get("PANTRY_IMAGE_LOOKUP_FALLBACK").as_deref() {
            None => false,
            Some(v) => v == "true" || v == "1",
        };

        let http_timeout_secs = parse_number(
            get("PANTRY_HTTP_TIMEOUT_SECS"),
            "PANTRY_HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;
        let crop_bottom_px = parse_number(
            get("PANTRY_CROP_BOTTOM_PX"),
            "PANTRY_CROP_BOTTOM_PX",
            DEFAULT_CROP_BOTTOM_PX,
        )?;

        Ok(Self {
            text_provider,
            text_model: get("PANTRY_TEXT_MODEL"),
            gemini_api_key: get("GEMINI_API_KEY"),
            openrouter_api_key: get("OPENROUTER_API_KEY"),
            openai_base_url: get("PANTRY_OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            image_provider,
            image_worker_url: get("PANTRY_IMAGE_WORKER_URL"),
            image_worker_key: get("PANTRY_IMAGE_WORKER_KEY"),
            http_timeout: Duration::from_secs(http_timeout_secs),
            image_dir: get("PANTRY_IMAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE_DIR)),
            crop_bottom_px,
            service: ServiceConfig {
                image_policy,
                title_strategy,
                image_lookup_fallback,
            },
        })
    }
}

fn invalid(var: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        var: var.to_string(),
        value: value.to_string(),
    }
}

fn parse_number<T: std::str::FromStr>(
    value: Option<String>,
    var: &str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| invalid(var, &v)),
    }
}

fn require(value: &Option<String>, var: &str) -> Result<String, ConfigError> {
    value
        .clone()
        .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
}

/// The text and image backends the service talks to.
#[derive(Debug, Clone)]
pub struct Providers {
    pub text: Arc<dyn LlmProvider>,
    pub image: Arc<dyn ImageGenerator>,
}

impl Providers {
    pub fn new(text: Arc<dyn LlmProvider>, image: Arc<dyn ImageGenerator>) -> Self {
        Self { text, image }
    }

    /// Offline backends with canned replies.
    pub fn fake() -> Self {
        Self::new(
            Arc::new(FakeProvider::default()),
            Arc::new(FakeImageGenerator::default()),
        )
    }

    pub fn from_config(config: &PantryConfig) -> Result<Self, ConfigError> {
        let text: Arc<dyn LlmProvider> = match config.text_provider {
            TextProviderKind::Fake => Arc::new(FakeProvider::default()),
            TextProviderKind::Gemini => Arc::new(
                GeminiProvider::new(
                    require(&config.gemini_api_key, "GEMINI_API_KEY")?,
                    config
                        .text_model
                        .clone()
                        .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                    config.http_timeout,
                )
                .map_err(|e| ConfigError::Provider(e.to_string()))?,
            ),
            TextProviderKind::OpenAi => Arc::new(
                OpenAiCompatibleProvider::new(
                    require(&config.openrouter_api_key, "OPENROUTER_API_KEY")?,
                    config
                        .text_model
                        .clone()
                        .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                    config.openai_base_url.clone(),
                    config.http_timeout,
                )
                .map_err(|e| ConfigError::Provider(e.to_string()))?,
            ),
        };

        let image: Arc<dyn ImageGenerator> = match config.image_provider {
            ImageProviderKind::Fake => Arc::new(FakeImageGenerator::default()),
            ImageProviderKind::Pollinations => Arc::new(
                PollinationsGenerator::new(DEFAULT_POLLINATIONS_BASE_URL, config.http_timeout)
                    .map_err(|e| ConfigError::Provider(e.to_string()))?,
            ),
            ImageProviderKind::Worker => Arc::new(
                WorkerGenerator::new(
                    require(&config.image_worker_url, "PANTRY_IMAGE_WORKER_URL")?,
                    require(&config.image_worker_key, "PANTRY_IMAGE_WORKER_KEY")?,
                    config.http_timeout,
                )
                .map_err(|e| ConfigError::Provider(e.to_string()))?,
            ),
        };

        tracing::info!(
            text_provider = text.provider_name(),
            text_model = text.model_name(),
            image_provider = image.provider_name(),
            "Providers configured"
        );

        Ok(Self { text, image })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<PantryConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PantryConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.text_provider, TextProviderKind::Fake);
        assert_eq!(config.image_provider, ImageProviderKind::Fake);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.image_dir, PathBuf::from("images"));
        assert_eq!(config.crop_bottom_px, 60);
        assert_eq!(config.service, ServiceConfig::default());
        assert!(!config.service.image_lookup_fallback);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PANTRY_TEXT_PROVIDER", "gemini"),
            ("GEMINI_API_KEY", "k"),
            ("PANTRY_IMAGE_POLICY", "best_effort"),
            ("PANTRY_TITLE_STRATEGY", "ask_provider"),
            ("PANTRY_IMAGE_LOOKUP_FALLBACK", "true"),
            ("PANTRY_CROP_BOTTOM_PX", "0"),
        ])
        .unwrap();
        assert_eq!(config.text_provider, TextProviderKind::Gemini);
        assert_eq!(config.service.image_policy, ImagePolicy::BestEffort);
        assert_eq!(config.service.title_strategy, TitleStrategy::AskProvider);
        assert!(config.service.image_lookup_fallback);
        assert_eq!(config.crop_bottom_px, 0);

        let providers = Providers::from_config(&config).unwrap();
        assert_eq!(providers.text.provider_name(), "gemini");
        assert_eq!(providers.text.model_name(), DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[("PANTRY_IMAGE_POLICY", "sometimes")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config_from(&[("PANTRY_HTTP_TIMEOUT_SECS", "soon")]),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_missing_key_for_selected_provider() {
        let config = config_from(&[("PANTRY_TEXT_PROVIDER", "openai")]).unwrap();
        let err = Providers::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "OPENROUTER_API_KEY"));

        let config = config_from(&[("PANTRY_IMAGE_PROVIDER", "worker")]).unwrap();
        assert!(matches!(
            Providers::from_config(&config),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }
}
