//! EduArt Generation Service
//!
//! Thin client for the hosted text and image generation API:
//! - Gemini implementation over `reqwest`
//! - Deterministic mock for tests and offline use
//!
//! Callers treat failures as opaque: a `GenerationError` is shown as an
//! inline message and the user may retry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod gemini;
pub mod mock;

/// Text returned when the service answers without any text part
pub const EMPTY_RESPONSE_FALLBACK: &str = "No s'ha pogut generar el contingut.";

/// Title used for a citation that carries no title
pub const UNTITLED_SOURCE: &str = "Font Web";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Generation configuration error: {0}")]
    Configuration(String),

    #[error("Generation request failed: {0}")]
    Request(String),

    #[error("Generation service error: {0}")]
    Response(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("No generated image found in response")]
    NoImage,
}

/// An image sent to or received from the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineImage {
    pub mime: String,
    pub data: Vec<u8>,
}

impl InlineImage {
    pub fn new(mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            data,
        }
    }
}

/// Text generation (lesson plans, rubrics, heritage activities, challenges,
/// and artwork feedback when a reference image is attached)
#[derive(Debug, Clone, Default)]
pub struct TextRequest {
    pub prompt: String,
    pub system_instruction: Option<String>,
    pub temperature: Option<f32>,
    pub reference_image: Option<InlineImage>,
}

impl TextRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_reference_image(mut self, image: InlineImage) -> Self {
        self.reference_image = Some(image);
        self
    }
}

/// Image generation, optionally guided by a reference image
#[derive(Debug, Clone, Default)]
pub struct ImageRequest {
    pub prompt: String,
    pub reference_image: Option<InlineImage>,
    pub aspect_ratio: Option<String>,
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_reference_image(mut self, image: InlineImage) -> Self {
        self.reference_image = Some(image);
        self
    }

    /// Width:height, e.g. `"1:1"`
    pub fn with_aspect_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.aspect_ratio = Some(ratio.into());
        self
    }
}

/// Search-grounded synthesis
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub prompt: String,
}

impl SearchRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// A web source cited by a grounded answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub content: String,
    pub sources: Vec<Source>,
}

impl SearchResult {
    /// Markdown body with the sources appended as a list
    pub fn to_markdown(&self) -> String {
        if self.sources.is_empty() {
            return self.content.clone();
        }
        let links: Vec<String> = self
            .sources
            .iter()
            .map(|s| format!("- [{}]({})", s.title, s.uri))
            .collect();
        format!("{}\n\n**Fonts:**\n{}", self.content, links.join("\n"))
    }
}

/// Generation service configuration
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Provider (gemini, mock)
    pub provider: String,
    pub api_key: String,
    pub base_url: Option<String>,
    pub text_model: String,
    pub vision_model: String,
    pub search_model: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            api_key: String::new(),
            base_url: None,
            text_model: "gemini-3-flash-preview".to_string(),
            vision_model: "gemini-2.5-flash-image".to_string(),
            search_model: "gemini-3-pro-preview".to_string(),
        }
    }
}

impl GenerationConfig {
    /// Create generation config from environment variables
    pub fn from_env() -> Result<Self, GenerationError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let provider = std::env::var("GENERATION_PROVIDER").unwrap_or(defaults.provider);
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .unwrap_or_default();

        if provider == "gemini" && api_key.is_empty() {
            return Err(GenerationError::Configuration(
                "GEMINI_API_KEY is required for the gemini provider".to_string(),
            ));
        }

        Ok(Self {
            provider,
            api_key,
            base_url: std::env::var("GEMINI_BASE_URL").ok(),
            text_model: std::env::var("GEMINI_TEXT_MODEL").unwrap_or(defaults.text_model),
            vision_model: std::env::var("GEMINI_VISION_MODEL").unwrap_or(defaults.vision_model),
            search_model: std::env::var("GEMINI_SEARCH_MODEL").unwrap_or(defaults.search_model),
        })
    }
}

/// Generation service trait for different implementations
#[async_trait::async_trait]
pub trait GenerationService: Send + Sync {
    /// Generate markdown text
    async fn generate_text(&self, request: TextRequest) -> Result<String, GenerationError>;

    /// Generate one image
    async fn generate_image(&self, request: ImageRequest) -> Result<InlineImage, GenerationError>;

    /// Answer with search grounding and return the cited sources
    async fn search(&self, request: SearchRequest) -> Result<SearchResult, GenerationError>;

    /// Provider name for logs
    fn provider(&self) -> &'static str;
}

/// Generation service factory
pub struct GenerationServiceFactory;

impl GenerationServiceFactory {
    /// Create generation service based on configuration
    pub fn create(
        config: GenerationConfig,
    ) -> Result<Box<dyn GenerationService>, GenerationError> {
        match config.provider.as_str() {
            "gemini" => {
                tracing::info!("Creating Gemini generation service");
                Ok(Box::new(gemini::GeminiService::new(config)?))
            }
            "mock" => {
                tracing::info!("Creating mock generation service");
                Ok(Box::new(mock::MockGenerationService::new()))
            }
            provider => Err(GenerationError::Configuration(format!(
                "Unknown generation provider: {}. Supported providers: gemini, mock",
                provider
            ))),
        }
    }
}
