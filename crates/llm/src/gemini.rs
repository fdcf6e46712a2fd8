//! Gemini API Implementation
//!
//! Calls the Gemini `generateContent` endpoint
//! (https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent)
//! using reqwest HTTP client.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    GenerationConfig, GenerationError, GenerationService, ImageRequest, InlineImage,
    SearchRequest, SearchResult, Source, TextRequest, EMPTY_RESPONSE_FALLBACK, UNTITLED_SOURCE,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_IMAGE_PROMPT: &str = "Generate an artistic image.";
const DEFAULT_ASPECT_RATIO: &str = "1:1";

/// generateContent request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<ContentBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ContentBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationSettings>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct ContentBody {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: serde_json::Value,
}

/// generateContent response body
#[derive(Debug, Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: ContentBody,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

/// Gemini API error response
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    status: String,
    message: String,
}

fn text_part(text: &str) -> Part {
    Part {
        text: Some(text.to_string()),
        inline_data: None,
    }
}

fn image_part(image: &InlineImage) -> Part {
    Part {
        text: None,
        inline_data: Some(InlineData {
            mime_type: image.mime.clone(),
            data: STANDARD.encode(&image.data),
        }),
    }
}

fn text_body(request: &TextRequest) -> GenerateRequest {
    let mut parts = Vec::new();
    if let Some(image) = &request.reference_image {
        parts.push(image_part(image));
    }
    parts.push(text_part(&request.prompt));

    GenerateRequest {
        contents: vec![ContentBody { parts }],
        system_instruction: request.system_instruction.as_deref().map(|s| ContentBody {
            parts: vec![text_part(s)],
        }),
        generation_config: request.temperature.map(|t| GenerationSettings {
            temperature: Some(t),
            image_config: None,
        }),
        tools: Vec::new(),
    }
}

fn image_body(request: &ImageRequest) -> GenerateRequest {
    let mut parts = Vec::new();
    // Reference image goes first, as for image editing
    if let Some(image) = &request.reference_image {
        parts.push(image_part(image));
    }
    let prompt = if request.prompt.trim().is_empty() {
        DEFAULT_IMAGE_PROMPT
    } else {
        request.prompt.as_str()
    };
    parts.push(text_part(prompt));

    GenerateRequest {
        contents: vec![ContentBody { parts }],
        system_instruction: None,
        generation_config: Some(GenerationSettings {
            temperature: None,
            image_config: Some(ImageConfig {
                aspect_ratio: request
                    .aspect_ratio
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ASPECT_RATIO.to_string()),
            }),
        }),
        tools: Vec::new(),
    }
}

fn search_body(request: &SearchRequest) -> GenerateRequest {
    GenerateRequest {
        contents: vec![ContentBody {
            parts: vec![text_part(&request.prompt)],
        }],
        system_instruction: None,
        generation_config: None,
        tools: vec![Tool {
            google_search: serde_json::json!({}),
        }],
    }
}

/// Concatenated text parts of the first candidate, or the fallback message
fn extract_text(response: &GenerateResponse) -> String {
    let text = response
        .candidates
        .first()
        .map(|c| {
            c.content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        EMPTY_RESPONSE_FALLBACK.to_string()
    } else {
        text
    }
}

/// First inline image of the first candidate
fn extract_image(response: &GenerateResponse) -> Result<InlineImage, GenerationError> {
    let inline = response
        .candidates
        .first()
        .and_then(|c| c.content.parts.iter().find_map(|p| p.inline_data.as_ref()))
        .filter(|d| !d.data.is_empty())
        .ok_or(GenerationError::NoImage)?;

    let data = STANDARD
        .decode(&inline.data)
        .map_err(|e| GenerationError::Response(format!("Invalid image payload: {}", e)))?;

    Ok(InlineImage::new(inline.mime_type.clone(), data))
}

/// Web citations from grounding metadata; chunks without a URI are dropped
fn extract_sources(response: &GenerateResponse) -> Vec<Source> {
    response
        .candidates
        .first()
        .and_then(|c| c.grounding_metadata.as_ref())
        .map(|meta| {
            meta.grounding_chunks
                .iter()
                .filter_map(|chunk| chunk.web.as_ref())
                .filter_map(|web| {
                    web.uri.as_ref().map(|uri| Source {
                        title: web
                            .title
                            .clone()
                            .filter(|t| !t.is_empty())
                            .unwrap_or_else(|| UNTITLED_SOURCE.to_string()),
                        uri: uri.clone(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Gemini generation service implementation
pub struct GeminiService {
    client: Client,
    config: GenerationConfig,
    base_url: String,
}

impl GeminiService {
    /// Create a new Gemini service
    pub fn new(config: GenerationConfig) -> Result<Self, GenerationError> {
        if config.api_key.is_empty() {
            return Err(GenerationError::Configuration(
                "Gemini API key is empty".to_string(),
            ));
        }

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            client: Client::new(),
            config,
            base_url,
        })
    }

    async fn generate(
        &self,
        model: &str,
        body: &GenerateRequest,
    ) -> Result<GenerateResponse, GenerationError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        );

        tracing::debug!(model = %model, "Sending Gemini API request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| GenerationError::Request(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GenerationError::RateLimit);
        }

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());

            // Try to parse as API error
            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_body) {
                return Err(GenerationError::Response(format!(
                    "Gemini API error ({}): {}",
                    error_response.error.status, error_response.error.message
                )));
            }

            return Err(GenerationError::Response(format!(
                "Gemini API returned {}: {}",
                status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| GenerationError::Response(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait::async_trait]
impl GenerationService for GeminiService {
    async fn generate_text(&self, request: TextRequest) -> Result<String, GenerationError> {
        // Feedback on an uploaded artwork needs the vision model
        let model = if request.reference_image.is_some() {
            &self.config.vision_model
        } else {
            &self.config.text_model
        };
        let response = self.generate(model, &text_body(&request)).await?;
        Ok(extract_text(&response))
    }

    async fn generate_image(&self, request: ImageRequest) -> Result<InlineImage, GenerationError> {
        let response = self
            .generate(&self.config.vision_model, &image_body(&request))
            .await?;
        extract_image(&response)
    }

    async fn search(&self, request: SearchRequest) -> Result<SearchResult, GenerationError> {
        let response = self
            .generate(&self.config.search_model, &search_body(&request))
            .await?;

        let sources = extract_sources(&response);
        tracing::debug!(sources = sources.len(), "Grounded search completed");

        Ok(SearchResult {
            content: extract_text(&response),
            sources,
        })
    }

    fn provider(&self) -> &'static str {
        "gemini"
    }
}
