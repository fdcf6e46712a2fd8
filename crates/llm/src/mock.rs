//! Mock Generation Service Implementation
//!
//! Used by `GenerationServiceFactory` when provider is `"mock"`.
//! Returns deterministic responses for testing, or always fails when built
//! with `failing()`. Every request is captured so callers can inspect what
//! was sent.

use std::sync::{Arc, Mutex};

use crate::{
    GenerationError, GenerationService, ImageRequest, InlineImage, SearchRequest, SearchResult,
    Source, TextRequest,
};

/// Bytes of the image returned by the mock
pub const MOCK_IMAGE_BYTES: &[u8] = b"mock-image";

/// Request received by the mock service
#[derive(Debug, Clone)]
pub enum CapturedRequest {
    Text(TextRequest),
    Image(ImageRequest),
    Search(SearchRequest),
}

/// Mock generation service for testing
#[derive(Debug, Clone, Default)]
pub struct MockGenerationService {
    failure: Option<GenerationError>,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockGenerationService {
    /// Create a new mock generation service
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock whose every call fails with `error`
    pub fn failing(error: GenerationError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// All requests received, oldest first
    pub fn captured_requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent text request, if any
    pub fn last_text_request(&self) -> Option<TextRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find_map(|request| match request {
                CapturedRequest::Text(text) => Some(text.clone()),
                _ => None,
            })
    }

    /// The most recent image request, if any
    pub fn last_image_request(&self) -> Option<ImageRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find_map(|request| match request {
                CapturedRequest::Image(image) => Some(image.clone()),
                _ => None,
            })
    }

    fn capture(&self, request: CapturedRequest) {
        self.requests.lock().unwrap().push(request);
    }

    fn check(&self) -> Result<(), GenerationError> {
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl GenerationService for MockGenerationService {
    async fn generate_text(&self, request: TextRequest) -> Result<String, GenerationError> {
        self.capture(CapturedRequest::Text(request.clone()));
        self.check()?;
        tracing::info!("Mock generation service processing text request");

        let mut content = format!("Mock response to: {}", request.prompt);
        if let Some(image) = &request.reference_image {
            content.push_str(&format!(" [with {} image]", image.mime));
        }
        Ok(content)
    }

    async fn generate_image(&self, request: ImageRequest) -> Result<InlineImage, GenerationError> {
        self.capture(CapturedRequest::Image(request.clone()));
        self.check()?;
        tracing::info!(prompt = %request.prompt, "Mock generation service processing image request");
        Ok(InlineImage::new("image/png", MOCK_IMAGE_BYTES.to_vec()))
    }

    async fn search(&self, request: SearchRequest) -> Result<SearchResult, GenerationError> {
        self.capture(CapturedRequest::Search(request.clone()));
        self.check()?;
        Ok(SearchResult {
            content: format!("Mock search result for: {}", request.prompt),
            sources: vec![Source {
                title: "Mock Source".to_string(),
                uri: "https://example.org/mock".to_string(),
            }],
        })
    }

    fn provider(&self) -> &'static str {
        "mock"
    }
}
