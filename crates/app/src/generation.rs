//! Role workflows and the generation call site
//!
//! Each workflow produces one artifact kind. Failures from the generation
//! service are turned into an inline message here and never propagate past
//! the caller.

use eduart_artifacts::{ArtifactKind, Content};
use eduart_common::UserRole;
use eduart_llm::{
    GenerationError, GenerationService, ImageRequest, InlineImage, SearchRequest, TextRequest,
};

const TEACHER_WORKFLOWS: &[ArtifactKind] = &[
    ArtifactKind::Lesson,
    ArtifactKind::Rubric,
    ArtifactKind::Heritage,
    ArtifactKind::Search,
];

const STUDENT_WORKFLOWS: &[ArtifactKind] = &[
    ArtifactKind::Analysis,
    ArtifactKind::Prompt,
    ArtifactKind::Image,
];

const LESSON_SYSTEM_INSTRUCTION: &str =
    "Ets un assistent pedagògic expert en el currículum valencià d'arts plàstiques.";

const IMAGE_ASPECT_RATIO: &str = "1:1";

/// Request settings a workflow applies on top of the user's prompt
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorkflowSettings {
    pub temperature: Option<f32>,
    pub system_instruction: Option<&'static str>,
}

/// Settings for the text workflows; lessons are the most constrained,
/// creative challenges the least
pub fn settings_for(kind: ArtifactKind) -> WorkflowSettings {
    match kind {
        ArtifactKind::Lesson => WorkflowSettings {
            temperature: Some(0.7),
            system_instruction: Some(LESSON_SYSTEM_INSTRUCTION),
        },
        ArtifactKind::Heritage => WorkflowSettings {
            temperature: Some(0.8),
            system_instruction: None,
        },
        ArtifactKind::Prompt => WorkflowSettings {
            temperature: Some(0.9),
            system_instruction: None,
        },
        _ => WorkflowSettings::default(),
    }
}

fn text_request(kind: ArtifactKind, prompt: &str) -> TextRequest {
    let settings = settings_for(kind);
    let mut request = TextRequest::new(prompt);
    if let Some(temperature) = settings.temperature {
        request = request.with_temperature(temperature);
    }
    if let Some(instruction) = settings.system_instruction {
        request = request.with_system_instruction(instruction);
    }
    request
}

/// Workflows offered to a role
pub fn workflows_for(role: UserRole) -> &'static [ArtifactKind] {
    match role {
        UserRole::Teacher => TEACHER_WORKFLOWS,
        UserRole::Student => STUDENT_WORKFLOWS,
        UserRole::None => &[],
    }
}

/// Run the workflow for `kind` and return content ready to save
pub async fn generate(
    service: &dyn GenerationService,
    kind: ArtifactKind,
    prompt: &str,
    reference: Option<InlineImage>,
) -> Result<Content, GenerationError> {
    tracing::info!(kind = %kind, provider = service.provider(), "Generating content");

    match kind {
        ArtifactKind::Image => {
            let mut request = ImageRequest::new(prompt).with_aspect_ratio(IMAGE_ASPECT_RATIO);
            if let Some(image) = reference {
                request = request.with_reference_image(image);
            }
            let image = service.generate_image(request).await?;
            Ok(Content::image(image.mime, image.data))
        }
        ArtifactKind::Search => {
            let result = service.search(SearchRequest::new(prompt)).await?;
            Ok(Content::text(result.to_markdown()))
        }
        ArtifactKind::Analysis => {
            let image = reference.ok_or_else(|| {
                GenerationError::Configuration("Analysis needs an image of the artwork".to_string())
            })?;
            let text = service
                .generate_text(text_request(kind, prompt).with_reference_image(image))
                .await?;
            Ok(Content::text(text))
        }
        ArtifactKind::Lesson
        | ArtifactKind::Rubric
        | ArtifactKind::Heritage
        | ArtifactKind::Prompt => {
            let mut request = text_request(kind, prompt);
            if let Some(image) = reference {
                request = request.with_reference_image(image);
            }
            Ok(Content::text(service.generate_text(request).await?))
        }
    }
}

/// Result of a generation as the UI shows it
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome<T> {
    Ready(T),
    /// Localized message shown in place of the content
    Failed(String),
}

/// Convert a generation result into something the UI can always display
pub fn render_generation<T>(result: Result<T, GenerationError>) -> GenerationOutcome<T> {
    match result {
        Ok(value) => GenerationOutcome::Ready(value),
        Err(e) => {
            tracing::warn!(error = %e, "Generation failed");
            GenerationOutcome::Failed(failure_message(&e).to_string())
        }
    }
}

fn failure_message(error: &GenerationError) -> &'static str {
    match error {
        GenerationError::RateLimit => {
            "Massa peticions en poc de temps. Espera un moment i torna-ho a provar."
        }
        GenerationError::NoImage => "No s'ha pogut generar la imatge. Torna-ho a provar.",
        GenerationError::Configuration(_) => {
            "El servei de generació no està configurat correctament."
        }
        GenerationError::Request(_) | GenerationError::Response(_) => {
            "S'ha produït un error en generar el contingut. Torna-ho a provar."
        }
    }
}
