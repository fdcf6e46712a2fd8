//! End-to-end workshop flows: generate, save, restart, export

mod common;

use chrono::NaiveDate;
use eduart_app::{generate, render_generation, GenerationOutcome};
use eduart_artifacts::{export_images, ArtifactKind, Content, ExportError};
use eduart_common::UserRole;
use eduart_llm::mock::{MockGenerationService, MOCK_IMAGE_BYTES};
use eduart_llm::GenerationError;

use crate::common::{zip_entries, TestWorkshop};

#[test]
fn test_saved_image_exports_single_entry() {
    let workshop = TestWorkshop::new().unwrap();
    let mut repo = workshop.repository().unwrap();

    let sunset = repo
        .add(
            ArtifactKind::Image,
            Content::from_data_uri("data:image/png;base64,QQ==").unwrap(),
            "Sunset",
            UserRole::Teacher,
        )
        .unwrap();

    let bytes = export_images(&repo.filter_by(UserRole::Teacher, None)).unwrap();
    let entries = zip_entries(&bytes).unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, format!("Sunset_{}.png", sunset.id));
    assert_eq!(entries[0].1, vec![0x41]);
}

#[test]
fn test_export_is_empty_without_images() {
    let workshop = TestWorkshop::new().unwrap();
    let mut repo = workshop.repository().unwrap();
    let lesson = repo
        .add(ArtifactKind::Lesson, Content::text("# Pla"), "Pla", UserRole::Teacher)
        .unwrap();

    assert_eq!(export_images(&[]), Err(ExportError::NothingToExport));
    assert_eq!(export_images(&[lesson]), Err(ExportError::NothingToExport));
}

#[test]
fn test_export_only_includes_active_role() {
    let workshop = TestWorkshop::new().unwrap();

    let mut student = workshop.session(UserRole::Student).unwrap();
    student
        .save(ArtifactKind::Image, Content::image("image/png", vec![1]), "Alumne")
        .unwrap();

    let mut teacher = workshop.session(UserRole::Teacher).unwrap();
    let mine = teacher
        .save(ArtifactKind::Image, Content::image("image/png", vec![2]), "Docent")
        .unwrap();

    let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let download = teacher.export_archive(today).unwrap().unwrap();
    assert_eq!(download.filename, "eduart_imatges_2026-10-19.zip");

    let entries = zip_entries(&download.bytes).unwrap();
    assert_eq!(entries, vec![(format!("Docent_{}.png", mine.id), vec![2])]);
}

#[tokio::test]
async fn test_generate_save_and_reopen() {
    let workshop = TestWorkshop::new().unwrap();
    let service = MockGenerationService::new();

    let mut session = workshop.session(UserRole::Student).unwrap();
    let outcome = render_generation(
        generate(&service, ArtifactKind::Image, "Un gat a la Malvarrosa", None).await,
    );
    let GenerationOutcome::Ready(content) = outcome else {
        panic!("mock generation should succeed");
    };
    let saved = session.save(ArtifactKind::Image, content, "Gat").unwrap();

    let reopened = workshop.session(UserRole::Student).unwrap();
    let download = reopened.download_image(&saved.id).unwrap();
    assert_eq!(download.filename, format!("saved-image-{}.png", saved.id));
    assert_eq!(download.bytes, MOCK_IMAGE_BYTES);
}

#[tokio::test]
async fn test_failed_generation_leaves_folder_untouched() {
    let workshop = TestWorkshop::new().unwrap();
    let service = MockGenerationService::failing(GenerationError::RateLimit);
    let session = workshop.session(UserRole::Teacher).unwrap();

    let outcome = render_generation(generate(&service, ArtifactKind::Lesson, "Volum", None).await);
    assert!(matches!(outcome, GenerationOutcome::Failed(_)));
    assert!(session.saved(None).is_empty());
}

#[test]
fn test_theme_survives_restart() {
    let workshop = TestWorkshop::new().unwrap();
    let mut session = workshop.session(UserRole::None).unwrap();
    let toggled = session.toggle_theme().unwrap();

    assert_eq!(workshop.session(UserRole::None).unwrap().theme(), toggled);
}
