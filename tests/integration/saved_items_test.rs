//! Saved-items persistence over the file store (restart, ordering, recovery)

mod common;

use eduart_artifacts::{ArtifactKind, Content, LoadOutcome};
use eduart_common::UserRole;
use eduart_storage::SAVED_ITEMS_KEY;

use crate::common::TestWorkshop;

fn png(byte: u8) -> Content {
    Content::image("image/png", vec![byte])
}

#[test]
fn test_restart_sees_everything_not_removed() {
    let workshop = TestWorkshop::new().unwrap();
    let mut repo = workshop.repository().unwrap();

    let lesson = repo
        .add(ArtifactKind::Lesson, Content::text("# Llum"), "Llum", UserRole::Teacher)
        .unwrap();
    let image = repo
        .add(ArtifactKind::Image, png(1), "Albufera", UserRole::Student)
        .unwrap();
    let rubric = repo
        .add(ArtifactKind::Rubric, Content::text("| r |"), "Rúbrica", UserRole::Teacher)
        .unwrap();
    repo.remove(&lesson.id).unwrap();

    let restarted = workshop.repository().unwrap();
    for role in [UserRole::Teacher, UserRole::Student, UserRole::None] {
        assert_eq!(restarted.filter_by(role, None), repo.filter_by(role, None));
    }

    let teacher: Vec<String> = restarted
        .filter_by(UserRole::Teacher, None)
        .into_iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(teacher, vec![rubric.id]);
    assert_eq!(restarted.get(&image.id).unwrap().content, png(1));
}

#[test]
fn test_order_is_insertion_not_date() {
    let workshop = TestWorkshop::new().unwrap();
    std::fs::create_dir_all(workshop.store_dir()).unwrap();
    // Stored by a machine whose clock ran years ahead
    let future = serde_json::json!([{
        "id": "1",
        "type": "PROMPT",
        "title": "Del futur",
        "content": "repte",
        "date": 4102444800000i64,
        "role": "STUDENT"
    }]);
    std::fs::write(
        workshop.store_dir().join(SAVED_ITEMS_KEY),
        future.to_string(),
    )
    .unwrap();

    let mut repo = workshop.repository().unwrap();
    let added = repo
        .add(ArtifactKind::Prompt, Content::text("nou"), "Nou", UserRole::Student)
        .unwrap();
    assert!(added.date < 4102444800000);

    let in_memory: Vec<String> = repo.all().iter().map(|a| a.id.clone()).collect();
    assert_eq!(in_memory, vec![added.id.clone(), "1".to_string()]);

    let reopened: Vec<String> = workshop
        .repository()
        .unwrap()
        .filter_by(UserRole::Student, None)
        .into_iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(reopened, in_memory);
}

#[test]
fn test_second_remove_is_noop() {
    let workshop = TestWorkshop::new().unwrap();
    let mut repo = workshop.repository().unwrap();
    let item = repo
        .add(ArtifactKind::Heritage, Content::text("Falles"), "Falles", UserRole::Teacher)
        .unwrap();
    repo.add(ArtifactKind::Heritage, Content::text("Misteri"), "Misteri", UserRole::Teacher)
        .unwrap();

    assert!(repo.remove(&item.id).unwrap());
    assert!(!repo.remove(&item.id).unwrap());
    assert_eq!(repo.len(), 1);
    assert_eq!(workshop.repository().unwrap().len(), 1);
}

#[test_log::test]
fn test_corrupted_file_recovers_to_empty() {
    let workshop = TestWorkshop::new().unwrap();
    workshop
        .repository()
        .unwrap()
        .add(ArtifactKind::Lesson, Content::text("x"), "x", UserRole::Teacher)
        .unwrap();

    std::fs::write(workshop.store_dir().join(SAVED_ITEMS_KEY), "[{\"id\": 1").unwrap();

    let mut repo = workshop.repository().unwrap();
    assert!(repo.is_empty());
    assert!(repo.load_outcome().is_recovered());

    // The session keeps working after recovery
    repo.add(ArtifactKind::Lesson, Content::text("y"), "y", UserRole::Teacher)
        .unwrap();
    assert_eq!(workshop.repository().unwrap().len(), 1);
}

#[test_log::test]
fn test_non_utf8_file_is_reported_as_recovered() {
    let workshop = TestWorkshop::new().unwrap();
    std::fs::create_dir_all(workshop.store_dir()).unwrap();
    std::fs::write(
        workshop.store_dir().join(SAVED_ITEMS_KEY),
        [0x5b, 0xff, 0xfe, 0x5d],
    )
    .unwrap();

    let repo = workshop.repository().unwrap();
    assert!(repo.is_empty());
    assert!(repo.load_outcome().is_recovered());
}

#[test]
fn test_reads_collection_written_by_browser_build() {
    let workshop = TestWorkshop::new().unwrap();
    std::fs::create_dir_all(workshop.store_dir()).unwrap();
    let legacy = serde_json::json!([
        {
            "id": "1717171717172",
            "type": "IMAGE",
            "title": "Posta de sol",
            "content": "data:image/png;base64,QQ==",
            "date": 1717171717172i64,
            "role": "STUDENT"
        },
        {
            "id": "1717171717171",
            "type": "SEARCH",
            "title": "Sorolla",
            "content": "Joaquim Sorolla (València, 1863)",
            "date": 1717171717171i64,
            "role": "TEACHER"
        }
    ]);
    std::fs::write(
        workshop.store_dir().join(SAVED_ITEMS_KEY),
        legacy.to_string(),
    )
    .unwrap();

    let mut repo = workshop.repository().unwrap();
    assert_eq!(
        repo.load_outcome(),
        &LoadOutcome::Loaded {
            count: 2,
            malformed_images: 0
        }
    );
    assert_eq!(repo.all()[0].content, Content::image("image/png", vec![0x41]));

    // New ids never collide with the stored ones
    let added = repo
        .add(ArtifactKind::Prompt, Content::text("r"), "r", UserRole::Student)
        .unwrap();
    assert!(repo.all().iter().filter(|a| a.id == added.id).count() == 1);

    // Writing back keeps the same wire shape
    let raw = std::fs::read_to_string(workshop.store_dir().join(SAVED_ITEMS_KEY)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[1], legacy[0]);
}
