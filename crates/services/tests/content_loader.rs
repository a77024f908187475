use std::fs;

use curriculum_core::model::{ModuleId, PhaseId};
use services::{AppServices, ContentError, load_curriculum};
use storage::Storage;

const MANIFEST: &str = r#"{
    "phases": [
        {
            "id": "phase-1",
            "title": "Foundations",
            "modules": [
                { "id": "m1.1", "title": "Setup", "file": "phase-1/setup.md" },
                { "id": "m1.2", "title": "Missing file", "file": "phase-1/missing.md" }
            ]
        }
    ]
}"#;

fn ids(phase: &str, module: &str) -> (PhaseId, ModuleId) {
    (PhaseId::new(phase).unwrap(), ModuleId::new(module).unwrap())
}

async fn services_in(dir: &tempfile::TempDir) -> AppServices {
    let manifest = dir.path().join("curriculum.json");
    fs::write(&manifest, MANIFEST).unwrap();
    fs::create_dir_all(dir.path().join("phase-1")).unwrap();
    fs::write(dir.path().join("phase-1/setup.md"), "# Setup\n\nInstall tools.\n").unwrap();

    let curriculum = load_curriculum(&manifest).await.unwrap();
    AppServices::from_storage(Storage::in_memory(), dir.path(), curriculum).await
}

#[tokio::test]
async fn loads_markdown_for_known_module() {
    let dir = tempfile::tempdir().unwrap();
    let services = services_in(&dir).await;
    let (phase, module) = ids("phase-1", "m1.1");

    let doc = services.content().load_module(&phase, &module).await.unwrap();

    assert_eq!(doc.phase_title, "Foundations");
    assert_eq!(doc.module_title, "Setup");
    assert!(doc.markdown.starts_with("# Setup"));
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let services = services_in(&dir).await;

    let (phase, module) = ids("phase-9", "m1.1");
    let err = services.content().load_module(&phase, &module).await.unwrap_err();
    assert!(matches!(err, ContentError::PhaseNotFound(_)));

    let (phase, module) = ids("phase-1", "m9.9");
    let err = services.content().load_module(&phase, &module).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let services = services_in(&dir).await;
    let (phase, module) = ids("phase-1", "m1.2");

    let err = services.content().load_module(&phase, &module).await.unwrap_err();
    assert!(matches!(err, ContentError::Io { .. }));
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn total_progress_joins_against_loaded_curriculum() {
    let dir = tempfile::tempdir().unwrap();
    let mut services = services_in(&dir).await;

    services
        .progress_mut()
        .mark_module_complete(ModuleId::new("m1.1").unwrap())
        .await;

    let phases = services.curriculum().phases().to_vec();
    let total = services.progress().total_progress(&phases);
    assert_eq!((total.completed, total.total), (1, 2));
    assert_eq!(total.whole_percent(), 50);

    services.shutdown().await;
}

#[tokio::test]
async fn invalid_manifest_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("curriculum.json");
    fs::write(&manifest, "{ \"phases\": 3 }").unwrap();

    assert!(load_curriculum(&manifest).await.is_err());
    assert!(load_curriculum(&dir.path().join("absent.json")).await.is_err());
}
