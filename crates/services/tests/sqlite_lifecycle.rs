use curriculum_core::model::{Curriculum, ModuleId, SectionId};
use services::AppServices;

fn module(id: &str) -> ModuleId {
    ModuleId::new(id).unwrap()
}

fn db_url(dir: &tempfile::TempDir) -> String {
    format!("sqlite://{}?mode=rwc", dir.path().join("progress.sqlite3").display())
}

#[tokio::test]
async fn progress_survives_shutdown_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = db_url(&dir);

    let mut services = AppServices::new_sqlite(&url, dir.path(), Curriculum::default())
        .await
        .expect("open sqlite");
    services
        .progress_mut()
        .update_module_progress(module("a"), SectionId::new("intro").unwrap(), true)
        .await;
    services.progress_mut().mark_module_complete(module("a")).await;
    services.progress_mut().toggle_bookmark(module("b")).await;
    let before = services.progress().state().clone();
    services.shutdown().await;

    let reopened = AppServices::new_sqlite(&url, dir.path(), Curriculum::default())
        .await
        .expect("reopen sqlite");

    assert_eq!(reopened.progress().state(), &before);
    assert!(reopened.progress().is_completed(&module("a")));
    assert!(reopened.progress().is_bookmarked(&module("b")));
    reopened.shutdown().await;
}

#[tokio::test]
async fn reset_is_persisted_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = db_url(&dir);

    let mut services = AppServices::new_sqlite(&url, dir.path(), Curriculum::default())
        .await
        .expect("open sqlite");
    services.progress_mut().mark_module_complete(module("a")).await;
    services.progress_mut().reset_progress().await;
    services.shutdown().await;

    let reopened = AppServices::new_sqlite(&url, dir.path(), Curriculum::default())
        .await
        .expect("reopen sqlite");
    assert!(reopened.progress().state().is_empty());
    reopened.shutdown().await;
}
