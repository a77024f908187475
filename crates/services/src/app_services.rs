use std::path::{Path, PathBuf};
use std::sync::Arc;

use curriculum_core::model::Curriculum;
use storage::Storage;
use storage::sqlite::SqliteRepository;

use crate::content_service::ContentService;
use crate::error::AppServicesError;
use crate::progress_service::ProgressService;

/// Composition root: owns the progress store and the content loader for one
/// learner profile.
///
/// Built once at start-up and torn down with [`AppServices::shutdown`].
pub struct AppServices {
    curriculum: Arc<Curriculum>,
    progress: ProgressService,
    content: ContentService,
    sqlite: Option<SqliteRepository>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Sqlite` if the database cannot be opened or
    /// migrated.
    pub async fn new_sqlite(
        db_url: &str,
        content_root: impl Into<PathBuf>,
        curriculum: Curriculum,
    ) -> Result<Self, AppServicesError> {
        let (storage, repo) = Storage::sqlite(db_url).await?;
        let mut services = Self::from_storage(storage, content_root, curriculum).await;
        services.sqlite = Some(repo);
        Ok(services)
    }

    /// Build services over any storage backend (in-memory for tests).
    pub async fn from_storage(
        storage: Storage,
        content_root: impl Into<PathBuf>,
        curriculum: Curriculum,
    ) -> Self {
        let curriculum = Arc::new(curriculum);
        let progress = ProgressService::load(Arc::clone(&storage.slots)).await;
        let content = ContentService::new(content_root, Arc::clone(&curriculum));
        Self {
            curriculum,
            progress,
            content,
            sqlite: None,
        }
    }

    #[must_use]
    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressService {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut ProgressService {
        &mut self.progress
    }

    #[must_use]
    pub fn content(&self) -> &ContentService {
        &self.content
    }

    /// Release storage resources. Every write has already been awaited, so
    /// there is nothing left to flush.
    pub async fn shutdown(self) {
        if let Some(repo) = self.sqlite {
            repo.close().await;
            tracing::debug!("sqlite pool closed");
        }
    }
}

/// Read and validate a curriculum manifest from disk.
///
/// # Errors
///
/// Returns `AppServicesError::Manifest` if the file cannot be read and
/// `AppServicesError::Curriculum` if it is not a valid manifest.
pub async fn load_curriculum(path: &Path) -> Result<Curriculum, AppServicesError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AppServicesError::Manifest {
            path: path.to_path_buf(),
            source,
        })?;
    let curriculum = Curriculum::from_json(&raw)?;
    tracing::debug!(
        path = %path.display(),
        phases = curriculum.phases().len(),
        modules = curriculum.module_count(),
        "curriculum loaded"
    );
    Ok(curriculum)
}
