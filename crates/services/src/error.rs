//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use curriculum_core::model::{CurriculumError, ModuleId, PhaseId};
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ContentService`.
///
/// The not-found variants are a presentation state for the caller, not a
/// failure of the progress store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("phase not found: {0}")]
    PhaseNotFound(PhaseId),
    #[error("module {module} not found in phase {phase}")]
    ModuleNotFound { phase: PhaseId, module: ModuleId },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ContentError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PhaseNotFound(_) | Self::ModuleNotFound { .. }
        )
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Curriculum(#[from] CurriculumError),
    #[error("failed to read curriculum manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
