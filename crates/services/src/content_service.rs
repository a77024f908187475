use std::path::{Component, PathBuf};
use std::sync::Arc;

use curriculum_core::model::{Curriculum, Module, ModuleId, Phase, PhaseId};

use crate::error::ContentError;

/// Markdown source for one module, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDocument {
    pub phase_id: PhaseId,
    pub phase_title: String,
    pub module_id: ModuleId,
    pub module_title: String,
    pub markdown: String,
}

/// Resolves `(phase, module)` pairs to markdown documents under a content root.
#[derive(Clone)]
pub struct ContentService {
    root: PathBuf,
    curriculum: Arc<Curriculum>,
}

impl ContentService {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, curriculum: Arc<Curriculum>) -> Self {
        Self {
            root: root.into(),
            curriculum,
        }
    }

    /// Path of a module's markdown file.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::PhaseNotFound` / `ContentError::ModuleNotFound`
    /// for unknown ids, and `ModuleNotFound` for files that would resolve
    /// outside the content root.
    pub fn resolve_path(
        &self,
        phase_id: &PhaseId,
        module_id: &ModuleId,
    ) -> Result<PathBuf, ContentError> {
        let (phase, module) = self.lookup(phase_id, module_id)?;
        self.contained_path(phase, module)
    }

    /// Read a module's markdown.
    ///
    /// # Errors
    ///
    /// Returns the lookup errors of [`ContentService::resolve_path`], or
    /// `ContentError::Io` if the file cannot be read.
    pub async fn load_module(
        &self,
        phase_id: &PhaseId,
        module_id: &ModuleId,
    ) -> Result<ModuleDocument, ContentError> {
        let (phase, module) = self.lookup(phase_id, module_id)?;
        let path = self.contained_path(phase, module)?;

        let markdown = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ContentError::Io {
                path: path.clone(),
                source,
            })?;
        tracing::debug!(phase = %phase.id, module = %module.id, path = %path.display(), "module loaded");

        Ok(ModuleDocument {
            phase_id: phase.id.clone(),
            phase_title: phase.title.clone(),
            module_id: module.id.clone(),
            module_title: module.title.clone(),
            markdown,
        })
    }

    fn lookup(
        &self,
        phase_id: &PhaseId,
        module_id: &ModuleId,
    ) -> Result<(&Phase, &Module), ContentError> {
        let phase = self
            .curriculum
            .phase(phase_id)
            .ok_or_else(|| ContentError::PhaseNotFound(phase_id.clone()))?;
        let module = phase
            .module(module_id)
            .ok_or_else(|| ContentError::ModuleNotFound {
                phase: phase_id.clone(),
                module: module_id.clone(),
            })?;
        Ok((phase, module))
    }

    fn contained_path(&self, phase: &Phase, module: &Module) -> Result<PathBuf, ContentError> {
        let relative = module.file.as_path();
        let stays_inside = relative
            .components()
            .all(|part| matches!(part, Component::Normal(_) | Component::CurDir));
        if !stays_inside || relative.as_os_str().is_empty() {
            tracing::warn!(module = %module.id, file = %relative.display(), "module file escapes content root");
            return Err(ContentError::ModuleNotFound {
                phase: phase.id.clone(),
                module: module.id.clone(),
            });
        }
        Ok(self.root.join(relative))
    }
}
