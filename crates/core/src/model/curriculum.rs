use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ModuleId, PhaseId};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CurriculumError {
    #[error("invalid curriculum manifest: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate phase id: {0}")]
    DuplicatePhase(PhaseId),

    #[error("duplicate module id: {0}")]
    DuplicateModule(ModuleId),
}

/// A single unit of study backed by one markdown document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub title: String,
    /// Markdown path, relative to the content root.
    pub file: PathBuf,
}

impl Module {
    #[must_use]
    pub fn new(id: ModuleId, title: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            id,
            title: title.into(),
            file: file.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub id: PhaseId,
    pub title: String,
    #[serde(default)]
    pub modules: Vec<Module>,
}

impl Phase {
    #[must_use]
    pub fn new(id: PhaseId, title: impl Into<String>, modules: Vec<Module>) -> Self {
        Self {
            id,
            title: title.into(),
            modules,
        }
    }

    #[must_use]
    pub fn module(&self, id: &ModuleId) -> Option<&Module> {
        self.modules.iter().find(|module| &module.id == id)
    }
}

/// Ordered phases of the course. Progress joins against this; it never
/// changes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Curriculum {
    phases: Vec<Phase>,
}

#[derive(Deserialize)]
struct Manifest {
    #[serde(default)]
    phases: Vec<Phase>,
}

impl Curriculum {
    /// Build a curriculum, rejecting duplicate phase or module ids.
    ///
    /// # Errors
    ///
    /// Returns `CurriculumError::DuplicatePhase` or `CurriculumError::DuplicateModule`.
    pub fn new(phases: Vec<Phase>) -> Result<Self, CurriculumError> {
        let mut phase_ids = HashSet::new();
        let mut module_ids = HashSet::new();
        for phase in &phases {
            if !phase_ids.insert(&phase.id) {
                return Err(CurriculumError::DuplicatePhase(phase.id.clone()));
            }
            for module in &phase.modules {
                if !module_ids.insert(&module.id) {
                    return Err(CurriculumError::DuplicateModule(module.id.clone()));
                }
            }
        }
        Ok(Self { phases })
    }

    /// Parse and validate a JSON manifest.
    ///
    /// # Errors
    ///
    /// Returns `CurriculumError::Parse` for malformed JSON (including blank ids)
    /// and the duplicate variants from [`Curriculum::new`].
    pub fn from_json(raw: &str) -> Result<Self, CurriculumError> {
        let manifest: Manifest = serde_json::from_str(raw)?;
        Self::new(manifest.phases)
    }

    #[must_use]
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    #[must_use]
    pub fn phase(&self, id: &PhaseId) -> Option<&Phase> {
        self.phases.iter().find(|phase| &phase.id == id)
    }

    #[must_use]
    pub fn module(&self, phase_id: &PhaseId, module_id: &ModuleId) -> Option<&Module> {
        self.phase(phase_id)?.module(module_id)
    }

    /// Find a module anywhere in the curriculum, along with its phase.
    #[must_use]
    pub fn locate(&self, module_id: &ModuleId) -> Option<(&Phase, &Module)> {
        self.phases
            .iter()
            .find_map(|phase| phase.module(module_id).map(|module| (phase, module)))
    }

    /// All modules in course order.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.phases.iter().flat_map(|phase| phase.modules.iter())
    }

    #[must_use]
    pub fn module_count(&self) -> usize {
        self.phases.iter().map(|phase| phase.modules.len()).sum()
    }
}
