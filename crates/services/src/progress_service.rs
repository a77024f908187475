use std::collections::BTreeSet;
use std::sync::Arc;

use curriculum_core::ProgressSummary;
use curriculum_core::aggregate;
use curriculum_core::model::{
    Module, ModuleId, Phase, ProgressAction, ProgressState, SectionId, SectionMap, Transition,
};
use storage::{KeyValueStore, ProgressAdapter};

/// Learner progress for one profile: section flags, completed modules and
/// bookmarks.
///
/// Obtained only through [`ProgressService::load`], so it is always backed by
/// rehydrated state. Every mutation updates memory first and then writes the
/// changed slot before returning. Nothing here returns an error; storage
/// failures are logged by the adapter and memory stays authoritative.
pub struct ProgressService {
    state: ProgressState,
    adapter: ProgressAdapter,
}

impl ProgressService {
    /// Rehydrate progress from `store`, defaulting any missing or malformed slot.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let adapter = ProgressAdapter::new(store);
        let state = adapter.load_state().await;
        tracing::debug!(
            modules_tracked = state.module_progress().len(),
            completed = state.completed().len(),
            bookmarks = state.bookmarks().len(),
            "progress loaded"
        );
        Self { state, adapter }
    }

    #[must_use]
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    /// Recorded sections for a module; empty for modules never touched.
    #[must_use]
    pub fn module_progress(&self, module: &ModuleId) -> SectionMap {
        aggregate::module_progress(&self.state, module)
    }

    pub async fn update_module_progress(
        &mut self,
        module: ModuleId,
        section: SectionId,
        completed: bool,
    ) {
        self.dispatch(ProgressAction::SetSectionProgress {
            module,
            section,
            completed,
        })
        .await;
    }

    pub async fn mark_module_complete(&mut self, module: ModuleId) {
        self.dispatch(ProgressAction::MarkComplete(module)).await;
    }

    pub async fn mark_module_incomplete(&mut self, module: ModuleId) {
        self.dispatch(ProgressAction::MarkIncomplete(module)).await;
    }

    /// Flip bookmark membership and return the new membership.
    pub async fn toggle_bookmark(&mut self, module: ModuleId) -> bool {
        let probe = module.clone();
        self.dispatch(ProgressAction::ToggleBookmark(module)).await;
        self.state.is_bookmarked(&probe)
    }

    /// Clear every slice in memory and remove the persisted slots.
    pub async fn reset_progress(&mut self) {
        self.dispatch(ProgressAction::Reset).await;
    }

    #[must_use]
    pub fn is_completed(&self, module: &ModuleId) -> bool {
        self.state.is_completed(module)
    }

    #[must_use]
    pub fn is_bookmarked(&self, module: &ModuleId) -> bool {
        self.state.is_bookmarked(module)
    }

    #[must_use]
    pub fn completed_modules(&self) -> &BTreeSet<ModuleId> {
        self.state.completed()
    }

    #[must_use]
    pub fn bookmarks(&self) -> &BTreeSet<ModuleId> {
        self.state.bookmarks()
    }

    #[must_use]
    pub fn phase_progress(&self, modules: &[Module]) -> ProgressSummary {
        aggregate::phase_progress(&self.state, modules)
    }

    #[must_use]
    pub fn total_progress(&self, phases: &[Phase]) -> ProgressSummary {
        aggregate::overall_progress(&self.state, phases)
    }

    async fn dispatch(&mut self, action: ProgressAction) {
        match self.state.apply(action) {
            Transition::Unchanged => {}
            Transition::Changed(slice) => {
                self.adapter.save_slice(slice, &self.state).await;
            }
            Transition::Reset => {
                self.adapter.clear_all().await;
                tracing::info!("progress reset");
            }
        }
    }
}
