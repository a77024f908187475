use std::collections::{BTreeMap, BTreeSet};

use crate::model::{ModuleId, SectionId};

/// Section completion flags for one module. A missing section means "not done".
pub type SectionMap = BTreeMap<SectionId, bool>;

/// The three independently persisted pieces of learner progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressSlice {
    SectionProgress,
    CompletedModules,
    Bookmarks,
}

impl ProgressSlice {
    pub const ALL: [Self; 3] = [
        Self::SectionProgress,
        Self::CompletedModules,
        Self::Bookmarks,
    ];
}

/// A single learner-initiated change to progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressAction {
    SetSectionProgress {
        module: ModuleId,
        section: SectionId,
        completed: bool,
    },
    MarkComplete(ModuleId),
    MarkIncomplete(ModuleId),
    ToggleBookmark(ModuleId),
    Reset,
}

/// What an applied action did to the state.
///
/// Persistence uses this to decide which slot to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Changed(ProgressSlice),
    Reset,
}

/// In-memory learner progress.
///
/// Completion is an explicit action: a module can be completed with no
/// sections recorded, and a module with every section done is not completed
/// until it is marked so.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressState {
    module_progress: BTreeMap<ModuleId, SectionMap>,
    completed: BTreeSet<ModuleId>,
    bookmarks: BTreeSet<ModuleId>,
}

impl ProgressState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate state from its persisted slices.
    #[must_use]
    pub fn from_persisted(
        module_progress: BTreeMap<ModuleId, SectionMap>,
        completed: BTreeSet<ModuleId>,
        bookmarks: BTreeSet<ModuleId>,
    ) -> Self {
        Self {
            module_progress,
            completed,
            bookmarks,
        }
    }

    #[must_use]
    pub fn module_progress(&self) -> &BTreeMap<ModuleId, SectionMap> {
        &self.module_progress
    }

    #[must_use]
    pub fn completed(&self) -> &BTreeSet<ModuleId> {
        &self.completed
    }

    #[must_use]
    pub fn bookmarks(&self) -> &BTreeSet<ModuleId> {
        &self.bookmarks
    }

    #[must_use]
    pub fn sections(&self, module: &ModuleId) -> Option<&SectionMap> {
        self.module_progress.get(module)
    }

    #[must_use]
    pub fn is_completed(&self, module: &ModuleId) -> bool {
        self.completed.contains(module)
    }

    #[must_use]
    pub fn is_bookmarked(&self, module: &ModuleId) -> bool {
        self.bookmarks.contains(module)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.module_progress.is_empty() && self.completed.is_empty() && self.bookmarks.is_empty()
    }

    /// Apply an action and report which slice it touched.
    ///
    /// Setting a section to the value it already holds still counts as a
    /// change when the module entry had to be created.
    pub fn apply(&mut self, action: ProgressAction) -> Transition {
        match action {
            ProgressAction::SetSectionProgress {
                module,
                section,
                completed,
            } => {
                let sections = self.module_progress.entry(module).or_default();
                if sections.insert(section, completed) == Some(completed) {
                    Transition::Unchanged
                } else {
                    Transition::Changed(ProgressSlice::SectionProgress)
                }
            }
            ProgressAction::MarkComplete(module) => {
                if self.completed.insert(module) {
                    Transition::Changed(ProgressSlice::CompletedModules)
                } else {
                    Transition::Unchanged
                }
            }
            ProgressAction::MarkIncomplete(module) => {
                if self.completed.remove(&module) {
                    Transition::Changed(ProgressSlice::CompletedModules)
                } else {
                    Transition::Unchanged
                }
            }
            ProgressAction::ToggleBookmark(module) => {
                if !self.bookmarks.remove(&module) {
                    self.bookmarks.insert(module);
                }
                Transition::Changed(ProgressSlice::Bookmarks)
            }
            ProgressAction::Reset => {
                *self = Self::default();
                Transition::Reset
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(id: &str) -> ModuleId {
        ModuleId::new(id).unwrap()
    }

    fn section(id: &str) -> SectionId {
        SectionId::new(id).unwrap()
    }

    #[test]
    fn set_section_creates_module_entry_lazily() {
        let mut state = ProgressState::new();
        assert!(state.sections(&module("m1.1")).is_none());

        let transition = state.apply(ProgressAction::SetSectionProgress {
            module: module("m1.1"),
            section: section("intro"),
            completed: true,
        });

        assert_eq!(transition, Transition::Changed(ProgressSlice::SectionProgress));
        let sections = state.sections(&module("m1.1")).unwrap();
        assert_eq!(sections.get(&section("intro")), Some(&true));
        assert!(!state.is_completed(&module("m1.1")));
    }

    #[test]
    fn setting_same_section_value_twice_is_unchanged() {
        let mut state = ProgressState::new();
        let action = ProgressAction::SetSectionProgress {
            module: module("m1"),
            section: section("s1"),
            completed: false,
        };
        assert_ne!(state.apply(action.clone()), Transition::Unchanged);
        assert_eq!(state.apply(action), Transition::Unchanged);
        assert_eq!(
            state.sections(&module("m1")).unwrap().get(&section("s1")),
            Some(&false)
        );
    }

    #[test]
    fn mark_complete_is_idempotent() {
        let mut state = ProgressState::new();
        let first = state.apply(ProgressAction::MarkComplete(module("a")));
        let snapshot = state.clone();
        let second = state.apply(ProgressAction::MarkComplete(module("a")));

        assert_eq!(first, Transition::Changed(ProgressSlice::CompletedModules));
        assert_eq!(second, Transition::Unchanged);
        assert_eq!(state, snapshot);
        assert_eq!(state.completed().len(), 1);
    }

    #[test]
    fn mark_incomplete_on_absent_module_is_noop() {
        let mut state = ProgressState::new();
        assert_eq!(
            state.apply(ProgressAction::MarkIncomplete(module("ghost"))),
            Transition::Unchanged
        );
        assert!(state.is_empty());
    }

    #[test]
    fn completion_does_not_touch_sections() {
        let mut state = ProgressState::new();
        state.apply(ProgressAction::MarkComplete(module("a")));
        assert!(state.sections(&module("a")).is_none());

        state.apply(ProgressAction::MarkIncomplete(module("a")));
        assert!(!state.is_completed(&module("a")));
    }

    #[test]
    fn toggling_bookmark_twice_restores_membership() {
        let mut state = ProgressState::new();
        state.apply(ProgressAction::ToggleBookmark(module("b")));
        assert!(state.is_bookmarked(&module("b")));

        state.apply(ProgressAction::ToggleBookmark(module("b")));
        assert!(!state.is_bookmarked(&module("b")));
        assert!(state.bookmarks().is_empty());
    }

    #[test]
    fn toggling_bookmark_twice_keeps_existing_bookmark() {
        let mut state = ProgressState::from_persisted(
            BTreeMap::new(),
            BTreeSet::new(),
            BTreeSet::from([module("b")]),
        );

        state.apply(ProgressAction::ToggleBookmark(module("b")));
        assert!(!state.is_bookmarked(&module("b")));

        state.apply(ProgressAction::ToggleBookmark(module("b")));
        assert!(state.is_bookmarked(&module("b")));
        assert_eq!(state.bookmarks().len(), 1);
    }

    #[test]
    fn reset_clears_every_slice() {
        let mut state = ProgressState::new();
        state.apply(ProgressAction::SetSectionProgress {
            module: module("a"),
            section: section("intro"),
            completed: true,
        });
        state.apply(ProgressAction::MarkComplete(module("a")));
        state.apply(ProgressAction::ToggleBookmark(module("a")));

        assert_eq!(state.apply(ProgressAction::Reset), Transition::Reset);
        assert!(state.is_empty());
    }
}
