//! Read-only completion statistics derived from `ProgressState`.
//!
//! Only modules present in the supplied structure are counted; completed ids
//! that the curriculum no longer lists are ignored.

use std::collections::HashSet;

use crate::model::{Module, ModuleId, Phase, ProgressState, SectionMap};

/// Completion counts for a list of modules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSummary {
    pub completed: usize,
    pub total: usize,
    /// `100 * completed / total`, rounded to two decimal places. `0.0` when empty.
    pub percentage: f64,
}

impl ProgressSummary {
    #[must_use]
    pub fn new(completed: usize, total: usize) -> Self {
        Self {
            completed,
            total,
            percentage: percentage(completed, total),
        }
    }

    /// Whole percent, truncated toward zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn whole_percent(&self) -> u8 {
        self.percentage.trunc().clamp(0.0, 100.0) as u8
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = 100.0 * completed as f64 / total as f64;
    (raw * 100.0).round() / 100.0
}

/// Sections recorded for a module, or an empty map for unknown ids.
#[must_use]
pub fn module_progress(state: &ProgressState, module: &ModuleId) -> SectionMap {
    state.sections(module).cloned().unwrap_or_default()
}

/// Completion over one phase's modules. `total` is the length of the input.
#[must_use]
pub fn phase_progress(state: &ProgressState, modules: &[Module]) -> ProgressSummary {
    let completed = modules
        .iter()
        .filter(|module| state.is_completed(&module.id))
        .count();
    ProgressSummary::new(completed, modules.len())
}

/// Completion over every module of every phase, each id counted once.
#[must_use]
pub fn overall_progress(state: &ProgressState, phases: &[Phase]) -> ProgressSummary {
    let mut seen = HashSet::new();
    let mut completed = 0;
    for module in phases.iter().flat_map(|phase| phase.modules.iter()) {
        if !seen.insert(&module.id) {
            continue;
        }
        if state.is_completed(&module.id) {
            completed += 1;
        }
    }
    ProgressSummary::new(completed, seen.len())
}
