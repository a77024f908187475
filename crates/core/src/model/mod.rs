mod curriculum;
mod ids;
mod progress;

pub use curriculum::{Curriculum, CurriculumError, Module, Phase};
pub use ids::{ModuleId, ParseIdError, PhaseId, SectionId};
pub use progress::{ProgressAction, ProgressSlice, ProgressState, SectionMap, Transition};
