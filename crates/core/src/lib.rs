#![forbid(unsafe_code)]

pub mod aggregate;
pub mod model;

pub use aggregate::{ProgressSummary, module_progress, overall_progress, phase_progress};
