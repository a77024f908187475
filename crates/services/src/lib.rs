#![forbid(unsafe_code)]

pub mod app_services;
pub mod content_service;
pub mod error;
pub mod progress_service;

pub use curriculum_core::ProgressSummary;

pub use app_services::{AppServices, load_curriculum};
pub use content_service::{ContentService, ModuleDocument};
pub use error::{AppServicesError, ContentError};
pub use progress_service::ProgressService;
