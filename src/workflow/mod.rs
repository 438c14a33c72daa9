//! Client-side orchestration of the dataset → model → prediction workflow.

pub mod health;
pub mod orchestrator;
pub mod prediction;
pub mod presenter;
pub mod training;
pub mod types;
pub mod upload;

pub use health::{check_backend, BackendHealth};
pub use orchestrator::Workflow;
pub use training::{ProgressTracker, TrainingEvent};
pub use types::*;
