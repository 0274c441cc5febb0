//! Install orchestration
//!
//! - [`queue`] turns the wizard's selections into an ordered task list
//! - [`orchestrator`] runs that list one task at a time
//! - [`log`] keeps the durable record of every outcome
//! - [`actions`] holds the task bodies that are plain command invocations

pub mod actions;
pub mod log;
pub mod orchestrator;
pub mod queue;
pub mod task;

pub use log::InstallLog;
pub use orchestrator::{InstallEvent, Orchestrator, OrchestratorError, OrchestratorState};
pub use queue::{InstallRequest, TaskContext, build_queue};
pub use task::{FinishedTask, InstallOutcome, InstallTask, summarize_error};
