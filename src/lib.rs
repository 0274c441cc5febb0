//! freshbox library
//!
//! Core of the macOS setup wizard: the page state machine, the install
//! orchestrator and the config merge engine, plus the catalog, probe and
//! task actions they drive.

pub mod agent_config;
pub mod app;
pub mod catalog;
pub mod cli;
pub mod command;
pub mod config;
pub mod config_file;
pub mod error;
pub mod extras;
pub mod i18n;
pub mod input;
pub mod installer;
pub mod merge;
pub mod probe;
pub mod process_guard;
pub mod selection;
pub mod theme;
pub mod ui;
pub mod wizard;

// Re-export main types for convenience
pub use catalog::{AiTool, CatalogItem, DesktopApp, DevTool, Extra, McpPreset, SystemDefault};
pub use command::{CommandOutput, CommandRunner, RecordingRunner, SystemRunner};
pub use config::{HomeLayout, Language, Settings};
pub use config_file::Profile;
pub use error::{FreshboxError, Result};
pub use installer::{
    InstallEvent, InstallLog, InstallOutcome, InstallRequest, InstallTask, Orchestrator,
    OrchestratorError, OrchestratorState, TaskContext, build_queue,
};
pub use merge::{Document, DocumentPatch, SectionRewrite, ensure_section_key, merge_document, merge_line_config};
pub use probe::{Probe, ProbeReport, ProbeResult, SystemProbe};
pub use process_guard::{ChildRegistry, CommandProcessGroup, ProcessGuard};
pub use selection::{SelectionSet, Selections};
pub use wizard::{QuitOutcome, Transition, Wizard, WizardPage, advance};
