//! Application state shared between the event loop and the renderer

use crate::installer::Orchestrator;
use crate::theme::SPINNER_FRAMES;
use crate::wizard::Wizard;
use std::path::PathBuf;

/// Main application state
#[derive(Debug)]
pub struct AppState {
    pub wizard: Wizard,
    /// Present from the moment the install phase begins
    pub orchestrator: Option<Orchestrator>,
    /// Probe results have not arrived yet
    pub probing: bool,
    /// `fnm list-remote` has not answered yet
    pub node_versions_loading: bool,
    pub spinner_frame: usize,
    /// How many finished tasks the progress view shows
    pub outcome_window: usize,
    pub install_log: PathBuf,
}

impl AppState {
    pub fn new(outcome_window: usize, install_log: PathBuf) -> Self {
        Self {
            wizard: Wizard::new(),
            orchestrator: None,
            probing: true,
            node_versions_loading: true,
            spinner_frame: 0,
            outcome_window,
            install_log,
        }
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }

    pub fn tick(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
    }
}
