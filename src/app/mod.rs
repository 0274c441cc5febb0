//! Application module
//!
//! Owns the terminal event loop. Slow work (the capability probe, the Node
//! version list, every install task) runs on worker threads that report back
//! over a channel; the loop drains it without blocking between frames.
//!
//! # Module Structure
//! - `state` - shared state the renderer draws from
//! - Main module - App struct and event loop

mod state;

pub use state::AppState;

use crate::command::CommandRunner;
use crate::config::Settings;
use crate::config_file::Profile;
use crate::error::FreshboxError;
use crate::input::{self, Flow};
use crate::installer::{
    FinishedTask, InstallLog, Orchestrator, OrchestratorState, TaskContext, build_queue,
};
use crate::probe::{self, ProbeReport, SystemProbe};
use crate::process_guard::ProcessGuard;
use crate::theme::SPINNER_INTERVAL;
use crate::ui;
use crate::wizard::WizardPage;
use anyhow::Result;
use crossterm::event::{Event, KeyEvent};
use ratatui::{Terminal, backend::Backend};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Messages sent from worker threads to the event loop
#[derive(Debug)]
pub enum AppMessage {
    ProbeDone(ProbeReport),
    NodeVersions(Vec<String>),
    TaskFinished(FinishedTask),
}

/// Main application struct
pub struct App {
    state: Arc<Mutex<AppState>>,
    settings: Settings,
    runner: Arc<dyn CommandRunner>,
    save_profile: Option<PathBuf>,
    /// Cloned into every worker thread
    tx: Sender<AppMessage>,
    rx: Receiver<AppMessage>,
    last_tick: Instant,
    /// Terminates in-flight installers if the wizard exits or crashes
    _process_guard: ProcessGuard,
}

impl App {
    pub fn new(
        settings: Settings,
        runner: Arc<dyn CommandRunner>,
        save_profile: Option<PathBuf>,
    ) -> Self {
        info!(home = %settings.home().display(), dry_run = settings.dry_run, "creating app");
        let (tx, rx) = mpsc::channel();
        let state = AppState::new(settings.outcome_window, settings.layout.install_log());

        Self {
            state: Arc::new(Mutex::new(state)),
            settings,
            runner,
            save_profile,
            tx,
            rx,
            last_tick: Instant::now(),
            _process_guard: ProcessGuard::new(),
        }
    }

    fn lock_state(&self) -> std::result::Result<MutexGuard<'_, AppState>, FreshboxError> {
        self.state
            .lock()
            .map_err(|e| FreshboxError::state(format!("Mutex poisoned: {}", e)))
    }

    /// Probe the machine and fetch Node versions in the background
    pub fn start_background_work(&self) {
        let runner = Arc::clone(&self.runner);
        let home = self.settings.home().to_path_buf();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let report = ProbeReport::collect(&SystemProbe::new(runner, home));
            let _ = tx.send(AppMessage::ProbeDone(report));
        });

        let runner = Arc::clone(&self.runner);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let versions = probe::available_node_versions(runner.as_ref());
            let _ = tx.send(AppMessage::NodeVersions(versions));
        });
    }

    /// Run the main application loop until the user exits
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        info!("starting main application loop");
        self.start_background_work();

        loop {
            self.poll_messages()?;

            if self.last_tick.elapsed() >= SPINNER_INTERVAL {
                self.lock_state()?.tick();
                self.last_tick = Instant::now();
            }

            if crossterm::event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = crossterm::event::read()? {
                    if self.handle_key_event(key)? == Flow::Exit {
                        break;
                    }
                }
            }

            let state = self.lock_state()?;
            terminal.draw(|f| ui::render(f, &state))?;
        }

        info!("leaving main application loop");
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Flow> {
        let flow = {
            let mut state = self.lock_state()?;
            let page = state.wizard.page();
            match input::map_key(page, key) {
                Some(action) if state.probing && input::blocked_while_probing(page, action) => {
                    debug!("waiting for the probe before leaving the welcome page");
                    Flow::Continue
                }
                Some(action) => input::apply(&mut state.wizard, action),
                None => Flow::Continue,
            }
        };

        if flow == Flow::StartInstall {
            self.start_install()?;
        }
        Ok(flow)
    }

    /// Drain worker messages without blocking
    fn poll_messages(&mut self) -> Result<()> {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                AppMessage::ProbeDone(report) => {
                    let mut state = self.lock_state()?;
                    state.wizard.set_probe(report);
                    // Earlier selections stay, less anything found installed
                    if matches!(state.wizard.page(), WizardPage::Language | WizardPage::Welcome) {
                        state.wizard.apply_recommended();
                    }
                    state.probing = false;
                }
                AppMessage::NodeVersions(versions) => {
                    debug!(count = versions.len(), "node versions available");
                    let mut state = self.lock_state()?;
                    state.wizard.set_node_versions(versions);
                    state.node_versions_loading = false;
                }
                AppMessage::TaskFinished(finished) => {
                    {
                        let mut state = self.lock_state()?;
                        if let Some(orchestrator) = state.orchestrator.as_mut() {
                            orchestrator.record(finished)?;
                        }
                    }
                    self.dispatch_next()?;
                }
            }
        }
        Ok(())
    }

    /// Build the queue from the wizard's final selections and start it
    fn start_install(&mut self) -> Result<()> {
        let mut state = self.lock_state()?;
        let request = state.wizard.install_request();

        if let Some(path) = &self.save_profile {
            let profile = Profile::from_request(state.wizard.language(), request.clone());
            match profile.save_to_file(path) {
                Ok(()) => info!(path = %path.display(), "profile saved"),
                Err(e) => error!(path = %path.display(), error = %format!("{:#}", e), "could not save profile"),
            }
        }

        let ctx = TaskContext::new(Arc::clone(&self.runner), &self.settings);
        let queue = build_queue(request, state.wizard.probe(), &ctx);
        let mut orchestrator = Orchestrator::new(
            queue,
            InstallLog::new(self.settings.layout.install_log()),
            self.settings.summary_len,
        );
        orchestrator.start()?;
        state.orchestrator = Some(orchestrator);
        drop(state);

        self.dispatch_next()
    }

    /// Hand the next task to a worker thread, or finish the wizard
    fn dispatch_next(&mut self) -> Result<()> {
        let mut state = self.lock_state()?;
        let Some(orchestrator) = state.orchestrator.as_mut() else {
            warn!("dispatch requested without an orchestrator");
            return Ok(());
        };

        if orchestrator.state() == OrchestratorState::Running {
            if let Some(task) = orchestrator.next_task()? {
                let tx = self.tx.clone();
                thread::spawn(move || {
                    let _ = tx.send(AppMessage::TaskFinished(task.run()));
                });
                return Ok(());
            }
        }

        if orchestrator.state() == OrchestratorState::Done {
            let failed = orchestrator.failed_count();
            info!(failed, total = orchestrator.total(), "install finished");
            state.wizard.install_done(failed);
        }
        Ok(())
    }
}
