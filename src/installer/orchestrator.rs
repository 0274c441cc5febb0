//! Sequential execution of the install queue
//!
//! The orchestrator hands out one task at a time and refuses to hand out
//! the next until the previous one's result has been recorded. The TUI runs
//! each task on a worker thread and feeds the result back through its event
//! channel; the headless runner drives the same state machine inline.

use super::log::InstallLog;
use super::task::{FinishedTask, InstallOutcome, InstallTask};
use std::collections::VecDeque;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Orchestrator lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Idle,
    Running,
    Done,
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Misuse of the orchestrator's protocol
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("Cannot {action} while {state}")]
    WrongState {
        action: &'static str,
        state: OrchestratorState,
    },

    #[error("Task '{0}' is still running")]
    TaskInFlight(String),

    #[error("No task is running")]
    NothingInFlight,
}

/// Progress notification, one started and one finished per task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallEvent {
    TaskStarted { index: usize, total: usize, name: String },
    TaskFinished(InstallOutcome),
    AllDone { total: usize, failed: usize },
}

#[derive(Debug)]
pub struct Orchestrator {
    pending: VecDeque<InstallTask>,
    total: usize,
    state: OrchestratorState,
    in_flight: Option<String>,
    outcomes: Vec<InstallOutcome>,
    log: InstallLog,
    summary_len: usize,
}

impl Orchestrator {
    pub fn new(queue: Vec<InstallTask>, log: InstallLog, summary_len: usize) -> Self {
        Self {
            total: queue.len(),
            pending: queue.into(),
            state: OrchestratorState::Idle,
            in_flight: None,
            outcomes: Vec::new(),
            log,
            summary_len,
        }
    }

    /// Idle → Running, or straight to Done for an empty queue
    pub fn start(&mut self) -> Result<OrchestratorState, OrchestratorError> {
        if self.state != OrchestratorState::Idle {
            return Err(OrchestratorError::WrongState {
                action: "start",
                state: self.state,
            });
        }

        info!(tasks = self.total, "install started");
        if let Err(e) = self.log.header(self.total) {
            warn!(error = %e, "could not write install log header");
        }

        self.state = if self.total == 0 {
            OrchestratorState::Done
        } else {
            OrchestratorState::Running
        };
        Ok(self.state)
    }

    /// Take the next task; its result must be [`record`](Self::record)ed
    /// before another one is handed out
    pub fn next_task(&mut self) -> Result<Option<InstallTask>, OrchestratorError> {
        if self.state != OrchestratorState::Running {
            return Err(OrchestratorError::WrongState {
                action: "take a task",
                state: self.state,
            });
        }
        if let Some(name) = &self.in_flight {
            return Err(OrchestratorError::TaskInFlight(name.clone()));
        }

        let task = self.pending.pop_front();
        if let Some(task) = &task {
            info!(task = task.name(), index = self.outcomes.len() + 1, total = self.total, "task started");
            self.in_flight = Some(task.name().to_string());
        }
        Ok(task)
    }

    /// Log a finished task and keep its outcome; Running → Done after the last
    pub fn record(&mut self, finished: FinishedTask) -> Result<&InstallOutcome, OrchestratorError> {
        if self.in_flight.take().is_none() {
            return Err(OrchestratorError::NothingInFlight);
        }

        match &finished.error {
            None => info!(task = %finished.name, "task succeeded"),
            Some(error) => warn!(task = %finished.name, error = %error, "task failed"),
        }
        if let Err(e) = self.log.record(&finished.name, finished.error.as_deref()) {
            warn!(error = %e, "could not append to install log");
        }

        self.outcomes
            .push(InstallOutcome::from_finished(&finished, self.summary_len));
        if self.outcomes.len() == self.total {
            self.state = OrchestratorState::Done;
            info!(total = self.total, failed = self.failed_count(), "install finished");
        }

        self.outcomes
            .last()
            .ok_or(OrchestratorError::NothingInFlight)
    }

    /// Run the whole queue on the calling thread
    pub fn run_to_completion(&mut self, mut on_event: impl FnMut(&InstallEvent)) -> Result<(), OrchestratorError> {
        if self.state == OrchestratorState::Idle {
            self.start()?;
        }

        while self.state == OrchestratorState::Running {
            let Some(task) = self.next_task()? else {
                break;
            };
            on_event(&InstallEvent::TaskStarted {
                index: self.outcomes.len(),
                total: self.total,
                name: task.name().to_string(),
            });
            let outcome = self.record(task.run())?.clone();
            on_event(&InstallEvent::TaskFinished(outcome));
        }

        on_event(&InstallEvent::AllDone {
            total: self.total,
            failed: self.failed_count(),
        });
        Ok(())
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.outcomes.len()
    }

    pub fn current(&self) -> Option<&str> {
        self.in_flight.as_deref()
    }

    pub fn outcomes(&self) -> &[InstallOutcome] {
        &self.outcomes
    }

    /// The most recent `window` outcomes and how many are hidden above them
    pub fn recent_outcomes(&self, window: usize) -> (&[InstallOutcome], usize) {
        let hidden = self.outcomes.len().saturating_sub(window);
        (&self.outcomes[hidden..], hidden)
    }

    /// Names of the next `n` tasks after the current one
    pub fn upcoming(&self, n: usize) -> Vec<&str> {
        self.pending.iter().take(n).map(InstallTask::name).collect()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }

    pub fn log_path(&self) -> &Path {
        self.log.path()
    }

    /// Completed fraction in `0.0..=1.0`
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.outcomes.len() as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn orchestrator(dir: &TempDir, queue: Vec<InstallTask>) -> Orchestrator {
        Orchestrator::new(queue, InstallLog::new(dir.path().join("install.log")), 60)
    }

    #[test]
    fn test_one_task_at_a_time() {
        let dir = TempDir::new().unwrap();
        let mut orch = orchestrator(
            &dir,
            vec![InstallTask::new("A", || Ok(())), InstallTask::new("B", || Ok(()))],
        );
        orch.start().unwrap();

        let first = orch.next_task().unwrap().unwrap();
        assert_eq!(orch.current(), Some("A"));
        assert_eq!(orch.upcoming(3), ["B"]);
        assert_eq!(
            orch.next_task().unwrap_err(),
            OrchestratorError::TaskInFlight("A".into())
        );

        orch.record(first.run()).unwrap();
        assert_eq!(orch.state(), OrchestratorState::Running);
        let second = orch.next_task().unwrap().unwrap();
        orch.record(second.run()).unwrap();
        assert_eq!(orch.state(), OrchestratorState::Done);
        assert_eq!(orch.progress(), 1.0);
    }

    #[test]
    fn test_record_without_task_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut orch = orchestrator(&dir, vec![InstallTask::new("A", || Ok(()))]);
        orch.start().unwrap();

        let stray = FinishedTask {
            name: "A".into(),
            error: None,
        };
        assert_eq!(orch.record(stray).unwrap_err(), OrchestratorError::NothingInFlight);
    }

    #[test]
    fn test_cannot_start_twice_or_take_before_start() {
        let dir = TempDir::new().unwrap();
        let mut orch = orchestrator(&dir, vec![InstallTask::new("A", || Ok(()))]);

        assert!(matches!(orch.next_task(), Err(OrchestratorError::WrongState { .. })));
        orch.start().unwrap();
        assert!(matches!(orch.start(), Err(OrchestratorError::WrongState { .. })));
    }

    #[test]
    fn test_empty_queue_is_done_immediately() {
        let dir = TempDir::new().unwrap();
        let mut orch = orchestrator(&dir, Vec::new());
        assert_eq!(orch.start().unwrap(), OrchestratorState::Done);
        assert!(orch.outcomes().is_empty());
    }

    #[test]
    fn test_recent_outcome_window() {
        let dir = TempDir::new().unwrap();
        let queue = (0..12)
            .map(|i| InstallTask::new(format!("task {}", i), || Ok(())))
            .collect();
        let mut orch = orchestrator(&dir, queue);
        orch.run_to_completion(|_| {}).unwrap();

        let (visible, hidden) = orch.recent_outcomes(10);
        assert_eq!(hidden, 2);
        assert_eq!(visible.len(), 10);
        assert_eq!(visible[0].name, "task 2");
    }
}
