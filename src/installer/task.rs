//! One unit of install work and what became of it

use std::fmt;
use tracing::info;

/// Effectful body of a task; captures owned copies only
pub type TaskAction = Box<dyn FnOnce() -> anyhow::Result<()> + Send + 'static>;

/// A named, queued unit of work
pub struct InstallTask {
    name: String,
    action: TaskAction,
}

impl InstallTask {
    pub fn new<F>(name: impl Into<String>, action: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        Self {
            name: name.into(),
            action: Box::new(action),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same name, action replaced by a log line
    pub fn into_dry_run(self) -> Self {
        let name = self.name.clone();
        Self::new(self.name, move || {
            info!(task = %name, "dry run, skipping");
            Ok(())
        })
    }

    /// Run the action, keeping the full error chain as text
    pub fn run(self) -> FinishedTask {
        let error = (self.action)().err().map(|e| format!("{:#}", e));
        FinishedTask {
            name: self.name,
            error,
        }
    }
}

impl fmt::Debug for InstallTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallTask").field("name", &self.name).finish()
    }
}

/// Raw result of running a task, before it is logged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedTask {
    pub name: String,
    /// Full error text, `None` on success
    pub error: Option<String>,
}

impl FinishedTask {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// What the progress view shows for a finished task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub name: String,
    pub success: bool,
    pub error_summary: Option<String>,
}

impl InstallOutcome {
    pub fn from_finished(finished: &FinishedTask, summary_len: usize) -> Self {
        Self {
            name: finished.name.clone(),
            success: finished.succeeded(),
            error_summary: finished
                .error
                .as_deref()
                .map(|e| summarize_error(e, summary_len)),
        }
    }
}

/// First line of `error`, cut to `max_chars` characters plus `...`
pub fn summarize_error(error: &str, max_chars: usize) -> String {
    let line = error.lines().next().unwrap_or_default().trim();
    match line.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &line[..cut]),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_success() {
        let finished = InstallTask::new("Git", || Ok(())).run();
        assert_eq!(finished.name, "Git");
        assert!(finished.succeeded());
    }

    #[test]
    fn test_run_keeps_error_chain() {
        use anyhow::Context;
        let finished = InstallTask::new("Go", || {
            Err(anyhow::anyhow!("exit status 1")).context("brew install go")
        })
        .run();
        assert_eq!(finished.error.as_deref(), Some("brew install go: exit status 1"));
    }

    #[test]
    fn test_dry_run_never_calls_action() {
        let task = InstallTask::new("Boom", || anyhow::bail!("should not run")).into_dry_run();
        assert_eq!(task.name(), "Boom");
        assert!(task.run().succeeded());
    }

    #[test]
    fn test_summarize_error() {
        assert_eq!(summarize_error("short", 60), "short");
        assert_eq!(summarize_error(&"x".repeat(61), 60), format!("{}...", "x".repeat(60)));
        assert_eq!(summarize_error(&"y".repeat(60), 60), "y".repeat(60));
        assert_eq!(summarize_error("first\nsecond", 60), "first");
        // Multi-byte characters are never split
        assert_eq!(summarize_error("ééééé", 3), "ééé...");
    }

    #[test]
    fn test_outcome_from_finished() {
        let finished = FinishedTask {
            name: "Zed".into(),
            error: Some("Error: Cask 'zed' is unavailable".into()),
        };
        let outcome = InstallOutcome::from_finished(&finished, 10);
        assert!(!outcome.success);
        assert_eq!(outcome.error_summary.as_deref(), Some("Error: Cas..."));
    }
}
