//! Durable install log
//!
//! Append-only. The file is opened, written and closed for every line so
//! nothing is held open while a task runs.

use anyhow::{Context, Result};
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Indent of the error line under a `[FAIL]` entry
const DETAIL_INDENT: &str = "       ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLog {
    path: PathBuf,
}

impl InstallLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, text: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open install log {}", self.path.display()))?;
        writeln!(file, "{}  {}", Local::now().format(TIMESTAMP_FORMAT), text)
            .context("Failed to write install log")
    }

    pub fn header(&self, task_count: usize) -> Result<()> {
        self.append(&format!("=== freshbox install started ({} tasks) ===", task_count))
    }

    /// `[ OK ] name`, or `[FAIL] name` with the full error on the next line
    pub fn record(&self, name: &str, error: Option<&str>) -> Result<()> {
        match error {
            None => self.append(&format!("[ OK ] {}", name)),
            Some(error) => self.append(&format!("[FAIL] {}\n{}{}", name, DETAIL_INDENT, error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_lines() {
        let dir = TempDir::new().unwrap();
        let log = InstallLog::new(dir.path().join("state/install.log"));

        log.header(2).unwrap();
        log.record("Git", None).unwrap();
        log.record("Go", Some("`brew install go` failed: boom")).unwrap();

        let text = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].ends_with("  === freshbox install started (2 tasks) ==="));
        assert!(lines[1].ends_with("  [ OK ] Git"));
        assert!(lines[2].ends_with("  [FAIL] Go"));
        assert_eq!(lines[3], "       `brew install go` failed: boom");
        // Timestamp prefix: "YYYY-MM-DD HH:MM:SS"
        assert_eq!(lines[0].find("  "), Some(19));
    }

    #[test]
    fn test_log_appends_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("install.log");

        InstallLog::new(&path).record("A", None).unwrap();
        InstallLog::new(&path).record("B", None).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);
    }
}
