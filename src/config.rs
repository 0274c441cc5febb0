//! Runtime settings and the on-disk layout of the user's home directory
//!
//! [`Settings`] is built once from CLI flags and the environment.
//! [`HomeLayout`] is the single place that knows where each downstream tool
//! keeps its files, so tests can point the whole installer at a temp dir.

use crate::error::{FreshboxError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use strum::{Display, EnumIter, EnumString};

/// Directory under the home root holding freshbox's own files
pub const STATE_DIR_NAME: &str = ".freshbox";

/// Number of finished tasks shown on the progress page
pub const DEFAULT_OUTCOME_WINDOW: usize = 10;

/// Characters of an error kept in the on-screen summary
pub const DEFAULT_SUMMARY_LEN: usize = 60;

/// `startup_timeout_sec` written for every Codex MCP server
pub const DEFAULT_MCP_TIMEOUT_SECS: u64 = 60;

/// Wizard display language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    /// Name shown on the language page, in the language itself
    pub fn native_name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Zh => "中文",
        }
    }
}

/// Paths of every file freshbox reads or writes under a home root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeLayout {
    home: PathBuf,
}

impl HomeLayout {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn state_dir(&self) -> PathBuf {
        self.home.join(STATE_DIR_NAME)
    }

    pub fn install_log(&self) -> PathBuf {
        self.state_dir().join("install.log")
    }

    pub fn diagnostic_log(&self) -> PathBuf {
        self.state_dir().join("freshbox.log")
    }

    /// Scratch space for clones that outlive a single task
    pub fn cache_dir(&self) -> PathBuf {
        self.state_dir().join("cache")
    }

    pub fn codex_config(&self) -> PathBuf {
        self.home.join(".codex").join("config.toml")
    }

    pub fn codex_auth(&self) -> PathBuf {
        self.home.join(".codex").join("auth.json")
    }

    pub fn claude_settings(&self) -> PathBuf {
        self.home.join(".claude").join("settings.json")
    }

    pub fn zshrc(&self) -> PathBuf {
        self.home.join(".zshrc")
    }

    pub fn cargo_bin(&self) -> PathBuf {
        self.home.join(".cargo").join("bin")
    }

    pub fn local_bin(&self) -> PathBuf {
        self.home.join(".local").join("bin")
    }

    pub fn zed_config_dir(&self) -> PathBuf {
        self.home.join(".config").join("zed")
    }

    pub fn kaku_config_dir(&self) -> PathBuf {
        self.home.join(".config").join("kaku")
    }

    pub fn zsh_plugins_dir(&self) -> PathBuf {
        self.kaku_config_dir().join("zsh").join("plugins")
    }

    pub fn karabiner_config(&self) -> PathBuf {
        self.home
            .join(".config")
            .join("karabiner")
            .join("karabiner.json")
    }

    pub fn developer_dir(&self) -> PathBuf {
        self.home.join("Developer")
    }
}

/// Runtime configuration for one freshbox process
#[derive(Debug, Clone)]
pub struct Settings {
    pub layout: HomeLayout,
    pub dry_run: bool,
    pub outcome_window: usize,
    pub summary_len: usize,
    pub mcp_timeout_secs: u64,
}

impl Settings {
    /// Settings rooted at `home` with default limits
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            layout: HomeLayout::new(home),
            dry_run: false,
            outcome_window: DEFAULT_OUTCOME_WINDOW,
            summary_len: DEFAULT_SUMMARY_LEN,
            mcp_timeout_secs: DEFAULT_MCP_TIMEOUT_SECS,
        }
    }

    /// Resolve the home root: explicit override first, then the user's home
    pub fn resolve(home_override: Option<PathBuf>, dry_run: bool) -> Result<Self> {
        let home = match home_override {
            Some(home) => home,
            None => dirs::home_dir()
                .ok_or_else(|| FreshboxError::config("could not determine the home directory"))?,
        };

        if !home.is_dir() {
            return Err(FreshboxError::config(format!(
                "home directory {} does not exist",
                home.display()
            )));
        }

        let mut settings = Self::new(home);
        settings.dry_run = dry_run;
        Ok(settings)
    }

    pub fn home(&self) -> &Path {
        self.layout.home()
    }

    /// Create the state directory if needed
    pub fn ensure_state_dir(&self) -> Result<PathBuf> {
        let dir = self.layout.state_dir();
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use tempfile::TempDir;

    #[test]
    fn test_layout_paths() {
        let layout = HomeLayout::new("/Users/dev");
        assert_eq!(layout.install_log(), PathBuf::from("/Users/dev/.freshbox/install.log"));
        assert_eq!(layout.codex_config(), PathBuf::from("/Users/dev/.codex/config.toml"));
        assert_eq!(
            layout.claude_settings(),
            PathBuf::from("/Users/dev/.claude/settings.json")
        );
    }

    #[test]
    fn test_resolve_with_override() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::resolve(Some(dir.path().to_path_buf()), true).unwrap();

        assert!(settings.dry_run);
        assert_eq!(settings.home(), dir.path());
        assert_eq!(settings.outcome_window, 10);
        assert_eq!(settings.summary_len, 60);
        assert_eq!(settings.mcp_timeout_secs, 60);
    }

    #[test]
    fn test_resolve_rejects_missing_home() {
        let result = Settings::resolve(Some(PathBuf::from("/definitely/not/here")), false);
        assert!(matches!(result, Err(FreshboxError::Config(_))));
    }

    #[test]
    fn test_ensure_state_dir() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::new(dir.path());
        let state = settings.ensure_state_dir().unwrap();
        assert!(state.is_dir());
        assert!(state.ends_with(".freshbox"));
    }

    #[test]
    fn test_language_parse() {
        assert_eq!(Language::from_str("zh").unwrap(), Language::Zh);
        assert_eq!(Language::En.to_string(), "en");
        assert_eq!(Language::Zh.native_name(), "中文");
    }
}
