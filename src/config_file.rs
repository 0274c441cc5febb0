//! Saved wizard profiles
//!
//! A profile is the wizard's final selection snapshot as JSON. It can be
//! written at the end of an interactive run (`install --save-profile`) and
//! replayed without the TUI (`install --profile`).

use crate::agent_config::{ClaudeSettings, CodexSettings, REASONING_EFFORTS};
use crate::config::Language;
use crate::installer::InstallRequest;
use crate::selection::Selections;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub language: Language,
    pub selections: Selections,
    pub codex: CodexSettings,
    pub claude: ClaudeSettings,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_request(language: Language, request: InstallRequest) -> Self {
        Self {
            language,
            selections: request.selections,
            codex: request.codex,
            claude: request.claude,
        }
    }

    /// What the orchestrator runs for this profile
    pub fn request(&self) -> InstallRequest {
        InstallRequest {
            selections: self.selections.clone(),
            codex: self.codex.clone(),
            claude: self.claude.clone(),
        }
    }

    /// Save profile to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize profile to JSON")?;

        if let Some(parent) = path.as_ref().parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
        fs::write(&path, json)
            .with_context(|| format!("Failed to write profile to {:?}", path.as_ref()))?;

        // Profiles can carry API keys
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to restrict permissions on {:?}", path.as_ref()))?;
        }

        Ok(())
    }

    /// Load profile from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read profile from {:?}", path.as_ref()))?;

        let profile: Self = serde_json::from_str(&content).context("Failed to parse profile JSON")?;

        Ok(profile)
    }

    /// Validate the profile
    pub fn validate(&self) -> Result<()> {
        let effort = self.codex.reasoning_effort.trim();
        if !effort.is_empty() && !REASONING_EFFORTS.contains(&effort) {
            anyhow::bail!(
                "Codex reasoning effort must be one of {}, got '{}'",
                REASONING_EFFORTS.join(", "),
                effort
            );
        }

        validate_url("Codex base URL", &self.codex.base_url)?;
        validate_url("Claude base URL", &self.claude.base_url)?;

        if self
            .selections
            .node_versions
            .iter()
            .any(|v| v.trim().is_empty())
        {
            anyhow::bail!("Node versions cannot be empty");
        }

        Ok(())
    }
}

fn validate_url(field: &str, url: &str) -> Result<()> {
    let url = url.trim();
    if url.is_empty() {
        return Ok(());
    }
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(()),
        _ => anyhow::bail!("{} must be an http(s) URL, got '{}'", field, url),
    }
}
