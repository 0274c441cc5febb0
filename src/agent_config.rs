//! Configuration for the AI coding tools (Codex and Claude Code)
//!
//! Both tools keep files the user edits by hand, so every write is a merge:
//! Codex's `config.toml` through the line-oriented merge, the JSON files
//! through the document merge. MCP servers are registered through each
//! tool's own CLI rather than by editing its files.

use crate::catalog::{AiTool, McpServer};
use crate::command::CommandRunner;
use crate::config::HomeLayout;
use crate::merge::{
    Document, DocumentPatch, SectionRewrite, ensure_section_key, merge_document,
    merge_line_config, write_merged,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Provider name freshbox owns in Codex's `[model_providers.*]`
pub const CODEX_PROVIDER: &str = "freshbox";

/// Accepted values for Codex's `model_reasoning_effort`
pub const REASONING_EFFORTS: [&str; 4] = ["minimal", "low", "medium", "high"];

/// Mode for files holding API keys
const SECRET_FILE_MODE: u32 = 0o600;

/// Values collected on the Codex config page
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodexSettings {
    pub model: String,
    pub reasoning_effort: String,
    pub base_url: String,
    pub api_key: String,
}

impl CodexSettings {
    /// Form defaults
    pub fn suggested() -> Self {
        Self {
            model: "o4-mini".to_string(),
            reasoning_effort: "medium".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
        }
    }

    /// A config write is only queued when the user supplied a key or an endpoint
    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() || !self.base_url.is_empty()
    }
}

/// Values collected on the Claude Code config page
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaudeSettings {
    pub model: String,
    pub base_url: String,
    pub api_key: String,
}

impl ClaudeSettings {
    pub fn suggested() -> Self {
        Self {
            model: "claude-sonnet-4-6".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            api_key: String::new(),
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() || !self.base_url.is_empty()
    }
}

/// `key = "value"` with TOML string quoting
fn toml_assignment(key: &str, value: &str) -> String {
    format!("{} = {}", key, toml::Value::String(value.to_string()))
}

/// Top-level updates and provider section for Codex's `config.toml`
pub fn codex_line_updates(
    settings: &CodexSettings,
) -> (BTreeMap<String, String>, Option<SectionRewrite>) {
    let mut updates = BTreeMap::new();
    if !settings.model.is_empty() {
        updates.insert("model".to_string(), toml_assignment("model", &settings.model));
    }
    if !settings.reasoning_effort.is_empty() {
        updates.insert(
            "model_reasoning_effort".to_string(),
            toml_assignment("model_reasoning_effort", &settings.reasoning_effort),
        );
    }

    if settings.base_url.is_empty() {
        return (updates, None);
    }

    updates.insert(
        "model_provider".to_string(),
        toml_assignment("model_provider", CODEX_PROVIDER),
    );
    let rewrite = SectionRewrite::new(
        format!("model_providers.{}", CODEX_PROVIDER),
        vec![
            toml_assignment("name", "openai"),
            toml_assignment("base_url", &settings.base_url),
            toml_assignment("wire_api", "responses"),
            "requires_openai_auth = true".to_string(),
        ],
    );
    (updates, Some(rewrite))
}

/// Merge Codex settings into `config.toml` and the key into `auth.json`
pub fn write_codex_config(layout: &HomeLayout, settings: &CodexSettings) -> Result<()> {
    let (updates, rewrite) = codex_line_updates(settings);
    let config_path = layout.codex_config();

    if !updates.is_empty() || rewrite.is_some() {
        write_merged(&config_path, None, |existing| {
            Ok(merge_line_config(existing, &updates, rewrite.as_ref()))
        })
        .context("Failed to update Codex config.toml")?;
        info!(path = %config_path.display(), "updated Codex config");
    }

    if !settings.api_key.is_empty() {
        let patch = DocumentPatch::new().scalar("OPENAI_API_KEY", settings.api_key.as_str());
        write_json_merged(&layout.codex_auth(), &patch, Some(SECRET_FILE_MODE))
            .context("Failed to update Codex auth.json")?;
        info!("stored Codex API key");
    }

    Ok(())
}

/// Patch for Claude Code's `settings.json`
pub fn claude_patch(settings: &ClaudeSettings) -> DocumentPatch {
    DocumentPatch::new()
        .scalar("model", settings.model.as_str())
        .map_entry("env", "ANTHROPIC_API_KEY", settings.api_key.as_str())
        .map_entry("env", "ANTHROPIC_BASE_URL", settings.base_url.as_str())
}

/// Merge Claude Code settings into `~/.claude/settings.json`
pub fn write_claude_config(layout: &HomeLayout, settings: &ClaudeSettings) -> Result<()> {
    let path = layout.claude_settings();
    write_json_merged(&path, &claude_patch(settings), Some(SECRET_FILE_MODE))
        .context("Failed to update Claude Code settings.json")?;
    info!(path = %path.display(), "updated Claude Code settings");
    Ok(())
}

fn write_json_merged(path: &std::path::Path, patch: &DocumentPatch, mode: Option<u32>) -> Result<()> {
    write_merged(path, mode, |existing| {
        let merged = merge_document(Document::parse_lenient(existing), patch);
        merged
            .to_pretty_string()
            .context("Failed to serialize merged document")
    })
}

/// CLI binary of an AI tool
pub fn cli_program(agent: AiTool) -> &'static str {
    match agent {
        AiTool::Codex => "codex",
        AiTool::ClaudeCode => "claude",
    }
}

/// `npm cache add` every npx package so the first MCP start is not a download
pub fn prefetch_mcp_packages(runner: &dyn CommandRunner, servers: &[McpServer]) {
    for package in servers.iter().filter_map(McpServer::npx_package) {
        match runner.run("npm", &["cache", "add", package]) {
            Ok(out) if out.exit_ok => debug!(package, "prefetched MCP package"),
            Ok(out) => warn!(package, output = %out.combined_output.trim(), "MCP package prefetch failed"),
            Err(e) => warn!(package, error = %e, "could not run npm cache add"),
        }
    }
}

/// Register `servers` with one AI tool, replacing same-named registrations.
///
/// Every server is attempted; failures are collected into one error. Codex
/// additionally gets `startup_timeout_sec` on each `[mcp_servers.*]` section.
pub fn register_mcp_servers(
    runner: &dyn CommandRunner,
    layout: &HomeLayout,
    agent: AiTool,
    servers: &[McpServer],
    timeout_secs: u64,
) -> Result<()> {
    let program = cli_program(agent);
    let mut failures: Vec<String> = Vec::new();

    prefetch_mcp_packages(runner, servers);

    for server in servers {
        let mut remove = vec!["mcp", "remove"];
        let mut add = vec!["mcp", "add"];
        if agent == AiTool::ClaudeCode {
            remove.extend(["-s", "user"]);
            add.extend(["-s", "user"]);
        }
        remove.push(&server.name);
        add.extend([server.name.as_str(), "--", server.command.as_str()]);
        add.extend(server.args.iter().map(String::as_str));

        // Not registered yet is the common case
        let _ = runner.run(program, &remove);

        match runner.run(program, &add) {
            Ok(out) if out.exit_ok => info!(agent = %agent, server = %server.name, "registered MCP server"),
            Ok(out) => failures.push(format!("{}: {}", server.name, out.combined_output.trim())),
            Err(e) => failures.push(format!("{}: {}", server.name, e)),
        }
    }

    if agent == AiTool::Codex {
        if let Err(e) = add_codex_startup_timeout(layout, timeout_secs) {
            failures.push(format!("timeout config: {:#}", e));
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("failed to add MCP servers: {}", failures.join("; "))
    }
}

/// Give every Codex MCP server section a startup timeout
pub fn add_codex_startup_timeout(layout: &HomeLayout, timeout_secs: u64) -> Result<()> {
    let path = layout.codex_config();
    if !path.exists() {
        debug!(path = %path.display(), "no Codex config yet, skipping MCP timeouts");
        return Ok(());
    }
    let key_line = format!("startup_timeout_sec = {}", timeout_secs);
    write_merged(&path, None, |existing| {
        Ok(ensure_section_key(existing, "mcp_servers.", &key_line))
    })
}
