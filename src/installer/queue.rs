//! Turning a selection snapshot into an ordered task queue
//!
//! Order matters: Homebrew before anything brewed, the AI CLIs before their
//! config and MCP registrations. Each closure captures owned copies taken
//! here, so the queue never observes later changes to the wizard's state.

use super::actions;
use super::task::InstallTask;
use crate::agent_config::{
    ClaudeSettings, CodexSettings, register_mcp_servers, write_claude_config, write_codex_config,
};
use crate::catalog::{AiTool, CatalogItem, DesktopApp, DevTool, Extra, InstallMethod, McpServer};
use crate::command::CommandRunner;
use crate::config::{HomeLayout, Settings};
use crate::extras;
use crate::probe::ProbeReport;
use crate::selection::Selections;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything the wizard hands to the orchestrator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallRequest {
    pub selections: Selections,
    pub codex: CodexSettings,
    pub claude: ClaudeSettings,
}

/// Shared collaborators the task closures are built from
#[derive(Clone)]
pub struct TaskContext {
    pub runner: Arc<dyn CommandRunner>,
    pub layout: HomeLayout,
    pub dry_run: bool,
    pub mcp_timeout_secs: u64,
}

impl TaskContext {
    pub fn new(runner: Arc<dyn CommandRunner>, settings: &Settings) -> Self {
        Self {
            runner,
            layout: settings.layout.clone(),
            dry_run: settings.dry_run,
            mcp_timeout_secs: settings.mcp_timeout_secs,
        }
    }
}

/// Build the queue; a pure function of the request and the probe report
pub fn build_queue(request: InstallRequest, probe: &ProbeReport, ctx: &TaskContext) -> Vec<InstallTask> {
    let InstallRequest {
        selections,
        codex,
        claude,
    } = request;
    let mut queue = Vec::new();

    // Software not already on the machine
    for tool in selections.tools.in_catalog_order() {
        if !probe.is_installed(tool) {
            push_install(&mut queue, ctx, tool.label(), tool.install_method());
        }
    }
    for app in selections.apps.in_catalog_order() {
        if !probe.is_installed(app) {
            push_install(&mut queue, ctx, app.label(), app.install_method());
        }
    }
    for agent in selections.ai_tools.in_catalog_order() {
        if !probe.is_installed(agent) {
            push_install(&mut queue, ctx, agent.task_label(), agent.install_method());
        }
    }

    // Node versions need fnm, either already present or queued above
    let fnm_available = selections.tools.is_selected(&DevTool::Fnm) || probe.is_installed(DevTool::Fnm);
    if fnm_available {
        for version in sorted_node_versions(selections.node_versions.iter()) {
            let runner = Arc::clone(&ctx.runner);
            let name = format!("Node.js {}", version);
            queue.push(InstallTask::new(name, move || actions::install_node(runner.as_ref(), &version)));
        }
    } else if !selections.node_versions.is_empty() {
        warn!("Node versions selected without fnm, skipping them");
    }

    // Agent configuration
    let codex_configured = codex.has_credentials();
    let claude_configured = claude.has_credentials();
    if codex_configured {
        let layout = ctx.layout.clone();
        let settings = codex.clone();
        queue.push(InstallTask::new("Codex config (config.toml + auth.json)", move || {
            write_codex_config(&layout, &settings)
        }));
    }
    if claude_configured {
        let layout = ctx.layout.clone();
        let settings = claude.clone();
        queue.push(InstallTask::new("Claude Code config", move || {
            write_claude_config(&layout, &settings)
        }));
    }

    // MCP servers, only for agents that will exist
    let servers: Vec<McpServer> = selections
        .mcp_servers
        .in_catalog_order()
        .iter()
        .map(|preset| preset.server(ctx.layout.home()))
        .collect();
    if !servers.is_empty() {
        let agents = [
            (AiTool::ClaudeCode, claude_configured, "MCP servers for Claude Code"),
            (AiTool::Codex, codex_configured, "MCP servers for Codex"),
        ];
        for (agent, configured, name) in agents {
            let ready = selections.ai_tools.is_selected(&agent) || configured || probe.is_installed(agent);
            if !ready {
                debug!(agent = %agent, "skipping MCP registration, agent not available");
                continue;
            }
            let runner = Arc::clone(&ctx.runner);
            let layout = ctx.layout.clone();
            let servers = servers.clone();
            let timeout = ctx.mcp_timeout_secs;
            queue.push(InstallTask::new(name, move || {
                register_mcp_servers(runner.as_ref(), &layout, agent, &servers, timeout)
            }));
        }
    }

    for default in selections.system_defaults.in_catalog_order() {
        let runner = Arc::clone(&ctx.runner);
        queue.push(InstallTask::new(default.label(), move || {
            actions::set_default_handler(runner.as_ref(), default)
        }));
    }

    if selections.tools.is_selected(&DevTool::Java) {
        let zshrc = ctx.layout.zshrc();
        queue.push(InstallTask::new("Configure JAVA_HOME", move || {
            actions::configure_java_home(&zshrc)
        }));
    }

    let karabiner_installed = probe.is_installed(DesktopApp::Karabiner);
    for extra in selections.extras.in_catalog_order() {
        let runner = Arc::clone(&ctx.runner);
        let layout = ctx.layout.clone();
        queue.push(InstallTask::new(extra.label(), move || match extra {
            Extra::ZedTheme => extras::setup_zed_theme(runner.as_ref(), &layout),
            Extra::KakuSetup => extras::setup_kaku(runner.as_ref(), &layout),
            Extra::KarabinerShortcut => {
                extras::setup_karabiner(runner.as_ref(), &layout, karabiner_installed)
            }
            Extra::DevWorkspace => extras::setup_dev_workspace(runner.as_ref(), &layout),
        }));
    }

    if ctx.dry_run {
        queue.into_iter().map(InstallTask::into_dry_run).collect()
    } else {
        queue
    }
}

fn push_install(queue: &mut Vec<InstallTask>, ctx: &TaskContext, name: &str, method: InstallMethod) {
    if method.needs_target() && method.target().is_empty() {
        warn!(task = name, "no install target, task omitted");
        return;
    }
    let runner = Arc::clone(&ctx.runner);
    queue.push(InstallTask::new(name, move || actions::install(runner.as_ref(), method)));
}

/// Numeric components of `v22.11.0`; anything unparsable counts as zero
fn version_key(version: &str) -> Vec<u64> {
    version
        .trim_start_matches('v')
        .split('.')
        .map(|part| part.parse().unwrap_or(0))
        .collect()
}

/// Newest first
pub fn sorted_node_versions<'a>(versions: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut versions: Vec<String> = versions.cloned().collect();
    versions.sort_by(|a, b| match version_key(b).cmp(&version_key(a)) {
        Ordering::Equal => a.cmp(b),
        other => other,
    });
    versions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{McpPreset, SystemDefault};
    use crate::command::RecordingRunner;

    fn context(runner: Arc<RecordingRunner>) -> TaskContext {
        TaskContext {
            runner,
            layout: HomeLayout::new("/nonexistent/home"),
            dry_run: false,
            mcp_timeout_secs: 60,
        }
    }

    fn names(queue: &[InstallTask]) -> Vec<&str> {
        queue.iter().map(InstallTask::name).collect()
    }

    #[test]
    fn test_empty_selection_builds_empty_queue() {
        let ctx = context(Arc::new(RecordingRunner::new()));
        assert!(build_queue(InstallRequest::default(), &ProbeReport::new(), &ctx).is_empty());
    }

    #[test]
    fn test_installed_items_are_skipped() {
        let ctx = context(Arc::new(RecordingRunner::new()));
        let mut request = InstallRequest::default();
        request.selections.tools.select_all([DevTool::Homebrew, DevTool::Git]);
        let probe = ProbeReport::new().with_installed(DevTool::Homebrew, "Homebrew 4.4.0");

        assert_eq!(names(&build_queue(request, &probe, &ctx)), ["Git"]);
    }

    #[test]
    fn test_category_order() {
        let ctx = context(Arc::new(RecordingRunner::new()));
        let mut request = InstallRequest::default();
        let s = &mut request.selections;
        s.extras.set(Extra::DevWorkspace, true);
        s.system_defaults.set(SystemDefault::Browser, true);
        s.mcp_servers.set(McpPreset::Memory, true);
        s.ai_tools.set(AiTool::Codex, true);
        s.apps.set(DesktopApp::Zed, true);
        s.tools.select_all([DevTool::Java, DevTool::Fnm, DevTool::Homebrew]);
        s.node_versions.select_all(["v20.18.0".to_string(), "v22.11.0".to_string()]);
        request.claude.api_key = "sk-ant".into();

        let queue = build_queue(request, &ProbeReport::new(), &ctx);
        assert_eq!(
            names(&queue),
            [
                "Homebrew",
                "Java (JDK)",
                "fnm",
                "Zed",
                "Codex CLI",
                "Node.js v22.11.0",
                "Node.js v20.18.0",
                "Claude Code config",
                "MCP servers for Claude Code",
                "MCP servers for Codex",
                "Set default browser → Chrome",
                "Configure JAVA_HOME",
                "Developer Workspace + Finder config",
            ]
        );
    }

    #[test]
    fn test_mcp_skipped_without_agents() {
        let ctx = context(Arc::new(RecordingRunner::new()));
        let mut request = InstallRequest::default();
        request.selections.mcp_servers.set(McpPreset::Fetch, true);

        assert!(build_queue(request.clone(), &ProbeReport::new(), &ctx).is_empty());

        let probe = ProbeReport::new().with_installed(AiTool::Codex, "codex-cli 0.46.0");
        assert_eq!(names(&build_queue(request, &probe, &ctx)), ["MCP servers for Codex"]);
    }

    #[test]
    fn test_node_versions_need_fnm() {
        let ctx = context(Arc::new(RecordingRunner::new()));
        let mut request = InstallRequest::default();
        request.selections.node_versions.set("v22.11.0".to_string(), true);

        assert!(build_queue(request.clone(), &ProbeReport::new(), &ctx).is_empty());

        let probe = ProbeReport::new().with_installed(DevTool::Fnm, "fnm 1.37.1");
        assert_eq!(names(&build_queue(request, &probe, &ctx)), ["Node.js v22.11.0"]);
    }

    #[test]
    fn test_queue_is_a_snapshot() {
        let runner = Arc::new(RecordingRunner::new());
        let ctx = context(runner.clone());
        let mut request = InstallRequest::default();
        request.selections.tools.set(DevTool::Go, true);

        let queue = build_queue(request.clone(), &ProbeReport::new(), &ctx);
        request.selections.tools.clear();
        request.selections.tools.set(DevTool::Bun, true);

        for task in queue {
            assert!(task.run().succeeded());
        }
        assert_eq!(runner.calls(), ["brew install go"]);
    }

    #[test]
    fn test_dry_run_runs_nothing() {
        let runner = Arc::new(RecordingRunner::new());
        let mut ctx = context(runner.clone());
        ctx.dry_run = true;
        let mut request = InstallRequest::default();
        request.selections.apps.set(DesktopApp::Chrome, true);

        let queue = build_queue(request, &ProbeReport::new(), &ctx);
        assert_eq!(names(&queue), ["Google Chrome"]);
        for task in queue {
            task.run();
        }
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_node_version_sort() {
        let versions = ["v9.11.2", "v22.1.0", "v18.20.4", "v22.11.0"].map(String::from);
        assert_eq!(
            sorted_node_versions(versions.iter()),
            ["v22.11.0", "v22.1.0", "v18.20.4", "v9.11.2"]
        );
    }
}
