//! Capability probe: is a tool already on this machine, and which version?
//!
//! Absence is never an error. A binary that exists but cannot answer its
//! version query (the `/usr/bin/java` stub without a JDK, for one) counts as
//! not installed.

use crate::catalog::{AiTool, CatalogItem, DesktopApp, DevTool, ProbeSpec};
use crate::command::CommandRunner;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Where Homebrew keeps its JDK; `/usr/bin/java` is only a stub
const HOMEBREW_JAVA: &str = "/opt/homebrew/opt/openjdk/bin/java";

/// Commands rustup installs into `~/.cargo/bin`
const CARGO_COMMANDS: [&str; 3] = ["rustup", "rustc", "cargo"];

/// Offered when `fnm list-remote` is unavailable
pub const FALLBACK_NODE_VERSIONS: [&str; 4] = ["v22", "v20", "v18", "v16"];

/// Remote versions offered, newest first
const REMOTE_NODE_LIMIT: usize = 30;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub installed: bool,
    pub version: Option<String>,
}

impl ProbeResult {
    pub fn missing() -> Self {
        Self::default()
    }

    pub fn installed(version: Option<String>) -> Self {
        Self {
            installed: true,
            version,
        }
    }
}

/// Anything that can answer "is this installed?"
pub trait Probe: Send + Sync {
    fn probe(&self, spec: &ProbeSpec) -> ProbeResult;
}

/// Probe results for the whole catalog, keyed by [`CatalogItem::key`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    results: BTreeMap<String, ProbeResult>,
}

impl ProbeReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe every installable catalog item
    pub fn collect(probe: &dyn Probe) -> Self {
        let mut report = Self::new();
        report.probe_all::<DevTool>(probe);
        report.probe_all::<DesktopApp>(probe);
        report.probe_all::<AiTool>(probe);
        info!(
            installed = report.results.values().filter(|r| r.installed).count(),
            total = report.results.len(),
            "capability probe finished"
        );
        report
    }

    fn probe_all<T: CatalogItem>(&mut self, probe: &dyn Probe) {
        for item in T::iter() {
            if let Some(spec) = item.probe_spec() {
                let result = probe.probe(&spec);
                debug!(item = %item.key(), installed = result.installed, version = ?result.version, "probed");
                self.results.insert(item.key(), result);
            }
        }
    }

    pub fn record<T: CatalogItem>(&mut self, item: T, result: ProbeResult) {
        self.results.insert(item.key(), result);
    }

    /// Mark `item` installed; handy for building reports by hand
    pub fn with_installed<T: CatalogItem>(mut self, item: T, version: &str) -> Self {
        self.record(item, ProbeResult::installed(Some(version.to_string())));
        self
    }

    pub fn get<T: CatalogItem>(&self, item: T) -> Option<&ProbeResult> {
        self.results.get(&item.key())
    }

    pub fn is_installed<T: CatalogItem>(&self, item: T) -> bool {
        self.get(item).is_some_and(|r| r.installed)
    }

    pub fn version<T: CatalogItem>(&self, item: T) -> Option<&str> {
        self.get(item).and_then(|r| r.version.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ProbeResult)> {
        self.results.iter()
    }
}

/// Probe backed by the real filesystem and a [`CommandRunner`]
pub struct SystemProbe {
    runner: Arc<dyn CommandRunner>,
    home: PathBuf,
    applications_dir: PathBuf,
    search_path: Option<OsString>,
}

impl SystemProbe {
    pub fn new(runner: Arc<dyn CommandRunner>, home: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            home: home.into(),
            applications_dir: PathBuf::from("/Applications"),
            search_path: std::env::var_os("PATH"),
        }
    }

    pub fn with_applications_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.applications_dir = dir.into();
        self
    }

    pub fn with_search_path(mut self, path: Option<OsString>) -> Self {
        self.search_path = path;
        self
    }

    fn cargo_bin(&self, command: &str) -> PathBuf {
        self.home.join(".cargo").join("bin").join(command)
    }

    /// Locate `command`, looking in tool-specific places before `PATH`
    pub fn resolve_command(&self, command: &str) -> Option<PathBuf> {
        let path = Path::new(command);
        if path.is_absolute() {
            return is_executable(path).then(|| path.to_path_buf());
        }

        if CARGO_COMMANDS.contains(&command) {
            let cargo = self.cargo_bin(command);
            if is_executable(&cargo) {
                return Some(cargo);
            }
        }

        if command == "java" {
            let java = Path::new(HOMEBREW_JAVA);
            if is_executable(java) {
                return Some(java.to_path_buf());
            }
        }

        if let Some(search_path) = &self.search_path {
            for dir in std::env::split_paths(search_path) {
                let candidate = dir.join(command);
                if is_executable(&candidate) {
                    return Some(candidate);
                }
            }
        }

        let cargo = self.cargo_bin(command);
        is_executable(&cargo).then_some(cargo)
    }

    fn bundle_version(&self, bundle: &Path) -> Option<String> {
        let plist = bundle.join("Contents").join("Info.plist");
        let plist = plist.to_string_lossy();
        self.runner
            .run("defaults", &["read", plist.as_ref(), "CFBundleShortVersionString"])
            .ok()
            .filter(|out| out.exit_ok)
            .and_then(|out| out.first_line())
    }
}

impl Probe for SystemProbe {
    fn probe(&self, spec: &ProbeSpec) -> ProbeResult {
        if let Some(bundle) = spec.app_bundle {
            let bundle = self.applications_dir.join(bundle);
            if bundle.is_dir() {
                return ProbeResult::installed(self.bundle_version(&bundle));
            }
        }

        let Some(binary) = self.resolve_command(spec.command) else {
            return ProbeResult::missing();
        };

        let Some(flag) = spec.version_flag else {
            return ProbeResult::installed(None);
        };

        let binary = binary.to_string_lossy();
        match self.runner.run(&binary, &[flag]) {
            Ok(output) if output.exit_ok => ProbeResult::installed(output.first_line()),
            Ok(_) => {
                debug!(command = %binary, "version query failed, treating as not installed");
                ProbeResult::missing()
            }
            Err(e) => {
                debug!(command = %binary, error = %e, "version query could not start");
                ProbeResult::missing()
            }
        }
    }
}

/// Node versions to offer: the newest remote releases, or the fallback list
pub fn available_node_versions(runner: &dyn CommandRunner) -> Vec<String> {
    let remote = match runner.run("fnm", &["list-remote"]) {
        Ok(output) if output.exit_ok => output
            .combined_output
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .filter(|v| v.starts_with('v'))
            .map(str::to_string)
            .collect::<Vec<_>>(),
        Ok(_) => Vec::new(),
        Err(e) => {
            debug!(error = %e, "fnm unavailable");
            Vec::new()
        }
    };

    if remote.is_empty() {
        info!("using fallback node versions");
        return FALLBACK_NODE_VERSIONS.iter().map(|v| v.to_string()).collect();
    }
    remote.into_iter().rev().take(REMOTE_NODE_LIMIT).collect()
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::RecordingRunner;
    use std::fs;
    use tempfile::TempDir;

    fn make_executable(path: &Path) {
        use std::os::unix::fs::PermissionsExt;
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn probe_in(dir: &TempDir, runner: RecordingRunner) -> SystemProbe {
        let bin = dir.path().join("bin");
        SystemProbe::new(Arc::new(runner), dir.path().join("home"))
            .with_applications_dir(dir.path().join("Applications"))
            .with_search_path(Some(bin.into_os_string()))
    }

    #[test]
    fn test_missing_command_is_not_installed() {
        let dir = TempDir::new().unwrap();
        let probe = probe_in(&dir, RecordingRunner::new());
        let result = probe.probe(&DevTool::Go.probe_spec().unwrap());
        assert_eq!(result, ProbeResult::missing());
    }

    #[test]
    fn test_version_is_first_line() {
        let dir = TempDir::new().unwrap();
        make_executable(&dir.path().join("bin/git"));

        let runner = RecordingRunner::new().respond("", "git version 2.45.1\nextra\n");
        let probe = probe_in(&dir, runner);
        let result = probe.probe(&DevTool::Git.probe_spec().unwrap());

        assert!(result.installed);
        assert_eq!(result.version.as_deref(), Some("git version 2.45.1"));
    }

    #[test]
    fn test_failing_version_query_is_not_installed() {
        let dir = TempDir::new().unwrap();
        make_executable(&dir.path().join("bin/java"));

        let runner = RecordingRunner::new().fail_on("", "No Java runtime present");
        let probe = probe_in(&dir, runner);

        let spec = ProbeSpec {
            command: "java",
            version_flag: Some("--version"),
            app_bundle: None,
        };
        assert!(!probe.probe(&spec).installed);
    }

    #[test]
    fn test_cargo_bin_preferred_for_rustup() {
        let dir = TempDir::new().unwrap();
        let cargo_rustup = dir.path().join("home/.cargo/bin/rustup");
        make_executable(&cargo_rustup);
        make_executable(&dir.path().join("bin/rustup"));

        let probe = probe_in(&dir, RecordingRunner::new());
        assert_eq!(probe.resolve_command("rustup"), Some(cargo_rustup));
    }

    #[test]
    fn test_cargo_bin_is_fallback_for_other_commands() {
        let dir = TempDir::new().unwrap();
        let cargo_fnm = dir.path().join("home/.cargo/bin/fnm");
        make_executable(&cargo_fnm);

        let probe = probe_in(&dir, RecordingRunner::new());
        assert_eq!(probe.resolve_command("fnm"), Some(cargo_fnm));
    }

    #[test]
    fn test_app_bundle_checked_first() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("Applications/Zed.app")).unwrap();

        let runner = RecordingRunner::new().respond("defaults read", "0.160.4\n");
        let probe = probe_in(&dir, runner);
        let result = probe.probe(&DesktopApp::Zed.probe_spec().unwrap());

        assert!(result.installed);
        assert_eq!(result.version.as_deref(), Some("0.160.4"));
    }

    #[test]
    fn test_report_lookup() {
        let report = ProbeReport::new().with_installed(DevTool::Homebrew, "Homebrew 4.4.0");
        assert!(report.is_installed(DevTool::Homebrew));
        assert!(!report.is_installed(DevTool::Git));
        assert_eq!(report.version(DevTool::Homebrew), Some("Homebrew 4.4.0"));
    }

    #[test]
    fn test_collect_covers_installable_items() {
        struct NothingInstalled;
        impl Probe for NothingInstalled {
            fn probe(&self, _spec: &ProbeSpec) -> ProbeResult {
                ProbeResult::missing()
            }
        }

        let report = ProbeReport::collect(&NothingInstalled);
        assert_eq!(report.iter().count(), 12 + 7 + 2);
        assert!(report.get(AiTool::Codex).is_some());
    }

    #[test]
    fn test_node_versions_newest_first() {
        let runner = RecordingRunner::new()
            .respond("fnm list-remote", "v16.20.2\nv18.20.4 (Hydrogen)\nv22.3.0\n");
        assert_eq!(
            available_node_versions(&runner),
            vec!["v22.3.0", "v18.20.4", "v16.20.2"]
        );
    }

    #[test]
    fn test_node_versions_fallback() {
        let runner = RecordingRunner::new().fail_on("fnm", "command not found");
        assert_eq!(available_node_versions(&runner), FALLBACK_NODE_VERSIONS.to_vec());
    }
}
