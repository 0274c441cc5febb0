//! Bodies of the install tasks that are not config merges

use crate::catalog::{Handler, InstallMethod, SystemDefault};
use crate::command::CommandRunner;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::info;

const HOMEBREW_INSTALL: &str =
    r#"/bin/bash -c "$(curl -fsSL https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh)""#;

const RUSTUP_INSTALL: &str = "curl --proto '=https' --tlsv1.2 -sSf https://sh.rustup.rs | sh -s -- -y";

const LAUNCH_SERVICES_DOMAIN: &str = "com.apple.LaunchServices/com.apple.launchservices.secure";

pub const JAVA_HOME_LINE: &str = "export JAVA_HOME=$(/usr/libexec/java_home)";

/// Install one catalog item the way its [`InstallMethod`] says
pub fn install(runner: &dyn CommandRunner, method: InstallMethod) -> Result<()> {
    match method {
        InstallMethod::HomebrewScript => {
            runner.run_checked("bash", &["-c", HOMEBREW_INSTALL])?;
        }
        InstallMethod::RustupScript => {
            runner.run_checked("bash", &["-c", RUSTUP_INSTALL])?;
        }
        InstallMethod::Formula(name) => {
            runner.run_checked("brew", &["install", name])?;
        }
        InstallMethod::Cask(name) => {
            runner.run_checked("brew", &["install", "--cask", name])?;
        }
        InstallMethod::NpmGlobal(package) => {
            runner.run_checked("npm", &["install", "-g", package])?;
        }
    }
    info!(method = ?method, "installed");
    Ok(())
}

pub fn install_node(runner: &dyn CommandRunner, version: &str) -> Result<()> {
    runner.run_checked("fnm", &["install", version])?;
    info!(version, "installed Node.js");
    Ok(())
}

/// Property-list dictionary for one LaunchServices handler
pub fn handler_entry(handler: Handler, bundle_id: &str) -> String {
    let (key, value) = match handler {
        Handler::UrlScheme(scheme) => ("LSHandlerURLScheme", scheme),
        Handler::ContentType(uti) => ("LSHandlerContentType", uti),
    };
    format!(r#"{{"{}"="{}";"LSHandlerRoleAll"="{}";}}"#, key, value, bundle_id)
}

/// Register every handler of `default`; stops at the first failure
pub fn set_default_handler(runner: &dyn CommandRunner, default: SystemDefault) -> Result<()> {
    for handler in default.handlers() {
        let script = format!(
            "defaults write {} LSHandlers -array-add '{}'",
            LAUNCH_SERVICES_DOMAIN,
            handler_entry(*handler, default.bundle_id())
        );
        runner
            .run_checked("bash", &["-c", &script])
            .with_context(|| format!("register {:?}", handler))?;
    }
    info!(default = %default, bundle = default.bundle_id(), "default handler set");
    Ok(())
}

/// Append the JAVA_HOME export to `zshrc` unless it is already there
pub fn configure_java_home(zshrc: &Path) -> Result<()> {
    let existing = match std::fs::read_to_string(zshrc) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", zshrc.display())),
    };

    if existing.lines().any(|line| line.trim() == JAVA_HOME_LINE) {
        info!("JAVA_HOME already configured");
        return Ok(());
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(zshrc)
        .with_context(|| format!("Failed to open {}", zshrc.display()))?;
    let separator = if existing.is_empty() || existing.ends_with('\n') { "" } else { "\n" };
    write!(file, "{}\n# Java\n{}\n", separator, JAVA_HOME_LINE).context("Failed to append to .zshrc")?;
    info!(path = %zshrc.display(), "JAVA_HOME configured");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::RecordingRunner;
    use tempfile::TempDir;

    #[test]
    fn test_install_commands() {
        let runner = RecordingRunner::new();
        install(&runner, InstallMethod::Formula("git")).unwrap();
        install(&runner, InstallMethod::Cask("zed")).unwrap();
        install(&runner, InstallMethod::NpmGlobal("@openai/codex")).unwrap();
        install_node(&runner, "v22.11.0").unwrap();

        assert_eq!(
            runner.calls(),
            [
                "brew install git",
                "brew install --cask zed",
                "npm install -g @openai/codex",
                "fnm install v22.11.0",
            ]
        );
    }

    #[test]
    fn test_script_installs_go_through_bash() {
        let runner = RecordingRunner::new();
        install(&runner, InstallMethod::RustupScript).unwrap();
        assert!(runner.calls()[0].starts_with("bash -c curl --proto '=https'"));
    }

    #[test]
    fn test_install_failure_carries_output() {
        let runner = RecordingRunner::new().fail_on("brew", "Error: No available formula");
        let err = install(&runner, InstallMethod::Formula("nope")).unwrap_err();
        assert!(err.to_string().contains("No available formula"));
    }

    #[test]
    fn test_handler_entries() {
        assert_eq!(
            handler_entry(Handler::UrlScheme("http"), "com.google.chrome"),
            r#"{"LSHandlerURLScheme"="http";"LSHandlerRoleAll"="com.google.chrome";}"#
        );
        assert_eq!(
            handler_entry(Handler::ContentType("public.plain-text"), "dev.zed.Zed"),
            r#"{"LSHandlerContentType"="public.plain-text";"LSHandlerRoleAll"="dev.zed.Zed";}"#
        );
    }

    #[test]
    fn test_set_default_player_registers_each_type() {
        let runner = RecordingRunner::new();
        set_default_handler(&runner, SystemDefault::Player).unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|c| c.contains("com.colliderli.iina")));
        assert!(calls[2].contains("public.audio"));
    }

    #[test]
    fn test_java_home_appended_once() {
        let dir = TempDir::new().unwrap();
        let zshrc = dir.path().join(".zshrc");
        std::fs::write(&zshrc, "alias ll='ls -l'").unwrap();

        configure_java_home(&zshrc).unwrap();
        configure_java_home(&zshrc).unwrap();

        let text = std::fs::read_to_string(&zshrc).unwrap();
        assert!(text.starts_with("alias ll='ls -l'\n"));
        assert_eq!(text.matches(JAVA_HOME_LINE).count(), 1);
    }

    #[test]
    fn test_java_home_creates_missing_zshrc() {
        let dir = TempDir::new().unwrap();
        let zshrc = dir.path().join(".zshrc");
        configure_java_home(&zshrc).unwrap();
        assert!(std::fs::read_to_string(&zshrc).unwrap().contains(JAVA_HOME_LINE));
    }
}
