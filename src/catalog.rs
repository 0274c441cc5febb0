//! Everything the wizard can offer, as typed enums
//!
//! Each selection page lists one of these enums. Identifiers (`strum`
//! serializations) are what profiles store and what the probe report is keyed
//! by; labels are what the user sees and what task names are built from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// How a capability is checked on the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSpec {
    /// Bare command name or absolute path
    pub command: &'static str,
    /// Flag that prints a version; `None` means presence is enough
    pub version_flag: Option<&'static str>,
    /// `.app` bundle name under the applications directory, checked first
    pub app_bundle: Option<&'static str>,
}

impl ProbeSpec {
    const fn command(command: &'static str, version_flag: &'static str) -> Self {
        Self {
            command,
            version_flag: Some(version_flag),
            app_bundle: None,
        }
    }

    const fn presence(command: &'static str) -> Self {
        Self {
            command,
            version_flag: None,
            app_bundle: None,
        }
    }

    const fn bundle(self, bundle: &'static str) -> Self {
        Self {
            app_bundle: Some(bundle),
            ..self
        }
    }
}

/// How a selected, not-yet-installed item gets installed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMethod {
    /// Official Homebrew install script
    HomebrewScript,
    /// `sh.rustup.rs` script
    RustupScript,
    /// `brew install <formula>`
    Formula(&'static str),
    /// `brew install --cask <cask>`
    Cask(&'static str),
    /// `npm install -g <package>`
    NpmGlobal(&'static str),
}

impl InstallMethod {
    /// The static install target, empty for script installs
    pub fn target(&self) -> &'static str {
        match self {
            Self::HomebrewScript | Self::RustupScript => "",
            Self::Formula(name) | Self::Cask(name) | Self::NpmGlobal(name) => name,
        }
    }

    /// Script installs carry their own target
    pub fn needs_target(&self) -> bool {
        !matches!(self, Self::HomebrewScript | Self::RustupScript)
    }
}

/// Shared surface of every catalog enum
pub trait CatalogItem: Copy + Ord + fmt::Display + IntoEnumIterator + 'static {
    /// Key prefix in the probe report
    const KIND: &'static str;

    fn label(&self) -> &'static str;

    fn description(&self) -> &'static str {
        ""
    }

    /// `None` for items that are configuration, not software
    fn probe_spec(&self) -> Option<ProbeSpec> {
        None
    }

    /// Probe report key, e.g. `tool:git`
    fn key(&self) -> String {
        format!("{}:{}", Self::KIND, self)
    }

    fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

// ============================================================================
// Development tools
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DevTool {
    Homebrew,
    Git,
    Java,
    Maven,
    Gradle,
    Python,
    Uv,
    Fnm,
    Pnpm,
    Bun,
    Rust,
    Go,
}

impl DevTool {
    pub fn install_method(&self) -> InstallMethod {
        match self {
            Self::Homebrew => InstallMethod::HomebrewScript,
            Self::Rust => InstallMethod::RustupScript,
            Self::Git => InstallMethod::Formula("git"),
            Self::Java => InstallMethod::Formula("openjdk"),
            Self::Maven => InstallMethod::Formula("maven"),
            Self::Gradle => InstallMethod::Formula("gradle"),
            Self::Python => InstallMethod::Formula("python"),
            Self::Uv => InstallMethod::Formula("uv"),
            Self::Fnm => InstallMethod::Formula("fnm"),
            Self::Pnpm => InstallMethod::Formula("pnpm"),
            Self::Bun => InstallMethod::Formula("bun"),
            Self::Go => InstallMethod::Formula("go"),
        }
    }
}

impl CatalogItem for DevTool {
    const KIND: &'static str = "tool";

    fn label(&self) -> &'static str {
        match self {
            Self::Homebrew => "Homebrew",
            Self::Git => "Git",
            Self::Java => "Java (JDK)",
            Self::Maven => "Maven",
            Self::Gradle => "Gradle",
            Self::Python => "Python",
            Self::Uv => "uv",
            Self::Fnm => "fnm",
            Self::Pnpm => "pnpm",
            Self::Bun => "Bun",
            Self::Rust => "Rust (rustup)",
            Self::Go => "Go",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::Homebrew => "macOS package manager",
            Self::Git => "Distributed version control system",
            Self::Java => "Java development kit for JVM-based development",
            Self::Maven => "Java project build and dependency management",
            Self::Gradle => "Flexible build automation tool for JVM projects",
            Self::Python => "General-purpose programming language",
            Self::Uv => "Ultra-fast Python package manager by Astral",
            Self::Fnm => "Fast Node.js version manager written in Rust",
            Self::Pnpm => "Fast, disk-efficient package manager for Node.js",
            Self::Bun => "JavaScript runtime, bundler and package manager",
            Self::Rust => "Systems programming language with memory safety",
            Self::Go => "Statically typed language for scalable systems",
        }
    }

    fn probe_spec(&self) -> Option<ProbeSpec> {
        Some(match self {
            Self::Homebrew => ProbeSpec::command("brew", "--version"),
            Self::Git => ProbeSpec::command("git", "--version"),
            Self::Java => ProbeSpec::command("java", "--version"),
            Self::Maven => ProbeSpec::command("mvn", "--version"),
            Self::Gradle => ProbeSpec::command("gradle", "--version"),
            Self::Python => ProbeSpec::command("python3", "--version"),
            Self::Uv => ProbeSpec::command("uv", "--version"),
            Self::Fnm => ProbeSpec::command("fnm", "--version"),
            Self::Pnpm => ProbeSpec::command("pnpm", "--version"),
            Self::Bun => ProbeSpec::command("bun", "--version"),
            Self::Rust => ProbeSpec::command("rustup", "--version"),
            Self::Go => ProbeSpec::command("go", "version"),
        })
    }
}

// ============================================================================
// Applications
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DesktopApp {
    Chrome,
    Zed,
    Iina,
    Kaku,
    Karabiner,
    Mole,
    Tabby,
}

impl DesktopApp {
    pub fn install_method(&self) -> InstallMethod {
        match self {
            Self::Chrome => InstallMethod::Cask("google-chrome"),
            Self::Zed => InstallMethod::Cask("zed"),
            Self::Iina => InstallMethod::Cask("iina"),
            Self::Kaku => InstallMethod::Cask("tw93/tap/kakuku"),
            Self::Karabiner => InstallMethod::Cask("karabiner-elements"),
            Self::Mole => InstallMethod::Formula("tw93/tap/mole"),
            Self::Tabby => InstallMethod::Cask("tabby"),
        }
    }
}

impl CatalogItem for DesktopApp {
    const KIND: &'static str = "app";

    fn label(&self) -> &'static str {
        match self {
            Self::Chrome => "Google Chrome",
            Self::Zed => "Zed",
            Self::Iina => "IINA",
            Self::Kaku => "Kaku",
            Self::Karabiner => "Karabiner-Elements",
            Self::Mole => "Mole",
            Self::Tabby => "Tabby",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::Chrome => "Web browser by Google",
            Self::Zed => "High-performance code editor",
            Self::Iina => "Modern media player for macOS",
            Self::Kaku => "Lightweight terminal built on WezTerm",
            Self::Karabiner => "Powerful keyboard customizer for macOS",
            Self::Mole => "macOS system cleaner to free up disk space",
            Self::Tabby => "Open-source terminal with SSH and serial support",
        }
    }

    fn probe_spec(&self) -> Option<ProbeSpec> {
        Some(match self {
            Self::Chrome => ProbeSpec::command(
                "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
                "--version",
            )
            .bundle("Google Chrome.app"),
            Self::Zed => ProbeSpec::command("/Applications/Zed.app/Contents/MacOS/cli", "--version")
                .bundle("Zed.app"),
            Self::Iina => ProbeSpec::presence("/Applications/IINA.app/Contents/MacOS/IINA")
                .bundle("IINA.app"),
            Self::Kaku => ProbeSpec::command("kaku", "--version").bundle("Kaku.app"),
            Self::Karabiner => ProbeSpec::presence(
                "/Applications/Karabiner-Elements.app/Contents/MacOS/Karabiner-Elements",
            )
            .bundle("Karabiner-Elements.app"),
            Self::Mole => ProbeSpec::presence("mo"),
            Self::Tabby => ProbeSpec::presence("/Applications/Tabby.app/Contents/MacOS/Tabby")
                .bundle("Tabby.app"),
        })
    }
}

// ============================================================================
// AI coding tools
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AiTool {
    Codex,
    ClaudeCode,
}

impl AiTool {
    pub fn install_method(&self) -> InstallMethod {
        match self {
            Self::Codex => InstallMethod::NpmGlobal("@openai/codex"),
            Self::ClaudeCode => InstallMethod::NpmGlobal("@anthropic-ai/claude-code"),
        }
    }

    /// Display name used in install task names
    pub fn task_label(&self) -> &'static str {
        match self {
            Self::Codex => "Codex CLI",
            Self::ClaudeCode => "Claude Code",
        }
    }
}

impl CatalogItem for AiTool {
    const KIND: &'static str = "ai";

    fn label(&self) -> &'static str {
        match self {
            Self::Codex => "Codex",
            Self::ClaudeCode => "Claude Code",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::Codex => "OpenAI's AI coding assistant CLI",
            Self::ClaudeCode => "Anthropic's AI coding assistant CLI",
        }
    }

    fn probe_spec(&self) -> Option<ProbeSpec> {
        Some(match self {
            Self::Codex => ProbeSpec::command("codex", "--version"),
            Self::ClaudeCode => ProbeSpec::command("claude", "--version"),
        })
    }
}

// ============================================================================
// MCP servers
// ============================================================================

/// A server registration: `<cli> mcp add <name> -- <command> <args..>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpServer {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
}

impl McpServer {
    /// npm package an `npx -y <package>` server runs, if any
    pub fn npx_package(&self) -> Option<&str> {
        if self.command != "npx" {
            return None;
        }
        self.args
            .iter()
            .position(|a| a == "-y")
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum McpPreset {
    Playwright,
    Context7,
    Filesystem,
    Github,
    Memory,
    SequentialThinking,
    Fetch,
    BraveSearch,
    Slack,
    GoogleMaps,
    Sqlite,
}

impl McpPreset {
    fn package(&self) -> &'static str {
        match self {
            Self::Playwright => "@playwright/mcp@latest",
            Self::Context7 => "@upstash/context7-mcp@latest",
            Self::Filesystem => "@modelcontextprotocol/server-filesystem@latest",
            Self::Github => "@modelcontextprotocol/server-github@latest",
            Self::Memory => "@modelcontextprotocol/server-memory@latest",
            Self::SequentialThinking => "@modelcontextprotocol/server-sequential-thinking@latest",
            Self::Fetch => "@modelcontextprotocol/server-fetch@latest",
            Self::BraveSearch => "@modelcontextprotocol/server-brave-search@latest",
            Self::Slack => "@modelcontextprotocol/server-slack@latest",
            Self::GoogleMaps => "@modelcontextprotocol/server-google-maps@latest",
            Self::Sqlite => "@modelcontextprotocol/server-sqlite@latest",
        }
    }

    /// Registration for this preset; the filesystem server is rooted at `home`
    pub fn server(&self, home: &Path) -> McpServer {
        let mut args = vec!["-y".to_string(), self.package().to_string()];
        match self {
            Self::Playwright => args.push("--headless".to_string()),
            Self::Filesystem => args.push(home.display().to_string()),
            _ => {}
        }
        McpServer {
            name: self.to_string(),
            command: "npx".to_string(),
            args,
        }
    }
}

impl CatalogItem for McpPreset {
    const KIND: &'static str = "mcp";

    fn label(&self) -> &'static str {
        match self {
            Self::Playwright => "Playwright",
            Self::Context7 => "Context7",
            Self::Filesystem => "Filesystem",
            Self::Github => "GitHub",
            Self::Memory => "Memory",
            Self::SequentialThinking => "Sequential Thinking",
            Self::Fetch => "Fetch",
            Self::BraveSearch => "Brave Search",
            Self::Slack => "Slack",
            Self::GoogleMaps => "Google Maps",
            Self::Sqlite => "SQLite",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::Playwright => "Browser automation (headless)",
            Self::Context7 => "Up-to-date library documentation",
            Self::Filesystem => "Read and write files under your home directory",
            Self::Github => "Repositories, issues and pull requests",
            Self::Memory => "Persistent knowledge graph memory",
            Self::SequentialThinking => "Structured step-by-step reasoning",
            Self::Fetch => "Fetch web pages as markdown",
            Self::BraveSearch => "Web search through the Brave API",
            Self::Slack => "Read and post Slack messages",
            Self::GoogleMaps => "Places, directions and geocoding",
            Self::Sqlite => "Query local SQLite databases",
        }
    }
}

// ============================================================================
// System default handlers
// ============================================================================

/// One LaunchServices handler entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    UrlScheme(&'static str),
    ContentType(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SystemDefault {
    Browser,
    Editor,
    Player,
}

impl SystemDefault {
    pub fn bundle_id(&self) -> &'static str {
        match self {
            Self::Browser => "com.google.chrome",
            Self::Editor => "dev.zed.Zed",
            Self::Player => "com.colliderli.iina",
        }
    }

    pub fn handlers(&self) -> &'static [Handler] {
        match self {
            Self::Browser => &[Handler::UrlScheme("http"), Handler::UrlScheme("https")],
            Self::Editor => &[Handler::ContentType("public.plain-text")],
            Self::Player => &[
                Handler::ContentType("public.movie"),
                Handler::ContentType("public.video"),
                Handler::ContentType("public.audio"),
            ],
        }
    }

    /// The application this default points at
    pub fn app(&self) -> DesktopApp {
        match self {
            Self::Browser => DesktopApp::Chrome,
            Self::Editor => DesktopApp::Zed,
            Self::Player => DesktopApp::Iina,
        }
    }
}

impl CatalogItem for SystemDefault {
    const KIND: &'static str = "default";

    fn label(&self) -> &'static str {
        match self {
            Self::Browser => "Set default browser → Chrome",
            Self::Editor => "Set default editor → Zed",
            Self::Player => "Set default player → IINA",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::Browser => "Open http and https links in Google Chrome",
            Self::Editor => "Open plain-text files in Zed",
            Self::Player => "Open movies, video and audio in IINA",
        }
    }
}

// ============================================================================
// Optional extras
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Extra {
    ZedTheme,
    KakuSetup,
    KarabinerShortcut,
    DevWorkspace,
}

impl CatalogItem for Extra {
    const KIND: &'static str = "extra";

    fn label(&self) -> &'static str {
        match self {
            Self::ZedTheme => "Zed Catppuccin Blur Theme",
            Self::KakuSetup => "Kaku Terminal Setup (config + zsh plugins)",
            Self::KarabinerShortcut => "Karabiner ⌃⌥⌘T → Kaku shortcut",
            Self::DevWorkspace => "Developer Workspace + Finder config",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::ZedTheme => "Translucent Catppuccin theme following the system appearance",
            Self::KakuSetup => "kaku.lua plus autosuggestions, completions, highlighting and z",
            Self::KarabinerShortcut => "Control+Option+Command+T opens a Kaku window",
            Self::DevWorkspace => "~/Developer tree and Finder showing paths and extensions",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::str::FromStr;

    #[test]
    fn test_identifiers_round_trip() {
        assert_eq!(DevTool::from_str("fnm").unwrap(), DevTool::Fnm);
        assert_eq!(AiTool::ClaudeCode.to_string(), "claude_code");
        assert_eq!(McpPreset::SequentialThinking.to_string(), "sequential-thinking");
        assert_eq!(DesktopApp::Chrome.key(), "app:chrome");
    }

    #[test]
    fn test_catalog_sizes() {
        assert_eq!(DevTool::all().len(), 12);
        assert_eq!(DesktopApp::all().len(), 7);
        assert_eq!(AiTool::all().len(), 2);
        assert_eq!(McpPreset::all().len(), 11);
        assert_eq!(SystemDefault::all().len(), 3);
        assert_eq!(Extra::all().len(), 4);
    }

    #[test]
    fn test_every_brew_install_has_target() {
        for tool in DevTool::all() {
            let method = tool.install_method();
            assert!(!method.needs_target() || !method.target().is_empty(), "{tool}");
        }
        for app in DesktopApp::all() {
            assert!(!app.install_method().target().is_empty(), "{app}");
        }
    }

    #[test]
    fn test_mcp_server_arguments() {
        let home = PathBuf::from("/Users/dev");

        let fs = McpPreset::Filesystem.server(&home);
        assert_eq!(fs.command, "npx");
        assert_eq!(fs.args.last().map(String::as_str), Some("/Users/dev"));

        let pw = McpPreset::Playwright.server(&home);
        assert_eq!(pw.args, ["-y", "@playwright/mcp@latest", "--headless"]);
        assert_eq!(pw.npx_package(), Some("@playwright/mcp@latest"));
    }

    #[test]
    fn test_system_defaults_point_at_apps() {
        assert_eq!(SystemDefault::Browser.app(), DesktopApp::Chrome);
        assert_eq!(SystemDefault::Player.handlers().len(), 3);
        assert_eq!(SystemDefault::Editor.label(), "Set default editor → Zed");
    }
}
