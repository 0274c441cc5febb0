//! Wizard state machine
//!
//! Pages form a directed graph. [`advance`] is the pure edge function: given
//! the current page and selections it names the next page, or
//! [`Transition::EnterInstall`] from the last selection page. [`Wizard`]
//! wraps it with the session state: page history for going back, the cursor,
//! per-category selections and the config forms.
//!
//! ```text
//! Language → Welcome → DevTools → Apps ─┬─(fnm)→ NodeVersions ─┐
//!                                       └──────────────────────┴→ AiTools
//! AiTools ─┬─(codex)→ CodexConfig ─┬─(claude)→ ClaudeConfig ─┐
//!          ├─(claude)──────────────┼──────────→ ClaudeConfig ─┤
//!          └───────────────────────┴──────────────────────────┴→ McpServers
//! McpServers → Extras → SystemDefaults ⇒ install → Installing → Done
//! ```

pub mod form;

use crate::agent_config::{ClaudeSettings, CodexSettings};
use crate::catalog::{AiTool, CatalogItem, DesktopApp, DevTool, Extra, McpPreset, SystemDefault};
use crate::config::Language;
use crate::installer::InstallRequest;
use crate::probe::ProbeReport;
use crate::selection::{SelectionSet, Selections};
use form::ConfigForm;
use strum::{EnumIter, IntoEnumIterator};
use tracing::{debug, info};

pub use form::{FieldEdit, FormKind};

/// Number of MCP presets the recommended selection turns on
const RECOMMENDED_MCP_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum WizardPage {
    Language,
    Welcome,
    DevTools,
    Apps,
    NodeVersions,
    AiTools,
    CodexConfig,
    ClaudeConfig,
    McpServers,
    Extras,
    SystemDefaults,
    Installing,
    Done,
}

impl WizardPage {
    /// Pages with a toggleable item list
    pub fn is_selection_page(&self) -> bool {
        matches!(
            self,
            Self::DevTools
                | Self::Apps
                | Self::NodeVersions
                | Self::AiTools
                | Self::McpServers
                | Self::Extras
                | Self::SystemDefaults
        )
    }

    pub fn is_config_page(&self) -> bool {
        matches!(self, Self::CodexConfig | Self::ClaudeConfig)
    }
}

/// Result of following an edge out of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Page(WizardPage),
    EnterInstall,
}

fn after_codex(selections: &Selections) -> WizardPage {
    if selections.ai_tools.is_selected(&AiTool::ClaudeCode) {
        WizardPage::ClaudeConfig
    } else {
        WizardPage::McpServers
    }
}

/// Forward edge out of `page`; `None` once installing has begun
pub fn advance(page: WizardPage, selections: &Selections) -> Option<Transition> {
    let next = match page {
        WizardPage::Language => WizardPage::Welcome,
        WizardPage::Welcome => WizardPage::DevTools,
        WizardPage::DevTools => WizardPage::Apps,
        WizardPage::Apps if selections.tools.is_selected(&DevTool::Fnm) => WizardPage::NodeVersions,
        WizardPage::Apps | WizardPage::NodeVersions => WizardPage::AiTools,
        WizardPage::AiTools if selections.ai_tools.is_selected(&AiTool::Codex) => {
            WizardPage::CodexConfig
        }
        WizardPage::AiTools | WizardPage::CodexConfig => after_codex(selections),
        WizardPage::ClaudeConfig => WizardPage::McpServers,
        WizardPage::McpServers => WizardPage::Extras,
        WizardPage::Extras => WizardPage::SystemDefaults,
        WizardPage::SystemDefaults => return Some(Transition::EnterInstall),
        WizardPage::Installing | WizardPage::Done => return None,
    };
    Some(Transition::Page(next))
}

/// What a quit request turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitOutcome {
    Exit,
    WentBack,
    Ignored,
}

/// One row of a selection list, ready to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRow {
    pub label: String,
    pub description: &'static str,
    pub selected: bool,
    pub installed: bool,
    pub version: Option<String>,
}

/// A wizard session
#[derive(Debug, Clone)]
pub struct Wizard {
    page: WizardPage,
    history: Vec<WizardPage>,
    cursor: usize,
    language: Language,
    selections: Selections,
    probe: ProbeReport,
    node_versions: Vec<String>,
    codex: CodexSettings,
    claude: ClaudeSettings,
    form: Option<ConfigForm>,
    failed_tasks: Option<usize>,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    /// Language page, nothing selected
    pub fn new() -> Self {
        Self {
            page: WizardPage::Language,
            history: Vec::new(),
            cursor: 0,
            language: Language::En,
            selections: Selections::default(),
            probe: ProbeReport::new(),
            node_versions: Vec::new(),
            codex: CodexSettings::default(),
            claude: ClaudeSettings::default(),
            form: None,
            failed_tasks: None,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn page(&self) -> WizardPage {
        self.page
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    pub fn probe(&self) -> &ProbeReport {
        &self.probe
    }

    pub fn node_versions(&self) -> &[String] {
        &self.node_versions
    }

    pub fn codex(&self) -> &CodexSettings {
        &self.codex
    }

    pub fn claude(&self) -> &ClaudeSettings {
        &self.claude
    }

    pub fn form(&self) -> Option<&ConfigForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut ConfigForm> {
        self.form.as_mut()
    }

    pub fn is_installing(&self) -> bool {
        self.page == WizardPage::Installing
    }

    /// Failed task count, once the install has finished
    pub fn failed_tasks(&self) -> Option<usize> {
        self.failed_tasks
    }

    /// Copy of everything the orchestrator needs
    pub fn install_request(&self) -> InstallRequest {
        InstallRequest {
            selections: self.selections.clone(),
            codex: self.codex.clone(),
            claude: self.claude.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------

    /// Take the probe results; anything now known to be installed is
    /// dropped from the selections
    pub fn set_probe(&mut self, probe: ProbeReport) {
        self.probe = probe;
        self.prune_installed();
    }

    fn prune_installed(&mut self) {
        let probe = &self.probe;
        self.selections.tools = drop_installed(&self.selections.tools, probe);
        self.selections.apps = drop_installed(&self.selections.apps, probe);
        self.selections.ai_tools = drop_installed(&self.selections.ai_tools, probe);
    }

    pub fn set_node_versions(&mut self, versions: Vec<String>) {
        self.node_versions = versions;
        if self.page == WizardPage::NodeVersions {
            self.clamp_cursor();
        }
    }

    /// Everything not yet installed, the first MCP presets, every default
    /// and every extra
    pub fn apply_recommended(&mut self) {
        let probe = &self.probe;
        self.selections.tools = DevTool::iter().filter(|t| !probe.is_installed(*t)).collect();
        self.selections.apps = DesktopApp::iter().filter(|a| !probe.is_installed(*a)).collect();
        self.selections.ai_tools = AiTool::iter().filter(|a| !probe.is_installed(*a)).collect();
        self.selections.mcp_servers = McpPreset::iter().take(RECOMMENDED_MCP_COUNT).collect();
        self.selections.system_defaults = SystemDefault::iter().collect();
        self.selections.extras = Extra::iter().collect();
        debug!(
            tools = self.selections.tools.len(),
            apps = self.selections.apps.len(),
            "recommended selection applied"
        );
    }

    /// Load a saved snapshot; installed items are dropped from it
    pub fn apply_request(&mut self, request: InstallRequest) {
        self.selections = request.selections;
        self.codex = request.codex;
        self.claude = request.claude;
        self.prune_installed();
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    fn go_to(&mut self, page: WizardPage) {
        debug!(from = ?self.page, to = ?page, "page transition");
        self.page = page;
        self.cursor = 0;
        self.form = match page {
            WizardPage::CodexConfig => Some(ConfigForm::codex(&or_suggested(
                &self.codex,
                CodexSettings::suggested(),
            ))),
            WizardPage::ClaudeConfig => Some(ConfigForm::claude(&or_suggested(
                &self.claude,
                ClaudeSettings::suggested(),
            ))),
            _ => None,
        };
    }

    /// Copy the open form's values into the durable settings
    fn persist_form(&mut self) {
        if let Some(form) = &self.form {
            match form.kind() {
                FormKind::Codex => self.codex = form.to_codex(),
                FormKind::Claude => self.claude = form.to_claude(),
            }
        }
    }

    /// Follow the forward edge. Returns the transition taken, if any.
    pub fn forward(&mut self) -> Option<Transition> {
        if self.page == WizardPage::Language {
            self.language = if self.cursor == 0 { Language::En } else { Language::Zh };
        }

        let transition = advance(self.page, &self.selections)?;
        if self.page.is_config_page() {
            self.persist_form();
        }

        self.history.push(self.page);
        match transition {
            Transition::Page(page) => self.go_to(page),
            Transition::EnterInstall => {
                info!("entering install phase");
                self.go_to(WizardPage::Installing);
            }
        }
        Some(transition)
    }

    /// Step back to the previous page; disabled once installing
    pub fn back(&mut self) -> bool {
        if matches!(self.page, WizardPage::Installing | WizardPage::Done) {
            return false;
        }
        let Some(previous) = self.history.pop() else {
            return false;
        };
        self.go_to(previous);
        true
    }

    pub fn quit(&mut self) -> QuitOutcome {
        match self.page {
            WizardPage::Language | WizardPage::Welcome | WizardPage::Done => QuitOutcome::Exit,
            WizardPage::Installing => QuitOutcome::Ignored,
            _ => {
                if self.back() {
                    QuitOutcome::WentBack
                } else {
                    QuitOutcome::Exit
                }
            }
        }
    }

    /// The orchestrator finished: Installing → Done
    pub fn install_done(&mut self, failed: usize) {
        if self.page != WizardPage::Installing {
            return;
        }
        self.history.push(self.page);
        self.go_to(WizardPage::Done);
        self.failed_tasks = Some(failed);
    }

    // ------------------------------------------------------------------
    // Cursor and selection
    // ------------------------------------------------------------------

    /// Rows on the current page
    pub fn list_len(&self) -> usize {
        match self.page {
            WizardPage::Language => Language::iter().count(),
            WizardPage::DevTools => DevTool::iter().count(),
            WizardPage::Apps => DesktopApp::iter().count(),
            WizardPage::NodeVersions => self.node_versions.len(),
            WizardPage::AiTools => AiTool::iter().count(),
            WizardPage::McpServers => McpPreset::iter().count(),
            WizardPage::Extras => Extra::iter().count(),
            WizardPage::SystemDefaults => SystemDefault::iter().count(),
            _ => 0,
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.list_len() {
            self.cursor += 1;
        }
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.list_len().saturating_sub(1));
    }

    /// Toggle the item under the cursor; installed items stay as they are
    pub fn toggle_current(&mut self) {
        let cursor = self.cursor;
        let probe = &self.probe;
        let s = &mut self.selections;
        match self.page {
            WizardPage::DevTools => toggle_nth(&mut s.tools, cursor, probe),
            WizardPage::Apps => toggle_nth(&mut s.apps, cursor, probe),
            WizardPage::AiTools => toggle_nth(&mut s.ai_tools, cursor, probe),
            WizardPage::McpServers => toggle_nth(&mut s.mcp_servers, cursor, probe),
            WizardPage::Extras => toggle_nth(&mut s.extras, cursor, probe),
            WizardPage::SystemDefaults => toggle_nth(&mut s.system_defaults, cursor, probe),
            WizardPage::NodeVersions => {
                if let Some(version) = self.node_versions.get(cursor) {
                    s.node_versions.toggle(version.clone());
                }
            }
            _ => {}
        }
    }

    pub fn select_all(&mut self) {
        let probe = &self.probe;
        let s = &mut self.selections;
        match self.page {
            WizardPage::DevTools => select_all_available(&mut s.tools, probe),
            WizardPage::Apps => select_all_available(&mut s.apps, probe),
            WizardPage::AiTools => select_all_available(&mut s.ai_tools, probe),
            WizardPage::McpServers => select_all_available(&mut s.mcp_servers, probe),
            WizardPage::Extras => select_all_available(&mut s.extras, probe),
            WizardPage::SystemDefaults => select_all_available(&mut s.system_defaults, probe),
            WizardPage::NodeVersions => s.node_versions.select_all(self.node_versions.iter().cloned()),
            _ => {}
        }
    }

    pub fn select_none(&mut self) {
        let s = &mut self.selections;
        match self.page {
            WizardPage::DevTools => s.tools.clear(),
            WizardPage::Apps => s.apps.clear(),
            WizardPage::AiTools => s.ai_tools.clear(),
            WizardPage::McpServers => s.mcp_servers.clear(),
            WizardPage::Extras => s.extras.clear(),
            WizardPage::SystemDefaults => s.system_defaults.clear(),
            WizardPage::NodeVersions => s.node_versions.clear(),
            _ => {}
        }
    }

    /// Rows of the current selection page
    pub fn rows(&self) -> Vec<ItemRow> {
        let s = &self.selections;
        match self.page {
            WizardPage::DevTools => catalog_rows(&s.tools, &self.probe),
            WizardPage::Apps => catalog_rows(&s.apps, &self.probe),
            WizardPage::AiTools => catalog_rows(&s.ai_tools, &self.probe),
            WizardPage::McpServers => catalog_rows(&s.mcp_servers, &self.probe),
            WizardPage::Extras => catalog_rows(&s.extras, &self.probe),
            WizardPage::SystemDefaults => catalog_rows(&s.system_defaults, &self.probe),
            WizardPage::NodeVersions => self
                .node_versions
                .iter()
                .map(|v| ItemRow {
                    label: v.clone(),
                    description: "",
                    selected: s.node_versions.is_selected(v),
                    installed: false,
                    version: None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Settings never filled in start from the suggested values
fn or_suggested<T: Default + PartialEq + Clone>(current: &T, suggested: T) -> T {
    if *current == T::default() {
        suggested
    } else {
        current.clone()
    }
}

fn toggle_nth<T: CatalogItem>(set: &mut SelectionSet<T>, index: usize, probe: &ProbeReport) {
    if let Some(item) = T::iter().nth(index) {
        if !probe.is_installed(item) {
            set.toggle(item);
        }
    }
}

fn select_all_available<T: CatalogItem>(set: &mut SelectionSet<T>, probe: &ProbeReport) {
    set.select_all(T::iter().filter(|item| !probe.is_installed(*item)));
}

fn drop_installed<T: CatalogItem>(set: &SelectionSet<T>, probe: &ProbeReport) -> SelectionSet<T> {
    set.iter().copied().filter(|item| !probe.is_installed(*item)).collect()
}

fn catalog_rows<T: CatalogItem>(set: &SelectionSet<T>, probe: &ProbeReport) -> Vec<ItemRow> {
    T::iter()
        .map(|item| ItemRow {
            label: item.label().to_string(),
            description: item.description(),
            selected: set.is_selected(&item),
            installed: probe.is_installed(item),
            version: probe.version(item).map(str::to_string),
        })
        .collect()
}
