//! Page titles and hints in the wizard's two languages
//!
//! Catalog labels are not translated; they are product names.

use crate::config::Language;
use crate::wizard::WizardPage;

#[derive(Debug)]
pub struct Texts {
    pub welcome_title: &'static str,
    pub welcome_intro: &'static str,
    pub welcome_points: [&'static str; 6],
    pub welcome_start: &'static str,
    pub welcome_quit: &'static str,

    pub language_prompt: &'static str,

    pub probing: &'static str,
    pub node_hint: &'static str,
    pub node_loading: &'static str,
    pub mcp_hint: &'static str,
    pub extras_hint: &'static str,

    pub install_preparing: &'static str,
    pub install_more_above: &'static str,
    pub install_up_next: &'static str,

    pub done_ok: &'static str,
    pub done_failed: &'static str,
    pub done_log: &'static str,
    pub done_exit: &'static str,

    pub footer_list: &'static str,
    pub footer_form: &'static str,
    pub footer_install: &'static str,
}

static EN: Texts = Texts {
    welcome_title: "Welcome to freshbox!",
    welcome_intro: "This tool will help you set up your new Mac with:",
    welcome_points: [
        "Development tools (brew, git, java, python, rust, go...)",
        "Node.js version management via fnm",
        "Applications (Chrome, Zed, IINA, Kaku, Karabiner)",
        "AI tools (Codex, Claude Code) with full config",
        "MCP servers (Playwright, Context7, and more)",
        "System defaults + Zed theme, Kaku setup, dev workspace",
    ],
    welcome_start: "Press Enter to get started",
    welcome_quit: "q to quit",

    language_prompt: "Select your language / 选择语言",

    probing: "Checking what is already installed...",
    node_hint: "fnm will be installed first, then these versions.",
    node_loading: "Fetching available versions...",
    mcp_hint: "Select MCP servers to configure for your AI tools",
    extras_hint: "Optional configurations to enhance your workflow",

    install_preparing: "Preparing installation...",
    install_more_above: "more above",
    install_up_next: "Up next",

    done_ok: "Your Mac is set up and ready to go.",
    done_failed: "tasks failed. See the log for details.",
    done_log: "Install log:",
    done_exit: "Press Enter or q to exit.",

    footer_list: "↑/↓ navigate • space toggle • a all • n none • tab next • shift+tab back • q quit",
    footer_form: "↑/↓ navigate fields • tab next field • enter confirm • esc back",
    footer_install: "Installing... please wait",
};

static ZH: Texts = Texts {
    welcome_title: "欢迎使用 freshbox！",
    welcome_intro: "这个工具将帮助你配置新 Mac：",
    welcome_points: [
        "开发工具（brew、git、java、python、rust、go...）",
        "通过 fnm 管理 Node.js 多版本",
        "常用应用（Chrome、Zed、IINA、Kaku、Karabiner）",
        "AI 工具（Codex、Claude Code）完整配置",
        "MCP 服务（Playwright、Context7 等）",
        "系统默认设置 + Zed 主题、Kaku 配置、开发工作区",
    ],
    welcome_start: "按 Enter 开始",
    welcome_quit: "q 退出",

    language_prompt: "Select your language / 选择语言",

    probing: "正在检测已安装的软件...",
    node_hint: "将先安装 fnm，再安装这些版本。",
    node_loading: "正在获取可用版本...",
    mcp_hint: "选择要为 AI 工具配置的 MCP 服务",
    extras_hint: "可选的工作流增强配置",

    install_preparing: "正在准备安装...",
    install_more_above: "条在上方",
    install_up_next: "即将执行",

    done_ok: "你的 Mac 已配置完成。",
    done_failed: "个任务失败，详情见日志。",
    done_log: "安装日志：",
    done_exit: "按 Enter 或 q 退出。",

    footer_list: "↑/↓ 移动 • 空格 选择 • a 全选 • n 全不选 • tab 下一步 • shift+tab 返回 • q 退出",
    footer_form: "↑/↓ 切换字段 • tab 下一字段 • enter 确认 • esc 返回",
    footer_install: "安装中... 请稍候",
};

pub fn texts(language: Language) -> &'static Texts {
    match language {
        Language::En => &EN,
        Language::Zh => &ZH,
    }
}

/// Title shown in the header and step bar
pub fn page_title(language: Language, page: WizardPage) -> &'static str {
    let zh = language == Language::Zh;
    match page {
        WizardPage::Language => "Language / 语言",
        WizardPage::Welcome => if zh { "欢迎" } else { "Welcome" },
        WizardPage::DevTools => if zh { "开发工具" } else { "Dev Tools" },
        WizardPage::Apps => if zh { "应用程序" } else { "Apps" },
        WizardPage::NodeVersions => if zh { "Node.js 版本" } else { "Node.js Versions" },
        WizardPage::AiTools => if zh { "AI 工具" } else { "AI Tools" },
        WizardPage::CodexConfig => if zh { "Codex 配置" } else { "Codex Config" },
        WizardPage::ClaudeConfig => if zh { "Claude 配置" } else { "Claude Config" },
        WizardPage::McpServers => if zh { "MCP 服务" } else { "MCP Servers" },
        WizardPage::Extras => if zh { "额外配置" } else { "Extra Setup" },
        WizardPage::SystemDefaults => if zh { "系统默认" } else { "System Defaults" },
        WizardPage::Installing => if zh { "安装中..." } else { "Installing..." },
        WizardPage::Done => if zh { "完成！" } else { "Done!" },
    }
}
