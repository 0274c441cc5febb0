//! Optional post-install setup: editor theme, terminal, keyboard shortcut,
//! developer workspace.
//!
//! Each function is one install task. They write into files other apps own,
//! so existing JSON is merged, never replaced; a settings file that cannot be
//! read as JSON fails the task instead of being overwritten.

use crate::command::CommandRunner;
use crate::config::HomeLayout;
use crate::merge::{Document, write_merged};
use anyhow::{Context, Result};
use serde_json::{Map, Value, json};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

// ============================================================================
// Zed theme
// ============================================================================

const ZED_THEME_REPO: &str = "https://github.com/jenslys/zed-catppuccin-blur.git";
const ZED_THEME_FILE: &str = "catppuccin-blur.json";
const LATTE_LIGHT: &str = "Catppuccin Latte (Blur) [Light]";
const MOCHA_LIGHT: &str = "Catppuccin Mocha (Blur) [Light]";

/// Blue-tinted, more opaque surfaces for the two variants freshbox selects
const LATTE_TINT: [(&str, &str); 9] = [
    ("elevated_surface.background", "#e8f0ff"),
    ("surface.background", "#e8f0ffc8"),
    ("background", "#e8f0ffd0"),
    ("status_bar.background", "#e8f0ffd0"),
    ("title_bar.background", "#e8f0ffd0"),
    ("tab.active_background", "#e8f0ffc0"),
    ("ghost_element.background", "#e8f0ff90"),
    ("ghost_element.hover", "#e8f0ffc0"),
    ("panel.overlay_background", "#e8f0ff"),
];

const MOCHA_TINT: [(&str, &str); 10] = [
    ("elevated_surface.background", "#161a28"),
    ("surface.background", "#181c2ec8"),
    ("background", "#181c2ed0"),
    ("status_bar.background", "#181c2ed0"),
    ("title_bar.background", "#181c2ed0"),
    ("title_bar.inactive_background", "#151928"),
    ("tab.active_background", "#161a28c0"),
    ("ghost_element.background", "#161a2890"),
    ("ghost_element.hover", "#161a28c0"),
    ("panel.overlay_background", "#181c2e"),
];

/// Alpha bumps for every other `[Light]` variant
const OPACITY_BUMPS: [(&str, &str); 4] = [("99", "d0"), ("8c", "c8"), ("90", "c0"), ("60", "90")];

const OPACITY_KEYS: [&str; 7] = [
    "background",
    "surface.background",
    "status_bar.background",
    "title_bar.background",
    "tab.active_background",
    "ghost_element.background",
    "ghost_element.hover",
];

/// Apply freshbox's tint to a catppuccin-blur theme family document
pub fn tint_theme(theme_family: &mut Value) {
    let Some(themes) = theme_family.get_mut("themes").and_then(Value::as_array_mut) else {
        return;
    };

    for theme in themes {
        let name = theme
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let Some(style) = theme.get_mut("style").and_then(Value::as_object_mut) else {
            continue;
        };

        let tint: &[(&str, &str)] = match name.as_str() {
            LATTE_LIGHT => &LATTE_TINT,
            MOCHA_LIGHT => &MOCHA_TINT,
            other if other.ends_with("[Light]") => {
                bump_opacity(style);
                continue;
            }
            _ => continue,
        };

        for (key, color) in tint {
            if let Some(slot) = style.get_mut(*key) {
                *slot = Value::String(color.to_string());
            }
        }
    }
}

fn bump_opacity(style: &mut Map<String, Value>) {
    for key in OPACITY_KEYS {
        let Some(Value::String(color)) = style.get_mut(key) else {
            continue;
        };
        if color.len() != 9 || !color.starts_with('#') || !color.is_ascii() {
            continue;
        }
        if let Some((_, bumped)) = OPACITY_BUMPS.iter().find(|(old, _)| color[7..] == **old) {
            color.replace_range(7.., bumped);
        }
    }
}

/// Remove `//` and `/* */` comments and trailing commas, leaving strings alone
pub fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                for next in chars.by_ref() {
                    if previous == '*' && next == '/' {
                        break;
                    }
                    previous = next;
                }
            }
            _ => out.push(c),
        }
    }

    remove_trailing_commas(&out)
}

fn remove_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if c == '\\' {
                if let Some(&escaped) = chars.get(i + 1) {
                    out.push(escaped);
                    i += 1;
                }
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
            out.push(c);
        } else if c == ',' {
            let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
            if !matches!(next, Some('}') | Some(']')) {
                out.push(c);
            }
        } else {
            out.push(c);
        }
        i += 1;
    }

    out
}

fn zed_theme_selection() -> Value {
    json!({
        "mode": "system",
        "light": LATTE_LIGHT,
        "dark": MOCHA_LIGHT,
    })
}

/// Point Zed's `theme` at the tinted variants, keeping every other setting
pub fn set_zed_theme(settings_path: &Path) -> Result<()> {
    write_merged(settings_path, None, |existing| {
        let mut document = if existing.trim().is_empty() {
            Document::new()
        } else {
            match serde_json::from_str::<Value>(&strip_jsonc(existing)) {
                Ok(Value::Object(map)) => Document::from(map),
                Ok(_) => anyhow::bail!("Zed settings.json is not a JSON object"),
                Err(e) => {
                    return Err(e).context("Zed settings.json could not be parsed, leaving it untouched");
                }
            }
        };
        document.insert("theme", zed_theme_selection());
        document.to_pretty_string().context("Failed to serialize Zed settings")
    })
}

/// Clone (or refresh) the theme repository into the cache and return its path
fn fetch_theme_repo(runner: &dyn CommandRunner, layout: &HomeLayout) -> Result<std::path::PathBuf> {
    let checkout = layout.cache_dir().join("zed-catppuccin-blur");

    if checkout.join(".git").is_dir() {
        let dir = checkout.to_string_lossy();
        match runner.run("git", &["-C", dir.as_ref(), "pull", "--ff-only", "--quiet"]) {
            Ok(out) if out.exit_ok => debug!("refreshed cached Zed theme"),
            _ => warn!("could not refresh cached Zed theme, using cached copy"),
        }
        return Ok(checkout);
    }

    fs::create_dir_all(layout.cache_dir())
        .with_context(|| format!("Failed to create {}", layout.cache_dir().display()))?;
    let dest = checkout.to_string_lossy();
    runner
        .run_checked("git", &["clone", "--depth", "1", "--quiet", ZED_THEME_REPO, dest.as_ref()])
        .context("clone theme")?;
    Ok(checkout)
}

/// Install the tinted Catppuccin Blur theme and select it in Zed
pub fn setup_zed_theme(runner: &dyn CommandRunner, layout: &HomeLayout) -> Result<()> {
    let checkout = fetch_theme_repo(runner, layout)?;

    let source = checkout.join("themes").join(ZED_THEME_FILE);
    let text = fs::read_to_string(&source)
        .with_context(|| format!("Failed to read {}", source.display()))?;
    let mut family: Value = serde_json::from_str(&text).context("Theme file is not valid JSON")?;
    tint_theme(&mut family);

    let themes_dir = layout.zed_config_dir().join("themes");
    fs::create_dir_all(&themes_dir)
        .with_context(|| format!("Failed to create {}", themes_dir.display()))?;
    let mut rendered = serde_json::to_string_pretty(&family).context("Failed to serialize theme")?;
    rendered.push('\n');
    fs::write(themes_dir.join(ZED_THEME_FILE), rendered).context("write theme")?;

    set_zed_theme(&layout.zed_config_dir().join("settings.json"))?;
    info!("Zed theme installed");
    Ok(())
}

// ============================================================================
// Kaku terminal
// ============================================================================

const KAKU_LUA: &str = r#"local wezterm = require 'wezterm'

local function resolve_bundled_config()
  local candidates = {
    wezterm.executable_dir:gsub('MacOS/?$', 'Resources') .. '/kaku.lua',
    '/Applications/Kaku.app/Contents/Resources/kaku.lua',
    (os.getenv('HOME') or '') .. '/Applications/Kaku.app/Contents/Resources/kaku.lua',
  }
  for _, path in ipairs(candidates) do
    local f = io.open(path, 'r')
    if f then
      f:close()
      return path
    end
  end
  return nil
end

local config = {}
local bundled = resolve_bundled_config()

if bundled then
  local ok, loaded = pcall(dofile, bundled)
  if ok and type(loaded) == 'table' then
    config = loaded
  else
    wezterm.log_error('Kaku: failed to load bundled defaults from ' .. bundled)
  end
else
  wezterm.log_error('Kaku: bundled defaults not found')
end

return config
"#;

/// zsh plugins cloned next to the Kaku config
pub const ZSH_PLUGINS: [(&str, &str); 4] = [
    ("zsh-autosuggestions", "https://github.com/zsh-users/zsh-autosuggestions.git"),
    ("zsh-completions", "https://github.com/zsh-users/zsh-completions.git"),
    ("zsh-syntax-highlighting", "https://github.com/zsh-users/zsh-syntax-highlighting.git"),
    ("zsh-z", "https://github.com/agkozak/zsh-z.git"),
];

/// Write `kaku.lua` and clone the zsh plugins that are not there yet
pub fn setup_kaku(runner: &dyn CommandRunner, layout: &HomeLayout) -> Result<()> {
    let config_dir = layout.kaku_config_dir();
    let plugin_dir = layout.zsh_plugins_dir();
    fs::create_dir_all(&plugin_dir)
        .with_context(|| format!("Failed to create {}", plugin_dir.display()))?;

    fs::write(config_dir.join("kaku.lua"), KAKU_LUA).context("write kaku.lua")?;

    for (name, repo) in ZSH_PLUGINS {
        let dest = plugin_dir.join(name);
        if dest.exists() {
            debug!(plugin = name, "zsh plugin already present");
            continue;
        }
        let dest = dest.to_string_lossy();
        runner
            .run_checked("git", &["clone", "--depth", "1", "--quiet", repo, dest.as_ref()])
            .with_context(|| format!("clone {}", name))?;
    }

    info!("Kaku configured");
    Ok(())
}

// ============================================================================
// Karabiner shortcut
// ============================================================================

const KARABINER_RULE: &str = "Control+Option+Command+T opens Kaku";

const OPEN_KAKU_SH: &str = r#"#!/bin/bash
# Open Kaku in the folder selected in Finder, or Finder's current folder
DIR=$(osascript -e '
tell application "System Events"
    set frontApp to name of first application process whose frontmost is true
end tell
if frontApp is "Finder" then
    tell application "Finder"
        try
            set sel to selection
            if (count of sel) > 0 then
                set theItem to item 1 of sel
                if class of theItem is folder or class of theItem is disk then
                    return POSIX path of (theItem as alias)
                else
                    return POSIX path of (container of theItem as alias)
                end if
            else
                return POSIX path of (target of front window as alias)
            end if
        on error
            return POSIX path of (path to home folder)
        end try
    end tell
else
    return ""
end if
' 2>/dev/null)

if [ -n "$DIR" ] && [ -d "$DIR" ]; then
    /opt/homebrew/bin/kaku start --cwd "$DIR"
else
    open /Applications/Kaku.app
fi
"#;

fn karabiner_rule(script: &Path) -> Value {
    json!({
        "description": KARABINER_RULE,
        "manipulators": [{
            "from": {
                "key_code": "t",
                "modifiers": {"mandatory": ["control", "option", "command"]}
            },
            "to": [{"shell_command": script.display().to_string()}],
            "type": "basic"
        }]
    })
}

/// Add the ⌃⌥⌘T rule to the first profile unless a rule with the same
/// description is already there
pub fn merge_karabiner_rule(existing: &str, script: &Path) -> Result<Value> {
    let mut config: Value = if existing.trim().is_empty() {
        json!({"global": {"show_in_menu_bar": false}, "profiles": []})
    } else {
        serde_json::from_str(existing)
            .context("karabiner.json could not be parsed, leaving it untouched")?
    };

    let root = config
        .as_object_mut()
        .context("karabiner.json is not a JSON object")?;
    let profiles = root
        .entry("profiles")
        .or_insert_with(|| json!([]))
        .as_array_mut()
        .context("karabiner.json `profiles` is not an array")?;

    if profiles.is_empty() {
        profiles.push(json!({
            "name": "Default profile",
            "selected": true,
            "virtual_hid_keyboard": {"keyboard_type_v2": "ansi"}
        }));
    }

    let profile = profiles[0]
        .as_object_mut()
        .context("first Karabiner profile is not an object")?;
    let rules = profile
        .entry("complex_modifications")
        .or_insert_with(|| json!({}))
        .as_object_mut()
        .context("`complex_modifications` is not an object")?
        .entry("rules")
        .or_insert_with(|| json!([]))
        .as_array_mut()
        .context("`rules` is not an array")?;

    let present = rules
        .iter()
        .any(|rule| rule.get("description").and_then(Value::as_str) == Some(KARABINER_RULE));
    if !present {
        rules.push(karabiner_rule(script));
    }

    Ok(config)
}

/// Install Karabiner-Elements if needed, then bind ⌃⌥⌘T to open Kaku
pub fn setup_karabiner(
    runner: &dyn CommandRunner,
    layout: &HomeLayout,
    karabiner_installed: bool,
) -> Result<()> {
    if !karabiner_installed {
        let out = runner
            .run("brew", &["install", "--cask", "karabiner-elements"])
            .context("failed to start brew")?;
        if !out.exit_ok && !out.combined_output.contains("already installed") {
            out.ensure_success("install karabiner")?;
        }
    }

    let bin_dir = layout.local_bin();
    fs::create_dir_all(&bin_dir).with_context(|| format!("Failed to create {}", bin_dir.display()))?;
    let script = bin_dir.join("open-kaku.sh");
    fs::write(&script, OPEN_KAKU_SH).context("write open-kaku.sh")?;
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))
            .context("chmod open-kaku.sh")?;
    }

    write_merged(&layout.karabiner_config(), None, |existing| {
        let config = merge_karabiner_rule(existing, &script)?;
        let mut text = serde_json::to_string_pretty(&config).context("Failed to serialize karabiner.json")?;
        text.push('\n');
        Ok(text)
    })?;

    info!("Karabiner shortcut configured");
    Ok(())
}

// ============================================================================
// Developer workspace
// ============================================================================

/// Sub-directories of `~/Developer` and the README each one gets
pub const WORKSPACE_DIRS: [(&str, &str); 9] = [
    ("opensource", "Open-source projects maintained in public."),
    ("boundless", "Company projects."),
    ("freelance", "Freelance and contract work, one folder per client."),
    ("freelance/_template", "Starting structure copied for each new client project."),
    ("playground", "Learning, demos, tutorials and experiments."),
    ("design", "Design files, icons and assets."),
    ("notes", "Technical notes, documents and blog drafts."),
    ("scripts", "Automation scripts, CLI tools and dotfiles."),
    ("archive", "Finished or unmaintained projects."),
];

const WORKSPACE_README: &str = "# ~/Developer

One place for every project, resource and tool on this machine.

```
~/Developer/
├── opensource/   open-source projects
├── boundless/    company projects
├── freelance/    client work
├── playground/   learning and experiments
├── design/       design files and assets
├── notes/        notes and drafts
├── scripts/      automation and CLI tools
└── archive/      finished projects
```

1. Put new projects in the matching directory, never at the root
2. Name project directories in kebab-case
3. Move inactive projects to `archive/`
4. Client work lives in `freelance/<client>/<project>`
5. Throwaway code goes to `playground/`
";

fn finder_preferences(developer_dir: &Path) -> Vec<Vec<String>> {
    let target = format!("file://{}/", developer_dir.display());
    [
        vec!["com.apple.finder", "AppleShowAllFiles", "-bool", "true"],
        vec!["NSGlobalDomain", "AppleShowAllExtensions", "-bool", "true"],
        vec!["com.apple.finder", "ShowPathbar", "-bool", "true"],
        vec!["com.apple.finder", "ShowStatusBar", "-bool", "true"],
        vec!["com.apple.finder", "FXPreferredViewStyle", "-string", "Nlsv"],
        vec!["com.apple.finder", "FXDefaultSearchScope", "-string", "SCcf"],
        vec!["com.apple.finder", "FXEnableExtensionChangeWarning", "-bool", "false"],
        vec!["com.apple.finder", "NewWindowTarget", "-string", "PfLo"],
        vec!["com.apple.finder", "NewWindowTargetPath", "-string", target.as_str()],
    ]
    .into_iter()
    .map(|args| {
        std::iter::once("write")
            .chain(args)
            .map(str::to_string)
            .collect()
    })
    .collect()
}

/// Create the `~/Developer` tree and make Finder developer-friendly
pub fn setup_dev_workspace(runner: &dyn CommandRunner, layout: &HomeLayout) -> Result<()> {
    let root = layout.developer_dir();

    for (dir, blurb) in WORKSPACE_DIRS {
        let path = root.join(dir);
        fs::create_dir_all(&path).with_context(|| format!("create dir {}", dir))?;
        let readme = format!("# {}\n\n{}\n", dir, blurb);
        fs::write(path.join("README.md"), readme).with_context(|| format!("write {} README", dir))?;
    }
    fs::write(root.join("README.md"), WORKSPACE_README).context("write root README")?;

    for args in finder_preferences(&root) {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        if let Ok(out) = runner.run("defaults", &args) {
            if !out.exit_ok {
                warn!(args = ?args, "Finder preference not applied");
            }
        }
    }

    // Finder may not be running
    let _ = runner.run("killall", &["Finder"]);

    info!(root = %root.display(), "developer workspace ready");
    Ok(())
}
