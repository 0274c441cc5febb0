//! Line-oriented merge for key/section config files (Codex `config.toml`).
//!
//! The file is never parsed into a tree. Lines are classified as top-level
//! assignments (before the first `[section]` header), section headers, or
//! section body lines, and only the lines a merge targets are touched.

use std::collections::{BTreeMap, HashSet};

/// Replacement for one whole `[name]` block.
///
/// The existing block (header through the line before the next header) is
/// removed wherever it sits and the replacement is appended at the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRewrite {
    pub name: String,
    pub body: Vec<String>,
}

impl SectionRewrite {
    pub fn new(name: impl Into<String>, body: Vec<String>) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }

    fn header(&self) -> String {
        format!("[{}]", self.name)
    }
}

/// True for `[name]`, `[name.qualifier]` and `[[array]]` lines
pub fn is_section_header(line: &str) -> bool {
    line.trim_start().starts_with('[')
}

/// Section name of a header line: the text inside the brackets, so a
/// trailing `# comment` after the closing `]` is not part of it
pub fn section_name(line: &str) -> &str {
    let inner = line.trim().trim_start_matches('[');
    let end = inner.find(']').unwrap_or(inner.len());
    inner[..end].trim()
}

/// Whether `line` assigns `key` (`key = ...` or `key=...`)
fn assigns_key(line: &str, key: &str) -> bool {
    line.trim_start()
        .strip_prefix(key)
        .is_some_and(|rest| rest.starts_with(' ') || rest.starts_with('='))
}

/// Merge top-level key updates and an optional section rewrite into `existing`.
///
/// `updates` maps a key to its fully rendered line, which must itself assign
/// that key (`model = "o4-mini"`). Keys found as top-level lines are replaced
/// in place; keys never found are prepended in key order. Runs of blank lines
/// collapse to one and the result carries exactly one trailing newline.
///
/// Applying the same inputs to the output again yields the same bytes.
pub fn merge_line_config(
    existing: &str,
    updates: &BTreeMap<String, String>,
    rewrite: Option<&SectionRewrite>,
) -> String {
    let mut applied: HashSet<&str> = HashSet::new();
    let mut body: Vec<String> = Vec::new();
    let mut inside_any_section = false;
    let mut skipping = false;

    for line in existing.lines() {
        if is_section_header(line) {
            inside_any_section = true;
            skipping = rewrite.is_some_and(|r| section_name(line) == r.name);
            if !skipping {
                body.push(line.to_string());
            }
            continue;
        }

        if skipping {
            continue;
        }

        if !inside_any_section {
            if let Some((key, rendered)) = updates.iter().find(|(key, _)| assigns_key(line, key)) {
                applied.insert(key.as_str());
                body.push(rendered.clone());
                continue;
            }
        }

        body.push(line.to_string());
    }

    if let Some(rewrite) = rewrite {
        body.push(String::new());
        body.push(rewrite.header());
        body.extend(rewrite.body.iter().cloned());
    }

    let mut assembled: Vec<String> = updates
        .iter()
        .filter(|(key, _)| !applied.contains(key.as_str()))
        .map(|(_, rendered)| rendered.clone())
        .collect();
    assembled.extend(body);

    finish(&assembled)
}

/// Collapse blank runs, trim the document, end with a single newline
fn finish(lines: &[String]) -> String {
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    let mut previous_blank = false;

    for line in lines {
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        out.push(if blank { "" } else { line.as_str() });
        previous_blank = blank;
    }

    let mut text = out.join("\n").trim().to_string();
    text.push('\n');
    text
}

/// Insert `key_line` into every direct child section of `prefix`
/// (`[mcp_servers.x]`, not `[mcp_servers.x.env]`) that does not already
/// set the key.
///
/// The line goes directly under the header. Sections that already carry the
/// key, and all other bytes of the document, are left as they are.
pub fn ensure_section_key(text: &str, prefix: &str, key_line: &str) -> String {
    let key = key_line.split('=').next().unwrap_or(key_line).trim();
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());

    for (i, &line) in lines.iter().enumerate() {
        out.push(line);

        if !is_section_header(line) {
            continue;
        }
        let direct_child = section_name(line)
            .strip_prefix(prefix)
            .is_some_and(|rest| !rest.is_empty() && !rest.contains('.'));
        if !direct_child {
            continue;
        }

        let has_key = lines[i + 1..]
            .iter()
            .take_while(|l| !is_section_header(l))
            .any(|l| assigns_key(l, key));

        if !has_key {
            out.push(key_line);
        }
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn updates(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_replaces_top_level_keys_in_place() {
        let existing = "model = \"old\"\nmodel_reasoning_effort = \"low\"\n\n[some_section]\nkey = \"value\"\n";
        let merged = merge_line_config(
            existing,
            &updates(&[
                ("model", "model = \"new\""),
                ("model_reasoning_effort", "model_reasoning_effort = \"high\""),
            ]),
            None,
        );

        assert_eq!(
            merged,
            "model = \"new\"\nmodel_reasoning_effort = \"high\"\n\n[some_section]\nkey = \"value\"\n"
        );
        assert!(!merged.contains("\n\n\n"));
    }

    #[test]
    fn test_key_inside_section_is_not_replaced() {
        let existing = "[profile]\nmodel = \"kept\"\n";
        let merged = merge_line_config(existing, &updates(&[("model", "model = \"new\"")]), None);

        assert_eq!(merged, "model = \"new\"\n[profile]\nmodel = \"kept\"\n");
    }

    #[test]
    fn test_missing_keys_are_prepended_in_key_order() {
        let merged = merge_line_config(
            "foo = 1\n",
            &updates(&[("zeta", "zeta = 2"), ("alpha", "alpha = 1")]),
            None,
        );
        assert_eq!(merged, "alpha = 1\nzeta = 2\nfoo = 1\n");
    }

    #[test]
    fn test_prefix_of_longer_key_does_not_match() {
        let existing = "model_reasoning_effort = \"low\"\n";
        let merged = merge_line_config(existing, &updates(&[("model", "model = \"x\"")]), None);
        assert_eq!(merged, "model = \"x\"\nmodel_reasoning_effort = \"low\"\n");
    }

    #[test]
    fn test_equals_without_space_matches() {
        let merged = merge_line_config("model=\"a\"\n", &updates(&[("model", "model = \"b\"")]), None);
        assert_eq!(merged, "model = \"b\"\n");
    }

    #[test]
    fn test_section_rewrite_moves_block_to_end() {
        let existing = "[model_providers.freshbox]\nbase_url = \"old\"\n\n[other]\na = 1\n";
        let rewrite = SectionRewrite::new("model_providers.freshbox", vec!["base_url = \"new\"".into()]);
        let merged = merge_line_config(existing, &BTreeMap::new(), Some(&rewrite));

        assert_eq!(merged, "[other]\na = 1\n\n[model_providers.freshbox]\nbase_url = \"new\"\n");
    }

    #[test]
    fn test_section_rewrite_appends_when_absent() {
        let rewrite = SectionRewrite::new("p", vec!["x = 1".into()]);
        let merged = merge_line_config("a = 1\n", &BTreeMap::new(), Some(&rewrite));
        assert_eq!(merged, "a = 1\n\n[p]\nx = 1\n");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let existing = "# user comment\nmodel = \"old\"\n\n\n\n[mcp_servers.x]\ncommand = \"npx\"\n";
        let ups = updates(&[
            ("model", "model = \"new\""),
            ("model_provider", "model_provider = \"freshbox\""),
        ]);
        let rewrite = SectionRewrite::new("model_providers.freshbox", vec!["name = \"openai\"".into()]);

        let once = merge_line_config(existing, &ups, Some(&rewrite));
        let twice = merge_line_config(&once, &ups, Some(&rewrite));
        assert_eq!(once, twice);
        assert_eq!(once.matches("[model_providers.freshbox]").count(), 1);
    }

    #[test]
    fn test_empty_document() {
        let merged = merge_line_config("", &updates(&[("model", "model = \"m\"")]), None);
        assert_eq!(merged, "model = \"m\"\n");
    }

    #[test]
    fn test_whitespace_only_lines_collapse() {
        let merged = merge_line_config("a = 1\n   \n\t\nb = 2\n", &BTreeMap::new(), None);
        assert_eq!(merged, "a = 1\n\nb = 2\n");
    }

    #[test]
    fn test_ensure_section_key_inserts_after_header() {
        let text = "[mcp_servers.fetch]\ncommand = \"npx\"\n[mcp_servers.memory]\nstartup_timeout_sec = 30\n[other]\n";
        let out = ensure_section_key(text, "mcp_servers.", "startup_timeout_sec = 60");

        assert_eq!(
            out,
            "[mcp_servers.fetch]\nstartup_timeout_sec = 60\ncommand = \"npx\"\n[mcp_servers.memory]\nstartup_timeout_sec = 30\n[other]\n"
        );
    }

    #[test]
    fn test_ensure_section_key_twice_inserts_once() {
        let text = "[mcp_servers.fetch]\ncommand = \"npx\"\n";
        let once = ensure_section_key(text, "mcp_servers.", "startup_timeout_sec = 60");
        let twice = ensure_section_key(&once, "mcp_servers.", "startup_timeout_sec = 60");

        assert_eq!(once, twice);
        assert_eq!(twice.matches("startup_timeout_sec").count(), 1);
    }

    #[test]
    fn test_header_with_trailing_comment_is_rewritten() {
        let existing = "model = \"a\"\n\n[model_providers.freshbox] # mine\nbase_url = \"https://old\"\n";
        let rewrite = SectionRewrite::new("model_providers.freshbox", vec!["base_url = \"new\"".into()]);
        let merged = merge_line_config(existing, &BTreeMap::new(), Some(&rewrite));

        assert_eq!(merged, "model = \"a\"\n\n[model_providers.freshbox]\nbase_url = \"new\"\n");
        assert_eq!(merged.matches("[model_providers.freshbox]").count(), 1);
    }

    #[test]
    fn test_section_name_stops_at_closing_bracket() {
        assert_eq!(section_name("[model_providers.freshbox] # mine"), "model_providers.freshbox");
        assert_eq!(section_name("  [ a.b ]"), "a.b");
        assert_eq!(section_name("[[profiles]]"), "profiles");
    }

    #[test]
    fn test_ensure_section_key_handles_commented_header() {
        let text = "[mcp_servers.fetch] # added by hand\ncommand = \"npx\"\n";
        let out = ensure_section_key(text, "mcp_servers.", "startup_timeout_sec = 60");
        assert_eq!(
            out,
            "[mcp_servers.fetch] # added by hand\nstartup_timeout_sec = 60\ncommand = \"npx\"\n"
        );
    }

    #[test]
    fn test_ensure_section_key_skips_nested_tables() {
        let text = "[mcp_servers.github]\ncommand = \"npx\"\n[mcp_servers.github.env]\nGITHUB_TOKEN = \"x\"\n";
        let out = ensure_section_key(text, "mcp_servers.", "startup_timeout_sec = 60");
        assert_eq!(
            out,
            "[mcp_servers.github]\nstartup_timeout_sec = 60\ncommand = \"npx\"\n[mcp_servers.github.env]\nGITHUB_TOKEN = \"x\"\n"
        );
    }

    #[test]
    fn test_ensure_section_key_ignores_longer_key() {
        let text = "[mcp_servers.fetch]\nstartup_timeout_sec_extra = 5\n";
        let out = ensure_section_key(text, "mcp_servers.", "startup_timeout_sec = 60");
        assert_eq!(
            out,
            "[mcp_servers.fetch]\nstartup_timeout_sec = 60\nstartup_timeout_sec_extra = 5\n"
        );
    }

    #[test]
    fn test_ensure_section_key_ignores_other_sections() {
        let text = "[mcp_servers]\nx = 1\n[profile.mcp_servers.a]\n";
        assert_eq!(ensure_section_key(text, "mcp_servers.", "startup_timeout_sec = 60"), text);
    }
}
