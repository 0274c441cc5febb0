//! Config merge engine tests
//!
//! Properties over generated documents plus the concrete merge scenarios
//! for Codex `config.toml` and JSON settings files.

use freshbox::merge::{
    Document, DocumentPatch, SectionRewrite, ensure_section_key, merge_document, merge_line_config,
};
use proptest::prelude::*;
use serde_json::{Value, json};
use std::collections::BTreeMap;

const PROVIDER_SECTION: &str = "model_providers.freshbox";

fn codex_updates() -> BTreeMap<String, String> {
    [
        ("model", "model = \"o4-mini\""),
        ("model_reasoning_effort", "model_reasoning_effort = \"high\""),
        ("model_provider", "model_provider = \"freshbox\""),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn provider_rewrite() -> SectionRewrite {
    SectionRewrite::new(
        PROVIDER_SECTION,
        vec![
            "name = \"freshbox\"".to_string(),
            "base_url = \"https://api.example.com/v1\"".to_string(),
        ],
    )
}

// =============================================================================
// Generators
// =============================================================================

/// One plausible line of a key/section config file
fn config_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("model = \"old\"".to_string()),
        Just("model_provider = \"openai\"".to_string()),
        Just(format!("[{}]", PROVIDER_SECTION)),
        "[a-z_]{1,8} = \"[a-z0-9]{0,6}\"",
        "\\[[a-z]{1,6}(\\.[a-z]{1,4})?\\]",
        "# [a-z]{1,10}",
    ]
}

fn config_text() -> impl Strategy<Value = String> {
    prop::collection::vec(config_line(), 0..24).prop_map(|lines| lines.join("\n"))
}

/// Lines inside sections other than `skip`, in order
fn section_body_lines<'a>(text: &'a str, skip: &str) -> Vec<&'a str> {
    let mut current: Option<&str> = None;
    let mut out = Vec::new();
    for line in text.lines() {
        if line.trim_start().starts_with('[') {
            current = Some(line.trim().trim_start_matches('[').trim_end_matches(']'));
            out.push(line);
        } else if current.is_some_and(|name| name != skip) && !line.trim().is_empty() {
            out.push(line);
        }
    }
    out.retain(|line| {
        let name = line.trim().trim_start_matches('[').trim_end_matches(']');
        !(line.trim_start().starts_with('[') && name == skip)
    });
    out
}

fn json_object() -> impl Strategy<Value = serde_json::Map<String, Value>> {
    prop::collection::btree_map("[a-z]{1,6}", "[a-z0-9]{0,6}", 0..8).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect()
    })
}

// =============================================================================
// Line-oriented merge properties
// =============================================================================

proptest! {
    /// Merging the merge's own output changes nothing
    #[test]
    fn line_merge_is_idempotent(text in config_text(), with_rewrite in any::<bool>()) {
        let rewrite = provider_rewrite();
        let rewrite = with_rewrite.then_some(&rewrite);
        let once = merge_line_config(&text, &codex_updates(), rewrite);
        let twice = merge_line_config(&once, &codex_updates(), rewrite);
        prop_assert_eq!(once, twice);
    }

    /// Every updated key ends up at top level, the rewritten section once
    #[test]
    fn line_merge_sets_every_key_at_top_level(text in config_text()) {
        let merged = merge_line_config(&text, &codex_updates(), Some(&provider_rewrite()));
        let top_level: Vec<&str> = merged
            .lines()
            .take_while(|l| !l.trim_start().starts_with('['))
            .collect();
        for rendered in codex_updates().values() {
            prop_assert!(top_level.contains(&rendered.as_str()));
        }
        prop_assert_eq!(
            merged.matches(&format!("[{}]", PROVIDER_SECTION)).count(),
            1
        );
        prop_assert!(merged.ends_with('\n'));
        prop_assert!(!merged.ends_with("\n\n"));
        prop_assert!(!merged.contains("\n\n\n"));
    }

    /// Sections the merge does not target keep their lines, in order
    #[test]
    fn line_merge_preserves_other_sections(text in config_text()) {
        let merged = merge_line_config(&text, &codex_updates(), Some(&provider_rewrite()));
        let before = section_body_lines(&text, PROVIDER_SECTION);
        let after = section_body_lines(&merged, PROVIDER_SECTION);
        prop_assert_eq!(before, after);
    }

    /// The shared timeout lands once in every MCP server section
    #[test]
    fn ensure_section_key_inserts_once(names in prop::collection::btree_set("[a-z]{1,8}", 1..5)) {
        let text: String = names
            .iter()
            .map(|n| format!("[mcp_servers.{}]\ncommand = \"npx\"\n", n))
            .collect();
        let once = ensure_section_key(&text, "mcp_servers.", "startup_timeout_sec = 60");
        let twice = ensure_section_key(&once, "mcp_servers.", "startup_timeout_sec = 60");

        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.matches("startup_timeout_sec = 60").count(), names.len());
    }
}

// =============================================================================
// Nested-document merge properties
// =============================================================================

proptest! {
    /// Keys the patch does not name are untouched
    #[test]
    fn document_merge_preserves_unnamed_keys(
        root in json_object(),
        env in json_object(),
        model in "[a-z]{0,6}",
        key in "[A-Z]{1,6}",
        value in "[a-z]{0,6}",
    ) {
        let mut existing = Document::from(root.clone());
        existing.insert("env", Value::Object(env.clone()));

        let patch = DocumentPatch::new().scalar("model", model.clone()).map_entry("env", key.clone(), value.clone());
        let merged = merge_document(existing.clone(), &patch);

        for (k, v) in &root {
            if k == "model" && !model.is_empty() {
                continue;
            }
            if k == "env" {
                continue;
            }
            prop_assert_eq!(merged.get(k), Some(v));
        }

        let merged_env = merged.get("env").and_then(Value::as_object).cloned().unwrap_or_default();
        for (k, v) in &env {
            if *k == key && !value.is_empty() {
                continue;
            }
            prop_assert_eq!(merged_env.get(k), Some(v));
        }

        let again = merge_document(merged.clone(), &patch);
        prop_assert_eq!(again, merged);
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_codex_config_scenario() {
    let existing = "model = \"old\"\nmodel_reasoning_effort = \"low\"\n\n[some_section]\nkey = \"value\"\n";
    let updates: BTreeMap<String, String> = [
        ("model", "model = \"new\""),
        ("model_reasoning_effort", "model_reasoning_effort = \"high\""),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let merged = merge_line_config(existing, &updates, None);

    assert!(merged.contains("model = \"new\""));
    assert!(merged.contains("model_reasoning_effort = \"high\""));
    assert!(merged.contains("[some_section]\nkey = \"value\"\n"));
    assert!(!merged.contains("\n\n\n"));
    assert!(!merged.contains("\"old\""));
}

#[test]
fn test_provider_section_moves_to_end() {
    let existing = "[model_providers.freshbox]\nbase_url = \"https://old\"\n\n[history]\npersistence = \"none\"\n";
    let merged = merge_line_config(existing, &codex_updates(), Some(&provider_rewrite()));

    assert!(!merged.contains("https://old"));
    assert!(merged.ends_with("base_url = \"https://api.example.com/v1\"\n"));
    assert!(merged.contains("[history]\npersistence = \"none\""));
}

#[test]
fn test_document_scenario() {
    let patch = DocumentPatch::new().scalar("model", "x").map_entry("env", "K", "v");
    let merged = merge_document(Document::new(), &patch);
    assert_eq!(Value::Object(merged.as_map().clone()), json!({"model": "x", "env": {"K": "v"}}));

    let patch = DocumentPatch::new().map_entry("env", "K2", "v2");
    let merged = merge_document(merged, &patch);
    assert_eq!(
        Value::Object(merged.as_map().clone()),
        json!({"model": "x", "env": {"K": "v", "K2": "v2"}})
    );
}

#[test]
fn test_malformed_document_treated_as_empty() {
    let existing = Document::parse_lenient("{ \"model\": ");
    assert!(existing.is_empty());

    let merged = merge_document(existing, &DocumentPatch::new().scalar("model", "claude-sonnet-4-6"));
    assert_eq!(merged.get("model"), Some(&json!("claude-sonnet-4-6")));
}

#[test]
fn test_empty_map_field_is_never_stored() {
    let patch = DocumentPatch::new().scalar("model", "").map_entry("env", "ANTHROPIC_API_KEY", "");
    let merged = merge_document(Document::new(), &patch);
    assert!(merged.is_empty());
}
