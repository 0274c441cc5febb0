//! Nested JSON document merge (Claude `settings.json`, Codex `auth.json`,
//! Zed `settings.json`, Karabiner `karabiner.json`).

use serde_json::{Map, Value};
use tracing::debug;

/// A JSON object document. Top-level key order survives a merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    root: Map<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text` as a JSON object, falling back to an empty document.
    ///
    /// Empty input, invalid JSON and non-object roots all yield an empty
    /// document; the merge then rebuilds only the keys it targets.
    pub fn parse_lenient(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::new();
        }
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(root)) => Self { root },
            Ok(other) => {
                debug!(kind = value_kind(&other), "existing document is not an object, starting empty");
                Self::new()
            }
            Err(e) => {
                debug!(error = %e, "existing document did not parse, starting empty");
                Self::new()
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.root.insert(key.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Two-space indented JSON with a trailing newline
    pub fn to_pretty_string(&self) -> serde_json::Result<String> {
        let mut text = serde_json::to_string_pretty(&self.root)?;
        text.push('\n');
        Ok(text)
    }
}

impl From<Map<String, Value>> for Document {
    fn from(root: Map<String, Value>) -> Self {
        Self { root }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Entries destined for the one designated string map (`env` and the like)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapFieldPatch {
    pub name: String,
    pub entries: Vec<(String, String)>,
}

/// Values to merge into a [`Document`]. Empty strings mean "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentPatch {
    pub scalars: Vec<(String, String)>,
    pub map_field: Option<MapFieldPatch>,
}

impl DocumentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scalar(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.scalars.push((key.into(), value.into()));
        self
    }

    /// Add an entry to the designated map field `field`.
    ///
    /// A patch carries a single map field; naming another field renames it.
    pub fn map_entry(
        mut self,
        field: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let field = field.into();
        let patch = self.map_field.get_or_insert_with(|| MapFieldPatch {
            name: field.clone(),
            entries: Vec::new(),
        });
        patch.name = field;
        patch.entries.push((key.into(), value.into()));
        self
    }
}

/// Merge `patch` into `existing`.
///
/// Non-empty scalars overwrite their top-level key. The map field is merged
/// key-wise: existing entries survive, patch entries overwrite only their own
/// keys, and the field is written only when the merged map is non-empty.
/// Keys the patch does not name are never touched.
pub fn merge_document(mut existing: Document, patch: &DocumentPatch) -> Document {
    for (key, value) in &patch.scalars {
        if !value.is_empty() {
            existing.insert(key.clone(), Value::String(value.clone()));
        }
    }

    let Some(map_patch) = &patch.map_field else {
        return existing;
    };

    let supplied: Vec<&(String, String)> = map_patch
        .entries
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .collect();

    // A non-object value is only replaced when there is something to write
    let foreign_value = existing
        .get(&map_patch.name)
        .is_some_and(|value| !value.is_object());
    if foreign_value && supplied.is_empty() {
        return existing;
    }

    let mut merged = match existing.get(&map_patch.name) {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };

    for (key, value) in supplied {
        merged.insert(key.clone(), Value::String(value.clone()));
    }

    if !merged.is_empty() {
        existing.insert(map_patch.name.clone(), Value::Object(merged));
    }

    existing
}
