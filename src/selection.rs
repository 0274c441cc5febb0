//! Per-page selection state
//!
//! One typed [`SelectionSet`] per category. An item that is not in the set is
//! not selected; there is no separate "false" entry to keep in sync.

use crate::catalog::{AiTool, CatalogItem, DesktopApp, DevTool, Extra, McpPreset, SystemDefault};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Set of selected items of one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet<T: Ord> {
    items: BTreeSet<T>,
}

impl<T: Ord> Default for SelectionSet<T> {
    fn default() -> Self {
        Self {
            items: BTreeSet::new(),
        }
    }
}

impl<T: Ord> SelectionSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    pub fn set(&mut self, item: T, selected: bool) {
        if selected {
            self.items.insert(item);
        } else {
            self.items.remove(&item);
        }
    }

    /// Flip one item, returning its new state
    pub fn toggle(&mut self, item: T) -> bool {
        if self.items.remove(&item) {
            false
        } else {
            self.items.insert(item);
            true
        }
    }

    pub fn select_all(&mut self, items: impl IntoIterator<Item = T>) {
        self.items.extend(items);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Ord> FromIterator<T> for SelectionSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T: CatalogItem> SelectionSet<T> {
    /// Selected items in catalog order
    pub fn in_catalog_order(&self) -> Vec<T> {
        T::iter().filter(|item| self.is_selected(item)).collect()
    }
}

/// Every selection the wizard collects, as one value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selections {
    pub tools: SelectionSet<DevTool>,
    pub apps: SelectionSet<DesktopApp>,
    pub ai_tools: SelectionSet<AiTool>,
    pub node_versions: SelectionSet<String>,
    pub mcp_servers: SelectionSet<McpPreset>,
    pub system_defaults: SelectionSet<SystemDefault>,
    pub extras: SelectionSet<Extra>,
}

impl Selections {
    /// Nothing selected anywhere
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
            && self.apps.is_empty()
            && self.ai_tools.is_empty()
            && self.node_versions.is_empty()
            && self.mcp_servers.is_empty()
            && self.system_defaults.is_empty()
            && self.extras.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_means_unselected() {
        let set: SelectionSet<DevTool> = SelectionSet::new();
        assert!(!set.is_selected(&DevTool::Fnm));
    }

    #[test]
    fn test_toggle_and_set() {
        let mut set = SelectionSet::new();
        assert!(set.toggle(DevTool::Git));
        assert!(set.is_selected(&DevTool::Git));
        assert!(!set.toggle(DevTool::Git));
        assert!(set.is_empty());

        set.set(DevTool::Go, true);
        set.set(DevTool::Go, true);
        assert_eq!(set.len(), 1);
        set.set(DevTool::Go, false);
        assert!(set.is_empty());
    }

    #[test]
    fn test_catalog_order() {
        let set: SelectionSet<DevTool> = [DevTool::Go, DevTool::Homebrew, DevTool::Fnm]
            .into_iter()
            .collect();
        assert_eq!(
            set.in_catalog_order(),
            [DevTool::Homebrew, DevTool::Fnm, DevTool::Go]
        );
    }

    #[test]
    fn test_selections_serialize_as_lists() {
        let mut selections = Selections::default();
        selections.tools.set(DevTool::Fnm, true);
        selections.node_versions.set("v22.11.0".to_string(), true);

        let json = serde_json::to_value(&selections).unwrap();
        assert_eq!(json["tools"], serde_json::json!(["fnm"]));
        assert_eq!(json["node_versions"], serde_json::json!(["v22.11.0"]));

        let back: Selections = serde_json::from_value(json).unwrap();
        assert_eq!(back, selections);
    }

    #[test]
    fn test_missing_fields_default_empty() {
        let selections: Selections = serde_json::from_str(r#"{"apps": ["zed"]}"#).unwrap();
        assert!(selections.apps.is_selected(&DesktopApp::Zed));
        assert!(selections.tools.is_empty());
        assert!(!selections.is_empty());
    }
}
