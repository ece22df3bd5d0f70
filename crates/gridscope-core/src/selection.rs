//! Category selection shared by the bar chart and the cartogram.

use indexmap::IndexSet;
use serde::Serialize;

/// A set of category (or region) keys in insertion order.
pub type KeySet = IndexSet<String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "keys", rename_all = "camelCase")]
pub enum Selection {
    #[default]
    Unfiltered,
    Filtered(KeySet),
}

impl Selection {
    /// An empty set is the same as no selection.
    pub fn from_keys(keys: KeySet) -> Self {
        if keys.is_empty() {
            Self::Unfiltered
        } else {
            Self::Filtered(keys)
        }
    }

    pub fn keys(&self) -> Option<&KeySet> {
        match self {
            Self::Unfiltered => None,
            Self::Filtered(keys) => Some(keys),
        }
    }

    pub fn is_filtered(&self) -> bool {
        matches!(self, Self::Filtered(_))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys().is_some_and(|k| k.contains(key))
    }

    /// Key set produced by clicking `key`: from no selection this selects only `key`; from a
    /// filtered state it toggles membership of `key`.
    pub fn toggled(&self, key: &str) -> KeySet {
        match self {
            Self::Unfiltered => KeySet::from([key.to_string()]),
            Self::Filtered(keys) => {
                let mut next = keys.clone();
                if !next.shift_remove(key) {
                    next.insert(key.to_string());
                }
                next
            }
        }
    }

    /// Key set with `key` removed, or `None` when `key` is not selected.
    pub fn without(&self, key: &str) -> Option<KeySet> {
        let keys = self.keys()?;
        if !keys.contains(key) {
            return None;
        }
        let mut next = keys.clone();
        next.shift_remove(key);
        Some(next)
    }

    /// Whether marks of `key` respond to hover and click.
    pub fn is_interactive(&self, key: &str) -> bool {
        match self {
            Self::Unfiltered => true,
            Self::Filtered(keys) => keys.contains(key),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HighlightClass {
    Selected,
    NotSelected,
}

impl HighlightClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Selected => "cause-selected",
            Self::NotSelected => "cause-not-selected",
        }
    }
}

/// Highlight class of a mark with category `key`. Unfiltered marks carry no class.
pub fn highlight_class(selection: &Selection, key: &str) -> Option<HighlightClass> {
    match selection {
        Selection::Unfiltered => None,
        Selection::Filtered(keys) if keys.contains(key) => Some(HighlightClass::Selected),
        Selection::Filtered(_) => Some(HighlightClass::NotSelected),
    }
}
