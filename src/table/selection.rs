//! Row selection by identity.
//!
//! Rows are ephemeral per page; their ids are the stable keys kept here, so a
//! selection outlives navigation to other pages.

use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    selected: HashSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected ids, sorted for deterministic output
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn as_set(&self) -> &HashSet<String> {
        &self.selected
    }

    /// Add the id if absent, remove it otherwise.
    /// Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.to_string());
            true
        }
    }

    /// True when `ids` is non-empty and every one of them is selected
    pub fn contains_all<'a>(&self, mut ids: impl Iterator<Item = &'a str>) -> bool {
        let mut any = false;
        let all = ids.all(|id| {
            any = true;
            self.selected.contains(id)
        });
        any && all
    }

    /// Replace the whole selection
    pub fn replace(&mut self, ids: impl IntoIterator<Item = String>) {
        self.selected = ids.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}

impl FromIterator<String> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            selected: iter.into_iter().collect(),
        }
    }
}
