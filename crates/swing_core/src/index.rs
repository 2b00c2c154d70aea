//! # Player Index
//!
//! Sorted, de-duplicated batter names derived once from the Record Store.
//! Backs exact-name checks for the Filter Resolver and the auto-complete
//! suggestions shown while the viewer types.

use rustc_hash::FxHashSet;

use crate::data::RecordStore;

/// Distinct non-empty batter names in ordinal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerIndex {
    sorted_names: Vec<String>,
}

impl PlayerIndex {
    /// Build from every row of the store.
    pub fn build(store: &RecordStore) -> Self {
        Self::from_names(store.all().iter().map(|r| r.batter_name.as_str()))
    }

    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let unique: FxHashSet<&str> = names
            .into_iter()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect();

        let mut sorted_names: Vec<String> = unique.into_iter().map(str::to_string).collect();
        sorted_names.sort_unstable();
        Self { sorted_names }
    }

    pub fn sorted_names(&self) -> &[String] {
        &self.sorted_names
    }

    /// Exact (trimmed) name membership.
    pub fn contains(&self, name: &str) -> bool {
        self.sorted_names
            .binary_search_by(|probe| probe.as_str().cmp(name.trim()))
            .is_ok()
    }

    /// Case-insensitive substring matches, in index order, at most `limit`.
    ///
    /// An empty query returns nothing: suggestions only appear once the
    /// viewer has typed something.
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<String> {
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.sorted_names
            .iter()
            .filter(|name| name.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sorted_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted_names.is_empty()
    }
}
