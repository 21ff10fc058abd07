//! Roll-up badge counts.
//!
//! # Responsibility
//! - Count selected strict descendants of a node for badge display.
//! - Memoize counts per selection value.
//!
//! # Invariants
//! - `count` is a pure function of lookup and selection.
//! - Sub-subcategories are leaves and have no count.
//! - The memo never answers for a selection other than the one it was filled for.
//! - Staleness is checked by set identity, never by walking the selection.

use crate::index::ownership::TaxonomyLookup;
use crate::model::catalog::NodeId;
use crate::model::level::Level;
use crate::model::selection::SelectionState;
use std::collections::HashMap;

/// Number of selected ids strictly below `id`.
///
/// Returns `None` for sub-subcategories and for ids unknown to `lookup`.
pub fn count<L: TaxonomyLookup>(
    lookup: &L,
    selection: &SelectionState,
    level: Level,
    id: &str,
) -> Option<usize> {
    let child_level = level.child()?;
    if !lookup.contains(level, id) {
        return None;
    }

    let mut total = 0usize;
    for child in lookup.children_of(level, id) {
        if selection.contains(child_level, child) {
            total += 1;
        }
        if child_level != Level::Subsub {
            total += count(lookup, selection, child_level, child).unwrap_or(0);
        }
    }
    Some(total)
}

/// Memoizing wrapper around [`count`].
#[derive(Debug, Clone, Default)]
pub struct RollupCounter {
    basis: Option<SelectionState>,
    cache: HashMap<(Level, NodeId), Option<usize>>,
}

impl RollupCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the count for `id`, reusing cached values while the selection is unchanged.
    pub fn count<L: TaxonomyLookup>(
        &mut self,
        lookup: &L,
        selection: &SelectionState,
        level: Level,
        id: &str,
    ) -> Option<usize> {
        let fresh = self
            .basis
            .as_ref()
            .is_some_and(|basis| basis.shares_storage_with(selection));
        if !fresh {
            self.cache.clear();
            self.basis = Some(selection.clone());
        }
        if let Some(cached) = self.cache.get(&(level, id.to_string())) {
            return *cached;
        }
        let value = count(lookup, selection, level, id);
        self.cache.insert((level, id.to_string()), value);
        value
    }

    /// Drops every cached value, e.g. after the catalog changed.
    pub fn invalidate(&mut self) {
        self.basis = None;
        self.cache.clear();
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{count, RollupCounter};
    use crate::config::CatalogMode;
    use crate::index::ownership::OwnershipIndex;
    use crate::model::catalog::{Catalog, TaxonomyNode};
    use crate::model::level::Level;
    use crate::service::selection_service::{SelectionPolicy, SelectionStore};

    fn index() -> OwnershipIndex {
        let catalog = Catalog::new(vec![TaxonomyNode::new("i1", "Entrepreneur")
            .child(
                TaxonomyNode::new("c1", "Technology")
                    .child(
                        TaxonomyNode::new("s1", "Fintech")
                            .child(TaxonomyNode::new("x1", "Payments"))
                            .child(TaxonomyNode::new("x2", "Lending")),
                    )
                    .child(TaxonomyNode::new("s2", "Edtech")),
            )
            .child(TaxonomyNode::new("c2", "Finance"))]);
        OwnershipIndex::build(&catalog, CatalogMode::Shared)
    }

    #[test]
    fn counts_selected_descendants_only() {
        let index = index();
        let mut store = SelectionStore::new(&index, SelectionPolicy::default());
        store.toggle_subsub("x1");
        store.toggle_subsub("x2");
        store.toggle_subcategory("s2");
        store.toggle_category("c2");
        store.toggle_identity("i1");
        let state = store.state();

        assert_eq!(count(&index, state, Level::Subcategory, "s1"), Some(2));
        assert_eq!(count(&index, state, Level::Subcategory, "s2"), Some(0));
        assert_eq!(count(&index, state, Level::Category, "c1"), Some(4));
        assert_eq!(count(&index, state, Level::Identity, "i1"), Some(6));
    }

    #[test]
    fn leaves_and_unknown_ids_have_no_count() {
        let index = index();
        let store = SelectionStore::new(&index, SelectionPolicy::default());
        assert_eq!(count(&index, store.state(), Level::Subsub, "x1"), None);
        assert_eq!(count(&index, store.state(), Level::Category, "zz"), None);
    }

    #[test]
    fn memo_refreshes_when_selection_changes() {
        let index = index();
        let mut store = SelectionStore::new(&index, SelectionPolicy::default());
        let mut counter = RollupCounter::new();

        assert_eq!(
            counter.count(&index, store.state(), Level::Category, "c1"),
            Some(0)
        );
        assert_eq!(counter.cached_len(), 1);

        store.toggle_subsub("x1");
        assert_eq!(
            counter.count(&index, store.state(), Level::Category, "c1"),
            Some(2)
        );
        assert_eq!(counter.cached_len(), 1);

        counter.invalidate();
        assert_eq!(counter.cached_len(), 0);
    }

    #[test]
    fn memo_survives_unchanged_selection_and_refreshes_after_round_trip() {
        let index = index();
        let mut store = SelectionStore::new(&index, SelectionPolicy::default());
        let mut counter = RollupCounter::new();
        store.toggle_subsub("x1");

        counter.count(&index, store.state(), Level::Category, "c1");
        counter.count(&index, store.state(), Level::Identity, "i1");
        assert_eq!(counter.cached_len(), 2);

        store.toggle_subsub("x2");
        store.toggle_subsub("x2");
        assert_eq!(
            counter.count(&index, store.state(), Level::Category, "c1"),
            Some(2)
        );
        assert_eq!(counter.cached_len(), 1);
    }
}
