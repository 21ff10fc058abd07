//! Accordion expansion store.
//!
//! # Responsibility
//! - Track which taxonomy nodes are expanded for rendering.
//! - Enforce single-open-per-scope for categories and subcategories.
//!
//! # Invariants
//! - Identities expand independently of each other.
//! - At most one category is expanded per identity scope and at most one
//!   subcategory per category scope.
//! - Collapsing (or replacing) a node clears the scope below it, unless that
//!   node is still open under another scope.
//! - Sub-subcategories are leaves and never expand.

use crate::model::catalog::NodeId;
use crate::model::level::Level;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Result of one expansion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandOutcome {
    Expanded,
    Collapsed,
    /// Leaf level, missing scope, or nothing to change.
    Ignored,
}

/// Snapshot of expanded nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionState {
    identities: BTreeSet<NodeId>,
    /// Identity id -> expanded category id.
    categories: BTreeMap<NodeId, NodeId>,
    /// Category id -> expanded subcategory id.
    subcategories: BTreeMap<NodeId, NodeId>,
}

impl ExpansionState {
    pub fn expanded_identities(&self) -> &BTreeSet<NodeId> {
        &self.identities
    }

    /// Expanded child within one parent scope.
    pub fn expanded_in(&self, level: Level, scope: &str) -> Option<&NodeId> {
        match level {
            Level::Category => self.categories.get(scope),
            Level::Subcategory => self.subcategories.get(scope),
            Level::Identity | Level::Subsub => None,
        }
    }

    /// Whether `id` is expanded. `scope` is ignored for identities.
    pub fn is_expanded(&self, level: Level, scope: Option<&str>, id: &str) -> bool {
        match level {
            Level::Identity => self.identities.contains(id),
            Level::Category | Level::Subcategory => scope
                .and_then(|scope| self.expanded_in(level, scope))
                .is_some_and(|open| open == id),
            Level::Subsub => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty() && self.categories.is_empty() && self.subcategories.is_empty()
    }

    fn scoped_mut(&mut self, level: Level) -> Option<&mut BTreeMap<NodeId, NodeId>> {
        match level {
            Level::Category => Some(&mut self.categories),
            Level::Subcategory => Some(&mut self.subcategories),
            Level::Identity | Level::Subsub => None,
        }
    }
}

/// Mutable expansion state for one picker.
#[derive(Debug, Clone, Default)]
pub struct ExpansionStore {
    state: ExpansionState,
}

impl ExpansionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ExpansionState {
        &self.state
    }

    pub fn is_expanded(&self, level: Level, scope: Option<&str>, id: &str) -> bool {
        self.state.is_expanded(level, scope, id)
    }

    /// Toggles `id` open or closed within `scope`.
    ///
    /// `scope` is the owning identity id for categories and the owning
    /// category id for subcategories; it is ignored for identities.
    pub fn toggle_expand(&mut self, level: Level, scope: Option<&str>, id: &str) -> ExpandOutcome {
        if self.state.is_expanded(level, scope, id) {
            self.collapse(level, scope, id)
        } else {
            self.expand_only(level, scope, id)
        }
    }

    /// Opens `id` within `scope`, leaving it open if it already is.
    pub fn expand_only(&mut self, level: Level, scope: Option<&str>, id: &str) -> ExpandOutcome {
        if level == Level::Identity {
            return if self.state.identities.insert(id.to_string()) {
                ExpandOutcome::Expanded
            } else {
                ExpandOutcome::Ignored
            };
        }

        let Some(scope) = scope else {
            return ExpandOutcome::Ignored;
        };
        let Some(scoped) = self.state.scoped_mut(level) else {
            return ExpandOutcome::Ignored;
        };
        match scoped.insert(scope.to_string(), id.to_string()) {
            Some(previous) if previous == id => ExpandOutcome::Ignored,
            Some(previous) => {
                self.clear_below(level, &previous);
                ExpandOutcome::Expanded
            }
            None => ExpandOutcome::Expanded,
        }
    }

    /// Closes `id` within `scope` and clears the scopes below it.
    pub fn collapse(&mut self, level: Level, scope: Option<&str>, id: &str) -> ExpandOutcome {
        if !self.state.is_expanded(level, scope, id) {
            return ExpandOutcome::Ignored;
        }
        match (level, scope) {
            (Level::Identity, _) => {
                self.state.identities.remove(id);
            }
            (_, Some(scope)) => {
                if let Some(scoped) = self.state.scoped_mut(level) {
                    scoped.remove(scope);
                }
            }
            (_, None) => return ExpandOutcome::Ignored,
        }
        self.clear_below(level, id);
        ExpandOutcome::Collapsed
    }

    /// Closes `id` in every scope where it is open.
    pub fn collapse_node(&mut self, level: Level, id: &str) -> ExpandOutcome {
        if level == Level::Identity {
            return self.collapse(level, None, id);
        }
        let Some(scoped) = self.state.scoped_mut(level) else {
            return ExpandOutcome::Ignored;
        };
        let before = scoped.len();
        scoped.retain(|_, open| open != id);
        if scoped.len() == before {
            return ExpandOutcome::Ignored;
        }
        self.clear_below(level, id);
        ExpandOutcome::Collapsed
    }

    pub fn collapse_all(&mut self) {
        self.state = ExpansionState::default();
    }

    fn clear_below(&mut self, level: Level, id: &str) {
        match level {
            Level::Identity => {
                if let Some(category) = self.state.categories.remove(id) {
                    self.clear_below(Level::Category, &category);
                }
            }
            Level::Category => {
                let still_open = self.state.categories.values().any(|open| open == id);
                if !still_open {
                    self.state.subcategories.remove(id);
                }
            }
            Level::Subcategory | Level::Subsub => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ExpandOutcome, ExpansionStore};
    use crate::model::level::Level;

    #[test]
    fn identities_expand_independently() {
        let mut store = ExpansionStore::new();
        store.toggle_expand(Level::Identity, None, "i1");
        store.toggle_expand(Level::Identity, None, "i2");
        assert!(store.is_expanded(Level::Identity, None, "i1"));
        assert!(store.is_expanded(Level::Identity, None, "i2"));
    }

    #[test]
    fn categories_are_single_open_per_identity() {
        let mut store = ExpansionStore::new();
        store.toggle_expand(Level::Category, Some("i1"), "c1");
        store.toggle_expand(Level::Category, Some("i2"), "c3");
        assert_eq!(
            store.toggle_expand(Level::Category, Some("i1"), "c2"),
            ExpandOutcome::Expanded
        );

        assert!(!store.is_expanded(Level::Category, Some("i1"), "c1"));
        assert!(store.is_expanded(Level::Category, Some("i1"), "c2"));
        assert!(store.is_expanded(Level::Category, Some("i2"), "c3"));
    }

    #[test]
    fn collapse_clears_descendant_scopes() {
        let mut store = ExpansionStore::new();
        store.toggle_expand(Level::Identity, None, "i1");
        store.toggle_expand(Level::Category, Some("i1"), "c1");
        store.toggle_expand(Level::Subcategory, Some("c1"), "s1");

        assert_eq!(
            store.toggle_expand(Level::Identity, None, "i1"),
            ExpandOutcome::Collapsed
        );
        assert!(store.state().is_empty());

        store.toggle_expand(Level::Identity, None, "i1");
        assert_eq!(store.state().expanded_in(Level::Category, "i1"), None);
    }

    #[test]
    fn replacing_a_sibling_clears_its_subtree() {
        let mut store = ExpansionStore::new();
        store.toggle_expand(Level::Category, Some("i1"), "c1");
        store.toggle_expand(Level::Subcategory, Some("c1"), "s1");
        store.toggle_expand(Level::Category, Some("i1"), "c2");

        assert_eq!(store.state().expanded_in(Level::Subcategory, "c1"), None);
    }

    #[test]
    fn shared_category_keeps_children_while_open_elsewhere() {
        let mut store = ExpansionStore::new();
        store.toggle_expand(Level::Category, Some("i1"), "c1");
        store.toggle_expand(Level::Category, Some("i2"), "c1");
        store.toggle_expand(Level::Subcategory, Some("c1"), "s1");

        store.toggle_expand(Level::Category, Some("i1"), "c1");
        assert!(store.is_expanded(Level::Subcategory, Some("c1"), "s1"));

        store.collapse_node(Level::Category, "c1");
        assert!(store.state().is_empty());
    }

    #[test]
    fn expand_only_never_toggles_off() {
        let mut store = ExpansionStore::new();
        assert_eq!(
            store.expand_only(Level::Subcategory, Some("c1"), "s1"),
            ExpandOutcome::Expanded
        );
        assert_eq!(
            store.expand_only(Level::Subcategory, Some("c1"), "s1"),
            ExpandOutcome::Ignored
        );
        assert!(store.is_expanded(Level::Subcategory, Some("c1"), "s1"));
    }

    #[test]
    fn leaves_and_missing_scopes_are_ignored() {
        let mut store = ExpansionStore::new();
        assert_eq!(
            store.toggle_expand(Level::Subsub, Some("s1"), "x1"),
            ExpandOutcome::Ignored
        );
        assert_eq!(
            store.toggle_expand(Level::Category, None, "c1"),
            ExpandOutcome::Ignored
        );
        assert!(store.state().is_empty());
    }
}
