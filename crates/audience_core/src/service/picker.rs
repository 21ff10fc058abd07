//! Audience picker facade.
//!
//! # Responsibility
//! - Bundle one screen's catalog, ownership index, selection store,
//!   expansion store and roll-up counter behind a single API.
//! - Provide the host conveniences that combine both stores: collapse on
//!   deselection, reveal-after-select, and restricted identity views.
//!
//! # Invariants
//! - The ownership index is rebuilt only when a different catalog `Arc` is
//!   supplied.
//! - Selection and expansion stores never call each other; every cross-store
//!   effect is applied here.

use crate::config::PickerConfig;
use crate::index::ownership::{OwnershipIndex, TaxonomyLookup};
use crate::model::catalog::{Catalog, NodeId, TaxonomyNode};
use crate::model::level::Level;
use crate::model::selection::{SavedSelection, SelectionState};
use crate::service::expansion_service::{ExpandOutcome, ExpansionState, ExpansionStore};
use crate::service::rollup::RollupCounter;
use crate::service::selection_service::{SelectionPolicy, SelectionStore, ToggleOutcome};
use log::{debug, info};
use std::sync::Arc;

/// Host filter limiting the picker to some identities.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RestrictedView {
    /// Identity display names to show. Empty shows every identity.
    pub shown: Vec<String>,
    /// Select the single shown identity on mount, as the people directory does.
    pub auto_select: bool,
}

impl RestrictedView {
    pub fn new(shown: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            shown: shown.into_iter().map(Into::into).collect(),
            auto_select: false,
        }
    }

    #[must_use]
    pub fn auto_selecting(mut self) -> Self {
        self.auto_select = true;
        self
    }

    fn allows(&self, name: &str) -> bool {
        self.shown.is_empty()
            || self
                .shown
                .iter()
                .any(|shown| shown.trim().eq_ignore_ascii_case(name.trim()))
    }
}

/// Taxonomy selection engine for one hosting screen.
#[derive(Debug)]
pub struct AudiencePicker {
    config: PickerConfig,
    catalog: Arc<Catalog>,
    index: Arc<OwnershipIndex>,
    selection: SelectionStore<Arc<OwnershipIndex>>,
    expansion: ExpansionStore,
    counter: RollupCounter,
}

impl AudiencePicker {
    /// Creates a picker with an empty selection.
    pub fn new(catalog: Arc<Catalog>, config: PickerConfig) -> Self {
        Self::with_saved_selection(catalog, config, &SavedSelection::default())
    }

    /// Creates a picker hydrated from a previously saved selection.
    pub fn with_saved_selection(
        catalog: Arc<Catalog>,
        config: PickerConfig,
        saved: &SavedSelection,
    ) -> Self {
        let index = Arc::new(OwnershipIndex::build(&catalog, config.mode));
        let policy = SelectionPolicy {
            auto_select_owner: config.auto_select_owner,
        };
        let selection = SelectionStore::hydrate(Arc::clone(&index), policy, saved);
        info!(
            "event=picker_open module=picker status=ok mode={:?} hydrated={} issues={}",
            config.mode,
            selection.state().len(),
            index.issues().len()
        );
        Self {
            config,
            catalog,
            index,
            selection,
            expansion: ExpansionStore::new(),
            counter: RollupCounter::new(),
        }
    }

    pub fn config(&self) -> PickerConfig {
        self.config
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn index(&self) -> &OwnershipIndex {
        &self.index
    }

    /// Swaps in a new catalog.
    ///
    /// Returns `false` without rebuilding when `catalog` is the current one.
    /// Otherwise the index is rebuilt and the selection is re-normalized
    /// against it (stale ids dropped, upward closure restored).
    pub fn replace_catalog(&mut self, catalog: Arc<Catalog>) -> bool {
        if Arc::ptr_eq(&self.catalog, &catalog) {
            return false;
        }
        let before = self.selection.state().clone();
        self.index = Arc::new(OwnershipIndex::build(&catalog, self.config.mode));
        self.catalog = catalog;
        self.selection.rebind(Arc::clone(&self.index));
        self.counter.invalidate();
        self.collapse_removed(&before);
        info!(
            "event=catalog_replaced module=picker status=ok selected={} issues={}",
            self.selection.state().len(),
            self.index.issues().len()
        );
        true
    }

    /// Current selection snapshot.
    pub fn selection(&self) -> &SelectionState {
        self.selection.state()
    }

    /// Selection flattened for the host persistence payload.
    pub fn saved_selection(&self) -> SavedSelection {
        self.selection.state().to_saved()
    }

    pub fn expansion(&self) -> &ExpansionState {
        self.expansion.state()
    }

    pub fn is_selected(&self, level: Level, id: &str) -> bool {
        self.selection.is_selected(level, id)
    }

    /// Toggles one node and collapses whatever left the selection.
    pub fn toggle(&mut self, level: Level, id: &str) -> ToggleOutcome {
        let before = self.selection.state().clone();
        let outcome = self.selection.toggle(level, id);
        if outcome.changed() {
            self.collapse_removed(&before);
        }
        outcome
    }

    pub fn toggle_identity(&mut self, id: &str) -> ToggleOutcome {
        self.toggle(Level::Identity, id)
    }

    pub fn toggle_category(&mut self, id: &str) -> ToggleOutcome {
        self.toggle(Level::Category, id)
    }

    pub fn toggle_subcategory(&mut self, id: &str) -> ToggleOutcome {
        self.toggle(Level::Subcategory, id)
    }

    pub fn toggle_subsub(&mut self, id: &str) -> ToggleOutcome {
        self.toggle(Level::Subsub, id)
    }

    pub fn clear_all(&mut self) {
        let before = self.selection.state().clone();
        self.selection.clear_all();
        self.collapse_removed(&before);
    }

    pub fn toggle_expand(&mut self, level: Level, scope: Option<&str>, id: &str) -> ExpandOutcome {
        self.expansion.toggle_expand(level, scope, id)
    }

    pub fn expand_only(&mut self, level: Level, scope: Option<&str>, id: &str) -> ExpandOutcome {
        self.expansion.expand_only(level, scope, id)
    }

    pub fn collapse_all(&mut self) {
        self.expansion.collapse_all();
    }

    /// Opens every ancestor of `id` so the node becomes visible.
    ///
    /// The identity scope is the first selected owner, or the first owner when
    /// none is selected. Returns `false` for unknown ids.
    pub fn reveal(&mut self, level: Level, id: &str) -> bool {
        if !self.index.contains(level, id) {
            return false;
        }

        let mut chain: Vec<(Level, NodeId)> = Vec::new();
        let mut current_level = level;
        let mut current = id.to_string();
        while let (Some(parent_level), Some(parent)) = (
            current_level.parent(),
            self.index.parent_of(current_level, &current),
        ) {
            let parent = parent.to_string();
            chain.push((parent_level, parent.clone()));
            current_level = parent_level;
            current = parent;
        }

        if current_level != Level::Identity {
            let Some(identity) = self.preferred_owner(current_level, &current) else {
                return false;
            };
            chain.push((Level::Identity, identity));
        }

        let mut scope: Option<NodeId> = None;
        for (chain_level, chain_id) in chain.into_iter().rev() {
            self.expansion
                .expand_only(chain_level, scope.as_deref(), &chain_id);
            scope = Some(chain_id);
        }
        debug!("event=reveal module=picker status=ok level={level}");
        true
    }

    /// Selected-descendant count for badge display.
    pub fn count(&mut self, level: Level, id: &str) -> Option<usize> {
        self.counter
            .count(&*self.index, self.selection.state(), level, id)
    }

    /// Identities to render under `view`, in catalog order.
    pub fn visible_identities(&self, view: Option<&RestrictedView>) -> Vec<&TaxonomyNode> {
        self.catalog
            .identities()
            .iter()
            .filter(|identity| view.map_or(true, |view| view.allows(&identity.name)))
            .collect()
    }

    /// Applies the on-mount behavior of a restricted view.
    ///
    /// When the filter resolves to exactly one selectable identity, that
    /// identity is expanded and, with `auto_select`, selected. Returns the
    /// resolved identity id.
    pub fn apply_restricted_view(&mut self, view: &RestrictedView) -> Option<NodeId> {
        if view.shown.is_empty() {
            return None;
        }
        let matches: Vec<NodeId> = self
            .visible_identities(Some(view))
            .into_iter()
            .filter_map(|identity| identity.selectable_id().map(str::to_string))
            .collect();
        let [identity] = matches.as_slice() else {
            debug!(
                "event=restricted_view module=picker status=skipped matches={}",
                matches.len()
            );
            return None;
        };
        let identity = identity.clone();

        self.expansion.expand_only(Level::Identity, None, &identity);
        if view.auto_select && !self.selection.is_selected(Level::Identity, &identity) {
            self.selection.toggle_identity(&identity);
        }
        Some(identity)
    }

    fn preferred_owner(&self, level: Level, id: &str) -> Option<NodeId> {
        let owners = self.index.owner_identities(level, id)?;
        owners
            .iter()
            .find(|owner| self.selection.is_selected(Level::Identity, owner))
            .or_else(|| owners.iter().next())
            .cloned()
    }

    fn collapse_removed(&mut self, before: &SelectionState) {
        if !self.config.collapse_on_deselect {
            return;
        }
        let after = self.selection.state().clone();
        for level in Level::ALL {
            for id in before.ids(level).difference(after.ids(level)) {
                self.expansion.collapse_node(level, id);
            }
        }
    }
}
