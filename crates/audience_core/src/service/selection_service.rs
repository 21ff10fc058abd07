//! Selection store use-case service.
//!
//! # Responsibility
//! - Apply the four toggle operations and `clear_all` to a `SelectionState`.
//! - Hydrate a store from a previously saved selection.
//!
//! # Invariants
//! - After every public call, each selected sub-subcategory has its parent
//!   subcategory selected and each selected subcategory has its parent
//!   category selected.
//! - Selecting a node closes upward; deselecting a node cascades downward.
//! - Deselecting an identity prunes every lower node no selected identity owns.
//! - Unknown ids are ignored; no operation fails.

use crate::index::ownership::TaxonomyLookup;
use crate::model::catalog::NodeId;
use crate::model::level::Level;
use crate::model::selection::{SavedSelection, SelectionState};
use log::{debug, warn};
use std::fmt::{Display, Formatter};

/// Result of one toggle call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Node was added to the selection.
    Selected,
    /// Node was removed from the selection.
    Deselected,
    /// Id is unknown to the catalog; state is unchanged.
    Ignored,
}

impl ToggleOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Selected => "selected",
            Self::Deselected => "deselected",
            Self::Ignored => "ignored",
        }
    }

    /// Whether the selection changed.
    pub fn changed(self) -> bool {
        self != Self::Ignored
    }
}

impl Display for ToggleOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host-level selection behavior flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionPolicy {
    /// Also select the owning identity when a lower node is selected and
    /// exactly one identity owns it.
    pub auto_select_owner: bool,
}

/// Mutable selection over one catalog lookup.
#[derive(Debug, Clone)]
pub struct SelectionStore<L: TaxonomyLookup> {
    lookup: L,
    policy: SelectionPolicy,
    state: SelectionState,
}

impl<L: TaxonomyLookup> SelectionStore<L> {
    /// Creates an empty store.
    pub fn new(lookup: L, policy: SelectionPolicy) -> Self {
        Self {
            lookup,
            policy,
            state: SelectionState::default(),
        }
    }

    /// Creates a store from a persisted selection.
    ///
    /// Ids unknown to `lookup` are dropped and the upward closure is applied,
    /// so the first observable state already satisfies the invariant.
    pub fn hydrate(lookup: L, policy: SelectionPolicy, saved: &SavedSelection) -> Self {
        let state = normalize(&lookup, saved);
        Self {
            lookup,
            policy,
            state,
        }
    }

    /// Replaces the lookup after a catalog change and re-normalizes the selection.
    pub fn rebind(&mut self, lookup: L) {
        let saved = self.state.to_saved();
        self.lookup = lookup;
        self.state = normalize(&self.lookup, &saved);
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// Current selection. Cloning the returned value is cheap.
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn is_selected(&self, level: Level, id: &str) -> bool {
        self.state.contains(level, id)
    }

    /// Dispatches to the toggle for `level`.
    pub fn toggle(&mut self, level: Level, id: &str) -> ToggleOutcome {
        match level {
            Level::Identity => self.toggle_identity(id),
            Level::Category => self.toggle_category(id),
            Level::Subcategory => self.toggle_subcategory(id),
            Level::Subsub => self.toggle_subsub(id),
        }
    }

    /// Toggles one identity.
    ///
    /// Deselecting runs an ownership pruning pass over every lower level.
    pub fn toggle_identity(&mut self, id: &str) -> ToggleOutcome {
        if !self.lookup.contains(Level::Identity, id) {
            return self.ignored(Level::Identity);
        }

        if self.state.contains(Level::Identity, id) {
            self.state.ids_mut(Level::Identity).remove(id);
            let pruned = self.prune_unowned();
            debug!("event=toggle module=selection level=identity outcome=deselected pruned={pruned}");
            return ToggleOutcome::Deselected;
        }

        self.state.ids_mut(Level::Identity).insert(id.to_string());
        debug!("event=toggle module=selection level=identity outcome=selected pruned=0");
        ToggleOutcome::Selected
    }

    /// Toggles one category.
    ///
    /// Deselecting also removes its subcategories and their sub-subcategories.
    pub fn toggle_category(&mut self, id: &str) -> ToggleOutcome {
        if !self.lookup.contains(Level::Category, id) {
            return self.ignored(Level::Category);
        }

        if self.state.contains(Level::Category, id) {
            self.state.ids_mut(Level::Category).remove(id);
            for subcategory in self.lookup.children_of(Level::Category, id) {
                remove_with_children(&self.lookup, &mut self.state, Level::Subcategory, subcategory);
            }
            return self.changed(Level::Category, ToggleOutcome::Deselected);
        }

        self.state.ids_mut(Level::Category).insert(id.to_string());
        self.select_owner(Level::Category, id);
        self.changed(Level::Category, ToggleOutcome::Selected)
    }

    /// Toggles one subcategory.
    ///
    /// Selecting also selects its parent category. Deselecting removes its
    /// sub-subcategories and leaves the parent category selected.
    pub fn toggle_subcategory(&mut self, id: &str) -> ToggleOutcome {
        if self.lookup.parent_of(Level::Subcategory, id).is_none() {
            return self.ignored(Level::Subcategory);
        }

        if self.state.contains(Level::Subcategory, id) {
            remove_with_children(&self.lookup, &mut self.state, Level::Subcategory, id);
            return self.changed(Level::Subcategory, ToggleOutcome::Deselected);
        }

        self.state.ids_mut(Level::Subcategory).insert(id.to_string());
        close_upward(&self.lookup, &mut self.state, Level::Subcategory, id);
        self.select_owner(Level::Subcategory, id);
        self.changed(Level::Subcategory, ToggleOutcome::Selected)
    }

    /// Toggles one sub-subcategory.
    ///
    /// Selecting also selects its subcategory and category. Deselecting
    /// removes only this id.
    pub fn toggle_subsub(&mut self, id: &str) -> ToggleOutcome {
        if self.lookup.parent_of(Level::Subsub, id).is_none() {
            return self.ignored(Level::Subsub);
        }

        if self.state.contains(Level::Subsub, id) {
            self.state.ids_mut(Level::Subsub).remove(id);
            return self.changed(Level::Subsub, ToggleOutcome::Deselected);
        }

        self.state.ids_mut(Level::Subsub).insert(id.to_string());
        close_upward(&self.lookup, &mut self.state, Level::Subsub, id);
        self.select_owner(Level::Subsub, id);
        self.changed(Level::Subsub, ToggleOutcome::Selected)
    }

    /// Empties all four sets.
    pub fn clear_all(&mut self) {
        self.state = SelectionState::default();
        debug!("event=clear_all module=selection status=ok");
    }

    fn select_owner(&mut self, level: Level, id: &str) {
        if !self.policy.auto_select_owner {
            return;
        }
        let Some(owners) = self.lookup.owner_identities(level, id) else {
            return;
        };
        if owners.len() != 1 {
            debug!(
                "event=auto_select_owner module=selection status=skipped level={level} owners={}",
                owners.len()
            );
            return;
        }
        if let Some(owner) = owners.iter().next() {
            if !self.state.contains(Level::Identity, owner) {
                self.state.ids_mut(Level::Identity).insert(owner.clone());
            }
        }
    }

    fn prune_unowned(&mut self) -> usize {
        let identities = self.state.identity_ids();
        let mut doomed: Vec<(Level, NodeId)> = Vec::new();
        for level in Level::OWNED {
            for id in self.state.ids(level) {
                let owned = self
                    .lookup
                    .owner_identities(level, id)
                    .is_some_and(|owners| owners.iter().any(|owner| identities.contains(owner)));
                if !owned {
                    doomed.push((level, id.clone()));
                }
            }
        }

        for (level, id) in &doomed {
            self.state.ids_mut(*level).remove(id);
        }
        doomed.len()
    }

    fn ignored(&self, level: Level) -> ToggleOutcome {
        debug!("event=toggle module=selection level={level} outcome=ignored");
        ToggleOutcome::Ignored
    }

    fn changed(&self, level: Level, outcome: ToggleOutcome) -> ToggleOutcome {
        debug!(
            "event=toggle module=selection level={level} outcome={outcome} selected_total={}",
            self.state.len()
        );
        outcome
    }
}

fn close_upward<L: TaxonomyLookup>(lookup: &L, state: &mut SelectionState, level: Level, id: &str) {
    let mut current_level = level;
    let mut current = id;
    while let (Some(parent_level), Some(parent)) =
        (current_level.parent(), lookup.parent_of(current_level, current))
    {
        if !state.contains(parent_level, parent) {
            state.ids_mut(parent_level).insert(parent.to_string());
        }
        current_level = parent_level;
        current = parent;
    }
}

fn remove_with_children<L: TaxonomyLookup>(
    lookup: &L,
    state: &mut SelectionState,
    level: Level,
    id: &str,
) {
    if state.contains(level, id) {
        state.ids_mut(level).remove(id);
    }
    if let Some(child_level) = level.child() {
        for child in lookup.children_of(level, id) {
            remove_with_children(lookup, state, child_level, child);
        }
    }
}

fn normalize<L: TaxonomyLookup>(lookup: &L, saved: &SavedSelection) -> SelectionState {
    let mut state = SelectionState::default();
    let mut dropped = 0usize;

    for level in Level::ALL {
        for id in saved.ids(level) {
            let known = match level {
                Level::Identity | Level::Category => lookup.contains(level, id),
                Level::Subcategory | Level::Subsub => lookup.parent_of(level, id).is_some(),
            };
            if known {
                state.ids_mut(level).insert(id.clone());
            } else {
                dropped += 1;
            }
        }
    }

    for level in [Level::Subsub, Level::Subcategory] {
        let ids: Vec<NodeId> = state.ids(level).iter().cloned().collect();
        for id in &ids {
            close_upward(lookup, &mut state, level, id);
        }
    }

    if dropped > 0 {
        warn!("event=selection_hydrate module=selection status=warn dropped={dropped}");
    }
    state
}
