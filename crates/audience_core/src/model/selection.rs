//! Selection value types.
//!
//! # Responsibility
//! - Hold the four per-level sets of selected node ids.
//! - Provide the flat payload used to hydrate and emit a selection.
//!
//! # Invariants
//! - `SelectionState` is a copy-on-write value: clones share set storage and
//!   equality is structural.
//! - Only `SelectionStore` mutates a `SelectionState`, so every state a caller
//!   can observe satisfies the parent-closure invariant.

use crate::model::catalog::NodeId;
use crate::model::level::Level;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Immutable snapshot of the four selected-id sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    identity_ids: Arc<BTreeSet<NodeId>>,
    category_ids: Arc<BTreeSet<NodeId>>,
    subcategory_ids: Arc<BTreeSet<NodeId>>,
    subsub_ids: Arc<BTreeSet<NodeId>>,
}

impl SelectionState {
    /// Selected ids at one level.
    pub fn ids(&self, level: Level) -> &BTreeSet<NodeId> {
        match level {
            Level::Identity => &self.identity_ids,
            Level::Category => &self.category_ids,
            Level::Subcategory => &self.subcategory_ids,
            Level::Subsub => &self.subsub_ids,
        }
    }

    pub fn identity_ids(&self) -> &BTreeSet<NodeId> {
        &self.identity_ids
    }

    pub fn category_ids(&self) -> &BTreeSet<NodeId> {
        &self.category_ids
    }

    pub fn subcategory_ids(&self) -> &BTreeSet<NodeId> {
        &self.subcategory_ids
    }

    pub fn subsub_ids(&self) -> &BTreeSet<NodeId> {
        &self.subsub_ids
    }

    pub fn contains(&self, level: Level, id: &str) -> bool {
        self.ids(level).contains(id)
    }

    /// Total number of selected ids across all levels.
    pub fn len(&self) -> usize {
        Level::ALL.iter().map(|level| self.ids(*level).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        Level::ALL.iter().all(|level| self.ids(*level).is_empty())
    }

    /// Whether both values still share all four set allocations.
    ///
    /// `true` implies equality in O(1). `false` only means the sets were
    /// copied at some point since the values diverged.
    pub fn shares_storage_with(&self, other: &SelectionState) -> bool {
        Arc::ptr_eq(&self.identity_ids, &other.identity_ids)
            && Arc::ptr_eq(&self.category_ids, &other.category_ids)
            && Arc::ptr_eq(&self.subcategory_ids, &other.subcategory_ids)
            && Arc::ptr_eq(&self.subsub_ids, &other.subsub_ids)
    }

    /// Structural hash of the four sets, used as a memoization key.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Flattens this state into the host persistence payload.
    pub fn to_saved(&self) -> SavedSelection {
        SavedSelection {
            identity_ids: self.identity_ids.iter().cloned().collect(),
            category_ids: self.category_ids.iter().cloned().collect(),
            subcategory_ids: self.subcategory_ids.iter().cloned().collect(),
            subsub_ids: self.subsub_ids.iter().cloned().collect(),
        }
    }

    /// Copy-on-write access for the selection store.
    pub(crate) fn ids_mut(&mut self, level: Level) -> &mut BTreeSet<NodeId> {
        let slot = match level {
            Level::Identity => &mut self.identity_ids,
            Level::Category => &mut self.category_ids,
            Level::Subcategory => &mut self.subcategory_ids,
            Level::Subsub => &mut self.subsub_ids,
        };
        Arc::make_mut(slot)
    }
}

/// Flat selection payload exchanged with the host.
///
/// Field names match the audience fields stored on job/service/event records.
/// Order is irrelevant and duplicates are tolerated on input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SavedSelection {
    pub identity_ids: Vec<NodeId>,
    pub category_ids: Vec<NodeId>,
    pub subcategory_ids: Vec<NodeId>,
    pub subsub_ids: Vec<NodeId>,
}

impl SavedSelection {
    /// Ids stored for one level.
    pub fn ids(&self, level: Level) -> &[NodeId] {
        match level {
            Level::Identity => &self.identity_ids,
            Level::Category => &self.category_ids,
            Level::Subcategory => &self.subcategory_ids,
            Level::Subsub => &self.subsub_ids,
        }
    }

    pub fn is_empty(&self) -> bool {
        Level::ALL.iter().all(|level| self.ids(*level).is_empty())
    }
}
