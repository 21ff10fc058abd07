//! Ownership index over one catalog.
//!
//! # Responsibility
//! - Map every Category/Subcategory/Sub-subcategory id to the identities it
//!   is reachable from.
//! - Record each node's parent and ordered children in the same traversal.
//! - Report data-integrity problems without failing the build.
//!
//! # Invariants
//! - Built once per catalog in O(total nodes); read-only afterwards.
//! - Every indexed non-identity node has exactly one parent id. Later edges
//!   that disagree are dropped and reported as `ConflictingParent`.
//! - Children are merged across every listing of a shared node, and a
//!   subcategory or sub-subcategory is owned by every identity its parent is
//!   owned by. Counting and ownership pruning therefore walk the same graph.
//! - A node's owners equal its parent's owners, so pruning by ownership never
//!   leaves a child selected under a pruned parent.
//! - Subtrees below a display-only node are not indexed.

use crate::config::CatalogMode;
use crate::model::catalog::{Catalog, NodeId, TaxonomyNode};
use crate::model::level::Level;
use log::{info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Read-only hierarchy queries used by the selection engine.
pub trait TaxonomyLookup {
    /// Whether `id` is a selectable node at `level`.
    fn contains(&self, level: Level, id: &str) -> bool;
    /// Parent id one level up. Identities and categories report `None`.
    fn parent_of(&self, level: Level, id: &str) -> Option<&str>;
    /// Child ids one level down in display order.
    fn children_of(&self, level: Level, id: &str) -> &[NodeId];
    /// Identities from which `id` is reachable.
    fn owner_identities(&self, level: Level, id: &str) -> Option<&BTreeSet<NodeId>>;
}

impl<T: TaxonomyLookup + ?Sized> TaxonomyLookup for &T {
    fn contains(&self, level: Level, id: &str) -> bool {
        (**self).contains(level, id)
    }

    fn parent_of(&self, level: Level, id: &str) -> Option<&str> {
        (**self).parent_of(level, id)
    }

    fn children_of(&self, level: Level, id: &str) -> &[NodeId] {
        (**self).children_of(level, id)
    }

    fn owner_identities(&self, level: Level, id: &str) -> Option<&BTreeSet<NodeId>> {
        (**self).owner_identities(level, id)
    }
}

impl<T: TaxonomyLookup + ?Sized> TaxonomyLookup for Arc<T> {
    fn contains(&self, level: Level, id: &str) -> bool {
        (**self).contains(level, id)
    }

    fn parent_of(&self, level: Level, id: &str) -> Option<&str> {
        (**self).parent_of(level, id)
    }

    fn children_of(&self, level: Level, id: &str) -> &[NodeId] {
        (**self).children_of(level, id)
    }

    fn owner_identities(&self, level: Level, id: &str) -> Option<&BTreeSet<NodeId>> {
        (**self).owner_identities(level, id)
    }
}

/// Data-integrity finding raised while indexing a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogIssue {
    /// Node has no usable id; it and its subtree are display-only.
    MissingId { level: Level, name: String },
    /// The same id is listed under two different parents.
    ConflictingParent {
        level: Level,
        id: NodeId,
        kept_parent: NodeId,
        ignored_parent: NodeId,
    },
    /// A node is shared between identities although the catalog is declared exclusive.
    SharedInExclusiveMode {
        level: Level,
        id: NodeId,
        owners: Vec<NodeId>,
    },
    /// The same identity id appears more than once; its children are merged.
    DuplicateIdentity { id: NodeId },
}

impl Display for CatalogIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingId { level, name } => {
                write!(f, "{level} `{name}` has no id and is display-only")
            }
            Self::ConflictingParent {
                level,
                id,
                kept_parent,
                ignored_parent,
            } => write!(
                f,
                "{level} {id} listed under {ignored_parent} but already owned by {kept_parent}"
            ),
            Self::SharedInExclusiveMode { level, id, owners } => write!(
                f,
                "{level} {id} is shared by identities [{}] in exclusive mode",
                owners.join(", ")
            ),
            Self::DuplicateIdentity { id } => write!(f, "identity {id} is listed more than once"),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct IndexEntry {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    owners: BTreeSet<NodeId>,
}

/// Derived parent/children/ownership maps for one catalog.
#[derive(Debug, Clone, Default)]
pub struct OwnershipIndex {
    levels: [BTreeMap<NodeId, IndexEntry>; 4],
    issues: Vec<CatalogIssue>,
}

impl OwnershipIndex {
    /// Builds the index with a single traversal of `catalog`.
    ///
    /// Issues are logged once at `warn` level and kept for `issues()`.
    pub fn build(catalog: &Catalog, mode: CatalogMode) -> Self {
        let mut index = Self::default();

        for identity in catalog.identities() {
            let Some(identity_id) = identity.selectable_id() else {
                index.report(CatalogIssue::MissingId {
                    level: Level::Identity,
                    name: identity.name.clone(),
                });
                continue;
            };

            let identities = &mut index.levels[Level::Identity.depth()];
            if identities.contains_key(identity_id) {
                index.report(CatalogIssue::DuplicateIdentity {
                    id: identity_id.to_string(),
                });
            } else {
                identities.insert(
                    identity_id.to_string(),
                    IndexEntry {
                        parent: None,
                        children: Vec::new(),
                        owners: BTreeSet::from([identity_id.to_string()]),
                    },
                );
            }

            index.visit(&identity.children, Level::Category, identity_id, identity_id);
        }
        index.propagate_owners();

        if mode == CatalogMode::Exclusive {
            index.report_shared_nodes();
        }

        for issue in &index.issues {
            warn!("event=catalog_issue module=index status=warn detail={issue}");
        }
        info!(
            "event=index_built module=index status=ok identities={} categories={} subcategories={} subsubs={} issues={}",
            index.len(Level::Identity),
            index.len(Level::Category),
            index.len(Level::Subcategory),
            index.len(Level::Subsub),
            index.issues.len()
        );

        index
    }

    /// Number of indexed (selectable) ids at `level`.
    pub fn len(&self, level: Level) -> usize {
        self.levels[level.depth()].len()
    }

    /// Indexed ids at `level` in ascending id order.
    pub fn ids(&self, level: Level) -> impl Iterator<Item = &NodeId> + '_ {
        self.levels[level.depth()].keys()
    }

    /// Data-integrity findings collected during the build.
    pub fn issues(&self) -> &[CatalogIssue] {
        &self.issues
    }

    fn visit(&mut self, nodes: &[TaxonomyNode], level: Level, parent_id: &str, owner: &str) {
        for node in nodes {
            let Some(id) = node.selectable_id() else {
                self.report(CatalogIssue::MissingId {
                    level,
                    name: node.name.clone(),
                });
                continue;
            };

            let expected_parent = (level != Level::Category).then(|| parent_id.to_string());
            let entries = &mut self.levels[level.depth()];
            let entry = entries.entry(id.to_string()).or_insert_with(|| IndexEntry {
                parent: expected_parent.clone(),
                ..IndexEntry::default()
            });
            if entry.parent != expected_parent {
                let issue = CatalogIssue::ConflictingParent {
                    level,
                    id: id.to_string(),
                    kept_parent: entry.parent.clone().unwrap_or_default(),
                    ignored_parent: parent_id.to_string(),
                };
                self.report(issue);
                continue;
            }
            entry.owners.insert(owner.to_string());

            if let Some(parent_level) = level.parent() {
                if let Some(parent) = self.levels[parent_level.depth()].get_mut(parent_id) {
                    if !parent.children.iter().any(|child| child == id) {
                        parent.children.push(id.to_string());
                    }
                }
            }

            if let Some(child_level) = level.child() {
                self.visit(&node.children, child_level, id, owner);
            }
        }
    }

    /// Extends owners down the merged edges, so a child listed under only
    /// one copy of a shared category is still owned by every identity that
    /// reaches that category.
    fn propagate_owners(&mut self) {
        for level in [Level::Subcategory, Level::Subsub] {
            let (upper, lower) = self.levels.split_at_mut(level.depth());
            let parents = &upper[level.depth() - 1];
            for entry in lower[0].values_mut() {
                let Some(parent) = entry.parent.as_deref().and_then(|id| parents.get(id)) else {
                    continue;
                };
                entry.owners.extend(parent.owners.iter().cloned());
            }
        }
    }

    fn report_shared_nodes(&mut self) {
        let mut shared = Vec::new();
        for level in Level::OWNED {
            for (id, entry) in &self.levels[level.depth()] {
                if entry.owners.len() > 1 {
                    shared.push(CatalogIssue::SharedInExclusiveMode {
                        level,
                        id: id.clone(),
                        owners: entry.owners.iter().cloned().collect(),
                    });
                }
            }
        }
        for issue in shared {
            self.report(issue);
        }
    }

    fn report(&mut self, issue: CatalogIssue) {
        if !self.issues.contains(&issue) {
            self.issues.push(issue);
        }
    }
}

impl TaxonomyLookup for OwnershipIndex {
    fn contains(&self, level: Level, id: &str) -> bool {
        self.levels[level.depth()].contains_key(id)
    }

    fn parent_of(&self, level: Level, id: &str) -> Option<&str> {
        self.levels[level.depth()]
            .get(id)
            .and_then(|entry| entry.parent.as_deref())
    }

    fn children_of(&self, level: Level, id: &str) -> &[NodeId] {
        self.levels[level.depth()]
            .get(id)
            .map(|entry| entry.children.as_slice())
            .unwrap_or(&[])
    }

    fn owner_identities(&self, level: Level, id: &str) -> Option<&BTreeSet<NodeId>> {
        self.levels[level.depth()].get(id).map(|entry| &entry.owners)
    }
}
