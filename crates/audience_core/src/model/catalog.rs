//! Taxonomy catalog model.
//!
//! # Responsibility
//! - Define the read-only Identity → Category → Subcategory → Sub-subcategory
//!   hierarchy handed to the engine by the host.
//! - Decode the catalog JSON returned by the identities-with-categories endpoint.
//!
//! # Invariants
//! - A catalog is immutable once loaded; engines share it through `Arc`.
//! - A node without a usable id is display-only and never selectable.
//! - Loading fails only on I/O or JSON shape errors, never on data-integrity
//!   problems (those are reported by the ownership index).

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Stable taxonomy node identifier as issued by the catalog backend.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NodeId = String;

/// One node of the taxonomy at any level.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaxonomyNode {
    /// Backend id. `None` (or blank) marks a broken, display-only entry.
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    /// Display label.
    #[serde(default)]
    pub name: String,
    /// Next level down, in display order. Always empty for sub-subcategories.
    #[serde(
        default,
        alias = "categories",
        alias = "subcategories",
        alias = "subsubcategories",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<TaxonomyNode>,
}

impl TaxonomyNode {
    /// Creates a selectable node.
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Creates a node that has no id and can only be displayed.
    pub fn display_only(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Appends one child node.
    #[must_use]
    pub fn child(mut self, node: TaxonomyNode) -> Self {
        self.children.push(node);
        self
    }

    /// Returns the usable id, treating whitespace-only ids as missing.
    pub fn selectable_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|value| !value.trim().is_empty())
    }

    /// Whether this node may take part in selection.
    pub fn is_selectable(&self) -> bool {
        self.selectable_id().is_some()
    }
}

/// Ordered sequence of identity roots.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    identities: Vec<TaxonomyNode>,
}

impl Catalog {
    pub fn new(identities: Vec<TaxonomyNode>) -> Self {
        Self { identities }
    }

    /// Identity roots in display order.
    pub fn identities(&self) -> &[TaxonomyNode] {
        &self.identities
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Finds the first selectable identity whose display name matches `name`.
    ///
    /// Matching ignores surrounding whitespace and ASCII case, the way host
    /// screens pass identity names in restricted views.
    pub fn identity_by_name(&self, name: &str) -> Option<&TaxonomyNode> {
        let wanted = name.trim();
        self.identities.iter().find(|identity| {
            identity.is_selectable() && identity.name.trim().eq_ignore_ascii_case(wanted)
        })
    }

    /// Counts nodes per level, including display-only entries.
    pub fn node_counts(&self) -> [usize; 4] {
        let mut counts = [0usize; 4];
        fn walk(nodes: &[TaxonomyNode], depth: usize, counts: &mut [usize; 4]) {
            if depth >= counts.len() {
                return;
            }
            counts[depth] += nodes.len();
            for node in nodes {
                walk(&node.children, depth + 1, counts);
            }
        }
        walk(&self.identities, 0, &mut counts);
        counts
    }

    /// Decodes a catalog from a JSON string.
    ///
    /// `children`, `categories`, `subcategories` and `subsubcategories` name
    /// the same field, as do `id` and `_id`. A record carrying two names for
    /// one field is rejected with a duplicate-field `CatalogError::Json`.
    pub fn from_json_str(value: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(value).map_err(CatalogError::Json)
    }

    /// Decodes a catalog from JSON bytes.
    pub fn from_json_slice(value: &[u8]) -> Result<Self, CatalogError> {
        serde_json::from_slice(value).map_err(CatalogError::Json)
    }

    /// Reads and decodes a catalog JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_slice(&bytes)
    }
}

/// Errors from catalog loading.
#[derive(Debug)]
pub enum CatalogError {
    /// Catalog file could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Payload is not valid catalog JSON.
    Json(serde_json::Error),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read catalog `{}`: {source}", path.display())
            }
            Self::Json(err) => write!(f, "invalid catalog json: {err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
