//! Picker configuration.
//!
//! # Responsibility
//! - Describe how one embedding screen wants the engine to behave.
//! - Decode host-supplied JSON configuration with strict field checking.
//!
//! # Invariants
//! - Defaults match the shared-node (DAG-safe) policy.
//! - Unknown configuration keys are rejected instead of silently ignored.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// How the catalog is expected to share nodes between identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogMode {
    /// Category/Subcategory/Sub-subcategory ids may appear under several identities.
    #[default]
    Shared,
    /// Every node has exactly one owning identity.
    Exclusive,
}

/// Engine behavior flags for one picker instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PickerConfig {
    /// Expected catalog sharing mode. Exclusive mode reports shared nodes as issues.
    pub mode: CatalogMode,
    /// Select the owning identity when a lower node is selected.
    ///
    /// Applied only when the node has exactly one owner.
    pub auto_select_owner: bool,
    /// Collapse nodes that leave the selection.
    pub collapse_on_deselect: bool,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            mode: CatalogMode::Shared,
            auto_select_owner: false,
            collapse_on_deselect: true,
        }
    }
}

impl PickerConfig {
    /// Policy matching the single-owner tree screens.
    pub fn exclusive() -> Self {
        Self {
            mode: CatalogMode::Exclusive,
            auto_select_owner: true,
            collapse_on_deselect: true,
        }
    }

    /// Decodes configuration JSON. Blank input yields defaults.
    pub fn from_json_str(value: &str) -> Result<Self, ConfigError> {
        if value.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(value).map_err(ConfigError::Json)
    }
}

/// Picker configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid picker config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
        }
    }
}
