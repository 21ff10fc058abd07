//! Core audience taxonomy selection engine.
//! This crate is the single source of truth for selection invariants.

pub mod config;
pub mod index;
pub mod logging;
pub mod model;
pub mod service;

pub use config::{CatalogMode, ConfigError, PickerConfig};
pub use index::ownership::{CatalogIssue, OwnershipIndex, TaxonomyLookup};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::catalog::{Catalog, CatalogError, NodeId, TaxonomyNode};
pub use model::level::{parse_level, Level, LevelParseError};
pub use model::selection::{SavedSelection, SelectionState};
pub use service::expansion_service::{ExpandOutcome, ExpansionState, ExpansionStore};
pub use service::picker::{AudiencePicker, RestrictedView};
pub use service::rollup::{count, RollupCounter};
pub use service::selection_service::{SelectionPolicy, SelectionStore, ToggleOutcome};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
