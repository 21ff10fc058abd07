//! Audience taxonomy domain model.
//!
//! # Responsibility
//! - Define the catalog hierarchy handed in by the host.
//! - Define the selection value types read by renderers and emitted on submit.
//!
//! # Invariants
//! - Catalog data is read-only for the lifetime of one picker.
//! - Selection values are structural, copy-on-write snapshots.

pub mod catalog;
pub mod level;
pub mod selection;
