//! Derived, read-only indexes over a loaded catalog.
//!
//! # Responsibility
//! - Answer hierarchy and ownership queries in O(log n) for the stores.
//! - Collect catalog data-integrity findings in one place.
//!
//! # Invariants
//! - An index is rebuilt only when the catalog it was built from changes.

pub mod ownership;
