//! Selection engine services.
//!
//! # Responsibility
//! - Mutate selection and expansion state through total, invariant-keeping
//!   operations.
//! - Derive roll-up counts for renderers.
//! - Keep host/FFI layers decoupled from index details.

pub mod expansion_service;
pub mod picker;
pub mod rollup;
pub mod selection_service;
