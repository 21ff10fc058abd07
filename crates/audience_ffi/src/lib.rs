//! Host bridge crate for the audience picker engine.

pub mod api;
