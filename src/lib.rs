//! Purpose: Typed client library for the SharpSpring JSON-RPC API.
//! Exports: `core` (attributes, envelopes, casting, errors), `records`, `api`.
//! Role: Backs the `sharpspring` CLI and is usable on its own.
//! Invariants: Record attributes are two-tier: declared schema plus open custom map.
//! Invariants: Failures are returned as `core::error::Error`, never panicked.
pub mod api;
pub mod core;
pub mod records;
