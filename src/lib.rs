//! Mirrormap - Linked bijective maps
//!
//! This crate re-exports all layers of the Mirrormap system for convenient
//! access. For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 1: mirrormap_storage    — PairMap container, MapStore registry,
//!                                 linkage protocol, mirrored mutation
//! Layer 0: mirrormap_foundation — Map handles (MapId), error types
//! ```

pub use mirrormap_foundation as foundation;
pub use mirrormap_storage as storage;
