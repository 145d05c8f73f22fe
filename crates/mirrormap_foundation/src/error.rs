//! Error types for the linkage and mirroring protocol.
//!
//! Uses `thiserror` for ergonomic error definition.

use std::fmt;

use thiserror::Error;

use crate::id::MapId;

/// The main error type for Mirrormap operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    /// Creates a no-partner error.
    #[must_use]
    pub fn no_partner(id: MapId) -> Self {
        Self::new(ErrorKind::NoPartner(id))
    }

    /// Creates a self-link error.
    #[must_use]
    pub fn self_link(id: MapId) -> Self {
        Self::new(ErrorKind::SelfLink(id))
    }

    /// Creates an incompatible-partner error.
    #[must_use]
    pub fn incompatible(id: MapId) -> Self {
        Self::new(ErrorKind::Incompatible(id))
    }

    /// Creates a key-missing error from a debug rendering of the key.
    #[must_use]
    pub fn key_missing<K: fmt::Debug>(key: &K) -> Self {
        Self::new(ErrorKind::KeyMissing {
            key: format!("{key:?}"),
        })
    }

    /// Creates an empty-map error.
    #[must_use]
    pub fn empty_map(id: MapId) -> Self {
        Self::new(ErrorKind::EmptyMap(id))
    }

    /// Creates a too-many-arguments error.
    #[must_use]
    pub fn too_many_arguments(actual: usize) -> Self {
        Self::new(ErrorKind::TooManyArguments { actual })
    }

    /// Creates a map not found error.
    #[must_use]
    pub fn map_not_found(id: MapId) -> Self {
        Self::new(ErrorKind::MapNotFound(id))
    }

    /// Creates a stale map handle error.
    #[must_use]
    pub fn stale_map(id: MapId) -> Self {
        Self::new(ErrorKind::StaleMap(id))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A mutating operation was attempted on an unpartnered map.
    #[error("{0} has no partner")]
    NoPartner(MapId),

    /// A non-empty map was offered as its own partner.
    #[error("cannot link non-empty {0} to itself")]
    SelfLink(MapId),

    /// The other side of a link does not name a live, linkable map.
    #[error("{0:?} is not a linkable map in this registry")]
    Incompatible(MapId),

    /// `delete` or `pop` addressed an absent key.
    #[error("key missing: {key}")]
    KeyMissing {
        /// Debug rendering of the missing key.
        key: String,
    },

    /// `pop_arbitrary` was called on an empty map.
    #[error("{0} is empty")]
    EmptyMap(MapId),

    /// `update` was given more than one bulk source.
    #[error("update expected at most 1 bulk source, got {actual}")]
    TooManyArguments {
        /// Number of bulk sources supplied.
        actual: usize,
    },

    /// Map was not found in the registry.
    #[error("map not found: {0:?}")]
    MapNotFound(MapId),

    /// Map handle is stale (generation mismatch).
    #[error("stale map handle: {0:?}")]
    StaleMap(MapId),
}

/// Convenient result alias for Mirrormap operations.
pub type Result<T> = std::result::Result<T, Error>;
