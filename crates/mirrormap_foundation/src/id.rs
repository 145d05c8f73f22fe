//! Map handles with generational indices.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Handle to a map slot, with a generational index for stale handle detection.
///
/// The generation counter increments when a slot index is reused after the
/// map it named was destroyed. A handle is only valid while its generation
/// matches the slot's current generation, so handles to destroyed maps are
/// detected rather than resolving to an unrelated map.
///
/// # Layout
/// - `index`: 64-bit index into slot storage
/// - `generation`: 32-bit generation counter
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MapId {
    /// Index into slot storage.
    pub index: u64,
    /// Generation counter for stale handle detection.
    pub generation: u32,
}

impl MapId {
    /// Creates a new map handle with the given index and generation.
    #[must_use]
    pub const fn new(index: u64, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns a sentinel value representing "no map".
    ///
    /// This uses `u64::MAX` as the index, which should never be allocated.
    #[must_use]
    pub const fn null() -> Self {
        Self {
            index: u64::MAX,
            generation: 0,
        }
    }

    /// Returns true if this is the null sentinel value.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.index == u64::MAX
    }
}

impl fmt::Debug for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "MapId(null)")
        } else {
            write!(f, "MapId({}v{})", self.index, self.generation)
        }
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Map(null)")
        } else {
            write!(f, "Map({})", self.index)
        }
    }
}
