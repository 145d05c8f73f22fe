//! Batched insertion requests for [`MapStore::update`](crate::MapStore::update).

use mirrormap_foundation::{Error, Result};

/// A batched insertion request: bulk sources plus trailing explicit pairs.
///
/// `update` accepts at most one bulk source; the batch carries however many
/// were supplied so the store can report the violation. Bulk-source entries
/// apply before the trailing pairs, each in the order given.
#[derive(Clone, Debug, Default)]
pub struct UpdateBatch<K, V> {
    sources: Vec<Vec<(K, V)>>,
    pairs: Vec<(K, V)>,
}

impl<K, V> UpdateBatch<K, V> {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            pairs: Vec::new(),
        }
    }

    /// Adds a bulk source of pairs, applied before any trailing pairs.
    #[must_use]
    pub fn with_source<I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.sources.push(pairs.into_iter().collect());
        self
    }

    /// Adds a trailing pair, applied after every bulk-source entry.
    #[must_use]
    pub fn with_pair(mut self, key: K, value: V) -> Self {
        self.pairs.push((key, value));
        self
    }

    /// Flattens the batch into its application order.
    pub(crate) fn into_pairs(self) -> Result<Vec<(K, V)>> {
        if self.sources.len() > 1 {
            return Err(Error::too_many_arguments(self.sources.len()));
        }
        let mut out: Vec<(K, V)> = self.sources.into_iter().flatten().collect();
        out.extend(self.pairs);
        Ok(out)
    }
}
