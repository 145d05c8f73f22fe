//! Map slot registry with the partnership and mirroring protocol.
//!
//! The `MapStore` owns every map slot and is the only mutation surface.
//! A write to either side of a linked pair touches both sides, so both live
//! behind one `&mut MapStore` and callers in a multi-threaded host serialize
//! access to the store as a whole.

// Allow u64 to usize casts - we target 64-bit systems
#![allow(clippy::cast_possible_truncation)]

use std::fmt;
use std::hash::Hash;

use mirrormap_foundation::{Error, MapId, Result};

use crate::batch::UpdateBatch;
use crate::bijection::reconcile;
use crate::pairmap::PairMap;

/// One registry slot: entry storage plus the reciprocal partner pointer.
#[derive(Clone, Debug)]
struct MapCell<T>
where
    T: Clone + Eq + Hash,
{
    entries: PairMap<T, T>,
    partner: Option<MapId>,
}

impl<T: Clone + Eq + Hash> MapCell<T> {
    fn new(entries: PairMap<T, T>) -> Self {
        Self {
            entries,
            partner: None,
        }
    }

    fn vacant() -> Self {
        Self::new(PairMap::new())
    }
}

/// Registry of linked-bijective-map slots.
///
/// Slots are addressed by [`MapId`] handles with generational validity:
/// destroying a slot invalidates every outstanding handle to it, and the
/// surviving partner of a destroyed map observes "no partner" rather than a
/// dangling reference. Keys and values are drawn from the same scalar domain
/// `T`, since a linked pair's values are its partner's keys.
///
/// Unpartnered maps accept reads but reject every mutating operation;
/// linking two maps reconciles their contents and keeps them exact inverses
/// of one another through every subsequent mutation.
#[derive(Clone, Debug)]
pub struct MapStore<T>
where
    T: Clone + Eq + Hash + fmt::Debug,
{
    /// Generation counter for each slot index.
    /// Even generations are free, odd generations are live.
    generations: Vec<u32>,
    /// Cell payloads, parallel to `generations`.
    cells: Vec<MapCell<T>>,
    /// Free list of indices available for reuse.
    free_list: Vec<u64>,
    /// Count of live maps.
    live_count: usize,
}

impl<T: Clone + Eq + Hash + fmt::Debug> Default for MapStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Eq + Hash + fmt::Debug> MapStore<T> {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            cells: Vec::new(),
            free_list: Vec::new(),
            live_count: 0,
        }
    }

    // =========================================================================
    // Slot lifecycle
    // =========================================================================

    /// Creates an empty map, returning its handle.
    pub fn create(&mut self) -> MapId {
        self.create_cell(PairMap::new())
    }

    /// Creates a map pre-populated from pairs.
    ///
    /// Duplicate keys follow last-write-wins, as in plain map construction.
    pub fn create_from<I>(&mut self, pairs: I) -> MapId
    where
        I: IntoIterator<Item = (T, T)>,
    {
        self.create_cell(pairs.into_iter().collect())
    }

    /// Creates an unpartnered copy of a map with the same entries.
    ///
    /// Partnership is a runtime relation, not a value; it is never copied.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is stale or was never allocated.
    pub fn duplicate(&mut self, id: MapId) -> Result<MapId> {
        self.validate(id)?;
        let entries = self.cells[id.index as usize].entries.clone();
        Ok(self.create_cell(entries))
    }

    fn create_cell(&mut self, entries: PairMap<T, T>) -> MapId {
        self.live_count += 1;

        if let Some(index) = self.free_list.pop() {
            // Reuse an index from the free list
            let idx = index as usize;
            // Increment generation (was even/free, now odd/live)
            self.generations[idx] += 1;
            self.cells[idx] = MapCell::new(entries);
            MapId::new(index, self.generations[idx])
        } else {
            // Allocate a new index
            let index = self.generations.len() as u64;
            // New slots start at generation 1 (odd = live)
            self.generations.push(1);
            self.cells.push(MapCell::new(entries));
            MapId::new(index, 1)
        }
    }

    /// Destroys a map.
    ///
    /// A surviving partner is left unpartnered; outstanding handles to the
    /// destroyed slot become stale.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is stale or was never allocated.
    pub fn destroy(&mut self, id: MapId) -> Result<()> {
        self.validate(id)?;

        // Unpartner the survivor before the slot goes away.
        if let Some(partner) = self.cells[id.index as usize].partner.take() {
            if partner != id && self.exists(partner) {
                self.cells[partner.index as usize].partner = None;
            }
        }

        let idx = id.index as usize;
        // Increment generation (was odd/live, now even/free)
        self.generations[idx] += 1;
        self.cells[idx] = MapCell::vacant();
        self.free_list.push(id.index);
        self.live_count -= 1;

        Ok(())
    }

    /// Checks if a handle names a live map.
    #[must_use]
    pub fn exists(&self, id: MapId) -> bool {
        let idx = id.index as usize;
        if idx >= self.generations.len() {
            return false;
        }
        // Slot is live if the generation matches and is odd
        self.generations[idx] == id.generation && id.generation % 2 == 1
    }

    /// Validates that a handle names a live map.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::MapNotFound`](mirrormap_foundation::ErrorKind::MapNotFound)
    /// for an index that was never allocated or is currently free, and
    /// [`ErrorKind::StaleMap`](mirrormap_foundation::ErrorKind::StaleMap)
    /// when the slot was destroyed and possibly reused.
    pub fn validate(&self, id: MapId) -> Result<()> {
        let idx = id.index as usize;

        if idx >= self.generations.len() {
            return Err(Error::map_not_found(id));
        }

        let current = self.generations[idx];

        if current != id.generation {
            return Err(Error::stale_map(id));
        }

        if current % 2 == 0 {
            return Err(Error::map_not_found(id));
        }

        Ok(())
    }

    /// Returns the number of live maps in the registry.
    #[must_use]
    pub fn live_maps(&self) -> usize {
        self.live_count
    }

    /// Iterates over the handles of all live maps.
    pub fn iter_ids(&self) -> impl Iterator<Item = MapId> + '_ {
        self.generations
            .iter()
            .enumerate()
            .filter(|(_, generation)| *generation % 2 == 1)
            .map(|(idx, generation)| MapId::new(idx as u64, *generation))
    }

    // =========================================================================
    // Partnership
    // =========================================================================

    /// Returns the current partner of `id`, if any.
    ///
    /// A stale partner pointer is observed as `None`, never dangled.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is stale or was never allocated.
    pub fn partner(&self, id: MapId) -> Result<Option<MapId>> {
        self.validate(id)?;
        Ok(self.cells[id.index as usize]
            .partner
            .filter(|p| self.exists(*p)))
    }

    /// Links `a` and `b` as partners and reconciles their contents.
    ///
    /// `b`'s entries are authoritative: `a` absorbs their inverse, and `a`'s
    /// surviving entries are reflected back into `b`, so the two maps leave
    /// this call as exact inverses (see [`reconcile`]). Any prior partner of
    /// either side is unlinked first, contents untouched. Every error is
    /// raised before the first mutation.
    ///
    /// An empty map may be linked to itself; its two directions then share
    /// one slot.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::SelfLink`](mirrormap_foundation::ErrorKind::SelfLink)
    ///   when `a == b` and the map is non-empty.
    /// - [`ErrorKind::Incompatible`](mirrormap_foundation::ErrorKind::Incompatible)
    ///   when `b` does not resolve to a live map of this registry.
    /// - Handle-resolution errors when `a` is stale or unknown.
    pub fn link(&mut self, a: MapId, b: MapId) -> Result<()> {
        self.validate(a)?;
        if self.validate(b).is_err() {
            return Err(Error::incompatible(b));
        }

        if a == b {
            if !self.cells[a.index as usize].entries.is_empty() {
                return Err(Error::self_link(a));
            }
            self.unlink(a)?;
            self.cells[a.index as usize].partner = Some(a);
            return Ok(());
        }

        // Break a's old relation, then the reciprocal pointer of whichever
        // partner b is leaving.
        self.unlink(a)?;
        if let Some(old) = self.cells[b.index as usize].partner.take() {
            if self.exists(old) {
                self.cells[old.index as usize].partner = None;
            }
        }

        self.cells[a.index as usize].partner = Some(b);
        self.cells[b.index as usize].partner = Some(a);

        let (own, other) = self.cells_mut(a, b);
        reconcile(&mut own.entries, &mut other.entries);
        Ok(())
    }

    /// Breaks the partnership of `id`, if any.
    ///
    /// Contents are untouched on both sides. Unlinking an unpartnered map is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is stale or was never allocated.
    pub fn unlink(&mut self, id: MapId) -> Result<()> {
        self.validate(id)?;
        if let Some(partner) = self.cells[id.index as usize].partner.take() {
            if partner != id && self.exists(partner) {
                self.cells[partner.index as usize].partner = None;
            }
        }
        Ok(())
    }

    /// Resolves the live partner of `id`, or fails with `NoPartner`.
    fn require_partner(&self, id: MapId) -> Result<MapId> {
        self.validate(id)?;
        self.cells[id.index as usize]
            .partner
            .filter(|p| self.exists(*p))
            .ok_or_else(|| Error::no_partner(id))
    }

    fn cells_mut(&mut self, a: MapId, b: MapId) -> (&mut MapCell<T>, &mut MapCell<T>) {
        let (ai, bi) = (a.index as usize, b.index as usize);
        debug_assert_ne!(ai, bi);
        if ai < bi {
            let (left, right) = self.cells.split_at_mut(bi);
            (&mut left[ai], &mut right[0])
        } else {
            let (left, right) = self.cells.split_at_mut(ai);
            (&mut right[0], &mut left[bi])
        }
    }

    fn entries(&self, id: MapId) -> &PairMap<T, T> {
        &self.cells[id.index as usize].entries
    }

    fn entries_mut(&mut self, id: MapId) -> &mut PairMap<T, T> {
        &mut self.cells[id.index as usize].entries
    }

    // =========================================================================
    // Mirrored mutation (requires an active partner)
    // =========================================================================

    /// Writes `key → value`, mirroring `value → key` onto the partner.
    ///
    /// The key's previous value is removed from the partner, and a partner
    /// entry already holding `value` has its holder removed from this map,
    /// keeping the pair bijective. Returns the key's previous value.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NoPartner`](mirrormap_foundation::ErrorKind::NoPartner)
    /// when the map is unpartnered, or a handle-resolution error.
    pub fn set(&mut self, id: MapId, key: T, value: T) -> Result<Option<T>> {
        let partner = self.require_partner(id)?;

        // Displace the key's old value from the partner.
        let old_value = self.entries(id).get(&key).cloned();
        if let Some(old) = &old_value {
            self.entries_mut(partner).remove(old);
        }
        // Displace the value's old holder from this side.
        if let Some(old_key) = self.entries(partner).get(&value).cloned() {
            self.entries_mut(id).remove(&old_key);
        }

        self.entries_mut(partner).insert(value.clone(), key.clone());
        self.entries_mut(id).insert(key, value);
        Ok(old_value)
    }

    /// Removes `key` and the mirrored entry on the partner.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::KeyMissing`](mirrormap_foundation::ErrorKind::KeyMissing)
    /// if the key is absent, `NoPartner` when unpartnered, or a
    /// handle-resolution error. A failed call mutates neither side.
    pub fn delete(&mut self, id: MapId, key: &T) -> Result<()> {
        self.pop(id, key).map(|_| ())
    }

    /// Removes `key`, returning its value; the mirrored entry is removed
    /// from the partner.
    ///
    /// # Errors
    ///
    /// Same contract as [`MapStore::delete`].
    pub fn pop(&mut self, id: MapId, key: &T) -> Result<T> {
        let partner = self.require_partner(id)?;
        let Some(value) = self.entries_mut(id).remove(key) else {
            return Err(Error::key_missing(key));
        };
        self.entries_mut(partner).remove(&value);
        Ok(value)
    }

    /// Removes and returns the most recently inserted pair, mirroring the
    /// removal on the partner.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::EmptyMap`](mirrormap_foundation::ErrorKind::EmptyMap)
    /// on an empty map, `NoPartner` when unpartnered, or a handle-resolution
    /// error.
    pub fn pop_arbitrary(&mut self, id: MapId) -> Result<(T, T)> {
        let partner = self.require_partner(id)?;
        let Some((key, value)) = self.entries_mut(id).pop_last() else {
            return Err(Error::empty_map(id));
        };
        self.entries_mut(partner).remove(&value);
        Ok((key, value))
    }

    /// Inserts `key → value` only if the key is absent, mirroring the
    /// insertion when it occurs. Returns the value now under the key.
    ///
    /// # Errors
    ///
    /// Returns `NoPartner` when the map is unpartnered, or a
    /// handle-resolution error.
    pub fn set_default(&mut self, id: MapId, key: T, value: T) -> Result<T> {
        self.require_partner(id)?;
        if let Some(existing) = self.entries(id).get(&key) {
            return Ok(existing.clone());
        }
        self.set(id, key, value.clone())?;
        Ok(value)
    }

    /// Removes every entry from both sides of the pair.
    ///
    /// # Errors
    ///
    /// Returns `NoPartner` when the map is unpartnered, or a
    /// handle-resolution error.
    pub fn clear(&mut self, id: MapId) -> Result<()> {
        let partner = self.require_partner(id)?;
        self.entries_mut(id).clear();
        self.entries_mut(partner).clear();
        Ok(())
    }

    /// Applies a batched insertion, pair by pair, each fully mirrored before
    /// the next begins.
    ///
    /// Bulk-source entries are applied first, in their iteration order,
    /// followed by the batch's trailing pairs in the order given.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::TooManyArguments`](mirrormap_foundation::ErrorKind::TooManyArguments)
    /// when the batch carries more than one bulk source, `NoPartner` when
    /// the map is unpartnered, or a handle-resolution error. All checks
    /// precede the first mutation.
    pub fn update(&mut self, id: MapId, batch: UpdateBatch<T, T>) -> Result<()> {
        self.require_partner(id)?;
        for (key, value) in batch.into_pairs()? {
            self.set(id, key, value)?;
        }
        Ok(())
    }

    // =========================================================================
    // Reads (independent of partnership state)
    // =========================================================================

    /// Gets the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is stale or was never allocated.
    pub fn get(&self, id: MapId, key: &T) -> Result<Option<&T>> {
        self.validate(id)?;
        Ok(self.entries(id).get(key))
    }

    /// Returns true if the map contains `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is stale or was never allocated.
    pub fn contains(&self, id: MapId, key: &T) -> Result<bool> {
        self.validate(id)?;
        Ok(self.entries(id).contains_key(key))
    }

    /// Returns the number of entries in the map.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is stale or was never allocated.
    pub fn len(&self, id: MapId) -> Result<usize> {
        self.validate(id)?;
        Ok(self.entries(id).len())
    }

    /// Returns true if the map has no entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is stale or was never allocated.
    pub fn is_empty(&self, id: MapId) -> Result<bool> {
        self.validate(id)?;
        Ok(self.entries(id).is_empty())
    }

    /// Iterates over the map's pairs in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is stale or was never allocated.
    pub fn pairs(&self, id: MapId) -> Result<impl Iterator<Item = (&T, &T)>> {
        self.validate(id)?;
        Ok(self.entries(id).iter())
    }

    /// Iterates over the map's keys in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is stale or was never allocated.
    pub fn keys(&self, id: MapId) -> Result<impl Iterator<Item = &T>> {
        self.validate(id)?;
        Ok(self.entries(id).keys())
    }

    /// Iterates over the map's values in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is stale or was never allocated.
    pub fn values(&self, id: MapId) -> Result<impl Iterator<Item = &T>> {
        self.validate(id)?;
        Ok(self.entries(id).values())
    }

    /// Borrows the map's entry container directly.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is stale or was never allocated.
    pub fn map(&self, id: MapId) -> Result<&PairMap<T, T>> {
        self.validate(id)?;
        Ok(self.entries(id))
    }
}
