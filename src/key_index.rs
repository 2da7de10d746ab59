use crate::error::{Error, Result};




#[derive(Clone, Debug, Default, PartialEq)]


/**
 * A mapping from a floating point key to a storage slot, kept in ascending
 * key order. The rank of an entry (its place in key order) is the logical
 * position used by `SortedSeries`; the slot is where the record physically
 * lives. When every rank equals its slot the index is said to be in place.
 */
pub struct OrderedKeyIndex {
    keys: Vec<f64>,
    slots: Vec<usize>,
    in_place: bool,
}




// ============================================================================
impl OrderedKeyIndex {


    /**
     * Return an empty index.
     */
    pub fn new() -> Self {
        Self { keys: Vec::new(), slots: Vec::new(), in_place: true }
    }


    /**
     * Build an in-place index from a sequence of keys that is already in
     * ascending order. The order is not validated in release builds.
     */
    pub fn build<I: IntoIterator<Item = f64>>(keys: I) -> Self {
        let keys: Vec<f64> = keys.into_iter().collect();
        debug_assert!(keys.windows(2).all(|w| w[0] < w[1]), "keys are not strictly ascending");
        let slots = (0..keys.len()).collect();
        Self { keys, slots, in_place: true }
    }


    /**
     * Build an index from `(key, slot)` pairs in any order. The pairs are
     * sorted by key; the caller guarantees the keys are distinct.
     */
    pub fn from_entries<I: IntoIterator<Item = (f64, usize)>>(entries: I) -> Self {
        let mut entries: Vec<(f64, usize)> = entries.into_iter().collect();
        entries.sort_by(|a, b| a.0.total_cmp(&b.0));
        let in_place = entries.iter().enumerate().all(|(rank, (_, slot))| rank == *slot);
        let (keys, slots) = entries.into_iter().unzip();
        Self { keys, slots, in_place }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn is_in_place(&self) -> bool {
        self.in_place
    }


    /**
     * Return the rank of the given key, or `KeyNotFound` if it is absent.
     */
    pub fn position_of(&self, key: f64) -> Result<usize> {
        let rank = self.rank_at_or_after(key);
        match self.keys.get(rank) {
            Some(k) if *k == key => Ok(rank),
            _ => Err(Error::KeyNotFound(key)),
        }
    }

    pub fn contains(&self, key: f64) -> bool {
        self.position_of(key).is_ok()
    }


    /**
     * Return the first entry whose key is greater than or equal to the given
     * key, as `(key, rank)`.
     */
    pub fn first_at_or_after(&self, key: f64) -> Result<(f64, usize)> {
        let rank = self.rank_at_or_after(key);
        self.keys
            .get(rank)
            .map(|k| (*k, rank))
            .ok_or(Error::NoKeyAtOrAfter(key))
    }


    /**
     * Return the last entry whose key is less than or equal to the given key,
     * as `(key, rank)`.
     */
    pub fn last_at_or_before(&self, key: f64) -> Result<(f64, usize)> {
        match self.rank_after(key) {
            0 => Err(Error::NoKeyAtOrBefore(key)),
            n => Ok((self.keys[n - 1], n - 1)),
        }
    }


    /**
     * Return the number of keys strictly less than the given key. This is the
     * rank the key has, or would have if it were inserted.
     */
    pub fn rank_at_or_after(&self, key: f64) -> usize {
        self.keys.partition_point(|k| *k < key)
    }


    /**
     * Return the number of keys less than or equal to the given key.
     */
    pub fn rank_after(&self, key: f64) -> usize {
        self.keys.partition_point(|k| *k <= key)
    }

    pub fn last_key(&self) -> Option<f64> {
        self.keys.last().copied()
    }

    pub fn keys(&self) -> &[f64] {
        &self.keys
    }

    pub fn slots(&self) -> &[usize] {
        &self.slots
    }


    /**
     * Append an entry whose key exceeds every key in the index.
     */
    pub(crate) fn push(&mut self, key: f64, slot: usize) {
        debug_assert!(self.last_key().map_or(true, |last| last < key));
        self.in_place = self.in_place && slot == self.slots.len();
        self.keys.push(key);
        self.slots.push(slot);
    }


    /**
     * Remove the entry with the largest key.
     */
    pub(crate) fn pop(&mut self) -> Option<(f64, usize)> {
        let key = self.keys.pop()?;
        let slot = self.slots.pop()?;
        Some((key, slot))
    }
}
