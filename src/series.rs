use std::cell::OnceCell;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::ops::{Range, RangeBounds};
use crate::error::{Error, Result};
use crate::key_index::OrderedKeyIndex;
use crate::select::{KeyRange, Position, Selector, Slice};




/**
 * Implemented by anything that can be placed into a `SortedSeries`. The key
 * is the simulation time of the record.
 */
pub trait Keyed {
    fn key(&self) -> f64;
}

impl<T: Keyed + ?Sized> Keyed for &T {
    fn key(&self) -> f64 {
        (**self).key()
    }
}




fn checked_key(key: f64) -> Result<f64> {
    if key.is_nan() {
        Err(Error::InvalidKey(key))
    } else {
        Ok(key)
    }
}

fn key_bits(key: f64) -> u64 {
    if key == 0.0 { 0 } else { key.to_bits() }
}

fn resolve_index(index: isize, len: usize) -> Result<usize> {
    let resolved = if index < 0 { index + len as isize } else { index };

    if resolved < 0 || resolved as usize >= len {
        Err(Error::IndexOutOfRange { index, len })
    } else {
        Ok(resolved as usize)
    }
}




#[derive(Clone)]


/**
 * A collection of keyed records, unique by key and always observed in
 * ascending key order. Records are stored in arrival order until a mutation
 * or `sort` reorders them; the key index is rebuilt lazily on the first read
 * after an out-of-order insert, so reads never need exclusive access.
 *
 * Slicing and key lookups return series of references into this one: the
 * records stay owned here.
 */
pub struct SortedSeries<T> {
    data: Vec<T>,
    index: OnceCell<OrderedKeyIndex>,
}




// ============================================================================
impl<T: Keyed> SortedSeries<T> {


    /**
     * Return an empty series.
     */
    pub fn new() -> Self {
        Self { data: Vec::new(), index: OnceCell::from(OrderedKeyIndex::new()) }
    }


    /**
     * Build a series from records already in strictly ascending key order,
     * without sorting. Order is checked only in debug builds.
     */
    pub fn from_sorted<I: IntoIterator<Item = T>>(records: I) -> Self {
        let data: Vec<T> = records.into_iter().collect();
        let index = OrderedKeyIndex::build(data.iter().map(Keyed::key));
        Self { data, index: OnceCell::from(index) }
    }


    /**
     * Build a series from records in any order, failing if two of them
     * share a key.
     */
    pub fn from_records<I: IntoIterator<Item = T>>(records: I) -> Result<Self> {
        let mut series = Self::new();
        series.extend(records)?;
        Ok(series)
    }

    fn from_unique(data: Vec<T>) -> Self {
        Self { data, index: OnceCell::new() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }


    /**
     * Whether the key index is current. A series becomes invalid after an
     * out-of-order insert and valid again on the next read or `sort`.
     */
    pub fn is_valid(&self) -> bool {
        self.index.get().is_some()
    }

    fn index(&self) -> &OrderedKeyIndex {
        self.index.get_or_init(|| {
            OrderedKeyIndex::from_entries(self.data.iter().enumerate().map(|(slot, r)| (r.key(), slot)))
        })
    }

    fn at_rank(&self, rank: usize) -> &T {
        &self.data[self.index().slots()[rank]]
    }


    /**
     * Put the records in key order in storage, and bring the index in line.
     * Calling this on a series that is already in order does nothing.
     */
    pub fn sort(&mut self) {
        if self.index.get().map_or(false, OrderedKeyIndex::is_in_place) {
            return;
        }
        self.data.sort_by(|a, b| a.key().total_cmp(&b.key()));
        self.index = OnceCell::from(OrderedKeyIndex::build(self.data.iter().map(Keyed::key)));
    }

    fn push_unchecked(&mut self, key: f64, record: T) {
        let slot = self.data.len();
        let in_order = self.index.get().map_or(false, |index| index.last_key().map_or(true, |last| last < key));

        if in_order {
            if let Some(index) = self.index.get_mut() {
                index.push(key, slot);
            }
        } else {
            self.index.take();
        }
        self.data.push(record);
    }

    fn ensure_absent(&self, key: f64) -> Result<()> {
        match self.index().position_of(key) {
            Ok(position) => Err(Error::DuplicateKey { key, position }),
            Err(_) => Ok(()),
        }
    }


    /**
     * Add a record. This is cheap when the key exceeds every key in the
     * series; otherwise the index is invalidated and rebuilt by the next
     * read. Fails without side effects if the key is already present.
     */
    pub fn append(&mut self, record: T) -> Result<()> {
        let key = checked_key(record.key())?;
        self.ensure_absent(key)?;
        self.push_unchecked(key, record);
        Ok(())
    }


    /**
     * Add many records. Either all of them are added or, if any key is
     * repeated or already present, none are.
     */
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, records: I) -> Result<()> {
        let incoming: Vec<T> = records.into_iter().collect();
        let mut seen = HashSet::with_capacity(incoming.len());

        for record in &incoming {
            let key = checked_key(record.key())?;
            self.ensure_absent(key)?;

            if !seen.insert(key_bits(key)) {
                return Err(Error::DuplicateKeys(vec![key]));
            }
        }
        for record in incoming {
            let key = record.key();
            self.push_unchecked(key, record);
        }
        Ok(())
    }


    /**
     * Return a new series holding the records of this one and the given
     * ones. Fails if the key sets are not disjoint.
     */
    pub fn concat<I: IntoIterator<Item = T>>(&self, other: I) -> Result<Self>
    where
        T: Clone,
    {
        let mut series = self.clone();
        series.extend(other)?;
        Ok(series)
    }


    /**
     * Return the record at the given position in key order. Negative
     * positions count from the end.
     */
    pub fn get_by_index(&self, index: isize) -> Result<&T> {
        let rank = resolve_index(index, self.len())?;
        Ok(self.at_rank(rank))
    }


    /**
     * Return the records selected by a positional slice. A negative step
     * walks backwards, but the result is itself a series and so is again
     * in ascending key order.
     */
    pub fn get_by_index_range(&self, slice: Slice) -> Result<SortedSeries<&T>> {
        let ranks = slice.indices(self.len())?;
        let records: Vec<&T> = ranks.into_iter().map(|rank| self.at_rank(rank)).collect();

        if slice.step.unwrap_or(1) > 0 {
            Ok(SortedSeries::from_sorted(records))
        } else {
            Ok(SortedSeries::from_unique(records))
        }
    }


    /**
     * Return a one-record series holding the record with exactly this key.
     */
    pub fn get_by_key(&self, key: f64) -> Result<SortedSeries<&T>> {
        let rank = self.index().position_of(key)?;
        Ok(SortedSeries::from_sorted(Some(self.at_rank(rank))))
    }

    pub fn get(&self, key: f64) -> Option<&T> {
        self.index().position_of(key).ok().map(|rank| self.at_rank(rank))
    }


    /**
     * Return the first record whose key is greater than or equal to the given
     * key.
     */
    pub fn get_at_or_after(&self, key: f64) -> Result<&T> {
        let (_, rank) = self.index().first_at_or_after(key)?;
        Ok(self.at_rank(rank))
    }


    /**
     * Return the records whose keys lie in the closed interval `[lo, hi]`
     * (either bound may be open-ended), optionally taking every `step`-th
     * one. An interval containing no key gives an empty series.
     */
    pub fn get_by_key_range(&self, lo: Option<f64>, hi: Option<f64>, step: Option<usize>) -> Result<SortedSeries<&T>> {
        self.get_by_keys(&KeyRange::closed(lo, hi).with_step(step))
    }

    pub fn range<R: RangeBounds<f64>>(&self, range: R) -> Result<SortedSeries<&T>> {
        self.get_by_keys(&KeyRange::from_bounds(range))
    }

    fn get_by_keys(&self, range: &KeyRange) -> Result<SortedSeries<&T>> {
        let ranks = range.ranks(self.index())?;
        Ok(SortedSeries::from_sorted(ranks.into_iter().map(|rank| self.at_rank(rank))))
    }


    /**
     * General indexing: positions, exact keys, positional slices, key
     * ranges and lists of positions or keys all produce a series of
     * references. Listed records come back once each, in key order.
     */
    pub fn select<S: Into<Selector>>(&self, selector: S) -> Result<SortedSeries<&T>> {
        match selector.into() {
            Selector::Index(i) => Ok(SortedSeries::from_sorted(Some(self.get_by_index(i)?))),
            Selector::Key(key) => self.get_by_key(key),
            Selector::Slice(slice) => self.get_by_index_range(slice),
            Selector::KeyRange(range) => self.get_by_keys(&range),
            Selector::Many(at) => {
                let ranks = self.ranks_of(at)?;
                Ok(SortedSeries::from_sorted(ranks.into_iter().map(|rank| self.at_rank(rank))))
            }
        }
    }

    pub fn position_of(&self, key: f64) -> Result<usize> {
        self.index().position_of(key)
    }


    /**
     * Return the position in key order of a record given by position or by
     * exact key. Negative positions count from the end.
     */
    pub fn rank_of<P: Into<Position>>(&self, at: P) -> Result<usize> {
        match at.into() {
            Position::Index(i) => resolve_index(i, self.len()),
            Position::Key(key) => self.index().position_of(key),
        }
    }

    fn ranks_of(&self, at: Vec<Position>) -> Result<Vec<usize>> {
        let mut ranks = at.into_iter().map(|p| self.rank_of(p)).collect::<Result<Vec<_>>>()?;
        ranks.sort_unstable();
        ranks.dedup();
        Ok(ranks)
    }


    /**
     * Resolve a selector to positions in key order, without borrowing the
     * records.
     */
    pub fn positions<S: Into<Selector>>(&self, selector: S) -> Result<Vec<usize>> {
        match selector.into() {
            Selector::Index(i) => Ok(vec![resolve_index(i, self.len())?]),
            Selector::Key(key) => Ok(vec![self.position_of(key)?]),
            Selector::Slice(slice) => {
                let mut ranks = slice.indices(self.len())?;
                ranks.sort_unstable();
                Ok(ranks)
            }
            Selector::KeyRange(range) => range.ranks(self.index()),
            Selector::Many(at) => self.ranks_of(at),
        }
    }


    /**
     * Replace the record at the given position, returning the old one. The
     * new key may equal the replaced key, but no other.
     */
    pub fn set_by_index(&mut self, index: isize, record: T) -> Result<T> {
        self.sort();
        let rank = resolve_index(index, self.len())?;
        let key = checked_key(record.key())?;

        if let Ok(position) = self.index().position_of(key) {
            if position != rank {
                return Err(Error::DuplicateKey { key, position });
            }
        }
        let old = std::mem::replace(&mut self.data[rank], record);

        if old.key() != key {
            self.index.take();
        }
        Ok(old)
    }


    /**
     * Replace the records at the given positions with new ones, returning
     * the removed records.
     */
    pub fn set_by_index_range<I: IntoIterator<Item = T>>(&mut self, range: Range<usize>, records: I) -> Result<Vec<T>> {
        self.splice(range, records)
    }


    /**
     * Replace the records whose keys lie in `[lo, hi]` with new ones,
     * returning the removed records.
     */
    pub fn set_by_key_range<I: IntoIterator<Item = T>>(&mut self, lo: Option<f64>, hi: Option<f64>, records: I) -> Result<Vec<T>> {
        let span = KeyRange::closed(lo, hi).span(self.index())?;
        self.splice(span, records)
    }

    fn splice<I: IntoIterator<Item = T>>(&mut self, range: Range<usize>, records: I) -> Result<Vec<T>> {
        self.sort();
        let stop = range.end.min(self.len());
        let range = range.start.min(stop)..stop;
        let incoming: Vec<T> = records.into_iter().collect();
        let mut seen = HashSet::with_capacity(incoming.len());

        for record in &incoming {
            let key = checked_key(record.key())?;

            if !seen.insert(key_bits(key)) {
                return Err(Error::DuplicateKeys(vec![key]));
            }
            if let Ok(position) = self.index().position_of(key) {
                if !range.contains(&position) {
                    return Err(Error::DuplicateKey { key, position });
                }
            }
        }
        let removed = self.data.splice(range, incoming).collect();
        self.index.take();
        Ok(removed)
    }


    /**
     * Insert or overwrite by key. Returns the record that was replaced, if
     * any.
     */
    pub fn upsert(&mut self, record: T) -> Result<Option<T>> {
        let key = checked_key(record.key())?;
        self.sort();

        match self.index().position_of(key) {
            Ok(rank) => Ok(Some(std::mem::replace(&mut self.data[rank], record))),
            Err(_) => {
                self.push_unchecked(key, record);
                Ok(None)
            }
        }
    }


    /**
     * Upsert each of the given records. Keys are validated up front, so an
     * invalid key leaves the series unchanged.
     */
    pub fn update<I: IntoIterator<Item = T>>(&mut self, records: I) -> Result<()> {
        let incoming: Vec<T> = records.into_iter().collect();

        for record in &incoming {
            checked_key(record.key())?;
        }
        for record in incoming {
            self.upsert(record)?;
        }
        Ok(())
    }


    /**
     * Return the record with this record's key if there is one; otherwise
     * add this record and return it.
     */
    pub fn setdefault(&mut self, record: T) -> Result<&T> {
        let key = checked_key(record.key())?;

        if let Ok(rank) = self.index().position_of(key) {
            return Ok(self.at_rank(rank));
        }
        self.push_unchecked(key, record);
        Ok(&self.data[self.data.len() - 1])
    }


    /**
     * Remove and return the record at a position or with an exact key.
     */
    pub fn pop<P: Into<Position>>(&mut self, at: P) -> Result<T> {
        self.sort();
        let rank = self.rank_of(at)?;
        let record = self.data.remove(rank);
        self.index = OnceCell::from(OrderedKeyIndex::build(self.data.iter().map(Keyed::key)));
        Ok(record)
    }

    pub fn pop_or<P: Into<Position>>(&mut self, at: P, default: T) -> T {
        self.pop(at).unwrap_or(default)
    }


    /**
     * Remove and return the record with the largest key.
     */
    pub fn popitem(&mut self) -> Result<T> {
        self.sort();
        let record = self.data.pop().ok_or(Error::Empty)?;

        if let Some(index) = self.index.get_mut() {
            index.pop();
        }
        Ok(record)
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.index = OnceCell::from(OrderedKeyIndex::new());
    }

    pub fn contains_key(&self, key: f64) -> bool {
        self.index().contains(key)
    }

    pub fn first(&self) -> Option<&T> {
        self.iter().next()
    }

    pub fn last(&self) -> Option<&T> {
        self.iter().next_back()
    }


    /**
     * Iterate over the records in ascending key order.
     */
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { data: &self.data, slots: self.index().slots().iter() }
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = f64> + ExactSizeIterator + '_ {
        self.index().keys().iter().copied()
    }

    pub fn values(&self) -> Iter<'_, T> {
        self.iter()
    }

    pub fn items(&self) -> impl Iterator<Item = (f64, &T)> + '_ {
        self.keys().zip(self.iter())
    }

    pub fn into_vec(mut self) -> Vec<T> {
        self.sort();
        self.data
    }
}

impl<'a, T: Keyed + Clone> SortedSeries<&'a T> {


    /**
     * Return an owning copy of a series of references.
     */
    pub fn cloned(&self) -> SortedSeries<T> {
        SortedSeries::from_sorted(self.iter().map(|record| (*record).clone()))
    }
}

impl<T: Keyed> Default for SortedSeries<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Keyed + PartialEq> PartialEq for SortedSeries<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Keyed + PartialOrd> PartialOrd for SortedSeries<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Keyed + fmt::Debug> fmt::Debug for SortedSeries<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T: Keyed> IntoIterator for &'a SortedSeries<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}




/**
 * Iterator over the records of a `SortedSeries` in key order.
 */
pub struct Iter<'a, T> {
    data: &'a [T],
    slots: std::slice::Iter<'a, usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.slots.next().map(|slot| &self.data[*slot])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.slots.next_back().map(|slot| &self.data[*slot])
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}
