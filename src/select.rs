use std::ops::{Bound, Range, RangeBounds, RangeFrom, RangeFull, RangeInclusive, RangeTo, RangeToInclusive};
use crate::error::{Error, Result};
use crate::key_index::OrderedKeyIndex;




#[derive(Clone, Copy, Debug, Default, PartialEq)]


/**
 * A positional slice with list semantics: half-open, negative values count
 * from the end, out-of-range bounds are clamped, and a negative step walks
 * backwards.
 */
pub struct Slice {
    pub start: Option<isize>,
    pub stop: Option<isize>,
    pub step: Option<isize>,
}




// ============================================================================
impl Slice {

    pub fn new(start: Option<isize>, stop: Option<isize>, step: Option<isize>) -> Self {
        Self { start, stop, step }
    }

    pub fn full() -> Self {
        Self::default()
    }

    pub fn step(self, step: isize) -> Self {
        Self { step: Some(step), ..self }
    }


    /**
     * Resolve this slice against a sequence of the given length, returning
     * the selected positions in traversal order.
     */
    pub fn indices(&self, len: usize) -> Result<Vec<usize>> {
        let step = self.step.unwrap_or(1);

        if step == 0 {
            return Err(Error::ZeroStep);
        }
        let len = len as isize;
        let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };

        let adjust = |value: Option<isize>, default: isize| match value {
            None => default,
            Some(v) if v < 0 => (v + len).max(lower),
            Some(v) => v.min(upper),
        };
        let start = adjust(self.start, if step < 0 { upper } else { lower });
        let stop = adjust(self.stop, if step < 0 { lower } else { upper });

        let mut positions = Vec::new();
        let mut i = start;

        while (step > 0 && i < stop) || (step < 0 && i > stop) {
            positions.push(i as usize);
            i += step;
        }
        Ok(positions)
    }
}

impl From<Range<usize>> for Slice {
    fn from(range: Range<usize>) -> Self {
        Self::new(Some(range.start as isize), Some(range.end as isize), None)
    }
}

impl From<RangeFrom<usize>> for Slice {
    fn from(range: RangeFrom<usize>) -> Self {
        Self::new(Some(range.start as isize), None, None)
    }
}

impl From<RangeTo<usize>> for Slice {
    fn from(range: RangeTo<usize>) -> Self {
        Self::new(None, Some(range.end as isize), None)
    }
}

impl From<RangeFull> for Slice {
    fn from(_: RangeFull) -> Self {
        Self::full()
    }
}




#[derive(Clone, Copy, Debug, PartialEq)]


/**
 * A range of keys. Bounds given as plain values are closed: `closed(lo, hi)`
 * selects every key in `[lo, hi]`. The optional step strides the resulting
 * positions, not the key distance.
 */
pub struct KeyRange {
    pub lower: Bound<f64>,
    pub upper: Bound<f64>,
    pub step: Option<usize>,
}




// ============================================================================
impl KeyRange {

    pub fn closed(lo: Option<f64>, hi: Option<f64>) -> Self {
        Self {
            lower: lo.map_or(Bound::Unbounded, Bound::Included),
            upper: hi.map_or(Bound::Unbounded, Bound::Included),
            step: None,
        }
    }

    pub fn from_bounds<R: RangeBounds<f64>>(range: R) -> Self {
        Self {
            lower: range.start_bound().cloned(),
            upper: range.end_bound().cloned(),
            step: None,
        }
    }

    pub fn with_step(self, step: Option<usize>) -> Self {
        Self { step, ..self }
    }


    /**
     * Return the half-open range of ranks covered by the key bounds, before
     * any stride is applied.
     */
    pub fn span(&self, index: &OrderedKeyIndex) -> Result<Range<usize>> {
        for bound in [self.lower, self.upper] {
            if let Bound::Included(k) | Bound::Excluded(k) = bound {
                if k.is_nan() {
                    return Err(Error::InvalidKey(k));
                }
            }
        }
        let start = match self.lower {
            Bound::Unbounded => 0,
            Bound::Included(lo) => index.rank_at_or_after(lo),
            Bound::Excluded(lo) => index.rank_after(lo),
        };
        let stop = match self.upper {
            Bound::Unbounded => index.len(),
            Bound::Included(hi) => index.rank_after(hi),
            Bound::Excluded(hi) => index.rank_at_or_after(hi),
        };
        Ok(start..stop.max(start))
    }


    /**
     * Return the selected ranks in ascending order. A range matching no key
     * resolves to no ranks.
     */
    pub fn ranks(&self, index: &OrderedKeyIndex) -> Result<Vec<usize>> {
        let step = self.step.unwrap_or(1);

        if step == 0 {
            return Err(Error::ZeroStep);
        }
        Ok(self.span(index)?.step_by(step).collect())
    }
}

impl From<RangeInclusive<f64>> for KeyRange {
    fn from(range: RangeInclusive<f64>) -> Self {
        Self::from_bounds(range)
    }
}

impl From<RangeFrom<f64>> for KeyRange {
    fn from(range: RangeFrom<f64>) -> Self {
        Self::from_bounds(range)
    }
}

impl From<RangeToInclusive<f64>> for KeyRange {
    fn from(range: RangeToInclusive<f64>) -> Self {
        Self::from_bounds(range)
    }
}




#[derive(Clone, Debug, PartialEq)]


/**
 * Anything a `SortedSeries` can be indexed by: a position, an exact key, a
 * positional slice, a key range, or a list of positions and keys.
 */
pub enum Selector {
    Index(isize),
    Key(f64),
    Slice(Slice),
    KeyRange(KeyRange),
    Many(Vec<Position>),
}

impl From<isize> for Selector {
    fn from(i: isize) -> Self {
        Self::Index(i)
    }
}

impl From<i32> for Selector {
    fn from(i: i32) -> Self {
        Self::Index(i as isize)
    }
}

impl From<usize> for Selector {
    fn from(i: usize) -> Self {
        Self::Index(i as isize)
    }
}

impl From<f64> for Selector {
    fn from(key: f64) -> Self {
        Self::Key(key)
    }
}

impl From<Slice> for Selector {
    fn from(slice: Slice) -> Self {
        Self::Slice(slice)
    }
}

impl From<KeyRange> for Selector {
    fn from(range: KeyRange) -> Self {
        Self::KeyRange(range)
    }
}

impl From<Range<usize>> for Selector {
    fn from(range: Range<usize>) -> Self {
        Self::Slice(range.into())
    }
}

impl From<RangeFrom<usize>> for Selector {
    fn from(range: RangeFrom<usize>) -> Self {
        Self::Slice(range.into())
    }
}

impl From<RangeTo<usize>> for Selector {
    fn from(range: RangeTo<usize>) -> Self {
        Self::Slice(range.into())
    }
}

impl From<RangeFull> for Selector {
    fn from(range: RangeFull) -> Self {
        Self::Slice(range.into())
    }
}

impl From<RangeInclusive<f64>> for Selector {
    fn from(range: RangeInclusive<f64>) -> Self {
        Self::KeyRange(range.into())
    }
}

impl From<RangeFrom<f64>> for Selector {
    fn from(range: RangeFrom<f64>) -> Self {
        Self::KeyRange(range.into())
    }
}

impl From<RangeToInclusive<f64>> for Selector {
    fn from(range: RangeToInclusive<f64>) -> Self {
        Self::KeyRange(range.into())
    }
}

impl From<Vec<Position>> for Selector {
    fn from(at: Vec<Position>) -> Self {
        Self::Many(at)
    }
}

impl From<Vec<f64>> for Selector {
    fn from(keys: Vec<f64>) -> Self {
        Self::Many(keys.into_iter().map(Position::Key).collect())
    }
}

impl From<Vec<isize>> for Selector {
    fn from(indexes: Vec<isize>) -> Self {
        Self::Many(indexes.into_iter().map(Position::Index).collect())
    }
}

impl From<Vec<usize>> for Selector {
    fn from(indexes: Vec<usize>) -> Self {
        Self::Many(indexes.into_iter().map(Position::from).collect())
    }
}




#[derive(Clone, Copy, Debug, PartialEq)]


/**
 * A single record location: a position or an exact key.
 */
pub enum Position {
    Index(isize),
    Key(f64),
}

impl From<isize> for Position {
    fn from(i: isize) -> Self {
        Self::Index(i)
    }
}

impl From<i32> for Position {
    fn from(i: i32) -> Self {
        Self::Index(i as isize)
    }
}

impl From<usize> for Position {
    fn from(i: usize) -> Self {
        Self::Index(i as isize)
    }
}

impl From<f64> for Position {
    fn from(key: f64) -> Self {
        Self::Key(key)
    }
}
