use core::ops::Range;
use serde::{Deserialize, Serialize};




#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]


/**
 * Identifier for a Cartesian axis
 */
pub enum Axis {
    X,
    Y,
    Z,
}




// ============================================================================
impl Axis {

    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];


    /**
     * Return the position of this axis in a `[k, j, i]` storage index, where
     * the final index (x) increases fastest.
     */
    pub fn storage(self) -> usize {
        match self {
            Axis::X => 2,
            Axis::Y => 1,
            Axis::Z => 0,
        }
    }

    pub fn number(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}




#[derive(Clone, Debug, PartialEq)]


/**
 * Represents a rectangular region in a discrete 3D index space. Indexes are
 * stored in `[k, j, i]` order (z, y, x).
 */
pub struct IndexSpace {
    dk: Range<usize>,
    dj: Range<usize>,
    di: Range<usize>,
}




/**
 * Describes a rectangular index space. The index type is unsigned, since
 * every space here is a region of a block buffer.
 */
impl IndexSpace {


    pub fn new(dk: Range<usize>, dj: Range<usize>, di: Range<usize>) -> Self {

        assert!(
            dk.start <= dk.end && dj.start <= dj.end && di.start <= di.end,
            "index space has negative volume");

        Self { dk, dj, di }
    }


    /**
     * Return the index space covering a whole buffer of the given shape.
     */
    pub fn of_shape(shape: [usize; 3]) -> Self {
        Self::new(0..shape[0], 0..shape[1], 0..shape[2])
    }


    /**
     * Return the number of indexes on each axis.
     */
    pub fn dim(&self) -> [usize; 3] {
        [self.dk.len(), self.dj.len(), self.di.len()]
    }


    /**
     * Return the number of elements in this index space.
     */
    pub fn len(&self) -> usize {
        self.dim().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }


    /**
     * Return the minimum index (inclusive).
     */
    pub fn start(&self) -> [usize; 3] {
        [self.dk.start, self.dj.start, self.di.start]
    }


    /**
     * Return a copy of this index space with the range on one axis replaced.
     */
    pub fn with_axis(&self, axis: Axis, range: Range<usize>) -> Self {
        let mut space = self.clone();

        match axis {
            Axis::X => space.di = range,
            Axis::Y => space.dj = range,
            Axis::Z => space.dk = range,
        }
        space
    }


    /**
     * Determine whether this index space contains the given index.
     */
    pub fn contains(&self, index: [usize; 3]) -> bool {
        self.dk.contains(&index[0]) && self.dj.contains(&index[1]) && self.di.contains(&index[2])
    }


    /**
     * Return the linear offset for the given index, in a row-major memory
     * buffer aligned with the start of this index space.
     */
    pub fn row_major_offset(&self, index: [usize; 3]) -> usize {
        let [_, m, n] = self.dim();
        let k = index[0] - self.dk.start;
        let j = index[1] - self.dj.start;
        let i = index[2] - self.di.start;
        (k * m + j) * n + i
    }


    /**
     * Return a memory region object corresponding to the selection of this
     * index space in a buffer of the given shape.
     */
    pub fn memory_region_in(&self, shape: [usize; 3]) -> MemoryRegion {
        MemoryRegion { start: self.start(), count: self.dim(), shape }
    }


    /**
     * Return an iterator which traverses the index space in row-major order
     * (C-like; the final index increases fastest).
     */
    pub fn iter(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.dk.clone().flat_map(move |k| {
            self.dj.clone().flat_map(move |j| self.di.clone().map(move |i| [k, j, i]))
        })
    }
}




/**
 * Less imposing factory function to construct an IndexSpace object.
 */
pub fn range3d(dk: Range<usize>, dj: Range<usize>, di: Range<usize>) -> IndexSpace {
    IndexSpace::new(dk, dj, di)
}




/**
 * A 3D memory region within a contiguous buffer. Rows are the contiguous
 * runs along the fastest (x) axis.
 */
pub struct MemoryRegion {
    start: [usize; 3],
    count: [usize; 3],
    shape: [usize; 3],
}




// ============================================================================
impl MemoryRegion {

    pub fn iter_rows<'a>(&'a self, slice: &'a [f64]) -> impl Iterator<Item = &'a [f64]> {
        let start = &self.start;
        let count = &self.count;
        let r = self.shape[2];
        let q = self.shape[1] * r;

        assert!(slice.len() == self.shape[0] * q);

        slice[start[0] * q..(start[0] + count[0]) * q]
        .chunks_exact(q).flat_map(move |plane| plane[start[1] * r..(start[1] + count[1]) * r]
        .chunks_exact(r).map(move |row| &row[start[2]..start[2] + count[2]]))
    }

    pub fn iter_rows_mut<'a>(&'a self, slice: &'a mut [f64]) -> impl Iterator<Item = &'a mut [f64]> {
        let start = &self.start;
        let count = &self.count;
        let r = self.shape[2];
        let q = self.shape[1] * r;

        assert!(slice.len() == self.shape[0] * q);

        slice[start[0] * q..(start[0] + count[0]) * q]
        .chunks_exact_mut(q).flat_map(move |plane| plane[start[1] * r..(start[1] + count[1]) * r]
        .chunks_exact_mut(r).map(move |row| &mut row[start[2]..start[2] + count[2]]))
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::{range3d, Axis, IndexSpace};

    #[test]
    fn iteration_is_row_major() {
        let space = range3d(0..1, 1..3, 2..4);
        let indexes: Vec<_> = space.iter().collect();
        assert_eq!(indexes, vec![[0, 1, 2], [0, 1, 3], [0, 2, 2], [0, 2, 3]]);
        assert_eq!(space.row_major_offset([0, 2, 3]), 3);
    }

    #[test]
    fn with_axis_replaces_one_range() {
        let space = IndexSpace::of_shape([3, 4, 5]).with_axis(Axis::X, 1..2);
        assert_eq!(space.dim(), [3, 4, 1]);
        assert!(space.contains([2, 3, 1]));
        assert!(!space.contains([2, 3, 2]));
    }

    #[test]
    fn memory_region_visits_selected_rows() {
        let data: Vec<f64> = (0..60).map(f64::from).collect();
        let region = range3d(1..3, 2..4, 1..3).memory_region_in([3, 4, 5]);
        let rows: Vec<&[f64]> = region.iter_rows(&data).collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], &[31.0, 32.0]);
        assert_eq!(rows[3], &[56.0, 57.0]);
    }

    #[test]
    fn memory_region_writes_selected_rows() {
        let mut data = vec![0.0; 60];
        let region = range3d(0..3, 0..4, 4..5).memory_region_in([3, 4, 5]);
        for row in region.iter_rows_mut(&mut data) {
            row.fill(1.0);
        }
        assert_eq!(data.iter().sum::<f64>(), 12.0);
        assert_eq!(data[4], 1.0);
    }
}
