use crate::array::DenseArray;
use crate::error::{Error, Result};
use crate::index_space::{range3d, Axis, IndexSpace};




#[derive(Clone, Debug, PartialEq)]


/**
 * A field over every block of a snapshot, extended by `guard` cells on each
 * side of each axis. The backing buffer is row-major with shape
 * `(blocks, nz + 2g, ny + 2g, nx + 2g)`; indexes within a block are
 * `[k, j, i]`.
 *
 * Face-centered data has one more raw value than there are cells along its
 * staggered axis. It is stored starting one cell lower than cell-centered
 * data, so that both share the same shape and the same interior range
 * `[g, ext - g)` on every axis.
 */
pub struct BlockArray {
    blocks: usize,
    cells: [usize; 3],
    guard: usize,
    data: Vec<f64>,
}




#[derive(Clone, Copy, Debug, PartialEq)]


/**
 * Minimum and maximum of a field, over block interiors and over the whole
 * halo-extended buffer.
 */
pub struct Extrema {
    pub min: f64,
    pub max: f64,
    pub halo_min: f64,
    pub halo_max: f64,
}




// ============================================================================
impl BlockArray {


    /**
     * Allocate a zero-filled array for the given number of blocks, interior
     * cell counts `[nz, ny, nx]`, and guard width.
     */
    pub fn zeros(blocks: usize, cells: [usize; 3], guard: usize) -> Self {
        let extent = Self::extent_of(cells, guard);
        Self { blocks, cells, guard, data: vec![0.0; blocks * extent.iter().product::<usize>()] }
    }


    /**
     * Generate an array with values defined from a closure of the block and
     * the `[k, j, i]` index within it (guard cells included).
     */
    pub fn from_function<F>(blocks: usize, cells: [usize; 3], guard: usize, f: F) -> Self
    where
        F: Fn(usize, [usize; 3]) -> f64
    {
        let space = IndexSpace::of_shape(Self::extent_of(cells, guard));
        let data = (0..blocks).flat_map(|b| space.iter().map(move |index| (b, index))).map(|(b, index)| f(b, index)).collect();
        Self { blocks, cells, guard, data }
    }


    /**
     * Copy raw interior data, of shape `(blocks, nz, ny, nx)` or one larger
     * along a staggered axis, into a new halo-extended array. Guard cells
     * are left at zero.
     */
    pub fn from_raw(name: &str, raw: &DenseArray, cells: [usize; 3], guard: usize, stagger: Option<Axis>) -> Result<Self> {
        let blocks = raw.shape().first().copied().unwrap_or(0);
        let mut count = cells;
        let mut start = [guard; 3];

        if let Some(axis) = stagger {
            count[axis.storage()] += 1;
            start[axis.storage()] -= 1;
        }
        let expected = vec![blocks, count[0], count[1], count[2]];

        if raw.shape() != expected.as_slice() || (stagger.is_some() && guard == 0) {
            return Err(Error::DatasetShape {
                name: name.to_string(),
                found: raw.shape().to_vec(),
                expected,
            });
        }
        let mut array = Self::zeros(blocks, cells, guard);
        let region = range3d(
            start[0]..start[0] + count[0],
            start[1]..start[1] + count[1],
            start[2]..start[2] + count[2]).memory_region_in(array.extent());
        let raw_len: usize = count.iter().product();

        for (b, source) in raw.as_slice().chunks_exact(raw_len.max(1)).enumerate().take(blocks) {
            let rows = source.chunks_exact(count[2].max(1));

            for (dst, src) in region.iter_rows_mut(array.block_mut(b)).zip(rows) {
                dst.copy_from_slice(src);
            }
        }
        Ok(array)
    }

    fn extent_of(cells: [usize; 3], guard: usize) -> [usize; 3] {
        [cells[0] + 2 * guard, cells[1] + 2 * guard, cells[2] + 2 * guard]
    }

    pub fn blocks(&self) -> usize {
        self.blocks
    }


    /**
     * Return the interior cell counts `[nz, ny, nx]`.
     */
    pub fn cells(&self) -> [usize; 3] {
        self.cells
    }

    pub fn guard(&self) -> usize {
        self.guard
    }


    /**
     * Return the halo-extended shape of one block, `[nz + 2g, ny + 2g, nx + 2g]`.
     */
    pub fn extent(&self) -> [usize; 3] {
        Self::extent_of(self.cells, self.guard)
    }

    fn block_len(&self) -> usize {
        self.extent().iter().product()
    }


    /**
     * Return the interior index space of a block.
     */
    pub fn interior_space(&self) -> IndexSpace {
        let [ek, ej, ei] = self.extent();
        let g = self.guard;
        range3d(g..ek - g, g..ej - g, g..ei - g)
    }

    pub fn block(&self, b: usize) -> &[f64] {
        let n = self.block_len();
        &self.data[b * n..(b + 1) * n]
    }

    pub fn block_mut(&mut self, b: usize) -> &mut [f64] {
        let n = self.block_len();
        &mut self.data[b * n..(b + 1) * n]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn get(&self, b: usize, index: [usize; 3]) -> f64 {
        let offset = IndexSpace::of_shape(self.extent()).row_major_offset(index);
        self.block(b)[offset]
    }

    pub fn set(&mut self, b: usize, index: [usize; 3], value: f64) {
        let offset = IndexSpace::of_shape(self.extent()).row_major_offset(index);
        self.block_mut(b)[offset] = value;
    }


    /**
     * Copy the values in region `src` of block `src_block` into region `dst`
     * of block `dst_block`. The two regions must have the same dimensions.
     */
    pub fn copy_region(&mut self, dst_block: usize, dst: &IndexSpace, src_block: usize, src: &IndexSpace) {
        assert_eq!(dst.dim(), src.dim(), "copy regions differ in shape");

        let extent = self.extent();
        let values: Vec<f64> = src
            .memory_region_in(extent)
            .iter_rows(self.block(src_block))
            .flat_map(|row| row.iter().copied())
            .collect();
        let width = dst.dim()[2].max(1);

        for (row, chunk) in dst.memory_region_in(extent).iter_rows_mut(self.block_mut(dst_block)).zip(values.chunks(width)) {
            row.copy_from_slice(chunk);
        }
    }


    /**
     * Return the block interiors as an array of shape `(blocks, nz, ny, nx)`.
     */
    pub fn interior(&self) -> DenseArray {
        let region = self.interior_space().memory_region_in(self.extent());
        let data = (0..self.blocks)
            .flat_map(|b| region.iter_rows(self.block(b)).flat_map(|row| row.iter().copied()).collect::<Vec<_>>())
            .collect();
        let [nz, ny, nx] = self.cells;
        DenseArray::new(vec![self.blocks, nz, ny, nx], data).unwrap_or_default()
    }


    /**
     * Return the whole halo-extended buffer as an array of shape
     * `(blocks, nz + 2g, ny + 2g, nx + 2g)`.
     */
    pub fn to_dense(&self) -> DenseArray {
        let [ek, ej, ei] = self.extent();
        DenseArray::new(vec![self.blocks, ek, ej, ei], self.data.clone()).unwrap_or_default()
    }

    pub fn extrema(&self) -> Option<Extrema> {
        let interior = self.interior();
        Some(Extrema {
            min: interior.min()?,
            max: interior.max()?,
            halo_min: self.data.iter().copied().reduce(f64::min)?,
            halo_max: self.data.iter().copied().reduce(f64::max)?,
        })
    }
}
