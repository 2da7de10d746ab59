use std::fmt;
use log::info;
use crate::adjacency::{BlockAdjacencyGraph, TreeLayout};
use crate::array::DenseArray;
use crate::block_array::{BlockArray, Extrema};
use crate::boundary::BoundaryConditions;
use crate::error::{Error, Result};
use crate::halo::{BoundaryContext, HaloFillEngine};
use crate::index_space::Axis;
use crate::snapshot::{Snapshot, INTEGER_RUNTIME_PARAMETERS, INTEGER_SCALARS, REAL_RUNTIME_PARAMETERS, SIM_INFO};
use super::{check_schema, time_key, Attribute, Extracted, RecordBody, SnapshotRecord};




/// Guard cells kept on each side of each block axis.
pub const GUARD_CELLS: usize = 1;

const ATTRIBUTES: [&str; 19] = [
    "blk_num", "blk_num_x", "blk_num_y", "blk_num_z",
    "blk_size_x", "blk_size_y", "blk_size_z", "blk_guards",
    "blk_coords", "blk_bndbox",
    "grd_type", "grd_dim", "grd_bndbox",
    "grd_mesh_x", "grd_mesh_y", "grd_mesh_z",
    "grd_mesh_ddx", "grd_mesh_ddy", "grd_mesh_ddz",
];




#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridType {
    Uniform,
    Regular,
    Paramesh,
}




// ============================================================================
impl GridType {


    /**
     * Determine the grid from the setup line recorded in a snapshot's sim
     * info table.
     */
    pub fn from_setup_call(call: &str) -> Result<Self> {
        if call.contains("+ug") {
            Ok(GridType::Uniform)
        } else if call.contains("+rg") {
            Ok(GridType::Regular)
        } else if call.contains("+pm4dev") {
            Ok(GridType::Paramesh)
        } else {
            Err(Error::UnsupportedGrid(call.trim_end().to_string()))
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GridType::Uniform => "uniform",
            GridType::Regular => "regular",
            GridType::Paramesh => "paramesh",
        }
    }

    pub fn layout(self) -> TreeLayout {
        match self {
            GridType::Paramesh => TreeLayout::Refined,
            _ => TreeLayout::Flat,
        }
    }
}

impl fmt::Display for GridType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}




#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stagger {
    Left,
    Center,
    Right,
}

impl Stagger {
    pub const ALL: [Stagger; 3] = [Stagger::Left, Stagger::Center, Stagger::Right];

    /// Position relative to the cell center, in cell widths.
    pub fn offset(self) -> f64 {
        match self {
            Stagger::Left => -0.5,
            Stagger::Center => 0.0,
            Stagger::Right => 0.5,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Stagger::Left => "l",
            Stagger::Center => "c",
            Stagger::Right => "r",
        }
    }
}




#[derive(Clone, Debug, PartialEq)]


/**
 * A mesh quantity (a coordinate or a metric along one axis) sampled at the
 * left faces, centers, and right faces of every cell.
 */
pub struct StaggeredMesh {
    pub left: BlockArray,
    pub center: BlockArray,
    pub right: BlockArray,
}

impl StaggeredMesh {
    pub fn get(&self, stagger: Stagger) -> &BlockArray {
        match stagger {
            Stagger::Left => &self.left,
            Stagger::Center => &self.center,
            Stagger::Right => &self.right,
        }
    }

    fn from_fn<F: Fn(Stagger) -> Result<BlockArray>>(f: F) -> Result<Self> {
        Ok(Self { left: f(Stagger::Left)?, center: f(Stagger::Center)?, right: f(Stagger::Right)? })
    }

    /// Interiors stacked as `(3, blocks, nz, ny, nx)`.
    pub fn interior(&self) -> DenseArray {
        let parts = Stagger::ALL.iter().map(|s| self.get(*s).interior()).collect();
        DenseArray::stack("mesh", parts).unwrap_or_default()
    }

    /// Halo-extended buffers stacked as `(3, blocks, nz + 2g, ny + 2g, nx + 2g)`.
    pub fn to_dense(&self) -> DenseArray {
        let parts = Stagger::ALL.iter().map(|s| self.get(*s).to_dense()).collect();
        DenseArray::stack("mesh", parts).unwrap_or_default()
    }

    pub fn extrema(&self) -> Option<[Extrema; 3]> {
        Some([self.left.extrema()?, self.center.extrema()?, self.right.extrema()?])
    }
}




#[derive(Clone, Debug, PartialEq)]


/**
 * The block layout and mesh of a run. Block counts and sizes are indexed
 * by axis number (x, y, z).
 */
pub struct Geometry {
    grid: GridType,
    dim: usize,
    blocks: usize,
    blocks_per_axis: [usize; 3],
    block_size: [usize; 3],
    guard: usize,
    coordinates: DenseArray,
    bounding_box: DenseArray,
    domain: DenseArray,
    tree: Vec<Vec<i64>>,
    refine_level: Option<Vec<i64>>,
    neighbors: BlockAdjacencyGraph,
    boundary: BoundaryConditions,
    mesh: [StaggeredMesh; 3],
    metric: [StaggeredMesh; 3],
}




// ============================================================================
impl Geometry {

    pub fn grid(&self) -> GridType {
        self.grid
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn blocks(&self) -> usize {
        self.blocks
    }

    pub fn blocks_per_axis(&self, axis: Axis) -> usize {
        self.blocks_per_axis[axis.number()]
    }

    pub fn block_size(&self, axis: Axis) -> usize {
        self.block_size[axis.number()]
    }

    /// Interior cell counts in storage order, `[nz, ny, nx]`.
    pub fn cells(&self) -> [usize; 3] {
        [self.block_size[2], self.block_size[1], self.block_size[0]]
    }

    pub fn guard(&self) -> usize {
        self.guard
    }

    pub fn coordinates(&self) -> &DenseArray {
        &self.coordinates
    }

    pub fn bounding_box(&self) -> &DenseArray {
        &self.bounding_box
    }

    pub fn domain(&self) -> &DenseArray {
        &self.domain
    }

    pub fn tree(&self) -> &[Vec<i64>] {
        &self.tree
    }

    pub fn neighbors(&self) -> &BlockAdjacencyGraph {
        &self.neighbors
    }

    pub fn boundary(&self) -> &BoundaryConditions {
        &self.boundary
    }

    pub fn mesh(&self, axis: Axis) -> &StaggeredMesh {
        &self.mesh[axis.number()]
    }

    pub fn metric(&self, axis: Axis) -> &StaggeredMesh {
        &self.metric[axis.number()]
    }

    pub fn centers(&self) -> [&BlockArray; 3] {
        [&self.mesh[0].center, &self.mesh[1].center, &self.mesh[2].center]
    }


    /**
     * The boundary conditions and cell-center coordinates needed to fill
     * the guard cells of fields on this geometry.
     */
    pub fn boundary_context(&self) -> BoundaryContext<'_> {
        BoundaryContext { conditions: &self.boundary, coordinates: Some(self.centers()) }
    }


    /**
     * Return the blocks with no children in the tree.
     */
    pub fn leaf_blocks(&self) -> Vec<usize> {
        let first_child = 2 * self.dim + 1;
        (0..self.blocks)
            .filter(|&b| self.tree[b].iter().skip(first_child).all(|&c| c < 0))
            .collect()
    }


    /**
     * Return the blocks at a refinement level. Without recorded levels
     * every block is at level one.
     */
    pub fn blocks_at_level(&self, level: i64) -> Vec<usize> {
        (0..self.blocks)
            .filter(|&b| match &self.refine_level {
                Some(levels) => levels.get(b) == Some(&level),
                None => level == 1,
            })
            .collect()
    }

    fn block_bounds(&self, block: usize, axis: Axis) -> (f64, f64) {
        let s = self.bounding_box.as_slice();
        let at = 6 * block + 2 * axis.number();
        (s[at], s[at + 1])
    }


    /**
     * Return the blocks cut by the plane normal to `axis` at `value`, taking
     * each block's extent as the half-open interval `low < value <= high`.
     */
    pub fn blocks_from_plane(&self, axis: Axis, value: f64) -> Vec<usize> {
        (0..self.blocks)
            .filter(|&b| {
                let (lo, hi) = self.block_bounds(b, axis);
                lo < value && value <= hi
            })
            .collect()
    }


    /**
     * Return the blocks cut by the line along which both planes hold.
     */
    pub fn blocks_from_line(&self, planes: [(Axis, f64); 2]) -> Vec<usize> {
        let [(a0, v0), (a1, v1)] = planes;
        let second = self.blocks_from_plane(a1, v1);
        self.blocks_from_plane(a0, v0).into_iter().filter(|b| second.contains(b)).collect()
    }
}




impl RecordBody for Geometry {
    const KIND: &'static str = "GeometryRecord";

    fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
        let int = |n: usize| Some(Attribute::Int(n as i64));
        let (halo, base) = match name.strip_prefix('_') {
            Some(base) => (true, base),
            None => (false, name),
        };
        match base {
            "grd_mesh_x" => mesh_attribute(&self.mesh[0], halo),
            "grd_mesh_y" => mesh_attribute(&self.mesh[1], halo),
            "grd_mesh_z" => mesh_attribute(&self.mesh[2], halo),
            "grd_mesh_ddx" => mesh_attribute(&self.metric[0], halo),
            "grd_mesh_ddy" => mesh_attribute(&self.metric[1], halo),
            "grd_mesh_ddz" => mesh_attribute(&self.metric[2], halo),
            _ if halo => None,
            "blk_num" => int(self.blocks),
            "blk_num_x" => int(self.blocks_per_axis[0]),
            "blk_num_y" => int(self.blocks_per_axis[1]),
            "blk_num_z" => int(self.blocks_per_axis[2]),
            "blk_size_x" => int(self.block_size[0]),
            "blk_size_y" => int(self.block_size[1]),
            "blk_size_z" => int(self.block_size[2]),
            "blk_guards" => int(2 * self.guard),
            "blk_coords" => Some(Attribute::Dense(&self.coordinates)),
            "blk_bndbox" => Some(Attribute::Dense(&self.bounding_box)),
            "grd_type" => Some(Attribute::Text(self.grid.name())),
            "grd_dim" => int(self.dim),
            "grd_bndbox" => Some(Attribute::Dense(&self.domain)),
            _ => None,
        }
    }
}

pub type GeometryRecord = SnapshotRecord<Geometry>;

fn mesh_attribute(mesh: &StaggeredMesh, halo: bool) -> Option<Attribute<'_>> {
    Some(if halo { Attribute::MeshHalo(mesh) } else { Attribute::Mesh(mesh) })
}




fn count(snapshot: &Snapshot, table: &str, needle: &str) -> Result<usize> {
    let value = snapshot.find_int(table, needle)?;
    usize::try_from(value).map_err(|_| Error::MissingField {
        context: format!("{} (non-negative integer)", table),
        name: needle.to_string(),
    })
}

fn counts(snapshot: &Snapshot, table: &str, needles: [&str; 3]) -> Result<[usize; 3]> {
    Ok([count(snapshot, table, needles[0])?, count(snapshot, table, needles[1])?, count(snapshot, table, needles[2])?])
}




// ============================================================================
impl SnapshotRecord<Geometry> {


    /**
     * Read the geometry of a run from one of its snapshots. Stretched
     * (`+rg`) grids take their mesh from the companion grid snapshot, which
     * is then required.
     */
    pub fn from_snapshot(snapshot: &Snapshot, grid_snapshot: Option<&Snapshot>) -> Result<Self> {
        let setup = snapshot
            .table(SIM_INFO)?
            .get("9")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::MissingField { context: SIM_INFO.to_string(), name: String::from("9") })?;
        let grid = GridType::from_setup_call(setup)?;
        let dim = count(snapshot, INTEGER_SCALARS, "dimensionality")?;
        let blocks = count(snapshot, INTEGER_SCALARS, "globalnumblocks")?;
        let block_size = counts(snapshot, INTEGER_SCALARS, ["nxb", "nyb", "nzb"])?;
        let blocks_per_axis = match grid {
            GridType::Paramesh => counts(snapshot, INTEGER_RUNTIME_PARAMETERS, ["nblockx", "nblocky", "nblockz"])?,
            _ => counts(snapshot, INTEGER_RUNTIME_PARAMETERS, ["iprocs", "jprocs", "kprocs"])?,
        };

        let mut domain = Vec::with_capacity(6);

        for axis in ["x", "y", "z"] {
            domain.push(snapshot.find_real(REAL_RUNTIME_PARAMETERS, &format!("{}min", axis))?);
            domain.push(snapshot.find_real(REAL_RUNTIME_PARAMETERS, &format!("{}max", axis))?);
        }
        let domain = DenseArray::new(vec![3, 2], domain)?;
        let coordinates = snapshot.dataset("coordinates")?.clone().named("coordinates").expect_shape(&[blocks, 3])?;
        let bounding_box = snapshot.dataset("bounding box")?.clone().named("bounding box").expect_shape(&[blocks, 3, 2])?;

        let tree = snapshot.tree()?.to_vec();

        if tree.len() != blocks {
            return Err(Error::InvalidTree(format!("{} tree entries for {} blocks", tree.len(), blocks)));
        }
        let neighbors = BlockAdjacencyGraph::from_tree(&tree, dim, grid.layout())?;
        let boundary = BoundaryConditions::from_snapshot(snapshot);
        let cells = [block_size[2], block_size[1], block_size[0]];

        let (mesh, metric) = match grid {
            GridType::Regular => {
                info!("reading {} mesh from grid snapshot", grid);
                let grid_snapshot = grid_snapshot.ok_or(Error::MissingGridFile)?;
                let engine = HaloFillEngine::new(&neighbors);
                let context = BoundaryContext { conditions: &boundary, coordinates: None };
                let read = |name: String| -> Result<BlockArray> {
                    let mut array = BlockArray::from_raw(&name, grid_snapshot.dataset(&name)?, cells, GUARD_CELLS, None)?;
                    engine.fill(&mut array, &name, &context)?;
                    Ok(array)
                };
                let mesh = [
                    StaggeredMesh::from_fn(|s| read(format!("xxx{}", s.suffix())))?,
                    StaggeredMesh::from_fn(|s| read(format!("yyy{}", s.suffix())))?,
                    StaggeredMesh::from_fn(|s| read(format!("zzz{}", s.suffix())))?,
                ];
                let metric = [
                    StaggeredMesh::from_fn(|s| read(format!("ddx{}", s.suffix())))?,
                    StaggeredMesh::from_fn(|s| read(format!("ddy{}", s.suffix())))?,
                    StaggeredMesh::from_fn(|s| read(format!("ddz{}", s.suffix())))?,
                ];
                (mesh, metric)
            }
            _ => {
                info!("building {} mesh", grid);
                let bounds = bounding_box.as_slice();
                let spacing = |b: usize, a: usize| (bounds[6 * b + 2 * a + 1] - bounds[6 * b + 2 * a]) / block_size[a] as f64;

                let coordinate = |a: usize| StaggeredMesh::from_fn(|s| {
                    Ok(BlockArray::from_function(blocks, cells, GUARD_CELLS, |b, index| {
                        let i = index[2 - a] as f64 - GUARD_CELLS as f64 + 0.5 + s.offset();
                        bounds[6 * b + 2 * a] + i * spacing(b, a)
                    }))
                });
                let inverse = |a: usize| StaggeredMesh::from_fn(|_| {
                    Ok(BlockArray::from_function(blocks, cells, GUARD_CELLS, |b, _| {
                        if a < dim { 1.0 / spacing(b, a) } else { 0.0 }
                    }))
                });
                ([coordinate(0)?, coordinate(1)?, coordinate(2)?], [inverse(0)?, inverse(1)?, inverse(2)?])
            }
        };

        let body = Geometry {
            grid,
            dim,
            blocks,
            blocks_per_axis,
            block_size,
            guard: GUARD_CELLS,
            coordinates,
            bounding_box,
            domain,
            tree,
            refine_level: snapshot.refine_level().map(<[i64]>::to_vec),
            neighbors,
            boundary,
            mesh,
            metric,
        };
        let names = ATTRIBUTES.iter().map(|s| s.to_string()).collect();
        check_schema(Extracted { key: time_key(snapshot), names: Some(names), body })
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::{GeometryRecord, GridType};
    use crate::adjacency::Face;
    use crate::error::Error;
    use crate::index_space::Axis;
    use crate::record::fixture;
    use crate::record::{Attribute, Record};

    #[test]
    fn grid_type_follows_setup_call() {
        assert_eq!(GridType::from_setup_call("./setup INS -auto +ug").unwrap(), GridType::Uniform);
        assert_eq!(GridType::from_setup_call("./setup INS +rg").unwrap(), GridType::Regular);
        assert_eq!(GridType::from_setup_call("./setup INS +pm4dev").unwrap(), GridType::Paramesh);
        assert!(matches!(GridType::from_setup_call("./setup INS"), Err(Error::UnsupportedGrid(_))));
    }

    #[test]
    fn uniform_geometry_reads_block_layout() {
        let geometry = GeometryRecord::from_snapshot(&fixture::snapshot("setup +ug", 1.0), None).unwrap();
        assert_eq!(geometry.attribute("blk_num"), Some(Attribute::Int(2)));
        assert_eq!(geometry.attribute("blk_num_x"), Some(Attribute::Int(2)));
        assert_eq!(geometry.attribute("blk_size_x"), Some(Attribute::Int(4)));
        assert_eq!(geometry.attribute("blk_guards"), Some(Attribute::Int(2)));
        assert_eq!(geometry.attribute("grd_type"), Some(Attribute::Text("uniform")));
        assert_eq!(geometry.cells(), [1, 2, 4]);
        assert_eq!(geometry.neighbors().same_level(0, Face::Right), Some(1));
        assert!(geometry.neighbors().is_boundary(1, Face::Right));
        assert_eq!(geometry.keys().len(), 19);
    }

    #[test]
    fn uniform_mesh_extends_into_guard_cells() {
        let geometry = GeometryRecord::from_snapshot(&fixture::snapshot("setup +ug", 1.0), None).unwrap();
        let x = geometry.mesh(Axis::X);
        assert_eq!(x.center.get(1, [1, 1, 1]), 1.125);
        assert_eq!(x.center.get(1, [1, 1, 0]), 0.875);
        assert_eq!(x.left.get(1, [1, 1, 1]), 1.0);
        assert_eq!(x.right.get(0, [1, 1, 4]), 1.0);
        assert_eq!(geometry.metric(Axis::X).center.get(0, [1, 1, 1]), 4.0);
        assert_eq!(geometry.metric(Axis::Z).center.get(0, [1, 1, 1]), 0.0);

        let interior = geometry.attribute("grd_mesh_x").and_then(|a| a.to_dense()).unwrap();
        let halo = geometry.attribute("_grd_mesh_x").and_then(|a| a.to_dense()).unwrap();
        assert_eq!(interior.shape(), &[3, 2, 1, 2, 4]);
        assert_eq!(halo.shape(), &[3, 2, 3, 4, 6]);
    }

    #[test]
    fn regular_geometry_requires_grid_snapshot() {
        let snapshot = fixture::snapshot("setup +rg", 1.0);
        assert!(matches!(GeometryRecord::from_snapshot(&snapshot, None), Err(Error::MissingGridFile)));
    }

    #[test]
    fn regular_geometry_fills_mesh_guards() {
        let grid = fixture::grid_snapshot();
        let geometry = GeometryRecord::from_snapshot(&fixture::snapshot("setup +rg", 1.0), Some(&grid)).unwrap();
        let x = &geometry.mesh(Axis::X).center;
        assert_eq!(x.get(1, [1, 1, 1]), 1.125);
        assert_eq!(x.get(0, [1, 1, 5]), 1.125);
        assert_eq!(x.get(1, [1, 1, 5]), 2.125);
        assert_eq!(geometry.metric(Axis::X).center.get(1, [1, 1, 5]), 4.0);
    }

    #[test]
    fn paramesh_tree_is_one_based() {
        let snapshot = fixture::snapshot("setup +pm4dev", 1.0)
            .with_tree(vec![
                vec![-21, 2, -21, -21, -1, -1, -1, -1, -1],
                vec![1, -21, -21, -21, -1, -1, -1, -1, -1],
            ])
            .with_refine_level(vec![1, 1]);
        let geometry = GeometryRecord::from_snapshot(&snapshot, None).unwrap();
        assert_eq!(geometry.neighbors().same_level(0, Face::Right), Some(1));
        assert_eq!(geometry.leaf_blocks(), vec![0, 1]);
        assert_eq!(geometry.blocks_at_level(1), vec![0, 1]);
        assert!(geometry.blocks_at_level(2).is_empty());
    }

    #[test]
    fn planes_cut_blocks_on_half_open_intervals() {
        let geometry = GeometryRecord::from_snapshot(&fixture::snapshot("setup +ug", 1.0), None).unwrap();
        assert_eq!(geometry.blocks_from_plane(Axis::X, 1.0), vec![0]);
        assert_eq!(geometry.blocks_from_plane(Axis::X, 1.5), vec![1]);
        assert!(geometry.blocks_from_plane(Axis::X, 0.0).is_empty());
        assert_eq!(geometry.blocks_from_line([(Axis::X, 1.5), (Axis::Y, 0.5)]), vec![1]);
    }
}
