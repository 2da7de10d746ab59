use core::ops::Range;
use log::{debug, warn};
use crate::adjacency::{BlockAdjacencyGraph, Face, Neighbor, Side};
use crate::block_array::BlockArray;
use crate::boundary::{stagger_of, BoundaryCondition, BoundaryConditions, FieldClass};
use crate::error::{Error, Result};
use crate::index_space::{Axis, IndexSpace};




/// A guard region of a block: for each of the x, y, z axes, the side it
/// extends past, or `None` where it spans the interior. Faces have one
/// side set, edges two, corners three.
type Region = [Option<Side>; 3];




/// Everything a physical boundary rule may need besides the field itself.
#[derive(Clone, Copy)]
pub struct BoundaryContext<'a> {
    pub conditions: &'a BoundaryConditions,
    /// Cell-center coordinates along x, y and z, used by gradient
    /// conditions to measure the distance between guard and mirror cells.
    pub coordinates: Option<[&'a BlockArray; 3]>,
}




#[derive(Clone, Copy, Debug, PartialEq)]
enum Rule {
    Zero,
    Mirror,
    NegativeMirror,
    Extrapolate,
    Repeat,
    Dirichlet(f64),
    Gradient(f64),
}




/**
 * Fills the guard cells of block arrays: first by copying interior data
 * from neighboring blocks, then by applying physical boundary conditions
 * where a face has no neighbor, and finally by averaging any edge or
 * corner region that no neighbor could supply.
 *
 * Every copy reads only interior cells of the source block, and interiors
 * are never written, so a single pass over faces, edges and corners (in
 * that order) reaches the final state.
 */
pub struct HaloFillEngine<'a> {
    graph: &'a BlockAdjacencyGraph,
}




// ============================================================================
impl<'a> HaloFillEngine<'a> {

    pub fn new(graph: &'a BlockAdjacencyGraph) -> Self {
        Self { graph }
    }


    /**
     * Run every phase on a freshly extracted field.
     */
    pub fn fill(&self, array: &mut BlockArray, name: &str, context: &BoundaryContext) -> Result<()> {
        self.fill_interior_guards(array)?;
        self.fill_physical_boundary(array, name, context)?;
        self.close_corners(array)
    }


    /**
     * Copy neighbor interiors into guard regions: all faces of all blocks,
     * then all edges, then (in 3D) all corners. Faces bordering a coarser
     * block are left as read.
     */
    pub fn fill_interior_guards(&self, array: &mut BlockArray) -> Result<()> {
        self.check(array)?;

        if array.guard() == 0 {
            return Ok(());
        }
        let dim = self.graph.dim();

        for rank in 1..=dim {
            let regions = regions(dim, rank);
            let mut copied = 0;

            for block in 0..array.blocks() {
                for region in &regions {
                    match self.source_block(block, region) {
                        Some(source) => {
                            let dst = guard_space(array, region);
                            let src = source_space(array, region);
                            array.copy_region(block, &dst, source, &src);
                            copied += 1;
                        }
                        None if rank == 1 => self.log_coarser(block, region),
                        None => {}
                    }
                }
            }
            debug!("copied {} guard regions of rank {}", copied, rank);
        }
        Ok(())
    }


    /**
     * Apply the boundary rule of the named field on every block face that
     * lies on the domain boundary. Only the face slab is written; edges and
     * corners are left to `close_corners`. A face-centered component keeps
     * its values on the boundary face itself, and only the layers beyond
     * it are written.
     */
    pub fn fill_physical_boundary(&self, array: &mut BlockArray, name: &str, context: &BoundaryContext) -> Result<()> {
        self.check(array)?;

        let class = match FieldClass::of(name) {
            Some(class) => class,
            None => {
                warn!("no boundary rule for field `{}`; boundary guard cells left as read", name);
                return Ok(());
            }
        };
        if array.guard() == 0 {
            return Ok(());
        }
        let stagger = stagger_of(name);

        for block in 0..array.blocks() {
            for &face in Face::faces(self.graph.dim()) {
                if self.graph.is_boundary(block, face) {
                    let rule = rule_for(class, face, name, context.conditions)?;
                    let on_face = stagger == Some(face.axis());
                    apply_rule(array, block, face, rule, on_face, context)?;
                }
            }
        }
        Ok(())
    }


    /**
     * Set every edge and corner region that has no diagonal neighbor to the
     * mean of the adjacent lower-rank guard cells, obtained by moving each
     * of its guard coordinates onto the nearest interior plane. Edges are
     * done before corners, so corners average already-closed edges.
     */
    pub fn close_corners(&self, array: &mut BlockArray) -> Result<()> {
        self.check(array)?;
        let dim = self.graph.dim();
        let extent = array.extent();
        let g = array.guard();

        if g == 0 {
            return Ok(());
        }
        for rank in 2..=dim {
            for block in 0..array.blocks() {
                for region in regions(dim, rank) {
                    if self.source_block(block, &region).is_some() {
                        continue;
                    }
                    let space = guard_space(array, &region);

                    for index in space.iter() {
                        let mut sum = 0.0;

                        for axis in active_axes(&region) {
                            let s = axis.storage();
                            let mut m = index;
                            m[s] = match region[axis.number()] {
                                Some(Side::Lower) => g,
                                _ => extent[s] - g - 1,
                            };
                            sum += array.get(block, m);
                        }
                        array.set(block, index, sum / rank as f64);
                    }
                }
            }
        }
        Ok(())
    }

    fn check(&self, array: &BlockArray) -> Result<()> {
        if array.blocks() != self.graph.len() {
            return Err(Error::GraphMismatch { found: array.blocks(), expected: self.graph.len() });
        }
        Ok(())
    }


    /**
     * Find the block whose interior supplies the given guard region, by
     * stepping across one face per active axis. Every stepping order is
     * tried, since a path may cross the domain boundary while another does
     * not.
     */
    fn source_block(&self, block: usize, region: &Region) -> Option<usize> {
        let axes = active_axes(region);

        orderings(&axes).into_iter().find_map(|order| {
            order.iter().try_fold(block, |b, axis| {
                let side = region[axis.number()]?;
                self.graph.same_level(b, Face::new(*axis, side))
            })
        })
    }

    fn log_coarser(&self, block: usize, region: &Region) {
        for axis in active_axes(region) {
            if let Some(side) = region[axis.number()] {
                let face = Face::new(axis, side);

                if let Some(Neighbor::Coarser { block: coarse, .. }) = self.graph.neighbor(block, face) {
                    debug!("block {} borders coarser block {} on its {} face; guards left as read", block, coarse, face);
                }
            }
        }
    }
}




fn regions(dim: usize, rank: usize) -> Vec<Region> {
    let choices = [None, Some(Side::Lower), Some(Side::Upper)];
    let mut regions = Vec::new();

    for z in choices {
        for y in choices {
            for x in choices {
                let region = [x, y, z];
                let within = (dim..3).all(|a| region[a].is_none());

                if within && region.iter().filter(|s| s.is_some()).count() == rank {
                    regions.push(region);
                }
            }
        }
    }
    regions
}

fn active_axes(region: &Region) -> Vec<Axis> {
    Axis::ALL.iter().copied().filter(|a| region[a.number()].is_some()).collect()
}

fn orderings(axes: &[Axis]) -> Vec<Vec<Axis>> {
    if axes.len() <= 1 {
        return vec![axes.to_vec()];
    }
    let mut orders = Vec::new();

    for (n, first) in axes.iter().enumerate() {
        let mut rest = axes.to_vec();
        rest.remove(n);

        for mut tail in orderings(&rest) {
            tail.insert(0, *first);
            orders.push(tail);
        }
    }
    orders
}

fn region_space<F>(array: &BlockArray, region: &Region, range: F) -> IndexSpace
where
    F: Fn(Option<Side>, usize, usize) -> Range<usize>
{
    let extent = array.extent();
    let g = array.guard();

    Axis::ALL.iter().fold(IndexSpace::of_shape(extent), |space, axis| {
        let ext = extent[axis.storage()];
        space.with_axis(*axis, range(region[axis.number()], ext, g))
    })
}


/**
 * The cells of a block covered by a guard region.
 */
fn guard_space(array: &BlockArray, region: &Region) -> IndexSpace {
    region_space(array, region, |side, ext, g| match side {
        None => g..ext - g,
        Some(Side::Lower) => 0..g,
        Some(Side::Upper) => ext - g..ext,
    })
}


/**
 * The interior cells of a neighbor that map onto a guard region: the
 * neighbor across a lower face supplies its upper interior layers, and
 * the reverse.
 */
fn source_space(array: &BlockArray, region: &Region) -> IndexSpace {
    region_space(array, region, |side, ext, g| match side {
        None => g..ext - g,
        Some(Side::Lower) => ext - 2 * g..ext - g,
        Some(Side::Upper) => g..2 * g,
    })
}

fn rule_for(class: FieldClass, face: Face, name: &str, conditions: &BoundaryConditions) -> Result<Rule> {
    let unsupported = |condition: &BoundaryCondition| Error::UnsupportedBoundary {
        field: name.to_string(),
        face: face.name(),
        condition: condition.to_string(),
    };

    match class {
        FieldClass::Velocity { normal } => match conditions.velocity.condition(face)? {
            BoundaryCondition::NoSlip | BoundaryCondition::MovingLid => Ok(Rule::Zero),
            BoundaryCondition::Slip if normal == face.axis() => Ok(Rule::Zero),
            BoundaryCondition::Slip => Ok(Rule::Mirror),
            BoundaryCondition::Neumann | BoundaryCondition::Outflow => Ok(Rule::Extrapolate),
            other => Err(unsupported(other)),
        },
        FieldClass::Pressure => match conditions.velocity.condition(face)? {
            BoundaryCondition::Dirichlet | BoundaryCondition::Outflow => Ok(Rule::NegativeMirror),
            BoundaryCondition::Neumann
            | BoundaryCondition::NoSlip
            | BoundaryCondition::Slip
            | BoundaryCondition::MovingLid => Ok(Rule::Mirror),
            other => Err(unsupported(other)),
        },
        FieldClass::Temperature => match conditions.temperature.condition(face)? {
            BoundaryCondition::Dirichlet => Ok(Rule::Dirichlet(conditions.temperature.value(face)?)),
            BoundaryCondition::Neumann => Ok(Rule::Gradient(conditions.temperature.value(face)?)),
            other => Err(unsupported(other)),
        },
        FieldClass::GridCoordinate => Ok(Rule::Extrapolate),
        FieldClass::GridMetric => Ok(Rule::Repeat),
    }
}


/**
 * Write the guard slab of one boundary face. The anchor is the plane
 * nearest the boundary that holds data: the first interior plane, or the
 * boundary face itself for a face-centered component normal to it
 * (`on_face`). Layer `d` lies `d` planes outward of the anchor and mirrors
 * the plane at the same distance inward of the boundary.
 */
fn apply_rule(array: &mut BlockArray, block: usize, face: Face, rule: Rule, on_face: bool, context: &BoundaryContext) -> Result<()> {
    let axis = face.axis();
    let s = axis.storage();
    let g = array.guard();
    let ext = array.extent()[s];
    let side = face.side();
    let shift = on_face as usize;
    let lo = g - shift;
    let hi = ext - g - 1;

    let (anchor, layers) = match side {
        Side::Lower => (lo, 0..lo),
        Side::Upper => (hi, hi + 1..ext),
    };
    let inward = |n: usize| match side {
        Side::Lower => (anchor + n).min(hi),
        Side::Upper => anchor.saturating_sub(n).max(lo),
    };
    let distance = |i: usize| match side {
        Side::Lower => anchor - i,
        Side::Upper => i - anchor,
    };
    let coordinates = match (rule, context.coordinates) {
        (Rule::Gradient(_), None) => {
            return Err(Error::MissingField {
                context: String::from("boundary context"),
                name: String::from("cell-center coordinates"),
            })
        }
        (_, coordinates) => coordinates.map(|c| c[axis.number()]),
    };
    let mut region: Region = [None; 3];
    region[axis.number()] = Some(side);
    let slab = guard_space(array, &region).with_axis(axis, layers);

    for index in slab.iter() {
        let d = distance(index[s]);
        let at = |plane: usize| {
            let mut m = index;
            m[s] = plane;
            m
        };
        let mirror = at(inward(d - 1 + shift));
        let p0 = array.get(block, at(anchor));
        let p1 = array.get(block, at(inward(1)));

        let value = match rule {
            Rule::Zero => 0.0,
            Rule::Mirror => array.get(block, mirror),
            Rule::NegativeMirror => -array.get(block, mirror),
            Rule::Extrapolate => p0 + d as f64 * (p0 - p1),
            Rule::Repeat => p0,
            Rule::Dirichlet(v) => 2.0 * v - array.get(block, mirror),
            Rule::Gradient(q) => {
                let spacing = coordinates.map_or(0.0, |c| (c.get(block, index) - c.get(block, mirror)).abs());
                array.get(block, mirror) + spacing * q
            }
        };
        array.set(block, index, value);
    }
    Ok(())
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::{BoundaryContext, HaloFillEngine};
    use crate::adjacency::{BlockAdjacencyGraph, Face, TreeLayout};
    use crate::array::DenseArray;
    use crate::block_array::BlockArray;
    use crate::boundary::{BoundaryCondition, BoundaryConditions, FaceConditions};
    use crate::error::Error;
    use crate::index_space::{range3d, Axis, IndexSpace};

    fn periodic_2x2() -> BlockAdjacencyGraph {
        let tree = vec![
            vec![1, 1, 2, 2],
            vec![0, 0, 3, 3],
            vec![3, 3, 0, 0],
            vec![2, 2, 1, 1],
        ];
        BlockAdjacencyGraph::from_tree(&tree, 2, TreeLayout::Flat).unwrap()
    }

    fn periodic_2x2x2() -> BlockAdjacencyGraph {
        let tree: Vec<Vec<i64>> = (0..8i64).map(|b| vec![b ^ 1, b ^ 1, b ^ 2, b ^ 2, b ^ 4, b ^ 4]).collect();
        BlockAdjacencyGraph::from_tree(&tree, 3, TreeLayout::Flat).unwrap()
    }

    fn labelled(blocks: usize, cells: [usize; 3], guard: usize) -> BlockArray {
        BlockArray::from_function(blocks, cells, guard, |b, [k, j, i]| (1 + b * 1000 + k * 100 + j * 10 + i) as f64)
    }

    fn all_faces(condition: BoundaryCondition, value: f64) -> FaceConditions {
        Face::ALL.iter().fold(FaceConditions::new(""), |c, face| c.with(*face, condition.clone(), Some(value)))
    }

    fn conditions(velocity: BoundaryCondition, temperature: BoundaryCondition, value: f64) -> BoundaryConditions {
        BoundaryConditions { velocity: all_faces(velocity, 0.0), temperature: all_faces(temperature, value) }
    }

    #[test]
    fn interior_guards_match_neighbor_interiors() {
        for guard in [1, 2] {
            let graph = periodic_2x2();
            let mut a = labelled(4, [1, 4, 4], guard);
            HaloFillEngine::new(&graph).fill_interior_guards(&mut a).unwrap();

            let g = guard;
            let e = 4 + 2 * g;
            let k = g..g + 1;

            for b in 0..4 {
                let right = graph.same_level(b, Face::Right).unwrap();
                let front = graph.same_level(b, Face::Front).unwrap();
                let left = graph.same_level(b, Face::Left).unwrap();
                let back = graph.same_level(b, Face::Back).unwrap();

                let checks = [
                    (range3d(k.clone(), g..e - g, e - g..e), right, range3d(k.clone(), g..e - g, g..2 * g)),
                    (range3d(k.clone(), g..e - g, 0..g), left, range3d(k.clone(), g..e - g, e - 2 * g..e - g)),
                    (range3d(k.clone(), e - g..e, g..e - g), front, range3d(k.clone(), g..2 * g, g..e - g)),
                    (range3d(k.clone(), 0..g, g..e - g), back, range3d(k.clone(), e - 2 * g..e - g, g..e - g)),
                ];
                for (dst, n, src) in checks.iter() {
                    for (d, s) in dst.iter().zip(src.iter()) {
                        assert_eq!(a.get(b, d), a.get(*n, s));
                    }
                }
                let diagonal = graph.same_level(right, Face::Front).unwrap();
                let corner = range3d(k.clone(), e - g..e, e - g..e);
                let source = range3d(k.clone(), g..2 * g, g..2 * g);
                for (d, s) in corner.iter().zip(source.iter()) {
                    assert_eq!(a.get(b, d), a.get(diagonal, s));
                }
            }
        }
    }

    #[test]
    fn periodic_3d_guards_match_their_owners() {
        let (n, g) = (3, 2);
        let graph = periodic_2x2x2();
        let wrap = |offset: usize, local: usize| ((offset * n + 2 * n + local - g) % (2 * n)) as f64;
        let global = |b: usize, [k, j, i]: [usize; 3]| {
            100.0 * wrap((b >> 2) & 1, k) + 10.0 * wrap((b >> 1) & 1, j) + wrap(b & 1, i)
        };
        let interior = IndexSpace::new(g..g + n, g..g + n, g..g + n);
        let mut a = BlockArray::from_function(8, [n, n, n], g, |b, index| {
            if interior.contains(index) { global(b, index) } else { -1.0 }
        });
        let bc = BoundaryConditions::default();
        let context = BoundaryContext { conditions: &bc, coordinates: None };
        HaloFillEngine::new(&graph).fill(&mut a, "dens", &context).unwrap();

        for b in 0..8 {
            for index in IndexSpace::of_shape(a.extent()).iter().filter(|i| !interior.contains(*i)) {
                assert_eq!(a.get(b, index), global(b, index), "block {} at {:?}", b, index);
            }
        }
    }

    #[test]
    fn corner_triples_average_their_edges() {
        let graph = BlockAdjacencyGraph::new(3, 1);
        let bc = conditions(BoundaryCondition::NoSlip, BoundaryCondition::Dirichlet, 1.0);
        let context = BoundaryContext { conditions: &bc, coordinates: None };
        let mut a = labelled(1, [2, 2, 2], 1);
        HaloFillEngine::new(&graph).fill(&mut a, "temp", &context).unwrap();

        let low = (a.get(0, [0, 0, 1]) + a.get(0, [0, 1, 0]) + a.get(0, [1, 0, 0])) / 3.0;
        let high = (a.get(0, [3, 3, 2]) + a.get(0, [3, 2, 3]) + a.get(0, [2, 3, 3])) / 3.0;
        assert_eq!(a.get(0, [0, 0, 0]), low);
        assert_eq!(a.get(0, [3, 3, 3]), high);
        assert_eq!(a.get(0, [0, 0, 1]), 0.5 * (a.get(0, [0, 1, 1]) + a.get(0, [1, 0, 1])));
    }

    #[test]
    fn staggered_boundary_faces_are_kept() {
        let graph = BlockAdjacencyGraph::new(1, 1);
        let raw = DenseArray::from_function(vec![1, 1, 1, 5], |i| 10.0 + (i[3] * i[3]) as f64);
        let engine = HaloFillEngine::new(&graph);

        let outflow = conditions(BoundaryCondition::Outflow, BoundaryCondition::Dirichlet, 0.0);
        let context = BoundaryContext { conditions: &outflow, coordinates: None };
        let mut u = BlockArray::from_raw("fcx2", &raw, [1, 1, 4], 2, Some(Axis::X)).unwrap();
        engine.fill(&mut u, "fcx2", &context).unwrap();
        let row: Vec<f64> = (0..8).map(|i| u.get(0, [2, 2, i])).collect();
        assert_eq!(row, vec![9.0, 10.0, 11.0, 14.0, 19.0, 26.0, 33.0, 40.0]);

        let noslip = conditions(BoundaryCondition::NoSlip, BoundaryCondition::Dirichlet, 0.0);
        let context = BoundaryContext { conditions: &noslip, coordinates: None };
        let mut u = BlockArray::from_raw("fcx2", &raw, [1, 1, 4], 1, Some(Axis::X)).unwrap();
        engine.fill(&mut u, "fcx2", &context).unwrap();
        let row: Vec<f64> = (0..6).map(|i| u.get(0, [1, 1, i])).collect();
        assert_eq!(row, vec![10.0, 11.0, 14.0, 19.0, 26.0, 0.0]);
    }

    #[test]
    fn dirichlet_scalar_reflects_about_the_boundary_value() {
        let graph = BlockAdjacencyGraph::new(2, 1);
        let bc = conditions(BoundaryCondition::NoSlip, BoundaryCondition::Dirichlet, 2.0);
        let context = BoundaryContext { conditions: &bc, coordinates: None };
        let mut a = labelled(1, [1, 3, 3], 1);
        HaloFillEngine::new(&graph).fill_physical_boundary(&mut a, "temp", &context).unwrap();

        for j in 1..4 {
            assert_eq!(a.get(0, [1, j, 4]), 2.0 * 2.0 - a.get(0, [1, j, 3]));
            assert_eq!(a.get(0, [1, j, 0]), 2.0 * 2.0 - a.get(0, [1, j, 1]));
        }
    }

    #[test]
    fn neumann_scalar_adds_gradient_times_spacing() {
        let graph = BlockAdjacencyGraph::new(1, 1);
        let bc = conditions(BoundaryCondition::NoSlip, BoundaryCondition::Neumann, 3.0);
        let x = BlockArray::from_function(1, [1, 1, 4], 1, |_, [_, _, i]| 0.5 * i as f64);
        let context = BoundaryContext { conditions: &bc, coordinates: Some([&x, &x, &x]) };
        let mut a = labelled(1, [1, 1, 4], 1);
        HaloFillEngine::new(&graph).fill_physical_boundary(&mut a, "temp", &context).unwrap();
        assert_eq!(a.get(0, [1, 1, 5]), a.get(0, [1, 1, 4]) + 0.5 * 3.0);
        assert_eq!(a.get(0, [1, 1, 0]), a.get(0, [1, 1, 1]) + 0.5 * 3.0);
    }

    #[test]
    fn slip_zeroes_normal_and_mirrors_tangential_velocity() {
        let graph = BlockAdjacencyGraph::new(2, 1);
        let bc = conditions(BoundaryCondition::Slip, BoundaryCondition::Dirichlet, 0.0);
        let context = BoundaryContext { conditions: &bc, coordinates: None };
        let engine = HaloFillEngine::new(&graph);

        let mut u = labelled(1, [1, 3, 3], 2);
        let mut v = u.clone();
        engine.fill_physical_boundary(&mut u, "fcx2", &context).unwrap();
        engine.fill_physical_boundary(&mut v, "fcy2", &context).unwrap();

        assert_eq!(u.get(0, [2, 3, 5]), 0.0);
        assert_eq!(u.get(0, [2, 3, 6]), 0.0);
        assert_eq!(v.get(0, [2, 3, 5]), v.get(0, [2, 3, 4]));
        assert_eq!(v.get(0, [2, 3, 6]), v.get(0, [2, 3, 3]));
        assert_eq!(v.get(0, [2, 0, 3]), 0.0);
    }

    #[test]
    fn grid_coordinates_extrapolate_and_metrics_repeat() {
        let graph = BlockAdjacencyGraph::new(1, 1);
        let bc = BoundaryConditions::default();
        let context = BoundaryContext { conditions: &bc, coordinates: None };
        let engine = HaloFillEngine::new(&graph);

        let mut x = BlockArray::from_function(1, [1, 1, 3], 2, |_, [_, _, i]| if (2..5).contains(&i) { i as f64 * 0.25 } else { -1.0 });
        engine.fill_physical_boundary(&mut x, "xxxc", &context).unwrap();
        let expected: Vec<f64> = (0..7).map(|i| i as f64 * 0.25).collect();
        let found: Vec<f64> = (0..7).map(|i| x.get(0, [2, 2, i])).collect();
        assert_eq!(found, expected);

        let mut ddx = BlockArray::from_function(1, [1, 1, 3], 2, |_, [_, _, i]| i as f64);
        engine.fill_physical_boundary(&mut ddx, "ddxc", &context).unwrap();
        assert_eq!(ddx.get(0, [2, 2, 6]), 4.0);
        assert_eq!(ddx.get(0, [2, 2, 0]), 2.0);
    }

    #[test]
    fn corners_on_the_boundary_are_averaged() {
        let graph = BlockAdjacencyGraph::new(2, 1);
        let bc = conditions(BoundaryCondition::NoSlip, BoundaryCondition::Dirichlet, 1.0);
        let context = BoundaryContext { conditions: &bc, coordinates: None };
        let mut a = labelled(1, [1, 2, 2], 1);
        HaloFillEngine::new(&graph).fill(&mut a, "temp", &context).unwrap();
        let expected = 0.5 * (a.get(0, [1, 3, 2]) + a.get(0, [1, 2, 3]));
        assert_eq!(a.get(0, [1, 3, 3]), expected);
    }

    #[test]
    fn corners_between_neighbor_and_boundary_are_averaged() {
        // two blocks side by side along x, bounded in y
        let tree = vec![vec![-1, 1, -1, -1], vec![0, -1, -1, -1]];
        let graph = BlockAdjacencyGraph::from_tree(&tree, 2, TreeLayout::Flat).unwrap();
        let bc = conditions(BoundaryCondition::NoSlip, BoundaryCondition::Dirichlet, 0.0);
        let context = BoundaryContext { conditions: &bc, coordinates: None };
        let mut a = labelled(2, [1, 2, 2], 1);
        HaloFillEngine::new(&graph).fill(&mut a, "temp", &context).unwrap();
        assert_eq!(a.get(0, [1, 1, 3]), a.get(1, [1, 1, 1]));
        assert_eq!(a.get(0, [1, 3, 3]), 0.5 * (a.get(0, [1, 3, 2]) + a.get(0, [1, 2, 3])));
    }

    #[test]
    fn unsupported_condition_on_a_boundary_is_an_error() {
        let graph = BlockAdjacencyGraph::new(2, 1);
        let bc = conditions(BoundaryCondition::Other(String::from("reflect")), BoundaryCondition::Dirichlet, 0.0);
        let context = BoundaryContext { conditions: &bc, coordinates: None };
        let mut a = labelled(1, [1, 2, 2], 1);
        let result = HaloFillEngine::new(&graph).fill_physical_boundary(&mut a, "fcx2", &context);
        assert!(matches!(result, Err(Error::UnsupportedBoundary { .. })));
    }

    #[test]
    fn missing_condition_on_a_boundary_is_an_error() {
        let graph = BlockAdjacencyGraph::new(2, 1);
        let bc = BoundaryConditions::default();
        let context = BoundaryContext { conditions: &bc, coordinates: None };
        let mut a = labelled(1, [1, 2, 2], 1);
        let result = HaloFillEngine::new(&graph).fill_physical_boundary(&mut a, "pres", &context);
        assert!(matches!(result, Err(Error::MissingBoundary { .. })));
    }

    #[test]
    fn unknown_fields_keep_their_guards() {
        let graph = BlockAdjacencyGraph::new(2, 1);
        let bc = BoundaryConditions::default();
        let context = BoundaryContext { conditions: &bc, coordinates: None };
        let mut a = labelled(1, [1, 2, 2], 1);
        let before = a.clone();
        HaloFillEngine::new(&graph).fill_physical_boundary(&mut a, "dens", &context).unwrap();
        assert_eq!(a, before);
    }

    #[test]
    fn mismatched_block_counts_are_rejected() {
        let graph = BlockAdjacencyGraph::new(2, 2);
        let mut a = labelled(1, [1, 2, 2], 1);
        assert!(matches!(HaloFillEngine::new(&graph).fill_interior_guards(&mut a), Err(Error::GraphMismatch { .. })));
    }
}
