use std::collections::BTreeMap;
use std::fmt;
use crate::error::{Error, Result};
use crate::index_space::Axis;




#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Lower,
    Upper,
}




#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]


/**
 * One of the six faces of a block. Variants are declared in tree slot
 * order: x-, x+, y-, y+, z-, z+.
 */
pub enum Face {
    Left,
    Right,
    Back,
    Front,
    Down,
    Up,
}




// ============================================================================
impl Face {

    pub const ALL: [Face; 6] = [Face::Left, Face::Right, Face::Back, Face::Front, Face::Down, Face::Up];

    pub fn new(axis: Axis, side: Side) -> Self {
        Self::ALL[2 * axis.number() + if side == Side::Upper { 1 } else { 0 }]
    }


    /**
     * Return the faces that exist in a grid of the given dimensionality.
     */
    pub fn faces(dim: usize) -> &'static [Face] {
        &Self::ALL[..2 * dim.min(3)]
    }

    pub fn slot(self) -> usize {
        self as usize
    }

    pub fn axis(self) -> Axis {
        Axis::ALL[self.slot() / 2]
    }

    pub fn side(self) -> Side {
        if self.slot() % 2 == 0 { Side::Lower } else { Side::Upper }
    }

    pub fn opposite(self) -> Self {
        Self::ALL[self.slot() ^ 1]
    }

    pub fn name(self) -> &'static str {
        match self {
            Face::Left => "left",
            Face::Right => "right",
            Face::Back => "back",
            Face::Front => "front",
            Face::Down => "down",
            Face::Up => "up",
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}




#[derive(Clone, Copy, Debug, PartialEq, Eq)]


/**
 * What lies across a face that is not a domain boundary.
 */
pub enum Neighbor {
    /// A block at the same refinement level.
    Block(usize),
    /// A block at a coarser level, found through the same face of `parent`.
    Coarser { parent: usize, block: usize },
}

impl Neighbor {
    pub fn same_level(self) -> Option<usize> {
        match self {
            Neighbor::Block(b) => Some(b),
            Neighbor::Coarser { .. } => None,
        }
    }
}




#[derive(Clone, Copy, Debug, PartialEq, Eq)]


/**
 * How neighbor ids are encoded in a raw tree table.
 */
pub enum TreeLayout {
    /// Zero-based ids; any negative value marks a domain boundary.
    Flat,
    /// One-based ids; `-1` means the neighbor is coarser and is found
    /// through the parent (slot `2 * dim`), other negatives are boundaries.
    Refined,
}




#[derive(Clone, Debug, PartialEq)]


/**
 * Face-keyed adjacency for every block of a snapshot. A face with no entry
 * lies on the physical domain boundary.
 */
pub struct BlockAdjacencyGraph {
    dim: usize,
    neighbors: Vec<[Option<Neighbor>; 6]>,
}




// ============================================================================
impl BlockAdjacencyGraph {


    /**
     * Return a graph of `blocks` blocks, each bounded on every face.
     */
    pub fn new(dim: usize, blocks: usize) -> Self {
        Self { dim: dim.clamp(1, 3), neighbors: vec![[None; 6]; blocks] }
    }


    /**
     * Build the graph from a raw tree table holding one row per block. Only
     * the first `2 * dim` slots of each row are read as face neighbors.
     */
    pub fn from_tree(tree: &[Vec<i64>], dim: usize, layout: TreeLayout) -> Result<Self> {
        if !(1..=3).contains(&dim) {
            return Err(Error::InvalidTree(format!("dimensionality {} is not 1, 2 or 3", dim)));
        }
        let width = 2 * dim + if layout == TreeLayout::Refined { 1 } else { 0 };

        if let Some((b, row)) = tree.iter().enumerate().find(|(_, row)| row.len() < width) {
            return Err(Error::InvalidTree(format!("block {} has {} entries, expected at least {}", b, row.len(), width)));
        }
        let mut graph = Self::new(dim, tree.len());

        for b in 0..tree.len() {
            for &face in Face::faces(dim) {
                graph.neighbors[b][face.slot()] = match layout {
                    TreeLayout::Flat => resolve_flat(tree, b, face)?,
                    TreeLayout::Refined => resolve_refined(tree, b, face, dim)?,
                };
            }
        }
        Ok(graph)
    }

    pub fn insert(&mut self, block: usize, face: Face, neighbor: Neighbor) {
        self.neighbors[block][face.slot()] = Some(neighbor);
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn neighbor(&self, block: usize, face: Face) -> Option<Neighbor> {
        self.neighbors.get(block).and_then(|faces| faces[face.slot()])
    }

    pub fn same_level(&self, block: usize, face: Face) -> Option<usize> {
        self.neighbor(block, face).and_then(Neighbor::same_level)
    }

    pub fn is_boundary(&self, block: usize, face: Face) -> bool {
        self.neighbor(block, face).is_none()
    }


    /**
     * Iterate over the faces of a block that have a neighbor.
     */
    pub fn faces(&self, block: usize) -> impl Iterator<Item = (Face, Neighbor)> + '_ {
        Face::faces(self.dim)
            .iter()
            .filter_map(move |&face| self.neighbor(block, face).map(|n| (face, n)))
    }


    /**
     * Return the adjacency of one block as a map from face name to neighbor.
     */
    pub fn entry(&self, block: usize) -> BTreeMap<&'static str, Neighbor> {
        self.faces(block).map(|(face, n)| (face.name(), n)).collect()
    }
}




fn checked_id(tree: &[Vec<i64>], id: i64) -> Result<usize> {
    if id < 0 || id as usize >= tree.len() {
        Err(Error::InvalidTree(format!("neighbor id {} out of range for {} blocks", id, tree.len())))
    } else {
        Ok(id as usize)
    }
}

fn resolve_flat(tree: &[Vec<i64>], block: usize, face: Face) -> Result<Option<Neighbor>> {
    match tree[block][face.slot()] {
        id if id >= 0 => Ok(Some(Neighbor::Block(checked_id(tree, id)?))),
        _ => Ok(None),
    }
}

fn resolve_refined(tree: &[Vec<i64>], block: usize, face: Face, dim: usize) -> Result<Option<Neighbor>> {
    match tree[block][face.slot()] {
        id if id >= 1 => return Ok(Some(Neighbor::Block(checked_id(tree, id - 1)?))),
        -1 => {}
        _ => return Ok(None),
    }
    let mut current = block;

    for _ in 0..tree.len() {
        let parent = match tree[current][2 * dim] {
            p if p >= 1 => checked_id(tree, p - 1)?,
            _ => return Ok(None),
        };
        let row = tree.get(parent).filter(|row| row.len() > 2 * dim).ok_or_else(|| {
            Error::InvalidTree(format!("parent {} of block {} has no tree entry", parent, current))
        })?;
        match row[face.slot()] {
            id if id >= 1 => return Ok(Some(Neighbor::Coarser { parent, block: checked_id(tree, id - 1)? })),
            -1 => current = parent,
            _ => return Ok(None),
        }
    }
    Err(Error::InvalidTree(format!("parent chain of block {} does not terminate", block)))
}
