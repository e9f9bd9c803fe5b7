//! Simplex cell types and their local sub-entity tables.
//!
//! Curved (Bezier) geometry is only carried on simplices, so the enum is
//! limited to the four simplex types. Local vertex numbering of edges and
//! faces follows the usual finite-element convention and defines the closure
//! ordering of control points (see [`crate::bezier::nodes`]).

use serde::{Deserialize, Serialize};

/// Simplex cell types.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum CellType {
    /// 0D vertex.
    #[default]
    Vertex,
    /// 1D segment/edge.
    Segment,
    /// 2D simplex (triangle).
    Triangle,
    /// 3D simplex (tet).
    Tetrahedron,
}

/// Local vertex pairs of triangle edges.
pub const TRI_EDGES: [[usize; 2]; 3] = [[0, 1], [1, 2], [2, 0]];
/// Local vertex pairs of tetrahedron edges.
pub const TET_EDGES: [[usize; 2]; 6] = [[0, 1], [1, 2], [2, 0], [0, 3], [1, 3], [2, 3]];
/// Local vertex triples of tetrahedron faces.
pub const TET_FACES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [1, 2, 3], [0, 2, 3]];

impl CellType {
    /// Simplex type of topological dimension `d`, if any.
    pub fn simplex(d: u8) -> Option<Self> {
        match d {
            0 => Some(CellType::Vertex),
            1 => Some(CellType::Segment),
            2 => Some(CellType::Triangle),
            3 => Some(CellType::Tetrahedron),
            _ => None,
        }
    }

    /// Topological dimension of the cell.
    pub fn dimension(self) -> u8 {
        match self {
            CellType::Vertex => 0,
            CellType::Segment => 1,
            CellType::Triangle => 2,
            CellType::Tetrahedron => 3,
        }
    }

    /// Number of vertices.
    pub fn vertex_count(self) -> usize {
        self.dimension() as usize + 1
    }

    /// Number of sub-entities of dimension `d` in the closure (the cell itself for `d == dim`).
    pub fn adjacent_count(self, d: u8) -> usize {
        let dim = self.dimension();
        if d > dim {
            return 0;
        }
        binomial(dim as usize + 1, d as usize + 1)
    }

    /// Local edges as pairs of local vertex indices.
    pub fn local_edges(self) -> &'static [[usize; 2]] {
        match self {
            CellType::Vertex => &[],
            CellType::Segment => &[[0, 1]],
            CellType::Triangle => &TRI_EDGES,
            CellType::Tetrahedron => &TET_EDGES,
        }
    }
}

pub(crate) fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}
