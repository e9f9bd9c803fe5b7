//! Control-point lattices of Bezier simplices.
//!
//! A control point of a `d`-simplex at order `P` is identified by a
//! multi-index `α` over the simplex vertices with `|α| = P`. The matching
//! interpolation point is the barycentric point `α / P`.
//!
//! # Closure ordering
//! The control points of an element's closure are ordered as
//! 1. vertices, `P·e_i`;
//! 2. internal nodes of each local edge (see [`CellType::local_edges`]);
//! 3. internal nodes of each local face (tets only, [`TET_FACES`]);
//! 4. the element's own internal nodes.
//!
//! Within one sub-entity, internal nodes follow [`internal_indices`]. For an
//! edge this places node `j` at `(P-1-j, 1+j)`, i.e. parameter `(1+j)/P` from
//! its first vertex.

use crate::bezier::basis::bernstein;
use crate::topology::cell_type::{CellType, TET_FACES, binomial};
use crate::topology::mesh::Vector3;
use std::collections::HashMap;

/// Multi-index over at most four simplex vertices; unused slots are zero.
pub type MultiIndex = [usize; 4];

/// Barycentric coordinate over at most four simplex vertices.
pub type Barycentric = [f64; 4];

/// Every multi-index of a `d`-simplex at order `p`.
pub fn all_indices(d: u8, p: usize) -> Vec<MultiIndex> {
    let mut out = Vec::with_capacity(binomial(p + d as usize, d as usize));
    let mut alpha = [0usize; 4];
    fill_tail(d as usize, 1, p, 0, &mut alpha, &mut out);
    out
}

/// Multi-indices with every component at least one, i.e. the nodes owned by
/// the simplex itself rather than its boundary.
pub fn internal_indices(d: u8, p: usize) -> Vec<MultiIndex> {
    if d == 0 {
        return vec![[p, 0, 0, 0]];
    }
    let mut out = Vec::with_capacity(binomial(p.saturating_sub(1), d as usize));
    let mut alpha = [0usize; 4];
    fill_tail(d as usize, 1, p, 1, &mut alpha, &mut out);
    out
}

// Components 1..=d are chosen in increasing lexicographic order; component 0
// takes the remainder.
fn fill_tail(
    d: usize,
    slot: usize,
    p: usize,
    min: usize,
    alpha: &mut MultiIndex,
    out: &mut Vec<MultiIndex>,
) {
    let used: usize = alpha[1..slot].iter().sum();
    if slot > d {
        if p >= used && p - used >= min {
            let mut done = *alpha;
            done[0] = p - used;
            out.push(done);
        }
        return;
    }
    let remaining = d - slot;
    let mut value = min;
    while used + value + remaining * min + min <= p {
        alpha[slot] = value;
        fill_tail(d, slot + 1, p, min, alpha, out);
        value += 1;
    }
    alpha[slot] = 0;
}

/// Place a sub-simplex multi-index into the element frame.
///
/// `local` lists, for each sub-simplex vertex, its local index in the element.
pub fn embed(local: &[usize], beta: &MultiIndex) -> MultiIndex {
    let mut alpha = [0usize; 4];
    for (m, &l) in local.iter().enumerate() {
        alpha[l] += beta[m];
    }
    alpha
}

/// Closure multi-indices of `cell_type` at order `p`, in closure order.
pub fn closure_indices(cell_type: CellType, p: usize) -> Vec<MultiIndex> {
    let dim = cell_type.dimension();
    let mut out = Vec::new();
    for i in 0..cell_type.vertex_count() {
        let mut alpha = [0usize; 4];
        alpha[i] = p;
        out.push(alpha);
    }
    if dim == 0 {
        out.truncate(1);
        return out;
    }
    if dim > 1 {
        let edge = internal_indices(1, p);
        for local in cell_type.local_edges() {
            out.extend(edge.iter().map(|beta| embed(local, beta)));
        }
    }
    if dim > 2 {
        let face = internal_indices(2, p);
        for local in &TET_FACES {
            out.extend(face.iter().map(|beta| embed(local, beta)));
        }
    }
    out.extend(internal_indices(dim, p));
    out
}

/// Closure lattice of one simplex type at one order.
#[derive(Clone, Debug)]
pub struct NodeTable {
    cell_type: CellType,
    order: usize,
    nodes: Vec<MultiIndex>,
    lookup: HashMap<MultiIndex, usize>,
    internal: usize,
}

impl NodeTable {
    /// Builds the closure lattice of `cell_type` at `order`.
    pub fn new(cell_type: CellType, order: usize) -> Self {
        let nodes = closure_indices(cell_type, order);
        let lookup = nodes.iter().enumerate().map(|(i, a)| (*a, i)).collect();
        let internal = internal_indices(cell_type.dimension(), order).len();
        Self {
            cell_type,
            order,
            nodes,
            lookup,
            internal,
        }
    }

    #[inline]
    pub fn cell_type(&self) -> CellType {
        self.cell_type
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of closure control points.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of control points owned by the simplex itself (stored last).
    #[inline]
    pub fn internal_count(&self) -> usize {
        self.internal
    }

    /// Closure multi-indices in closure order.
    #[inline]
    pub fn nodes(&self) -> &[MultiIndex] {
        &self.nodes
    }

    /// Closure position of `alpha`.
    #[inline]
    pub fn position(&self, alpha: &MultiIndex) -> Option<usize> {
        self.lookup.get(alpha).copied()
    }

    /// Interpolation point (barycentric) of closure node `i`.
    pub fn interpolation_point(&self, i: usize) -> Barycentric {
        let p = self.order as f64;
        let alpha = self.nodes[i];
        [
            alpha[0] as f64 / p,
            alpha[1] as f64 / p,
            alpha[2] as f64 / p,
            alpha[3] as f64 / p,
        ]
    }

    /// Bernstein basis values at `lambda`, one per closure node.
    pub fn weights(&self, lambda: &Barycentric) -> Vec<f64> {
        self.nodes
            .iter()
            .map(|alpha| bernstein(alpha, self.order, lambda))
            .collect()
    }

    /// Evaluate the Bezier map with closure control points `points` at `lambda`.
    pub fn evaluate(&self, points: &[Vector3], lambda: &Barycentric) -> Vector3 {
        let mut x = [0.0; 3];
        for (alpha, cp) in self.nodes.iter().zip(points) {
            let b = bernstein(alpha, self.order, lambda);
            for k in 0..3 {
                x[k] += b * cp[k];
            }
        }
        x
    }

    /// Columns `∂x/∂ξ_k`, `k = 1..=dim`, of the Bezier map at `lambda`.
    ///
    /// Uses `∂x/∂ξ_k = P Σ_{|β|=P-1} B_β (X[β+e_k] - X[β+e_0])`. Unused
    /// columns are zero.
    pub fn jacobian(&self, points: &[Vector3], lambda: &Barycentric) -> [Vector3; 3] {
        let mut cols = [[0.0; 3]; 3];
        let dim = self.cell_type.dimension();
        if dim == 0 || self.order == 0 {
            return cols;
        }
        let p = self.order;
        for beta in all_indices(dim, p - 1) {
            let b = bernstein(&beta, p - 1, lambda) * p as f64;
            if b == 0.0 {
                continue;
            }
            let mut base = beta;
            base[0] += 1;
            let x0 = points[self.lookup[&base]];
            for k in 1..=dim as usize {
                let mut up = beta;
                up[k] += 1;
                let xk = points[self.lookup[&up]];
                for c in 0..3 {
                    cols[k - 1][c] += b * (xk[c] - x0[c]);
                }
            }
        }
        cols
    }
}
