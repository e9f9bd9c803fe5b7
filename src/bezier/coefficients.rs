//! Conversion coefficient tables.
//!
//! * **Boundary conversion** turns the positions of an entity at its
//!   interpolation points into Bezier control points. It is the block of the
//!   inverse basis matrix that produces the entity's own nodes.
//! * **Interior conversion** produces an entity's own control points from its
//!   boundary control points alone. Positions at the interpolation points are
//!   taken from a linear transfinite blend of the boundary (edges for a
//!   triangle; faces, edges and vertices for a tet) and then converted.
//!
//! Both tables are row-major `ni × m` matrices applied as
//! `own[i] = Σ_j c[(i, j)] · closure[j]`.

use crate::bezier::basis::bernstein;
use crate::bezier::nodes::{Barycentric, NodeTable, all_indices, embed};
use crate::topology::cell_type::{CellType, TET_FACES};
use nalgebra::DMatrix;

const BLEND_EPS: f64 = 1e-14;

/// Rows of the inverse basis matrix that produce the entity's own nodes.
pub fn boundary_conversion(table: &NodeTable, inverse: &DMatrix<f64>) -> DMatrix<f64> {
    let n = table.len();
    let ni = table.internal_count();
    inverse.rows(n - ni, ni).into_owned()
}

/// Interior conversion table, `ni × (n - ni)`, for triangles and tets.
pub fn interior_conversion(table: &NodeTable, inverse: &DMatrix<f64>) -> DMatrix<f64> {
    let n = table.len();
    let ni = table.internal_count();
    let nb = n - ni;
    let mut blend = DMatrix::zeros(n, nb);
    for i in 0..n {
        let w = blended_weights(table, &table.interpolation_point(i));
        for j in 0..nb {
            blend[(i, j)] = w[j];
        }
    }
    inverse.rows(nb, ni).into_owned() * blend
}

/// Weights of the closure control points in the linear transfinite blend of
/// the boundary at `lambda`.
///
/// Only boundary nodes receive weight. On the boundary the blend coincides
/// with the Bezier map itself.
pub fn blended_weights(table: &NodeTable, lambda: &Barycentric) -> Vec<f64> {
    let mut w = vec![0.0; table.len()];
    let p = table.order();
    match table.cell_type() {
        CellType::Triangle => {
            add_edges(table, lambda, 1.0, &mut w);
            add_vertices(table, lambda, -1.0, &mut w);
        }
        CellType::Tetrahedron => {
            let faces = all_indices(2, p);
            for face in &TET_FACES {
                let opposite = 6 - face[0] - face[1] - face[2];
                let s = 1.0 - lambda[opposite];
                if s <= BLEND_EPS {
                    continue;
                }
                let mu = [lambda[face[0]] / s, lambda[face[1]] / s, lambda[face[2]] / s, 0.0];
                for gamma in &faces {
                    if let Some(pos) = table.position(&embed(face, gamma)) {
                        w[pos] += s * bernstein(gamma, p, &mu);
                    }
                }
            }
            add_edges(table, lambda, -1.0, &mut w);
            add_vertices(table, lambda, 1.0, &mut w);
        }
        CellType::Vertex | CellType::Segment => {
            return table.weights(lambda);
        }
    }
    w
}

fn add_edges(table: &NodeTable, lambda: &Barycentric, sign: f64, w: &mut [f64]) {
    let p = table.order();
    let edge_nodes = all_indices(1, p);
    for local in table.cell_type().local_edges() {
        let s = lambda[local[0]] + lambda[local[1]];
        if s <= BLEND_EPS {
            continue;
        }
        let t = lambda[local[1]] / s;
        let mu = [1.0 - t, t, 0.0, 0.0];
        for gamma in &edge_nodes {
            if let Some(pos) = table.position(&embed(local, gamma)) {
                w[pos] += sign * s * bernstein(gamma, p, &mu);
            }
        }
    }
}

fn add_vertices(table: &NodeTable, lambda: &Barycentric, sign: f64, w: &mut [f64]) {
    let p = table.order();
    for v in 0..table.cell_type().vertex_count() {
        let mut alpha = [0usize; 4];
        alpha[v] = p;
        if let Some(pos) = table.position(&alpha) {
            w[pos] += sign * lambda[v];
        }
    }
}
