//! Transfinite (Coons) blend over the quadrilateral formed by two triangles.
//!
//! The quad is given by four vertices in traversal order and the four edges
//! joining consecutive vertices. Its parameter domain is `[0,1]²` with
//! vertex 0 at `(0,0)`, vertex 1 at `(1,0)`, vertex 2 at `(1,1)` and vertex 3
//! at `(0,1)`:
//!
//! ```text
//!   3 ---- e2 ---- 2
//!   |              |
//!  e3             e1
//!   |              |
//!   0 ---- e0 ---- 1
//! ```
//!
//! `x(ξ) = Σ_i w_i(ξ) e_i(t_i(ξ)) - Σ_i c_i(ξ) v_i`, with edge weights
//! `w = {1-ξ₁, ξ₀, ξ₁, 1-ξ₀}` and bilinear corner weights `c_i = w_{i-1} w_i`.

use crate::bezier::field::evaluate_edge;
use crate::bezier::nodes::NodeTable;
use crate::mesh_error::MeshCurveError;
use crate::topology::mesh::{CurvedMesh, Vector3};
use crate::topology::point::PointId;

/// A quad of four vertices and the edges between consecutive vertices.
///
/// `forward[i]` is true when edge `i` is stored from `verts[i]` to
/// `verts[(i+1)%4]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlendedQuad {
    pub verts: [PointId; 4],
    pub edges: [PointId; 4],
    pub forward: [bool; 4],
}

/// Edge weights `{1-ξ₁, ξ₀, ξ₁, 1-ξ₀}`.
pub fn edge_weights(xi: [f64; 2]) -> [f64; 4] {
    [1.0 - xi[1], xi[0], xi[1], 1.0 - xi[0]]
}

/// Bilinear corner weights.
pub fn corner_weights(xi: [f64; 2]) -> [f64; 4] {
    let e = edge_weights(xi);
    [e[3] * e[0], e[0] * e[1], e[1] * e[2], e[2] * e[3]]
}

/// Parameter of each edge at `xi`, measured from the edge's own first vertex.
pub fn edge_parameters(xi: [f64; 2], forward: [bool; 4]) -> [f64; 4] {
    let mut t = [xi[0], xi[1], 1.0 - xi[0], 1.0 - xi[1]];
    for (ti, fwd) in t.iter_mut().zip(forward) {
        if !fwd {
            *ti = 1.0 - *ti;
        }
    }
    t
}

/// Combine edge evaluations and corner positions into the Coons point.
pub fn coons_point(corners: &[Vector3; 4], edge_points: &[Vector3; 4], xi: [f64; 2]) -> Vector3 {
    let ew = edge_weights(xi);
    let cw = corner_weights(xi);
    let mut x = [0.0; 3];
    for i in 0..4 {
        for k in 0..3 {
            x[k] += edge_points[i][k] * ew[i] - corners[i][k] * cw[i];
        }
    }
    x
}

/// Evaluate the blend of `quad` at `xi ∈ [0,1]²` on the current mesh geometry.
pub fn evaluate_blended_quad<M: CurvedMesh + ?Sized>(
    mesh: &M,
    edge_table: &NodeTable,
    quad: &BlendedQuad,
    xi: [f64; 2],
) -> Result<Vector3, MeshCurveError> {
    let t = edge_parameters(xi, quad.forward);
    let mut corners = [[0.0; 3]; 4];
    let mut edge_points = [[0.0; 3]; 4];
    for i in 0..4 {
        corners[i] = mesh.position(quad.verts[i])?;
        edge_points[i] = evaluate_edge(mesh, edge_table, quad.edges[i], t[i])?;
    }
    Ok(coons_point(&corners, &edge_points, xi))
}
