//! Bernstein polynomials and the dense transformation matrices built from them.

use crate::bezier::nodes::{Barycentric, MultiIndex, NodeTable};
use crate::mesh_error::MeshCurveError;
use crate::topology::cell_type::CellType;
use crate::topology::mesh::Vector3;
use nalgebra::DMatrix;

fn factorial(n: usize) -> f64 {
    (1..=n).fold(1.0, |acc, k| acc * k as f64)
}

/// Bernstein polynomial `B_α^P(λ) = P!/∏α_i! ∏ λ_i^{α_i}`.
pub fn bernstein(alpha: &MultiIndex, p: usize, lambda: &Barycentric) -> f64 {
    let mut value = factorial(p);
    for (a, l) in alpha.iter().zip(lambda) {
        if *a > 0 {
            value *= l.powi(*a as i32) / factorial(*a);
        }
    }
    value
}

/// Node-to-Bezier basis matrix `A[i][j] = B_j(ξ_i)` of one simplex type.
///
/// Maps closure control points to positions at the interpolation points.
pub fn basis_matrix(table: &NodeTable) -> DMatrix<f64> {
    let n = table.len();
    DMatrix::from_fn(n, n, |i, j| {
        bernstein(
            &table.nodes()[j],
            table.order(),
            &table.interpolation_point(i),
        )
    })
}

/// Parent-to-child transformation matrix.
///
/// Row `i` holds the parent's Bernstein basis evaluated at the child's
/// interpolation point `i`, mapped into the parent frame through
/// `vertex_params` (the parent barycentric coordinate of each child vertex).
/// The result has `child.len()` rows and `parent.len()` columns.
pub fn parent_child_matrix(
    parent: &NodeTable,
    child: &NodeTable,
    vertex_params: &[Barycentric],
) -> DMatrix<f64> {
    let nv = child.cell_type().vertex_count();
    DMatrix::from_fn(child.len(), parent.len(), |i, j| {
        let local = child.interpolation_point(i);
        let mut lambda = [0.0; 4];
        for (m, vp) in vertex_params.iter().take(nv).enumerate() {
            for k in 0..4 {
                lambda[k] += local[m] * vp[k];
            }
        }
        bernstein(&parent.nodes()[j], parent.order(), &lambda)
    })
}

/// Invert a basis matrix with partial-pivot LU.
pub fn invert_with_plu(
    a: DMatrix<f64>,
    cell_type: CellType,
    order: usize,
) -> Result<DMatrix<f64>, MeshCurveError> {
    a.lu()
        .try_inverse()
        .ok_or(MeshCurveError::SingularBasisMatrix { cell_type, order })
}

/// Raise the degree of a Bezier curve by `r`.
///
/// `points` are the closure control points in curve order (first vertex,
/// interior points, last vertex); the result has `points.len() + r` entries.
pub fn elevate_bezier_curve(points: &[Vector3], r: usize) -> Vec<Vector3> {
    let mut current = points.to_vec();
    for _ in 0..r {
        let n = current.len() - 1;
        let mut next = Vec::with_capacity(current.len() + 1);
        next.push(current[0]);
        for i in 1..=n {
            let a = i as f64 / (n + 1) as f64;
            let mut q = [0.0; 3];
            for k in 0..3 {
                q[k] = a * current[i - 1][k] + (1.0 - a) * current[i][k];
            }
            next.push(q);
        }
        next.push(current[n]);
        current = next;
    }
    current
}
