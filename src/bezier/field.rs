//! Reading and writing Bezier control points through a [`CurvedMesh`].

use crate::bezier::basis::elevate_bezier_curve;
use crate::bezier::nodes::{Barycentric, NodeTable, embed, internal_indices};
use crate::mesh_error::MeshCurveError;
use crate::topology::cell_type::CellType;
use crate::topology::mesh::{CurvedMesh, Vector3, edge_pair};
use crate::topology::point::PointId;
use nalgebra::DMatrix;

/// Closure control points of `e`, in the closure order of `table`.
///
/// Sub-entity nodes are placed by matching the sub-entity's vertices against
/// the element's, so edges and faces may be stored in any orientation.
pub fn closure_points<M: CurvedMesh + ?Sized>(
    mesh: &M,
    table: &NodeTable,
    e: PointId,
) -> Result<Vec<Vector3>, MeshCurveError> {
    let cell_type = table.cell_type();
    let dim = cell_type.dimension();
    let p = table.order();
    let verts = mesh.downward(e, 0)?;
    if verts.len() != cell_type.vertex_count() {
        return Err(MeshCurveError::DownwardMismatch {
            entity: e,
            dimension: 0,
            expected: cell_type.vertex_count(),
            found: verts.len(),
        });
    }
    let mut out = vec![[0.0; 3]; table.len()];
    for (i, v) in verts.iter().enumerate() {
        let mut alpha = [0usize; 4];
        alpha[i] = p;
        out[slot(table, e, &alpha)?] = mesh.position(*v)?;
    }
    for k in 1..dim {
        let own = internal_indices(k, p);
        if own.is_empty() {
            continue;
        }
        for sub in mesh.downward(e, k)? {
            let local = local_vertices(mesh, e, &verts, sub)?;
            for (j, gamma) in own.iter().enumerate() {
                let alpha = embed(&local, gamma);
                out[slot(table, e, &alpha)?] = mesh.point(sub, j)?;
            }
        }
    }
    if dim > 0 {
        for (j, alpha) in internal_indices(dim, p).iter().enumerate() {
            out[slot(table, e, alpha)?] = mesh.point(e, j)?;
        }
    }
    Ok(out)
}

fn slot(table: &NodeTable, e: PointId, alpha: &[usize; 4]) -> Result<usize, MeshCurveError> {
    table
        .position(alpha)
        .ok_or(MeshCurveError::NodeIndexOutOfRange {
            entity: e,
            node: alpha.iter().sum(),
            count: table.len(),
        })
}

fn local_vertices<M: CurvedMesh + ?Sized>(
    mesh: &M,
    e: PointId,
    elem_verts: &[PointId],
    sub: PointId,
) -> Result<Vec<usize>, MeshCurveError> {
    mesh.downward(sub, 0)?
        .iter()
        .map(|v| {
            elem_verts
                .iter()
                .position(|w| w == v)
                .ok_or(MeshCurveError::VertexNotInClosure {
                    entity: e,
                    vertex: *v,
                })
        })
        .collect()
}

/// Evaluate the curved geometry of `e` at the barycentric point `lambda`.
pub fn evaluate<M: CurvedMesh + ?Sized>(
    mesh: &M,
    table: &NodeTable,
    e: PointId,
    lambda: &Barycentric,
) -> Result<Vector3, MeshCurveError> {
    let points = closure_points(mesh, table, e)?;
    Ok(table.evaluate(&points, lambda))
}

/// Evaluate edge `edge` at parameter `t ∈ [0,1]` from its first vertex.
pub fn evaluate_edge<M: CurvedMesh + ?Sized>(
    mesh: &M,
    table: &NodeTable,
    edge: PointId,
    t: f64,
) -> Result<Vector3, MeshCurveError> {
    evaluate(mesh, table, edge, &[1.0 - t, t, 0.0, 0.0])
}

/// Overwrite the own control points of `e` with zero.
pub fn zero_points<M: CurvedMesh + ?Sized>(
    mesh: &mut M,
    e: PointId,
    ni: usize,
) -> Result<(), MeshCurveError> {
    for j in 0..ni {
        mesh.set_point(e, j, [0.0; 3])?;
    }
    Ok(())
}

/// Straight-line control points: node `j` at `t = (1+j)/(1+ni)` along the chord.
pub fn set_linear_edge_points<M: CurvedMesh + ?Sized>(
    mesh: &mut M,
    edge: PointId,
) -> Result<(), MeshCurveError> {
    let ni = mesh.shape().count_nodes_on(CellType::Segment);
    let verts = mesh.downward(edge, 0)?;
    let [v0, v1] = edge_pair(edge, &verts)?;
    let a = mesh.position(v0)?;
    let b = mesh.position(v1)?;
    for j in 0..ni {
        let t = (1.0 + j as f64) / (1.0 + ni as f64);
        mesh.set_point(edge, j, lerp(a, b, t))?;
    }
    Ok(())
}

/// Replace the own nodes of `e` by `c · closure[..c.ncols()]`.
///
/// With the boundary conversion table this turns interpolation-point positions
/// into control points; with the interior table it derives interior control
/// points from the boundary alone.
pub fn convert_interpolation_points<M: CurvedMesh + ?Sized>(
    mesh: &mut M,
    table: &NodeTable,
    e: PointId,
    c: &DMatrix<f64>,
) -> Result<(), MeshCurveError> {
    let closure = closure_points(mesh, table, e)?;
    let converted: Vec<Vector3> = (0..c.nrows())
        .map(|i| {
            let mut x = [0.0; 3];
            for (j, cp) in closure.iter().take(c.ncols()).enumerate() {
                for k in 0..3 {
                    x[k] += c[(i, j)] * cp[k];
                }
            }
            x
        })
        .collect();
    for (j, x) in converted.into_iter().enumerate() {
        mesh.set_point(e, j, x)?;
    }
    Ok(())
}

/// Elevate the first `from - 1` control points of `edge` (a degree-`from`
/// curve) to the degree of the mesh and store all of them.
pub fn elevate_edge<M: CurvedMesh + ?Sized>(
    mesh: &mut M,
    edge: PointId,
    from: usize,
) -> Result<(), MeshCurveError> {
    let to = mesh.shape().order();
    if to <= from {
        return Ok(());
    }
    let verts = mesh.downward(edge, 0)?;
    let [v0, v1] = edge_pair(edge, &verts)?;
    let mut curve = Vec::with_capacity(from + 1);
    curve.push(mesh.position(v0)?);
    for j in 0..from - 1 {
        curve.push(mesh.point(edge, j)?);
    }
    curve.push(mesh.position(v1)?);
    let elevated = elevate_bezier_curve(&curve, to - from);
    for (j, x) in elevated[1..to].iter().enumerate() {
        mesh.set_point(edge, j, *x)?;
    }
    Ok(())
}

pub(crate) fn lerp(a: Vector3, b: Vector3, t: f64) -> Vector3 {
    [
        a[0] * (1.0 - t) + b[0] * t,
        a[1] * (1.0 - t) + b[1] * t,
        a[2] * (1.0 - t) + b[2] * t,
    ]
}
