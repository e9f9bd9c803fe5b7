//! The mesh capabilities the curved-geometry engine consumes.
//!
//! The engine never owns topology. It reads adjacency, types and model
//! classification through [`CurvedMesh`] and writes control points back
//! through [`CurvedMesh::set_point`]. Any mesh database can host the engine by
//! implementing this trait; [`crate::topology::in_memory::InMemoryCurvedMesh`]
//! is a small hash-map backed implementation.
//!
//! # Control point storage
//! Each entity stores only its *own* control points: a vertex stores one point
//! (its position), an edge `P - 1`, a triangle `(P-1)(P-2)/2` and a tet
//! `(P-1)(P-2)(P-3)/6`, ordered as [`crate::bezier::nodes::internal_indices`]
//! with multi-indices taken over the entity's own vertex order.

use crate::bezier::shape::BezierShape;
use crate::mesh_error::MeshCurveError;
use crate::topology::cell_type::CellType;
use crate::topology::point::PointId;
use smallvec::SmallVec;

/// Bounded downward adjacency (a tet has at most six edges).
pub type Downward = SmallVec<[PointId; 6]>;

/// A coordinate in 3-space.
pub type Vector3 = [f64; 3];

/// Mesh capabilities required by the shape handler.
pub trait CurvedMesh {
    /// Topological dimension of the mesh (2 or 3).
    fn dimension(&self) -> u8;

    /// Field shape of the coordinate field (carries the polynomial order).
    fn shape(&self) -> BezierShape;

    /// Type of entity `e`.
    fn cell_type(&self, e: PointId) -> Result<CellType, MeshCurveError>;

    /// Closure entities of `e` with dimension `dim`, in local order.
    ///
    /// For `dim == 0` the order is the entity's vertex order, which defines its
    /// reference frame. Asking for `dim` equal to the entity's own dimension
    /// returns the entity itself.
    fn downward(&self, e: PointId, dim: u8) -> Result<Downward, MeshCurveError>;

    /// Entities one dimension above `e` that contain it.
    fn upward(&self, e: PointId) -> Result<Vec<PointId>, MeshCurveError>;

    /// Dimension of the geometric model entity `e` is classified on.
    ///
    /// Entities with a model dimension below [`CurvedMesh::dimension`] lie on
    /// the domain boundary.
    fn model_dimension(&self, e: PointId) -> Result<u8, MeshCurveError>;

    /// Control point `node` of `e`.
    fn point(&self, e: PointId, node: usize) -> Result<Vector3, MeshCurveError>;

    /// Overwrite control point `node` of `e`.
    fn set_point(&mut self, e: PointId, node: usize, x: Vector3) -> Result<(), MeshCurveError>;

    /// Position on the true boundary geometry for parameter `t ∈ [0,1]` along
    /// boundary edge `edge`, measured from its first vertex.
    fn snap_to_boundary(&self, edge: PointId, t: f64) -> Result<Vector3, MeshCurveError>;

    /// Whether `e` is a boundary entity (classified below the mesh dimension).
    fn is_on_boundary(&self, e: PointId) -> Result<bool, MeshCurveError> {
        Ok(self.model_dimension(e)? < self.dimension())
    }

    /// Position of vertex `v`.
    fn position(&self, v: PointId) -> Result<Vector3, MeshCurveError> {
        self.point(v, 0)
    }
}

/// Whether `v` is a vertex of `e`.
pub fn is_in_closure<M: CurvedMesh + ?Sized>(
    mesh: &M,
    e: PointId,
    v: PointId,
) -> Result<bool, MeshCurveError> {
    Ok(mesh.downward(e, 0)?.contains(&v))
}

/// The edge of triangle `tri` that does not touch vertex `v`.
pub fn tri_edge_opposite_vert<M: CurvedMesh + ?Sized>(
    mesh: &M,
    tri: PointId,
    v: PointId,
) -> Result<PointId, MeshCurveError> {
    if is_in_closure(mesh, tri, v)? {
        for edge in mesh.downward(tri, 1)? {
            if !mesh.downward(edge, 0)?.contains(&v) {
                return Ok(edge);
            }
        }
    }
    Err(MeshCurveError::VertexNotInClosure {
        entity: tri,
        vertex: v,
    })
}

/// The vertex of triangle `tri` that is not on edge `edge`.
pub fn tri_vert_opposite_edge<M: CurvedMesh + ?Sized>(
    mesh: &M,
    tri: PointId,
    edge: PointId,
) -> Result<PointId, MeshCurveError> {
    let edge_verts = mesh.downward(edge, 0)?;
    let [v0, v1] = edge_pair(edge, &edge_verts)?;
    let tri_verts = mesh.downward(tri, 0)?;
    let not_in_tri = MeshCurveError::EdgeNotInTriangle {
        triangle: tri,
        v0,
        v1,
    };
    if !tri_verts.contains(&v0) || !tri_verts.contains(&v1) {
        return Err(not_in_tri);
    }
    tri_verts
        .into_iter()
        .find(|v| *v != v0 && *v != v1)
        .ok_or(not_in_tri)
}

/// The two vertices of an edge, checked for count.
pub fn edge_pair(edge: PointId, verts: &[PointId]) -> Result<[PointId; 2], MeshCurveError> {
    match verts {
        [a, b] => Ok([*a, *b]),
        _ => Err(MeshCurveError::DownwardMismatch {
            entity: edge,
            dimension: 0,
            expected: 2,
            found: verts.len(),
        }),
    }
}
