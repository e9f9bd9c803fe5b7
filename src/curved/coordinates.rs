//! Child-vertex coordinates in the reference simplex of a refined parent.

use crate::bezier::nodes::Barycentric;
use crate::mesh_error::MeshCurveError;
use crate::topology::mesh::{CurvedMesh, Downward, edge_pair};
use crate::topology::point::PointId;
use crate::topology::refine::RefinementContext;
use smallvec::SmallVec;

/// Reference frame of a refined parent: its vertices and the split vertices
/// recorded on its edges, each with a barycentric coordinate in the parent.
#[derive(Clone, Debug)]
pub struct ParentFrame {
    parent: PointId,
    vertices: Downward,
    splits: SmallVec<[(PointId, Barycentric); 6]>,
}

impl ParentFrame {
    pub fn new<M: CurvedMesh + ?Sized>(
        mesh: &M,
        refine: &RefinementContext,
        parent: PointId,
    ) -> Result<Self, MeshCurveError> {
        let vertices = mesh.downward(parent, 0)?;
        let mut splits = SmallVec::new();
        if mesh.cell_type(parent)?.dimension() >= 1 {
            for edge in mesh.downward(parent, 1)? {
                let Some(mid) = refine.split_vertex(edge) else {
                    continue;
                };
                let [a, b] = edge_pair(edge, &mesh.downward(edge, 0)?)?;
                let mut lambda = [0.0; 4];
                for v in [a, b] {
                    let i = vertices.iter().position(|w| *w == v).ok_or(
                        MeshCurveError::VertexNotInClosure {
                            entity: parent,
                            vertex: v,
                        },
                    )?;
                    lambda[i] += 0.5;
                }
                splits.push((mid, lambda));
            }
        }
        Ok(Self {
            parent,
            vertices,
            splits,
        })
    }

    /// Barycentric coordinate of vertex `v` of `child` in the parent.
    pub fn vertex_coordinate(&self, child: PointId, v: PointId) -> Result<Barycentric, MeshCurveError> {
        if let Some(i) = self.vertices.iter().position(|w| *w == v) {
            let mut lambda = [0.0; 4];
            lambda[i] = 1.0;
            return Ok(lambda);
        }
        self.splits
            .iter()
            .find(|(mid, _)| *mid == v)
            .map(|(_, lambda)| *lambda)
            .ok_or(MeshCurveError::UnmatchedChildVertex {
                parent: self.parent,
                child,
                vertex: v,
            })
    }

    /// Parent coordinates of every vertex of `child`, in the child's vertex order.
    pub fn child_vertex_coordinates<M: CurvedMesh + ?Sized>(
        &self,
        mesh: &M,
        child: PointId,
    ) -> Result<SmallVec<[Barycentric; 4]>, MeshCurveError> {
        mesh.downward(child, 0)?
            .iter()
            .map(|v| self.vertex_coordinate(child, *v))
            .collect()
    }
}
