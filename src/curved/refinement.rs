//! Control-point transfer from a refined parent onto its children.
//!
//! For a child of a hierarchically split parent, the child's interpolation
//! points are mapped into the parent's reference simplex, the parent's
//! Bernstein basis is evaluated there and the cached inverse basis matrix of
//! the child's dimension turns those positions into Bezier control points.
//! Each internal control point of the child is therefore a fixed weighted sum
//! of the parent's closure control points; no search is involved.

use crate::bezier::basis::parent_child_matrix;
use crate::bezier::field::closure_points;
use crate::bezier::shape::BezierShape;
use crate::curved::SolutionTransfer;
use crate::curved::basis_cache::BasisTransformCache;
use crate::curved::coordinates::ParentFrame;
use crate::mesh_error::MeshCurveError;
use crate::topology::cell_type::CellType;
use crate::topology::mesh::{CurvedMesh, Vector3};
use crate::topology::point::PointId;
use crate::topology::refine::RefinementContext;
use std::sync::Arc;

/// Bezier control-point transfer for hierarchical refinement.
#[derive(Clone, Debug)]
pub struct BezierTransfer {
    cache: Arc<BasisTransformCache>,
    should_snap: bool,
}

impl BezierTransfer {
    /// Transfer for fields of `shape`.
    ///
    /// With `should_snap`, children classified on the domain boundary are
    /// left for the snapping stage of the driver.
    pub fn new(shape: BezierShape, should_snap: bool) -> Result<Self, MeshCurveError> {
        Ok(Self::with_cache(
            Arc::new(BasisTransformCache::new(shape)?),
            should_snap,
        ))
    }

    pub(crate) fn with_cache(cache: Arc<BasisTransformCache>, should_snap: bool) -> Self {
        Self { cache, should_snap }
    }

    pub fn cache(&self) -> &BasisTransformCache {
        &self.cache
    }

    /// Internal control points of `child`, computed from the parent's closure
    /// control points `parent_points`.
    pub fn child_control_points<M: CurvedMesh + ?Sized>(
        &self,
        mesh: &M,
        frame: &ParentFrame,
        parent_type: CellType,
        parent_points: &[Vector3],
        child: PointId,
    ) -> Result<Vec<Vector3>, MeshCurveError> {
        let child_type = mesh.cell_type(child)?;
        let child_table = self.cache.table(child_type);
        let parent_table = self.cache.table(parent_type);
        let params = frame.child_vertex_coordinates(mesh, child)?;
        let inverse = self.cache.inverse(child_type.dimension())?;
        let weights = inverse * parent_child_matrix(parent_table, child_table, &params);
        let n = child_table.len();
        let ni = child_table.internal_count();
        Ok((n - ni..n)
            .map(|row| {
                let mut x = [0.0; 3];
                for (k, cp) in parent_points.iter().enumerate() {
                    let w = weights[(row, k)];
                    for c in 0..3 {
                        x[c] += w * cp[c];
                    }
                }
                x
            })
            .collect())
    }
}

impl<M: CurvedMesh + ?Sized> SolutionTransfer<M> for BezierTransfer {
    fn has_nodes_on(&self, dimension: u8) -> bool {
        self.cache.shape().has_nodes_in(dimension)
    }

    fn on_refine(
        &self,
        mesh: &mut M,
        refine: &RefinementContext,
        parent: PointId,
        new_entities: &[PointId],
    ) -> Result<(), MeshCurveError> {
        let shape = self.cache.shape();
        let parent_type = mesh.cell_type(parent)?;
        let parent_points = closure_points(mesh, self.cache.table(parent_type), parent)?;
        let frame = ParentFrame::new(mesh, refine, parent)?;
        let mut computed = Vec::with_capacity(new_entities.len());
        for &child in new_entities {
            let child_type = mesh.cell_type(child)?;
            if child_type == CellType::Vertex || shape.count_nodes_on(child_type) == 0 {
                continue;
            }
            if self.should_snap && mesh.is_on_boundary(child)? {
                log::debug!("child {child} of {parent} is on the boundary, left for snapping");
                continue;
            }
            let points =
                self.child_control_points(mesh, &frame, parent_type, &parent_points, child)?;
            computed.push((child, points));
        }
        for (child, points) in computed {
            for (j, x) in points.into_iter().enumerate() {
                log::trace!("{child} node {j} <- {x:?}");
                mesh.set_point(child, j, x)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::in_memory::InMemoryCurvedMesh;
    use approx::assert_abs_diff_eq;

    fn pt(i: u64) -> PointId {
        PointId::new(i).unwrap()
    }

    #[test]
    fn quadratic_edge_split_gives_de_casteljau_halves() {
        let shape = BezierShape::new(2).unwrap();
        let mut mesh = InMemoryCurvedMesh::new(2, shape).unwrap();
        mesh.add_vertex(pt(1), [0.0, 0.0, 0.0], 2).unwrap();
        mesh.add_vertex(pt(2), [2.0, 0.0, 0.0], 2).unwrap();
        mesh.add_edge(pt(3), [pt(1), pt(2)], 2).unwrap();
        mesh.set_point(pt(3), 0, [1.0, 2.0, 0.0]).unwrap();
        // curve(0.5) = 0.25*P0 + 0.5*P1 + 0.25*P2 = (1, 1)
        mesh.add_vertex(pt(4), [1.0, 1.0, 0.0], 2).unwrap();
        mesh.add_edge(pt(5), [pt(1), pt(4)], 2).unwrap();
        mesh.add_edge(pt(6), [pt(4), pt(2)], 2).unwrap();
        let mut ctx = RefinementContext::new();
        ctx.record_split(pt(3), pt(4));

        let transfer = BezierTransfer::new(shape, true).unwrap();
        transfer
            .on_refine(&mut mesh, &ctx, pt(3), &[pt(4), pt(5), pt(6)])
            .unwrap();

        let left = mesh.point(pt(5), 0).unwrap();
        let right = mesh.point(pt(6), 0).unwrap();
        assert_abs_diff_eq!(left[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(left[1], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(right[0], 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(right[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn unmatched_child_vertex_is_reported() {
        let shape = BezierShape::new(2).unwrap();
        let mut mesh = InMemoryCurvedMesh::new(2, shape).unwrap();
        mesh.add_vertex(pt(1), [0.0, 0.0, 0.0], 2).unwrap();
        mesh.add_vertex(pt(2), [2.0, 0.0, 0.0], 2).unwrap();
        mesh.add_vertex(pt(3), [1.0, 0.0, 0.0], 2).unwrap();
        mesh.add_edge(pt(4), [pt(1), pt(2)], 2).unwrap();
        mesh.add_edge(pt(5), [pt(1), pt(3)], 2).unwrap();
        let transfer = BezierTransfer::new(shape, false).unwrap();
        let err = transfer
            .on_refine(&mut mesh, &RefinementContext::new(), pt(4), &[pt(5)])
            .unwrap_err();
        assert_eq!(
            err,
            MeshCurveError::UnmatchedChildVertex {
                parent: pt(4),
                child: pt(5),
                vertex: pt(3),
            }
        );
        assert_eq!(mesh.point(pt(5), 0).unwrap(), [0.5, 0.0, 0.0]);
    }

    #[test]
    fn failed_child_leaves_earlier_children_untouched() {
        let shape = BezierShape::new(2).unwrap();
        let mut mesh = InMemoryCurvedMesh::new(2, shape).unwrap();
        mesh.add_vertex(pt(1), [0.0, 0.0, 0.0], 2).unwrap();
        mesh.add_vertex(pt(2), [2.0, 0.0, 0.0], 2).unwrap();
        mesh.add_edge(pt(3), [pt(1), pt(2)], 2).unwrap();
        mesh.set_point(pt(3), 0, [1.0, 2.0, 0.0]).unwrap();
        mesh.add_vertex(pt(4), [1.0, 1.0, 0.0], 2).unwrap();
        mesh.add_edge(pt(5), [pt(1), pt(4)], 2).unwrap();
        mesh.add_vertex(pt(6), [3.0, 0.0, 0.0], 2).unwrap();
        mesh.add_edge(pt(7), [pt(4), pt(6)], 2).unwrap();
        let mut ctx = RefinementContext::new();
        ctx.record_split(pt(3), pt(4));
        let transfer = BezierTransfer::new(shape, false).unwrap();
        let err = transfer.on_refine(&mut mesh, &ctx, pt(3), &[pt(5), pt(7)]);
        assert!(matches!(err, Err(MeshCurveError::UnmatchedChildVertex { .. })));
        assert_eq!(mesh.point(pt(5), 0).unwrap(), [0.5, 0.5, 0.0]);
    }

    #[test]
    fn boundary_children_are_skipped_when_snapping() {
        let shape = BezierShape::new(2).unwrap();
        let mut mesh = InMemoryCurvedMesh::new(2, shape).unwrap();
        mesh.add_vertex(pt(1), [0.0, 0.0, 0.0], 1).unwrap();
        mesh.add_vertex(pt(2), [2.0, 0.0, 0.0], 1).unwrap();
        mesh.add_edge(pt(3), [pt(1), pt(2)], 1).unwrap();
        mesh.set_point(pt(3), 0, [1.0, 2.0, 0.0]).unwrap();
        mesh.add_vertex(pt(4), [1.0, 1.0, 0.0], 1).unwrap();
        mesh.add_edge(pt(5), [pt(1), pt(4)], 1).unwrap();
        let mut ctx = RefinementContext::new();
        ctx.record_split(pt(3), pt(4));
        let transfer = BezierTransfer::new(shape, true).unwrap();
        transfer.on_refine(&mut mesh, &ctx, pt(3), &[pt(5)]).unwrap();
        assert_eq!(mesh.point(pt(5), 0).unwrap(), [0.5, 0.5, 0.0]);
    }
}
