//! The Bezier implementation of [`ShapeHandler`].

use crate::bezier::shape::BezierShape;
use crate::curved::basis_cache::BasisTransformCache;
use crate::curved::cavity::{CavityReconstructor, CavitySummary};
use crate::curved::quality::QualityOracle;
use crate::curved::refinement::BezierTransfer;
use crate::curved::{CurveOptions, ShapeHandler, SolutionTransfer};
use crate::geometry::quality::SizeField;
use crate::mesh_error::MeshCurveError;
use crate::topology::mesh::CurvedMesh;
use crate::topology::point::PointId;
use crate::topology::refine::RefinementContext;
use std::sync::Arc;

/// Refinement transfer, cavity reconstruction and quality sharing one basis cache.
#[derive(Debug)]
pub struct BezierHandler<S> {
    transfer: BezierTransfer,
    cavity: CavityReconstructor,
    quality: QualityOracle<S>,
}

impl<S: SizeField> BezierHandler<S> {
    pub fn new(shape: BezierShape, size_field: S, options: CurveOptions) -> Result<Self, MeshCurveError> {
        let cache = Arc::new(BasisTransformCache::new(shape)?);
        Ok(Self {
            transfer: BezierTransfer::with_cache(Arc::clone(&cache), options.should_snap),
            cavity: CavityReconstructor::new(Arc::clone(&cache), options)?,
            quality: QualityOracle::new(size_field, cache, options.validity_samples),
        })
    }

    pub fn transfer(&self) -> &BezierTransfer {
        &self.transfer
    }
}

impl<M: CurvedMesh + ?Sized, S: SizeField> SolutionTransfer<M> for BezierHandler<S> {
    fn has_nodes_on(&self, dimension: u8) -> bool {
        SolutionTransfer::<M>::has_nodes_on(&self.transfer, dimension)
    }

    fn on_refine(
        &self,
        mesh: &mut M,
        refine: &RefinementContext,
        parent: PointId,
        new_entities: &[PointId],
    ) -> Result<(), MeshCurveError> {
        self.transfer.on_refine(mesh, refine, parent, new_entities)
    }
}

impl<M: CurvedMesh + ?Sized, S: SizeField> ShapeHandler<M> for BezierHandler<S> {
    fn quality(&self, mesh: &M, e: PointId) -> Result<f64, MeshCurveError> {
        self.quality.quality(mesh, e)
    }

    fn on_cavity(
        &self,
        mesh: &mut M,
        old_entities: &[PointId],
        new_entities: &[PointId],
    ) -> Result<CavitySummary, MeshCurveError> {
        self.cavity.reconstruct(mesh, old_entities, new_entities)
    }
}
