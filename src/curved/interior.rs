//! Interior control points of triangles and tets derived from their boundary.

use crate::bezier::coefficients::interior_conversion;
use crate::bezier::field::convert_interpolation_points;
use crate::curved::basis_cache::BasisTransformCache;
use crate::mesh_error::MeshCurveError;
use crate::topology::cell_type::CellType;
use crate::topology::mesh::CurvedMesh;
use crate::topology::point::PointId;
use nalgebra::DMatrix;
use std::sync::Arc;

/// Per-dimension interior conversion tables (dimensions 2 and 3).
#[derive(Clone, Debug)]
pub struct InteriorPropagator {
    cache: Arc<BasisTransformCache>,
    coefficients: [Option<DMatrix<f64>>; 4],
}

impl InteriorPropagator {
    pub fn new(cache: Arc<BasisTransformCache>) -> Result<Self, MeshCurveError> {
        let mut coefficients = [None, None, None, None];
        for d in 2..=3u8 {
            if !cache.has_inverse(d) {
                continue;
            }
            let ct = CellType::simplex(d).unwrap_or_default();
            coefficients[d as usize] = Some(interior_conversion(cache.table(ct), cache.inverse(d)?));
        }
        Ok(Self {
            cache,
            coefficients,
        })
    }

    /// Interior conversion table of the `dim`-simplex, if it owns nodes.
    pub fn coefficients(&self, dim: u8) -> Option<&DMatrix<f64>> {
        self.coefficients.get(dim as usize).and_then(Option::as_ref)
    }

    /// Overwrite the own control points of `e` from its boundary control points.
    ///
    /// Entities without own nodes at this order are left untouched.
    pub fn propagate<M: CurvedMesh + ?Sized>(&self, mesh: &mut M, e: PointId) -> Result<bool, MeshCurveError> {
        let ct = mesh.cell_type(e)?;
        let Some(c) = self.coefficients(ct.dimension()) else {
            return Ok(false);
        };
        convert_interpolation_points(mesh, self.cache.table(ct), e, c)?;
        Ok(true)
    }
}
