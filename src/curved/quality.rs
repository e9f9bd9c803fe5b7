//! Quality of curved triangles and tets.
//!
//! Quality is the straight-sided size-field quality of the element multiplied
//! by its curved validity: the ratio of the smallest to the largest Jacobian
//! determinant of the Bezier map over a sampling lattice, oriented by the
//! straight-sided element. A non-positive sample makes the element invalid
//! and the quality [`INVALID_QUALITY`].

use crate::bezier::field::closure_points;
use crate::bezier::nodes::{NodeTable, all_indices};
use crate::curved::basis_cache::BasisTransformCache;
use crate::geometry::quality::{SizeField, cross, dot, measure_element_quality, norm, sub};
use crate::mesh_error::MeshCurveError;
use crate::topology::cell_type::CellType;
use crate::topology::mesh::{CurvedMesh, Vector3};
use crate::topology::point::PointId;
use itertools::{Itertools, MinMaxResult};
use std::sync::Arc;

/// Quality reported for elements whose Jacobian is not positive everywhere.
pub const INVALID_QUALITY: f64 = -1.0;

/// Curved validity of an element with closure control points `points`.
///
/// Samples the Jacobian determinant on the lattice of order
/// `samples * P` (at least `P`). Returns `min/max` of the determinant, or
/// [`INVALID_QUALITY`] if any sample is non-positive or the straight-sided
/// element has zero measure.
pub fn curved_validity(table: &NodeTable, points: &[Vector3], samples: usize) -> Result<f64, MeshCurveError> {
    let ct = table.cell_type();
    let dim = ct.dimension();
    if !matches!(ct, CellType::Triangle | CellType::Tetrahedron) {
        return Err(MeshCurveError::UnsupportedCellType {
            cell_type: ct,
            operation: "curved validity",
        });
    }
    if points.len() != table.len() {
        return Err(MeshCurveError::InvalidGeometry(format!(
            "expected {} control points, got {}",
            table.len(),
            points.len()
        )));
    }
    let Some(straight) = straight_sided_frame(ct, points) else {
        return Ok(INVALID_QUALITY);
    };
    let m = (samples.max(1) * table.order()).max(1);
    let dets = all_indices(dim, m).into_iter().map(|alpha| {
        let lambda = alpha.map(|a| a as f64 / m as f64);
        let j = table.jacobian(points, &lambda);
        match straight {
            Frame::Normal(n) => dot(cross(j[0], j[1]), n),
            Frame::Volume(sign) => sign * dot(j[0], cross(j[1], j[2])),
        }
    });
    Ok(match dets.minmax_by(f64::total_cmp) {
        MinMaxResult::NoElements => INVALID_QUALITY,
        MinMaxResult::OneElement(d) if d > 0.0 => 1.0,
        MinMaxResult::MinMax(lo, hi) if lo > 0.0 => lo / hi,
        _ => INVALID_QUALITY,
    })
}

enum Frame {
    Normal(Vector3),
    Volume(f64),
}

/// `None` for a flat triangle or tet.
fn straight_sided_frame(ct: CellType, points: &[Vector3]) -> Option<Frame> {
    if ct == CellType::Triangle {
        let n = cross(sub(points[1], points[0]), sub(points[2], points[0]));
        let len = norm(n);
        if len == 0.0 {
            return None;
        }
        Some(Frame::Normal([n[0] / len, n[1] / len, n[2] / len]))
    } else {
        let v = dot(
            sub(points[1], points[0]),
            cross(sub(points[2], points[0]), sub(points[3], points[0])),
        );
        if v == 0.0 {
            return None;
        }
        Some(Frame::Volume(v.signum()))
    }
}

/// Element quality: size-field shape quality × curved validity.
#[derive(Debug)]
pub struct QualityOracle<S> {
    size_field: S,
    cache: Arc<BasisTransformCache>,
    samples: usize,
}

impl<S: SizeField> QualityOracle<S> {
    pub fn new(size_field: S, cache: Arc<BasisTransformCache>, samples: usize) -> Self {
        Self {
            size_field,
            cache,
            samples,
        }
    }

    pub fn size_field(&self) -> &S {
        &self.size_field
    }

    /// Quality of triangle or tet `e`; [`INVALID_QUALITY`] when it is flat
    /// or its Jacobian is not positive everywhere.
    ///
    /// # Errors
    /// [`MeshCurveError::UnsupportedCellType`] for other entity types.
    pub fn quality<M: CurvedMesh + ?Sized>(&self, mesh: &M, e: PointId) -> Result<f64, MeshCurveError> {
        let ct = mesh.cell_type(e)?;
        if !matches!(ct, CellType::Triangle | CellType::Tetrahedron) {
            return Err(MeshCurveError::UnsupportedCellType {
                cell_type: ct,
                operation: "quality",
            });
        }
        let table = self.cache.table(ct);
        let validity = curved_validity(table, &closure_points(mesh, table, e)?, self.samples)?;
        if validity <= 0.0 {
            return Ok(INVALID_QUALITY);
        }
        let vertices = mesh
            .downward(e, 0)?
            .iter()
            .map(|v| mesh.position(*v))
            .collect::<Result<Vec<_>, _>>()?;
        let shape = measure_element_quality(&self.size_field, ct, &vertices)?;
        Ok(shape * validity)
    }
}
