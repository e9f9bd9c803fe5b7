//! Straight-sided element quality measured against a size field.
//!
//! The measure is the signed mean ratio of the element's vertices after
//! mapping edge vectors into metric space:
//!
//! - **Triangle**: `4√3 A / Σ l_i²`
//! - **Tetrahedron**: `12 (3V)^{2/3} / Σ l_i²`
//!
//! Both equal `1` for the equilateral element of the metric and are negative
//! for inverted elements. This is the size-field half of the quality
//! reported by [`crate::curved::quality::QualityOracle`].
//!
//! # Examples
//! ```rust
//! use mesh_curve::geometry::quality::{UniformSize, measure_element_quality};
//! use mesh_curve::topology::cell_type::CellType;
//!
//! let h = 3f64.sqrt() / 2.0;
//! let tri = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, h, 0.0]];
//! let q = measure_element_quality(&UniformSize(0.1), CellType::Triangle, &tri)?;
//! assert!((q - 1.0).abs() < 1e-12);
//! # Ok::<(), mesh_curve::mesh_error::MeshCurveError>(())
//! ```

use crate::mesh_error::MeshCurveError;
use crate::topology::cell_type::{CellType, TET_EDGES, TRI_EDGES};
use crate::topology::mesh::Vector3;

const EPS: f64 = 1e-14;

/// Desired element size, expressed as a linear map into metric space.
pub trait SizeField {
    /// Linear map `T` such that a physical vector `v` has metric length `|T v|`.
    fn transform(&self, point: Vector3) -> [Vector3; 3];
}

/// Isotropic size `h` everywhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformSize(pub f64);

impl SizeField for UniformSize {
    fn transform(&self, _point: Vector3) -> [Vector3; 3] {
        let s = 1.0 / self.0;
        [[s, 0.0, 0.0], [0.0, s, 0.0], [0.0, 0.0, s]]
    }
}

/// Constant anisotropic metric given by its transform rows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MetricSize(pub [Vector3; 3]);

impl SizeField for MetricSize {
    fn transform(&self, _point: Vector3) -> [Vector3; 3] {
        self.0
    }
}

/// Signed mean ratio of a straight-sided triangle or tet in the metric of `size_field`.
pub fn measure_element_quality<S: SizeField + ?Sized>(
    size_field: &S,
    cell_type: CellType,
    vertices: &[Vector3],
) -> Result<f64, MeshCurveError> {
    if vertices.len() != cell_type.vertex_count() {
        return Err(MeshCurveError::InvalidGeometry(format!(
            "vertex count mismatch: expected {}, got {}",
            cell_type.vertex_count(),
            vertices.len()
        )));
    }
    let t = size_field.transform(centroid(vertices));
    let mapped: Vec<Vector3> = vertices.iter().map(|v| apply(&t, *v)).collect();
    match cell_type {
        CellType::Triangle => {
            let sum_sq = sum_squared_lengths(&mapped, &TRI_EDGES);
            if sum_sq <= EPS {
                return Err(MeshCurveError::InvalidGeometry(
                    "zero-length edge detected".into(),
                ));
            }
            let area = signed_area(mapped[0], mapped[1], mapped[2]);
            Ok(4.0 * 3f64.sqrt() * area / sum_sq)
        }
        CellType::Tetrahedron => {
            let sum_sq = sum_squared_lengths(&mapped, &TET_EDGES);
            if sum_sq <= EPS {
                return Err(MeshCurveError::InvalidGeometry(
                    "zero-length edge detected".into(),
                ));
            }
            let volume = signed_volume(mapped[0], mapped[1], mapped[2], mapped[3]);
            let magnitude = 12.0 * (3.0 * volume.abs()).powf(2.0 / 3.0) / sum_sq;
            Ok(magnitude.copysign(volume))
        }
        other => Err(MeshCurveError::UnsupportedCellType {
            cell_type: other,
            operation: "element quality",
        }),
    }
}

/// Signed area of a triangle, measured against the `+z` axis when the
/// triangle lies in the XY plane and as the unsigned area otherwise.
fn signed_area(a: Vector3, b: Vector3, c: Vector3) -> f64 {
    let n = cross(sub(b, a), sub(c, a));
    let magnitude = 0.5 * norm(n);
    if n[2] < 0.0 && n[0].abs() <= EPS && n[1].abs() <= EPS {
        -magnitude
    } else {
        magnitude
    }
}

pub(crate) fn signed_volume(a: Vector3, b: Vector3, c: Vector3, d: Vector3) -> f64 {
    let ab = sub(b, a);
    let ac = sub(c, a);
    let ad = sub(d, a);
    dot(ab, cross(ac, ad)) / 6.0
}

fn sum_squared_lengths(vertices: &[Vector3], edges: &[[usize; 2]]) -> f64 {
    edges
        .iter()
        .map(|[a, b]| {
            let d = sub(vertices[*b], vertices[*a]);
            dot(d, d)
        })
        .sum()
}

fn centroid(vertices: &[Vector3]) -> Vector3 {
    let inv = 1.0 / vertices.len() as f64;
    let mut c = [0.0; 3];
    for v in vertices {
        for k in 0..3 {
            c[k] += v[k] * inv;
        }
    }
    c
}

fn apply(t: &[Vector3; 3], v: Vector3) -> Vector3 {
    [dot(t[0], v), dot(t[1], v), dot(t[2], v)]
}

pub(crate) fn sub(a: Vector3, b: Vector3) -> Vector3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub(crate) fn dot(a: Vector3, b: Vector3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub(crate) fn cross(a: Vector3, b: Vector3) -> Vector3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub(crate) fn norm(a: Vector3) -> f64 {
    dot(a, a).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_tet_has_unit_quality() {
        let s = 1.0 / 2f64.sqrt();
        let tet = [
            [1.0, 0.0, -s],
            [-1.0, 0.0, -s],
            [0.0, 1.0, s],
            [0.0, -1.0, s],
        ];
        let q = measure_element_quality(&UniformSize(1.0), CellType::Tetrahedron, &tet).unwrap();
        assert!((q.abs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn inverted_triangle_is_negative() {
        let tri = [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]];
        let q = measure_element_quality(&UniformSize(1.0), CellType::Triangle, &tri).unwrap();
        assert!(q < 0.0);
    }

    #[test]
    fn anisotropic_metric_rewards_stretched_elements() {
        let tri = [[0.0, 0.0, 0.0], [4.0, 0.0, 0.0], [2.0, 0.5, 0.0]];
        let iso = measure_element_quality(&UniformSize(1.0), CellType::Triangle, &tri).unwrap();
        let metric = MetricSize([[0.25, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
        let aniso = measure_element_quality(&metric, CellType::Triangle, &tri).unwrap();
        assert!(aniso > iso);
    }

    #[test]
    fn segments_are_rejected() {
        let seg = [[0.0; 3], [1.0, 0.0, 0.0]];
        assert!(measure_element_quality(&UniformSize(1.0), CellType::Segment, &seg).is_err());
    }
}
