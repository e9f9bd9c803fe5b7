//! Per-pass cache of node tables and inverted basis matrices.

use crate::bezier::basis::{basis_matrix, invert_with_plu};
use crate::bezier::nodes::NodeTable;
use crate::bezier::shape::BezierShape;
use crate::mesh_error::MeshCurveError;
use crate::topology::cell_type::CellType;
use nalgebra::DMatrix;

/// Node tables for every simplex type and the PLU inverse of the basis
/// matrix for each dimension 1..=3 whose simplex owns nodes at this order.
///
/// Built once per adaptation pass and never mutated afterwards.
#[derive(Clone, Debug)]
pub struct BasisTransformCache {
    shape: BezierShape,
    tables: [NodeTable; 4],
    inverses: [Option<DMatrix<f64>>; 4],
}

impl BasisTransformCache {
    /// # Errors
    /// [`MeshCurveError::SingularBasisMatrix`] if a basis matrix cannot be inverted.
    pub fn new(shape: BezierShape) -> Result<Self, MeshCurveError> {
        let p = shape.order();
        let tables = [
            CellType::Vertex,
            CellType::Segment,
            CellType::Triangle,
            CellType::Tetrahedron,
        ]
        .map(|ct| NodeTable::new(ct, p));
        let mut inverses = [None, None, None, None];
        for (d, table) in tables.iter().enumerate().skip(1) {
            if shape.count_nodes_on(table.cell_type()) == 0 {
                continue;
            }
            inverses[d] = Some(invert_with_plu(
                basis_matrix(table),
                table.cell_type(),
                p,
            )?);
        }
        log::debug!(
            "built basis cache for order {p} ({} inverted matrices)",
            inverses.iter().filter(|a| a.is_some()).count()
        );
        Ok(Self {
            shape,
            tables,
            inverses,
        })
    }

    #[inline]
    pub fn shape(&self) -> BezierShape {
        self.shape
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.shape.order()
    }

    /// Closure lattice of `cell_type`.
    #[inline]
    pub fn table(&self, cell_type: CellType) -> &NodeTable {
        &self.tables[cell_type.dimension() as usize]
    }

    /// Inverse basis matrix of the `dim`-simplex.
    ///
    /// # Errors
    /// [`MeshCurveError::UnsupportedCellType`] when that simplex owns no
    /// nodes at this order.
    pub fn inverse(&self, dim: u8) -> Result<&DMatrix<f64>, MeshCurveError> {
        self.inverses
            .get(dim as usize)
            .and_then(Option::as_ref)
            .ok_or(MeshCurveError::UnsupportedCellType {
                cell_type: CellType::simplex(dim).unwrap_or_default(),
                operation: "basis inverse",
            })
    }

    /// Whether an inverse exists for the `dim`-simplex.
    pub fn has_inverse(&self, dim: u8) -> bool {
        self.inverse(dim).is_ok()
    }
}
