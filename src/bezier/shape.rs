//! Bezier field shape: node counts per simplex type for one polynomial order.

use crate::mesh_error::MeshCurveError;
use crate::topology::cell_type::{CellType, binomial};
use serde::{Deserialize, Serialize};

/// Highest supported polynomial order.
pub const MAX_ORDER: usize = 6;

/// Field shape of a Bezier coordinate field of fixed order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct BezierShape {
    order: usize,
}

impl BezierShape {
    /// Shape of order `order`.
    ///
    /// # Errors
    /// [`MeshCurveError::UnsupportedOrder`] unless `1 <= order <= MAX_ORDER`.
    pub fn new(order: usize) -> Result<Self, MeshCurveError> {
        if order == 0 || order > MAX_ORDER {
            return Err(MeshCurveError::UnsupportedOrder {
                order,
                max: MAX_ORDER,
            });
        }
        Ok(Self { order })
    }

    /// Polynomial order `P`.
    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Control points owned by an entity of `cell_type` (its internal nodes).
    pub fn count_nodes_on(&self, cell_type: CellType) -> usize {
        match cell_type {
            CellType::Vertex => 1,
            other => binomial(self.order - 1, other.dimension() as usize),
        }
    }

    /// Control points in the closure of `cell_type`.
    pub fn count_nodes(&self, cell_type: CellType) -> usize {
        let d = cell_type.dimension() as usize;
        binomial(self.order + d, d)
    }

    /// Whether entities of dimension `dim` carry nodes.
    pub fn has_nodes_in(&self, dim: u8) -> bool {
        CellType::simplex(dim).is_some_and(|ct| self.count_nodes_on(ct) > 0)
    }
}

impl TryFrom<usize> for BezierShape {
    type Error = MeshCurveError;

    fn try_from(order: usize) -> Result<Self, Self::Error> {
        BezierShape::new(order)
    }
}

impl From<BezierShape> for usize {
    fn from(shape: BezierShape) -> usize {
        shape.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_counts() {
        let cubic = BezierShape::new(3).unwrap();
        assert_eq!(cubic.count_nodes_on(CellType::Segment), 2);
        assert_eq!(cubic.count_nodes_on(CellType::Triangle), 1);
        assert_eq!(cubic.count_nodes_on(CellType::Tetrahedron), 0);
        assert_eq!(cubic.count_nodes(CellType::Triangle), 10);
        assert_eq!(cubic.count_nodes(CellType::Tetrahedron), 20);
        assert!(cubic.has_nodes_in(0));
        assert!(cubic.has_nodes_in(2));
        assert!(!cubic.has_nodes_in(3));
        assert!(!cubic.has_nodes_in(4));
    }

    #[test]
    fn order_bounds() {
        assert!(BezierShape::new(0).is_err());
        assert!(BezierShape::new(MAX_ORDER + 1).is_err());
        assert!(!BezierShape::new(1).unwrap().has_nodes_in(1));
    }

    #[test]
    fn deserialization_validates_order() {
        let shape: BezierShape = serde_json::from_str("4").unwrap();
        assert_eq!(shape.order(), 4);
        assert!(serde_json::from_str::<BezierShape>("9").is_err());
    }
}
