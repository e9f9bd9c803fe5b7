//! MeshCurveError: Unified error type for mesh-curve public APIs
//!
//! Every fallible operation in the crate returns this error. Topology
//! inconsistencies discovered while transferring geometry are reported as
//! distinct variants so the host driver can decide whether to abort the
//! adaptation pass.

use crate::topology::cell_type::CellType;
use crate::topology::point::PointId;
use thiserror::Error;

/// Unified error type for mesh-curve operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshCurveError {
    /// Attempted to construct a PointId with a zero value (invalid).
    #[error("PointId must be non-zero (0 is reserved as invalid/sentinel)")]
    InvalidPointId,
    /// The mesh has no entity with this id.
    #[error("entity {0} is not present in the mesh")]
    MissingEntity(PointId),
    /// An entity with this id already exists.
    #[error("entity {0} already exists in the mesh")]
    DuplicateEntity(PointId),
    /// The operation does not support this cell type.
    #[error("unsupported cell type {cell_type:?} for {operation}")]
    UnsupportedCellType {
        cell_type: CellType,
        operation: &'static str,
    },
    /// Polynomial order outside of the supported range.
    #[error("unsupported polynomial order {order} (supported: 1..={max})")]
    UnsupportedOrder { order: usize, max: usize },
    /// The node-to-Bezier basis matrix could not be inverted.
    #[error("basis matrix for {cell_type:?} at order {order} is singular")]
    SingularBasisMatrix { cell_type: CellType, order: usize },
    /// Control point index out of range for the entity.
    #[error("node index {node} out of range for {entity} ({count} nodes)")]
    NodeIndexOutOfRange {
        entity: PointId,
        node: usize,
        count: usize,
    },
    /// A refined child's vertex is neither a parent vertex nor a recorded split vertex.
    #[error("vertex {vertex} of child {child} does not match parent {parent}")]
    UnmatchedChildVertex {
        parent: PointId,
        child: PointId,
        vertex: PointId,
    },
    /// No edge connecting the two vertices bounds the triangle.
    #[error("no edge ({v0}, {v1}) in triangle {triangle}")]
    EdgeNotInTriangle {
        triangle: PointId,
        v0: PointId,
        v1: PointId,
    },
    /// A vertex expected in an entity's closure is absent.
    #[error("vertex {vertex} is not in the closure of {entity}")]
    VertexNotInClosure { entity: PointId, vertex: PointId },
    /// An interior edge does not have two up-adjacent triangles.
    #[error("edge {edge} has {found} up-adjacent triangles, expected at least 2")]
    MissingUpwardTriangles { edge: PointId, found: usize },
    /// Downward adjacency does not match the entity's type.
    #[error("entity {entity} has {found} downward entities of dimension {dimension}, expected {expected}")]
    DownwardMismatch {
        entity: PointId,
        dimension: u8,
        expected: usize,
        found: usize,
    },
    /// Mesh dimension is not 2 or 3, or an entity exceeds it.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
    /// Degenerate or otherwise unusable geometry.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}
