//! Mesh topology collaborators of the curved-geometry engine.
//!
//! - [`point::PointId`]: entity handles
//! - [`cell_type::CellType`]: simplex types and their local edge/face tables
//! - [`mesh::CurvedMesh`]: the capabilities the engine consumes
//! - [`in_memory::InMemoryCurvedMesh`]: hash-map backed implementation
//! - [`model::BoundaryModel`]: true boundary geometry for snapping
//! - [`refine`]: split registry, subdivision templates and uniform splits

pub mod cell_type;
pub mod in_memory;
pub mod mesh;
pub mod model;
pub mod point;
pub mod refine;

pub use in_memory::InMemoryCurvedMesh;
pub use mesh::{CurvedMesh, Downward, Vector3};
pub use refine::RefinementContext;
