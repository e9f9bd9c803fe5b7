#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-curve
//!
//! mesh-curve keeps the curved (high-order Bezier) geometry of a simplicial
//! mesh consistent while the mesh is being adapted. Whenever refinement
//! splits an entity, or a collapse/swap replaces a cavity of entities, the
//! control points of the new edges, faces and regions are recomputed from
//! the geometry that was there before.
//!
//! ## Features
//! - Bezier control-point lattices, Bernstein evaluation and PLU-inverted
//!   basis matrices for orders 1 to 6
//! - Exact transfer of parent geometry onto refined children
//! - Cavity reconstruction by boundary snapping, Coons blending over
//!   triangle pairs and interior propagation
//! - Element quality combining a size-field shape measure and curved validity
//! - A small in-memory mesh implementing [`topology::mesh::CurvedMesh`]
//!
//! The engine never owns topology: hosts implement
//! [`topology::mesh::CurvedMesh`] for their own mesh database and drive the
//! engine through the [`curved::ShapeHandler`] trait.
//!
//! ## Logging
//! The crate logs through the `log` facade and installs no logger.

pub mod bezier;
pub mod curved;
pub mod geometry;
pub mod mesh_error;
pub mod topology;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::bezier::shape::{BezierShape, MAX_ORDER};
    pub use crate::curved::cavity::CavitySummary;
    pub use crate::curved::quality::INVALID_QUALITY;
    pub use crate::curved::{
        BezierHandler, BezierTransfer, CurveOptions, ShapeHandler, SolutionTransfer,
        bezier_shape_handler,
    };
    pub use crate::geometry::quality::{MetricSize, SizeField, UniformSize};
    pub use crate::mesh_error::MeshCurveError;
    pub use crate::topology::cell_type::CellType;
    pub use crate::topology::in_memory::InMemoryCurvedMesh;
    pub use crate::topology::mesh::{CurvedMesh, Vector3};
    pub use crate::topology::model::{BoundaryModel, Circle};
    pub use crate::topology::point::PointId;
    pub use crate::topology::refine::{
        RefinementContext, UniformSplit, split_edge, split_tet_uniform, split_triangle_uniform,
    };
}
