//! Curved-geometry transfer engine.
//!
//! When mesh adaptation changes topology, the Bezier control points of the
//! new entities must be recomputed so the curved geometry is preserved:
//!
//! - **Refinement** ([`SolutionTransfer::on_refine`]): children of a split
//!   parent take their control points from the parent through fixed
//!   transformation matrices ([`refinement::BezierTransfer`]).
//! - **Cavity modification** ([`ShapeHandler::on_cavity`]): entities created
//!   by a collapse or swap are rebuilt by snapping, quad blending and interior
//!   propagation ([`cavity::CavityReconstructor`]).
//!
//! [`bezier_shape_handler`] builds the engine for one adaptation pass.
//!
//! # Example
//! ```rust
//! use mesh_curve::prelude::*;
//!
//! let shape = BezierShape::new(2)?;
//! let mut mesh = InMemoryCurvedMesh::new(2, shape)?;
//! let id = |i| PointId::new(i);
//! mesh.add_vertex(id(1)?, [0.0, 0.0, 0.0], 2)?;
//! mesh.add_vertex(id(2)?, [1.0, 0.0, 0.0], 2)?;
//! mesh.add_vertex(id(3)?, [0.0, 1.0, 0.0], 2)?;
//! mesh.add_edge(id(4)?, [id(1)?, id(2)?], 2)?;
//! mesh.add_edge(id(5)?, [id(2)?, id(3)?], 2)?;
//! mesh.add_edge(id(6)?, [id(3)?, id(1)?], 2)?;
//! mesh.add_triangle(id(7)?, [id(1)?, id(2)?, id(3)?], 2)?;
//!
//! let handler = bezier_shape_handler(&mesh, UniformSize(1.0), CurveOptions::default())?;
//! assert!(handler.has_nodes_on(1));
//! assert!(handler.quality(&mesh, id(7)?)? > 0.0);
//! # Ok::<(), mesh_curve::mesh_error::MeshCurveError>(())
//! ```

pub mod basis_cache;
pub mod blended_quad;
pub mod cavity;
pub mod coordinates;
pub mod handler;
pub mod interior;
pub mod quality;
pub mod refinement;

pub use cavity::CavitySummary;
pub use handler::BezierHandler;
pub use refinement::BezierTransfer;

use crate::geometry::quality::SizeField;
use crate::mesh_error::MeshCurveError;
use crate::topology::mesh::CurvedMesh;
use crate::topology::point::PointId;
use crate::topology::refine::RefinementContext;
use serde::{Deserialize, Serialize};

/// Options for one adaptation pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveOptions {
    /// Snap new boundary entities onto the model geometry.
    pub should_snap: bool,
    /// Lattice refinement factor for curved validity sampling.
    pub validity_samples: usize,
    /// Shared pairing may only use triangles created by the same cavity.
    pub strict_new_entities: bool,
}

impl Default for CurveOptions {
    fn default() -> Self {
        Self {
            should_snap: true,
            validity_samples: 2,
            strict_new_entities: false,
        }
    }
}

/// Transfer of a field's nodes onto entities created by refinement.
pub trait SolutionTransfer<M: CurvedMesh + ?Sized> {
    /// Whether entities of `dimension` carry nodes.
    fn has_nodes_on(&self, dimension: u8) -> bool;

    /// Set the nodes of `new_entities`, the children of `parent`.
    ///
    /// `refine` records the split vertex of every split edge of `parent`.
    fn on_refine(
        &self,
        mesh: &mut M,
        refine: &RefinementContext,
        parent: PointId,
        new_entities: &[PointId],
    ) -> Result<(), MeshCurveError>;
}

/// Geometry handler consulted by mesh adaptation.
pub trait ShapeHandler<M: CurvedMesh + ?Sized>: SolutionTransfer<M> {
    /// Quality of triangle or tetrahedron `e`.
    fn quality(&self, mesh: &M, e: PointId) -> Result<f64, MeshCurveError>;

    /// Rebuild the geometry of `new_entities` after `old_entities` were replaced.
    fn on_cavity(
        &self,
        mesh: &mut M,
        old_entities: &[PointId],
        new_entities: &[PointId],
    ) -> Result<CavitySummary, MeshCurveError>;
}

/// Bezier shape handler for `mesh`'s coordinate field.
///
/// # Errors
/// Fails if the basis matrices of the mesh's order cannot be inverted.
pub fn bezier_shape_handler<M, S>(
    mesh: &M,
    size_field: S,
    options: CurveOptions,
) -> Result<Box<dyn ShapeHandler<M>>, MeshCurveError>
where
    M: CurvedMesh + ?Sized + 'static,
    S: SizeField + 'static,
{
    Ok(Box::new(BezierHandler::new(mesh.shape(), size_field, options)?))
}
