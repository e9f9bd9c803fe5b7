//! Bezier (Bernstein) representation of curved simplices.
//!
//! - [`nodes`]: control-point lattices and closure ordering
//! - [`basis`]: Bernstein evaluation, basis and parent→child matrices, degree elevation
//! - [`coefficients`]: boundary and interior conversion tables
//! - [`shape`]: per-order node counts ([`shape::BezierShape`])
//! - [`field`]: gathering/writing control points through a mesh

pub mod basis;
pub mod coefficients;
pub mod field;
pub mod nodes;
pub mod shape;

pub use nodes::{Barycentric, MultiIndex, NodeTable};
pub use shape::{BezierShape, MAX_ORDER};
