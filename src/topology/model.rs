//! Geometric model queries used for boundary snapping.

use crate::topology::mesh::Vector3;

/// True boundary geometry that boundary edges are snapped onto.
pub trait BoundaryModel: std::fmt::Debug {
    /// Closest point on the model boundary to `x`.
    fn closest_point(&self, x: Vector3) -> Vector3;
}

/// Circle in the XY plane; `z` is preserved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: [f64; 2],
    pub radius: f64,
}

impl BoundaryModel for Circle {
    fn closest_point(&self, x: Vector3) -> Vector3 {
        let dx = x[0] - self.center[0];
        let dy = x[1] - self.center[1];
        let r = (dx * dx + dy * dy).sqrt();
        if r == 0.0 {
            return [self.center[0] + self.radius, self.center[1], x[2]];
        }
        let s = self.radius / r;
        [self.center[0] + dx * s, self.center[1] + dy * s, x[2]]
    }
}
