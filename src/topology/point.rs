//! `PointId`: opaque handle for externally owned mesh entities.
//!
//! Vertices, edges, triangles and tetrahedra are all addressed through the
//! same handle type. The transfer engine never allocates ids; it only reads
//! the ids the host mesh hands it and compares them for identity, which is how
//! child vertices are matched against parent and split vertices.
//!
//! `0` is reserved as a sentinel, so the handle wraps a `NonZeroU64` and
//! `Option<PointId>` costs nothing extra.

use crate::mesh_error::MeshCurveError;
use std::{fmt, num::NonZeroU64};

/// Non-zero identifier of a mesh entity.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct PointId(NonZeroU64);

impl PointId {
    /// Creates a new `PointId` from a raw `u64` value.
    ///
    /// # Errors
    /// Returns [`MeshCurveError::InvalidPointId`] if `raw == 0`.
    ///
    /// ```rust
    /// # use mesh_curve::topology::point::PointId;
    /// let p = PointId::new(1)?;
    /// assert_eq!(p.get(), 1);
    /// # Ok::<(), mesh_curve::mesh_error::MeshCurveError>(())
    /// ```
    #[inline]
    pub fn new(raw: u64) -> Result<Self, MeshCurveError> {
        NonZeroU64::new(raw)
            .map(PointId)
            .ok_or(MeshCurveError::InvalidPointId)
    }

    /// Returns the raw id.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Debug for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PointId").field(&self.get()).finish()
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl TryFrom<u64> for PointId {
    type Error = MeshCurveError;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        PointId::new(raw)
    }
}

#[cfg(test)]
mod layout_tests {
    use super::*;
    use static_assertions::{assert_eq_align, assert_eq_size};

    assert_eq_size!(PointId, u64);
    assert_eq_align!(PointId, u64);
    assert_eq_size!(Option<PointId>, u64);
}
