//! Geometry reconstruction after a cavity modification (collapse, swap).
//!
//! A cavity operation removes a set of old entities and creates new ones that
//! fill the same region. New edges and faces carry no meaningful control
//! points yet. They are rebuilt in three phases:
//!
//! 1. **Boundary edges.** With snapping enabled the interpolation points of a
//!    new boundary edge are snapped onto the model and converted to control
//!    points. Without snapping they are placed on the chord.
//! 2. **Interior edges.** Each new interior edge is first matched against the
//!    old triangles ("cross pairing"): triangle A holds its first vertex,
//!    triangle B its second, and the edge opposite each is the same entity.
//!    The quad `A ∪ B` then has the new edge as its diagonal and the edge's
//!    control points come from the blended quad. Edges without a cross match
//!    get chord points and are queued; once all first-pass edges are set the
//!    queued edges are blended over the two new triangles sharing them.
//! 3. **Faces and regions.** New entities of dimension 2..=mesh dimension get
//!    their interior control points from their (now final) boundary.

use crate::bezier::coefficients::boundary_conversion;
use crate::bezier::field::{
    convert_interpolation_points, elevate_edge, set_linear_edge_points, zero_points,
};
use crate::curved::CurveOptions;
use crate::curved::basis_cache::BasisTransformCache;
use crate::curved::blended_quad::{BlendedQuad, evaluate_blended_quad};
use crate::curved::interior::InteriorPropagator;
use crate::mesh_error::MeshCurveError;
use crate::topology::cell_type::CellType;
use crate::topology::mesh::{
    CurvedMesh, Vector3, edge_pair, is_in_closure, tri_edge_opposite_vert,
    tri_vert_opposite_edge,
};
use crate::topology::point::PointId;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Counts of what [`CavityReconstructor::reconstruct`] did, for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CavitySummary {
    /// Boundary edges snapped onto the model.
    pub snapped: usize,
    /// Boundary edges given chord points because snapping is off.
    pub linear_boundary: usize,
    /// Interior edges blended over a pair of old triangles.
    pub cross_blended: usize,
    /// Interior edges blended over the pair of new triangles sharing them.
    pub shared_blended: usize,
    /// Faces and regions whose interior was rebuilt from the boundary.
    pub interior_propagated: usize,
}

/// Multi-phase control point reconstruction for new cavity entities.
#[derive(Clone, Debug)]
pub struct CavityReconstructor {
    cache: Arc<BasisTransformCache>,
    boundary: Option<DMatrix<f64>>,
    interior: InteriorPropagator,
    options: CurveOptions,
}

impl CavityReconstructor {
    pub fn new(cache: Arc<BasisTransformCache>, options: CurveOptions) -> Result<Self, MeshCurveError> {
        let boundary = if cache.has_inverse(1) {
            let table = cache.table(CellType::Segment);
            Some(boundary_conversion(table, cache.inverse(1)?))
        } else {
            None
        };
        let interior = InteriorPropagator::new(Arc::clone(&cache))?;
        Ok(Self {
            cache,
            boundary,
            interior,
            options,
        })
    }

    pub fn interior(&self) -> &InteriorPropagator {
        &self.interior
    }

    /// Rebuild the control points of `new` after `old` was replaced.
    pub fn reconstruct<M: CurvedMesh + ?Sized>(
        &self,
        mesh: &mut M,
        old: &[PointId],
        new: &[PointId],
    ) -> Result<CavitySummary, MeshCurveError> {
        let shape = mesh.shape();
        let mut summary = CavitySummary::default();
        let edge_nodes = shape.count_nodes_on(CellType::Segment);

        let mut edges = Vec::new();
        for &e in new {
            if mesh.cell_type(e)? == CellType::Segment {
                edges.push(e);
            }
        }

        // Phase A
        let mut interior_edges = Vec::new();
        for &edge in &edges {
            if !mesh.is_on_boundary(edge)? {
                interior_edges.push(edge);
                continue;
            }
            if edge_nodes == 0 {
                continue;
            }
            if self.options.should_snap {
                self.snap_edge(mesh, edge)?;
                summary.snapped += 1;
            } else {
                set_linear_edge_points(mesh, edge)?;
                summary.linear_boundary += 1;
            }
        }

        // Phase B
        if edge_nodes > 0 {
            let mut queued = Vec::new();
            for &edge in &interior_edges {
                let verts = edge_pair(edge, &mesh.downward(edge, 0)?)?;
                match find_edge_triangles_cross(mesh, old, verts)? {
                    Some(tris) => {
                        let quad = cross_quad(mesh, verts, tris)?;
                        self.blend_edge(mesh, edge, &quad)?;
                        summary.cross_blended += 1;
                    }
                    None => {
                        log::debug!("no cross pairing for edge {edge}, deferring");
                        set_linear_edge_points(mesh, edge)?;
                        queued.push(edge);
                    }
                }
            }
            let new_set: HashSet<PointId> = new.iter().copied().collect();
            for edge in queued {
                let verts = edge_pair(edge, &mesh.downward(edge, 0)?)?;
                let tris = find_edge_triangles_shared(
                    mesh,
                    &new_set,
                    edge,
                    self.options.strict_new_entities,
                )?;
                let quad = shared_quad(mesh, edge, verts, tris)?;
                self.blend_edge(mesh, edge, &quad)?;
                summary.shared_blended += 1;
            }
        }

        // Phase C
        for d in 2..=mesh.dimension() {
            let Some(ct) = CellType::simplex(d) else {
                continue;
            };
            let ni = shape.count_nodes_on(ct);
            if ni == 0 {
                continue;
            }
            for &e in new {
                if mesh.cell_type(e)?.dimension() != d {
                    continue;
                }
                zero_points(mesh, e, ni)?;
                if !mesh.is_on_boundary(e)? || !self.options.should_snap {
                    self.interior.propagate(mesh, e)?;
                    summary.interior_propagated += 1;
                }
            }
        }
        log::debug!("cavity of {} old / {} new entities: {summary:?}", old.len(), new.len());
        Ok(summary)
    }

    /// Snap the interpolation points of boundary edge `edge` and convert them
    /// to control points.
    fn snap_edge<M: CurvedMesh + ?Sized>(&self, mesh: &mut M, edge: PointId) -> Result<(), MeshCurveError> {
        let Some(c) = &self.boundary else {
            return Ok(());
        };
        let p = self.cache.order() as f64;
        for j in 0..c.nrows() {
            let x = mesh.snap_to_boundary(edge, (1.0 + j as f64) / p)?;
            mesh.set_point(edge, j, x)?;
        }
        convert_interpolation_points(mesh, self.cache.table(CellType::Segment), edge, c)
    }

    /// Set the control points of `edge` from the blend over `quad`.
    ///
    /// `edge` must be the quad's `verts[0]`–`verts[2]` diagonal.
    fn blend_edge<M: CurvedMesh + ?Sized>(
        &self,
        mesh: &mut M,
        edge: PointId,
        quad: &BlendedQuad,
    ) -> Result<(), MeshCurveError> {
        let table = self.cache.table(CellType::Segment);
        let p = self.cache.order();
        if p == 2 {
            let x = evaluate_blended_quad(mesh, table, quad, [0.5, 0.5])?;
            return mesh.set_point(edge, 0, x);
        }
        let points: [Vector3; 2] = [
            evaluate_blended_quad(mesh, table, quad, [1.0 / 3.0, 1.0 / 3.0])?,
            evaluate_blended_quad(mesh, table, quad, [2.0 / 3.0, 2.0 / 3.0])?,
        ];
        for (j, x) in points.into_iter().enumerate() {
            mesh.set_point(edge, j, x)?;
        }
        if p > 3 {
            elevate_edge(mesh, edge, 3)?;
        }
        Ok(())
    }
}

/// Search `old` for triangles A and B with `verts[0] ∈ A`, `verts[1] ∈ B` and
/// the same edge opposite both. `None` when the cavity has no such pair.
pub fn find_edge_triangles_cross<M: CurvedMesh + ?Sized>(
    mesh: &M,
    old: &[PointId],
    verts: [PointId; 2],
) -> Result<Option<[PointId; 2]>, MeshCurveError> {
    let mut triangles = Vec::new();
    for &e in old {
        if mesh.cell_type(e)? == CellType::Triangle {
            triangles.push(e);
        }
    }
    for (i, &a) in triangles.iter().enumerate() {
        if !is_in_closure(mesh, a, verts[0])? {
            continue;
        }
        let edge0 = tri_edge_opposite_vert(mesh, a, verts[0])?;
        for (j, &b) in triangles.iter().enumerate() {
            if j == i || !is_in_closure(mesh, b, verts[1])? {
                continue;
            }
            if tri_edge_opposite_vert(mesh, b, verts[1])? == edge0 {
                return Ok(Some([a, b]));
            }
        }
    }
    Ok(None)
}

/// The two triangles sharing `edge`, preferring ones in `new`.
///
/// Unless `strict`, falls back to any up-adjacent triangles when fewer than
/// two new ones exist.
pub fn find_edge_triangles_shared<M: CurvedMesh + ?Sized>(
    mesh: &M,
    new: &HashSet<PointId>,
    edge: PointId,
    strict: bool,
) -> Result<[PointId; 2], MeshCurveError> {
    let up = mesh.upward(edge)?;
    let fresh: Vec<PointId> = up.iter().copied().filter(|t| new.contains(t)).collect();
    let candidates = if fresh.len() >= 2 || strict {
        fresh
    } else {
        log::warn!(
            "edge {edge} has {} new up-adjacent triangles, using all {}",
            fresh.len(),
            up.len()
        );
        up
    };
    match candidates.as_slice() {
        [a, b, ..] => Ok([*a, *b]),
        _ => Err(MeshCurveError::MissingUpwardTriangles {
            edge,
            found: candidates.len(),
        }),
    }
}

/// Edge of `tri` joining `v0` and `v1`, and whether it is stored from `v0` to `v1`.
pub fn find_edge_in_tri<M: CurvedMesh + ?Sized>(
    mesh: &M,
    v0: PointId,
    v1: PointId,
    tri: PointId,
) -> Result<(PointId, bool), MeshCurveError> {
    for edge in mesh.downward(tri, 1)? {
        let [a, b] = edge_pair(edge, &mesh.downward(edge, 0)?)?;
        if a == v0 && b == v1 {
            return Ok((edge, true));
        }
        if a == v1 && b == v0 {
            return Ok((edge, false));
        }
    }
    Err(MeshCurveError::EdgeNotInTriangle {
        triangle: tri,
        v0,
        v1,
    })
}

fn local_index(verts: &[PointId], tri: PointId, v: PointId) -> Result<usize, MeshCurveError> {
    verts
        .iter()
        .position(|w| *w == v)
        .ok_or(MeshCurveError::VertexNotInClosure {
            entity: tri,
            vertex: v,
        })
}

fn triangle_vertices<M: CurvedMesh + ?Sized>(mesh: &M, tri: PointId) -> Result<[PointId; 3], MeshCurveError> {
    let verts = mesh.downward(tri, 0)?;
    verts
        .as_slice()
        .try_into()
        .map_err(|_| MeshCurveError::DownwardMismatch {
            entity: tri,
            dimension: 0,
            expected: 3,
            found: verts.len(),
        })
}

fn connect<M: CurvedMesh + ?Sized>(
    mesh: &M,
    verts: [PointId; 4],
    tris: [PointId; 2],
    owner: impl Fn(usize) -> usize,
) -> Result<BlendedQuad, MeshCurveError> {
    let mut edges = [verts[0]; 4];
    let mut forward = [true; 4];
    for i in 0..4 {
        let (e, fwd) = find_edge_in_tri(mesh, verts[i], verts[(i + 1) % 4], tris[owner(i)])?;
        edges[i] = e;
        forward[i] = fwd;
    }
    Ok(BlendedQuad {
        verts,
        edges,
        forward,
    })
}

/// Quad over two old triangles found by cross pairing; the new edge
/// `verts[0]`–`verts[1]` is its diagonal.
pub fn cross_quad<M: CurvedMesh + ?Sized>(
    mesh: &M,
    verts: [PointId; 2],
    tris: [PointId; 2],
) -> Result<BlendedQuad, MeshCurveError> {
    let va = triangle_vertices(mesh, tris[0])?;
    let vb = triangle_vertices(mesh, tris[1])?;
    let i0 = local_index(&va, tris[0], verts[0])?;
    let i1 = local_index(&vb, tris[1], va[(i0 + 1) % 3])?;
    let i2 = local_index(&vb, tris[1], verts[1])?;
    let i3 = (i0 + 2) % 3;
    connect(mesh, [va[i0], vb[i1], vb[i2], va[i3]], tris, |i| {
        usize::from(i == 1 || i == 2)
    })
}

/// Quad over the two triangles sharing `edge`, which is its diagonal.
pub fn shared_quad<M: CurvedMesh + ?Sized>(
    mesh: &M,
    edge: PointId,
    verts: [PointId; 2],
    tris: [PointId; 2],
) -> Result<BlendedQuad, MeshCurveError> {
    let quad_verts = [
        verts[0],
        tri_vert_opposite_edge(mesh, tris[0], edge)?,
        verts[1],
        tri_vert_opposite_edge(mesh, tris[1], edge)?,
    ];
    connect(mesh, quad_verts, tris, |i| usize::from(i > 1))
}
