//! Reference refinement templates and uniform-split helpers for
//! [`InMemoryCurvedMesh`].
//!
//! The helpers perform the topological half of refinement: they create split
//! vertices, half edges, interior edges/faces and child simplices, and record
//! every edge split in a [`RefinementContext`]. Control points of the new
//! entities are left straight-sided; computing the curved geometry is the
//! job of [`crate::curved::SolutionTransfer::on_refine`], which the caller
//! invokes per parent with the returned entity lists.
//!
//! # Expected invariants
//! - Shared edges are split once; a second triangle or tet touching an
//!   already-split edge reuses its split vertex and halves.
//! - Children keep the orientation of the parent through the reference
//!   templates.
//! - Parents are not removed; callers remove them after geometry transfer.

use crate::bezier::field::evaluate_edge;
use crate::bezier::nodes::NodeTable;
use crate::mesh_error::MeshCurveError;
use crate::topology::cell_type::{CellType, TET_FACES};
use crate::topology::in_memory::InMemoryCurvedMesh;
use crate::topology::mesh::{CurvedMesh, edge_pair};
use crate::topology::point::PointId;
use std::collections::HashMap;

/// Records which vertex was inserted on each split edge.
#[derive(Clone, Debug, Default)]
pub struct RefinementContext {
    splits: HashMap<PointId, PointId>,
}

impl RefinementContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `edge` was split by `vertex`.
    pub fn record_split(&mut self, edge: PointId, vertex: PointId) {
        self.splits.insert(edge, vertex);
    }

    /// The vertex inserted on `edge`, if it was split.
    pub fn split_vertex(&self, edge: PointId) -> Option<PointId> {
        self.splits.get(&edge).copied()
    }

    pub fn len(&self) -> usize {
        self.splits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }
}

/// Reference 1→4 subdivision of a triangle given vertices and mid-edge points.
pub fn triangle_subdivision(vertices: [PointId; 3], midpoints: [PointId; 3]) -> [[PointId; 3]; 4] {
    let [v0, v1, v2] = vertices;
    let [m01, m12, m20] = midpoints;
    [
        [v0, m01, m20],
        [v1, m12, m01],
        [v2, m20, m12],
        [m01, m12, m20],
    ]
}

/// Reference 1→8 subdivision of a tetrahedron given vertices and mid-edge
/// points (`m01, m12, m20, m03, m13, m23`). The inner octahedron is cut along
/// the `m01`–`m23` diagonal.
pub fn tetrahedron_subdivision(
    vertices: [PointId; 4],
    midpoints: [PointId; 6],
) -> [[PointId; 4]; 8] {
    let [v0, v1, v2, v3] = vertices;
    let [m01, m12, m20, m03, m13, m23] = midpoints;
    [
        [v0, m01, m20, m03],
        [v1, m12, m01, m13],
        [v2, m20, m12, m23],
        [v3, m03, m13, m23],
        [m01, m12, m13, m23],
        [m01, m13, m03, m23],
        [m01, m03, m20, m23],
        [m01, m20, m12, m23],
    ]
}

/// Entities created by splitting one edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeSplit {
    /// The split parent edge.
    pub edge: PointId,
    /// New vertex followed by the two half edges.
    pub new_entities: Vec<PointId>,
}

/// Entities created by uniformly splitting a triangle or tet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UniformSplit {
    /// Edges split by this call (edges split earlier are reused, not listed).
    pub edges: Vec<EdgeSplit>,
    /// Per split face: the face and its new interior edges and child triangles.
    pub faces: Vec<(PointId, Vec<PointId>)>,
    /// For a tet split: the tet and the new entities interior to it.
    pub cell: Option<(PointId, Vec<PointId>)>,
}

impl UniformSplit {
    /// `(parent, new entities)` pairs in the order geometry must be transferred.
    pub fn parents(&self) -> impl Iterator<Item = (PointId, &[PointId])> {
        self.edges
            .iter()
            .map(|s| (s.edge, s.new_entities.as_slice()))
            .chain(self.faces.iter().map(|(f, n)| (*f, n.as_slice())))
            .chain(self.cell.iter().map(|(c, n)| (*c, n.as_slice())))
    }
}

/// Split `edge` at the midpoint of its curve, or return `None` if already split.
pub fn split_edge(
    mesh: &mut InMemoryCurvedMesh,
    ctx: &mut RefinementContext,
    edge: PointId,
) -> Result<Option<EdgeSplit>, MeshCurveError> {
    if ctx.split_vertex(edge).is_some() {
        return Ok(None);
    }
    let [v0, v1] = edge_pair(edge, &mesh.downward(edge, 0)?)?;
    let model_dim = mesh.model_dimension(edge)?;
    let table = NodeTable::new(CellType::Segment, mesh.shape().order());
    let x = evaluate_edge(mesh, &table, edge, 0.5)?;
    let m = mesh.fresh_id()?;
    mesh.add_vertex(m, x, model_dim)?;
    let h0 = mesh.fresh_id()?;
    mesh.add_edge(h0, [v0, m], model_dim)?;
    let h1 = mesh.fresh_id()?;
    mesh.add_edge(h1, [m, v1], model_dim)?;
    ctx.record_split(edge, m);
    log::debug!("split edge {edge} at {m}");
    Ok(Some(EdgeSplit {
        edge,
        new_entities: vec![m, h0, h1],
    }))
}

/// Uniform 1→4 split of triangle `tri`.
///
/// The returned [`UniformSplit::faces`] holds the single entry for `tri`.
pub fn split_triangle_uniform(
    mesh: &mut InMemoryCurvedMesh,
    ctx: &mut RefinementContext,
    tri: PointId,
) -> Result<UniformSplit, MeshCurveError> {
    let mut out = UniformSplit::default();
    let created = split_face(mesh, ctx, tri, &mut out.edges)?;
    out.faces.push((tri, created));
    Ok(out)
}

/// Uniform 1→8 split of tetrahedron `tet`.
pub fn split_tet_uniform(
    mesh: &mut InMemoryCurvedMesh,
    ctx: &mut RefinementContext,
    tet: PointId,
) -> Result<UniformSplit, MeshCurveError> {
    let verts = mesh.downward(tet, 0)?;
    let v: [PointId; 4] = verts
        .as_slice()
        .try_into()
        .map_err(|_| MeshCurveError::DownwardMismatch {
            entity: tet,
            dimension: 0,
            expected: 4,
            found: verts.len(),
        })?;
    let model_dim = mesh.model_dimension(tet)?;
    let mut out = UniformSplit::default();
    for face in mesh.downward(tet, 2)? {
        let created = split_face(mesh, ctx, face, &mut out.edges)?;
        if !created.is_empty() {
            out.faces.push((face, created));
        }
    }
    let mut mids = [v[0]; 6];
    for (i, edge) in mesh.downward(tet, 1)?.iter().enumerate() {
        mids[i] = ctx
            .split_vertex(*edge)
            .ok_or(MeshCurveError::MissingEntity(*edge))?;
    }
    let children = tetrahedron_subdivision(v, mids);
    let mut interior = Vec::new();
    ensure_edge(mesh, mids[0], mids[5], model_dim, &mut interior)?;
    for child in &children {
        for f in &TET_FACES {
            let fv = [child[f[0]], child[f[1]], child[f[2]]];
            if mesh.face_between(fv).is_none() {
                let id = mesh.fresh_id()?;
                mesh.add_triangle(id, fv, model_dim)?;
                interior.push(id);
            }
        }
    }
    for child in children {
        let id = mesh.fresh_id()?;
        mesh.add_tet(id, child, model_dim)?;
        interior.push(id);
    }
    out.cell = Some((tet, interior));
    Ok(out)
}

/// Split the edges and interior of `face`; returns the new entities of the
/// face itself (empty when an earlier call already split it).
fn split_face(
    mesh: &mut InMemoryCurvedMesh,
    ctx: &mut RefinementContext,
    face: PointId,
    edge_splits: &mut Vec<EdgeSplit>,
) -> Result<Vec<PointId>, MeshCurveError> {
    let verts = mesh.downward(face, 0)?;
    let v: [PointId; 3] = verts
        .as_slice()
        .try_into()
        .map_err(|_| MeshCurveError::DownwardMismatch {
            entity: face,
            dimension: 0,
            expected: 3,
            found: verts.len(),
        })?;
    let model_dim = mesh.model_dimension(face)?;
    let mut mids = [v[0]; 3];
    for (i, edge) in mesh.downward(face, 1)?.iter().enumerate() {
        if let Some(split) = split_edge(mesh, ctx, *edge)? {
            edge_splits.push(split);
        }
        mids[i] = ctx
            .split_vertex(*edge)
            .ok_or(MeshCurveError::MissingEntity(*edge))?;
    }
    let mut created = Vec::new();
    for i in 0..3 {
        ensure_edge(mesh, mids[i], mids[(i + 1) % 3], model_dim, &mut created)?;
    }
    for child in triangle_subdivision(v, mids) {
        if mesh.face_between(child).is_none() {
            let id = mesh.fresh_id()?;
            mesh.add_triangle(id, child, model_dim)?;
            created.push(id);
        }
    }
    Ok(created)
}

fn ensure_edge(
    mesh: &mut InMemoryCurvedMesh,
    a: PointId,
    b: PointId,
    model_dim: u8,
    created: &mut Vec<PointId>,
) -> Result<(), MeshCurveError> {
    if mesh.edge_between(a, b).is_none() {
        let id = mesh.fresh_id()?;
        mesh.add_edge(id, [a, b], model_dim)?;
        created.push(id);
    }
    Ok(())
}
