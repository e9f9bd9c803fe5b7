//! In-memory implementation of the [`CurvedMesh`] trait.
//!
//! [`InMemoryCurvedMesh`] stores simplices in hash maps keyed by [`PointId`],
//! with explicit downward adjacency per entity and a reverse (upward) index.
//! Edges and faces are looked up by their vertex sets when higher entities
//! are added, so callers only name vertices.
//!
//! Newly added entities get straight-sided control points (the affine
//! interpolation of their vertices).

use crate::bezier::nodes::internal_indices;
use crate::bezier::shape::BezierShape;
use crate::mesh_error::MeshCurveError;
use crate::topology::cell_type::{CellType, TET_EDGES, TET_FACES, TRI_EDGES};
use crate::topology::mesh::{CurvedMesh, Downward, Vector3};
use crate::topology::model::BoundaryModel;
use crate::topology::point::PointId;
use smallvec::smallvec;
use std::collections::HashMap;

#[derive(Clone, Debug)]
struct EntityRecord {
    cell_type: CellType,
    verts: Downward,
    edges: Downward,
    faces: Downward,
    model_dim: u8,
    points: Vec<Vector3>,
}

/// Hash-map backed simplicial mesh carrying a Bezier coordinate field.
#[derive(Debug)]
pub struct InMemoryCurvedMesh {
    dimension: u8,
    shape: BezierShape,
    entities: HashMap<PointId, EntityRecord>,
    upward: HashMap<PointId, Vec<PointId>>,
    model: Option<Box<dyn BoundaryModel>>,
    next_id: u64,
}

impl InMemoryCurvedMesh {
    /// Empty mesh of topological dimension 2 or 3.
    pub fn new(dimension: u8, shape: BezierShape) -> Result<Self, MeshCurveError> {
        if !(2..=3).contains(&dimension) {
            return Err(MeshCurveError::DimensionMismatch(format!(
                "mesh dimension must be 2 or 3, got {dimension}"
            )));
        }
        Ok(Self {
            dimension,
            shape,
            entities: HashMap::new(),
            upward: HashMap::new(),
            model: None,
            next_id: 1,
        })
    }

    /// Attach the boundary geometry used by [`CurvedMesh::snap_to_boundary`].
    pub fn with_model(mut self, model: Box<dyn BoundaryModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Number of entities of all dimensions.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, e: PointId) -> bool {
        self.entities.contains_key(&e)
    }

    /// An id not used by any entity so far.
    pub fn fresh_id(&mut self) -> Result<PointId, MeshCurveError> {
        while self.entities.contains_key(&PointId::new(self.next_id)?) {
            self.next_id += 1;
        }
        let id = PointId::new(self.next_id)?;
        self.next_id += 1;
        Ok(id)
    }

    /// Entities of dimension `dim`, sorted by id.
    pub fn entities_of_dimension(&self, dim: u8) -> Vec<PointId> {
        let mut out: Vec<PointId> = self
            .entities
            .iter()
            .filter(|(_, r)| r.cell_type.dimension() == dim)
            .map(|(id, _)| *id)
            .collect();
        out.sort_unstable();
        out
    }

    pub fn add_vertex(&mut self, id: PointId, x: Vector3, model_dim: u8) -> Result<(), MeshCurveError> {
        self.insert(
            id,
            EntityRecord {
                cell_type: CellType::Vertex,
                verts: smallvec![id],
                edges: Downward::new(),
                faces: Downward::new(),
                model_dim,
                points: vec![x],
            },
        )
    }

    /// Edge from `verts[0]` to `verts[1]`.
    pub fn add_edge(&mut self, id: PointId, verts: [PointId; 2], model_dim: u8) -> Result<(), MeshCurveError> {
        let verts: Downward = verts.iter().copied().collect();
        let points = self.linear_points(CellType::Segment, &verts)?;
        self.insert(
            id,
            EntityRecord {
                cell_type: CellType::Segment,
                verts,
                edges: Downward::new(),
                faces: Downward::new(),
                model_dim,
                points,
            },
        )
    }

    /// Triangle over `verts`; its three edges must already exist.
    pub fn add_triangle(&mut self, id: PointId, verts: [PointId; 3], model_dim: u8) -> Result<(), MeshCurveError> {
        let edges = TRI_EDGES
            .iter()
            .map(|[a, b]| {
                self.edge_between(verts[*a], verts[*b])
                    .ok_or(MeshCurveError::EdgeNotInTriangle {
                        triangle: id,
                        v0: verts[*a],
                        v1: verts[*b],
                    })
            })
            .collect::<Result<Downward, _>>()?;
        let verts: Downward = verts.iter().copied().collect();
        let points = self.linear_points(CellType::Triangle, &verts)?;
        self.insert(
            id,
            EntityRecord {
                cell_type: CellType::Triangle,
                verts,
                edges,
                faces: Downward::new(),
                model_dim,
                points,
            },
        )
    }

    /// Tetrahedron over `verts`; its edges and faces must already exist.
    pub fn add_tet(&mut self, id: PointId, verts: [PointId; 4], model_dim: u8) -> Result<(), MeshCurveError> {
        if self.dimension < 3 {
            return Err(MeshCurveError::DimensionMismatch(
                "tetrahedra require a 3D mesh".into(),
            ));
        }
        let edges = TET_EDGES
            .iter()
            .map(|[a, b]| {
                self.edge_between(verts[*a], verts[*b])
                    .ok_or(MeshCurveError::MissingEntity(id))
            })
            .collect::<Result<Downward, _>>()?;
        let faces = TET_FACES
            .iter()
            .map(|f| {
                self.face_between([verts[f[0]], verts[f[1]], verts[f[2]]])
                    .ok_or(MeshCurveError::MissingEntity(id))
            })
            .collect::<Result<Downward, _>>()?;
        let verts: Downward = verts.iter().copied().collect();
        let points = self.linear_points(CellType::Tetrahedron, &verts)?;
        self.insert(
            id,
            EntityRecord {
                cell_type: CellType::Tetrahedron,
                verts,
                edges,
                faces,
                model_dim,
                points,
            },
        )
    }

    /// The edge joining `a` and `b`, in either orientation.
    pub fn edge_between(&self, a: PointId, b: PointId) -> Option<PointId> {
        self.upward.get(&a)?.iter().copied().find(|e| {
            self.entities
                .get(e)
                .is_some_and(|r| r.cell_type == CellType::Segment && r.verts.contains(&b))
        })
    }

    /// The triangle with vertex set `verts`, in any orientation.
    pub fn face_between(&self, verts: [PointId; 3]) -> Option<PointId> {
        let e = self.edge_between(verts[0], verts[1])?;
        self.upward.get(&e)?.iter().copied().find(|f| {
            self.entities
                .get(f)
                .is_some_and(|r| verts.iter().all(|v| r.verts.contains(v)))
        })
    }

    /// Remove `e`. Entities that still have upward adjacencies cannot be removed.
    pub fn remove(&mut self, e: PointId) -> Result<(), MeshCurveError> {
        let record = self.entities.get(&e).ok_or(MeshCurveError::MissingEntity(e))?;
        if self.upward.get(&e).is_some_and(|up| !up.is_empty()) {
            return Err(MeshCurveError::InvalidGeometry(format!(
                "cannot remove {e}: still bounds higher-dimensional entities"
            )));
        }
        for d in self.direct_downward(record) {
            if let Some(up) = self.upward.get_mut(&d) {
                up.retain(|u| *u != e);
            }
        }
        self.entities.remove(&e);
        self.upward.remove(&e);
        Ok(())
    }

    fn insert(&mut self, id: PointId, record: EntityRecord) -> Result<(), MeshCurveError> {
        if self.entities.contains_key(&id) {
            return Err(MeshCurveError::DuplicateEntity(id));
        }
        if record.cell_type.dimension() > self.dimension {
            return Err(MeshCurveError::DimensionMismatch(format!(
                "{:?} does not fit a {}D mesh",
                record.cell_type, self.dimension
            )));
        }
        for d in self.direct_downward(&record) {
            self.upward.entry(d).or_default().push(id);
        }
        self.upward.entry(id).or_default();
        self.entities.insert(id, record);
        Ok(())
    }

    /// Entities exactly one dimension below `record`.
    fn direct_downward(&self, record: &EntityRecord) -> Downward {
        match record.cell_type {
            CellType::Vertex => Downward::new(),
            CellType::Segment => record.verts.clone(),
            CellType::Triangle => record.edges.clone(),
            CellType::Tetrahedron => record.faces.clone(),
        }
    }

    fn record(&self, e: PointId) -> Result<&EntityRecord, MeshCurveError> {
        self.entities.get(&e).ok_or(MeshCurveError::MissingEntity(e))
    }

    fn linear_points(&self, cell_type: CellType, verts: &[PointId]) -> Result<Vec<Vector3>, MeshCurveError> {
        let xs = verts
            .iter()
            .map(|v| self.position(*v))
            .collect::<Result<Vec<_>, _>>()?;
        let p = self.shape.order() as f64;
        Ok(internal_indices(cell_type.dimension(), self.shape.order())
            .iter()
            .map(|alpha| {
                let mut x = [0.0; 3];
                for (a, xv) in alpha.iter().zip(&xs) {
                    for k in 0..3 {
                        x[k] += *a as f64 / p * xv[k];
                    }
                }
                x
            })
            .collect())
    }
}

impl CurvedMesh for InMemoryCurvedMesh {
    fn dimension(&self) -> u8 {
        self.dimension
    }

    fn shape(&self) -> BezierShape {
        self.shape
    }

    fn cell_type(&self, e: PointId) -> Result<CellType, MeshCurveError> {
        Ok(self.record(e)?.cell_type)
    }

    fn downward(&self, e: PointId, dim: u8) -> Result<Downward, MeshCurveError> {
        let r = self.record(e)?;
        let own = r.cell_type.dimension();
        if dim == own {
            return Ok(smallvec![e]);
        }
        match dim {
            0 => Ok(r.verts.clone()),
            1 if own > 1 => Ok(r.edges.clone()),
            2 if own > 2 => Ok(r.faces.clone()),
            _ => Err(MeshCurveError::DimensionMismatch(format!(
                "{e} of dimension {own} has no downward entities of dimension {dim}"
            ))),
        }
    }

    fn upward(&self, e: PointId) -> Result<Vec<PointId>, MeshCurveError> {
        self.record(e)?;
        Ok(self.upward.get(&e).cloned().unwrap_or_default())
    }

    fn model_dimension(&self, e: PointId) -> Result<u8, MeshCurveError> {
        Ok(self.record(e)?.model_dim)
    }

    fn point(&self, e: PointId, node: usize) -> Result<Vector3, MeshCurveError> {
        let r = self.record(e)?;
        r.points
            .get(node)
            .copied()
            .ok_or(MeshCurveError::NodeIndexOutOfRange {
                entity: e,
                node,
                count: r.points.len(),
            })
    }

    fn set_point(&mut self, e: PointId, node: usize, x: Vector3) -> Result<(), MeshCurveError> {
        let r = self
            .entities
            .get_mut(&e)
            .ok_or(MeshCurveError::MissingEntity(e))?;
        let count = r.points.len();
        let slot = r
            .points
            .get_mut(node)
            .ok_or(MeshCurveError::NodeIndexOutOfRange { entity: e, node, count })?;
        *slot = x;
        Ok(())
    }

    fn snap_to_boundary(&self, edge: PointId, t: f64) -> Result<Vector3, MeshCurveError> {
        let r = self.record(edge)?;
        if r.cell_type != CellType::Segment {
            return Err(MeshCurveError::UnsupportedCellType {
                cell_type: r.cell_type,
                operation: "boundary snapping",
            });
        }
        let a = self.position(r.verts[0])?;
        let b = self.position(r.verts[1])?;
        let chord = [
            a[0] + t * (b[0] - a[0]),
            a[1] + t * (b[1] - a[1]),
            a[2] + t * (b[2] - a[2]),
        ];
        Ok(match &self.model {
            Some(model) => model.closest_point(chord),
            None => chord,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::model::Circle;

    fn pt(i: u64) -> PointId {
        PointId::new(i).unwrap()
    }

    fn triangle_mesh(order: usize) -> InMemoryCurvedMesh {
        let mut m = InMemoryCurvedMesh::new(2, BezierShape::new(order).unwrap()).unwrap();
        m.add_vertex(pt(1), [0.0, 0.0, 0.0], 1).unwrap();
        m.add_vertex(pt(2), [3.0, 0.0, 0.0], 1).unwrap();
        m.add_vertex(pt(3), [0.0, 3.0, 0.0], 1).unwrap();
        m.add_edge(pt(4), [pt(1), pt(2)], 1).unwrap();
        m.add_edge(pt(5), [pt(2), pt(3)], 1).unwrap();
        m.add_edge(pt(6), [pt(3), pt(1)], 1).unwrap();
        m.add_triangle(pt(7), [pt(1), pt(2), pt(3)], 2).unwrap();
        m
    }

    #[test]
    fn adjacency_is_consistent() {
        let m = triangle_mesh(3);
        assert_eq!(m.downward(pt(7), 1).unwrap().as_slice(), &[pt(4), pt(5), pt(6)]);
        assert_eq!(m.downward(pt(7), 2).unwrap().as_slice(), &[pt(7)]);
        assert_eq!(m.upward(pt(4)).unwrap(), vec![pt(7)]);
        assert_eq!(m.edge_between(pt(2), pt(1)), Some(pt(4)));
        assert_eq!(m.face_between([pt(3), pt(1), pt(2)]), Some(pt(7)));
        assert!(m.is_on_boundary(pt(4)).unwrap());
        assert!(!m.is_on_boundary(pt(7)).unwrap());
    }

    #[test]
    fn new_entities_are_straight_sided() {
        let m = triangle_mesh(3);
        assert_eq!(m.point(pt(4), 0).unwrap(), [1.0, 0.0, 0.0]);
        assert_eq!(m.point(pt(4), 1).unwrap(), [2.0, 0.0, 0.0]);
        assert_eq!(m.point(pt(7), 0).unwrap(), [1.0, 1.0, 0.0]);
        assert!(m.point(pt(7), 1).is_err());
    }

    #[test]
    fn foreign_vertex_is_not_in_the_closure() {
        let mut m = triangle_mesh(2);
        m.add_vertex(pt(8), [5.0, 5.0, 0.0], 2).unwrap();
        let err = crate::topology::mesh::tri_edge_opposite_vert(&m, pt(7), pt(8)).unwrap_err();
        assert_eq!(
            err,
            MeshCurveError::VertexNotInClosure {
                entity: pt(7),
                vertex: pt(8),
            }
        );
        assert_eq!(err.to_string(), format!("vertex {} is not in the closure of {}", pt(8), pt(7)));
    }

    #[test]
    fn remove_respects_upward_adjacency() {
        let mut m = triangle_mesh(2);
        assert!(m.remove(pt(4)).is_err());
        m.remove(pt(7)).unwrap();
        assert!(m.upward(pt(4)).unwrap().is_empty());
        m.remove(pt(4)).unwrap();
        assert_eq!(m.edge_between(pt(1), pt(2)), None);
        assert_eq!(m.fresh_id().unwrap(), pt(4));
    }

    #[test]
    fn duplicate_and_missing_entities() {
        let mut m = triangle_mesh(2);
        assert_eq!(
            m.add_vertex(pt(1), [0.0; 3], 0),
            Err(MeshCurveError::DuplicateEntity(pt(1)))
        );
        assert!(matches!(m.point(pt(99), 0), Err(MeshCurveError::MissingEntity(_))));
    }

    #[test]
    fn snapping_uses_the_model() {
        let m = triangle_mesh(2).with_model(Box::new(Circle {
            center: [0.0, 0.0],
            radius: 3.0,
        }));
        let x = m.snap_to_boundary(pt(5), 0.5).unwrap();
        let r = (x[0] * x[0] + x[1] * x[1]).sqrt();
        assert!((r - 3.0).abs() < 1e-12);
        assert!((x[0] - x[1]).abs() < 1e-12);
    }
}
