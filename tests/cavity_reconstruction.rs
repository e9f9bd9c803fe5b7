use approx::assert_abs_diff_eq;
use mesh_curve::bezier::field::evaluate_edge;
use mesh_curve::bezier::nodes::NodeTable;
use mesh_curve::curved::cavity::{CavityReconstructor, find_edge_triangles_cross};
use mesh_curve::curved::basis_cache::BasisTransformCache;
use mesh_curve::prelude::*;
use std::sync::Arc;

fn pt(id: u64) -> PointId {
    PointId::new(id).unwrap()
}

const DIAG: u64 = 9;
const OLD_A: u64 = 10;
const OLD_B: u64 = 11;
const NEW_EDGE: u64 = 12;
const NEW_C: u64 = 13;
const NEW_D: u64 = 14;

/// Unit square 1(0,0) 2(1,0) 3(1,1) 4(0,1) split along 1–3, then swapped to
/// 2–4. Old entities stay in the mesh; the host removes them afterwards.
fn swapped_square(order: usize) -> InMemoryCurvedMesh {
    let mut mesh = InMemoryCurvedMesh::new(2, BezierShape::new(order).unwrap()).unwrap();
    mesh.add_vertex(pt(1), [0.0, 0.0, 0.0], 1).unwrap();
    mesh.add_vertex(pt(2), [1.0, 0.0, 0.0], 1).unwrap();
    mesh.add_vertex(pt(3), [1.0, 1.0, 0.0], 1).unwrap();
    mesh.add_vertex(pt(4), [0.0, 1.0, 0.0], 1).unwrap();
    mesh.add_edge(pt(5), [pt(1), pt(2)], 1).unwrap();
    mesh.add_edge(pt(6), [pt(2), pt(3)], 1).unwrap();
    mesh.add_edge(pt(7), [pt(3), pt(4)], 1).unwrap();
    mesh.add_edge(pt(8), [pt(4), pt(1)], 1).unwrap();
    mesh.add_edge(pt(DIAG), [pt(1), pt(3)], 2).unwrap();
    mesh.add_triangle(pt(OLD_A), [pt(1), pt(2), pt(3)], 2).unwrap();
    mesh.add_triangle(pt(OLD_B), [pt(1), pt(3), pt(4)], 2).unwrap();
    mesh.add_edge(pt(NEW_EDGE), [pt(2), pt(4)], 2).unwrap();
    mesh.add_triangle(pt(NEW_C), [pt(2), pt(3), pt(4)], 2).unwrap();
    mesh.add_triangle(pt(NEW_D), [pt(2), pt(4), pt(1)], 2).unwrap();
    mesh
}

fn old() -> Vec<PointId> {
    vec![pt(DIAG), pt(OLD_A), pt(OLD_B)]
}

fn new() -> Vec<PointId> {
    vec![pt(NEW_EDGE), pt(NEW_C), pt(NEW_D)]
}

fn assert_point(actual: Vector3, expected: Vector3) {
    for k in 0..3 {
        assert_abs_diff_eq!(actual[k], expected[k], epsilon = 1e-12);
    }
}

#[test]
fn swap_blends_the_new_diagonal_over_the_old_pair() {
    let mut mesh = swapped_square(2);
    // Bulge the right side outwards.
    mesh.set_point(pt(6), 0, [1.5, 0.5, 0.0]).unwrap();
    let handler = bezier_shape_handler(&mesh, UniformSize(1.0), CurveOptions::default()).unwrap();
    let summary = handler.on_cavity(&mut mesh, &old(), &new()).unwrap();
    assert_eq!(summary.cross_blended, 1);
    assert_eq!(summary.shared_blended, 0);
    assert_eq!(summary.interior_propagated, 0);
    assert_point(mesh.point(pt(NEW_EDGE), 0).unwrap(), [0.625, 0.5, 0.0]);
}

#[test]
fn cross_pairing_failure_is_not_an_error() {
    let mesh = swapped_square(2);
    let found = find_edge_triangles_cross(&mesh, &[pt(OLD_A)], [pt(2), pt(4)]).unwrap();
    assert_eq!(found, None);
    let found = find_edge_triangles_cross(&mesh, &old(), [pt(2), pt(4)]).unwrap();
    assert_eq!(found, Some([pt(OLD_A), pt(OLD_B)]));
}

#[test]
fn fallback_blends_over_the_new_triangles() {
    let mut mesh = swapped_square(2);
    mesh.set_point(pt(6), 0, [1.5, 0.5, 0.0]).unwrap();
    let handler = bezier_shape_handler(&mesh, UniformSize(1.0), CurveOptions::default()).unwrap();
    let summary = handler.on_cavity(&mut mesh, &[], &new()).unwrap();
    assert_eq!(summary.cross_blended, 0);
    assert_eq!(summary.shared_blended, 1);
    assert_point(mesh.point(pt(NEW_EDGE), 0).unwrap(), [0.625, 0.5, 0.0]);
}

#[test]
fn strict_shared_pairing_requires_two_new_triangles() {
    let mut mesh = swapped_square(2);
    let options = CurveOptions {
        strict_new_entities: true,
        ..CurveOptions::default()
    };
    let handler = bezier_shape_handler(&mesh, UniformSize(1.0), options).unwrap();
    let err = handler
        .on_cavity(&mut mesh, &[], &[pt(NEW_EDGE), pt(NEW_C)])
        .unwrap_err();
    assert_eq!(
        err,
        MeshCurveError::MissingUpwardTriangles {
            edge: pt(NEW_EDGE),
            found: 1,
        }
    );

    let lenient = bezier_shape_handler(&mesh, UniformSize(1.0), CurveOptions::default()).unwrap();
    let summary = lenient
        .on_cavity(&mut mesh, &[], &[pt(NEW_EDGE), pt(NEW_C)])
        .unwrap();
    assert_eq!(summary.shared_blended, 1);
}

#[test]
fn cubic_swap_rebuilds_edge_and_face_interiors() {
    let mut mesh = swapped_square(3);
    let handler = bezier_shape_handler(&mesh, UniformSize(1.0), CurveOptions::default()).unwrap();
    let summary = handler.on_cavity(&mut mesh, &old(), &new()).unwrap();
    assert_eq!(summary.cross_blended, 1);
    assert_eq!(summary.interior_propagated, 2);
    assert_point(mesh.point(pt(NEW_EDGE), 0).unwrap(), [2.0 / 3.0, 1.0 / 3.0, 0.0]);
    assert_point(mesh.point(pt(NEW_EDGE), 1).unwrap(), [1.0 / 3.0, 2.0 / 3.0, 0.0]);
    assert_point(mesh.point(pt(NEW_C), 0).unwrap(), [2.0 / 3.0, 2.0 / 3.0, 0.0]);
    assert_point(mesh.point(pt(NEW_D), 0).unwrap(), [1.0 / 3.0, 1.0 / 3.0, 0.0]);
}

#[test]
fn quartic_swap_elevates_the_blended_cubic() {
    let mut mesh = swapped_square(4);
    let handler = bezier_shape_handler(&mesh, UniformSize(1.0), CurveOptions::default()).unwrap();
    handler.on_cavity(&mut mesh, &old(), &new()).unwrap();
    for j in 0..3 {
        let t = (1.0 + j as f64) / 4.0;
        assert_point(mesh.point(pt(NEW_EDGE), j).unwrap(), [1.0 - t, t, 0.0]);
    }
}

/// Quarter arc from (1,0) to (0,1) on the unit circle.
fn arc_mesh(order: usize) -> InMemoryCurvedMesh {
    let mut mesh = InMemoryCurvedMesh::new(2, BezierShape::new(order).unwrap())
        .unwrap()
        .with_model(Box::new(Circle {
            center: [0.0, 0.0],
            radius: 1.0,
        }));
    mesh.add_vertex(pt(1), [1.0, 0.0, 0.0], 1).unwrap();
    mesh.add_vertex(pt(2), [0.0, 1.0, 0.0], 1).unwrap();
    mesh.add_edge(pt(3), [pt(1), pt(2)], 1).unwrap();
    mesh
}

#[test]
fn new_boundary_edges_are_snapped_to_the_model() {
    for order in [2, 3, 5] {
        let mut mesh = arc_mesh(order);
        let handler =
            bezier_shape_handler(&mesh, UniformSize(1.0), CurveOptions::default()).unwrap();
        let summary = handler.on_cavity(&mut mesh, &[], &[pt(3)]).unwrap();
        assert_eq!(summary.snapped, 1);
        let table = NodeTable::new(CellType::Segment, order);
        for j in 1..order {
            let t = j as f64 / order as f64;
            let x = evaluate_edge(&mesh, &table, pt(3), t).unwrap();
            let r = (x[0] * x[0] + x[1] * x[1]).sqrt();
            assert_abs_diff_eq!(r, 1.0, epsilon = 1e-12);
        }
    }
}

#[test]
fn boundary_edges_stay_straight_without_snapping() {
    let mut mesh = arc_mesh(3);
    mesh.set_point(pt(3), 0, [5.0, 5.0, 5.0]).unwrap();
    let options = CurveOptions {
        should_snap: false,
        ..CurveOptions::default()
    };
    let handler = bezier_shape_handler(&mesh, UniformSize(1.0), options).unwrap();
    let summary = handler.on_cavity(&mut mesh, &[], &[pt(3)]).unwrap();
    assert_eq!(summary.linear_boundary, 1);
    assert_point(mesh.point(pt(3), 0).unwrap(), [2.0 / 3.0, 1.0 / 3.0, 0.0]);
    assert_point(mesh.point(pt(3), 1).unwrap(), [1.0 / 3.0, 2.0 / 3.0, 0.0]);
}

#[test]
fn reconstructor_is_usable_without_the_handler() {
    let mut mesh = swapped_square(3);
    let cache = Arc::new(BasisTransformCache::new(mesh.shape()).unwrap());
    let reconstructor = CavityReconstructor::new(cache, CurveOptions::default()).unwrap();
    assert!(reconstructor.interior().coefficients(2).is_some());
    assert!(reconstructor.interior().coefficients(3).is_none());
    let summary = reconstructor.reconstruct(&mut mesh, &old(), &new()).unwrap();
    assert_eq!(summary.interior_propagated, 2);
}
