use approx::assert_abs_diff_eq;
use mesh_curve::geometry::quality::measure_element_quality;
use mesh_curve::prelude::*;

fn pt(id: u64) -> PointId {
    PointId::new(id).unwrap()
}

fn triangle(order: usize) -> InMemoryCurvedMesh {
    let mut mesh = InMemoryCurvedMesh::new(2, BezierShape::new(order).unwrap()).unwrap();
    mesh.add_vertex(pt(1), [0.0, 0.0, 0.0], 2).unwrap();
    mesh.add_vertex(pt(2), [2.0, 0.0, 0.0], 2).unwrap();
    mesh.add_vertex(pt(3), [0.5, 1.5, 0.0], 2).unwrap();
    mesh.add_edge(pt(4), [pt(1), pt(2)], 2).unwrap();
    mesh.add_edge(pt(5), [pt(2), pt(3)], 2).unwrap();
    mesh.add_edge(pt(6), [pt(3), pt(1)], 2).unwrap();
    mesh.add_triangle(pt(7), [pt(1), pt(2), pt(3)], 2).unwrap();
    mesh
}

#[test]
fn straight_triangle_quality_is_the_size_field_quality() {
    let size = UniformSize(0.5);
    for order in [1, 2, 4] {
        let mesh = triangle(order);
        let handler = bezier_shape_handler(&mesh, size, CurveOptions::default()).unwrap();
        let q = handler.quality(&mesh, pt(7)).unwrap();
        let xs = [[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.5, 1.5, 0.0]];
        let expected = measure_element_quality(&size, CellType::Triangle, &xs).unwrap();
        assert_abs_diff_eq!(q, expected, epsilon = 1e-12);
    }
}

#[test]
fn self_intersecting_element_gets_the_sentinel() {
    let mut mesh = triangle(2);
    // Drag the bottom edge's control point above the opposite vertex.
    mesh.set_point(pt(4), 0, [1.0, 4.0, 0.0]).unwrap();
    let handler = bezier_shape_handler(&mesh, UniformSize(1.0), CurveOptions::default()).unwrap();
    assert_eq!(handler.quality(&mesh, pt(7)).unwrap(), INVALID_QUALITY);
}

#[test]
fn flat_elements_are_rejected_not_errors() {
    let mut mesh = InMemoryCurvedMesh::new(2, BezierShape::new(2).unwrap()).unwrap();
    mesh.add_vertex(pt(1), [0.0, 0.0, 0.0], 2).unwrap();
    mesh.add_vertex(pt(2), [2.0, 0.0, 0.0], 2).unwrap();
    mesh.add_vertex(pt(3), [1.0, 0.0, 0.0], 2).unwrap();
    mesh.add_edge(pt(4), [pt(1), pt(2)], 2).unwrap();
    mesh.add_edge(pt(5), [pt(2), pt(3)], 2).unwrap();
    mesh.add_edge(pt(6), [pt(3), pt(1)], 2).unwrap();
    mesh.add_triangle(pt(7), [pt(1), pt(2), pt(3)], 2).unwrap();
    let handler = bezier_shape_handler(&mesh, UniformSize(1.0), CurveOptions::default()).unwrap();
    assert_eq!(handler.quality(&mesh, pt(7)).unwrap(), INVALID_QUALITY);

    let mut mesh = InMemoryCurvedMesh::new(3, BezierShape::new(2).unwrap()).unwrap();
    let xs = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [1.0, 1.0, 0.0],
    ];
    for (i, x) in xs.iter().enumerate() {
        mesh.add_vertex(pt(i as u64 + 1), *x, 3).unwrap();
    }
    let v = [pt(1), pt(2), pt(3), pt(4)];
    let edges = [[0, 1], [1, 2], [2, 0], [0, 3], [1, 3], [2, 3]];
    for (i, [a, b]) in edges.iter().enumerate() {
        mesh.add_edge(pt(10 + i as u64), [v[*a], v[*b]], 3).unwrap();
    }
    let faces = [[0, 1, 2], [0, 1, 3], [1, 2, 3], [0, 2, 3]];
    for (i, f) in faces.iter().enumerate() {
        mesh.add_triangle(pt(20 + i as u64), [v[f[0]], v[f[1]], v[f[2]]], 3)
            .unwrap();
    }
    mesh.add_tet(pt(30), v, 3).unwrap();
    let handler = bezier_shape_handler(&mesh, UniformSize(1.0), CurveOptions::default()).unwrap();
    assert_eq!(handler.quality(&mesh, pt(30)).unwrap(), INVALID_QUALITY);
}

#[test]
fn curvature_lowers_quality() {
    let mut mesh = triangle(3);
    let handler = bezier_shape_handler(&mesh, UniformSize(1.0), CurveOptions::default()).unwrap();
    let straight = handler.quality(&mesh, pt(7)).unwrap();
    let mut x = mesh.point(pt(4), 0).unwrap();
    x[1] -= 0.2;
    mesh.set_point(pt(4), 0, x).unwrap();
    let curved = handler.quality(&mesh, pt(7)).unwrap();
    assert!(curved > 0.0);
    assert!(curved < straight);
}

#[test]
fn straight_tet_quality_is_the_size_field_quality() {
    let mut mesh = InMemoryCurvedMesh::new(3, BezierShape::new(2).unwrap()).unwrap();
    let xs = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
    ];
    for (i, x) in xs.iter().enumerate() {
        mesh.add_vertex(pt(i as u64 + 1), *x, 3).unwrap();
    }
    let v = [pt(1), pt(2), pt(3), pt(4)];
    let edges = [[0, 1], [1, 2], [2, 0], [0, 3], [1, 3], [2, 3]];
    for (i, [a, b]) in edges.iter().enumerate() {
        mesh.add_edge(pt(10 + i as u64), [v[*a], v[*b]], 3).unwrap();
    }
    let faces = [[0, 1, 2], [0, 1, 3], [1, 2, 3], [0, 2, 3]];
    for (i, f) in faces.iter().enumerate() {
        mesh.add_triangle(pt(20 + i as u64), [v[f[0]], v[f[1]], v[f[2]]], 3)
            .unwrap();
    }
    mesh.add_tet(pt(30), v, 3).unwrap();
    let handler = bezier_shape_handler(&mesh, UniformSize(1.0), CurveOptions::default()).unwrap();
    let q = handler.quality(&mesh, pt(30)).unwrap();
    let expected = measure_element_quality(&UniformSize(1.0), CellType::Tetrahedron, &xs).unwrap();
    assert!(expected > 0.0);
    assert_abs_diff_eq!(q, expected, epsilon = 1e-12);
}

#[test]
fn quality_rejects_edges_and_vertices() {
    let mesh = triangle(2);
    let handler = bezier_shape_handler(&mesh, UniformSize(1.0), CurveOptions::default()).unwrap();
    assert!(matches!(
        handler.quality(&mesh, pt(4)),
        Err(MeshCurveError::UnsupportedCellType {
            cell_type: CellType::Segment,
            ..
        })
    ));
    assert!(handler.quality(&mesh, pt(1)).is_err());
    assert!(matches!(
        handler.quality(&mesh, pt(99)),
        Err(MeshCurveError::MissingEntity(_))
    ));
}

#[test]
fn options_round_trip_through_serde() {
    let options: CurveOptions = serde_json::from_str(r#"{"should_snap":false}"#).unwrap();
    assert!(!options.should_snap);
    assert_eq!(options.validity_samples, 2);
    assert!(!options.strict_new_entities);
}
