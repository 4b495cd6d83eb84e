use std::f32::consts::TAU;

use cgmath::{InnerSpace, Vector2, Vector3};
use matcap_scene::geometry::{
    axes_lines, box_geometry, text::shapes_from_contours, torus_geometry, triangulate,
    triangulate::signed_area,
};

use crate::common::test_utils::assert_close;

mod common;

fn square(x: f32, y: f32, size: f32) -> Vec<Vector2<f32>> {
    vec![
        Vector2::new(x, y),
        Vector2::new(x + size, y),
        Vector2::new(x + size, y + size),
        Vector2::new(x, y + size),
    ]
}

fn triangle_area(points: &[Vector2<f32>], [a, b, c]: [usize; 3]) -> f32 {
    signed_area(&[points[a], points[b], points[c]])
}

#[test]
fn box_has_four_vertices_and_two_triangles_per_face() {
    let geometry = box_geometry(1.0, 2.0, 3.0, 1);
    assert_eq!(geometry.vertices.len(), 24);
    assert_eq!(geometry.indices.len(), 36);

    let bounds = geometry.bounding_box().unwrap();
    assert_eq!(bounds.size(), Vector3::new(1.0, 2.0, 3.0));
    assert_eq!(bounds.center(), Vector3::new(0.0, 0.0, 0.0));
}

#[test]
fn box_normals_point_outwards() {
    let geometry = box_geometry(1.0, 1.0, 1.0, 2);
    for vertex in &geometry.vertices {
        let normal = Vector3::from(vertex.normal);
        let position = Vector3::from(vertex.position);
        assert_close(normal.magnitude(), 1.0, 1e-5);
        assert!(normal.dot(position) > 0.0, "{vertex:?}");
    }
}

#[test]
fn box_wireframe_includes_face_diagonals() {
    let geometry = box_geometry(1.0, 1.0, 1.0, 1);
    // four border edges and one diagonal on each of the six faces
    assert_eq!(geometry.edges().len(), 30);
    let lines = geometry.wireframe([1.0, 0.5, 0.0]);
    assert_eq!(lines.len(), 60);
    assert!(lines.iter().all(|line| line.color == [1.0, 0.5, 0.0]));
}

#[test]
fn torus_grid_sizes() {
    let geometry = torus_geometry(0.5, 0.3, 20, 20, TAU);
    assert_eq!(geometry.vertices.len(), 21 * 21);
    assert_eq!(geometry.triangle_count(), 20 * 20 * 2);
    assert!(geometry.indices.iter().all(|&i| (i as usize) < geometry.vertices.len()));
}

#[test]
fn torus_vertices_sit_on_the_tube() {
    let geometry = torus_geometry(0.5, 0.3, 12, 16, TAU);
    for vertex in &geometry.vertices {
        let [x, y, z] = vertex.position;
        let ring = (x * x + y * y).sqrt() - 0.5;
        assert_close((ring * ring + z * z).sqrt(), 0.3, 1e-4);
    }
    let bounds = geometry.bounding_box().unwrap();
    assert_close(bounds.size().x, 1.6, 1e-4);
    assert_close(bounds.size().z, 0.6, 1e-4);
}

#[test]
fn axes_are_three_segments_from_the_origin() {
    let lines = axes_lines(2.0);
    assert_eq!(lines.len(), 6);
    for (axis, pair) in lines.chunks_exact(2).enumerate() {
        assert_eq!(pair[0].position, [0.0; 3]);
        let mut end = [0.0; 3];
        end[axis] = 2.0;
        assert_eq!(pair[1].position, end);
        // each axis starts in its primary colour
        assert_eq!(pair[0].color[axis], 1.0);
    }
}

#[test]
fn centering_moves_the_bounds_to_the_origin() {
    let mut geometry = box_geometry(1.0, 1.0, 1.0, 1);
    geometry.translate(Vector3::new(3.0, -2.0, 5.0));
    assert_eq!(geometry.bounding_box().unwrap().center(), Vector3::new(3.0, -2.0, 5.0));
    geometry.center();
    let center = geometry.bounding_box().unwrap().center();
    assert_close(center.magnitude(), 0.0, 1e-5);
}

#[test]
fn empty_geometry_has_no_bounds() {
    let geometry = matcap_scene::geometry::Geometry::default();
    assert!(geometry.bounding_box().is_none());
    assert!(geometry.edges().is_empty());
}

#[test]
fn convex_polygon_gives_n_minus_two_triangles() {
    let hexagon: Vec<_> = (0..6)
        .map(|i| {
            let a = i as f32 / 6.0 * TAU;
            Vector2::new(a.cos(), a.sin())
        })
        .collect();
    let triangles = triangulate(&hexagon, &[]);
    assert_eq!(triangles.len(), 4);
    let area: f32 = triangles.iter().map(|&t| triangle_area(&hexagon, t)).sum();
    assert_close(area, signed_area(&hexagon), 1e-5);
}

#[test]
fn concave_polygon_covers_its_area() {
    let l_shape = vec![
        Vector2::new(0.0, 0.0),
        Vector2::new(2.0, 0.0),
        Vector2::new(2.0, 1.0),
        Vector2::new(1.0, 1.0),
        Vector2::new(1.0, 2.0),
        Vector2::new(0.0, 2.0),
    ];
    let triangles = triangulate(&l_shape, &[]);
    assert_eq!(triangles.len(), 4);
    for &triangle in &triangles {
        assert!(triangle_area(&l_shape, triangle) > 0.0);
    }
    let area: f32 = triangles.iter().map(|&t| triangle_area(&l_shape, t)).sum();
    assert_close(area, 3.0, 1e-5);
}

#[test]
fn clockwise_input_is_wound_counter_clockwise() {
    let mut contour = square(0.0, 0.0, 1.0);
    contour.reverse();
    let triangles = triangulate(&contour, &[]);
    assert_eq!(triangles.len(), 2);
    assert!(triangles.iter().all(|&t| triangle_area(&contour, t) > 0.0));
}

#[test]
fn holes_are_left_uncovered() {
    let outer = square(0.0, 0.0, 100.0);
    let hole = square(25.0, 25.0, 50.0);
    let triangles = triangulate(&outer, &[hole.clone()]);
    let points: Vec<_> = outer.iter().chain(&hole).copied().collect();

    let area: f32 = triangles.iter().map(|&t| triangle_area(&points, t)).sum();
    assert_close(area, 100.0 * 100.0 - 50.0 * 50.0, 1e-2);
    assert!(triangles.iter().flatten().all(|&i| i < points.len()));
}

#[test]
fn degenerate_contours_yield_nothing() {
    assert!(triangulate(&[Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0)], &[]).is_empty());
    let repeated = vec![Vector2::new(1.0, 1.0); 5];
    assert!(triangulate(&repeated, &[]).is_empty());
}

#[test]
fn closing_point_is_ignored() {
    let mut contour = square(0.0, 0.0, 1.0);
    contour.push(contour[0]);
    assert_eq!(triangulate(&contour, &[]).len(), 2);
}

#[test]
fn counter_clockwise_contours_inside_a_clockwise_one_become_holes() {
    let mut outer = square(0.0, 0.0, 10.0);
    outer.reverse();
    let inner = square(2.0, 2.0, 2.0);
    let shapes = shapes_from_contours(vec![outer, inner]);
    assert_eq!(shapes.len(), 1);
    assert_eq!(shapes[0].holes.len(), 1);
}

#[test]
fn contours_without_a_clockwise_one_are_all_solids() {
    let shapes = shapes_from_contours(vec![square(0.0, 0.0, 1.0), square(3.0, 0.0, 1.0)]);
    assert_eq!(shapes.len(), 2);
    assert!(shapes.iter().all(|shape| shape.holes.is_empty()));
}

#[test]
fn hole_belongs_to_the_smallest_enclosing_solid() {
    let mut big = square(0.0, 0.0, 10.0);
    big.reverse();
    let mut small = square(1.0, 1.0, 4.0);
    small.reverse();
    let hole = square(2.0, 2.0, 1.0);
    let shapes = shapes_from_contours(vec![big, small, hole]);
    assert_eq!(shapes.len(), 2);
    assert!(shapes[0].holes.is_empty());
    assert_eq!(shapes[1].holes.len(), 1);
}
