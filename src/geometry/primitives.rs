//! Box, torus and axes geometry generators.
//!
//! Texture coordinates use a bottom-left origin (v grows upwards). The shaders flip `v`
//! when sampling so images appear upright.

use std::f32::consts::TAU;

use cgmath::{InnerSpace, Vector3};

use crate::{
    data_structures::model::{LineVertex, ModelVertex},
    geometry::Geometry,
};

#[derive(Clone, Copy)]
enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

/// One side of a box: a `grid_x` by `grid_y` plane facing along `w`.
struct Plane {
    u: Axis,
    v: Axis,
    w: Axis,
    u_dir: f32,
    v_dir: f32,
    width: f32,
    height: f32,
    depth: f32,
    grid_x: u32,
    grid_y: u32,
}

fn push_plane(geometry: &mut Geometry, plane: Plane) {
    let offset = geometry.vertices.len() as u32;
    let segment_width = plane.width / plane.grid_x as f32;
    let segment_height = plane.height / plane.grid_y as f32;
    let width_half = plane.width / 2.0;
    let height_half = plane.height / 2.0;
    let depth_half = plane.depth / 2.0;
    let grid_x1 = plane.grid_x + 1;

    for iy in 0..=plane.grid_y {
        let y = iy as f32 * segment_height - height_half;
        for ix in 0..=plane.grid_x {
            let x = ix as f32 * segment_width - width_half;

            let mut position = [0.0; 3];
            position[plane.u as usize] = x * plane.u_dir;
            position[plane.v as usize] = y * plane.v_dir;
            position[plane.w as usize] = depth_half;

            let mut normal = [0.0; 3];
            normal[plane.w as usize] = if plane.depth > 0.0 { 1.0 } else { -1.0 };

            geometry.vertices.push(ModelVertex {
                position,
                tex_coords: [
                    ix as f32 / plane.grid_x as f32,
                    1.0 - iy as f32 / plane.grid_y as f32,
                ],
                normal,
            });
        }
    }

    for iy in 0..plane.grid_y {
        for ix in 0..plane.grid_x {
            let a = offset + ix + grid_x1 * iy;
            let b = offset + ix + grid_x1 * (iy + 1);
            let c = offset + (ix + 1) + grid_x1 * (iy + 1);
            let d = offset + (ix + 1) + grid_x1 * iy;
            geometry.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
}

/// An axis-aligned box centered at the origin.
///
/// Every face is its own `segments` by `segments` grid with outward normals, so a box
/// with one segment has 24 vertices and 36 indices.
pub fn box_geometry(width: f32, height: f32, depth: f32, segments: u32) -> Geometry {
    let segments = segments.max(1);
    let mut geometry = Geometry::default();
    let side = |u, v, w, u_dir, v_dir, width, height, depth| Plane {
        u,
        v,
        w,
        u_dir,
        v_dir,
        width,
        height,
        depth,
        grid_x: segments,
        grid_y: segments,
    };
    use Axis::*;
    // +x, -x, +y, -y, +z, -z
    push_plane(&mut geometry, side(Z, Y, X, -1.0, -1.0, depth, height, width));
    push_plane(&mut geometry, side(Z, Y, X, 1.0, -1.0, depth, height, -width));
    push_plane(&mut geometry, side(X, Z, Y, 1.0, 1.0, width, depth, height));
    push_plane(&mut geometry, side(X, Z, Y, 1.0, -1.0, width, depth, -height));
    push_plane(&mut geometry, side(X, Y, Z, 1.0, -1.0, width, height, depth));
    push_plane(&mut geometry, side(X, Y, Z, -1.0, -1.0, width, height, -depth));
    geometry
}

/// A torus lying in the XY plane around the Z axis.
///
/// `radius` is the distance from the center to the middle of the tube, `tube` the tube
/// radius and `arc` the swept angle (use `TAU` for a closed ring).
pub fn torus_geometry(
    radius: f32,
    tube: f32,
    radial_segments: u32,
    tubular_segments: u32,
    arc: f32,
) -> Geometry {
    let radial_segments = radial_segments.max(2);
    let tubular_segments = tubular_segments.max(3);
    let mut geometry = Geometry::default();

    for j in 0..=radial_segments {
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * arc;
            let v = j as f32 / radial_segments as f32 * TAU;

            let position = Vector3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let center = Vector3::new(radius * u.cos(), radius * u.sin(), 0.0);
            let normal = (position - center).normalize();

            geometry.vertices.push(ModelVertex {
                position: position.into(),
                tex_coords: [
                    i as f32 / tubular_segments as f32,
                    j as f32 / radial_segments as f32,
                ],
                normal: normal.into(),
            });
        }
    }

    let row = tubular_segments + 1;
    for j in 1..=radial_segments {
        for i in 1..=tubular_segments {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            geometry.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    geometry
}

/// Three line segments from the origin: X in red, Y in green and Z in blue.
///
/// Each segment blends towards a lighter tint at its far end.
pub fn axes_lines(size: f32) -> Vec<LineVertex> {
    let line = |end: [f32; 3], near: [f32; 3], far: [f32; 3]| {
        [
            LineVertex {
                position: [0.0; 3],
                color: near,
            },
            LineVertex {
                position: end,
                color: far,
            },
        ]
    };
    [
        line([size, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.6, 0.0]),
        line([0.0, size, 0.0], [0.0, 1.0, 0.0], [0.6, 1.0, 0.0]),
        line([0.0, 0.0, size], [0.0, 0.0, 1.0], [0.0, 0.6, 1.0]),
    ]
    .into_iter()
    .flatten()
    .collect()
}
