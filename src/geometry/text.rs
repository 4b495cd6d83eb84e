//! Extruded, optionally bevelled 3D text.
//!
//! Glyph outlines come from a [`Typeface`]. Every glyph's contours are sorted into
//! solids and holes, the caps are triangulated and the side walls are swept through a
//! stack of layers: the back bevel rings, the extrusion itself and the front bevel rings.

use std::f32::consts::FRAC_PI_2;

use cgmath::{InnerSpace, Vector2, Vector3};

use crate::{
    data_structures::model::ModelVertex,
    geometry::{
        Geometry,
        triangulate::{signed_area, triangulate},
    },
    resources::font::Typeface,
};

#[derive(Clone, Debug, PartialEq)]
pub struct TextOptions {
    /// Font size in world units.
    pub size: f32,
    /// Extrusion depth along +Z, not counting the bevel.
    pub depth: f32,
    pub curve_segments: u32,
    pub bevel_enabled: bool,
    /// How far the bevel reaches along Z on each side.
    pub bevel_thickness: f32,
    /// How far the bevel grows the outline outwards.
    pub bevel_size: f32,
    pub bevel_offset: f32,
    pub bevel_segments: u32,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            size: 0.4,
            depth: 0.1,
            curve_segments: 5,
            bevel_enabled: true,
            bevel_thickness: 0.05,
            bevel_size: 0.02,
            bevel_offset: 0.0,
            bevel_segments: 5,
        }
    }
}

/// A filled outline with its holes.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    pub contour: Vec<Vector2<f32>>,
    pub holes: Vec<Vec<Vector2<f32>>>,
}

fn contains_point(polygon: &[Vector2<f32>], p: Vector2<f32>) -> bool {
    let mut inside = false;
    let n = polygon.len();
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + n - 1) % n];
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
    }
    inside
}

/// Group the contours of one glyph into shapes.
///
/// Typeface outlines draw solids clockwise and holes counter-clockwise. A glyph without
/// any clockwise contour uses the opposite convention, so all its contours are solids.
/// Each hole belongs to the smallest solid that contains it.
pub fn shapes_from_contours(contours: Vec<Vec<Vector2<f32>>>) -> Vec<Shape> {
    let contours: Vec<_> = contours.into_iter().filter(|c| c.len() >= 3).collect();
    let has_clockwise = contours.iter().any(|c| signed_area(c) < 0.0);

    let mut shapes = Vec::new();
    let mut holes = Vec::new();
    for contour in contours {
        if !has_clockwise || signed_area(&contour) < 0.0 {
            shapes.push(Shape {
                contour,
                holes: Vec::new(),
            });
        } else {
            holes.push(contour);
        }
    }

    for hole in holes {
        let probe = hole[0];
        let owner = shapes
            .iter_mut()
            .filter(|shape| contains_point(&shape.contour, probe))
            .min_by(|a, b| {
                signed_area(&a.contour)
                    .abs()
                    .total_cmp(&signed_area(&b.contour).abs())
            });
        match owner {
            Some(shape) => shape.holes.push(hole),
            None => log::debug!("Dropping a glyph hole outside of every solid"),
        }
    }
    shapes
}

/// Direction a vertex moves when its outline grows by one unit: the miter of the two
/// outward edge normals.
fn miter(prev: Vector2<f32>, p: Vector2<f32>, next: Vector2<f32>) -> Vector2<f32> {
    let outward = |d: Vector2<f32>| {
        let len = d.magnitude();
        if len <= f32::EPSILON {
            Vector2::new(0.0, 0.0)
        } else {
            Vector2::new(d.y, -d.x) / len
        }
    };
    let n1 = outward(p - prev);
    let n2 = outward(next - p);
    let denom = 1.0 + n1.dot(n2);
    if denom <= 1e-3 {
        return if n1.magnitude2() > 0.0 { n1 } else { n2 };
    }
    let m = (n1 + n2) / denom;
    let len = m.magnitude();
    if len > std::f32::consts::SQRT_2 {
        m * (std::f32::consts::SQRT_2 / len)
    } else {
        m
    }
}

fn miters(ring: &[Vector2<f32>]) -> Vec<Vector2<f32>> {
    let n = ring.len();
    (0..n)
        .map(|i| miter(ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]))
        .collect()
}

/// `(z, outline offset)` of every layer, from back to front.
fn layers(options: &TextOptions) -> Vec<(f32, f32)> {
    let mut layers = Vec::new();
    if !options.bevel_enabled || options.bevel_segments == 0 {
        layers.push((0.0, 0.0));
        layers.push((options.depth, 0.0));
        return layers;
    }
    let segments = options.bevel_segments;
    let ring = |b: u32| {
        let t = b as f32 / segments as f32;
        let z = options.bevel_thickness * (t * FRAC_PI_2).cos();
        let offset = options.bevel_size * (t * FRAC_PI_2).sin() + options.bevel_offset;
        (z, offset)
    };
    let full = options.bevel_size + options.bevel_offset;

    for b in 0..segments {
        let (z, offset) = ring(b);
        layers.push((-z, offset));
    }
    layers.push((0.0, full));
    layers.push((options.depth, full));
    for b in (0..segments).rev() {
        let (z, offset) = ring(b);
        layers.push((options.depth + z, offset));
    }
    layers
}

struct FlatBuilder {
    geometry: Geometry,
}

impl FlatBuilder {
    fn push(&mut self, corners: [(Vector3<f32>, [f32; 2]); 3]) {
        let [(a, _), (b, _), (c, _)] = corners;
        let normal = (b - a).cross(c - a);
        if normal.magnitude2() <= f32::EPSILON * f32::EPSILON {
            return;
        }
        let normal = normal.normalize();
        for (position, tex_coords) in corners {
            self.geometry.indices.push(self.geometry.vertices.len() as u32);
            self.geometry.vertices.push(ModelVertex {
                position: position.into(),
                tex_coords,
                normal: normal.into(),
            });
        }
    }
}

fn side_uv(a: Vector3<f32>, b: Vector3<f32>, p: Vector3<f32>) -> [f32; 2] {
    if (a.y - b.y).abs() < (a.x - b.x).abs() {
        [p.x, 1.0 - p.z]
    } else {
        [p.y, 1.0 - p.z]
    }
}

fn extrude_shape(builder: &mut FlatBuilder, shape: &Shape, options: &TextOptions) {
    let mut contour = shape.contour.clone();
    if signed_area(&contour) < 0.0 {
        contour.reverse();
    }
    let holes: Vec<Vec<Vector2<f32>>> = shape
        .holes
        .iter()
        .map(|hole| {
            let mut hole = hole.clone();
            if signed_area(&hole) > 0.0 {
                hole.reverse();
            }
            hole
        })
        .collect();

    // contour counter-clockwise and holes clockwise: every miter points away from the fill
    let rings: Vec<(Vec<Vector2<f32>>, Vec<Vector2<f32>>)> = std::iter::once(contour)
        .chain(holes)
        .map(|ring| {
            let miters = miters(&ring);
            (ring, miters)
        })
        .collect();
    let layers = layers(options);
    let at = |ring: usize, i: usize, layer: usize| {
        let (points, miters) = &rings[ring];
        let (z, offset) = layers[layer];
        let p = points[i] + miters[i] * offset;
        Vector3::new(p.x, p.y, z)
    };

    // caps share one triangulation: both sit at the outline offset of the outermost rings
    let cap_offset = layers[0].1;
    let cap_points: Vec<Vec<Vector2<f32>>> = rings
        .iter()
        .map(|(points, miters)| {
            points
                .iter()
                .zip(miters)
                .map(|(&p, &m)| p + m * cap_offset)
                .collect()
        })
        .collect();
    let mut flat_index = Vec::new();
    for (ring, points) in cap_points.iter().enumerate() {
        flat_index.extend((0..points.len()).map(|i| (ring, i)));
    }
    let triangles = triangulate(&cap_points[0], &cap_points[1..]);
    let last = layers.len() - 1;
    let cap_uv = |p: Vector3<f32>| [p.x, p.y];
    for [a, b, c] in triangles {
        let [a, b, c] = [a, b, c].map(|k| flat_index[k]);
        let front = [a, b, c].map(|(ring, i)| at(ring, i, last));
        builder.push(front.map(|p| (p, cap_uv(p))));
        let back = [c, b, a].map(|(ring, i)| at(ring, i, 0));
        builder.push(back.map(|p| (p, cap_uv(p))));
    }

    for (ring, (points, _)) in rings.iter().enumerate() {
        let n = points.len();
        for layer in 0..last {
            for i in 0..n {
                let j = (i + 1) % n;
                let a = at(ring, i, layer);
                let b = at(ring, j, layer);
                let c = at(ring, j, layer + 1);
                let d = at(ring, i, layer + 1);
                let uv = |p| side_uv(a, b, p);
                builder.push([(a, uv(a)), (b, uv(b)), (c, uv(c))]);
                builder.push([(a, uv(a)), (c, uv(c)), (d, uv(d))]);
            }
        }
    }
}

/// Build flat shaded, centered 3D text.
///
/// The result is not indexed in the usual sense: every triangle has its own three
/// vertices so that each face keeps its own normal.
pub fn text_geometry(font: &Typeface, text: &str, options: &TextOptions) -> Geometry {
    let mut builder = FlatBuilder {
        geometry: Geometry::default(),
    };
    for glyph in font.glyph_paths(text, options.size, options.curve_segments) {
        for shape in shapes_from_contours(glyph) {
            extrude_shape(&mut builder, &shape, options);
        }
    }
    let mut geometry = builder.geometry;
    geometry.center();
    geometry
}
