//! CPU-side geometry.
//!
//! Everything in here produces plain vertex and index lists that can be inspected and
//! tested without a GPU. [`Geometry::to_mesh`] is the single point where data is
//! uploaded.

use std::collections::HashSet;

use cgmath::Vector3;
use wgpu::util::DeviceExt;

use crate::data_structures::model::{self, LineVertex, ModelVertex};

pub mod primitives;
pub mod text;
pub mod triangulate;

pub use primitives::{axes_lines, box_geometry, torus_geometry};
pub use text::{TextOptions, text_geometry};
pub use triangulate::triangulate;

/// Axis-aligned bounds of a geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl BoundingBox {
    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }
}

/// An indexed triangle list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns `None` for a geometry without vertices.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first: Vector3<f32> = self.vertices.first()?.position.into();
        let bounds = self.vertices.iter().fold(
            BoundingBox {
                min: first,
                max: first,
            },
            |bounds, vertex| {
                let [x, y, z] = vertex.position;
                BoundingBox {
                    min: Vector3::new(bounds.min.x.min(x), bounds.min.y.min(y), bounds.min.z.min(z)),
                    max: Vector3::new(bounds.max.x.max(x), bounds.max.y.max(y), bounds.max.z.max(z)),
                }
            },
        );
        Some(bounds)
    }

    pub fn translate(&mut self, offset: Vector3<f32>) {
        self.vertices.iter_mut().for_each(|vertex| {
            vertex.position = (Vector3::from(vertex.position) + offset).into();
        });
    }

    /// Move the geometry so that the center of its bounding box sits at the origin.
    pub fn center(&mut self) {
        if let Some(bounds) = self.bounding_box() {
            self.translate(-bounds.center());
        }
    }

    /// Unique undirected triangle edges as vertex index pairs (smaller index first).
    ///
    /// Edges are returned in the order they first appear in the index list.
    pub fn edges(&self) -> Vec<[u32; 2]> {
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for triangle in self.indices.chunks_exact(3) {
            for (a, b) in [
                (triangle[0], triangle[1]),
                (triangle[1], triangle[2]),
                (triangle[2], triangle[0]),
            ] {
                let edge = [a.min(b), a.max(b)];
                if seen.insert(edge) {
                    edges.push(edge);
                }
            }
        }
        edges
    }

    /// Line segments along every triangle edge, all in one colour.
    pub fn wireframe(&self, color: [f32; 3]) -> Vec<LineVertex> {
        self.edges()
            .into_iter()
            .flat_map(|edge| edge.map(|i| LineVertex {
                position: self.vertices[i as usize].position,
                color,
            }))
            .collect()
    }

    pub fn to_mesh(&self, device: &wgpu::Device, name: &str, material: usize) -> model::Mesh {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", name)),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", name)),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        model::Mesh {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            num_elements: self.indices.len() as u32,
            material,
        }
    }
}
