//! A procedural stand-in for matcap images.
//!
//! The sphere is lit from the upper left with a soft rim so shapes still read as
//! three-dimensional when the real matcap texture is not available.

use cgmath::{InnerSpace, Vector3};
use image::{DynamicImage, Rgba, RgbaImage};

const BASE: [f32; 3] = [0.55, 0.6, 0.7];
const RIM: [f32; 3] = [0.15, 0.17, 0.25];

/// Render a `size` x `size` matcap sphere. Pixels outside the sphere repeat its edge colour.
pub fn generate(size: u32) -> DynamicImage {
    let size = size.max(2);
    let light = Vector3::new(-0.4, 0.6, 0.7).normalize();
    let half = (size - 1) as f32 / 2.0;

    let image = RgbaImage::from_fn(size, size, |x, y| {
        let nx = (x as f32 - half) / half;
        let ny = (half - y as f32) / half;
        let r2 = (nx * nx + ny * ny).min(1.0);
        let normal = Vector3::new(nx, ny, (1.0 - r2).sqrt()).normalize();

        let diffuse = normal.dot(light).max(0.0);
        let reflected = normal * (2.0 * normal.dot(light)) - light;
        let specular = reflected.z.max(0.0).powf(24.0);
        let rim = 1.0 - normal.z;

        let channel = |i: usize| {
            let value = BASE[i] * (0.25 + 0.75 * diffuse) + RIM[i] * rim + specular * 0.6;
            (value.clamp(0.0, 1.0) * 255.0).round() as u8
        };
        Rgba([channel(0), channel(1), channel(2), 255])
    });
    DynamicImage::ImageRgba8(image)
}

#[cfg(test)]
mod tests {
    use image::GenericImageView;

    use super::*;

    #[test]
    fn is_square_and_opaque() {
        let image = generate(64);
        assert_eq!(image.dimensions(), (64, 64));
        assert!(image.pixels().all(|(_, _, p)| p.0[3] == 255));
    }

    #[test]
    fn lit_side_is_brighter() {
        let image = generate(64);
        let luma = |x, y| {
            let p = image.get_pixel(x, y).0;
            p[0] as u32 + p[1] as u32 + p[2] as u32
        };
        assert!(luma(20, 20) > luma(44, 44));
    }
}
