/**
 * This module contains all logic for loading textures and fonts from external files.
 */
pub mod font;
pub mod matcap;
pub mod texture;

pub use texture::{load_binary, load_string, load_texture, material_layout};

use crate::data_structures::texture::{Texture, Wrapping};

pub async fn load_typeface(file_name: &str) -> anyhow::Result<font::Typeface> {
    let json = load_string(file_name).await?;
    font::Typeface::parse(&json)
}

/// Load a matcap texture, substituting the procedural matcap when the file is missing or broken.
pub async fn load_matcap(
    file_name: &str,
    wrapping: Wrapping,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Texture {
    match load_texture(file_name, wrapping, device, queue).await {
        Ok(texture) => texture,
        Err(e) => {
            log::error!("Could not load matcap {file_name}: {e:#}. Using a generated one instead.");
            Texture::from_image(device, queue, &matcap::generate(256), Some("generated matcap"), wrapping)
        }
    }
}
