//! Render pipelines. All of them share the surface format, MSAA sample count and depth format.

pub mod basic;
pub mod line;
pub mod matcap;

#[derive(Debug)]
pub struct Pipelines {
    pub basic: wgpu::RenderPipeline,
    pub matcap: wgpu::RenderPipeline,
    pub line: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        sample_count: u32,
        material_layout: &wgpu::BindGroupLayout,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        Self {
            basic: basic::mk_basic_pipeline(
                device,
                color_format,
                sample_count,
                material_layout,
                camera_bind_group_layout,
            ),
            matcap: matcap::mk_matcap_pipeline(
                device,
                color_format,
                sample_count,
                material_layout,
                camera_bind_group_layout,
            ),
            line: line::mk_line_pipeline(device, color_format, sample_count, camera_bind_group_layout),
        }
    }
}
