//! The GPU and window context shared by every flow.

use std::sync::Arc;

use anyhow::{Context as _, anyhow};
use winit::window::Window;

use crate::{
    camera::{Camera, CameraResources, Projection},
    controls::OrbitControls,
    data_structures::texture,
    gui::DebugPanel,
    pipelines::Pipelines,
    resources::material_layout,
};

const PREFERRED_SAMPLE_COUNT: u32 = 4;

/// Format the debug panel draws the surface with.
///
/// egui blends in gamma space and expects a linear target. Where the surface may be
/// viewed in another format, an sRGB surface is drawn through its non-sRGB view.
pub fn gui_view_format(surface: wgpu::TextureFormat, view_formats_supported: bool) -> wgpu::TextureFormat {
    if view_formats_supported {
        surface.remove_srgb_suffix()
    } else {
        surface
    }
}

#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub(crate) msaa_texture: Option<texture::Texture>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    /// See [`gui_view_format`].
    pub gui_format: wgpu::TextureFormat,
    /// MSAA samples of the scene pass; 1 disables multisampling.
    pub sample_count: u32,
    pub camera: CameraResources,
    pub projection: Projection,
    pub controls: OrbitControls,
    pub material_layout: wgpu::BindGroupLayout,
    pub pipelines: Pipelines,
    pub debug_panel: DebugPanel,
    pub clear_colour: wgpu::Color,
    pub tick_duration_millis: u64,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        // The instance is a handle to our GPU
        // BackendBit::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Could not create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable graphics adapter")?;
        log::info!("Device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Could not open the graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Shaders output linear colour, an Srgb surface does the conversion
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow!("The surface supports no texture format"))?;
        let gui_format = gui_view_format(
            surface_format,
            adapter
                .get_downlevel_capabilities()
                .flags
                .contains(wgpu::DownlevelFlags::SURFACE_VIEW_FORMATS),
        );
        // The canvas is transparent where nothing is drawn
        let alpha_mode = if surface_caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode,
            view_formats: if gui_format == surface_format {
                vec![]
            } else {
                vec![gui_format]
            },
            desired_maximum_frame_latency: 2,
        };

        let sample_count = if adapter
            .get_texture_format_features(surface_format)
            .flags
            .sample_count_supported(PREFERRED_SAMPLE_COUNT)
        {
            PREFERRED_SAMPLE_COUNT
        } else {
            log::info!("{PREFERRED_SAMPLE_COUNT}x MSAA unsupported for {surface_format:?}");
            1
        };

        let camera = Camera::new((0.0, 0.0, 3.0));
        let projection = Projection::new(config.width, config.height, cgmath::Deg(75.0), 0.1, 100.0);
        let camera = CameraResources::new(&device, camera, &projection);

        let material_layout = material_layout(&device);
        let pipelines = Pipelines::new(
            &device,
            config.format,
            sample_count,
            &material_layout,
            &camera.bind_group_layout,
        );

        let depth_texture = texture::Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            sample_count,
            "depth_texture",
        );
        let msaa_texture = texture::Texture::create_multisampled_framebuffer(&device, &config, sample_count);

        Ok(Self {
            window,
            depth_texture,
            msaa_texture,
            surface,
            device,
            queue,
            config,
            gui_format,
            sample_count,
            camera,
            projection,
            controls: OrbitControls::new(),
            material_layout,
            pipelines,
            debug_panel: DebugPanel::default(),
            clear_colour: wgpu::Color::TRANSPARENT,
            tick_duration_millis: 1000,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Reconfigure the surface and every size dependent target. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.config.width = width;
        self.config.height = height;
        self.projection.resize(width, height);
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = texture::Texture::create_depth_texture(
            &self.device,
            [width, height],
            self.sample_count,
            "depth_texture",
        );
        self.msaa_texture =
            texture::Texture::create_multisampled_framebuffer(&self.device, &self.config, self.sample_count);
        true
    }
}

/// The part of the [`Context`] that flow constructors may use while the app starts.
///
/// Device and queue are reference counted internally so cloning is cheap.
#[derive(Debug, Clone)]
pub struct InitContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub format: wgpu::TextureFormat,
    pub sample_count: u32,
    pub material_layout: wgpu::BindGroupLayout,
}

impl From<&Context> for InitContext {
    fn from(ctx: &Context) -> Self {
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            format: ctx.config.format,
            sample_count: ctx.sample_count,
            material_layout: ctx.material_layout.clone(),
        }
    }
}
