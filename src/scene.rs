//! The matcap scene: bevelled text, a field of tori, an axes helper and a box that the
//! debug panel drives.

use std::f32::consts::FRAC_PI_2;

use cgmath::{Rad, Vector3};
use instant::Duration;
use rand::{Rng, SeedableRng, rngs::StdRng};
use wgpu::util::DeviceExt;

use crate::{
    DeviceEvent, WindowEvent,
    camera::{Camera, Projection},
    config::{BoxConfig, BoxTexture, SceneConfig, ScatterField},
    context::{Context, InitContext},
    data_structures::{
        instance::Instance,
        model::{Lines, Material, MaterialUniform, Model},
        texture::{Texture, WrapMode, Wrapping},
    },
    flow::{self, FlowConstructor, GraphicsFlow, Out},
    geometry::{Geometry, axes_lines, box_geometry, text_geometry, torus_geometry},
    gui::{ControlChange, ControlId, DebugPanel},
    render::{Instanced, LineSet, Render},
    resources::{self, font::Typeface},
};

/// Counters shared by the scene flow.
#[derive(Debug, Default)]
pub struct SceneStats {
    pub frames: u64,
    pub frames_since_tick: u32,
    pub decorations: usize,
    pub text_triangles: usize,
}

pub enum SceneEvent {
    FontLoaded(anyhow::Result<Typeface>),
}

/// Scatter `field.count` instances uniformly in a cube of edge `field.spread` around the
/// origin, each tilted around X and Y by up to a quarter turn.
pub fn scatter<R: Rng>(rng: &mut R, field: &ScatterField) -> Vec<Instance> {
    (0..field.count)
        .map(|_| {
            let mut coord = || (rng.gen_range(0.0..1.0f32) - 0.5) * field.spread;
            let position = Vector3::new(coord(), coord(), coord());
            let x = rng.gen_range(0.0..1.0f32) * FRAC_PI_2;
            let y = rng.gen_range(0.0..1.0f32) * FRAC_PI_2;
            Instance::from(position).with_euler_xyz(Rad(x), Rad(y), Rad(0.0))
        })
        .collect()
}

fn instance_buffer(device: &wgpu::Device, label: &str, instances: &[Instance]) -> wgpu::Buffer {
    let raw: Vec<_> = instances.iter().map(Instance::to_raw).collect();
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label} Instance Buffer")),
        contents: bytemuck::cast_slice(&raw),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    })
}

fn single_mesh_model(device: &wgpu::Device, name: &str, geometry: &Geometry, material: Material) -> Model {
    Model {
        meshes: vec![geometry.to_mesh(device, name, 0)],
        materials: vec![material],
    }
}

/// Panel handles of the box controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxControls {
    pub elevation: ControlId,
    pub visible: ControlId,
    pub wireframe: ControlId,
    pub texture: ControlId,
}

impl BoxControls {
    /// Add the elevation slider and the visibility, wireframe and texture controls,
    /// starting from the values in `state`.
    pub fn register(panel: &mut DebugPanel, state: &BoxState) -> Self {
        Self {
            elevation: panel.add_slider("elevation", state.position.y, -3.0, 3.0, 0.1),
            visible: panel.add_toggle("visible", state.visible),
            wireframe: panel.add_toggle("wireframe", state.wireframe),
            texture: panel.add_choice("texture", &BoxTexture::OPTIONS, state.texture.label()),
        }
    }
}

/// How the box is drawn this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoxRender {
    Hidden,
    Wireframe,
    Solid,
}

/// GPU data a box change has made stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoxUpdate {
    /// The instance buffer.
    Transform,
    /// The material uniform.
    Material,
    /// Nothing, the next `on_render` picks it up.
    Appearance,
}

/// The debug-controlled properties of the box.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxState {
    pub position: Vector3<f32>,
    pub visible: bool,
    pub wireframe: bool,
    pub texture: BoxTexture,
    pub color: [f32; 4],
}

impl From<&BoxConfig> for BoxState {
    fn from(config: &BoxConfig) -> Self {
        Self {
            position: Vector3::from(config.position),
            visible: config.visible,
            wireframe: config.wireframe,
            texture: config.texture,
            color: config.color,
        }
    }
}

impl BoxState {
    /// Write a panel change into the matching property.
    ///
    /// Returns `None` when the change belongs to another control or carries a value of
    /// the wrong kind.
    pub fn apply(&mut self, controls: &BoxControls, change: &ControlChange) -> Option<BoxUpdate> {
        let id = change.id;
        if id == controls.elevation {
            self.position.y = change.value.as_number()?;
            Some(BoxUpdate::Transform)
        } else if id == controls.visible {
            self.visible = change.value.as_bool()?;
            Some(BoxUpdate::Appearance)
        } else if id == controls.wireframe {
            self.wireframe = change.value.as_bool()?;
            Some(BoxUpdate::Appearance)
        } else if id == controls.texture {
            let label = change.value.as_choice()?;
            let Some(texture) = BoxTexture::from_label(label) else {
                log::warn!("Unknown box texture option {label:?}");
                return None;
            };
            self.texture = texture;
            Some(BoxUpdate::Material)
        } else {
            None
        }
    }

    pub fn render_kind(&self) -> BoxRender {
        match (self.visible, self.wireframe) {
            (false, _) => BoxRender::Hidden,
            (true, true) => BoxRender::Wireframe,
            (true, false) => BoxRender::Solid,
        }
    }

    pub fn uniform(&self) -> MaterialUniform {
        match self.texture {
            BoxTexture::Textured => MaterialUniform::textured(),
            BoxTexture::ColorOnly => MaterialUniform::colored(self.color),
        }
    }

    pub fn instance(&self) -> Instance {
        Instance::from(self.position)
    }
}

/// Debug panel handles, registered in `on_init`.
#[derive(Debug, Clone, Copy)]
struct DebugControls {
    cube: BoxControls,
    auto_rotate: ControlId,
}

struct BoxMesh {
    model: Model,
    lines: Lines,
    buffer: wgpu::Buffer,
    state: BoxState,
}

impl BoxMesh {
    fn upload_instance(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.state.instance().to_raw()]));
    }

    fn upload_material(&mut self, queue: &wgpu::Queue) {
        let uniform = self.state.uniform();
        if let Some(material) = self.model.materials.first_mut() {
            material.set_uniform(queue, uniform);
        }
    }
}

pub struct MatcapScene {
    config: SceneConfig,
    device: wgpu::Device,
    material_layout: wgpu::BindGroupLayout,
    matcap: Texture,
    axes: Lines,
    identity: wgpu::Buffer,
    cube: BoxMesh,
    torus: Model,
    torus_instances: Vec<Instance>,
    torus_buffer: wgpu::Buffer,
    text: Option<Model>,
    controls: Option<DebugControls>,
}

impl MatcapScene {
    pub async fn new(ctx: InitContext, config: SceneConfig) -> Self {
        let device = ctx.device;
        let queue = ctx.queue;
        let layout = ctx.material_layout;

        let wrapping = Wrapping {
            s: WrapMode::Repeat,
            t: WrapMode::ClampToEdge,
        };
        let matcap = resources::load_matcap(&config.matcap, wrapping, &device, &queue).await;
        let box_texture = if config.box_texture == config.matcap {
            matcap.clone()
        } else {
            resources::load_matcap(&config.box_texture, Wrapping::default(), &device, &queue).await
        };

        let [w, h, d] = config.cube.size;
        let cube_geometry = box_geometry(w, h, d, 1);
        let state = BoxState::from(&config.cube);
        let color = state.color;
        let cube = BoxMesh {
            model: single_mesh_model(
                &device,
                "box",
                &cube_geometry,
                Material::new(&device, "box", box_texture, state.uniform(), &layout),
            ),
            lines: Lines::new(&device, "box wireframe", &cube_geometry.wireframe([color[0], color[1], color[2]])),
            buffer: instance_buffer(&device, "box", &[state.instance()]),
            state,
        };

        let t = &config.torus;
        let torus_geometry = torus_geometry(
            t.radius,
            t.tube,
            t.radial_segments,
            t.tubular_segments,
            std::f32::consts::TAU,
        );
        let torus = single_mesh_model(
            &device,
            "torus",
            &torus_geometry,
            Material::new(&device, "torus matcap", matcap.clone(), MaterialUniform::textured(), &layout),
        );
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let torus_instances: Vec<Instance> = config
            .fields
            .iter()
            .flat_map(|field| scatter(&mut rng, field))
            .collect();
        let torus_buffer = instance_buffer(&device, "torus", &torus_instances);

        let axes = Lines::new(&device, "axes", &axes_lines(config.axes_size));
        let identity = instance_buffer(&device, "identity", &[Instance::new()]);

        Self {
            config,
            device,
            material_layout: layout,
            matcap,
            axes,
            identity,
            cube,
            torus,
            torus_instances,
            torus_buffer,
            text: None,
            controls: None,
        }
    }

    fn build_text(&mut self, font: &Typeface, state: &mut SceneStats) {
        let Some(text) = &self.config.text else {
            return;
        };
        let geometry = text_geometry(font, &text.content, &text.options);
        if geometry.vertices.is_empty() {
            log::warn!("Text {:?} produced no geometry", text.content);
            return;
        }
        state.text_triangles = geometry.triangle_count();
        let material = Material::new(
            &self.device,
            "text matcap",
            self.matcap.clone(),
            MaterialUniform::textured(),
            &self.material_layout,
        );
        self.text = Some(single_mesh_model(&self.device, "text", &geometry, material));
        log::info!("Text mesh ready with {} triangles", state.text_triangles);
    }
}

impl GraphicsFlow<SceneStats, SceneEvent> for MatcapScene {
    fn on_init(&mut self, ctx: &mut Context, state: &mut SceneStats) -> Out<SceneStats, SceneEvent> {
        ctx.window().set_title(&self.config.title);

        let camera = &self.config.camera;
        ctx.camera.camera = Camera::new(camera.position);
        ctx.projection = Projection::new(
            ctx.config.width,
            ctx.config.height,
            camera.fov,
            camera.near,
            camera.far,
        );
        ctx.camera.update(&ctx.queue, &ctx.projection);

        let orbit = &self.config.orbit;
        ctx.controls.enable_damping = orbit.damping;
        ctx.controls.auto_rotate = orbit.auto_rotate;
        ctx.controls.auto_rotate_speed = orbit.auto_rotate_speed;

        let panel = &mut ctx.debug_panel;
        panel.style = self.config.panel.clone();
        panel.close();
        self.controls = Some(DebugControls {
            cube: BoxControls::register(panel, &self.cube.state),
            auto_rotate: panel.add_toggle("autoRotate", orbit.auto_rotate),
        });

        state.decorations = self.torus_instances.len();
        log::info!("Scattered {} tori", state.decorations);

        match &self.config.text {
            Some(text) => {
                let font = text.font.clone();
                Out::FutEvent(vec![Box::new(async move {
                    SceneEvent::FontLoaded(resources::load_typeface(&font).await)
                })])
            }
            None => Out::Empty,
        }
    }

    fn on_update(&mut self, _ctx: &Context, state: &mut SceneStats, _dt: Duration) -> Out<SceneStats, SceneEvent> {
        state.frames += 1;
        state.frames_since_tick += 1;
        Out::Empty
    }

    fn on_tick(&mut self, ctx: &Context, state: &mut SceneStats) -> Out<SceneStats, SceneEvent> {
        log::debug!(
            "{} frames in the last {} ms",
            state.frames_since_tick,
            ctx.tick_duration_millis
        );
        state.frames_since_tick = 0;
        Out::Empty
    }

    fn on_device_events(&mut self, _: &Context, _: &mut SceneStats, _: &DeviceEvent) -> Out<SceneStats, SceneEvent> {
        Out::Empty
    }

    fn on_window_events(&mut self, _: &Context, _: &mut SceneStats, _: &WindowEvent) -> Out<SceneStats, SceneEvent> {
        Out::Empty
    }

    fn on_gui_change(
        &mut self,
        ctx: &Context,
        _state: &mut SceneStats,
        change: &ControlChange,
    ) -> Out<SceneStats, SceneEvent> {
        let Some(controls) = self.controls else {
            return Out::Empty;
        };
        match self.cube.state.apply(&controls.cube, change) {
            Some(BoxUpdate::Transform) => self.cube.upload_instance(&ctx.queue),
            Some(BoxUpdate::Material) => self.cube.upload_material(&ctx.queue),
            Some(BoxUpdate::Appearance) => {}
            None if change.id == controls.auto_rotate => {
                if let Some(auto_rotate) = change.value.as_bool() {
                    return Out::Configure(Box::new(move |ctx: &mut Context, _: &mut SceneStats| {
                        ctx.controls.auto_rotate = auto_rotate
                    }));
                }
            }
            None => {}
        }
        Out::Empty
    }

    fn on_custom_events(&mut self, _ctx: &Context, state: &mut SceneStats, event: SceneEvent) -> Option<SceneEvent> {
        match event {
            SceneEvent::FontLoaded(Ok(font)) => self.build_text(&font, state),
            SceneEvent::FontLoaded(Err(e)) => log::error!("Could not load the font: {e:#}"),
        }
        None
    }

    fn on_render<'pass>(&self) -> Render<'_, 'pass> {
        let cube = match self.cube.state.render_kind() {
            BoxRender::Hidden => Render::None,
            BoxRender::Wireframe => Render::Lines(LineSet {
                lines: &self.cube.lines,
                instance: &self.cube.buffer,
                amount: 1,
            }),
            BoxRender::Solid => Render::Basic(Instanced {
                instance: &self.cube.buffer,
                model: &self.cube.model,
                amount: 1,
            }),
        };
        let mut matcaps = vec![Instanced {
            instance: &self.torus_buffer,
            model: &self.torus,
            amount: self.torus_instances.len(),
        }];
        if let Some(text) = &self.text {
            matcaps.push(Instanced {
                instance: &self.identity,
                model: text,
                amount: 1,
            });
        }
        Render::Composed(vec![
            Render::Lines(LineSet {
                lines: &self.axes,
                instance: &self.identity,
                amount: 1,
            }),
            cube,
            Render::Matcaps(matcaps),
        ])
    }
}

/// Open a window and run the scene described by `config` until it is closed.
pub fn run_scene(config: SceneConfig) -> anyhow::Result<()> {
    let constructor: FlowConstructor<SceneStats, SceneEvent> = Box::new(move |ctx| {
        Box::pin(async move {
            Box::new(MatcapScene::new(ctx, config).await) as Box<dyn GraphicsFlow<SceneStats, SceneEvent>>
        })
    });
    flow::run(vec![constructor])
}
