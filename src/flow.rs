//! The event loop and the flow abstraction.
//!
//! A flow is one scene object with its own lifecycle: it is built asynchronously from an
//! [`InitContext`], set up once in [`GraphicsFlow::on_init`] and from then on receives
//! input, debug panel changes and per-frame updates, and hands back a [`Render`] tree.
//! Flows share a user defined state `S` and can emit custom events `E`.
//!
//! Each frame runs in this order:
//! 1. window events reach the debug panel first; orbit controls and `on_window_events`
//!    only see what the panel did not consume
//! 2. the panel is laid out and each changed value goes to `on_gui_change`
//! 3. the orbit controls move the camera and the camera uniform is written
//! 4. `on_update`, and `on_tick` once per tick period
//! 5. every flow's render tree is batched per pipeline and drawn, the panel on top
//! 6. the frame is presented

use std::{fmt::Debug, iter, pin::Pin, sync::Arc};

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

use crate::{
    context::{Context, InitContext},
    data_structures::model::{DrawLines, DrawModel},
    gui::{
        ControlChange,
        layer::{GuiFrame, GuiLayer},
    },
    render::{Instanced, LineSet, Render, SkipLog},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// What a lifecycle hook asks the engine to do next.
///
/// - `FutEvent` resolves the futures (blocking on native, spawned in the browser) and
///   delivers every result to `on_custom_events`.
/// - `Configure` runs the closure with mutable access to the context and the state,
///   e.g. to switch auto-rotation or change the clear colour.
/// - `Empty` does nothing.
pub enum Out<S, E> {
    FutEvent(Vec<Box<dyn Future<Output = E>>>),
    Configure(Box<dyn FnOnce(&mut Context, &mut S)>),
    Empty,
}

impl<S, E> Default for Out<S, E> {
    fn default() -> Self {
        Self::Empty
    }
}

/// A scene object driven by the engine.
pub trait GraphicsFlow<S, E> {
    /// Called once after every flow was constructed and the surface has its size.
    ///
    /// Register debug controls, place the camera or set the clear colour here.
    fn on_init(&mut self, ctx: &mut Context, state: &mut S) -> Out<S, E>;

    /// Called every frame with the time since the previous one.
    fn on_update(&mut self, ctx: &Context, state: &mut S, dt: Duration) -> Out<S, E>;

    /// Called every `ctx.tick_duration_millis`.
    fn on_tick(&mut self, ctx: &Context, state: &mut S) -> Out<S, E>;

    fn on_device_events(&mut self, ctx: &Context, state: &mut S, event: &DeviceEvent) -> Out<S, E>;

    /// Window events the debug panel did not consume.
    fn on_window_events(&mut self, ctx: &Context, state: &mut S, event: &WindowEvent) -> Out<S, E>;

    /// A debug panel value changed since the last frame.
    fn on_gui_change(&mut self, ctx: &Context, state: &mut S, change: &ControlChange) -> Out<S, E>;

    /// Events resolved from `Out::FutEvent`, offered to each flow in turn.
    ///
    /// Return `None` to consume the event or hand it back for the next flow.
    fn on_custom_events(&mut self, ctx: &Context, state: &mut S, event: E) -> Option<E>;

    /// What to draw this frame.
    fn on_render<'pass>(&self) -> Render<'_, 'pass>;
}

// FlowEvent must be Debug for the winit user event
impl<State, Event> Debug for dyn GraphicsFlow<State, Event> + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GraphicsFlow")
    }
}

/// Builds a flow once the GPU is ready. Loading may await assets before the first frame.
pub type FlowConstructor<S, E> =
    Box<dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = Box<dyn GraphicsFlow<S, E>>>>>>;

/// Everything that only exists once a window and a device do.
pub struct AppState<State: 'static> {
    pub(crate) ctx: Context,
    state: State,
    gui: GuiLayer,
    skips: SkipLog,
    is_surface_configured: bool,
}

impl<State: Debug> Debug for AppState<State> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("ctx", &self.ctx)
            .field("state", &self.state)
            .field("is_surface_configured", &self.is_surface_configured)
            .finish_non_exhaustive()
    }
}

impl<State: Default> AppState<State> {
    async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let ctx = Context::new(window).await?;
        let gui = GuiLayer::new(&ctx.window, &ctx.device, ctx.gui_format);
        Ok(Self {
            ctx,
            state: State::default(),
            gui,
            skips: SkipLog::default(),
            is_surface_configured: false,
        })
    }
}

impl<State> AppState<State> {
    fn resize(&mut self, width: u32, height: u32) {
        if self.ctx.resize(width, height) {
            self.is_surface_configured = true;
        }
    }

    /// Collect every flow's render tree, then bind each pipeline once and draw its batch.
    fn draw_scene<'pass, Event>(
        ctx: &'pass Context,
        render_pass: &mut wgpu::RenderPass<'pass>,
        flows: &'pass [Box<dyn GraphicsFlow<State, Event>>],
        skips: &mut SkipLog,
    ) {
        let mut basics: Vec<Instanced> = Vec::new();
        let mut matcaps: Vec<Instanced> = Vec::new();
        let mut lines: Vec<LineSet> = Vec::new();
        for flow in flows {
            flow.on_render()
                .set_pipelines(ctx, render_pass, &mut basics, &mut matcaps, &mut lines);
        }

        render_pass.set_pipeline(&ctx.pipelines.line);
        for set in lines {
            if !skips.should_draw(&set.lines.label, set.amount, set.instance.size()) {
                continue;
            }
            render_pass.set_vertex_buffer(1, set.instance.slice(..));
            render_pass.draw_lines_instanced(set.lines, 0..set.amount as u32, &ctx.camera.bind_group);
        }

        for (pipeline, batch) in [(&ctx.pipelines.basic, basics), (&ctx.pipelines.matcap, matcaps)] {
            render_pass.set_pipeline(pipeline);
            for instanced in batch {
                if !skips.should_draw(instanced.model.name(), instanced.amount, instanced.instance.size()) {
                    continue;
                }
                render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                render_pass.draw_model_instanced(
                    instanced.model,
                    0..instanced.amount as u32,
                    &ctx.camera.bind_group,
                );
            }
        }
    }

    fn render<Event>(
        &mut self,
        flows: &[Box<dyn GraphicsFlow<State, Event>>],
        gui_frame: GuiFrame,
    ) -> Result<(), wgpu::SurfaceError> {
        // keeps the loop running
        self.ctx.window.request_redraw();
        if !self.is_surface_configured {
            return Ok(());
        }

        let frame = self.ctx.surface.get_current_texture()?;
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            // with MSAA the scene is drawn into the multisampled target and resolved into the frame
            let (target, resolve_target) = match &self.ctx.msaa_texture {
                Some(msaa) => (&msaa.view, Some(&view)),
                None => (&view, None),
            };
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            Self::draw_scene(&self.ctx, &mut render_pass, flows, &mut self.skips);
        }

        let gui_view = frame.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(self.ctx.gui_format),
            ..Default::default()
        });
        self.gui.render(
            &self.ctx.device,
            &self.ctx.queue,
            &mut encoder,
            &gui_view,
            [self.ctx.config.width, self.ctx.config.height],
            gui_frame,
        );

        self.ctx.queue.submit(iter::once(encoder.finish()));
        self.ctx.window.pre_present_notify();
        frame.present();
        Ok(())
    }
}

/// Frame and tick timing of the event loop.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last_frame: Instant,
    since_tick: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            since_tick: Duration::ZERO,
        }
    }

    /// Forget the time since the last frame, as if a frame had just ended.
    pub fn restart(&mut self) {
        self.last_frame = Instant::now();
    }

    /// Start a new frame and return the time since the previous one.
    pub fn advance(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now - self.last_frame;
        self.last_frame = now;
        self.since_tick += dt;
        dt
    }

    /// Whether `period` has passed since the last tick. Resets the tick timer if so.
    pub fn take_tick(&mut self, period: Duration) -> bool {
        if self.since_tick < period {
            return false;
        }
        self.since_tick = Duration::ZERO;
        true
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

pub struct App<State: 'static, Event: 'static> {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<FlowEvent<State, Event>>,
    state: Option<AppState<State>>,
    graphics_flows: Vec<Box<dyn GraphicsFlow<State, Event>>>,
    // taken on the first `resumed`
    constructors: Option<Vec<FlowConstructor<State, Event>>>,
    clock: FrameClock,
}

impl<State: 'static, Event: 'static> App<State, Event> {
    fn new(
        event_loop: &EventLoop<FlowEvent<State, Event>>,
        constructors: Vec<FlowConstructor<State, Event>>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy: event_loop.create_proxy(),
            state: None,
            graphics_flows: Vec::new(),
            constructors: Some(constructors),
            clock: FrameClock::new(),
        })
    }

    /// Run `hook` on every flow and act on what each one returns.
    fn dispatch(
        &mut self,
        hook: impl Fn(&mut dyn GraphicsFlow<State, Event>, &Context, &mut State) -> Out<State, Event>,
    ) {
        let Some(app_state) = &mut self.state else {
            return;
        };
        for flow in self.graphics_flows.iter_mut() {
            let out = hook(flow.as_mut(), &app_state.ctx, &mut app_state.state);
            handle_flow_output(
                #[cfg(not(target_arch = "wasm32"))]
                &self.async_runtime,
                &mut app_state.state,
                &mut app_state.ctx,
                self.proxy.clone(),
                out,
            );
        }
    }

    fn start(&mut self, app_state: AppState<State>, flows: Vec<Box<dyn GraphicsFlow<State, Event>>>) {
        self.state = Some(app_state);
        self.graphics_flows = flows;
        let Some(app_state) = &mut self.state else {
            return;
        };
        let size = app_state.ctx.window.inner_size();
        app_state.resize(size.width, size.height);
        for flow in self.graphics_flows.iter_mut() {
            let out = flow.on_init(&mut app_state.ctx, &mut app_state.state);
            handle_flow_output(
                #[cfg(not(target_arch = "wasm32"))]
                &self.async_runtime,
                &mut app_state.state,
                &mut app_state.ctx,
                self.proxy.clone(),
                out,
            );
        }
        log::info!("Started {} flow(s)", self.graphics_flows.len());
        // setup and blocking loads must not count as the first frame's delta
        self.clock.restart();
        app_state.ctx.window.request_redraw();
    }

    fn redraw(&mut self) {
        let dt = self.clock.advance();

        let (gui_frame, changes) = {
            let Some(app_state) = &mut self.state else {
                return;
            };
            let ctx = &mut app_state.ctx;
            let frame = app_state.gui.run(&ctx.window, &mut ctx.debug_panel);
            (frame, ctx.debug_panel.take_changes())
        };
        for change in &changes {
            log::debug!("Debug control {:?} changed to {:?}", change.label, change.value);
            self.dispatch(|flow, ctx, state| flow.on_gui_change(ctx, state, change));
        }

        if let Some(app_state) = &mut self.state {
            let ctx = &mut app_state.ctx;
            ctx.controls.update(&mut ctx.camera.camera, &ctx.projection, dt);
            ctx.camera.update(&ctx.queue, &ctx.projection);
        }

        self.dispatch(|flow, ctx, state| flow.on_update(ctx, state, dt));

        let tick = self
            .state
            .as_ref()
            .map(|app_state| Duration::from_millis(app_state.ctx.tick_duration_millis));
        if tick.is_some_and(|tick| self.clock.take_tick(tick)) {
            self.dispatch(|flow, ctx, state| flow.on_tick(ctx, state));
        }

        let Some(app_state) = &mut self.state else {
            return;
        };
        match app_state.render(&self.graphics_flows, gui_frame) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = app_state.ctx.window.inner_size();
                app_state.resize(size.width, size.height);
            }
            Err(e) => log::error!("Unable to render: {e}"),
        }
    }
}

pub(crate) enum FlowEvent<State: 'static, Event: 'static> {
    // only sent by the browser build, where startup cannot block
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    Initialized {
        state: AppState<State>,
        flows: Vec<Box<dyn GraphicsFlow<State, Event>>>,
    },
    Custom(Event),
}

impl<State, Event> Debug for FlowEvent<State, Event> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized { flows, .. } => f.debug_struct("Initialized").field("flows", flows).finish(),
            Self::Custom(_) => f.write_str("Custom(E)"),
        }
    }
}

impl<State: 'static + Default, Event: 'static> ApplicationHandler<FlowEvent<State, Event>>
    for App<State, Event>
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // some platforms resume more than once
        let Some(constructors) = self.constructors.take() else {
            return;
        };

        #[allow(unused_mut)]
        let mut attributes = Window::default_attributes().with_transparent(true);

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let canvas = wgpu::web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id(CANVAS_ID));
            match canvas {
                Some(canvas) => attributes = attributes.with_canvas(Some(canvas.unchecked_into())),
                None => log::warn!("No element with id {CANVAS_ID:?}, letting winit create a canvas"),
            }
        }

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Could not create a window: {e}");
                event_loop.exit();
                return;
            }
        };

        let startup = async move {
            let app_state = AppState::new(window).await?;
            // device and queue are reference counted, the init contexts share them
            let flows = futures::future::join_all(
                constructors
                    .into_iter()
                    .map(|constructor| constructor(InitContext::from(&app_state.ctx))),
            )
            .await;
            anyhow::Ok((app_state, flows))
        };

        #[cfg(not(target_arch = "wasm32"))]
        match self.async_runtime.block_on(startup) {
            Ok((app_state, flows)) => self.start(app_state, flows),
            Err(e) => {
                log::error!("Could not start: {e:#}");
                event_loop.exit();
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match startup.await {
                    Ok((state, flows)) => {
                        if proxy.send_event(FlowEvent::Initialized { state, flows }).is_err() {
                            log::error!("Event loop closed during startup");
                        }
                    }
                    Err(e) => log::error!("Could not start: {e:#}"),
                }
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: FlowEvent<State, Event>) {
        match event {
            FlowEvent::Initialized { state, flows } => self.start(state, flows),
            FlowEvent::Custom(event) => {
                let Some(app_state) = &mut self.state else {
                    return;
                };
                let unhandled = self
                    .graphics_flows
                    .iter_mut()
                    .try_fold(event, |event, flow| {
                        flow.on_custom_events(&app_state.ctx, &mut app_state.state, event)
                    });
                if unhandled.is_some() {
                    log::warn!("No flow consumed a custom event");
                }
            }
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        self.dispatch(|flow, ctx, state| flow.on_device_events(ctx, state, &event));
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(app_state) = &mut self.state else {
            return;
        };

        let consumed = app_state.gui.on_window_event(&app_state.ctx.window, &event);
        // a drag that ends over the panel must still end
        let is_release = matches!(
            event,
            WindowEvent::MouseInput {
                state: ElementState::Released,
                ..
            }
        );
        if !consumed || is_release {
            let height = app_state.ctx.config.height as f32;
            app_state.ctx.controls.handle_window_events(&event, height);
        }
        if !consumed {
            self.dispatch(|flow, ctx, state| flow.on_window_events(ctx, state, &event));
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(app_state) = &mut self.state {
                    app_state.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }
}

fn handle_flow_output<State, Event>(
    #[cfg(not(target_arch = "wasm32"))] async_runtime: &tokio::runtime::Runtime,
    state: &mut State,
    ctx: &mut Context,
    proxy: EventLoopProxy<FlowEvent<State, Event>>,
    out: Out<State, Event>,
) {
    match out {
        Out::FutEvent(futures) => {
            let all = futures::future::join_all(futures.into_iter().map(Pin::from));

            #[cfg(not(target_arch = "wasm32"))]
            for event in async_runtime.block_on(all) {
                if let Err(e) = proxy.send_event(FlowEvent::Custom(event)) {
                    log::error!("Event loop closed before a custom event was delivered: {e}");
                }
            }

            #[cfg(target_arch = "wasm32")]
            wasm_bindgen_futures::spawn_local(async move {
                for event in all.await {
                    if proxy.send_event(FlowEvent::Custom(event)).is_err() {
                        log::error!("Event loop closed before a custom event was delivered");
                    }
                }
            });
        }
        Out::Configure(configure) => configure(ctx, state),
        Out::Empty => {}
    }
}

/// Open a window and drive `constructors` until it is closed.
///
/// Also installs the logger: `env_logger` natively (configure with `RUST_LOG`) and
/// `console_log` in the browser.
pub fn run<State: 'static + Default, Event: 'static>(
    constructors: Vec<FlowConstructor<State, Event>>,
) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    if let Err(e) = env_logger::try_init() {
        eprintln!("Logger already initialised: {e}");
    }

    #[cfg(target_arch = "wasm32")]
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger already initialised: {e}").into());
    }

    let event_loop = EventLoop::<FlowEvent<State, Event>>::with_user_event().build()?;
    let mut app = App::new(&event_loop, constructors)?;
    event_loop.run_app(&mut app)?;
    Ok(())
}
