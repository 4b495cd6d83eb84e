//! Draws the [`DebugPanel`] with egui on top of the scene.

use egui::{Align2, Frame, Margin};
use winit::{event::WindowEvent, window::Window};

use crate::gui::{ControlKind, ControlValue, DebugPanel};

/// Tessellated egui output of one frame, ready for [`GuiLayer::render`].
pub struct GuiFrame {
    jobs: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    pixels_per_point: f32,
}

pub struct GuiLayer {
    context: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

impl GuiLayer {
    pub fn new(window: &Window, device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let context = egui::Context::default();
        let visuals = egui::Visuals {
            window_shadow: egui::epaint::Shadow::NONE,
            ..Default::default()
        };
        context.set_visuals(visuals);

        let id = context.viewport_id();
        let state = egui_winit::State::new(context.clone(), id, window, None, None, None);
        // the panel is drawn after the MSAA resolve, straight into the surface texture
        let renderer = egui_wgpu::Renderer::new(device, format, None, 1, false);

        Self {
            context,
            state,
            renderer,
        }
    }

    /// Returns whether egui consumed the event, in which case nothing else should see it.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Lay out the panel for this frame. User edits are written into `panel`.
    pub fn run(&mut self, window: &Window, panel: &mut DebugPanel) -> GuiFrame {
        let raw_input = self.state.take_egui_input(window);
        let mut hovered = false;
        let full_output = self.context.run(raw_input, |ctx| {
            hovered = show_panel(ctx, panel);
        });
        panel.set_hovered(hovered);

        self.state
            .handle_platform_output(window, full_output.platform_output);
        let jobs = self
            .context
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        GuiFrame {
            jobs,
            textures_delta: full_output.textures_delta,
            pixels_per_point: full_output.pixels_per_point,
        }
    }

    /// Upload the frame's buffers and textures and draw it over `view`, keeping its contents.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        size_in_pixels: [u32; 2],
        frame: GuiFrame,
    ) {
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: frame.pixels_per_point,
        };
        for (id, image_delta) in &frame.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }
        self.renderer
            .update_buffers(device, queue, encoder, &frame.jobs, &screen);

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("GUI Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.renderer
                .render(&mut render_pass.forget_lifetime(), &frame.jobs, &screen);
        }

        for id in &frame.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}

/// Returns whether the pointer is over the panel.
fn show_panel(ctx: &egui::Context, panel: &mut DebugPanel) -> bool {
    let style = panel.style.clone();
    let opacity = panel.opacity();
    let response = egui::Area::new(egui::Id::new("debug panel"))
        .anchor(Align2::RIGHT_TOP, [-15.0, 0.0])
        .show(ctx, |ui| {
            ui.multiply_opacity(opacity);
            Frame::window(ui.style())
                .inner_margin(Margin::same(style.padding.round() as i8))
                .show(ui, |ui| {
                    ui.set_width(style.width);
                    let marker = if panel.is_open() { "▾" } else { "▸" };
                    let title = ui.add(
                        egui::Button::new(format!("{marker} {}", style.title))
                            .frame(false)
                            .min_size(egui::vec2(style.width, 0.0)),
                    );
                    if title.clicked() {
                        panel.toggle_open();
                    }
                    if panel.is_open() {
                        ui.separator();
                        show_controls(ui, panel);
                    }
                });
        });
    response.response.contains_pointer()
}

fn show_controls(ui: &mut egui::Ui, panel: &mut DebugPanel) {
    let ids: Vec<_> = panel.ids().collect();
    for id in ids {
        let Some(control) = panel.control(id).cloned() else {
            continue;
        };
        let edited = match (&control.kind, control.value) {
            (ControlKind::Slider { min, max, step }, ControlValue::Number(mut v)) => ui
                .add(
                    egui::Slider::new(&mut v, *min..=*max)
                        .step_by(*step as f64)
                        .text(control.label.as_str()),
                )
                .changed()
                .then_some(ControlValue::Number(v)),
            (ControlKind::Toggle, ControlValue::Bool(mut v)) => ui
                .checkbox(&mut v, control.label.as_str())
                .changed()
                .then_some(ControlValue::Bool(v)),
            (ControlKind::Choice { options }, ControlValue::Choice(mut selected)) => {
                let before = selected.clone();
                egui::ComboBox::from_label(control.label.as_str())
                    .selected_text(selected.clone())
                    .show_ui(ui, |ui| {
                        for option in options {
                            ui.selectable_value(&mut selected, option.clone(), option.as_str());
                        }
                    });
                (selected != before).then_some(ControlValue::Choice(selected))
            }
            _ => None,
        };
        if let Some(value) = edited {
            if let Err(e) = panel.set(id, value) {
                log::error!("Rejected debug panel input: {e:#}");
            }
        }
    }
}
