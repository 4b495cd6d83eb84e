//! Orbit controls: the camera circles a target point.
//!
//! Input only accumulates deltas (rotation, dolly scale, pan offset). [`OrbitControls::update`]
//! applies them once per frame, which is also where damping and auto-rotation happen.

use std::{f32::consts::PI, time::Duration};

use cgmath::{InnerSpace, Point3, Vector3, Zero};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::camera::{Camera, Projection};

const EPS: f32 = 1e-6;
/// Pixels that count as one wheel notch when the platform reports pixel deltas.
const PIXELS_PER_LINE: f32 = 100.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragAction {
    #[default]
    None,
    Rotate,
    Dolly,
    Pan,
}

/// Radius, polar angle `phi` measured from +Y and azimuth `theta` around +Y measured from +Z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vector3<f32>) -> Self {
        let radius = offset.magnitude();
        if radius <= EPS {
            return Self {
                radius: 0.0,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_offset(&self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    /// Keep `phi` away from the poles where the view direction would be parallel to up.
    pub fn make_safe(&mut self) {
        self.phi = self.phi.clamp(EPS, PI - EPS);
    }
}

#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub enabled: bool,
    pub target: Point3<f32>,

    pub enable_damping: bool,
    pub damping_factor: f32,
    pub auto_rotate: bool,
    /// 2.0 means one full orbit every 30 seconds.
    pub auto_rotate_speed: f32,

    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,

    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,

    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vector3<f32>,
    /// Screen space pan still to be converted into world units.
    pending_pan: (f32, f32),
    viewport_height: f32,

    action: DragAction,
    last_cursor: Option<(f64, f64)>,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            enabled: true,
            target: Point3::new(0.0, 0.0, 0.0),
            enable_damping: false,
            damping_factor: 0.05,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vector3::zero(),
            pending_pan: (0.0, 0.0),
            viewport_height: 1.0,
            action: DragAction::None,
            last_cursor: None,
        }
    }
}

impl OrbitControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn action(&self) -> DragAction {
        self.action
    }

    fn zoom_scale(&self) -> f32 {
        0.95f32.powf(self.zoom_speed)
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    /// Move closer to the target.
    pub fn dolly_in(&mut self, dolly_scale: f32) {
        self.scale *= dolly_scale;
    }

    pub fn dolly_out(&mut self, dolly_scale: f32) {
        self.scale /= dolly_scale;
    }

    /// Pan by a screen space distance in pixels.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.pending_pan.0 += dx * self.pan_speed;
        self.pending_pan.1 += dy * self.pan_speed;
    }

    pub fn pointer_down(&mut self, button: MouseButton) {
        if !self.enabled {
            return;
        }
        self.action = match button {
            MouseButton::Left => DragAction::Rotate,
            MouseButton::Middle => DragAction::Dolly,
            MouseButton::Right => DragAction::Pan,
            _ => self.action,
        };
    }

    pub fn pointer_up(&mut self) {
        self.action = DragAction::None;
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, viewport_height: f32) {
        let last = self.last_cursor.replace((x, y));
        if !self.enabled {
            return;
        }
        let Some((last_x, last_y)) = last else {
            return;
        };
        let (dx, dy) = ((x - last_x) as f32, (y - last_y) as f32);
        let height = viewport_height.max(1.0);
        self.viewport_height = height;
        match self.action {
            DragAction::None => {}
            DragAction::Rotate => {
                self.rotate_left(2.0 * PI * dx / height * self.rotate_speed);
                self.rotate_up(2.0 * PI * dy / height * self.rotate_speed);
            }
            DragAction::Dolly => {
                if dy > 0.0 {
                    self.dolly_out(self.zoom_scale());
                } else if dy < 0.0 {
                    self.dolly_in(self.zoom_scale());
                }
            }
            DragAction::Pan => self.pan(dx, dy),
        }
    }

    /// Positive `notches` scroll away from the user and zoom in.
    pub fn wheel(&mut self, notches: f32) {
        if !self.enabled || self.action != DragAction::None {
            return;
        }
        if notches > 0.0 {
            self.dolly_in(self.zoom_scale());
        } else if notches < 0.0 {
            self.dolly_out(self.zoom_scale());
        }
    }

    /// Feed a window event. Returns whether the controls reacted to it.
    pub fn handle_window_events(&mut self, event: &WindowEvent, viewport_height: f32) -> bool {
        match event {
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button,
                ..
            } => {
                self.pointer_down(*button);
                self.action != DragAction::None
            }
            WindowEvent::MouseInput {
                state: ElementState::Released,
                ..
            } => {
                let was_dragging = self.action != DragAction::None;
                self.pointer_up();
                was_dragging
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_move(position.x, position.y, viewport_height);
                self.action != DragAction::None
            }
            WindowEvent::CursorLeft { .. } => {
                self.last_cursor = None;
                self.pointer_up();
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                self.wheel(notches);
                true
            }
            _ => false,
        }
    }

    fn resolve_pan(&mut self, camera: &Camera, projection: &Projection) {
        let (dx, dy) = std::mem::take(&mut self.pending_pan);
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        let offset = camera.position - self.target;
        let target_distance = offset.magnitude() * (projection.fovy.0 / 2.0).tan();
        let forward = (camera.target - camera.position).normalize();
        let right = forward.cross(camera.up).normalize();
        let up = right.cross(forward);
        let height = self.viewport_height.max(1.0);
        // dragging right moves the scene right, so the target moves left
        self.pan_offset += right * (-2.0 * dx * target_distance / height);
        self.pan_offset += up * (2.0 * dy * target_distance / height);
    }

    /// Apply the accumulated input and auto-rotation to `camera`.
    ///
    /// Returns whether the camera moved noticeably.
    pub fn update(&mut self, camera: &mut Camera, projection: &Projection, dt: Duration) -> bool {
        self.resolve_pan(camera, projection);

        let mut spherical = Spherical::from_offset(camera.position - self.target);

        if self.auto_rotate && self.action == DragAction::None {
            self.rotate_left(2.0 * PI / 60.0 * self.auto_rotate_speed * dt.as_secs_f32());
        }

        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        spherical.theta += self.delta_theta * factor;
        spherical.phi += self.delta_phi * factor;
        spherical.phi = spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle.max(self.min_polar_angle));
        spherical.make_safe();

        spherical.radius = (spherical.radius * self.scale)
            .clamp(self.min_distance, self.max_distance.max(self.min_distance));

        self.target += self.pan_offset * factor;

        let previous = camera.position;
        camera.position = self.target + spherical.to_offset();
        camera.target = self.target;

        if self.enable_damping {
            self.delta_theta *= 1.0 - self.damping_factor;
            self.delta_phi *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.pan_offset = Vector3::zero();
        }
        self.scale = 1.0;

        (camera.position - previous).magnitude2() > EPS
    }
}
