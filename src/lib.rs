//! matcap-scene
//!
//! A small, cross-platform instancing renderer that shows a matcap-shaded text and
//! a field of scattered tori, orbit-style camera controls and a debug panel. It runs
//! natively and in the browser (WASM). The renderer is organised around *flows*:
//! self-contained scene objects that receive input, update state and hand the engine
//! a [`render::Render`] tree each frame.
//!
//! High-level modules
//! - `camera`: perspective camera, projection and the camera uniform
//! - `config`: literal scene parameters and the two application presets
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `controls`: orbit controls with damping and auto-rotation
//! - `data_structures`: engine data models (meshes, instances, textures)
//! - `flow`: high level flow control (scenes / update loops)
//! - `geometry`: CPU-side box, torus, axes and extruded text geometry
//! - `gui`: the debug panel model and its egui overlay
//! - `pipelines`: basic, matcap and line render pipelines
//! - `resources`: helpers to load textures and fonts and create GPU resources
//! - `render`: render composition for efficient pipeline reuse
//! - `scene`: the matcap scene flow both demo apps run
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod flow;
pub mod geometry;
pub mod gui;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Browser entry point: runs the donuts preset on the `canvas` element.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), JsValue> {
    scene::run_scene(config::SceneConfig::default()).map_err(|e| JsValue::from_str(&e.to_string()))
}
