//! Render composition and pipeline batching.
//!
//! This module defines the [`Render`] enum, which flows return to describe what they
//! want drawn this frame. The engine sorts the entries into one batch per pipeline
//! (lines, basic, matcap) so every pipeline is bound once per frame, and runs custom
//! draw closures in place.
//!
//! # Key types
//!
//! - [`Render<'a, 'pass>`] is the primary enum describing render operations
//! - [`Instanced<'a>`] contains data for instanced mesh rendering (model + instance buffer)
//! - [`LineSet<'a>`] contains data for instanced line rendering (lines + instance buffer)
//! - [`SkipLog`] decides whether an entry is drawn and reports empty ones
//!

use std::collections::HashSet;

use wgpu::RenderPass;

use crate::{
    context::Context,
    data_structures::model::{Lines, Model},
};

/// Data for instanced mesh rendering: a model and its instance buffer.
///
/// The instance buffer holds one [`crate::data_structures::instance::InstanceRaw`]
/// per copy. `amount` is the number of copies drawn.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub model: &'a Model,
    pub amount: usize,
}

/// Data for instanced line rendering.
pub struct LineSet<'a> {
    pub lines: &'a Lines,
    pub instance: &'a wgpu::Buffer,
    pub amount: usize,
}

/// Specifies how a flow's objects should be rendered.
///
/// # Variants
///
/// - `None` renders nothing
/// - `Basic(Instanced)` renders an unlit mesh (colour map or flat colour)
/// - `Matcap(Instanced)` renders a matcap shaded mesh
/// - `Matcaps(Vec<Instanced>)` renders a batch of matcap shaded meshes
/// - `Lines(LineSet)` renders vertex coloured lines
/// - `Composed(Vec<Render>)` recursively renders a composition of multiple renders
/// - `Custom(...)` invokes a user-defined closure for custom rendering
///
pub enum Render<'a, 'pass>
where
    'pass: 'a,
{
    None,
    Basic(Instanced<'a>),
    Matcap(Instanced<'a>),
    Matcaps(Vec<Instanced<'a>>),
    Lines(LineSet<'a>),
    Composed(Vec<Render<'a, 'pass>>),
    Custom(Box<dyn 'a + FnOnce(&Context, &mut wgpu::RenderPass<'pass>)>),
}

impl<'a, 'pass> Render<'a, 'pass> {
    pub(crate) fn set_pipelines(
        self,
        ctx: &Context,
        render_pass: &mut RenderPass<'pass>,
        basics: &mut Vec<Instanced<'a>>,
        matcaps: &mut Vec<Instanced<'a>>,
        lines: &mut Vec<LineSet<'a>>,
    ) {
        match self {
            Render::Basic(instanced) => basics.push(instanced),
            Render::Matcap(instanced) => matcaps.push(instanced),
            Render::Matcaps(mut vec) => matcaps.append(&mut vec),
            Render::Lines(set) => lines.push(set),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(ctx, render_pass, basics, matcaps, lines)),
            Render::Custom(f) => f(ctx, render_pass),
            Render::None => (),
        }
    }
}

/// Tracks entries that were skipped because they have no instances.
///
/// An entry that stays empty is reported at warn level once, then at debug level on
/// every later frame.
#[derive(Debug, Default)]
pub struct SkipLog {
    reported: HashSet<String>,
}

impl SkipLog {
    /// Whether `amount` instances in an instance buffer of `buffer_size` bytes can be drawn.
    pub fn should_draw(&mut self, label: &str, amount: usize, buffer_size: u64) -> bool {
        if amount > 0 && buffer_size > 0 {
            return true;
        }
        let level = self.note_skip(label);
        log::log!(level, "Skipping {label:?}, it has no instances");
        false
    }

    /// Record a skip of `label` and return the level to report it at.
    pub fn note_skip(&mut self, label: &str) -> log::Level {
        if self.reported.insert(label.to_string()) {
            log::Level::Warn
        } else {
            log::Level::Debug
        }
    }

    pub fn was_reported(&self, label: &str) -> bool {
        self.reported.contains(label)
    }
}
