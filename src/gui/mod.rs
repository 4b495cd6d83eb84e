//! The debug panel: a small list of tweakable values.
//!
//! [`DebugPanel`] is the model. It validates and stores values and queues a
//! [`ControlChange`] whenever one actually changes. [`layer::GuiLayer`] draws it with egui
//! and writes user input back through [`DebugPanel::set`], so values set from code and
//! values set by the user go through the same rules.

use anyhow::{Result, anyhow, bail};

pub mod layer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(usize);

#[derive(Clone, Debug, PartialEq)]
pub enum ControlKind {
    Slider { min: f32, max: f32, step: f32 },
    Toggle,
    Choice { options: Vec<String> },
}

#[derive(Clone, Debug, PartialEq)]
pub enum ControlValue {
    Number(f32),
    Bool(bool),
    Choice(String),
}

impl ControlValue {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            ControlValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ControlValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<&str> {
        match self {
            ControlValue::Choice(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Control {
    pub label: String,
    pub kind: ControlKind,
    pub value: ControlValue,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ControlChange {
    pub id: ControlId,
    pub label: String,
    pub value: ControlValue,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PanelStyle {
    pub title: String,
    /// Width in logical pixels.
    pub width: f32,
    /// Opacity while the panel is closed and not hovered.
    pub idle_opacity: f32,
    pub padding: f32,
}

impl Default for PanelStyle {
    fn default() -> Self {
        Self {
            title: "Debug".to_string(),
            width: 400.0,
            idle_opacity: 0.4,
            padding: 8.0,
        }
    }
}

/// Clamp `value` to `[min, max]` and snap it to the step grid that starts at `min`.
/// Swapped bounds are put back in order first.
pub fn snap(value: f32, min: f32, max: f32, step: f32) -> f32 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };
    let clamped = value.clamp(min, max);
    if step <= 0.0 {
        return clamped;
    }
    let snapped = ((clamped - min) / step).round() * step + min;
    snapped.clamp(min, max)
}

#[derive(Clone, Debug, Default)]
pub struct DebugPanel {
    pub style: PanelStyle,
    controls: Vec<Control>,
    changes: Vec<ControlChange>,
    open: bool,
    hovered: bool,
}

impl DebugPanel {
    pub fn new(style: PanelStyle) -> Self {
        Self {
            style,
            ..Default::default()
        }
    }

    fn push(&mut self, control: Control) -> ControlId {
        self.controls.push(control);
        ControlId(self.controls.len() - 1)
    }

    pub fn add_slider(&mut self, label: &str, initial: f32, min: f32, max: f32, step: f32) -> ControlId {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        self.push(Control {
            label: label.to_string(),
            kind: ControlKind::Slider { min, max, step },
            value: ControlValue::Number(snap(initial, min, max, step)),
        })
    }

    pub fn add_toggle(&mut self, label: &str, initial: bool) -> ControlId {
        self.push(Control {
            label: label.to_string(),
            kind: ControlKind::Toggle,
            value: ControlValue::Bool(initial),
        })
    }

    /// Add a drop-down. An unknown `selected` option falls back to the first one.
    pub fn add_choice(&mut self, label: &str, options: &[&str], selected: &str) -> ControlId {
        let options: Vec<String> = options.iter().map(|o| o.to_string()).collect();
        let selected = if options.iter().any(|o| o == selected) {
            selected.to_string()
        } else {
            log::warn!("Choice {label:?} has no option {selected:?}");
            options.first().cloned().unwrap_or_default()
        };
        self.push(Control {
            label: label.to_string(),
            kind: ControlKind::Choice { options },
            value: ControlValue::Choice(selected),
        })
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn ids(&self) -> impl Iterator<Item = ControlId> + use<> {
        (0..self.controls.len()).map(ControlId)
    }

    pub fn control(&self, id: ControlId) -> Option<&Control> {
        self.controls.get(id.0)
    }

    /// Assign a new value. Returns whether the stored value changed.
    ///
    /// Numbers are clamped and snapped to the slider's step, choices must be one of the
    /// options and the value kind must match the control kind.
    pub fn set(&mut self, id: ControlId, value: ControlValue) -> Result<bool> {
        let control = self
            .controls
            .get_mut(id.0)
            .ok_or_else(|| anyhow!("No debug control with id {}", id.0))?;
        let value = match (&control.kind, value) {
            (ControlKind::Slider { min, max, step }, ControlValue::Number(v)) => {
                if v.is_nan() {
                    bail!("{:?} cannot be set to NaN", control.label);
                }
                ControlValue::Number(snap(v, *min, *max, *step))
            }
            (ControlKind::Toggle, ControlValue::Bool(v)) => ControlValue::Bool(v),
            (ControlKind::Choice { options }, ControlValue::Choice(v)) => {
                if !options.contains(&v) {
                    bail!("{:?} has no option {v:?}", control.label);
                }
                ControlValue::Choice(v)
            }
            (kind, value) => bail!("{:?} is a {kind:?} and cannot hold {value:?}", control.label),
        };
        if control.value == value {
            return Ok(false);
        }
        control.value = value.clone();
        self.changes.push(ControlChange {
            id,
            label: control.label.clone(),
            value,
        });
        Ok(true)
    }

    pub fn number(&self, id: ControlId) -> Option<f32> {
        self.control(id)?.value.as_number()
    }

    pub fn toggle(&self, id: ControlId) -> Option<bool> {
        self.control(id)?.value.as_bool()
    }

    pub fn choice(&self, id: ControlId) -> Option<&str> {
        self.control(id)?.value.as_choice()
    }

    /// Drain the changes queued since the last call, oldest first.
    pub fn take_changes(&mut self) -> Vec<ControlChange> {
        std::mem::take(&mut self.changes)
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle_open(&mut self) {
        self.open = !self.open;
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    /// Fully opaque while open or hovered, faded otherwise.
    pub fn opacity(&self) -> f32 {
        if self.open || self.hovered {
            1.0
        } else {
            self.style.idle_opacity
        }
    }
}
