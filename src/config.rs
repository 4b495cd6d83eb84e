//! Literal scene parameters.
//!
//! [`SceneConfig::default`] is the donuts scene; [`SceneConfig::textured_box`] is the
//! textured box variant. The two demo apps only differ in the preset they pass to
//! [`crate::scene::run_scene`].

use cgmath::Deg;

use crate::{geometry::TextOptions, gui::PanelStyle};

#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    pub fov: Deg<f32>,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: Deg(75.0),
            near: 0.1,
            far: 100.0,
            position: [0.0, 0.0, 3.0],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextConfig {
    pub font: String,
    pub content: String,
    pub options: TextOptions,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font: "fonts/optimer_bold.typeface.json".to_string(),
            content: "Andry\nSafidy\nTsiory\nLyda\nBrillant".to_string(),
            options: TextOptions::default(),
        }
    }
}

/// How the box is coloured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoxTexture {
    /// Sample the texture.
    Textured,
    /// Flat colour only.
    #[default]
    ColorOnly,
}

impl BoxTexture {
    pub const OPTIONS: [&'static str; 2] = ["Box texture", "Color only"];

    pub fn label(&self) -> &'static str {
        match self {
            BoxTexture::Textured => Self::OPTIONS[0],
            BoxTexture::ColorOnly => Self::OPTIONS[1],
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Box texture" => Some(BoxTexture::Textured),
            "Color only" => Some(BoxTexture::ColorOnly),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoxConfig {
    pub size: [f32; 3],
    pub position: [f32; 3],
    pub visible: bool,
    pub wireframe: bool,
    pub texture: BoxTexture,
    /// Used when the texture is switched off.
    pub color: [f32; 4],
}

impl Default for BoxConfig {
    fn default() -> Self {
        Self {
            size: [1.0, 1.0, 1.0],
            position: [1.0, 0.0, 0.0],
            visible: false,
            wireframe: false,
            texture: BoxTexture::ColorOnly,
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TorusConfig {
    pub radius: f32,
    pub tube: f32,
    pub radial_segments: u32,
    pub tubular_segments: u32,
}

impl Default for TorusConfig {
    fn default() -> Self {
        Self {
            radius: 0.5,
            tube: 0.3,
            radial_segments: 20,
            tubular_segments: 20,
        }
    }
}

/// `count` meshes scattered in a cube with edge length `spread` around the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterField {
    pub count: usize,
    pub spread: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrbitConfig {
    pub damping: bool,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            damping: true,
            auto_rotate: true,
            auto_rotate_speed: 0.8,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub title: String,
    pub camera: CameraConfig,
    /// Matcap image shared by the text and the tori.
    pub matcap: String,
    /// Colour map of the box.
    pub box_texture: String,
    /// `None` leaves the text out.
    pub text: Option<TextConfig>,
    pub cube: BoxConfig,
    pub torus: TorusConfig,
    pub fields: Vec<ScatterField>,
    pub axes_size: f32,
    pub orbit: OrbitConfig,
    /// Fixed seed for a reproducible scatter, entropy otherwise.
    pub seed: Option<u64>,
    pub panel: PanelStyle,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            title: "donuts".to_string(),
            camera: CameraConfig::default(),
            matcap: "textures/mat-cap-libigl.png".to_string(),
            box_texture: "textures/mat-cap-libigl.png".to_string(),
            text: Some(TextConfig::default()),
            cube: BoxConfig::default(),
            torus: TorusConfig::default(),
            fields: vec![
                ScatterField {
                    count: 100,
                    spread: 15.0,
                },
                ScatterField {
                    count: 1000,
                    spread: 50.0,
                },
            ],
            axes_size: 2.0,
            orbit: OrbitConfig::default(),
            seed: None,
            panel: PanelStyle::default(),
        }
    }
}

impl SceneConfig {
    /// The box variant: no text, a visible textured box driven from the debug panel.
    pub fn textured_box() -> Self {
        Self {
            title: "textured-box".to_string(),
            text: None,
            cube: BoxConfig {
                visible: true,
                texture: BoxTexture::Textured,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn total_decorations(&self) -> usize {
        self.fields.iter().map(|field| field.count).sum()
    }
}
