//! Typeface fonts in the JSON format produced by facetype.js.
//!
//! A typeface file stores, per glyph, its horizontal advance (`ha`) and its outline as
//! a whitespace separated command string (`o`):
//!
//! - `m x y` starts a new contour
//! - `l x y` draws a line
//! - `q x y cx cy` draws a quadratic curve to `x y` with control point `cx cy`
//! - `b x y c1x c1y c2x c2y` draws a cubic curve to `x y`
//!
//! All coordinates are in font units; `resolution` font units make up one em.

use std::collections::HashMap;

use anyhow::{Context, Result, anyhow, bail};
use cgmath::Vector2;
use serde::Deserialize;

#[derive(Deserialize)]
struct TypefaceFile {
    glyphs: HashMap<String, GlyphFile>,
    resolution: f32,
    #[serde(rename = "boundingBox")]
    bounding_box: BoundsFile,
    #[serde(rename = "underlineThickness", default)]
    underline_thickness: f32,
    #[serde(rename = "familyName", default)]
    family_name: String,
}

#[derive(Deserialize)]
struct GlyphFile {
    ha: f32,
    #[serde(default)]
    o: Option<String>,
}

#[derive(Deserialize)]
struct BoundsFile {
    #[serde(rename = "yMin")]
    y_min: f32,
    #[serde(rename = "yMax")]
    y_max: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Vector2<f32>),
    LineTo(Vector2<f32>),
    QuadTo {
        ctrl: Vector2<f32>,
        to: Vector2<f32>,
    },
    CubicTo {
        ctrl1: Vector2<f32>,
        ctrl2: Vector2<f32>,
        to: Vector2<f32>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Glyph {
    /// Horizontal advance in font units.
    pub advance: f32,
    pub commands: Vec<PathCommand>,
}

/// The flattened contours of one laid out glyph, already scaled and positioned.
pub type GlyphContours = Vec<Vec<Vector2<f32>>>;

#[derive(Clone, Debug)]
pub struct Typeface {
    pub family_name: String,
    pub resolution: f32,
    /// Distance between two baselines in font units.
    pub line_height: f32,
    glyphs: HashMap<char, Glyph>,
}

fn parse_outline(outline: &str) -> Result<Vec<PathCommand>> {
    let mut tokens = outline.split_whitespace();
    let mut commands = Vec::new();
    let next_point = |tokens: &mut std::str::SplitWhitespace, op: &str| -> Result<Vector2<f32>> {
        let mut coord = || -> Result<f32> {
            let token = tokens
                .next()
                .ok_or_else(|| anyhow!("Command '{op}' is missing coordinates"))?;
            token
                .parse::<f32>()
                .with_context(|| format!("Invalid coordinate '{token}' in command '{op}'"))
        };
        Ok(Vector2::new(coord()?, coord()?))
    };
    while let Some(op) = tokens.next() {
        let command = match op {
            "m" => PathCommand::MoveTo(next_point(&mut tokens, op)?),
            "l" => PathCommand::LineTo(next_point(&mut tokens, op)?),
            "q" => {
                let to = next_point(&mut tokens, op)?;
                let ctrl = next_point(&mut tokens, op)?;
                PathCommand::QuadTo { ctrl, to }
            }
            "b" => {
                let to = next_point(&mut tokens, op)?;
                let ctrl1 = next_point(&mut tokens, op)?;
                let ctrl2 = next_point(&mut tokens, op)?;
                PathCommand::CubicTo { ctrl1, ctrl2, to }
            }
            // Some exporters close contours explicitly
            "z" => continue,
            other => bail!("Unknown outline command '{other}'"),
        };
        commands.push(command);
    }
    Ok(commands)
}

impl Typeface {
    pub fn parse(json: &str) -> Result<Self> {
        let file: TypefaceFile =
            serde_json::from_str(json).context("Typeface is not valid typeface JSON")?;
        if file.resolution <= 0.0 {
            bail!("Typeface resolution must be positive, got {}", file.resolution);
        }
        let mut glyphs = HashMap::with_capacity(file.glyphs.len());
        for (key, glyph) in file.glyphs {
            let mut chars = key.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                log::warn!("Skipping typeface glyph with multi-character key {key:?}");
                continue;
            };
            let commands = match &glyph.o {
                Some(outline) => parse_outline(outline)
                    .with_context(|| format!("Glyph {key:?} has a malformed outline"))?,
                None => Vec::new(),
            };
            glyphs.insert(
                c,
                Glyph {
                    advance: glyph.ha,
                    commands,
                },
            );
        }
        Ok(Self {
            family_name: file.family_name,
            resolution: file.resolution,
            line_height: file.bounding_box.y_max - file.bounding_box.y_min + file.underline_thickness,
            glyphs,
        })
    }

    /// The glyph for `c`, falling back to `?` for characters the font does not cover.
    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        self.glyphs.get(&c).or_else(|| self.glyphs.get(&'?'))
    }

    /// Lay out `text` with a font size of `size` world units and flatten every curve
    /// into `curve_segments` straight pieces.
    ///
    /// A newline moves the pen back to `x = 0` and down by one line height.
    /// Characters without a glyph (and no `?` fallback) are skipped.
    pub fn glyph_paths(&self, text: &str, size: f32, curve_segments: u32) -> Vec<GlyphContours> {
        let scale = size / self.resolution;
        let line_height = self.line_height * scale;
        let mut pen = Vector2::new(0.0, 0.0);
        let mut glyphs = Vec::new();

        for c in text.chars() {
            if c == '\n' {
                pen.x = 0.0;
                pen.y -= line_height;
                continue;
            }
            let Some(glyph) = self.glyph(c) else {
                log::warn!("Character {c:?} does not exist in font family {}", self.family_name);
                continue;
            };
            glyphs.push(flatten(&glyph.commands, scale, pen, curve_segments));
            pen.x += glyph.advance * scale;
        }
        glyphs
    }
}

fn flatten(commands: &[PathCommand], scale: f32, offset: Vector2<f32>, segments: u32) -> GlyphContours {
    let segments = segments.max(1);
    let place = |p: Vector2<f32>| p * scale + offset;
    let mut contours: GlyphContours = Vec::new();
    let mut current: Vec<Vector2<f32>> = Vec::new();

    for command in commands {
        match *command {
            PathCommand::MoveTo(p) => {
                if current.len() > 1 {
                    contours.push(std::mem::take(&mut current));
                }
                current.clear();
                current.push(place(p));
            }
            PathCommand::LineTo(p) => current.push(place(p)),
            PathCommand::QuadTo { ctrl, to } => {
                let Some(&from) = current.last() else {
                    current.push(place(to));
                    continue;
                };
                let (ctrl, to) = (place(ctrl), place(to));
                for i in 1..=segments {
                    let t = i as f32 / segments as f32;
                    let mt = 1.0 - t;
                    current.push(from * (mt * mt) + ctrl * (2.0 * mt * t) + to * (t * t));
                }
            }
            PathCommand::CubicTo { ctrl1, ctrl2, to } => {
                let Some(&from) = current.last() else {
                    current.push(place(to));
                    continue;
                };
                let (ctrl1, ctrl2, to) = (place(ctrl1), place(ctrl2), place(to));
                for i in 1..=segments {
                    let t = i as f32 / segments as f32;
                    let mt = 1.0 - t;
                    current.push(
                        from * (mt * mt * mt)
                            + ctrl1 * (3.0 * mt * mt * t)
                            + ctrl2 * (3.0 * mt * t * t)
                            + to * (t * t * t),
                    );
                }
            }
        }
    }
    if current.len() > 1 {
        contours.push(current);
    }
    for contour in contours.iter_mut() {
        if contour.len() > 1 && contour.first() == contour.last() {
            contour.pop();
        }
    }
    contours
}
