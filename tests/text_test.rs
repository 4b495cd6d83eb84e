use cgmath::{InnerSpace, Vector2, Vector3};
use matcap_scene::{
    geometry::{TextOptions, text_geometry},
    resources::font::{PathCommand, Typeface},
};

use crate::common::test_utils::{TYPEFACE_JSON, assert_close, typeface, typeface_without_fallback};

mod common;

fn flat_options() -> TextOptions {
    TextOptions {
        size: 1.0,
        depth: 0.5,
        bevel_enabled: false,
        ..Default::default()
    }
}

#[test]
fn parses_metrics_and_outlines() {
    let font = typeface();
    assert_eq!(font.family_name, "Fixture");
    assert_eq!(font.resolution, 100.0);
    // yMax - yMin + underline thickness
    assert_eq!(font.line_height, 130.0);

    let c = font.glyph('c').unwrap();
    assert_eq!(c.advance, 110.0);
    assert_eq!(
        c.commands,
        vec![
            PathCommand::MoveTo(Vector2::new(0.0, 0.0)),
            PathCommand::QuadTo {
                ctrl: Vector2::new(50.0, 50.0),
                to: Vector2::new(100.0, 0.0),
            },
        ]
    );
    assert!(font.glyph(' ').unwrap().commands.is_empty());
}

#[test]
fn rejects_malformed_typefaces() {
    assert!(Typeface::parse("not json").is_err());
    assert!(Typeface::parse(&TYPEFACE_JSON.replace(r#""resolution": 100"#, r#""resolution": 0"#)).is_err());
    assert!(Typeface::parse(&TYPEFACE_JSON.replace("m 0 0 q", "x 0 0 q")).is_err());
    assert!(Typeface::parse(&TYPEFACE_JSON.replace("q 100 0 50 50", "q 100 0 50")).is_err());
}

#[test]
fn unknown_characters_fall_back_to_question_mark() {
    let font = typeface();
    assert_eq!(font.glyph('Z'), font.glyph('?'));

    let paths = font.glyph_paths("Z", 1.0, 4);
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].len(), 1);
    assert_eq!(paths[0][0].len(), 4);
}

#[test]
fn characters_without_any_glyph_are_skipped() {
    let font = typeface_without_fallback();
    assert!(font.glyph('Z').is_none());
    assert_eq!(font.glyph_paths("ZOZ", 1.0, 4).len(), 1);
}

#[test]
fn glyphs_advance_along_the_line() {
    let font = typeface();
    let paths = font.glyph_paths("OO", 1.0, 4);
    assert_eq!(paths.len(), 2);
    // outer ring without its closing point, then the hole
    assert_eq!(paths[0].len(), 2);
    assert_eq!(paths[0][0].len(), 4);
    assert_eq!(paths[0][1].len(), 4);
    assert_close(paths[0][0][1].x, 0.0, 1e-6);
    assert_close(paths[0][0][1].y, 1.0, 1e-6);
    assert_close(paths[1][0][0].x, 1.2, 1e-6);
}

#[test]
fn newline_returns_to_the_start_of_the_next_line() {
    let font = typeface();
    let paths = font.glyph_paths("O\nO", 2.0, 4);
    assert_eq!(paths.len(), 2);
    let second = paths[1][0][0];
    assert_close(second.x, 0.0, 1e-6);
    assert_close(second.y, -2.6, 1e-5);
}

#[test]
fn curves_are_flattened_into_segments() {
    let font = typeface();
    let paths = font.glyph_paths("c", 1.0, 4);
    let contour = &paths[0][0];
    assert_eq!(contour.len(), 5);
    assert_eq!(contour[0], Vector2::new(0.0, 0.0));
    // the curve peaks halfway between the ends
    assert_close(contour[2].x, 0.5, 1e-6);
    assert_close(contour[2].y, 0.25, 1e-6);
    assert_close(contour[4].x, 1.0, 1e-6);
}

#[test]
fn flat_text_is_centered_and_extruded() {
    let geometry = text_geometry(&typeface(), "O", &flat_options());
    let bounds = geometry.bounding_box().unwrap();
    assert_close(bounds.size().x, 1.0, 1e-5);
    assert_close(bounds.size().y, 1.0, 1e-5);
    assert_close(bounds.size().z, 0.5, 1e-5);
    assert_close(bounds.center().magnitude(), 0.0, 1e-5);
}

#[test]
fn every_face_has_its_own_unit_normal() {
    let geometry = text_geometry(&typeface(), "Oc", &TextOptions::default());
    assert!(geometry.triangle_count() > 0);
    assert_eq!(geometry.indices.len(), geometry.vertices.len());
    for triangle in geometry.vertices.chunks_exact(3) {
        let normal = Vector3::from(triangle[0].normal);
        assert_close(normal.magnitude(), 1.0, 1e-4);
        assert!(triangle.iter().all(|v| v.normal == triangle[0].normal));
    }
}

#[test]
fn caps_face_forwards_and_backwards() {
    let geometry = text_geometry(&typeface(), "O", &flat_options());
    let bounds = geometry.bounding_box().unwrap();
    let facing = |z: f32, sign: f32| {
        geometry.vertices.iter().any(|v| {
            (v.position[2] - z).abs() < 1e-5 && (v.normal[2] - sign).abs() < 1e-4
        })
    };
    assert!(facing(bounds.max.z, 1.0));
    assert!(facing(bounds.min.z, -1.0));
}

#[test]
fn bevel_grows_the_outline_and_the_depth() {
    let options = TextOptions {
        size: 1.0,
        ..Default::default()
    };
    let geometry = text_geometry(&typeface(), "O", &options);
    let size = geometry.bounding_box().unwrap().size();
    assert_close(size.x, 1.0 + 2.0 * options.bevel_size, 1e-4);
    assert_close(size.y, 1.0 + 2.0 * options.bevel_size, 1e-4);
    assert_close(size.z, options.depth + 2.0 * options.bevel_thickness, 1e-4);
}

#[test]
fn blank_text_has_no_geometry() {
    let font = typeface();
    assert!(text_geometry(&font, "", &TextOptions::default()).vertices.is_empty());
    assert!(text_geometry(&font, " \n ", &TextOptions::default()).bounding_box().is_none());
}
