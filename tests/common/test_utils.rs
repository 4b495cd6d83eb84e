#![allow(dead_code)]

use cgmath::{InnerSpace, Vector3};
use matcap_scene::{camera::Camera, resources::font::Typeface};

/// 100 font units per em. `O` is a square ring, `?` a small square and `c` a single
/// quadratic curve.
pub const TYPEFACE_JSON: &str = r#"{
    "familyName": "Fixture",
    "resolution": 100,
    "underlineThickness": 10,
    "boundingBox": { "xMin": 0, "xMax": 100, "yMin": -20, "yMax": 100 },
    "glyphs": {
        "O": { "ha": 120, "o": "m 0 0 l 0 100 l 100 100 l 100 0 l 0 0 m 25 25 l 75 25 l 75 75 l 25 75 z" },
        "?": { "ha": 60, "o": "m 0 0 l 0 50 l 50 50 l 50 0" },
        "c": { "ha": 110, "o": "m 0 0 q 100 0 50 50" },
        " ": { "ha": 40 }
    }
}"#;

pub fn typeface() -> Typeface {
    Typeface::parse(TYPEFACE_JSON).expect("fixture typeface parses")
}

/// Same glyphs as [`TYPEFACE_JSON`] without the `?` fallback.
pub fn typeface_without_fallback() -> Typeface {
    let json = TYPEFACE_JSON.replace(r#""?": { "ha": 60, "o": "m 0 0 l 0 50 l 50 50 l 50 0" },"#, "");
    Typeface::parse(&json).expect("fixture typeface parses")
}

pub fn assert_close(actual: f32, expected: f32, tolerance: f32) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}

pub fn camera_at(x: f32, y: f32, z: f32) -> Camera {
    Camera::new((x, y, z))
}

pub fn distance_to_origin(camera: &Camera) -> f32 {
    Vector3::new(camera.position.x, camera.position.y, camera.position.z).magnitude()
}
