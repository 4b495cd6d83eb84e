use std::time::Duration;

use cgmath::Deg;
use matcap_scene::{
    camera::Projection,
    controls::{DragAction, OrbitControls, Spherical},
};
use winit::event::MouseButton;

use crate::common::test_utils::{assert_close, camera_at, distance_to_origin};

mod common;

fn projection() -> Projection {
    Projection::new(800, 600, Deg(75.0), 0.1, 100.0)
}

const FRAME: Duration = Duration::from_millis(16);

#[test]
fn spherical_round_trips_an_offset() {
    let offset = cgmath::Vector3::new(1.0, 2.0, -3.0);
    let back = Spherical::from_offset(offset).to_offset();
    assert_close(back.x, 1.0, 1e-5);
    assert_close(back.y, 2.0, 1e-5);
    assert_close(back.z, -3.0, 1e-5);
}

#[test]
fn idle_controls_keep_the_camera_still() {
    let mut controls = OrbitControls::new();
    let mut camera = camera_at(0.0, 0.0, 3.0);
    assert!(!controls.update(&mut camera, &projection(), FRAME));
    assert_close(camera.position.z, 3.0, 1e-5);
}

#[test]
fn auto_rotate_circles_at_constant_distance() {
    let mut controls = OrbitControls::new();
    controls.auto_rotate = true;
    controls.auto_rotate_speed = 2.0;
    let mut camera = camera_at(0.0, 0.0, 3.0);

    // one full turn per 60 seconds at speed 1
    assert!(controls.update(&mut camera, &projection(), Duration::from_secs(1)));
    let expected = -(std::f32::consts::TAU / 60.0 * 2.0);
    assert_close(camera.position.x, 3.0 * expected.sin(), 1e-4);
    assert_close(camera.position.y, 0.0, 1e-5);
    assert_close(distance_to_origin(&camera), 3.0, 1e-4);
}

#[test]
fn dragging_pauses_auto_rotate() {
    let mut controls = OrbitControls::new();
    controls.auto_rotate = true;
    controls.pointer_down(MouseButton::Left);
    assert_eq!(controls.action(), DragAction::Rotate);

    let mut camera = camera_at(0.0, 0.0, 3.0);
    assert!(!controls.update(&mut camera, &projection(), Duration::from_secs(1)));

    controls.pointer_up();
    assert!(controls.update(&mut camera, &projection(), Duration::from_secs(1)));
}

#[test]
fn damping_spreads_a_rotation_over_several_frames() {
    let mut controls = OrbitControls::new();
    controls.enable_damping = true;
    controls.rotate_left(1.0);
    let mut camera = camera_at(0.0, 0.0, 3.0);

    let mut steps = Vec::new();
    for _ in 0..3 {
        let before = Spherical::from_offset(camera.position - controls.target).theta;
        controls.update(&mut camera, &projection(), FRAME);
        let after = Spherical::from_offset(camera.position - controls.target).theta;
        steps.push(before - after);
    }
    assert_close(steps[0], 0.05, 1e-4);
    assert!(steps[1] > 0.0 && steps[1] < steps[0]);
    assert!(steps[2] < steps[1]);
}

#[test]
fn without_damping_input_applies_at_once() {
    let mut controls = OrbitControls::new();
    controls.rotate_left(0.5);
    let mut camera = camera_at(0.0, 0.0, 3.0);
    assert!(controls.update(&mut camera, &projection(), FRAME));
    assert_close(camera.position.x, 3.0 * (-0.5f32).sin(), 1e-4);
    assert!(!controls.update(&mut camera, &projection(), FRAME));
}

#[test]
fn polar_angle_stays_clear_of_the_pole() {
    let mut controls = OrbitControls::new();
    controls.rotate_up(10.0);
    let mut camera = camera_at(0.0, 0.0, 3.0);
    controls.update(&mut camera, &projection(), FRAME);
    assert!(camera.position.y > 2.99);
    assert!(camera.position.x.is_finite() && camera.position.z.is_finite());
    assert_close(distance_to_origin(&camera), 3.0, 1e-4);
}

#[test]
fn wheel_dollies_towards_and_away_from_the_target() {
    let mut controls = OrbitControls::new();
    let mut camera = camera_at(0.0, 0.0, 3.0);

    controls.wheel(1.0);
    controls.update(&mut camera, &projection(), FRAME);
    assert_close(camera.position.z, 3.0 * 0.95, 1e-4);

    controls.wheel(-1.0);
    controls.update(&mut camera, &projection(), FRAME);
    assert_close(camera.position.z, 3.0, 1e-4);
}

#[test]
fn distance_limits_clamp_the_dolly() {
    let mut controls = OrbitControls::new();
    controls.min_distance = 2.9;
    let mut camera = camera_at(0.0, 0.0, 3.0);
    for _ in 0..10 {
        controls.wheel(1.0);
    }
    controls.update(&mut camera, &projection(), FRAME);
    assert_close(camera.position.z, 2.9, 1e-4);
}

#[test]
fn wheel_is_ignored_while_dragging() {
    let mut controls = OrbitControls::new();
    controls.pointer_down(MouseButton::Right);
    controls.wheel(1.0);
    let mut camera = camera_at(0.0, 0.0, 3.0);
    assert!(!controls.update(&mut camera, &projection(), FRAME));
}

#[test]
fn first_cursor_position_only_anchors_the_drag() {
    let mut controls = OrbitControls::new();
    controls.pointer_down(MouseButton::Left);
    controls.pointer_move(400.0, 300.0, 600.0);
    let mut camera = camera_at(0.0, 0.0, 3.0);
    assert!(!controls.update(&mut camera, &projection(), FRAME));

    controls.pointer_move(460.0, 300.0, 600.0);
    assert!(controls.update(&mut camera, &projection(), FRAME));
    // dragging right swings the camera to the left of the target
    assert!(camera.position.x < 0.0);
}

#[test]
fn panning_moves_the_target_with_the_camera() {
    let mut controls = OrbitControls::new();
    controls.pointer_down(MouseButton::Right);
    controls.pointer_move(100.0, 100.0, 600.0);
    controls.pointer_move(160.0, 100.0, 600.0);
    let mut camera = camera_at(0.0, 0.0, 3.0);
    controls.update(&mut camera, &projection(), FRAME);

    assert!(controls.target.x < 0.0);
    assert_close(camera.position.x, controls.target.x, 1e-5);
    assert_close(camera.position.z - controls.target.z, 3.0, 1e-4);
}

#[test]
fn disabled_controls_ignore_input() {
    let mut controls = OrbitControls::new();
    controls.enabled = false;
    controls.pointer_down(MouseButton::Left);
    controls.wheel(1.0);
    assert_eq!(controls.action(), DragAction::None);
    let mut camera = camera_at(0.0, 0.0, 3.0);
    assert!(!controls.update(&mut camera, &projection(), FRAME));
}
