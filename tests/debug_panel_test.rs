use matcap_scene::gui::{ControlKind, ControlValue, DebugPanel, PanelStyle, snap};

use crate::common::test_utils::assert_close;

mod common;

#[test]
fn snap_clamps_and_rounds_to_the_step_grid() {
    assert_close(snap(0.123, -3.0, 3.0, 0.1), 0.1, 1e-5);
    assert_close(snap(0.16, -3.0, 3.0, 0.1), 0.2, 1e-5);
    assert_eq!(snap(5.0, -3.0, 3.0, 0.1), 3.0);
    assert_eq!(snap(-7.0, -3.0, 3.0, 0.1), -3.0);
    // a zero step only clamps
    assert_eq!(snap(0.123, -3.0, 3.0, 0.0), 0.123);
}

#[test]
fn snap_accepts_swapped_bounds() {
    assert_close(snap(0.0, 3.0, -3.0, 0.1), 0.0, 1e-5);
    assert_eq!(snap(9.0, 3.0, -3.0, 0.1), 3.0);
    assert_eq!(snap(-9.0, 3.0, -3.0, 0.1), -3.0);
}

#[test]
fn controls_keep_their_registration_order() {
    let mut panel = DebugPanel::default();
    let elevation = panel.add_slider("elevation", 0.0, -3.0, 3.0, 0.1);
    let visible = panel.add_toggle("visible", true);
    let texture = panel.add_choice("texture", &["Box texture", "Color only"], "Color only");

    assert_eq!(panel.ids().collect::<Vec<_>>(), vec![elevation, visible, texture]);
    assert_eq!(panel.controls()[0].label, "elevation");
    assert_eq!(
        panel.control(elevation).unwrap().kind,
        ControlKind::Slider {
            min: -3.0,
            max: 3.0,
            step: 0.1
        }
    );
    assert_eq!(panel.toggle(visible), Some(true));
    assert_eq!(panel.choice(texture), Some("Color only"));
    assert!(panel.take_changes().is_empty());
}

#[test]
fn initial_values_follow_the_control_rules() {
    let mut panel = DebugPanel::default();
    let slider = panel.add_slider("swapped", 9.0, 3.0, -3.0, 0.5);
    let choice = panel.add_choice("choice", &["a", "b"], "missing");
    assert_eq!(panel.number(slider), Some(3.0));
    assert_eq!(panel.choice(choice), Some("a"));
}

#[test]
fn only_real_changes_are_queued() {
    let mut panel = DebugPanel::default();
    let elevation = panel.add_slider("elevation", 0.0, -3.0, 3.0, 0.1);
    let visible = panel.add_toggle("visible", false);

    assert!(panel.set(elevation, ControlValue::Number(1.26)).unwrap());
    assert!(!panel.set(elevation, ControlValue::Number(1.3)).unwrap());
    assert!(panel.set(visible, ControlValue::Bool(true)).unwrap());
    assert!(!panel.set(visible, ControlValue::Bool(true)).unwrap());

    let changes = panel.take_changes();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].id, elevation);
    assert_eq!(changes[0].label, "elevation");
    assert_close(changes[0].value.as_number().unwrap(), 1.3, 1e-5);
    assert_eq!(changes[1].value, ControlValue::Bool(true));
    assert!(panel.take_changes().is_empty());
}

#[test]
fn invalid_values_are_rejected() {
    let mut panel = DebugPanel::default();
    let elevation = panel.add_slider("elevation", 0.0, -3.0, 3.0, 0.1);
    let texture = panel.add_choice("texture", &["Box texture", "Color only"], "Box texture");

    assert!(panel.set(elevation, ControlValue::Bool(true)).is_err());
    assert!(panel.set(elevation, ControlValue::Number(f32::NAN)).is_err());
    assert!(panel.set(texture, ControlValue::Choice("Wood".to_string())).is_err());
    assert!(panel.set(texture, ControlValue::Number(1.0)).is_err());

    let mut other = DebugPanel::default();
    other.add_toggle("a", false);
    other.add_toggle("b", false);
    let foreign = other.add_toggle("c", false);
    assert!(panel.set(foreign, ControlValue::Bool(true)).is_err());

    assert_eq!(panel.number(elevation), Some(0.0));
    assert!(panel.take_changes().is_empty());
}

#[test]
fn panel_fades_while_closed_and_idle() {
    let mut panel = DebugPanel::new(PanelStyle::default());
    assert!(!panel.is_open());
    assert_eq!(panel.style.width, 400.0);
    assert_eq!(panel.opacity(), 0.4);

    panel.set_hovered(true);
    assert_eq!(panel.opacity(), 1.0);
    panel.set_hovered(false);

    panel.toggle_open();
    assert!(panel.is_open());
    assert_eq!(panel.opacity(), 1.0);
    panel.close();
    assert_eq!(panel.opacity(), 0.4);
}
