use matcap_scene::{
    config::{BoxTexture, SceneConfig, ScatterField},
    data_structures::model::MaterialUniform,
    gui::{ControlValue, DebugPanel},
    scene::{BoxControls, BoxRender, BoxState, BoxUpdate, scatter},
};
use rand::{SeedableRng, rngs::StdRng};

use crate::common::test_utils::assert_close;

mod common;

fn box_panel(config: &SceneConfig) -> (DebugPanel, BoxControls, BoxState) {
    let state = BoxState::from(&config.cube);
    let mut panel = DebugPanel::default();
    let controls = BoxControls::register(&mut panel, &state);
    (panel, controls, state)
}

/// Feed every queued panel change to `state`, returning what each one touched.
fn drain_into(panel: &mut DebugPanel, controls: &BoxControls, state: &mut BoxState) -> Vec<Option<BoxUpdate>> {
    panel
        .take_changes()
        .iter()
        .map(|change| state.apply(controls, change))
        .collect()
}

#[test]
fn donuts_preset_scatters_eleven_hundred_tori() {
    let config = SceneConfig::default();
    assert_eq!(config.total_decorations(), 1100);
    assert_eq!(config.fields.len(), 2);
    assert!(config.text.is_some());
    assert!(!config.cube.visible);
    assert!(config.orbit.damping && config.orbit.auto_rotate);
    assert_eq!(config.orbit.auto_rotate_speed, 0.8);
}

#[test]
fn textured_box_preset_shows_the_box_without_text() {
    let config = SceneConfig::textured_box();
    assert!(config.text.is_none());
    assert!(config.cube.visible);
    assert_eq!(config.cube.texture, BoxTexture::Textured);
    assert_eq!(config.matcap, config.box_texture);
}

#[test]
fn box_texture_options_match_their_labels() {
    for texture in [BoxTexture::Textured, BoxTexture::ColorOnly] {
        assert!(BoxTexture::OPTIONS.contains(&texture.label()));
        assert_eq!(BoxTexture::from_label(texture.label()), Some(texture));
    }
    assert_eq!(BoxTexture::from_label("Wood"), None);
}

#[test]
fn scattered_instances_stay_inside_the_field() {
    let field = ScatterField {
        count: 500,
        spread: 15.0,
    };
    let instances = scatter(&mut StdRng::seed_from_u64(3), &field);
    assert_eq!(instances.len(), 500);
    for instance in &instances {
        let p = instance.position;
        assert!([p.x, p.y, p.z].iter().all(|c| c.abs() <= 7.5), "{p:?}");
        assert_eq!(instance.scale, cgmath::Vector3::new(1.0, 1.0, 1.0));
    }
}

#[test]
fn scatter_is_reproducible_per_seed() {
    let field = ScatterField {
        count: 50,
        spread: 50.0,
    };
    let first = scatter(&mut StdRng::seed_from_u64(42), &field);
    let second = scatter(&mut StdRng::seed_from_u64(42), &field);
    let other = scatter(&mut StdRng::seed_from_u64(43), &field);
    assert_eq!(first, second);
    assert_ne!(first, other);
}

#[test]
fn empty_field_scatters_nothing() {
    let field = ScatterField {
        count: 0,
        spread: 10.0,
    };
    assert!(scatter(&mut StdRng::seed_from_u64(1), &field).is_empty());
}

#[test]
fn seeded_config_keeps_the_rest_of_the_preset() {
    let config = SceneConfig::default().with_seed(7);
    assert_eq!(config.seed, Some(7));
    assert_eq!(config.total_decorations(), 1100);
}

#[test]
fn box_starts_from_the_preset() {
    let (panel, controls, state) = box_panel(&SceneConfig::default());
    assert_eq!(state.render_kind(), BoxRender::Hidden);
    assert_eq!(state.instance().position, cgmath::Vector3::new(1.0, 0.0, 0.0));
    assert_close(panel.number(controls.elevation).unwrap(), 0.0, 1e-5);
    assert_eq!(panel.toggle(controls.visible), Some(false));
    assert_eq!(panel.choice(controls.texture), Some("Color only"));

    let (_, _, textured) = box_panel(&SceneConfig::textured_box());
    assert_eq!(textured.render_kind(), BoxRender::Solid);
    assert_eq!(textured.uniform(), MaterialUniform::textured());
}

#[test]
fn elevation_follows_the_last_assignment() {
    let (mut panel, controls, mut state) = box_panel(&SceneConfig::default());
    panel.set(controls.elevation, ControlValue::Number(1.5)).unwrap();
    panel.set(controls.elevation, ControlValue::Number(-2.0)).unwrap();

    let updates = drain_into(&mut panel, &controls, &mut state);
    assert_eq!(updates, vec![Some(BoxUpdate::Transform); 2]);
    assert_close(state.position.y, -2.0, 1e-5);
    assert_close(state.instance().position.y, -2.0, 1e-5);
    // x and z stay where the preset put them
    assert_eq!(state.position.x, 1.0);
    assert_eq!(state.position.z, 0.0);
}

#[test]
fn elevation_is_clamped_by_the_slider() {
    let (mut panel, controls, mut state) = box_panel(&SceneConfig::default());
    panel.set(controls.elevation, ControlValue::Number(10.0)).unwrap();
    drain_into(&mut panel, &controls, &mut state);
    assert_close(state.position.y, 3.0, 1e-5);
}

#[test]
fn visibility_and_wireframe_pick_how_the_box_renders() {
    let (mut panel, controls, mut state) = box_panel(&SceneConfig::default());

    panel.set(controls.visible, ControlValue::Bool(true)).unwrap();
    drain_into(&mut panel, &controls, &mut state);
    assert_eq!(state.render_kind(), BoxRender::Solid);

    panel.set(controls.wireframe, ControlValue::Bool(true)).unwrap();
    let updates = drain_into(&mut panel, &controls, &mut state);
    assert_eq!(updates, vec![Some(BoxUpdate::Appearance)]);
    assert_eq!(state.render_kind(), BoxRender::Wireframe);

    // hiding wins over wireframe
    panel.set(controls.visible, ControlValue::Bool(false)).unwrap();
    drain_into(&mut panel, &controls, &mut state);
    assert_eq!(state.render_kind(), BoxRender::Hidden);
    assert!(state.wireframe);
}

#[test]
fn texture_choice_switches_the_material() {
    let (mut panel, controls, mut state) = box_panel(&SceneConfig::default());
    assert_eq!(state.uniform(), MaterialUniform::colored(state.color));

    panel
        .set(controls.texture, ControlValue::Choice("Box texture".to_string()))
        .unwrap();
    let updates = drain_into(&mut panel, &controls, &mut state);
    assert_eq!(updates, vec![Some(BoxUpdate::Material)]);
    assert_eq!(state.texture, BoxTexture::Textured);
    assert_eq!(state.uniform(), MaterialUniform::textured());

    panel
        .set(controls.texture, ControlValue::Choice("Color only".to_string()))
        .unwrap();
    drain_into(&mut panel, &controls, &mut state);
    assert_eq!(state.uniform(), MaterialUniform::colored([1.0, 1.0, 1.0, 1.0]));
}

#[test]
fn changes_of_other_controls_leave_the_box_alone() {
    let (mut panel, controls, mut state) = box_panel(&SceneConfig::default());
    let auto_rotate = panel.add_toggle("autoRotate", true);
    let before = state.clone();

    panel.set(auto_rotate, ControlValue::Bool(false)).unwrap();
    let updates = drain_into(&mut panel, &controls, &mut state);
    assert_eq!(updates, vec![None]);
    assert_eq!(state, before);
}
