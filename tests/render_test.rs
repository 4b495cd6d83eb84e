use matcap_scene::{context::gui_view_format, render::SkipLog};

#[test]
fn entries_with_instances_are_drawn() {
    let mut skips = SkipLog::default();
    assert!(skips.should_draw("torus", 1100, 1100 * 100));
    assert!(!skips.was_reported("torus"));
}

#[test]
fn empty_entries_are_skipped() {
    let mut skips = SkipLog::default();
    assert!(!skips.should_draw("torus", 0, 64));
    assert!(!skips.should_draw("axes", 1, 0));
    assert!(skips.was_reported("torus"));
    assert!(skips.was_reported("axes"));
    assert!(!skips.was_reported("box"));
}

#[test]
fn an_empty_entry_warns_once() {
    let mut skips = SkipLog::default();
    assert_eq!(skips.note_skip("torus"), log::Level::Warn);
    assert_eq!(skips.note_skip("torus"), log::Level::Debug);
    assert_eq!(skips.note_skip("torus"), log::Level::Debug);
    // other entries get their own warning
    assert_eq!(skips.note_skip("text"), log::Level::Warn);
}

#[test]
fn gui_draws_srgb_surfaces_through_a_linear_view() {
    assert_eq!(
        gui_view_format(wgpu::TextureFormat::Bgra8UnormSrgb, true),
        wgpu::TextureFormat::Bgra8Unorm
    );
    assert_eq!(
        gui_view_format(wgpu::TextureFormat::Rgba8UnormSrgb, true),
        wgpu::TextureFormat::Rgba8Unorm
    );
    assert_eq!(
        gui_view_format(wgpu::TextureFormat::Bgra8Unorm, true),
        wgpu::TextureFormat::Bgra8Unorm
    );
}

#[test]
fn gui_keeps_the_surface_format_without_view_formats() {
    assert_eq!(
        gui_view_format(wgpu::TextureFormat::Rgba8UnormSrgb, false),
        wgpu::TextureFormat::Rgba8UnormSrgb
    );
}
