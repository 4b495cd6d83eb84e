//! A box on the axes helper, driven from the debug panel.

use matcap_scene::{config::SceneConfig, scene::run_scene};

fn main() -> anyhow::Result<()> {
    run_scene(SceneConfig::textured_box())
}
