//! Bevelled text surrounded by a field of matcap tori.

use matcap_scene::{config::SceneConfig, scene::run_scene};

fn main() -> anyhow::Result<()> {
    run_scene(SceneConfig::default())
}
