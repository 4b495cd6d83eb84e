use std::{env, path::PathBuf};

use anyhow::{Context, Result};
use fs_extra::dir::{CopyOptions, copy};

// Fonts and textures are looked up under `assets/` at runtime. A copy next to the build
// output keeps `cargo run` from other directories working.
fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=assets");

    let assets = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?).join("assets");
    if !assets.is_dir() {
        println!(
            "cargo:warning=no assets/ directory: the text is skipped and the matcap is generated"
        );
        return Ok(());
    }

    let out_dir = env::var("OUT_DIR")?;
    let options = CopyOptions {
        overwrite: true,
        ..CopyOptions::new()
    };
    copy(&assets, &out_dir, &options).with_context(|| format!("copying {} to {out_dir}", assets.display()))?;
    Ok(())
}
