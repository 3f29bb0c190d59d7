//! Build artifact cleanup.
//!
//! `ard clean` removes everything under `.ard/`: objects, the core
//! archive, preprocessed sketches and the firmware images.

use anyhow::{Context, Result};
use colored::*;

use std::fs;
use std::path::Path;

pub fn clean() -> Result<()> {
    let mut cleaned = false;

    let ard_dir = Path::new(".ard");
    if ard_dir.exists() {
        fs::remove_dir_all(ard_dir).context("Failed to remove .ard directory")?;
        cleaned = true;
    }

    // Legacy layout from pre-0.2 releases kept objects in build/.
    if Path::new("build").join("core.a").exists() {
        fs::remove_dir_all("build").context("Failed to remove legacy build directory")?;
        cleaned = true;
    }

    if cleaned {
        println!("{} Clean complete.", "✓".green());
    } else {
        println!("{} Nothing to clean", "!".yellow());
    }
    Ok(())
}
