use crate::config::ArdConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

// --- Helper: Load Manifest ---
pub fn load_config() -> Result<ArdConfig> {
    if !Path::new("ard.toml").exists() {
        return Err(anyhow::anyhow!(
            "ard.toml not found in current directory.\n\n\
            💡 Tip: Run 'ard init' to create one, or 'ard new <name>' for a new sketch."
        ));
    }
    let config_str = fs::read_to_string("ard.toml")
        .context("Failed to read ard.toml - check file permissions")?;

    let config: ArdConfig = toml::from_str(&config_str)
        .context("Failed to parse ard.toml - check for syntax errors (missing quotes, brackets)")?;

    Ok(config)
}

// --- Helper: Build Directory Layout ---
pub fn build_dir() -> PathBuf {
    Path::new(".ard").join("build")
}

/// Object file name for a source, kept collision-free across
/// directories by suffixing a hash of the full path.
pub fn object_name(src: &Path) -> String {
    use std::hash::{DefaultHasher, Hash, Hasher};

    let stem = src
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "unnamed".to_string());
    let mut hasher = DefaultHasher::new();
    src.hash(&mut hasher);
    format!("{}-{:08x}.o", stem, hasher.finish() as u32)
}

// --- Helper: Check Dependencies (.d file) ---
pub fn needs_recompile(obj_path: &Path) -> Result<bool> {
    let d_path = obj_path.with_extension("d");
    if !d_path.exists() {
        return Ok(true); // No dependency file, force recompile
    }

    let dep_content = fs::read_to_string(&d_path)?;
    // Handle line continuations
    let content_flat = dep_content.replace("\\\n", " ").replace("\\\r\n", " ");

    // Format is usually: "objfile.o: src.c header.h ..."
    if let Some(deps_part) = content_flat.split_once(':') {
        let obj_mtime = fs::metadata(obj_path)?.modified()?;

        for dep in deps_part.1.split_whitespace() {
            let dep_path = Path::new(dep);
            if dep_path.exists() {
                let dep_mtime = fs::metadata(dep_path)?.modified()?;
                if dep_mtime > obj_mtime {
                    return Ok(true); // Dependency is newer
                }
            }
        }
    }

    Ok(false) // Up to date
}
