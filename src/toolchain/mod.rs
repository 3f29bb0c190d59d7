//! Arduino SDK and AVR cross-tool discovery.
//!
//! The SDK is located from explicit configuration first, then the
//! `ARDUINO_HOME` environment variable, then a list of well-known
//! install locations. The cross tools (`avr-gcc` and friends) are
//! looked up on PATH.

pub mod types;

pub use types::{AvrTools, Sdk, ToolchainError};

use std::path::{Path, PathBuf};
use std::process::Command;

/// Well-known SDK install locations, tried in order.
const KNOWN_SDK_DIRS: &[&str] = &[
    "/usr/share/arduino",
    "/usr/local/share/arduino",
    "/opt/arduino",
    "/Applications/Arduino.app/Contents/Resources/Java",
    "/Applications/Arduino.app/Contents/Java",
    "C:/Program Files/Arduino",
    "C:/Program Files (x86)/Arduino",
];

/// Locate the Arduino SDK. `explicit` comes from `ard.toml` and wins
/// over everything else.
pub fn detect_sdk(explicit: Option<&Path>) -> Result<Sdk, ToolchainError> {
    let mut tried = Vec::new();

    let mut roots: Vec<PathBuf> = Vec::new();
    if let Some(path) = explicit {
        roots.push(path.to_path_buf());
    }
    if let Ok(home) = std::env::var("ARDUINO_HOME") {
        roots.push(PathBuf::from(home));
    }
    roots.extend(KNOWN_SDK_DIRS.iter().map(PathBuf::from));
    if let Some(home) = dirs::home_dir() {
        roots.push(home.join("arduino"));
        roots.push(home.join(".local/share/arduino"));
    }

    for root in roots {
        if let Some(sdk) = sdk_from_root(&root) {
            return Ok(sdk);
        }
        tried.push(root.display().to_string());
    }

    Err(ToolchainError::SdkNotFound(format!(
        "looked in {}. Install the Arduino SDK or set ARDUINO_HOME (or [sdk] home in ard.toml).",
        tried.join(", ")
    )))
}

/// Validate an install root and derive the directories the build needs.
fn sdk_from_root(root: &Path) -> Option<Sdk> {
    let platform = root.join("hardware").join("arduino");
    let core_dir = platform.join("cores").join("arduino");
    if !core_dir.is_dir() {
        return None;
    }

    let variants = platform.join("variants");
    let variants_dir = variants.is_dir().then_some(variants);

    // 1.0+ keeps bundled libraries at the top of the distribution.
    let libraries_dir = root.join("libraries");

    Some(Sdk {
        root: root.to_path_buf(),
        core_dir,
        variants_dir,
        libraries_dir,
        boards_txt: platform.join("boards.txt"),
    })
}

fn is_command_available(cmd: &str) -> bool {
    Command::new(cmd).arg("--version").output().is_ok()
}

/// Resolve the AVR cross tools on PATH.
pub fn find_avr_tools() -> Result<AvrTools, ToolchainError> {
    for tool in ["avr-gcc", "avr-g++", "avr-ar", "avr-objcopy"] {
        if !is_command_available(tool) {
            return Err(ToolchainError::MissingTool(format!(
                "{tool} (install gcc-avr / avr-libc)"
            )));
        }
    }

    Ok(AvrTools {
        cc: "avr-gcc".to_string(),
        cxx: "avr-g++".to_string(),
        ar: "avr-ar".to_string(),
        objcopy: "avr-objcopy".to_string(),
        size: is_command_available("avr-size").then(|| "avr-size".to_string()),
    })
}

/// Resolve the flashing tool. Only the `upload` command needs it.
pub fn find_uploader() -> Result<String, ToolchainError> {
    // avrdude exits non-zero for --version on old releases; presence of
    // any output is enough.
    if Command::new("avrdude").arg("-?").output().is_ok() {
        Ok("avrdude".to_string())
    } else {
        Err(ToolchainError::MissingTool(
            "avrdude (install avrdude)".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_sdk_from_root_requires_core_dir() {
        let temp = tempfile::tempdir().unwrap();
        assert!(sdk_from_root(temp.path()).is_none());
    }

    #[test]
    fn test_sdk_from_root_derives_layout() {
        let temp = tempfile::tempdir().unwrap();
        let platform = temp.path().join("hardware").join("arduino");
        fs::create_dir_all(platform.join("cores").join("arduino")).unwrap();
        fs::create_dir_all(platform.join("variants").join("standard")).unwrap();

        let sdk = sdk_from_root(temp.path()).unwrap();
        assert_eq!(sdk.core_dir, platform.join("cores").join("arduino"));
        assert_eq!(sdk.boards_txt, platform.join("boards.txt"));
        assert!(sdk.variant_dir("standard").is_some());
        assert!(sdk.variant_dir("leonardo").is_none());
    }
}
