use std::path::PathBuf;

/// A located Arduino SDK distribution.
#[derive(Debug, Clone)]
pub struct Sdk {
    /// Installation root, e.g. `/usr/share/arduino`.
    pub root: PathBuf,
    /// Platform core sources (`Arduino.h`, `main.cpp`, ...).
    pub core_dir: PathBuf,
    /// Pin variant headers, present in 1.0+ distributions.
    pub variants_dir: Option<PathBuf>,
    /// Libraries bundled with the distribution.
    pub libraries_dir: PathBuf,
    /// The board model catalogue.
    pub boards_txt: PathBuf,
}

impl Sdk {
    /// Pin definition directory for a board variant, if the SDK ships
    /// variants at all.
    pub fn variant_dir(&self, variant: &str) -> Option<PathBuf> {
        let dir = self.variants_dir.as_ref()?.join(variant);
        dir.is_dir().then_some(dir)
    }
}

/// The AVR cross tools found on PATH.
#[derive(Debug, Clone)]
pub struct AvrTools {
    pub cc: String,
    pub cxx: String,
    pub ar: String,
    pub objcopy: String,
    /// Section size reporting is nice to have, not required.
    pub size: Option<String>,
}

/// Error type for SDK and tool discovery.
#[derive(Debug)]
pub enum ToolchainError {
    /// No Arduino SDK found in any known location.
    SdkNotFound(String),
    /// A required cross tool is missing from PATH.
    MissingTool(String),
    /// IO error.
    IoError(std::io::Error),
}

impl std::fmt::Display for ToolchainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolchainError::SdkNotFound(msg) => write!(f, "Arduino SDK not found: {}", msg),
            ToolchainError::MissingTool(tool) => write!(f, "Required tool not found: {}", tool),
            ToolchainError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ToolchainError {}

impl From<std::io::Error> for ToolchainError {
    fn from(e: std::io::Error) -> Self {
        ToolchainError::IoError(e)
    }
}
