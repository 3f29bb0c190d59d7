use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Debug, Default)]
pub struct ArdConfig {
    pub sketch: SketchConfig,
    pub board: Option<BoardConfig>,
    pub build: Option<BuildConfig>,
    pub upload: Option<UploadConfig>,
    pub sdk: Option<SdkConfig>,
}

#[derive(Deserialize, Debug, Default)]
pub struct SketchConfig {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct BoardConfig {
    /// Board id from boards.txt, e.g. "uno" or "mega2560".
    pub model: Option<String>,
    /// MCU override when the board entry is incomplete.
    pub mcu: Option<String>,
    /// Clock override, e.g. "16000000L".
    pub f_cpu: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct BuildConfig {
    /// Sketch sources directory, default "src".
    pub src_dir: Option<String>,
    /// Extra compiler flags appended to every compile.
    pub flags: Option<Vec<String>>,
    /// Extra library directories searched in addition to lib/ and the
    /// SDK-bundled libraries.
    pub libraries: Option<Vec<PathBuf>>,
}

#[derive(Deserialize, Debug, Default)]
pub struct UploadConfig {
    /// Serial port, e.g. "/dev/ttyACM0".
    pub port: Option<String>,
    /// Serial monitor baudrate, default 9600.
    pub baudrate: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
pub struct SdkConfig {
    /// Arduino SDK installation directory. Falls back to ARDUINO_HOME
    /// and then to well-known install locations.
    pub home: Option<PathBuf>,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

impl ArdConfig {
    pub fn src_dir(&self) -> &str {
        self.build
            .as_ref()
            .and_then(|b| b.src_dir.as_deref())
            .unwrap_or("src")
    }

    pub fn board_model(&self) -> Option<&str> {
        self.board.as_ref().and_then(|b| b.model.as_deref())
    }

    pub fn extra_libraries(&self) -> Vec<PathBuf> {
        self.build
            .as_ref()
            .and_then(|b| b.libraries.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_manifest() {
        let toml_str = r#"
[sketch]
name = "blink"
version = "1.2.0"

[board]
model = "mega2560"

[build]
src_dir = "firmware"
flags = ["-Wextra"]
libraries = ["../shared/libs"]

[upload]
port = "/dev/ttyUSB0"
baudrate = 115200
"#;
        let config: ArdConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sketch.name, "blink");
        assert_eq!(config.sketch.version, "1.2.0");
        assert_eq!(config.board_model(), Some("mega2560"));
        assert_eq!(config.src_dir(), "firmware");
        assert_eq!(
            config.extra_libraries(),
            vec![PathBuf::from("../shared/libs")]
        );
        assert_eq!(config.upload.unwrap().baudrate, Some(115200));
    }

    #[test]
    fn test_minimal_manifest_defaults() {
        let config: ArdConfig = toml::from_str("[sketch]\nname = \"app\"\n").unwrap();
        assert_eq!(config.sketch.version, "0.1.0");
        assert_eq!(config.src_dir(), "src");
        assert!(config.board_model().is_none());
        assert!(config.extra_libraries().is_empty());
    }
}
