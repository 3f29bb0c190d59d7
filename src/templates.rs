//! Starter files for `ard new` and `ard init`.

/// Manifest and starter sketch for a fresh project.
pub fn get_template(name: &str, board: &str) -> (String, String) {
    let manifest = format!(
        r#"[sketch]
name = "{name}"
version = "0.1.0"

[board]
model = "{board}"

[upload]
baudrate = 9600
"#
    );

    let sketch = r#"// Blink the on-board LED once a second.

const int LED_PIN = 13;

void setup() {
    pinMode(LED_PIN, OUTPUT);
    Serial.begin(9600);
}

void loop() {
    digitalWrite(LED_PIN, HIGH);
    delay(500);
    digitalWrite(LED_PIN, LOW);
    delay(500);
    Serial.println("tick");
}
"#
    .to_string();

    (manifest, sketch)
}

pub const GITIGNORE: &str = ".ard/\n";

/// Placeholder so an empty lib/ survives version control.
pub const LIB_KEEPER: &str = "";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_manifest_parses() {
        let (manifest, sketch) = get_template("blink", "uno");
        let config: crate::config::ArdConfig = toml::from_str(&manifest).unwrap();
        assert_eq!(config.sketch.name, "blink");
        assert_eq!(config.board_model(), Some("uno"));
        assert!(sketch.contains("void setup()"));
        assert!(sketch.contains("void loop()"));
    }
}
