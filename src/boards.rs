//! Board model catalogue.
//!
//! Parses the SDK's `boards.txt` key-path format into board models and
//! backs the `ard boards` command.
//!
//! ## Example Output
//!
//! ```text
//! ┌───────────┬─────────────────────┬────────────┬───────────┬──────────┐
//! │ Model     │ Name                │ MCU        │ Clock     │ Protocol │
//! ├───────────┼─────────────────────┼────────────┼───────────┼──────────┤
//! │ uno       │ Arduino Uno         │ atmega328p │ 16000000L │ arduino  │
//! └───────────┴─────────────────────┴────────────┴───────────┴──────────┘
//! ```

use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::Path;

use crate::toolchain;
use crate::ui;

#[derive(Debug, Clone, Default)]
pub struct BoardModel {
    pub id: String,
    pub name: String,
    pub mcu: Option<String>,
    pub f_cpu: Option<String>,
    pub core: Option<String>,
    pub variant: Option<String>,
    pub upload_protocol: Option<String>,
    pub upload_speed: Option<String>,
    pub upload_maximum_size: Option<String>,
}

/// Parse `boards.txt` content. Models keep their file order.
pub fn parse_boards(text: &str) -> Vec<BoardModel> {
    let mut boards: Vec<BoardModel> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let Some((id, attr)) = key.split_once('.') else {
            continue;
        };
        // "menu.*" entries describe IDE submenus, not boards.
        if id == "menu" {
            continue;
        }

        let board = match boards.iter_mut().find(|b| b.id == id) {
            Some(b) => b,
            None => {
                boards.push(BoardModel {
                    id: id.to_string(),
                    ..Default::default()
                });
                boards.last_mut().unwrap()
            }
        };

        let value = value.trim().to_string();
        match attr {
            "name" => board.name = value,
            "build.mcu" => board.mcu = Some(value),
            "build.f_cpu" => board.f_cpu = Some(value),
            "build.core" => board.core = Some(value),
            "build.variant" => board.variant = Some(value),
            "upload.protocol" => board.upload_protocol = Some(value),
            "upload.speed" => board.upload_speed = Some(value),
            "upload.maximum_size" => board.upload_maximum_size = Some(value),
            _ => {}
        }
    }

    boards
}

pub fn load_boards(path: &Path) -> Result<Vec<BoardModel>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(parse_boards(&text))
}

pub fn find_board<'a>(boards: &'a [BoardModel], id: &str) -> Option<&'a BoardModel> {
    boards.iter().find(|b| b.id == id)
}

/// `ard boards`: list every model the SDK knows about.
pub fn list_boards(sdk_home: Option<&Path>) -> Result<()> {
    let sdk = toolchain::detect_sdk(sdk_home)?;
    let boards = load_boards(&sdk.boards_txt)?;

    if boards.is_empty() {
        println!("{} No board models found in {}", "!".yellow(), sdk.boards_txt.display());
        return Ok(());
    }

    let mut table = ui::Table::new(&["Model", "Name", "MCU", "Clock", "Protocol"]);
    for board in &boards {
        table.add_row(vec![
            board.id.bold().cyan().to_string(),
            board.name.clone(),
            board.mcu.clone().unwrap_or_else(|| "-".to_string()),
            board.f_cpu.clone().unwrap_or_else(|| "-".to_string()),
            board
                .upload_protocol
                .clone()
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    table.print();

    println!(
        "   {} board models ({})",
        boards.len().to_string().bold(),
        sdk.boards_txt.display().to_string().dimmed()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# See: http://code.google.com/p/arduino/wiki/Platforms

uno.name=Arduino Uno
uno.upload.protocol=arduino
uno.upload.maximum_size=32256
uno.upload.speed=115200
uno.build.mcu=atmega328p
uno.build.f_cpu=16000000L
uno.build.core=arduino
uno.build.variant=standard

mega2560.name=Arduino Mega 2560
mega2560.upload.protocol=wiring
mega2560.build.mcu=atmega2560

menu.cpu=Processor
";

    #[test]
    fn test_parse_boards_fields() {
        let boards = parse_boards(SAMPLE);
        assert_eq!(boards.len(), 2);

        let uno = find_board(&boards, "uno").unwrap();
        assert_eq!(uno.name, "Arduino Uno");
        assert_eq!(uno.mcu.as_deref(), Some("atmega328p"));
        assert_eq!(uno.f_cpu.as_deref(), Some("16000000L"));
        assert_eq!(uno.variant.as_deref(), Some("standard"));
        assert_eq!(uno.upload_protocol.as_deref(), Some("arduino"));
        assert_eq!(uno.upload_speed.as_deref(), Some("115200"));
    }

    #[test]
    fn test_parse_boards_keeps_file_order_and_skips_menus() {
        let boards = parse_boards(SAMPLE);
        let ids: Vec<&str> = boards.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["uno", "mega2560"]);
    }

    #[test]
    fn test_unknown_board_is_none() {
        let boards = parse_boards(SAMPLE);
        assert!(find_board(&boards, "teensy").is_none());
    }
}
