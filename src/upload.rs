//! Firmware upload via avrdude.
//!
//! Builds the sketch first, then flashes the resulting HEX image. The
//! serial port comes from `--port`, then `[upload] port` in ard.toml,
//! then auto-detection over conventional device names.

use anyhow::{Context, Result, bail};
use colored::*;
use std::fs;
use std::process::Command;

use crate::build::{self, BuildOptions};
use crate::toolchain;

pub fn upload_sketch(port: Option<String>, board: Option<String>, verbose: bool) -> Result<()> {
    let artifacts = build::build_sketch(&BuildOptions { verbose, board })?;
    let uploader = toolchain::find_uploader()?;

    let config = build::load_config().unwrap_or_default();
    let port = port
        .or_else(|| config.upload.as_ref().and_then(|u| u.port.clone()))
        .or_else(detect_port)
        .context("No serial port found. Use --port or set [upload] port in ard.toml")?;

    println!("{} {}", "📤".cyan(), "Uploading firmware...".bold());
    println!("{} Port: {}", "→".dimmed(), port.cyan());

    let protocol = artifacts
        .upload_protocol
        .as_deref()
        .unwrap_or("arduino");

    let mut cmd = Command::new(&uploader);
    cmd.arg("-p").arg(&artifacts.mcu);
    cmd.arg("-c").arg(protocol);
    cmd.arg("-P").arg(&port);
    if let Some(speed) = &artifacts.upload_speed {
        cmd.arg("-b").arg(speed);
    }
    cmd.arg("-D");
    cmd.arg("-U")
        .arg(format!("flash:w:{}:i", artifacts.hex.display()));
    if verbose {
        cmd.arg("-v");
    }

    let status = cmd.status().context("Failed to run avrdude")?;
    if !status.success() {
        bail!("Upload failed");
    }

    println!();
    println!("{} Upload successful!", "✓".green());
    Ok(())
}

/// First serial device that looks like a board. Usb-serial adapters
/// show up as ttyACM*/ttyUSB* on Linux and cu.usb* on macOS.
pub fn detect_port() -> Option<String> {
    let mut candidates: Vec<String> = fs::read_dir("/dev")
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| {
            name.starts_with("ttyACM")
                || name.starts_with("ttyUSB")
                || name.starts_with("cu.usbmodem")
                || name.starts_with("cu.usbserial")
        })
        .collect();
    candidates.sort();
    candidates.first().map(|name| format!("/dev/{}", name))
}
