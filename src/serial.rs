//! Serial monitor.
//!
//! `ard serial` hands the port over to an external terminal program
//! rather than reimplementing one; picocom, minicom and screen are
//! tried in that order.

use anyhow::{Context, Result, bail};
use colored::*;
use std::process::Command;

use crate::build::load_config;
use crate::upload::detect_port;

const TERMINALS: &[&str] = &["picocom", "minicom", "screen"];

pub fn open_monitor(port: Option<String>, baudrate: Option<u32>) -> Result<()> {
    let config = load_config().unwrap_or_default();
    let upload_cfg = config.upload.as_ref();

    let port = port
        .or_else(|| upload_cfg.and_then(|u| u.port.clone()))
        .or_else(detect_port)
        .context("No serial port found. Use --port or set [upload] port in ard.toml")?;
    let baudrate = baudrate
        .or_else(|| upload_cfg.and_then(|u| u.baudrate))
        .unwrap_or(9600);

    let Some(terminal) = TERMINALS
        .iter()
        .find(|t| Command::new(**t).arg("--help").output().is_ok())
    else {
        bail!(
            "No serial terminal found. Install one of: {}",
            TERMINALS.join(", ")
        );
    };

    println!(
        "{} Opening {} at {} baud ({})",
        "🔌".cyan(),
        port.cyan(),
        baudrate,
        terminal
    );

    let status = match *terminal {
        "picocom" => Command::new("picocom")
            .arg("-b")
            .arg(baudrate.to_string())
            .arg(&port)
            .status(),
        "minicom" => Command::new("minicom")
            .arg("-D")
            .arg(&port)
            .arg("-b")
            .arg(baudrate.to_string())
            .status(),
        _ => Command::new("screen")
            .arg(&port)
            .arg(baudrate.to_string())
            .status(),
    }
    .with_context(|| format!("Failed to run {}", terminal))?;

    if !status.success() {
        bail!("Serial terminal exited with an error");
    }
    Ok(())
}
