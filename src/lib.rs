//! # ardent - Arduino Sketch Toolkit
//!
//! ardent is a command-line toolkit for working with Arduino hardware
//! from the terminal, replacing the IDE for building, uploading and
//! serial communication.
//!
//! ## Features
//!
//! - **Library Resolution**: Discovers which libraries a sketch really
//!   uses, transitively, and orders them correctly for the linker
//! - **Parallel Builds**: Compiles the core, libraries and sketch
//!   sources on all CPU cores with incremental rebuilds
//! - **Zero Configuration**: A two-line `ard.toml` is a full project
//! - **Board Catalogue**: Works with any model the SDK's boards.txt
//!   describes
//!
//! ## Quick Start
//!
//! ```bash
//! # Create a new sketch project
//! ard new blink
//!
//! # Build and flash
//! ard upload
//! ```
//!
//! ## Module Organization
//!
//! - [`resolve`] - Library dependency discovery and link ordering
//! - [`build`] - Compilation pipeline with parallel builds
//! - [`config`] - Manifest parsing (`ard.toml`)
//! - [`toolchain`] - Arduino SDK and AVR cross-tool discovery

/// Board model catalogue (`boards.txt`).
pub mod boards;

/// Compilation pipeline: preprocess, compile, archive, link.
pub mod build;

/// Manifest parsing (`ard.toml`).
pub mod config;

/// Library dependency discovery and link ordering.
pub mod resolve;

/// Serial monitor handoff.
pub mod serial;

/// Starter files for new projects.
pub mod templates;

/// Arduino SDK and AVR cross-tool discovery.
pub mod toolchain;

/// Terminal UI utilities (tables, colors).
pub mod ui;

/// Firmware upload via avrdude.
pub mod upload;
