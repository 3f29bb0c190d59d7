//! # ardent CLI Entry Point
//!
//! This is the main executable for the `ard` command-line tool.
//! It parses CLI arguments using clap and routes commands to the
//! appropriate handlers.
//!
//! ## Command Structure
//!
//! - **Project**: `new`, `init`
//! - **Build**: `build`, `clean`, `watch`
//! - **Board**: `upload`, `serial`, `boards`
//! - **Inspect**: `libs`

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use inquire::{Select, Text};
use std::fs;
use std::path::{Path, PathBuf};

use ardent::boards;
use ardent::build;
use ardent::resolve;
use ardent::serial;
use ardent::templates;
use ardent::toolchain;
use ardent::ui;
use ardent::upload;

#[derive(Parser)]
#[command(name = "ard")]
#[command(about = "The Arduino sketch toolkit", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new sketch project
    New {
        /// Project name (optional, defaults to interactive)
        name: Option<String>,
        /// Board model from boards.txt [default: interactive or uno]
        #[arg(long)]
        board: Option<String>,
    },
    /// Initialize an ard.toml in the current directory
    Init {
        /// Board model from boards.txt
        #[arg(long)]
        board: Option<String>,
    },
    /// Compile the sketch into firmware
    Build {
        /// Show compiler invocations and the resolved library order
        #[arg(short, long)]
        verbose: bool,
        /// Board model override
        #[arg(long)]
        board: Option<String>,
    },
    /// Remove build artifacts
    Clean,
    /// Build and flash the firmware to the board
    Upload {
        /// Serial port (e.g., /dev/ttyACM0)
        #[arg(short, long)]
        port: Option<String>,
        /// Board model override
        #[arg(long)]
        board: Option<String>,
        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },
    /// Open a serial monitor on the board's port
    Serial {
        /// Serial port (e.g., /dev/ttyACM0)
        #[arg(short, long)]
        port: Option<String>,
        /// Baudrate [default: from ard.toml or 9600]
        #[arg(short, long)]
        baud: Option<u32>,
    },
    /// List board models known to the SDK
    Boards,
    /// Show the resolved library link order for this sketch
    Libs {
        /// Also print every include flag
        #[arg(short, long)]
        verbose: bool,
    },
    /// Watch sources and rebuild on change
    Watch,
    /// Generate shell completion scripts
    Completions { shell: Shell },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::New { name, board }) => create_project(name, board),
        Some(Commands::Init { board }) => init_project(board),
        Some(Commands::Build { verbose, board }) => {
            build::build_sketch(&build::BuildOptions {
                verbose: *verbose,
                board: board.clone(),
            })?;
            Ok(())
        }
        Some(Commands::Clean) => build::clean(),
        Some(Commands::Upload {
            port,
            board,
            verbose,
        }) => upload::upload_sketch(port.clone(), board.clone(), *verbose),
        Some(Commands::Serial { port, baud }) => serial::open_monitor(port.clone(), *baud),
        Some(Commands::Boards) => {
            let config = build::load_config().unwrap_or_default();
            let sdk_home = config.sdk.as_ref().and_then(|s| s.home.clone());
            boards::list_boards(sdk_home.as_deref())
        }
        Some(Commands::Libs { verbose }) => print_libs(*verbose),
        Some(Commands::Watch) => build::watch(),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, bin_name, &mut std::io::stdout());
            Ok(())
        }
        None => {
            print_splash();
            Ok(())
        }
    }
}

fn print_splash() {
    println!();
    println!("   {}", " █████  ██████  ██████  ".cyan());
    println!("   {}", "██   ██ ██   ██ ██   ██ ".cyan());
    println!("   {}", "███████ ██████  ██   ██ ".cyan());
    println!("   {}", "██   ██ ██   ██ ██   ██ ".cyan());
    println!("   {}", "██   ██ ██   ██ ██████  ".cyan());
    println!();
    println!("   {}", "The Arduino Sketch Toolkit".dimmed().italic());
    println!("   {}", format!("v{}", env!("CARGO_PKG_VERSION")).green());
    println!();

    let mut table = ui::Table::new(&["Category", "Commands"]);
    table.add_row(vec![
        "Start".bold().green().to_string(),
        format!("{}, {}", "new".cyan(), "init".cyan()),
    ]);
    table.add_row(vec![
        "Build".bold().yellow().to_string(),
        format!(
            "{}, {}, {}",
            "build".cyan(),
            "clean".cyan(),
            "watch".cyan()
        ),
    ]);
    table.add_row(vec![
        "Board".bold().blue().to_string(),
        format!(
            "{}, {}, {}",
            "upload".cyan(),
            "serial".cyan(),
            "boards".cyan()
        ),
    ]);
    table.add_row(vec!["Inspect".bold().magenta().to_string(), "libs".cyan().to_string()]);
    table.print();

    println!();
    println!("   Run {} for detailed usage.", "ard --help".white().bold());
    println!();
}

// --- COMMAND: Show Resolved Library Order ---
fn print_libs(verbose: bool) -> Result<()> {
    let config = build::load_config()?;
    let sdk_home = config.sdk.as_ref().and_then(|s| s.home.clone());
    let sdk = toolchain::detect_sdk(sdk_home.as_deref())?;

    let src_dir = PathBuf::from(config.src_dir());
    let roots = resolve::SearchRoots {
        core_dir: Some(sdk.core_dir.clone()),
        sketch_src_dir: Some(src_dir.clone()),
        user_lib_root: Some(PathBuf::from("lib")),
        bundled_lib_root: Some(sdk.libraries_dir.clone()),
        extra_libs: config.extra_libraries(),
    };
    let resolution = resolve::resolve(&src_dir, &roots)?;

    for path in &resolution.unreadable {
        println!("{} Skipped unreadable: {}", "!".yellow(), path.display());
    }

    if resolution.used_libs.is_empty() {
        println!("{} Sketch uses no libraries.", "!".yellow());
        return Ok(());
    }

    let mut table = ui::Table::new(&["#", "Library", "Path"]);
    for (i, lib) in resolution.used_libs.iter().enumerate() {
        let name = lib
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| lib.display().to_string());
        table.add_row(vec![
            format!("{}", i + 1).dimmed().to_string(),
            name.bold().cyan().to_string(),
            lib.display().to_string(),
        ]);
    }
    table.print();
    println!(
        "   Link order: dependents first, {} libraries",
        resolution.used_libs.len().to_string().bold()
    );

    if verbose {
        println!();
        println!("{} Include flags:", "→".dimmed());
        for flag in &resolution.include_flags {
            println!("     {}", flag);
        }
    }
    Ok(())
}

// --- Helper: Board Choice For Scaffolding ---
fn choose_board(board_flag: &Option<String>) -> Result<String> {
    if let Some(board) = board_flag {
        return Ok(board.clone());
    }

    // Prefer the real catalogue when an SDK is around; fall back to
    // the usual suspects.
    let models: Vec<String> = match toolchain::detect_sdk(None)
        .ok()
        .and_then(|sdk| boards::load_boards(&sdk.boards_txt).ok())
    {
        Some(catalogue) if !catalogue.is_empty() => {
            catalogue.iter().map(|b| b.id.clone()).collect()
        }
        _ => ["uno", "mega2560", "leonardo", "nano", "micro"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    };

    let refs: Vec<&str> = models.iter().map(|s| s.as_str()).collect();
    Ok(Select::new("Board model?", refs).prompt()?.to_string())
}

fn init_project(board_flag: &Option<String>) -> Result<()> {
    if Path::new("ard.toml").exists() {
        println!(
            "{} Error: Project already initialized (ard.toml exists).",
            "x".red()
        );
        return Ok(());
    }

    let current_dir = std::env::current_dir()?;
    let dir_name = current_dir
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("sketch"))
        .to_string_lossy();

    let name = Text::new("Sketch name?").with_default(&dir_name).prompt()?;
    let board = choose_board(board_flag)?;

    let (manifest, sketch) = templates::get_template(&name, &board);
    fs::write("ard.toml", manifest)?;

    if !Path::new("src").exists() {
        fs::create_dir("src")?;
        fs::write(Path::new("src").join(format!("{}.ino", name)), sketch)?;
    } else {
        println!(
            "{} 'src' directory exists, skipping sketch creation.",
            "!".yellow()
        );
    }
    if !Path::new("lib").exists() {
        fs::create_dir("lib")?;
        fs::write(Path::new("lib").join(".keep"), templates::LIB_KEEPER)?;
    }
    if !Path::new(".gitignore").exists() {
        fs::write(".gitignore", templates::GITIGNORE)?;
    }

    println!(
        "{} Initialized ardent project in current directory.",
        "✓".green()
    );
    Ok(())
}

fn create_project(name_opt: &Option<String>, board_flag: &Option<String>) -> Result<()> {
    let name = match name_opt {
        Some(n) => n.clone(),
        None => Text::new("What is your sketch name?")
            .with_default("blink")
            .prompt()?,
    };
    let board = choose_board(board_flag)?;

    let path = Path::new(&name);
    if path.exists() {
        println!("{} Error: Directory '{}' already exists", "x".red(), name);
        return Ok(());
    }

    fs::create_dir_all(path.join("src")).context("Failed to create src")?;
    fs::create_dir_all(path.join("lib")).context("Failed to create lib")?;

    let project_name = path
        .file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy();
    let (manifest, sketch) = templates::get_template(&project_name, &board);

    fs::write(path.join("ard.toml"), manifest)?;
    fs::write(path.join(".gitignore"), templates::GITIGNORE)?;
    fs::write(
        path.join("src").join(format!("{}.ino", project_name)),
        sketch,
    )?;
    fs::write(path.join("lib").join(".keep"), templates::LIB_KEEPER)?;

    println!(
        "{} Created new sketch: {} (board: {})",
        "✓".green(),
        name.bold(),
        board.cyan()
    );
    println!("  cd {}\n  ard build", name);
    Ok(())
}
