use super::core::{BuildOptions, build_sketch};
use super::utils::load_config;
use anyhow::Result;
use colored::*;
use notify::{Config, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::Duration;

pub fn watch() -> Result<()> {
    let config = load_config()?;
    let src_dir = config.src_dir().to_string();

    println!("{} Watching for changes in {}/...", "👀".cyan(), src_dir);

    let (tx, rx) = channel();
    let config_notify = Config::default().with_poll_interval(Duration::from_secs(1));
    let mut watcher = notify::RecommendedWatcher::new(tx, config_notify)?;

    watcher.watch(Path::new(&src_dir), RecursiveMode::Recursive)?;
    if Path::new("lib").exists() {
        watcher.watch(Path::new("lib"), RecursiveMode::Recursive)?;
    }

    // First run
    run_and_clear();

    while rx.recv().is_ok() {
        // Debounce simple
        std::thread::sleep(Duration::from_millis(100));
        while rx.try_recv().is_ok() {}
        run_and_clear();
    }
    Ok(())
}

fn run_and_clear() {
    print!("\x1B[2J\x1B[1;1H");
    println!("{} File changed. Rebuilding...", "🔄".yellow());

    if let Err(e) = build_sketch(&BuildOptions::default()) {
        println!("{} Error: {}", "x".red(), e);
    }
}
