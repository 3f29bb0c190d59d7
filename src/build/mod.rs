mod clean;
mod core;
mod sketch;
mod utils;
mod watcher;

pub use clean::clean;
pub use core::{BuildArtifacts, BuildOptions, build_project, build_sketch};
pub use sketch::{preprocess_sketch, preprocess_sketch_file};
pub use utils::load_config;
pub use watcher::watch;
