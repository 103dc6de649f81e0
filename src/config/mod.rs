//! Configuration loading and merging with CLI arguments.
mod loader;
mod settings;
pub mod types;


pub use loader::load_config;
pub use settings::{RunSettings, resolve_settings};

pub(crate) use loader::load_config_file;
