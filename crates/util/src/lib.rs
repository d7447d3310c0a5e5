//! Configuration and logging helpers shared by the txpanel crates.

pub mod config;
pub mod logging;

pub use config::{CONFIG_FILE_NAME, CONFIG_PATH_ENV, ConfigError, UiConfig, default_config_path, load_config, load_config_from_path, save_config_to_path};
pub use logging::init_tracing;
