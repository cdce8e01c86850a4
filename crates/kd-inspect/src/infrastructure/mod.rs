//! Infrastructure layer for kd-inspect.
//!
//! Reads the optional TOML config file and writes reports as JSON lines.

pub mod config_file;
pub mod json_sink;

pub use config_file::{load_config, ConfigError};
pub use json_sink::JsonLinesSink;
