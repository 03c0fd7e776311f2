//! Configuration loading and parsing
//!
//! Loads the TOML configuration from disk, falling back to the copy
//! compiled into the binary.

pub mod loader;
pub mod types;

pub use loader::{config_path, load_or_default, parse_config, ConfigError};
pub use types::{Config, DisplaySection, InputSection, PlayerSection};
