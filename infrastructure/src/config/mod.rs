//! Configuration file loading for agentry
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `AGENTRY_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./agentry.toml`
//! 4. Global: `$XDG_CONFIG_HOME/agentry/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileLlmConfig, FileLoggingConfig, FileReactConfig,
    FileStoreConfig,
};
pub use loader::{ConfigLoader, ENV_PREFIX, PROJECT_CONFIG_FILE};
