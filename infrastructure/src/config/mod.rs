//! Configuration file loading for switchboard
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./switchboard.toml` or `./.switchboard.toml`
//! 3. XDG config: `$XDG_CONFIG_HOME/switchboard/config.toml`
//! 4. Environment: `SWITCHBOARD_<SECTION>__<KEY>`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileCacheConfig, FileConfig, FileDispatchConfig, FileIntentConfig,
    FileJiraConfig, FileLlmConfig, FileNotionConfig, FileOutputConfig, FileOutputFormat,
    FileProvidersConfig, FileSlackConfig, FileStoreConfig, StoreBackend,
};
pub use loader::ConfigLoader;
