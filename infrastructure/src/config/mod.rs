//! Configuration file loading for consult-quorum
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CONSULT_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./consult.toml` or `./.consult.toml`
//! 4. Global: `$XDG_CONFIG_HOME/consult-quorum/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAgentConfig, FileConfig, FileInvokerConfig, FileLoggingConfig,
    FileOrchestratorConfig, FilePanelConfig, FileScriptEntry, InvokerKind,
};
pub use loader::{ConfigError, ConfigLoader, ConfigSources};
