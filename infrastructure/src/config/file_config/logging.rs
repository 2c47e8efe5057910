//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration from TOML
///
/// ```toml
/// [logging]
/// conversation_log = "~/.local/share/consult-quorum/consultations.jsonl"
/// filter = "consult_application=debug"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file receiving consultation events
    pub conversation_log: Option<PathBuf>,
    /// `tracing` filter directive, overrides the `-v` level
    pub filter: Option<String>,
}
