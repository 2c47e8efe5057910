//! Infrastructure layer for consult-quorum
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: configuration file loading, agent invokers
//! and the JSONL consultation log.

pub mod config;
pub mod invoker;
pub mod logging;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigLoader, ConfigSources, ConfigValidationError, FileAgentConfig, FileConfig,
    FileInvokerConfig, FileLoggingConfig, FileOrchestratorConfig, FilePanelConfig,
    FileScriptEntry, InvokerKind,
};
#[cfg(feature = "http")]
pub use invoker::HttpAgentInvoker;
pub use invoker::{ConfiguredInvoker, ScriptedInvoker, ScriptedReply};
pub use logging::JsonlConversationLogger;
