//! Application-level configuration.
//!
//! - [`OrchestratorSettings`]: deadline and deliberation tunables

pub mod settings;

pub use settings::{DEFAULT_DEADLINE, OrchestratorSettings};
