//! Application layer for consult-quorum
//!
//! This crate contains the orchestrate use case, the execution topologies,
//! port definitions, and orchestrator settings. It depends only on the
//! domain layer.

pub mod config;
pub mod ports;
pub mod topology;
pub mod use_cases;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::OrchestratorSettings;
pub use ports::{
    agent_invoker::{AgentInvoker, AgentOutput, InvocationContext, InvocationError, InvocationRole},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    progress::{NoProgress, ProgressNotifier},
};
pub use topology::{Executor, InvocationBudget, TopologyInput, TopologyRun, executor_for};
pub use use_cases::orchestrate::{ConsultationOrchestrator, OrchestrateError};
