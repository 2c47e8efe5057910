//! Execution topologies
//!
//! One [`Executor`] per [`ExecutionMode`], dispatched from the mode tag by
//! [`executor_for`]. Executors never fail as a whole: agent-level failures
//! are recorded as failed responses and the run carries on.

mod budget;
mod conversational;
mod hierarchical;
mod parallel;
mod sequential;

pub use budget::{InvocationBudget, invoke_agent};
pub use conversational::ConversationalExecutor;
pub use hierarchical::HierarchicalExecutor;
pub use parallel::ParallelExecutor;
pub use sequential::SequentialExecutor;

use crate::ports::agent_invoker::AgentInvoker;
use crate::ports::progress::ProgressNotifier;
use async_trait::async_trait;
use consult_domain::{
    AgentResponse, Deliberation, ExecutionMode, FailureKind, HistoryEntry, PanelConfiguration,
    sort_responses,
};
use std::sync::Arc;

/// Everything an executor needs for one consultation
pub struct TopologyInput<'a> {
    pub invoker: Arc<dyn AgentInvoker>,
    pub panel: &'a PanelConfiguration,
    pub question: &'a str,
    pub history: &'a [HistoryEntry],
    pub budget: &'a InvocationBudget,
    /// Used by the conversational topology to stop once the panel agrees
    pub deliberation: &'a Deliberation,
    pub progress: &'a dyn ProgressNotifier,
}

/// Raw outcome of running a topology
#[derive(Debug, Clone, Default)]
pub struct TopologyRun {
    /// Sorted by `(round, sequence_index)`
    pub responses: Vec<AgentResponse>,
    pub timed_out: bool,
    pub degraded: bool,
    pub rounds_completed: usize,
}

impl TopologyRun {
    pub fn from_responses(mut responses: Vec<AgentResponse>, rounds_completed: usize) -> Self {
        sort_responses(&mut responses);
        Self {
            timed_out: responses
                .iter()
                .any(|r| r.failure_kind() == Some(FailureKind::TimedOut)),
            degraded: responses.iter().any(AgentResponse::is_failure),
            responses,
            rounds_completed,
        }
    }
}

/// Runs a panel under one topology
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, input: &TopologyInput<'_>) -> TopologyRun;
}

/// Executor for an execution mode
pub fn executor_for(mode: ExecutionMode) -> Box<dyn Executor> {
    match mode {
        ExecutionMode::Sequential => Box::new(SequentialExecutor),
        ExecutionMode::Parallel => Box::new(ParallelExecutor),
        ExecutionMode::Conversational => Box::new(ConversationalExecutor),
        ExecutionMode::Hierarchical => Box::new(HierarchicalExecutor),
    }
}
