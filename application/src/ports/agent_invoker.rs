//! Agent invoker port
//!
//! Defines how the application layer reaches an agent. How the agent
//! reasons or generates text is out of scope; adapters live in the
//! infrastructure layer.

use async_trait::async_trait;
use consult_domain::{AgentDefinition, Contribution, HistoryEntry, ResponseKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Agent-level failures.
///
/// These are recorded on the agent's response and never abort a
/// consultation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvocationError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid output: {0}")]
    InvalidOutput(String),

    #[error("Agent not available: {0}")]
    Unavailable(String),

    #[error("Timed out")]
    Timeout,

    #[error("Cancelled")]
    Cancelled,
}

/// What an agent returns
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentOutput {
    pub content: String,
    pub confidence: f64,
    #[serde(default, rename = "fields", skip_serializing_if = "BTreeMap::is_empty")]
    pub structured: BTreeMap<String, Value>,
}

impl AgentOutput {
    pub fn new(content: impl Into<String>, confidence: f64) -> Self {
        Self {
            content: content.into(),
            confidence,
            structured: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.structured.insert(key.into(), value);
        self
    }
}

/// Why an agent is being invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationRole {
    /// Answering as a member of the panel
    #[default]
    Panelist,
    /// Closing a discussion round
    Moderator,
    /// Lead splitting the question for its delegates
    Decomposer,
    /// Working on a task handed down by the lead
    Delegate,
    /// Lead combining its delegates' findings
    Aggregator,
}

impl InvocationRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvocationRole::Panelist => "panelist",
            InvocationRole::Moderator => "moderator",
            InvocationRole::Decomposer => "decomposer",
            InvocationRole::Delegate => "delegate",
            InvocationRole::Aggregator => "aggregator",
        }
    }

    /// Kind of response this invocation produces
    pub fn response_kind(&self) -> ResponseKind {
        match self {
            InvocationRole::Moderator => ResponseKind::Moderation,
            InvocationRole::Decomposer => ResponseKind::Decomposition,
            InvocationRole::Panelist | InvocationRole::Delegate | InvocationRole::Aggregator => {
                ResponseKind::Answer
            }
        }
    }
}

/// Everything an agent may see besides the raw question
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvocationContext {
    pub role: InvocationRole,
    /// Round this invocation belongs to (1-indexed)
    pub round: usize,
    /// Caller-supplied conversation history
    pub history: Vec<HistoryEntry>,
    /// Successful outputs of agents that ran earlier (sequential)
    pub prior_outputs: Vec<Contribution>,
    /// Discussion transcript (conversational, aggregation)
    pub transcript: Vec<Contribution>,
    /// Instruction from a lead (hierarchical delegates)
    pub instruction: Option<String>,
    /// Rendered user prompt for this turn
    pub prompt: String,
}

impl InvocationContext {
    pub fn new(role: InvocationRole, round: usize) -> Self {
        Self {
            role,
            round,
            ..Default::default()
        }
    }

    pub fn with_history(mut self, history: &[HistoryEntry]) -> Self {
        self.history = history.to_vec();
        self
    }

    pub fn with_prior_outputs(mut self, prior: Vec<Contribution>) -> Self {
        self.prior_outputs = prior;
        self
    }

    pub fn with_transcript(mut self, transcript: Vec<Contribution>) -> Self {
        self.transcript = transcript;
        self
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }
}

/// Port for invoking one agent
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    /// Invoke `agent` on `question`.
    ///
    /// An `Err` becomes a failed response for this agent only.
    async fn invoke(
        &self,
        agent: &AgentDefinition,
        question: &str,
        context: &InvocationContext,
    ) -> Result<AgentOutput, InvocationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_response_kind() {
        assert_eq!(InvocationRole::Panelist.response_kind(), ResponseKind::Answer);
        assert_eq!(InvocationRole::Moderator.response_kind(), ResponseKind::Moderation);
        assert_eq!(
            InvocationRole::Decomposer.response_kind(),
            ResponseKind::Decomposition
        );
    }

    #[test]
    fn test_output_deserializes_fields() {
        let output: AgentOutput = serde_json::from_str(
            r#"{"content": "approve", "confidence": 0.8, "fields": {"dose": "5mg"}}"#,
        )
        .unwrap();
        assert_eq!(output.structured["dose"], "5mg");
    }
}
