//! Orchestration value objects - inputs and outputs of a consultation.
//!
//! - [`HistoryEntry`] - prior conversation turn supplied by the caller
//! - [`Contribution`] - an agent output shared with other agents as context
//! - [`ExecutionResult`] - complete result of one consultation
//! - [`ExecutionMetadata`] - accounting for one consultation

use crate::agent::AgentId;
use crate::conflict::Conflict;
use crate::framework::Framework;
use crate::panel::ExecutionMode;
use crate::quorum::ConsensusResult;
use crate::resolution::Resolution;
use crate::response::{AgentResponse, FailureKind};
use serde::{Deserialize, Serialize};

/// One turn of prior conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
}

impl HistoryEntry {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

/// Output of one agent, as passed to other agents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub agent_id: AgentId,
    pub role: String,
    pub round: usize,
    pub content: String,
}

impl Contribution {
    pub fn new(
        agent_id: impl Into<AgentId>,
        role: impl Into<String>,
        round: usize,
        content: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            role: role.into(),
            round,
            content: content.into(),
        }
    }

    /// Build from a response, labelling it with the agent's role
    pub fn from_response(response: &AgentResponse, role: impl Into<String>) -> Self {
        Self::new(
            response.agent_id.clone(),
            role,
            response.round,
            response.content.clone(),
        )
    }
}

/// Accounting for one consultation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    pub duration_ms: u64,
    /// Always the panel size, failures included
    pub agents_invoked: usize,
    /// Agents that produced no successful answer
    pub agents_failed: usize,
    /// The deadline expired before every call finished
    pub timed_out: bool,
    /// The consultation was cancelled by the caller
    pub cancelled: bool,
    /// At least one agent failed while others carried on
    pub degraded: bool,
    pub rounds_completed: usize,
}

impl ExecutionMetadata {
    /// Derive the per-agent accounting from the full response list
    pub fn from_responses(agent_ids: &[AgentId], responses: &[AgentResponse]) -> Self {
        let agents_failed = agent_ids
            .iter()
            .filter(|id| {
                !responses
                    .iter()
                    .any(|r| &r.agent_id == *id && r.is_answer() && !r.is_failure())
            })
            .count();

        Self {
            agents_invoked: agent_ids.len(),
            agents_failed,
            timed_out: responses
                .iter()
                .any(|r| r.failure_kind() == Some(FailureKind::TimedOut)),
            cancelled: responses
                .iter()
                .any(|r| r.failure_kind() == Some(FailureKind::Cancelled)),
            degraded: responses.iter().any(|r| r.is_failure()),
            rounds_completed: responses.iter().map(|r| r.round).max().unwrap_or(0),
            duration_ms: 0,
        }
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

/// Complete result of a consultation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// At least one response passed validation
    pub success: bool,
    pub question: String,
    pub framework: Framework,
    pub mode: ExecutionMode,
    /// Every response in logical order, invalid and failed ones included
    pub responses: Vec<AgentResponse>,
    pub conflicts: Vec<Conflict>,
    pub resolutions: Vec<Resolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consensus: Option<ConsensusResult>,
    pub metadata: ExecutionMetadata,
}

impl ExecutionResult {
    /// Responses that passed validation
    pub fn valid_responses(&self) -> impl Iterator<Item = &AgentResponse> {
        self.responses.iter().filter(|r| r.invalid_reasons.is_empty())
    }

    /// Responses rejected by validation, with their reasons attached
    pub fn invalid_responses(&self) -> impl Iterator<Item = &AgentResponse> {
        self.responses.iter().filter(|r| !r.invalid_reasons.is_empty())
    }

    pub fn consensus_reached(&self) -> bool {
        self.consensus.as_ref().is_some_and(|c| c.reached)
    }

    pub fn needs_review(&self) -> bool {
        self.consensus.as_ref().is_some_and(|c| c.needs_review)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::AgentFailure;

    fn ids(list: &[&str]) -> Vec<AgentId> {
        list.iter().map(|s| AgentId::new(*s)).collect()
    }

    #[test]
    fn test_metadata_counts_failed_agents() {
        let responses = vec![
            AgentResponse::success("a", 0, "approve", 0.9),
            AgentResponse::failed("b", 1, AgentFailure::timed_out()),
            AgentResponse::failed("c", 2, AgentFailure::error("boom")),
        ];
        let metadata = ExecutionMetadata::from_responses(&ids(&["a", "b", "c"]), &responses);
        assert_eq!(metadata.agents_invoked, 3);
        assert_eq!(metadata.agents_failed, 2);
        assert!(metadata.timed_out);
        assert!(!metadata.cancelled);
        assert!(metadata.degraded);
        assert_eq!(metadata.rounds_completed, 1);
    }

    #[test]
    fn test_metadata_agent_recovered_in_later_round_is_not_failed() {
        let responses = vec![
            AgentResponse::failed("a", 0, AgentFailure::error("flaky")),
            AgentResponse::success("a", 0, "approve", 0.9).with_round(2),
        ];
        let metadata = ExecutionMetadata::from_responses(&ids(&["a"]), &responses);
        assert_eq!(metadata.agents_failed, 0);
        assert_eq!(metadata.rounds_completed, 2);
        assert!(metadata.degraded);
    }

    #[test]
    fn test_contribution_from_response() {
        let response = AgentResponse::success("pharmacy", 1, "Reduce the dose", 0.7).with_round(2);
        let contribution = Contribution::from_response(&response, "Clinical pharmacist");
        assert_eq!(contribution.agent_id.as_str(), "pharmacy");
        assert_eq!(contribution.round, 2);
        assert_eq!(contribution.content, "Reduce the dose");
    }
}
