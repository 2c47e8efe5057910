//! Agent responses.

use crate::agent::AgentId;
use crate::util::current_timestamp_ms;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Why an agent produced no usable response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The invoker reported an error
    Error,
    /// The consultation deadline expired first
    TimedOut,
    /// The consultation was cancelled
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Error => write!(f, "error"),
            FailureKind::TimedOut => write!(f, "timed out"),
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Agent-level failure, recorded on the response rather than raised
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl AgentFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Error, message)
    }

    pub fn timed_out() -> Self {
        Self::new(FailureKind::TimedOut, "consultation deadline expired")
    }

    pub fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "consultation cancelled")
    }
}

impl fmt::Display for AgentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// What a response is within its topology.
///
/// Only [`ResponseKind::Answer`] responses are positions on the question;
/// the others are kept for traceability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// A lead agent's breakdown of the question for its delegates
    Decomposition,
    /// An answer to the question
    #[default]
    Answer,
    /// A moderator's round-ending prompt
    Moderation,
}

/// Response of one agent invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub agent_id: AgentId,
    pub content: String,
    /// Self-reported confidence, expected in `[0, 1]`
    pub confidence: f64,
    /// Milliseconds since epoch
    pub produced_at: u64,
    /// Position of the agent in configuration order
    pub sequence_index: usize,
    /// Round the response belongs to (1-indexed)
    pub round: usize,
    #[serde(default)]
    pub kind: ResponseKind,
    /// Optional structured fields returned next to the content
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub structured: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<AgentFailure>,
    /// Filled in by the response validator
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalid_reasons: Vec<String>,
}

impl AgentResponse {
    /// A response carrying content
    pub fn success(
        agent_id: impl Into<AgentId>,
        sequence_index: usize,
        content: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            content: content.into(),
            confidence,
            produced_at: current_timestamp_ms(),
            sequence_index,
            round: 1,
            kind: ResponseKind::Answer,
            structured: BTreeMap::new(),
            failure: None,
            invalid_reasons: Vec::new(),
        }
    }

    /// A response recording an agent-level failure
    pub fn failed(
        agent_id: impl Into<AgentId>,
        sequence_index: usize,
        failure: AgentFailure,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            content: String::new(),
            confidence: 0.0,
            produced_at: current_timestamp_ms(),
            sequence_index,
            round: 1,
            kind: ResponseKind::Answer,
            structured: BTreeMap::new(),
            failure: Some(failure),
            invalid_reasons: Vec::new(),
        }
    }

    pub fn with_round(mut self, round: usize) -> Self {
        self.round = round;
        self
    }

    pub fn with_kind(mut self, kind: ResponseKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_structured(mut self, structured: BTreeMap<String, Value>) -> Self {
        self.structured = structured;
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.structured.insert(key.into(), value);
        self
    }

    pub fn with_produced_at(mut self, produced_at: u64) -> Self {
        self.produced_at = produced_at;
        self
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }

    pub fn is_answer(&self) -> bool {
        self.kind == ResponseKind::Answer
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure.as_ref().map(|f| f.kind)
    }

    /// Key giving the logical order of responses: round, configuration
    /// position, then kind. Completion order never matters.
    pub fn order_key(&self) -> (usize, usize, ResponseKind) {
        (self.round, self.sequence_index, self.kind)
    }

    /// Ordering used whenever two responses must be told apart
    /// deterministically: lowest sequence index, then lowest agent id.
    pub fn tie_break_cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sequence_index
            .cmp(&other.sequence_index)
            .then_with(|| self.agent_id.cmp(&other.agent_id))
    }

    /// Compare by confidence (higher first), falling back to
    /// [`AgentResponse::tie_break_cmp`].
    pub fn preference_cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .confidence
            .total_cmp(&self.confidence)
            .then_with(|| self.tie_break_cmp(other))
    }
}

/// Sort responses into logical order
pub fn sort_responses(responses: &mut [AgentResponse]) {
    responses.sort_by_key(|r| r.order_key());
}
