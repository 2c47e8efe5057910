//! Resolution types.

use crate::agent::AgentId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy used to settle a conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    MajorityVote,
    ConfidenceWeighted,
    Escalate,
    DiscardMinority,
}

impl ResolutionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStrategy::MajorityVote => "majority_vote",
            ResolutionStrategy::ConfidenceWeighted => "confidence_weighted",
            ResolutionStrategy::Escalate => "escalate",
            ResolutionStrategy::DiscardMinority => "discard_minority",
        }
    }
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a resolution decided
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// One side's answer was adopted automatically
    Adopted {
        content: String,
        claim: String,
        supporting_agent_ids: Vec<AgentId>,
        overruled_agent_ids: Vec<AgentId>,
    },
    /// No automatic answer; a human must review
    Escalated { reason: String },
}

/// Decision taken for one conflict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub conflict_id: String,
    pub strategy: ResolutionStrategy,
    #[serde(flatten)]
    pub outcome: ResolutionOutcome,
}

impl Resolution {
    pub fn is_escalation(&self) -> bool {
        matches!(self.outcome, ResolutionOutcome::Escalated { .. })
    }

    /// Content adopted by this resolution, if any
    pub fn adopted_content(&self) -> Option<&str> {
        match &self.outcome {
            ResolutionOutcome::Adopted { content, .. } => Some(content),
            ResolutionOutcome::Escalated { .. } => None,
        }
    }
}
