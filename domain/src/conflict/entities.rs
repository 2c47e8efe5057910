//! Conflict types.

use crate::agent::AgentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// How serious a disagreement is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSeverity {
    Low,
    Medium,
    High,
}

impl ConflictSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictSeverity::Low => "low",
            ConflictSeverity::Medium => "medium",
            ConflictSeverity::High => "high",
        }
    }
}

impl fmt::Display for ConflictSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rule that flagged a disagreement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictTrigger {
    /// Responses assert opposing recommendations
    OpposingRecommendation,
    /// Confidence values differ by more than the threshold
    ConfidenceDivergence,
    /// A response lacks structured fields a peer provides
    MissingStructuredFields,
}

impl ConflictTrigger {
    pub fn description(&self) -> &'static str {
        match self {
            ConflictTrigger::OpposingRecommendation => "opposing recommendations",
            ConflictTrigger::ConfidenceDivergence => "diverging confidence",
            ConflictTrigger::MissingStructuredFields => "missing structured fields",
        }
    }
}

/// A disagreement among valid responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub id: String,
    /// At least two agents, in configuration order
    pub involved_agent_ids: Vec<AgentId>,
    pub severity: ConflictSeverity,
    pub triggers: BTreeSet<ConflictTrigger>,
    pub description: String,
}

impl Conflict {
    /// Severity implied by a set of triggers over `involved` agents.
    ///
    /// Opposing recommendations are always high; confidence or field
    /// divergence is medium among three or more agents and low otherwise.
    /// When several rules fire the maximum wins.
    pub fn severity_for(triggers: &BTreeSet<ConflictTrigger>, involved: usize) -> ConflictSeverity {
        let mut severity = ConflictSeverity::Low;
        if triggers.contains(&ConflictTrigger::OpposingRecommendation) {
            severity = severity.max(ConflictSeverity::High);
        }
        let soft = triggers.contains(&ConflictTrigger::ConfidenceDivergence)
            || triggers.contains(&ConflictTrigger::MissingStructuredFields);
        if soft && involved >= 3 {
            severity = severity.max(ConflictSeverity::Medium);
        }
        severity
    }

    pub fn involves(&self, agent_id: &AgentId) -> bool {
        self.involved_agent_ids.contains(agent_id)
    }

    pub fn is_high(&self) -> bool {
        self.severity == ConflictSeverity::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triggers(list: &[ConflictTrigger]) -> BTreeSet<ConflictTrigger> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_opposing_is_high() {
        let t = triggers(&[ConflictTrigger::OpposingRecommendation]);
        assert_eq!(Conflict::severity_for(&t, 2), ConflictSeverity::High);
    }

    #[test]
    fn test_soft_triggers_depend_on_group_size() {
        let t = triggers(&[ConflictTrigger::ConfidenceDivergence]);
        assert_eq!(Conflict::severity_for(&t, 2), ConflictSeverity::Low);
        assert_eq!(Conflict::severity_for(&t, 3), ConflictSeverity::Medium);
    }

    #[test]
    fn test_maximum_severity_wins() {
        let t = triggers(&[
            ConflictTrigger::MissingStructuredFields,
            ConflictTrigger::OpposingRecommendation,
        ]);
        assert_eq!(Conflict::severity_for(&t, 4), ConflictSeverity::High);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(ConflictSeverity::High > ConflictSeverity::Medium);
        assert!(ConflictSeverity::Medium > ConflictSeverity::Low);
    }
}
