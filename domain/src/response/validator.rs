//! Response validation.
//!
//! Invalid responses are never dropped: [`ResponseValidator::annotate`]
//! records the reasons on the response itself so the audit trail stays
//! complete, and downstream stages simply skip them.

use super::entities::AgentResponse;
use crate::agent::AgentId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Outcome of validating one response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub reasons: Vec<String>,
}

impl ValidationReport {
    fn from_reasons(reasons: Vec<String>) -> Self {
        Self {
            valid: reasons.is_empty(),
            reasons,
        }
    }
}

/// Structural validator for agent responses
#[derive(Debug, Clone, Default)]
pub struct ResponseValidator {
    known_agents: Option<HashSet<AgentId>>,
}

impl ResponseValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also reject responses from agents outside this set
    pub fn with_known_agents(mut self, agents: impl IntoIterator<Item = AgentId>) -> Self {
        self.known_agents = Some(agents.into_iter().collect());
        self
    }

    /// Validate one response
    pub fn validate(&self, response: &AgentResponse) -> ValidationReport {
        let mut reasons = Vec::new();

        if let Some(failure) = &response.failure {
            reasons.push(format!("agent failed ({})", failure));
        }
        if response.content.trim().is_empty() {
            reasons.push("content is empty".to_string());
        }
        if !response.confidence.is_finite() || !(0.0..=1.0).contains(&response.confidence) {
            reasons.push(format!(
                "confidence {} is outside [0, 1]",
                response.confidence
            ));
        }
        if let Some(known) = &self.known_agents
            && !known.contains(&response.agent_id)
        {
            reasons.push(format!("unknown agent '{}'", response.agent_id));
        }

        ValidationReport::from_reasons(reasons)
    }

    pub fn is_valid(&self, response: &AgentResponse) -> bool {
        self.validate(response).valid
    }

    /// Attach invalidity reasons to every response, returning how many passed
    pub fn annotate(&self, responses: &mut [AgentResponse]) -> usize {
        let mut valid = 0;
        for response in responses.iter_mut() {
            let report = self.validate(response);
            if report.valid {
                valid += 1;
            }
            response.invalid_reasons = report.reasons;
        }
        valid
    }

    /// Latest valid answer of each agent, in configuration order.
    ///
    /// In multi-round topologies an agent answers more than once; only its
    /// final position takes part in conflict detection and consensus.
    pub fn final_positions<'a>(&self, responses: &'a [AgentResponse]) -> Vec<&'a AgentResponse> {
        let mut latest: BTreeMap<&AgentId, &AgentResponse> = BTreeMap::new();
        for response in responses
            .iter()
            .filter(|r| r.is_answer() && self.is_valid(r))
        {
            match latest.get(&response.agent_id) {
                Some(current) if current.round >= response.round => {}
                _ => {
                    latest.insert(&response.agent_id, response);
                }
            }
        }

        let mut positions: Vec<_> = latest.into_values().collect();
        positions.sort_by(|a, b| a.tie_break_cmp(b));
        positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::entities::{AgentFailure, ResponseKind};

    #[test]
    fn test_valid_response() {
        let report = ResponseValidator::new().validate(&AgentResponse::success("a", 0, "approve", 0.8));
        assert!(report.valid);
        assert!(report.reasons.is_empty());
    }

    #[test]
    fn test_confidence_out_of_range() {
        let report =
            ResponseValidator::new().validate(&AgentResponse::success("a", 0, "approve", 1.5));
        assert!(!report.valid);
        assert!(report.reasons[0].contains("outside [0, 1]"));

        let nan = ResponseValidator::new().validate(&AgentResponse::success("a", 0, "x", f64::NAN));
        assert!(!nan.valid);
    }

    #[test]
    fn test_empty_content() {
        let report = ResponseValidator::new().validate(&AgentResponse::success("a", 0, "  ", 0.5));
        assert!(!report.valid);
        assert_eq!(report.reasons, vec!["content is empty".to_string()]);
    }

    #[test]
    fn test_failure_collects_all_reasons() {
        let report = ResponseValidator::new().validate(&AgentResponse::failed(
            "a",
            0,
            AgentFailure::error("connection refused"),
        ));
        assert!(!report.valid);
        assert_eq!(report.reasons.len(), 2);
        assert!(report.reasons[0].contains("connection refused"));
    }

    #[test]
    fn test_unknown_agent() {
        let validator = ResponseValidator::new().with_known_agents([AgentId::new("a")]);
        assert!(validator.is_valid(&AgentResponse::success("a", 0, "ok", 0.5)));
        let report = validator.validate(&AgentResponse::success("ghost", 1, "ok", 0.5));
        assert!(report.reasons.iter().any(|r| r.contains("unknown agent")));
    }

    #[test]
    fn test_annotate_keeps_invalid_responses() {
        let mut responses = vec![
            AgentResponse::success("a", 0, "approve", 0.9),
            AgentResponse::success("b", 1, "", 0.9),
            AgentResponse::success("c", 2, "reject", 1.5),
        ];
        let valid = ResponseValidator::new().annotate(&mut responses);
        assert_eq!(valid, 1);
        assert_eq!(responses.len(), 3);
        assert!(responses[0].invalid_reasons.is_empty());
        assert!(!responses[1].invalid_reasons.is_empty());
        assert!(!responses[2].invalid_reasons.is_empty());
    }

    #[test]
    fn test_final_positions_use_latest_valid_answer() {
        let responses = vec![
            AgentResponse::success("a", 0, "reject", 0.6),
            AgentResponse::success("b", 1, "approve", 0.7),
            AgentResponse::success("a", 0, "approve", 0.8).with_round(2),
            AgentResponse::success("b", 1, "", 0.7).with_round(2),
            AgentResponse::success("a", 0, "next round prompt", 0.5)
                .with_round(2)
                .with_kind(ResponseKind::Moderation),
        ];
        let positions = ResponseValidator::new().final_positions(&responses);
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].agent_id.as_str(), "a");
        assert_eq!(positions[0].content, "approve");
        assert_eq!(positions[1].agent_id.as_str(), "b");
        assert_eq!(positions[1].round, 1);
    }
}
