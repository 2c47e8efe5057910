//! The deliberation pipeline: validation, conflict detection, resolution and
//! consensus over one snapshot of responses.
//!
//! The orchestrator runs it once on the final responses; the conversational
//! topology runs it after every round to stop early once the panel agrees.

use super::consensus::{ConsensusBuilder, ConsensusResult};
use super::rule::QuorumRule;
use crate::conflict::{
    ClaimComparator, ClaimContext, Conflict, ConflictDetector, DEFAULT_CONFIDENCE_THRESHOLD,
};
use crate::orchestration::HistoryEntry;
use crate::panel::PanelConfiguration;
use crate::resolution::{ConflictResolver, DEFAULT_CONFIDENCE_MARGIN, Resolution};
use crate::response::{AgentResponse, ResponseValidator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Tunables of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliberationSettings {
    /// Confidence gap that flags a pair of responses
    pub confidence_gap_threshold: f64,
    /// Normalized weight gap that lets the heavier side win
    pub confidence_margin: f64,
    pub quorum_rule: QuorumRule,
}

impl Default for DeliberationSettings {
    fn default() -> Self {
        Self {
            confidence_gap_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            confidence_margin: DEFAULT_CONFIDENCE_MARGIN,
            quorum_rule: QuorumRule::Majority,
        }
    }
}

/// What the pipeline concluded
#[derive(Debug, Clone, Default)]
pub struct DeliberationOutcome {
    pub conflicts: Vec<Conflict>,
    pub resolutions: Vec<Resolution>,
    pub consensus: Option<ConsensusResult>,
    /// Number of agents with a valid final position
    pub valid_count: usize,
}

impl DeliberationOutcome {
    pub fn consensus_reached(&self) -> bool {
        self.consensus.as_ref().is_some_and(|c| c.reached)
    }
}

#[derive(Debug, Clone)]
pub struct Deliberation {
    detector: ConflictDetector,
    resolver: ConflictResolver,
    builder: ConsensusBuilder,
}

impl Deliberation {
    pub fn new(comparator: Arc<dyn ClaimComparator>, settings: DeliberationSettings) -> Self {
        Self {
            detector: ConflictDetector::new(comparator.clone())
                .with_confidence_threshold(settings.confidence_gap_threshold),
            resolver: ConflictResolver::new(comparator.clone())
                .with_confidence_margin(settings.confidence_margin),
            builder: ConsensusBuilder::new(comparator).with_rule(settings.quorum_rule),
        }
    }

    fn validator(panel: &PanelConfiguration) -> ResponseValidator {
        ResponseValidator::new().with_known_agents(panel.agents().iter().map(|a| a.id.clone()))
    }

    /// Record invalidity reasons on the responses, returning the valid count
    pub fn annotate(&self, responses: &mut [AgentResponse], panel: &PanelConfiguration) -> usize {
        Self::validator(panel).annotate(responses)
    }

    /// Latest valid answer of every agent, in configuration order
    pub fn final_positions<'a>(
        &self,
        responses: &'a [AgentResponse],
        panel: &PanelConfiguration,
    ) -> Vec<&'a AgentResponse> {
        Self::validator(panel).final_positions(responses)
    }

    pub fn detect(&self, positions: &[&AgentResponse], context: &ClaimContext<'_>) -> Vec<Conflict> {
        self.detector.detect(positions, context)
    }

    pub fn resolve(
        &self,
        conflicts: &[Conflict],
        positions: &[&AgentResponse],
        context: &ClaimContext<'_>,
    ) -> Vec<Resolution> {
        self.resolver.resolve(conflicts, positions, context)
    }

    pub fn build_consensus(
        &self,
        positions: &[&AgentResponse],
        resolutions: &[Resolution],
        panel: &PanelConfiguration,
        context: &ClaimContext<'_>,
    ) -> Option<ConsensusResult> {
        self.builder
            .build(positions, resolutions, panel.agent_count(), context)
    }

    /// Run detection, resolution and consensus over the valid final
    /// positions in `responses`
    pub fn evaluate(
        &self,
        responses: &[AgentResponse],
        panel: &PanelConfiguration,
        question: &str,
        history: &[HistoryEntry],
    ) -> DeliberationOutcome {
        let positions = self.final_positions(responses, panel);
        let context = ClaimContext::new(question, history);

        let conflicts = self.detect(&positions, &context);
        let resolutions = self.resolve(&conflicts, &positions, &context);
        let consensus = self.build_consensus(&positions, &resolutions, panel, &context);

        DeliberationOutcome {
            valid_count: positions.len(),
            conflicts,
            resolutions,
            consensus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentDefinition;
    use crate::conflict::PolarityComparator;
    use crate::response::AgentFailure;

    fn panel(ids: &[&str]) -> PanelConfiguration {
        PanelConfiguration::builder(
            ids.iter()
                .map(|id| AgentDefinition::new(*id, "specialist"))
                .collect(),
        )
        .build()
        .unwrap()
    }

    fn deliberation() -> Deliberation {
        Deliberation::new(
            Arc::new(PolarityComparator::new()),
            DeliberationSettings::default(),
        )
    }

    #[test]
    fn test_invalid_responses_are_excluded() {
        let panel = panel(&["a", "b", "c"]);
        let mut responses = vec![
            AgentResponse::success("a", 0, "approve", 0.8),
            AgentResponse::success("b", 1, "approve", 0.7),
            AgentResponse::success("c", 2, "reject", 1.7),
        ];
        let valid = deliberation().annotate(&mut responses, &panel);
        assert_eq!(valid, 2);
        assert!(!responses[2].invalid_reasons.is_empty());

        let outcome = deliberation().evaluate(&responses, &panel, "Approve?", &[]);
        assert_eq!(outcome.valid_count, 2);
        assert!(outcome.conflicts.is_empty());
        let consensus = outcome.consensus.unwrap();
        assert!(consensus.reached);
        assert!(consensus.dissenting_agent_ids.is_empty());
    }

    #[test]
    fn test_later_round_supersedes_earlier_position() {
        let panel = panel(&["a", "b"]);
        let responses = vec![
            AgentResponse::success("a", 0, "approve", 0.8),
            AgentResponse::success("b", 1, "reject", 0.8),
            AgentResponse::success("a", 0, "approve", 0.8).with_round(2),
            AgentResponse::success("b", 1, "I now approve", 0.75).with_round(2),
        ];
        let outcome = deliberation().evaluate(&responses, &panel, "Approve?", &[]);
        assert!(outcome.conflicts.is_empty());
        assert!(outcome.consensus_reached());
    }

    #[test]
    fn test_all_failed_yields_no_consensus() {
        let panel = panel(&["a", "b"]);
        let responses = vec![
            AgentResponse::failed("a", 0, AgentFailure::error("boom")),
            AgentResponse::failed("b", 1, AgentFailure::timed_out()),
        ];
        let outcome = deliberation().evaluate(&responses, &panel, "Approve?", &[]);
        assert_eq!(outcome.valid_count, 0);
        assert!(outcome.consensus.is_none());
        assert!(!outcome.consensus_reached());
    }
}
