//! Orchestrator settings: consultation-wide limits and deliberation tunables.

use consult_domain::conflict::DEFAULT_CONFIDENCE_THRESHOLD;
use consult_domain::resolution::DEFAULT_CONFIDENCE_MARGIN;
use consult_domain::{DeliberationSettings, QuorumRule};
use std::time::Duration;

/// Default deadline for a whole consultation
pub const DEFAULT_DEADLINE: Duration = Duration::from_millis(300_000);

/// Settings of the consultation orchestrator.
///
/// These are application-layer concerns; which agents run and how is
/// the panel configuration's business.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorSettings {
    /// Wall-clock budget for one consultation, all agents included
    pub deadline: Duration,
    /// Confidence gap that flags two responses as diverging
    pub confidence_gap_threshold: f64,
    /// Normalized weight gap that lets the heavier side of a conflict win
    pub confidence_margin: f64,
    /// Consensus rule; never laxer than the panel majority
    pub quorum_rule: QuorumRule,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            deadline: DEFAULT_DEADLINE,
            confidence_gap_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            confidence_margin: DEFAULT_CONFIDENCE_MARGIN,
            quorum_rule: QuorumRule::Majority,
        }
    }
}

impl OrchestratorSettings {
    // ==================== Builder Methods ====================

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_confidence_gap_threshold(mut self, threshold: f64) -> Self {
        self.confidence_gap_threshold = threshold;
        self
    }

    pub fn with_confidence_margin(mut self, margin: f64) -> Self {
        self.confidence_margin = margin;
        self
    }

    pub fn with_quorum_rule(mut self, rule: QuorumRule) -> Self {
        self.quorum_rule = rule;
        self
    }

    /// Tunables handed to the deliberation pipeline
    pub fn deliberation(&self) -> DeliberationSettings {
        DeliberationSettings {
            confidence_gap_threshold: self.confidence_gap_threshold,
            confidence_margin: self.confidence_margin,
            quorum_rule: self.quorum_rule,
        }
    }
}
