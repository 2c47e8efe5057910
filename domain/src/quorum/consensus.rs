//! Consensus building.

use super::rule::QuorumRule;
use crate::agent::AgentId;
use crate::conflict::{ClaimCluster, ClaimComparator, ClaimContext, cluster_by_claim};
use crate::resolution::Resolution;
use crate::response::AgentResponse;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The answer a consultation hands back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub agent_id: AgentId,
    pub content: String,
    pub confidence: f64,
    /// False when this is only the most confident answer of a split panel
    pub is_consensus: bool,
}

/// Outcome of the consensus step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub reached: bool,
    pub final_recommendation: Recommendation,
    pub dissenting_agent_ids: Vec<AgentId>,
    pub supporting_agent_ids: Vec<AgentId>,
    /// Agreeing agents required
    pub quorum: usize,
    /// Set when an escalation left no automatic answer
    pub needs_review: bool,
}

/// Decides whether a panel agrees.
///
/// Consensus is reached when the largest group of agreeing final positions
/// meets the quorum and no conflict was escalated. Resolutions never turn
/// overruled agents into supporters; they only block consensus by
/// escalating.
#[derive(Clone)]
pub struct ConsensusBuilder {
    comparator: Arc<dyn ClaimComparator>,
    rule: QuorumRule,
}

impl ConsensusBuilder {
    pub fn new(comparator: Arc<dyn ClaimComparator>) -> Self {
        Self {
            comparator,
            rule: QuorumRule::Majority,
        }
    }

    pub fn with_rule(mut self, rule: QuorumRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn rule(&self) -> QuorumRule {
        self.rule
    }

    /// Build the consensus over valid final positions.
    ///
    /// `agent_count` is the panel size, so failed agents count against the
    /// quorum. Returns `None` when there is no valid position at all.
    pub fn build(
        &self,
        positions: &[&AgentResponse],
        resolutions: &[Resolution],
        agent_count: usize,
        context: &ClaimContext<'_>,
    ) -> Option<ConsensusResult> {
        let best = positions.iter().copied().min_by(|a, b| a.preference_cmp(b))?;
        let quorum = self.rule.required(agent_count);
        let escalated = resolutions.iter().any(Resolution::is_escalation);

        let (clusters, _) = cluster_by_claim(self.comparator.as_ref(), positions, context);
        let mut largest: Option<&ClaimCluster<'_>> = None;
        for cluster in &clusters {
            if largest.is_none_or(|l| cluster.len() > l.len()) {
                largest = Some(cluster);
            }
        }

        if let Some(cluster) = largest
            && cluster.len() >= quorum
            && !escalated
            && let Some(chosen) = cluster.representative()
        {
            return Some(ConsensusResult {
                reached: true,
                final_recommendation: recommendation(chosen, true),
                supporting_agent_ids: cluster.members.iter().map(|r| r.agent_id.clone()).collect(),
                dissenting_agent_ids: positions
                    .iter()
                    .filter(|r| !cluster.contains(r))
                    .map(|r| r.agent_id.clone())
                    .collect(),
                quorum,
                needs_review: false,
            });
        }

        if escalated {
            return Some(ConsensusResult {
                reached: false,
                final_recommendation: recommendation(best, false),
                supporting_agent_ids: Vec::new(),
                dissenting_agent_ids: positions.iter().map(|r| r.agent_id.clone()).collect(),
                quorum,
                needs_review: true,
            });
        }

        Some(ConsensusResult {
            reached: false,
            final_recommendation: recommendation(best, false),
            supporting_agent_ids: vec![best.agent_id.clone()],
            dissenting_agent_ids: positions
                .iter()
                .filter(|r| r.agent_id != best.agent_id)
                .map(|r| r.agent_id.clone())
                .collect(),
            quorum,
            needs_review: false,
        })
    }
}

impl std::fmt::Debug for ConsensusBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsensusBuilder")
            .field("rule", &self.rule)
            .finish_non_exhaustive()
    }
}

fn recommendation(response: &AgentResponse, is_consensus: bool) -> Recommendation {
    Recommendation {
        agent_id: response.agent_id.clone(),
        content: response.content.clone(),
        confidence: response.confidence,
        is_consensus,
    }
}
