//! Conflict resolution.

use super::entities::{Resolution, ResolutionOutcome, ResolutionStrategy};
use crate::conflict::{
    ClaimCluster, ClaimComparator, ClaimContext, Conflict, ConflictSeverity, cluster_by_claim,
};
use crate::response::AgentResponse;
use std::cmp::Ordering;
use std::sync::Arc;

/// Normalized weight gap above which the heavier side wins outright
pub const DEFAULT_CONFIDENCE_MARGIN: f64 = 0.1;

/// Picks one strategy per conflict, trying in order:
///
/// 1. majority vote, when at least three responses are valid and one side
///    holds a strict majority of the involved agents;
/// 2. confidence weighting, when the normalized side weights differ by more
///    than the margin;
/// 3. escalation, for high-severity conflicts;
/// 4. discarding the minority, for low-severity conflicts where a single
///    involved agent holds a claim nobody else on the panel shares;
/// 5. confidence weighting with the deterministic tie-break.
#[derive(Clone)]
pub struct ConflictResolver {
    comparator: Arc<dyn ClaimComparator>,
    confidence_margin: f64,
}

impl ConflictResolver {
    pub fn new(comparator: Arc<dyn ClaimComparator>) -> Self {
        Self {
            comparator,
            confidence_margin: DEFAULT_CONFIDENCE_MARGIN,
        }
    }

    pub fn with_confidence_margin(mut self, margin: f64) -> Self {
        self.confidence_margin = margin;
        self
    }

    pub fn confidence_margin(&self) -> f64 {
        self.confidence_margin
    }

    /// Resolve every conflict against the panel's final positions
    pub fn resolve(
        &self,
        conflicts: &[Conflict],
        positions: &[&AgentResponse],
        context: &ClaimContext<'_>,
    ) -> Vec<Resolution> {
        let (panel_clusters, _) = cluster_by_claim(self.comparator.as_ref(), positions, context);
        conflicts
            .iter()
            .map(|conflict| self.resolve_one(conflict, positions, &panel_clusters, context))
            .collect()
    }

    fn resolve_one(
        &self,
        conflict: &Conflict,
        positions: &[&AgentResponse],
        panel_clusters: &[ClaimCluster<'_>],
        context: &ClaimContext<'_>,
    ) -> Resolution {
        let involved: Vec<&AgentResponse> = positions
            .iter()
            .copied()
            .filter(|r| conflict.involves(&r.agent_id))
            .collect();
        let (sides, _) = cluster_by_claim(self.comparator.as_ref(), &involved, context);

        if positions.len() >= 3
            && let Some(side) = sides.iter().find(|s| s.len() * 2 > involved.len())
        {
            return adopt(conflict, ResolutionStrategy::MajorityVote, side, &involved);
        }

        let total: f64 = involved.iter().map(|r| r.confidence).sum();
        if total > 0.0 && !sides.is_empty() {
            let mut ranked: Vec<&ClaimCluster<'_>> = sides.iter().collect();
            ranked.sort_by(|a, b| heavier_first(a, b));
            let top = ranked[0].total_confidence() / total;
            let runner_up = ranked.get(1).map_or(0.0, |s| s.total_confidence() / total);
            if top - runner_up > self.confidence_margin {
                return adopt(
                    conflict,
                    ResolutionStrategy::ConfidenceWeighted,
                    ranked[0],
                    &involved,
                );
            }
        }

        if conflict.severity == ConflictSeverity::High {
            return Resolution {
                conflict_id: conflict.id.clone(),
                strategy: ResolutionStrategy::Escalate,
                outcome: ResolutionOutcome::Escalated {
                    reason: format!(
                        "{} with no clear majority or confidence margin",
                        conflict.description
                    ),
                },
            };
        }

        if conflict.severity == ConflictSeverity::Low && positions.len() >= 3 {
            let outliers: Vec<&AgentResponse> = involved
                .iter()
                .copied()
                .filter(|r| {
                    panel_clusters
                        .iter()
                        .any(|c| c.len() == 1 && c.contains(r))
                })
                .collect();
            if let [outlier] = outliers.as_slice() {
                let rest: Vec<&AgentResponse> = involved
                    .iter()
                    .copied()
                    .filter(|r| r.agent_id != outlier.agent_id)
                    .collect();
                let (rest_sides, _) = cluster_by_claim(self.comparator.as_ref(), &rest, context);
                if let Some(side) = rest_sides.iter().min_by(|a, b| heavier_first(a, b)) {
                    return adopt(conflict, ResolutionStrategy::DiscardMinority, side, &involved);
                }
            }
        }

        match sides.iter().min_by(|a, b| heavier_first(a, b)) {
            Some(side) => adopt(conflict, ResolutionStrategy::ConfidenceWeighted, side, &involved),
            None => Resolution {
                conflict_id: conflict.id.clone(),
                strategy: ResolutionStrategy::Escalate,
                outcome: ResolutionOutcome::Escalated {
                    reason: "no valid responses among the involved agents".to_string(),
                },
            },
        }
    }
}

impl std::fmt::Debug for ConflictResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConflictResolver")
            .field("confidence_margin", &self.confidence_margin)
            .finish_non_exhaustive()
    }
}

/// Heavier side first; equal weights fall back to the earliest member
fn heavier_first(a: &ClaimCluster<'_>, b: &ClaimCluster<'_>) -> Ordering {
    b.total_confidence()
        .total_cmp(&a.total_confidence())
        .then_with(|| match (a.earliest(), b.earliest()) {
            (Some(x), Some(y)) => x.tie_break_cmp(y),
            _ => Ordering::Equal,
        })
}

fn adopt(
    conflict: &Conflict,
    strategy: ResolutionStrategy,
    side: &ClaimCluster<'_>,
    involved: &[&AgentResponse],
) -> Resolution {
    let content = side
        .representative()
        .map(|r| r.content.clone())
        .unwrap_or_default();
    let supporting_agent_ids = side.members.iter().map(|r| r.agent_id.clone()).collect();
    let overruled_agent_ids = involved
        .iter()
        .filter(|r| !side.contains(r))
        .map(|r| r.agent_id.clone())
        .collect();

    Resolution {
        conflict_id: conflict.id.clone(),
        strategy,
        outcome: ResolutionOutcome::Adopted {
            content,
            claim: side.claim.key.clone(),
            supporting_agent_ids,
            overruled_agent_ids,
        },
    }
}
