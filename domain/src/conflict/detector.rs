//! Conflict detection over the final positions of a panel.

use super::comparator::{ClaimComparator, ClaimContext, cluster_by_claim};
use super::entities::{Conflict, ConflictTrigger};
use crate::response::AgentResponse;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Confidence gap above which two responses are flagged
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.4;

/// Finds disagreements between valid responses.
///
/// Every pair of final positions is checked against three rules: opposing
/// claims, a confidence gap above the threshold, and structured fields
/// present on one side only. Opposing pairs are grouped per pair of
/// opposing claim clusters so one conflict covers both camps. The other
/// flagged pairs join the opposing conflict that already holds both agents,
/// or else are grouped into connected components.
#[derive(Clone)]
pub struct ConflictDetector {
    comparator: Arc<dyn ClaimComparator>,
    confidence_threshold: f64,
}

#[derive(Debug, Default)]
struct Draft {
    members: BTreeSet<usize>,
    triggers: BTreeSet<ConflictTrigger>,
}

impl ConflictDetector {
    pub fn new(comparator: Arc<dyn ClaimComparator>) -> Self {
        Self {
            comparator,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    /// Detect conflicts among `positions`, expected to be one valid answer
    /// per agent in configuration order.
    pub fn detect(&self, positions: &[&AgentResponse], context: &ClaimContext<'_>) -> Vec<Conflict> {
        if positions.len() < 2 {
            return Vec::new();
        }

        let (clusters, claims) = cluster_by_claim(self.comparator.as_ref(), positions, context);
        let cluster_of: Vec<usize> = positions
            .iter()
            .map(|r| clusters.iter().position(|c| c.contains(r)).unwrap_or(0))
            .collect();

        let mut opposing: BTreeMap<(usize, usize), Draft> = BTreeMap::new();
        let mut soft_pairs: Vec<(usize, usize, BTreeSet<ConflictTrigger>)> = Vec::new();

        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                let mut triggers = self.pair_triggers(positions[i], positions[j]);
                if self.comparator.opposing(&claims[i], &claims[j]) {
                    triggers.insert(ConflictTrigger::OpposingRecommendation);
                    let key = ordered(cluster_of[i], cluster_of[j]);
                    let draft = opposing.entry(key).or_default();
                    for (index, cluster) in cluster_of.iter().enumerate() {
                        if *cluster == key.0 || *cluster == key.1 {
                            draft.members.insert(index);
                        }
                    }
                    draft.triggers.extend(triggers);
                } else if !triggers.is_empty() {
                    soft_pairs.push((i, j, triggers));
                }
            }
        }

        let mut components = UnionFind::new(positions.len());
        let mut component_triggers: BTreeMap<usize, BTreeSet<ConflictTrigger>> = BTreeMap::new();
        let mut unabsorbed = Vec::new();
        for (i, j, triggers) in soft_pairs {
            match opposing
                .values_mut()
                .find(|d| d.members.contains(&i) && d.members.contains(&j))
            {
                Some(draft) => draft.triggers.extend(triggers),
                None => {
                    components.union(i, j);
                    unabsorbed.push((i, j, triggers));
                }
            }
        }
        for (i, _, triggers) in unabsorbed {
            component_triggers
                .entry(components.find(i))
                .or_default()
                .extend(triggers);
        }

        let mut drafts: Vec<Draft> = opposing.into_values().collect();
        for (root, triggers) in component_triggers {
            let members: BTreeSet<usize> = (0..positions.len())
                .filter(|&i| components.find(i) == root)
                .collect();
            drafts.push(Draft { members, triggers });
        }
        drafts.sort_by(|a, b| a.members.iter().cmp(b.members.iter()));

        drafts
            .into_iter()
            .enumerate()
            .map(|(n, draft)| build_conflict(n + 1, draft, positions))
            .collect()
    }

    fn pair_triggers(&self, a: &AgentResponse, b: &AgentResponse) -> BTreeSet<ConflictTrigger> {
        let mut triggers = BTreeSet::new();
        if (a.confidence - b.confidence).abs() > self.confidence_threshold {
            triggers.insert(ConflictTrigger::ConfidenceDivergence);
        }
        let a_keys: BTreeSet<&String> = a.structured.keys().collect();
        let b_keys: BTreeSet<&String> = b.structured.keys().collect();
        if a_keys != b_keys {
            triggers.insert(ConflictTrigger::MissingStructuredFields);
        }
        triggers
    }
}

impl std::fmt::Debug for ConflictDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConflictDetector")
            .field("confidence_threshold", &self.confidence_threshold)
            .finish_non_exhaustive()
    }
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

fn build_conflict(number: usize, draft: Draft, positions: &[&AgentResponse]) -> Conflict {
    let involved_agent_ids: Vec<_> = draft
        .members
        .iter()
        .map(|&i| positions[i].agent_id.clone())
        .collect();
    let severity = Conflict::severity_for(&draft.triggers, involved_agent_ids.len());
    let reasons: Vec<&str> = draft.triggers.iter().map(|t| t.description()).collect();
    let agents: Vec<&str> = involved_agent_ids.iter().map(|id| id.as_str()).collect();

    Conflict {
        id: format!("conflict-{}", number),
        description: format!("{} between {}", reasons.join(" and "), agents.join(", ")),
        involved_agent_ids,
        severity,
        triggers: draft.triggers,
    }
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (low, high) = ordered(ra, rb);
            self.parent[high] = low;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::comparator::PolarityComparator;
    use crate::conflict::entities::ConflictSeverity;
    use crate::agent::AgentId;

    fn detector() -> ConflictDetector {
        ConflictDetector::new(Arc::new(PolarityComparator::new()))
    }

    fn ctx() -> ClaimContext<'static> {
        ClaimContext::new("Approve the treatment plan?", &[])
    }

    fn detect(responses: &[AgentResponse]) -> Vec<Conflict> {
        let refs: Vec<&AgentResponse> = responses.iter().collect();
        detector().detect(&refs, &ctx())
    }

    #[test]
    fn test_no_conflict_when_agreeing() {
        let responses = vec![
            AgentResponse::success("a", 0, "approve", 0.8),
            AgentResponse::success("b", 1, "approve", 0.7),
        ];
        assert!(detect(&responses).is_empty());
    }

    #[test]
    fn test_opposing_pair_is_high() {
        let responses = vec![
            AgentResponse::success("a", 0, "approve", 0.9),
            AgentResponse::success("b", 1, "reject", 0.85),
        ];
        let conflicts = detect(&responses);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].id, "conflict-1");
        assert_eq!(conflicts[0].severity, ConflictSeverity::High);
        assert_eq!(
            conflicts[0].involved_agent_ids,
            vec![AgentId::new("a"), AgentId::new("b")]
        );
    }

    #[test]
    fn test_opposing_camps_form_one_conflict() {
        let responses = vec![
            AgentResponse::success("a", 0, "approve", 0.8),
            AgentResponse::success("b", 1, "approve", 0.8),
            AgentResponse::success("c", 2, "approve", 0.8),
            AgentResponse::success("d", 3, "reject", 0.6),
            AgentResponse::success("e", 4, "reject", 0.7),
        ];
        let conflicts = detect(&responses);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].involved_agent_ids.len(), 5);
        assert!(conflicts[0].is_high());
    }

    #[test]
    fn test_confidence_gap_between_two_is_low() {
        let responses = vec![
            AgentResponse::success("a", 0, "approve", 0.95),
            AgentResponse::success("b", 1, "approve", 0.3),
        ];
        let conflicts = detect(&responses);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].severity, ConflictSeverity::Low);
        assert!(conflicts[0].triggers.contains(&ConflictTrigger::ConfidenceDivergence));
    }

    #[test]
    fn test_missing_fields_component_of_three_is_medium() {
        let responses = vec![
            AgentResponse::success("a", 0, "approve", 0.8)
                .with_field("dose", serde_json::json!("10mg")),
            AgentResponse::success("b", 1, "approve", 0.8),
            AgentResponse::success("c", 2, "approve", 0.8),
        ];
        let conflicts = detect(&responses);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].involved_agent_ids.len(), 3);
        assert_eq!(conflicts[0].severity, ConflictSeverity::Medium);
    }

    #[test]
    fn test_soft_triggers_inside_opposing_conflict_are_absorbed() {
        let responses = vec![
            AgentResponse::success("a", 0, "approve", 0.95),
            AgentResponse::success("b", 1, "approve", 0.4),
            AgentResponse::success("c", 2, "reject", 0.9),
        ];
        let conflicts = detect(&responses);
        assert_eq!(conflicts.len(), 1);
        assert!(conflicts[0].triggers.contains(&ConflictTrigger::ConfidenceDivergence));
        assert!(conflicts[0].triggers.contains(&ConflictTrigger::OpposingRecommendation));
    }

    #[test]
    fn test_detection_is_deterministic() {
        let responses = vec![
            AgentResponse::success("a", 0, "approve", 0.9),
            AgentResponse::success("b", 1, "reject", 0.2),
            AgentResponse::success("c", 2, "order more labs", 0.5),
        ];
        assert_eq!(detect(&responses), detect(&responses));
    }
}
