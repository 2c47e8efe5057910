//! Claim comparison.
//!
//! Deciding whether two answers "say the same thing" or "say opposite
//! things" is domain knowledge the orchestrator cannot own, so it is
//! injected as a [`ClaimComparator`]. [`PolarityComparator`] is the default:
//! a keyword-based verdict classifier suited to approve/reject style
//! questions.

use crate::orchestration::HistoryEntry;
use crate::response::AgentResponse;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Affirm,
    Negate,
    Neutral,
}

impl Polarity {
    pub fn opposes(&self, other: Polarity) -> bool {
        matches!(
            (self, other),
            (Polarity::Affirm, Polarity::Negate) | (Polarity::Negate, Polarity::Affirm)
        )
    }
}

/// The recommendation a comparator extracted from one response
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    /// Normalized key; responses agree when their keys agree
    pub key: String,
    pub polarity: Polarity,
}

impl Claim {
    pub fn new(key: impl Into<String>, polarity: Polarity) -> Self {
        Self {
            key: key.into(),
            polarity,
        }
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

/// What a comparator may look at besides the response itself
#[derive(Debug, Clone, Copy)]
pub struct ClaimContext<'a> {
    pub question: &'a str,
    pub history: &'a [HistoryEntry],
}

impl<'a> ClaimContext<'a> {
    pub fn new(question: &'a str, history: &'a [HistoryEntry]) -> Self {
        Self { question, history }
    }
}

/// Extracts claims from responses and compares them
pub trait ClaimComparator: Send + Sync {
    /// Extract the claim made by a response
    fn claim(&self, response: &AgentResponse, context: &ClaimContext<'_>) -> Claim;

    /// Whether two claims are opposing recommendations
    fn opposing(&self, a: &Claim, b: &Claim) -> bool {
        a.polarity.opposes(b.polarity)
    }

    /// Whether two claims are the same recommendation
    fn agrees(&self, a: &Claim, b: &Claim) -> bool {
        a.key == b.key
    }
}

/// Responses grouped by the claim they make
#[derive(Debug, Clone)]
pub struct ClaimCluster<'a> {
    pub claim: Claim,
    /// Members in configuration order
    pub members: Vec<&'a AgentResponse>,
}

impl<'a> ClaimCluster<'a> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Sum of member confidences
    pub fn total_confidence(&self) -> f64 {
        self.members.iter().map(|r| r.confidence).sum()
    }

    /// Highest-confidence member, ties broken by sequence index then id
    pub fn representative(&self) -> Option<&'a AgentResponse> {
        self.members.iter().copied().min_by(|a, b| a.preference_cmp(b))
    }

    /// Member that comes first in configuration order
    pub fn earliest(&self) -> Option<&'a AgentResponse> {
        self.members.iter().copied().min_by(|a, b| a.tie_break_cmp(b))
    }

    pub fn contains(&self, response: &AgentResponse) -> bool {
        self.members.iter().any(|m| m.agent_id == response.agent_id)
    }
}

/// Group responses by claim, first-fit in the given order.
///
/// Returns the clusters in order of first appearance together with the
/// claim of every input response.
pub fn cluster_by_claim<'a>(
    comparator: &dyn ClaimComparator,
    responses: &[&'a AgentResponse],
    context: &ClaimContext<'_>,
) -> (Vec<ClaimCluster<'a>>, Vec<Claim>) {
    let claims: Vec<Claim> = responses
        .iter()
        .map(|r| comparator.claim(r, context))
        .collect();

    let mut clusters: Vec<ClaimCluster<'a>> = Vec::new();
    for (response, claim) in responses.iter().zip(&claims) {
        match clusters
            .iter_mut()
            .find(|c| comparator.agrees(&c.claim, claim))
        {
            Some(cluster) => cluster.members.push(response),
            None => clusters.push(ClaimCluster {
                claim: claim.clone(),
                members: vec![response],
            }),
        }
    }
    (clusters, claims)
}

const AFFIRMING: &[&str] = &[
    "approve", "approved", "approves", "approval", "yes", "recommend", "recommended",
    "recommends", "agree", "agreed", "agrees", "accept", "accepted", "proceed", "indicated",
    "appropriate", "safe", "support", "supports", "supported", "endorse", "endorsed", "favor",
    "favour",
];

const NEGATING: &[&str] = &[
    "reject", "rejected", "rejects", "rejection", "decline", "declined", "deny", "denied",
    "disagree", "disagreed", "disagrees", "oppose", "opposed", "opposes", "against",
    "contraindicated", "inappropriate", "unsafe", "avoid", "refuse", "refused", "withhold",
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "dont", "doesnt", "cannot", "cant", "wont", "shouldnt", "isnt",
    "arent", "wouldnt",
];

/// Keyword-based verdict classifier.
///
/// Scores affirming and negating verdict words, flipping a word preceded
/// (within two tokens) by a negator, so "do not recommend" negates. A
/// leading bare "no" also negates. Neutral answers fall back to their
/// normalized text as claim key, so two neutral answers agree only when
/// they say the same thing.
///
/// A string `recommendation` structured field takes precedence over the
/// free-text content.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolarityComparator;

impl PolarityComparator {
    pub const RECOMMENDATION_FIELD: &'static str = "recommendation";

    pub fn new() -> Self {
        Self
    }

    /// Classify free text
    pub fn polarity(text: &str) -> Polarity {
        let tokens = tokenize(text);
        let mut score: i32 = 0;

        for (i, token) in tokens.iter().enumerate() {
            let token = token.as_str();
            let negated = tokens[i.saturating_sub(2)..i]
                .iter()
                .any(|t| NEGATORS.contains(&t.as_str()));

            if AFFIRMING.contains(&token) {
                score += if negated { -1 } else { 1 };
            } else if NEGATING.contains(&token) {
                score += if negated { 1 } else { -1 };
            }
        }

        if tokens.first().is_some_and(|t| t == "no") {
            let followed_by_verdict = tokens
                .iter()
                .skip(1)
                .take(2)
                .any(|t| AFFIRMING.contains(&t.as_str()) || NEGATING.contains(&t.as_str()));
            if !followed_by_verdict {
                score -= 1;
            }
        }

        match score.signum() {
            1 => Polarity::Affirm,
            -1 => Polarity::Negate,
            _ => Polarity::Neutral,
        }
    }

    /// Lowercase, collapse whitespace and strip trailing punctuation
    pub fn normalize(text: &str) -> String {
        text.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
            .trim_end_matches(['.', '!', '?', ',', ';', ':'])
            .to_string()
    }

    fn source_text(response: &AgentResponse) -> &str {
        response
            .structured
            .get(Self::RECOMMENDATION_FIELD)
            .and_then(|v| v.as_str())
            .unwrap_or(&response.content)
    }
}

impl ClaimComparator for PolarityComparator {
    fn claim(&self, response: &AgentResponse, _context: &ClaimContext<'_>) -> Claim {
        let text = Self::source_text(response);
        match Self::polarity(text) {
            Polarity::Affirm => Claim::new("affirm", Polarity::Affirm),
            Polarity::Negate => Claim::new("negate", Polarity::Negate),
            Polarity::Neutral => Claim::new(Self::normalize(text), Polarity::Neutral),
        }
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace(['\'', '\u{2019}'], "")
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ClaimContext<'static> {
        ClaimContext::new("Approve the treatment plan?", &[])
    }

    #[test]
    fn test_simple_verdicts() {
        assert_eq!(PolarityComparator::polarity("approve"), Polarity::Affirm);
        assert_eq!(PolarityComparator::polarity("reject"), Polarity::Negate);
        assert_eq!(PolarityComparator::polarity("Yes."), Polarity::Affirm);
        assert_eq!(PolarityComparator::polarity("No."), Polarity::Negate);
    }

    #[test]
    fn test_negated_verdicts_flip() {
        assert_eq!(
            PolarityComparator::polarity("I do not recommend this regimen"),
            Polarity::Negate
        );
        assert_eq!(
            PolarityComparator::polarity("I don't think we should reject it"),
            Polarity::Affirm
        );
        assert_eq!(
            PolarityComparator::polarity("This is not safe for renal patients"),
            Polarity::Negate
        );
    }

    #[test]
    fn test_neutral_text() {
        assert_eq!(
            PolarityComparator::polarity("Order a lipid panel first"),
            Polarity::Neutral
        );
    }

    #[test]
    fn test_opposing_claims() {
        let comparator = PolarityComparator::new();
        let approve = comparator.claim(&AgentResponse::success("a", 0, "approve", 0.9), &ctx());
        let reject = comparator.claim(&AgentResponse::success("b", 1, "reject", 0.85), &ctx());
        assert!(comparator.opposing(&approve, &reject));
        assert!(!comparator.agrees(&approve, &reject));
    }

    #[test]
    fn test_neutral_claims_agree_on_same_text() {
        let comparator = PolarityComparator::new();
        let a = comparator.claim(
            &AgentResponse::success("a", 0, "Start   metformin.", 0.8),
            &ctx(),
        );
        let b = comparator.claim(&AgentResponse::success("b", 1, "start metformin", 0.7), &ctx());
        let c = comparator.claim(&AgentResponse::success("c", 2, "start insulin", 0.7), &ctx());
        assert!(comparator.agrees(&a, &b));
        assert!(!comparator.agrees(&a, &c));
        assert!(!comparator.opposing(&a, &c));
    }

    #[test]
    fn test_structured_recommendation_takes_precedence() {
        let comparator = PolarityComparator::new();
        let response = AgentResponse::success("a", 0, "Long discussion of risks", 0.8)
            .with_field("recommendation", serde_json::json!("reject"));
        assert_eq!(comparator.claim(&response, &ctx()).polarity, Polarity::Negate);
    }

    #[test]
    fn test_cluster_by_claim_keeps_first_appearance_order() {
        let responses = vec![
            AgentResponse::success("a", 0, "reject", 0.6),
            AgentResponse::success("b", 1, "approve", 0.9),
            AgentResponse::success("c", 2, "I approve", 0.8),
        ];
        let refs: Vec<&AgentResponse> = responses.iter().collect();
        let (clusters, claims) = cluster_by_claim(&PolarityComparator::new(), &refs, &ctx());
        assert_eq!(claims.len(), 3);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].claim.key, "negate");
        assert_eq!(clusters[1].len(), 2);
        assert_eq!(
            clusters[1].representative().unwrap().agent_id.as_str(),
            "b"
        );
    }
}
