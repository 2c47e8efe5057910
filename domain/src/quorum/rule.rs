//! Quorum rules.
//!
//! The panel majority is the floor for every consultation: a configured rule
//! can demand more supporters but never fewer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How many agreeing agents a consensus needs
///
/// # Example
///
/// ```
/// use consult_domain::quorum::QuorumRule;
///
/// assert_eq!(QuorumRule::Majority.required(5), 3);
/// assert_eq!(QuorumRule::Majority.required(2), 2);
/// // a laxer rule is raised to the majority
/// assert_eq!(QuorumRule::AtLeast(1).required(5), 3);
/// assert_eq!(QuorumRule::Unanimous.required(5), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum QuorumRule {
    /// More than half of the panel (n/2 + 1)
    #[default]
    Majority,

    /// Every panelist
    Unanimous,

    /// At least this many panelists
    AtLeast(usize),

    /// At least this percentage of the panel (0-100)
    Percentage(u8),
}

impl QuorumRule {
    /// Supporters this rule alone asks for in a panel of `total`
    pub fn min_supporters(&self, total: usize) -> usize {
        match self {
            QuorumRule::Majority => total / 2 + 1,
            QuorumRule::Unanimous => total,
            QuorumRule::AtLeast(n) => *n,
            QuorumRule::Percentage(p) => (total as f64 * (*p as f64 / 100.0)).ceil() as usize,
        }
    }

    /// Quorum for a panel of `total`: this rule, floored at the majority
    pub fn required(&self, total: usize) -> usize {
        self.min_supporters(total)
            .max(QuorumRule::Majority.min_supporters(total))
    }

    /// Whether `supporters` out of `total` meet the quorum
    pub fn is_satisfied(&self, supporters: usize, total: usize) -> bool {
        total > 0 && supporters >= self.required(total)
    }

    pub fn description(&self) -> String {
        match self {
            QuorumRule::Majority => "majority (more than half)".to_string(),
            QuorumRule::Unanimous => "unanimous (every panelist)".to_string(),
            QuorumRule::AtLeast(n) => format!("at least {} panelists", n),
            QuorumRule::Percentage(p) => format!("at least {}% of the panel", p),
        }
    }
}

impl fmt::Display for QuorumRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuorumRule::Majority => write!(f, "majority"),
            QuorumRule::Unanimous => write!(f, "unanimous"),
            QuorumRule::AtLeast(n) => write!(f, "atleast:{}", n),
            QuorumRule::Percentage(p) => write!(f, "{}%", p),
        }
    }
}

impl FromStr for QuorumRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "majority" => Ok(QuorumRule::Majority),
            "unanimous" => Ok(QuorumRule::Unanimous),
            s if s.starts_with("atleast:") || s.starts_with("at_least:") => {
                let n: usize = s
                    .split(':')
                    .nth(1)
                    .ok_or("missing number after atleast:")?
                    .parse()
                    .map_err(|_| "invalid number for atleast")?;
                Ok(QuorumRule::AtLeast(n))
            }
            s if s.starts_with("percentage:") || s.ends_with('%') => {
                let p: u8 = s
                    .trim_start_matches("percentage:")
                    .trim_end_matches('%')
                    .parse()
                    .map_err(|_| "invalid percentage")?;
                if p > 100 {
                    return Err(format!("percentage {} exceeds 100", p));
                }
                Ok(QuorumRule::Percentage(p))
            }
            _ => Err(format!(
                "unknown quorum rule: {}. Valid: majority, unanimous, atleast:N, N%",
                s
            )),
        }
    }
}

impl TryFrom<String> for QuorumRule {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QuorumRule> for String {
    fn from(rule: QuorumRule) -> Self {
        rule.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_majority_quorum() {
        assert_eq!(QuorumRule::Majority.required(1), 1);
        assert_eq!(QuorumRule::Majority.required(2), 2);
        assert_eq!(QuorumRule::Majority.required(3), 2);
        assert_eq!(QuorumRule::Majority.required(4), 3);
        assert_eq!(QuorumRule::Majority.required(5), 3);
    }

    #[test]
    fn test_stricter_rule_raises_quorum() {
        assert_eq!(QuorumRule::Unanimous.required(4), 4);
        assert_eq!(QuorumRule::Percentage(75).required(5), 4);
        assert_eq!(QuorumRule::AtLeast(4).required(5), 4);
    }

    #[test]
    fn test_laxer_rule_is_floored() {
        assert_eq!(QuorumRule::AtLeast(1).required(5), 3);
        assert_eq!(QuorumRule::Percentage(10).required(4), 3);
    }

    #[test]
    fn test_is_satisfied() {
        assert!(QuorumRule::Majority.is_satisfied(3, 5));
        assert!(!QuorumRule::Majority.is_satisfied(2, 5));
        assert!(!QuorumRule::Majority.is_satisfied(0, 0));
    }

    #[test]
    fn test_parse_and_display() {
        for text in ["majority", "unanimous", "atleast:2", "75%"] {
            let rule: QuorumRule = text.parse().unwrap();
            assert_eq!(rule.to_string(), text);
        }
        assert_eq!(
            "percentage:60".parse::<QuorumRule>().ok(),
            Some(QuorumRule::Percentage(60))
        );
        assert!("120%".parse::<QuorumRule>().is_err());
        assert!("most".parse::<QuorumRule>().is_err());
    }

    #[test]
    fn test_deserializes_from_string() {
        #[derive(Deserialize)]
        struct Wrapper {
            rule: QuorumRule,
        }
        let w: Wrapper = serde_json::from_str(r#"{"rule": "atleast:3"}"#).unwrap();
        assert_eq!(w.rule, QuorumRule::AtLeast(3));
    }
}
