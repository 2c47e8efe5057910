//! Framework identifiers and workload complexity.

use crate::panel::mode::ExecutionMode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Orchestration framework chosen once per consultation.
///
/// Each framework declares the execution modes it can drive:
///
/// | Framework    | Capability                  | Modes                                     |
/// |--------------|-----------------------------|-------------------------------------------|
/// | `Direct`     | simplest fan-out            | parallel, sequential                      |
/// | `StateGraph` | stateful pipelines          | sequential, parallel, hierarchical        |
/// | `Dialogue`   | multi-turn exchange         | conversational, parallel, sequential      |
/// | `Crew`       | role delegation             | hierarchical, sequential, parallel        |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framework {
    Direct,
    StateGraph,
    Dialogue,
    Crew,
}

impl Framework {
    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::Direct => "direct",
            Framework::StateGraph => "state_graph",
            Framework::Dialogue => "dialogue",
            Framework::Crew => "crew",
        }
    }

    /// Execution modes this framework can drive
    pub fn supported_modes(&self) -> &'static [ExecutionMode] {
        match self {
            Framework::Direct => &[ExecutionMode::Parallel, ExecutionMode::Sequential],
            Framework::StateGraph => &[
                ExecutionMode::Sequential,
                ExecutionMode::Parallel,
                ExecutionMode::Hierarchical,
            ],
            Framework::Dialogue => &[
                ExecutionMode::Conversational,
                ExecutionMode::Parallel,
                ExecutionMode::Sequential,
            ],
            Framework::Crew => &[
                ExecutionMode::Hierarchical,
                ExecutionMode::Sequential,
                ExecutionMode::Parallel,
            ],
        }
    }

    pub fn supports(&self, mode: ExecutionMode) -> bool {
        self.supported_modes().contains(&mode)
    }

    pub fn supports_delegation(&self) -> bool {
        matches!(self, Framework::Crew | Framework::StateGraph)
    }

    pub fn supports_multi_turn(&self) -> bool {
        matches!(self, Framework::Dialogue)
    }

    pub fn is_stateful(&self) -> bool {
        matches!(self, Framework::StateGraph)
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Framework {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "direct" => Ok(Framework::Direct),
            "state_graph" | "stategraph" | "graph" => Ok(Framework::StateGraph),
            "dialogue" | "dialog" => Ok(Framework::Dialogue),
            "crew" => Ok(Framework::Crew),
            _ => Err(format!(
                "Unknown framework: {}. Valid: auto, direct, state_graph, dialogue, crew",
                s
            )),
        }
    }
}

/// Framework requested by a panel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FrameworkChoice {
    /// Let the selector decide from the workload shape
    #[default]
    Auto,
    /// Use this framework
    Fixed(Framework),
}

impl fmt::Display for FrameworkChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameworkChoice::Auto => write!(f, "auto"),
            FrameworkChoice::Fixed(framework) => write!(f, "{}", framework),
        }
    }
}

impl std::str::FromStr for FrameworkChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            Ok(FrameworkChoice::Auto)
        } else {
            s.parse().map(FrameworkChoice::Fixed)
        }
    }
}

impl TryFrom<String> for FrameworkChoice {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<FrameworkChoice> for String {
    fn from(choice: FrameworkChoice) -> Self {
        choice.to_string()
    }
}

/// Workload complexity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    /// Derive complexity from panel size: >5 high, >2 medium, else low
    pub fn from_agent_count(agent_count: usize) -> Self {
        if agent_count > 5 {
            Complexity::High
        } else if agent_count > 2 {
            Complexity::Medium
        } else {
            Complexity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Low => "low",
            Complexity::Medium => "medium",
            Complexity::High => "high",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complexity_thresholds() {
        assert_eq!(Complexity::from_agent_count(1), Complexity::Low);
        assert_eq!(Complexity::from_agent_count(2), Complexity::Low);
        assert_eq!(Complexity::from_agent_count(3), Complexity::Medium);
        assert_eq!(Complexity::from_agent_count(5), Complexity::Medium);
        assert_eq!(Complexity::from_agent_count(6), Complexity::High);
    }

    #[test]
    fn test_framework_capabilities() {
        assert!(Framework::Crew.supports(ExecutionMode::Hierarchical));
        assert!(Framework::Dialogue.supports(ExecutionMode::Conversational));
        assert!(!Framework::Direct.supports(ExecutionMode::Conversational));
        assert!(!Framework::Direct.supports(ExecutionMode::Hierarchical));
        assert!(Framework::Crew.supports_delegation());
        assert!(Framework::Dialogue.supports_multi_turn());
        assert!(Framework::StateGraph.is_stateful());
    }

    #[test]
    fn test_parse_framework_choice() {
        assert_eq!("auto".parse::<FrameworkChoice>().ok(), Some(FrameworkChoice::Auto));
        assert_eq!(
            "state-graph".parse::<FrameworkChoice>().ok(),
            Some(FrameworkChoice::Fixed(Framework::StateGraph))
        );
        assert!("langchain".parse::<FrameworkChoice>().is_err());
    }

    #[test]
    fn test_framework_choice_serde() {
        let json = serde_json::to_string(&FrameworkChoice::Fixed(Framework::Crew)).unwrap();
        assert_eq!(json, "\"crew\"");
        let back: FrameworkChoice = serde_json::from_str("\"auto\"").unwrap();
        assert_eq!(back, FrameworkChoice::Auto);
    }
}
