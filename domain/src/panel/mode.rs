//! Execution mode definitions.
//!
//! Defines [`ExecutionMode`], the topology that governs how the agents of a
//! panel are invoked relative to one another.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Topology of a consultation.
///
/// - **Sequential**: one agent after another, each sees prior outputs
/// - **Parallel**: all agents at once, independently
/// - **Conversational**: round-robin rounds over a shared transcript
/// - **Hierarchical**: a lead decomposes, delegates, then aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Sequential,
    #[default]
    Parallel,
    Conversational,
    Hierarchical,
}

impl ExecutionMode {
    /// All modes, in declaration order
    pub const ALL: [ExecutionMode; 4] = [
        ExecutionMode::Sequential,
        ExecutionMode::Parallel,
        ExecutionMode::Conversational,
        ExecutionMode::Hierarchical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Sequential => "sequential",
            ExecutionMode::Parallel => "parallel",
            ExecutionMode::Conversational => "conversational",
            ExecutionMode::Hierarchical => "hierarchical",
        }
    }

    /// Get a human-readable description of this mode
    pub fn description(&self) -> &'static str {
        match self {
            ExecutionMode::Sequential => "Sequential: agents run in order, building on prior outputs",
            ExecutionMode::Parallel => "Parallel: agents run concurrently and independently",
            ExecutionMode::Conversational => {
                "Conversational: agents discuss over rounds until consensus or round limit"
            }
            ExecutionMode::Hierarchical => {
                "Hierarchical: a lead agent delegates to the panel and aggregates"
            }
        }
    }

    /// Whether agents of this mode may run concurrently
    pub fn is_concurrent(&self) -> bool {
        matches!(
            self,
            ExecutionMode::Parallel | ExecutionMode::Conversational
        )
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" | "seq" => Ok(ExecutionMode::Sequential),
            "parallel" | "par" => Ok(ExecutionMode::Parallel),
            "conversational" | "conversation" | "conv" => Ok(ExecutionMode::Conversational),
            "hierarchical" | "hier" => Ok(ExecutionMode::Hierarchical),
            _ => Err(format!(
                "Invalid ExecutionMode: {}. Valid: sequential, parallel, conversational, hierarchical",
                s
            )),
        }
    }
}
