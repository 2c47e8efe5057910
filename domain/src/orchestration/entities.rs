//! Orchestration domain entities

use serde::{Deserialize, Serialize};

/// Stage of a consultation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Framework selection
    Selection,
    /// Running the agents under the chosen topology
    Execution,
    /// Structural validation of responses
    Validation,
    /// Pairwise/group disagreement detection
    ConflictDetection,
    /// Applying a resolution strategy per conflict
    Resolution,
    /// Quorum evaluation and final recommendation
    Consensus,
}

impl Stage {
    pub fn as_str(&self) -> &str {
        match self {
            Stage::Selection => "selection",
            Stage::Execution => "execution",
            Stage::Validation => "validation",
            Stage::ConflictDetection => "conflict_detection",
            Stage::Resolution => "resolution",
            Stage::Consensus => "consensus",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Stage::Selection => "Framework Selection",
            Stage::Execution => "Agent Execution",
            Stage::Validation => "Response Validation",
            Stage::ConflictDetection => "Conflict Detection",
            Stage::Resolution => "Conflict Resolution",
            Stage::Consensus => "Consensus",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
