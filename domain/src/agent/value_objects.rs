//! Agent value objects.
//!
//! - [`AgentId`] - Identifier of an agent, unique within a panel
//! - [`ModelParams`] - Sampling parameters forwarded to the agent invoker

use serde::{Deserialize, Serialize};

/// Identifier of an agent within a panel.
///
/// Ordered lexicographically; the ordering is used as the last tie-breaker
/// whenever two agents are otherwise indistinguishable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Creates an AgentId from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for AgentId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Model parameters attached to an agent definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Sampling temperature
    pub temperature: f32,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 1024,
        }
    }
}

impl ModelParams {
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_id_ordering_is_lexicographic() {
        let mut ids = vec![
            AgentId::new("pharmacist"),
            AgentId::new("cardiologist"),
            AgentId::new("nephrologist"),
        ];
        ids.sort();
        assert_eq!(ids[0].as_str(), "cardiologist");
        assert_eq!(ids[2].as_str(), "pharmacist");
    }

    #[test]
    fn test_agent_id_serializes_as_string() {
        let id = AgentId::new("oncologist");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"oncologist\"");
    }
}
