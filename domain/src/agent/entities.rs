//! Agent definitions.

use super::value_objects::{AgentId, ModelParams};
use serde::{Deserialize, Serialize};

/// A domain-expert agent taking part in a consultation (Entity)
///
/// Immutable for the lifetime of one consultation.
///
/// # Example
///
/// ```
/// use consult_domain::AgentDefinition;
///
/// let lead = AgentDefinition::new("internist", "Internal medicine lead")
///     .with_goal("Coordinate the panel")
///     .with_delegation(true);
/// assert!(lead.allow_delegation);
/// assert_eq!(lead.id.as_str(), "internist");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDefinition {
    /// Identifier, unique within a panel
    pub id: AgentId,
    /// Role description (e.g. "Clinical pharmacist")
    pub role: String,
    /// What the agent is trying to achieve
    #[serde(default)]
    pub goal: String,
    /// System prompt forwarded to the invoker
    #[serde(default)]
    pub system_prompt: String,
    /// Sampling parameters
    #[serde(default)]
    pub model_params: ModelParams,
    /// Whether this agent may delegate (lead or moderator)
    #[serde(default)]
    pub allow_delegation: bool,
}

impl AgentDefinition {
    pub fn new(id: impl Into<AgentId>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
            goal: String::new(),
            system_prompt: String::new(),
            model_params: ModelParams::default(),
            allow_delegation: false,
        }
    }

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = goal.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_model_params(mut self, params: ModelParams) -> Self {
        self.model_params = params;
        self
    }

    pub fn with_delegation(mut self, allow: bool) -> Self {
        self.allow_delegation = allow;
        self
    }

    /// Copy of this definition that may not delegate further.
    ///
    /// Delegates in a hierarchical run are invoked through this so that
    /// delegation depth stays at one level.
    pub fn as_delegate(&self) -> Self {
        Self {
            allow_delegation: false,
            ..self.clone()
        }
    }
}
