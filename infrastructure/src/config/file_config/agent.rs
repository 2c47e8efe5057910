//! Panel member configuration from TOML (`[[panel.agents]]` entries)

use consult_domain::{AgentDefinition, ModelParams};
use serde::{Deserialize, Serialize};

/// Raw agent definition from TOML
///
/// # Example
///
/// ```toml
/// [[panel.agents]]
/// id = "cardiology"
/// role = "Cardiologist"
/// goal = "Assess cardiovascular risk"
/// temperature = 0.1
/// allow_delegation = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    pub id: String,
    pub role: String,
    pub goal: String,
    pub system_prompt: String,
    /// Sampling temperature, model default when unset
    pub temperature: Option<f32>,
    /// Token limit, model default when unset
    pub max_tokens: Option<u32>,
    pub allow_delegation: bool,
}

impl FileAgentConfig {
    pub fn to_definition(&self) -> AgentDefinition {
        let defaults = ModelParams::default();
        let role = if self.role.trim().is_empty() {
            self.id.clone()
        } else {
            self.role.clone()
        };
        AgentDefinition::new(self.id.trim(), role)
            .with_goal(self.goal.clone())
            .with_system_prompt(self.system_prompt.clone())
            .with_model_params(ModelParams {
                temperature: self.temperature.unwrap_or(defaults.temperature),
                max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            })
            .with_delegation(self.allow_delegation)
    }
}
