//! Panel configuration from TOML (`[panel]` section)

use super::ConfigValidationError;
use super::agent::FileAgentConfig;
use consult_domain::{ExecutionMode, FrameworkChoice, PanelConfiguration};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Raw panel configuration from TOML
///
/// # Example
///
/// ```toml
/// [panel]
/// mode = "conversational"     # sequential, parallel, conversational, hierarchical
/// framework = "auto"          # auto, direct, state_graph, dialogue, crew
/// max_rounds = 3
/// require_consensus = true
/// allow_debate = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePanelConfig {
    pub mode: String,
    pub framework: String,
    pub max_rounds: usize,
    pub require_consensus: bool,
    pub allow_debate: bool,
    pub agents: Vec<FileAgentConfig>,
}

impl Default for FilePanelConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::default().to_string(),
            framework: FrameworkChoice::default().to_string(),
            max_rounds: PanelConfiguration::DEFAULT_MAX_ROUNDS,
            require_consensus: false,
            allow_debate: false,
            agents: Vec::new(),
        }
    }
}

impl FilePanelConfig {
    pub(super) fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.agents.is_empty() {
            errors.push(ConfigValidationError::NoAgents);
        }
        let mut seen = HashSet::new();
        for agent in &self.agents {
            let id = agent.id.trim();
            if id.is_empty() {
                errors.push(ConfigValidationError::EmptyAgentId);
            } else if !seen.insert(id) {
                errors.push(ConfigValidationError::DuplicateAgentId(id.to_string()));
            }
        }
        if self.mode.parse::<ExecutionMode>().is_err() {
            errors.push(ConfigValidationError::InvalidMode(self.mode.clone()));
        }
        if self.framework.parse::<FrameworkChoice>().is_err() {
            errors.push(ConfigValidationError::InvalidFramework(self.framework.clone()));
        }
        if self.max_rounds == 0 {
            errors.push(ConfigValidationError::ZeroMaxRounds);
        }

        errors
    }

    /// Build the validated domain panel
    pub fn to_panel(&self) -> Result<PanelConfiguration, ConfigValidationError> {
        let mode: ExecutionMode = self
            .mode
            .parse()
            .map_err(|_| ConfigValidationError::InvalidMode(self.mode.clone()))?;
        let framework: FrameworkChoice = self
            .framework
            .parse()
            .map_err(|_| ConfigValidationError::InvalidFramework(self.framework.clone()))?;

        PanelConfiguration::builder(self.agents.iter().map(|a| a.to_definition()).collect())
            .mode(mode)
            .framework(framework)
            .max_rounds(self.max_rounds)
            .require_consensus(self.require_consensus)
            .allow_debate(self.allow_debate)
            .build()
            .map_err(|e| ConfigValidationError::InvalidPanel(e.to_string()))
    }
}
